//! Reductions.
//!
//! Lanes are folded strictly left to right starting from the operator's
//! identity, so floating sums and products are reproducible. A masked
//! reduction replaces unset lanes with the identity and reduces the result.

use crate::backend;
use crate::error::{unsupported, Result};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::operators::Associative;

use super::Vector;

/// Algebraic identity of `op` on lane type `E`.
pub fn identity<E: Lane>(op: Associative) -> E {
    match op {
        Associative::Add | Associative::Or | Associative::Xor | Associative::FirstNonzero => {
            E::zero()
        }
        Associative::Mul => E::one(),
        Associative::And => E::all_ones(),
        Associative::Min => E::min_identity(),
        Associative::Max => E::max_identity(),
    }
}

impl<E: Lane> Vector<E> {
    /// Folds every lane with `op`.
    pub fn reduce_lanes(&self, op: Associative) -> Result<E> {
        let kernel = E::op_cache()
            .binary(op.binary())
            .ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        let mut out = [E::zero()];
        let accepted = backend::active().try_reduce(
            op,
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            bytemuck::cast_slice_mut(&mut out),
        );
        if accepted {
            return Ok(out[0]);
        }
        Ok(self.reduce_template(identity::<E>(op), |_, acc, a| kernel(acc, a)))
    }

    /// Folds the set lanes of `mask`; an empty mask yields the identity.
    pub fn reduce_lanes_masked(&self, op: Associative, mask: &Mask<E>) -> Result<E> {
        self.check_mask(mask)?;
        self.broadcast(identity::<E>(op))
            .blend(self, mask)?
            .reduce_lanes(op)
    }

    /// [`Vector::reduce_lanes`] widened to `i64`. Floating results are
    /// returned as their bit pattern.
    pub fn reduce_lanes_to_long(&self, op: Associative) -> Result<i64> {
        Ok(self.reduce_lanes(op)?.to_lane_bits().to_i64())
    }

    pub fn reduce_lanes_to_long_masked(&self, op: Associative, mask: &Mask<E>) -> Result<i64> {
        Ok(self.reduce_lanes_masked(op, mask)?.to_lane_bits().to_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::identity;
    use crate::operators::{Associative, Comparison};
    use crate::Species;

    #[test]
    fn test_masked_add() {
        let species = Species::<i32>::S_128;
        let v = species.from_values(&[5, 0, 7, 0]).unwrap();
        let mask = v.compare_scalar(Comparison::Ne, 0).unwrap();
        assert_eq!(v.reduce_lanes_masked(Associative::Add, &mask).unwrap(), 12);
    }

    #[test]
    fn test_identities_under_empty_mask() {
        let species = Species::<i16>::S_128;
        let v = species.iota();
        let none = species.mask_all(false);
        assert_eq!(v.reduce_lanes_masked(Associative::Add, &none).unwrap(), 0);
        assert_eq!(v.reduce_lanes_masked(Associative::Mul, &none).unwrap(), 1);
        assert_eq!(v.reduce_lanes_masked(Associative::And, &none).unwrap(), -1);
        assert_eq!(v.reduce_lanes_masked(Associative::Min, &none).unwrap(), i16::MAX);
        assert_eq!(v.reduce_lanes_masked(Associative::Max, &none).unwrap(), i16::MIN);
    }

    #[test]
    fn test_float_reductions() {
        let species = Species::<f64>::S_256;
        let v = species.from_values(&[1e16, 1.0, -1e16, 1.0]).unwrap();
        // strictly left to right: (1e16 + 1) - 1e16 + 1
        assert_eq!(v.reduce_lanes(Associative::Add).unwrap(), 1.0);
        assert_eq!(v.reduce_lanes(Associative::Min).unwrap(), -1e16);
        assert!(species.zero().reduce_lanes(Associative::Xor).is_err());
        assert_eq!(identity::<f32>(Associative::Min), f32::INFINITY);
    }

    #[test]
    fn test_first_nonzero_reduction() {
        let species = Species::<i64>::S_256;
        let v = species.from_values(&[0, 0, 9, 4]).unwrap();
        assert_eq!(v.reduce_lanes(Associative::FirstNonzero).unwrap(), 9);
        let floats = Species::<f32>::S_128.from_values(&[0.0, -0.0, 3.0, 4.0]).unwrap();
        assert!(floats
            .reduce_lanes(Associative::FirstNonzero)
            .unwrap()
            .is_sign_negative());
    }

    #[test]
    fn test_reduce_to_long() {
        let v = Species::<i8>::S_64.broadcast(-3);
        assert_eq!(v.reduce_lanes_to_long(Associative::Add).unwrap(), -24);
        let f = Species::<f64>::S_128.broadcast(1.0);
        assert_eq!(
            f.reduce_lanes_to_long(Associative::Add).unwrap(),
            2.0f64.to_bits() as i64
        );
    }
}
