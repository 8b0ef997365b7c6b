//! Comparisons and lane predicates.

use crate::backend;
use crate::error::{unsupported, Result};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::operators::{Comparison, Test};

use super::Vector;

impl<E: Lane> Vector<E> {
    fn backend_compare(&self, op: Comparison, other: &Self) -> Option<Mask<E>> {
        let mut out = vec![false; self.length()];
        let accepted = backend::active().try_compare(
            op,
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            bytemuck::cast_slice(other.as_slice()),
            &mut out,
        );
        accepted.then(|| Mask::from_bits(self.species, out))
    }

    /// Mask of lanes where `self[i] op other[i]` holds.
    ///
    /// The unsigned orderings are only defined for integral lanes.
    pub fn compare(&self, op: Comparison, other: &Self) -> Result<Mask<E>> {
        self.check_species(other)?;
        let kernel = E::op_cache()
            .compare(op)
            .ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        if let Some(mask) = self.backend_compare(op, other) {
            return Ok(mask);
        }
        Ok(self.compare_template(other, |_, a, b| kernel(a, b)))
    }

    pub fn compare_scalar(&self, op: Comparison, e: E) -> Result<Mask<E>> {
        self.compare(op, &self.broadcast(e))
    }

    /// Compares against a wider integer, which must convert exactly.
    pub fn compare_long(&self, op: Comparison, value: i64) -> Result<Mask<E>> {
        self.compare(op, &self.broadcast_long(value)?)
    }

    /// The comparison restricted to the set lanes of `mask`.
    pub fn compare_masked(&self, op: Comparison, other: &Self, mask: &Mask<E>) -> Result<Mask<E>> {
        self.check_mask(mask)?;
        self.compare(op, other)?.and(mask)
    }

    /// Mask of lanes satisfying the predicate.
    pub fn test(&self, op: Test) -> Result<Mask<E>> {
        let kernel = E::op_cache()
            .test(op)
            .ok_or_else(|| unsupported(op, E::LANE_TYPE))?;
        Ok(self.test_template(|_, a| kernel(a)))
    }

    pub fn test_masked(&self, op: Test, mask: &Mask<E>) -> Result<Mask<E>> {
        self.check_mask(mask)?;
        self.test(op)?.and(mask)
    }

    /// Lanewise equality as a mask; `==` compares whole vectors.
    pub fn lanes_eq(&self, other: &Self) -> Result<Mask<E>> {
        self.compare(Comparison::Eq, other)
    }

    pub fn lt(&self, other: &Self) -> Result<Mask<E>> {
        self.compare(Comparison::Lt, other)
    }
}
