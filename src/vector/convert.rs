//! Reinterpretation and element conversion between species.
//!
//! Reinterpreting keeps the bits (in native byte order) and conversion
//! keeps the values (with primitive cast semantics). When the source and
//! destination differ in size, `part` picks the block involved:
//!
//! - same size: `part` must be 0
//! - smaller destination: `part` in `[0, src / dst)` selects the source
//!   block that is kept
//! - larger destination: `part` in `(-(dst / src), 0]` places the source at
//!   block `-part` of a zero-filled result

use crate::error::{LanewiseError, Result};
use crate::lane::Lane;
use crate::species::Species;

use super::Vector;

/// Where the source lands relative to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Source block `n` fills the destination.
    Contract(usize),
    /// The source fills destination block `n`.
    Expand(usize),
}

/// Validates `part` for a source of `src` units and a destination of `dst`
/// units (bytes or lanes).
fn placement(src: usize, dst: usize, part: i32) -> Result<Placement> {
    let part_error = |count: usize| LanewiseError::IndexOutOfBounds {
        index: i64::from(part),
        length: count,
        message: format!("part {part} out of range for {src} -> {dst}"),
    };
    if dst <= src {
        let blocks = src / dst;
        if part < 0 || part as usize >= blocks {
            return Err(part_error(blocks));
        }
        Ok(Placement::Contract(part as usize))
    } else {
        let blocks = dst / src;
        if part > 0 || part.unsigned_abs() as usize >= blocks {
            return Err(part_error(blocks));
        }
        Ok(Placement::Expand(part.unsigned_abs() as usize))
    }
}

impl<E: Lane> Vector<E> {
    /// The same bits as lanes of type `F`, in the same shape.
    pub fn reinterpret_as<F: Lane>(&self) -> Vector<F> {
        let species = self.species.with_lane_type::<F>();
        Vector::from_lanes(species, bytemuck::pod_collect_to_vec(self.as_slice()))
    }

    /// The same bits as byte lanes, in native byte order.
    pub fn reinterpret_as_bytes(&self) -> Vector<i8> {
        self.reinterpret_as::<i8>()
    }

    /// Each lane's bits as the integral lane type of the same width.
    pub fn view_as_integral_lanes(&self) -> Vector<E::Bits> {
        let species = self.species.with_lane_type::<E::Bits>();
        let lanes = self.as_slice().iter().map(|lane| lane.to_lane_bits()).collect();
        Vector::from_lanes(species, lanes)
    }

    pub(crate) fn from_integral_lanes(species: Species<E>, bits: &Vector<E::Bits>) -> Self {
        let lanes = bits.as_slice().iter().map(|&b| E::from_lane_bits(b)).collect();
        Self::from_lanes(species, lanes)
    }

    /// Each lane's bits as the floating lane type of the same width.
    ///
    /// 8- and 16-bit lanes have no floating counterpart and fail with
    /// `Unsupported`.
    pub fn view_as_floating_lanes(&self) -> Result<Vector<E::Floating>> {
        if E::LANE_TYPE.as_floating().is_none() {
            return Err(LanewiseError::Unsupported {
                operation: "view_as_floating_lanes".to_string(),
                lane_type: E::LANE_TYPE,
            });
        }
        Ok(self.reinterpret_as::<E::Floating>())
    }

    /// Reinterprets the bits into `species`, which may have another shape.
    pub fn reinterpret_shape<F: Lane>(&self, species: Species<F>, part: i32) -> Result<Vector<F>> {
        let src: &[u8] = bytemuck::cast_slice(self.as_slice());
        let dst_len = species.vector_byte_size();
        let mut bytes = vec![0u8; dst_len];
        match placement(src.len(), dst_len, part)? {
            Placement::Contract(block) => {
                bytes.copy_from_slice(&src[block * dst_len..(block + 1) * dst_len]);
            }
            Placement::Expand(block) => {
                bytes[block * src.len()..(block + 1) * src.len()].copy_from_slice(src);
            }
        }
        Ok(Vector::from_lanes(species, bytemuck::pod_collect_to_vec(&bytes[..])))
    }

    /// Converts every lane to `F` with primitive cast semantics, producing a
    /// vector of `species`.
    pub fn convert_shape<F: Lane>(&self, species: Species<F>, part: i32) -> Result<Vector<F>> {
        let src = self.as_slice();
        let dst_len = species.length();
        let lanes = match placement(src.len(), dst_len, part)? {
            Placement::Contract(block) => src[block * dst_len..(block + 1) * dst_len]
                .iter()
                .map(|&lane| F::convert_from(lane))
                .collect(),
            Placement::Expand(block) => {
                let mut lanes = vec![F::zero(); dst_len];
                for (slot, &lane) in lanes[block * src.len()..].iter_mut().zip(src) {
                    *slot = F::convert_from(lane);
                }
                lanes
            }
        };
        Ok(Vector::from_lanes(species, lanes))
    }

    /// [`Vector::convert_shape`] into the same shape.
    pub fn convert<F: Lane>(&self, part: i32) -> Result<Vector<F>> {
        self.convert_shape(self.species.with_lane_type::<F>(), part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_rules() {
        assert_eq!(placement(16, 16, 0).unwrap(), Placement::Contract(0));
        assert!(placement(16, 16, 1).is_err());
        assert_eq!(placement(32, 8, 3).unwrap(), Placement::Contract(3));
        assert!(placement(32, 8, 4).is_err());
        assert!(placement(32, 8, -1).is_err());
        assert_eq!(placement(8, 32, -3).unwrap(), Placement::Expand(3));
        assert!(placement(8, 32, -4).is_err());
        assert!(placement(8, 32, 1).is_err());
    }

    #[test]
    fn test_reinterpret_as_bytes_is_native_order() {
        let v = Species::<i32>::S_64.from_values(&[0x0102_0304, -1]).unwrap();
        let bytes = v.reinterpret_as_bytes().to_array();
        let expected: Vec<i8> = 0x0102_0304i32
            .to_ne_bytes()
            .iter()
            .chain((-1i32).to_ne_bytes().iter())
            .map(|&b| b as i8)
            .collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_views() {
        let v = Species::<f32>::S_64.from_values(&[1.0, -0.0]).unwrap();
        let bits = v.view_as_integral_lanes();
        assert_eq!(bits.to_array(), vec![0x3f80_0000, i32::MIN]);
        assert_eq!(bits.view_as_floating_lanes().unwrap(), v);
        assert!(matches!(
            Species::<i16>::S_64.zero().view_as_floating_lanes(),
            Err(LanewiseError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_convert_shape_parts() {
        let ints = Species::<i32>::S_128.from_values(&[1, -2, 3, -4]).unwrap();

        let doubles = ints.convert_shape(Species::<f64>::S_128, 1).unwrap();
        assert_eq!(doubles.to_array(), vec![3.0, -4.0]);

        let wide = ints.convert_shape(Species::<f64>::S_256, 0).unwrap();
        assert_eq!(wide.to_array(), vec![1.0, -2.0, 3.0, -4.0]);

        let bytes = ints.convert_shape(Species::<i8>::S_128, -1).unwrap();
        let mut expected = vec![0i8; 16];
        expected[4..8].copy_from_slice(&[1, -2, 3, -4]);
        assert_eq!(bytes.to_array(), expected);

        assert!(ints.convert_shape(Species::<f64>::S_128, 2).is_err());
    }

    #[test]
    fn test_convert_uses_cast_semantics() {
        let floats = Species::<f32>::S_128.from_values(&[300.7, -1.5, f32::NAN, 1e10]).unwrap();
        let ints: Vector<i32> = floats.convert(0).unwrap();
        assert_eq!(ints.to_array(), vec![300, -1, 0, i32::MAX]);
        let bytes = floats.convert_shape(Species::<i8>::S_64, 0).unwrap();
        assert_eq!(&bytes.to_array()[..4], &[44, -1, 0, -1]);
    }

    #[test]
    fn test_reinterpret_shape() {
        let v = Species::<i64>::S_128.from_values(&[1, 2]).unwrap();
        let low = v.reinterpret_shape(Species::<i64>::S_64, 0).unwrap();
        let high = v.reinterpret_shape(Species::<i64>::S_64, 1).unwrap();
        assert_eq!(low.to_array(), vec![1]);
        assert_eq!(high.to_array(), vec![2]);
        let widened = v.reinterpret_shape(Species::<i64>::S_256, -1).unwrap();
        assert_eq!(widened.to_array(), vec![0, 0, 1, 2]);
    }
}
