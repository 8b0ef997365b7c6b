//! Species: the (lane type, shape) descriptor of a concrete vector kind.
//!
//! A [`Species`] is a zero-cost copyable value; two species are equal iff
//! they have the same lane type and the same shape. The zero vector, the
//! iota vector and the constant masks of every species are built on first
//! use and shared for the rest of the process.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::OnceLock;

use crate::error::{illegal_argument, length_mismatch, lossy_conversion, species_mismatch, Result};
use crate::lane::{Lane, LaneType};
use crate::mask::Mask;
use crate::memory::ByteOrder;
use crate::shape::VectorShape;
use crate::shuffle::Shuffle;
use crate::vector::Vector;

/// Descriptor of a vector kind: lane type `E` laid out in a given shape.
pub struct Species<E> {
    shape: VectorShape,
    _lane: PhantomData<fn() -> E>,
}

/// Per-lane-type singletons, one slot per shape.
pub struct SpeciesCache<E: 'static> {
    zeros: [OnceLock<Vector<E>>; VectorShape::COUNT],
    iotas: [OnceLock<Vector<E>>; VectorShape::COUNT],
    all_true: [OnceLock<Mask<E>>; VectorShape::COUNT],
    all_false: [OnceLock<Mask<E>>; VectorShape::COUNT],
}

impl<E: 'static> SpeciesCache<E> {
    pub const fn new() -> Self {
        Self {
            zeros: [const { OnceLock::new() }; VectorShape::COUNT],
            iotas: [const { OnceLock::new() }; VectorShape::COUNT],
            all_true: [const { OnceLock::new() }; VectorShape::COUNT],
            all_false: [const { OnceLock::new() }; VectorShape::COUNT],
        }
    }
}

impl<E: 'static> Default for SpeciesCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Species<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Species<E> {}

impl<E> PartialEq for Species<E> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl<E> Eq for Species<E> {}

impl<E: Lane> Hash for Species<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        E::LANE_TYPE.hash(state);
        self.shape.hash(state);
    }
}

impl<E: Lane> fmt::Debug for Species<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<E: Lane> fmt::Display for Species<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Species[{}, {}, {}]",
            E::LANE_TYPE,
            self.length(),
            self.shape
        )
    }
}

impl<E: Lane> Species<E> {
    pub const S_64: Self = Self::new(VectorShape::S64);
    pub const S_128: Self = Self::new(VectorShape::S128);
    pub const S_256: Self = Self::new(VectorShape::S256);
    pub const S_512: Self = Self::new(VectorShape::S512);
    pub const S_MAX: Self = Self::new(VectorShape::SMax);

    const fn new(shape: VectorShape) -> Self {
        Self {
            shape,
            _lane: PhantomData,
        }
    }

    /// The species of lane type `E` in `shape`.
    pub const fn of(shape: VectorShape) -> Self {
        Self::new(shape)
    }

    /// The species of the preferred (widest fully supported) fixed shape.
    pub fn preferred() -> Self {
        Self::new(VectorShape::preferred())
    }

    /// The species of the `SMax` shape.
    pub const fn largest() -> Self {
        Self::S_MAX
    }

    pub fn lane_type(self) -> LaneType {
        E::LANE_TYPE
    }

    pub fn shape(self) -> VectorShape {
        self.shape
    }

    /// Number of lanes: shape bits divided by lane bits.
    pub fn length(self) -> usize {
        self.shape.lane_count(E::LANE_TYPE)
    }

    /// Lane width in bits.
    pub fn element_size(self) -> usize {
        E::LANE_TYPE.bit_size()
    }

    pub fn vector_bit_size(self) -> usize {
        self.shape.bit_size()
    }

    pub fn vector_byte_size(self) -> usize {
        self.shape.byte_size()
    }

    /// Largest multiple of the lane count not greater than `length`.
    pub fn loop_bound(self, length: usize) -> usize {
        length - length % self.length()
    }

    /// The species with the same shape and lane type `F`.
    pub fn with_lane_type<F: Lane>(self) -> Species<F> {
        Species::new(self.shape)
    }

    /// The species with the same lane type and another shape.
    pub fn with_shape(self, shape: VectorShape) -> Self {
        Self::new(shape)
    }

    /// Converts `value` to the lane type, rejecting lossy conversions.
    pub fn check_value(self, value: i64) -> Result<E> {
        let converted = E::from_i64(value);
        let round_trip = converted.to_i64();
        if round_trip != value {
            return Err(lossy_conversion(value, round_trip, E::LANE_TYPE));
        }
        Ok(converted)
    }

    /// Checks that `length() * scale` fits the lane's value range.
    pub fn check_scale(self, scale: i32) -> Result<()> {
        if E::LANE_TYPE.is_floating() {
            return Ok(());
        }
        let limit = (self.length() as i64) * i64::from(scale);
        if E::from_i64(limit).to_i64() != limit {
            return Err(illegal_argument(format!(
                "index scale {scale} overflows {} lanes of {}",
                self.length(),
                E::LANE_TYPE
            )));
        }
        Ok(())
    }

    pub(crate) fn check_species(self, other: Species<E>) -> Result<()> {
        if self != other {
            return Err(species_mismatch(self, other));
        }
        Ok(())
    }

    pub(crate) fn check_length(self, found: usize) -> Result<()> {
        if found != self.length() {
            return Err(length_mismatch(self.length(), found));
        }
        Ok(())
    }

    /// The all-zero vector.
    pub fn zero(self) -> Vector<E> {
        E::species_cache().zeros[self.shape.index()]
            .get_or_init(|| Vector::from_lanes(self, vec![E::zero(); self.length()]))
            .clone()
    }

    /// The vector whose lane `i` holds `i`.
    pub fn iota(self) -> Vector<E> {
        E::species_cache().iotas[self.shape.index()]
            .get_or_init(|| {
                let lanes = (0..self.length()).map(|i| E::from_i64(i as i64)).collect();
                Vector::from_lanes(self, lanes)
            })
            .clone()
    }

    /// A vector with every lane set to `value`.
    pub fn broadcast(self, value: E) -> Vector<E> {
        Vector::from_lanes(self, vec![value; self.length()])
    }

    /// A vector with every lane set to `value`, which must convert exactly.
    pub fn broadcast_long(self, value: i64) -> Result<Vector<E>> {
        Ok(self.broadcast(self.check_value(value)?))
    }

    /// A vector holding exactly `values`.
    pub fn from_values(self, values: &[E]) -> Result<Vector<E>> {
        Vector::from_values(self, values)
    }

    /// A vector built from wider integer literals, each converted exactly.
    pub fn from_long_values(self, values: &[i64]) -> Result<Vector<E>> {
        self.check_length(values.len())?;
        let lanes = values
            .iter()
            .map(|&value| self.check_value(value))
            .collect::<Result<Vec<E>>>()?;
        Ok(Vector::from_lanes(self, lanes))
    }

    /// Loads a vector from `array` starting at `offset`.
    pub fn from_array(self, array: &[E], offset: usize) -> Result<Vector<E>> {
        Vector::from_array(self, array, offset)
    }

    /// Loads a vector from raw bytes in the given byte order.
    pub fn from_byte_array(self, bytes: &[u8], offset: usize, order: ByteOrder) -> Result<Vector<E>> {
        Vector::from_byte_array(self, bytes, offset, order)
    }

    /// Loads a vector from little-endian raw bytes.
    pub fn from_byte_array_le(self, bytes: &[u8], offset: usize) -> Result<Vector<E>> {
        Vector::from_byte_array_le(self, bytes, offset)
    }

    /// The mask with every lane set to `bit`.
    pub fn mask_all(self, bit: bool) -> Mask<E> {
        let slots = if bit {
            &E::species_cache().all_true
        } else {
            &E::species_cache().all_false
        };
        slots[self.shape.index()]
            .get_or_init(|| Mask::from_bits(self, vec![bit; self.length()]))
            .clone()
    }

    /// Mask of lanes `i` with `offset + i < limit`.
    pub fn index_in_range(self, offset: usize, limit: usize) -> Mask<E> {
        let bits = (0..self.length())
            .map(|i| offset.checked_add(i).map_or(false, |index| index < limit))
            .collect();
        Mask::from_bits(self, bits)
    }

    /// A shuffle from explicit source indices.
    pub fn shuffle_from_values(self, indices: &[i32]) -> Result<Shuffle<E>> {
        Shuffle::from_values(self, indices)
    }

    /// The shuffle `start, start + step, ...`, wrapped or flagged exceptional.
    pub fn iota_shuffle(self, start: i32, step: i32, wrap: bool) -> Shuffle<E> {
        Shuffle::iota(self, start, step, wrap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_lane_counts() {
        assert_eq!(Species::<i32>::S_128.length(), 4);
        assert_eq!(Species::<i8>::S_256.length(), 32);
        assert_eq!(Species::<f64>::S_512.length(), 8);
        assert_eq!(Species::<i16>::S_64.vector_byte_size(), 8);
    }

    #[test]
    fn test_species_equality() {
        assert_eq!(Species::<f32>::S_128, Species::<f32>::of(VectorShape::S128));
        assert_ne!(Species::<f32>::S_128, Species::<f32>::S_256);
        assert_eq!(
            Species::<f32>::S_256.with_lane_type::<i64>(),
            Species::<i64>::S_256
        );
    }

    #[test]
    fn test_species_display() {
        assert_eq!(Species::<i32>::S_128.to_string(), "Species[i32, 4, S_128_BIT]");
    }

    #[test]
    fn test_check_value() {
        let species = Species::<i8>::S_64;
        assert_eq!(species.check_value(-128).unwrap(), -128);
        match species.check_value(300) {
            Err(crate::LanewiseError::LossyConversion {
                value, converted, ..
            }) => {
                assert_eq!(value, 300);
                assert_eq!(converted, 44);
            }
            other => panic!("expected lossy conversion, got {other:?}"),
        }
        assert!(Species::<f32>::S_128.check_value((1 << 24) + 1).is_err());
        assert!(Species::<f64>::S_128.check_value(1 << 40).is_ok());
    }

    #[test]
    fn test_check_scale() {
        assert!(Species::<i8>::S_128.check_scale(7).is_ok());
        assert!(Species::<i8>::S_128.check_scale(8).is_err());
        assert!(Species::<i8>::S_128.check_scale(-8).is_ok());
        assert!(Species::<f32>::S_512.check_scale(i32::MAX).is_ok());
    }

    #[test]
    fn test_zero_and_iota_are_cached() {
        let species = Species::<i16>::S_128;
        let zero = species.zero();
        assert!(zero.to_array().iter().all(|&lane| lane == 0));
        assert_eq!(species.iota().to_array(), vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(species.zero(), zero);
    }

    #[test]
    fn test_loop_bound_and_index_in_range() {
        let species = Species::<i32>::S_128;
        assert_eq!(species.loop_bound(10), 8);
        assert_eq!(species.loop_bound(3), 0);
        let mask = species.index_in_range(8, 10);
        assert_eq!(mask.to_array(), vec![true, true, false, false]);
    }

    #[test]
    fn test_from_long_values_rejects_lossy_literal() {
        let species = Species::<i16>::S_64;
        assert!(species.from_long_values(&[1, 2, 3, 4]).is_ok());
        assert!(species.from_long_values(&[1, 2, 3, 70_000]).is_err());
        assert!(species.from_long_values(&[1, 2, 3]).is_err());
    }
}
