//! The generic lane-vector engine.
//!
//! A [`Vector`] is an immutable sequence of exactly `species.length()` lanes.
//! Every operation returns a new vector; the backing buffer is owned by the
//! vector and shared between clones, never mutated after construction.
//!
//! The operator protocols live in submodules:
//!
//! - `lanewise`: unary/binary/ternary operators, masked forms, blend
//! - `compare`: comparisons and predicates producing masks
//! - `reduce`: folds of all or masked lanes
//! - `rearrange`: shuffles, `select_from`, `slice`/`unslice`
//! - `convert`: reinterpretation and element conversion between species
//!
//! Loads and stores are in [`crate::memory`].

mod compare;
mod convert;
mod lanewise;
mod rearrange;
mod reduce;

pub use reduce::identity;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{index_out_of_bounds, Result};
use crate::lane::{Lane, LaneType};
use crate::mask::Mask;
use crate::shape::VectorShape;
use crate::species::Species;

/// An immutable vector of lanes of type `E`.
pub struct Vector<E> {
    species: Species<E>,
    lanes: Arc<[E]>,
}

impl<E> Clone for Vector<E> {
    fn clone(&self) -> Self {
        Self {
            species: self.species,
            lanes: Arc::clone(&self.lanes),
        }
    }
}

impl<E: Lane> Vector<E> {
    /// Wraps `lanes`, taking ownership of the buffer.
    pub(crate) fn from_lanes(species: Species<E>, lanes: Vec<E>) -> Self {
        debug_assert_eq!(lanes.len(), species.length(), "lane count must match species");
        Self {
            species,
            lanes: lanes.into(),
        }
    }

    /// Builds a vector from an owned buffer of exactly `species.length()` lanes.
    ///
    /// The buffer is moved into the vector and never aliased afterwards.
    pub fn from_vec(species: Species<E>, lanes: Vec<E>) -> Result<Self> {
        species.check_length(lanes.len())?;
        Ok(Self::from_lanes(species, lanes))
    }

    /// Builds a vector from a copy of `values`.
    pub fn from_values(species: Species<E>, values: &[E]) -> Result<Self> {
        species.check_length(values.len())?;
        Ok(Self::from_lanes(species, values.to_vec()))
    }

    pub fn species(&self) -> Species<E> {
        self.species
    }

    pub fn shape(&self) -> VectorShape {
        self.species.shape()
    }

    pub fn lane_type(&self) -> LaneType {
        E::LANE_TYPE
    }

    /// Number of lanes.
    pub fn length(&self) -> usize {
        self.lanes.len()
    }

    /// Lane width in bits.
    pub fn element_size(&self) -> usize {
        E::LANE_TYPE.bit_size()
    }

    pub fn bit_size(&self) -> usize {
        self.species.vector_bit_size()
    }

    pub fn byte_size(&self) -> usize {
        self.species.vector_byte_size()
    }

    /// Value of lane `i`.
    pub fn lane(&self, i: usize) -> Result<E> {
        self.lanes
            .get(i)
            .copied()
            .ok_or_else(|| index_out_of_bounds(i as i64, self.length()))
    }

    /// A copy of this vector with lane `i` replaced by `value`.
    pub fn with_lane(&self, i: usize, value: E) -> Result<Self> {
        if i >= self.length() {
            return Err(index_out_of_bounds(i as i64, self.length()));
        }
        Ok(self.unary_template(|j, a| if j == i { value } else { a }))
    }

    /// Read-only view of the lanes.
    pub fn as_slice(&self) -> &[E] {
        &self.lanes
    }

    pub fn to_array(&self) -> Vec<E> {
        self.lanes.to_vec()
    }

    /// Lanes converted to `i64` with primitive cast semantics.
    pub fn to_long_array(&self) -> Vec<i64> {
        self.lanes.iter().map(|lane| lane.to_i64()).collect()
    }

    /// Lanes converted to `f64` with primitive cast semantics.
    pub fn to_double_array(&self) -> Vec<f64> {
        self.lanes.iter().map(|lane| lane.to_f64()).collect()
    }

    /// A vector of the same species with every lane set to `value`.
    pub fn broadcast(&self, value: E) -> Self {
        self.species.broadcast(value)
    }

    /// Like [`Vector::broadcast`], rejecting values that do not convert exactly.
    pub fn broadcast_long(&self, value: i64) -> Result<Self> {
        self.species.broadcast_long(value)
    }

    pub(crate) fn check_species(&self, other: &Vector<E>) -> Result<()> {
        self.species.check_species(other.species)
    }

    pub(crate) fn check_mask(&self, mask: &Mask<E>) -> Result<()> {
        self.species.check_species(mask.species())
    }

    // Operator protocols over "an ordered sequence of lanes". Callers have
    // already checked species compatibility.

    pub(crate) fn unary_template(&self, f: impl Fn(usize, E) -> E) -> Self {
        let lanes = self.lanes.iter().enumerate().map(|(i, &a)| f(i, a)).collect();
        Self::from_lanes(self.species, lanes)
    }

    pub(crate) fn unary_masked_template(&self, mask: &Mask<E>, f: impl Fn(usize, E) -> E) -> Self {
        self.unary_template(|i, a| if mask.bit(i) { f(i, a) } else { a })
    }

    pub(crate) fn binary_template(&self, other: &Self, f: impl Fn(usize, E, E) -> E) -> Self {
        let lanes = self
            .lanes
            .iter()
            .zip(other.lanes.iter())
            .enumerate()
            .map(|(i, (&a, &b))| f(i, a, b))
            .collect();
        Self::from_lanes(self.species, lanes)
    }

    pub(crate) fn binary_masked_template(
        &self,
        other: &Self,
        mask: &Mask<E>,
        f: impl Fn(usize, E, E) -> E,
    ) -> Self {
        self.binary_template(other, |i, a, b| if mask.bit(i) { f(i, a, b) } else { a })
    }

    pub(crate) fn ternary_template(
        &self,
        second: &Self,
        third: &Self,
        f: impl Fn(usize, E, E, E) -> E,
    ) -> Self {
        let lanes = (0..self.length())
            .map(|i| f(i, self.lanes[i], second.lanes[i], third.lanes[i]))
            .collect();
        Self::from_lanes(self.species, lanes)
    }

    /// Left-to-right fold of every lane.
    pub(crate) fn reduce_template(&self, init: E, f: impl Fn(usize, E, E) -> E) -> E {
        self.lanes
            .iter()
            .enumerate()
            .fold(init, |acc, (i, &a)| f(i, acc, a))
    }

    pub(crate) fn compare_template(&self, other: &Self, f: impl Fn(usize, E, E) -> bool) -> Mask<E> {
        let bits = self
            .lanes
            .iter()
            .zip(other.lanes.iter())
            .enumerate()
            .map(|(i, (&a, &b))| f(i, a, b))
            .collect();
        Mask::from_bits(self.species, bits)
    }

    pub(crate) fn test_template(&self, f: impl Fn(usize, E) -> bool) -> Mask<E> {
        let bits = self.lanes.iter().enumerate().map(|(i, &a)| f(i, a)).collect();
        Mask::from_bits(self.species, bits)
    }
}

impl<E: Lane> PartialEq for Vector<E> {
    /// Same species and lane-wise `==` (so NaN lanes never compare equal).
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.lanes == other.lanes
    }
}

impl<E: Lane + Eq> Eq for Vector<E> {}

impl<E: Lane + Eq + Hash> Hash for Vector<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.species.hash(state);
        self.lanes.hash(state);
    }
}

impl<E: Lane> fmt::Debug for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vector")
            .field("species", &self.species)
            .field("lanes", &&*self.lanes)
            .finish()
    }
}

impl<E: Lane> fmt::Display for Vector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, lane) in self.lanes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{lane}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_values_checks_length() {
        let species = Species::<i32>::S_128;
        assert!(Vector::from_values(species, &[1, 2, 3, 4]).is_ok());
        assert!(matches!(
            Vector::from_values(species, &[1, 2, 3]),
            Err(crate::LanewiseError::LengthMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn test_lane_access() {
        let v = Vector::from_values(Species::<i16>::S_64, &[7, 8, 9, 10]).unwrap();
        assert_eq!(v.lane(2).unwrap(), 9);
        assert!(v.lane(4).is_err());
        let w = v.with_lane(0, -1).unwrap();
        assert_eq!(w.to_array(), vec![-1, 8, 9, 10]);
        assert_eq!(v.to_array(), vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_equality_is_lanewise() {
        let species = Species::<f64>::S_128;
        let a = Vector::from_values(species, &[0.0, 1.0]).unwrap();
        let b = Vector::from_values(species, &[-0.0, 1.0]).unwrap();
        let nan = Vector::from_values(species, &[f64::NAN, 1.0]).unwrap();
        assert_eq!(a, b);
        assert_ne!(nan, nan.clone());
    }

    #[test]
    fn test_species_participates_in_equality_and_hash() {
        let narrow = Species::<i64>::S_128.iota();
        let also_narrow = Vector::from_values(Species::<i64>::S_128, &[0, 1]).unwrap();
        let mut set = HashSet::new();
        set.insert(narrow.clone());
        assert!(set.contains(&also_narrow));
        assert_ne!(Species::<i64>::S_256.zero().length(), narrow.length());
    }

    #[test]
    fn test_display() {
        let v = Vector::from_values(Species::<i32>::S_128, &[1, 2, 3, 4]).unwrap();
        assert_eq!(v.to_string(), "[1, 2, 3, 4]");
    }
}
