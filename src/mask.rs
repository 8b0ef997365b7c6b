//! Lane masks.
//!
//! A [`Mask`] holds one boolean per lane of its species and predicates
//! lane-wise operations (unset lanes keep the receiver's value) and memory
//! operations (unset lanes are neither read, written nor bounds-checked).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{index_out_of_bounds, range_out_of_bounds, Result};
use crate::lane::Lane;
use crate::species::Species;
use crate::vector::Vector;

/// An immutable per-lane predicate tied to a species.
pub struct Mask<E> {
    species: Species<E>,
    bits: Arc<[bool]>,
}

impl<E> Clone for Mask<E> {
    fn clone(&self) -> Self {
        Self {
            species: self.species,
            bits: Arc::clone(&self.bits),
        }
    }
}

impl<E: Lane> Mask<E> {
    pub(crate) fn from_bits(species: Species<E>, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), species.length(), "bit count must match species");
        Self {
            species,
            bits: bits.into(),
        }
    }

    /// A mask holding exactly `bits`.
    pub fn from_values(species: Species<E>, bits: &[bool]) -> Result<Self> {
        species.check_length(bits.len())?;
        Ok(Self::from_bits(species, bits.to_vec()))
    }

    /// A mask read from `bits[offset..offset + length]`.
    pub fn from_array(species: Species<E>, bits: &[bool], offset: usize) -> Result<Self> {
        let length = species.length();
        let end = offset
            .checked_add(length)
            .filter(|&end| end <= bits.len())
            .ok_or_else(|| range_out_of_bounds(offset, length, bits.len()))?;
        Ok(Self::from_bits(species, bits[offset..end].to_vec()))
    }

    /// A mask whose lane `i` is bit `i` of `bits`. Bits past the lane count
    /// are ignored.
    pub fn from_long(species: Species<E>, bits: u64) -> Self {
        let lanes = (0..species.length())
            .map(|i| i < 64 && (bits >> i) & 1 == 1)
            .collect();
        Self::from_bits(species, lanes)
    }

    pub fn species(&self) -> Species<E> {
        self.species
    }

    pub fn length(&self) -> usize {
        self.bits.len()
    }

    #[inline(always)]
    pub(crate) fn bit(&self, i: usize) -> bool {
        self.bits[i]
    }

    pub(crate) fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Whether lane `i` is set.
    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        self.bits
            .get(i)
            .copied()
            .ok_or_else(|| index_out_of_bounds(i as i64, self.length()))
    }

    fn combine(&self, other: &Self, f: impl Fn(bool, bool) -> bool) -> Result<Self> {
        self.species.check_species(other.species)?;
        let bits = self
            .bits
            .iter()
            .zip(other.bits.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self::from_bits(self.species, bits))
    }

    pub fn and(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a ^ b)
    }

    /// Lanes set here and unset in `other`.
    pub fn and_not(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a & !b)
    }

    /// Lanes where both masks agree.
    pub fn lanes_eq(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a == b)
    }

    pub fn not(&self) -> Self {
        Self::from_bits(self.species, self.bits.iter().map(|&bit| !bit).collect())
    }

    pub fn any_true(&self) -> bool {
        self.bits.iter().any(|&bit| bit)
    }

    pub fn all_true(&self) -> bool {
        self.bits.iter().all(|&bit| bit)
    }

    pub fn true_count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    /// Index of the lowest set lane.
    pub fn first_true(&self) -> Option<usize> {
        self.bits.iter().position(|&bit| bit)
    }

    /// Index of the highest set lane.
    pub fn last_true(&self) -> Option<usize> {
        self.bits.iter().rposition(|&bit| bit)
    }

    pub fn to_array(&self) -> Vec<bool> {
        self.bits.to_vec()
    }

    /// Lane `i` as bit `i`. Species hold at most 64 lanes.
    pub fn to_long(&self) -> u64 {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit)
            .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
    }

    /// This mask restricted to lanes `i` with `offset + i < limit`.
    pub fn index_in_range(&self, offset: usize, limit: usize) -> Self {
        let in_range = self.species.index_in_range(offset, limit);
        let bits = self
            .bits
            .iter()
            .zip(in_range.bits.iter())
            .map(|(&a, &b)| a & b)
            .collect();
        Self::from_bits(self.species, bits)
    }

    /// The same bits under a species of another lane type with the same lane
    /// count.
    pub fn cast<F: Lane>(&self, species: Species<F>) -> Result<Mask<F>> {
        species.check_length(self.length())?;
        Ok(Mask::from_bits(species, self.bits.to_vec()))
    }

    /// A vector with all bits set in set lanes and zero elsewhere.
    pub fn to_vector(&self) -> Vector<E> {
        let lanes = self
            .bits
            .iter()
            .map(|&bit| if bit { E::all_ones() } else { E::zero() })
            .collect();
        Vector::from_lanes(self.species, lanes)
    }
}

impl<E> PartialEq for Mask<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.bits == other.bits
    }
}

impl<E> Eq for Mask<E> {}

impl<E: Lane> Hash for Mask<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.species.hash(state);
        self.bits.hash(state);
    }
}

impl<E: Lane> fmt::Debug for Mask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self)
    }
}

impl<E: Lane> fmt::Display for Mask<E> {
    /// `T` for set lanes, `.` for unset ones.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mask[")?;
        for &bit in self.bits.iter() {
            f.write_str(if bit { "T" } else { "." })?;
        }
        f.write_str("]")
    }
}
