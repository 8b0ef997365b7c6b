//! Lane shuffles.
//!
//! A [`Shuffle`] stores one source index per lane, always within
//! `[-length, length)`. Indices in `[0, length)` select a lane of the
//! rearranged operand. A negative index is *exceptional*: construction maps
//! an out-of-range index `i` to `i.rem_euclid(length) - length`, so adding
//! `length` back recovers the wrapped index.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{illegal_argument, index_out_of_bounds, range_out_of_bounds, Result};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::species::Species;
use crate::vector::Vector;

/// Maps `index` into `[-length, length)`, keeping valid indices unchanged.
#[inline]
pub(crate) fn partially_wrap(index: i32, length: usize) -> i32 {
    let n = length as i32;
    if (0..n).contains(&index) {
        index
    } else {
        index.rem_euclid(n) - n
    }
}

/// Lane value read as a lane index, with primitive cast semantics.
#[inline]
pub(crate) fn lane_as_index<E: Lane>(lane: E) -> i32 {
    if E::LANE_TYPE.is_floating() {
        lane.to_f64() as i32
    } else {
        lane.to_i64() as i32
    }
}

/// An immutable lane permutation tied to a species.
pub struct Shuffle<E> {
    species: Species<E>,
    indices: Arc<[i32]>,
}

impl<E> Clone for Shuffle<E> {
    fn clone(&self) -> Self {
        Self {
            species: self.species,
            indices: Arc::clone(&self.indices),
        }
    }
}

impl<E: Lane> Shuffle<E> {
    /// Wraps indices that are already in `[-length, length)`.
    pub(crate) fn from_wrapped(species: Species<E>, indices: Vec<i32>) -> Self {
        debug_assert_eq!(indices.len(), species.length(), "index count must match species");
        Self {
            species,
            indices: indices.into(),
        }
    }

    /// Builds a shuffle lane by lane from `f(i)`.
    pub fn from_fn(species: Species<E>, f: impl Fn(usize) -> i32) -> Self {
        let length = species.length();
        let indices = (0..length).map(|i| partially_wrap(f(i), length)).collect();
        Self::from_wrapped(species, indices)
    }

    /// A shuffle holding `indices`, partially wrapped.
    pub fn from_values(species: Species<E>, indices: &[i32]) -> Result<Self> {
        species.check_length(indices.len())?;
        Ok(Self::from_fn(species, |i| indices[i]))
    }

    /// A shuffle read from `indices[offset..offset + length]`.
    pub fn from_array(species: Species<E>, indices: &[i32], offset: usize) -> Result<Self> {
        let length = species.length();
        if offset.checked_add(length).map_or(true, |end| end > indices.len()) {
            return Err(range_out_of_bounds(offset, length, indices.len()));
        }
        Ok(Self::from_fn(species, |i| indices[offset + i]))
    }

    /// The shuffle `start, start + step, start + 2 * step, ...`.
    ///
    /// With `wrap` every index is reduced modulo the lane count; without it
    /// indices outside `[0, length)` become exceptional.
    pub fn iota(species: Species<E>, start: i32, step: i32, wrap: bool) -> Self {
        let length = species.length();
        let n = length as i32;
        let indices = (0..length)
            .map(|i| {
                let index = start.wrapping_add((i as i32).wrapping_mul(step));
                if wrap {
                    index.rem_euclid(n)
                } else {
                    partially_wrap(index, length)
                }
            })
            .collect();
        Self::from_wrapped(species, indices)
    }

    /// Interleaves half `part` (0 or 1) of two vectors when used with
    /// [`Vector::rearrange_with`]: lanes alternate between the receiver and
    /// the second operand.
    pub fn make_zip(species: Species<E>, part: usize) -> Result<Self> {
        if part > 1 {
            return Err(illegal_argument(format!("zip part must be 0 or 1, got {part}")));
        }
        let length = species.length();
        let offset = part * length / 2;
        Ok(Self::from_fn(species, |i| (i / 2 + offset + length * (i % 2)) as i32))
    }

    /// Collects the even (`part == 0`) or odd (`part == 1`) lanes of the
    /// receiver followed by those of the second operand.
    pub fn make_unzip(species: Species<E>, part: usize) -> Result<Self> {
        if part > 1 {
            return Err(illegal_argument(format!("unzip part must be 0 or 1, got {part}")));
        }
        Ok(Self::from_fn(species, |i| (i * 2 + part) as i32))
    }

    pub fn species(&self) -> Species<E> {
        self.species
    }

    pub fn length(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn indices(&self) -> &[i32] {
        &self.indices
    }

    /// Source index of lane `i`.
    pub fn source(&self, i: usize) -> Result<i32> {
        self.indices
            .get(i)
            .copied()
            .ok_or_else(|| index_out_of_bounds(i as i64, self.length()))
    }

    pub fn to_array(&self) -> Vec<i32> {
        self.indices.to_vec()
    }

    /// Fails on the first exceptional index, otherwise returns the shuffle.
    pub fn check_indexes(&self) -> Result<Self> {
        match self.indices.iter().find(|&&index| index < 0) {
            Some(&index) => Err(index_out_of_bounds(i64::from(index), self.length())),
            None => Ok(self.clone()),
        }
    }

    /// Replaces every exceptional index by its wrapped value.
    pub fn wrap_indexes(&self) -> Self {
        let n = self.length() as i32;
        let indices = self
            .indices
            .iter()
            .map(|&index| if index < 0 { index + n } else { index })
            .collect();
        Self::from_wrapped(self.species, indices)
    }

    /// Set for lanes whose index is not exceptional.
    pub fn lane_is_valid(&self) -> Mask<E> {
        Mask::from_bits(self.species, self.indices.iter().map(|&index| index >= 0).collect())
    }

    /// Composition: lane `i` of the result is `self.source(other.source(i))`.
    pub fn rearrange(&self, other: &Self) -> Result<Self> {
        self.species.check_species(other.species)?;
        let other = other.check_indexes()?;
        let indices = other
            .indices
            .iter()
            .map(|&index| self.indices[index as usize])
            .collect();
        Ok(Self::from_wrapped(self.species, indices))
    }

    /// The same indices under a species of another lane type with the same
    /// lane count.
    pub fn cast<F: Lane>(&self, species: Species<F>) -> Result<Shuffle<F>> {
        species.check_length(self.length())?;
        Ok(Shuffle::from_wrapped(species, self.indices.to_vec()))
    }

    /// The indices as lane values.
    pub fn to_vector(&self) -> Vector<E> {
        let lanes = self
            .indices
            .iter()
            .map(|&index| E::from_i64(i64::from(index)))
            .collect();
        Vector::from_lanes(self.species, lanes)
    }
}

impl<E> PartialEq for Shuffle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.species == other.species && self.indices == other.indices
    }
}

impl<E> Eq for Shuffle<E> {}

impl<E: Lane> Hash for Shuffle<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.species.hash(state);
        self.indices.hash(state);
    }
}

impl<E: Lane> fmt::Debug for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.species, self)
    }
}

impl<E: Lane> fmt::Display for Shuffle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Shuffle[")?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}
