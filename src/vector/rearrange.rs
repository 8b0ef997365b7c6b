//! Cross-lane rearrangement: shuffles, `select_from`, `slice` and `unslice`.

use crate::backend;
use crate::error::{illegal_argument, index_out_of_bounds, Result};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::shuffle::{lane_as_index, Shuffle};

use super::Vector;

impl<E: Lane> Vector<E> {
    /// Lane `i` of the result is `self[indices[i]]`. Every index must
    /// already be in `[0, length)`.
    pub(crate) fn rearrange_template(&self, indices: &[i32]) -> Self {
        let mut out = vec![E::zero(); self.length()];
        let accepted = backend::active().try_rearrange(
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            indices,
            bytemuck::cast_slice_mut(&mut out),
        );
        if accepted {
            return Self::from_lanes(self.species, out);
        }
        let lanes = indices
            .iter()
            .map(|&index| self.lanes[index as usize])
            .collect();
        Self::from_lanes(self.species, lanes)
    }

    fn check_origin(&self, origin: usize) -> Result<()> {
        if origin > self.length() {
            return Err(index_out_of_bounds(origin as i64, self.length() + 1));
        }
        Ok(())
    }

    /// Permutes lanes: lane `i` of the result is `self[shuffle.source(i)]`.
    ///
    /// Fails if any index of the shuffle is exceptional.
    pub fn rearrange(&self, shuffle: &Shuffle<E>) -> Result<Self> {
        self.species.check_species(shuffle.species())?;
        let shuffle = shuffle.check_indexes()?;
        Ok(self.rearrange_template(shuffle.indices()))
    }

    /// Permutes the set lanes of `mask` and zeroes the others.
    ///
    /// Unset lanes may carry exceptional indices; a set lane with an
    /// exceptional index is an error.
    pub fn rearrange_masked(&self, shuffle: &Shuffle<E>, mask: &Mask<E>) -> Result<Self> {
        self.species.check_species(shuffle.species())?;
        self.check_mask(mask)?;
        let invalid = mask.and_not(&shuffle.lane_is_valid())?;
        if let Some(lane) = invalid.first_true() {
            return Err(index_out_of_bounds(
                i64::from(shuffle.indices()[lane]),
                self.length(),
            ));
        }
        let lanes = shuffle
            .indices()
            .iter()
            .enumerate()
            .map(|(i, &index)| {
                if mask.bit(i) {
                    self.lanes[index as usize]
                } else {
                    E::zero()
                }
            })
            .collect();
        Ok(Self::from_lanes(self.species, lanes))
    }

    /// Two-operand permutation: valid indices read `self`, exceptional ones
    /// read `other` at the wrapped index.
    pub fn rearrange_with(&self, shuffle: &Shuffle<E>, other: &Self) -> Result<Self> {
        self.check_species(other)?;
        self.species.check_species(shuffle.species())?;
        let valid = shuffle.lane_is_valid();
        let wrapped = shuffle.wrap_indexes();
        let from_self = self.rearrange_template(wrapped.indices());
        let from_other = other.rearrange_template(wrapped.indices());
        from_other.blend(&from_self, &valid)
    }

    /// The lane values read as shuffle indices.
    pub fn to_shuffle(&self) -> Shuffle<E> {
        Shuffle::from_fn(self.species, |i| lane_as_index(self.lanes[i]))
    }

    /// Uses this vector's lanes as indices into `v`.
    pub fn select_from(&self, v: &Self) -> Result<Self> {
        v.rearrange(&self.to_shuffle())
    }

    pub fn select_from_masked(&self, v: &Self, mask: &Mask<E>) -> Result<Self> {
        v.rearrange_masked(&self.to_shuffle(), mask)
    }

    /// `length()` consecutive lanes of the concatenation `self ++ v`,
    /// starting at `origin`.
    pub fn slice(&self, origin: usize, v: &Self) -> Result<Self> {
        self.check_species(v)?;
        self.check_origin(origin)?;
        let length = self.length();
        let lanes = (0..length)
            .map(|i| {
                let j = i + origin;
                if j < length {
                    self.lanes[j]
                } else {
                    v.lanes[j - length]
                }
            })
            .collect();
        Ok(Self::from_lanes(self.species, lanes))
    }

    /// [`Vector::slice`] against the zero vector: shifts lanes down by
    /// `origin` and fills with zero.
    pub fn slice_zero(&self, origin: usize) -> Result<Self> {
        self.slice(origin, &self.species.zero())
    }

    /// Inverse of [`Vector::slice`]: inserts this vector into part `part` of
    /// the concatenation `w ++ w` at `origin` and returns that part.
    ///
    /// Part 0 receives lanes `origin..` and keeps `w` below `origin`; part 1
    /// receives the remaining lanes and keeps `w` from `origin` on.
    pub fn unslice(&self, origin: usize, w: &Self, part: usize) -> Result<Self> {
        self.check_species(w)?;
        self.check_origin(origin)?;
        if part > 1 {
            return Err(illegal_argument(format!("unslice part must be 0 or 1, got {part}")));
        }
        let length = self.length();
        let lanes = (0..length)
            .map(|i| {
                let inserted = if part == 0 { i >= origin } else { i < origin };
                if inserted {
                    self.lanes[(i + length - origin) % length]
                } else {
                    w.lanes[i]
                }
            })
            .collect();
        Ok(Self::from_lanes(self.species, lanes))
    }
}
