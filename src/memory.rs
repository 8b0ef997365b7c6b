//! Loads and stores between vectors and caller memory.
//!
//! Every public entry point checks bounds (and the byte order) up front and
//! then runs an unchecked core that works in native byte order. Plain
//! operations check the whole lane range once; masked and indexed
//! operations check only the set lanes, and never read or write an unset
//! lane, neither in the index map nor in the data.
//!
//! Byte-oriented operations place lane `i` at bytes
//! `[offset + i * size, offset + (i + 1) * size)` in the requested order,
//! little-endian unless told otherwise.

use crate::error::{index_out_of_bounds, range_out_of_bounds, LanewiseError, Result};
use crate::lane::Lane;
use crate::mask::Mask;
use crate::shuffle::Shuffle;
use crate::species::Species;
use crate::vector::Vector;

/// Byte order of lanes stored in byte arrays and buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// The byte order of the host.
    pub const fn native() -> ByteOrder {
        if cfg!(target_endian = "little") {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    pub const fn is_native(self) -> bool {
        matches!(
            (self, ByteOrder::native()),
            (ByteOrder::LittleEndian, ByteOrder::LittleEndian)
                | (ByteOrder::BigEndian, ByteOrder::BigEndian)
        )
    }
}

/// An owned byte region with a limit and an optional read-only flag.
///
/// Loads and stores may only touch bytes below the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
    limit: usize,
    read_only: bool,
}

impl ByteBuffer {
    /// A zero-filled writable buffer of `capacity` bytes.
    pub fn allocate(capacity: usize) -> Self {
        Self::wrap(vec![0; capacity])
    }

    /// A writable buffer over `bytes`, limited to their full length.
    pub fn wrap(bytes: Vec<u8>) -> Self {
        let limit = bytes.len();
        Self {
            bytes,
            limit,
            read_only: false,
        }
    }

    /// A read-only copy of this buffer.
    pub fn as_read_only(&self) -> Self {
        Self {
            read_only: true,
            ..self.clone()
        }
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity() {
            return Err(index_out_of_bounds(limit as i64, self.capacity() + 1));
        }
        self.limit = limit;
        Ok(())
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The bytes below the limit.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.limit]
    }

    fn writable(&mut self) -> Result<&mut [u8]> {
        if self.read_only {
            return Err(LanewiseError::ReadOnlyBuffer);
        }
        Ok(&mut self.bytes[..self.limit])
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}

fn check_range(offset: usize, size: usize, length: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= length => Ok(()),
        _ => Err(range_out_of_bounds(offset, size, length)),
    }
}

/// `offset + delta` for error payloads, saturating at the `i64` range.
fn reported_index(offset: usize, delta: i64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX).saturating_add(delta)
}

/// Element index `offset + i` of a set lane, checked against `length`.
fn checked_lane_index(offset: usize, i: usize, length: usize) -> Result<usize> {
    match offset.checked_add(i) {
        Some(index) if index < length => Ok(index),
        _ => Err(index_out_of_bounds(
            reported_index(offset, i64::try_from(i).unwrap_or(i64::MAX)),
            length,
        )),
    }
}

/// Effective element index of lane `i` of an indexed access.
fn gather_index(
    offset: usize,
    index_map: &[i32],
    map_offset: usize,
    i: usize,
    length: usize,
) -> Result<usize> {
    let slot = checked_lane_index(map_offset, i, index_map.len())?;
    let delta = i64::from(index_map[slot]);
    let index = i64::try_from(offset)
        .ok()
        .and_then(|offset| offset.checked_add(delta))
        .and_then(|index| usize::try_from(index).ok())
        .filter(|&index| index < length);
    index.ok_or_else(|| index_out_of_bounds(reported_index(offset, delta), length))
}

impl<E: Lane> Vector<E> {
    /// Loads `species.length()` lanes from `array[offset..]`.
    pub fn from_array(species: Species<E>, array: &[E], offset: usize) -> Result<Self> {
        let length = species.length();
        check_range(offset, length, array.len())?;
        Ok(Self::from_lanes(species, array[offset..offset + length].to_vec()))
    }

    /// Loads the set lanes of `mask`; unset lanes are zero and may lie
    /// outside the array.
    pub fn from_array_masked(
        species: Species<E>,
        array: &[E],
        offset: usize,
        mask: &Mask<E>,
    ) -> Result<Self> {
        species.check_species(mask.species())?;
        let lanes = (0..species.length())
            .map(|i| {
                if mask.bit(i) {
                    Ok(array[checked_lane_index(offset, i, array.len())?])
                } else {
                    Ok(E::zero())
                }
            })
            .collect::<Result<Vec<E>>>()?;
        Ok(Self::from_lanes(species, lanes))
    }

    /// Gathers lane `i` from `array[offset + index_map[map_offset + i]]`.
    pub fn from_array_indexed(
        species: Species<E>,
        array: &[E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<Self> {
        check_range(map_offset, species.length(), index_map.len())?;
        let lanes = (0..species.length())
            .map(|i| Ok(array[gather_index(offset, index_map, map_offset, i, array.len())?]))
            .collect::<Result<Vec<E>>>()?;
        Ok(Self::from_lanes(species, lanes))
    }

    /// Gathers the set lanes of `mask`. Unset lanes are zero; neither their
    /// index map entry nor their array element is read.
    pub fn from_array_indexed_masked(
        species: Species<E>,
        array: &[E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        mask: &Mask<E>,
    ) -> Result<Self> {
        species.check_species(mask.species())?;
        let lanes = (0..species.length())
            .map(|i| {
                if mask.bit(i) {
                    Ok(array[gather_index(offset, index_map, map_offset, i, array.len())?])
                } else {
                    Ok(E::zero())
                }
            })
            .collect::<Result<Vec<E>>>()?;
        Ok(Self::from_lanes(species, lanes))
    }

    /// Loads lanes from raw bytes in `order`.
    pub fn from_byte_array(
        species: Species<E>,
        bytes: &[u8],
        offset: usize,
        order: ByteOrder,
    ) -> Result<Self> {
        let size = species.vector_byte_size();
        check_range(offset, size, bytes.len())?;
        let native = Self::from_lanes(
            species,
            bytemuck::pod_collect_to_vec(&bytes[offset..offset + size]),
        );
        Ok(native.to_byte_order(order))
    }

    /// Loads the set lanes of `mask` from raw bytes; unset lanes are zero and
    /// are not bounds-checked.
    pub fn from_byte_array_masked(
        species: Species<E>,
        bytes: &[u8],
        offset: usize,
        order: ByteOrder,
        mask: &Mask<E>,
    ) -> Result<Self> {
        species.check_species(mask.species())?;
        let lane_size = E::LANE_TYPE.byte_size();
        let lanes = (0..species.length())
            .map(|i| {
                if !mask.bit(i) {
                    return Ok(E::zero());
                }
                let start = offset
                    .checked_add(i * lane_size)
                    .ok_or_else(|| range_out_of_bounds(offset, (i + 1) * lane_size, bytes.len()))?;
                check_range(start, lane_size, bytes.len())?;
                Ok(bytemuck::pod_read_unaligned(&bytes[start..start + lane_size]))
            })
            .collect::<Result<Vec<E>>>()?;
        Ok(Self::from_lanes(species, lanes).to_byte_order(order))
    }

    /// Loads lanes from the bytes of `buffer` below its limit.
    pub fn from_byte_buffer(
        species: Species<E>,
        buffer: &ByteBuffer,
        offset: usize,
        order: ByteOrder,
    ) -> Result<Self> {
        Self::from_byte_array(species, buffer.as_slice(), offset, order)
    }

    pub fn from_byte_buffer_masked(
        species: Species<E>,
        buffer: &ByteBuffer,
        offset: usize,
        order: ByteOrder,
        mask: &Mask<E>,
    ) -> Result<Self> {
        Self::from_byte_array_masked(species, buffer.as_slice(), offset, order, mask)
    }

    /// Stores every lane to `array[offset..]`.
    pub fn into_array(&self, array: &mut [E], offset: usize) -> Result<()> {
        let length = self.length();
        check_range(offset, length, array.len())?;
        array[offset..offset + length].copy_from_slice(self.as_slice());
        Ok(())
    }

    /// Stores the set lanes of `mask`. Nothing is written unless every set
    /// lane is in bounds.
    pub fn into_array_masked(&self, array: &mut [E], offset: usize, mask: &Mask<E>) -> Result<()> {
        self.check_mask(mask)?;
        let targets = (0..self.length())
            .filter(|&i| mask.bit(i))
            .map(|i| Ok((i, checked_lane_index(offset, i, array.len())?)))
            .collect::<Result<Vec<(usize, usize)>>>()?;
        for (i, index) in targets {
            array[index] = self.as_slice()[i];
        }
        Ok(())
    }

    /// Scatters lane `i` to `array[offset + index_map[map_offset + i]]`.
    ///
    /// Lanes are written in increasing lane order, so a later lane wins when
    /// two lanes map to the same element.
    pub fn into_array_indexed(
        &self,
        array: &mut [E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
    ) -> Result<()> {
        check_range(map_offset, self.length(), index_map.len())?;
        let targets = (0..self.length())
            .map(|i| gather_index(offset, index_map, map_offset, i, array.len()))
            .collect::<Result<Vec<usize>>>()?;
        for (&lane, index) in self.as_slice().iter().zip(targets) {
            array[index] = lane;
        }
        Ok(())
    }

    /// Scatters the set lanes of `mask`; unset lanes read no index map entry
    /// and write nothing.
    pub fn into_array_indexed_masked(
        &self,
        array: &mut [E],
        offset: usize,
        index_map: &[i32],
        map_offset: usize,
        mask: &Mask<E>,
    ) -> Result<()> {
        self.check_mask(mask)?;
        let targets = (0..self.length())
            .filter(|&i| mask.bit(i))
            .map(|i| Ok((i, gather_index(offset, index_map, map_offset, i, array.len())?)))
            .collect::<Result<Vec<(usize, usize)>>>()?;
        for (i, index) in targets {
            array[index] = self.as_slice()[i];
        }
        Ok(())
    }

    /// Stores every lane as raw bytes in `order`.
    pub fn into_byte_array(&self, bytes: &mut [u8], offset: usize, order: ByteOrder) -> Result<()> {
        let size = self.byte_size();
        check_range(offset, size, bytes.len())?;
        let ordered = self.to_byte_order(order);
        bytes[offset..offset + size].copy_from_slice(bytemuck::cast_slice(ordered.as_slice()));
        Ok(())
    }

    /// Stores the set lanes of `mask` as raw bytes; unset lanes leave their
    /// bytes untouched and are not bounds-checked.
    pub fn into_byte_array_masked(
        &self,
        bytes: &mut [u8],
        offset: usize,
        order: ByteOrder,
        mask: &Mask<E>,
    ) -> Result<()> {
        self.check_mask(mask)?;
        let lane_size = E::LANE_TYPE.byte_size();
        let targets = (0..self.length())
            .filter(|&i| mask.bit(i))
            .map(|i| {
                let start = offset
                    .checked_add(i * lane_size)
                    .ok_or_else(|| range_out_of_bounds(offset, (i + 1) * lane_size, bytes.len()))?;
                check_range(start, lane_size, bytes.len())?;
                Ok((i, start))
            })
            .collect::<Result<Vec<(usize, usize)>>>()?;
        let ordered = self.to_byte_order(order);
        for (i, start) in targets {
            bytes[start..start + lane_size]
                .copy_from_slice(bytemuck::bytes_of(&ordered.as_slice()[i]));
        }
        Ok(())
    }

    /// Stores every lane into `buffer` below its limit.
    pub fn into_byte_buffer(
        &self,
        buffer: &mut ByteBuffer,
        offset: usize,
        order: ByteOrder,
    ) -> Result<()> {
        self.into_byte_array(buffer.writable()?, offset, order)
    }

    pub fn into_byte_buffer_masked(
        &self,
        buffer: &mut ByteBuffer,
        offset: usize,
        order: ByteOrder,
        mask: &Mask<E>,
    ) -> Result<()> {
        self.into_byte_array_masked(buffer.writable()?, offset, order, mask)
    }

    /// [`Vector::from_byte_array`] in the default byte order.
    pub fn from_byte_array_le(species: Species<E>, bytes: &[u8], offset: usize) -> Result<Self> {
        Self::from_byte_array(species, bytes, offset, ByteOrder::default())
    }

    /// [`Vector::into_byte_array`] in the default byte order.
    pub fn into_byte_array_le(&self, bytes: &mut [u8], offset: usize) -> Result<()> {
        self.into_byte_array(bytes, offset, ByteOrder::default())
    }

    pub fn from_byte_buffer_le(
        species: Species<E>,
        buffer: &ByteBuffer,
        offset: usize,
    ) -> Result<Self> {
        Self::from_byte_buffer(species, buffer, offset, ByteOrder::default())
    }

    pub fn into_byte_buffer_le(&self, buffer: &mut ByteBuffer, offset: usize) -> Result<()> {
        self.into_byte_buffer(buffer, offset, ByteOrder::default())
    }

    /// Converts between native order and `order`; the conversion is its own
    /// inverse.
    fn to_byte_order(&self, order: ByteOrder) -> Self {
        if order.is_native() {
            self.clone()
        } else {
            self.reverse_lane_bytes()
        }
    }

    /// Reverses the bytes inside every lane with a cross-lane shuffle of the
    /// byte view.
    pub(crate) fn reverse_lane_bytes(&self) -> Self {
        let size = E::LANE_TYPE.byte_size();
        if size == 1 {
            return self.clone();
        }
        let bytes = self.reinterpret_as_bytes();
        let swap = Shuffle::from_fn(bytes.species(), |i| {
            ((i / size) * size + (size - 1 - i % size)) as i32
        });
        bytes.rearrange_template(swap.indices()).reinterpret_as::<E>()
    }
}
