//! Slice helpers built on the vector engine.
//!
//! Each helper walks its slices one full vector at a time up to
//! [`Species::loop_bound`] and handles the remainder with a masked tail
//! (`index_in_range`), so slices of any length work with any species.
//! The `par_*` variants split the slices into chunks of whole vectors and
//! process the chunks on the rayon thread pool.

use rayon::prelude::*;

use crate::error::{length_mismatch, unsupported, Result};
use crate::lane::Lane;
use crate::operators::{Associative, Binary, Unary};
use crate::species::Species;
use crate::vector::Vector;
use crate::{PARALLEL_CHUNK_SIZE, PARALLEL_THRESHOLD};

fn check_same_length(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(length_mismatch(expected, found));
    }
    Ok(())
}

/// Elements per parallel chunk, rounded down to whole vectors.
fn chunk_len<E: Lane>(species: Species<E>) -> usize {
    let step = species.length();
    ((PARALLEL_CHUNK_SIZE / step) * step).max(step)
}

/// `out[i] = a[i] op b[i]` for every index.
pub fn lanewise_slices<E: Lane>(
    species: Species<E>,
    op: Binary,
    a: &[E],
    b: &[E],
    out: &mut [E],
) -> Result<()> {
    check_same_length(a.len(), b.len())?;
    check_same_length(a.len(), out.len())?;

    let step = species.length();
    let bound = species.loop_bound(a.len());
    for i in (0..bound).step_by(step) {
        let va = Vector::from_array(species, a, i)?;
        let vb = Vector::from_array(species, b, i)?;
        va.lanewise(op, &vb)?.into_array(out, i)?;
    }

    if bound < a.len() {
        let tail = species.index_in_range(bound, a.len());
        let va = Vector::from_array_masked(species, a, bound, &tail)?;
        let vb = Vector::from_array_masked(species, b, bound, &tail)?;
        va.lanewise_masked(op, &vb, &tail)?
            .into_array_masked(out, bound, &tail)?;
    }
    Ok(())
}

/// `out[i] = op(a[i])` for every index.
pub fn unary_slices<E: Lane>(species: Species<E>, op: Unary, a: &[E], out: &mut [E]) -> Result<()> {
    check_same_length(a.len(), out.len())?;

    let step = species.length();
    let bound = species.loop_bound(a.len());
    for i in (0..bound).step_by(step) {
        Vector::from_array(species, a, i)?
            .lanewise_unary(op)?
            .into_array(out, i)?;
    }

    if bound < a.len() {
        let tail = species.index_in_range(bound, a.len());
        Vector::from_array_masked(species, a, bound, &tail)?
            .lanewise_unary_masked(op, &tail)?
            .into_array_masked(out, bound, &tail)?;
    }
    Ok(())
}

/// Folds every element of `a` with `op`.
///
/// Each vector is reduced on its own and the partial results are folded
/// in slice order, so the grouping of floating sums depends on the species.
pub fn reduce_slice<E: Lane>(species: Species<E>, op: Associative, a: &[E]) -> Result<E> {
    let kernel = E::op_cache()
        .binary(op.binary())
        .ok_or_else(|| unsupported(op, E::LANE_TYPE))?;

    let step = species.length();
    let bound = species.loop_bound(a.len());
    let mut acc = crate::vector::identity::<E>(op);
    for i in (0..bound).step_by(step) {
        acc = kernel(acc, Vector::from_array(species, a, i)?.reduce_lanes(op)?);
    }

    if bound < a.len() {
        let tail = species.index_in_range(bound, a.len());
        let partial = Vector::from_array_masked(species, a, bound, &tail)?
            .reduce_lanes_masked(op, &tail)?;
        acc = kernel(acc, partial);
    }
    Ok(acc)
}

/// Parallel [`lanewise_slices`]. Small inputs run sequentially.
pub fn par_lanewise_slices<E: Lane>(
    species: Species<E>,
    op: Binary,
    a: &[E],
    b: &[E],
    out: &mut [E],
) -> Result<()> {
    if a.len() <= PARALLEL_THRESHOLD {
        return lanewise_slices(species, op, a, b, out);
    }
    check_same_length(a.len(), b.len())?;
    check_same_length(a.len(), out.len())?;

    let chunk = chunk_len(species);
    out.par_chunks_mut(chunk)
        .zip(a.par_chunks(chunk))
        .zip(b.par_chunks(chunk))
        .try_for_each(|((out_chunk, a_chunk), b_chunk)| {
            lanewise_slices(species, op, a_chunk, b_chunk, out_chunk)
        })
}

/// Parallel [`unary_slices`]. Small inputs run sequentially.
pub fn par_unary_slices<E: Lane>(
    species: Species<E>,
    op: Unary,
    a: &[E],
    out: &mut [E],
) -> Result<()> {
    if a.len() <= PARALLEL_THRESHOLD {
        return unary_slices(species, op, a, out);
    }
    check_same_length(a.len(), out.len())?;

    let chunk = chunk_len(species);
    out.par_chunks_mut(chunk)
        .zip(a.par_chunks(chunk))
        .try_for_each(|(out_chunk, a_chunk)| unary_slices(species, op, a_chunk, out_chunk))
}

/// Parallel [`reduce_slice`]. Chunk results are folded in slice order, so
/// the result does not depend on thread scheduling.
pub fn par_reduce_slice<E: Lane>(species: Species<E>, op: Associative, a: &[E]) -> Result<E> {
    if a.len() <= PARALLEL_THRESHOLD {
        return reduce_slice(species, op, a);
    }
    let kernel = E::op_cache()
        .binary(op.binary())
        .ok_or_else(|| unsupported(op, E::LANE_TYPE))?;

    let partials = a
        .par_chunks(chunk_len(species))
        .map(|chunk| reduce_slice(species, op, chunk))
        .collect::<Result<Vec<E>>>()?;
    Ok(partials
        .into_iter()
        .fold(crate::vector::identity::<E>(op), kernel))
}
