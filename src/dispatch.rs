//! Per-lane-type implementation cache.
//!
//! The first use of an operator on a lane type resolves its scalar kernel
//! through the [`Lane`] kernel resolvers and memoizes the result, including
//! the "not supported" outcome. Resolution is pure, so two threads racing on
//! an empty slot store equal values.

use std::sync::OnceLock;

use crate::lane::{BinaryFn, CompareFn, Lane, TernaryFn, TestFn, UnaryFn};
use crate::operators::{Binary, Comparison, Ternary, Test, Unary};

/// Lazily filled kernel table for one lane type.
pub struct OpCache<E: 'static> {
    unary: [OnceLock<Option<UnaryFn<E>>>; Unary::COUNT],
    binary: [OnceLock<Option<BinaryFn<E>>>; Binary::COUNT],
    ternary: [OnceLock<Option<TernaryFn<E>>>; Ternary::COUNT],
    compare: [OnceLock<Option<CompareFn<E>>>; Comparison::COUNT],
    test: [OnceLock<Option<TestFn<E>>>; Test::COUNT],
}

impl<E: 'static> OpCache<E> {
    pub const fn new() -> Self {
        Self {
            unary: [const { OnceLock::new() }; Unary::COUNT],
            binary: [const { OnceLock::new() }; Binary::COUNT],
            ternary: [const { OnceLock::new() }; Ternary::COUNT],
            compare: [const { OnceLock::new() }; Comparison::COUNT],
            test: [const { OnceLock::new() }; Test::COUNT],
        }
    }
}

impl<E: 'static> Default for OpCache<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Lane> OpCache<E> {
    pub fn unary(&self, op: Unary) -> Option<UnaryFn<E>> {
        *self.unary[op.index()].get_or_init(|| {
            log::trace!("resolving {op:?} kernel for {} lanes", E::LANE_TYPE);
            E::unary_kernel(op)
        })
    }

    pub fn binary(&self, op: Binary) -> Option<BinaryFn<E>> {
        *self.binary[op.index()].get_or_init(|| {
            log::trace!("resolving {op:?} kernel for {} lanes", E::LANE_TYPE);
            E::binary_kernel(op)
        })
    }

    pub fn ternary(&self, op: Ternary) -> Option<TernaryFn<E>> {
        *self.ternary[op.index()].get_or_init(|| {
            log::trace!("resolving {op:?} kernel for {} lanes", E::LANE_TYPE);
            E::ternary_kernel(op)
        })
    }

    pub fn compare(&self, op: Comparison) -> Option<CompareFn<E>> {
        *self.compare[op.index()].get_or_init(|| {
            log::trace!("resolving {op:?} comparison for {} lanes", E::LANE_TYPE);
            E::compare_kernel(op)
        })
    }

    pub fn test(&self, op: Test) -> Option<TestFn<E>> {
        *self.test[op.index()].get_or_init(|| {
            log::trace!("resolving {op:?} predicate for {} lanes", E::LANE_TYPE);
            E::test_kernel(op)
        })
    }
}
