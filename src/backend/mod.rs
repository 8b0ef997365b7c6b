//! Hardware execution backends.
//!
//! The vector engine offers every lane-wise operation to the active
//! [`ExecutionBackend`] first. A backend works on native-order byte views of
//! the operands and may decline any request by returning `false`, in which
//! case the portable scalar kernels run instead. Accepted requests must
//! produce exactly the bits the portable kernels would.
//!
//! Comparisons, reductions, blends and rearrangements have hooks too; they
//! decline by default so a backend only overrides what it accelerates.
//!
//! The backend is chosen once per process: the widest one compiled in (see
//! `build.rs`) whose CPU features are present at run time, else [`Portable`].

use std::fmt;
use std::sync::OnceLock;

use crate::error::{illegal_argument, Result};
use crate::lane::LaneType;
use crate::operators::{Associative, Binary, Comparison, Ternary, Unary};

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx2))]
mod avx2;
#[cfg(all(target_arch = "aarch64", neon))]
mod neon;

#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx2))]
pub use avx2::Avx2;
#[cfg(all(target_arch = "aarch64", neon))]
pub use neon::Neon;

/// A strategy that may execute lane-wise operations in hardware.
///
/// All slices of one request have the same length, which is the byte size of
/// the vector. `out` is only meaningful when the call returns `true`.
pub trait ExecutionBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn try_unary(&self, op: Unary, lane_type: LaneType, a: &[u8], out: &mut [u8]) -> bool;

    fn try_binary(
        &self,
        op: Binary,
        lane_type: LaneType,
        a: &[u8],
        b: &[u8],
        out: &mut [u8],
    ) -> bool;

    fn try_ternary(
        &self,
        op: Ternary,
        lane_type: LaneType,
        a: &[u8],
        b: &[u8],
        c: &[u8],
        out: &mut [u8],
    ) -> bool;

    /// One result bit per lane in `out`.
    fn try_compare(
        &self,
        _op: Comparison,
        _lane_type: LaneType,
        _a: &[u8],
        _b: &[u8],
        _out: &mut [bool],
    ) -> bool {
        false
    }

    /// Folds `a` into the single lane `out`, left to right from the identity.
    fn try_reduce(
        &self,
        _op: Associative,
        _lane_type: LaneType,
        _a: &[u8],
        _out: &mut [u8],
    ) -> bool {
        false
    }

    /// Lane `i` of `out` is taken from `b` where `mask[i]` is set, else from `a`.
    fn try_blend(
        &self,
        _lane_type: LaneType,
        _a: &[u8],
        _b: &[u8],
        _mask: &[bool],
        _out: &mut [u8],
    ) -> bool {
        false
    }

    /// Lane `i` of `out` is lane `indices[i]` of `a`; indices are in range.
    fn try_rearrange(
        &self,
        _lane_type: LaneType,
        _a: &[u8],
        _indices: &[i32],
        _out: &mut [u8],
    ) -> bool {
        false
    }
}

impl fmt::Debug for dyn ExecutionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionBackend({})", self.name())
    }
}

/// The backend that declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portable;

impl ExecutionBackend for Portable {
    fn name(&self) -> &'static str {
        "portable"
    }

    fn try_unary(&self, _op: Unary, _lane_type: LaneType, _a: &[u8], _out: &mut [u8]) -> bool {
        false
    }

    fn try_binary(
        &self,
        _op: Binary,
        _lane_type: LaneType,
        _a: &[u8],
        _b: &[u8],
        _out: &mut [u8],
    ) -> bool {
        false
    }

    fn try_ternary(
        &self,
        _op: Ternary,
        _lane_type: LaneType,
        _a: &[u8],
        _b: &[u8],
        _c: &[u8],
        _out: &mut [u8],
    ) -> bool {
        false
    }

    fn try_compare(
        &self,
        _op: Comparison,
        _lane_type: LaneType,
        _a: &[u8],
        _b: &[u8],
        _out: &mut [bool],
    ) -> bool {
        false
    }

    fn try_reduce(
        &self,
        _op: Associative,
        _lane_type: LaneType,
        _a: &[u8],
        _out: &mut [u8],
    ) -> bool {
        false
    }

    fn try_blend(
        &self,
        _lane_type: LaneType,
        _a: &[u8],
        _b: &[u8],
        _mask: &[bool],
        _out: &mut [u8],
    ) -> bool {
        false
    }

    fn try_rearrange(
        &self,
        _lane_type: LaneType,
        _a: &[u8],
        _indices: &[i32],
        _out: &mut [u8],
    ) -> bool {
        false
    }
}

static ACTIVE: OnceLock<&'static dyn ExecutionBackend> = OnceLock::new();

/// Every backend usable on this host, widest first. Always ends with
/// [`Portable`].
pub fn available() -> Vec<&'static dyn ExecutionBackend> {
    let mut backends: Vec<&'static dyn ExecutionBackend> = Vec::new();

    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), avx2))]
    if let Some(backend) = Avx2::detect() {
        backends.push(backend);
    }

    #[cfg(all(target_arch = "aarch64", neon))]
    if let Some(backend) = Neon::detect() {
        backends.push(backend);
    }

    backends.push(&Portable);
    backends
}

/// The backend every vector operation consults.
pub fn active() -> &'static dyn ExecutionBackend {
    *ACTIVE.get_or_init(|| {
        let backend = available()[0];
        log::debug!("selected {} execution backend", backend.name());
        backend
    })
}

/// Pins the execution backend. Must run before the first vector operation.
pub fn install(backend: &'static dyn ExecutionBackend) -> Result<()> {
    ACTIVE.set(backend).map_err(|_| {
        illegal_argument(format!(
            "execution backend already set to {}",
            active().name()
        ))
    })?;
    log::debug!("installed {} execution backend", backend.name());
    Ok(())
}
