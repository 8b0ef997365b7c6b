//! Shape registry.
//!
//! A [`VectorShape`] is a total vector bit width, independent of the lane
//! type. `SMax` stands for the widest width the host supports; its size and
//! the preferred shape are detected once per process.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{illegal_argument, Result};
use crate::lane::LaneType;

/// Total bit width of a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorShape {
    S64,
    S128,
    S256,
    S512,
    /// The widest shape the host supports for every lane type.
    SMax,
}

/// Width used when the host reports no vector support at all.
const DEFAULT_MAX_BITS: usize = 64;

// 0 means "not detected yet". Racing initializers compute the same value, so
// a plain store is enough.
static MAX_BITS: AtomicUsize = AtomicUsize::new(0);

fn detect_max_bits() -> usize {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        // Byte and short lanes need avx512bw on top of avx512f.
        if is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw") {
            return 512;
        }
        if is_x86_feature_detected!("avx2") {
            return 256;
        }
        if is_x86_feature_detected!("sse2") {
            return 128;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        return 128;
    }

    #[allow(unreachable_code)]
    DEFAULT_MAX_BITS
}

/// The widest vector bit width available for every lane type on this host.
pub fn max_bit_size() -> usize {
    let cached = MAX_BITS.load(Ordering::Relaxed);
    if cached != 0 {
        return cached;
    }

    let detected = detect_max_bits();
    MAX_BITS.store(detected, Ordering::Relaxed);
    log::debug!("detected maximum vector width: {detected} bits");
    detected
}

impl VectorShape {
    /// Every shape, fixed widths first.
    pub const ALL: [VectorShape; 5] = [
        VectorShape::S64,
        VectorShape::S128,
        VectorShape::S256,
        VectorShape::S512,
        VectorShape::SMax,
    ];

    /// Number of shapes, used to size per-shape caches.
    pub const COUNT: usize = 5;

    /// Slot index used by per-shape caches.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Total width in bits.
    pub fn bit_size(self) -> usize {
        match self {
            VectorShape::S64 => 64,
            VectorShape::S128 => 128,
            VectorShape::S256 => 256,
            VectorShape::S512 => 512,
            VectorShape::SMax => max_bit_size(),
        }
    }

    /// Total width in bytes.
    pub fn byte_size(self) -> usize {
        self.bit_size() / 8
    }

    /// Number of lanes of `lane_type` that fit in this shape.
    pub fn lane_count(self, lane_type: LaneType) -> usize {
        self.bit_size() / lane_type.bit_size()
    }

    /// The fixed shape of the given width.
    pub fn for_bit_size(bits: usize) -> Result<VectorShape> {
        match bits {
            64 => Ok(VectorShape::S64),
            128 => Ok(VectorShape::S128),
            256 => Ok(VectorShape::S256),
            512 => Ok(VectorShape::S512),
            _ => Err(illegal_argument(format!("no vector shape of {bits} bits"))),
        }
    }

    /// The fixed shape matching the widest width every lane type supports.
    pub fn preferred() -> VectorShape {
        VectorShape::for_bit_size(max_bit_size()).unwrap_or(VectorShape::S64)
    }
}

impl fmt::Display for VectorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorShape::SMax => write!(f, "S_Max_BIT"),
            shape => write!(f, "S_{}_BIT", shape.bit_size()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_counts() {
        assert_eq!(VectorShape::S128.lane_count(LaneType::Int), 4);
        assert_eq!(VectorShape::S512.lane_count(LaneType::Byte), 64);
        assert_eq!(VectorShape::S64.lane_count(LaneType::Double), 1);
    }

    #[test]
    fn test_for_bit_size() {
        assert_eq!(VectorShape::for_bit_size(256).unwrap(), VectorShape::S256);
        assert!(VectorShape::for_bit_size(96).is_err());
    }

    #[test]
    fn test_max_shape_is_stable() {
        let first = max_bit_size();
        assert!(first >= 64 && first <= 512);
        assert_eq!(max_bit_size(), first);
        assert_eq!(VectorShape::SMax.bit_size(), first);
        assert_eq!(VectorShape::preferred().bit_size(), first);
    }

    #[test]
    fn test_display() {
        assert_eq!(VectorShape::S256.to_string(), "S_256_BIT");
        assert_eq!(VectorShape::SMax.to_string(), "S_Max_BIT");
    }
}
