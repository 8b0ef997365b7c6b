//! AVX2 execution backend.
//!
//! Accelerates the lane-wise operators whose 256-bit instruction gives the
//! same bits as the scalar kernel: integer add/sub, 16/32-bit multiply,
//! bitwise logic, and IEEE add/sub/mul/div on float lanes. Requests whose
//! byte length is not a whole number of 256-bit registers are declined.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::ExecutionBackend;
use crate::lane::LaneType;
use crate::operators::{Binary, Ternary, Unary};

/// Bytes per AVX2 register.
pub const REGISTER_BYTES: usize = 32;

/// Backend built on 256-bit AVX2 instructions.
#[derive(Debug, Clone, Copy)]
pub struct Avx2 {
    _private: (),
}

static AVX2: Avx2 = Avx2 { _private: () };

impl Avx2 {
    /// The backend, if the running CPU supports AVX2.
    pub fn detect() -> Option<&'static Avx2> {
        if is_x86_feature_detected!("avx2") {
            Some(&AVX2)
        } else {
            None
        }
    }
}

fn whole_registers(len: usize) -> bool {
    len > 0 && len % REGISTER_BYTES == 0
}

// Applies `$body` to every 256-bit chunk of the operands. Loads and stores
// are unaligned, so the byte views may come from any allocation.
macro_rules! for_each_si256 {
    ($out:expr, [$($src:ident),+], |$($reg:ident),+| $body:expr) => {{
        for (chunk, out_chunk) in $out.chunks_exact_mut(REGISTER_BYTES).enumerate() {
            let start = chunk * REGISTER_BYTES;
            $(let $reg = _mm256_loadu_si256($src[start..].as_ptr() as *const __m256i);)+
            _mm256_storeu_si256(out_chunk.as_mut_ptr() as *mut __m256i, $body);
        }
    }};
}

macro_rules! for_each_ps {
    ($out:expr, [$($src:ident),+], |$($reg:ident),+| $body:expr) => {{
        for (chunk, out_chunk) in $out.chunks_exact_mut(REGISTER_BYTES).enumerate() {
            let start = chunk * REGISTER_BYTES;
            $(let $reg = _mm256_loadu_ps($src[start..].as_ptr() as *const f32);)+
            _mm256_storeu_ps(out_chunk.as_mut_ptr() as *mut f32, $body);
        }
    }};
}

macro_rules! for_each_pd {
    ($out:expr, [$($src:ident),+], |$($reg:ident),+| $body:expr) => {{
        for (chunk, out_chunk) in $out.chunks_exact_mut(REGISTER_BYTES).enumerate() {
            let start = chunk * REGISTER_BYTES;
            $(let $reg = _mm256_loadu_pd($src[start..].as_ptr() as *const f64);)+
            _mm256_storeu_pd(out_chunk.as_mut_ptr() as *mut f64, $body);
        }
    }};
}

#[target_feature(enable = "avx2")]
unsafe fn unary(op: Unary, lane_type: LaneType, a: &[u8], out: &mut [u8]) -> bool {
    match (op, lane_type) {
        (Unary::Not, lane) if lane.is_integral() => {
            let ones = _mm256_set1_epi32(-1);
            for_each_si256!(out, [a], |x| _mm256_xor_si256(x, ones));
        }
        (Unary::Neg, LaneType::Float) => {
            let sign = _mm256_set1_ps(-0.0);
            for_each_ps!(out, [a], |x| _mm256_xor_ps(x, sign));
        }
        (Unary::Neg, LaneType::Double) => {
            let sign = _mm256_set1_pd(-0.0);
            for_each_pd!(out, [a], |x| _mm256_xor_pd(x, sign));
        }
        _ => return false,
    }
    true
}

#[target_feature(enable = "avx2")]
unsafe fn binary(op: Binary, lane_type: LaneType, a: &[u8], b: &[u8], out: &mut [u8]) -> bool {
    use LaneType::*;

    match (op, lane_type) {
        (Binary::Add, Byte) => for_each_si256!(out, [a, b], |x, y| _mm256_add_epi8(x, y)),
        (Binary::Add, Short) => for_each_si256!(out, [a, b], |x, y| _mm256_add_epi16(x, y)),
        (Binary::Add, Int) => for_each_si256!(out, [a, b], |x, y| _mm256_add_epi32(x, y)),
        (Binary::Add, Long) => for_each_si256!(out, [a, b], |x, y| _mm256_add_epi64(x, y)),
        (Binary::Sub, Byte) => for_each_si256!(out, [a, b], |x, y| _mm256_sub_epi8(x, y)),
        (Binary::Sub, Short) => for_each_si256!(out, [a, b], |x, y| _mm256_sub_epi16(x, y)),
        (Binary::Sub, Int) => for_each_si256!(out, [a, b], |x, y| _mm256_sub_epi32(x, y)),
        (Binary::Sub, Long) => for_each_si256!(out, [a, b], |x, y| _mm256_sub_epi64(x, y)),
        (Binary::Mul, Short) => for_each_si256!(out, [a, b], |x, y| _mm256_mullo_epi16(x, y)),
        (Binary::Mul, Int) => for_each_si256!(out, [a, b], |x, y| _mm256_mullo_epi32(x, y)),
        (Binary::And, lane) if lane.is_integral() => {
            for_each_si256!(out, [a, b], |x, y| _mm256_and_si256(x, y))
        }
        // andnot computes !first & second
        (Binary::AndNot, lane) if lane.is_integral() => {
            for_each_si256!(out, [a, b], |x, y| _mm256_andnot_si256(y, x))
        }
        (Binary::Or, lane) if lane.is_integral() => {
            for_each_si256!(out, [a, b], |x, y| _mm256_or_si256(x, y))
        }
        (Binary::Xor, lane) if lane.is_integral() => {
            for_each_si256!(out, [a, b], |x, y| _mm256_xor_si256(x, y))
        }
        (Binary::Add, Float) => for_each_ps!(out, [a, b], |x, y| _mm256_add_ps(x, y)),
        (Binary::Sub, Float) => for_each_ps!(out, [a, b], |x, y| _mm256_sub_ps(x, y)),
        (Binary::Mul, Float) => for_each_ps!(out, [a, b], |x, y| _mm256_mul_ps(x, y)),
        (Binary::Div, Float) => for_each_ps!(out, [a, b], |x, y| _mm256_div_ps(x, y)),
        (Binary::Add, Double) => for_each_pd!(out, [a, b], |x, y| _mm256_add_pd(x, y)),
        (Binary::Sub, Double) => for_each_pd!(out, [a, b], |x, y| _mm256_sub_pd(x, y)),
        (Binary::Mul, Double) => for_each_pd!(out, [a, b], |x, y| _mm256_mul_pd(x, y)),
        (Binary::Div, Double) => for_each_pd!(out, [a, b], |x, y| _mm256_div_pd(x, y)),
        _ => return false,
    }
    true
}

#[target_feature(enable = "avx2")]
unsafe fn ternary(
    op: Ternary,
    lane_type: LaneType,
    a: &[u8],
    b: &[u8],
    c: &[u8],
    out: &mut [u8],
) -> bool {
    match (op, lane_type) {
        // a ^ ((a ^ b) & c)
        (Ternary::BitwiseBlend, lane) if lane.is_integral() => {
            for_each_si256!(out, [a, b, c], |x, y, z| {
                _mm256_xor_si256(x, _mm256_and_si256(_mm256_xor_si256(x, y), z))
            })
        }
        _ => return false,
    }
    true
}

impl ExecutionBackend for Avx2 {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn try_unary(&self, op: Unary, lane_type: LaneType, a: &[u8], out: &mut [u8]) -> bool {
        if !whole_registers(a.len()) || a.len() != out.len() {
            return false;
        }
        // SAFETY: `Avx2` is only handed out by `detect`, after the CPU
        // reported AVX2 support.
        unsafe { unary(op, lane_type, a, out) }
    }

    fn try_binary(
        &self,
        op: Binary,
        lane_type: LaneType,
        a: &[u8],
        b: &[u8],
        out: &mut [u8],
    ) -> bool {
        if !whole_registers(a.len()) || a.len() != b.len() || a.len() != out.len() {
            return false;
        }
        // SAFETY: see `try_unary`.
        unsafe { binary(op, lane_type, a, b, out) }
    }

    fn try_ternary(
        &self,
        op: Ternary,
        lane_type: LaneType,
        a: &[u8],
        b: &[u8],
        c: &[u8],
        out: &mut [u8],
    ) -> bool {
        let len = a.len();
        if !whole_registers(len) || b.len() != len || c.len() != len || out.len() != len {
            return false;
        }
        // SAFETY: see `try_unary`.
        unsafe { ternary(op, lane_type, a, b, c, out) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of<T: bytemuck::Pod>(values: &[T]) -> Vec<u8> {
        bytemuck::cast_slice(values).to_vec()
    }

    #[test]
    fn test_avx2_int_add_matches_wrapping_add() {
        let Some(backend) = Avx2::detect() else {
            println!("avx2 not available, skipping");
            return;
        };
        let a: Vec<i32> = (0..8).map(|i| i32::MAX - i).collect();
        let b: Vec<i32> = (0..8).collect();
        let mut out = vec![0u8; 32];
        assert!(backend.try_binary(Binary::Add, LaneType::Int, &bytes_of(&a), &bytes_of(&b), &mut out));
        let sums: Vec<i32> = bytemuck::pod_collect_to_vec(&out);
        let expected: Vec<i32> = a.iter().zip(&b).map(|(x, y)| x.wrapping_add(*y)).collect();
        assert_eq!(sums, expected);
    }

    #[test]
    fn test_avx2_declines_partial_registers() {
        let Some(backend) = Avx2::detect() else {
            return;
        };
        let a = [0u8; 16];
        let mut out = [0u8; 16];
        assert!(!backend.try_binary(Binary::Add, LaneType::Int, &a, &a, &mut out));
        let wide = [0u8; 32];
        let mut wide_out = [0u8; 32];
        assert!(!backend.try_binary(Binary::Min, LaneType::Int, &wide, &wide, &mut wide_out));
    }
}
