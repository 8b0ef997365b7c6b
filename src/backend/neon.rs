//! NEON execution backend for aarch64.
//!
//! Same contract as the AVX2 backend on 128-bit registers. NEON has lane
//! multiplies for 8/16/32-bit integers and a full-precision divide on
//! aarch64, so those are accelerated as well.

use std::arch::aarch64::*;

use super::ExecutionBackend;
use crate::lane::LaneType;
use crate::operators::{Binary, Ternary, Unary};

/// Bytes per NEON register.
pub const REGISTER_BYTES: usize = 16;

/// Backend built on 128-bit NEON instructions.
#[derive(Debug, Clone, Copy)]
pub struct Neon {
    _private: (),
}

static NEON: Neon = Neon { _private: () };

impl Neon {
    /// The backend, if the running CPU supports NEON.
    pub fn detect() -> Option<&'static Neon> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Some(&NEON)
        } else {
            None
        }
    }
}

fn whole_registers(len: usize) -> bool {
    len > 0 && len % REGISTER_BYTES == 0
}

// Every register is loaded and stored as bytes and reinterpreted in between,
// so the byte views need no particular alignment.
macro_rules! for_each_q {
    ($out:expr, [$($src:ident),+], $from:ident, $to:ident, |$($reg:ident),+| $body:expr) => {{
        for (chunk, out_chunk) in $out.chunks_exact_mut(REGISTER_BYTES).enumerate() {
            let start = chunk * REGISTER_BYTES;
            $(let $reg = $from(vld1q_u8($src[start..].as_ptr()));)+
            vst1q_u8(out_chunk.as_mut_ptr(), $to($body));
        }
    }};
}

#[inline(always)]
unsafe fn same_u8(x: uint8x16_t) -> uint8x16_t {
    x
}

#[target_feature(enable = "neon")]
unsafe fn unary(op: Unary, lane_type: LaneType, a: &[u8], out: &mut [u8]) -> bool {
    match (op, lane_type) {
        (Unary::Not, lane) if lane.is_integral() => {
            for_each_q!(out, [a], same_u8, same_u8, |x| vmvnq_u8(x))
        }
        (Unary::Neg, LaneType::Float) => {
            for_each_q!(out, [a], vreinterpretq_f32_u8, vreinterpretq_u8_f32, |x| vnegq_f32(x))
        }
        (Unary::Neg, LaneType::Double) => {
            for_each_q!(out, [a], vreinterpretq_f64_u8, vreinterpretq_u8_f64, |x| vnegq_f64(x))
        }
        _ => return false,
    }
    true
}

#[target_feature(enable = "neon")]
unsafe fn binary(op: Binary, lane_type: LaneType, a: &[u8], b: &[u8], out: &mut [u8]) -> bool {
    use LaneType::*;

    match (op, lane_type) {
        (Binary::Add, Byte) => {
            for_each_q!(out, [a, b], vreinterpretq_s8_u8, vreinterpretq_u8_s8, |x, y| vaddq_s8(x, y))
        }
        (Binary::Add, Short) => {
            for_each_q!(out, [a, b], vreinterpretq_s16_u8, vreinterpretq_u8_s16, |x, y| vaddq_s16(x, y))
        }
        (Binary::Add, Int) => {
            for_each_q!(out, [a, b], vreinterpretq_s32_u8, vreinterpretq_u8_s32, |x, y| vaddq_s32(x, y))
        }
        (Binary::Add, Long) => {
            for_each_q!(out, [a, b], vreinterpretq_s64_u8, vreinterpretq_u8_s64, |x, y| vaddq_s64(x, y))
        }
        (Binary::Sub, Byte) => {
            for_each_q!(out, [a, b], vreinterpretq_s8_u8, vreinterpretq_u8_s8, |x, y| vsubq_s8(x, y))
        }
        (Binary::Sub, Short) => {
            for_each_q!(out, [a, b], vreinterpretq_s16_u8, vreinterpretq_u8_s16, |x, y| vsubq_s16(x, y))
        }
        (Binary::Sub, Int) => {
            for_each_q!(out, [a, b], vreinterpretq_s32_u8, vreinterpretq_u8_s32, |x, y| vsubq_s32(x, y))
        }
        (Binary::Sub, Long) => {
            for_each_q!(out, [a, b], vreinterpretq_s64_u8, vreinterpretq_u8_s64, |x, y| vsubq_s64(x, y))
        }
        (Binary::Mul, Byte) => {
            for_each_q!(out, [a, b], vreinterpretq_s8_u8, vreinterpretq_u8_s8, |x, y| vmulq_s8(x, y))
        }
        (Binary::Mul, Short) => {
            for_each_q!(out, [a, b], vreinterpretq_s16_u8, vreinterpretq_u8_s16, |x, y| vmulq_s16(x, y))
        }
        (Binary::Mul, Int) => {
            for_each_q!(out, [a, b], vreinterpretq_s32_u8, vreinterpretq_u8_s32, |x, y| vmulq_s32(x, y))
        }
        (Binary::And, lane) if lane.is_integral() => {
            for_each_q!(out, [a, b], same_u8, same_u8, |x, y| vandq_u8(x, y))
        }
        // bic computes first & !second
        (Binary::AndNot, lane) if lane.is_integral() => {
            for_each_q!(out, [a, b], same_u8, same_u8, |x, y| vbicq_u8(x, y))
        }
        (Binary::Or, lane) if lane.is_integral() => {
            for_each_q!(out, [a, b], same_u8, same_u8, |x, y| vorrq_u8(x, y))
        }
        (Binary::Xor, lane) if lane.is_integral() => {
            for_each_q!(out, [a, b], same_u8, same_u8, |x, y| veorq_u8(x, y))
        }
        (Binary::Add, Float) => {
            for_each_q!(out, [a, b], vreinterpretq_f32_u8, vreinterpretq_u8_f32, |x, y| vaddq_f32(x, y))
        }
        (Binary::Sub, Float) => {
            for_each_q!(out, [a, b], vreinterpretq_f32_u8, vreinterpretq_u8_f32, |x, y| vsubq_f32(x, y))
        }
        (Binary::Mul, Float) => {
            for_each_q!(out, [a, b], vreinterpretq_f32_u8, vreinterpretq_u8_f32, |x, y| vmulq_f32(x, y))
        }
        (Binary::Div, Float) => {
            for_each_q!(out, [a, b], vreinterpretq_f32_u8, vreinterpretq_u8_f32, |x, y| vdivq_f32(x, y))
        }
        (Binary::Add, Double) => {
            for_each_q!(out, [a, b], vreinterpretq_f64_u8, vreinterpretq_u8_f64, |x, y| vaddq_f64(x, y))
        }
        (Binary::Sub, Double) => {
            for_each_q!(out, [a, b], vreinterpretq_f64_u8, vreinterpretq_u8_f64, |x, y| vsubq_f64(x, y))
        }
        (Binary::Mul, Double) => {
            for_each_q!(out, [a, b], vreinterpretq_f64_u8, vreinterpretq_u8_f64, |x, y| vmulq_f64(x, y))
        }
        (Binary::Div, Double) => {
            for_each_q!(out, [a, b], vreinterpretq_f64_u8, vreinterpretq_u8_f64, |x, y| vdivq_f64(x, y))
        }
        _ => return false,
    }
    true
}

#[target_feature(enable = "neon")]
unsafe fn ternary(
    op: Ternary,
    lane_type: LaneType,
    a: &[u8],
    b: &[u8],
    c: &[u8],
    out: &mut [u8],
) -> bool {
    match (op, lane_type) {
        // bsl picks bits of b where c is set, bits of a elsewhere
        (Ternary::BitwiseBlend, lane) if lane.is_integral() => {
            for_each_q!(out, [a, b, c], same_u8, same_u8, |x, y, z| vbslq_u8(z, y, x))
        }
        _ => return false,
    }
    true
}

impl ExecutionBackend for Neon {
    fn name(&self) -> &'static str {
        "neon"
    }

    fn try_unary(&self, op: Unary, lane_type: LaneType, a: &[u8], out: &mut [u8]) -> bool {
        if !whole_registers(a.len()) || a.len() != out.len() {
            return false;
        }
        // SAFETY: `Neon` is only handed out by `detect`, after the CPU
        // reported NEON support.
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

    #[test]
    fn test_neon_float_div_is_ieee() {
        let Some(backend) = Neon::detect() else {
            println!("neon not available, skipping");
            return;
        };
        let a = [1.0f32, -1.0, 0.0, 6.0];
        let b = [0.0f32, 0.0, 0.0, 3.0];
        let mut out = [0u8; 16];
        assert!(backend.try_binary(
            Binary::Div,
            LaneType::Float,
            bytemuck::cast_slice(&a),
            bytemuck::cast_slice(&b),
            &mut out
        ));
        let quotients: Vec<f32> = bytemuck::pod_collect_to_vec(&out);
        assert_eq!(quotients[0], f32::INFINITY);
        assert_eq!(quotients[1], f32::NEG_INFINITY);
        assert!(quotients[2].is_nan());
        assert_eq!(quotients[3], 2.0);
    }

    #[test]
    fn test_neon_bitwise_blend() {
        let Some(backend) = Neon::detect() else {
            return;
        };
        let a = [0x00ff_00ffi32; 4];
        let b = [0x0f0f_0f0fi32; 4];
        let c = [-1i32, 0, 0x0000_ffff, 0];
        let mut out = [0u8; 16];
        assert!(backend.try_ternary(
            Ternary::BitwiseBlend,
            LaneType::Int,
            bytemuck::cast_slice(&a),
            bytemuck::cast_slice(&b),
            bytemuck::cast_slice(&c),
            &mut out
        ));
        let blended: Vec<i32> = bytemuck::pod_collect_to_vec(&out);
        let expected: Vec<i32> = (0..4).map(|i| a[i] ^ ((a[i] ^ b[i]) & c[i])).collect();
        assert_eq!(blended, expected);
    }
}
