//! Lane type registry.
//!
//! [`LaneType`] enumerates the primitive element kinds a vector can hold and
//! [`Lane`] ties each Rust primitive to its kind. The trait also carries the
//! scalar kernels the portable engine applies lane by lane; a kernel resolver
//! returns `None` when an operator is not defined for the lane type (bitwise
//! operators on floats, transcendental functions on integers, ...).

use std::fmt;
use std::hash::Hash;

use bytemuck::Pod;
use num::traits::{Float, PrimInt, WrappingAdd, WrappingMul, WrappingNeg, WrappingSub};

use crate::dispatch::OpCache;
use crate::operators::{Binary, Comparison, Ternary, Test, Unary};
use crate::species::SpeciesCache;

/// Primitive element kind of a vector lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneType {
    /// 8-bit signed integer.
    Byte,
    /// 16-bit signed integer.
    Short,
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit IEEE-754 float.
    Float,
    /// 64-bit IEEE-754 float.
    Double,
}

impl LaneType {
    /// Every supported lane type, narrowest integral first.
    pub const ALL: [LaneType; 6] = [
        LaneType::Byte,
        LaneType::Short,
        LaneType::Int,
        LaneType::Long,
        LaneType::Float,
        LaneType::Double,
    ];

    /// Width of one lane in bits.
    pub const fn bit_size(self) -> usize {
        match self {
            LaneType::Byte => 8,
            LaneType::Short => 16,
            LaneType::Int | LaneType::Float => 32,
            LaneType::Long | LaneType::Double => 64,
        }
    }

    /// Width of one lane in bytes.
    pub const fn byte_size(self) -> usize {
        self.bit_size() / 8
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, LaneType::Float | LaneType::Double)
    }

    pub const fn is_integral(self) -> bool {
        !self.is_floating()
    }

    /// The integral lane type of the same width.
    pub const fn as_integral(self) -> LaneType {
        match self {
            LaneType::Float => LaneType::Int,
            LaneType::Double => LaneType::Long,
            other => other,
        }
    }

    /// The floating lane type of the same width, if there is one.
    ///
    /// 8- and 16-bit lanes have no floating counterpart.
    pub const fn as_floating(self) -> Option<LaneType> {
        match self {
            LaneType::Int | LaneType::Float => Some(LaneType::Float),
            LaneType::Long | LaneType::Double => Some(LaneType::Double),
            LaneType::Byte | LaneType::Short => None,
        }
    }

    /// The Rust primitive name of the lane type.
    pub const fn name(self) -> &'static str {
        match self {
            LaneType::Byte => "i8",
            LaneType::Short => "i16",
            LaneType::Int => "i32",
            LaneType::Long => "i64",
            LaneType::Float => "f32",
            LaneType::Double => "f64",
        }
    }
}

impl fmt::Display for LaneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar kernel of a unary lane-wise operator.
pub type UnaryFn<E> = fn(E) -> E;
/// Scalar kernel of a binary lane-wise operator.
pub type BinaryFn<E> = fn(E, E) -> E;
/// Scalar kernel of a ternary lane-wise operator.
pub type TernaryFn<E> = fn(E, E, E) -> E;
/// Scalar kernel of a lane comparison.
pub type CompareFn<E> = fn(E, E) -> bool;
/// Scalar kernel of a lane predicate.
pub type TestFn<E> = fn(E) -> bool;

/// A primitive that can occupy a vector lane.
///
/// Implemented for `i8`, `i16`, `i32`, `i64`, `f32` and `f64`. Conversions
/// follow primitive cast semantics: integral narrowing truncates, floating to
/// integral saturates (NaN becomes zero), and floating values narrowed to 8-
/// or 16-bit lanes pass through `i32` first.
pub trait Lane:
    Copy
    + fmt::Debug
    + fmt::Display
    + Default
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + Pod
    + 'static
{
    /// Registry entry of this lane type.
    const LANE_TYPE: LaneType;

    /// The integral lane type of the same width (`Self` for integral lanes).
    type Bits: Lane + Eq + Ord + Hash;

    /// The floating lane type of the same width.
    ///
    /// Lanes without a floating counterpart name themselves here;
    /// [`LaneType::as_floating`] tells the two cases apart.
    type Floating: Lane;

    fn zero() -> Self {
        Self::default()
    }

    fn one() -> Self;

    /// The lane value whose bits are all set.
    fn all_ones() -> Self;

    /// Identity of the `Min` reduction: the largest value (or `+inf`).
    fn min_identity() -> Self;

    /// Identity of the `Max` reduction: the smallest value (or `-inf`).
    fn max_identity() -> Self;

    fn to_lane_bits(self) -> Self::Bits;

    fn from_lane_bits(bits: Self::Bits) -> Self;

    fn to_i64(self) -> i64;

    fn from_i64(value: i64) -> Self;

    fn to_f64(self) -> f64;

    fn from_f64(value: f64) -> Self;

    /// Converts a lane of another type with primitive cast semantics.
    fn convert_from<S: Lane>(value: S) -> Self {
        if S::LANE_TYPE.is_floating() {
            Self::from_f64(value.to_f64())
        } else {
            Self::from_i64(value.to_i64())
        }
    }

    /// True when every bit of the lane is zero (`-0.0` is not default).
    fn is_default(self) -> bool;

    fn unary_kernel(op: Unary) -> Option<UnaryFn<Self>>;

    fn binary_kernel(op: Binary) -> Option<BinaryFn<Self>>;

    fn ternary_kernel(op: Ternary) -> Option<TernaryFn<Self>>;

    fn compare_kernel(op: Comparison) -> Option<CompareFn<Self>>;

    fn test_kernel(op: Test) -> Option<TestFn<Self>>;

    /// Process-wide implementation cache of this lane type.
    fn op_cache() -> &'static OpCache<Self>;

    /// Process-wide zero/iota/mask singletons of this lane type.
    fn species_cache() -> &'static SpeciesCache<Self>;
}

#[inline(always)]
fn lshl<T: PrimInt>(a: T, n: u32) -> T {
    a.unsigned_shl(n)
}

#[inline(always)]
fn ashr<T: PrimInt>(a: T, n: u32) -> T {
    a.signed_shr(n)
}

#[inline(always)]
fn lshr<T: PrimInt>(a: T, n: u32) -> T {
    a.unsigned_shr(n)
}

// Rotations are composed from the two shifts; counts are masked into
// [0, bits) so a zero count degenerates to `a | a`.
#[inline(always)]
fn rotate_left<T: PrimInt>(a: T, n: u32, bits: u32) -> T {
    let n = n & (bits - 1);
    lshl(a, n) | lshr(a, bits.wrapping_sub(n) & (bits - 1))
}

#[inline(always)]
fn rotate_right<T: PrimInt>(a: T, n: u32, bits: u32) -> T {
    let n = n & (bits - 1);
    lshr(a, n) | lshl(a, bits.wrapping_sub(n) & (bits - 1))
}

#[inline(always)]
fn wrapping_abs<T: PrimInt + WrappingNeg>(a: T) -> T {
    if a < T::zero() {
        a.wrapping_neg()
    } else {
        a
    }
}

#[inline(always)]
fn bitwise_blend<T: PrimInt>(a: T, b: T, c: T) -> T {
    a ^ ((a ^ b) & c)
}

#[inline(always)]
fn wrapping_add<T: WrappingAdd>(a: T, b: T) -> T {
    a.wrapping_add(&b)
}

#[inline(always)]
fn wrapping_sub<T: WrappingSub>(a: T, b: T) -> T {
    a.wrapping_sub(&b)
}

#[inline(always)]
fn wrapping_mul<T: WrappingMul>(a: T, b: T) -> T {
    a.wrapping_mul(&b)
}

// NaN wins, and -0.0 orders below +0.0.
#[inline(always)]
fn float_min<F: Float>(a: F, b: F) -> F {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a == b && a.is_zero() {
        if a.is_sign_negative() {
            a
        } else {
            b
        }
    } else if a < b {
        a
    } else {
        b
    }
}

#[inline(always)]
fn float_max<F: Float>(a: F, b: F) -> F {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a == b && a.is_zero() {
        if a.is_sign_positive() {
            a
        } else {
            b
        }
    } else if a > b {
        a
    } else {
        b
    }
}

macro_rules! impl_integral_lane {
    ($t:ty, $unsigned:ty, $lane_type:ident, $floating:ty, $via:ty) => {
        impl Lane for $t {
            const LANE_TYPE: LaneType = LaneType::$lane_type;

            type Bits = $t;
            type Floating = $floating;

            #[inline(always)]
            fn one() -> Self {
                1
            }

            #[inline(always)]
            fn all_ones() -> Self {
                -1
            }

            #[inline(always)]
            fn min_identity() -> Self {
                <$t>::MAX
            }

            #[inline(always)]
            fn max_identity() -> Self {
                <$t>::MIN
            }

            #[inline(always)]
            fn to_lane_bits(self) -> $t {
                self
            }

            #[inline(always)]
            fn from_lane_bits(bits: $t) -> Self {
                bits
            }

            #[inline(always)]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline(always)]
            fn from_i64(value: i64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                (value as $via) as $t
            }

            #[inline(always)]
            fn is_default(self) -> bool {
                self == 0
            }

            fn unary_kernel(op: Unary) -> Option<UnaryFn<Self>> {
                let kernel: UnaryFn<Self> = match op {
                    Unary::Neg => |a: $t| a.wrapping_neg(),
                    Unary::Abs => |a: $t| wrapping_abs(a),
                    Unary::Not => |a: $t| !a,
                    Unary::BitCount => |a: $t| a.count_ones() as $t,
                    Unary::LeadingZerosCount => |a: $t| a.leading_zeros() as $t,
                    Unary::TrailingZerosCount => |a: $t| a.trailing_zeros() as $t,
                    Unary::ReverseBytes => |a: $t| <$t>::swap_bytes(a),
                    // Zomo is composed from compare and blend by the engine.
                    _ => return None,
                };
                Some(kernel)
            }

            fn binary_kernel(op: Binary) -> Option<BinaryFn<Self>> {
                const BITS: u32 = <$t>::BITS;
                let kernel: BinaryFn<Self> = match op {
                    Binary::Add => |a: $t, b: $t| wrapping_add(a, b),
                    Binary::Sub => |a: $t, b: $t| wrapping_sub(a, b),
                    Binary::Mul => |a: $t, b: $t| wrapping_mul(a, b),
                    // divisors are checked for zero before the kernel runs
                    Binary::Div => |a: $t, b: $t| a.wrapping_div(b),
                    Binary::Min => |a: $t, b: $t| Ord::min(a, b),
                    Binary::Max => |a: $t, b: $t| Ord::max(a, b),
                    Binary::FirstNonzero => |a: $t, b: $t| if a != 0 { a } else { b },
                    Binary::And => |a: $t, b: $t| a & b,
                    Binary::AndNot => |a: $t, b: $t| a & !b,
                    Binary::Or => |a: $t, b: $t| a | b,
                    Binary::Xor => |a: $t, b: $t| a ^ b,
                    Binary::Lshl => |a: $t, b: $t| lshl(a, (b as u32) & (BITS - 1)),
                    Binary::Ashr => |a: $t, b: $t| ashr(a, (b as u32) & (BITS - 1)),
                    Binary::Lshr => |a: $t, b: $t| lshr(a, (b as u32) & (BITS - 1)),
                    Binary::Rol => |a: $t, b: $t| rotate_left(a, b as u32, BITS),
                    Binary::Ror => |a: $t, b: $t| rotate_right(a, b as u32, BITS),
                    Binary::Atan2 | Binary::Pow | Binary::Hypot => return None,
                };
                Some(kernel)
            }

            fn ternary_kernel(op: Ternary) -> Option<TernaryFn<Self>> {
                let kernel: TernaryFn<Self> = match op {
                    Ternary::BitwiseBlend => |a: $t, b: $t, c: $t| bitwise_blend(a, b, c),
                    Ternary::Fma => return None,
                };
                Some(kernel)
            }

            fn compare_kernel(op: Comparison) -> Option<CompareFn<Self>> {
                let kernel: CompareFn<Self> = match op {
                    Comparison::Eq => |a: $t, b: $t| a == b,
                    Comparison::Ne => |a: $t, b: $t| a != b,
                    Comparison::Lt => |a: $t, b: $t| a < b,
                    Comparison::Le => |a: $t, b: $t| a <= b,
                    Comparison::Gt => |a: $t, b: $t| a > b,
                    Comparison::Ge => |a: $t, b: $t| a >= b,
                    Comparison::Ult => |a: $t, b: $t| (a as $unsigned) < (b as $unsigned),
                    Comparison::Ule => |a: $t, b: $t| (a as $unsigned) <= (b as $unsigned),
                    Comparison::Ugt => |a: $t, b: $t| (a as $unsigned) > (b as $unsigned),
                    Comparison::Uge => |a: $t, b: $t| (a as $unsigned) >= (b as $unsigned),
                };
                Some(kernel)
            }

            fn test_kernel(op: Test) -> Option<TestFn<Self>> {
                let kernel: TestFn<Self> = match op {
                    Test::IsDefault => |a: $t| a == 0,
                    Test::IsNegative => |a: $t| a < 0,
                    Test::IsFinite | Test::IsNan | Test::IsInfinite => return None,
                };
                Some(kernel)
            }

            fn op_cache() -> &'static OpCache<Self> {
                static CACHE: OpCache<$t> = OpCache::new();
                &CACHE
            }

            fn species_cache() -> &'static SpeciesCache<Self> {
                static CACHE: SpeciesCache<$t> = SpeciesCache::new();
                &CACHE
            }
        }
    };
}

macro_rules! impl_floating_lane {
    ($t:ty, $bits:ty, $unsigned:ty, $lane_type:ident) => {
        impl Lane for $t {
            const LANE_TYPE: LaneType = LaneType::$lane_type;

            type Bits = $bits;
            type Floating = $t;

            #[inline(always)]
            fn one() -> Self {
                1.0
            }

            #[inline(always)]
            fn all_ones() -> Self {
                <$t>::from_bits(<$unsigned>::MAX)
            }

            #[inline(always)]
            fn min_identity() -> Self {
                <$t>::INFINITY
            }

            #[inline(always)]
            fn max_identity() -> Self {
                <$t>::NEG_INFINITY
            }

            #[inline(always)]
            fn to_lane_bits(self) -> $bits {
                <$t>::to_bits(self) as $bits
            }

            #[inline(always)]
            fn from_lane_bits(bits: $bits) -> Self {
                <$t>::from_bits(bits as $unsigned)
            }

            #[inline(always)]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline(always)]
            fn from_i64(value: i64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline(always)]
            fn is_default(self) -> bool {
                <$t>::to_bits(self) == 0
            }

            fn unary_kernel(op: Unary) -> Option<UnaryFn<Self>> {
                let kernel: UnaryFn<Self> = match op {
                    Unary::Neg => |a: $t| -a,
                    Unary::Abs => |a: $t| a.abs(),
                    Unary::Sqrt => |a: $t| a.sqrt(),
                    Unary::Cbrt => |a: $t| a.cbrt(),
                    Unary::Sin => |a: $t| a.sin(),
                    Unary::Cos => |a: $t| a.cos(),
                    Unary::Tan => |a: $t| a.tan(),
                    Unary::Asin => |a: $t| a.asin(),
                    Unary::Acos => |a: $t| a.acos(),
                    Unary::Atan => |a: $t| a.atan(),
                    Unary::Sinh => |a: $t| a.sinh(),
                    Unary::Cosh => |a: $t| a.cosh(),
                    Unary::Tanh => |a: $t| a.tanh(),
                    Unary::Exp => |a: $t| a.exp(),
                    Unary::Expm1 => |a: $t| a.exp_m1(),
                    Unary::Log => |a: $t| a.ln(),
                    Unary::Log10 => |a: $t| a.log10(),
                    Unary::Log1p => |a: $t| a.ln_1p(),
                    Unary::Not
                    | Unary::Zomo
                    | Unary::BitCount
                    | Unary::LeadingZerosCount
                    | Unary::TrailingZerosCount
                    | Unary::ReverseBytes => return None,
                };
                Some(kernel)
            }

            fn binary_kernel(op: Binary) -> Option<BinaryFn<Self>> {
                let kernel: BinaryFn<Self> = match op {
                    Binary::Add => |a: $t, b: $t| a + b,
                    Binary::Sub => |a: $t, b: $t| a - b,
                    Binary::Mul => |a: $t, b: $t| a * b,
                    Binary::Div => |a: $t, b: $t| a / b,
                    Binary::Min => |a: $t, b: $t| float_min(a, b),
                    Binary::Max => |a: $t, b: $t| float_max(a, b),
                    // bit pattern test: -0.0 and NaN count as nonzero
                    Binary::FirstNonzero => |a: $t, b: $t| {
                        if <$t>::to_bits(a) != 0 {
                            a
                        } else {
                            b
                        }
                    },
                    Binary::Atan2 => |a: $t, b: $t| a.atan2(b),
                    Binary::Pow => |a: $t, b: $t| a.powf(b),
                    Binary::Hypot => |a: $t, b: $t| a.hypot(b),
                    _ => return None,
                };
                Some(kernel)
            }

            fn ternary_kernel(op: Ternary) -> Option<TernaryFn<Self>> {
                let kernel: TernaryFn<Self> = match op {
                    Ternary::Fma => |a: $t, b: $t, c: $t| a.mul_add(b, c),
                    Ternary::BitwiseBlend => return None,
                };
                Some(kernel)
            }

            fn compare_kernel(op: Comparison) -> Option<CompareFn<Self>> {
                let kernel: CompareFn<Self> = match op {
                    Comparison::Eq => |a: $t, b: $t| a == b,
                    Comparison::Ne => |a: $t, b: $t| a != b,
                    Comparison::Lt => |a: $t, b: $t| a < b,
                    Comparison::Le => |a: $t, b: $t| a <= b,
                    Comparison::Gt => |a: $t, b: $t| a > b,
                    Comparison::Ge => |a: $t, b: $t| a >= b,
                    Comparison::Ult | Comparison::Ule | Comparison::Ugt | Comparison::Uge => {
                        return None
                    }
                };
                Some(kernel)
            }

            fn test_kernel(op: Test) -> Option<TestFn<Self>> {
                let kernel: TestFn<Self> = match op {
                    Test::IsDefault => |a: $t| <$t>::to_bits(a) == 0,
                    Test::IsNegative => |a: $t| a.is_sign_negative(),
                    Test::IsFinite => |a: $t| a.is_finite(),
                    Test::IsNan => |a: $t| a.is_nan(),
                    Test::IsInfinite => |a: $t| a.is_infinite(),
                };
                Some(kernel)
            }

            fn op_cache() -> &'static OpCache<Self> {
                static CACHE: OpCache<$t> = OpCache::new();
                &CACHE
            }

            fn species_cache() -> &'static SpeciesCache<Self> {
                static CACHE: SpeciesCache<$t> = SpeciesCache::new();
                &CACHE
            }
        }
    };
}

impl_integral_lane!(i8, u8, Byte, i8, i32);
impl_integral_lane!(i16, u16, Short, i16, i32);
impl_integral_lane!(i32, u32, Int, f32, i32);
impl_integral_lane!(i64, u64, Long, f64, i64);

impl_floating_lane!(f32, i32, u32, Float);
impl_floating_lane!(f64, i64, u64, Double);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_type_widths() {
        assert_eq!(LaneType::Byte.bit_size(), 8);
        assert_eq!(LaneType::Double.byte_size(), 8);
        assert_eq!(<i16 as Lane>::LANE_TYPE, LaneType::Short);
        assert_eq!(<f32 as Lane>::LANE_TYPE.as_integral(), LaneType::Int);
        assert_eq!(LaneType::Short.as_floating(), None);
        assert_eq!(LaneType::Long.as_floating(), Some(LaneType::Double));
    }

    #[test]
    fn test_shift_counts_are_masked() {
        let shl = <i16 as Lane>::binary_kernel(Binary::Lshl).unwrap();
        assert_eq!(shl(3, 16), 3);
        assert_eq!(shl(3, 17), 6);

        let lshr = <i8 as Lane>::binary_kernel(Binary::Lshr).unwrap();
        assert_eq!(lshr(-128, 7), 1);
        let ashr = <i8 as Lane>::binary_kernel(Binary::Ashr).unwrap();
        assert_eq!(ashr(-128, 7), -1);
    }

    #[test]
    fn test_rotations_match_primitive_rotates() {
        let rol = <i32 as Lane>::binary_kernel(Binary::Rol).unwrap();
        let ror = <i32 as Lane>::binary_kernel(Binary::Ror).unwrap();
        for n in [-33, -1, 0, 1, 5, 31, 32, 33] {
            let value = 0x1234_5678_i32;
            assert_eq!(rol(value, n), value.rotate_left((n as u32) & 31));
            assert_eq!(ror(value, n), value.rotate_right((n as u32) & 31));
        }
    }

    #[test]
    fn test_conversions_follow_cast_semantics() {
        assert_eq!(<i8 as Lane>::from_i64(300), 44);
        assert_eq!(<i8 as Lane>::from_f64(300.0), 44);
        assert_eq!(<i32 as Lane>::from_f64(f64::NAN), 0);
        assert_eq!(<i32 as Lane>::from_f64(1e20), i32::MAX);
        assert_eq!(<f32 as Lane>::from_i64((1 << 24) + 1).to_i64(), 1 << 24);
        assert_eq!(<i16 as Lane>::convert_from(-2.9f64), -2);
    }

    #[test]
    fn test_float_min_max_order_signed_zero() {
        assert!(float_min(0.0f64, -0.0).is_sign_negative());
        assert!(float_max(-0.0f32, 0.0).is_sign_positive());
        assert!(float_min(f32::NAN, 1.0).is_nan());
        assert!(float_max(1.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_first_nonzero_is_bitwise_for_floats() {
        let first = <f64 as Lane>::binary_kernel(Binary::FirstNonzero).unwrap();
        assert!(first(-0.0, 5.0).is_sign_negative());
        assert_eq!(first(0.0, 5.0), 5.0);
        assert!(first(f64::NAN, 5.0).is_nan());
    }

    #[test]
    fn test_unsupported_kernels() {
        assert!(<f32 as Lane>::binary_kernel(Binary::Xor).is_none());
        assert!(<i64 as Lane>::unary_kernel(Unary::Sin).is_none());
        assert!(<i8 as Lane>::ternary_kernel(Ternary::Fma).is_none());
        assert!(<f64 as Lane>::compare_kernel(Comparison::Ult).is_none());
        assert!(<i32 as Lane>::test_kernel(Test::IsNan).is_none());
    }

    #[test]
    fn test_bit_counts_use_lane_width() {
        let lz = <i8 as Lane>::unary_kernel(Unary::LeadingZerosCount).unwrap();
        let tz = <i8 as Lane>::unary_kernel(Unary::TrailingZerosCount).unwrap();
        assert_eq!(lz(1), 7);
        assert_eq!(tz(0), 8);
    }
}
