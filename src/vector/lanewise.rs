//! Lane-wise operators.
//!
//! Every entry point resolves the scalar kernel through the lane type's
//! implementation cache, offers the request to the active execution backend
//! and runs the kernel lane by lane only when the backend declines.
//!
//! Masked forms keep the receiver's value in unset lanes, so
//! `v.lanewise_masked(op, w, m) == v.blend(&v.lanewise(op, w)?, m)`.

use crate::backend;
use crate::error::{unsupported, LanewiseError, Result};
use crate::lane::{BinaryFn, Lane, TernaryFn, UnaryFn};
use crate::mask::Mask;
use crate::operators::{Binary, Comparison, Ternary, Unary};

use super::Vector;

fn unary_kernel<E: Lane>(op: Unary) -> Result<UnaryFn<E>> {
    E::op_cache()
        .unary(op)
        .ok_or_else(|| unsupported(op, E::LANE_TYPE))
}

fn binary_kernel<E: Lane>(op: Binary) -> Result<BinaryFn<E>> {
    E::op_cache()
        .binary(op)
        .ok_or_else(|| unsupported(op, E::LANE_TYPE))
}

fn ternary_kernel<E: Lane>(op: Ternary) -> Result<TernaryFn<E>> {
    E::op_cache()
        .ternary(op)
        .ok_or_else(|| unsupported(op, E::LANE_TYPE))
}

fn is_shift(op: Binary) -> bool {
    matches!(
        op,
        Binary::Lshl | Binary::Ashr | Binary::Lshr | Binary::Rol | Binary::Ror
    )
}

impl<E: Lane> Vector<E> {
    fn backend_unary(&self, op: Unary) -> Option<Self> {
        let mut out = vec![E::zero(); self.length()];
        let accepted = backend::active().try_unary(
            op,
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            bytemuck::cast_slice_mut(&mut out),
        );
        accepted.then(|| Self::from_lanes(self.species, out))
    }

    fn backend_binary(&self, op: Binary, other: &Self) -> Option<Self> {
        let mut out = vec![E::zero(); self.length()];
        let accepted = backend::active().try_binary(
            op,
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            bytemuck::cast_slice(other.as_slice()),
            bytemuck::cast_slice_mut(&mut out),
        );
        accepted.then(|| Self::from_lanes(self.species, out))
    }

    fn backend_ternary(&self, op: Ternary, second: &Self, third: &Self) -> Option<Self> {
        let mut out = vec![E::zero(); self.length()];
        let accepted = backend::active().try_ternary(
            op,
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            bytemuck::cast_slice(second.as_slice()),
            bytemuck::cast_slice(third.as_slice()),
            bytemuck::cast_slice_mut(&mut out),
        );
        accepted.then(|| Self::from_lanes(self.species, out))
    }

    /// Fails with `DivideByZero` on the first zero lane, ignoring unset
    /// lanes of `mask`.
    fn check_divisors(&self, mask: Option<&Mask<E>>) -> Result<()> {
        let zero_lane = self
            .as_slice()
            .iter()
            .enumerate()
            .find(|&(i, lane)| mask.map_or(true, |m| m.bit(i)) && lane.is_default());
        match zero_lane {
            Some((lane, _)) => Err(LanewiseError::DivideByZero { lane }),
            None => Ok(()),
        }
    }

    // All bits set where the lane is nonzero.
    fn zomo(&self) -> Result<Self> {
        if E::LANE_TYPE.is_floating() {
            return Err(unsupported(Unary::Zomo, E::LANE_TYPE));
        }
        let nonzero = self.compare_scalar(Comparison::Ne, E::zero())?;
        self.species
            .zero()
            .blend(&self.broadcast(E::all_ones()), &nonzero)
    }

    // First nonzero by bit pattern: -0.0 and NaN lanes count as nonzero.
    fn first_nonzero_bits(&self, other: &Self) -> Result<Self> {
        let first = self.view_as_integral_lanes();
        let second = other.view_as_integral_lanes();
        let nonzero = first.compare_scalar(Comparison::Ne, <E::Bits as Lane>::zero())?;
        let picked = second.blend(&first, &nonzero)?;
        Ok(Self::from_integral_lanes(self.species, &picked))
    }

    /// Applies a unary operator to every lane.
    pub fn lanewise_unary(&self, op: Unary) -> Result<Self> {
        if op == Unary::Zomo {
            return self.zomo();
        }
        let kernel = unary_kernel::<E>(op)?;
        if let Some(result) = self.backend_unary(op) {
            return Ok(result);
        }
        Ok(self.unary_template(|_, a| kernel(a)))
    }

    /// Applies a unary operator to the set lanes of `mask`.
    pub fn lanewise_unary_masked(&self, op: Unary, mask: &Mask<E>) -> Result<Self> {
        self.check_mask(mask)?;
        self.blend(&self.lanewise_unary(op)?, mask)
    }

    /// Combines corresponding lanes of `self` and `other`.
    ///
    /// Integral division checks every divisor lane first and fails with
    /// `DivideByZero` before computing anything. Floating division follows
    /// IEEE-754.
    pub fn lanewise(&self, op: Binary, other: &Self) -> Result<Self> {
        self.check_species(other)?;
        let kernel = binary_kernel::<E>(op)?;
        if op == Binary::Div && E::LANE_TYPE.is_integral() {
            other.check_divisors(None)?;
        }
        if op == Binary::FirstNonzero && E::LANE_TYPE.is_floating() {
            return self.first_nonzero_bits(other);
        }
        if let Some(result) = self.backend_binary(op, other) {
            return Ok(result);
        }
        Ok(self.binary_template(other, |_, a, b| kernel(a, b)))
    }

    /// Like [`Vector::lanewise`], only in the set lanes of `mask`.
    ///
    /// Integral division only checks (and divides) the set lanes.
    pub fn lanewise_masked(&self, op: Binary, other: &Self, mask: &Mask<E>) -> Result<Self> {
        self.check_species(other)?;
        self.check_mask(mask)?;
        if op == Binary::Div && E::LANE_TYPE.is_integral() {
            let kernel = binary_kernel::<E>(op)?;
            other.check_divisors(Some(mask))?;
            return Ok(self.binary_masked_template(other, mask, |_, a, b| kernel(a, b)));
        }
        self.blend(&self.lanewise(op, other)?, mask)
    }

    /// Combines every lane with the scalar `e`.
    pub fn lanewise_scalar(&self, op: Binary, e: E) -> Result<Self> {
        self.lanewise(op, &self.broadcast(e))
    }

    pub fn lanewise_scalar_masked(&self, op: Binary, e: E, mask: &Mask<E>) -> Result<Self> {
        self.lanewise_masked(op, &self.broadcast(e), mask)
    }

    /// Combines every lane with a wider integer scalar.
    ///
    /// Shift and rotate counts are only used modulo the lane width, so they
    /// are truncated freely. Any other operand must convert to the lane type
    /// exactly.
    pub fn lanewise_long(&self, op: Binary, value: i64) -> Result<Self> {
        if is_shift(op) {
            return self.lanewise_scalar(op, E::from_i64(value));
        }
        self.lanewise(op, &self.broadcast_long(value)?)
    }

    /// Combines corresponding lanes of three vectors.
    pub fn lanewise_ternary(&self, op: Ternary, second: &Self, third: &Self) -> Result<Self> {
        self.check_species(second)?;
        self.check_species(third)?;
        let kernel = ternary_kernel::<E>(op)?;
        if let Some(result) = self.backend_ternary(op, second, third) {
            return Ok(result);
        }
        Ok(self.ternary_template(second, third, |_, a, b, c| kernel(a, b, c)))
    }

    pub fn lanewise_ternary_masked(
        &self,
        op: Ternary,
        second: &Self,
        third: &Self,
        mask: &Mask<E>,
    ) -> Result<Self> {
        self.check_mask(mask)?;
        self.blend(&self.lanewise_ternary(op, second, third)?, mask)
    }

    /// Takes `other`'s lane where `mask` is set and keeps this one elsewhere.
    pub fn blend(&self, other: &Self, mask: &Mask<E>) -> Result<Self> {
        self.check_species(other)?;
        self.check_mask(mask)?;
        let mut out = vec![E::zero(); self.length()];
        let accepted = backend::active().try_blend(
            E::LANE_TYPE,
            bytemuck::cast_slice(self.as_slice()),
            bytemuck::cast_slice(other.as_slice()),
            mask.bits(),
            bytemuck::cast_slice_mut(&mut out),
        );
        if accepted {
            return Ok(Self::from_lanes(self.species, out));
        }
        Ok(self.binary_template(other, |i, a, b| if mask.bit(i) { b } else { a }))
    }

    /// `self + iota * scale`.
    ///
    /// Fails if `length() * scale` does not fit the lane type.
    pub fn add_index(&self, scale: i32) -> Result<Self> {
        self.species.check_scale(scale)?;
        let offsets = self
            .species
            .iota()
            .lanewise_scalar(Binary::Mul, E::from_i64(i64::from(scale)))?;
        self.lanewise(Binary::Add, &offsets)
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Add, other)
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Sub, other)
    }

    pub fn mul(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Mul, other)
    }

    pub fn div(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Div, other)
    }

    pub fn min(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Min, other)
    }

    pub fn max(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Max, other)
    }

    pub fn add_scalar(&self, e: E) -> Result<Self> {
        self.lanewise_scalar(Binary::Add, e)
    }

    pub fn sub_scalar(&self, e: E) -> Result<Self> {
        self.lanewise_scalar(Binary::Sub, e)
    }

    pub fn mul_scalar(&self, e: E) -> Result<Self> {
        self.lanewise_scalar(Binary::Mul, e)
    }

    pub fn div_scalar(&self, e: E) -> Result<Self> {
        self.lanewise_scalar(Binary::Div, e)
    }

    pub fn neg(&self) -> Result<Self> {
        self.lanewise_unary(Unary::Neg)
    }

    pub fn abs(&self) -> Result<Self> {
        self.lanewise_unary(Unary::Abs)
    }

    /// Fused multiply-add `self * second + third` with a single rounding.
    pub fn fma(&self, second: &Self, third: &Self) -> Result<Self> {
        self.lanewise_ternary(Ternary::Fma, second, third)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<E: Lane> std::ops::$trait for &Vector<E> {
            type Output = Vector<E>;

            /// # Panics
            ///
            /// Panics where [`Vector::lanewise`] would return an error.
            fn $method(self, rhs: Self) -> Vector<E> {
                match self.lanewise($op, rhs) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }

        impl<E: Lane> std::ops::$trait for Vector<E> {
            type Output = Vector<E>;

            fn $method(self, rhs: Self) -> Vector<E> {
                std::ops::$trait::$method(&self, &rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, Binary::Add);
impl_binary_operator!(Sub, sub, Binary::Sub);
impl_binary_operator!(Mul, mul, Binary::Mul);
impl_binary_operator!(Div, div, Binary::Div);

impl<E: Lane> std::ops::Neg for &Vector<E> {
    type Output = Vector<E>;

    fn neg(self) -> Vector<E> {
        match self.lanewise_unary(Unary::Neg) {
            Ok(result) => result,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<E: Lane> std::ops::Neg for Vector<E> {
    type Output = Vector<E>;

    fn neg(self) -> Vector<E> {
        std::ops::Neg::neg(&self)
    }
}
