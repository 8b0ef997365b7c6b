//! Operator tokens accepted by the lanewise, reduction, comparison and test
//! entry points of [`Vector`](crate::Vector).
//!
//! Each family is a plain enum. The discriminant doubles as the slot index
//! of the per-lane-type implementation cache in [`crate::dispatch`].

macro_rules! operator_family {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every member of the family, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Number of members in the family.
            pub const COUNT: usize = Self::ALL.len();

            /// Slot index used by the implementation cache.
            #[inline(always)]
            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
}

operator_family! {
    /// Lane-wise operators taking one operand.
    Unary {
        /// Arithmetic negation (wrapping for integral lanes).
        Neg,
        /// Absolute value (wrapping for integral lanes).
        Abs,
        /// Bitwise complement.
        Not,
        /// Zero-or-minus-one: all bits set where the lane is nonzero.
        Zomo,
        /// Population count.
        BitCount,
        /// Count of leading zero bits within the lane width.
        LeadingZerosCount,
        /// Count of trailing zero bits within the lane width.
        TrailingZerosCount,
        /// Reverse the byte order of each lane.
        ReverseBytes,
        Sqrt,
        Cbrt,
        Sin,
        Cos,
        Tan,
        Asin,
        Acos,
        Atan,
        Sinh,
        Cosh,
        Tanh,
        Exp,
        Expm1,
        /// Natural logarithm.
        Log,
        Log10,
        Log1p,
    }
}

operator_family! {
    /// Lane-wise operators taking two operands.
    Binary {
        Add,
        Sub,
        Mul,
        /// Division. Integral lanes reject zero divisors up front.
        Div,
        Min,
        Max,
        /// First operand if its bit pattern is nonzero, else the second.
        FirstNonzero,
        And,
        /// `a & !b`
        AndNot,
        Or,
        Xor,
        /// Shift left, count masked to the lane width.
        Lshl,
        /// Arithmetic (sign-propagating) shift right.
        Ashr,
        /// Logical (zero-filling) shift right.
        Lshr,
        /// Rotate left.
        Rol,
        /// Rotate right.
        Ror,
        Atan2,
        Pow,
        Hypot,
    }
}

operator_family! {
    /// Lane-wise operators taking three operands.
    Ternary {
        /// Fused multiply-add `a * b + c` with a single rounding.
        Fma,
        /// `a ^ ((a ^ b) & c)`: bits of `b` where `c` is set, else bits of `a`.
        BitwiseBlend,
    }
}

operator_family! {
    /// Associative operators usable in lane reductions.
    Associative {
        Add,
        Mul,
        Min,
        Max,
        And,
        Or,
        Xor,
        FirstNonzero,
    }
}

operator_family! {
    /// Lane-wise comparisons producing a mask.
    Comparison {
        Eq,
        Ne,
        Lt,
        Le,
        Gt,
        Ge,
        /// Unsigned less-than (integral lanes only).
        Ult,
        Ule,
        Ugt,
        Uge,
    }
}

operator_family! {
    /// Lane-wise predicates producing a mask.
    Test {
        /// Lane bits are all zero.
        IsDefault,
        /// Sign bit is set.
        IsNegative,
        IsFinite,
        IsNan,
        IsInfinite,
    }
}

impl Associative {
    /// The lane-wise binary operator folded by this reduction.
    pub const fn binary(self) -> Binary {
        match self {
            Associative::Add => Binary::Add,
            Associative::Mul => Binary::Mul,
            Associative::Min => Binary::Min,
            Associative::Max => Binary::Max,
            Associative::And => Binary::And,
            Associative::Or => Binary::Or,
            Associative::Xor => Binary::Xor,
            Associative::FirstNonzero => Binary::FirstNonzero,
        }
    }
}

impl Comparison {
    /// True for the orderings that compare lane bits as unsigned integers.
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Comparison::Ult | Comparison::Ule | Comparison::Ugt | Comparison::Uge
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_dense() {
        for (i, op) in Binary::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
        assert_eq!(Ternary::COUNT, 2);
        assert_eq!(Associative::ALL.len(), Associative::COUNT);
    }

    #[test]
    fn test_associative_maps_to_binary() {
        assert_eq!(Associative::FirstNonzero.binary(), Binary::FirstNonzero);
        assert_eq!(Associative::And.binary(), Binary::And);
    }

    #[test]
    fn test_unsigned_comparisons() {
        assert!(Comparison::Uge.is_unsigned());
        assert!(!Comparison::Ge.is_unsigned());
    }
}
