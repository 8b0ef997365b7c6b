//! Error types for lane-vector operations.
//!
//! Every fallible operation in this crate reports one of the conditions below
//! to its caller. None of them is retried or downgraded internally: masked
//! lanes defaulting to zero is a documented feature, not error recovery.

use std::fmt;

use crate::lane::LaneType;

/// Errors that can occur during lane-vector operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanewiseError {
    /// An index or offset fell outside the legal range of an array, buffer
    /// or vector.
    IndexOutOfBounds {
        /// The offending index (may be negative for gather/scatter maps).
        index: i64,
        /// The length the index was checked against.
        length: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Two operands of different species were combined.
    SpeciesMismatch {
        /// The species the operation required.
        expected: String,
        /// The species that was supplied.
        found: String,
    },
    /// An array or literal list did not have the expected number of lanes.
    LengthMismatch {
        /// The required length.
        expected: usize,
        /// The supplied length.
        found: usize,
    },
    /// A value could not be represented exactly in the destination lane type.
    LossyConversion {
        /// The value that was supplied.
        value: i64,
        /// The value read back after converting to the lane type.
        converted: i64,
        /// The destination lane type.
        lane_type: LaneType,
    },
    /// The operation is not defined for the lane type.
    Unsupported {
        /// Name of the rejected operation.
        operation: String,
        /// The lane type it was requested on.
        lane_type: LaneType,
    },
    /// Integral division with a zero divisor lane.
    DivideByZero {
        /// First lane whose divisor is zero.
        lane: usize,
    },
    /// An argument was outside its documented domain.
    IllegalArgument {
        /// Human-readable error message.
        message: String,
    },
    /// A store targeted a read-only byte buffer.
    ReadOnlyBuffer,
}

impl fmt::Display for LanewiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanewiseError::IndexOutOfBounds {
                index,
                length,
                message,
            } => write!(
                f,
                "Index out of bounds: {} (index {} for length {})",
                message, index, length
            ),
            LanewiseError::SpeciesMismatch { expected, found } => write!(
                f,
                "Species mismatch: expected {}, found {}",
                expected, found
            ),
            LanewiseError::LengthMismatch { expected, found } => write!(
                f,
                "Length mismatch: expected {} lanes, found {}",
                expected, found
            ),
            LanewiseError::LossyConversion {
                value,
                converted,
                lane_type,
            } => write!(
                f,
                "Lossy conversion: {} cannot be represented as {} (converts to {}, mismatch {})",
                value,
                lane_type,
                converted,
                value.wrapping_sub(*converted)
            ),
            LanewiseError::Unsupported {
                operation,
                lane_type,
            } => write!(
                f,
                "Unsupported operation: {} is not supported for {} lanes",
                operation, lane_type
            ),
            LanewiseError::DivideByZero { lane } => {
                write!(f, "Arithmetic error: division by zero in lane {}", lane)
            }
            LanewiseError::IllegalArgument { message } => {
                write!(f, "Illegal argument: {}", message)
            }
            LanewiseError::ReadOnlyBuffer => write!(f, "Byte buffer is read-only"),
        }
    }
}

impl std::error::Error for LanewiseError {}

/// Result type alias for lane-vector operations.
pub type Result<T> = std::result::Result<T, LanewiseError>;

/// Creates an error for a single index outside `[0, length)`.
pub fn index_out_of_bounds(index: i64, length: usize) -> LanewiseError {
    LanewiseError::IndexOutOfBounds {
        index,
        length,
        message: format!("index {index} out of bounds for length {length}"),
    }
}

/// Creates an error for a range `[from, from + size)` exceeding `length`.
pub fn range_out_of_bounds(from: usize, size: usize, length: usize) -> LanewiseError {
    LanewiseError::IndexOutOfBounds {
        index: from as i64,
        length,
        message: format!(
            "range [{from}, {from} + {size}) out of bounds for length {length}"
        ),
    }
}

/// Creates a species mismatch error.
pub fn species_mismatch(expected: impl fmt::Display, found: impl fmt::Display) -> LanewiseError {
    LanewiseError::SpeciesMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

/// Creates a length mismatch error.
pub fn length_mismatch(expected: usize, found: usize) -> LanewiseError {
    LanewiseError::LengthMismatch { expected, found }
}

/// Creates a lossy conversion error.
pub fn lossy_conversion(value: i64, converted: i64, lane_type: LaneType) -> LanewiseError {
    LanewiseError::LossyConversion {
        value,
        converted,
        lane_type,
    }
}

/// Creates an unsupported operation error.
pub fn unsupported(operation: impl fmt::Debug, lane_type: LaneType) -> LanewiseError {
    LanewiseError::Unsupported {
        operation: format!("{operation:?}"),
        lane_type,
    }
}

/// Creates an illegal argument error.
pub fn illegal_argument(message: impl Into<String>) -> LanewiseError {
    LanewiseError::IllegalArgument {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_bounds_display() {
        let error = index_out_of_bounds(-3, 16);
        let display = format!("{}", error);
        assert!(display.contains("Index out of bounds"));
        assert!(display.contains("index -3"));
        assert!(display.contains("length 16"));
    }

    #[test]
    fn test_range_out_of_bounds_display() {
        let error = range_out_of_bounds(6, 4, 8);
        let display = format!("{}", error);
        assert!(display.contains("[6, 6 + 4)"));
        assert!(display.contains("length 8"));
    }

    #[test]
    fn test_lossy_conversion_carries_mismatch() {
        let error = lossy_conversion(300, 44, LaneType::Byte);
        let display = format!("{}", error);
        assert!(display.contains("300"));
        assert!(display.contains("converts to 44"));
        assert!(display.contains("mismatch 256"));
        assert!(display.contains("i8"));
    }

    #[test]
    fn test_unsupported_display() {
        let error = unsupported(crate::operators::Binary::Xor, LaneType::Double);
        assert_eq!(
            format!("{}", error),
            "Unsupported operation: Xor is not supported for f64 lanes"
        );
    }

    #[test]
    fn test_error_equality() {
        let error1 = length_mismatch(4, 3);
        let error2 = length_mismatch(4, 3);
        let error3 = length_mismatch(8, 3);

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = illegal_argument("bad part number");

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
