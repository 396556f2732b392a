//! Logical data types and typed parameters.
//!
//! [`DataType`] bridges the type codes a driver reports and the host
//! [`Value`](crate::Value) representations; [`DataParam`] pairs a type with a
//! value that is already in the type's canonical representation.

mod data_type;
mod param;
pub mod temporal;

pub use data_type::DataType;
pub use param::{DataParam, Params};

/// Why a value could not be converted to a target type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The source representation can never be converted to the target.
    #[error("cannot convert {from} to {to}")]
    Incompatible {
        /// Source representation class.
        from: &'static str,
        /// Target type or class.
        to: &'static str,
    },

    /// A numeric narrowing would drop a nonzero fractional part.
    #[error("{value} has a fractional part and cannot be converted to {to}")]
    FractionalPart {
        /// The offending value.
        value: String,
        /// Target type or class.
        to: &'static str,
    },

    /// The value does not fit the target.
    #[error("{value} is out of range for {to}")]
    OutOfRange {
        /// The offending value.
        value: String,
        /// Target type or class.
        to: &'static str,
    },

    /// Text does not match the expected format.
    #[error("cannot parse '{text}' as {to} (expected {expected})")]
    Unparseable {
        /// The text that failed to parse.
        text: String,
        /// Target type or class.
        to: &'static str,
        /// The expected format.
        expected: &'static str,
    },
}

/// Converts a float to an integer without truncation.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn integral_from_f64(value: f64, to: &'static str) -> Result<i64, ConversionError> {
    if !value.is_finite() {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            to,
        });
    }
    if value.fract() != 0.0 {
        return Err(ConversionError::FractionalPart {
            value: value.to_string(),
            to,
        });
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(ConversionError::OutOfRange {
            value: value.to_string(),
            to,
        });
    }
    Ok(value as i64)
}
