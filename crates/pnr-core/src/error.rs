//! Errors raised by value-type arithmetic and conversions.

use thiserror::Error;

/// Failures that can occur while building or combining value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A coordinate sum does not fit the 16-bit tile grid.
    #[error("location sum out of range: ({lhs_x}, {lhs_y}) + ({rhs_x}, {rhs_y})")]
    LocationOverflow {
        /// Left operand x.
        lhs_x: i16,
        /// Left operand y.
        lhs_y: i16,
        /// Right operand x.
        rhs_x: i16,
        /// Right operand y.
        rhs_y: i16,
    },

    /// An integer does not fit the field it is being stored into.
    #[error("value {value} out of range for {field}")]
    OutOfRange {
        /// Field or parameter name.
        field: &'static str,
        /// Offending value.
        value: i64,
    },

    /// A symbolic name does not match any variant of an enumeration.
    #[error("unknown {kind} '{name}'")]
    UnknownName {
        /// Enumeration name, e.g. `PlaceStrength`.
        kind: &'static str,
        /// Name that failed to parse.
        name: String,
    },
}

/// Narrow a wide integer into a field type, reporting the field on failure.
pub fn narrow<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T, CoreError> {
    T::try_from(value).map_err(|_| CoreError::OutOfRange { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrow_accepts_in_range_values() {
        assert_eq!(narrow::<i16>("x", -32768), Ok(-32768));
        assert_eq!(narrow::<u32>("z", 7), Ok(7));
    }

    #[test]
    fn narrow_reports_field_and_value() {
        let err = narrow::<i16>("index", 40_000).unwrap_err();
        assert_eq!(err.to_string(), "value 40000 out of range for index");

        let err = narrow::<u32>("z", -1).unwrap_err();
        assert_eq!(
            err,
            CoreError::OutOfRange {
                field: "z",
                value: -1
            }
        );
    }
}
