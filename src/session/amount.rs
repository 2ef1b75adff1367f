//! Parsing of user-entered currency amounts.

use crate::error::ValidationError;

/// Parse a raw amount entered by the user.
///
/// Accepts an optionally signed base-10 integer surrounded by whitespace.
/// Decimal points, grouping separators and currency symbols are rejected.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }

    let value: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: trimmed.to_string(),
    })?;

    non_negative(field, value)
}

/// Reject values below zero.
pub fn non_negative(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    if value < 0 {
        Err(ValidationError::Negative { field, value })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(parse_amount("investment", "20000"), Ok(20000));
        assert_eq!(parse_amount("investment", "0"), Ok(0));
        assert_eq!(parse_amount("investment", " 500 \n"), Ok(500));
        assert_eq!(parse_amount("investment", "+7"), Ok(7));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(
            parse_amount("recovery", "  "),
            Err(ValidationError::Missing { field: "recovery" })
        );
    }

    #[test]
    fn test_parse_not_a_number() {
        for raw in ["abc", "1.5", "1,000", "¥100", "12a"] {
            let err = parse_amount("investment", raw).unwrap_err();
            assert!(
                matches!(err, ValidationError::NotANumber { .. }),
                "{raw} should be rejected as non-numeric"
            );
        }
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(
            parse_amount("investment", "-1"),
            Err(ValidationError::Negative {
                field: "investment",
                value: -1
            })
        );
    }
}
