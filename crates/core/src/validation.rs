//! Shared input validation helpers.
//!
//! Each helper names the offending field in its `CoreError::Validation`
//! message so handlers can surface it unchanged.

use crate::error::CoreError;

/// Maximum length for short free-text names (goal names, categories).
pub const MAX_NAME_LENGTH: usize = 200;

/// Largest accepted money amount, in major units.
///
/// Keeps every amount well inside the range where `f64` holds whole cents
/// exactly and where cent sums fit in an `i64`.
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

fn validate_at_most_max(value: f64, name: &str) -> Result<(), CoreError> {
    if value > MAX_AMOUNT {
        return Err(CoreError::Validation(format!(
            "{name} must be at most {MAX_AMOUNT}, got {value}"
        )));
    }
    Ok(())
}

/// Validate that an amount is finite, `>= 0` and at most [`MAX_AMOUNT`].
pub fn validate_non_negative(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    validate_at_most_max(value, name)
}

/// Validate that an amount is finite, strictly positive and at most [`MAX_AMOUNT`].
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be greater than zero, got {value}"
        )));
    }
    validate_at_most_max(value, name)
}

/// Validate that a name is non-blank and at most [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(value: &str, name: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{name} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an ISO 4217 style currency code: three uppercase ASCII letters.
pub fn validate_currency(code: &str) -> Result<(), CoreError> {
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(CoreError::Validation(format!(
            "currency must be a three-letter code such as USD, got {code:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_rejects_nan_and_negative() {
        assert!(validate_non_negative(0.0, "amount").is_ok());
        assert!(validate_non_negative(-0.01, "amount").is_err());
        assert!(validate_non_negative(f64::NAN, "amount").is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(validate_positive(0.0, "amount").is_err());
        assert!(validate_positive(f64::INFINITY, "amount").is_err());
        assert!(validate_positive(0.01, "amount").is_ok());
    }

    #[test]
    fn amounts_are_capped() {
        assert!(validate_positive(MAX_AMOUNT, "amount").is_ok());
        assert!(validate_non_negative(MAX_AMOUNT, "income").is_ok());
        let err = validate_positive(6e16, "amount").unwrap_err();
        assert!(err.to_string().contains("at most"));
        assert!(validate_non_negative(MAX_AMOUNT + 0.01, "income").is_err());
    }

    #[test]
    fn name_rejects_blank_and_overlong() {
        assert!(validate_name("   ", "name").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LENGTH + 1), "name").is_err());
        assert!(validate_name("Holiday fund", "name").is_ok());
    }

    #[test]
    fn currency_must_be_three_uppercase_letters() {
        assert!(validate_currency("EUR").is_ok());
        assert!(validate_currency("eur").is_err());
        assert!(validate_currency("EURO").is_err());
        assert!(validate_currency("").is_err());
    }

    #[test]
    fn error_message_names_the_field() {
        let err = validate_positive(-1.0, "deposit").unwrap_err();
        assert!(err.to_string().contains("deposit"));
    }
}
