//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::AppError;
use crate::utils::quantity;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: employee, product, cage, asset, job title, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Long free text (job descriptions)
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Short identifiers: phone, SKU, asset code, unit, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MIN_PASSWORD_LEN: usize = 6;

/// URLs / upload paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Numeric limits ──────────────────────────────────────────────────

/// Head counts (fish, eggs, asset units); sums of two stay far from `i64::MAX`
pub const MAX_COUNT: i64 = 1_000_000_000_000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Minimal email shape check: `local@domain`
pub fn validate_email(value: &str, field: &str) -> Result<(), AppError> {
    validate_required_text(value, field, MAX_EMAIL_LEN)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !value.contains(' ') => {
            Ok(())
        }
        _ => Err(AppError::validation(format!("{field} is not a valid email address"))
            .with_detail("field", field)),
    }
}

pub fn validate_optional_email(value: &Option<String>, field: &str) -> Result<(), AppError> {
    match value {
        Some(v) if !v.is_empty() => validate_email(v, field),
        _ => Ok(()),
    }
}

/// Optional `YYYY-MM-DD` date
pub fn validate_optional_date(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value
        && !shared::util::is_valid_date(v)
    {
        return Err(
            AppError::validation(format!("{field} must be a date in YYYY-MM-DD format"))
                .with_detail("field", field),
        );
    }
    Ok(())
}

/// Finite and `>= 0`
pub fn validate_non_negative(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!("{field} must be zero or greater"))
            .with_detail("field", field));
    }
    Ok(())
}

/// Finite and `> 0`
pub fn validate_positive(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::validation(format!("{field} must be greater than zero"))
            .with_detail("field", field));
    }
    Ok(())
}

/// `> 0` once rounded to the stored 3 decimal places
pub fn validate_quantity(value: f64, field: &str) -> Result<(), AppError> {
    validate_positive(value, field)?;
    if !quantity::is_positive(value) {
        return Err(AppError::validation(format!(
            "{field} must be at least 0.001"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// `0..=MAX_COUNT`
pub fn validate_non_negative_count(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::validation(format!("{field} must be zero or greater"))
            .with_detail("field", field));
    }
    if value > MAX_COUNT {
        return Err(AppError::validation(format!("{field} must be at most {MAX_COUNT}"))
            .with_detail("field", field));
    }
    Ok(())
}
