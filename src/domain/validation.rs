//! Input checks shared by the repositories

use super::DomainError;

/// Reject blank names, returning the trimmed value.
pub fn require_name(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_owned())
}

/// Minimal `local@domain` shape check.
pub fn require_email(value: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::Validation(format!("'{}' is not a valid email address", value));

    let (local, domain) = value.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || value.trim().chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

pub fn require_price(price: f64) -> Result<f64, DomainError> {
    if !price.is_finite() {
        return Err(DomainError::Validation("price must be a finite number".into()));
    }
    Ok(price)
}
