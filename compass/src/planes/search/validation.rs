use shared::{Error, Result};

/// Trimmed, non-empty required string.
pub(crate) fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::validation(field, "is required")),
    }
}

pub(crate) fn hotel_id(value: &str) -> Result<&str> {
    let id = required("hotelId", Some(value))?;
    if id.chars().any(char::is_whitespace) {
        return Err(Error::validation("hotelId", "must not contain whitespace"));
    }
    Ok(id)
}

/// A count that must be at least one, falling back to `default` when absent.
pub(crate) fn at_least_one(field: &'static str, value: Option<u32>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(0) => Err(Error::validation(field, "must be at least 1")),
        Some(n) => Ok(n),
    }
}

/// ISO 4217-shaped code, normalized to upper case.
pub(crate) fn currency_code(field: &'static str, value: &str) -> Result<String> {
    let code = value.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::validation(
            field,
            format!("'{}' is not a three-letter currency code", code),
        ));
    }
    Ok(code.to_ascii_uppercase())
}
