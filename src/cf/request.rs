//! Request validation
//!
//! Every request type is checked before any I/O happens: a request missing
//! a required field never reaches root discovery, the token issuer or the API.

use crate::error::{Error, Result};

/// Checks a request's required fields
pub trait Validate {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Fail when a required string field is empty
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must be present"));
    }
    Ok(())
}

/// Fail when an id placed in the request path is empty or a dot segment
///
/// `.` and `..` would be collapsed by URL normalization, turning a call on
/// one resource into a call on its collection.
pub fn require_id(field: &'static str, value: &str) -> Result<()> {
    require(field, value)?;
    if matches!(value.trim(), "." | "..") {
        return Err(Error::validation(field, "must not be a dot segment"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("service_key_id", "abc").is_ok());

        let err = require("service_key_id", "  ").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("service_key_id must be present"));
    }

    #[test]
    fn test_require_id_rejects_dot_segments() {
        assert!(require_id("service_key_id", "79aa4b11").is_ok());
        assert!(require_id("service_key_id", "a.b").is_ok());
        assert!(require_id("service_key_id", "...").is_ok());

        for id in [".", "..", " .. ", ""] {
            let err = require_id("service_key_id", id).unwrap_err();
            assert!(err.is_validation(), "{:?} should be rejected", id);
        }
    }
}
