//! IMEI input validation
//!
//! Only the length is checked. The lookup service does its own validation and
//! answers with an error body for malformed identifiers.

use std::fmt;
use thiserror::Error;

/// Number of characters in an IMEI
pub const IMEI_LENGTH: usize = 15;

/// Validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImeiError {
    /// Input does not have exactly [`IMEI_LENGTH`] characters
    #[error("IMEI must be {IMEI_LENGTH} characters long, got {0}")]
    InvalidLength(usize),
}

/// A device identifier accepted for lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imei(String);

impl Imei {
    /// Validates raw user input.
    ///
    /// # Examples
    /// ```
    /// use imeibot::core::validation::Imei;
    ///
    /// assert!(Imei::parse("123456789012345").is_ok());
    /// assert!(Imei::parse("12345").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ImeiError> {
        let length = input.chars().count();
        if length != IMEI_LENGTH {
            return Err(ImeiError::InvalidLength(length));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
