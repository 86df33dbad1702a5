//! Indian postal code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// Not exactly six digits.
    #[error("pincode must be exactly 6 digits")]
    InvalidFormat,
    /// Postal zones are numbered 1-9.
    #[error("pincode cannot start with 0")]
    LeadingZero,
}

/// A six-digit Indian PIN code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a `Pincode`, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is six ASCII digits not starting
    /// with zero.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PincodeError::InvalidFormat);
        }
        if s.starts_with('0') {
            return Err(PincodeError::LeadingZero);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

text_newtype_sqlx!(Pincode);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Pincode::parse(" 560001 ").unwrap().as_str(), "560001");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Pincode::parse("56001"), Err(PincodeError::InvalidFormat));
        assert_eq!(Pincode::parse("5600011"), Err(PincodeError::InvalidFormat));
        assert_eq!(Pincode::parse("56OO01"), Err(PincodeError::InvalidFormat));
        assert_eq!(Pincode::parse("012345"), Err(PincodeError::LeadingZero));
    }
}
