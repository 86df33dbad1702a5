//! Indian mobile number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits and separators.
    #[error("phone number may only contain digits")]
    NonDigit,
    /// The number does not have 10 significant digits.
    #[error("phone number must have 10 digits")]
    InvalidLength,
    /// Mobile numbers start with 6, 7, 8 or 9.
    #[error("phone number must start with 6, 7, 8 or 9")]
    InvalidPrefix,
}

/// A 10-digit Indian mobile number.
///
/// Spaces, dashes and parentheses are ignored, and a `+91`/`91` country code
/// or a trunk `0` prefix is stripped, so the stored form is always the bare
/// ten digits.
///
/// ```
/// use casawood_core::Phone;
///
/// assert_eq!(Phone::parse("+91 98765 43210").unwrap().as_str(), "9876543210");
/// assert!(Phone::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Number of significant digits.
    pub const DIGITS: usize = 10;

    /// Parse a `Phone` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains letters, does not
    /// reduce to ten digits, or does not start with 6-9.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let body = s.strip_prefix('+').unwrap_or(s);
        let mut digits = String::with_capacity(body.len());
        for c in body.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '(' | ')' => {}
                _ => return Err(PhoneError::NonDigit),
            }
        }

        let all = digits.as_str();
        let national = match all.len() {
            12 => all.strip_prefix("91").unwrap_or(all),
            11 => all.strip_prefix('0').unwrap_or(all),
            _ => all,
        };

        if national.len() != Self::DIGITS {
            return Err(PhoneError::InvalidLength);
        }

        if !matches!(national.chars().next(), Some('6'..='9')) {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(national.to_owned()))
    }

    /// Returns the ten digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

text_newtype_sqlx!(Phone);
