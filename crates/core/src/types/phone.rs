//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("phone number must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a phone number.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The input has no digits at all.
    #[error("phone number must contain at least one digit")]
    NoDigits,
}

/// A customer phone number.
///
/// Validation is intentionally lenient about formatting so that local and
/// international notations are both accepted.
///
/// ## Constraints
///
/// - Length: 1-15 characters
/// - An optional leading `+`
/// - Otherwise only ASCII digits and the separators space, `-`, `.`, `(`, `)`
/// - At least one digit
///
/// ## Examples
///
/// ```
/// use order_management_core::PhoneNumber;
///
/// // Valid phone numbers
/// assert!(PhoneNumber::parse("0901234567").is_ok());
/// assert!(PhoneNumber::parse("+84 90 123 4567").is_ok());
/// assert!(PhoneNumber::parse("(028) 3822-1234").is_ok());
///
/// // Invalid phone numbers
/// assert!(PhoneNumber::parse("").is_err());                 // empty
/// assert!(PhoneNumber::parse("call me").is_err());          // letters
/// assert!(PhoneNumber::parse("0901234567890123").is_err()); // too long
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Maximum length of a phone number (matches the database column).
    pub const MAX_LENGTH: usize = 15;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 15 characters
    /// - Contains anything other than digits, separators or a leading `+`
    /// - Contains no digits
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(PhoneNumberError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let body = s.strip_prefix('+').unwrap_or(s);

        if let Some(c) = body
            .chars()
            .find(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')')))
        {
            return Err(PhoneNumberError::InvalidCharacter(c));
        }

        if !body.chars().any(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::NoDigits);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PhoneNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PhoneNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PhoneNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
