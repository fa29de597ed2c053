use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::errors::AccountStatusError;
use crate::domain::auth::errors::CountryCodeError;
use crate::domain::auth::errors::EmailError;
use crate::domain::auth::errors::PersonNameError;
use crate::domain::auth::errors::UserIdError;

/// User aggregate entity.
///
/// The identity-facing profile. Created on signup together with its
/// credential record; credentials live separately in [`AuthRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub business_name: Option<String>,
    pub country_code: CountryCode,
    pub status: AccountStatus,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Credential record, one-to-one with a [`User`].
///
/// Duplicates the email so credential lookup never touches the users table.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Name value type for first/last name fields.
///
/// Non-empty after trimming, at most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 50;

    /// Create a new validated name.
    ///
    /// # Errors
    /// * `Empty` - Name is empty or whitespace
    /// * `TooLong` - Name longer than 50 characters
    pub fn new(name: String) -> Result<Self, PersonNameError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(PersonNameError::Empty);
        }

        let length = name.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(PersonNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// ISO 3166-1 alpha-2 country code.
///
/// Two ASCII letters, normalized to uppercase. Membership in the assigned
/// code list is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryCode(String);

impl CountryCode {
    /// Create a new validated country code.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not exactly two ASCII letters
    pub fn new(code: String) -> Result<Self, CountryCodeError> {
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(CountryCodeError::InvalidFormat(code))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Suspended => "SUSPENDED",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = AccountStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(AccountStatus::Active),
            "SUSPENDED" => Ok(AccountStatus::Suspended),
            other => Err(AccountStatusError::Unknown(other.to_string())),
        }
    }
}

/// Command to register a new user with validated fields.
#[derive(Debug)]
pub struct SignupCommand {
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub business_name: Option<String>,
    pub country_code: CountryCode,
    pub password: String,
}

/// Command to change a password for an authenticated user.
#[derive(Debug)]
pub struct PasswordResetCommand {
    pub old_password: String,
    pub new_password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub tokens: auth::TokenPair,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_trims_and_accepts() {
        let name = PersonName::new("  Alice ".to_string()).unwrap();
        assert_eq!(name.as_str(), "Alice");
    }

    #[test]
    fn test_person_name_rejects_empty() {
        assert!(matches!(
            PersonName::new("   ".to_string()),
            Err(PersonNameError::Empty)
        ));
    }

    #[test]
    fn test_person_name_rejects_too_long() {
        let result = PersonName::new("a".repeat(51));
        assert!(matches!(result, Err(PersonNameError::TooLong { .. })));
    }

    #[test]
    fn test_country_code_normalizes_case() {
        let code = CountryCode::new("de".to_string()).unwrap();
        assert_eq!(code.as_str(), "DE");
    }

    #[test]
    fn test_country_code_rejects_bad_input() {
        assert!(CountryCode::new("DEU".to_string()).is_err());
        assert!(CountryCode::new("D1".to_string()).is_err());
        assert!(CountryCode::new("".to_string()).is_err());
    }

    #[test]
    fn test_email_address_validation() {
        assert!(EmailAddress::new("alice@example.com".to_string()).is_ok());
        assert!(EmailAddress::new("not-an-email".to_string()).is_err());
    }

    #[test]
    fn test_account_status_round_trip() {
        assert_eq!(AccountStatus::from_str("ACTIVE").unwrap(), AccountStatus::Active);
        assert_eq!(AccountStatus::Suspended.as_str(), "SUSPENDED");
        assert!(AccountStatus::from_str("unknown").is_err());
    }
}
