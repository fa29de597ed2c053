use auth::JwtError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for PersonName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonNameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for CountryCode validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CountryCodeError {
    #[error("Invalid ISO 3166-1 alpha-2 country code: {0}")]
    InvalidFormat(String),
}

/// Error for AccountStatus parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountStatusError {
    #[error("Unknown account status: {0}")]
    Unknown(String),
}

/// Error surface of the credential store.
///
/// `DuplicateEmail` is the store's uniqueness constraint firing; the service
/// translates it into a user-facing conflict.
#[derive(Debug, Clone, Error)]
pub enum CredentialStoreError {
    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Record not found")]
    NotFound,

    #[error("Corrupt record: {0}")]
    Decode(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Error surface of the session cache backend.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("Session store backend error: {0}")]
    Backend(String),
}

/// Top-level outcome type of the auth core.
///
/// A tagged kind plus message; callers (the HTTP layer above all) match on
/// the kind, never on a concrete error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Single translation point for token verification failures.
    ///
    /// Expired signatures get a flow-specific message ("Token has expired"
    /// on refresh, "Access token has expired" at the guard); every other
    /// verification failure collapses to "Invalid token". Encoding failures
    /// are not verification outcomes and propagate as unknown errors.
    pub fn from_jwt(err: JwtError, expired_message: &str) -> Self {
        match err {
            JwtError::TokenExpired => AuthError::Unauthorized(expired_message.to_string()),
            JwtError::InvalidToken(_) => AuthError::Unauthorized("Invalid token".to_string()),
            JwtError::EncodingFailed(e) => AuthError::Unknown(e),
        }
    }
}

impl From<CredentialStoreError> for AuthError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::DuplicateEmail => {
                AuthError::Conflict("User with this email already exists".to_string())
            }
            CredentialStoreError::NotFound => AuthError::NotFound("Record not found".to_string()),
            CredentialStoreError::Decode(e) | CredentialStoreError::Database(e) => {
                AuthError::Database(e)
            }
        }
    }
}

impl From<SessionStoreError> for AuthError {
    fn from(err: SessionStoreError) -> Self {
        AuthError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_message_depends_on_flow() {
        let refresh = AuthError::from_jwt(JwtError::TokenExpired, "Token has expired");
        assert_eq!(
            refresh,
            AuthError::Unauthorized("Token has expired".to_string())
        );

        let guard = AuthError::from_jwt(JwtError::TokenExpired, "Access token has expired");
        assert_eq!(
            guard,
            AuthError::Unauthorized("Access token has expired".to_string())
        );
    }

    #[test]
    fn test_any_invalid_token_collapses() {
        let err = AuthError::from_jwt(
            JwtError::InvalidToken("InvalidSignature".to_string()),
            "Token has expired",
        );
        assert_eq!(err, AuthError::Unauthorized("Invalid token".to_string()));
    }

    #[test]
    fn test_duplicate_email_becomes_conflict() {
        let err = AuthError::from(CredentialStoreError::DuplicateEmail);
        assert_eq!(
            err,
            AuthError::Conflict("User with this email already exists".to_string())
        );
    }
}
