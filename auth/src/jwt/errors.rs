use thiserror::Error;

/// Error type for token operations.
///
/// Verification failures are split into expired vs invalid so callers can
/// surface distinct outcomes for the two cases. Verification is
/// all-or-nothing; no claims are returned on failure.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),
}
