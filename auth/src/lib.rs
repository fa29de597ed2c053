//! Authentication infrastructure library
//!
//! Provides the cryptographic building blocks for the identity service:
//! - Password hashing (Argon2id)
//! - Signed, expiring claims tokens (JWT, HS256)
//! - Access/refresh token pair issuance with independent secrets and lifetimes
//!
//! The service defines its own orchestration on top of these primitives; this
//! crate holds no session or persistence state.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{Role, TokenIssuer};
//!
//! let issuer = TokenIssuer::new(
//!     b"access_secret_at_least_32_bytes_long!",
//!     300,
//!     b"refresh_secret_at_least_32_bytes_lng!",
//!     86_400,
//! );
//! let pair = issuer.issue_pair("user123", "alice@example.com", Role::Freelancer).unwrap();
//! let claims = issuer.verify_access(&pair.access_token).unwrap();
//! assert_eq!(claims.sub, "user123");
//! ```

pub mod issuer;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use issuer::TokenIssuer;
pub use issuer::TokenPair;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::Role;
pub use jwt::TokenCodec;
pub use password::PasswordError;
pub use password::PasswordHasher;
