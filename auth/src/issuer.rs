use chrono::Duration;
use serde::Deserialize;
use serde::Serialize;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::Role;
use crate::jwt::TokenCodec;

/// An access/refresh token pair.
///
/// Never persisted; exists as the signed bytes handed to the client and as
/// the authoritative copy held in the session cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mints and verifies access/refresh token pairs.
///
/// Holds two codecs with independent secrets and lifetimes: access tokens
/// are short-lived (minutes), refresh tokens long-lived (days). Pair
/// issuance is deterministic given `(sub, email, role)` apart from the
/// timestamp and the random `jti`; caching the pair is the caller's
/// responsibility.
pub struct TokenIssuer {
    access: TokenCodec,
    refresh: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from the two secrets and their lifetimes in seconds.
    pub fn new(
        access_secret: &[u8],
        access_ttl_secs: i64,
        refresh_secret: &[u8],
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            access: TokenCodec::new(access_secret),
            refresh: TokenCodec::new(refresh_secret),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
        }
    }

    /// Mint a fresh token pair for a subject.
    ///
    /// Both tokens share one claims payload (including the `jti`); they
    /// differ in signing secret and expiration.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_pair(&self, sub: &str, email: &str, role: Role) -> Result<TokenPair, JwtError> {
        let claims = Claims::issue(sub, email, role, self.access_ttl);
        self.sign_pair(claims)
    }

    /// Mint a fresh pair carrying the identity of previously verified
    /// claims. Used by token rotation.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn reissue_pair(&self, verified: &Claims) -> Result<TokenPair, JwtError> {
        self.sign_pair(verified.reissue(self.access_ttl))
    }

    fn sign_pair(&self, claims: Claims) -> Result<TokenPair, JwtError> {
        let access_token = self.access.sign(&claims)?;

        let refresh_claims = Claims {
            exp: claims.iat + self.refresh_ttl.num_seconds(),
            ..claims
        };
        let refresh_token = self.refresh.sign(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token against the access secret.
    ///
    /// # Errors
    /// * `TokenExpired` - Past expiration
    /// * `InvalidToken` - Malformed or bad signature
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.access.verify(token)
    }

    /// Verify a refresh token against the refresh secret.
    ///
    /// # Errors
    /// * `TokenExpired` - Past expiration
    /// * `InvalidToken` - Malformed or bad signature
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.refresh.verify(token)
    }

    /// Lifetime of refresh tokens. The session cache TTL must equal this so
    /// cache expiry and refresh expiry fall on the same wall-clock boundary.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new(
            b"access_secret_at_least_32_bytes_long!",
            300,
            b"refresh_secret_at_least_32_bytes_lng!",
            86_400,
        )
    }

    #[test]
    fn test_pair_tokens_verify_under_their_own_secret() {
        let issuer = test_issuer();
        let pair = issuer
            .issue_pair("user123", "alice@example.com", Role::Freelancer)
            .unwrap();

        let access_claims = issuer.verify_access(&pair.access_token).unwrap();
        let refresh_claims = issuer.verify_refresh(&pair.refresh_token).unwrap();

        assert_eq!(access_claims.sub, "user123");
        assert_eq!(refresh_claims.sub, "user123");
        // One payload per pair: the jti binds the two tokens together
        assert_eq!(access_claims.jti, refresh_claims.jti);
    }

    #[test]
    fn test_tokens_do_not_cross_verify() {
        let issuer = test_issuer();
        let pair = issuer
            .issue_pair("user123", "alice@example.com", Role::Freelancer)
            .unwrap();

        assert!(issuer.verify_refresh(&pair.access_token).is_err());
        assert!(issuer.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_refresh_outlives_access() {
        let issuer = test_issuer();
        let pair = issuer
            .issue_pair("user123", "alice@example.com", Role::Freelancer)
            .unwrap();

        let access_claims = issuer.verify_access(&pair.access_token).unwrap();
        let refresh_claims = issuer.verify_refresh(&pair.refresh_token).unwrap();

        assert_eq!(access_claims.exp - access_claims.iat, 300);
        assert_eq!(refresh_claims.exp - refresh_claims.iat, 86_400);
    }

    #[test]
    fn test_reissue_pair_rotates_jti() {
        let issuer = test_issuer();
        let pair = issuer
            .issue_pair("user123", "alice@example.com", Role::Client)
            .unwrap();
        let claims = issuer.verify_refresh(&pair.refresh_token).unwrap();

        let rotated = issuer.reissue_pair(&claims).unwrap();
        assert_ne!(rotated, pair);

        let rotated_claims = issuer.verify_access(&rotated.access_token).unwrap();
        assert_eq!(rotated_claims.sub, claims.sub);
        assert_eq!(rotated_claims.role, claims.role);
        assert_ne!(rotated_claims.jti, claims.jti);
    }
}
