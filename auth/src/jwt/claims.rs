use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Role carried in every token.
///
/// Authorization beyond carrying the claim is out of scope; the service only
/// embeds the role at issuance and echoes it back on refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Freelancer,
    Client,
    Admin,
}

/// Claims payload embedded in access and refresh tokens.
///
/// Both tokens of a pair carry the same payload; they differ only in signing
/// secret and expiration. `jti` is a fresh random identifier minted once per
/// pair so that two pairs for the same user are never byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Email address of the subject
    pub email: String,

    /// Role claim
    pub role: Role,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,

    /// Unique token pair identifier (UUIDv4)
    pub jti: String,
}

impl Claims {
    /// Build claims for a user with expiration relative to now.
    ///
    /// # Arguments
    /// * `sub` - Subject identifier
    /// * `email` - Subject email
    /// * `role` - Role claim
    /// * `ttl` - Time until expiration (may be negative in tests)
    pub fn issue(sub: impl ToString, email: impl ToString, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: sub.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Re-issue claims with the same subject, email, and role but a fresh
    /// `jti` and expiration window.
    pub fn reissue(&self, ttl: Duration) -> Self {
        Self::issue(&self.sub, &self.email, self.role, ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_expiration_window() {
        let claims = Claims::issue("user123", "alice@example.com", Role::Freelancer, Duration::seconds(300));

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_issue_generates_fresh_jti() {
        let first = Claims::issue("user123", "alice@example.com", Role::Freelancer, Duration::seconds(300));
        let second = Claims::issue("user123", "alice@example.com", Role::Freelancer, Duration::seconds(300));

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_reissue_preserves_identity_claims() {
        let original = Claims::issue("user123", "alice@example.com", Role::Client, Duration::seconds(300));
        let reissued = original.reissue(Duration::seconds(300));

        assert_eq!(reissued.sub, original.sub);
        assert_eq!(reissued.email, original.email);
        assert_eq!(reissued.role, original.role);
        assert_ne!(reissued.jti, original.jti);
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&Role::Freelancer).unwrap();
        assert_eq!(json, "\"FREELANCER\"");
    }
}
