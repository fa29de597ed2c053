use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::Claims;
use auth::PasswordHasher;
use auth::Role;
use auth::TokenIssuer;
use auth::TokenPair;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AccountStatus;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::PasswordResetCommand;
use crate::domain::auth::models::SignupCommand;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::SessionStore;

/// The auth core: orchestrates signup, login, token rotation, logout, and
/// password reset over the injected credential store and session cache.
///
/// Holds no mutable state of its own; correctness of the single-active-pair
/// invariant rests on the session store's per-key atomicity and the
/// credential store's transactions.
pub struct AuthService<R, S>
where
    R: CredentialRepository,
    S: SessionStore,
{
    repository: Arc<R>,
    sessions: Arc<S>,
    issuer: TokenIssuer,
    password_hasher: PasswordHasher,
    revoke_sessions_on_password_reset: bool,
}

impl<R, S> AuthService<R, S>
where
    R: CredentialRepository,
    S: SessionStore,
{
    /// Create the service with injected collaborators.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `sessions` - Session cache implementation
    /// * `issuer` - Token pair issuer (both secrets and lifetimes)
    /// * `revoke_sessions_on_password_reset` - Opt-in hardening: delete the
    ///   active session when the password changes
    pub fn new(
        repository: Arc<R>,
        sessions: Arc<S>,
        issuer: TokenIssuer,
        revoke_sessions_on_password_reset: bool,
    ) -> Self {
        Self {
            repository,
            sessions,
            issuer,
            password_hasher: PasswordHasher::new(),
            revoke_sessions_on_password_reset,
        }
    }

    /// Cache TTL for session entries. Equals the refresh-token lifetime so
    /// cache expiry and refresh expiry share one wall-clock boundary.
    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.issuer.refresh_ttl().num_seconds().max(0) as u64)
    }
}

#[async_trait]
impl<R, S> AuthServicePort for AuthService<R, S>
where
    R: CredentialRepository,
    S: SessionStore,
{
    async fn signup(&self, command: SignupCommand) -> Result<User, AuthError> {
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| AuthError::Unknown(format!("Password hashing failed: {}", e)))?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            first_name: command.first_name,
            last_name: command.last_name,
            business_name: command.business_name,
            country_code: command.country_code,
            status: AccountStatus::Active,
            verified: false,
            created_at: Utc::now(),
        };

        let created = self
            .repository
            .create_user_with_credentials(user, password_hash)
            .await?;

        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        // Unknown email and wrong password take the same exit so callers
        // cannot enumerate accounts.
        let Some((auth_record, user)) = self.repository.find_auth_by_email(email).await? else {
            return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
        };

        let password_matches = self
            .password_hasher
            .verify(password, &auth_record.password_hash)
            .map_err(|e| AuthError::Unknown(format!("Password verification failed: {}", e)))?;
        if !password_matches {
            return Err(AuthError::Unauthorized("Invalid credentials".to_string()));
        }

        let tokens = self
            .issuer
            .issue_pair(&user.id.to_string(), user.email.as_str(), Role::Freelancer)
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        self.sessions
            .set(&user.id, tokens.clone(), self.session_ttl())
            .await?;

        self.repository
            .record_login(auth_record.id, Utc::now())
            .await?;

        Ok(LoginOutcome { tokens, user })
    }

    async fn refresh_tokens(&self, submitted: TokenPair) -> Result<TokenPair, AuthError> {
        let claims = self
            .issuer
            .verify_refresh(&submitted.refresh_token)
            .map_err(|e| AuthError::from_jwt(e, "Token has expired"))?;

        let user_id = UserId::from_string(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("Invalid tokens".to_string()))?;

        // The cached pair is the authority: an expired entry, an already
        // rotated pair, a wrong user, or a tampered value all fall through
        // to the same outcome.
        match self.sessions.get(&user_id).await? {
            Some(active) if active == submitted => {}
            _ => return Err(AuthError::Unauthorized("Invalid tokens".to_string())),
        }

        let rotated = self
            .issuer
            .reissue_pair(&claims)
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        // Commit atomically: a concurrent refresh that won the race leaves
        // the entry different from `submitted` and the swap is refused.
        let swapped = self
            .sessions
            .replace_if_match(&user_id, &submitted, rotated.clone(), self.session_ttl())
            .await?;
        if !swapped {
            return Err(AuthError::Unauthorized("Invalid tokens".to_string()));
        }

        Ok(rotated)
    }

    async fn reset_password(
        &self,
        user_id: &UserId,
        command: PasswordResetCommand,
    ) -> Result<(), AuthError> {
        if command.old_password == command.new_password {
            return Err(AuthError::BadRequest(
                "Old and new password cannot be the same".to_string(),
            ));
        }

        let auth_record = self
            .repository
            .find_auth_by_user_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        let old_matches = self
            .password_hasher
            .verify(&command.old_password, &auth_record.password_hash)
            .map_err(|e| AuthError::Unknown(format!("Password verification failed: {}", e)))?;
        if !old_matches {
            return Err(AuthError::BadRequest(
                "Old password is incorrect".to_string(),
            ));
        }

        let password_hash = self
            .password_hasher
            .hash(&command.new_password)
            .map_err(|e| AuthError::Unknown(format!("Password hashing failed: {}", e)))?;

        self.repository
            .update_password_hash(user_id, password_hash)
            .await?;

        if self.revoke_sessions_on_password_reset {
            self.sessions.delete(user_id).await?;
        }

        Ok(())
    }

    async fn logout(&self, user_id: &UserId) -> Result<(), AuthError> {
        self.sessions.delete(user_id).await?;
        Ok(())
    }

    async fn profile(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.repository
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))
    }

    async fn authorize(&self, access_token: &str) -> Result<Claims, AuthError> {
        let claims = self
            .issuer
            .verify_access(access_token)
            .map_err(|e| AuthError::from_jwt(e, "Access token has expired"))?;

        let user_id = UserId::from_string(&claims.sub)
            .map_err(|_| AuthError::Unauthorized("Invalid access token".to_string()))?;

        // Signature validity is necessary but not sufficient: the token must
        // still be the one the session holds.
        match self.sessions.get(&user_id).await? {
            Some(active) if active.access_token == access_token => Ok(claims),
            _ => Err(AuthError::Unauthorized("Invalid access token".to_string())),
        }
    }
}
