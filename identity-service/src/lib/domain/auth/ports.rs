use std::time::Duration;

use async_trait::async_trait;
use auth::Claims;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::CredentialStoreError;
use crate::domain::auth::errors::SessionStoreError;
use crate::domain::auth::models::AuthRecord;
use crate::domain::auth::models::LoginOutcome;
use crate::domain::auth::models::PasswordResetCommand;
use crate::domain::auth::models::SignupCommand;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;

/// Port for the auth core operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user together with their credential record.
    ///
    /// Does not log the user in; no tokens are issued.
    ///
    /// # Errors
    /// * `Conflict` - Email is already registered
    /// * `Database` - Store operation failed
    async fn signup(&self, command: SignupCommand) -> Result<User, AuthError>;

    /// Verify credentials and open a session.
    ///
    /// Unknown email and wrong password are indistinguishable in the
    /// returned error.
    ///
    /// # Errors
    /// * `Unauthorized` - Invalid credentials
    /// * `Database` - Store or cache operation failed
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError>;

    /// Exchange a valid, currently-active token pair for a fresh one.
    ///
    /// Single-use: the submitted pair is superseded atomically, so replaying
    /// it fails even while it still verifies cryptographically.
    ///
    /// # Errors
    /// * `Unauthorized` - Expired, invalid, or superseded tokens
    /// * `Database` - Cache operation failed
    async fn refresh_tokens(&self, submitted: TokenPair) -> Result<TokenPair, AuthError>;

    /// Change the password of an authenticated user.
    ///
    /// # Errors
    /// * `BadRequest` - Old and new password equal, or old password wrong
    /// * `NotFound` - No credential record for this user
    /// * `Database` - Store operation failed
    async fn reset_password(
        &self,
        user_id: &UserId,
        command: PasswordResetCommand,
    ) -> Result<(), AuthError>;

    /// Revoke the active session, if any. Idempotent.
    ///
    /// # Errors
    /// * `Database` - Cache operation failed
    async fn logout(&self, user_id: &UserId) -> Result<(), AuthError>;

    /// Fetch the profile of an authenticated user.
    ///
    /// # Errors
    /// * `NotFound` - User row does not exist
    /// * `Database` - Store operation failed
    async fn profile(&self, user_id: &UserId) -> Result<User, AuthError>;

    /// Verify a presented access token for a protected request.
    ///
    /// Cryptographic verification alone is not enough: the token must also
    /// byte-match the access token of the cached session, which re-derives
    /// revocation at every authenticated call.
    ///
    /// # Errors
    /// * `Unauthorized` - Expired, invalid, or revoked token
    /// * `Database` - Cache operation failed
    async fn authorize(&self, access_token: &str) -> Result<Claims, AuthError>;
}

/// Persistence operations for user and credential records.
#[async_trait]
pub trait CredentialRepository: Send + Sync + 'static {
    /// Persist a user and their credential record as one atomic unit.
    ///
    /// Both rows are written in a single transaction; a uniqueness violation
    /// on either email column rolls back the whole signup.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `Database` - Database operation failed
    async fn create_user_with_credentials(
        &self,
        user: User,
        password_hash: String,
    ) -> Result<User, CredentialStoreError>;

    /// Look up a credential record by email, with its linked user.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_auth_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(AuthRecord, User)>, CredentialStoreError>;

    /// Look up a credential record by user id.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_auth_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthRecord>, CredentialStoreError>;

    /// Look up a user row by id.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn find_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, CredentialStoreError>;

    /// Overwrite the stored password hash for a user.
    ///
    /// # Errors
    /// * `NotFound` - No credential record for this user
    /// * `Database` - Database operation failed
    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: String,
    ) -> Result<(), CredentialStoreError>;

    /// Stamp the last successful login time on a credential record.
    ///
    /// # Errors
    /// * `Database` - Database operation failed
    async fn record_login(
        &self,
        auth_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;
}

/// Ephemeral store of the currently active token pair per user.
///
/// The authority for revocation: deleting an entry invalidates both tokens
/// instantly regardless of their remaining cryptographic validity. The
/// backend must apply each operation atomically per key.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Store the active pair for a user, replacing any previous one.
    async fn set(
        &self,
        user_id: &UserId,
        tokens: TokenPair,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// Fetch the active pair for a user, if one exists and has not expired.
    async fn get(&self, user_id: &UserId) -> Result<Option<TokenPair>, SessionStoreError>;

    /// Remove the active pair for a user. Removing an absent entry is not an
    /// error.
    async fn delete(&self, user_id: &UserId) -> Result<(), SessionStoreError>;

    /// Atomically replace the entry with `replacement` if and only if the
    /// current value equals `expected`. Returns whether the swap happened.
    ///
    /// Rotation commits through this so that two concurrent refreshes with
    /// the same pair cannot both succeed.
    async fn replace_if_match(
        &self,
        user_id: &UserId,
        expected: &TokenPair,
        replacement: TokenPair,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError>;
}
