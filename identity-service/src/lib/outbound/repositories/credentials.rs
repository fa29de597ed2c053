use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::auth::errors::CredentialStoreError;
use crate::domain::auth::models::AccountStatus;
use crate::domain::auth::models::AuthRecord;
use crate::domain::auth::models::CountryCode;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::PersonName;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialRepository;

/// Postgres-backed credential store.
///
/// Signup writes both rows inside one transaction so the `users` and `auth`
/// email uniqueness constraints roll the whole registration back together.
pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, CredentialStoreError> {
    let decode = |e: sqlx::Error| CredentialStoreError::Decode(e.to_string());

    let status: String = row.try_get("status").map_err(decode)?;
    let email: String = row.try_get("email").map_err(decode)?;
    let first_name: String = row.try_get("first_name").map_err(decode)?;
    let last_name: String = row.try_get("last_name").map_err(decode)?;
    let country_code: String = row.try_get("country_code").map_err(decode)?;

    Ok(User {
        id: UserId(row.try_get("id").map_err(decode)?),
        email: EmailAddress::new(email).map_err(|e| CredentialStoreError::Decode(e.to_string()))?,
        first_name: PersonName::new(first_name)
            .map_err(|e| CredentialStoreError::Decode(e.to_string()))?,
        last_name: PersonName::new(last_name)
            .map_err(|e| CredentialStoreError::Decode(e.to_string()))?,
        business_name: row.try_get("business_name").map_err(decode)?,
        country_code: CountryCode::new(country_code)
            .map_err(|e| CredentialStoreError::Decode(e.to_string()))?,
        status: AccountStatus::from_str(&status)
            .map_err(|e| CredentialStoreError::Decode(e.to_string()))?,
        verified: row.try_get("verified").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

fn auth_from_row(row: &PgRow) -> Result<AuthRecord, CredentialStoreError> {
    let decode = |e: sqlx::Error| CredentialStoreError::Decode(e.to_string());

    let email: String = row.try_get("auth_email").map_err(decode)?;

    Ok(AuthRecord {
        id: row.try_get("auth_id").map_err(decode)?,
        user_id: UserId(row.try_get("auth_user_id").map_err(decode)?),
        email: EmailAddress::new(email).map_err(|e| CredentialStoreError::Decode(e.to_string()))?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        last_login_at: row.try_get("last_login_at").map_err(decode)?,
    })
}

fn map_write_error(e: sqlx::Error) -> CredentialStoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return CredentialStoreError::DuplicateEmail;
        }
    }
    CredentialStoreError::Database(e.to_string())
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn create_user_with_credentials(
        &self,
        user: User,
        password_hash: String,
    ) -> Result<User, CredentialStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, business_name, country_code, status, verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.business_name.as_deref())
        .bind(user.country_code.as_str())
        .bind(user.status.as_str())
        .bind(user.verified)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query(
            r#"
            INSERT INTO auth (id, user_id, email, password_hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit()
            .await
            .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        Ok(user)
    }

    async fn find_auth_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(AuthRecord, User)>, CredentialStoreError> {
        let row = sqlx::query(
            r#"
            SELECT a.id AS auth_id, a.user_id AS auth_user_id, a.email AS auth_email,
                   a.password_hash, a.last_login_at,
                   u.id, u.email, u.first_name, u.last_name, u.business_name,
                   u.country_code, u.status, u.verified, u.created_at
            FROM auth a
            JOIN users u ON u.id = a.user_id
            WHERE a.email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some((auth_from_row(&r)?, user_from_row(&r)?))),
            None => Ok(None),
        }
    }

    async fn find_auth_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthRecord>, CredentialStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id AS auth_id, user_id AS auth_user_id, email AS auth_email,
                   password_hash, last_login_at
            FROM auth
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        row.as_ref().map(auth_from_row).transpose()
    }

    async fn find_user_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<User>, CredentialStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, business_name,
                   country_code, status, verified, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_password_hash(
        &self,
        user_id: &UserId,
        password_hash: String,
    ) -> Result<(), CredentialStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE auth
            SET password_hash = $2
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.0)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CredentialStoreError::NotFound);
        }

        Ok(())
    }

    async fn record_login(
        &self,
        auth_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        sqlx::query(
            r#"
            UPDATE auth
            SET last_login_at = $2
            WHERE id = $1
            "#,
        )
        .bind(auth_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| CredentialStoreError::Database(e.to_string()))?;

        Ok(())
    }
}
