use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::auth::errors::CountryCodeError;
use crate::domain::auth::errors::EmailError;
use crate::domain::auth::errors::PersonNameError;
use crate::domain::auth::models::CountryCode;
use crate::domain::auth::models::EmailAddress;
use crate::domain::auth::models::PersonName;
use crate::domain::auth::models::SignupCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::SessionStore;
use crate::inbound::http::router::AppState;

pub async fn signup<R, S>(
    State(state): State<AppState<R, S>>,
    Json(body): Json<SignupRequest>,
) -> Result<ApiSuccess<UserData>, ApiError>
where
    R: CredentialRepository,
    S: SessionStore,
{
    state
        .auth_service
        .signup(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for signup (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    email: String,
    first_name: String,
    last_name: String,
    #[serde(default)]
    business_name: Option<String>,
    country_code: String,
    password: String,
}

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Error)]
enum ParseSignupRequestError {
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid name: {0}")]
    Name(#[from] PersonNameError),

    #[error("Invalid country code: {0}")]
    CountryCode(#[from] CountryCodeError),

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, ParseSignupRequestError> {
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ParseSignupRequestError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        Ok(SignupCommand {
            email: EmailAddress::new(self.email)?,
            first_name: PersonName::new(self.first_name)?,
            last_name: PersonName::new(self.last_name)?,
            business_name: self.business_name,
            country_code: CountryCode::new(self.country_code)?,
            password: self.password,
        })
    }
}

impl From<ParseSignupRequestError> for ApiError {
    fn from(err: ParseSignupRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
