use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::auth::models::PasswordResetCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::SessionStore;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// The target user comes from the verified access token, never from the
/// request body.
pub async fn password_reset<R, S>(
    State(state): State<AppState<R, S>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError>
where
    R: CredentialRepository,
    S: SessionStore,
{
    state
        .auth_service
        .reset_password(&user.user_id, body.into_command())
        .await
        .map_err(ApiError::from)
        .map(|()| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData {
                    message: "Password reset successful".to_string(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    old_password: String,
    new_password: String,
}

impl PasswordResetRequest {
    fn into_command(self) -> PasswordResetCommand {
        PasswordResetCommand {
            old_password: self.old_password,
            new_password: self.new_password,
        }
    }
}
