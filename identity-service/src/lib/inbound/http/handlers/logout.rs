use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::SessionStore;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn logout<R, S>(
    State(state): State<AppState<R, S>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<MessageData>, ApiError>
where
    R: CredentialRepository,
    S: SessionStore,
{
    state
        .auth_service
        .logout(&user.user_id)
        .await
        .map_err(ApiError::from)
        .map(|()| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageData {
                    message: "Logged out successfully".to_string(),
                },
            )
        })
}
