use auth::Role;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::SessionStore;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the verified caller identity through a request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

/// Middleware guarding protected routes.
///
/// Fails closed on a missing or malformed bearer header. A token that
/// verifies cryptographically is still rejected unless it matches the
/// session cache, so revocation takes effect on the very next request.
pub async fn authenticate<R, S>(
    State(state): State<AppState<R, S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response>
where
    R: CredentialRepository,
    S: SessionStore,
{
    let token = extract_token_from_header(&req)?;

    let claims = state.auth_service.authorize(token).await.map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        ApiError::from(e).into_response()
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::error!(error = %e, "Malformed subject in verified token");
        ApiError::Unauthorized("Invalid token".to_string()).into_response()
    })?;

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized("Missing Authorization header".to_string()).into_response()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        ApiError::Unauthorized("Invalid Authorization header".to_string()).into_response()
    })?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
        .into_response()
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with_header(value: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/auth/profile");
        if let Some(value) = value {
            builder = builder.header(http::header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extracts_bearer_token() {
        let req = request_with_header(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_token_from_header(&req).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_fails_closed() {
        let req = request_with_header(None);
        assert!(extract_token_from_header(&req).is_err());
    }

    #[test]
    fn test_non_bearer_scheme_fails_closed() {
        let req = request_with_header(Some("Basic dXNlcjpwYXNz"));
        assert!(extract_token_from_header(&req).is_err());
    }
}
