use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::password_reset::password_reset;
use super::handlers::profile::profile;
use super::handlers::refresh_tokens::refresh_tokens;
use super::handlers::signup::signup;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::CredentialRepository;
use crate::domain::auth::ports::SessionStore;
use crate::domain::auth::service::AuthService;

pub struct AppState<R, S>
where
    R: CredentialRepository,
    S: SessionStore,
{
    pub auth_service: Arc<AuthService<R, S>>,
}

// Manual impl: a derive would put Clone bounds on R and S
impl<R, S> Clone for AppState<R, S>
where
    R: CredentialRepository,
    S: SessionStore,
{
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
        }
    }
}

pub fn create_router<R, S>(auth_service: Arc<AuthService<R, S>>) -> Router
where
    R: CredentialRepository,
    S: SessionStore,
{
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/auth/signup", post(signup::<R, S>))
        .route("/auth/login", post(login::<R, S>))
        .route("/auth/tokens-refresh", post(refresh_tokens::<R, S>));

    let protected_routes = Router::new()
        .route("/auth/profile", get(profile::<R, S>))
        .route("/auth/password-reset", patch(password_reset::<R, S>))
        .route("/auth/logout", post(logout::<R, S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<R, S>,
        ));

    // Bearer tokens ride in headers, so the span deliberately leaves them out
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use auth::TokenIssuer;
    use axum::http::header;
    use axum::http::StatusCode;
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;
    use serde_json::json;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::domain::auth::errors::CredentialStoreError;
    use crate::domain::auth::models::AuthRecord;
    use crate::domain::auth::models::User;
    use crate::domain::auth::models::UserId;
    use crate::outbound::session::MokaSessionStore;

    mock! {
        pub Repository {}

        #[async_trait]
        impl CredentialRepository for Repository {
            async fn create_user_with_credentials(&self, user: User, password_hash: String) -> Result<User, CredentialStoreError>;
            async fn find_auth_by_email(&self, email: &str) -> Result<Option<(AuthRecord, User)>, CredentialStoreError>;
            async fn find_auth_by_user_id(&self, user_id: &UserId) -> Result<Option<AuthRecord>, CredentialStoreError>;
            async fn find_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, CredentialStoreError>;
            async fn update_password_hash(&self, user_id: &UserId, password_hash: String) -> Result<(), CredentialStoreError>;
            async fn record_login(&self, auth_id: Uuid, at: DateTime<Utc>) -> Result<(), CredentialStoreError>;
        }
    }

    fn router_with(repository: MockRepository) -> Router {
        let issuer = TokenIssuer::new(
            b"test_access_secret_at_least_32_bytes!",
            300,
            b"test_refresh_secret_at_least_32_byte!",
            86_400,
        );
        let service = AuthService::new(
            Arc::new(repository),
            Arc::new(MokaSessionStore::new(10)),
            issuer,
            false,
        );
        create_router(Arc::new(service))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_body(response: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_returns_created_user() {
        let mut repository = MockRepository::new();
        repository
            .expect_create_user_with_credentials()
            .times(1)
            .returning(|user, _| Ok(user));

        let router = router_with(repository);
        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/signup",
                json!({
                    "email": "a@x.com",
                    "firstName": "Alice",
                    "lastName": "Smith",
                    "countryCode": "DE",
                    "password": "_Abc123456"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_body(response).await;
        assert_eq!(body["data"]["email"], "a@x.com");
        assert_eq!(body["data"]["status"], "ACTIVE");
        assert_eq!(body["data"]["verified"], false);
        assert!(body["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_is_conflict() {
        let mut repository = MockRepository::new();
        repository
            .expect_create_user_with_credentials()
            .times(1)
            .returning(|_, _| Err(CredentialStoreError::DuplicateEmail));

        let router = router_with(repository);
        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/signup",
                json!({
                    "email": "a@x.com",
                    "firstName": "Alice",
                    "lastName": "Smith",
                    "countryCode": "DE",
                    "password": "_Abc123456"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = response_body(response).await;
        assert_eq!(
            body["data"]["message"],
            "User with this email already exists"
        );
    }

    #[tokio::test]
    async fn test_signup_rejects_invalid_body() {
        let router = router_with(MockRepository::new());
        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/signup",
                json!({
                    "email": "not-an-email",
                    "firstName": "Alice",
                    "lastName": "Smith",
                    "countryCode": "DE",
                    "password": "_Abc123456"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_email() {
        let mut repository = MockRepository::new();
        repository
            .expect_find_auth_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let router = router_with(repository);
        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/login",
                json!({"email": "a@x.com", "password": "_Abc123456"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response_body(response).await;
        assert_eq!(body["data"]["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_refresh_rejects_malformed_tokens_before_any_lookup() {
        // No repository or cache expectations: the request never gets there
        let router = router_with(MockRepository::new());
        let response = router
            .oneshot(json_request(
                "POST",
                "/auth/tokens-refresh",
                json!({"accessToken": "garbage", "refreshToken": "a.b.c"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_body(response).await;
        assert_eq!(body["data"]["message"], "accessToken must be a JWT");
    }

    #[tokio::test]
    async fn test_protected_route_fails_closed_without_token() {
        let router = router_with(MockRepository::new());
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/auth/profile")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_unknown_token() {
        let router = router_with(MockRepository::new());
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/logout")
                    .header(header::AUTHORIZATION, "Bearer not.a-real.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response_body(response).await;
        assert_eq!(body["data"]["message"], "Invalid token");
    }
}
