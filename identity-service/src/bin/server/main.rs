use std::sync::Arc;

use auth::TokenIssuer;
use identity_service::config::Config;
use identity_service::domain::auth::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::PostgresCredentialRepository;
use identity_service::outbound::session::MokaSessionStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const MAX_CACHED_SESSIONS: u64 = 100_000;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        host = %config.server.host,
        http_port = config.server.http_port,
        access_token_expiry_secs = config.jwt.access_token_expiry_secs,
        refresh_token_expiry_secs = config.jwt.refresh_token_expiry_secs,
        revoke_sessions_on_password_reset = config.security.revoke_sessions_on_password_reset,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let issuer = TokenIssuer::new(
        config.jwt.access_token_secret.as_bytes(),
        config.jwt.access_token_expiry_secs,
        config.jwt.refresh_token_secret.as_bytes(),
        config.jwt.refresh_token_expiry_secs,
    );

    let repository = Arc::new(PostgresCredentialRepository::new(pg_pool));
    let sessions = Arc::new(MokaSessionStore::new(MAX_CACHED_SESSIONS));
    let auth_service = Arc::new(AuthService::new(
        repository,
        sessions,
        issuer,
        config.security.revoke_sessions_on_password_reset,
    ));

    let address = format!("{}:{}", config.server.host, config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(listener, create_router(auth_service)).await?;

    Ok(())
}
