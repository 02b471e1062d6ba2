//! Million API Server
//!
//! Main entry point for the Million backend service.

use std::net::SocketAddr;

use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use million_api::{AppState, create_router_with_cors};
use million_core::auth::LoginThrottle;
use million_db::{Migrator, connect_with_pool};
use million_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "million=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let throttle = LoginThrottle::new(
        i64::try_from(config.auth.login_rate_limit_window_secs)?,
        u64::from(config.auth.login_rate_limit_max_failures),
    );
    info!(
        window_secs = config.auth.login_rate_limit_window_secs,
        max_failures = config.auth.login_rate_limit_max_failures,
        "Login throttle configured"
    );

    let state = AppState::new(db, jwt_service)
        .with_throttle(throttle)
        .with_trusted_proxy_headers(config.server.trust_proxy_headers);
    let app = create_router_with_cors(state, &config.cors.allowed_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
