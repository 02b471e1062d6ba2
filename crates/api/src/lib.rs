//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Request extractors
//! - The error-to-response mapping

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::http::HeaderValue;
use million_core::auth::LoginThrottle;
use million_shared::JwtService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Failed-login throttle.
    pub throttle: LoginThrottle,
    /// Whether client addresses are read from proxy headers.
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// Builds state with the default login throttle.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            throttle: LoginThrottle::default(),
            trust_proxy_headers: false,
        }
    }

    /// Replaces the login throttle.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: LoginThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    /// Reads client addresses from `X-Forwarded-For` / `X-Real-IP` instead
    /// of the socket.
    #[must_use]
    pub const fn with_trusted_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

/// Creates the main application router, allowing any origin.
pub fn create_router(state: AppState) -> Router {
    create_router_with_cors(state, &[])
}

/// Creates the main application router with a CORS origin allow-list.
///
/// An empty list allows any origin. Origins that are not valid header values
/// are skipped.
pub fn create_router_with_cors(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    Router::new()
        .merge(routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(allow_origin)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
