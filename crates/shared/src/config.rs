//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Login throttling.
    #[serde(default)]
    pub auth: AuthSettings,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`.
    /// Only enable behind a proxy that overwrites these headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    2_592_000 // 30 days
}

/// Login throttle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Window in which failed logins are counted.
    #[serde(default = "default_login_window")]
    pub login_rate_limit_window_secs: u64,
    /// Failed attempts per username+ip allowed inside the window.
    #[serde(default = "default_login_max_failures")]
    pub login_rate_limit_max_failures: u32,
}

fn default_login_window() -> u64 {
    300
}

fn default_login_max_failures() -> u32 {
    5
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            login_rate_limit_window_secs: default_login_window(),
            login_rate_limit_max_failures: default_login_max_failures(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("MILLION")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("MILLION__DATABASE__URL", Some("sqlite::memory:")),
                ("MILLION__JWT__SECRET", Some("test-secret")),
                ("MILLION__SERVER__PORT", Some("9001")),
                ("MILLION__AUTH__LOGIN_RATE_LIMIT_MAX_FAILURES", Some("3")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.jwt.secret, "test-secret");
                assert_eq!(config.server.port, 9001);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.auth.login_rate_limit_max_failures, 3);
                assert_eq!(config.auth.login_rate_limit_window_secs, 300);
                assert!(config.cors.allowed_origins.is_empty());
                assert!(!config.server.trust_proxy_headers);
            },
        );
    }

    #[test]
    fn test_trust_proxy_headers_from_environment() {
        temp_env::with_vars(
            [
                ("MILLION__DATABASE__URL", Some("sqlite::memory:")),
                ("MILLION__JWT__SECRET", Some("test-secret")),
                ("MILLION__SERVER__TRUST_PROXY_HEADERS", Some("true")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert!(config.server.trust_proxy_headers);
            },
        );
    }

    #[test]
    fn test_missing_secret_fails() {
        temp_env::with_vars(
            [
                ("MILLION__DATABASE__URL", Some("sqlite::memory:")),
                ("MILLION__JWT__SECRET", None::<&str>),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
