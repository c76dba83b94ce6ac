use chrono::Duration;
use downnote_core::version_policy::{
    VersionPolicy, DEFAULT_CHAR_THRESHOLD, DEFAULT_RETENTION_COUNT, DEFAULT_TIME_THRESHOLD_MINS,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for closing the database pool after the listener stops
    /// (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
    /// Snapshot thresholds and retention.
    pub versioning: VersionPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `VERSION_CHAR_THRESHOLD`      | `100`                      |
    /// | `VERSION_TIME_THRESHOLD_MINS` | `5`                        |
    /// | `VERSION_RETENTION_COUNT`     | `20`                       |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();
        let versioning = version_policy_from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            versioning,
        }
    }
}

/// Read the versioning thresholds.
///
/// # Panics
///
/// Panics on unparsable values or a retention count of zero, which would
/// delete every snapshot right after it is taken.
fn version_policy_from_env() -> VersionPolicy {
    let char_threshold: usize = std::env::var("VERSION_CHAR_THRESHOLD")
        .unwrap_or_else(|_| DEFAULT_CHAR_THRESHOLD.to_string())
        .parse()
        .expect("VERSION_CHAR_THRESHOLD must be a valid usize");

    let time_threshold_mins: i64 = std::env::var("VERSION_TIME_THRESHOLD_MINS")
        .unwrap_or_else(|_| DEFAULT_TIME_THRESHOLD_MINS.to_string())
        .parse()
        .expect("VERSION_TIME_THRESHOLD_MINS must be a valid i64");
    assert!(
        time_threshold_mins >= 0,
        "VERSION_TIME_THRESHOLD_MINS must not be negative"
    );

    let retention_count: usize = std::env::var("VERSION_RETENTION_COUNT")
        .unwrap_or_else(|_| DEFAULT_RETENTION_COUNT.to_string())
        .parse()
        .expect("VERSION_RETENTION_COUNT must be a valid usize");
    assert!(retention_count >= 1, "VERSION_RETENTION_COUNT must be at least 1");

    VersionPolicy {
        char_threshold,
        time_threshold: Duration::minutes(time_threshold_mins),
        retention_count,
    }
}
