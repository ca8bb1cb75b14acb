//! Server configuration loaded from environment variables.
//!
//! All settings have defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use vellum_shared::constants::{DEFAULT_API_PREFIX, DEFAULT_HTTP_PORT};
use vellum_store::CommentTypePolicy;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: none (platform data directory).
    pub database_path: Option<PathBuf>,

    /// Path prefix the REST routes are nested under.
    /// Env: `API_PREFIX`
    /// Default: `/api`
    pub api_prefix: String,

    /// Handling of comment types missing from the lookup table.
    /// Env: `UNKNOWN_COMMENT_TYPE` (`reject` | `general`)
    /// Default: `reject`
    pub comment_type_policy: CommentTypePolicy,

    /// Allow cross-origin requests from any origin.
    /// Env: `CORS_ALLOW_ANY` (true/false)
    /// Default: `true`
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            comment_type_policy: CommentTypePolicy::default(),
            cors_allow_any: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Used by
    /// [`from_env`](Self::from_env) and by tests.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = var("DATABASE_PATH") {
            if !path.trim().is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(prefix) = var("API_PREFIX") {
            match normalize_prefix(&prefix) {
                Some(p) => config.api_prefix = p,
                None => tracing::warn!(value = %prefix, "Invalid API_PREFIX, using default"),
            }
        }

        if let Some(val) = var("UNKNOWN_COMMENT_TYPE") {
            match val.parse::<CommentTypePolicy>() {
                Ok(policy) => config.comment_type_policy = policy,
                Err(e) => tracing::warn!(error = %e, "Invalid UNKNOWN_COMMENT_TYPE, using default"),
            }
        }

        if let Some(val) = var("CORS_ALLOW_ANY") {
            config.cors_allow_any = val != "false" && val != "0";
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }
}

/// `"api/"` -> `"/api"`. The root prefix `/` is rejected: axum cannot nest at
/// the root and `/health` already lives there.
fn normalize_prefix(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    Some(format!("/{trimmed}"))
}
