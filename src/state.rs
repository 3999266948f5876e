use std::sync::Arc;

use crate::auth::JwtKeys;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::EndpointRateLimiter;

/// Paths guarded by the per-IP auth rate limiter.
pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const REGISTER_PATH: &str = "/api/v1/auth/register";

/// The shared application state.
///
/// Built once in `main` (or a test harness) and cloned into every handler by
/// Axum. Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    ///
    /// Closed by `main` after the server has drained.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Signing and verification keys for bearer tokens.
    pub jwt: Arc<JwtKeys>,
    /// Process-wide counters.
    pub metrics: Metrics,
    /// The per-endpoint rate limiter.
    ///
    /// Only the login and registration endpoints are limited.
    pub rate_limiter: EndpointRateLimiter,
}

impl AppState {
    /// Creates the state with fresh metrics and the auth endpoint limits taken
    /// from `config.rate_limit`.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let max = config.rate_limit.auth_max_requests;
        let window = config.rate_limit.auth_window_seconds;
        let rate_limiter =
            EndpointRateLimiter::new().with_limits(vec![(LOGIN_PATH, max, window), (REGISTER_PATH, max, window)]);

        Self {
            db,
            jwt: Arc::new(JwtKeys::from_config(&config.auth)),
            config: Arc::new(config),
            metrics: Metrics::new(),
            rate_limiter,
        }
    }
}
