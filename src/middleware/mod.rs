//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered onto the router: bearer-token extractors,
//! the auth endpoint rate limiter, request validation and security headers.

pub mod auth;
pub mod ip;
pub mod rate_limit;
pub mod security_headers;
pub mod validation;

pub use auth::{AdminUser, AuthUser};
pub use rate_limit::EndpointRateLimiter;
