use axum::{
    extract::{Request, State},
    http::{header::CONTENT_LENGTH, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::AppError;

/// Rejects requests before they reach a handler.
///
/// - Path traversal attempts in the URI → 400.
/// - A declared `Content-Length` above `server.max_body_bytes` on POST/PUT → 413.
/// - Known scanner user agents are logged.
///
/// `DefaultBodyLimit` still guards bodies without a `Content-Length`.
pub async fn validate_request_middleware(
    State(cfg): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    if contains_path_traversal(req.uri().path()) {
        return AppError::bad_request("Path traversal detected in request").into_response();
    }

    if let Some(ua) = req.headers().get("user-agent").and_then(|v| v.to_str().ok()) {
        if is_suspicious_user_agent(ua) {
            tracing::warn!("Suspicious user agent detected: {}", ua);
        }
    }

    if matches!(req.method(), &Method::POST | &Method::PUT) {
        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok());
        let max_body_size = cfg.server.max_body_bytes;
        if declared.is_some_and(|len| len > max_body_size) {
            return AppError::PayloadTooLarge(format!(
                "Request body exceeds maximum size of {} bytes",
                max_body_size
            ))
            .into_response();
        }
    }

    next.run(req).await
}

fn contains_path_traversal(path: &str) -> bool {
    let lower = path.to_lowercase();

    if path.contains("/..") || path.contains("\\..") || path.starts_with("..") {
        return true;
    }
    if path.contains("/./") || path.contains("\\.\\") {
        return true;
    }
    if path.contains("....") {
        return true;
    }

    // Single and double URL encoding
    let encoded_patterns = [
        "%2e%2e",
        "%252e%252e",
        "%2e/",
        "%252e%2f",
        "/%2e",
        "%2f%2e",
        "%2e%5c",
        "%5c%2e",
        "%00",
    ];
    if encoded_patterns.iter().any(|p| lower.contains(p)) {
        return true;
    }

    path.contains('\0')
}

fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ["nikto", "sqlmap", "havij", "acunetix", "masscan"].iter().any(|s| ua_lower.contains(s))
        || ua_lower.contains("scanner")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_detection() {
        assert!(contains_path_traversal("../etc/passwd"));
        assert!(contains_path_traversal("/api/v1/diseases/../users"));
        assert!(contains_path_traversal("/api/v1/%2e%2e/users"));
        assert!(contains_path_traversal("/api/v1/diseases/%00"));

        assert!(!contains_path_traversal("/api/v1/diseases/leaf_rust"));
        assert!(!contains_path_traversal("/api/v1/activities/by-day"));
    }

    #[test]
    fn test_suspicious_user_agents() {
        assert!(is_suspicious_user_agent("nikto/2.1.5"));
        assert!(is_suspicious_user_agent("sqlmap/1.0"));
        assert!(!is_suspicious_user_agent("Mozilla/5.0 (Linux; Android 14)"));
        assert!(!is_suspicious_user_agent("okhttp/4.12.0"));
    }
}
