#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::tests::{setup_test_app, setup_test_app_with};

    #[tokio::test]
    async fn test_health_endpoint() {
        let t = setup_test_app().await;
        let (status, body) = t.get("/api/v1/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "Plantheon Backend API is running");
    }

    #[tokio::test]
    async fn test_readyz_endpoint() {
        let t = setup_test_app().await;
        let (status, body) = t.get("/api/v1/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_readyz_reports_closed_pool() {
        let t = setup_test_app().await;
        t.state.db.close().await;
        let (status, body) = t.get("/api/v1/readyz", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "database unavailable");
    }

    #[tokio::test]
    async fn test_version_endpoint() {
        let t = setup_test_app().await;
        let (status, body) = t.get("/api/v1/version", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "plantheon");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["build"]["os"].is_string());
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let t = setup_test_app().await;
        t.register("counter").await;

        let (status, body) = t.get("/api/v1/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["registrations"], 1);
        for key in ["logins", "failed_logins", "diseases_created", "diseases_imported", "posts_created", "scans_recorded", "uptime_seconds"] {
            assert!(body[key].is_u64(), "missing {}", key);
        }
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let t = setup_test_app().await;
        let response = t
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.contains_key("referrer-policy"));
        assert!(headers.contains_key("permissions-policy"));
        assert!(headers.contains_key("cross-origin-opener-policy"));
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert!(!headers.contains_key("strict-transport-security"));
    }

    #[tokio::test]
    async fn test_hsts_when_enabled() {
        let t = setup_test_app_with(|cfg| {
            cfg.security = Some(crate::config::SecurityConfig {
                enable_hsts: Some(true),
                hsts_max_age: Some(600),
                hsts_include_subdomains: Some(true),
            })
        })
        .await;
        let response = t
            .app
            .clone()
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers().get("strict-transport-security").unwrap(), "max-age=600; includeSubDomains");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let t = setup_test_app().await;
        let (status, body) = t.get("/api/v1/diseases/%2e%2e/users", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Path traversal detected in request");
    }

    #[tokio::test]
    async fn test_declared_oversized_body_rejected() {
        let t = setup_test_app_with(|cfg| cfg.server.max_body_bytes = 2048).await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/posts")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, "4096")
            .body(Body::from(vec![b' '; 4096]))
            .unwrap();

        let (status, body) = t.send(req).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "Request body exceeds maximum size of 2048 bytes");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let t = setup_test_app().await;
        let (status, _) = t.get("/api/v1/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
