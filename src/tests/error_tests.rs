#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::error::{AppError, OptionExt};

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("Disease not found".to_string());
        assert_eq!(format!("{}", error), "Not found: Disease not found");

        let error = AppError::RateLimited { retry_after_seconds: 60 };
        assert_eq!(format!("{}", error), "Rate limited. Retry after 60 seconds");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::BadRequest(String::new()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized(String::new()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden(String::new()), StatusCode::FORBIDDEN),
            (AppError::NotFound(String::new()), StatusCode::NOT_FOUND),
            (AppError::Conflict(String::new()), StatusCode::CONFLICT),
            (AppError::PayloadTooLarge(String::new()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::ServiceUnavailable(String::new()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database(String::new()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::RateLimited { retry_after_seconds: 1 }, StatusCode::TOO_MANY_REQUESTS),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_error_envelope() {
        let (status, body) = body_json(AppError::Conflict("Email already exists".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, serde_json::json!({"error": "Email already exists"}));
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (_, body) = body_json(AppError::Internal(anyhow::anyhow!("disk on fire"))).await;
        assert_eq!(body["error"], "Internal server error");

        let (_, body) = body_json(AppError::Database("no such table: diseases".to_string())).await;
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = body_json(sqlx::Error::PoolTimedOut.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited { retry_after_seconds: 42 }.into_response();
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, AppError::Database(_)));

        let err: AppError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_option_ext() {
        let found: Option<u8> = Some(3);
        assert_eq!(found.ok_or_not_found("Disease").unwrap(), 3);

        let missing: Option<u8> = None;
        match missing.ok_or_not_found("Disease") {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Disease not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unique_violation_detection() {
        let pool = crate::tests::memory_pool().await;
        let insert = "INSERT INTO diseases (id, name, class_name, type, created_at, updated_at) \
                      VALUES (?, 'n', 'dup', 't', '2025-01-01T00:00:00.000000Z', '2025-01-01T00:00:00.000000Z')";
        sqlx::query(insert).bind("a").execute(&pool).await.unwrap();
        let err = sqlx::query(insert).bind("b").execute(&pool).await.unwrap_err();

        assert!(crate::error::is_unique_violation(&err));
        assert!(!crate::error::is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
