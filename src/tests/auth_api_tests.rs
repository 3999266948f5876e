#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Utc;
    use serde_json::json;

    use crate::models::user::{User, UserRole};
    use crate::tests::{request, setup_test_app, setup_test_app_with};

    fn register_body(email: &str, username: &str) -> serde_json::Value {
        json!({
            "email": email,
            "username": username,
            "password": "secret123",
            "full_name": "Rosa Canina",
        })
    }

    #[tokio::test]
    async fn test_register_returns_user_and_token() {
        let t = setup_test_app().await;

        let (status, body) =
            t.post("/api/v1/auth/register", None, register_body(" Rosa@Example.COM ", "rosa_c")).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created successfully");
        let user = &body["data"]["user"];
        assert_eq!(user["email"], "rosa@example.com");
        assert_eq!(user["username"], "rosa_c");
        assert_eq!(user["role"], "user");
        assert!(user.get("password").is_none());
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());
        assert_eq!(t.state.metrics.get_snapshot().registrations, 1);
    }

    #[tokio::test]
    async fn test_register_duplicates_conflict() {
        let t = setup_test_app().await;
        t.register("fern").await;

        let (status, body) =
            t.post("/api/v1/auth/register", None, register_body("FERN@example.com", "other")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Email already exists");

        let (status, body) = t.post("/api/v1/auth/register", None, register_body("new@example.com", "fern")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already exists");
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let t = setup_test_app().await;

        let cases = [
            (register_body("not-an-email", "valid_name"), "invalid email format"),
            (register_body("a@example.com", "ab"), "username must be at least 3 characters long"),
            (register_body("a@example.com", "bad name"), "username can only contain letters, numbers, and underscores"),
            (
                json!({"email": "a@example.com", "username": "valid_name", "password": "123", "full_name": "A"}),
                "password must be at least 6 characters long",
            ),
            (
                json!({"email": "a@example.com", "username": "valid_name", "password": "secret123", "full_name": "A", "role": "root"}),
                "role must be either 'user' or 'admin'",
            ),
        ];
        for (payload, message) in cases {
            let (status, body) = t.post("/api/v1/auth/register", None, payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], message);
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let t = setup_test_app().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = t.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request format"));
    }

    #[tokio::test]
    async fn test_admin_self_registration_is_gated() {
        let t = setup_test_app().await;
        let mut payload = register_body("boss@example.com", "boss");
        payload["role"] = json!("admin");

        let (status, _) = t.post("/api/v1/auth/register", None, payload.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let t = setup_test_app_with(|cfg| cfg.auth.allow_admin_registration = true).await;
        let (status, body) = t.post("/api/v1/auth/register", None, payload).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["user"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_login_success_and_failures() {
        let t = setup_test_app().await;
        t.register("ivy").await;

        let (status, body) =
            t.post("/api/v1/auth/login", None, json!({"email": "IVY@example.com", "password": "secret123"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["data"]["user"]["username"], "ivy");

        let (status, body) =
            t.post("/api/v1/auth/login", None, json!({"email": "ivy@example.com", "password": "wrong-pass"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let (status, body) =
            t.post("/api/v1/auth/login", None, json!({"email": "nobody@example.com", "password": "secret123"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let m = t.state.metrics.get_snapshot();
        assert_eq!(m.logins, 1);
        assert_eq!(m.failed_logins, 2);
    }

    #[tokio::test]
    async fn test_login_token_opens_profile() {
        let t = setup_test_app().await;
        t.register("moss").await;
        let (_, body) =
            t.post("/api/v1/auth/login", None, json!({"email": "moss@example.com", "password": "secret123"})).await;
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) = t.get("/api/v1/users/profile", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "moss");
    }

    #[tokio::test]
    async fn test_bearer_token_rejections() {
        let t = setup_test_app().await;

        let (status, body) = t.get("/api/v1/users/profile", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header is required");

        let with_header = |value: &'static str| {
            Request::builder()
                .uri("/api/v1/users/profile")
                .header(header::AUTHORIZATION, value)
                .body(Body::empty())
                .unwrap()
        };

        let (status, body) = t.send(with_header("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid authorization header format");

        let (status, body) = t.send(with_header("Bearer ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token is required");

        let (status, body) = t.send(with_header("Bearer not.a.jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn test_token_for_missing_user_is_rejected() {
        let t = setup_test_app().await;
        let ghost = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: "ghost@example.com".into(),
            username: "ghost".into(),
            password: String::new(),
            full_name: "Ghost".into(),
            avatar: String::new(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let token = t.state.jwt.issue(&ghost).unwrap();

        let (status, body) = t.get("/api/v1/users/profile", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "User not found");
    }

    #[tokio::test]
    async fn test_update_profile() {
        let t = setup_test_app().await;
        let (token, _) = t.register("thyme").await;
        t.register("basil").await;

        let (status, body) = t.put("/api/v1/users/profile", Some(&token), json!({"username": "basil"})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already exists");

        let (status, body) = t.put("/api/v1/users/profile", Some(&token), json!({"full_name": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "full name is required");

        let (status, body) = t
            .put(
                "/api/v1/users/profile",
                Some(&token),
                json!({"username": "thyme_2", "full_name": "Thyme Vulgaris", "avatar": "https://img.example.com/t.png"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["data"]["username"], "thyme_2");
        assert_eq!(body["data"]["avatar"], "https://img.example.com/t.png");

        let (_, body) = t.get("/api/v1/users/profile", Some(&token)).await;
        assert_eq!(body["data"]["full_name"], "Thyme Vulgaris");
    }

    #[tokio::test]
    async fn test_login_rate_limit() {
        let t = setup_test_app_with(|cfg| cfg.rate_limit.auth_max_requests = 2).await;
        let login = || request(Method::POST, "/api/v1/auth/login", None, Some(json!({"email": "x@example.com", "password": "secret123"})));

        let (status, _) = t.send(login()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = t.send(login()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let response = tower::ServiceExt::oneshot(t.app.clone(), login()).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));

        // Other endpoints are not limited
        let (status, _) = t.get("/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
