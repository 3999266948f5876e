#[cfg(test)]
mod tests {
    use crate::config::{self, AppConfig};
    use std::env;
    use std::fs;
    use tempfile::{Builder, TempDir};

    fn with_secret() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "a-real-deployment-secret".to_string();
        cfg
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.database.url, "sqlite://data/plantheon.db");
        assert_eq!(config.database.max_connections, 16);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert!(!config.auth.allow_admin_registration);
        assert!(config.security.is_none());
        assert!(!config.auth.allow_dev_secret);
        assert!(config::validate(&with_secret()).is_ok());
    }

    #[test]
    fn test_builtin_secret_requires_dev_flag() {
        let mut cfg = AppConfig::default();
        let err = config::validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("built-in development secret"), "{}", err);

        cfg.auth.allow_dev_secret = true;
        assert!(config::validate(&cfg).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = with_secret();
        cfg.server.port = 0;
        assert!(config::validate(&cfg).unwrap_err().to_string().contains("invalid server.port"));

        let mut cfg = with_secret();
        cfg.auth.jwt_secret = "   ".to_string();
        assert!(config::validate(&cfg).unwrap_err().to_string().contains("jwt_secret"));

        let mut cfg = with_secret();
        cfg.auth.bcrypt_cost = 3;
        assert!(config::validate(&cfg).unwrap_err().to_string().contains("bcrypt_cost"));

        let mut cfg = with_secret();
        cfg.auth.token_ttl_hours = 0;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = with_secret();
        cfg.database.max_connections = 0;
        assert!(config::validate(&cfg).is_err());

        let mut cfg = with_secret();
        cfg.rate_limit.auth_window_seconds = 0;
        assert!(config::validate(&cfg).is_err());
    }

    // The only test that touches process environment
    #[test]
    fn test_config_file_and_env_layering() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        fs::write(
            file.path(),
            r#"
[server]
port = 9090

[auth]
jwt_secret = "layered-secret"
token_ttl_hours = 48
allow_admin_registration = true

[security]
enable_hsts = true
"#,
        )
        .unwrap();
        file.as_file_mut().sync_all().unwrap();

        env::set_var("PLANTHEON_CONFIG", file.path());
        env::set_var("PLANTHEON__RATE_LIMIT__AUTH_MAX_REQUESTS", "7");
        let loaded = config::load();
        env::remove_var("PLANTHEON_CONFIG");
        env::remove_var("PLANTHEON__RATE_LIMIT__AUTH_MAX_REQUESTS");

        let cfg = loaded.unwrap();
        if env::var("PORT").is_err() {
            assert_eq!(cfg.server.port, 9090);
        }
        if env::var("JWT_SECRET").is_err() {
            assert_eq!(cfg.auth.jwt_secret, "layered-secret");
        }
        assert_eq!(cfg.auth.token_ttl_hours, 48);
        assert!(cfg.auth.allow_admin_registration);
        assert_eq!(cfg.rate_limit.auth_max_requests, 7);
        assert_eq!(cfg.security.and_then(|s| s.enable_hsts), Some(true));
        // Untouched keys keep their defaults
        assert_eq!(cfg.database.max_connections, 16);
    }

    #[test]
    fn test_ensure_sqlite_parent_dir() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("plantheon.db");
        let url = format!("sqlite://{}", db_path.display());

        config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(dir.path().join("nested").is_dir());

        // Non-file URLs are left alone
        config::ensure_sqlite_parent_dir("sqlite::memory:").unwrap();
        config::ensure_sqlite_parent_dir("sqlite://:memory:").unwrap();
    }
}
