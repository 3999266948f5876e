use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use crate::{
    auth::{hash_password, verify_password},
    error::{is_unique_violation, AppError, AppResult},
    models::user::{AuthResponse, LoginRequest, RegisterRequest, UserResponse, UserRole},
    state::AppState,
    store::{self, user::NewUser},
    types::{ApiResponse, AppJson},
    validation,
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let role = validation::register(&req)?;
    if role == UserRole::Admin && !state.config.auth.allow_admin_registration {
        return Err(AppError::Forbidden("Admin registration is disabled".to_string()));
    }

    let email = normalize_email(&req.email);
    let username = req.username.trim().to_string();

    if store::user::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }
    if store::user::find_by_username(&state.db, &username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(req.password, state.config.auth.bcrypt_cost).await?;
    let new_user =
        NewUser { email, username, password_hash, full_name: req.full_name.trim().to_string(), role };
    let user = match store::user::insert(&state.db, new_user).await {
        Ok(user) => user,
        // Lost a race against a concurrent registration
        Err(e) if is_unique_violation(&e) => return Err(AppError::Conflict("User already exists".to_string())),
        Err(e) => return Err(e.into()),
    };

    let token = state.jwt.issue(&user)?;
    state.metrics.inc_registrations();
    info!(user_id = %user.id, role = user.role.as_str(), "User registered");

    let body = AuthResponse { user: UserResponse::from(&user), token };
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("User created successfully", body))))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest("email and password are required".to_string()));
    }

    let email = normalize_email(&req.email);
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let Some(user) = store::user::find_by_email(&state.db, &email).await? else {
        state.metrics.inc_failed_logins();
        warn!("Login rejected: unknown email");
        return Err(invalid());
    };

    if !verify_password(req.password, user.password.clone()).await? {
        state.metrics.inc_failed_logins();
        warn!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let token = state.jwt.issue(&user)?;
    state.metrics.inc_logins();
    info!(user_id = %user.id, "User logged in");

    let body = AuthResponse { user: UserResponse::from(&user), token };
    Ok(Json(ApiResponse::with_message("Login successful", body)))
}
