use axum::{extract::State, Json};
use tracing::info;

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    middleware::AuthUser,
    models::user::{UpdateProfileRequest, UserResponse},
    state::AppState,
    store,
    types::{ApiResponse, AppJson},
    validation,
};

pub async fn get_profile(AuthUser(user): AuthUser) -> Json<ApiResponse<UserResponse>> {
    Json(ApiResponse::data(UserResponse::from(&user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    validation::update_profile(&req)?;

    if let Some(username) = req.username.as_deref().map(str::trim) {
        if username != user.username {
            if store::user::find_by_username(&state.db, username).await?.is_some() {
                return Err(AppError::Conflict("Username already exists".to_string()));
            }
            user.username = username.to_string();
        }
    }
    if let Some(full_name) = req.full_name {
        user.full_name = full_name.trim().to_string();
    }
    if let Some(avatar) = req.avatar {
        user.avatar = avatar;
    }

    match store::user::update_profile(&state.db, &mut user).await {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    }
    info!(user_id = %user.id, "Profile updated");

    Ok(Json(ApiResponse::with_message("Profile updated successfully", UserResponse::from(&user))))
}
