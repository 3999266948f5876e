use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::AuthUser,
    models::comment::{CommentResponse, CreateCommentRequest},
    state::AppState,
    store,
    types::{ApiResponse, AppJson},
    validation,
};

pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    AppJson(req): AppJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentResponse>>)> {
    let post_id = validation::uuid("post id", &post_id)?.to_string();
    validation::create_comment(&req)?;

    let id = match store::comment::insert_for_post(&state.db, &post_id, &user.id, &req.content).await {
        Ok(id) => id,
        Err(sqlx::Error::RowNotFound) => return Err(AppError::NotFound("Post not found".to_string())),
        Err(e) => return Err(e.into()),
    };
    let comment = store::comment::find_by_id(&state.db, &id).await?.ok_or_not_found("Comment")?;
    state.metrics.inc_comments();
    info!(user_id = %user.id, post_id = %post_id, comment_id = %id, "Comment added");

    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Comment added successfully", comment.into()))))
}
