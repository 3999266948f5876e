use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::AuthUser,
    models::{
        comment::CommentResponse,
        post::{
            CreatePostRequest, Post, PostCounter, PostDetailResponse, PostListResponse, PostResponse,
            UpdatePostRequest,
        },
        user::UserRole,
    },
    state::AppState,
    store,
    types::{message_body, ApiResponse, AppJson},
    validation,
};

/// Validates the path id and loads the post.
async fn load_post(state: &AppState, raw_id: &str) -> AppResult<Post> {
    let id = validation::uuid("post id", raw_id)?;
    store::post::find_by_id(&state.db, &id.to_string()).await?.ok_or_not_found("Post")
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostResponse>>)> {
    validation::create_post(&req)?;

    let id = store::post::insert(&state.db, &user.id, &req).await?;
    let post = store::post::find_by_id(&state.db, &id).await?.ok_or_not_found("Post")?;
    state.metrics.inc_posts();
    info!(user_id = %user.id, post_id = %post.id, "Post created");

    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Post created successfully", post.into()))))
}

pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<ApiResponse<PostListResponse>>> {
    let posts: Vec<PostResponse> = store::post::list_all(&state.db).await?.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::data(PostListResponse { total: posts.len(), posts })))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PostDetailResponse>>> {
    let post = load_post(&state, &id).await?;
    let comment_list: Vec<CommentResponse> =
        store::comment::list_for_post(&state.db, &post.id).await?.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::data(PostDetailResponse { post: post.into(), comment_list })))
}

pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdatePostRequest>,
) -> AppResult<Json<ApiResponse<PostResponse>>> {
    validation::update_post(&req)?;

    let mut post = load_post(&state, &id).await?;
    if post.user_id != user.id {
        return Err(AppError::Forbidden("You can only update your own posts".to_string()));
    }

    if let Some(content) = req.content {
        post.content = content;
    }
    if let Some(links) = req.image_link {
        post.image_link = links;
    }
    if let Some(tags) = req.tags {
        post.tags = tags;
    }
    store::post::update(&state.db, &mut post).await?;
    info!(user_id = %user.id, post_id = %post.id, "Post updated");

    Ok(Json(ApiResponse::with_message("Post updated successfully", post.into())))
}

/// Owners may delete their posts; admins may delete any post.
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let post = load_post(&state, &id).await?;
    if post.user_id != user.id && user.role != UserRole::Admin {
        return Err(AppError::Forbidden("You can only delete your own posts".to_string()));
    }

    let deleted = store::post::delete_with_comments(&state.db, &post.id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    info!(user_id = %user.id, post_id = %post.id, "Post deleted");
    Ok(Json(message_body("Post deleted successfully")))
}

async fn bump(state: &AppState, raw_id: &str, counter: PostCounter) -> AppResult<PostResponse> {
    let id = validation::uuid("post id", raw_id)?.to_string();
    if store::post::bump_counter(&state.db, &id, counter).await? == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    let post = store::post::find_by_id(&state.db, &id).await?.ok_or_not_found("Post")?;
    Ok(post.into())
}

pub async fn like_post(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PostResponse>>> {
    let post = bump(&state, &id, PostCounter::Like).await?;
    Ok(Json(ApiResponse::with_message("Post liked successfully", post)))
}

pub async fn unlike_post(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PostResponse>>> {
    let post = bump(&state, &id, PostCounter::Unlike).await?;
    Ok(Json(ApiResponse::with_message("Post unliked successfully", post)))
}

pub async fn share_post(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PostResponse>>> {
    let post = bump(&state, &id, PostCounter::Share).await?;
    Ok(Json(ApiResponse::with_message("Post shared successfully", post)))
}
