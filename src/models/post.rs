use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comment::CommentResponse;

pub const UNKNOWN_AUTHOR: &str = "Unknown User";

/// A post joined with its author's display fields. The author columns are
/// `None` once the account is gone.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[sqlx(json)]
    pub image_link: Vec<String>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub like_num: i64,
    pub comment_num: i64,
    pub share_num: i64,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub avatar: String,
    pub content: String,
    pub image_link: Vec<String>,
    pub tags: Vec<String>,
    pub like_number: i64,
    pub comment_number: i64,
    pub share_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            full_name: p.author_name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            avatar: p.author_avatar.unwrap_or_default(),
            content: p.content,
            image_link: p.image_link,
            tags: p.tags,
            like_number: p.like_num,
            comment_number: p.comment_num,
            share_number: p.share_num,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comment_list: Vec<CommentResponse>,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_link: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub content: Option<String>,
    pub image_link: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// Counter mutations exposed as `like` / `unlike` / `share`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Like,
    Unlike,
    Share,
}
