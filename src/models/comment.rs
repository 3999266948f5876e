use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::UNKNOWN_AUTHOR;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub like_num: i64,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub full_name: String,
    pub avatar: String,
    pub content: String,
    pub like_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            user_id: c.user_id,
            full_name: c.author_name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            avatar: c.author_avatar.unwrap_or_default(),
            content: c.content,
            like_number: c.like_num,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
}
