use sqlx::SqlitePool;

use crate::db::{new_id, now_ts};
use crate::models::comment::Comment;

const COMMENT_SELECT: &str = "SELECT c.id, c.post_id, c.user_id, c.content, c.like_num, \
     u.full_name AS author_name, u.avatar AS author_avatar, c.created_at, c.updated_at \
     FROM comments c LEFT JOIN users u ON u.id = c.user_id";

/// Oldest first.
pub async fn list_for_post(pool: &SqlitePool, post_id: &str) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.post_id = ? ORDER BY c.created_at ASC, c.id"))
        .bind(post_id)
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts the comment and increments the post's `comment_num` atomically.
/// Fails with `RowNotFound` (nothing written) when the post does not exist.
pub async fn insert_for_post(
    pool: &SqlitePool,
    post_id: &str,
    user_id: &str,
    content: &str,
) -> Result<String, sqlx::Error> {
    let id = new_id();
    let (_, now_s) = now_ts();
    let mut tx = pool.begin().await?;

    let bumped = sqlx::query("UPDATE posts SET comment_num = comment_num + 1 WHERE id = ?")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;
    if bumped.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(sqlx::Error::RowNotFound);
    }

    sqlx::query(
        "INSERT INTO comments (id, post_id, user_id, content, like_num, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .bind(&now_s)
    .bind(&now_s)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}
