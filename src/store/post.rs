use sqlx::{types::Json, SqlitePool};

use crate::db::{new_id, now_ts};
use crate::models::post::{CreatePostRequest, Post, PostCounter};

const POST_SELECT: &str = "SELECT p.id, p.user_id, p.content, p.image_link, p.tags, p.like_num, p.comment_num, \
     p.share_num, u.full_name AS author_name, u.avatar AS author_avatar, p.created_at, p.updated_at \
     FROM posts p LEFT JOIN users u ON u.id = p.user_id";

/// Newest first.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("{POST_SELECT} ORDER BY p.created_at DESC, p.id"))
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns the new post's id.
pub async fn insert(pool: &SqlitePool, user_id: &str, req: &CreatePostRequest) -> Result<String, sqlx::Error> {
    let id = new_id();
    let (_, now_s) = now_ts();
    sqlx::query(
        "INSERT INTO posts (id, user_id, content, image_link, tags, like_num, comment_num, share_num, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 0, 0, 0, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.content)
    .bind(Json(&req.image_link))
    .bind(Json(&req.tags))
    .bind(&now_s)
    .bind(&now_s)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Persists the editable fields of `post` and refreshes `updated_at`.
pub async fn update(pool: &SqlitePool, post: &mut Post) -> Result<(), sqlx::Error> {
    let (now, now_s) = now_ts();
    sqlx::query("UPDATE posts SET content = ?, image_link = ?, tags = ?, updated_at = ? WHERE id = ?")
        .bind(&post.content)
        .bind(Json(&post.image_link))
        .bind(Json(&post.tags))
        .bind(&now_s)
        .bind(&post.id)
        .execute(pool)
        .await?;
    post.updated_at = now;
    Ok(())
}

/// Removes the post and its comments in one transaction.
pub async fn delete_with_comments(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM comments WHERE post_id = ?").bind(id).execute(&mut *tx).await?;
    let res = sqlx::query("DELETE FROM posts WHERE id = ?").bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(res.rows_affected())
}

/// Applies a counter change. `Unlike` never takes the count below zero.
pub async fn bump_counter(pool: &SqlitePool, id: &str, counter: PostCounter) -> Result<u64, sqlx::Error> {
    let set = match counter {
        PostCounter::Like => "like_num = like_num + 1",
        PostCounter::Unlike => "like_num = MAX(like_num - 1, 0)",
        PostCounter::Share => "share_num = share_num + 1",
    };
    let (_, now_s) = now_ts();
    let res = sqlx::query(&format!("UPDATE posts SET {set}, updated_at = ? WHERE id = ?"))
        .bind(&now_s)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
