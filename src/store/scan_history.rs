use sqlx::SqlitePool;

use crate::db::{new_id, now_ts};
use crate::models::scan_history::ScanHistory;

const SCAN_COLUMNS: &str = "id, user_id, disease_id, created_at, updated_at";

pub async fn insert(pool: &SqlitePool, user_id: &str, disease_id: &str) -> Result<ScanHistory, sqlx::Error> {
    let (now, now_s) = now_ts();
    let record = ScanHistory {
        id: new_id(),
        user_id: user_id.to_string(),
        disease_id: disease_id.to_string(),
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO scan_histories (id, user_id, disease_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.user_id)
    .bind(&record.disease_id)
    .bind(&now_s)
    .bind(&now_s)
    .execute(pool)
    .await?;
    Ok(record)
}

/// Newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<ScanHistory>, sqlx::Error> {
    sqlx::query_as::<_, ScanHistory>(&format!(
        "SELECT {SCAN_COLUMNS} FROM scan_histories WHERE user_id = ? ORDER BY created_at DESC, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Only returns the record when it belongs to `user_id`.
pub async fn find_for_user(pool: &SqlitePool, id: &str, user_id: &str) -> Result<Option<ScanHistory>, sqlx::Error> {
    sqlx::query_as::<_, ScanHistory>(&format!("SELECT {SCAN_COLUMNS} FROM scan_histories WHERE id = ? AND user_id = ?"))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_for_user(pool: &SqlitePool, id: &str, user_id: &str) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM scan_histories WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_all_for_user(pool: &SqlitePool, user_id: &str) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM scan_histories WHERE user_id = ?").bind(user_id).execute(pool).await?;
    Ok(res.rows_affected())
}
