use sqlx::SqlitePool;

use crate::db::{new_id, now_ts};
use crate::models::user::{User, UserRole};

const USER_COLUMNS: &str = "id, email, username, password, full_name, avatar, role, created_at, updated_at";

pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &SqlitePool, new: NewUser) -> Result<User, sqlx::Error> {
    let (now, now_s) = now_ts();
    let user = User {
        id: new_id(),
        email: new.email,
        username: new.username,
        password: new.password_hash,
        full_name: new.full_name,
        avatar: String::new(),
        role: new.role,
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO users (id, email, username, password, full_name, avatar, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password)
    .bind(&user.full_name)
    .bind(&user.avatar)
    .bind(user.role)
    .bind(&now_s)
    .bind(&now_s)
    .execute(pool)
    .await?;
    Ok(user)
}

/// Persists the profile fields of `user` and bumps `updated_at` on it.
pub async fn update_profile(pool: &SqlitePool, user: &mut User) -> Result<(), sqlx::Error> {
    let (now, now_s) = now_ts();
    sqlx::query("UPDATE users SET username = ?, full_name = ?, avatar = ?, updated_at = ? WHERE id = ?")
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.avatar)
        .bind(&now_s)
        .bind(&user.id)
        .execute(pool)
        .await?;
    user.updated_at = now;
    Ok(())
}
