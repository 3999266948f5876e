use chrono::{DateTime, Datelike, SubsecRound, Utc};
use sqlx::SqlitePool;

/// Fixed-width RFC 3339 UTC layout. Every timestamp column is written with it so
/// that lexicographic order in SQLite equals chronological order.
pub const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Years that [`TS_FORMAT`] renders with exactly four digits.
pub const MIN_TS_YEAR: i32 = 1;
pub const MAX_TS_YEAR: i32 = 9999;

pub fn ts(dt: &DateTime<Utc>) -> String {
    dt.format(TS_FORMAT).to_string()
}

/// Column text for an exclusive upper bound. `None` when `dt` lies past
/// [`MAX_TS_YEAR`]: chrono writes such years as `+10000-...`, which sorts below
/// every stored value, and no stored value can reach the bound anyway.
pub fn ts_upper_bound(dt: &DateTime<Utc>) -> Option<String> {
    (dt.year() <= MAX_TS_YEAR).then(|| ts(dt))
}

/// Current time truncated to the stored precision, with its column text.
pub fn now_ts() -> (DateTime<Utc>, String) {
    let now = Utc::now().trunc_subsecs(6);
    let s = ts(&now);
    (now, s)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub const LIKE_ESCAPE: char = '!';

/// `%term%` with LIKE wildcards in `term` escaped by [`LIKE_ESCAPE`].
pub fn contains_pattern(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out.push('%');
    out
}

/// Lowercased haystack for catalog search. SQLite's `LIKE` only folds ASCII, so
/// both sides are lowercased in Rust and compared as-is.
pub fn search_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().collect::<Vec<_>>().join("\n").to_lowercase()
}

/// [`contains_pattern`] over the lowercased term, for matching `search_text`.
pub fn search_pattern(term: &str) -> String {
    contains_pattern(&term.to_lowercase())
}

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Comments cascade with their post
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            full_name TEXT NOT NULL DEFAULT '',
            avatar TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS diseases (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            class_name TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            solution TEXT NOT NULL DEFAULT '',
            image_link TEXT NOT NULL DEFAULT '[]',
            plant_name TEXT NOT NULL DEFAULT '',
            search_text TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            type TEXT NOT NULL,
            description TEXT NULL,
            description2 TEXT NULL,
            description3 TEXT NULL,
            time_start TEXT NULL,
            time_end TEXT NULL,
            day INTEGER NULL,
            money REAL NULL,
            is_repeat TEXT NULL,
            repeat TEXT NULL,
            end_repeat_day TEXT NULL,
            alert_time TEXT NULL,
            object TEXT NULL,
            amount INTEGER NULL,
            unit TEXT NULL,
            purpose TEXT NULL,
            target_person TEXT NULL,
            source_person TEXT NULL,
            attached_link TEXT NULL,
            note TEXT NULL,
            search_text TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS posts (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            content TEXT NOT NULL,
            image_link TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            like_num INTEGER NOT NULL DEFAULT 0 CHECK (like_num >= 0),
            comment_num INTEGER NOT NULL DEFAULT 0 CHECK (comment_num >= 0),
            share_num INTEGER NOT NULL DEFAULT 0 CHECK (share_num >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            post_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            content TEXT NOT NULL,
            like_num INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(post_id) REFERENCES posts(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    // No FK to diseases: a history row outlives the catalog entry it points at
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS scan_histories (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            disease_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    // Databases created before search_text existed
    for table in ["diseases", "activities"] {
        let query = format!("ALTER TABLE {} ADD COLUMN search_text TEXT NOT NULL DEFAULT ''", table);
        if let Err(e) = sqlx::query(&query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if !msg.contains("duplicate") && !msg.contains("already exists") {
                        tracing::error!("Failed to add search_text column to {}: {}", table, e);
                        return Err(anyhow::anyhow!("Migration failed: {}", e));
                    }
                }
                _ => {
                    tracing::error!("Unexpected error adding search_text to {}: {}", table, e);
                    return Err(anyhow::anyhow!("Migration failed: {}", e));
                }
            }
        }
    }
    backfill_search_text(pool).await?;

    let indexes = [
        ("idx_diseases_type", "CREATE INDEX IF NOT EXISTS idx_diseases_type ON diseases(type)"),
        ("idx_activities_time_start", "CREATE INDEX IF NOT EXISTS idx_activities_time_start ON activities(time_start)"),
        ("idx_activities_type_created", "CREATE INDEX IF NOT EXISTS idx_activities_type_created ON activities(type, created_at DESC)"),
        ("idx_activities_created", "CREATE INDEX IF NOT EXISTS idx_activities_created ON activities(created_at DESC)"),
        ("idx_posts_created", "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at DESC)"),
        ("idx_comments_post_created", "CREATE INDEX IF NOT EXISTS idx_comments_post_created ON comments(post_id, created_at)"),
        ("idx_scan_histories_user_created", "CREATE INDEX IF NOT EXISTS idx_scan_histories_user_created ON scan_histories(user_id, created_at DESC)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}

/// Fills `search_text` for rows written before the column existed. Name and
/// title are required, so a populated row never has an empty haystack.
async fn backfill_search_text(pool: &SqlitePool) -> anyhow::Result<()> {
    let diseases: Vec<(String, String, String)> =
        sqlx::query_as("SELECT id, name, description FROM diseases WHERE search_text = ''")
            .fetch_all(pool)
            .await?;
    for (id, name, description) in &diseases {
        sqlx::query("UPDATE diseases SET search_text = ? WHERE id = ?")
            .bind(search_text([name.as_str(), description.as_str()]))
            .bind(id)
            .execute(pool)
            .await?;
    }

    type ActivityText = (String, String, Option<String>, Option<String>, Option<String>);
    let activities: Vec<ActivityText> = sqlx::query_as(
        "SELECT id, title, description, description2, description3 FROM activities WHERE search_text = ''",
    )
    .fetch_all(pool)
    .await?;
    for (id, title, d1, d2, d3) in &activities {
        let parts = [Some(title.as_str()), d1.as_deref(), d2.as_deref(), d3.as_deref()];
        sqlx::query("UPDATE activities SET search_text = ? WHERE id = ?")
            .bind(search_text(parts.into_iter().flatten()))
            .bind(id)
            .execute(pool)
            .await?;
    }

    if !diseases.is_empty() || !activities.is_empty() {
        tracing::info!(diseases = diseases.len(), activities = activities.len(), "Backfilled search text");
    }
    Ok(())
}
