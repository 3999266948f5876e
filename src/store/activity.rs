use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::{now_ts, search_pattern, search_text, ts, ts_upper_bound};
use crate::models::activity::{Activity, ActivityDayItem};
use crate::types::{ListFilter, Pagination};

const ACTIVITY_COLUMNS: &str = "id, title, type, description, description2, description3, time_start, time_end, \
     day, money, is_repeat, repeat, end_repeat_day, alert_time, object, amount, unit, purpose, \
     target_person, source_person, attached_link, note, created_at, updated_at";

fn opt_ts(value: Option<DateTime<Utc>>) -> Option<String> {
    value.as_ref().map(ts)
}

fn haystack(a: &Activity) -> String {
    let parts = [Some(a.title.as_str()), a.description.as_deref(), a.description2.as_deref(), a.description3.as_deref()];
    search_text(parts.into_iter().flatten())
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a ListFilter) {
    match filter {
        ListFilter::All => {}
        ListFilter::Type(kind) => {
            qb.push(" WHERE type = ").push_bind(kind.as_str());
        }
        ListFilter::Search(term) => {
            qb.push(" WHERE search_text LIKE ").push_bind(search_pattern(term)).push(" ESCAPE '!'");
        }
    }
}

pub async fn count(pool: &SqlitePool, filter: &ListFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM activities");
    push_filter(&mut qb, filter);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Newest first.
pub async fn list_page(
    pool: &SqlitePool,
    filter: &ListFilter,
    page: Pagination,
) -> Result<(Vec<Activity>, i64), sqlx::Error> {
    let total = count(pool, filter).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {ACTIVITY_COLUMNS} FROM activities"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, id LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<Activity>().fetch_all(pool).await?;
    Ok((rows, total))
}

pub async fn list_all(pool: &SqlitePool, filter: &ListFilter) -> Result<Vec<Activity>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {ACTIVITY_COLUMNS} FROM activities"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, id");
    qb.build_query_as::<Activity>().fetch_all(pool).await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Activity>, sqlx::Error> {
    sqlx::query_as::<_, Activity>(&format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &SqlitePool, a: &Activity) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO activities ({ACTIVITY_COLUMNS}, search_text) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&a.id)
    .bind(&a.title)
    .bind(&a.activity_type)
    .bind(&a.description)
    .bind(&a.description2)
    .bind(&a.description3)
    .bind(opt_ts(a.time_start))
    .bind(opt_ts(a.time_end))
    .bind(a.day)
    .bind(a.money)
    .bind(&a.is_repeat)
    .bind(&a.repeat)
    .bind(opt_ts(a.end_repeat_day))
    .bind(&a.alert_time)
    .bind(&a.object)
    .bind(a.amount)
    .bind(&a.unit)
    .bind(&a.purpose)
    .bind(&a.target_person)
    .bind(&a.source_person)
    .bind(&a.attached_link)
    .bind(&a.note)
    .bind(ts(&a.created_at))
    .bind(ts(&a.updated_at))
    .bind(haystack(a))
    .execute(pool)
    .await?;
    Ok(())
}

/// Writes every column of `a` except `created_at` and refreshes `updated_at`.
pub async fn update(pool: &SqlitePool, a: &mut Activity) -> Result<(), sqlx::Error> {
    let (now, now_s) = now_ts();
    sqlx::query(
        "UPDATE activities SET title = ?, type = ?, description = ?, description2 = ?, description3 = ?, \
         time_start = ?, time_end = ?, day = ?, money = ?, is_repeat = ?, repeat = ?, end_repeat_day = ?, \
         alert_time = ?, object = ?, amount = ?, unit = ?, purpose = ?, target_person = ?, source_person = ?, \
         attached_link = ?, note = ?, search_text = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&a.title)
    .bind(&a.activity_type)
    .bind(&a.description)
    .bind(&a.description2)
    .bind(&a.description3)
    .bind(opt_ts(a.time_start))
    .bind(opt_ts(a.time_end))
    .bind(a.day)
    .bind(a.money)
    .bind(&a.is_repeat)
    .bind(&a.repeat)
    .bind(opt_ts(a.end_repeat_day))
    .bind(&a.alert_time)
    .bind(&a.object)
    .bind(a.amount)
    .bind(&a.unit)
    .bind(&a.purpose)
    .bind(&a.target_person)
    .bind(&a.source_person)
    .bind(&a.attached_link)
    .bind(&a.note)
    .bind(haystack(a))
    .bind(&now_s)
    .bind(&a.id)
    .execute(pool)
    .await?;
    a.updated_at = now;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM activities WHERE id = ?").bind(id).execute(pool).await?;
    Ok(res.rows_affected())
}

/// `(time_start, title)` for activities starting in `[start, end)`, oldest first.
/// An `end` past the last storable year leaves the range open above.
pub async fn starts_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, String)>, sqlx::Error> {
    sqlx::query_as::<_, (DateTime<Utc>, String)>(
        "SELECT time_start, title FROM activities \
         WHERE time_start IS NOT NULL AND time_start >= ? AND (? IS NULL OR time_start < ?) \
         ORDER BY time_start, created_at",
    )
    .bind(ts(&start))
    .bind(ts_upper_bound(&end))
    .bind(ts_upper_bound(&end))
    .fetch_all(pool)
    .await
}

pub async fn day_items_between(
    pool: &SqlitePool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ActivityDayItem>, sqlx::Error> {
    sqlx::query_as::<_, ActivityDayItem>(
        "SELECT id, title, type, time_start, time_end, day FROM activities \
         WHERE time_start IS NOT NULL AND time_start >= ? AND (? IS NULL OR time_start < ?) \
         ORDER BY time_start, created_at",
    )
    .bind(ts(&start))
    .bind(ts_upper_bound(&end))
    .bind(ts_upper_bound(&end))
    .fetch_all(pool)
    .await
}
