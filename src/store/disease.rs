use sqlx::{types::Json, QueryBuilder, Sqlite, SqlitePool};

use crate::db::{new_id, now_ts, search_pattern, search_text};
use crate::models::disease::{CreateDiseaseRequest, Disease};
use crate::types::{ListFilter, Pagination};

const DISEASE_COLUMNS: &str =
    "id, name, class_name, type, description, solution, image_link, plant_name, created_at, updated_at";

fn haystack(disease: &Disease) -> String {
    search_text([disease.name.as_str(), disease.description.as_str()])
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
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM diseases");
    push_filter(&mut qb, filter);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

/// One page plus the total matching the filter.
pub async fn list_page(
    pool: &SqlitePool,
    filter: &ListFilter,
    page: Pagination,
) -> Result<(Vec<Disease>, i64), sqlx::Error> {
    let total = count(pool, filter).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {DISEASE_COLUMNS} FROM diseases"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, id LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = qb.build_query_as::<Disease>().fetch_all(pool).await?;
    Ok((rows, total))
}

pub async fn list_all(pool: &SqlitePool, filter: &ListFilter) -> Result<Vec<Disease>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {DISEASE_COLUMNS} FROM diseases"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, id");
    qb.build_query_as::<Disease>().fetch_all(pool).await
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Disease>, sqlx::Error> {
    sqlx::query_as::<_, Disease>(&format!("SELECT {DISEASE_COLUMNS} FROM diseases WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_class_name(pool: &SqlitePool, class_name: &str) -> Result<Option<Disease>, sqlx::Error> {
    sqlx::query_as::<_, Disease>(&format!("SELECT {DISEASE_COLUMNS} FROM diseases WHERE class_name = ?"))
        .bind(class_name)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &SqlitePool, req: CreateDiseaseRequest) -> Result<Disease, sqlx::Error> {
    let (now, now_s) = now_ts();
    let disease = Disease {
        id: new_id(),
        name: req.name.trim().to_string(),
        class_name: req.class_name.trim().to_string(),
        disease_type: req.disease_type.trim().to_string(),
        description: req.description,
        solution: req.solution,
        image_link: req.image_link,
        plant_name: req.plant_name.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    sqlx::query(
        "INSERT INTO diseases (id, name, class_name, type, description, solution, image_link, plant_name, search_text, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&disease.id)
    .bind(&disease.name)
    .bind(&disease.class_name)
    .bind(&disease.disease_type)
    .bind(&disease.description)
    .bind(&disease.solution)
    .bind(Json(&disease.image_link))
    .bind(&disease.plant_name)
    .bind(haystack(&disease))
    .bind(&now_s)
    .bind(&now_s)
    .execute(pool)
    .await?;
    Ok(disease)
}

/// Writes every mutable column of `disease` and refreshes `updated_at`.
pub async fn update(pool: &SqlitePool, disease: &mut Disease) -> Result<(), sqlx::Error> {
    let (now, now_s) = now_ts();
    sqlx::query(
        "UPDATE diseases SET name = ?, class_name = ?, type = ?, description = ?, solution = ?, \
         image_link = ?, plant_name = ?, search_text = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&disease.name)
    .bind(&disease.class_name)
    .bind(&disease.disease_type)
    .bind(&disease.description)
    .bind(&disease.solution)
    .bind(Json(&disease.image_link))
    .bind(&disease.plant_name)
    .bind(haystack(disease))
    .bind(&now_s)
    .bind(&disease.id)
    .execute(pool)
    .await?;
    disease.updated_at = now;
    Ok(())
}

/// Returns the number of rows removed.
pub async fn delete_by_class_name(pool: &SqlitePool, class_name: &str) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM diseases WHERE class_name = ?").bind(class_name).execute(pool).await?;
    Ok(res.rows_affected())
}
