use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Duration, NaiveDate};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    calendar::{self, MonthCalendar},
    db::{new_id, now_ts, MAX_TS_YEAR, MIN_TS_YEAR},
    error::{AppError, AppResult, OptionExt},
    middleware::AuthUser,
    models::activity::{
        Activity, ActivityCollection, ActivityDayResponse, ActivityListResponse, CalendarQuery,
        CreateActivityRequest, DayQuery, UpdateActivityRequest,
    },
    state::AppState,
    store,
    types::{message_body, ApiResponse, AppJson, ListQuery},
    validation,
};

pub async fn create_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(mut req): AppJson<CreateActivityRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Activity>>)> {
    validation::create_activity(&req)?;
    req.title = req.title.trim().to_string();
    req.activity_type = req.activity_type.trim().to_string();

    let (now, _) = now_ts();
    let activity = req.into_activity(new_id(), now);
    store::activity::insert(&state.db, &activity).await?;
    info!(user_id = %user.id, activity_id = %activity.id, "Activity created");

    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Activity created successfully", activity))))
}

pub async fn get_activity(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Activity>>> {
    let activity = store::activity::find_by_id(&state.db, &id).await?.ok_or_not_found("Activity")?;
    Ok(Json(ApiResponse::data(activity)))
}

pub async fn list_activities(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ActivityListResponse>>> {
    let page = q.pagination();
    let (activities, total) = store::activity::list_page(&state.db, &q.filter(), page).await?;
    Ok(Json(ApiResponse::data(ActivityListResponse {
        activities,
        total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages(total),
    })))
}

pub async fn all_activities(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<ActivityCollection>>> {
    let activities = store::activity::list_all(&state.db, &q.filter()).await?;
    let count = activities.len();
    Ok(Json(ApiResponse::data(ActivityCollection { total: count as i64, count, activities })))
}

pub async fn count_activities(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let count = store::activity::count(&state.db, &q.filter()).await?;
    Ok(Json(ApiResponse::data(json!({ "count": count }))))
}

/// Activities whose `time_start` falls on the given UTC date.
pub async fn activities_by_day(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<DayQuery>,
) -> AppResult<Json<ApiResponse<ActivityDayResponse>>> {
    let raw = q
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("date is required (YYYY-MM-DD)".to_string()))?;
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|d| (MIN_TS_YEAR..=MAX_TS_YEAR).contains(&d.year()))
        .ok_or_else(|| AppError::BadRequest("invalid date format, expected YYYY-MM-DD".to_string()))?;

    let start = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()).ok_or_else(|| {
        AppError::BadRequest("invalid date format, expected YYYY-MM-DD".to_string())
    })?;
    let end = start + Duration::days(1);

    let activities = store::activity::day_items_between(&state.db, start, end).await?;
    Ok(Json(ApiResponse::data(ActivityDayResponse {
        date: date.format("%Y-%m-%d").to_string(),
        count: activities.len(),
        activities,
    })))
}

pub async fn month_calendar(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(q): Query<CalendarQuery>,
) -> AppResult<Json<ApiResponse<MonthCalendar>>> {
    let (year, month) = calendar::parse_year_month(q.year.as_deref(), q.month.as_deref())?;
    let (start, end) =
        calendar::month_bounds(year, month).ok_or_else(|| AppError::BadRequest("invalid year".to_string()))?;

    let starts = store::activity::starts_between(&state.db, start, end).await?;
    let cal = calendar::build_month_calendar(year, month, starts)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("calendar for {}-{:02} out of range", year, month)))?;
    Ok(Json(ApiResponse::data(cal)))
}

pub async fn update_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateActivityRequest>,
) -> AppResult<Json<ApiResponse<Activity>>> {
    validation::update_activity(&req)?;

    let mut activity = store::activity::find_by_id(&state.db, &id).await?.ok_or_not_found("Activity")?;
    req.apply_to(&mut activity);
    activity.title = activity.title.trim().to_string();
    activity.activity_type = activity.activity_type.trim().to_string();
    validation::time_range(activity.time_start, activity.time_end)?;

    store::activity::update(&state.db, &mut activity).await?;
    info!(user_id = %user.id, activity_id = %activity.id, "Activity updated");

    Ok(Json(ApiResponse::with_message("Activity updated successfully", activity)))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = store::activity::delete(&state.db, &id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Activity not found".to_string()));
    }
    info!(user_id = %user.id, activity_id = %id, "Activity deleted");
    Ok(Json(message_body("Activity deleted successfully")))
}
