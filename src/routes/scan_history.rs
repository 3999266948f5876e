use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::AuthUser,
    models::scan_history::{CreateScanHistoryRequest, ScanHistory, ScanHistoryListResponse, ScanHistoryResponse},
    state::AppState,
    store,
    types::{message_body, ApiResponse, AppJson},
    validation,
};

/// Resolves the disease at read time; a deleted disease renders as `null`.
async fn with_disease(state: &AppState, record: ScanHistory) -> AppResult<ScanHistoryResponse> {
    let disease = store::disease::find_by_id(&state.db, &record.disease_id).await?;
    Ok(ScanHistoryResponse::new(record, disease))
}

pub async fn create_scan_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(req): AppJson<CreateScanHistoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ScanHistoryResponse>>)> {
    let disease_id = validation::uuid("disease id", &req.disease_id)?.to_string();
    let disease = store::disease::find_by_id(&state.db, &disease_id).await?.ok_or_not_found("Disease")?;

    let record = store::scan_history::insert(&state.db, &user.id, &disease.id).await?;
    state.metrics.inc_scans();
    info!(user_id = %user.id, scan_id = %record.id, disease = %disease.class_name, "Scan history recorded");

    let body = ScanHistoryResponse::new(record, Some(disease));
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Scan history created successfully", body))))
}

pub async fn list_scan_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ApiResponse<ScanHistoryListResponse>>> {
    let records = store::scan_history::list_for_user(&state.db, &user.id).await?;
    let mut scan_histories = Vec::with_capacity(records.len());
    for record in records {
        scan_histories.push(with_disease(&state, record).await?);
    }
    Ok(Json(ApiResponse::data(ScanHistoryListResponse { total: scan_histories.len(), scan_histories })))
}

pub async fn get_scan_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ScanHistoryResponse>>> {
    let record =
        store::scan_history::find_for_user(&state.db, &id, &user.id).await?.ok_or_not_found("Scan history")?;
    Ok(Json(ApiResponse::data(with_disease(&state, record).await?)))
}

pub async fn delete_scan_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = store::scan_history::delete_for_user(&state.db, &id, &user.id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Scan history not found".to_string()));
    }
    info!(user_id = %user.id, scan_id = %id, "Scan history deleted");
    Ok(Json(message_body("Scan history deleted successfully")))
}

pub async fn clear_scan_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ApiResponse<Value>>> {
    let deleted = store::scan_history::delete_all_for_user(&state.db, &user.id).await?;
    info!(user_id = %user.id, deleted, "Scan history cleared");
    Ok(Json(ApiResponse::with_message("Scan history cleared successfully", json!({ "deleted": deleted }))))
}
