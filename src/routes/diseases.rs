use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::{
    error::{is_unique_violation, AppError, AppResult, OptionExt},
    import::{self, ImportError, ImportFormat},
    middleware::AdminUser,
    models::disease::{
        CreateDiseaseRequest, Disease, DiseaseCollection, DiseaseListResponse, ImportReport, UpdateDiseaseRequest,
    },
    state::AppState,
    store,
    types::{message_body, ApiResponse, AppJson, ListQuery},
    validation,
};

const CLASS_NAME_TAKEN: &str = "Disease with this class name already exists";

pub async fn list_diseases(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<DiseaseListResponse>>> {
    let page = q.pagination();
    let (diseases, total) = store::disease::list_page(&state.db, &q.filter(), page).await?;
    Ok(Json(ApiResponse::data(DiseaseListResponse {
        diseases,
        total,
        page: page.page,
        limit: page.limit,
        pages: page.total_pages(total),
    })))
}

pub async fn all_diseases(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<DiseaseCollection>>> {
    let diseases = store::disease::list_all(&state.db, &q.filter()).await?;
    let count = diseases.len();
    Ok(Json(ApiResponse::data(DiseaseCollection { total: count as i64, count, diseases })))
}

/// Count under the same `search`/`type` precedence as the listings.
pub async fn count_diseases(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let count = store::disease::count(&state.db, &q.filter()).await?;
    Ok(Json(ApiResponse::data(json!({ "count": count }))))
}

pub async fn get_disease(
    State(state): State<AppState>,
    Path(class_name): Path<String>,
) -> AppResult<Json<ApiResponse<Disease>>> {
    let disease = store::disease::find_by_class_name(&state.db, class_name.trim())
        .await?
        .ok_or_not_found("Disease")?;
    Ok(Json(ApiResponse::data(disease)))
}

pub async fn create_disease(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    AppJson(mut req): AppJson<CreateDiseaseRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Disease>>)> {
    validation::create_disease(&req)?;
    req.name = req.name.trim().to_string();
    req.class_name = req.class_name.trim().to_string();
    req.disease_type = req.disease_type.trim().to_string();

    if store::disease::find_by_class_name(&state.db, &req.class_name).await?.is_some() {
        return Err(AppError::Conflict(CLASS_NAME_TAKEN.to_string()));
    }

    let disease = match store::disease::insert(&state.db, req).await {
        Ok(d) => d,
        Err(e) if is_unique_violation(&e) => return Err(AppError::Conflict(CLASS_NAME_TAKEN.to_string())),
        Err(e) => return Err(e.into()),
    };
    state.metrics.inc_diseases_created();
    info!(admin_id = %admin.id, class_name = %disease.class_name, "Disease created");

    Ok((StatusCode::CREATED, Json(ApiResponse::with_message("Disease created successfully", disease))))
}

pub async fn update_disease(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateDiseaseRequest>,
) -> AppResult<Json<ApiResponse<Disease>>> {
    validation::update_disease(&req)?;

    let mut disease = store::disease::find_by_id(&state.db, &id).await?.ok_or_not_found("Disease")?;

    if let Some(class_name) = req.class_name.as_deref().map(str::trim) {
        if class_name != disease.class_name {
            let taken = store::disease::find_by_class_name(&state.db, class_name).await?;
            if taken.is_some_and(|other| other.id != disease.id) {
                return Err(AppError::Conflict(CLASS_NAME_TAKEN.to_string()));
            }
        }
    }

    req.apply_to(&mut disease);
    disease.name = disease.name.trim().to_string();
    disease.class_name = disease.class_name.trim().to_string();
    disease.disease_type = disease.disease_type.trim().to_string();

    match store::disease::update(&state.db, &mut disease).await {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => return Err(AppError::Conflict(CLASS_NAME_TAKEN.to_string())),
        Err(e) => return Err(e.into()),
    }
    info!(admin_id = %admin.id, disease_id = %disease.id, "Disease updated");

    Ok(Json(ApiResponse::with_message("Disease updated successfully", disease)))
}

pub async fn delete_disease(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(class_name): Path<String>,
) -> AppResult<Json<Value>> {
    let deleted = store::disease::delete_by_class_name(&state.db, class_name.trim()).await?;
    if deleted == 0 {
        return Err(AppError::NotFound("Disease not found".to_string()));
    }
    info!(admin_id = %admin.id, class_name = %class_name, "Disease deleted");
    Ok(Json(message_body("Disease deleted successfully")))
}

/// Bulk import from the multipart field `file` (`.csv` or `.xlsx`).
pub async fn import_diseases(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ImportReport>>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let format = ImportFormat::from_filename(&file_name).ok_or(ImportError::UnsupportedFormat)?;
    // Spreadsheet parsing is CPU-bound
    let rows = tokio::task::spawn_blocking(move || import::read_rows(format, &bytes)).await??;

    let report = import::import_rows(&state.db, &rows[1..]).await?;
    state.metrics.add_import(report.success_count as u64, report.error_count as u64);
    info!(
        admin_id = %admin.id,
        file = %file_name,
        total = report.total_rows,
        imported = report.success_count,
        failed = report.error_count,
        "Disease import finished"
    );

    Ok(Json(ApiResponse::with_message(format!("{} import completed", format.label()), report)))
}
