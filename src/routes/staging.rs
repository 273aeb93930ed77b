use axum::{
    Json,
    extract::{Multipart, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Envelope;
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::store::{MirrorReport, StoreKind};
use crate::sync::ImportSummary;
use crate::sync::staging::{
    MaterialKey, MaterialRecord, TurbineRecord, update_material_category, upload_materials,
    upload_materials_mirrored, upload_turbines,
};
use crate::upload::{CsvUploadSummary, import_csv};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub selected_category: String,
    pub rows: Vec<MaterialKey>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryUpdated {
    pub updated: u64,
}

type Created<T> = (StatusCode, Json<Envelope<T>>);

fn created<T>(message: &str, data: T) -> Created<T> {
    (StatusCode::CREATED, Envelope::ok(message, data))
}

/// Upload a MaterialData or TurbineData CSV into the unprocessed store
///
/// The header row must match one of the known header maps (any order).
#[utoipa::path(
    post,
    path = "/uploadFile",
    request_body(content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 201, description = "Rows staged", body = Envelope<CsvUploadSummary>),
        (status = 400, description = "Missing file, empty CSV or unknown header row"),
    ),
    tag = "staging"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Created<CsvUploadSummary>> {
    let mut contents = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await?;
            tracing::debug!(file = ?file_name, bytes = bytes.len(), "CSV received");
            contents = Some(bytes);
            break;
        }
    }

    let bytes = contents.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let summary = import_csv(&state.store, &bytes).await?;
    Ok(created("File uploaded and data inserted", summary))
}

/// Upsert cleaned turbine records into the processed store
///
/// Records without `FunctionalLoc` or `MaintPlant` are skipped.
#[utoipa::path(
    post,
    path = "/uploadProcessedTurbineData",
    request_body = Vec<TurbineRecord>,
    responses(
        (status = 201, description = "Turbine data stored", body = Envelope<ImportSummary>),
        (status = 400, description = "Body is not a non-empty array"),
        (status = 500, description = "Database failure, nothing stored"),
    ),
    tag = "staging"
)]
pub async fn upload_processed_turbine_data(
    State(state): State<AppState>,
    payload: Result<Json<Vec<TurbineRecord>>, JsonRejection>,
) -> AppResult<Created<ImportSummary>> {
    let Json(records) = payload?;
    let summary = upload_turbines(&state.store, StoreKind::Processed, &records, true).await?;
    Ok(created("Processed turbine data uploaded", summary))
}

/// Upsert cleaned material records into every mirror store
///
/// Each store commits on its own. If a later store fails after an earlier one
/// committed, the response names both and the stores stay diverged.
#[utoipa::path(
    post,
    path = "/uploadProcessedMaterialData",
    request_body = Vec<MaterialRecord>,
    responses(
        (status = 201, description = "Material data stored in every mirror", body = Envelope<MirrorReport>),
        (status = 400, description = "Body is not a non-empty array"),
        (status = 500, description = "Database failure or partial mirror failure"),
    ),
    tag = "staging"
)]
pub async fn upload_processed_material_data(
    State(state): State<AppState>,
    payload: Result<Json<Vec<MaterialRecord>>, JsonRejection>,
) -> AppResult<Created<MirrorReport>> {
    let Json(records) = payload?;
    let report = upload_materials_mirrored(&state.store, &state.config.mirror_stores, &records).await?;
    Ok(created("Processed material data uploaded", report))
}

/// Upsert material records into the predictions store
#[utoipa::path(
    post,
    path = "/uploadMaterialPredictionsData",
    request_body = Vec<MaterialRecord>,
    responses(
        (status = 201, description = "Material data stored", body = Envelope<ImportSummary>),
        (status = 400, description = "Body is not a non-empty array"),
    ),
    tag = "staging"
)]
pub async fn upload_material_predictions_data(
    State(state): State<AppState>,
    payload: Result<Json<Vec<MaterialRecord>>, JsonRejection>,
) -> AppResult<Created<ImportSummary>> {
    let Json(records) = payload?;
    let summary = upload_materials(&state.store, StoreKind::Predictions, &records).await?;
    Ok(created("Material predictions data uploaded", summary))
}

/// Upsert turbine records into the predictions store
#[utoipa::path(
    post,
    path = "/uploadTurbinePredictionsData",
    request_body = Vec<TurbineRecord>,
    responses(
        (status = 201, description = "Turbine data stored", body = Envelope<ImportSummary>),
        (status = 400, description = "Body is not a non-empty array"),
    ),
    tag = "staging"
)]
pub async fn upload_turbine_predictions_data(
    State(state): State<AppState>,
    payload: Result<Json<Vec<TurbineRecord>>, JsonRejection>,
) -> AppResult<Created<ImportSummary>> {
    let Json(records) = payload?;
    let summary = upload_turbines(&state.store, StoreKind::Predictions, &records, false).await?;
    Ok(created("Turbine predictions data uploaded", summary))
}

/// Manually re-categorise processed material rows
#[utoipa::path(
    post,
    path = "/updateMaterialCategoryData",
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Rows updated", body = Envelope<CategoryUpdated>),
        (status = 400, description = "Missing category or rows"),
    ),
    tag = "staging"
)]
pub async fn update_material_category_data(
    State(state): State<AppState>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<CategoryUpdated>>> {
    let Json(request) = payload?;
    let updated = update_material_category(&state.store, &request.selected_category, &request.rows).await?;
    Ok(Envelope::ok("Material category updated", CategoryUpdated { updated }))
}
