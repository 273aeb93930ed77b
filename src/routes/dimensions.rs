use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Envelope;
use crate::common::AppState;
use crate::error::AppResult;
use crate::sync::dimensions::{self, PlantEntry, PlantSyncSummary};
use crate::sync::facts::{self, MaterialSyncSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlantsRequest {
    pub plants: Vec<PlantEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MaterialsRequest {
    /// Material numbers to look up in the staged MaterialData.
    pub materials: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationsCreated {
    pub created: u64,
}

/// Upsert plants with resolved coordinates and OR-merged role flags
///
/// Entries with a blank code are skipped. Writes go to every configured
/// plant store.
#[utoipa::path(
    post,
    path = "/syncPlantCoordinates",
    request_body = PlantsRequest,
    responses(
        (status = 200, description = "Plants synced", body = Envelope<PlantSyncSummary>),
        (status = 400, description = "`plants` is missing or not an array"),
        (status = 500, description = "Database failure"),
    ),
    tag = "dimensions"
)]
pub async fn sync_plant_coordinates(
    State(state): State<AppState>,
    payload: Result<Json<PlantsRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<PlantSyncSummary>>> {
    let Json(request) = payload?;
    let summary = dimensions::sync_plant_coordinates(
        &state.store,
        &state.config.plant_stores,
        state.geo.clone(),
        request.plants,
    )
    .await?;
    Ok(Envelope::ok("Plant coordinates synced successfully", summary))
}

/// Fan material numbers out to Material, ReplacementPart and SerialNumberProfile
///
/// Numbers with no staged rows are reported in `skipped`.
#[utoipa::path(
    post,
    path = "/syncMaterialData",
    request_body = MaterialsRequest,
    responses(
        (status = 200, description = "Materials synced", body = Envelope<MaterialSyncSummary>),
        (status = 400, description = "`materials` is missing or not an array"),
        (status = 500, description = "Database failure, nothing kept"),
    ),
    tag = "dimensions"
)]
pub async fn sync_material_data(
    State(state): State<AppState>,
    payload: Result<Json<MaterialsRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<MaterialSyncSummary>>> {
    let Json(request) = payload?;
    let summary = facts::sync_material_data(&state.store, &request.materials).await?;
    Ok(Envelope::ok("Material data synced successfully", summary))
}

/// Create a Location for every distinct turbine functional location
#[utoipa::path(
    post,
    path = "/syncTurbineData",
    responses(
        (status = 200, description = "Locations synced", body = Envelope<LocationsCreated>),
        (status = 500, description = "Database failure"),
    ),
    tag = "dimensions"
)]
pub async fn sync_turbine_data(State(state): State<AppState>) -> AppResult<Json<Envelope<LocationsCreated>>> {
    let created = dimensions::sync_turbine_locations(&state.store).await?;
    Ok(Envelope::ok(
        "Turbine locations synced successfully",
        LocationsCreated { created },
    ))
}
