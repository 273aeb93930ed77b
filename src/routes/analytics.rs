use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::Envelope;
use crate::common::AppState;
use crate::error::AppResult;
use crate::sync::ImportSummary;
use crate::sync::health::{self, HealthScoreFamily, HealthScoreSummary};
use crate::sync::predictions::{self, ReplacementPredictionsPayload, ReplacementPredictionsSummary};
use crate::sync::transitions::{self, TransitionSyncSummary};

#[derive(Debug, Deserialize, ToSchema)]
pub struct DominanceRequest {
    #[schema(value_type = Vec<Object>)]
    pub dominance: Vec<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrendsRequest {
    /// `{Timestamp, Description, Count}` rows.
    #[schema(value_type = Vec<Object>)]
    pub trends: Vec<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryPredictionsRequest {
    #[schema(value_type = Vec<Object>)]
    pub predictions: Vec<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForecastsRequest {
    #[schema(value_type = Vec<Object>)]
    pub forecasts: Vec<Value>,
}

/// Import global, per-plant and Monte Carlo dominance predictions
///
/// Rows are matched to materials by `Material` (A9B number). Matching by
/// `Description` still works but is deprecated.
#[utoipa::path(
    post,
    path = "/syncReplacementPredictions",
    request_body = ReplacementPredictionsPayload,
    responses(
        (status = 200, description = "Predictions imported", body = Envelope<ReplacementPredictionsSummary>),
        (status = 400, description = "Malformed body"),
        (status = 500, description = "Database failure, nothing kept"),
    ),
    tag = "analytics"
)]
pub async fn sync_replacement_predictions(
    State(state): State<AppState>,
    payload: Result<Json<ReplacementPredictionsPayload>, JsonRejection>,
) -> AppResult<Json<Envelope<ReplacementPredictionsSummary>>> {
    let Json(payload) = payload?;
    let summary = predictions::sync_replacement_predictions(&state.store, &payload).await?;
    Ok(Envelope::ok("Replacement predictions synced successfully", summary))
}

/// Import Monte Carlo dominance rankings keyed by description
#[utoipa::path(
    post,
    path = "/syncMonteCarloDominance",
    request_body = DominanceRequest,
    responses(
        (status = 200, description = "Dominance rows imported", body = Envelope<ImportSummary>),
        (status = 400, description = "`dominance` is missing or not an array"),
    ),
    tag = "analytics"
)]
pub async fn sync_monte_carlo_dominance(
    State(state): State<AppState>,
    payload: Result<Json<DominanceRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<ImportSummary>>> {
    let Json(request) = payload?;
    let summary = predictions::sync_monte_carlo_dominance(&state.store, &request.dominance).await?;
    Ok(Envelope::ok("Monte Carlo dominance synced successfully", summary))
}

/// Import replacement counts over time
#[utoipa::path(
    post,
    path = "/syncReplacementTrends",
    request_body = TrendsRequest,
    responses(
        (status = 200, description = "Trend rows imported", body = Envelope<ImportSummary>),
        (status = 400, description = "`trends` is missing or not an array"),
    ),
    tag = "analytics"
)]
pub async fn sync_replacement_trends(
    State(state): State<AppState>,
    payload: Result<Json<TrendsRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<ImportSummary>>> {
    let Json(request) = payload?;
    let summary = predictions::sync_replacement_trends(&state.store, &request.trends).await?;
    Ok(Envelope::ok("Replacement trends synced successfully", summary))
}

/// Import per-category replacement probabilities
#[utoipa::path(
    post,
    path = "/syncMaterialCategoryPredictions",
    request_body = CategoryPredictionsRequest,
    responses(
        (status = 200, description = "Category predictions imported", body = Envelope<ImportSummary>),
        (status = 400, description = "`predictions` is missing or not an array"),
    ),
    tag = "analytics"
)]
pub async fn sync_material_category_predictions(
    State(state): State<AppState>,
    payload: Result<Json<CategoryPredictionsRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<ImportSummary>>> {
    let Json(request) = payload?;
    let summary = predictions::sync_category_predictions(&state.store, &request.predictions).await?;
    Ok(Envelope::ok("Material category predictions synced successfully", summary))
}

/// Import maintenance forecasts keyed by (material, plant)
///
/// An empty list is accepted and changes nothing.
#[utoipa::path(
    post,
    path = "/syncMaterialMaintenanceForecasts",
    request_body = ForecastsRequest,
    responses(
        (status = 200, description = "Forecasts imported", body = Envelope<ImportSummary>),
        (status = 400, description = "`forecasts` is missing or not an array"),
    ),
    tag = "analytics"
)]
pub async fn sync_material_maintenance_forecasts(
    State(state): State<AppState>,
    payload: Result<Json<ForecastsRequest>, JsonRejection>,
) -> AppResult<Json<Envelope<ImportSummary>>> {
    let Json(request) = payload?;
    let summary = predictions::sync_maintenance_forecasts(&state.store, &request.forecasts).await?;
    Ok(Envelope::ok("Maintenance forecasts synced successfully", summary))
}

async fn import_health_scores(
    state: &AppState,
    family: &HealthScoreFamily,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<HealthScoreSummary>>> {
    let Json(body) = payload?;
    let (detail, summary) = family.split_payload(&body)?;
    let result = family.import(&state.store, detail, summary).await?;
    Ok(Envelope::ok(
        format!("{} health scores synced successfully", family.name),
        result,
    ))
}

/// Import material category health scores
#[utoipa::path(
    post,
    path = "/syncMaterialCategoryHealthScores",
    request_body(content = Object, description = "`plant_scores` and `summary_scores` arrays"),
    responses(
        (status = 200, description = "Scores imported", body = Envelope<HealthScoreSummary>),
        (status = 400, description = "Either array is missing"),
    ),
    tag = "analytics"
)]
pub async fn sync_material_category_health_scores(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<HealthScoreSummary>>> {
    import_health_scores(&state, &health::MATERIAL_CATEGORY, payload).await
}

/// Import material component health scores
#[utoipa::path(
    post,
    path = "/syncMaterialComponentHealthScores",
    request_body(content = Object, description = "`plant_scores` and `summary_scores` arrays"),
    responses(
        (status = 200, description = "Scores imported", body = Envelope<HealthScoreSummary>),
        (status = 400, description = "Either array is missing"),
    ),
    tag = "analytics"
)]
pub async fn sync_material_component_health_scores(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<HealthScoreSummary>>> {
    import_health_scores(&state, &health::MATERIAL_COMPONENT, payload).await
}

/// Import turbine model health scores
#[utoipa::path(
    post,
    path = "/syncTurbineModelHealthScores",
    request_body(content = Object, description = "`model_scores` and `summary_scores` arrays"),
    responses(
        (status = 200, description = "Scores imported", body = Envelope<HealthScoreSummary>),
        (status = 400, description = "Either array is missing"),
    ),
    tag = "analytics"
)]
pub async fn sync_turbine_model_health_scores(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<HealthScoreSummary>>> {
    import_health_scores(&state, &health::TURBINE_MODEL, payload).await
}

/// Import turbine platform health scores
#[utoipa::path(
    post,
    path = "/syncTurbinePlatformHealthScores",
    request_body(content = Object, description = "`platform_scores` and `summary_scores` arrays"),
    responses(
        (status = 200, description = "Scores imported", body = Envelope<HealthScoreSummary>),
        (status = 400, description = "Either array is missing"),
    ),
    tag = "analytics"
)]
pub async fn sync_turbine_platform_health_scores(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<Envelope<HealthScoreSummary>>> {
    import_health_scores(&state, &health::TURBINE_PLATFORM, payload).await
}

/// Derive plant-specific material status transitions from timestamped rows
#[utoipa::path(
    post,
    path = "/syncPlantSpecificMaterialStatusTransitions",
    responses(
        (status = 200, description = "Transitions derived and stored", body = Envelope<TransitionSyncSummary>),
        (status = 500, description = "Database failure, nothing kept"),
    ),
    tag = "analytics"
)]
pub async fn sync_status_transitions(
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<TransitionSyncSummary>>> {
    let summary = transitions::sync_status_transitions(&state.store).await?;
    Ok(Envelope::ok("Material status transitions synced successfully", summary))
}
