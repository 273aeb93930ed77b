pub mod analytics;
pub mod dimensions;
pub mod faults;
pub mod health;
mod rate_limit;
pub mod reads;
pub mod scripts;
pub mod staging;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Serialize;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::{OpenApi, ToSchema};
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use rate_limit::FallbackIpKeyExtractor;

/// Success envelope shared by every write endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::healthz,
        staging::upload_file,
        staging::upload_processed_turbine_data,
        staging::upload_processed_material_data,
        staging::upload_material_predictions_data,
        staging::upload_turbine_predictions_data,
        staging::update_material_category_data,
        dimensions::sync_plant_coordinates,
        dimensions::sync_material_data,
        dimensions::sync_turbine_data,
        faults::sync_fault_reports,
        faults::upload_fault_report,
        analytics::sync_replacement_predictions,
        analytics::sync_monte_carlo_dominance,
        analytics::sync_replacement_trends,
        analytics::sync_material_category_predictions,
        analytics::sync_material_maintenance_forecasts,
        analytics::sync_material_category_health_scores,
        analytics::sync_material_component_health_scores,
        analytics::sync_turbine_model_health_scores,
        analytics::sync_turbine_platform_health_scores,
        analytics::sync_status_transitions,
        scripts::run_python,
        scripts::run_python_hitl,
        scripts::run_python_both,
    ),
    components(
        schemas(
            health::StoreHealth,
            health::HealthResponse,
            reads::ReadResponse,
            staging::UpdateCategoryRequest,
            dimensions::PlantsRequest,
            dimensions::MaterialsRequest,
            faults::FaultReportRequest,
            faults::FaultReportCreated,
            analytics::DominanceRequest,
            analytics::TrendsRequest,
            analytics::CategoryPredictionsRequest,
            analytics::ForecastsRequest,
            faults::SyncFaultReportsRequest,
            crate::sync::staging::TurbineRecord,
            crate::sync::staging::MaterialRecord,
            crate::sync::staging::MaterialKey,
            crate::sync::dimensions::PlantEntry,
            crate::sync::facts::TechnicianAssignment,
            crate::sync::predictions::ReplacementPredictionsPayload,
            crate::store::StoreKind,
            crate::etl::ScriptOutput,
        )
    ),
    tags(
        (name = "health", description = "Service and store health"),
        (name = "staging", description = "CSV and JSON uploads into the staging tables"),
        (name = "dimensions", description = "Plant, material and location syncs"),
        (name = "faults", description = "Fault report generation and filing"),
        (name = "analytics", description = "Imports of externally computed predictions and scores"),
        (name = "reads", description = "Read-only table passthroughs"),
        (name = "scripts", description = "External ETL process triggers"),
    ),
    info(
        title = "Turbine Sync API",
        description = "Data synchronization backend for wind-turbine fleet maintenance analytics",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// OpenAPI document including the registry-driven read endpoints.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    reads::document(&mut doc);
    doc
}

/// Attach a per-IP limiter, or leave the routes unlimited if the quota is invalid.
fn rate_limited(routes: Router<AppState>, group: &str, per_second: u64, burst: u32) -> Router<AppState> {
    let limiter = GovernorConfigBuilder::default()
        .key_extractor(FallbackIpKeyExtractor)
        .per_second(per_second)
        .burst_size(burst)
        .finish();

    match limiter {
        Some(config) => routes.layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::error!(group, per_second, burst, "Invalid rate limit quota, routes left unlimited");
            routes
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;

    if config.disable_rate_limiting {
        tracing::warn!("Rate limiting DISABLED");
    } else {
        tracing::info!(
            sync_rate = %format!("{}/s burst {}", config.rate_limit_sync_per_second, config.rate_limit_sync_burst),
            read_rate = %format!("{}/s burst {}", config.rate_limit_read_per_second, config.rate_limit_read_burst),
            "Rate limiting configured"
        );
    }

    // Writes: uploads, syncs and script triggers
    let sync_routes_base = Router::new()
        .route("/uploadFile", post(staging::upload_file))
        .route("/uploadProcessedTurbineData", post(staging::upload_processed_turbine_data))
        .route("/uploadProcessedMaterialData", post(staging::upload_processed_material_data))
        .route("/uploadMaterialPredictionsData", post(staging::upload_material_predictions_data))
        .route("/uploadTurbinePredictionsData", post(staging::upload_turbine_predictions_data))
        .route("/updateMaterialCategoryData", post(staging::update_material_category_data))
        .route("/syncPlantCoordinates", post(dimensions::sync_plant_coordinates))
        .route("/syncMaterialData", post(dimensions::sync_material_data))
        .route("/syncTurbineData", post(dimensions::sync_turbine_data))
        .route("/syncFaultReportsController", post(faults::sync_fault_reports))
        .route("/uploadFaultReport", post(faults::upload_fault_report))
        .route("/syncReplacementPredictions", post(analytics::sync_replacement_predictions))
        .route("/syncMonteCarloDominance", post(analytics::sync_monte_carlo_dominance))
        .route("/syncReplacementTrends", post(analytics::sync_replacement_trends))
        .route(
            "/syncMaterialCategoryPredictions",
            post(analytics::sync_material_category_predictions),
        )
        .route(
            "/syncMaterialMaintenanceForecasts",
            post(analytics::sync_material_maintenance_forecasts),
        )
        .route(
            "/syncMaterialCategoryHealthScores",
            post(analytics::sync_material_category_health_scores),
        )
        .route(
            "/syncMaterialComponentHealthScores",
            post(analytics::sync_material_component_health_scores),
        )
        .route(
            "/syncTurbineModelHealthScores",
            post(analytics::sync_turbine_model_health_scores),
        )
        .route(
            "/syncTurbinePlatformHealthScores",
            post(analytics::sync_turbine_platform_health_scores),
        )
        .route(
            "/syncPlantSpecificMaterialStatusTransitions",
            post(analytics::sync_status_transitions),
        )
        .route("/run-python", post(scripts::run_python))
        .route("/run-python-hitl", post(scripts::run_python_hitl))
        .route("/run-python-both", post(scripts::run_python_both));

    let read_routes_base = reads::routes();

    let api_routes = if config.disable_rate_limiting {
        Router::new().merge(sync_routes_base).merge(read_routes_base)
    } else {
        Router::new()
            .merge(rate_limited(
                sync_routes_base,
                "sync",
                config.rate_limit_sync_per_second,
                config.rate_limit_sync_burst,
            ))
            .merge(rate_limited(
                read_routes_base,
                "read",
                config.rate_limit_read_per_second,
                config.rate_limit_read_burst,
            ))
    }
    .layer(DefaultBodyLimit::max(config.max_body_bytes))
    .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    // Health check routes (NO rate limiting)
    let health_routes = Router::new()
        .route("/", get(health::root))
        .route("/healthz", get(health::healthz));

    let docs_routes = Router::new().merge(Scalar::with_url("/docs", openapi()));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
