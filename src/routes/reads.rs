//! Read-only passthrough endpoints, served from a registry.
//!
//! Every entry is a fixed query against one store; the result rows are returned
//! as JSON objects inside `{success: true, data}`.

use axum::{Json, Router, extract::State, routing::get};
use sea_orm::{ConnectionTrait, JsonValue, QueryResult, Statement};
use serde_json::Map;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa::openapi::{
    OpenApi,
    path::{HttpMethod, OperationBuilder},
    response::Response,
};

use crate::common::AppState;
use crate::error::AppResult;
use crate::store::StoreKind;

#[derive(Debug, Clone, Copy)]
pub struct ReadEndpoint {
    pub path: &'static str,
    pub store: StoreKind,
    pub sql: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadResponse {
    pub success: bool,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
}

const fn read(path: &'static str, store: StoreKind, sql: &'static str, summary: &'static str) -> ReadEndpoint {
    ReadEndpoint {
        path,
        store,
        sql,
        summary,
    }
}

pub const READ_ENDPOINTS: &[ReadEndpoint] = &[
    // Unprocessed store
    read(
        "/fetch_UnprocessedTurbineData",
        StoreKind::Unprocessed,
        "SELECT * FROM TurbineData",
        "Raw uploaded turbine rows",
    ),
    read(
        "/fetch_UnprocessedMaterialData",
        StoreKind::Unprocessed,
        "SELECT * FROM MaterialData",
        "Raw uploaded material rows",
    ),
    read(
        "/getMaintPlant",
        StoreKind::Unprocessed,
        "SELECT * FROM TurbineData WHERE MaintPlant IS NOT NULL",
        "Turbines with a maintenance plant",
    ),
    read(
        "/getPlanningPlant",
        StoreKind::Unprocessed,
        "SELECT * FROM TurbineData WHERE PlanningPlant IS NOT NULL",
        "Turbines with a planning plant",
    ),
    read(
        "/getMainAndPlanningPlant",
        StoreKind::Unprocessed,
        "SELECT * FROM TurbineData WHERE MaintPlant IS NOT NULL AND PlanningPlant IS NOT NULL",
        "Turbines with both plants",
    ),
    // Processed store
    read(
        "/fetch_ProcessedTurbineData",
        StoreKind::Processed,
        "SELECT * FROM TurbineData",
        "Cleaned turbine rows",
    ),
    read(
        "/fetch_ProcessedMaterialData",
        StoreKind::Processed,
        "SELECT * FROM MaterialData",
        "Cleaned material rows",
    ),
    read(
        "/getViolations",
        StoreKind::Processed,
        "SELECT COUNT(*) AS total_violations FROM MaterialData WHERE ViolationReplacementPart = '1'",
        "Number of replacement-part violations",
    ),
    // Predictions store
    read(
        "/fetch_PredictionsData",
        StoreKind::Predictions,
        "SELECT * FROM TurbineData",
        "Turbine rows in the predictions store",
    ),
    read(
        "/uploadPredictionData",
        StoreKind::Predictions,
        "SELECT * FROM MaterialData",
        "Material rows in the predictions store",
    ),
    read(
        "/getTechnicians",
        StoreKind::Predictions,
        "SELECT Technician_ID, Name FROM Technician",
        "Technician pool",
    ),
    read(
        "/getPlantData",
        StoreKind::Predictions,
        "SELECT * FROM Plant",
        "Plants with coordinates and role flags",
    ),
    read(
        "/getReplacementPart",
        StoreKind::Predictions,
        "SELECT * FROM ReplacementPart",
        "Replacement-part facts",
    ),
    read(
        "/getReplacementPrediction",
        StoreKind::Predictions,
        "SELECT * FROM ReplacementPrediction",
        "Plant-scoped replacement predictions",
    ),
    read(
        "/getReplacementPredictionGlobal",
        StoreKind::Predictions,
        "SELECT * FROM ReplacementPredictionGlobal",
        "Global replacement predictions",
    ),
    read(
        "/getReplacementTrends",
        StoreKind::Predictions,
        "SELECT * FROM ReplacementTrends",
        "Replacement counts over time",
    ),
    read(
        "/getMonteCarloDominance",
        StoreKind::Predictions,
        "SELECT * FROM MonteCarloDominance",
        "Monte Carlo dominance rankings",
    ),
    read(
        "/getMaterialCategoryPredictions",
        StoreKind::Predictions,
        "SELECT * FROM MaterialCategoryPredictions",
        "Per-category replacement probabilities",
    ),
    read(
        "/getMaintenanceForecasts",
        StoreKind::Predictions,
        "SELECT * FROM MaintenanceForecasts",
        "Maintenance forecasts",
    ),
    read(
        "/getMaterialStatusTransitions",
        StoreKind::Predictions,
        "SELECT * FROM MaterialStatusTransitions",
        "Derived material status transitions",
    ),
    read(
        "/getFaultReports",
        StoreKind::Predictions,
        "SELECT Report_ID, Technician_ID, TurbineLocation, Report_Date, Fault_Type, \
         Fault_Description, Material_ID, Report_Status, Updated_Time, \
         (Attachment IS NOT NULL) AS HasAttachment \
         FROM FaultReport ORDER BY Report_ID",
        "Fault reports without attachment bodies",
    ),
    read(
        "/verifyTechnicianLinks",
        StoreKind::Predictions,
        "SELECT fr.Report_ID, fr.Technician_ID, t.Name, t.Surname \
         FROM FaultReport fr LEFT JOIN Technician t ON fr.Technician_ID = t.Technician_ID \
         ORDER BY fr.Report_ID",
        "Fault reports joined to their technician",
    ),
    read(
        "/getMaterialCategoryHealthScores",
        StoreKind::Predictions,
        "SELECT * FROM MaterialCategoryHealthScores",
        "Material category health per plant",
    ),
    read(
        "/getMaterialCategoryScoreSummary",
        StoreKind::Predictions,
        "SELECT * FROM MaterialCategoryScoreSummary",
        "Material category health totals",
    ),
    read(
        "/getMaterialComponentHealthScore",
        StoreKind::Predictions,
        "SELECT * FROM MaterialComponentHealthScore",
        "Material component health per plant",
    ),
    read(
        "/getMaterialComponentScoreSummary",
        StoreKind::Predictions,
        "SELECT * FROM MaterialComponentScoreSummary",
        "Material component health totals",
    ),
    read(
        "/getTurbineModelHealthScore",
        StoreKind::Predictions,
        "SELECT * FROM TurbineModelHealthScore",
        "Turbine model health per plant",
    ),
    read(
        "/getTurbineModelScoreSummary",
        StoreKind::Predictions,
        "SELECT * FROM TurbineModelScoreSummary",
        "Turbine model health totals",
    ),
    read(
        "/getTurbinePlatformHealthScore",
        StoreKind::Predictions,
        "SELECT * FROM TurbinePlatformHealthScore",
        "Turbine platform health per plant",
    ),
    read(
        "/getTurbinePlatformScoreSummary",
        StoreKind::Predictions,
        "SELECT * FROM TurbinePlatformScoreSummary",
        "Turbine platform health totals",
    ),
];

/// One cell as JSON, decoded by the value's storage class rather than the
/// declared column type, so computed columns and full-precision REALs survive.
fn cell(row: &QueryResult, idx: usize) -> JsonValue {
    if let Ok(value) = row.try_get_by_index::<Option<i64>>(idx) {
        return value.map_or(JsonValue::Null, JsonValue::from);
    }
    if let Ok(Some(value)) = row.try_get_by_index::<Option<f64>>(idx) {
        return JsonValue::from(value);
    }
    if let Ok(Some(value)) = row.try_get_by_index::<Option<String>>(idx) {
        return JsonValue::from(value);
    }
    if let Ok(Some(value)) = row.try_get_by_index::<Option<Vec<u8>>>(idx) {
        return JsonValue::from(value);
    }
    JsonValue::Null
}

fn row_object(row: &QueryResult) -> JsonValue {
    let object: Map<String, JsonValue> = row
        .column_names()
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name, cell(row, idx)))
        .collect();
    JsonValue::Object(object)
}

/// Run one registry query.
///
/// # Errors
///
/// Returns any database error.
pub async fn fetch(state: &AppState, endpoint: &ReadEndpoint) -> AppResult<Vec<JsonValue>> {
    let conn = state.store.conn(endpoint.store);
    let rows: Vec<JsonValue> = conn
        .query_all(Statement::from_string(conn.get_database_backend(), endpoint.sql))
        .await?
        .iter()
        .map(row_object)
        .collect();
    tracing::debug!(path = endpoint.path, store = %endpoint.store, rows = rows.len(), "Read served");
    Ok(rows)
}

/// One GET route per registry entry.
pub fn routes() -> Router<AppState> {
    READ_ENDPOINTS.iter().fold(Router::new(), |router, endpoint| {
        router.route(
            endpoint.path,
            get(move |State(state): State<AppState>| async move {
                let data = fetch(&state, endpoint).await?;
                AppResult::Ok(Json(ReadResponse { success: true, data }))
            }),
        )
    })
}

/// Add the registry entries to an OpenAPI document.
pub fn document(doc: &mut OpenApi) {
    for endpoint in READ_ENDPOINTS {
        let operation = OperationBuilder::new()
            .summary(Some(endpoint.summary))
            .description(Some(format!("Reads from the {} store.", endpoint.store)))
            .tag("reads")
            .response("200", Response::new("`{success: true, data: [rows]}`"))
            .response("500", Response::new("Database failure"))
            .build();
        doc.paths
            .add_path_operation(endpoint.path, vec![HttpMethod::Get], operation);
    }
}
