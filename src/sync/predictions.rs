//! Import of externally computed replacement statistics.
//!
//! Rows are matched to the Material dimension by A9B number (`Material`).
//! Matching by free-text `Description` is still accepted for older payloads
//! but logs a warning: whitespace or case drift silently drops rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::sea_query::{Alias, Expr, Order, Query, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Statement, Value as DbValue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::ImportSummary;
use super::dimensions::find_plant;
use crate::common::lenient::{field, opt_f64, opt_i64, opt_text};
use crate::entity::material;
use crate::error::AppResult;
use crate::store::{DataStore, StoreKind, commit_or_rollback, tables};

/// Value stored for a probability the payload did not provide.
const MISSING_PROBABILITY: f64 = -1.0;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReplacementPredictionsPayload {
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub overall: Option<Vec<Value>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub by_plant: Option<Vec<Value>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub monte_carlo_simulation: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReplacementPredictionsSummary {
    pub overall: ImportSummary,
    pub by_plant: ImportSummary,
    pub dominance: ImportSummary,
    /// Materials whose aggregate counters were refreshed.
    pub materials_updated: u64,
}

/// Statistics columns shared by the global and plant-scoped tables.
struct PredictionStats {
    total_count: i64,
    count_b: i64,
    bayesian: f64,
    monte_carlo: f64,
    p5: f64,
    p95: f64,
    std_dev: f64,
}

impl PredictionStats {
    fn from_row(row: &Value) -> Self {
        let probability = |names: &[&str]| opt_f64(field(row, names)).unwrap_or(MISSING_PROBABILITY);
        Self {
            total_count: opt_i64(field(row, &["Total_Count"])).unwrap_or(0),
            count_b: opt_i64(field(row, &["Count_B"])).unwrap_or(0),
            bayesian: probability(&["BayesianProbability", "Probability"]),
            monte_carlo: probability(&["MonteCarloProbability"]),
            p5: probability(&["MonteCarlo_5thPercentile"]),
            p95: probability(&["MonteCarlo_95thPercentile"]),
            std_dev: probability(&["MonteCarlo_StdDev"]),
        }
    }

    fn values(self) -> [DbValue; 7] {
        [
            self.total_count.into(),
            self.count_b.into(),
            self.bayesian.into(),
            self.monte_carlo.into(),
            self.p5.into(),
            self.p95.into(),
            self.std_dev.into(),
        ]
    }
}

/// Resolve a prediction row to its Material, preferring the A9B number.
async fn resolve_material<C>(conn: &C, row: &Value) -> AppResult<Option<material::Model>>
where
    C: ConnectionTrait,
{
    if let Some(number) = opt_text(field(row, &["Material", "Material_A9B_Number"])) {
        let found = material::Entity::find()
            .filter(material::Column::MaterialA9bNumber.eq(number.as_str()))
            .one(conn)
            .await?;
        if found.is_none() {
            tracing::warn!(material = %number, "Prediction references unknown material, skipping");
        }
        return Ok(found);
    }

    let Some(description) = opt_text(field(row, &["Description", "Material_Description"])) else {
        tracing::warn!("Prediction row has neither Material nor Description, skipping");
        return Ok(None);
    };

    tracing::warn!(description = %description, "Matching prediction by description; send Material instead");
    let found = material::Entity::find()
        .filter(material::Column::MaterialDescription.eq(description.as_str()))
        .order_by_asc(material::Column::MaterialId)
        .one(conn)
        .await?;
    if found.is_none() {
        tracing::warn!(description = %description, "No material with this description, skipping");
    }
    Ok(found)
}

fn description_for(row: &Value, material: &material::Model) -> Option<String> {
    opt_text(field(row, &["Description", "Material_Description"]))
        .or_else(|| material.material_description.clone())
}

/// Category key for the prediction tables; never NULL so re-imports hit the
/// unique index.
fn category_key(material: &material::Model) -> String {
    material
        .material_category
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Import global, per-plant and dominance rows in one transaction, then refresh
/// the counters of the materials just imported.
///
/// # Errors
///
/// Returns any database error; the whole import is rolled back.
pub async fn sync_replacement_predictions(
    store: &DataStore,
    payload: &ReplacementPredictionsPayload,
) -> AppResult<ReplacementPredictionsSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = import_replacement_predictions(&txn, payload).await;
    let summary = commit_or_rollback(txn, outcome).await?;

    tracing::info!(
        overall = summary.overall.imported,
        by_plant = summary.by_plant.imported,
        dominance = summary.dominance.imported,
        materials_updated = summary.materials_updated,
        "Replacement predictions synced"
    );
    Ok(summary)
}

async fn import_replacement_predictions(
    txn: &DatabaseTransaction,
    payload: &ReplacementPredictionsPayload,
) -> AppResult<ReplacementPredictionsSummary> {
    let mut summary = ReplacementPredictionsSummary::default();

    if let Some(rows) = &payload.overall {
        let mut imported_ids = Vec::new();
        for row in rows {
            let Some(material) = resolve_material(txn, row).await? else {
                summary.overall.skipped += 1;
                continue;
            };
            let mut values: Vec<DbValue> = vec![
                material.material_id.into(),
                description_for(row, &material).into(),
                category_key(&material).into(),
            ];
            values.extend(PredictionStats::from_row(row).values());
            tables::PREDICTION_GLOBAL.execute(txn, values).await?;

            imported_ids.push(material.material_id);
            summary.overall.imported += 1;
        }
        summary.materials_updated = refresh_material_counters(txn, &imported_ids).await?;
    }

    if let Some(rows) = &payload.by_plant {
        for row in rows {
            let Some(material) = resolve_material(txn, row).await? else {
                summary.by_plant.skipped += 1;
                continue;
            };
            let Some(plant_name) = opt_text(field(row, &["Plant"])) else {
                tracing::warn!(material_id = material.material_id, "Plant prediction without Plant, skipping");
                summary.by_plant.skipped += 1;
                continue;
            };
            let Some(plant) = find_plant(txn, &plant_name).await? else {
                tracing::warn!(plant = %plant_name, "Prediction references unknown plant, skipping");
                summary.by_plant.skipped += 1;
                continue;
            };

            let mut values: Vec<DbValue> = vec![
                material.material_id.into(),
                plant.plant_id.into(),
                description_for(row, &material).into(),
                category_key(&material).into(),
            ];
            values.extend(PredictionStats::from_row(row).values());
            tables::PREDICTION_BY_PLANT.execute(txn, values).await?;
            summary.by_plant.imported += 1;
        }
    }

    if let Some(rows) = &payload.monte_carlo_simulation {
        summary.dominance = import_dominance_rows(txn, rows).await?;
    }

    Ok(summary)
}

/// Copy the newest global prediction onto the Material counters, limited to
/// `material_ids` and to materials that have a global prediction.
async fn refresh_material_counters(txn: &DatabaseTransaction, material_ids: &[i32]) -> AppResult<u64> {
    if material_ids.is_empty() {
        return Ok(0);
    }

    let material_id = || (Alias::new("Material"), Alias::new("Material_ID"));
    let global = || Alias::new("g");
    let globals_for_material = || {
        Query::select()
            .from_as(Alias::new("ReplacementPredictionGlobal"), global())
            .and_where(Expr::col((global(), Alias::new("Material_ID"))).equals(material_id()))
            .to_owned()
    };
    let latest = |column: &str| {
        let newest = globals_for_material()
            .column((global(), Alias::new(column)))
            .order_by((global(), Alias::new("Timestamp")), Order::Desc)
            .order_by((global(), Alias::new("Prediction_ID")), Order::Desc)
            .limit(1)
            .to_owned();
        SimpleExpr::SubQuery(None, Box::new(newest.into_sub_query_statement()))
    };

    let update = Query::update()
        .table(Alias::new("Material"))
        .value(Alias::new("TotalReplacementCount"), latest("Count_B"))
        .value(Alias::new("Future_Replacement_Probability"), latest("BayesianProbability"))
        .value(Alias::new("TotalUsageCount"), latest("Total_Count"))
        .and_where(Expr::col(material_id()).is_in(material_ids.iter().copied()))
        .and_where(Expr::exists(globals_for_material().expr(Expr::val(1)).to_owned()))
        .to_owned();

    let result = txn.execute(txn.get_database_backend().build(&update)).await?;
    Ok(result.rows_affected())
}

// ========== MONTE CARLO DOMINANCE ==========

async fn import_dominance_rows(txn: &DatabaseTransaction, rows: &[Value]) -> AppResult<ImportSummary> {
    let mut summary = ImportSummary::default();
    for row in rows {
        let Some(description) = opt_text(field(row, &["Description"])) else {
            tracing::warn!("Skipping dominance row with missing Description");
            summary.skipped += 1;
            continue;
        };
        tables::DOMINANCE
            .execute(
                txn,
                vec![
                    description.into(),
                    opt_i64(field(row, &["DominanceCount"])).unwrap_or(0).into(),
                    opt_f64(field(row, &["Percentage"])).unwrap_or(0.0).into(),
                ],
            )
            .await?;
        summary.imported += 1;
    }
    Ok(summary)
}

/// Import standalone dominance rankings.
///
/// # Errors
///
/// Returns any database error; the whole import is rolled back.
pub async fn sync_monte_carlo_dominance(store: &DataStore, rows: &[Value]) -> AppResult<ImportSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = import_dominance_rows(&txn, rows).await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(imported = summary.imported, skipped = summary.skipped, "Monte Carlo dominance synced");
    Ok(summary)
}

// ========== REPLACEMENT TRENDS ==========

#[derive(Debug, FromQueryResult)]
struct LatestPrediction {
    prediction_id: i32,
}

/// Import trend points, linking each to the newest plant-scoped prediction
/// with the same description (or none).
///
/// # Errors
///
/// Returns any database error; the whole import is rolled back.
pub async fn sync_replacement_trends(store: &DataStore, rows: &[Value]) -> AppResult<ImportSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = import_trends(&txn, rows).await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(imported = summary.imported, skipped = summary.skipped, "Replacement trends synced");
    Ok(summary)
}

async fn import_trends(txn: &DatabaseTransaction, rows: &[Value]) -> AppResult<ImportSummary> {
    let mut summary = ImportSummary::default();
    for row in rows {
        let timestamp = opt_text(field(row, &["Timestamp"]));
        let description = opt_text(field(row, &["Description"]));
        let count = opt_i64(field(row, &["Count"]));
        let (Some(timestamp), Some(description), Some(count)) = (timestamp, description, count) else {
            tracing::warn!("Skipping invalid trend entry");
            summary.skipped += 1;
            continue;
        };

        let prediction_id = LatestPrediction::find_by_statement(Statement::from_sql_and_values(
            txn.get_database_backend(),
            "SELECT \"Prediction_ID\" AS prediction_id FROM \"ReplacementPrediction\" \
             WHERE \"Material_Description\" = ? ORDER BY \"Timestamp\" DESC LIMIT 1",
            [description.clone().into()],
        ))
        .one(txn)
        .await?
        .map(|p| p.prediction_id);
        if prediction_id.is_none() {
            tracing::warn!(description = %description, "No replacement prediction for trend");
        }

        tables::TRENDS
            .execute(
                txn,
                vec![
                    timestamp.into(),
                    description.into(),
                    count.into(),
                    prediction_id.into(),
                ],
            )
            .await?;
        summary.imported += 1;
    }
    Ok(summary)
}

// ========== CATEGORY PREDICTIONS ==========

/// Import per-category probability estimates.
///
/// # Errors
///
/// Returns any database error; the whole import is rolled back.
pub async fn sync_category_predictions(store: &DataStore, rows: &[Value]) -> AppResult<ImportSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = async {
        let mut summary = ImportSummary::default();
        for row in rows {
            let Some(category) = opt_text(field(row, &["Category"])) else {
                tracing::warn!("Skipping category prediction with missing Category");
                summary.skipped += 1;
                continue;
            };
            let number = |name: &str| opt_f64(field(row, &[name])).unwrap_or(0.0);
            tables::CATEGORY_PREDICTIONS
                .execute(
                    &txn,
                    vec![
                        category.into(),
                        number("BayesianProbability").into(),
                        number("MonteCarloEstimate").into(),
                        number("MonteCarlo_5th_Percentile").into(),
                        number("MonteCarlo_50th_Percentile").into(),
                        number("MonteCarlo_95th_Percentile").into(),
                    ],
                )
                .await?;
            summary.imported += 1;
        }
        AppResult::Ok(summary)
    }
    .await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(imported = summary.imported, skipped = summary.skipped, "Category predictions synced");
    Ok(summary)
}

// ========== MAINTENANCE FORECASTS ==========

/// Accept `YYYY-MM-DD`, RFC 3339, or a naive ISO date-time; anything else is
/// stored as NULL.
#[must_use]
pub fn iso_date_or_none(value: &Value) -> Option<String> {
    let raw = value.as_str()?.trim();
    let valid = NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").is_ok();
    valid.then(|| raw.to_string())
}

/// Import maintenance forecasts keyed by (Material_ID, Plant_ID).
///
/// An empty list is a no-op. Rows without numeric ids or interval are skipped.
///
/// # Errors
///
/// Returns any database error; the whole import is rolled back.
pub async fn sync_maintenance_forecasts(store: &DataStore, rows: &[Value]) -> AppResult<ImportSummary> {
    if rows.is_empty() {
        tracing::debug!("No forecasts to sync");
        return Ok(ImportSummary::default());
    }

    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = async {
        let mut summary = ImportSummary::default();
        for row in rows {
            let material_id = row.get("Material_ID").and_then(Value::as_i64);
            let plant_id = row.get("Plant_ID").and_then(Value::as_i64);
            let interval = row.get("AverageIntervalDays").and_then(opt_f64);
            let (Some(material_id), Some(plant_id), Some(interval)) = (material_id, plant_id, interval) else {
                tracing::warn!("Skipping invalid forecast row");
                summary.skipped += 1;
                continue;
            };

            tables::FORECASTS
                .execute(
                    &txn,
                    vec![
                        material_id.into(),
                        plant_id.into(),
                        iso_date_or_none(field(row, &["LastMaintenance"])).into(),
                        (interval.round() as i64).into(),
                        iso_date_or_none(field(row, &["NextEstimatedMaintenanceDate"])).into(),
                    ],
                )
                .await?;
            summary.imported += 1;
        }
        AppResult::Ok(summary)
    }
    .await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(imported = summary.imported, skipped = summary.skipped, "Maintenance forecasts synced");
    Ok(summary)
}
