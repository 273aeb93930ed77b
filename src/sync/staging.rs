//! Writes of uploaded turbine and material records into the staging tables.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseTransaction, Statement, Value as DbValue};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ImportSummary;
use crate::common::lenient::{de_opt_f64, de_opt_i64, de_opt_text};
use crate::error::{AppError, AppResult};
use crate::store::{DataStore, Mirror, MirrorReport, MirroredWrite, StoreKind, commit_or_rollback, tables};

fn round6(value: Option<f64>) -> Option<f64> {
    value.map(|v| (v * 1_000_000.0).round() / 1_000_000.0)
}

fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One TurbineData row as uploaded.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct TurbineRecord {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub functional_loc: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub maint_plant: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub planning_plant: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub platform: Option<String>,
    #[serde(rename = "WTShortName", default, deserialize_with = "de_opt_text")]
    pub wt_short_name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub turbine_model: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub mk_version: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub revision: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub nominal_power: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub original_eq_manufact: Option<String>,
    #[serde(rename = "SBOMForTurbine", default, deserialize_with = "de_opt_text")]
    pub sbom_for_turbine: Option<String>,
    #[serde(rename = "SCADAName", default, deserialize_with = "de_opt_text")]
    pub scada_name: Option<String>,
    #[serde(rename = "SCADAParkID", default, deserialize_with = "de_opt_text")]
    pub scada_park_id: Option<String>,
    #[serde(rename = "SCADACode", default, deserialize_with = "de_opt_text")]
    pub scada_code: Option<String>,
    #[serde(rename = "SCADAFunctionalLoc", default, deserialize_with = "de_opt_text")]
    pub scada_functional_loc: Option<String>,
    #[serde(rename = "TechID", default, deserialize_with = "de_opt_text")]
    pub tech_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub technology: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub hub_height: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub tower_height: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub turbine_class: Option<String>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub unknown_maint_plant: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub unknown_planning_plant: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub turbine_latitude: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub turbine_longitude: Option<f64>,
}

impl TurbineRecord {
    /// Values in `tables::TURBINE_DATA` column order, or `None` without a
    /// functional location.
    fn values(&self) -> Option<Vec<DbValue>> {
        let functional_loc = self.functional_loc.clone()?;
        let text = |v: &Option<String>| -> DbValue { v.clone().into() };
        Some(vec![
            functional_loc.into(),
            text(&self.description),
            text(&self.maint_plant),
            text(&self.planning_plant),
            text(&self.platform),
            text(&self.wt_short_name),
            text(&self.turbine_model),
            text(&self.mk_version),
            text(&self.revision),
            text(&self.nominal_power),
            text(&self.original_eq_manufact),
            text(&self.sbom_for_turbine),
            text(&self.scada_name),
            text(&self.scada_park_id),
            text(&self.scada_code),
            text(&self.scada_functional_loc),
            text(&self.tech_id),
            text(&self.region),
            text(&self.technology),
            text(&self.hub_height),
            text(&self.tower_height),
            text(&self.turbine_class),
            self.unknown_maint_plant.into(),
            self.unknown_planning_plant.into(),
            round6(self.turbine_latitude).into(),
            round6(self.turbine_longitude).into(),
        ])
    }
}

/// One MaterialData row as uploaded.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct MaterialRecord {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub plant: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub plant_specific_material_status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub batch_management_plant: Option<String>,
    #[serde(rename = "Serial_No_Profile", default, deserialize_with = "de_opt_text")]
    pub serial_no_profile: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub replacement_part: Option<String>,
    #[serde(rename = "UsedInSBom", default, deserialize_with = "de_opt_text")]
    pub used_in_s_bom: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub violation_replacement_part: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub material_category: Option<String>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub unknown_plant: Option<String>,
    #[serde(rename = "Auto_Classified", default, deserialize_with = "de_opt_i64")]
    pub auto_classified: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_text")]
    pub timestamp: Option<String>,
}

impl MaterialRecord {
    /// Values in `tables::MATERIAL_DATA` column order, or `None` without a
    /// material number. A missing plant is stored as `""`.
    fn values(&self) -> Option<Vec<DbValue>> {
        let material = self.material.clone()?;
        let text = |v: &Option<String>| -> DbValue { v.clone().into() };
        Some(vec![
            material.into(),
            self.plant.clone().unwrap_or_default().into(),
            text(&self.description),
            text(&self.plant_specific_material_status),
            text(&self.batch_management_plant),
            text(&self.serial_no_profile),
            text(&self.replacement_part),
            text(&self.used_in_s_bom),
            text(&self.violation_replacement_part),
            text(&self.material_category),
            text(&self.unknown_plant),
            self.auto_classified.into(),
            self.timestamp.clone().unwrap_or_else(now_timestamp).into(),
        ])
    }
}

/// Reject an empty upload before any transaction is opened.
///
/// # Errors
///
/// Returns `BadRequest` for an empty slice.
pub fn require_records<T>(records: &[T]) -> AppResult<()> {
    if records.is_empty() {
        return Err(AppError::BadRequest("Invalid or empty data array".to_string()));
    }
    Ok(())
}

async fn write_turbines<C>(conn: &C, records: &[TurbineRecord], require_maint_plant: bool) -> AppResult<ImportSummary>
where
    C: ConnectionTrait,
{
    let mut summary = ImportSummary::default();
    for record in records {
        if require_maint_plant && record.maint_plant.is_none() {
            tracing::warn!(functional_loc = ?record.functional_loc, "Skipping turbine without MaintPlant");
            summary.skipped += 1;
            continue;
        }
        let Some(values) = record.values() else {
            tracing::warn!("Skipping turbine without FunctionalLoc");
            summary.skipped += 1;
            continue;
        };
        tables::TURBINE_DATA.execute(conn, values).await?;
        summary.imported += 1;
    }
    Ok(summary)
}

async fn write_materials<C>(conn: &C, records: &[MaterialRecord]) -> AppResult<ImportSummary>
where
    C: ConnectionTrait,
{
    let mut summary = ImportSummary::default();
    for record in records {
        let Some(values) = record.values() else {
            tracing::warn!(plant = ?record.plant, "Skipping material without Material number");
            summary.skipped += 1;
            continue;
        };
        tables::MATERIAL_DATA.execute(conn, values).await?;
        summary.imported += 1;
    }
    Ok(summary)
}

/// Upsert turbine records into one store.
///
/// # Errors
///
/// Returns `BadRequest` for an empty upload, or any database error.
pub async fn upload_turbines(
    store: &DataStore,
    kind: StoreKind,
    records: &[TurbineRecord],
    require_maint_plant: bool,
) -> AppResult<ImportSummary> {
    require_records(records)?;
    let txn = store.begin(kind).await?;
    let outcome = write_turbines(&txn, records, require_maint_plant).await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(store = %kind, imported = summary.imported, skipped = summary.skipped, "Turbine data uploaded");
    Ok(summary)
}

/// Upsert material records into one store.
///
/// # Errors
///
/// Returns `BadRequest` for an empty upload, or any database error.
pub async fn upload_materials(
    store: &DataStore,
    kind: StoreKind,
    records: &[MaterialRecord],
) -> AppResult<ImportSummary> {
    require_records(records)?;
    let txn = store.begin(kind).await?;
    let outcome = write_materials(&txn, records).await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(store = %kind, imported = summary.imported, skipped = summary.skipped, "Material data uploaded");
    Ok(summary)
}

struct MaterialUpload<'a> {
    records: &'a [MaterialRecord],
}

#[async_trait]
impl MirroredWrite for MaterialUpload<'_> {
    fn name(&self) -> &'static str {
        "material_upload"
    }

    async fn apply(&self, txn: &DatabaseTransaction) -> AppResult<u64> {
        Ok(write_materials(txn, self.records).await?.imported)
    }
}

/// Upsert material records into every store in `sinks`.
///
/// # Errors
///
/// Returns `BadRequest` for an empty upload, the first sink's error, or
/// `PartialMirrorFailure` when a later sink fails.
pub async fn upload_materials_mirrored(
    store: &DataStore,
    sinks: &[StoreKind],
    records: &[MaterialRecord],
) -> AppResult<MirrorReport> {
    require_records(records)?;
    let report = Mirror::new(store, sinks)
        .replay(&MaterialUpload { records })
        .await?;
    tracing::info!(
        rows = report.primary_rows(),
        sinks = report.sinks.len(),
        "Material data mirrored"
    );
    Ok(report)
}

/// A (Material, Plant) pair selected for manual re-categorisation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MaterialKey {
    #[serde(rename = "Material")]
    pub material: String,
    #[serde(rename = "Plant", default)]
    pub plant: String,
}

/// Set `MaterialCategory` on the given processed rows and mark them as
/// manually classified.
///
/// # Errors
///
/// Returns `BadRequest` for a blank category or empty selection, or any
/// database error.
pub async fn update_material_category(store: &DataStore, category: &str, rows: &[MaterialKey]) -> AppResult<u64> {
    let category = category.trim();
    if category.is_empty() || rows.is_empty() {
        return Err(AppError::BadRequest(
            "Invalid request body. Must include selectedCategory and rows array.".to_string(),
        ));
    }

    let txn = store.begin(StoreKind::Processed).await?;
    let outcome = async {
        let mut updated = 0;
        for row in rows {
            let result = txn
                .execute(Statement::from_sql_and_values(
                    txn.get_database_backend(),
                    "UPDATE \"MaterialData\" SET \"MaterialCategory\" = ?, \"Auto_Classified\" = 0 \
                     WHERE \"Material\" = ? AND \"Plant\" = ?",
                    [
                        category.into(),
                        row.material.trim().into(),
                        row.plant.trim().into(),
                    ],
                ))
                .await?;
            updated += result.rows_affected();
        }
        Ok::<_, AppError>(updated)
    }
    .await;
    let updated = commit_or_rollback(txn, outcome).await?;
    tracing::info!(category, updated, "Material category updated");
    Ok(updated)
}
