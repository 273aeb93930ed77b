//! ReplacementPart, SerialNumberProfile and FaultReport derivation.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::seq::SliceRandom;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dimensions::{find_plant, upsert_location, upsert_material};
use crate::entity::{fault_report, material_data, plant, replacement_part, technician, turbine_data};
use crate::error::{AppError, AppResult};
use crate::store::{DataStore, StoreKind, commit_or_rollback, tables};

/// Values of `BatchManagementPlant` that mean the material is batch managed.
const BATCH_MANAGED_MARKERS: &[&str] = &["X", "1", "Y", "YES", "TRUE"];

#[must_use]
pub fn is_batch_managed(marker: Option<&str>) -> bool {
    marker.is_some_and(|m| {
        let m = m.trim();
        BATCH_MANAGED_MARKERS.iter().any(|v| v.eq_ignore_ascii_case(m))
    })
}

/// Why a staged material row counts as a replacement part, if it does.
#[must_use]
pub fn replacement_reason(row: &material_data::Model) -> Option<&'static str> {
    let marked_b = row
        .replacement_part
        .as_deref()
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("B"));
    let violation = row
        .violation_replacement_part
        .as_deref()
        .is_some_and(|v| v.trim() == "1");

    if marked_b {
        Some("ReplacementPart")
    } else if violation {
        Some("Violation")
    } else {
        None
    }
}

// ========== MATERIAL DATA SYNC ==========

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct MaterialSyncSummary {
    pub materials: u64,
    pub replacement_parts: u64,
    pub serial_profiles: u64,
    pub skipped: Vec<String>,
}

/// Fan each material code out to Material, ReplacementPart and
/// SerialNumberProfile, reading staged rows from the predictions store.
///
/// Codes with no staged rows are skipped, not treated as failures.
///
/// # Errors
///
/// Returns any database error; the whole batch is rolled back.
pub async fn sync_material_data(store: &DataStore, codes: &[String]) -> AppResult<MaterialSyncSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = sync_material_codes(&txn, codes).await;
    let summary = commit_or_rollback(txn, outcome).await?;

    tracing::info!(
        materials = summary.materials,
        replacement_parts = summary.replacement_parts,
        serial_profiles = summary.serial_profiles,
        skipped = summary.skipped.len(),
        "Material data synced"
    );
    Ok(summary)
}

async fn sync_material_codes(txn: &DatabaseTransaction, codes: &[String]) -> AppResult<MaterialSyncSummary> {
    let mut summary = MaterialSyncSummary::default();

    for code in codes {
        let code = code.trim();
        let rows = material_data::Entity::find()
            .filter(material_data::Column::Material.eq(code))
            .order_by_asc(material_data::Column::MaterialDataId)
            .all(txn)
            .await?;

        let Some(first) = rows.first() else {
            tracing::warn!(code, "Material not found in MaterialData, skipping");
            summary.skipped.push(code.to_string());
            continue;
        };

        let Some(material_id) = upsert_material(
            txn,
            code,
            first.material_category.as_deref(),
            first.description.as_deref(),
            is_batch_managed(first.batch_management_plant.as_deref()),
        )
        .await?
        else {
            summary.skipped.push(code.to_string());
            continue;
        };
        summary.materials += 1;

        for row in &rows {
            let Some(reason) = replacement_reason(row) else {
                continue;
            };
            let plant_name = row.plant.trim();
            if plant_name.is_empty() {
                tracing::warn!(code, "Replacement part row has no plant, skipping");
                continue;
            }
            let Some(plant) = find_plant(txn, plant_name).await? else {
                tracing::warn!(code, plant = plant_name, "Plant not found for replacement part, skipping");
                continue;
            };

            tables::REPLACEMENT_PART
                .execute(txn, vec![material_id.into(), plant.plant_id.into(), reason.into()])
                .await?;
            summary.replacement_parts += 1;
        }

        let profile = rows
            .iter()
            .filter_map(|r| r.serial_no_profile.as_deref().map(str::trim))
            .find(|p| !p.is_empty());
        if let Some(profile) = profile {
            tables::SERIAL_NUMBER_PROFILE
                .execute(txn, vec![material_id.into(), profile.into()])
                .await?;
            summary.serial_profiles += 1;
        }
    }

    Ok(summary)
}

// ========== FAULT REPORTS ==========

/// How generated fault reports get a technician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TechnicianAssignment {
    /// Pick uniformly at random from all technicians.
    Random,
    /// Leave `Technician_ID` null.
    #[serde(alias = "none")]
    Unassigned,
}

impl fmt::Display for TechnicianAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Unassigned => f.write_str("unassigned"),
        }
    }
}

impl FromStr for TechnicianAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "unassigned" | "none" => Ok(Self::Unassigned),
            other => Err(format!("unknown technician assignment '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct FaultReportSummary {
    pub created: u64,
    pub existing: u64,
    pub unassigned: u64,
}

fn pick_technician(pool: &[i32]) -> Option<i32> {
    pool.choose(&mut rand::thread_rng()).copied()
}

/// Create one open "Replacement Part" report per (turbine location, material)
/// for every ReplacementPart fact, unless an open one already exists.
///
/// # Errors
///
/// Returns any database error; the whole batch is rolled back.
pub async fn sync_fault_reports(
    store: &DataStore,
    assignment: TechnicianAssignment,
) -> AppResult<FaultReportSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = generate_fault_reports(&txn, assignment).await;
    let summary = commit_or_rollback(txn, outcome).await?;

    tracing::info!(
        created = summary.created,
        existing = summary.existing,
        unassigned = summary.unassigned,
        %assignment,
        "Fault reports synced"
    );
    Ok(summary)
}

async fn generate_fault_reports(
    txn: &DatabaseTransaction,
    assignment: TechnicianAssignment,
) -> AppResult<FaultReportSummary> {
    let pool: Vec<i32> = match assignment {
        TechnicianAssignment::Random => technician::Entity::find()
            .all(txn)
            .await?
            .into_iter()
            .map(|t| t.technician_id)
            .collect(),
        TechnicianAssignment::Unassigned => Vec::new(),
    };
    if assignment == TechnicianAssignment::Random && pool.is_empty() {
        tracing::warn!("No technicians available, generated reports stay unassigned");
    }

    let facts = replacement_part::Entity::find()
        .find_also_related(plant::Entity)
        .order_by_asc(replacement_part::Column::ReplacementPartId)
        .all(txn)
        .await?;

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let mut summary = FaultReportSummary::default();

    for (fact, plant) in facts {
        let Some(plant) = plant else {
            continue;
        };
        let turbines = turbine_data::Entity::find()
            .filter(turbine_data::Column::MaintPlant.eq(plant.plant_name.as_str()))
            .all(txn)
            .await?;

        for turbine in turbines {
            let Some(location_id) = upsert_location(txn, &turbine.functional_loc).await? else {
                continue;
            };

            let open = fault_report::Entity::find()
                .filter(fault_report::Column::TurbineLocation.eq(location_id))
                .filter(fault_report::Column::MaterialId.eq(fact.material_id))
                .filter(fault_report::Column::FaultType.eq(fault_report::REPLACEMENT_PART_FAULT))
                .filter(fault_report::Column::ReportStatus.eq(fault_report::STATUS_OPEN))
                .count(txn)
                .await?;
            if open > 0 {
                summary.existing += 1;
                continue;
            }

            let technician_id = match assignment {
                TechnicianAssignment::Random => pick_technician(&pool),
                TechnicianAssignment::Unassigned => None,
            };
            if technician_id.is_none() {
                summary.unassigned += 1;
            }

            fault_report::ActiveModel {
                report_id: NotSet,
                technician_id: Set(technician_id),
                turbine_location: Set(location_id),
                report_date: Set(Some(today.clone())),
                fault_type: Set(Some(fault_report::REPLACEMENT_PART_FAULT.to_string())),
                fault_description: Set(None),
                material_id: Set(Some(fact.material_id)),
                report_status: Set(fault_report::STATUS_OPEN.to_string()),
                updated_time: Set(Some(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())),
                attachment: Set(None),
            }
            .insert(txn)
            .await?;

            tracing::debug!(
                location = %turbine.functional_loc,
                material_id = fact.material_id,
                ?technician_id,
                "Created fault report"
            );
            summary.created += 1;
        }
    }

    Ok(summary)
}

// ========== MANUAL FAULT REPORT ==========

/// A fault report filed by hand from the dashboard.
#[derive(Debug, Clone, Default)]
pub struct NewFaultReport {
    pub technician_id: i32,
    pub turbine_location: i32,
    pub report_date: String,
    pub fault_type: Option<String>,
    pub fault_description: String,
    pub material_id: Option<i32>,
    pub report_status: Option<String>,
    pub attachment: Option<Vec<u8>>,
}

/// Insert a manual fault report and return its id.
///
/// # Errors
///
/// Returns any database error, including foreign-key violations for unknown
/// technicians, locations or materials.
pub async fn insert_fault_report(store: &DataStore, report: NewFaultReport) -> AppResult<i32> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = async {
        let row = fault_report::ActiveModel {
            report_id: NotSet,
            technician_id: Set(Some(report.technician_id)),
            turbine_location: Set(report.turbine_location),
            report_date: Set(Some(report.report_date)),
            fault_type: Set(report.fault_type),
            fault_description: Set(Some(report.fault_description)),
            material_id: Set(report.material_id),
            report_status: Set(report
                .report_status
                .unwrap_or_else(|| fault_report::STATUS_OPEN.to_string())),
            updated_time: Set(Some(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string())),
            attachment: Set(report.attachment),
        }
        .insert(&txn)
        .await?;
        Ok::<_, AppError>(row.report_id)
    }
    .await;
    let report_id = commit_or_rollback(txn, outcome).await?;

    tracing::info!(report_id, "Fault report filed");
    Ok(report_id)
}
