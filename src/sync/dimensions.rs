//! Plant, Material and Location upserts keyed by natural identifiers.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, FromQueryResult, QueryFilter,
    Statement,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::lenient::{de_opt_text, de_truthy};
use crate::entity::{location, material, plant};
use crate::error::AppResult;
use crate::geo::GeoTable;
use crate::store::{DataStore, Mirror, MirroredWrite, StoreKind, commit_or_rollback, tables};

/// Plant role flags. Once set on a plant they are never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub is_plant: bool,
    pub is_planning_plant: bool,
    pub is_manufacturing_plant: bool,
}

impl RoleFlags {
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            is_plant: self.is_plant || other.is_plant,
            is_planning_plant: self.is_planning_plant || other.is_planning_plant,
            is_manufacturing_plant: self.is_manufacturing_plant || other.is_manufacturing_plant,
        }
    }
}

impl From<&plant::Model> for RoleFlags {
    fn from(row: &plant::Model) -> Self {
        Self {
            is_plant: row.is_plant,
            is_planning_plant: row.is_planning_plant,
            is_manufacturing_plant: row.is_manufacturing_plant,
        }
    }
}

/// One entry of a `syncPlantCoordinates` request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlantEntry {
    #[serde(default, deserialize_with = "de_opt_text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "de_truthy")]
    pub is_plant: bool,
    #[serde(default, deserialize_with = "de_truthy")]
    pub is_planning_plant: bool,
    #[serde(default, deserialize_with = "de_truthy")]
    pub is_manufacturing_plant: bool,
}

impl PlantEntry {
    #[must_use]
    pub fn roles(&self) -> RoleFlags {
        RoleFlags {
            is_plant: self.is_plant,
            is_planning_plant: self.is_planning_plant,
            is_manufacturing_plant: self.is_manufacturing_plant,
        }
    }
}

/// Upsert one plant with resolved coordinates and OR-merged role flags.
///
/// Returns `false` when the code is blank and the entry was skipped.
///
/// # Errors
///
/// Returns any database error.
pub async fn upsert_plant<C>(conn: &C, geo: &GeoTable, code: &str, requested: RoleFlags) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let code = code.trim();
    if code.is_empty() {
        tracing::warn!("Skipping plant with empty code");
        return Ok(false);
    }

    let existing = plant::Entity::find()
        .filter(plant::Column::PlantName.eq(code))
        .one(conn)
        .await?;
    let roles = existing
        .as_ref()
        .map_or(requested, |row| requested.merge(RoleFlags::from(row)));

    let point = geo.resolve(code);
    if point.defaulted {
        tracing::debug!(code, "No coordinates for plant prefix, using fallback");
    }

    tables::PLANT
        .execute(
            conn,
            vec![
                code.into(),
                Some(point.lat).into(),
                Some(point.lon).into(),
                point.defaulted.into(),
                roles.is_plant.into(),
                roles.is_planning_plant.into(),
                roles.is_manufacturing_plant.into(),
            ],
        )
        .await?;

    tracing::debug!(code, created = existing.is_none(), "Upserted plant");
    Ok(true)
}

/// Upsert a material by A9B number; counters are left alone on conflict.
///
/// Returns the surrogate `Material_ID`, or `None` when the number is blank.
///
/// # Errors
///
/// Returns any database error.
pub async fn upsert_material<C>(
    conn: &C,
    a9b_number: &str,
    category: Option<&str>,
    description: Option<&str>,
    is_batch_managed: bool,
) -> AppResult<Option<i32>>
where
    C: ConnectionTrait,
{
    let a9b_number = a9b_number.trim();
    if a9b_number.is_empty() {
        tracing::warn!("Skipping material with empty number");
        return Ok(None);
    }

    tables::MATERIAL
        .execute(
            conn,
            vec![
                a9b_number.into(),
                category.map(str::to_owned).into(),
                description.map(str::to_owned).into(),
                is_batch_managed.into(),
            ],
        )
        .await?;

    Ok(material_id(conn, a9b_number).await?)
}

/// Insert-or-ignore a location and return its id.
///
/// # Errors
///
/// Returns any database error.
pub async fn upsert_location<C>(conn: &C, name: &str) -> AppResult<Option<i32>>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        tracing::warn!("Skipping location with empty name");
        return Ok(None);
    }

    if tables::LOCATION.execute(conn, vec![name.into()]).await? > 0 {
        tracing::debug!(name, "Created location");
    }

    Ok(location::Entity::find()
        .filter(location::Column::LocationName.eq(name))
        .one(conn)
        .await?
        .map(|row| row.location_id))
}

/// Look up a material's surrogate id by A9B number.
///
/// # Errors
///
/// Returns any database error.
pub async fn material_id<C>(conn: &C, a9b_number: &str) -> Result<Option<i32>, sea_orm::DbErr>
where
    C: ConnectionTrait,
{
    Ok(material::Entity::find()
        .filter(material::Column::MaterialA9bNumber.eq(a9b_number.trim()))
        .one(conn)
        .await?
        .map(|row| row.material_id))
}

/// Look up a plant by name, ignoring case.
///
/// # Errors
///
/// Returns any database error.
pub async fn find_plant<C>(conn: &C, name: &str) -> Result<Option<plant::Model>, sea_orm::DbErr>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if let Some(exact) = plant::Entity::find()
        .filter(plant::Column::PlantName.eq(name))
        .one(conn)
        .await?
    {
        return Ok(Some(exact));
    }

    plant::Entity::find()
        .filter(sea_orm::sea_query::Expr::cust_with_values(
            "\"Plant_Name\" = ? COLLATE NOCASE",
            [name],
        ))
        .one(conn)
        .await
}

// ========== PLANT COORDINATE SYNC ==========

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct PlantSyncSummary {
    pub written: u64,
    pub skipped: u64,
    pub stores: Vec<StoreKind>,
}

struct PlantCoordinatesWrite {
    entries: Vec<PlantEntry>,
    geo: Arc<GeoTable>,
}

#[async_trait]
impl MirroredWrite for PlantCoordinatesWrite {
    fn name(&self) -> &'static str {
        "plant_coordinates"
    }

    async fn apply(&self, txn: &DatabaseTransaction) -> AppResult<u64> {
        let mut written = 0;
        for entry in &self.entries {
            let code = entry.code.as_deref().unwrap_or_default();
            if upsert_plant(txn, &self.geo, code, entry.roles()).await? {
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Upsert every plant entry into each of `sinks`, one transaction per sink.
///
/// # Errors
///
/// Returns the database error of the first sink, or `PartialMirrorFailure`.
pub async fn sync_plant_coordinates(
    store: &DataStore,
    sinks: &[StoreKind],
    geo: Arc<GeoTable>,
    entries: Vec<PlantEntry>,
) -> AppResult<PlantSyncSummary> {
    let total = entries.len() as u64;
    let write = PlantCoordinatesWrite { entries, geo };
    let report = Mirror::new(store, sinks).replay(&write).await?;

    let written = report.primary_rows();
    tracing::info!(written, skipped = total - written, sinks = report.sinks.len(), "Plant coordinates synced");
    Ok(PlantSyncSummary {
        written,
        skipped: total - written,
        stores: report.sinks.iter().map(|s| s.store).collect(),
    })
}

// ========== TURBINE LOCATIONS ==========

#[derive(Debug, FromQueryResult)]
struct FunctionalLocRow {
    functional_loc: Option<String>,
}

/// Create a Location for every distinct non-blank `FunctionalLoc` in TurbineData.
///
/// Returns the number of locations created.
///
/// # Errors
///
/// Returns any database error.
pub async fn sync_turbine_locations(store: &DataStore) -> AppResult<u64> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = create_turbine_locations(&txn).await;
    let created = commit_or_rollback(txn, outcome).await?;
    tracing::info!(created, "Turbine locations synced");
    Ok(created)
}

async fn create_turbine_locations(txn: &DatabaseTransaction) -> AppResult<u64> {
    let rows = FunctionalLocRow::find_by_statement(Statement::from_string(
        txn.get_database_backend(),
        "SELECT DISTINCT TRIM(\"FunctionalLoc\") AS functional_loc FROM \"TurbineData\" \
         WHERE \"FunctionalLoc\" IS NOT NULL AND TRIM(\"FunctionalLoc\") <> ''",
    ))
    .all(txn)
    .await?;

    let mut created = 0;
    for row in rows {
        let Some(name) = row.functional_loc else { continue };
        created += tables::LOCATION.execute(txn, vec![name.into()]).await?;
    }
    Ok(created)
}
