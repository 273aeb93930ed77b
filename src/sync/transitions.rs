//! Plant-specific material status transitions derived from timestamped
//! MaterialData rows.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sea_orm::{ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::material_data;
use crate::error::AppResult;
use crate::store::{DataStore, StoreKind, commit_or_rollback, tables};

/// Status codes in lifecycle order.
pub const VALID_STATUSES: [&str; 15] = [
    "Z0", "Z1", "Z2", "Z3", "Z4", "Z5", "Z6", "Z7", "Z8", "Z9", "ZI", "ZL", "ZP", "ZR", "ZS",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusObservation {
    pub material: String,
    pub plant: String,
    pub description: Option<String>,
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    None,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Transition {
    pub material: String,
    pub plant: String,
    pub description: Option<String>,
    pub prev_status: String,
    pub status: String,
    /// Sum of absolute step distances between consecutive statuses.
    pub transition_count: i64,
    pub direction: Direction,
}

fn status_index(status: &str) -> Option<usize> {
    VALID_STATUSES.iter().position(|s| *s == status)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Derive aggregated transitions from raw observations.
///
/// Observations are grouped by (material, plant) and ordered by timestamp.
/// A group with a single observation yields a zero-step `none` transition.
/// Results are aggregated per (material, prev status, plant, status), summing
/// step counts and keeping the first direction seen.
#[must_use]
pub fn derive_transitions(observations: &[StatusObservation]) -> Vec<Transition> {
    let mut groups: BTreeMap<(&str, &str), Vec<&StatusObservation>> = BTreeMap::new();
    for obs in observations {
        if obs.material.is_empty()
            || obs.plant.is_empty()
            || obs.timestamp.is_empty()
            || status_index(&obs.status).is_none()
        {
            continue;
        }
        groups
            .entry((obs.material.as_str(), obs.plant.as_str()))
            .or_default()
            .push(obs);
    }

    let mut raw = Vec::new();
    for ((material, _), mut entries) in groups {
        entries.sort_by(|a, b| {
            (parse_timestamp(&a.timestamp), &a.timestamp).cmp(&(parse_timestamp(&b.timestamp), &b.timestamp))
        });

        if let [only] = entries.as_slice() {
            raw.push(Transition {
                material: material.to_string(),
                plant: only.plant.clone(),
                description: only.description.clone(),
                prev_status: only.status.clone(),
                status: only.status.clone(),
                transition_count: 0,
                direction: Direction::None,
            });
            continue;
        }

        for pair in entries.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let (Some(from), Some(to)) = (status_index(&prev.status), status_index(&curr.status)) else {
                continue;
            };
            let direction = match to.cmp(&from) {
                std::cmp::Ordering::Greater => Direction::Forward,
                std::cmp::Ordering::Less => Direction::Backward,
                std::cmp::Ordering::Equal => Direction::None,
            };
            raw.push(Transition {
                material: material.to_string(),
                plant: curr.plant.clone(),
                description: curr.description.clone(),
                prev_status: prev.status.clone(),
                status: curr.status.clone(),
                transition_count: from.abs_diff(to) as i64,
                direction,
            });
        }
    }

    let mut aggregated: BTreeMap<(String, String, String, String), Transition> = BTreeMap::new();
    for t in raw {
        let key = (
            t.material.clone(),
            t.prev_status.clone(),
            t.plant.clone(),
            t.status.clone(),
        );
        aggregated
            .entry(key)
            .and_modify(|existing| existing.transition_count += t.transition_count)
            .or_insert(t);
    }
    aggregated.into_values().collect()
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct TransitionSyncSummary {
    pub observations: u64,
    pub transitions: u64,
}

/// Read timestamped MaterialData from the predictions store, derive
/// transitions and upsert them.
///
/// # Errors
///
/// Returns any database error; the whole batch is rolled back.
pub async fn sync_status_transitions(store: &DataStore) -> AppResult<TransitionSyncSummary> {
    let txn = store.begin(StoreKind::Predictions).await?;
    let outcome = upsert_transitions(&txn).await;
    let summary = commit_or_rollback(txn, outcome).await?;
    tracing::info!(
        observations = summary.observations,
        transitions = summary.transitions,
        "Material status transitions synced"
    );
    Ok(summary)
}

async fn upsert_transitions(txn: &DatabaseTransaction) -> AppResult<TransitionSyncSummary> {
    let rows = material_data::Entity::find()
        .filter(material_data::Column::Timestamp.is_not_null())
        .all(txn)
        .await?;

    let observations: Vec<StatusObservation> = rows
        .into_iter()
        .map(|row| StatusObservation {
            material: row.material.trim().to_string(),
            plant: row.plant.trim().to_string(),
            description: row.description.map(|d| d.trim().to_string()),
            status: row
                .plant_specific_material_status
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            timestamp: row.timestamp.map(|t| t.trim().to_string()).unwrap_or_default(),
        })
        .collect();

    let transitions = derive_transitions(&observations);
    for t in &transitions {
        tables::TRANSITIONS
            .execute(
                txn,
                vec![
                    t.material.clone().into(),
                    t.description.clone().into(),
                    t.prev_status.clone().into(),
                    t.plant.clone().into(),
                    t.status.clone().into(),
                    t.transition_count.into(),
                    t.direction.as_str().into(),
                ],
            )
            .await?;
    }

    Ok(TransitionSyncSummary {
        observations: observations.len() as u64,
        transitions: transitions.len() as u64,
    })
}
