//! Table-driven import of the four health-score families.
//!
//! Each family has a detail array (subject per plant) and a summary array
//! (subject total), written to their own tables in one transaction.

use chrono::Utc;
use sea_orm::DatabaseTransaction;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use super::ImportSummary;
use crate::common::lenient::{field, opt_f64, opt_text};
use crate::error::{AppError, AppResult};
use crate::store::{DataStore, StoreKind, UpsertSpec, commit_or_rollback, tables};

#[derive(Debug, Clone, Copy)]
pub struct HealthScoreFamily {
    pub name: &'static str,
    /// Subject column, e.g. `Category` or `TurbineModel`.
    pub subject: &'static str,
    /// Request key of the per-plant array.
    pub detail_key: &'static str,
    pub detail: UpsertSpec,
    pub summary: UpsertSpec,
    /// Score column of the summary table.
    pub summary_score: &'static str,
}

pub const MATERIAL_CATEGORY: HealthScoreFamily = HealthScoreFamily {
    name: "material_category",
    subject: "Category",
    detail_key: "plant_scores",
    detail: tables::CATEGORY_HEALTH,
    summary: tables::CATEGORY_SUMMARY,
    summary_score: "TotalCategoryScore",
};

pub const MATERIAL_COMPONENT: HealthScoreFamily = HealthScoreFamily {
    name: "material_component",
    subject: "Material_ID",
    detail_key: "plant_scores",
    detail: tables::COMPONENT_HEALTH,
    summary: tables::COMPONENT_SUMMARY,
    summary_score: "TotalComponentScore",
};

pub const TURBINE_MODEL: HealthScoreFamily = HealthScoreFamily {
    name: "turbine_model",
    subject: "TurbineModel",
    detail_key: "model_scores",
    detail: tables::MODEL_HEALTH,
    summary: tables::MODEL_SUMMARY,
    summary_score: "TotalModelScore",
};

pub const TURBINE_PLATFORM: HealthScoreFamily = HealthScoreFamily {
    name: "turbine_platform",
    subject: "Platform",
    detail_key: "platform_scores",
    detail: tables::PLATFORM_HEALTH,
    summary: tables::PLATFORM_SUMMARY,
    summary_score: "TotalPlatformScore",
};

pub const SUMMARY_KEY: &str = "summary_scores";

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct HealthScoreSummary {
    pub detail: ImportSummary,
    pub summary: ImportSummary,
}

impl HealthScoreFamily {
    /// Pull both arrays out of a request body.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` unless both keys hold arrays.
    pub fn split_payload<'a>(&self, body: &'a Value) -> AppResult<(&'a [Value], &'a [Value])> {
        let detail = body.get(self.detail_key).and_then(Value::as_array);
        let summary = body.get(SUMMARY_KEY).and_then(Value::as_array);
        match (detail, summary) {
            (Some(detail), Some(summary)) => Ok((detail, summary)),
            _ => Err(AppError::BadRequest(format!(
                "Invalid payload. Expected '{}' and '{SUMMARY_KEY}' arrays.",
                self.detail_key
            ))),
        }
    }

    /// Upsert both arrays in a single transaction on the predictions store.
    ///
    /// # Errors
    ///
    /// Returns any database error; nothing is kept on failure.
    pub async fn import(
        &self,
        store: &DataStore,
        detail: &[Value],
        summary: &[Value],
    ) -> AppResult<HealthScoreSummary> {
        let txn = store.begin(StoreKind::Predictions).await?;
        let outcome = self.import_in(&txn, detail, summary).await;
        let result = commit_or_rollback(txn, outcome).await?;

        tracing::info!(
            family = self.name,
            detail = result.detail.imported,
            summary = result.summary.imported,
            skipped = result.detail.skipped + result.summary.skipped,
            "Health scores synced"
        );
        Ok(result)
    }

    async fn import_in(
        &self,
        txn: &DatabaseTransaction,
        detail: &[Value],
        summary: &[Value],
    ) -> AppResult<HealthScoreSummary> {
        let now = Utc::now().to_rfc3339();
        let mut result = HealthScoreSummary::default();

        for row in detail {
            let subject = opt_text(field(row, &[self.subject]));
            let plant = opt_text(field(row, &["Plant"]));
            let score = opt_f64(field(row, &["HealthScore"]));
            let (Some(subject), Some(plant), Some(score)) = (subject, plant, score) else {
                result.detail.skipped += 1;
                continue;
            };
            let updated = opt_text(field(row, &["LastUpdated"])).unwrap_or_else(|| now.clone());
            self.detail
                .execute(txn, vec![subject.into(), plant.into(), score.into(), updated.into()])
                .await?;
            result.detail.imported += 1;
        }

        for row in summary {
            let subject = opt_text(field(row, &[self.subject]));
            let score = opt_f64(field(row, &[self.summary_score]));
            let (Some(subject), Some(score)) = (subject, score) else {
                result.summary.skipped += 1;
                continue;
            };
            let updated = opt_text(field(row, &["LastUpdated"])).unwrap_or_else(|| now.clone());
            self.summary
                .execute(txn, vec![subject.into(), score.into(), updated.into()])
                .await?;
            result.summary.imported += 1;
        }

        if result.detail.skipped + result.summary.skipped > 0 {
            tracing::warn!(
                family = self.name,
                skipped = result.detail.skipped + result.summary.skipped,
                "Skipped health score rows with missing subject, plant or score"
            );
        }
        Ok(result)
    }
}
