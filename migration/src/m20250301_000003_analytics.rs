use sea_orm_migration::prelude::*;

use crate::{col, drop_tables, unique_index};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Health-score tables: (table, key columns, score column).
///
/// Detail tables are keyed by (subject, Plant); summary tables by subject alone.
const SCORE_TABLES: &[(&str, &[&str], &str)] = &[
    ("MaterialCategoryHealthScores", &["Category", "Plant"], "HealthScore"),
    ("MaterialCategoryScoreSummary", &["Category"], "TotalCategoryScore"),
    ("MaterialComponentHealthScore", &["Material_ID", "Plant"], "HealthScore"),
    ("MaterialComponentScoreSummary", &["Material_ID"], "TotalComponentScore"),
    ("TurbineModelHealthScore", &["TurbineModel", "Plant"], "HealthScore"),
    ("TurbineModelScoreSummary", &["TurbineModel"], "TotalModelScore"),
    ("TurbinePlatformHealthScore", &["Platform", "Plant"], "HealthScore"),
    ("TurbinePlatformScoreSummary", &["Platform"], "TotalPlatformScore"),
];

fn surrogate(name: &'static str) -> ColumnDef {
    let mut column = col(name);
    column.integer().not_null().auto_increment().primary_key();
    column
}

fn stamped(name: &'static str) -> ColumnDef {
    let mut column = col(name);
    column.text().default(Expr::current_timestamp());
    column
}

fn prediction_table(table: &'static str, plant_scoped: bool) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(table))
        .if_not_exists()
        .col(surrogate("Prediction_ID"))
        .col(col("Material_ID").integer().not_null())
        .col(col("Material_Description").text());
    if plant_scoped {
        stmt.col(col("Plant_ID").integer().not_null());
    }
    stmt.col(col("MaterialCategory").text().not_null().default(""))
        .col(col("Total_Count").integer())
        .col(col("Count_B").integer())
        .col(col("BayesianProbability").double())
        .col(col("MonteCarloProbability").double())
        .col(col("MonteCarlo_5thPercentile").double())
        .col(col("MonteCarlo_95thPercentile").double())
        .col(col("MonteCarlo_StdDev").double())
        .col(stamped("Timestamp"))
        .foreign_key(
            ForeignKey::create()
                .from(Alias::new(table), Alias::new("Material_ID"))
                .to(Alias::new("Material"), Alias::new("Material_ID")),
        );
    if plant_scoped {
        stmt.foreign_key(
            ForeignKey::create()
                .from(Alias::new(table), Alias::new("Plant_ID"))
                .to(Alias::new("Plant"), Alias::new("Plant_ID")),
        );
    }
    stmt.to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== REPLACEMENT PREDICTIONS ==========
        manager
            .create_table(prediction_table("ReplacementPredictionGlobal", false))
            .await?;
        manager
            .create_index(unique_index(
                "ux_replacementpredictionglobal_material_category",
                "ReplacementPredictionGlobal",
                &["Material_ID", "MaterialCategory"],
            ))
            .await?;

        manager
            .create_table(prediction_table("ReplacementPrediction", true))
            .await?;
        manager
            .create_index(unique_index(
                "ux_replacementprediction_material_plant_category",
                "ReplacementPrediction",
                &["Material_ID", "Plant_ID", "MaterialCategory"],
            ))
            .await?;

        // ========== MONTE CARLO DOMINANCE ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("MonteCarloDominance"))
                    .if_not_exists()
                    .col(surrogate("Dominance_ID"))
                    .col(col("Description").text().not_null().unique_key())
                    .col(col("DominanceCount").integer())
                    .col(col("Percentage").double())
                    .col(stamped("Timestamp"))
                    .to_owned(),
            )
            .await?;

        // ========== REPLACEMENT TRENDS ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("ReplacementTrends"))
                    .if_not_exists()
                    .col(surrogate("Trend_ID"))
                    .col(col("Timestamp").text().not_null())
                    .col(col("Description").text().not_null())
                    .col(col("Count").integer())
                    .col(col("Prediction_ID").integer())
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(unique_index(
                "ux_replacementtrends_timestamp_description",
                "ReplacementTrends",
                &["Timestamp", "Description"],
            ))
            .await?;

        // ========== MATERIAL STATUS TRANSITIONS ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("MaterialStatusTransitions"))
                    .if_not_exists()
                    .col(surrogate("Transition_ID"))
                    .col(col("Material").text().not_null())
                    .col(col("Description").text())
                    .col(col("PrevStatus").text().not_null())
                    .col(col("Plant").text().not_null())
                    .col(col("PlantSpecificMaterialStatus").text().not_null())
                    .col(col("TransitionCount").integer().not_null().default(0))
                    .col(col("Direction").text())
                    .col(stamped("Timestamp"))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(unique_index(
                "ux_materialstatustransitions_key",
                "MaterialStatusTransitions",
                &["Material", "PrevStatus", "Plant", "PlantSpecificMaterialStatus"],
            ))
            .await?;

        // ========== MAINTENANCE FORECASTS ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("MaintenanceForecasts"))
                    .if_not_exists()
                    .col(surrogate("Forecast_ID"))
                    .col(col("Material_ID").integer().not_null())
                    .col(col("Plant_ID").integer().not_null())
                    .col(col("LastMaintenance").text())
                    .col(col("AverageIntervalDays").integer())
                    .col(col("NextEstimatedMaintenanceDate").text())
                    .col(stamped("Timestamp"))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(unique_index(
                "ux_maintenanceforecasts_material_plant",
                "MaintenanceForecasts",
                &["Material_ID", "Plant_ID"],
            ))
            .await?;

        // ========== MATERIAL CATEGORY PREDICTIONS ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("MaterialCategoryPredictions"))
                    .if_not_exists()
                    .col(col("Category").text().not_null().primary_key())
                    .col(col("BayesianProbability").double())
                    .col(col("MonteCarloEstimate").double())
                    .col(col("MonteCarlo_5th_Percentile").double())
                    .col(col("MonteCarlo_50th_Percentile").double())
                    .col(col("MonteCarlo_95th_Percentile").double())
                    .col(stamped("Timestamp"))
                    .to_owned(),
            )
            .await?;

        // ========== HEALTH SCORES ==========
        for &(table, keys, score) in SCORE_TABLES {
            let mut stmt = Table::create();
            stmt.table(Alias::new(table)).if_not_exists();
            for &key in keys {
                stmt.col(col(key).text().not_null());
            }
            stmt.col(col(score).double())
                .col(col("LastUpdated").text());
            manager.create_table(stmt).await?;

            manager
                .create_index(unique_index(
                    table_key_index(table),
                    table,
                    keys,
                ))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut tables: Vec<&'static str> = SCORE_TABLES.iter().map(|(t, _, _)| *t).collect();
        tables.extend([
            "MaterialCategoryPredictions",
            "MaintenanceForecasts",
            "MaterialStatusTransitions",
            "ReplacementTrends",
            "MonteCarloDominance",
            "ReplacementPrediction",
            "ReplacementPredictionGlobal",
        ]);
        drop_tables(manager, &tables).await
    }
}

fn table_key_index(table: &'static str) -> &'static str {
    match table {
        "MaterialCategoryHealthScores" => "ux_materialcategoryhealthscores_key",
        "MaterialCategoryScoreSummary" => "ux_materialcategoryscoresummary_key",
        "MaterialComponentHealthScore" => "ux_materialcomponenthealthscore_key",
        "MaterialComponentScoreSummary" => "ux_materialcomponentscoresummary_key",
        "TurbineModelHealthScore" => "ux_turbinemodelhealthscore_key",
        "TurbineModelScoreSummary" => "ux_turbinemodelscoresummary_key",
        "TurbinePlatformHealthScore" => "ux_turbineplatformhealthscore_key",
        _ => "ux_turbineplatformscoresummary_key",
    }
}
