use sea_orm_migration::prelude::*;

use crate::{col, drop_tables, plain_index, unique_index};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Free-text turbine attributes, stored as uploaded.
const TURBINE_TEXT_COLUMNS: &[&str] = &[
    "Description",
    "MaintPlant",
    "PlanningPlant",
    "Platform",
    "WTShortName",
    "TurbineModel",
    "MkVersion",
    "Revision",
    "NominalPower",
    "OriginalEqManufact",
    "SBOMForTurbine",
    "SCADAName",
    "SCADAParkID",
    "SCADACode",
    "SCADAFunctionalLoc",
    "TechID",
    "Region",
    "Technology",
    "HubHeight",
    "TowerHeight",
    "TurbineClass",
];

const MATERIAL_TEXT_COLUMNS: &[&str] = &[
    "Description",
    "PlantSpecificMaterialStatus",
    "BatchManagementPlant",
    "Serial_No_Profile",
    "ReplacementPart",
    "UsedInSBom",
    "ViolationReplacementPart",
    "MaterialCategory",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== TURBINE DATA ==========
        let mut turbine = Table::create();
        turbine
            .table(Alias::new("TurbineData"))
            .if_not_exists()
            .col(col("FunctionalLoc").text().not_null().primary_key());
        for &name in TURBINE_TEXT_COLUMNS {
            turbine.col(col(name).text());
        }
        turbine
            .col(col("UnknownMaintPlant").integer())
            .col(col("UnknownPlanningPlant").integer())
            .col(col("TurbineLatitude").double())
            .col(col("TurbineLongitude").double());
        manager.create_table(turbine).await?;

        // Fault report generation joins turbines by maintenance plant
        manager
            .create_index(plain_index(
                "idx_turbinedata_maintplant",
                "TurbineData",
                &["MaintPlant"],
            ))
            .await?;

        // ========== MATERIAL DATA ==========
        let mut material = Table::create();
        material
            .table(Alias::new("MaterialData"))
            .if_not_exists()
            .col(
                col("MaterialData_ID")
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(col("Material").text().not_null())
            // Empty string rather than NULL so the (Material, Plant) key stays unique
            .col(col("Plant").text().not_null().default(""));
        for &name in MATERIAL_TEXT_COLUMNS {
            material.col(col(name).text());
        }
        material
            .col(col("UnknownPlant").text())
            .col(col("Auto_Classified").integer())
            .col(col("Timestamp").text());
        manager.create_table(material).await?;

        manager
            .create_index(unique_index(
                "ux_materialdata_material_plant",
                "MaterialData",
                &["Material", "Plant"],
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_tables(manager, &["MaterialData", "TurbineData"]).await
    }
}
