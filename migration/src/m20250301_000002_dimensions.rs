use sea_orm_migration::prelude::*;

use crate::{col, drop_tables, plain_index, unique_index};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn surrogate(name: &'static str) -> ColumnDef {
    let mut column = col(name);
    column.integer().not_null().auto_increment().primary_key();
    column
}

fn references(
    name: &'static str,
    from: &'static str,
    column: &'static str,
    to: &'static str,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(Alias::new(from), Alias::new(column))
        .to(Alias::new(to), Alias::new(column))
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== PLANT ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("Plant"))
                    .if_not_exists()
                    .col(surrogate("Plant_ID"))
                    .col(col("Plant_Name").text().not_null().unique_key())
                    .col(col("Plant_Latitude").double())
                    .col(col("Plant_Longitude").double())
                    .col(col("Defaulted").boolean().not_null().default(false))
                    .col(col("IsPlant").boolean().not_null().default(false))
                    .col(col("IsPlanningPlant").boolean().not_null().default(false))
                    .col(
                        col("IsManufacturingPlant")
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ========== MATERIAL ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("Material"))
                    .if_not_exists()
                    .col(surrogate("Material_ID"))
                    .col(col("Material_A9B_Number").text().not_null().unique_key())
                    .col(col("MaterialCategory").text())
                    .col(col("Material_Description").text())
                    .col(col("Is_Batch_Managed").boolean().not_null().default(false))
                    .col(col("Future_Replacement_Probability").double())
                    .col(col("TotalReplacementCount").integer().default(0))
                    .col(col("TotalUsageCount").integer().default(0))
                    .to_owned(),
            )
            .await?;

        // Deprecated description join for prediction payloads
        manager
            .create_index(plain_index(
                "idx_material_description",
                "Material",
                &["Material_Description"],
            ))
            .await?;

        // ========== LOCATION ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("Location"))
                    .if_not_exists()
                    .col(surrogate("Location_ID"))
                    .col(col("Location_Name").text().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // ========== TECHNICIAN ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("Technician"))
                    .if_not_exists()
                    .col(surrogate("Technician_ID"))
                    .col(col("Name").text().not_null())
                    .col(col("Surname").text())
                    .to_owned(),
            )
            .await?;

        // ========== REPLACEMENT PART ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("ReplacementPart"))
                    .if_not_exists()
                    .col(surrogate("ReplacementPart_ID"))
                    .col(col("Material_ID").integer().not_null())
                    .col(col("Plant_ID").integer().not_null())
                    .col(col("Reason").text())
                    .col(
                        col("Updated_Time")
                            .text()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut references(
                        "fk_replacementpart_material",
                        "ReplacementPart",
                        "Material_ID",
                        "Material",
                    ))
                    .foreign_key(&mut references(
                        "fk_replacementpart_plant",
                        "ReplacementPart",
                        "Plant_ID",
                        "Plant",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(unique_index(
                "ux_replacementpart_material_plant",
                "ReplacementPart",
                &["Material_ID", "Plant_ID"],
            ))
            .await?;

        // ========== SERIAL NUMBER PROFILE ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("SerialNumberProfile"))
                    .if_not_exists()
                    .col(col("Material_ID").integer().not_null().primary_key())
                    .col(col("Tracking_Number").text().not_null())
                    .foreign_key(&mut references(
                        "fk_serialnumberprofile_material",
                        "SerialNumberProfile",
                        "Material_ID",
                        "Material",
                    ))
                    .to_owned(),
            )
            .await?;

        // ========== FAULT REPORT ==========
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("FaultReport"))
                    .if_not_exists()
                    .col(surrogate("Report_ID"))
                    .col(col("Technician_ID").integer())
                    .col(col("TurbineLocation").integer().not_null())
                    .col(col("Report_Date").text())
                    .col(col("Fault_Type").text())
                    .col(col("Fault_Description").text())
                    .col(col("Material_ID").integer())
                    .col(col("Report_Status").text().not_null().default("Open"))
                    .col(
                        col("Updated_Time")
                            .text()
                            .default(Expr::current_timestamp()),
                    )
                    .col(col("Attachment").blob())
                    .foreign_key(&mut references(
                        "fk_faultreport_technician",
                        "FaultReport",
                        "Technician_ID",
                        "Technician",
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_faultreport_location")
                            .from(Alias::new("FaultReport"), Alias::new("TurbineLocation"))
                            .to(Alias::new("Location"), Alias::new("Location_ID")),
                    )
                    .foreign_key(&mut references(
                        "fk_faultreport_material",
                        "FaultReport",
                        "Material_ID",
                        "Material",
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(plain_index(
                "idx_faultreport_location_material",
                "FaultReport",
                &["TurbineLocation", "Material_ID", "Fault_Type"],
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_tables(
            manager,
            &[
                "FaultReport",
                "SerialNumberProfile",
                "ReplacementPart",
                "Technician",
                "Location",
                "Material",
                "Plant",
            ],
        )
        .await
    }
}
