use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staged material row, one per (Material, Plant).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "MaterialData")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "MaterialData_ID")]
    pub material_data_id: i32,
    #[sea_orm(column_name = "Material")]
    pub material: String,
    #[sea_orm(column_name = "Plant")]
    pub plant: String,
    #[sea_orm(column_name = "Description")]
    pub description: Option<String>,
    #[sea_orm(column_name = "PlantSpecificMaterialStatus")]
    pub plant_specific_material_status: Option<String>,
    #[sea_orm(column_name = "BatchManagementPlant")]
    pub batch_management_plant: Option<String>,
    #[sea_orm(column_name = "Serial_No_Profile")]
    pub serial_no_profile: Option<String>,
    #[sea_orm(column_name = "ReplacementPart")]
    pub replacement_part: Option<String>,
    #[sea_orm(column_name = "UsedInSBom")]
    pub used_in_s_bom: Option<String>,
    #[sea_orm(column_name = "ViolationReplacementPart")]
    pub violation_replacement_part: Option<String>,
    #[sea_orm(column_name = "MaterialCategory")]
    pub material_category: Option<String>,
    #[sea_orm(column_name = "UnknownPlant")]
    pub unknown_plant: Option<String>,
    #[sea_orm(column_name = "Auto_Classified")]
    pub auto_classified: Option<i32>,
    #[sea_orm(column_name = "Timestamp")]
    pub timestamp: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
