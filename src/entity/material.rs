use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Material")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "Material_ID")]
    pub material_id: i32,
    #[sea_orm(unique, column_name = "Material_A9B_Number")]
    pub material_a9b_number: String,
    #[sea_orm(column_name = "MaterialCategory")]
    pub material_category: Option<String>,
    #[sea_orm(column_name = "Material_Description")]
    pub material_description: Option<String>,
    #[sea_orm(column_name = "Is_Batch_Managed")]
    pub is_batch_managed: bool,
    #[sea_orm(column_name = "Future_Replacement_Probability")]
    pub future_replacement_probability: Option<f64>,
    #[sea_orm(column_name = "TotalReplacementCount")]
    pub total_replacement_count: Option<i64>,
    #[sea_orm(column_name = "TotalUsageCount")]
    pub total_usage_count: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::replacement_part::Entity")]
    ReplacementParts,
    #[sea_orm(has_one = "super::serial_number_profile::Entity")]
    SerialNumberProfile,
}

impl Related<super::replacement_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReplacementParts.def()
    }
}

impl Related<super::serial_number_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SerialNumberProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
