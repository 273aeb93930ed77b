use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Plant")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "Plant_ID")]
    pub plant_id: i32,
    #[sea_orm(unique, column_name = "Plant_Name")]
    pub plant_name: String,
    #[sea_orm(column_name = "Plant_Latitude")]
    pub plant_latitude: Option<f64>,
    #[sea_orm(column_name = "Plant_Longitude")]
    pub plant_longitude: Option<f64>,
    #[sea_orm(column_name = "Defaulted")]
    pub defaulted: bool,
    #[sea_orm(column_name = "IsPlant")]
    pub is_plant: bool,
    #[sea_orm(column_name = "IsPlanningPlant")]
    pub is_planning_plant: bool,
    #[sea_orm(column_name = "IsManufacturingPlant")]
    pub is_manufacturing_plant: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::replacement_part::Entity")]
    ReplacementParts,
}

impl Related<super::replacement_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReplacementParts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
