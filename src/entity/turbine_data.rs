use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staged turbine row, one per functional location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "TurbineData")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_name = "FunctionalLoc")]
    pub functional_loc: String,
    #[sea_orm(column_name = "Description")]
    pub description: Option<String>,
    #[sea_orm(column_name = "MaintPlant")]
    pub maint_plant: Option<String>,
    #[sea_orm(column_name = "PlanningPlant")]
    pub planning_plant: Option<String>,
    #[sea_orm(column_name = "Platform")]
    pub platform: Option<String>,
    #[sea_orm(column_name = "TurbineModel")]
    pub turbine_model: Option<String>,
    #[sea_orm(column_name = "UnknownMaintPlant")]
    pub unknown_maint_plant: Option<i32>,
    #[sea_orm(column_name = "UnknownPlanningPlant")]
    pub unknown_planning_plant: Option<i32>,
    #[sea_orm(column_name = "TurbineLatitude")]
    pub turbine_latitude: Option<f64>,
    #[sea_orm(column_name = "TurbineLongitude")]
    pub turbine_longitude: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
