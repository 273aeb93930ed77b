use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A turbine position, named by its functional location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Location")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "Location_ID")]
    pub location_id: i32,
    #[sea_orm(unique, column_name = "Location_Name")]
    pub location_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::fault_report::Entity")]
    FaultReports,
}

impl Related<super::fault_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
