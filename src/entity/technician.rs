use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "Technician")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "Technician_ID")]
    pub technician_id: i32,
    #[sea_orm(column_name = "Name")]
    pub name: String,
    #[sea_orm(column_name = "Surname")]
    pub surname: Option<String>,
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
