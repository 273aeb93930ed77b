use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fault type used for reports generated from replacement-part facts.
pub const REPLACEMENT_PART_FAULT: &str = "Replacement Part";

pub const STATUS_OPEN: &str = "Open";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "FaultReport")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "Report_ID")]
    pub report_id: i32,
    #[sea_orm(column_name = "Technician_ID")]
    pub technician_id: Option<i32>,
    #[sea_orm(column_name = "TurbineLocation")]
    pub turbine_location: i32,
    #[sea_orm(column_name = "Report_Date")]
    pub report_date: Option<String>,
    #[sea_orm(column_name = "Fault_Type")]
    pub fault_type: Option<String>,
    #[sea_orm(column_name = "Fault_Description")]
    pub fault_description: Option<String>,
    #[sea_orm(column_name = "Material_ID")]
    pub material_id: Option<i32>,
    #[sea_orm(column_name = "Report_Status")]
    pub report_status: String,
    #[sea_orm(column_name = "Updated_Time")]
    pub updated_time: Option<String>,
    #[sea_orm(column_name = "Attachment")]
    #[serde(skip)]
    pub attachment: Option<Vec<u8>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::TurbineLocation",
        to = "super::location::Column::LocationId"
    )]
    Location,
    #[sea_orm(
        belongs_to = "super::technician::Entity",
        from = "Column::TechnicianId",
        to = "super::technician::Column::TechnicianId"
    )]
    Technician,
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::MaterialId"
    )]
    Material,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::technician::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Technician.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
