use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A material flagged as a replacement part in one plant.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ReplacementPart")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "ReplacementPart_ID")]
    pub replacement_part_id: i32,
    #[sea_orm(column_name = "Material_ID")]
    pub material_id: i32,
    #[sea_orm(column_name = "Plant_ID")]
    pub plant_id: i32,
    #[sea_orm(column_name = "Reason")]
    pub reason: Option<String>,
    #[sea_orm(column_name = "Updated_Time")]
    pub updated_time: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::MaterialId"
    )]
    Material,
    #[sea_orm(
        belongs_to = "super::plant::Entity",
        from = "Column::PlantId",
        to = "super::plant::Column::PlantId"
    )]
    Plant,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl Related<super::plant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
