use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One component line of a BOM template. Position values define the
/// display/consumption order; updates replace the full set, never patch.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bom_template_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub bom_template_id: Uuid,
    pub component_item_id: Uuid,
    pub expected_quantity: Decimal,
    pub unit: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bom_template::Entity",
        from = "Column::BomTemplateId",
        to = "super::bom_template::Column::Id"
    )]
    BomTemplate,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ComponentItemId",
        to = "super::item::Column::Id"
    )]
    ComponentItem,
}

impl Related<super::bom_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomTemplate.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComponentItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
