use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "processes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub sequence: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::batch::Entity")]
    Batches,
    #[sea_orm(has_many = "super::bom_template::Entity")]
    BomTemplates,
    #[sea_orm(has_many = "super::worker_process::Entity")]
    WorkerProcesses,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batches.def()
    }
}

impl Related<super::bom_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomTemplates.def()
    }
}

impl Related<super::worker::Entity> for Entity {
    fn to() -> RelationDef {
        super::worker_process::Relation::Worker.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::worker_process::Relation::Process.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
