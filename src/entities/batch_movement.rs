use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only record of material transferring between processes.
/// Rows are never updated or deleted through normal flow; reads are
/// ordered by occurred_at descending.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batch_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub batch_id: Uuid,
    pub from_process_id: Option<Uuid>,
    pub to_process_id: Option<Uuid>,
    pub quantity: Option<Decimal>,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub recorded_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batch::Entity",
        from = "Column::BatchId",
        to = "super::batch::Column::Id"
    )]
    Batch,
    #[sea_orm(
        belongs_to = "super::process::Entity",
        from = "Column::FromProcessId",
        to = "super::process::Column::Id"
    )]
    FromProcess,
    #[sea_orm(
        belongs_to = "super::process::Entity",
        from = "Column::ToProcessId",
        to = "super::process::Column::Id"
    )]
    ToProcess,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
