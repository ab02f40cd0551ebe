use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, utoipa::ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "on_leave")]
    OnLeave,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerStatus::Active => write!(f, "active"),
            WorkerStatus::OnLeave => write!(f, "on_leave"),
            WorkerStatus::Inactive => write!(f, "inactive"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "workers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub display_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
    pub shift: Option<String>,
    pub status: WorkerStatus,
    pub contact: Option<String>,
    /// Free-form skill tags, stored as a JSON array
    #[sea_orm(column_type = "Json", nullable)]
    pub skills: Option<Json>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::batch::Entity")]
    SupervisedBatches,
    #[sea_orm(has_many = "super::worker_process::Entity")]
    WorkerProcesses,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupervisedBatches.def()
    }
}

impl Related<super::process::Entity> for Entity {
    fn to() -> RelationDef {
        super::worker_process::Relation::Process.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::worker_process::Relation::Worker.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
