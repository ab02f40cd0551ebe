use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_master_tables::Migration),
            Box::new(m20240601_000002_create_bom_template_tables::Migration),
            Box::new(m20240601_000003_create_batches_table::Migration),
            Box::new(m20240601_000004_create_ledger_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_master_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_master_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Uoms::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Uoms::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Uoms::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Uoms::Name).string().not_null())
                        .col(ColumnDef::new(Uoms::UomType).text().not_null())
                        .col(
                            ColumnDef::new(Uoms::Precision)
                                .small_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Uoms::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Processes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Processes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Processes::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Processes::Name).string().not_null())
                        .col(ColumnDef::new(Processes::Description).text().null())
                        .col(
                            ColumnDef::new(Processes::Sequence)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Processes::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Processes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Items::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(ColumnDef::new(Items::Category).string().null())
                        .col(ColumnDef::new(Items::Unit).string().not_null())
                        .col(ColumnDef::new(Items::UnitCost).decimal().null())
                        .col(ColumnDef::new(Items::ReorderLevel).decimal().null())
                        .col(ColumnDef::new(Items::Status).text().not_null())
                        .col(ColumnDef::new(Items::Vendor).string().null())
                        .col(ColumnDef::new(Items::Notes).text().null())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Workers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Workers::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Workers::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Workers::DisplayName).string().not_null())
                        .col(ColumnDef::new(Workers::Role).string().null())
                        .col(ColumnDef::new(Workers::Department).string().null())
                        .col(ColumnDef::new(Workers::Shift).string().null())
                        .col(ColumnDef::new(Workers::Status).text().not_null())
                        .col(ColumnDef::new(Workers::Contact).string().null())
                        .col(ColumnDef::new(Workers::Skills).json().null())
                        .col(
                            ColumnDef::new(Workers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WorkerProcesses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(WorkerProcesses::WorkerId).uuid().not_null())
                        .col(
                            ColumnDef::new(WorkerProcesses::ProcessId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WorkerProcesses::AssignedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .primary_key(
                            Index::create()
                                .col(WorkerProcesses::WorkerId)
                                .col(WorkerProcesses::ProcessId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_worker_processes_worker")
                                .from(WorkerProcesses::Table, WorkerProcesses::WorkerId)
                                .to(Workers::Table, Workers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_worker_processes_process")
                                .from(WorkerProcesses::Table, WorkerProcesses::ProcessId)
                                .to(Processes::Table, Processes::Id),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WorkerProcesses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Workers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Processes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Uoms::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Uoms {
        Table,
        Id,
        Code,
        Name,
        UomType,
        Precision,
        IsActive,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Processes {
        Table,
        Id,
        Slug,
        Name,
        Description,
        Sequence,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Items {
        Table,
        Id,
        Sku,
        Name,
        Category,
        Unit,
        UnitCost,
        ReorderLevel,
        Status,
        Vendor,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum Workers {
        Table,
        Id,
        Code,
        DisplayName,
        Role,
        Department,
        Shift,
        Status,
        Contact,
        Skills,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum WorkerProcesses {
        Table,
        WorkerId,
        ProcessId,
        AssignedAt,
    }
}

mod m20240601_000002_create_bom_template_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_master_tables::{Items, Processes};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_bom_template_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BomTemplates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomTemplates::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomTemplates::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(BomTemplates::Name).string().not_null())
                        .col(ColumnDef::new(BomTemplates::ProcessId).uuid().not_null())
                        .col(ColumnDef::new(BomTemplates::OutputItemId).uuid().null())
                        .col(
                            ColumnDef::new(BomTemplates::OutputQuantity)
                                .decimal()
                                .null(),
                        )
                        .col(ColumnDef::new(BomTemplates::Instructions).text().null())
                        .col(
                            ColumnDef::new(BomTemplates::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(BomTemplates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomTemplates::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_templates_process")
                                .from(BomTemplates::Table, BomTemplates::ProcessId)
                                .to(Processes::Table, Processes::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_templates_output_item")
                                .from(BomTemplates::Table, BomTemplates::OutputItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BomTemplateItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomTemplateItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomTemplateItems::BomTemplateId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomTemplateItems::ComponentItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomTemplateItems::ExpectedQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BomTemplateItems::Unit).string().not_null())
                        .col(
                            ColumnDef::new(BomTemplateItems::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_template_items_template")
                                .from(BomTemplateItems::Table, BomTemplateItems::BomTemplateId)
                                .to(BomTemplates::Table, BomTemplates::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_template_items_item")
                                .from(BomTemplateItems::Table, BomTemplateItems::ComponentItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bom_template_items_template_id")
                        .table(BomTemplateItems::Table)
                        .col(BomTemplateItems::BomTemplateId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BomTemplateItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BomTemplates::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum BomTemplates {
        Table,
        Id,
        Code,
        Name,
        ProcessId,
        OutputItemId,
        OutputQuantity,
        Instructions,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(crate) enum BomTemplateItems {
        Table,
        Id,
        BomTemplateId,
        ComponentItemId,
        ExpectedQuantity,
        Unit,
        Position,
    }
}

mod m20240601_000003_create_batches_table {

    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_master_tables::{Processes, Workers};
    use super::m20240601_000002_create_bom_template_tables::BomTemplates;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_batches_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Batches::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Batches::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Batches::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Batches::ProcessId).uuid().not_null())
                        .col(ColumnDef::new(Batches::BomTemplateId).uuid().null())
                        .col(ColumnDef::new(Batches::Status).text().not_null())
                        .col(ColumnDef::new(Batches::PlannedQuantity).decimal().null())
                        .col(ColumnDef::new(Batches::InputQuantity).decimal().null())
                        .col(ColumnDef::new(Batches::OutputQuantity).decimal().null())
                        .col(
                            ColumnDef::new(Batches::WastagePercentage)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Batches::StartedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Batches::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Batches::SupervisorId).uuid().null())
                        .col(ColumnDef::new(Batches::CreatedBy).string().null())
                        .col(ColumnDef::new(Batches::Notes).text().null())
                        .col(
                            ColumnDef::new(Batches::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batches_process")
                                .from(Batches::Table, Batches::ProcessId)
                                .to(Processes::Table, Processes::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batches_bom_template")
                                .from(Batches::Table, Batches::BomTemplateId)
                                .to(BomTemplates::Table, BomTemplates::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batches_supervisor")
                                .from(Batches::Table, Batches::SupervisorId)
                                .to(Workers::Table, Workers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batches_status")
                        .table(Batches::Table)
                        .col(Batches::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batches_process_id")
                        .table(Batches::Table)
                        .col(Batches::ProcessId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Batches::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum Batches {
        Table,
        Id,
        Code,
        ProcessId,
        BomTemplateId,
        Status,
        PlannedQuantity,
        InputQuantity,
        OutputQuantity,
        WastagePercentage,
        StartedAt,
        CompletedAt,
        SupervisorId,
        CreatedBy,
        Notes,
        CreatedAt,
    }
}

mod m20240601_000004_create_ledger_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_master_tables::{Items, Processes};
    use super::m20240601_000003_create_batches_table::Batches;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BatchMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BatchMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BatchMovements::BatchId).uuid().not_null())
                        .col(
                            ColumnDef::new(BatchMovements::FromProcessId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(BatchMovements::ToProcessId).uuid().null())
                        .col(ColumnDef::new(BatchMovements::Quantity).decimal().null())
                        .col(
                            ColumnDef::new(BatchMovements::OccurredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BatchMovements::Notes).text().null())
                        .col(ColumnDef::new(BatchMovements::RecordedBy).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batch_movements_batch")
                                .from(BatchMovements::Table, BatchMovements::BatchId)
                                .to(Batches::Table, Batches::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batch_movements_from_process")
                                .from(BatchMovements::Table, BatchMovements::FromProcessId)
                                .to(Processes::Table, Processes::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_batch_movements_to_process")
                                .from(BatchMovements::Table, BatchMovements::ToProcessId)
                                .to(Processes::Table, Processes::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_batch_movements_batch_occurred")
                        .table(BatchMovements::Table)
                        .col(BatchMovements::BatchId)
                        .col(BatchMovements::OccurredAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BomUsages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomUsages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BomUsages::BatchId).uuid().not_null())
                        .col(ColumnDef::new(BomUsages::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(BomUsages::ExpectedQuantity)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(BomUsages::ActualQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BomUsages::Unit).string().not_null())
                        .col(ColumnDef::new(BomUsages::Notes).text().null())
                        .col(ColumnDef::new(BomUsages::RecordedBy).string().null())
                        .col(
                            ColumnDef::new(BomUsages::RecordedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_usages_batch")
                                .from(BomUsages::Table, BomUsages::BatchId)
                                .to(Batches::Table, Batches::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bom_usages_item")
                                .from(BomUsages::Table, BomUsages::ItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_bom_usages_batch_recorded")
                        .table(BomUsages::Table)
                        .col(BomUsages::BatchId)
                        .col(BomUsages::RecordedAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BomUsages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BatchMovements::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum BatchMovements {
        Table,
        Id,
        BatchId,
        FromProcessId,
        ToProcessId,
        Quantity,
        OccurredAt,
        Notes,
        RecordedBy,
    }

    #[derive(DeriveIden)]
    pub(crate) enum BomUsages {
        Table,
        Id,
        BatchId,
        ItemId,
        ExpectedQuantity,
        ActualQuantity,
        Unit,
        Notes,
        RecordedBy,
        RecordedAt,
    }
}
