// Master data registries
pub mod item;
pub mod process;
pub mod uom;
pub mod worker;
pub mod worker_process;

// BOM templates and their component lines
pub mod bom_template;
pub mod bom_template_item;

// Production batches and their append-only ledgers
pub mod batch;
pub mod batch_movement;
pub mod bom_usage;
