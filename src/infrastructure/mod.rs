mod database;
pub mod drive;
mod memory;
pub mod metrics;

// Re-export the factory functions for easy access
pub use database::create_postgres_repository;
pub use drive::{create_consent_flow, create_drive_storage, ConsentFlow, GoogleDriveStorage};
pub use memory::{create_memory_repository, MemoryRepository};
pub use metrics::{create_noop_metrics, create_prom_metrics};
