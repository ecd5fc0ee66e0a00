// SQLite storage layer with sqlx
//
// This crate provides the database implementation for core traits:
// - SqliteResourceReader: implements ResourceReader over a bundle's benchmark_data.db

pub mod models;
pub mod repositories;
pub mod resource_reader;

pub use models::MemoryUsageRow;
pub use repositories::{ResourceDatabase, StorageError};
pub use resource_reader::SqliteResourceReader;
