//! `PostgreSQL` adapter for foreign server catalog access.

mod catalog;
mod models;
mod schema;

pub use catalog::{FdwPgPool, METADATA_TABLE, PostgresForeignCatalog, connect_pool};
