//! In-memory adapters for deterministic tests and local runs.

mod activity;
mod catalog;

pub use activity::RecordingActivityLog;
pub use catalog::{CatalogJournalEntry, ImportedSchema, InMemoryForeignCatalog};
