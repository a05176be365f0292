//! Port contracts for foreign server reconciliation.

mod activity;
mod catalog;
mod config_source;

pub use activity::ActivityLog;
#[cfg(test)]
pub use catalog::MockForeignCatalog;
pub use catalog::{ForeignCatalog, ForeignCatalogError, ForeignCatalogResult};
pub use config_source::ConfigSource;
