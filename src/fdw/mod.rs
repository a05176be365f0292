//! Foreign data wrapper reconciliation for a single remote database target.
//!
//! The module keeps one `postgres_fdw` foreign server, its user mapping for
//! the current role, and the local schema that receives imported foreign
//! tables in step with configuration. A SHA-256 fingerprint of the connection
//! settings is stored next to the catalog so unchanged configuration results
//! in no DDL at all. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
