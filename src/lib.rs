//! fdw-reconciler: `postgres_fdw` server mapping reconciliation.
//!
//! This crate brings a named foreign server, the user mapping of the current
//! role, and a local import schema into agreement with configuration, and
//! records a fingerprint of what was applied so repeated activations are
//! free of catalog mutation.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure reconciliation rules, statement builders, and escaping
//! - **Ports**: Abstract trait interfaces for the catalog, configuration, and
//!   the operational log
//! - **Adapters**: Concrete implementations of ports (`PostgreSQL`,
//!   environment variables, `tracing`, in-memory fakes)
//!
//! # Modules
//!
//! - [`fdw`]: Foreign server reconciliation, status, and schema import
//! - [`telemetry`]: Logging subscriber set-up for binaries

pub mod fdw;
pub mod telemetry;
