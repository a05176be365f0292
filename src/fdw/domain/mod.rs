//! Domain model for foreign server reconciliation.
//!
//! The domain covers the desired remote connection, the fingerprint used to
//! detect drift, the catalog status read model, the statements that move the
//! catalog between states, and the outcome reported to callers. Database and
//! configuration access stay outside this boundary.

mod config;
mod decision;
mod error;
mod event;
mod fingerprint;
mod ids;
mod result;
mod sql;
mod statement;
mod status;

pub use config::{FdwSettingKey, FdwSettings, RemoteConnectionConfig};
pub use decision::ReconcileAction;
pub use error::FdwDomainError;
pub use event::{FdwEvent, FdwEventLevel};
pub use fingerprint::{ConfigFingerprint, FingerprintRecord};
pub use ids::ForeignServerName;
pub use result::{ReconcileOperation, ReconciliationResult};
pub use sql::{escape_identifier, escape_literal, is_plain_identifier};
pub use statement::{
    CatalogAction, DdlStatement, DEFAULT_REMOTE_SCHEMA, FDW_EXTENSION, StatementKind,
};
pub use status::{ServerOptions, ServerStatus};
