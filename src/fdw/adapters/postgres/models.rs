//! Diesel row models for catalog introspection and fingerprint storage.

use super::schema::fdw_config_meta;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Insert model for fingerprint records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = fdw_config_meta)]
pub struct NewFingerprintRow {
    /// Foreign server name.
    pub server_name: String,
    /// Hex-encoded fingerprint.
    pub config_hash: String,
    /// Write timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// `pg_foreign_server` projection.
#[derive(Debug, Clone, QueryableByName)]
pub struct ServerOptionsRow {
    /// Raw `key=value` option entries; `NULL` when the server has none.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Array<diesel::sql_types::Text>>)]
    pub srvoptions: Option<Vec<String>>,
}

/// Single boolean projection for existence checks.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct ExistsRow {
    /// Whether a matching row exists.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub present: bool,
}
