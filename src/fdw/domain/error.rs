//! Error types for foreign server domain validation.

use thiserror::Error;

/// Errors returned while constructing reconciliation domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FdwDomainError {
    /// The foreign server name is empty after trimming.
    #[error("foreign server name must not be empty")]
    EmptyServerName,

    /// A schema name is empty after trimming.
    #[error("schema name must not be empty")]
    EmptySchemaName,

    /// The configured remote port is not a valid TCP port number.
    #[error("invalid remote port '{0}': expected an integer between 0 and 65535")]
    InvalidPort(String),

    /// The connection settings could not be encoded for fingerprinting.
    #[error("failed to encode connection settings for fingerprinting: {0}")]
    FingerprintEncoding(String),
}
