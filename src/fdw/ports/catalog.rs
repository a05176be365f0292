//! Catalog port for foreign server introspection, DDL, and fingerprint
//! storage.

use crate::fdw::domain::{
    ConfigFingerprint, DdlStatement, FingerprintRecord, ForeignServerName, StatementKind,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for catalog operations.
pub type ForeignCatalogResult<T> = Result<T, ForeignCatalogError>;

/// Session factory over a relational catalog that supports foreign data
/// wrappers.
///
/// Every method acquires its own session and releases it before returning,
/// on success and on failure alike.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForeignCatalog: Send + Sync {
    /// Creates the fingerprint metadata table when it does not exist.
    async fn ensure_metadata_table(&self) -> ForeignCatalogResult<()>;

    /// Returns the raw `srvoptions` entries of a foreign server, or `None`
    /// when no server with that name exists.
    async fn find_server_options(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<Vec<String>>>;

    /// Returns whether the current role has a user mapping on the server.
    async fn user_mapping_exists(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<bool>;

    /// Loads the fingerprint stored for a server.
    async fn stored_fingerprint(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<ConfigFingerprint>>;

    /// Inserts or replaces the fingerprint record keyed by server name.
    async fn save_fingerprint(&self, record: &FingerprintRecord) -> ForeignCatalogResult<()>;

    /// Runs `statements` in order inside one transaction.
    ///
    /// # Errors
    ///
    /// When any statement fails the transaction is rolled back, so none of
    /// the statements take effect, and the failure is returned.
    async fn execute_transaction(&self, statements: &[DdlStatement])
    -> ForeignCatalogResult<()>;

    /// Runs a single statement outside an explicit transaction.
    async fn execute(&self, statement: &DdlStatement) -> ForeignCatalogResult<()>;
}

/// Errors returned by catalog adapters.
#[derive(Debug, Clone, Error)]
pub enum ForeignCatalogError {
    /// No catalog session could be opened.
    #[error("catalog connection error: {0}")]
    Connection(Arc<dyn std::error::Error + Send + Sync>),

    /// A DDL statement was rejected.
    #[error("{kind} statement failed: {cause}")]
    Statement {
        /// Kind of the failing statement.
        kind: StatementKind,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ForeignCatalogError {
    /// Wraps a session acquisition failure.
    pub fn connection(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Connection(Arc::new(err))
    }

    /// Wraps a failed statement of the given kind.
    pub fn statement(
        kind: StatementKind,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Statement {
            kind,
            cause: Arc::new(err),
        }
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for ForeignCatalogError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
