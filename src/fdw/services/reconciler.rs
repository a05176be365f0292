//! Service reconciling a foreign server with its configuration.

use super::load_settings;
use crate::fdw::{
    domain::{
        ConfigFingerprint, DEFAULT_REMOTE_SCHEMA, DdlStatement, FdwDomainError, FdwEvent,
        FdwSettings, FingerprintRecord, ForeignServerName, ReconcileAction,
        ReconciliationResult, ServerOptions, ServerStatus,
    },
    ports::{ActivityLog, ConfigSource, ForeignCatalog, ForeignCatalogError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for importing a remote schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSchemaRequest {
    /// Remote schema to import.
    pub remote_schema: String,
    /// Tables to import; empty imports the whole schema.
    pub tables: Vec<String>,
}

impl ImportSchemaRequest {
    /// Creates a request importing the whole of `remote_schema`.
    #[must_use]
    pub fn new(remote_schema: impl Into<String>) -> Self {
        Self {
            remote_schema: remote_schema.into(),
            tables: Vec::new(),
        }
    }

    /// Restricts the import to `tables`.
    #[must_use]
    pub fn with_tables<I, T>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for ImportSchemaRequest {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_SCHEMA)
    }
}

/// Service-level errors for reconciliation operations.
#[derive(Debug, Error)]
pub enum FdwReconcilerError {
    /// Configuration or input validation failed.
    #[error(transparent)]
    Domain(#[from] FdwDomainError),
    /// A catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] ForeignCatalogError),
}

/// Result type for reconciliation service operations.
pub type FdwReconcilerResult<T> = Result<T, FdwReconcilerError>;

/// Keeps one foreign server, its user mapping, and the local import schema
/// in agreement with configuration.
///
/// Configuration is re-read from the [`ConfigSource`] on every call.
/// Failures are reported to the [`ActivityLog`] and returned to the caller;
/// only [`FdwReconciler::activate`] converts them into a result.
#[derive(Clone)]
pub struct FdwReconciler<K, S, L, C>
where
    K: ForeignCatalog,
    S: ConfigSource,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    catalog: Arc<K>,
    config: Arc<S>,
    log: Arc<L>,
    clock: Arc<C>,
}

impl<K, S, L, C> FdwReconciler<K, S, L, C>
where
    K: ForeignCatalog,
    S: ConfigSource,
    L: ActivityLog,
    C: Clock + Send + Sync,
{
    /// Creates a reconciler.
    #[must_use]
    pub const fn new(catalog: Arc<K>, config: Arc<S>, log: Arc<L>, clock: Arc<C>) -> Self {
        Self {
            catalog,
            config,
            log,
            clock,
        }
    }

    /// Resolves the current settings from the configuration source.
    ///
    /// # Errors
    ///
    /// Returns [`FdwReconcilerError::Domain`] for malformed configuration.
    pub fn settings(&self) -> FdwReconcilerResult<FdwSettings> {
        Ok(load_settings(&*self.config)?)
    }

    /// Creates, updates, or leaves alone the configured foreign server.
    ///
    /// A missing server is provisioned; an existing server is updated unless
    /// the stored fingerprint matches the current configuration. The new
    /// fingerprint is stored only after the DDL transaction commits.
    ///
    /// # Errors
    ///
    /// Returns domain errors for malformed configuration and catalog errors
    /// for connection, DDL, or persistence failures. A failed DDL
    /// transaction has been rolled back when the error is returned.
    pub async fn reconcile(&self) -> FdwReconcilerResult<ReconciliationResult> {
        let settings = self.settings()?;
        let server = settings.connection().server_name();
        let fingerprint = ConfigFingerprint::compute(settings.connection())?;

        self.catalog.ensure_metadata_table().await?;
        let status = self.status_of(server).await?;
        let stored = self.catalog.stored_fingerprint(server).await?;

        match ReconcileAction::decide(&status, stored.as_ref(), &fingerprint) {
            ReconcileAction::Skip => Ok(ReconciliationResult::skipped(server)),
            ReconcileAction::Create => {
                self.log.record(&FdwEvent::Creating {
                    server: server.clone(),
                });
                let plan = DdlStatement::create_plan(&settings);
                if let Err(err) = self.catalog.execute_transaction(&plan).await {
                    self.log.record(&FdwEvent::CreateFailed {
                        server: server.clone(),
                        reason: err.to_string(),
                    });
                    return Err(err.into());
                }
                self.log.record(&FdwEvent::Created {
                    server: server.clone(),
                });
                self.persist_fingerprint(server, fingerprint).await?;
                Ok(ReconciliationResult::created(server))
            }
            ReconcileAction::Update => {
                self.log.record(&FdwEvent::Updating {
                    server: server.clone(),
                });
                let plan = DdlStatement::update_plan(&settings);
                if let Err(err) = self.catalog.execute_transaction(&plan).await {
                    self.log.record(&FdwEvent::UpdateFailed {
                        server: server.clone(),
                        reason: err.to_string(),
                    });
                    return Err(err.into());
                }
                self.log.record(&FdwEvent::Updated {
                    server: server.clone(),
                });
                self.persist_fingerprint(server, fingerprint).await?;
                Ok(ReconciliationResult::updated(server))
            }
        }
    }

    /// Reports whether `server_name` exists, its connection options, and
    /// whether the current role has a user mapping on it.
    ///
    /// # Errors
    ///
    /// Returns [`FdwDomainError::EmptyServerName`] for a blank name and
    /// catalog errors from introspection.
    pub async fn get_status(&self, server_name: &str) -> FdwReconcilerResult<ServerStatus> {
        let server = ForeignServerName::new(server_name)?;
        Ok(self.status_of(&server).await?)
    }

    /// Imports remote table definitions into the configured local schema.
    ///
    /// Issues a single `IMPORT FOREIGN SCHEMA` statement; no status check is
    /// made first.
    ///
    /// # Errors
    ///
    /// Returns domain errors for malformed configuration or a blank remote
    /// schema, and catalog errors when the import fails.
    pub async fn import_schema(&self, request: &ImportSchemaRequest) -> FdwReconcilerResult<()> {
        let settings = self.settings()?;
        let remote_schema = request.remote_schema.trim();
        if remote_schema.is_empty() {
            return Err(FdwDomainError::EmptySchemaName.into());
        }

        let statement = DdlStatement::import_foreign_schema(
            remote_schema,
            &request.tables,
            settings.connection().server_name(),
            settings.local_schema(),
        );
        self.catalog.execute(&statement).await?;
        self.log.record(&FdwEvent::SchemaImported {
            remote_schema: remote_schema.to_owned(),
            local_schema: settings.local_schema().to_owned(),
        });
        Ok(())
    }

    /// Startup hook: reconciles unless disabled, never failing the caller.
    ///
    /// Returns `None` when reconciliation is disabled by configuration.
    /// Otherwise returns the reconciliation result, or an `error` result
    /// carrying the failure message after logging it.
    pub async fn activate(&self) -> Option<ReconciliationResult> {
        let enabled = match self.settings() {
            Ok(settings) => settings.enabled(),
            Err(err) => return Some(self.record_sync_failure(&err)),
        };
        if !enabled {
            self.log.record(&FdwEvent::Disabled);
            return None;
        }

        match self.reconcile().await {
            Ok(result) => {
                self.log.record(&FdwEvent::Synchronised {
                    result: result.clone(),
                });
                Some(result)
            }
            Err(err) => Some(self.record_sync_failure(&err)),
        }
    }

    fn record_sync_failure(&self, err: &FdwReconcilerError) -> ReconciliationResult {
        let reason = err.to_string();
        self.log.record(&FdwEvent::SyncFailed {
            reason: reason.clone(),
        });
        ReconciliationResult::failed(reason)
    }

    async fn status_of(
        &self,
        server: &ForeignServerName,
    ) -> Result<ServerStatus, ForeignCatalogError> {
        let Some(entries) = self.catalog.find_server_options(server).await? else {
            return Ok(ServerStatus::absent());
        };
        let options = ServerOptions::parse(entries);
        let user_mapping_exists = self.catalog.user_mapping_exists(server).await?;
        Ok(ServerStatus::present(options, user_mapping_exists))
    }

    async fn persist_fingerprint(
        &self,
        server: &ForeignServerName,
        fingerprint: ConfigFingerprint,
    ) -> Result<(), ForeignCatalogError> {
        let record = FingerprintRecord::new(server.clone(), fingerprint, &*self.clock);
        self.catalog.save_fingerprint(&record).await
    }
}
