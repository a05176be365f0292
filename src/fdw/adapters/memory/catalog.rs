//! In-memory catalog adapter with a transaction journal.

use crate::fdw::{
    domain::{
        CatalogAction, ConfigFingerprint, DdlStatement, FingerprintRecord, ForeignServerName,
        ServerOptions, StatementKind,
    },
    ports::{ForeignCatalog, ForeignCatalogError, ForeignCatalogResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Entry in the catalog journal, in the order operations happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogJournalEntry {
    /// A transaction was opened.
    Begin,
    /// A statement ran inside the open transaction.
    Statement(StatementKind),
    /// The open transaction committed.
    Commit,
    /// The open transaction rolled back.
    Rollback,
    /// A statement ran outside a transaction.
    Executed(StatementKind),
    /// A fingerprint record was upserted.
    FingerprintSaved(ForeignServerName),
}

/// Record of an `IMPORT FOREIGN SCHEMA` applied to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSchema {
    /// Remote schema name.
    pub remote_schema: String,
    /// Table allow-list; empty for the whole schema.
    pub tables: Vec<String>,
    /// Local schema name.
    pub local_schema: String,
}

/// Catalog contents that transactions stage and commit.
#[derive(Debug, Clone, Default)]
struct CatalogModel {
    extension_installed: bool,
    servers: HashMap<ForeignServerName, ServerOptions>,
    user_mappings: HashSet<ForeignServerName>,
    schemas: HashSet<String>,
    imports: Vec<ImportedSchema>,
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    model: CatalogModel,
    metadata_table: bool,
    fingerprints: HashMap<ForeignServerName, FingerprintRecord>,
    journal: Vec<CatalogJournalEntry>,
    failing_statement: Option<StatementKind>,
    unavailable: bool,
}

/// Thread-safe in-memory stand-in for a `PostgreSQL` catalog.
///
/// Statements are applied to a staged copy of the catalog and only become
/// visible on commit. The journal records `Begin`, each statement, and the
/// closing `Commit` or `Rollback`, so tests can assert transactional
/// behaviour. Failures can be injected per statement kind.
#[derive(Debug, Clone, Default)]
pub struct InMemoryForeignCatalog {
    state: Arc<Mutex<InMemoryCatalogState>>,
}

impl InMemoryForeignCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ForeignCatalogResult<MutexGuard<'_, InMemoryCatalogState>> {
        self.state
            .lock()
            .map_err(|err| ForeignCatalogError::persistence(std::io::Error::other(err.to_string())))
    }

    fn lock_available(&self) -> ForeignCatalogResult<MutexGuard<'_, InMemoryCatalogState>> {
        let state = self.lock()?;
        if state.unavailable {
            return Err(ForeignCatalogError::connection(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "catalog is unavailable",
            )));
        }
        Ok(state)
    }

    /// Registers an existing foreign server, optionally with a user mapping.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn seed_server(
        &self,
        server: ForeignServerName,
        options: ServerOptions,
        with_user_mapping: bool,
    ) -> ForeignCatalogResult<()> {
        let mut state = self.lock()?;
        state.model.extension_installed = true;
        if with_user_mapping {
            state.model.user_mappings.insert(server.clone());
        }
        state.model.servers.insert(server, options);
        Ok(())
    }

    /// Stores a fingerprint record as if an earlier run had written it.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn seed_fingerprint(&self, record: FingerprintRecord) -> ForeignCatalogResult<()> {
        let mut state = self.lock()?;
        state.metadata_table = true;
        state
            .fingerprints
            .insert(record.server_name().clone(), record);
        Ok(())
    }

    /// Makes every subsequent statement of `kind` fail.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn fail_on(&self, kind: StatementKind) -> ForeignCatalogResult<()> {
        self.lock()?.failing_statement = Some(kind);
        Ok(())
    }

    /// Simulates the catalog refusing connections.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn set_unavailable(&self, unavailable: bool) -> ForeignCatalogResult<()> {
        self.lock()?.unavailable = unavailable;
        Ok(())
    }

    /// Returns the journal recorded so far.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn journal(&self) -> ForeignCatalogResult<Vec<CatalogJournalEntry>> {
        Ok(self.lock()?.journal.clone())
    }

    /// Returns the kinds of all DDL statements attempted, in order.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn attempted_statements(&self) -> ForeignCatalogResult<Vec<StatementKind>> {
        Ok(self
            .lock()?
            .journal
            .iter()
            .filter_map(|entry| match entry {
                CatalogJournalEntry::Statement(kind) | CatalogJournalEntry::Executed(kind) => {
                    Some(*kind)
                }
                _ => None,
            })
            .collect())
    }

    /// Returns the committed options of a server.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn server_options(
        &self,
        server: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<ServerOptions>> {
        Ok(self.lock()?.model.servers.get(server).cloned())
    }

    /// Returns whether a committed user mapping exists for the server.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn has_user_mapping(&self, server: &ForeignServerName) -> ForeignCatalogResult<bool> {
        Ok(self.lock()?.model.user_mappings.contains(server))
    }

    /// Returns whether a committed local schema exists.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn has_schema(&self, schema: &str) -> ForeignCatalogResult<bool> {
        Ok(self.lock()?.model.schemas.contains(schema))
    }

    /// Returns whether the `postgres_fdw` extension is installed.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn extension_installed(&self) -> ForeignCatalogResult<bool> {
        Ok(self.lock()?.model.extension_installed)
    }

    /// Returns whether the metadata table has been created.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn metadata_table_exists(&self) -> ForeignCatalogResult<bool> {
        Ok(self.lock()?.metadata_table)
    }

    /// Returns the stored fingerprint record of a server.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn fingerprint_record(
        &self,
        server: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<FingerprintRecord>> {
        Ok(self.lock()?.fingerprints.get(server).cloned())
    }

    /// Returns the committed schema imports.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn imports(&self) -> ForeignCatalogResult<Vec<ImportedSchema>> {
        Ok(self.lock()?.model.imports.clone())
    }
}

#[async_trait]
impl ForeignCatalog for InMemoryForeignCatalog {
    async fn ensure_metadata_table(&self) -> ForeignCatalogResult<()> {
        self.lock_available()?.metadata_table = true;
        Ok(())
    }

    async fn find_server_options(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<Vec<String>>> {
        let state = self.lock_available()?;
        Ok(state
            .model
            .servers
            .get(server_name)
            .map(ServerOptions::to_entries))
    }

    async fn user_mapping_exists(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<bool> {
        Ok(self
            .lock_available()?
            .model
            .user_mappings
            .contains(server_name))
    }

    async fn stored_fingerprint(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<ConfigFingerprint>> {
        let state = self.lock_available()?;
        if !state.metadata_table {
            return Err(ForeignCatalogError::persistence(std::io::Error::other(
                "relation \"_fdw_config_meta\" does not exist",
            )));
        }
        Ok(state
            .fingerprints
            .get(server_name)
            .map(|record| record.fingerprint().clone()))
    }

    async fn save_fingerprint(&self, record: &FingerprintRecord) -> ForeignCatalogResult<()> {
        let mut state = self.lock_available()?;
        if !state.metadata_table {
            return Err(ForeignCatalogError::persistence(std::io::Error::other(
                "relation \"_fdw_config_meta\" does not exist",
            )));
        }
        state
            .fingerprints
            .insert(record.server_name().clone(), record.clone());
        state
            .journal
            .push(CatalogJournalEntry::FingerprintSaved(
                record.server_name().clone(),
            ));
        Ok(())
    }

    async fn execute_transaction(
        &self,
        statements: &[DdlStatement],
    ) -> ForeignCatalogResult<()> {
        let mut state = self.lock_available()?;
        state.journal.push(CatalogJournalEntry::Begin);
        let mut staged = state.model.clone();
        for statement in statements {
            state
                .journal
                .push(CatalogJournalEntry::Statement(statement.kind()));
            let outcome = check_injected_failure(state.failing_statement, statement)
                .and_then(|()| apply(&mut staged, statement));
            if let Err(err) = outcome {
                state.journal.push(CatalogJournalEntry::Rollback);
                return Err(err);
            }
        }
        state.model = staged;
        state.journal.push(CatalogJournalEntry::Commit);
        Ok(())
    }

    async fn execute(&self, statement: &DdlStatement) -> ForeignCatalogResult<()> {
        let mut state = self.lock_available()?;
        state
            .journal
            .push(CatalogJournalEntry::Executed(statement.kind()));
        check_injected_failure(state.failing_statement, statement)?;
        apply(&mut state.model, statement)
    }
}

fn check_injected_failure(
    failing: Option<StatementKind>,
    statement: &DdlStatement,
) -> ForeignCatalogResult<()> {
    if failing == Some(statement.kind()) {
        return Err(statement_error(statement.kind(), "injected failure"));
    }
    Ok(())
}

fn statement_error(kind: StatementKind, message: &str) -> ForeignCatalogError {
    ForeignCatalogError::statement(kind, std::io::Error::other(message.to_owned()))
}

fn apply(model: &mut CatalogModel, statement: &DdlStatement) -> ForeignCatalogResult<()> {
    let kind = statement.kind();
    match statement.action() {
        CatalogAction::InstallExtension => {
            model.extension_installed = true;
        }
        CatalogAction::CreateServer { server, options } => {
            if !model.extension_installed {
                return Err(statement_error(
                    kind,
                    "foreign-data wrapper \"postgres_fdw\" does not exist",
                ));
            }
            if model.servers.contains_key(server) {
                return Err(statement_error(kind, "server already exists"));
            }
            model.servers.insert(server.clone(), options.clone());
        }
        CatalogAction::AlterServer { server, options } => {
            let Some(existing) = model.servers.get_mut(server) else {
                return Err(statement_error(kind, "server does not exist"));
            };
            existing.clone_from(options);
        }
        CatalogAction::CreateUserMapping { server, .. } => {
            if !model.servers.contains_key(server) {
                return Err(statement_error(kind, "server does not exist"));
            }
            if !model.user_mappings.insert(server.clone()) {
                return Err(statement_error(kind, "user mapping already exists"));
            }
        }
        CatalogAction::DropUserMapping { server } => {
            model.user_mappings.remove(server);
        }
        CatalogAction::CreateSchema { schema } => {
            model.schemas.insert(schema.clone());
        }
        CatalogAction::ImportForeignSchema {
            remote_schema,
            tables,
            server,
            local_schema,
        } => {
            if !model.servers.contains_key(server) {
                return Err(statement_error(kind, "server does not exist"));
            }
            if !model.schemas.contains(local_schema) {
                return Err(statement_error(kind, "schema does not exist"));
            }
            model.imports.push(ImportedSchema {
                remote_schema: remote_schema.clone(),
                tables: tables.clone(),
                local_schema: local_schema.clone(),
            });
        }
    }
    Ok(())
}
