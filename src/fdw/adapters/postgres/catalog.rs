//! `PostgreSQL` implementation of the foreign catalog port.

use super::{
    models::{ExistsRow, NewFingerprintRow, ServerOptionsRow},
    schema::fdw_config_meta,
};
use crate::fdw::{
    domain::{
        ConfigFingerprint, DdlStatement, FingerprintRecord, ForeignServerName, escape_identifier,
    },
    ports::{ForeignCatalog, ForeignCatalogError, ForeignCatalogResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Text;
use diesel::upsert::excluded;

/// `PostgreSQL` connection pool type for the catalog adapter.
pub type FdwPgPool = Pool<ConnectionManager<PgConnection>>;

/// Table holding one fingerprint row per foreign server.
pub const METADATA_TABLE: &str = "_fdw_config_meta";

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`ForeignCatalogError::Connection`] when the pool cannot open its
/// initial connections.
pub fn connect_pool(database_url: &str, max_size: u32) -> ForeignCatalogResult<FdwPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(ForeignCatalogError::connection)
}

/// Catalog adapter issuing DDL and introspection queries through Diesel.
///
/// Each operation checks a connection out of the pool on a blocking worker
/// and returns it when the closure finishes.
#[derive(Debug, Clone)]
pub struct PostgresForeignCatalog {
    pool: FdwPgPool,
}

impl PostgresForeignCatalog {
    /// Creates a catalog adapter from a `PostgreSQL` pool.
    #[must_use]
    pub const fn new(pool: FdwPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> ForeignCatalogResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ForeignCatalogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ForeignCatalogError::connection)?;
            operation(&mut connection)
        })
        .await
        .map_err(ForeignCatalogError::persistence)?
    }
}

#[async_trait]
impl ForeignCatalog for PostgresForeignCatalog {
    async fn ensure_metadata_table(&self) -> ForeignCatalogResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             server_name VARCHAR(255) PRIMARY KEY, \
             config_hash VARCHAR(64) NOT NULL, \
             updated_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP)",
            escape_identifier(METADATA_TABLE)
        );
        self.run_blocking(move |connection| {
            diesel::sql_query(sql)
                .execute(connection)
                .map_err(ForeignCatalogError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_server_options(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<Vec<String>>> {
        let name = server_name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(
                "SELECT srvoptions FROM pg_catalog.pg_foreign_server WHERE srvname = $1",
            )
            .bind::<Text, _>(name)
            .get_result::<ServerOptionsRow>(connection)
            .optional()
            .map_err(ForeignCatalogError::persistence)?;
            Ok(row.map(|found| found.srvoptions.unwrap_or_default()))
        })
        .await
    }

    async fn user_mapping_exists(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<bool> {
        let name = server_name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = diesel::sql_query(
                "SELECT EXISTS (\
                 SELECT 1 FROM pg_catalog.pg_user_mappings \
                 WHERE srvname = $1 AND usename = CURRENT_USER) AS present",
            )
            .bind::<Text, _>(name)
            .get_result::<ExistsRow>(connection)
            .map_err(ForeignCatalogError::persistence)?;
            Ok(row.present)
        })
        .await
    }

    async fn stored_fingerprint(
        &self,
        server_name: &ForeignServerName,
    ) -> ForeignCatalogResult<Option<ConfigFingerprint>> {
        let name = server_name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let hash = fdw_config_meta::table
                .filter(fdw_config_meta::server_name.eq(&name))
                .select(fdw_config_meta::config_hash)
                .first::<String>(connection)
                .optional()
                .map_err(ForeignCatalogError::persistence)?;
            Ok(hash.map(ConfigFingerprint::from_stored))
        })
        .await
    }

    async fn save_fingerprint(&self, record: &FingerprintRecord) -> ForeignCatalogResult<()> {
        let row = NewFingerprintRow {
            server_name: record.server_name().as_str().to_owned(),
            config_hash: record.fingerprint().as_str().to_owned(),
            updated_at: Some(record.updated_at()),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(fdw_config_meta::table)
                .values(&row)
                .on_conflict(fdw_config_meta::server_name)
                .do_update()
                .set((
                    fdw_config_meta::config_hash.eq(excluded(fdw_config_meta::config_hash)),
                    fdw_config_meta::updated_at.eq(excluded(fdw_config_meta::updated_at)),
                ))
                .execute(connection)
                .map_err(ForeignCatalogError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn execute_transaction(
        &self,
        statements: &[DdlStatement],
    ) -> ForeignCatalogResult<()> {
        let owned = statements.to_vec();
        self.run_blocking(move |connection| {
            connection.transaction::<_, ForeignCatalogError, _>(|transaction| {
                for statement in &owned {
                    diesel::sql_query(statement.sql())
                        .execute(transaction)
                        .map_err(|err| ForeignCatalogError::statement(statement.kind(), err))?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn execute(&self, statement: &DdlStatement) -> ForeignCatalogResult<()> {
        let owned = statement.clone();
        self.run_blocking(move |connection| {
            diesel::sql_query(owned.sql())
                .execute(connection)
                .map_err(|err| ForeignCatalogError::statement(owned.kind(), err))?;
            Ok(())
        })
        .await
    }
}
