//! Shared helpers for `PostgreSQL` integration tests.

pub use super::cluster::{BoxError, ManagedCluster, PostgresCluster, postgres_cluster};
use diesel::prelude::*;
use fdw_reconciler::fdw::{
    adapters::{
        env::MapConfigSource,
        memory::RecordingActivityLog,
        postgres::{PostgresForeignCatalog, connect_pool},
    },
    domain::FdwSettingKey,
    services::FdwReconciler,
};
use mockable::DefaultClock;
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

pub type PgReconciler =
    FdwReconciler<PostgresForeignCatalog, MapConfigSource, RecordingActivityLog, DefaultClock>;

/// Builds a single-threaded runtime for driving async adapters from tests.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| Box::new(err) as BoxError)
}

/// A host database plus a remote database on the same cluster, dropped
/// together when the guard goes out of scope.
pub struct DatabasePair {
    pub cluster: &'static ManagedCluster,
    pub host_db: String,
    pub remote_db: String,
}

impl DatabasePair {
    /// Creates both databases with unique names.
    pub fn create(cluster: &'static ManagedCluster) -> Result<Self, BoxError> {
        let suffix = Uuid::new_v4().simple().to_string();
        let pair = Self {
            cluster,
            host_db: format!("fdw_host_{suffix}"),
            remote_db: format!("fdw_remote_{suffix}"),
        };
        cluster.create_database(&pair.host_db)?;
        cluster.create_database(&pair.remote_db)?;
        Ok(pair)
    }

    /// Catalog adapter connected to the host database.
    pub fn catalog(&self) -> Result<PostgresForeignCatalog, BoxError> {
        let pool = connect_pool(&self.cluster.database_url(&self.host_db), 2)
            .map_err(|err| Box::new(err) as BoxError)?;
        Ok(PostgresForeignCatalog::new(pool))
    }

    /// Settings pointing the foreign server at the remote database.
    pub fn config(&self, server_name: &str) -> MapConfigSource {
        MapConfigSource::new()
            .with(FdwSettingKey::ServerName.as_str(), server_name)
            .with(FdwSettingKey::Host.as_str(), self.cluster.host())
            .with(FdwSettingKey::Port.as_str(), self.cluster.port().to_string())
            .with(FdwSettingKey::DatabaseName.as_str(), self.remote_db.as_str())
            .with(FdwSettingKey::User.as_str(), self.cluster.username())
            .with(FdwSettingKey::Password.as_str(), self.cluster.password())
            .with(FdwSettingKey::LocalSchema.as_str(), "remote_import")
    }

    /// Reconciler over the host database using `config`.
    pub fn reconciler(
        &self,
        config: MapConfigSource,
    ) -> Result<(PgReconciler, RecordingActivityLog), BoxError> {
        let log = RecordingActivityLog::new();
        let reconciler = FdwReconciler::new(
            Arc::new(self.catalog()?),
            Arc::new(config),
            Arc::new(log.clone()),
            Arc::new(DefaultClock),
        );
        Ok((reconciler, log))
    }

    /// Whether the host database can install `postgres_fdw`.
    pub fn fdw_available(&self) -> Result<bool, BoxError> {
        #[derive(QueryableByName)]
        struct Available {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            available: bool,
        }

        let mut connection = self.host_connection()?;
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM pg_available_extensions \
             WHERE name = 'postgres_fdw') AS available",
        )
        .get_result::<Available>(&mut connection)
        .map_err(|err| Box::new(err) as BoxError)?;
        Ok(row.available)
    }

    /// Direct connection to the host database.
    pub fn host_connection(&self) -> Result<PgConnection, BoxError> {
        PgConnection::establish(&self.cluster.database_url(&self.host_db))
            .map_err(|err| Box::new(err) as BoxError)
    }
}

impl Drop for DatabasePair {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.host_db));
        drop(self.cluster.drop_database(&self.remote_db));
    }
}

/// Row shape for single-column `bigint` counts.
#[derive(QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub count: i64,
}

/// Runs a `SELECT count(*) AS count ...` query on `connection`.
pub fn count(connection: &mut PgConnection, sql: &str) -> Result<i64, BoxError> {
    let row = diesel::sql_query(sql)
        .get_result::<CountRow>(connection)
        .map_err(|err| Box::new(err) as BoxError)?;
    Ok(row.count)
}
