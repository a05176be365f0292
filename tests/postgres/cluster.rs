//! Embedded `PostgreSQL` cluster shared by the integration tests.
//!
//! The cluster is started once per test binary. When it cannot start
//! (running as root, no binaries downloadable, sandboxed networking) the
//! fixture panics with a `SKIP-TEST-CLUSTER:` message, so every dependent
//! test fails visibly instead of passing without running.

use crate::test_helpers::EnvVarGuard;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use pg_embedded_setup_unpriv::{ExecutionPrivileges, bootstrap_for_tests};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use rstest::fixture;
use std::net::TcpListener;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

static SHARED_CLUSTER: OnceLock<ManagedCluster> = OnceLock::new();

/// Shared cluster handle.
pub type PostgresCluster = &'static ManagedCluster;

/// Running embedded cluster and the runtime that owns its process handle.
pub struct ManagedCluster {
    settings: Settings,
    runtime: Runtime,
    postgres: Option<PostgreSQL>,
}

impl ManagedCluster {
    fn start() -> Result<Self, BoxError> {
        let port_guard = EnvVarGuard::set_many(&[("PG_PORT".to_owned(), Some(free_port()?))]);
        let bootstrap = bootstrap_for_tests().map_err(|err| Box::new(err) as BoxError)?;
        drop(port_guard);
        if matches!(bootstrap.privileges, ExecutionPrivileges::Root) {
            return Err("embedded PostgreSQL refuses to run as root".into());
        }

        let runtime = Runtime::new().map_err(|err| Box::new(err) as BoxError)?;
        let env_guard = EnvVarGuard::set_many(&bootstrap.environment.to_env());
        let mut postgres = PostgreSQL::new(bootstrap.settings);
        runtime.block_on(async {
            postgres
                .setup()
                .await
                .map_err(|err| Box::new(err) as BoxError)?;
            if !matches!(postgres.status(), Status::Started) {
                postgres
                    .start()
                    .await
                    .map_err(|err| Box::new(err) as BoxError)?;
            }
            Ok::<(), BoxError>(())
        })?;
        drop(env_guard);

        let mut settings = postgres.settings().clone();
        sync_password_from_file(&mut settings)?;
        Ok(Self {
            settings,
            runtime,
            postgres: Some(postgres),
        })
    }

    /// Connection URL for `database` as the cluster superuser.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.settings.url(database)
    }

    /// Loopback host the cluster listens on.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.settings.host
    }

    /// Port the cluster listens on.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.settings.port
    }

    /// Superuser name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.settings.username
    }

    /// Superuser password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.settings.password
    }

    /// Runs one or more `;`-separated statements against `database` on a
    /// fresh connection.
    pub fn execute(&self, database: &str, sql: &str) -> Result<(), BoxError> {
        let mut connection = PgConnection::establish(&self.database_url(database))
            .map_err(|err| Box::new(err) as BoxError)?;
        connection
            .batch_execute(sql)
            .map_err(|err| Box::new(err) as BoxError)
    }

    /// Creates an empty database.
    pub fn create_database(&self, name: &str) -> Result<(), BoxError> {
        self.execute("postgres", &format!("CREATE DATABASE {}", quote_identifier(name)))
    }

    /// Drops a database, disconnecting any remaining sessions.
    pub fn drop_database(&self, name: &str) -> Result<(), BoxError> {
        self.execute(
            "postgres",
            &format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", quote_identifier(name)),
        )
    }
}

impl Drop for ManagedCluster {
    fn drop(&mut self) {
        let Some(postgres) = self.postgres.take() else {
            return;
        };
        drop(self.runtime.block_on(postgres.stop()));
    }
}

/// Provides the shared cluster, starting it on first use.
#[fixture]
pub fn postgres_cluster() -> PostgresCluster {
    SHARED_CLUSTER.get_or_init(|| match ManagedCluster::start() {
        Ok(cluster) => cluster,
        Err(err) => panic!("SKIP-TEST-CLUSTER: failed to start PostgreSQL: {err}"),
    })
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn free_port() -> Result<String, BoxError> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(|err| Box::new(err) as BoxError)?;
    let port = listener
        .local_addr()
        .map_err(|err| Box::new(err) as BoxError)?
        .port();
    Ok(port.to_string())
}

fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    match std::fs::read_to_string(&settings.password_file) {
        Ok(contents) => {
            let password = contents.trim_end();
            if !password.is_empty() {
                password.clone_into(&mut settings.password);
            }
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Box::new(err) as BoxError),
    }
}
