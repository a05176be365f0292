//! End-to-end reconciliation against an embedded cluster with
//! `postgres_fdw`.

use crate::postgres::helpers::{
    DatabasePair, PostgresCluster, count, postgres_cluster, test_runtime,
};
use fdw_reconciler::fdw::{
    domain::{FdwSettingKey, ReconcileOperation},
    services::ImportSchemaRequest,
};
use rstest::rstest;

const SERVER: &str = "integration_remote";

/// Creates databases on the shared cluster, failing when `postgres_fdw` is
/// not installed.
fn fdw_databases(cluster: PostgresCluster) -> DatabasePair {
    let databases = DatabasePair::create(cluster).expect("databases");
    assert!(
        databases.fdw_available().expect("extension lookup"),
        "SKIP-TEST-CLUSTER: postgres_fdw is not installed in the embedded cluster"
    );
    databases
}

#[rstest]
fn repeated_reconciliation_creates_then_skips_then_updates(postgres_cluster: PostgresCluster) {
    let databases = fdw_databases(postgres_cluster);
    let rt = test_runtime().expect("tokio runtime");
    let config = databases.config(SERVER);

    let (reconciler, _) = databases.reconciler(config.clone()).expect("reconciler");
    let first = rt.block_on(reconciler.reconcile()).expect("first run");
    let second = rt.block_on(reconciler.reconcile()).expect("second run");

    let rotated = config.with(FdwSettingKey::Password.as_str(), "rotated-secret");
    let (rotated_reconciler, _) = databases.reconciler(rotated).expect("reconciler");
    let third = rt.block_on(rotated_reconciler.reconcile()).expect("third run");

    assert_eq!(first.operation(), ReconcileOperation::Created);
    assert_eq!(second.operation(), ReconcileOperation::Skipped);
    assert_eq!(third.operation(), ReconcileOperation::Updated);

    let mut connection = databases.host_connection().expect("connection");
    let servers = count(
        &mut connection,
        "SELECT count(*) AS count FROM pg_foreign_server WHERE srvname = 'integration_remote'",
    )
    .expect("count servers");
    let mappings = count(
        &mut connection,
        "SELECT count(*) AS count FROM pg_user_mappings \
         WHERE srvname = 'integration_remote' AND usename = CURRENT_USER",
    )
    .expect("count mappings");
    assert_eq!((servers, mappings), (1, 1));
}

#[rstest]
fn status_reflects_provisioned_server(postgres_cluster: PostgresCluster) {
    let databases = fdw_databases(postgres_cluster);
    let rt = test_runtime().expect("tokio runtime");
    let (reconciler, _) = databases
        .reconciler(databases.config(SERVER))
        .expect("reconciler");

    let before = rt.block_on(reconciler.get_status(SERVER)).expect("status");
    rt.block_on(reconciler.reconcile()).expect("reconcile");
    let after = rt.block_on(reconciler.get_status(SERVER)).expect("status");

    assert!(!before.exists());
    assert!(after.exists());
    assert!(after.user_mapping_exists());
    let options = after.current_config().expect("options should be reported");
    assert_eq!(options.host, databases.cluster.host());
    assert_eq!(options.port, databases.cluster.port().to_string());
    assert_eq!(options.dbname, databases.remote_db);
}

#[rstest]
fn imported_tables_are_queryable(postgres_cluster: PostgresCluster) {
    let databases = fdw_databases(postgres_cluster);
    databases
        .cluster
        .execute(
            &databases.remote_db,
            "CREATE TABLE users (id integer PRIMARY KEY, email text NOT NULL); \
             INSERT INTO users VALUES (1, 'a@example.com'), (2, 'b@example.com'); \
             CREATE TABLE audit (id integer)",
        )
        .expect("remote tables");
    let rt = test_runtime().expect("tokio runtime");
    let (reconciler, _) = databases
        .reconciler(databases.config(SERVER))
        .expect("reconciler");

    rt.block_on(reconciler.reconcile()).expect("reconcile");
    rt.block_on(reconciler.import_schema(&ImportSchemaRequest::default().with_tables(["users"])))
        .expect("import");

    let mut connection = databases.host_connection().expect("connection");
    let foreign_tables = count(
        &mut connection,
        "SELECT count(*) AS count FROM information_schema.foreign_tables \
         WHERE foreign_table_schema = 'remote_import'",
    )
    .expect("count foreign tables");
    let rows = count(
        &mut connection,
        "SELECT count(*) AS count FROM remote_import.users",
    )
    .expect("query through foreign table");
    assert_eq!((foreign_tables, rows), (1, 2));
}

#[rstest]
fn activation_reports_unreachable_remote_as_success(postgres_cluster: PostgresCluster) {
    let databases = fdw_databases(postgres_cluster);
    let rt = test_runtime().expect("tokio runtime");
    let config = databases
        .config(SERVER)
        .with(FdwSettingKey::DatabaseName.as_str(), "no_such_database");
    let (reconciler, log) = databases.reconciler(config).expect("reconciler");

    let outcome = rt
        .block_on(reconciler.activate())
        .expect("reconciliation should run");

    assert!(outcome.success());
    assert_eq!(outcome.operation(), ReconcileOperation::Created);
    assert!(!log.events().is_empty());
}

#[rstest]
#[case("Mixed_Case_Server")]
#[case("UPPER")]
fn mixed_case_server_name_is_skipped_on_second_run(
    postgres_cluster: PostgresCluster,
    #[case] server: &str,
) {
    let databases = fdw_databases(postgres_cluster);
    let rt = test_runtime().expect("tokio runtime");
    let (reconciler, _) = databases
        .reconciler(databases.config(server))
        .expect("reconciler");

    let first = rt.block_on(reconciler.reconcile()).expect("first run");
    let second = rt.block_on(reconciler.reconcile()).expect("second run");
    let status = rt.block_on(reconciler.get_status(server)).expect("status");

    assert_eq!(first.operation(), ReconcileOperation::Created);
    assert_eq!(second.operation(), ReconcileOperation::Skipped);
    assert!(status.exists());
    assert!(status.user_mapping_exists());
}

#[rstest]
fn mixed_case_remote_table_is_imported_by_exact_name(postgres_cluster: PostgresCluster) {
    let databases = fdw_databases(postgres_cluster);
    databases
        .cluster
        .execute(
            &databases.remote_db,
            "CREATE TABLE \"Accounts\" (id integer); INSERT INTO \"Accounts\" VALUES (7)",
        )
        .expect("remote table");
    let rt = test_runtime().expect("tokio runtime");
    let (reconciler, _) = databases
        .reconciler(databases.config(SERVER))
        .expect("reconciler");

    rt.block_on(reconciler.reconcile()).expect("reconcile");
    rt.block_on(
        reconciler.import_schema(&ImportSchemaRequest::default().with_tables(["Accounts"])),
    )
    .expect("import");

    let mut connection = databases.host_connection().expect("connection");
    let rows = count(
        &mut connection,
        "SELECT count(*) AS count FROM remote_import.\"Accounts\"",
    )
    .expect("query through foreign table");
    assert_eq!(rows, 1);
}
