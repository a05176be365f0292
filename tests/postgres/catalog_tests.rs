//! `PostgresForeignCatalog` behaviour that does not need `postgres_fdw`.

use crate::postgres::helpers::{
    DatabasePair, PostgresCluster, count, postgres_cluster, test_runtime,
};
use fdw_reconciler::fdw::{
    domain::{
        ConfigFingerprint, DdlStatement, FingerprintRecord, ForeignServerName,
        RemoteConnectionConfig, StatementKind,
    },
    ports::{ForeignCatalog, ForeignCatalogError},
};
use mockable::DefaultClock;
use rstest::rstest;

fn server() -> ForeignServerName {
    ForeignServerName::new("catalog_test_server").expect("valid server name")
}

#[rstest]
fn metadata_table_creation_is_idempotent(postgres_cluster: PostgresCluster) {
    let databases = DatabasePair::create(postgres_cluster).expect("databases");
    let catalog = databases.catalog().expect("catalog");
    let rt = test_runtime().expect("tokio runtime");

    rt.block_on(catalog.ensure_metadata_table())
        .expect("first creation");
    rt.block_on(catalog.ensure_metadata_table())
        .expect("second creation");

    let mut connection = databases.host_connection().expect("connection");
    let tables = count(
        &mut connection,
        "SELECT count(*) AS count FROM information_schema.tables \
         WHERE table_name = '_fdw_config_meta'",
    )
    .expect("count tables");
    assert_eq!(tables, 1);
}

#[rstest]
fn fingerprint_upsert_replaces_previous_row(postgres_cluster: PostgresCluster) {
    let databases = DatabasePair::create(postgres_cluster).expect("databases");
    let catalog = databases.catalog().expect("catalog");
    let rt = test_runtime().expect("tokio runtime");
    rt.block_on(catalog.ensure_metadata_table())
        .expect("metadata table");

    let first = FingerprintRecord::new(
        server(),
        ConfigFingerprint::from_stored("a".repeat(64)),
        &DefaultClock,
    );
    let second = FingerprintRecord::new(
        server(),
        ConfigFingerprint::from_stored("b".repeat(64)),
        &DefaultClock,
    );
    rt.block_on(catalog.save_fingerprint(&first))
        .expect("first save");
    rt.block_on(catalog.save_fingerprint(&second))
        .expect("second save");

    let stored = rt
        .block_on(catalog.stored_fingerprint(&server()))
        .expect("lookup")
        .expect("fingerprint should exist");
    assert_eq!(stored.as_str(), "b".repeat(64));

    let mut connection = databases.host_connection().expect("connection");
    let rows = count(
        &mut connection,
        "SELECT count(*) AS count FROM _fdw_config_meta",
    )
    .expect("count rows");
    assert_eq!(rows, 1);
}

#[rstest]
fn missing_server_reports_no_options(postgres_cluster: PostgresCluster) {
    let databases = DatabasePair::create(postgres_cluster).expect("databases");
    let catalog = databases.catalog().expect("catalog");
    let rt = test_runtime().expect("tokio runtime");

    let options = rt
        .block_on(catalog.find_server_options(&server()))
        .expect("lookup");
    let mapping = rt
        .block_on(catalog.user_mapping_exists(&server()))
        .expect("mapping lookup");

    assert!(options.is_none());
    assert!(!mapping);
}

#[rstest]
fn stored_fingerprint_is_absent_for_unknown_server(postgres_cluster: PostgresCluster) {
    let databases = DatabasePair::create(postgres_cluster).expect("databases");
    let catalog = databases.catalog().expect("catalog");
    let rt = test_runtime().expect("tokio runtime");
    rt.block_on(catalog.ensure_metadata_table())
        .expect("metadata table");

    let stored = rt
        .block_on(catalog.stored_fingerprint(&server()))
        .expect("lookup");
    assert!(stored.is_none());
}

#[rstest]
fn failing_statement_rolls_back_earlier_statements(postgres_cluster: PostgresCluster) {
    let databases = DatabasePair::create(postgres_cluster).expect("databases");
    let catalog = databases.catalog().expect("catalog");
    let rt = test_runtime().expect("tokio runtime");

    let statements = [
        DdlStatement::create_schema("rolled_back_schema"),
        DdlStatement::alter_server(&RemoteConnectionConfig::new(server())),
    ];
    let result = rt.block_on(catalog.execute_transaction(&statements));

    assert!(matches!(
        result,
        Err(ForeignCatalogError::Statement {
            kind: StatementKind::AlterServer,
            ..
        })
    ));
    let mut connection = databases.host_connection().expect("connection");
    let schemas = count(
        &mut connection,
        "SELECT count(*) AS count FROM information_schema.schemata \
         WHERE schema_name = 'rolled_back_schema'",
    )
    .expect("count schemas");
    assert_eq!(schemas, 0);
}
