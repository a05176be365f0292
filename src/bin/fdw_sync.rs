//! Reconciles the configured foreign server against the host database.
//!
//! Usage:
//!
//! ```text
//! fdw_sync [sync | status | import <remote_schema> [table...]]
//! ```
//!
//! `sync` (the default) runs the startup hook: reconciliation failures are
//! logged and reported but never turn into a failing exit status. `status`
//! prints the catalog status of the configured server as JSON. `import`
//! runs `IMPORT FOREIGN SCHEMA` into the configured local schema and exits
//! non-zero when it fails.
//!
//! The host database is taken from `DATABASE_URL`, or assembled from
//! `DATABASE_HOST`, `DATABASE_PORT`, `DATABASE_NAME`, `DATABASE_USER`, and
//! `DATABASE_PASSWORD`. Foreign server settings come from the `AUTR_*`
//! variables.

use fdw_reconciler::fdw::{
    adapters::{
        env::EnvConfigSource,
        postgres::{self, PostgresForeignCatalog},
        tracing_log::TracingActivityLog,
    },
    domain::{DEFAULT_REMOTE_SCHEMA, ReconciliationResult},
    ports::ConfigSource,
    services::{FdwReconciler, FdwReconcilerError, ImportSchemaRequest},
};
use fdw_reconciler::telemetry;
use mockable::DefaultClock;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const POOL_SIZE: u32 = 2;

/// Errors that end the process with a failing status.
#[derive(Debug, Error)]
enum CliError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error(transparent)]
    Reconciler(#[from] FdwReconcilerError),
    #[error("failed to render output: {0}")]
    Output(#[source] serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Sync,
    Status,
    Import(ImportSchemaRequest),
}

impl Command {
    fn parse<I>(raw: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = raw.into_iter();
        match args.next().as_deref() {
            None | Some("sync") => expect_no_more(args).map(|()| Self::Sync),
            Some("status") => expect_no_more(args).map(|()| Self::Status),
            Some("import") => {
                let remote_schema = args
                    .next()
                    .unwrap_or_else(|| DEFAULT_REMOTE_SCHEMA.to_owned());
                Ok(Self::Import(
                    ImportSchemaRequest::new(remote_schema).with_tables(args),
                ))
            }
            Some(other) => Err(CliError::InvalidArgs(format!(
                "unknown command '{other}'; expected sync, status, or import"
            ))),
        }
    }
}

fn expect_no_more(mut args: impl Iterator<Item = String>) -> Result<(), CliError> {
    args.next().map_or(Ok(()), |extra| {
        Err(CliError::InvalidArgs(format!(
            "unexpected argument '{extra}'"
        )))
    })
}

/// Builds the host connection string from `DATABASE_URL` or its parts.
///
/// Parts are rendered as a libpq keyword/value string so credentials need no
/// URL encoding.
fn database_url<S: ConfigSource + ?Sized>(source: &S) -> String {
    if let Some(url) = non_blank(source, "DATABASE_URL") {
        return url;
    }
    let part = |key: &str, default: &str| {
        non_blank(source, key).unwrap_or_else(|| default.to_owned())
    };
    let mut pairs = vec![
        ("host", part("DATABASE_HOST", "localhost")),
        ("port", part("DATABASE_PORT", "5432")),
        ("dbname", part("DATABASE_NAME", "postgres")),
        ("user", part("DATABASE_USER", "postgres")),
    ];
    if let Some(password) = non_blank(source, "DATABASE_PASSWORD") {
        pairs.push(("password", password));
    }
    pairs
        .iter()
        .map(|(keyword, value)| format!("{keyword}={}", conninfo_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_blank<S: ConfigSource + ?Sized>(source: &S, key: &str) -> Option<String> {
    source.get(key).filter(|value| !value.trim().is_empty())
}

fn conninfo_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn main() -> Result<(), BoxError> {
    let command = Command::parse(std::env::args().skip(1))?;
    telemetry::init()?;
    run(command).map_err(Into::into)
}

fn run(command: Command) -> Result<(), CliError> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::RuntimeInit)?;
    let config = Arc::new(EnvConfigSource::new());
    let url = database_url(&*config);

    runtime.block_on(async move {
        match command {
            Command::Sync => sync(&url, config).await,
            Command::Status => {
                let reconciler = connect(&url, config)?;
                let settings = reconciler.settings()?;
                let status = reconciler
                    .get_status(settings.connection().server_name().as_str())
                    .await?;
                write_json(&status)
            }
            Command::Import(request) => {
                let reconciler = connect(&url, config)?;
                reconciler.import_schema(&request).await?;
                Ok(())
            }
        }
    })
}

/// Runs the startup hook; an unreachable host is reported like any other
/// reconciliation failure.
async fn sync(url: &str, config: Arc<EnvConfigSource>) -> Result<(), CliError> {
    let reconciler = match connect(url, config) {
        Ok(reconciler) => reconciler,
        Err(err) => {
            tracing::error!(target: "fdw", error = %err, "host database is unreachable");
            return write_json(&ReconciliationResult::failed(err.to_string()));
        }
    };
    match reconciler.activate().await {
        Some(result) => write_json(&result),
        None => Ok(()),
    }
}

type HostReconciler =
    FdwReconciler<PostgresForeignCatalog, EnvConfigSource, TracingActivityLog, DefaultClock>;

fn connect(url: &str, config: Arc<EnvConfigSource>) -> Result<HostReconciler, CliError> {
    let pool = postgres::connect_pool(url, POOL_SIZE).map_err(FdwReconcilerError::from)?;
    Ok(FdwReconciler::new(
        Arc::new(PostgresForeignCatalog::new(pool)),
        config,
        Arc::new(TracingActivityLog::new()),
        Arc::new(DefaultClock),
    ))
}

fn write_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").map_err(CliError::Write)
}
