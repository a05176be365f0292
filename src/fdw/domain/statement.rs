//! Catalog statements issued during reconciliation and schema import.
//!
//! Each [`DdlStatement`] pairs the rendered SQL with a structured
//! [`CatalogAction`], so adapters that execute SQL and adapters that model
//! the catalog in memory consume the same plan.

use super::{
    FdwSettings, ForeignServerName, RemoteConnectionConfig, ServerOptions, escape_identifier,
    escape_literal,
};
use std::fmt;

/// Extension providing the foreign data wrapper.
pub const FDW_EXTENSION: &str = "postgres_fdw";

/// Remote schema imported when the caller does not name one.
pub const DEFAULT_REMOTE_SCHEMA: &str = "public";

/// Kind of catalog statement, used for logging and fault reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `CREATE EXTENSION IF NOT EXISTS postgres_fdw`.
    CreateExtension,
    /// `CREATE SERVER`.
    CreateServer,
    /// `ALTER SERVER ... OPTIONS (SET ...)`.
    AlterServer,
    /// `CREATE USER MAPPING FOR CURRENT_USER`.
    CreateUserMapping,
    /// `DROP USER MAPPING IF EXISTS FOR CURRENT_USER`.
    DropUserMapping,
    /// `CREATE SCHEMA IF NOT EXISTS`.
    CreateSchema,
    /// `IMPORT FOREIGN SCHEMA`.
    ImportForeignSchema,
}

impl StatementKind {
    /// Returns a stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateExtension => "create_extension",
            Self::CreateServer => "create_server",
            Self::AlterServer => "alter_server",
            Self::CreateUserMapping => "create_user_mapping",
            Self::DropUserMapping => "drop_user_mapping",
            Self::CreateSchema => "create_schema",
            Self::ImportForeignSchema => "import_foreign_schema",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Structured description of a catalog change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// Install the `postgres_fdw` extension when absent.
    InstallExtension,
    /// Register a new foreign server.
    CreateServer {
        /// Server name.
        server: ForeignServerName,
        /// Connection options.
        options: ServerOptions,
    },
    /// Replace the connection options of an existing server.
    AlterServer {
        /// Server name.
        server: ForeignServerName,
        /// Connection options.
        options: ServerOptions,
    },
    /// Create the current role's user mapping.
    CreateUserMapping {
        /// Server name.
        server: ForeignServerName,
        /// Remote role.
        user: String,
    },
    /// Drop the current role's user mapping when present.
    DropUserMapping {
        /// Server name.
        server: ForeignServerName,
    },
    /// Create a local schema when absent.
    CreateSchema {
        /// Schema name.
        schema: String,
    },
    /// Import remote table definitions into a local schema.
    ImportForeignSchema {
        /// Remote schema name.
        remote_schema: String,
        /// Optional table allow-list; empty means the whole schema.
        tables: Vec<String>,
        /// Server name.
        server: ForeignServerName,
        /// Local schema name.
        local_schema: String,
    },
}

impl CatalogAction {
    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match self {
            Self::InstallExtension => StatementKind::CreateExtension,
            Self::CreateServer { .. } => StatementKind::CreateServer,
            Self::AlterServer { .. } => StatementKind::AlterServer,
            Self::CreateUserMapping { .. } => StatementKind::CreateUserMapping,
            Self::DropUserMapping { .. } => StatementKind::DropUserMapping,
            Self::CreateSchema { .. } => StatementKind::CreateSchema,
            Self::ImportForeignSchema { .. } => StatementKind::ImportForeignSchema,
        }
    }
}

/// A rendered catalog statement and the change it performs.
#[derive(Clone, PartialEq, Eq)]
pub struct DdlStatement {
    action: CatalogAction,
    sql: String,
}

impl DdlStatement {
    /// Returns the structured action.
    #[must_use]
    pub const fn action(&self) -> &CatalogAction {
        &self.action
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.action.kind()
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// `CREATE EXTENSION IF NOT EXISTS postgres_fdw`.
    #[must_use]
    pub fn install_extension() -> Self {
        Self {
            action: CatalogAction::InstallExtension,
            sql: format!("CREATE EXTENSION IF NOT EXISTS {FDW_EXTENSION}"),
        }
    }

    /// `CREATE SERVER` with host, port and dbname options.
    #[must_use]
    pub fn create_server(config: &RemoteConnectionConfig) -> Self {
        let server = config.server_name();
        Self {
            sql: format!(
                "CREATE SERVER {} FOREIGN DATA WRAPPER {FDW_EXTENSION} OPTIONS ({})",
                escape_identifier(server.as_str()),
                render_server_options(config, ""),
            ),
            action: CatalogAction::CreateServer {
                server: server.clone(),
                options: desired_options(config),
            },
        }
    }

    /// `ALTER SERVER` setting host, port and dbname.
    #[must_use]
    pub fn alter_server(config: &RemoteConnectionConfig) -> Self {
        let server = config.server_name();
        Self {
            sql: format!(
                "ALTER SERVER {} OPTIONS ({})",
                escape_identifier(server.as_str()),
                render_server_options(config, "SET "),
            ),
            action: CatalogAction::AlterServer {
                server: server.clone(),
                options: desired_options(config),
            },
        }
    }

    /// `CREATE USER MAPPING FOR CURRENT_USER` with the remote credentials.
    #[must_use]
    pub fn create_user_mapping(config: &RemoteConnectionConfig) -> Self {
        let server = config.server_name();
        Self {
            sql: format!(
                "CREATE USER MAPPING FOR CURRENT_USER SERVER {} OPTIONS (user '{}', password '{}')",
                escape_identifier(server.as_str()),
                escape_literal(config.user()),
                escape_literal(config.password()),
            ),
            action: CatalogAction::CreateUserMapping {
                server: server.clone(),
                user: config.user().to_owned(),
            },
        }
    }

    /// `DROP USER MAPPING IF EXISTS FOR CURRENT_USER`.
    #[must_use]
    pub fn drop_user_mapping(server: &ForeignServerName) -> Self {
        Self {
            sql: format!(
                "DROP USER MAPPING IF EXISTS FOR CURRENT_USER SERVER {}",
                escape_identifier(server.as_str()),
            ),
            action: CatalogAction::DropUserMapping {
                server: server.clone(),
            },
        }
    }

    /// `CREATE SCHEMA IF NOT EXISTS`.
    #[must_use]
    pub fn create_schema(schema: &str) -> Self {
        Self {
            sql: format!("CREATE SCHEMA IF NOT EXISTS {}", escape_identifier(schema)),
            action: CatalogAction::CreateSchema {
                schema: schema.to_owned(),
            },
        }
    }

    /// `IMPORT FOREIGN SCHEMA`, restricted with `LIMIT TO` when `tables` is
    /// non-empty.
    #[must_use]
    pub fn import_foreign_schema(
        remote_schema: &str,
        tables: &[String],
        server: &ForeignServerName,
        local_schema: &str,
    ) -> Self {
        let mut sql = format!("IMPORT FOREIGN SCHEMA {}", escape_identifier(remote_schema));
        if !tables.is_empty() {
            let table_list = tables
                .iter()
                .map(|table| escape_identifier(table))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" LIMIT TO ({table_list})"));
        }
        sql.push_str(&format!(
            " FROM SERVER {} INTO {}",
            escape_identifier(server.as_str()),
            escape_identifier(local_schema),
        ));

        Self {
            sql,
            action: CatalogAction::ImportForeignSchema {
                remote_schema: remote_schema.to_owned(),
                tables: tables.to_vec(),
                server: server.clone(),
                local_schema: local_schema.to_owned(),
            },
        }
    }

    /// Statements provisioning a server that does not exist yet.
    #[must_use]
    pub fn create_plan(settings: &FdwSettings) -> Vec<Self> {
        let config = settings.connection();
        vec![
            Self::install_extension(),
            Self::create_server(config),
            Self::create_user_mapping(config),
            Self::create_schema(settings.local_schema()),
        ]
    }

    /// Statements bringing an existing server up to date.
    #[must_use]
    pub fn update_plan(settings: &FdwSettings) -> Vec<Self> {
        let config = settings.connection();
        vec![
            Self::alter_server(config),
            Self::drop_user_mapping(config.server_name()),
            Self::create_user_mapping(config),
        ]
    }
}

// Credentials stay out of logs and panic messages.
impl fmt::Debug for DdlStatement {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DdlStatement")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

fn desired_options(config: &RemoteConnectionConfig) -> ServerOptions {
    ServerOptions {
        host: config.host().to_owned(),
        port: config.port().to_string(),
        dbname: config.dbname().to_owned(),
    }
}

fn render_server_options(config: &RemoteConnectionConfig, prefix: &str) -> String {
    format!(
        "{prefix}host '{}', {prefix}port '{}', {prefix}dbname '{}'",
        escape_literal(config.host()),
        config.port(),
        escape_literal(config.dbname()),
    )
}
