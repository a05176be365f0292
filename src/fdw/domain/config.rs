//! Desired remote connection and component settings.

use super::{FdwDomainError, ForeignServerName};
use std::fmt;

/// Default foreign server name.
const DEFAULT_SERVER_NAME: &str = "autr_server";
/// Default remote host.
const DEFAULT_HOST: &str = "localhost";
/// Default remote port.
const DEFAULT_PORT: u16 = 5432;
/// Default remote database name.
const DEFAULT_DBNAME: &str = "autr_db";
/// Default remote role.
const DEFAULT_USER: &str = "postgres";
/// Default local schema receiving imported foreign tables.
const DEFAULT_LOCAL_SCHEMA: &str = "autr";

/// Configuration keys read by the reconciler, with their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FdwSettingKey {
    /// Foreign server name.
    ServerName,
    /// Remote host.
    Host,
    /// Remote port.
    Port,
    /// Remote database name.
    DatabaseName,
    /// Remote role.
    User,
    /// Remote role password.
    Password,
    /// Whether the startup hook reconciles at all.
    Enabled,
    /// Local schema receiving imported foreign tables.
    LocalSchema,
}

impl FdwSettingKey {
    /// All keys in declaration order.
    pub const ALL: [Self; 8] = [
        Self::ServerName,
        Self::Host,
        Self::Port,
        Self::DatabaseName,
        Self::User,
        Self::Password,
        Self::Enabled,
        Self::LocalSchema,
    ];

    /// Returns the lookup key (environment variable name).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServerName => "AUTR_FDW_SERVER_NAME",
            Self::Host => "AUTR_DATABASE_HOST",
            Self::Port => "AUTR_DATABASE_PORT",
            Self::DatabaseName => "AUTR_DATABASE_NAME",
            Self::User => "AUTR_DATABASE_USER",
            Self::Password => "AUTR_DATABASE_PASSWORD",
            Self::Enabled => "AUTR_FDW_ENABLED",
            Self::LocalSchema => "AUTR_FDW_LOCAL_SCHEMA",
        }
    }

    /// Returns the value used when the key is unset or empty.
    #[must_use]
    pub const fn default_value(self) -> &'static str {
        match self {
            Self::ServerName => DEFAULT_SERVER_NAME,
            Self::Host => DEFAULT_HOST,
            Self::Port => "5432",
            Self::DatabaseName => DEFAULT_DBNAME,
            Self::User => DEFAULT_USER,
            Self::Password => "",
            Self::Enabled => "true",
            Self::LocalSchema => DEFAULT_LOCAL_SCHEMA,
        }
    }
}

impl fmt::Display for FdwSettingKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Desired connection to the remote database.
///
/// Built fresh from configuration for every reconciliation attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConnectionConfig {
    server_name: ForeignServerName,
    host: String,
    port: u16,
    dbname: String,
    user: String,
    password: String,
}

impl RemoteConnectionConfig {
    /// Creates a configuration for `server_name` with default connection
    /// values.
    #[must_use]
    pub fn new(server_name: ForeignServerName) -> Self {
        Self {
            server_name,
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            dbname: DEFAULT_DBNAME.to_owned(),
            user: DEFAULT_USER.to_owned(),
            password: String::new(),
        }
    }

    /// Sets the remote host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the remote port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the remote database name.
    #[must_use]
    pub fn with_dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = dbname.into();
        self
    }

    /// Sets the remote role.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Sets the remote role password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Returns the foreign server name.
    #[must_use]
    pub const fn server_name(&self) -> &ForeignServerName {
        &self.server_name
    }

    /// Returns the remote host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the remote port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the remote database name.
    #[must_use]
    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    /// Returns the remote role.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the remote role password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for RemoteConnectionConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RemoteConnectionConfig")
            .field("server_name", &self.server_name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Complete reconciler settings: connection, activation flag, and local
/// schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdwSettings {
    connection: RemoteConnectionConfig,
    enabled: bool,
    local_schema: String,
}

impl FdwSettings {
    /// Creates enabled settings importing into the default local schema.
    #[must_use]
    pub fn new(connection: RemoteConnectionConfig) -> Self {
        Self {
            connection,
            enabled: true,
            local_schema: DEFAULT_LOCAL_SCHEMA.to_owned(),
        }
    }

    /// Sets whether the startup hook runs reconciliation.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the local schema receiving imported foreign tables.
    ///
    /// # Errors
    ///
    /// Returns [`FdwDomainError::EmptySchemaName`] when the trimmed schema
    /// name is empty.
    pub fn with_local_schema(mut self, schema: impl Into<String>) -> Result<Self, FdwDomainError> {
        let raw = schema.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FdwDomainError::EmptySchemaName);
        }
        self.local_schema = trimmed.to_owned();
        Ok(self)
    }

    /// Returns the desired remote connection.
    #[must_use]
    pub const fn connection(&self) -> &RemoteConnectionConfig {
        &self.connection
    }

    /// Returns whether the startup hook runs reconciliation.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the local schema name.
    #[must_use]
    pub fn local_schema(&self) -> &str {
        &self.local_schema
    }
}
