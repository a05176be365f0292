//! Catalog status read model for a foreign server.

use serde::Serialize;

/// Connection options recorded on a foreign server entry.
///
/// Keys absent from the catalog are reported as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerOptions {
    /// Remote host.
    pub host: String,
    /// Remote port, as stored in the catalog.
    pub port: String,
    /// Remote database name.
    pub dbname: String,
}

impl ServerOptions {
    /// Parses `srvoptions` entries of the form `key=value`.
    ///
    /// Entries are split at the first `=`, so values may themselves contain
    /// `=`. Entries without a separator and keys other than `host`, `port`
    /// and `dbname` are ignored. When a key repeats, the last entry wins.
    #[must_use]
    pub fn parse<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .fold(Self::default(), |mut options, entry| {
                if let Some((key, value)) = entry.as_ref().split_once('=') {
                    match key {
                        "host" => value.clone_into(&mut options.host),
                        "port" => value.clone_into(&mut options.port),
                        "dbname" => value.clone_into(&mut options.dbname),
                        _ => {}
                    }
                }
                options
            })
    }

    /// Renders the options in `srvoptions` form.
    #[must_use]
    pub fn to_entries(&self) -> Vec<String> {
        vec![
            format!("host={}", self.host),
            format!("port={}", self.port),
            format!("dbname={}", self.dbname),
        ]
    }
}

/// Snapshot of a foreign server's presence in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_config: Option<ServerOptions>,
    user_mapping_exists: bool,
}

impl ServerStatus {
    /// Status of a server with no catalog entry.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            exists: false,
            current_config: None,
            user_mapping_exists: false,
        }
    }

    /// Status of an existing server.
    #[must_use]
    pub const fn present(options: ServerOptions, user_mapping_exists: bool) -> Self {
        Self {
            exists: true,
            current_config: Some(options),
            user_mapping_exists,
        }
    }

    /// Returns whether the server entry exists.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Returns the parsed connection options of an existing server.
    #[must_use]
    pub const fn current_config(&self) -> Option<&ServerOptions> {
        self.current_config.as_ref()
    }

    /// Returns whether the current role has a user mapping on the server.
    #[must_use]
    pub const fn user_mapping_exists(&self) -> bool {
        self.user_mapping_exists
    }
}
