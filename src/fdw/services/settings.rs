//! Resolution of reconciler settings from a configuration source.

use crate::fdw::{
    domain::{
        FdwDomainError, FdwSettingKey, FdwSettings, ForeignServerName, RemoteConnectionConfig,
    },
    ports::ConfigSource,
};

/// Builds [`FdwSettings`] from `source`.
///
/// Unset and blank keys resolve to [`FdwSettingKey::default_value`]. The
/// enabled flag is only switched off by the exact value `false`.
///
/// # Errors
///
/// Returns [`FdwDomainError::InvalidPort`] when the port is not a valid
/// `u16`, and name validation errors for blank server or schema names.
pub fn load_settings<S>(source: &S) -> Result<FdwSettings, FdwDomainError>
where
    S: ConfigSource + ?Sized,
{
    let server_name = ForeignServerName::new(lookup(source, FdwSettingKey::ServerName))?;
    let raw_port = lookup(source, FdwSettingKey::Port);
    let port = raw_port
        .trim()
        .parse::<u16>()
        .map_err(|_| FdwDomainError::InvalidPort(raw_port.clone()))?;

    let connection = RemoteConnectionConfig::new(server_name)
        .with_host(lookup(source, FdwSettingKey::Host))
        .with_port(port)
        .with_dbname(lookup(source, FdwSettingKey::DatabaseName))
        .with_user(lookup(source, FdwSettingKey::User))
        .with_password(lookup(source, FdwSettingKey::Password));

    let enabled = lookup(source, FdwSettingKey::Enabled) != "false";

    FdwSettings::new(connection)
        .with_enabled(enabled)
        .with_local_schema(lookup(source, FdwSettingKey::LocalSchema))
}

fn lookup<S>(source: &S, key: FdwSettingKey) -> String
where
    S: ConfigSource + ?Sized,
{
    source
        .get(key.as_str())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| key.default_value().to_owned())
}
