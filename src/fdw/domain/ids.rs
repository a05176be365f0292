//! Validated name type for foreign servers.

use super::FdwDomainError;
use std::fmt;

/// Name of a foreign server entry in `pg_foreign_server`.
///
/// The name is trimmed but otherwise kept verbatim. Names that are not plain
/// SQL identifiers are quoted when interpolated into statements, so no
/// character set restriction applies here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignServerName(String);

impl ForeignServerName {
    /// Creates a validated foreign server name.
    ///
    /// # Errors
    ///
    /// Returns [`FdwDomainError::EmptyServerName`] when the trimmed value is
    /// empty.
    pub fn new(value: impl Into<String>) -> Result<Self, FdwDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FdwDomainError::EmptyServerName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the server name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ForeignServerName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ForeignServerName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
