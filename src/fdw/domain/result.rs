//! Outcome of a reconciliation run.

use super::ForeignServerName;
use serde::Serialize;
use std::fmt;

/// Operation performed by a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOperation {
    /// The server, user mapping and local schema were provisioned.
    Created,
    /// Server options and user mapping were replaced.
    Updated,
    /// Nothing changed.
    Skipped,
    /// Reconciliation failed.
    Error,
}

impl ReconcileOperation {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ReconcileOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Report produced once per reconciliation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    success: bool,
    operation: ReconcileOperation,
    message: String,
}

impl ReconciliationResult {
    /// Reports a newly provisioned server.
    #[must_use]
    pub fn created(server: &ForeignServerName) -> Self {
        Self::succeeded(
            ReconcileOperation::Created,
            format!("foreign server '{server}' was created"),
        )
    }

    /// Reports an updated server.
    #[must_use]
    pub fn updated(server: &ForeignServerName) -> Self {
        Self::succeeded(
            ReconcileOperation::Updated,
            format!("foreign server '{server}' settings were updated"),
        )
    }

    /// Reports a server whose settings were already current.
    #[must_use]
    pub fn skipped(server: &ForeignServerName) -> Self {
        Self::succeeded(
            ReconcileOperation::Skipped,
            format!("foreign server '{server}' settings are unchanged; nothing to do"),
        )
    }

    /// Reports a failed run.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            operation: ReconcileOperation::Error,
            message: message.into(),
        }
    }

    fn succeeded(operation: ReconcileOperation, message: String) -> Self {
        Self {
            success: true,
            operation,
            message,
        }
    }

    /// Returns whether the run succeeded.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Returns the operation performed.
    #[must_use]
    pub const fn operation(&self) -> ReconcileOperation {
        self.operation
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.operation, self.message)
    }
}
