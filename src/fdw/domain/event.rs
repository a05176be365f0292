//! Operational events emitted while reconciling.

use super::{ForeignServerName, ReconciliationResult};
use std::fmt;

/// Severity of an [`FdwEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FdwEventLevel {
    /// Routine progress.
    Info,
    /// A failed operation.
    Error,
}

/// Event recorded through the activity log port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdwEvent {
    /// The startup hook is switched off by configuration.
    Disabled,
    /// Provisioning of a new server started.
    Creating {
        /// Server name.
        server: ForeignServerName,
    },
    /// Provisioning committed.
    Created {
        /// Server name.
        server: ForeignServerName,
    },
    /// Provisioning rolled back.
    CreateFailed {
        /// Server name.
        server: ForeignServerName,
        /// Failure description.
        reason: String,
    },
    /// Updating an existing server started.
    Updating {
        /// Server name.
        server: ForeignServerName,
    },
    /// Update committed.
    Updated {
        /// Server name.
        server: ForeignServerName,
    },
    /// Update rolled back.
    UpdateFailed {
        /// Server name.
        server: ForeignServerName,
        /// Failure description.
        reason: String,
    },
    /// A foreign schema import completed.
    SchemaImported {
        /// Remote schema name.
        remote_schema: String,
        /// Local schema name.
        local_schema: String,
    },
    /// The startup hook finished reconciling.
    Synchronised {
        /// Reported outcome.
        result: ReconciliationResult,
    },
    /// The startup hook caught a reconciliation failure.
    SyncFailed {
        /// Failure description.
        reason: String,
    },
}

impl FdwEvent {
    /// Returns the event severity.
    #[must_use]
    pub const fn level(&self) -> FdwEventLevel {
        match self {
            Self::CreateFailed { .. } | Self::UpdateFailed { .. } | Self::SyncFailed { .. } => {
                FdwEventLevel::Error
            }
            _ => FdwEventLevel::Info,
        }
    }

    /// Returns the server the event concerns, when there is one.
    #[must_use]
    pub const fn server(&self) -> Option<&ForeignServerName> {
        match self {
            Self::Creating { server }
            | Self::Created { server }
            | Self::CreateFailed { server, .. }
            | Self::Updating { server }
            | Self::Updated { server }
            | Self::UpdateFailed { server, .. } => Some(server),
            _ => None,
        }
    }
}

impl fmt::Display for FdwEvent {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => formatter.write_str(
                "foreign server reconciliation is disabled (AUTR_FDW_ENABLED=false)",
            ),
            Self::Creating { server } => write!(formatter, "creating foreign server '{server}'"),
            Self::Created { server } => write!(formatter, "created foreign server '{server}'"),
            Self::CreateFailed { server, reason } => {
                write!(formatter, "failed to create foreign server '{server}': {reason}")
            }
            Self::Updating { server } => write!(formatter, "updating foreign server '{server}'"),
            Self::Updated { server } => write!(formatter, "updated foreign server '{server}'"),
            Self::UpdateFailed { server, reason } => {
                write!(formatter, "failed to update foreign server '{server}': {reason}")
            }
            Self::SchemaImported {
                remote_schema,
                local_schema,
            } => write!(
                formatter,
                "imported foreign schema {remote_schema} into {local_schema}"
            ),
            Self::Synchronised { result } => {
                write!(formatter, "foreign server synchronisation finished: {result}")
            }
            Self::SyncFailed { reason } => {
                write!(formatter, "foreign server synchronisation failed: {reason}")
            }
        }
    }
}
