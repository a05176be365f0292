//! Activity log adapter emitting `tracing` events.

use crate::fdw::{
    domain::{FdwEvent, FdwEventLevel},
    ports::ActivityLog,
};

/// Forwards reconciliation events to the global `tracing` dispatcher.
///
/// Events carry a `server` field when they concern a single foreign server.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingActivityLog;

impl TracingActivityLog {
    /// Creates the adapter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ActivityLog for TracingActivityLog {
    fn record(&self, event: &FdwEvent) {
        let server = event.server().map(|name| name.as_str());
        match (event.level(), server) {
            (FdwEventLevel::Info, Some(server)) => {
                tracing::info!(target: "fdw", server, "{event}");
            }
            (FdwEventLevel::Info, None) => tracing::info!(target: "fdw", "{event}"),
            (FdwEventLevel::Error, Some(server)) => {
                tracing::error!(target: "fdw", server, "{event}");
            }
            (FdwEventLevel::Error, None) => tracing::error!(target: "fdw", "{event}"),
        }
    }
}
