//! Operational logging port.

use crate::fdw::domain::FdwEvent;

/// Sink for operational events.
///
/// Recording is fire-and-forget: implementations must not fail the caller.
pub trait ActivityLog: Send + Sync {
    /// Records a single event.
    fn record(&self, event: &FdwEvent);
}
