//! Activity log that keeps events in memory.

use crate::fdw::{
    domain::{FdwEvent, FdwEventLevel},
    ports::ActivityLog,
};
use std::sync::{Arc, Mutex, PoisonError};

/// Activity log capturing every recorded event.
#[derive(Debug, Clone, Default)]
pub struct RecordingActivityLog {
    events: Arc<Mutex<Vec<FdwEvent>>>,
}

impl RecordingActivityLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in order.
    #[must_use]
    pub fn events(&self) -> Vec<FdwEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded events of the given severity.
    #[must_use]
    pub fn events_at(&self, level: FdwEventLevel) -> Vec<FdwEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level() == level)
            .collect()
    }
}

impl ActivityLog for RecordingActivityLog {
    fn record(&self, event: &FdwEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
