//! Create/update/skip decision for a reconciliation run.

use super::{ConfigFingerprint, ServerStatus};

/// Action chosen by comparing catalog state with the stored fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcileAction {
    /// The server does not exist and must be provisioned.
    Create,
    /// The server exists but was applied from different or unknown settings.
    Update,
    /// The server exists and matches the desired settings.
    Skip,
}

impl ReconcileAction {
    /// Chooses the action for `status`, the `stored` fingerprint (if any),
    /// and the `current` fingerprint.
    ///
    /// A missing server is always created, regardless of any stored record.
    #[must_use]
    pub fn decide(
        status: &ServerStatus,
        stored: Option<&ConfigFingerprint>,
        current: &ConfigFingerprint,
    ) -> Self {
        if !status.exists() {
            return Self::Create;
        }
        if stored == Some(current) {
            Self::Skip
        } else {
            Self::Update
        }
    }
}
