//! Keyed configuration lookup port.

/// Source of raw configuration values.
///
/// Values are read on every reconciliation; implementations should not
/// cache them on the reconciler's behalf.
pub trait ConfigSource: Send + Sync {
    /// Returns the raw value for `key`, or `None` when it is not set.
    fn get(&self, key: &str) -> Option<String>;
}
