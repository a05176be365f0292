//! Configuration fingerprints used to detect connection drift.

use super::{FdwDomainError, ForeignServerName, RemoteConnectionConfig};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Fields covered by the fingerprint, in digest order.
///
/// The server name keys the stored record and is not part of the digest.
#[derive(Serialize)]
struct FingerprintPayload<'a> {
    host: &'a str,
    port: u16,
    dbname: &'a str,
    user: &'a str,
    password: &'a str,
}

/// Hex-encoded SHA-256 digest of the connection-relevant settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint(String);

impl ConfigFingerprint {
    /// Computes the fingerprint of `config`.
    ///
    /// The digest input is the compact JSON object
    /// `{"host":..,"port":..,"dbname":..,"user":..,"password":..}`.
    ///
    /// # Errors
    ///
    /// Returns [`FdwDomainError::FingerprintEncoding`] if the payload cannot
    /// be serialised.
    pub fn compute(config: &RemoteConnectionConfig) -> Result<Self, FdwDomainError> {
        let payload = FingerprintPayload {
            host: config.host(),
            port: config.port(),
            dbname: config.dbname(),
            user: config.user(),
            password: config.password(),
        };
        let encoded = serde_json::to_string(&payload)
            .map_err(|err| FdwDomainError::FingerprintEncoding(err.to_string()))?;
        let digest = Sha256::digest(encoded.as_bytes());
        Ok(Self(digest.iter().map(|byte| format!("{byte:02x}")).collect()))
    }

    /// Wraps a fingerprint read back from storage.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Persisted fingerprint for one foreign server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    server_name: ForeignServerName,
    fingerprint: ConfigFingerprint,
    updated_at: DateTime<Utc>,
}

impl FingerprintRecord {
    /// Creates a record stamped with the current time from `clock`.
    #[must_use]
    pub fn new(
        server_name: ForeignServerName,
        fingerprint: ConfigFingerprint,
        clock: &impl Clock,
    ) -> Self {
        Self {
            server_name,
            fingerprint,
            updated_at: clock.utc(),
        }
    }

    /// Returns the server name keying the record.
    #[must_use]
    pub const fn server_name(&self) -> &ForeignServerName {
        &self.server_name
    }

    /// Returns the stored fingerprint.
    #[must_use]
    pub const fn fingerprint(&self) -> &ConfigFingerprint {
        &self.fingerprint
    }

    /// Returns when the fingerprint was last written.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
