//! Cached upstream access token and expiry logic.

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// A short-lived bearer token obtained from the upstream auth endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    /// Opaque token value sent as the bearer credential.
    pub value: String,
    /// Unix timestamp (seconds) at which the token was issued.
    pub issued_at: u64,
    /// Unix timestamp (seconds) at which the token hard-expires.
    pub expires_at: u64,
}

impl CachedToken {
    /// Creates a token that expires `expires_in_secs` seconds from now.
    pub fn new(value: impl Into<String>, expires_in_secs: u64) -> Self {
        let now = unix_now();
        Self {
            value: value.into(),
            issued_at: now,
            expires_at: now.saturating_add(expires_in_secs),
        }
    }

    /// Creates a token with an absolute expiry timestamp.
    pub fn with_expires_at(value: impl Into<String>, expires_at: u64) -> Self {
        Self {
            value: value.into(),
            issued_at: unix_now(),
            expires_at,
        }
    }

    /// Returns `true` while the token has more than `margin` of lifetime left.
    ///
    /// Tokens inside the margin are treated as already expired so refresh
    /// happens before the hard expiry is reached.
    #[must_use]
    pub fn is_live(&self, margin: Duration) -> bool {
        unix_now().saturating_add(margin.as_secs()) < self.expires_at
    }
}
