//! Upstream credential identity records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one configured credential identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    /// Creates an identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One configured upstream account: refresh endpoint, material, and priority.
///
/// Immutable after load; owned by the token manager's configuration list.
/// Rotation state (cooldown marks) lives in the manager, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialIdentity {
    /// Stable identifier, unique within the configuration.
    pub id: IdentityId,
    /// Upstream auth endpoint the refresh request is sent to.
    pub token_url: String,
    /// OAuth client identifier sent with the refresh request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Long-lived refresh material exchanged for short-lived access tokens.
    pub refresh_token: String,
    /// Identities with lower values are tried first (defaults to 0).
    #[serde(default)]
    pub priority: u32,
}
