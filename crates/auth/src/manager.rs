//! Token acquisition: cache fast-path, single-flight refresh, rotation.
//!
//! `acquire` walks the identity list in priority order. A live cached token
//! wins immediately with no lock contention; otherwise the identity's
//! refresh is single-flighted so exactly one upstream call happens per
//! expiry cycle no matter how many requests are waiting. Identities whose
//! refresh failed recently are skipped for a cooldown period; when every
//! identity is unusable the caller gets `AuthExhausted`.

use crate::singleflight::SingleFlight;
use crate::store::TokenStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use streamgate_types::{
    CachedToken, CredentialIdentity, GatewayError, IdentityId, RefreshClient, Result,
};

/// Default cooldown for an identity after a failed refresh.
pub const DEFAULT_FAILURE_COOLDOWN: Duration = Duration::from_secs(30);

/// Outcome published to every caller sharing one refresh flight.
type RefreshOutcome = std::result::Result<CachedToken, Arc<GatewayError>>;

/// Issues upstream access tokens, refreshing and rotating as needed.
pub struct TokenManager {
    /// Identities in priority order (sorted at construction).
    identities: Vec<CredentialIdentity>,
    store: Arc<TokenStore>,
    client: Arc<dyn RefreshClient>,
    flights: SingleFlight<IdentityId, RefreshOutcome>,
    /// Per-identity cooldown marks after failed refreshes. Runtime state
    /// scoped to this manager, never persisted.
    cooldowns: Mutex<HashMap<IdentityId, Instant>>,
    failure_cooldown: Duration,
    /// Bound on how long one caller waits for a refresh outcome.
    refresh_wait: Option<Duration>,
}

impl TokenManager {
    /// Creates a manager over the given identities, cache, and refresh client.
    pub fn new(
        mut identities: Vec<CredentialIdentity>,
        store: Arc<TokenStore>,
        client: Arc<dyn RefreshClient>,
    ) -> Self {
        identities.sort_by_key(|identity| identity.priority);
        Self {
            identities,
            store,
            client,
            flights: SingleFlight::new(),
            cooldowns: Mutex::new(HashMap::new()),
            failure_cooldown: DEFAULT_FAILURE_COOLDOWN,
            refresh_wait: None,
        }
    }

    /// Overrides the post-failure cooldown duration.
    #[must_use]
    pub fn with_failure_cooldown(mut self, cooldown: Duration) -> Self {
        self.failure_cooldown = cooldown;
        self
    }

    /// Bounds how long a caller waits for a refresh (its own or a shared
    /// in-flight one) before giving up with `RefreshTimeout`.
    #[must_use]
    pub fn with_refresh_wait(mut self, bound: Duration) -> Self {
        self.refresh_wait = Some(bound);
        self
    }

    /// Returns a live token and the identity it belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AuthExhausted`] when every identity failed
    /// refresh or is cooling down, and [`GatewayError::RefreshTimeout`] when
    /// the configured wait bound elapses before a refresh outcome arrives.
    /// Refresh failures themselves are not retried here beyond the identity
    /// rotation; the caller decides whether to call `acquire` again.
    pub async fn acquire(&self) -> Result<(CachedToken, IdentityId)> {
        for identity in &self.identities {
            if let Some(token) = self.store.get(&identity.id) {
                tracing::debug!(identity = %identity.id, "token cache hit");
                return Ok((token, identity.id.clone()));
            }
            if self.in_cooldown(&identity.id) {
                tracing::debug!(identity = %identity.id, "identity cooling down, skipping");
                continue;
            }
            if let Some(token) = self.refresh_shared(identity).await? {
                return Ok((token, identity.id.clone()));
            }
        }
        Err(GatewayError::AuthExhausted)
    }

    /// Drops the cached token for an identity (e.g. after an upstream 401).
    pub fn invalidate(&self, id: &IdentityId) {
        self.store.invalidate(id);
    }

    /// Runs (or joins) the identity's refresh flight. `Ok(None)` means the
    /// attempt failed and the identity was placed in cooldown; rotation
    /// continues with the next identity.
    async fn refresh_shared(&self, identity: &CredentialIdentity) -> Result<Option<CachedToken>> {
        let flight = self.flights.run(&identity.id, || async {
            self.refresh(identity).await.map_err(Arc::new)
        });
        let outcome = match self.refresh_wait {
            Some(bound) => match tokio::time::timeout(bound, flight).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(GatewayError::RefreshTimeout(identity.id.clone())),
            },
            None => flight.await,
        };
        match outcome {
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(error)) => {
                tracing::warn!(
                    identity = %identity.id,
                    error = %error,
                    "token refresh failed, rotating"
                );
                self.mark_failed(&identity.id);
                Ok(None)
            }
            None => {
                tracing::warn!(identity = %identity.id, "in-flight refresh aborted, rotating");
                self.mark_failed(&identity.id);
                Ok(None)
            }
        }
    }

    async fn refresh(&self, identity: &CredentialIdentity) -> Result<CachedToken> {
        // Re-check the cache now that this caller holds the flight lead: a
        // previous leader may have stored a fresh token between this
        // caller's cache miss and it entering the flight registry.
        if let Some(token) = self.store.get(&identity.id) {
            tracing::debug!(identity = %identity.id, "token cached while joining flight");
            return Ok(token);
        }
        tracing::info!(identity = %identity.id, "refreshing upstream token");
        let token = self.client.refresh(identity).await?;
        self.store.put(identity.id.clone(), token.clone());
        Ok(token)
    }

    fn in_cooldown(&self, id: &IdentityId) -> bool {
        self.cooldowns
            .lock()
            .unwrap()
            .get(id)
            .is_some_and(|until| Instant::now() < *until)
    }

    fn mark_failed(&self, id: &IdentityId) {
        self.cooldowns
            .lock()
            .unwrap()
            .insert(id.clone(), Instant::now() + self.failure_cooldown);
    }
}
