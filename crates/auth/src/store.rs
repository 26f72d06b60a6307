//! In-memory token cache with a proactive refresh margin.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use streamgate_types::{CachedToken, IdentityId};

/// Default safety margin subtracted from a token's lifetime.
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_secs(60);

/// Thread-safe cache of one token per identity. No I/O.
///
/// A stored token is only returned while it has more than the safety margin
/// of lifetime left, so callers refresh before the hard expiry is reached.
pub struct TokenStore {
    entries: Mutex<HashMap<IdentityId, CachedToken>>,
    margin: Duration,
}

impl TokenStore {
    /// Creates an empty store with the given safety margin.
    #[must_use]
    pub fn new(margin: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            margin,
        }
    }

    /// Returns the live token for an identity, or `None` on a miss.
    ///
    /// A token inside the safety margin counts as a miss.
    #[must_use]
    pub fn get(&self, id: &IdentityId) -> Option<CachedToken> {
        self.entries
            .lock()
            .unwrap()
            .get(id)
            .filter(|token| token.is_live(self.margin))
            .cloned()
    }

    /// Stores (or replaces) the token for an identity.
    pub fn put(&self, id: IdentityId, token: CachedToken) {
        self.entries.lock().unwrap().insert(id, token);
    }

    /// Drops the token for an identity, forcing the next `get` to miss.
    pub fn invalidate(&self, id: &IdentityId) {
        self.entries.lock().unwrap().remove(id);
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> IdentityId {
        IdentityId::new(s)
    }

    #[test]
    fn test_put_and_get() {
        let store = TokenStore::default();
        store.put(id("a"), CachedToken::new("tok-a", 3600));
        let got = store.get(&id("a")).unwrap();
        assert_eq!(got.value, "tok-a");
    }

    #[test]
    fn test_get_missing() {
        let store = TokenStore::default();
        assert!(store.get(&id("nobody")).is_none());
    }

    #[test]
    fn test_token_inside_margin_is_a_miss() {
        let store = TokenStore::default();
        // 30 s of lifetime left, 60 s margin: must be treated as expired.
        store.put(id("a"), CachedToken::new("tok", 30));
        assert!(store.get(&id("a")).is_none());
    }

    #[test]
    fn test_zero_margin_keeps_short_tokens_live() {
        let store = TokenStore::new(Duration::ZERO);
        store.put(id("a"), CachedToken::new("tok", 30));
        assert!(store.get(&id("a")).is_some());
    }

    #[test]
    fn test_invalidate() {
        let store = TokenStore::default();
        store.put(id("a"), CachedToken::new("tok", 3600));
        store.invalidate(&id("a"));
        assert!(store.get(&id("a")).is_none());
    }

    #[test]
    fn test_overwrite() {
        let store = TokenStore::default();
        store.put(id("a"), CachedToken::new("first", 3600));
        store.put(id("a"), CachedToken::new("second", 3600));
        assert_eq!(store.get(&id("a")).unwrap().value, "second");
    }

    #[test]
    fn test_identities_are_independent() {
        let store = TokenStore::default();
        store.put(id("a"), CachedToken::new("tok-a", 3600));
        store.put(id("b"), CachedToken::new("tok-b", 3600));
        store.invalidate(&id("a"));
        assert!(store.get(&id("a")).is_none());
        assert_eq!(store.get(&id("b")).unwrap().value, "tok-b");
    }
}
