//! Upstream credential management: token cache, single-flight refresh, and
//! identity rotation.
//!
//! Responsibilities:
//! - Cache one token per identity and hand it out while it is live.
//! - Refresh expired tokens against the upstream auth endpoint, with at most
//!   one upstream call per identity and expiry cycle regardless of how many
//!   requests are waiting.
//! - Rotate to lower-priority identities when a refresh fails, with a
//!   cooldown so a dead identity is not hammered.

pub mod manager;
pub mod refresh;
pub mod singleflight;
pub mod store;

pub use manager::TokenManager;
pub use refresh::HttpRefreshClient;
pub use singleflight::SingleFlight;
pub use store::TokenStore;
