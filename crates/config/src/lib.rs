//! Configuration loading for the streamgate core.
//!
//! Uses figment for YAML-based configuration with sensible defaults. The
//! embedding transport layer loads a [`Config`] once and passes its pieces
//! to the token manager and stream processor at construction time; nothing
//! here is mutated afterwards.

pub mod schema;

pub use schema::{AuthConfig, Config, StreamConfig};
