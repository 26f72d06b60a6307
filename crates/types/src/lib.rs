//! Core types and traits for the streamgate workspace.
//!
//! This crate defines the shared abstractions used across all layers of the
//! streamgate gateway core, including the error type, credential identities,
//! cached tokens, outbound event representations, and the async traits that
//! each layer implements.

pub mod error;
pub mod event;
pub mod identity;
pub mod token;
pub mod traits;

pub use error::{CorruptReason, GatewayError};
pub use event::{EventKind, OutboundEvent};
pub use identity::{CredentialIdentity, IdentityId};
pub use token::CachedToken;
pub use traits::{ByteStream, EventSink, RefreshClient, Result};
