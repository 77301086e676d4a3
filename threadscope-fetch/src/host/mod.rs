//! Host transports implementing [`PlatformClient`](crate::client::PlatformClient).
//!
//! - [`bridge`] - HTTP client for a JSON bridge in front of the platform
//! - [`fixture`] - Replays captured payloads from a directory
//! - [`memory`] - In-memory scripted client with call recording

pub mod bridge;
pub mod fixture;
pub mod memory;

// Re-export key types
pub use bridge::{BridgeClient, ResponseExt};
pub use fixture::FixtureClient;
pub use memory::{MemoryClient, MemoryFailure, Operation};
