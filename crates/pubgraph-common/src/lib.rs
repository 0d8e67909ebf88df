//! pubgraph-common — Shared error type and HTTP plumbing used across all pubgraph crates.

pub mod error;
pub mod sandbox;

pub use error::{PubgraphError, Result};
pub use sandbox::SandboxClient;
