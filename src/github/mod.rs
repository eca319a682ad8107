// GitHub API module.
// Provides the upstream client abstraction, the reqwest-backed client and response types.

pub mod client;
pub mod endpoints;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{GitHubClient, Upstream};
pub use types::*;
