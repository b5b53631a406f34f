//! GitHub integration for release operations.
//!
//! The hosting service is reached through two capabilities: [`ReleaseHost`]
//! for releases and assets, and [`TagRefs`] for the low-level tag reference
//! deletion the release API does not cover. [`GitHubClient`] implements both.

mod client;
mod types;

pub use client::{DEFAULT_API_BASE_URL, GitHubClient};
pub use types::{NewRelease, ReleaseHost, RemoteRelease, TagRefs, UploadedAsset};
