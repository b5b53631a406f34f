//! # Cleep Distrib
//!
//! Build and release automation for the Cleep debian package.
//!
//! The crate has two halves sharing one [`DistribConfig`]:
//!
//! - **[`Builder`]**: runs the packaging toolchain rooted at the project
//!   directory, streams its output to the log and bundles the produced `.deb`
//!   with the installer hooks into a zip archive plus a checksum file.
//! - **[`Publisher`]**: replaces a stale GitHub pre-release (and its tag) for a
//!   version with a fresh one, using the changelog excerpt from the `.changes`
//!   file as the description, and uploads the archive and checksum as assets.
//!
//! ## Usage
//!
//! ```bash
//! cleep_distrib build                # Build the package archive
//! cleep_distrib publish 0.0.20       # Publish a built version
//! cleep_distrib changelog 0.0.20     # Print the changelog excerpt
//! cleep_distrib release 0.0.20       # Build, then publish
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod artifacts;
pub mod builder;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod process;
pub mod publish;

pub use artifacts::ArtifactSet;
pub use builder::{BuildResult, Builder};
pub use cli::Args;
pub use config::{DistribConfig, EnvConfig};
pub use error::{BuildError, DistribError, GitHubError, PublishError, Result};
pub use github::{GitHubClient, NewRelease, ReleaseHost, RemoteRelease, TagRefs, UploadedAsset};
pub use publish::{PublishReport, Publisher};
