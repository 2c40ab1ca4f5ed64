//! Locate, validate or download a Go SDK.
//!
//! The library answers one question: "which Go toolchain should this build
//! use?". [`discovery::discover`] tries the `PATH`, then `GOROOT`, then the
//! per-user download cache (fetching the archive if needed), and returns the
//! first [`Sdk`] every [`Predicate`] accepts. Callers export
//! [`Sdk::env_vars`] before handing over to the actual build.

pub mod discovery;
pub mod download;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod http;
pub mod platform;
pub mod predicate;
pub mod sdk;
pub mod settings;
pub mod version;

// Re-export commonly used items
pub use discovery::{Discovery, discover, discover_using};
pub use download::DownloadDiscovery;
pub use error::{ErrorKind, HttpError, Result, SdkError};
pub use predicate::{Predicate, is_max_version, is_min_version, is_version};
pub use sdk::Sdk;
pub use settings::Settings;
