//! Finding a Go SDK that satisfies a set of predicates.
//!
//! Strategies are tried in order; the first candidate accepted by every
//! predicate wins. The default order is:
//!
//! 1. [`PathScan`]: `go` on the `PATH`
//! 2. [`EnvRootScan`]: `$GOROOT/bin/go`
//! 3. [`DownloadDiscovery`]: the pinned (or default) version from the cache,
//!    downloading it if needed
//!
//! A strategy that finds nothing reports [`SdkError::NoSdk`] and the next one
//! is tried. Any other error ends the search.
//!
//! # Examples
//!
//! ```no_run
//! use gosdk::{Settings, discovery, predicate};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let sdk = discovery::discover(&settings, &[predicate::is_min_version("1.14")]).await?;
//!     println!("Using {}", sdk);
//!     Ok(())
//! }
//! ```

use crate::download::DownloadDiscovery;
use crate::error::{ErrorKind, Result, SdkError};
use crate::evaluate;
use crate::http::Pipeline;
use crate::predicate::Predicate;
use crate::sdk::Sdk;
use crate::settings::Settings;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// A source of SDK candidates.
pub trait Discovery: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Zero or more candidates, or [`SdkError::NoSdk`] if this source has
    /// nothing to offer.
    fn discover(&self) -> BoxFuture<'_, Result<Vec<Sdk>>>;
}

/// `go` found on a search path.
#[derive(Debug, Clone, Default)]
pub struct PathScan {
    search_path: Option<OsString>,
}

impl PathScan {
    /// Scan the process `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `search_path` instead of the process `PATH`.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl Discovery for PathScan {
    fn name(&self) -> &str {
        "PATH"
    }

    fn discover(&self) -> BoxFuture<'_, Result<Vec<Sdk>>> {
        async move {
            let found = evaluate::eval_from_path(self.search_path.as_deref())?;
            Ok(found.into_iter().collect())
        }
        .boxed()
    }
}

/// `<root>/bin/go` for a root taken from `GOROOT`.
#[derive(Debug, Clone, Default)]
pub struct EnvRootScan {
    root: Option<PathBuf>,
}

impl EnvRootScan {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }
}

impl Discovery for EnvRootScan {
    fn name(&self) -> &str {
        "GOROOT"
    }

    fn discover(&self) -> BoxFuture<'_, Result<Vec<Sdk>>> {
        async move {
            let root = self.root.as_ref().ok_or(SdkError::NoSdk)?;
            Ok(vec![evaluate::eval_from_root(root)?])
        }
        .boxed()
    }
}

/// Adapts a closure into a [`Discovery`].
pub struct DiscoveryFn<F> {
    name: String,
    discover: F,
}

/// Build a [`Discovery`] from a synchronous closure.
pub fn from_fn<F>(name: &str, discover: F) -> DiscoveryFn<F>
where
    F: Fn() -> Result<Vec<Sdk>> + Send + Sync,
{
    DiscoveryFn {
        name: name.to_string(),
        discover,
    }
}

impl<F> Discovery for DiscoveryFn<F>
where
    F: Fn() -> Result<Vec<Sdk>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(&self) -> BoxFuture<'_, Result<Vec<Sdk>>> {
        futures::future::ready((self.discover)()).boxed()
    }
}

/// PATH, then GOROOT, then download, configured from `settings`.
pub fn default_discoveries(
    settings: &Settings,
    pipeline: Arc<Pipeline>,
) -> Result<Vec<Box<dyn Discovery>>> {
    let path_scan = match &settings.search_path {
        Some(search_path) => PathScan::with_search_path(search_path.clone()),
        None => PathScan::new(),
    };
    Ok(vec![
        Box::new(path_scan),
        Box::new(EnvRootScan::new(settings.goroot.clone())),
        Box::new(DownloadDiscovery::from_settings(settings, pipeline)?),
    ])
}

/// Discover with [`default_discoveries`] and a default [`Pipeline`].
pub async fn discover(settings: &Settings, predicates: &[Predicate]) -> Result<Sdk> {
    let discoveries = default_discoveries(settings, Arc::new(Pipeline::new()))?;
    discover_using(&discoveries, predicates).await
}

/// Return the first candidate, in strategy order then candidate order, that
/// every predicate accepts.
pub async fn discover_using(
    discoveries: &[Box<dyn Discovery>],
    predicates: &[Predicate],
) -> Result<Sdk> {
    for discovery in discoveries {
        let candidates = match discovery.discover().await {
            Ok(candidates) => candidates,
            Err(e) if e.kind() == ErrorKind::NoSdk => {
                debug!("{}: no SDK", discovery.name());
                continue;
            }
            Err(e) => return Err(e),
        };

        for candidate in candidates {
            if all_match(predicates, &candidate)? {
                debug!("{}: using {}", discovery.name(), candidate);
                return Ok(candidate);
            }
            debug!("{}: {} does not match", discovery.name(), candidate);
        }
    }
    Err(SdkError::NoSdk)
}

/// Every predicate is evaluated even after one rejects the candidate.
fn all_match(predicates: &[Predicate], candidate: &Sdk) -> Result<bool> {
    let mut all = true;
    for predicate in predicates {
        if !predicate.matches(candidate)? {
            all = false;
        }
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{is_max_version, is_min_version};
    use semver::Version;

    fn sdk(version: &str) -> Sdk {
        Sdk {
            version: crate::version::parse_tolerant(version).unwrap(),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            root: PathBuf::from(format!("/opt/go{}", version)),
            binary: PathBuf::from(format!("/opt/go{}/bin/go", version)),
        }
    }

    #[tokio::test]
    async fn test_empty_predicates_take_first_candidate() {
        let discoveries: Vec<Box<dyn Discovery>> =
            vec![Box::new(from_fn("a", || Ok(vec![sdk("1.10"), sdk("1.16")])))];
        let found = discover_using(&discoveries, &[]).await.unwrap();
        assert_eq!(found.version, Version::new(1, 10, 0));
    }

    #[tokio::test]
    async fn test_no_strategies_is_no_sdk() {
        let err = discover_using(&[], &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSdk);
    }

    #[tokio::test]
    async fn test_all_predicates_must_match() {
        let discoveries: Vec<Box<dyn Discovery>> = vec![Box::new(from_fn("a", || {
            Ok(vec![sdk("1.12"), sdk("1.15"), sdk("1.18")])
        }))];
        let predicates = [is_min_version("1.14"), is_max_version("1.16")];
        let found = discover_using(&discoveries, &predicates).await.unwrap();
        assert_eq!(found.version, Version::new(1, 15, 0));
    }

    #[tokio::test]
    async fn test_predicate_error_aborts() {
        let discoveries: Vec<Box<dyn Discovery>> =
            vec![Box::new(from_fn("a", || Ok(vec![sdk("1.12")])))];
        let err = discover_using(&discoveries, &[is_min_version("nope")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_env_root_scan_without_root() {
        let err = EnvRootScan::new(None).discover().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSdk);
    }

    #[tokio::test]
    async fn test_path_scan_on_empty_path() {
        let dir = tempfile::tempdir().unwrap();
        let found = PathScan::with_search_path(dir.path()).discover().await.unwrap();
        assert!(found.is_empty());
    }
}
