//! Command implementations for the gosdk CLI
//!
//! - **discover**: print the SDK discovery settles on
//! - **shellenv**: print shell exports for that SDK
//! - **exec**: run a command inside that SDK's environment
//! - **url**: print the distribution URL for a version/platform

pub mod discover;
pub mod exec;
pub mod shellenv;
pub mod url;

pub use discover::discover;
pub use exec::exec;
pub use shellenv::shellenv;
pub use url::url;

use clap::Args;
use gosdk::discovery;
use gosdk::http::Pipeline;
use gosdk::{Predicate, Sdk, Settings, predicate};
use std::io::IsTerminal;
use std::sync::Arc;

/// Selection flags shared by every command that discovers an SDK.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Go version to download when no installed SDK matches (overrides GO_VERSION)
    #[arg(long = "go-version", value_name = "VERSION")]
    pub go_version: Option<String>,

    /// Require exactly this version
    #[arg(long, value_name = "VERSION")]
    pub exact: Option<String>,

    /// Require at least this version
    #[arg(long, value_name = "VERSION")]
    pub min: Option<String>,

    /// Require at most this version
    #[arg(long, value_name = "VERSION")]
    pub max: Option<String>,

    /// Verify the downloaded archive against its published SHA-256
    #[arg(long)]
    pub verify: bool,
}

impl SelectArgs {
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(v) = &self.exact {
            predicates.push(predicate::is_version(v));
        }
        if let Some(v) = &self.min {
            predicates.push(predicate::is_min_version(v));
        }
        if let Some(v) = &self.max {
            predicates.push(predicate::is_max_version(v));
        }
        predicates
    }

    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::from_env()?;
        if let Some(version) = &self.go_version {
            settings.version = version.clone();
        }
        if self.verify {
            settings.verify_checksum = true;
        }
        Ok(settings)
    }
}

/// Run discovery for the CLI, with a download progress bar when stderr is a
/// terminal.
pub(crate) async fn find_sdk(args: &SelectArgs) -> anyhow::Result<Sdk> {
    let mut settings = args.settings()?;
    settings.show_progress = std::io::stderr().is_terminal();

    let discoveries = discovery::default_discoveries(&settings, Arc::new(Pipeline::new()))?;
    let sdk = discovery::discover_using(&discoveries, &args.predicates()).await?;
    Ok(sdk)
}
