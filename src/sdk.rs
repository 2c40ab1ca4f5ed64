//! The Go SDK value type.
//!
//! An [`Sdk`] describes one installation: its version, the platform it was
//! built for, its root directory and the `go` executable inside `root/bin`.
//! Values are produced by discovery strategies and handed to the caller, who
//! uses [`Sdk::env_vars`] to prepare the environment of the build it delegates
//! to.

use crate::error::{ErrorKind, Result, SdkError};
use crate::evaluate;
use semver::Version;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A Go toolchain installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sdk {
    pub version: Version,
    pub os: String,
    pub arch: String,
    pub root: PathBuf,
    pub binary: PathBuf,
}

impl Sdk {
    /// Re-evaluate [`Sdk::binary`] and check it still reports the same
    /// version and platform.
    ///
    /// Returns [`SdkError::SdkDifferent`] if the binary disappeared, is no
    /// longer a go binary, or reports something else. Any other failure
    /// (e.g. the binary exists but cannot be executed) is returned as-is.
    pub fn validate(&self) -> Result<()> {
        let observed = match evaluate::eval_go_binary(&self.binary) {
            Ok(sdk) => sdk,
            Err(e) if e.kind() == ErrorKind::NoBinary => return Err(SdkError::SdkDifferent),
            Err(e) => return Err(e),
        };

        if observed.version != self.version || observed.os != self.os || observed.arch != self.arch
        {
            return Err(SdkError::SdkDifferent);
        }
        Ok(())
    }

    /// Directory holding the `go` executable.
    pub fn bin_dir(&self) -> &Path {
        self.binary.parent().unwrap_or(&self.root)
    }

    /// Environment a build using this SDK should run with: `GOROOT` and a
    /// `PATH` with [`Sdk::bin_dir`] prepended to `current_path`.
    pub fn env_vars(&self, current_path: Option<OsString>) -> Result<Vec<(String, OsString)>> {
        let mut entries = vec![self.bin_dir().to_path_buf()];
        if let Some(current) = current_path {
            entries.extend(std::env::split_paths(&current));
        }
        let path = std::env::join_paths(entries).map_err(|e| {
            SdkError::io(
                "cannot build PATH",
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?;

        Ok(vec![
            ("GOROOT".to_string(), self.root.clone().into_os_string()),
            ("PATH".to_string(), path),
        ])
    }
}

impl std::fmt::Display for Sdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "go{} {}/{} ({})",
            crate::version::canonical(&self.version),
            self.os,
            self.arch,
            self.root.display()
        )
    }
}
