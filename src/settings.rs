//! Discovery configuration.
//!
//! All environment lookups happen in [`Settings::from_env`]; the rest of the
//! crate only sees the resulting value, so tests can build one by hand.

use crate::download::{DEFAULT_BASE_URL, DEFAULT_VERSION};
use crate::error::{Result, SdkError};
use crate::platform;
use std::ffi::OsString;
use std::path::PathBuf;

/// Pins the version the download strategy fetches.
pub const ENV_VERSION: &str = "GO_VERSION";
/// Names an existing installation root.
pub const ENV_GOROOT: &str = "GOROOT";
/// Base of the SDK cache (`$GOPATH/pkg/sdk`).
pub const ENV_GOPATH: &str = "GOPATH";
/// Alternative download host, e.g. an internal mirror.
pub const ENV_DOWNLOAD_BASE: &str = "GO_DOWNLOAD_BASE_URL";
/// Set to `1` to verify archive checksums.
pub const ENV_VERIFY: &str = "GO_DOWNLOAD_VERIFY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub version: String,
    pub goroot: Option<PathBuf>,
    pub cache_root: PathBuf,
    pub download_base: String,
    pub os: String,
    pub arch: String,
    /// Search path for the `PATH` strategy; the process `PATH` when `None`.
    pub search_path: Option<OsString>,
    pub verify_checksum: bool,
    /// Show a progress bar while downloading.
    pub show_progress: bool,
}

impl Settings {
    /// Defaults for the host platform with the cache under `cache_root`.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            goroot: None,
            cache_root: cache_root.into(),
            download_base: DEFAULT_BASE_URL.to_string(),
            os: platform::host_os().to_string(),
            arch: platform::host_arch().to_string(),
            search_path: None,
            verify_checksum: false,
            show_progress: false,
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::new(default_cache_root()?);

        if let Some(version) = non_empty_var(ENV_VERSION) {
            settings.version = version;
        }
        settings.goroot = non_empty_var(ENV_GOROOT).map(PathBuf::from);
        if let Some(base) = non_empty_var(ENV_DOWNLOAD_BASE) {
            settings.download_base = base.trim_end_matches('/').to_string();
        }
        settings.verify_checksum = non_empty_var(ENV_VERIFY)
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(false);

        Ok(settings)
    }
}

/// First `GOPATH` entry, else `~/.go`.
fn default_cache_root() -> Result<PathBuf> {
    if let Some(gopath) = std::env::var_os(ENV_GOPATH).filter(|v| !v.is_empty()) {
        if let Some(first) = std::env::split_paths(&gopath).next() {
            return Ok(first);
        }
    }
    dirs::home_dir().map(|home| home.join(".go")).ok_or_else(|| {
        SdkError::io(
            "cannot determine sdk target directory",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory"),
        )
    })
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
