//! Downloading a Go SDK into the per-user cache.
//!
//! [`DownloadDiscovery`] is the last resort of discovery: it synthesizes the
//! SDK it wants (`<cache>/pkg/sdk/<version>.<os>-<arch>`), reuses it if a
//! previous run already installed it, and otherwise downloads the official
//! archive and unpacks it there.
//!
//! Everything that names things (target directory, URL, the synthesized
//! [`Sdk`]) is pure and needs neither network nor disk.

use crate::discovery::Discovery;
use crate::error::{ErrorKind, Result, SdkError};
use crate::extract::{self, ArchiveFormat};
use crate::http::{self, Pipeline};
use crate::platform;
use crate::sdk::Sdk;
use crate::settings::Settings;
use crate::version;
use futures::FutureExt;
use futures::future::BoxFuture;
use indicatif::{ProgressBar, ProgressStyle};
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Version downloaded when nothing pins one.
pub const DEFAULT_VERSION: &str = "1.14";

/// Where the Go project publishes its archives.
pub const DEFAULT_BASE_URL: &str = "https://dl.google.com/go";

/// Downloads `go<version>.<os>-<arch>` unless it is already cached.
#[derive(Debug, Clone)]
pub struct DownloadDiscovery {
    pub version: Version,
    pub os: String,
    pub arch: String,
    pub cache_root: PathBuf,
    pub base_url: String,
    /// Compare the archive against the published `.sha256` before unpacking.
    pub verify_checksum: bool,
    /// Show a progress bar while downloading.
    pub show_progress: bool,
    pipeline: Arc<Pipeline>,
}

impl DownloadDiscovery {
    /// Target `version` for the host platform, cached under `cache_root`.
    pub fn new(version: &str, cache_root: impl Into<PathBuf>, pipeline: Arc<Pipeline>) -> Result<Self> {
        Ok(Self {
            version: version::parse_tolerant(version)?,
            os: platform::host_os().to_string(),
            arch: platform::host_arch().to_string(),
            cache_root: cache_root.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_checksum: false,
            show_progress: false,
            pipeline,
        })
    }

    /// Target the version, platform, cache and mirror named by `settings`.
    pub fn from_settings(settings: &Settings, pipeline: Arc<Pipeline>) -> Result<Self> {
        let mut discovery = Self::new(&settings.version, &settings.cache_root, pipeline)?;
        discovery.os = settings.os.clone();
        discovery.arch = settings.arch.clone();
        discovery.base_url = settings.download_base.clone();
        discovery.verify_checksum = settings.verify_checksum;
        discovery.show_progress = settings.show_progress;
        Ok(discovery)
    }

    pub fn with_platform(mut self, os: &str, arch: &str) -> Self {
        self.os = os.to_string();
        self.arch = arch.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// `1.14` for patch zero, `1.14.2` otherwise.
    pub fn version_string(&self) -> String {
        version::canonical(&self.version)
    }

    /// `<version>.<os>-<arch>`, e.g. `1.21.5.linux-amd64`.
    pub fn target_name(&self) -> String {
        format!("{}.{}-{}", self.version_string(), self.os, self.arch)
    }

    pub fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::for_os(&self.os)
    }

    /// `<cache_root>/pkg/sdk/<target_name>`
    pub fn target_path(&self) -> PathBuf {
        self.cache_root.join("pkg").join("sdk").join(self.target_name())
    }

    /// `<base_url>/go<target_name>.<zip|tar.gz>`
    pub fn download_url(&self) -> String {
        format!(
            "{}/go{}.{}",
            self.base_url.trim_end_matches('/'),
            self.target_name(),
            self.archive_format().extension()
        )
    }

    pub fn checksum_url(&self) -> String {
        format!("{}.sha256", self.download_url())
    }

    /// The SDK this discovery produces once downloaded.
    pub fn to_sdk(&self) -> Sdk {
        let root = self.target_path();
        let binary = root
            .join("bin")
            .join(format!("go{}", platform::exe_suffix(&self.os)));
        Sdk {
            version: self.version.clone(),
            os: self.os.clone(),
            arch: self.arch.clone(),
            root,
            binary,
        }
    }

    /// Reuse the cached SDK if it is intact, otherwise download and unpack it.
    pub async fn ensure(&self) -> Result<Sdk> {
        let candidate = self.to_sdk();

        match candidate.validate() {
            Ok(()) => {
                debug!("Reusing cached SDK at {}", candidate.root.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::SdkDifferent => {}
            Err(e) => return Err(e),
        }

        let url = self.download_url();
        info!("Downloading Go SDK from {}...", url);

        let parent = candidate
            .root
            .parent()
            .unwrap_or(&self.cache_root)
            .to_path_buf();
        fs::create_dir_all(&parent)
            .map_err(|e| SdkError::io(format!("cannot create '{}'", parent.display()), e))?;

        // Removed on drop, whether or not extraction succeeds.
        let archive = tempfile::Builder::new()
            .prefix(&format!("{}.", self.target_name()))
            .suffix(&format!(".{}", self.archive_format().extension()))
            .tempfile_in(&parent)
            .map_err(|e| SdkError::io(format!("cannot create temporary file in '{}'", parent.display()), e))?;

        let progress = self.show_progress.then(|| self.progress_bar());
        self.pipeline
            .execute(
                &url,
                &[http::write_to_file(archive.path(), 0o600, progress)],
            )
            .await?;

        if self.verify_checksum {
            self.verify(archive.path()).await?;
        }

        extract::extract(archive.path(), &candidate)?;
        info!("Installed go{} to {}", self.version_string(), candidate.root.display());
        Ok(candidate)
    }

    async fn verify(&self, archive: &Path) -> Result<()> {
        let url = self.checksum_url();
        let sink = Arc::new(Mutex::new(Vec::new()));
        self.pipeline
            .execute(&url, &[http::write_to(sink.clone())])
            .await?;

        let published = {
            let buffer = sink.lock().map_err(|_| SdkError::Archive {
                archive: archive.to_path_buf(),
                reason: "checksum buffer poisoned".to_string(),
            })?;
            String::from_utf8_lossy(&buffer)
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase()
        };

        let actual = sha256_file(archive)?;
        if actual != published {
            return Err(SdkError::Archive {
                archive: archive.to_path_buf(),
                reason: format!("checksum mismatch: expected {}, got {}", published, actual),
            });
        }
        debug!("Checksum verified: {}", actual);
        Ok(())
    }

    fn progress_bar(&self) -> ProgressBar {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("⬇ go{}", self.version_string()));
        pb
    }
}

impl Discovery for DownloadDiscovery {
    fn name(&self) -> &str {
        "download"
    }

    fn discover(&self) -> BoxFuture<'_, Result<Vec<Sdk>>> {
        async move { Ok(vec![self.ensure().await?]) }.boxed()
    }
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};

    let mut file = fs::File::open(path)
        .map_err(|e| SdkError::io(format!("cannot open '{}'", path.display()), e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .map_err(|e| SdkError::io(format!("cannot read '{}'", path.display()), e))?;
    Ok(format!("{:x}", hasher.finalize()))
}
