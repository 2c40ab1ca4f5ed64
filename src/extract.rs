//! Unpacking Go distribution archives into an SDK root.
//!
//! Published Go archives wrap their content in a single `go/` directory:
//!
//! ```text
//! go1.21.5.linux-amd64.tar.gz
//!   go/
//!   go/bin/go
//!   go/src/...
//! ```
//!
//! The wrapping directory is stripped, so `go/bin/go` lands at
//! `<root>/bin/go`. The archive format follows the *target* platform of the
//! SDK (zip for windows, gzip-compressed tar otherwise), not the host, which
//! makes it possible to unpack an SDK for another platform.

use crate::error::{Result, SdkError};
use crate::sdk::Sdk;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Directory every entry of a Go distribution archive is nested in.
pub const WRAPPING_DIR: &str = "go";

const PARENT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Format the Go project publishes for `os`.
    pub fn for_os(os: &str) -> Self {
        if os == "windows" {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::TarGz
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

/// Extract `archive` into `target.root`, picking the format from `target.os`.
pub fn extract(archive: &Path, target: &Sdk) -> Result<()> {
    extract_to(archive, &target.root, ArchiveFormat::for_os(&target.os))
}

pub fn extract_to(archive: &Path, root: &Path, format: ArchiveFormat) -> Result<()> {
    info!(
        "Extracting {:?} archive {} to {}",
        format,
        archive.display(),
        root.display()
    );
    fs::create_dir_all(root)
        .map_err(|e| SdkError::io(format!("cannot create '{}'", root.display()), e))?;
    // Containment checks compare against the resolved root.
    let root = fs::canonicalize(root)
        .map_err(|e| SdkError::io(format!("cannot resolve '{}'", root.display()), e))?;

    match format {
        ArchiveFormat::Zip => extract_zip(archive, &root),
        ArchiveFormat::TarGz => extract_tar_gz(archive, &root),
    }
}

fn extract_zip(archive: &Path, root: &Path) -> Result<()> {
    let file = File::open(archive)
        .map_err(|e| SdkError::io(format!("cannot open '{}'", archive.display()), e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| SdkError::Archive {
        archive: archive.to_path_buf(),
        reason: e.to_string(),
    })?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| SdkError::Archive {
            archive: archive.to_path_buf(),
            reason: e.to_string(),
        })?;
        let name = entry.name().to_string();
        let Some(relative) = strip_wrapping_dir(&name, archive)? else {
            continue;
        };
        let target = root.join(&relative);
        ensure_inside(root, &target, &name, archive)?;

        if entry.is_dir() {
            let mode = entry.unix_mode().unwrap_or(PARENT_DIR_MODE);
            create_dir(&target, mode).map_err(|source| SdkError::Extract {
                entry: name.clone(),
                source,
            })?;
        } else {
            let mode = entry.unix_mode().unwrap_or(DEFAULT_FILE_MODE);
            write_file(&target, mode, &mut entry).map_err(|source| SdkError::Extract {
                entry: name.clone(),
                source,
            })?;
        }
    }

    debug!("ZIP extraction complete");
    Ok(())
}

fn extract_tar_gz(archive: &Path, root: &Path) -> Result<()> {
    let file = File::open(archive)
        .map_err(|e| SdkError::io(format!("cannot open '{}'", archive.display()), e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));

    let entries = tar
        .entries()
        .map_err(|e| SdkError::io(format!("cannot read '{}'", archive.display()), e))?;
    for entry in entries {
        let mut entry =
            entry.map_err(|e| SdkError::io(format!("cannot read '{}'", archive.display()), e))?;
        let name = entry
            .path()
            .map_err(|e| SdkError::io(format!("cannot read '{}'", archive.display()), e))?
            .to_string_lossy()
            .into_owned();
        let Some(relative) = strip_wrapping_dir(&name, archive)? else {
            continue;
        };
        let target = root.join(&relative);
        let header = entry.header();
        let entry_type = header.entry_type();
        let mode = header.mode().unwrap_or(DEFAULT_FILE_MODE);

        let outcome = if entry_type.is_dir() {
            ensure_inside(root, &target, &name, archive)?;
            create_dir(&target, mode)
        } else if entry_type.is_symlink() {
            let link = entry
                .link_name()
                .map_err(|source| SdkError::Extract {
                    entry: name.clone(),
                    source,
                })?
                .ok_or_else(|| SdkError::Archive {
                    archive: archive.to_path_buf(),
                    reason: format!("symlink '{}' has no target", name),
                })?
                .into_owned();
            if link_escapes(&relative, &link) {
                return Err(SdkError::Archive {
                    archive: archive.to_path_buf(),
                    reason: format!(
                        "symlink '{}' -> '{}' escapes the target directory",
                        name,
                        link.display()
                    ),
                });
            }
            if let Some(parent) = target.parent() {
                ensure_inside(root, parent, &name, archive)?;
            }
            create_symlink(&link, &target)
        } else if entry_type.is_file() || entry_type.is_contiguous() {
            ensure_inside(root, &target, &name, archive)?;
            write_file(&target, mode, &mut entry)
        } else {
            debug!("Skipping {:?} entry {}", entry_type, name);
            Ok(())
        };
        outcome.map_err(|source| SdkError::Extract {
            entry: name.clone(),
            source,
        })?;
    }

    debug!("TAR.GZ extraction complete");
    Ok(())
}

/// Drop the leading `go/` segment. `Ok(None)` means the entry is the wrapping
/// directory itself and must be skipped.
fn strip_wrapping_dir(name: &str, archive: &Path) -> Result<Option<PathBuf>> {
    let stripped = name
        .strip_prefix(WRAPPING_DIR)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(if name == WRAPPING_DIR { "" } else { name });
    if stripped.is_empty() {
        return Ok(None);
    }

    let relative = PathBuf::from(stripped);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(SdkError::Archive {
            archive: archive.to_path_buf(),
            reason: format!("entry '{}' escapes the target directory", name),
        });
    }
    Ok(Some(relative))
}

/// Fail unless `path` stays under `root` once the part of it that already
/// exists on disk is resolved. Catches writes through symlinks created by
/// earlier entries.
fn ensure_inside(root: &Path, path: &Path, name: &str, archive: &Path) -> Result<()> {
    let escapes = || SdkError::Archive {
        archive: archive.to_path_buf(),
        reason: format!("entry '{}' escapes the target directory", name),
    };

    // A dangling link cannot be resolved and would be followed on write.
    let existing = path
        .ancestors()
        .find(|p| fs::symlink_metadata(p).is_ok())
        .ok_or_else(escapes)?;
    let resolved = fs::canonicalize(existing).map_err(|_| escapes())?;
    if resolved.starts_with(root) {
        Ok(())
    } else {
        Err(escapes())
    }
}

/// Whether a symlink at `relative` pointing to `link` resolves outside the
/// root. Only relative targets that stay inside are accepted.
fn link_escapes(relative: &Path, link: &Path) -> bool {
    let mut depth = relative.components().count().saturating_sub(1);
    for component in link.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return true,
            },
            Component::RootDir | Component::Prefix(_) => return true,
        }
    }
    false
}

fn create_dir(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)
}

fn write_file(path: &Path, mode: u32, content: &mut impl Read) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent, PARENT_DIR_MODE)?;
    }

    let mut options = fs::OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode & 0o7777);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path)?;
    io::copy(content, &mut file)?;
    Ok(())
}

#[cfg(unix)]
fn create_symlink(link: &Path, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir(parent, PARENT_DIR_MODE)?;
    }
    if fs::symlink_metadata(path).is_ok() {
        fs::remove_file(path)?;
    }
    std::os::unix::fs::symlink(link, path)
}

#[cfg(not(unix))]
fn create_symlink(link: &Path, path: &Path) -> io::Result<()> {
    debug!(
        "Skipping symlink {} -> {} on this platform",
        path.display(),
        link.display()
    );
    Ok(())
}
