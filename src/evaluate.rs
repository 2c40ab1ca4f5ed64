//! Turning a `go` executable into an [`Sdk`].
//!
//! The binary is asked for its version (`go version`) and the answer is
//! parsed; the installation root is derived from the binary's real location,
//! which must be `<root>/bin/go`.

use crate::error::{ErrorKind, Result, SdkError};
use crate::sdk::Sdk;
use crate::version;
use regex::Regex;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

/// Name of the go executable on the host.
pub const GO_BINARY: &str = "go";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^go version go([0-9a-z._\-+]+) ([a-z0-9]+)/([a-z0-9]+)$")
        .expect("version pattern is valid")
});

/// Evaluate the go binary at `path`.
///
/// # Errors
///
/// - [`SdkError::NoBinary`] if `path` does not exist, is a directory, does not
///   answer like a go binary, or does not live in a `bin` directory
/// - [`SdkError::Binary`] if it exists but cannot be executed
/// - [`SdkError::Version`] if the reported version is malformed
pub fn eval_go_binary(path: &Path) -> Result<Sdk> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Err(SdkError::NoBinary),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(SdkError::NoBinary),
        Err(e) => {
            return Err(SdkError::Binary {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }

    let output = Command::new(path)
        .arg("version")
        .output()
        .map_err(|e| SdkError::Binary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(SdkError::Binary {
            path: path.to_path_buf(),
            reason: format!("'version' exited with {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let (raw_version, os, arch) = parse_version_output(&stdout).ok_or(SdkError::NoBinary)?;
    let version = version::parse_tolerant(raw_version)?;

    let resolved = std::fs::canonicalize(path).map_err(|e| {
        SdkError::io(
            format!("cannot resolve location of go binary '{}'", path.display()),
            e,
        )
    })?;
    let bin_dir = resolved.parent().ok_or_else(|| SdkError::Layout {
        path: path.to_path_buf(),
    })?;
    if bin_dir.file_name() != Some(OsStr::new("bin")) {
        debug!(
            "{} reports go {} but is not inside a bin directory",
            path.display(),
            raw_version
        );
        return Err(SdkError::NoBinary);
    }
    let root = bin_dir.parent().ok_or_else(|| SdkError::Layout {
        path: path.to_path_buf(),
    })?;

    Ok(Sdk {
        version,
        os: os.to_string(),
        arch: arch.to_string(),
        root: root.to_path_buf(),
        binary: path.to_path_buf(),
    })
}

/// Split `go version go1.21.5 linux/amd64` into version, os and arch.
pub fn parse_version_output(output: &str) -> Option<(&str, &str, &str)> {
    let captures = VERSION_PATTERN.captures(output.trim())?;
    Some((
        captures.get(1)?.as_str(),
        captures.get(2)?.as_str(),
        captures.get(3)?.as_str(),
    ))
}

/// Evaluate `<root>/bin/go`. A missing or unrecognized binary means there is
/// no SDK at `root`.
pub fn eval_from_root(root: &Path) -> Result<Sdk> {
    let candidate = root
        .join("bin")
        .join(format!("{}{}", GO_BINARY, std::env::consts::EXE_SUFFIX));
    fold_no_binary(eval_go_binary(&candidate))
}

/// Look up `go` on `search_path` (the process `PATH` when `None`) and
/// evaluate it. Returns `Ok(None)` when there is no `go` on the path.
pub fn eval_from_path(search_path: Option<&OsStr>) -> Result<Option<Sdk>> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let found = match search_path {
        Some(paths) => which::which_in(GO_BINARY, Some(paths), &cwd),
        None => which::which(GO_BINARY),
    };
    let candidate = match found {
        Ok(path) => path,
        Err(which::Error::CannotFindBinaryPath) => return Ok(None),
        Err(e) => {
            return Err(SdkError::io(
                "cannot lookup go in PATH",
                std::io::Error::other(e.to_string()),
            ));
        }
    };
    fold_no_binary(eval_go_binary(&candidate)).map(Some)
}

fn fold_no_binary(result: Result<Sdk>) -> Result<Sdk> {
    match result {
        Err(e) if e.kind() == ErrorKind::NoBinary => Err(SdkError::NoSdk),
        other => other,
    }
}
