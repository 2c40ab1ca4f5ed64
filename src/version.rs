//! Tolerant version parsing.
//!
//! Go reports versions like `1.14`, `1.21.5` or `1.22rc1`, none of which are
//! strict semantic versions. [`parse_tolerant`] pads missing components and
//! folds a glued pre-release suffix (`rc1`, `beta2`) into a semver pre-release.

use crate::error::{Result, SdkError};
use semver::Version;

/// Parse a version string, accepting a leading `v`, missing minor/patch
/// components and Go-style pre-release suffixes.
pub fn parse_tolerant(input: &str) -> Result<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

    let (core, suffix) = match trimmed.find(['-', '+']) {
        Some(pos) => (&trimmed[..pos], &trimmed[pos..]),
        None => (trimmed, ""),
    };

    let mut parts: Vec<String> = core.split('.').map(str::to_string).collect();
    let mut pre = String::new();

    // "1.22rc1" -> core "1.22", pre-release "rc1"
    if let Some(last) = parts.last_mut() {
        if let Some(pos) = last.find(|c: char| !c.is_ascii_digit()) {
            if pos > 0 {
                pre = last[pos..].to_string();
                last.truncate(pos);
            }
        }
    }

    if parts.is_empty() || parts.len() > 3 {
        return Err(invalid(input));
    }
    while parts.len() < 3 {
        parts.push("0".to_string());
    }
    // Leading zeros are not valid semver, but "1.05" means 1.5.
    for part in &mut parts {
        let stripped = part.trim_start_matches('0');
        *part = if stripped.is_empty() && !part.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        };
    }

    let mut normalized = parts.join(".");
    if !pre.is_empty() {
        normalized.push('-');
        normalized.push_str(&pre);
        if let Some(rest) = suffix.strip_prefix('-') {
            normalized.push('.');
            normalized.push_str(rest);
        } else {
            normalized.push_str(suffix);
        }
    } else {
        normalized.push_str(suffix);
    }

    Version::parse(&normalized).map_err(|e| SdkError::Version {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(input: &str) -> SdkError {
    SdkError::Version {
        input: input.to_string(),
        reason: "expected MAJOR[.MINOR[.PATCH]]".to_string(),
    }
}

/// Render a version the way the Go distribution names it: `MAJOR.MINOR` when
/// patch is zero, `MAJOR.MINOR.PATCH` otherwise.
pub fn canonical(version: &Version) -> String {
    if version.patch == 0 {
        format!("{}.{}", version.major, version.minor)
    } else {
        format!("{}.{}.{}", version.major, version.minor, version.patch)
    }
}
