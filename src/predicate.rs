//! Version filters applied to discovered SDKs.

use crate::error::Result;
use crate::sdk::Sdk;
use crate::version;
use std::fmt;

type MatchFn = dyn Fn(&Sdk) -> Result<bool> + Send + Sync;

/// A filter over SDK candidates. Discovery accepts a candidate only if every
/// predicate matches it; an empty set matches everything.
pub struct Predicate {
    description: String,
    matches: Box<MatchFn>,
}

impl Predicate {
    pub fn new<F>(description: impl Into<String>, matches: F) -> Self
    where
        F: Fn(&Sdk) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            matches: Box::new(matches),
        }
    }

    pub fn matches(&self, sdk: &Sdk) -> Result<bool> {
        (self.matches)(sdk)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.description).finish()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Matches SDKs of exactly `wanted`. The version is parsed on first use, so a
/// malformed value fails discovery rather than construction.
pub fn is_version(wanted: &str) -> Predicate {
    let wanted = wanted.to_string();
    Predicate::new(format!("version == {}", wanted), move |sdk| {
        Ok(sdk.version == version::parse_tolerant(&wanted)?)
    })
}

/// Matches SDKs at `minimum` or newer.
pub fn is_min_version(minimum: &str) -> Predicate {
    let minimum = minimum.to_string();
    Predicate::new(format!("version >= {}", minimum), move |sdk| {
        Ok(sdk.version >= version::parse_tolerant(&minimum)?)
    })
}

/// Matches SDKs at `maximum` or older.
pub fn is_max_version(maximum: &str) -> Predicate {
    let maximum = maximum.to_string();
    Predicate::new(format!("version <= {}", maximum), move |sdk| {
        Ok(sdk.version <= version::parse_tolerant(&maximum)?)
    })
}
