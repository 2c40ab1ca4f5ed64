use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an [`SdkError`].
///
/// Discovery only distinguishes "try the next strategy" ([`ErrorKind::NoSdk`])
/// from everything else, but callers may want finer detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoSdk,
    NoBinary,
    SdkDifferent,
    Parse,
    Layout,
    Archive,
    Io,
    Http,
}

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("no go SDK")]
    NoSdk,

    #[error("no go binary")]
    NoBinary,

    #[error("sdk different")]
    SdkDifferent,

    #[error("cannot parse version '{input}': {reason}")]
    Version { input: String, reason: String },

    #[error("cannot resolve bin directory of go binary '{}'", path.display())]
    Layout { path: PathBuf },

    #[error("cannot validate go binary '{}': {reason}", path.display())]
    Binary { path: PathBuf, reason: String },

    #[error("cannot extract '{entry}': {source}")]
    Extract {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected archive entry in '{}': {reason}", archive.display())]
    Archive { archive: PathBuf, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::NoSdk => ErrorKind::NoSdk,
            SdkError::NoBinary => ErrorKind::NoBinary,
            SdkError::SdkDifferent => ErrorKind::SdkDifferent,
            SdkError::Version { .. } => ErrorKind::Parse,
            SdkError::Layout { .. } => ErrorKind::Layout,
            SdkError::Extract { .. } | SdkError::Archive { .. } => ErrorKind::Archive,
            SdkError::Io { .. } | SdkError::Binary { .. } => ErrorKind::Io,
            SdkError::Http(_) => ErrorKind::Http,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        SdkError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failures of a single [`crate::http::Pipeline::execute`] call, tagged with the stage.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("cannot create request for '{url}': {source}")]
    CreateRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot prepare request for '{url}': {source}")]
    PrepareRequest {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot execute request of '{url}': {source}")]
    Execute {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot prepare response of '{url}': {source}")]
    PrepareResponse {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot evaluate response of '{url}': {source}")]
    EvalResponse {
        url: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Rejected status code, raised by the default response validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("status {code} - {reason}")]
pub struct StatusError {
    pub code: u16,
    pub reason: String,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no body")]
pub struct NoBodyError;

pub type Result<T> = std::result::Result<T, SdkError>;
