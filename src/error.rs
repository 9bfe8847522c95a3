use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole run.
///
/// User-facing compile errors (syntax, types) are not in here: the external
/// compiler reports those as [`BackendError::User`] and the orchestrator turns
/// them into [`crate::CompileOutcome::Rejected`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid params file {}: {source}", .path.display())]
    Params {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("compiler backend failed: {0}")]
    Backend(String),

    #[error("malformed artifact: {0}")]
    Artifact(String),
}

impl Error {
    /// Classify an `std::io::Error` raised while touching `path`.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path)
        } else {
            Error::Io { path, source }
        }
    }
}

impl From<BackendError> for Error {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::User(user) => Error::Backend(format!("unhandled user error: {}", user)),
            BackendError::Internal(msg) => Error::Backend(msg),
        }
    }
}
