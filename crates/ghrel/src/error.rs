//! Error types for the GitHub Releases client.

use std::io;
use std::path::PathBuf;

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Releases API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Repository string is not of the `owner/name` form.
    #[error("invalid repository '{0}' (expected owner/name)")]
    InvalidRepo(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Asset download failed or exceeded the size limit.
    #[error("download of {url} failed: {message}")]
    DownloadFailed {
        /// URL being downloaded.
        url: String,
        /// Error message.
        message: String,
    },

    /// IO error while writing a downloaded file.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}
