/*!
 * Errors produced while fetching an object.  Every variant is fatal: nothing
 * in this crate retries.
 */

use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid hash specified: {0:?} (expected 40 or 64 hex digits)")]
    InvalidHash(String),

    #[error("setting up storage client ({what})")]
    Client {
        what: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("unable to open file {path:?}")]
    CreateTemp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to download item {key:?}")]
    Transfer {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("error hashing file {path:?}")]
    Hashing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("downloaded file hash failed: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("failed to resolve absolute path for {name:?}")]
    ResolvePath {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move file {from:?} to {to:?}")]
    Commit {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    pub fn transfer<E>(key: &str, error: E) -> FetchError
    where
        E: Into<BoxError>,
    {
        FetchError::Transfer {
            key: key.to_string(),
            source: error.into(),
        }
    }

    pub fn client<E>(what: &'static str, error: E) -> FetchError
    where
        E: Into<BoxError>,
    {
        FetchError::Client {
            what,
            source: error.into(),
        }
    }
}
