use crate::retry::Exhausted;
use rcloud_common::error::DriverError;

/// Errors that end the whole run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Authentication failed after {attempts} attempts")]
    AuthenticationExhausted { attempts: u32 },

    #[error("Recordings page did not load after {attempts} attempts: {last_error}")]
    CatalogUnavailable {
        attempts: u32,
        last_error: DriverError,
    },

    #[error("Could not read credentials: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("Browser error: {0}")]
    Driver(#[from] DriverError),
}

/// Errors scoped to a single recording. Reported, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("no download link for '{title}' (still recording?)")]
    MissingDownloadLink { title: String },

    #[error("size mismatch: expected {expected} bytes, received {received}")]
    DownloadIntegrityMismatch { expected: u64, received: u64 },

    #[error("transfer failed: {0}")]
    DownloadTransport(String),

    #[error("download failed after {attempts} attempt(s): {last_error}")]
    DownloadFailed {
        attempts: u32,
        last_error: Box<ItemError>,
    },

    #[error("delete confirmation failed after {attempts} attempt(s): {last_error}")]
    DeleteDialogFailure {
        attempts: u32,
        last_error: DriverError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<Exhausted<ItemError>> for ItemError {
    fn from(e: Exhausted<ItemError>) -> Self {
        ItemError::DownloadFailed {
            attempts: e.attempts,
            last_error: Box::new(e.last_error),
        }
    }
}

impl From<Exhausted<DriverError>> for ItemError {
    fn from(e: Exhausted<DriverError>) -> Self {
        ItemError::DeleteDialogFailure {
            attempts: e.attempts,
            last_error: e.last_error,
        }
    }
}

/// Why one list item could not become a recording. The item is dropped and
/// parsing continues with the next one.
#[derive(Debug, thiserror::Error)]
pub enum ParseItemFailure {
    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("compact layout with {labels} labels could not be classified: missing {missing}")]
    Unclassifiable { labels: usize, missing: &'static str },

    #[error("browser error while reading item: {0}")]
    Driver(#[from] DriverError),
}
