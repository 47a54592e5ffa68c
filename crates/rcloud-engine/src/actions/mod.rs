//! What can be done with a [`Recording`](crate::recording::Recording).

pub mod delete;
pub mod download;

pub use delete::{DELETE_ATTEMPTS, delete};
pub use download::{DEFAULT_MAX_RETRIES, DownloadReceipt, download};
