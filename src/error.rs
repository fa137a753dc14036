//! The errors that can occur.

use std::time::Duration;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// The possible errors that can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// An error occurred while running the runtime.
    #[error("An error occurred while running the runtime: {0}")]
    Runtime(#[from] tokio::task::JoinError),
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),
    /// An error occurred while parsing JSON.
    #[error("An error occurred while parsing JSON: {0}")]
    Serde(#[from] serde_json::Error),

    /// The stream manifest could not be retrieved from the catalog.
    #[error("Failed to fetch the stream manifest: {0}")]
    ManifestFetch(String),
    /// No stream in the manifest matches the requested quality.
    #[error("No matching stream found: {0}")]
    StreamNotFound(String),
    /// A fetch-and-encode sub-task failed.
    #[error("A sub-download failed: {0}")]
    SubDownload(String),
    /// Combining the video and audio intermediates failed.
    #[error("Failed to mux the downloaded streams: {0}")]
    Mux(String),
    /// The download session was cancelled.
    #[error("The download was cancelled")]
    Cancelled,
    /// A download session is already running.
    #[error("A download is already in progress")]
    AlreadyDownloading,

    /// An error occurred while running a command.
    #[error("Failed to execute command: {0}")]
    Command(String),
    /// An error occurred manipulating a path.
    #[error("An invalid path was provided: {0}")]
    Path(String),
    /// An error occurred due to a timeout.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    /// The download request parameters are inconsistent.
    #[error("Invalid download request: {0}")]
    InvalidRequest(String),
}
