use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the image-phash library
#[derive(Error, Debug)]
pub enum Error {
    /// The pre-flight existence probe found nothing at the path
    #[error("Error getting image hash: file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but the probe could not open it
    #[error("Error getting image hash: cannot open {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but is not a decodable image
    #[error("Error getting image hash: {0}")]
    Decode(#[from] image::ImageError),

    /// The hash primitive failed or panicked
    #[error("Error getting image hash: {0}")]
    Algorithm(String),

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Configuration file (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The worker pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A pending result whose completion handler was dropped unfired
    #[error("Hash result was never delivered")]
    Undelivered,
}
