//! Common error types for HCS

use thiserror::Error;

/// Common result type for HCS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the HCS crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error talking to the work coordinator (wraps reqwest::Error)
    #[error("Remote error: {0}")]
    Remote(#[from] reqwest::Error),

    /// A metadata template referenced a key with no value on the current image set
    #[error("Template error: {0}")]
    Template(String),

    /// Failed to load a measurement container (missing, corrupt or unrecognized)
    #[error("Load error: {0}")]
    Load(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (mismatched shapes, malformed specs)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
