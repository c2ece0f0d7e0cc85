//! Error types for Snail Mail.

use thiserror::Error;

use crate::auth::PasswordError;
use crate::db::DatastoreError;

/// Common error type for Snail Mail.
#[derive(Error, Debug)]
pub enum SnailmailError {
    /// Datastore operation failed.
    ///
    /// The wrapped error carries the call-site code and the error kind.
    #[error("datastore error: {0}")]
    Datastore(#[from] DatastoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credential hashing or verification error.
    #[error("credential error: {0}")]
    Credential(#[from] PasswordError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Snail Mail operations.
pub type Result<T> = std::result::Result<T, SnailmailError>;
