//! Fatal startup errors.
//!
//! Anything in this enum stops the process before it serves a request.
//! Per-request failures never surface here.

use thiserror::Error;

use crate::completion::CompletionError;
use crate::config::ConfigError;
use crate::context::DatasetError;

/// Errors raised while bringing the service up.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Missing credential or invalid configuration value
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dataset could not be loaded
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The completion client could not be built
    #[error("Failed to create completion client: {0}")]
    Client(#[from] CompletionError),

    /// Host and port do not form a socket address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The listener could not be bound or the server stopped with an error
    #[error("Server error: {0}")]
    Server(String),
}
