//! Error types for the admin tool.

use std::path::PathBuf;

use thiserror::Error;

/// Failures an admin invocation can end with.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Database file not found: {}", .0.display())]
    StorageUnavailable(PathBuf),

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl AdminError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            AdminError::StorageUnavailable(_) => 1,
            AdminError::ImageNotFound(_) => 2,
            AdminError::Io { .. } | AdminError::Output(_) | AdminError::Storage(_) => 3,
        }
    }
}
