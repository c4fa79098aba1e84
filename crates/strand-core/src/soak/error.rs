//! Soak harness error types

use thiserror::Error;

/// Errors that can occur while running a soak
#[derive(Error, Debug)]
pub enum SoakError {
    /// Configuration can't be run
    #[error("Invalid soak config: {0}")]
    InvalidConfig(String),

    /// OS refused to spawn a thread
    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A harness thread panicked
    #[error("Soak thread panicked: {0}")]
    WorkerPanicked(String),
}

/// Result type for soak operations
pub type SoakResult<T> = Result<T, SoakError>;
