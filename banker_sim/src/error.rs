//! Error types for the simulation harness.

use banker_core::ProblemError;
use thiserror::Error;

/// Errors that can occur while loading, running or exporting a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Problem file could not be read or an export could not be written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Problem file or export is not valid JSON for the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input matrices violate the simulator's preconditions
    #[error("Invalid problem: {0}")]
    Problem(#[from] ProblemError),

    /// Command-line options that cannot be combined
    #[error("Usage error: {0}")]
    Usage(String),
}

impl SimError {
    /// Creates an I/O error tagged with the offending path.
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }
}
