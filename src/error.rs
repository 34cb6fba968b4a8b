//! Error types for the gridlearn crate

use thiserror::Error;

/// Main error type for the gridlearn crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid grid size {side} (must be at least 2)")]
    InvalidGridSize { side: usize },

    #[error("hazard cell {index} is out of bounds (grid has {num_states} cells)")]
    HazardOutOfBounds { index: usize, num_states: usize },

    #[error("hazard cell {index} overlaps the {endpoint} cell")]
    HazardOnEndpoint { index: usize, endpoint: &'static str },

    #[error("state {state} is out of bounds (grid has {num_states} cells)")]
    StateOutOfBounds { state: usize, num_states: usize },

    #[error("action index {index} is out of range (expected 0-3)")]
    InvalidAction { index: usize },

    #[error("invalid hyperparameter {name}={value}: {reason}")]
    InvalidHyperParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("cannot {operation} while training is running")]
    TrainingActive { operation: &'static str },

    #[error("cannot {command} while scheduler is {state}")]
    InvalidTransition {
        command: &'static str,
        state: &'static str,
    },

    #[error("unknown strategy '{input}'. Expected one of: {expected}")]
    ParseStrategy { input: String, expected: String },

    #[error("unknown training mode '{input}'. Expected one of: {expected}")]
    ParseTrainingMode { input: String, expected: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
