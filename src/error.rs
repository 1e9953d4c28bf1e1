//! Error types for the boardmind crate

use thiserror::Error;

/// Main error type for the boardmind crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("no legal actions available in state '{state}'")]
    NoLegalActions { state: String },

    #[error("protocol violation: {operation} called while agent is {phase}")]
    ProtocolViolation {
        operation: &'static str,
        phase: &'static str,
    },

    #[error("state '{state}' is not registered in the repository")]
    UnknownState { state: String },

    #[error("action index {index} is out of range for state '{state}' ({len} actions)")]
    ActionIndexOutOfRange {
        state: String,
        index: usize,
        len: usize,
    },

    #[error("invalid action descriptor '{input}': {reason}")]
    InvalidDescriptor { input: String, reason: String },

    #[error("square {col}-{row} is outside a board of size {size}")]
    InvalidSquare { col: usize, row: usize, size: usize },

    #[error("board size {size} is too small for the starting arrangement (minimum {min})")]
    BoardTooSmall { size: usize, min: usize },

    #[error("square {square} holds no piece")]
    EmptySquare { square: String },

    #[error("piece at {square} does not belong to the acting side")]
    WrongOwner { square: String },

    #[error("destination {square} is not reachable for the piece at {origin}")]
    UnreachableSquare { origin: String, square: String },

    #[error("invalid opponent '{input}'. Expected one of: {expected}")]
    ParseOpponent { input: String, expected: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
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
