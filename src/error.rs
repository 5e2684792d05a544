//! Structured error types

use std::path::PathBuf;

/// Errors raised by the board-state provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("column {column} is full")]
    ColumnFull { column: usize },

    #[error("column {column} is out of range (width {width})")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("invalid board geometry: {0}")]
    InvalidGeometry(String),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

/// Errors reported by the engine to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The harness handed over a position with every column full.
    #[error("no legal column available")]
    NoLegalMoves,

    #[error("board error: {0}")]
    Board(#[from] BoardError),
}
