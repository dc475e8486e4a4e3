//! Error types for DSV parsing

use thiserror::Error;

use crate::types::Diagnostic;

/// Errors produced while configuring, feeding or reading a DSV stream
#[derive(Error, Debug)]
pub enum DsvError {
    /// A fatal parse diagnostic raised in strict mode.
    ///
    /// The parser is left in its terminal error state; constructing a new
    /// parser is required to process further input.
    #[error("Parse error: {0}")]
    ParseError(Diagnostic),

    /// Rejected configuration (empty or conflicting token sequences)
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Failure while pulling bytes from the underlying source
    #[error("Read error: {0}")]
    ReadError(String),

    /// Input was fed to a parser that has already been closed
    #[error("Parser already closed")]
    Closed,
}

/// A type alias for `Result<T, DsvError>`
pub type Result<T> = std::result::Result<T, DsvError>;
