//! Error types for l7dissect-core.
//!
//! Dissection itself never fails: every outcome of a dissector is expressed as a
//! [`Verdict`](crate::dissect::Verdict). The errors here cover the parts of the
//! crate that can genuinely go wrong:
//!
//! - [`enum@Error`] - Main error enum that wraps all error types
//! - [`ConfigError`] - Invalid normalizer or pipeline configuration
//! - [`InputError`] - Malformed hex-encoded frame input
//!
//! All errors implement `std::error::Error` and can be converted to `anyhow::Error`.

use thiserror::Error;

/// Main error type for l7dissect-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed frame input
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to component configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A limit that must be positive was zero
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}

/// Errors related to decoding hex-encoded frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// A character that is not a hex digit
    #[error("line {line}: invalid hex digit {found:?} at column {column}")]
    InvalidHexDigit {
        line: usize,
        column: usize,
        found: char,
    },

    /// Hex string with an unpaired trailing digit
    #[error("line {line}: odd number of hex digits ({digits})")]
    OddLength { line: usize, digits: usize },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
