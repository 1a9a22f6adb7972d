//! Error types for cell construction and evaluation

use thiserror::Error;

/// Result type for cell operations, defaulting to [`CfcError`]
pub type Result<T, E = CfcError> = std::result::Result<T, E>;

/// Errors raised by cell construction, forward evaluation, and maintenance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CfcError {
    /// A constructor or validation step was given inconsistent settings
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A forward call was given input the active mode cannot consume
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An operation was invoked on a cell whose mode does not support it
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
