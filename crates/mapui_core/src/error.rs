//! Core error types

use thiserror::Error;

use crate::timer::TimerId;

/// Errors raised by the core primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The timer already fired, was cancelled, or never existed
    #[error("Unknown timer: {0:?}")]
    UnknownTimer(TimerId),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
