//! Error handling for the BSP toolbox
//!
//! A single error type shared by the type checker, the signal data
//! structures and the processing functions.

use crate::type_check::RejectionKind;
use thiserror::Error;

/// Result type alias for BSP toolbox operations
pub type BspResult<T> = Result<T, BspError>;

/// Error type for all BSP toolbox operations
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum BspError {
    /// A value failed a top-level type check
    #[error("{message}")]
    TypeCheck {
        /// Name of the checked variable
        name: String,
        /// Category of the rejection
        kind: RejectionKind,
        /// Diagnostic produced by the checker
        message: String,
    },

    /// A named variable could not be resolved in the given scope
    #[error("Variable '{name}' is not defined")]
    UnknownVariable {
        /// Name that failed to resolve
        name: String,
    },

    /// Signal data violates the data-structure convention
    #[error("Invalid signal data: {reason}")]
    InvalidSignalData {
        /// Description of the inconsistency
        reason: String,
    },

    /// Element count does not match the declared shape
    #[error("Dimension mismatch: shape {shape} holds {expected} elements, got {actual}")]
    DimensionMismatch {
        /// Declared shape
        shape: String,
        /// Elements implied by the shape
        expected: usize,
        /// Elements supplied
        actual: usize,
    },

    /// Invalid processing option
    #[error("Invalid option '{name}': {reason}")]
    InvalidOption {
        /// Option name
        name: String,
        /// Why the option was refused
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration issue
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError {
        /// Serialization error description
        reason: String,
    },
}

impl BspError {
    /// Rejection category for type-check failures
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            BspError::TypeCheck { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Convenience macro for creating signal data errors
#[macro_export]
macro_rules! signal_error {
    ($($arg:tt)*) => {
        $crate::error::BspError::InvalidSignalData {
            reason: format!($($arg)*),
        }
    };
}

/// Convenience macro for creating option errors
#[macro_export]
macro_rules! option_error {
    ($name:expr, $($arg:tt)*) => {
        $crate::error::BspError::InvalidOption {
            name: $name.to_string(),
            reason: format!($($arg)*),
        }
    };
}
