//! Error types for the console bridge
use std::fmt;

use thiserror::Error;

/// A domain value outside its documented range or format
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field} {constraint}, got {value}")]
pub struct ValidationError {
    /// Name of the offending field (e.g. `channel`)
    pub field: &'static str,
    /// Human-readable constraint (e.g. `must be between 1 and 99999`)
    pub constraint: String,
    /// The rejected value, rendered for display
    pub value: String,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        constraint: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        Self {
            field,
            constraint: constraint.into(),
            value: value.to_string(),
        }
    }
}

/// Bridge errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Input outside its documented domain
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A request that is well-typed but cannot be encoded (e.g. no timing field)
    #[error("{0}")]
    Precondition(String),

    /// Send/receive failure on the datagram socket
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// OSC packet could not be encoded
    #[error("OSC encode error: {0}")]
    OscEncode(String),

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid message format
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl From<rosc::OscError> for ControlError {
    fn from(err: rosc::OscError) -> Self {
        ControlError::OscEncode(format!("{:?}", err))
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("channel", "must be between 1 and 99999", 0);
        assert_eq!(
            err.to_string(),
            "channel must be between 1 and 99999, got 0"
        );

        let wrapped: ControlError = err.into();
        assert!(matches!(wrapped, ControlError::Validation(_)));
    }
}
