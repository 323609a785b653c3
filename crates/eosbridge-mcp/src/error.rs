//! Tool-layer errors

use eosbridge_control::{ControlError, ValidationError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    Arguments(#[from] serde_json::Error),

    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("OSC receive is not enabled")]
    FeedbackDisabled,
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        ToolError::Control(err.into())
    }
}

impl ToolError {
    pub fn precondition(message: impl Into<String>) -> Self {
        ToolError::Control(ControlError::Precondition(message.into()))
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
