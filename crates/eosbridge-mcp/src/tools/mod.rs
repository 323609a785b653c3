//! Tool surface
//!
//! One tool per console operation. Every handler validates its arguments,
//! encodes through [`eosbridge_control::command`] and returns a JSON payload;
//! failures become `{success: false, error, message}` payloads rather than
//! protocol errors.

pub mod cues;
pub mod effects;
pub mod feedback;
pub mod palettes;
pub mod patch;

use std::fmt;

use eosbridge_control::{EncodedCommand, EosClient, ValidationError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ToolError, ToolResult};
use crate::protocol::ToolDefinition;

/// Attached to results of delete tools
pub const UNDO_WARNING: &str = "This operation cannot be easily undone";

pub type ToolHandler = fn(&EosClient, Value) -> ToolResult<Value>;

/// A registered tool
#[derive(Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// `message` of the failure payload
    pub failure: &'static str,
    pub schema: fn() -> Value,
    pub handler: ToolHandler,
}

impl ToolSpec {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: (self.schema)(),
        }
    }

    /// Run the handler; errors are folded into a failure payload
    pub fn call(&self, client: &EosClient, arguments: Value) -> Value {
        match (self.handler)(client, arguments) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", self.name, e);
                json!({
                    "success": false,
                    "error": e.to_string(),
                    "message": self.failure,
                })
            }
        }
    }
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSpec").field("name", &self.name).finish()
    }
}

/// Every tool, in listing order
pub fn all_tools() -> Vec<ToolSpec> {
    let mut tools = Vec::new();
    tools.extend(patch::tools());
    tools.extend(cues::tools());
    tools.extend(effects::tools());
    tools.extend(palettes::tools());
    tools.extend(feedback::tools());
    tools
}

/// Success payload of a console operation
#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_sent: Option<String>,
}

impl ToolResponse {
    pub fn ok(message: impl Into<String>, details: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            warning: None,
            note: None,
            details,
            command_sent: None,
        }
    }

    pub fn with_command(mut self, command: Option<EncodedCommand>) -> Self {
        self.command_sent = command.map(EncodedCommand::into_string);
        self
    }

    pub fn with_warning(mut self, warning: &str) -> Self {
        self.warning = Some(warning.to_string());
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn into_value(self) -> ToolResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Deserialize tool arguments; a missing object is treated as `{}`
pub fn parse_args<T: DeserializeOwned>(arguments: Value) -> ToolResult<T> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    Ok(serde_json::from_value(arguments)?)
}

/// Inclusive range check for tool-level bounds
pub fn check_range<T>(field: &'static str, value: T, min: T, max: T) -> Result<T, ValidationError>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if value >= min && value <= max {
        Ok(value)
    } else {
        let reason = format!("must be between {} and {}", min, max);
        Err(ValidationError::new(field, reason, value))
    }
}

/// Trim optional text, dropping it when empty, and bound its length
pub fn check_text(
    field: &'static str,
    value: Option<String>,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    let trimmed = value.map(|v| v.trim().to_string());
    match trimmed.filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > max_len => Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
            format!("{} chars", v.chars().count()),
        )),
        other => Ok(other),
    }
}

/// `end` must not precede `start`
pub fn check_order(start: u32, end: Option<u32>) -> ToolResult<()> {
    match end {
        Some(end) if end < start => {
            Err(ToolError::precondition("End channel must be >= start channel"))
        }
        _ => Ok(()),
    }
}
