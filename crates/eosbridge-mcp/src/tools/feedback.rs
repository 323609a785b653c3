//! Feedback tools: what the console reported back, and what operators did
//!
//! All of these need OSC receive; with it disabled they answer with a
//! failure payload instead of an empty list.

use eosbridge_control::insights::format_timestamp;
use eosbridge_control::{EosClient, FeedbackCategory, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{check_range, parse_args, ToolSpec};
use crate::error::{ToolError, ToolResult};

pub const MAX_FEEDBACK_LIMIT: i64 = 500;
pub const DEFAULT_FEEDBACK_LIMIT: i64 = 50;
pub const RECENT_ERROR_LIMIT: usize = 20;
pub const MAX_ACTION_LIMIT: i64 = 200;
pub const MAX_WINDOW_MINUTES: i64 = 1440;
pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const RETAINED_CATEGORIES: [FeedbackCategory; 9] = [
    FeedbackCategory::Notify,
    FeedbackCategory::Error,
    FeedbackCategory::Event,
    FeedbackCategory::UserAction,
    FeedbackCategory::Selection,
    FeedbackCategory::Cue,
    FeedbackCategory::Patch,
    FeedbackCategory::Playback,
    FeedbackCategory::Other,
];

pub fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "eos_get_feedback_log",
            description: "Recent messages the console sent back (notifications, errors, state \
                          changes, operator actions), optionally filtered by category. Requires \
                          OSC receive.",
            failure: "Failed to read feedback log",
            schema: feedback_log_schema,
            handler: get_feedback_log,
        },
        ToolSpec {
            name: "eos_get_recent_errors",
            description: "Recent console errors: commands the console rejected or did not \
                          understand. Requires OSC receive.",
            failure: "Failed to read recent errors",
            schema: empty_schema,
            handler: get_recent_errors,
        },
        ToolSpec {
            name: "eos_get_operator_actions",
            description: "Recent actions performed by operators on the console. Requires OSC \
                          receive.",
            failure: "Failed to read operator actions",
            schema: operator_actions_schema,
            handler: get_operator_actions,
        },
        ToolSpec {
            name: "eos_get_operator_insights",
            description: "Analyse recent operator behaviour: most common actions, error patterns, \
                          pace and focus. Requires OSC receive.",
            failure: "Failed to derive operator insights",
            schema: insights_schema,
            handler: get_operator_insights,
        },
        ToolSpec {
            name: "eos_clear_feedback_log",
            description: "Clear all stored feedback messages and operator actions.",
            failure: "Failed to clear feedback log",
            schema: empty_schema,
            handler: clear_feedback_log,
        },
    ]
}

fn require_feedback(client: &EosClient) -> ToolResult<()> {
    if client.feedback_enabled() {
        Ok(())
    } else {
        Err(ToolError::FeedbackDisabled)
    }
}

/// Serialize log entries, adding a local `time` next to each timestamp
fn with_time<T: Serialize>(entries: &[T], time_of: impl Fn(&T) -> f64) -> ToolResult<Vec<Value>> {
    entries
        .iter()
        .map(|entry| -> ToolResult<Value> {
            let mut value = serde_json::to_value(entry)?;
            value["time"] = json!(format_timestamp(time_of(entry), TIME_FORMAT));
            Ok(value)
        })
        .collect()
}

fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArguments {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedbackLogInput {
    #[serde(default)]
    category: Option<String>,
    #[serde(default = "default_feedback_limit")]
    limit: i64,
}

fn default_feedback_limit() -> i64 {
    DEFAULT_FEEDBACK_LIMIT
}

fn feedback_log_schema() -> Value {
    let categories: Vec<&str> = RETAINED_CATEGORIES.iter().map(|c| c.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "category": {
                "type": "string",
                "enum": categories
            },
            "limit": {"type": "integer", "minimum": 1, "maximum": 500, "default": 50}
        },
        "additionalProperties": false
    })
}

/// A category the feedback log can hold; DMX feedback is never retained
fn parse_category(name: &str) -> Result<FeedbackCategory, ValidationError> {
    match name.parse::<FeedbackCategory>() {
        Ok(category) if RETAINED_CATEGORIES.contains(&category) => Ok(category),
        _ => Err(ValidationError::new("category", "is not a feedback category", name)),
    }
}

fn get_feedback_log(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: FeedbackLogInput = parse_args(arguments)?;
    require_feedback(client)?;
    let limit = check_range("limit", input.limit, 1, MAX_FEEDBACK_LIMIT)? as usize;
    let category = input
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(parse_category)
        .transpose()?;

    let messages = client.feedback_log(category, limit);
    Ok(json!({
        "success": true,
        "count": messages.len(),
        "category_filter": category.map(|c| c.as_str()).unwrap_or("all"),
        "messages": with_time(&messages, |m| m.timestamp)?,
    }))
}

fn get_recent_errors(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let _: NoArguments = parse_args(arguments)?;
    require_feedback(client)?;

    let errors = client.recent_errors(RECENT_ERROR_LIMIT);
    Ok(json!({
        "success": true,
        "error_count": errors.len(),
        "errors": with_time(&errors, |e| e.timestamp)?,
        "note": "These are commands or actions that the console rejected",
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperatorActionsInput {
    #[serde(default = "default_feedback_limit")]
    limit: i64,
}

fn operator_actions_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {"type": "integer", "minimum": 1, "maximum": 200, "default": 50}
        },
        "additionalProperties": false
    })
}

fn get_operator_actions(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: OperatorActionsInput = parse_args(arguments)?;
    require_feedback(client)?;
    // Out-of-range limits are clamped rather than rejected
    let limit = input.limit.clamp(1, MAX_ACTION_LIMIT) as usize;

    let actions = client.operator_actions(limit);
    Ok(json!({
        "success": true,
        "action_count": actions.len(),
        "actions": with_time(&actions, |a| a.timestamp)?,
        "note": "These are actions performed by operators on the console",
    }))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InsightsInput {
    #[serde(default = "default_window")]
    time_window_minutes: i64,
}

fn default_window() -> i64 {
    DEFAULT_WINDOW_MINUTES
}

fn insights_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "time_window_minutes": {
                "type": "integer",
                "minimum": 1,
                "maximum": 1440,
                "default": 60
            }
        },
        "additionalProperties": false
    })
}

fn get_operator_insights(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: InsightsInput = parse_args(arguments)?;
    require_feedback(client)?;
    let window = input.time_window_minutes;
    let window = check_range("time_window_minutes", window, 1, MAX_WINDOW_MINUTES)? as u32;

    let insights = client
        .operator_insights(window)
        .ok_or(ToolError::FeedbackDisabled)?;
    Ok(json!({
        "success": true,
        "insights": insights,
    }))
}

fn clear_feedback_log(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let _: NoArguments = parse_args(arguments)?;
    require_feedback(client)?;
    client.clear_feedback_log();
    Ok(json!({
        "success": true,
        "message": "All feedback logs cleared",
    }))
}
