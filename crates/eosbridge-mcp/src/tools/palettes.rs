//! Palette (preset) tools

use eosbridge_control::validate::PaletteType;
use eosbridge_control::{
    validate_channel, validate_label, validate_palette_type, ChannelSelection, CommandDescriptor,
    DeleteTarget, EosClient,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_order, check_range, parse_args, ToolResponse, ToolSpec, UNDO_WARNING};
use crate::error::{ToolError, ToolResult};

pub const MAX_PALETTE_NUMBER: i64 = 999;

pub fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "eos_record_palette",
            description: "Record a Focus, Color, Beam or Intensity palette from the current \
                          selection.",
            failure: "Failed to record palette",
            schema: record_palette_schema,
            handler: record_palette,
        },
        ToolSpec {
            name: "eos_apply_palette",
            description: "Apply a palette to a channel range, or to the console's current \
                          selection when no channels are given.",
            failure: "Failed to apply palette",
            schema: apply_palette_schema,
            handler: apply_palette,
        },
        ToolSpec {
            name: "eos_delete_palette",
            description: "Delete a palette. This cannot be easily undone.",
            failure: "Failed to delete palette",
            schema: palette_number_schema,
            handler: delete_palette,
        },
    ]
}

fn palette_number(value: i64) -> ToolResult<u32> {
    Ok(check_range("palette_number", value, 1, MAX_PALETTE_NUMBER)? as u32)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordPaletteInput {
    palette_number: i64,
    palette_type: String,
    #[serde(default)]
    label: Option<String>,
}

fn record_palette_schema() -> Value {
    let types: Vec<&str> = PaletteType::ALL.iter().map(|t| t.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "palette_number": {"type": "integer", "minimum": 1, "maximum": 999},
            "palette_type": {"type": "string", "enum": types, "description": "Case-insensitive"},
            "label": {"type": "string", "maxLength": 100}
        },
        "required": ["palette_number", "palette_type"],
        "additionalProperties": false
    })
}

fn record_palette(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: RecordPaletteInput = parse_args(arguments)?;
    let number = palette_number(input.palette_number)?;
    let palette_type = validate_palette_type(input.palette_type.trim())?;
    let label = input.label.as_deref().map(str::trim);
    let label = label.filter(|l| !l.is_empty());
    let formatted = label.map(validate_label).transpose()?;

    let command = CommandDescriptor::RecordPalette {
        number,
        palette_type,
        label: formatted,
    };
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Recorded {} palette {}", palette_type, number),
        json!({
            "palette_number": number,
            "type": palette_type.as_str(),
            "label": label,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApplyPaletteInput {
    palette_number: i64,
    #[serde(default)]
    start_channel: Option<i64>,
    #[serde(default)]
    end_channel: Option<i64>,
}

fn apply_palette_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "palette_number": {"type": "integer", "minimum": 1, "maximum": 999},
            "start_channel": {"type": "integer", "minimum": 1, "maximum": 99999},
            "end_channel": {"type": "integer", "minimum": 1, "maximum": 99999}
        },
        "required": ["palette_number"],
        "additionalProperties": false
    })
}

fn apply_palette(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: ApplyPaletteInput = parse_args(arguments)?;
    let number = palette_number(input.palette_number)?;
    let selection = match (input.start_channel, input.end_channel) {
        (Some(start), end) => {
            let start = validate_channel(start)?;
            let end = end.map(validate_channel).transpose()?;
            check_order(start, end)?;
            Some(match end {
                Some(end) => ChannelSelection::range(start, end),
                None => ChannelSelection::single(start),
            })
        }
        (None, Some(_)) => {
            let message = "end_channel requires start_channel";
            return Err(ToolError::precondition(message));
        }
        (None, None) => None,
    };

    let command = CommandDescriptor::ApplyPalette { number, selection };
    let sent = client.dispatch(&command.encode())?;

    let applied_to = match selection {
        Some(selection) => match selection.end {
            Some(end) => format!("channels {}-{}", selection.start, end),
            None => format!("channel {}", selection.start),
        },
        None => "current selection".to_string(),
    };
    ToolResponse::ok(
        format!("Applied palette {}", number),
        json!({ "palette_number": number, "applied_to": applied_to }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteNumberInput {
    palette_number: i64,
}

fn palette_number_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "palette_number": {"type": "integer", "minimum": 1, "maximum": 999}
        },
        "required": ["palette_number"],
        "additionalProperties": false
    })
}

fn delete_palette(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: PaletteNumberInput = parse_args(arguments)?;
    let number = palette_number(input.palette_number)?;

    let command = CommandDescriptor::DeleteEntity(DeleteTarget::Preset(number));
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Deleted palette {}", number),
        json!({ "palette_number": number }),
    )
    .with_warning(UNDO_WARNING)
    .with_command(sent)
    .into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eosbridge_control::RecordingTransport;
    use std::sync::Arc;

    fn client() -> (Arc<RecordingTransport>, EosClient) {
        let transport = Arc::new(RecordingTransport::new());
        (transport.clone(), EosClient::new(transport, 1, false, 3033))
    }

    #[test]
    fn test_record_palette_normalizes_type() {
        let (_, client) = client();
        let args = json!({"palette_number": 1, "palette_type": "color", "label": "Warm Amber"});
        let result = record_palette(&client, args).unwrap();
        assert_eq!(
            result["command_sent"],
            "Record Preset 1 Color Label Warm_Amber#"
        );
        assert_eq!(result["message"], "Recorded Color palette 1");
        assert_eq!(result["details"]["type"], "Color");
    }

    #[test]
    fn test_record_palette_rejects_unknown_type() {
        let (transport, client) = client();
        let args = json!({"palette_number": 1, "palette_type": "Gobo"});
        assert!(record_palette(&client, args).is_err());
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_apply_palette_forms() {
        let (_, client) = client();
        let result = apply_palette(&client, json!({"palette_number": 2})).unwrap();
        assert_eq!(result["command_sent"], "Preset 2#");
        assert_eq!(result["details"]["applied_to"], "current selection");

        let args = json!({"palette_number": 2, "start_channel": 5});
        let result = apply_palette(&client, args).unwrap();
        assert_eq!(result["command_sent"], "Chan 5 Preset 2#");
        assert_eq!(result["details"]["applied_to"], "channel 5");

        let args = json!({"palette_number": 2, "start_channel": 1, "end_channel": 10});
        let result = apply_palette(&client, args).unwrap();
        assert_eq!(result["command_sent"], "Chan 1 Thru 10 Preset 2#");
        assert_eq!(result["details"]["applied_to"], "channels 1-10");
    }

    #[test]
    fn test_apply_palette_bad_range() {
        let (_, client) = client();
        let reversed = json!({"palette_number": 2, "start_channel": 10, "end_channel": 1});
        assert!(apply_palette(&client, reversed).is_err());
        let open_start = json!({"palette_number": 2, "end_channel": 1});
        assert!(apply_palette(&client, open_start).is_err());
    }

    #[test]
    fn test_delete_palette() {
        let (_, client) = client();
        let result = delete_palette(&client, json!({"palette_number": 4})).unwrap();
        assert_eq!(result["command_sent"], "Delete Preset 4#");
        assert_eq!(result["warning"], UNDO_WARNING);
    }
}
