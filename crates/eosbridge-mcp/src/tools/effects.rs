//! Effect tools

use eosbridge_control::command::DEFAULT_EFFECT_PARAMETER;
use eosbridge_control::{
    validate_channel, validate_effect_rate, validate_effect_size, ChannelSelection,
    CommandDescriptor, DeleteTarget, EosClient,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_order, check_range, check_text, parse_args, ToolResponse, ToolSpec, UNDO_WARNING};
use crate::error::ToolResult;

pub const MAX_EFFECT_NUMBER: i64 = 999;

pub fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "eos_create_effect",
            description: "Create an effect over a channel range on one parameter (default Intens), \
                          with optional rate, size and waveform.",
            failure: "Failed to create effect",
            schema: create_effect_schema,
            handler: create_effect,
        },
        ToolSpec {
            name: "eos_delete_effect",
            description: "Delete an effect. This cannot be easily undone.",
            failure: "Failed to delete effect",
            schema: effect_number_schema,
            handler: delete_effect,
        },
    ]
}

fn default_parameter() -> String {
    DEFAULT_EFFECT_PARAMETER.to_string()
}

fn effect_number(value: i64) -> ToolResult<u32> {
    Ok(check_range("effect_number", value, 1, MAX_EFFECT_NUMBER)? as u32)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateEffectInput {
    effect_number: i64,
    start_channel: i64,
    end_channel: i64,
    #[serde(default = "default_parameter")]
    parameter: String,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    size: Option<f64>,
    #[serde(default)]
    waveform: Option<String>,
}

fn create_effect_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "effect_number": {"type": "integer", "minimum": 1, "maximum": 999},
            "start_channel": {"type": "integer", "minimum": 1, "maximum": 99999},
            "end_channel": {"type": "integer", "minimum": 1, "maximum": 99999},
            "parameter": {
                "type": "string",
                "maxLength": 50,
                "default": DEFAULT_EFFECT_PARAMETER
            },
            "rate": {
                "type": "number",
                "minimum": 0.1,
                "maximum": 1000,
                "description": "Effect rate"
            },
            "size": {
                "type": "number",
                "minimum": 0,
                "maximum": 100,
                "description": "Effect size, percent"
            },
            "waveform": {
                "type": "string",
                "maxLength": 50,
                "description": "e.g. Sine, Square, Ramp"
            }
        },
        "required": ["effect_number", "start_channel", "end_channel"],
        "additionalProperties": false
    })
}

fn create_effect(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: CreateEffectInput = parse_args(arguments)?;
    let number = effect_number(input.effect_number)?;
    let start = validate_channel(input.start_channel)?;
    let end = validate_channel(input.end_channel)?;
    check_order(start, Some(end))?;
    let rate = input.rate.map(validate_effect_rate).transpose()?;
    let size = input.size.map(validate_effect_size).transpose()?;
    let parameter = check_text("parameter", Some(input.parameter), 50)?;
    let parameter = parameter.unwrap_or_else(default_parameter);
    let waveform = check_text("waveform", input.waveform, 50)?;

    let command = CommandDescriptor::CreateEffect {
        number,
        selection: ChannelSelection::range(start, end),
        parameter: parameter.clone(),
        rate,
        size,
        waveform: waveform.clone(),
    };
    let sent = client.dispatch(&command.encode())?;

    let mut parameters = json!({ "parameter": parameter });
    if let Some(rate) = rate {
        parameters["rate"] = json!(rate);
    }
    if let Some(size) = size {
        parameters["size"] = json!(size);
    }
    if let Some(waveform) = waveform {
        parameters["waveform"] = json!(waveform);
    }
    ToolResponse::ok(
        format!("Created effect {}", number),
        json!({
            "effect_number": number,
            "channels": format!("{}-{}", start, end),
            "parameters": parameters,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EffectNumberInput {
    effect_number: i64,
}

fn effect_number_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "effect_number": {"type": "integer", "minimum": 1, "maximum": 999}
        },
        "required": ["effect_number"],
        "additionalProperties": false
    })
}

fn delete_effect(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: EffectNumberInput = parse_args(arguments)?;
    let number = effect_number(input.effect_number)?;

    let command = CommandDescriptor::DeleteEntity(DeleteTarget::Effect(number));
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Deleted effect {}", number),
        json!({ "effect_number": number }),
    )
    .with_warning(UNDO_WARNING)
    .with_command(sent)
    .into_value()
}
