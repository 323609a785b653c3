//! Cue tools: record, update, timing, fire, delete

use eosbridge_control::{
    format_number, validate_cue_number, validate_label, validate_time, CommandDescriptor, CueNumber,
    CueTiming, DeleteTarget, EosClient,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{check_range, parse_args, ToolResponse, ToolSpec, UNDO_WARNING};
use crate::error::{ToolError, ToolResult};

pub const MAX_CUE_LIST: i64 = 999;

pub fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "eos_record_cue",
            description: "Record the current console state as a cue. Decimal numbers record point \
                          cues (1.5). Blind mode leaves live output untouched.",
            failure: "Failed to record cue",
            schema: record_cue_schema,
            handler: record_cue,
        },
        ToolSpec {
            name: "eos_update_cue",
            description: "Update an existing cue with the current selection and values. Channels \
                          not selected stay as they are in the cue.",
            failure: "Failed to update cue",
            schema: update_cue_schema,
            handler: update_cue,
        },
        ToolSpec {
            name: "eos_set_cue_timing",
            description: "Set fade, delay and follow times (seconds) of a cue. At least one time \
                          is required.",
            failure: "Failed to set cue timing",
            schema: cue_timing_schema,
            handler: set_cue_timing,
        },
        ToolSpec {
            name: "eos_fire_cue",
            description: "Fire a cue with its programmed timing, as if selected and GO pressed.",
            failure: "Failed to fire cue",
            schema: cue_ref_schema,
            handler: fire_cue,
        },
        ToolSpec {
            name: "eos_delete_cue",
            description: "Delete a cue from its cue list. This cannot be easily undone.",
            failure: "Failed to delete cue",
            schema: cue_ref_schema,
            handler: delete_cue,
        },
    ]
}

fn default_list() -> i64 {
    1
}

fn cue_properties() -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        "cue_number".to_string(),
        json!({
            "type": "number",
            "exclusiveMinimum": 0,
            "maximum": 99999,
            "description": "Cue number, e.g. 10 or 1.5"
        }),
    );
    props.insert(
        "cue_list".to_string(),
        json!({"type": "integer", "minimum": 1, "maximum": 999, "default": 1}),
    );
    props
}

fn object_schema(props: Map<String, Value>) -> Value {
    json!({
        "type": "object",
        "properties": props,
        "required": ["cue_number"],
        "additionalProperties": false
    })
}

/// Validated (list, number) pair
fn cue_ref(list: i64, number: f64) -> ToolResult<(u32, CueNumber)> {
    let number = validate_cue_number(number)?;
    let list = check_range("cue_list", list, 1, MAX_CUE_LIST)? as u32;
    Ok((list, number))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordCueInput {
    cue_number: f64,
    #[serde(default = "default_list")]
    cue_list: i64,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    blind: bool,
}

fn record_cue_schema() -> Value {
    let mut props = cue_properties();
    props.insert(
        "label".to_string(),
        json!({"type": "string", "maxLength": 100}),
    );
    props.insert(
        "blind".to_string(),
        json!({
            "type": "boolean",
            "default": false,
            "description": "Record without affecting live output"
        }),
    );
    object_schema(props)
}

fn record_cue(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: RecordCueInput = parse_args(arguments)?;
    let (list, number) = cue_ref(input.cue_list, input.cue_number)?;
    let label = input.label.as_deref().map(str::trim);
    let label = label.filter(|l| !l.is_empty());
    let formatted = label.map(validate_label).transpose()?;

    let command = CommandDescriptor::RecordCue {
        list,
        number,
        label: formatted,
        blind: input.blind,
    };
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Recorded cue {}/{}", list, number),
        json!({
            "cue_number": number,
            "cue_list": list,
            "label": label,
            "blind": input.blind,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateCueInput {
    cue_number: f64,
    #[serde(default = "default_list")]
    cue_list: i64,
    #[serde(default)]
    blind: bool,
}

fn update_cue_schema() -> Value {
    let mut props = cue_properties();
    props.insert(
        "blind".to_string(),
        json!({"type": "boolean", "default": false}),
    );
    object_schema(props)
}

fn update_cue(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: UpdateCueInput = parse_args(arguments)?;
    let (list, number) = cue_ref(input.cue_list, input.cue_number)?;

    let command = CommandDescriptor::UpdateCue {
        list,
        number,
        blind: input.blind,
    };
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Updated cue {}/{}", list, number),
        json!({
            "cue_number": number,
            "cue_list": list,
            "blind": input.blind,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetCueTimingInput {
    cue_number: f64,
    #[serde(default = "default_list")]
    cue_list: i64,
    #[serde(default)]
    fade_time: Option<f64>,
    #[serde(default)]
    delay_time: Option<f64>,
    #[serde(default)]
    follow_time: Option<f64>,
}

fn cue_timing_schema() -> Value {
    let time = json!({"type": "number", "minimum": 0, "maximum": 3600});
    let mut props = cue_properties();
    props.insert("fade_time".to_string(), time.clone());
    props.insert("delay_time".to_string(), time.clone());
    props.insert("follow_time".to_string(), time);
    object_schema(props)
}

fn set_cue_timing(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: SetCueTimingInput = parse_args(arguments)?;
    let (list, number) = cue_ref(input.cue_list, input.cue_number)?;
    let timing = CueTiming {
        fade: input.fade_time.map(validate_time).transpose()?,
        delay: input.delay_time.map(validate_time).transpose()?,
        follow: input.follow_time.map(validate_time).transpose()?,
    };
    if timing.is_empty() {
        return Err(ToolError::precondition("At least one timing parameter must be specified"));
    }

    let command = CommandDescriptor::SetCueTiming {
        list,
        number,
        timing,
    };
    let sent = client.dispatch(&command.encode())?;

    let times = [
        ("fade", timing.fade),
        ("delay", timing.delay),
        ("follow", timing.follow),
    ];
    let mut details = Map::new();
    for (key, value) in times {
        if let Some(seconds) = value {
            let text = format!("{}s", format_number(seconds));
            details.insert(key.to_string(), json!(text));
        }
    }
    ToolResponse::ok(
        format!("Set timing for cue {}/{}", list, number),
        json!({
            "cue_number": number,
            "cue_list": list,
            "timing": details,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CueRefInput {
    cue_number: f64,
    #[serde(default = "default_list")]
    cue_list: i64,
}

fn cue_ref_schema() -> Value {
    object_schema(cue_properties())
}

fn fire_cue(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: CueRefInput = parse_args(arguments)?;
    let (list, number) = cue_ref(input.cue_list, input.cue_number)?;

    let command = CommandDescriptor::FireCue { list, number };
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Fired cue {}/{}", list, number),
        json!({ "cue_number": number, "cue_list": list }),
    )
    .with_command(sent)
    .into_value()
}

fn delete_cue(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: CueRefInput = parse_args(arguments)?;
    let (list, number) = cue_ref(input.cue_list, input.cue_number)?;

    let command = CommandDescriptor::DeleteEntity(DeleteTarget::Cue { list, number });
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Deleted cue {}/{}", list, number),
        json!({ "cue_number": number, "cue_list": list }),
    )
    .with_warning(UNDO_WARNING)
    .with_command(sent)
    .into_value()
}
