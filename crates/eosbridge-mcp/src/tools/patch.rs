//! Patch tools: patch, unpatch, Augment3d position

use eosbridge_control::{
    validate_channel, validate_dmx_address, CommandDescriptor, EosClient, FixturePosition,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{check_order, check_range, check_text, parse_args, ToolResponse, ToolSpec};
use crate::error::ToolResult;

pub const MAX_PATCH_QUANTITY: i64 = 100;

pub fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "eos_patch_fixture",
            description: "Patch a fixture to a channel at a DMX address. With quantity > 1, \
                          fixtures are patched sequentially with incrementing channels and \
                          addresses.",
            failure: "Failed to patch fixture",
            schema: patch_fixture_schema,
            handler: patch_fixture,
        },
        ToolSpec {
            name: "eos_unpatch_channel",
            description: "Remove a channel or a range of channels from the patch.",
            failure: "Failed to unpatch channel(s)",
            schema: unpatch_channel_schema,
            handler: unpatch_channel,
        },
        ToolSpec {
            name: "eos_set_fixture_position",
            description: "Set the Augment3d position (meters) and orientation (degrees) of a \
                          fixture. X is stage left (-) to right (+), Y downstage (-) to upstage \
                          (+), Z height above stage.",
            failure: "Failed to set fixture position",
            schema: set_position_schema,
            handler: set_fixture_position,
        },
        ToolSpec {
            name: "eos_get_patch_info",
            description: "Request patch position information for a channel. The answer arrives as \
                          console feedback, so OSC receive must be enabled to see it.",
            failure: "Failed to request patch information",
            schema: channel_schema,
            handler: get_patch_info,
        },
    ]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchFixtureInput {
    channel: i64,
    universe: i64,
    address: i64,
    #[serde(default)]
    fixture_type: Option<String>,
    #[serde(default = "default_quantity")]
    quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

fn patch_fixture_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel": {
                "type": "integer",
                "minimum": 1,
                "maximum": 99999,
                "description": "Channel number"
            },
            "universe": {
                "type": "integer",
                "minimum": 1,
                "maximum": 255,
                "description": "DMX universe"
            },
            "address": {
                "type": "integer",
                "minimum": 1,
                "maximum": 512,
                "description": "DMX address within the universe"
            },
            "fixture_type": {
                "type": "string",
                "maxLength": 100,
                "description": "Fixture type from the Eos library, e.g. 'Source_Four_LED'"
            },
            "quantity": {"type": "integer", "minimum": 1, "maximum": 100, "default": 1}
        },
        "required": ["channel", "universe", "address"],
        "additionalProperties": false
    })
}

fn patch_fixture(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: PatchFixtureInput = parse_args(arguments)?;
    let channel = validate_channel(input.channel)?;
    let address = validate_dmx_address(input.universe, input.address)?;
    let fixture_type = check_text("fixture_type", input.fixture_type, 100)?;
    let quantity = check_range("quantity", input.quantity, 1, MAX_PATCH_QUANTITY)? as u32;

    let encoded = CommandDescriptor::PatchFixture {
        channel,
        address,
        fixture_type: fixture_type.clone(),
        quantity,
    }
    .encode();
    let sent = client.dispatch(&encoded)?;

    ToolResponse::ok(
        format!("Patched channel(s) starting at {}", channel),
        json!({
            "channel": channel,
            "dmx_address": address.to_string(),
            "fixture_type": fixture_type.as_deref().unwrap_or("Generic"),
            "quantity": quantity,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnpatchChannelInput {
    start_channel: i64,
    #[serde(default)]
    end_channel: Option<i64>,
}

fn unpatch_channel_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "start_channel": {"type": "integer", "minimum": 1, "maximum": 99999},
            "end_channel": {
                "type": "integer",
                "minimum": 1,
                "maximum": 99999,
                "description": "Last channel of a range"
            }
        },
        "required": ["start_channel"],
        "additionalProperties": false
    })
}

fn unpatch_channel(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: UnpatchChannelInput = parse_args(arguments)?;
    let start = validate_channel(input.start_channel)?;
    let end = input.end_channel.map(validate_channel).transpose()?;
    check_order(start, end)?;

    let command = CommandDescriptor::UnpatchRange { start, end };
    let sent = client.dispatch(&command.encode())?;

    let (message, count) = match end {
        Some(end) => {
            let message = format!("Unpatched channels {} through {}", start, end);
            (message, end - start + 1)
        }
        None => (format!("Unpatched channel {}", start), 1),
    };
    ToolResponse::ok(
        message,
        json!({
            "start_channel": start,
            "end_channel": end,
            "channels_affected": count,
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SetFixturePositionInput {
    channel: i64,
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    pan: f64,
    #[serde(default)]
    tilt: f64,
    #[serde(default)]
    roll: f64,
}

fn set_position_schema() -> Value {
    let angle = json!({"type": "number", "minimum": 0, "maximum": 360, "default": 0});
    json!({
        "type": "object",
        "properties": {
            "channel": {"type": "integer", "minimum": 1, "maximum": 99999},
            "x": {"type": "number", "description": "Meters, stage left (-) to right (+)"},
            "y": {"type": "number", "description": "Meters, downstage (-) to upstage (+)"},
            "z": {"type": "number", "minimum": 0, "description": "Meters above the stage"},
            "pan": angle,
            "tilt": angle,
            "roll": angle
        },
        "required": ["channel", "x", "y", "z"],
        "additionalProperties": false
    })
}

fn set_fixture_position(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: SetFixturePositionInput = parse_args(arguments)?;
    let channel = validate_channel(input.channel)?;
    let position = FixturePosition {
        x: input.x,
        y: input.y,
        z: check_range("z", input.z, 0.0, f64::MAX)?,
        pan: check_range("pan", input.pan, 0.0, 360.0)?,
        tilt: check_range("tilt", input.tilt, 0.0, 360.0)?,
        roll: check_range("roll", input.roll, 0.0, 360.0)?,
    };

    let command = CommandDescriptor::SetFixturePosition { channel, position };
    let sent = client.dispatch(&command.encode())?;

    ToolResponse::ok(
        format!("Set position for channel {}", channel),
        json!({
            "channel": channel,
            "position": {"x": position.x, "y": position.y, "z": position.z},
            "orientation": {
                "pan": position.pan,
                "tilt": position.tilt,
                "roll": position.roll
            },
        }),
    )
    .with_command(sent)
    .into_value()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChannelInput {
    channel: i64,
}

fn channel_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "channel": {"type": "integer", "minimum": 1, "maximum": 99999}
        },
        "required": ["channel"],
        "additionalProperties": false
    })
}

fn get_patch_info(client: &EosClient, arguments: Value) -> ToolResult<Value> {
    let input: ChannelInput = parse_args(arguments)?;
    let channel = validate_channel(input.channel)?;
    client.get_patch_position(channel)?;

    ToolResponse::ok(
        format!("Requested patch info for channel {}", channel),
        json!({ "channel": channel }),
    )
    .with_note("Enable OSC receive to see the console's response")
    .into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eosbridge_control::{OscArg, RecordingTransport};
    use std::sync::Arc;

    fn client() -> (Arc<RecordingTransport>, EosClient) {
        let transport = Arc::new(RecordingTransport::new());
        (transport.clone(), EosClient::new(transport, 1, false, 3033))
    }

    #[test]
    fn test_patch_fixture() {
        let (transport, client) = client();
        let args = json!({
            "channel": 1,
            "universe": 1,
            "address": 1,
            "fixture_type": "Source_Four_LED",
            "quantity": 4
        });
        let result = patch_fixture(&client, args).unwrap();
        assert_eq!(
            result["command_sent"],
            "Chan 1 Patch 1/1 Source_Four_LED Qty 4#"
        );
        assert_eq!(result["details"]["dmx_address"], "1/1");
        assert_eq!(
            transport.last().unwrap().1,
            vec![OscArg::from("Chan 1 Patch 1/1 Source_Four_LED Qty 4#")]
        );
    }

    #[test]
    fn test_patch_defaults_to_generic() {
        let (_, client) = client();
        let args = json!({"channel": 5, "universe": 2, "address": 256});
        let result = patch_fixture(&client, args).unwrap();
        assert_eq!(result["command_sent"], "Chan 5 Patch 2/256#");
        assert_eq!(result["details"]["fixture_type"], "Generic");
    }

    #[test]
    fn test_patch_rejects_bad_input_without_sending() {
        let (transport, client) = client();
        let rejected = [
            json!({"channel": 1, "universe": 256, "address": 1}),
            json!({"channel": 1, "universe": 1, "address": 1, "quantity": 0}),
            json!({"channel": 1, "universe": 1, "address": 1, "extra": true}),
        ];
        for args in rejected {
            assert!(patch_fixture(&client, args).is_err());
        }
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn test_unpatch_range() {
        let (_, client) = client();
        let args = json!({"start_channel": 1, "end_channel": 10});
        let result = unpatch_channel(&client, args).unwrap();
        assert_eq!(result["command_sent"], "Chan 1 Thru 10 Patch -#");
        assert_eq!(result["details"]["channels_affected"], 10);

        let reversed = json!({"start_channel": 10, "end_channel": 1});
        assert!(unpatch_channel(&client, reversed).is_err());
    }

    #[test]
    fn test_set_position() {
        let (transport, client) = client();
        let args = json!({"channel": 3, "x": -1.5, "y": 2.0, "z": 6.0, "pan": 90.0});
        let result = set_fixture_position(&client, args).unwrap();
        assert!(result.get("command_sent").is_none());
        let (address, args) = transport.last().unwrap();
        assert_eq!(address, "/eos/set/patch/3/augment3d/position");
        assert_eq!(args[0], OscArg::Float(-1.5));
        assert_eq!(args[3], OscArg::Float(90.0));

        let below_stage = json!({"channel": 3, "x": 0, "y": 0, "z": -1});
        assert!(set_fixture_position(&client, below_stage).is_err());
        let over_tilted = json!({"channel": 3, "x": 0, "y": 0, "z": 1, "tilt": 361});
        assert!(set_fixture_position(&client, over_tilted).is_err());
    }

    #[test]
    fn test_get_patch_info() {
        let (transport, client) = client();
        let result = get_patch_info(&client, json!({"channel": 12})).unwrap();
        assert!(result["note"].is_string());
        assert_eq!(
            transport.last().unwrap().0,
            "/eos/get/patch/12/augment3d/position"
        );
    }
}
