//! Eos OSC address space
//!
//! Generates the outbound addresses the console listens on. User-scoped
//! addresses route through a specific Eos user so commands do not collide
//! with an operator's command line.

use crate::command::{format_number, DirectCall};
use crate::osc::types::OscArg;
use crate::validate::CueNumber;

/// Console ping address
pub const PING_ADDRESS: &str = "/eos/ping";

/// `/eos/user/{u}/newcmd` - replaces the command line
pub fn newcmd_address(user_id: u32) -> String {
    format!("/eos/user/{}/newcmd", user_id)
}

/// `/eos/user/{u}/key/{name}` - hardkey press
pub fn key_address(user_id: u32, key: &str) -> String {
    format!("/eos/user/{}/key/{}", user_id, key)
}

/// `/eos/user/{u}/chan/{channel}` - direct channel level
pub fn channel_address(user_id: u32, channel: u32) -> String {
    format!("/eos/user/{}/chan/{}", user_id, channel)
}

/// `/eos/user/{u}/cue/{list}/{number}/fire`
pub fn fire_cue_address(user_id: u32, list: u32, number: CueNumber) -> String {
    format!("/eos/user/{}/cue/{}/{}/fire", user_id, list, number)
}

/// `/eos/user/{u}/macro/{number}/fire`
pub fn fire_macro_address(user_id: u32, number: u32) -> String {
    format!("/eos/user/{}/macro/{}/fire", user_id, number)
}

/// `/eos/set/patch/{channel}/augment3d/position`
pub fn set_position_address(channel: u32) -> String {
    format!("/eos/set/patch/{}/augment3d/position", channel)
}

/// `/eos/get/patch/{channel}/augment3d/position`
pub fn get_position_address(channel: u32) -> String {
    format!("/eos/get/patch/{}/augment3d/position", channel)
}

/// Resolve a direct call to its address and arguments
pub fn direct_call_message(user_id: u32, call: &DirectCall) -> (String, Vec<OscArg>) {
    match call {
        DirectCall::FireCue { list, number } => (
            fire_cue_address(user_id, *list, *number),
            vec![OscArg::Float(1.0)],
        ),
        DirectCall::SetPosition { channel, position } => (
            set_position_address(*channel),
            position.to_args().into_iter().map(OscArg::Float).collect(),
        ),
    }
}

/// Short human-readable description of a direct call, for logs and results
pub fn describe_direct_call(call: &DirectCall) -> String {
    match call {
        DirectCall::FireCue { list, number } => format!("fire cue {}/{}", list, number),
        DirectCall::SetPosition { channel, position } => format!(
            "position channel {} at ({}, {}, {})",
            channel,
            format_number(position.x),
            format_number(position.y),
            format_number(position.z)
        ),
    }
}
