//! Eos command-line encoder
//!
//! Turns a validated [`CommandDescriptor`] into the console's command-line
//! syntax (`Chan 1 Patch 1/1#`, `Record Cue 1/10#`, ...). Encoding is pure
//! string assembly and never fails; range checks happen in [`crate::validate`]
//! before a descriptor is built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::{sanitize_label, CueNumber, DmxAddress, PaletteType};

/// Command-line terminator; executes the command on the console
pub const TERMINATOR: char = '#';

/// Default effect parameter when none is named
pub const DEFAULT_EFFECT_PARAMETER: &str = "Intens";

/// Render a number the way the console reads it: `10`, `1.5`, `0.25`
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Format a DMX address token (`universe/address`)
pub fn format_address(universe: u16, address: u16) -> String {
    format!("{}/{}", universe, address)
}

/// `Chan 1 + 5 + 10`
pub fn build_channel_list(channels: &[u32]) -> String {
    let joined = channels
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" + ");
    format!("Chan {}", joined)
}

/// A contiguous channel selection (`Chan 1 Thru 10 Step 2`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSelection {
    pub start: u32,
    pub end: Option<u32>,
    pub step: Option<u32>,
}

impl ChannelSelection {
    pub fn single(channel: u32) -> Self {
        Self {
            start: channel,
            end: None,
            step: None,
        }
    }

    pub fn range(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
            step: None,
        }
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.step = Some(step);
        self
    }
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chan {}", self.start)?;
        if let Some(end) = self.end {
            write!(f, " Thru {}", end)?;
        }
        if let Some(step) = self.step {
            write!(f, " Step {}", step)?;
        }
        Ok(())
    }
}

/// Fade, delay and follow times in seconds; absent fields are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CueTiming {
    pub fade: Option<f64>,
    pub delay: Option<f64>,
    pub follow: Option<f64>,
}

impl CueTiming {
    pub fn is_empty(&self) -> bool {
        self.fade.is_none() && self.delay.is_none() && self.follow.is_none()
    }
}

/// Augment3d position (meters) and orientation (degrees)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixturePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub pan: f64,
    pub tilt: f64,
    pub roll: f64,
}

impl FixturePosition {
    pub fn to_args(&self) -> [f64; 6] {
        [self.x, self.y, self.z, self.pan, self.tilt, self.roll]
    }
}

/// Deletable console entities
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeleteTarget {
    /// Cues are always addressed through their list
    Cue { list: u32, number: CueNumber },
    Effect(u32),
    Preset(u32),
    Group(u32),
}

/// One case per operation the bridge can issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandDescriptor {
    PatchFixture {
        channel: u32,
        address: DmxAddress,
        fixture_type: Option<String>,
        quantity: u32,
    },
    UnpatchRange {
        start: u32,
        end: Option<u32>,
    },
    RecordCue {
        list: u32,
        number: CueNumber,
        label: Option<String>,
        blind: bool,
    },
    UpdateCue {
        list: u32,
        number: CueNumber,
        blind: bool,
    },
    SetCueTiming {
        list: u32,
        number: CueNumber,
        timing: CueTiming,
    },
    FireCue {
        list: u32,
        number: CueNumber,
    },
    DeleteEntity(DeleteTarget),
    CreateEffect {
        number: u32,
        selection: ChannelSelection,
        parameter: String,
        rate: Option<f64>,
        size: Option<f64>,
        waveform: Option<String>,
    },
    RecordPalette {
        number: u32,
        palette_type: PaletteType,
        label: Option<String>,
    },
    ApplyPalette {
        number: u32,
        selection: Option<ChannelSelection>,
    },
    SetFixturePosition {
        channel: u32,
        position: FixturePosition,
    },
    /// Leaves the command line open for further input
    SelectChannels(ChannelSelection),
    SetIntensity {
        selection: ChannelSelection,
        level: f64,
    },
    RecordGroup {
        number: u32,
        label: Option<String>,
    },
}

/// A finished command-line string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedCommand(String);

impl EncodedCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// False for open selection commands
    pub fn is_terminated(&self) -> bool {
        self.0.ends_with(TERMINATOR)
    }
}

impl fmt::Display for EncodedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedCommand {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Operations that bypass the command line and use a dedicated OSC address
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DirectCall {
    FireCue { list: u32, number: CueNumber },
    SetPosition {
        channel: u32,
        position: FixturePosition,
    },
}

/// Encoder output
#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    CommandLine(EncodedCommand),
    Direct(DirectCall),
}

impl Encoded {
    pub fn command_line(&self) -> Option<&EncodedCommand> {
        match self {
            Encoded::CommandLine(cmd) => Some(cmd),
            Encoded::Direct(_) => None,
        }
    }
}

/// Encode a descriptor into console syntax
pub fn encode(descriptor: &CommandDescriptor) -> Encoded {
    descriptor.encode()
}

impl CommandDescriptor {
    /// Encode into console syntax
    pub fn encode(&self) -> Encoded {
        let line = match self {
            CommandDescriptor::PatchFixture {
                channel,
                address,
                fixture_type,
                quantity,
            } => {
                let mut cmd = format!(
                    "Chan {} Patch {}",
                    channel,
                    format_address(address.universe, address.address)
                );
                if let Some(fixture) = fixture_type.as_deref().filter(|f| !f.is_empty()) {
                    cmd.push(' ');
                    cmd.push_str(fixture);
                }
                if *quantity > 1 {
                    cmd.push_str(&format!(" Qty {}", quantity));
                }
                terminate(cmd)
            }
            CommandDescriptor::UnpatchRange { start, end } => match end {
                Some(end) => format!("Chan {} Thru {} Patch -#", start, end),
                None => format!("Chan {} Patch -#", start),
            },
            CommandDescriptor::RecordCue {
                list,
                number,
                label,
                blind,
            } => {
                let mut cmd = blind_prefix(*blind);
                cmd.push_str(&format!("Record Cue {}/{}", list, number));
                push_label(&mut cmd, label.as_deref());
                terminate(cmd)
            }
            CommandDescriptor::UpdateCue {
                list,
                number,
                blind,
            } => {
                let mut cmd = blind_prefix(*blind);
                cmd.push_str(&format!("Update Cue {}/{}", list, number));
                terminate(cmd)
            }
            CommandDescriptor::SetCueTiming {
                list,
                number,
                timing,
            } => {
                let mut cmd = format!("Cue {}/{}", list, number);
                if let Some(fade) = timing.fade {
                    cmd.push_str(&format!(" Time {}", format_number(fade)));
                }
                if let Some(delay) = timing.delay {
                    cmd.push_str(&format!(" Delay {}", format_number(delay)));
                }
                if let Some(follow) = timing.follow {
                    cmd.push_str(&format!(" Follow {}", format_number(follow)));
                }
                terminate(cmd)
            }
            CommandDescriptor::FireCue { list, number } => {
                return Encoded::Direct(DirectCall::FireCue {
                    list: *list,
                    number: *number,
                })
            }
            CommandDescriptor::DeleteEntity(target) => match target {
                DeleteTarget::Cue { list, number } => format!("Delete Cue {}/{}#", list, number),
                DeleteTarget::Effect(n) => format!("Delete Effect {}#", n),
                DeleteTarget::Preset(n) => format!("Delete Preset {}#", n),
                DeleteTarget::Group(n) => format!("Delete Group {}#", n),
            },
            CommandDescriptor::CreateEffect {
                number,
                selection,
                parameter,
                rate,
                size,
                waveform,
            } => {
                let mut cmd = format!("Effect {} {} Param {}", number, selection, parameter);
                if let Some(rate) = rate {
                    cmd.push_str(&format!(" Rate {}", format_number(*rate)));
                }
                if let Some(size) = size {
                    cmd.push_str(&format!(" Size {}", format_number(*size)));
                }
                if let Some(waveform) = waveform {
                    cmd.push_str(&format!(" Waveform {}", waveform));
                }
                terminate(cmd)
            }
            CommandDescriptor::RecordPalette {
                number,
                palette_type,
                label,
            } => {
                let mut cmd = format!("Record Preset {} {}", number, palette_type);
                push_label(&mut cmd, label.as_deref());
                terminate(cmd)
            }
            CommandDescriptor::ApplyPalette { number, selection } => match selection {
                Some(selection) => format!("{} Preset {}#", selection, number),
                None => format!("Preset {}#", number),
            },
            CommandDescriptor::SetFixturePosition { channel, position } => {
                return Encoded::Direct(DirectCall::SetPosition {
                    channel: *channel,
                    position: *position,
                })
            }
            // No terminator: the selection stays live on the command line
            CommandDescriptor::SelectChannels(selection) => selection.to_string(),
            CommandDescriptor::SetIntensity { selection, level } => {
                format!("{} At {}#", selection, format_number(*level))
            }
            CommandDescriptor::RecordGroup { number, label } => {
                let mut cmd = format!("Record Group {}", number);
                push_label(&mut cmd, label.as_deref());
                terminate(cmd)
            }
        };

        Encoded::CommandLine(EncodedCommand(line))
    }
}

fn blind_prefix(blind: bool) -> String {
    if blind {
        "Blind ".to_string()
    } else {
        String::new()
    }
}

fn push_label(cmd: &mut String, label: Option<&str>) {
    if let Some(label) = label.filter(|l| !l.is_empty()) {
        cmd.push_str(" Label ");
        cmd.push_str(&sanitize_label(label));
    }
}

fn terminate(mut cmd: String) -> String {
    cmd.push(TERMINATOR);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate_cue_number, validate_dmx_address};

    fn cue(n: f64) -> CueNumber {
        validate_cue_number(n).unwrap()
    }

    fn line(descriptor: CommandDescriptor) -> String {
        match descriptor.encode() {
            Encoded::CommandLine(cmd) => cmd.into_string(),
            Encoded::Direct(call) => panic!("expected command line, got {:?}", call),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(0.25), "0.25");
    }

    #[test]
    fn test_channel_selection() {
        assert_eq!(ChannelSelection::single(1).to_string(), "Chan 1");
        assert_eq!(ChannelSelection::range(1, 10).to_string(), "Chan 1 Thru 10");
        assert_eq!(
            ChannelSelection::range(1, 10).with_step(2).to_string(),
            "Chan 1 Thru 10 Step 2"
        );
    }

    #[test]
    fn test_channel_list() {
        assert_eq!(build_channel_list(&[1, 5, 10, 15]), "Chan 1 + 5 + 10 + 15");
        assert_eq!(build_channel_list(&[7]), "Chan 7");
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address(1, 1), "1/1");
        assert_eq!(format_address(2, 256), "2/256");
    }

    #[test]
    fn test_patch() {
        let address = validate_dmx_address(1, 1).unwrap();
        let patch = |fixture_type: Option<&str>, quantity| CommandDescriptor::PatchFixture {
            channel: 1,
            address,
            fixture_type: fixture_type.map(String::from),
            quantity,
        };
        assert_eq!(line(patch(None, 1)), "Chan 1 Patch 1/1#");
        assert_eq!(line(patch(None, 10)), "Chan 1 Patch 1/1 Qty 10#");
        assert_eq!(
            line(patch(Some("Source_Four"), 1)),
            "Chan 1 Patch 1/1 Source_Four#"
        );
        assert_eq!(line(patch(Some("405"), 4)), "Chan 1 Patch 1/1 405 Qty 4#");
    }

    #[test]
    fn test_unpatch() {
        assert_eq!(
            line(CommandDescriptor::UnpatchRange {
                start: 1,
                end: None
            }),
            "Chan 1 Patch -#"
        );
        assert_eq!(
            line(CommandDescriptor::UnpatchRange {
                start: 1,
                end: Some(10)
            }),
            "Chan 1 Thru 10 Patch -#"
        );
    }

    #[test]
    fn test_record_cue() {
        let record = |number, list, label: Option<&str>, blind| CommandDescriptor::RecordCue {
            list,
            number: cue(number),
            label: label.map(String::from),
            blind,
        };
        assert_eq!(line(record(10.0, 1, None, false)), "Record Cue 1/10#");
        assert_eq!(
            line(record(1.5, 1, Some("My Cue"), false)),
            "Record Cue 1/1.5 Label My_Cue#"
        );
        assert_eq!(line(record(5.0, 2, None, true)), "Blind Record Cue 2/5#");
    }

    #[test]
    fn test_update_cue() {
        assert_eq!(
            line(CommandDescriptor::UpdateCue {
                list: 1,
                number: cue(10.0),
                blind: false
            }),
            "Update Cue 1/10#"
        );
        assert_eq!(
            line(CommandDescriptor::UpdateCue {
                list: 3,
                number: cue(1.5),
                blind: true
            }),
            "Blind Update Cue 3/1.5#"
        );
    }

    #[test]
    fn test_cue_timing_order() {
        let timing = |fade, delay, follow| CommandDescriptor::SetCueTiming {
            list: 1,
            number: cue(10.0),
            timing: CueTiming {
                fade,
                delay,
                follow,
            },
        };
        assert_eq!(line(timing(Some(3.0), None, None)), "Cue 1/10 Time 3#");
        assert_eq!(
            line(timing(Some(3.0), Some(1.0), None)),
            "Cue 1/10 Time 3 Delay 1#"
        );
        assert_eq!(
            line(timing(Some(2.5), Some(0.5), Some(10.0))),
            "Cue 1/10 Time 2.5 Delay 0.5 Follow 10#"
        );
        assert_eq!(line(timing(None, None, Some(4.0))), "Cue 1/10 Follow 4#");
    }

    #[test]
    fn test_effect() {
        let effect = CommandDescriptor::CreateEffect {
            number: 1,
            selection: ChannelSelection::range(1, 10),
            parameter: DEFAULT_EFFECT_PARAMETER.to_string(),
            rate: Some(2.0),
            size: Some(50.0),
            waveform: None,
        };
        assert_eq!(
            line(effect),
            "Effect 1 Chan 1 Thru 10 Param Intens Rate 2 Size 50#"
        );

        let effect = CommandDescriptor::CreateEffect {
            number: 3,
            selection: ChannelSelection::range(5, 8),
            parameter: "Pan".to_string(),
            rate: None,
            size: None,
            waveform: Some("Sine".to_string()),
        };
        assert_eq!(
            line(effect),
            "Effect 3 Chan 5 Thru 8 Param Pan Waveform Sine#"
        );
    }

    #[test]
    fn test_palettes() {
        assert_eq!(
            line(CommandDescriptor::RecordPalette {
                number: 5,
                palette_type: PaletteType::Focus,
                label: None
            }),
            "Record Preset 5 Focus#"
        );
        assert_eq!(
            line(CommandDescriptor::RecordPalette {
                number: 10,
                palette_type: PaletteType::Color,
                label: Some("Deep Blue".to_string())
            }),
            "Record Preset 10 Color Label Deep_Blue#"
        );
        assert_eq!(
            line(CommandDescriptor::ApplyPalette {
                number: 5,
                selection: None
            }),
            "Preset 5#"
        );
        assert_eq!(
            line(CommandDescriptor::ApplyPalette {
                number: 5,
                selection: Some(ChannelSelection::range(1, 10))
            }),
            "Chan 1 Thru 10 Preset 5#"
        );
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            line(CommandDescriptor::DeleteEntity(DeleteTarget::Cue {
                list: 1,
                number: cue(10.0)
            })),
            "Delete Cue 1/10#"
        );
        assert_eq!(
            line(CommandDescriptor::DeleteEntity(DeleteTarget::Effect(4))),
            "Delete Effect 4#"
        );
        assert_eq!(
            line(CommandDescriptor::DeleteEntity(DeleteTarget::Preset(5))),
            "Delete Preset 5#"
        );
        assert_eq!(
            line(CommandDescriptor::DeleteEntity(DeleteTarget::Group(2))),
            "Delete Group 2#"
        );
    }

    #[test]
    fn test_open_selection_is_unterminated() {
        let select = CommandDescriptor::SelectChannels(ChannelSelection::range(1, 5));
        let encoded = select.encode();
        let cmd = encoded.command_line().unwrap();
        assert_eq!(cmd.as_str(), "Chan 1 Thru 5");
        assert!(!cmd.is_terminated());
    }

    #[test]
    fn test_intensity_and_group() {
        assert_eq!(
            line(CommandDescriptor::SetIntensity {
                selection: ChannelSelection::single(1),
                level: 75.0
            }),
            "Chan 1 At 75#"
        );
        assert_eq!(
            line(CommandDescriptor::RecordGroup {
                number: 10,
                label: Some("Movers".to_string())
            }),
            "Record Group 10 Label Movers#"
        );
        assert_eq!(
            line(CommandDescriptor::RecordGroup {
                number: 5,
                label: None
            }),
            "Record Group 5#"
        );
    }

    #[test]
    fn test_direct_calls() {
        let fire = CommandDescriptor::FireCue {
            list: 2,
            number: cue(1.5),
        };
        assert_eq!(
            encode(&fire),
            Encoded::Direct(DirectCall::FireCue {
                list: 2,
                number: cue(1.5)
            })
        );

        let position = FixturePosition {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            ..Default::default()
        };
        let set = CommandDescriptor::SetFixturePosition {
            channel: 7,
            position,
        };
        assert!(encode(&set).command_line().is_none());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let descriptor = CommandDescriptor::RecordCue {
            list: 1,
            number: cue(1.5),
            label: Some("My Cue".to_string()),
            blind: false,
        };
        assert_eq!(descriptor.encode(), descriptor.clone().encode());

        // Re-validating an already sanitised label changes nothing
        let relabelled = CommandDescriptor::RecordCue {
            list: 1,
            number: validate_cue_number(cue(1.5).value()).unwrap(),
            label: Some(crate::validate::validate_label("My_Cue").unwrap()),
            blind: false,
        };
        assert_eq!(descriptor.encode(), relabelled.encode());
    }
}
