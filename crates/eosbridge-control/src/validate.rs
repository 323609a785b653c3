//! Input validators
//!
//! Range and format checks for Eos domain values. Every check either returns
//! the (normalised) value or a [`ValidationError`]; nothing is clamped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::format_number;
use crate::error::ValidationError;

pub const MAX_CHANNEL: i64 = 99_999;
pub const MAX_CUE_NUMBER: f64 = 99_999.0;
pub const MAX_UNIVERSE: i64 = 255;
pub const MAX_DMX_ADDRESS: i64 = 512;
/// One hour
pub const MAX_TIME_SECONDS: f64 = 3600.0;
pub const MAX_LABEL_LENGTH: usize = 100;
pub const MAX_USER_ID: i64 = 999;

/// Cue number; point cues carry a decimal part (`1.5`)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueNumber(f64);

impl CueNumber {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for CueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_number(self.0))
    }
}

impl FromStr for CueNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cue_number(s)
    }
}

/// A DMX universe/address pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DmxAddress {
    pub universe: u16,
    pub address: u16,
}

impl fmt::Display for DmxAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.universe, self.address)
    }
}

/// Palette (preset) category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteType {
    Focus,
    Color,
    Beam,
    Intensity,
}

impl PaletteType {
    pub const ALL: [PaletteType; 4] = [
        PaletteType::Focus,
        PaletteType::Color,
        PaletteType::Beam,
        PaletteType::Intensity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaletteType::Focus => "Focus",
            PaletteType::Color => "Color",
            PaletteType::Beam => "Beam",
            PaletteType::Intensity => "Intensity",
        }
    }
}

impl fmt::Display for PaletteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaletteType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_palette_type(s)
    }
}

fn check_int(field: &'static str, value: i64, min: i64, max: i64) -> Result<i64, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
            value,
        ));
    }
    Ok(value)
}

fn check_real(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!(
                "must be between {} and {}",
                format_number(min),
                format_number(max)
            ),
            value,
        ));
    }
    Ok(value)
}

/// Validate a channel number (1-99999)
pub fn validate_channel(channel: i64) -> Result<u32, ValidationError> {
    check_int("channel", channel, 1, MAX_CHANNEL).map(|c| c as u32)
}

/// Validate a cue number: greater than 0, at most 99999
pub fn validate_cue_number(cue_number: f64) -> Result<CueNumber, ValidationError> {
    if !cue_number.is_finite() || cue_number <= 0.0 || cue_number > MAX_CUE_NUMBER {
        return Err(ValidationError::new(
            "cue_number",
            "must be greater than 0 and at most 99999",
            cue_number,
        ));
    }
    Ok(CueNumber(cue_number))
}

/// Parse a textual cue number (`"10"` or `"1.5"`) and validate it
pub fn parse_cue_number(text: &str) -> Result<CueNumber, ValidationError> {
    let trimmed = text.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::new("cue_number", "must be numeric", format!("'{}'", text)))?;
    validate_cue_number(value)
}

/// Validate a DMX universe (1-255)
pub fn validate_universe(universe: i64) -> Result<u16, ValidationError> {
    check_int("universe", universe, 1, MAX_UNIVERSE).map(|u| u as u16)
}

/// Validate both halves of a DMX address
pub fn validate_dmx_address(universe: i64, address: i64) -> Result<DmxAddress, ValidationError> {
    let universe = validate_universe(universe)?;
    let address = check_int("address", address, 1, MAX_DMX_ADDRESS)? as u16;
    Ok(DmxAddress { universe, address })
}

/// Validate a fade, delay or follow time in seconds
pub fn validate_time(seconds: f64) -> Result<f64, ValidationError> {
    check_real("time", seconds, 0.0, MAX_TIME_SECONDS)
}

/// Validate an intensity level (0-100)
pub fn validate_intensity(level: f64) -> Result<f64, ValidationError> {
    check_real("intensity", level, 0.0, 100.0)
}

/// Validate an effect rate (0.1-1000)
pub fn validate_effect_rate(rate: f64) -> Result<f64, ValidationError> {
    check_real("rate", rate, 0.1, 1000.0)
}

/// Validate an effect size (0-100)
pub fn validate_effect_size(size: f64) -> Result<f64, ValidationError> {
    check_real("size", size, 0.0, 100.0)
}

/// Validate a palette type, normalising case (`"color"` -> `Color`)
pub fn validate_palette_type(palette_type: &str) -> Result<PaletteType, ValidationError> {
    let normalised = capitalize(palette_type);
    PaletteType::ALL
        .into_iter()
        .find(|t| t.as_str() == normalised)
        .ok_or_else(|| {
            ValidationError::new(
                "palette_type",
                "must be one of Focus, Color, Beam, Intensity",
                format!("'{}'", palette_type),
            )
        })
}

/// Validate and sanitise a label; spaces become underscores
pub fn validate_label(label: &str) -> Result<String, ValidationError> {
    if label.trim().is_empty() {
        return Err(ValidationError::new("label", "cannot be empty", "''"));
    }
    let length = label.chars().count();
    if length > MAX_LABEL_LENGTH {
        return Err(ValidationError::new(
            "label",
            format!("too long (max {} chars)", MAX_LABEL_LENGTH),
            format!("{} chars", length),
        ));
    }
    Ok(sanitize_label(label.trim()))
}

/// Eos labels cannot carry spaces on the command line
pub fn sanitize_label(label: &str) -> String {
    label.replace(' ', "_")
}

/// Validate an Eos user id (1-999)
pub fn validate_user_id(user_id: i64) -> Result<u32, ValidationError> {
    check_int("user_id", user_id, 1, MAX_USER_ID).map(|u| u as u32)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_channel_bounds() {
        assert_eq!(validate_channel(1).unwrap(), 1);
        assert_eq!(validate_channel(99_999).unwrap(), 99_999);
        assert!(validate_channel(0).is_err());
        assert!(validate_channel(100_000).is_err());
        assert!(validate_channel(-5).is_err());
    }

    #[test]
    fn test_channel_error_fields() {
        let err = validate_channel(0).unwrap_err();
        assert_eq!(err.field, "channel");
        assert_eq!(err.value, "0");
    }

    #[test]
    fn test_cue_number() {
        assert_eq!(validate_cue_number(10.0).unwrap().to_string(), "10");
        assert_eq!(validate_cue_number(1.5).unwrap().to_string(), "1.5");
        assert!(validate_cue_number(0.0).is_err());
        assert!(validate_cue_number(-1.0).is_err());
        assert!(validate_cue_number(100_000.0).is_err());
        assert!(validate_cue_number(f64::NAN).is_err());
    }

    #[test]
    fn test_parse_cue_number() {
        assert_eq!(parse_cue_number("10").unwrap().value(), 10.0);
        assert_eq!(parse_cue_number(" 1.5 ").unwrap().value(), 1.5);
        assert!(parse_cue_number("abc").is_err());
        assert!(parse_cue_number("0").is_err());
    }

    #[test]
    fn test_dmx_address() {
        let addr = validate_dmx_address(2, 256).unwrap();
        assert_eq!(addr.to_string(), "2/256");
        assert!(validate_dmx_address(0, 1).is_err());
        assert!(validate_dmx_address(256, 1).is_err());
        assert!(validate_dmx_address(1, 0).is_err());
        assert!(validate_dmx_address(1, 513).is_err());
    }

    #[test]
    fn test_time_bounds() {
        assert_eq!(validate_time(0.0).unwrap(), 0.0);
        assert_eq!(validate_time(3600.0).unwrap(), 3600.0);
        assert!(validate_time(-0.1).is_err());
        assert!(validate_time(3600.5).is_err());
        assert!(validate_time(f64::INFINITY).is_err());
    }

    #[test]
    fn test_effect_bounds() {
        assert!(validate_effect_rate(0.1).is_ok());
        assert!(validate_effect_rate(0.05).is_err());
        assert!(validate_effect_rate(1000.1).is_err());
        assert!(validate_effect_size(0.0).is_ok());
        assert!(validate_effect_size(100.0).is_ok());
        assert!(validate_effect_size(101.0).is_err());
    }

    #[test]
    fn test_palette_type_normalisation() {
        assert_eq!(validate_palette_type("color").unwrap(), PaletteType::Color);
        assert_eq!(validate_palette_type("FOCUS").unwrap(), PaletteType::Focus);
        assert_eq!(validate_palette_type("Beam").unwrap(), PaletteType::Beam);
        assert_eq!(
            "intensity".parse::<PaletteType>().unwrap(),
            PaletteType::Intensity
        );
        assert!(validate_palette_type("gobo").is_err());
        assert!(validate_palette_type("").is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(validate_label("My Cue").unwrap(), "My_Cue");
        assert_eq!(validate_label("  Warm Wash ").unwrap(), "Warm_Wash");
        assert!(validate_label("").is_err());
        assert!(validate_label("   ").is_err());
        assert!(validate_label(&"a".repeat(101)).is_err());
        assert!(validate_label(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_user_id() {
        assert_eq!(validate_user_id(1).unwrap(), 1);
        assert_eq!(validate_user_id(999).unwrap(), 999);
        assert!(validate_user_id(0).is_err());
        assert!(validate_user_id(1000).is_err());
    }

    proptest! {
        #[test]
        fn prop_valid_channels_round_trip(c in 1i64..=99_999) {
            prop_assert_eq!(validate_channel(c).unwrap() as i64, c);
        }

        #[test]
        fn prop_out_of_range_channels_fail(c in prop_oneof![i64::MIN..1i64, 100_000i64..i64::MAX]) {
            prop_assert!(validate_channel(c).is_err());
        }
    }
}
