//! OSC type conversion helpers

use rosc::{OscMessage, OscPacket, OscType};
use serde::{Deserialize, Serialize};

/// Outbound argument; the console only needs strings and floats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OscArg {
    String(String),
    Float(f64),
}

impl From<&str> for OscArg {
    fn from(s: &str) -> Self {
        OscArg::String(s.to_string())
    }
}

impl From<String> for OscArg {
    fn from(s: String) -> Self {
        OscArg::String(s)
    }
}

impl From<f64> for OscArg {
    fn from(f: f64) -> Self {
        OscArg::Float(f)
    }
}

/// Convert an outbound argument to OSC; floats go out as 32-bit
pub fn osc_arg_to_osc(arg: &OscArg) -> OscType {
    match arg {
        OscArg::String(s) => OscType::String(s.clone()),
        OscArg::Float(f) => OscType::Float(*f as f32),
    }
}

/// Inbound argument, kept as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedbackArg {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Blob(Vec<u8>),
    Nil,
}

impl From<&str> for FeedbackArg {
    fn from(s: &str) -> Self {
        FeedbackArg::String(s.to_string())
    }
}

impl From<f64> for FeedbackArg {
    fn from(f: f64) -> Self {
        FeedbackArg::Float(f)
    }
}

impl From<i64> for FeedbackArg {
    fn from(i: i64) -> Self {
        FeedbackArg::Int(i)
    }
}

impl std::fmt::Display for FeedbackArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackArg::Int(i) => write!(f, "{}", i),
            FeedbackArg::Float(x) => write!(f, "{}", x),
            FeedbackArg::String(s) => write!(f, "'{}'", s),
            FeedbackArg::Bool(b) => write!(f, "{}", b),
            FeedbackArg::Blob(b) => write!(f, "<{} bytes>", b.len()),
            FeedbackArg::Nil => write!(f, "nil"),
        }
    }
}

/// Convert a received OSC value into a loggable argument
pub fn osc_to_feedback_arg(value: &OscType) -> FeedbackArg {
    match value {
        OscType::Int(i) => FeedbackArg::Int(*i as i64),
        OscType::Long(l) => FeedbackArg::Int(*l),
        OscType::Float(f) => FeedbackArg::Float(*f as f64),
        OscType::Double(d) => FeedbackArg::Float(*d),
        OscType::String(s) => FeedbackArg::String(s.clone()),
        OscType::Char(c) => FeedbackArg::String(c.to_string()),
        OscType::Bool(b) => FeedbackArg::Bool(*b),
        OscType::Blob(b) => FeedbackArg::Blob(b.clone()),
        OscType::Nil => FeedbackArg::Nil,
        OscType::Inf => FeedbackArg::Float(f64::INFINITY),
        other => FeedbackArg::String(format!("{:?}", other)),
    }
}

/// Flatten a packet into its messages, descending into bundles
pub fn flatten_packet(packet: OscPacket) -> Vec<OscMessage> {
    match packet {
        OscPacket::Message(msg) => vec![msg],
        OscPacket::Bundle(bundle) => bundle.content.into_iter().flat_map(flatten_packet).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscTime};

    #[test]
    fn test_osc_arg_to_osc() {
        assert_eq!(
            osc_arg_to_osc(&OscArg::from("Chan 1#")),
            OscType::String("Chan 1#".to_string())
        );
        assert_eq!(osc_arg_to_osc(&OscArg::Float(1.0)), OscType::Float(1.0));
    }

    #[test]
    fn test_osc_to_feedback_arg() {
        assert_eq!(osc_to_feedback_arg(&OscType::Int(42)), FeedbackArg::Int(42));
        assert_eq!(
            osc_to_feedback_arg(&OscType::Float(0.5)),
            FeedbackArg::Float(0.5)
        );
        assert_eq!(
            osc_to_feedback_arg(&OscType::String("Go".to_string())),
            FeedbackArg::String("Go".to_string())
        );
        assert_eq!(osc_to_feedback_arg(&OscType::Nil), FeedbackArg::Nil);
    }

    #[test]
    fn test_feedback_arg_serializes_untagged() {
        let args = vec![FeedbackArg::Int(1), FeedbackArg::from("Record")];
        assert_eq!(serde_json::to_string(&args).unwrap(), r#"[1,"Record"]"#);
    }

    #[test]
    fn test_flatten_bundle() {
        let msg = |addr: &str| {
            OscPacket::Message(OscMessage {
                addr: addr.to_string(),
                args: vec![],
            })
        };
        let inner = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![msg("/eos/out/event")],
        });
        let outer = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![msg("/eos/out/notify"), inner],
        });

        let addrs: Vec<String> = flatten_packet(outer).into_iter().map(|m| m.addr).collect();
        assert_eq!(addrs, vec!["/eos/out/notify", "/eos/out/event"]);
    }
}
