//! Eos OSC plumbing
//!
//! - [`address`] - outbound address templates
//! - [`pattern`] - inbound wildcard patterns and their categories
//! - [`types`] - conversions between `rosc` values and bridge values

pub mod address;
pub mod pattern;
pub mod types;

pub use address::{direct_call_message, newcmd_address, PING_ADDRESS};
pub use pattern::{
    AddressPattern, CategoryPolicy, FeedbackCategory, PatternEntry, PatternTable, TraceLevel,
};
pub use types::{FeedbackArg, OscArg};
