//! EosBridge Control - command encoding and feedback routing for ETC Eos consoles
//!
//! This crate speaks the Eos OSC dialect:
//! - **Validators**: range and format checks for channels, cues, DMX addresses and labels
//! - **Command encoder**: typed descriptors to console command-line text (`Record Cue 1/10#`)
//! - **Feedback router**: wildcard classification of `/eos/out/...` traffic into bounded logs
//! - **Insights**: operator activity statistics derived from those logs
//! - **Client**: UDP transport, receiver worker and configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eosbridge_control::{validate_cue_number, CommandDescriptor, EosClient, RecordingTransport};
//!
//! let client = EosClient::new(Arc::new(RecordingTransport::new()), 1, false, 3033);
//! let encoded = CommandDescriptor::RecordCue {
//!     list: 1,
//!     number: validate_cue_number(10.0)?,
//!     label: None,
//!     blind: false,
//! }
//! .encode();
//! client.dispatch(&encoded)?;
//! # Ok::<(), eosbridge_control::ControlError>(())
//! ```
//!
//! ## Modules
//!
//! - [`validate`] - input validators
//! - [`command`] - command-line encoder
//! - [`osc`] - address templates, wildcard patterns, OSC value conversion
//! - [`feedback`] - feedback router and bounded logs
//! - [`insights`] - operator insights
//! - [`transport`] - outbound OSC transport
//! - [`receiver`] - inbound receiver worker
//! - [`client`] - console client
//! - [`config`] - configuration loading
//! - [`error`] - error types

#![allow(missing_docs)]

/// Console client
pub mod client;
/// Command-line encoder
pub mod command;
/// Configuration
pub mod config;
/// Error types
pub mod error;
/// Feedback router
pub mod feedback;
/// Operator insights
pub mod insights;
/// OSC addresses, patterns and types
pub mod osc;
/// Receiver worker
pub mod receiver;
/// Outbound transport
pub mod transport;
/// Input validators
pub mod validate;

// Re-exports
pub use client::EosClient;
pub use command::{
    encode, format_address, format_number, ChannelSelection, CommandDescriptor, CueTiming,
    DeleteTarget, DirectCall, Encoded, EncodedCommand, FixturePosition,
};
pub use config::{EosConfig, LogConfig};
pub use error::{ControlError, Result, ValidationError};
pub use feedback::{
    BoundedLog, FeedbackEntry, FeedbackRouter, LogSizes, OperatorAction, DEFAULT_LOG_CAPACITY,
};
pub use insights::OperatorInsights;
pub use osc::{FeedbackArg, FeedbackCategory, OscArg, PatternTable};
pub use receiver::FeedbackReceiver;
pub use transport::{OscTransport, RecordingTransport, UdpTransport};
pub use validate::*;
