//! Eos console client
//!
//! Owns the outbound transport, the Eos user the bridge speaks as, and the
//! optional feedback state. Receiving is opt-in: the router exists only when
//! receive is enabled, and the worker starts only on [`EosClient::start_receiver`].

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::{
    build_channel_list, ChannelSelection, DirectCall, Encoded, EncodedCommand, FixturePosition,
};
use crate::config::EosConfig;
use crate::error::Result;
use crate::feedback::{FeedbackEntry, FeedbackRouter, OperatorAction};
use crate::insights::OperatorInsights;
use crate::osc::address::{
    channel_address, describe_direct_call, direct_call_message, fire_macro_address,
    get_position_address, key_address, newcmd_address, PING_ADDRESS,
};
use crate::osc::pattern::FeedbackCategory;
use crate::osc::types::OscArg;
use crate::receiver::FeedbackReceiver;
use crate::transport::{OscTransport, UdpTransport};
use crate::validate::{validate_channel, validate_intensity, validate_user_id, CueNumber};

/// Client for one Eos console
pub struct EosClient {
    transport: Arc<dyn OscTransport>,
    user_id: AtomicU32,
    rx_port: u16,
    router: Option<Arc<FeedbackRouter>>,
    receiver: Mutex<Option<FeedbackReceiver>>,
}

impl EosClient {
    /// Build a client over any transport. `user_id` must already be valid.
    pub fn new(
        transport: Arc<dyn OscTransport>,
        user_id: u32,
        enable_rx: bool,
        rx_port: u16,
    ) -> Self {
        tracing::info!(
            "Eos client initialized (user {}, feedback {})",
            user_id,
            if enable_rx { "enabled" } else { "disabled" }
        );
        Self {
            transport,
            user_id: AtomicU32::new(user_id),
            rx_port,
            router: enable_rx.then(|| Arc::new(FeedbackRouter::default())),
            receiver: Mutex::new(None),
        }
    }

    /// Connect a UDP transport to the configured console
    pub fn from_config(config: &EosConfig) -> Result<Self> {
        config.validate()?;
        let transport = UdpTransport::connect(&config.host, config.port)?;
        Ok(Self::new(
            Arc::new(transport),
            config.user_id,
            config.enable_rx,
            config.rx_port,
        ))
    }

    pub fn user_id(&self) -> u32 {
        self.user_id.load(Ordering::SeqCst)
    }

    pub fn feedback_enabled(&self) -> bool {
        self.router.is_some()
    }

    /// Shared feedback state, when receive is enabled
    pub fn router(&self) -> Option<&Arc<FeedbackRouter>> {
        self.router.as_ref()
    }

    fn send(&self, address: &str, args: Vec<OscArg>) -> Result<()> {
        self.transport.send(address, args)
    }

    /// Replace the command line with `command`
    pub fn send_command(&self, command: &str) -> Result<()> {
        let address = newcmd_address(self.user_id());
        self.send(&address, vec![OscArg::from(command)])?;
        tracing::debug!("Sent command: {}", command);
        Ok(())
    }

    pub fn send_key(&self, key: &str) -> Result<()> {
        self.send(&key_address(self.user_id(), key), vec![OscArg::Float(1.0)])?;
        tracing::debug!("Sent key: {}", key);
        Ok(())
    }

    /// Set a channel level (0-100) without touching the command line
    pub fn set_channel_level(&self, channel: u32, level: f64) -> Result<()> {
        let channel = validate_channel(i64::from(channel))?;
        let level = validate_intensity(level)?;
        self.send(
            &channel_address(self.user_id(), channel),
            vec![OscArg::Float(level)],
        )?;
        tracing::debug!("Set channel {} to {}%", channel, level);
        Ok(())
    }

    pub fn fire_cue(&self, list: u32, number: CueNumber) -> Result<()> {
        self.dispatch_direct(&DirectCall::FireCue { list, number })
    }

    pub fn execute_macro(&self, number: u32) -> Result<()> {
        self.send(
            &fire_macro_address(self.user_id(), number),
            vec![OscArg::Float(1.0)],
        )?;
        tracing::debug!("Executed macro {}", number);
        Ok(())
    }

    pub fn set_patch_position(&self, channel: u32, position: FixturePosition) -> Result<()> {
        self.dispatch_direct(&DirectCall::SetPosition { channel, position })
    }

    /// Ask the console to report a fixture position; the answer arrives as feedback
    pub fn get_patch_position(&self, channel: u32) -> Result<()> {
        self.send(&get_position_address(channel), Vec::new())?;
        tracing::debug!("Requested position for channel {}", channel);
        Ok(())
    }

    /// Select `start` (through `end`), leaving the command line open
    pub fn select_channels(&self, start: u32, end: Option<u32>) -> Result<()> {
        let selection = match end {
            Some(end) => ChannelSelection::range(start, end),
            None => ChannelSelection::single(start),
        };
        self.send_command(&selection.to_string())
    }

    /// Select a discontiguous set of channels (`Chan 1 + 5 + 10`), left open
    pub fn select_channel_list(&self, channels: &[u32]) -> Result<()> {
        self.send_command(&build_channel_list(channels))
    }

    pub fn clear_command_line(&self) -> Result<()> {
        self.send_key("clear")
    }

    pub fn switch_user(&self, user_id: i64) -> Result<()> {
        let user_id = validate_user_id(user_id)?;
        self.user_id.store(user_id, Ordering::SeqCst);
        tracing::info!("Switched to user {}", user_id);
        Ok(())
    }

    pub fn ping(&self) -> Result<()> {
        self.send(PING_ADDRESS, vec![OscArg::from("ping")])?;
        tracing::debug!("Sent ping");
        Ok(())
    }

    /// Send encoder output; returns the command line text when one was sent
    pub fn dispatch(&self, encoded: &Encoded) -> Result<Option<EncodedCommand>> {
        match encoded {
            Encoded::CommandLine(command) => {
                self.send_command(command.as_str())?;
                Ok(Some(command.clone()))
            }
            Encoded::Direct(call) => {
                self.dispatch_direct(call)?;
                Ok(None)
            }
        }
    }

    fn dispatch_direct(&self, call: &DirectCall) -> Result<()> {
        let (address, args) = direct_call_message(self.user_id(), call);
        self.send(&address, args)?;
        tracing::debug!("Sent {}", describe_direct_call(call));
        Ok(())
    }

    pub fn feedback_log(
        &self,
        category: Option<FeedbackCategory>,
        limit: usize,
    ) -> Vec<FeedbackEntry> {
        self.router
            .as_ref()
            .map(|r| r.feedback_log(category, limit))
            .unwrap_or_default()
    }

    pub fn operator_actions(&self, limit: usize) -> Vec<OperatorAction> {
        self.router
            .as_ref()
            .map(|r| r.operator_actions(limit))
            .unwrap_or_default()
    }

    pub fn recent_errors(&self, limit: usize) -> Vec<FeedbackEntry> {
        self.router
            .as_ref()
            .map(|r| r.recent_errors(limit))
            .unwrap_or_default()
    }

    /// `None` when receive is disabled
    pub fn operator_insights(&self, window_minutes: u32) -> Option<OperatorInsights> {
        self.router
            .as_ref()
            .map(|r| r.operator_insights(window_minutes))
    }

    pub fn clear_feedback_log(&self) {
        if let Some(router) = &self.router {
            router.clear();
        }
    }

    /// Start the receiver on `0.0.0.0:{rx_port}`; a no-op when disabled or already running
    pub fn start_receiver(&self) -> Result<()> {
        self.start_receiver_on(&format!("0.0.0.0:{}", self.rx_port))
    }

    /// Start the receiver on an explicit bind address
    pub fn start_receiver_on(&self, bind_addr: &str) -> Result<()> {
        let Some(router) = &self.router else {
            tracing::debug!("Feedback disabled, receiver not started");
            return Ok(());
        };
        let mut receiver = self.receiver.lock();
        if receiver.is_some() {
            return Ok(());
        }
        *receiver = Some(FeedbackReceiver::spawn(bind_addr, router.clone())?);
        Ok(())
    }

    pub fn receiver_running(&self) -> bool {
        self.receiver
            .lock()
            .as_ref()
            .map(FeedbackReceiver::is_running)
            .unwrap_or(false)
    }

    /// Stop the receiver; buffered feedback stays queryable
    pub fn shutdown(&self) {
        if let Some(mut receiver) = self.receiver.lock().take() {
            receiver.stop();
        }
        tracing::info!("Eos client shutdown");
    }
}

impl Drop for EosClient {
    fn drop(&mut self) {
        if let Some(mut receiver) = self.receiver.get_mut().take() {
            receiver.stop();
        }
    }
}
