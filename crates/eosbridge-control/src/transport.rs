//! Outbound OSC transport
//!
//! The console is fire-and-forget: a send either reaches the socket or
//! fails locally, there is no acknowledgement to wait for.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use parking_lot::Mutex;
use rosc::{OscMessage, OscPacket};

use crate::error::{ControlError, Result};
use crate::osc::types::{osc_arg_to_osc, OscArg};

/// Wildcard local address matching the family of `target`
fn unspecified_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    }
}

/// Sends one OSC message to the console
pub trait OscTransport: Send + Sync {
    fn send(&self, address: &str, args: Vec<OscArg>) -> Result<()>;
}

/// UDP transport to a single console
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    /// Resolve `host:port` and bind an ephemeral local port of the same
    /// address family, trying each resolved address in turn
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let mut last_err = None;
        for target in (host, port).to_socket_addrs()? {
            match UdpSocket::bind(unspecified_for(&target)) {
                Ok(socket) => {
                    tracing::info!("OSC transport ready -> {}", target);
                    return Ok(Self { socket, target });
                }
                Err(e) => {
                    tracing::debug!("Cannot bind a socket for {}: {}", target, e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err(ControlError::Transport(e)),
            None => {
                let message = format!("Could not resolve console address {}:{}", host, port);
                Err(ControlError::Config(message))
            }
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl OscTransport for UdpTransport {
    fn send(&self, address: &str, args: Vec<OscArg>) -> Result<()> {
        let packet = OscPacket::Message(OscMessage {
            addr: address.to_string(),
            args: args.iter().map(osc_arg_to_osc).collect(),
        });
        let bytes = rosc::encoder::encode(&packet)?;
        self.socket.send_to(&bytes, self.target)?;
        tracing::trace!("Sent OSC packet to {}: {}", self.target, address);
        Ok(())
    }
}

/// In-memory transport that records every message; used for dry runs and tests
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Vec<OscArg>)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, Vec<OscArg>)> {
        self.sent.lock().clone()
    }

    pub fn last(&self) -> Option<(String, Vec<OscArg>)> {
        self.sent.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl OscTransport for RecordingTransport {
    fn send(&self, address: &str, args: Vec<OscArg>) -> Result<()> {
        self.sent.lock().push((address.to_string(), args));
        Ok(())
    }
}
