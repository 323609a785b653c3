//! Feedback receiver worker
//!
//! A background thread that reads OSC datagrams from the console and hands
//! every decoded message to the [`FeedbackRouter`]. The socket uses a short
//! read timeout so the worker notices a stop request promptly.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rosc::OscMessage;

use crate::error::{ControlError, Result};
use crate::feedback::FeedbackRouter;
use crate::osc::types::flatten_packet;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running receiver thread
pub struct FeedbackReceiver {
    local_addr: SocketAddr,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FeedbackReceiver {
    /// Bind `bind_addr` and start the worker
    pub fn spawn(bind_addr: &str, router: Arc<FeedbackRouter>) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr)?;
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        let local_addr = socket.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let handle = std::thread::Builder::new()
            .name("eos-feedback-rx".to_string())
            .spawn(move || receive_loop(socket, router, flag))?;

        tracing::info!("OSC receiver listening on {}", local_addr);

        Ok(Self {
            local_addr,
            running,
            handle: Some(handle),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Stop and join the worker; a second call does nothing
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("OSC receiver thread panicked");
            }
            tracing::info!("OSC receiver stopped");
        }
    }
}

impl Drop for FeedbackReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn receive_loop(socket: UdpSocket, router: Arc<FeedbackRouter>, running: Arc<AtomicBool>) {
    let mut buf = [0u8; rosc::decoder::MTU];

    while running.load(Ordering::SeqCst) {
        let size = match socket.recv_from(&mut buf) {
            Ok((size, _)) => size,
            Err(e) => {
                if let Some(delay) = retry_delay(&e) {
                    tracing::warn!("OSC receive error: {}", e);
                    std::thread::sleep(delay);
                }
                continue;
            }
        };

        match decode_messages(&buf[..size]) {
            Ok(messages) => {
                for message in messages {
                    router.ingest_message(&message);
                }
            }
            Err(e) => tracing::debug!("Dropping OSC packet: {}", e),
        }
    }
}

/// Back-off after a failed read; `None` for a plain poll timeout
fn retry_delay(err: &std::io::Error) -> Option<Duration> {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => None,
        _ => Some(POLL_INTERVAL),
    }
}

/// Decode one datagram into its messages, bundles flattened
pub fn decode_messages(datagram: &[u8]) -> Result<Vec<OscMessage>> {
    let (_, packet) = rosc::decoder::decode_udp(datagram)
        .map_err(|e| ControlError::InvalidMessage(format!("{:?}", e)))?;
    Ok(flatten_packet(packet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::pattern::FeedbackCategory;
    use rosc::{OscPacket, OscType};
    use std::time::Instant;

    fn send(to: SocketAddr, addr: &str, args: Vec<OscType>) {
        let packet = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        let bytes = rosc::encoder::encode(&packet).unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.send_to(&bytes, to).unwrap();
    }

    fn wait_for(router: &FeedbackRouter, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while router.sizes().feedback < count && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_receiver_routes_messages() {
        let router = Arc::new(FeedbackRouter::default());
        let mut receiver = FeedbackReceiver::spawn("127.0.0.1:0", router.clone()).unwrap();
        assert!(receiver.is_running());

        let target = receiver.local_addr();
        let error = OscType::String("Bad".to_string());
        send(target, "/eos/out/error", vec![error]);
        send(target, "/eos/out/user/1/action", vec![OscType::Int(1)]);
        wait_for(&router, 2);

        receiver.stop();
        assert!(!receiver.is_running());

        assert_eq!(router.recent_errors(10).len(), 1);
        assert_eq!(router.operator_actions(10).len(), 1);
        let categories: Vec<_> = router
            .feedback_log(None, 10)
            .into_iter()
            .map(|e| e.category)
            .collect();
        assert!(categories.contains(&FeedbackCategory::UserAction));
    }

    #[test]
    fn test_stop_keeps_buffered_entries_and_is_idempotent() {
        let router = Arc::new(FeedbackRouter::default());
        let mut receiver = FeedbackReceiver::spawn("127.0.0.1:0", router.clone()).unwrap();
        send(receiver.local_addr(), "/eos/out/notify", vec![]);
        wait_for(&router, 1);

        receiver.stop();
        receiver.stop();
        assert_eq!(router.sizes().feedback, 1);
    }

    #[test]
    fn test_socket_errors_back_off() {
        let timeout = std::io::Error::from(ErrorKind::WouldBlock);
        assert_eq!(retry_delay(&timeout), None);
        let timeout = std::io::Error::from(ErrorKind::TimedOut);
        assert_eq!(retry_delay(&timeout), None);

        let refused = std::io::Error::from(ErrorKind::ConnectionRefused);
        assert_eq!(retry_delay(&refused), Some(POLL_INTERVAL));
    }

    #[test]
    fn test_decode_messages() {
        let bytes = rosc::encoder::encode(&OscPacket::Message(OscMessage {
            addr: "/eos/out/notify".to_string(),
            args: vec![],
        }))
        .unwrap();
        let messages = decode_messages(&bytes).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].addr, "/eos/out/notify");

        let err = decode_messages(b"not osc").unwrap_err();
        assert!(matches!(err, ControlError::InvalidMessage(_)));
    }

    #[test]
    fn test_garbage_is_ignored() {
        let router = Arc::new(FeedbackRouter::default());
        let mut receiver = FeedbackReceiver::spawn("127.0.0.1:0", router.clone()).unwrap();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.send_to(b"not osc", receiver.local_addr()).unwrap();
        send(receiver.local_addr(), "/eos/out/event", vec![]);
        wait_for(&router, 1);
        receiver.stop();

        assert_eq!(router.feedback_log(None, 10).len(), 1);
    }
}
