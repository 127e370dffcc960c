//! Inbound OSC receive thread.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::convert::{flatten, message_args};
use crate::errors::{OscError, Result};
use crate::router::OscRouter;

/// How often the receive loop wakes to check for shutdown.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest datagram accepted.
const MAX_DATAGRAM: usize = 65_507;

/// A UDP socket drained by a dedicated OS thread.
///
/// Every decoded message is passed to the router on that thread. Dropping the
/// listener stops the thread and closes the socket.
#[derive(Debug)]
pub struct OscListener {
    local_addr: SocketAddr,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl OscListener {
    /// Bind `addr` and start receiving.
    pub fn spawn(addr: SocketAddr, router: OscRouter) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        let local_addr = socket.local_addr()?;
        let stop = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&stop);
        let handle = std::thread::Builder::new()
            .name("osc-listener".into())
            .spawn(move || receive_loop(&socket, &router, &flag))?;

        info!(%local_addr, "osc listener started");
        Ok(Self {
            local_addr,
            stop,
            handle: Some(handle),
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the receive thread and wait for it to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("osc listener thread panicked");
            }
            info!(local_addr = %self.local_addr, "osc listener stopped");
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn receive_loop(socket: &UdpSocket, router: &OscRouter, stop: &AtomicBool) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    while !stop.load(Ordering::Relaxed) {
        let len = match socket.recv_from(&mut buf) {
            Ok((len, _)) => len,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                continue;
            }
            Err(error) => {
                warn!(%error, "osc receive failed");
                continue;
            }
        };
        if let Err(error) = handle_datagram(&buf[..len], router) {
            debug!(%error, len, "dropping osc datagram");
        }
    }
}

fn handle_datagram(bytes: &[u8], router: &OscRouter) -> Result<()> {
    let (_, packet) =
        rosc::decoder::decode_udp(bytes).map_err(|e| OscError::Decode(e.to_string()))?;
    for msg in flatten(packet) {
        let _ = router.dispatch(&msg.addr, message_args(msg.args));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};
    use std::sync::mpsc;
    use crate::convert::OscArgs;
    use vrcbridge_core::ParamValue;

    fn spawn_recording() -> (OscListener, mpsc::Receiver<(String, OscArgs)>) {
        let (tx, rx) = mpsc::channel();
        let tx = parking_lot::Mutex::new(tx);
        let mut router = OscRouter::new();
        router.set_default_handler(move |address, args| {
            let _ = tx.lock().send((address.to_owned(), args));
        });
        let listener = OscListener::spawn("127.0.0.1:0".parse().unwrap(), router).unwrap();
        (listener, rx)
    }

    fn send_packet(to: SocketAddr, packet: &OscPacket) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let bytes = rosc::encoder::encode(packet).unwrap();
        let _ = socket.send_to(&bytes, to).unwrap();
    }

    fn message(addr: &str, args: Vec<OscType>) -> OscPacket {
        OscPacket::Message(OscMessage {
            addr: addr.into(),
            args,
        })
    }

    #[test]
    fn delivers_decoded_messages() {
        let (listener, rx) = spawn_recording();
        send_packet(
            listener.local_addr(),
            &message("/avatar/parameters/VRMode", vec![OscType::Int(1)]),
        );

        let (address, args) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(address, "/avatar/parameters/VRMode");
        assert_eq!(args, vec![Some(ParamValue::Int(1))]);
    }

    #[test]
    fn bundle_contents_arrive_in_order() {
        let (listener, rx) = spawn_recording();
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                message("/a", vec![OscType::Float(0.5)]),
                message("/b", vec![OscType::Bool(false)]),
            ],
        });
        send_packet(listener.local_addr(), &bundle);

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.0, "/a");
        assert_eq!(second, ("/b".to_owned(), vec![Some(ParamValue::Bool(false))]));
    }

    #[test]
    fn nil_argument_keeps_its_position() {
        let (listener, rx) = spawn_recording();
        send_packet(
            listener.local_addr(),
            &message(
                "/tracking/vrsystem/head/pose",
                vec![OscType::Nil, OscType::Float(1.0), OscType::Float(2.0)],
            ),
        );

        let (_, args) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(
            args,
            vec![None, Some(ParamValue::Float(1.0)), Some(ParamValue::Float(2.0))]
        );
    }

    #[test]
    fn garbage_datagrams_are_skipped() {
        let (listener, rx) = spawn_recording();
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let _ = socket.send_to(b"not osc", listener.local_addr()).unwrap();
        send_packet(listener.local_addr(), &message("/ok", vec![]));

        let (address, _) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(address, "/ok");
    }

    #[test]
    fn stop_joins_thread() {
        let (mut listener, _rx) = spawn_recording();
        listener.stop();
        assert!(listener.handle.is_none());
        // second stop is a no-op
        listener.stop();
    }
}
