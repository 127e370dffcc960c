//! Outbound OSC.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use rosc::{OscMessage, OscPacket};
use tracing::{debug, warn};

use vrcbridge_core::ParamValue;

use crate::convert::to_osc;
use crate::errors::{OscError, Result};

/// Fire-and-forget OSC output.
///
/// Implementations must not block for long; callers run on the dispatch
/// loop and never retry.
pub trait OscSender: Send + Sync {
    /// Send one message. Failures are logged by the implementation.
    fn send(&self, address: &str, args: &[ParamValue]);
}

/// UDP implementation targeting a single host/port.
#[derive(Debug)]
pub struct UdpOscSender {
    socket: UdpSocket,
    target: SocketAddr,
}

/// Resolve `host` and `port` to the first socket address. Accepts names
/// (`localhost`) and bare IPv4 or IPv6 literals.
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port).to_socket_addrs()?.next().ok_or_else(|| {
        OscError::Io(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("no address for {host}:{port}"),
        ))
    })
}

impl UdpOscSender {
    /// Bind an ephemeral local socket and resolve `host:port` as the target.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let target = resolve(host, port)?;
        let bind: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind)?;
        Ok(Self { socket, target })
    }

    /// Where messages are sent.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn try_send(&self, address: &str, args: &[ParamValue]) -> Result<usize> {
        let packet = OscPacket::Message(OscMessage {
            addr: address.to_owned(),
            args: args.iter().map(to_osc).collect(),
        });
        let bytes = rosc::encoder::encode(&packet).map_err(|e| OscError::Encode(e.to_string()))?;
        Ok(self.socket.send_to(&bytes, self.target)?)
    }
}

impl OscSender for UdpOscSender {
    fn send(&self, address: &str, args: &[ParamValue]) {
        match self.try_send(address, args) {
            Ok(len) => debug!(address, len, "osc sent"),
            Err(error) => warn!(address, %error, "osc send failed"),
        }
    }
}
