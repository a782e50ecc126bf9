//! # UDP Transport
//!
//! Non-blocking, send-only UDP socket used by the binary protocol. The
//! sender never waits: a datagram the kernel cannot take right now is
//! dropped, and the next tick sends a fresher one. Callers count outcomes
//! in their own stats.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use crate::error::{StreamError, StreamResult};

/// What happened to one datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the kernel.
    Sent(usize),
    /// Socket buffer full; dropped.
    WouldBlock,
    /// Any other send error; logged and dropped.
    Failed,
}

/// Non-blocking UDP sender.
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Binds a non-blocking socket.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Bind`] if the address cannot be bound.
    pub fn bind(addr: SocketAddr) -> StreamResult<Self> {
        let bind = |addr: SocketAddr| -> io::Result<(UdpSocket, SocketAddr)> {
            let socket = UdpSocket::bind(addr)?;
            socket.set_nonblocking(true)?;
            let local = socket.local_addr()?;
            Ok((socket, local))
        };
        let (socket, local_addr) = bind(addr).map_err(|source| StreamError::Bind { addr, source })?;

        Ok(Self { socket, local_addr })
    }

    /// Returns the local address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Sends one datagram without blocking.
    pub fn send_to(&mut self, data: &[u8], addr: SocketAddr) -> SendOutcome {
        match self.socket.send_to(data, addr) {
            Ok(n) => SendOutcome::Sent(n),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => SendOutcome::WouldBlock,
            Err(e) => {
                tracing::warn!(%addr, error = %e, "Datagram send failed");
                SendOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[test]
    fn test_send_reaches_receiver() {
        let mut sender = UdpTransport::bind(loopback()).unwrap();
        let receiver = UdpSocket::bind(loopback()).unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let outcome = sender.send_to(b"hello", receiver.local_addr().unwrap());
        assert_eq!(outcome, SendOutcome::Sent(5));

        let mut buf = [0u8; 16];
        let (len, from) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"hello");
        assert_eq!(from, sender.local_addr());
    }

    #[test]
    fn test_bind_conflict_is_error() {
        let first = UdpTransport::bind(loopback()).unwrap();
        let err = UdpTransport::bind(first.local_addr()).err().unwrap();
        assert!(matches!(err, StreamError::Bind { .. }));
    }
}
