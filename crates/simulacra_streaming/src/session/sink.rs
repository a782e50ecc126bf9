//! # Sinks
//!
//! The two ways a packet leaves the process: a text line to the one TCP
//! peer, or a pair of binary datagrams to a fixed UDP destination. Each
//! sink owns its socket and its encoder.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};
use std::time::Instant;

use simulacra_shared::Packet;

use crate::config::DeviceSection;
use crate::error::{StreamError, StreamResult};
use crate::protocol::{BinaryEncoder, FrameStamp, TextEncoder};
use crate::transport::{SendOutcome, UdpTransport};

use super::connection::{PeerState, TextPeer, WriteOutcome};
use super::SessionStats;

/// Newline-delimited JSON to one TCP peer.
#[derive(Debug)]
pub struct TextSink {
    listener: TcpListener,
    local_addr: SocketAddr,
    peer: Option<TextPeer>,
    encoder: TextEncoder,
}

impl TextSink {
    /// Binds a non-blocking listener.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Bind`] if the address cannot be bound.
    pub fn bind(addr: SocketAddr, device: &DeviceSection) -> StreamResult<Self> {
        let bind = |addr: SocketAddr| -> io::Result<(TcpListener, SocketAddr)> {
            let listener = TcpListener::bind(addr)?;
            listener.set_nonblocking(true)?;
            let local = listener.local_addr()?;
            Ok((listener, local))
        };
        let (listener, local_addr) = bind(addr).map_err(|source| StreamError::Bind { addr, source })?;
        tracing::info!(addr = %local_addr, "Listening for text peer");

        Ok(Self {
            listener,
            local_addr,
            peer: None,
            encoder: TextEncoder::new(device),
        })
    }

    /// Listening address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current peer state.
    #[must_use]
    pub const fn state(&self) -> PeerState {
        if self.peer.is_some() {
            PeerState::Connected
        } else {
            PeerState::Listening
        }
    }

    /// Address of the connected peer.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer.as_ref().map(TextPeer::addr)
    }

    /// Drops a peer that hung up, then accepts a new one if the slot is
    /// free.
    pub fn poll_connection(&mut self, stats: &mut SessionStats) {
        if let Some(peer) = &mut self.peer {
            if peer.poll_closed() {
                self.disconnect(stats, "peer closed");
            }
        }
        if self.peer.is_some() {
            return;
        }

        match self.listener.accept() {
            Ok((stream, addr)) => match TextPeer::new(stream, addr) {
                Ok(peer) => {
                    tracing::info!(peer = %addr, "Peer connected");
                    stats.connects += 1;
                    self.peer = Some(peer);
                }
                Err(e) => tracing::warn!(peer = %addr, error = %e, "Could not configure peer socket"),
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => tracing::debug!(error = %e, "Accept failed"),
        }
    }

    /// Encodes and writes `packet` if a peer is connected.
    pub fn deliver(&mut self, packet: &Packet, stats: &mut SessionStats) {
        let Some(peer) = &mut self.peer else {
            return;
        };
        let record = match self.encoder.encode(packet) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Record encoding failed");
                stats.records_dropped += 1;
                return;
            }
        };

        match peer.write_record(record) {
            WriteOutcome::Written | WriteOutcome::Partial => stats.records_written += 1,
            WriteOutcome::Dropped => stats.records_dropped += 1,
            WriteOutcome::Closed => {
                stats.records_dropped += 1;
                self.disconnect(stats, "write failed");
            }
        }
    }

    fn disconnect(&mut self, stats: &mut SessionStats, reason: &str) {
        if let Some(peer) = self.peer.take() {
            tracing::warn!(peer = %peer.addr(), reason, "Peer lost, listening again");
            stats.disconnects += 1;
        }
    }
}

/// Binary datagrams to a fixed destination.
pub struct BinarySink {
    transport: UdpTransport,
    destination: SocketAddr,
    encoder: BinaryEncoder,
    skeleton_interval: u64,
    frames: u64,
    started: Instant,
}

impl BinarySink {
    /// Binds the sending socket.
    ///
    /// The handshake announces the bound IPv4 address, or loopback when
    /// bound to a wildcard or IPv6 address, and the destination port.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Bind`] if the address cannot be bound.
    pub fn bind(addr: SocketAddr, destination: SocketAddr, skeleton_interval: u32) -> StreamResult<Self> {
        let transport = UdpTransport::bind(addr)?;
        let sender = match transport.local_addr().ip() {
            IpAddr::V4(ip) if !ip.is_unspecified() => ip,
            _ => Ipv4Addr::LOCALHOST,
        };
        tracing::info!(
            local = %transport.local_addr(),
            %destination,
            skeleton_interval,
            "Streaming binary datagrams"
        );

        Ok(Self {
            transport,
            destination,
            encoder: BinaryEncoder::new(sender, destination.port()),
            skeleton_interval: u64::from(skeleton_interval.max(1)),
            frames: 0,
            started: Instant::now(),
        })
    }

    /// Local address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Destination address.
    #[must_use]
    pub const fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Sends the skeleton when due, then the frame.
    pub fn deliver(&mut self, packet: &Packet, stats: &mut SessionStats) {
        if self.frames % self.skeleton_interval == 0 {
            let datagram = self.encoder.encode_skeleton();
            let outcome = self.transport.send_to(datagram, self.destination);
            Self::record(outcome, stats);
        }

        let stamp = FrameStamp::wrapping(self.frames, self.started.elapsed().as_micros());
        let datagram = self.encoder.encode_frame(packet, stamp);
        let outcome = self.transport.send_to(datagram, self.destination);
        Self::record(outcome, stats);
        self.frames += 1;
    }

    fn record(outcome: SendOutcome, stats: &mut SessionStats) {
        match outcome {
            SendOutcome::Sent(_) => stats.datagrams_sent += 1,
            SendOutcome::WouldBlock | SendOutcome::Failed => stats.datagrams_dropped += 1,
        }
    }
}

/// The active sink, chosen by protocol at startup.
pub enum Sink {
    /// JSON lines over TCP.
    Text(TextSink),
    /// TLV datagrams over UDP.
    Binary(BinarySink),
}

impl Sink {
    /// Local socket address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        match self {
            Self::Text(sink) => sink.local_addr(),
            Self::Binary(sink) => sink.local_addr(),
        }
    }

    /// Peer state; `None` for the connectionless binary sink.
    #[must_use]
    pub const fn peer_state(&self) -> Option<PeerState> {
        match self {
            Self::Text(sink) => Some(sink.state()),
            Self::Binary(_) => None,
        }
    }

    /// Accept-check step of the tick.
    pub fn poll_connection(&mut self, stats: &mut SessionStats) {
        if let Self::Text(sink) = self {
            sink.poll_connection(stats);
        }
    }

    /// Encode-and-write step of the tick.
    pub fn deliver(&mut self, packet: &Packet, stats: &mut SessionStats) {
        match self {
            Self::Text(sink) => sink.deliver(packet, stats),
            Self::Binary(sink) => sink.deliver(packet, stats),
        }
    }
}
