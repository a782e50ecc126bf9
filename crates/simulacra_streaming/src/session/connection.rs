//! # Peer Connection
//!
//! The single TCP peer of a text session.
//!
//! ## Design
//!
//! - The stream is non-blocking; nothing here ever waits
//! - A record that only partly fits is kept and finished on later ticks,
//!   so the newline framing survives back-pressure
//! - While a tail is pending, new records are dropped rather than queued

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};

/// Reads per tick when draining whatever the peer sends us.
const MAX_READS_PER_POLL: usize = 16;

/// State of the text session's one peer slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum PeerState {
    /// No peer; accepting.
    #[default]
    Listening = 0,
    /// Streaming to a peer; not accepting.
    Connected = 1,
}

/// Result of offering one record to the peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The whole record was handed to the kernel.
    Written,
    /// Part of the record was written; the rest is pending.
    Partial,
    /// An earlier record is still draining; this one was discarded.
    Dropped,
    /// The peer is gone.
    Closed,
}

/// A connected text peer.
#[derive(Debug)]
pub struct TextPeer {
    stream: TcpStream,
    addr: SocketAddr,
    pending: Vec<u8>,
}

impl TextPeer {
    /// Wraps an accepted stream, switching it to non-blocking with
    /// `TCP_NODELAY`.
    ///
    /// # Errors
    ///
    /// Returns the socket error if either option cannot be set.
    pub fn new(stream: TcpStream, addr: SocketAddr) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            addr,
            pending: Vec::new(),
        })
    }

    /// Peer address.
    #[inline]
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bytes of an earlier record still waiting to be written.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Checks whether the peer hung up. Anything it sent is discarded.
    #[must_use]
    pub fn poll_closed(&mut self) -> bool {
        let mut scratch = [0u8; 512];
        for _ in 0..MAX_READS_PER_POLL {
            match self.stream.read(&mut scratch) {
                Ok(0) => return true,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return false,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::debug!(peer = %self.addr, error = %e, "Peer read failed");
                    return true;
                }
            }
        }
        false
    }

    /// Writes one record, finishing any pending tail first.
    pub fn write_record(&mut self, record: &[u8]) -> WriteOutcome {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            match self.write_some(&pending) {
                Ok(n) if n < pending.len() => {
                    self.pending = pending[n..].to_vec();
                    return WriteOutcome::Dropped;
                }
                Ok(_) => {}
                Err(()) => return WriteOutcome::Closed,
            }
        }

        match self.write_some(record) {
            Ok(n) if n == record.len() => WriteOutcome::Written,
            Ok(n) => {
                self.pending.extend_from_slice(&record[n..]);
                WriteOutcome::Partial
            }
            Err(()) => WriteOutcome::Closed,
        }
    }

    /// Writes as much of `data` as the socket takes right now.
    fn write_some(&mut self, data: &[u8]) -> Result<usize, ()> {
        let mut written = 0;
        while written < data.len() {
            match self.stream.write(&data[written..]) {
                Ok(0) => {
                    tracing::debug!(peer = %self.addr, "Peer accepted zero bytes");
                    return Err(());
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::debug!(peer = %self.addr, error = %e, "Peer write failed");
                    return Err(());
                }
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;
    use std::time::Duration;

    fn pair() -> (TextPeer, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, addr) = listener.accept().unwrap();
        (TextPeer::new(server, addr).unwrap(), client)
    }

    #[test]
    fn test_default_state_is_listening() {
        assert_eq!(PeerState::default(), PeerState::Listening);
    }

    #[test]
    fn test_record_arrives() {
        let (mut peer, client) = pair();
        assert_eq!(peer.write_record(b"{\"a\":1}\n"), WriteOutcome::Written);
        assert_eq!(peer.pending_len(), 0);

        client.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut line = String::new();
        BufReader::new(client).read_line(&mut line).unwrap();
        assert_eq!(line, "{\"a\":1}\n");
    }

    #[test]
    fn test_open_peer_is_not_closed() {
        let (mut peer, _client) = pair();
        assert!(!peer.poll_closed());
    }

    #[test]
    fn test_incoming_data_is_discarded() {
        let (mut peer, mut client) = pair();
        client.write_all(b"hello").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(!peer.poll_closed());
    }

    #[test]
    fn test_hangup_is_detected() {
        let (mut peer, client) = pair();
        drop(client);
        std::thread::sleep(Duration::from_millis(20));
        assert!(peer.poll_closed());
    }

    #[test]
    fn test_backpressure_keeps_framing() {
        let (mut peer, client) = pair();
        let record = {
            let mut r = vec![b'x'; 64 * 1024];
            r.push(b'\n');
            r
        };

        // Nobody reads, so the socket buffers fill up.
        let mut saw_drop = false;
        for _ in 0..512 {
            match peer.write_record(&record) {
                WriteOutcome::Dropped => {
                    saw_drop = true;
                    break;
                }
                WriteOutcome::Closed => panic!("peer closed"),
                WriteOutcome::Written | WriteOutcome::Partial => {}
            }
        }
        assert!(saw_drop);
        assert!(peer.pending_len() > 0);
        assert!(peer.pending_len() <= record.len());
        drop(client);
    }
}
