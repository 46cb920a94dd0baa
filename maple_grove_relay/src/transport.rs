// UDP transport endpoint.
//
// A thin wrapper over `UdpSocket` owning the three operations the rest of
// the crate needs: bind, best-effort send, and time-bounded receive. The
// receive timeout is short so a network thread notices its deactivation
// flag promptly — cancellation is cooperative, and shutdown latency is
// bounded by `RECV_TIMEOUT`.
//
// Error surface is deliberately narrow: only bind/configure failures reach
// the caller (fatal during activation). A failed send drops the datagram —
// loss is an inherent property of this transport, and every layer above is
// written to tolerate stale or missing snapshots.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use maple_grove_protocol::MAX_DATAGRAM_SIZE;

/// Upper bound on one blocking receive. Short enough that deactivation is
/// noticed promptly, long enough to not busy-spin an idle socket.
pub const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Fatal transport failures, surfaced only during activation. Per-datagram
/// send failures are non-fatal and dropped at the call site.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("bind {addr} failed: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("socket configuration failed: {0}")]
    Configure(#[from] io::Error),
}

/// Connectionless datagram endpoint.
pub struct Endpoint {
    socket: UdpSocket,
}

impl Endpoint {
    /// Bind to `addr` and arm the bounded receive timeout.
    pub fn bind(addr: SocketAddr) -> Result<Self, TransportError> {
        let socket =
            UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        socket.set_read_timeout(Some(RECV_TIMEOUT))?;
        Ok(Self { socket })
    }

    /// Bind to an OS-assigned port (client side).
    pub fn bind_ephemeral() -> Result<Self, TransportError> {
        Self::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
    }

    /// The locally bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Best-effort send. No delivery confirmation; a transient failure
    /// drops the datagram silently (debug-logged).
    pub fn send(&self, bytes: &[u8], dest: SocketAddr) {
        if let Err(e) = self.socket.send_to(bytes, dest) {
            log::debug!("dropped send of {} bytes to {dest}: {e}", bytes.len());
        }
    }

    /// Receive at most one datagram, waiting up to `RECV_TIMEOUT`.
    ///
    /// `None` means the timeout elapsed with no data — the calling loop
    /// checks its shutdown flag and comes back. A datagram longer than the
    /// buffer is truncated by the OS and will fail to decode downstream.
    pub fn receive(&self, buf: &mut [u8; MAX_DATAGRAM_SIZE]) -> Option<(usize, SocketAddr)> {
        match self.socket.recv_from(buf) {
            Ok((len, addr)) => Some((len, addr)),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                None
            }
            Err(e) => {
                log::debug!("receive error: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn loopback_endpoint() -> (Endpoint, SocketAddr) {
        let endpoint = Endpoint::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = endpoint.local_addr().unwrap();
        (endpoint, addr)
    }

    #[test]
    fn send_and_receive_roundtrip() {
        let (sender, _) = loopback_endpoint();
        let (receiver, receiver_addr) = loopback_endpoint();

        sender.send(b"over the wire", receiver_addr);

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        // Datagram delivery on loopback can still take a moment.
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if let Some((len, _from)) = receiver.receive(&mut buf) {
                assert_eq!(&buf[..len], b"over the wire");
                break;
            }
            assert!(Instant::now() < deadline, "datagram never arrived");
        }
    }

    #[test]
    fn receive_times_out_with_no_data() {
        let (endpoint, _) = loopback_endpoint();
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        let start = Instant::now();
        assert!(endpoint.receive(&mut buf).is_none());
        // Returned after roughly one timeout, not immediately-forever.
        assert!(start.elapsed() < RECV_TIMEOUT * 10);
    }

    #[test]
    fn bind_conflict_is_a_bind_error() {
        let (_held, addr) = loopback_endpoint();
        match Endpoint::bind(addr) {
            Err(TransportError::Bind { addr: failed, .. }) => assert_eq!(failed, addr),
            other => panic!("expected Bind error, got {:?}", other.map(|_| "endpoint")),
        }
    }

    #[test]
    fn send_to_unreachable_does_not_panic() {
        let (endpoint, _) = loopback_endpoint();
        // Port 9 (discard) on loopback with nothing bound: the send either
        // vanishes or errors; both are silent at this layer.
        endpoint.send(b"nobody home", "127.0.0.1:9".parse().unwrap());
    }
}
