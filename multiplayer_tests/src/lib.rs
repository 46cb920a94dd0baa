// Test-only peer for multiplayer integration tests.
//
// Wraps a real `NetContext` in client role to provide a synchronous,
// test-friendly API for exercising the full pipeline:
// host → connect → bootstrap → update → fan-out → drain → reconcile.
//
// The only test-specific code here is the blocking poll wrappers (loops
// around the non-blocking `drain_messages()`). All networking uses the same
// code paths as the real game.
//
// See also: `tests/full_pipeline.rs` for the scenarios.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::thread;
use std::time::{Duration, Instant};

use maple_grove_protocol::{Envelope, Payload, PeerId, PlayerSnapshot};
use maple_grove_relay::{HostConfig, HostHandle, NetContext, activate_host};

/// Default timeout for blocking poll operations.
const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleep duration between poll attempts.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Start a host on an OS-assigned loopback port.
pub fn start_test_host() -> (HostHandle, SocketAddr) {
    activate_host(HostConfig {
        bind_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
    })
    .expect("activate_host failed")
}

/// A test peer wrapping a real `NetContext` in client role.
pub struct TestPeer {
    pub ctx: NetContext,
    /// Everything drained so far, in arrival order.
    pub received: Vec<Envelope>,
}

impl TestPeer {
    /// Connect to a host with a named initial snapshot and wait for the
    /// WORLD_STATE bootstrap, so the peer knows its own identity.
    pub fn connect(host_addr: SocketAddr, name: &str) -> Self {
        let mut ctx = NetContext::new();
        ctx.activate_client(host_addr, PlayerSnapshot::new().with("name", name))
            .expect("activate_client failed");
        let mut peer = Self {
            ctx,
            received: Vec::new(),
        };
        peer.wait_for(|env| matches!(env.payload, Payload::WorldState { .. }));
        peer
    }

    /// The identity the host assigned to this peer.
    pub fn id(&self) -> PeerId {
        self.ctx.own_id().expect("peer not bootstrapped")
    }

    /// Drain whatever has arrived right now. Also reconciles the view.
    pub fn drain(&mut self) -> Vec<Envelope> {
        let messages = self.ctx.drain_messages();
        self.received.extend(messages.iter().cloned());
        messages
    }

    /// Poll until an envelope matching `pred` arrives, or panic after the
    /// timeout. Returns the matching envelope.
    pub fn wait_for(&mut self, pred: impl Fn(&Envelope) -> bool) -> Envelope {
        let deadline = Instant::now() + POLL_TIMEOUT;
        loop {
            if let Some(envelope) = self.drain().into_iter().find(|env| pred(env)) {
                return envelope;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for a matching envelope"
            );
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Poll for `duration`, collecting everything that arrives.
    pub fn drain_for(&mut self, duration: Duration) -> Vec<Envelope> {
        let deadline = Instant::now() + duration;
        let mut collected = Vec::new();
        while Instant::now() < deadline {
            collected.extend(self.drain());
            thread::sleep(POLL_INTERVAL);
        }
        collected
    }
}

/// Poll an arbitrary condition until it holds, or panic after the timeout.
pub fn wait_until(what: &str, mut pred: impl FnMut() -> bool) {
    let deadline = Instant::now() + POLL_TIMEOUT;
    while !pred() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(POLL_INTERVAL);
    }
}
