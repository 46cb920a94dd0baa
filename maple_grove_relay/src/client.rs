// Peer client role — sends local snapshots, receives relayed state.
//
// `activate()` binds an ephemeral UDP endpoint, announces itself with
// CONNECT, and spawns a background receive loop. The loop only decodes and
// enqueues onto the inbound queue — it never touches game state, which
// keeps the network thread free of consumer-side races. The consumer drains
// on its own tick via `drain()` (or through `NetContext`, which also
// reconciles the world view).
//
// Every send is best-effort: loss is an inherent property of the transport
// and nothing here retries. The CONNECT itself can be lost too; the caller
// decides whether to re-activate.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use maple_grove_protocol::{Envelope, MAX_DATAGRAM_SIZE, Payload, PeerId, PlayerSnapshot, codec};

use crate::queue::{MessageQueue, QueueSender};
use crate::transport::{Endpoint, TransportError};

/// Client role: one UDP endpoint, one reader thread, one inbound queue.
pub struct NetClient {
    endpoint: Arc<Endpoint>,
    host_addr: SocketAddr,
    queue: MessageQueue,
    keep_running: Arc<AtomicBool>,
    reader_thread: Option<JoinHandle<()>>,
}

impl NetClient {
    /// Bind an ephemeral endpoint, send CONNECT with the local player's
    /// initial snapshot, and start the receive loop. Bind failure is fatal;
    /// the CONNECT is best-effort like every other datagram.
    pub fn activate(
        host_addr: SocketAddr,
        initial: PlayerSnapshot,
    ) -> Result<Self, TransportError> {
        let endpoint = Arc::new(Endpoint::bind_ephemeral()?);
        let queue = MessageQueue::new();
        let keep_running = Arc::new(AtomicBool::new(true));

        send_envelope(
            &endpoint,
            host_addr,
            &Envelope::now(Payload::Connect { snapshot: initial }),
        );

        let reader_thread = thread::spawn({
            let endpoint = endpoint.clone();
            let sender = queue.sender();
            let keep_running = keep_running.clone();
            move || reader_loop(&endpoint, &sender, &keep_running)
        });

        Ok(Self {
            endpoint,
            host_addr,
            queue,
            keep_running,
            reader_thread: Some(reader_thread),
        })
    }

    /// Send a PLAYER_UPDATE carrying only locally-known fields. Called once
    /// per simulation tick when local state changed.
    pub fn send_update(&self, id: Option<PeerId>, fields: PlayerSnapshot) {
        self.send(Payload::PlayerUpdate { id, fields });
    }

    /// Send a chat line.
    pub fn send_chat(&self, from: Option<PeerId>, text: &str) {
        self.send(Payload::Chat {
            from,
            text: text.to_owned(),
        });
    }

    /// Challenge another peer to a battle.
    pub fn send_battle_request(&self, from: Option<PeerId>, target: PeerId) {
        self.send(Payload::BattleRequest { from, target });
    }

    /// Send one combat input.
    pub fn send_battle_action(&self, from: Option<PeerId>, action: &str, value: f64) {
        self.send(Payload::BattleAction {
            from,
            action: action.to_owned(),
            value,
        });
    }

    /// Drain all queued inbound envelopes. Non-blocking.
    pub fn drain(&self) -> Vec<Envelope> {
        self.queue.drain()
    }

    /// Send DISCONNECT and stop the receive loop. Shutdown latency is
    /// bounded by the transport receive timeout.
    pub fn deactivate(mut self) {
        self.send(Payload::Disconnect);
        self.shutdown();
    }

    fn send(&self, payload: Payload) {
        send_envelope(&self.endpoint, self.host_addr, &Envelope::now(payload));
    }

    fn shutdown(&mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.reader_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for NetClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Encode and send one envelope, best-effort. An envelope that exceeds the
/// datagram bound is rejected whole and logged, never truncated.
fn send_envelope(endpoint: &Endpoint, dest: SocketAddr, envelope: &Envelope) {
    match codec::encode(envelope) {
        Ok(bytes) => endpoint.send(&bytes, dest),
        Err(e) => log::warn!("outbound {} dropped: {e}", envelope.payload.type_name()),
    }
}

/// Reader loop: receive, decode, enqueue. Never touches game state.
fn reader_loop(endpoint: &Endpoint, sender: &QueueSender, keep_running: &AtomicBool) {
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    while keep_running.load(Ordering::SeqCst) {
        let Some((len, from)) = endpoint.receive(&mut buf) else {
            continue; // timeout — re-check the shutdown flag
        };
        match codec::decode(&buf[..len]) {
            Ok(envelope) => sender.push(envelope),
            Err(e) => log::debug!("dropping datagram from {from}: {e}"),
        }
    }
}
