// Relay host role — the authoritative peer registry and fan-out loop.
//
// One background thread owns the bounded-blocking receive call and is the
// registry's only writer; the mutex around the registry exists solely so
// the game thread can take a read-only clone. A shared `AtomicBool` gives
// cooperative shutdown, with latency bounded by the transport timeout.
//
// Per-datagram dispatch while listening:
// - CONNECT        derive the identity, register the snapshot, reply with
//                  WORLD_STATE directly to the sender (bootstrap).
// - PLAYER_UPDATE  merge into the registry, forward the original bytes
//                  unchanged to every other registered peer.
// - CHAT/BATTLE_*  forward unchanged; the host never inspects game traffic.
// - DISCONNECT     remove identity and snapshot; unknown sender is a no-op.
// - anything else  drop and keep looping.
//
// A decode failure on one datagram is logged and dropped at the loop
// boundary. Only deactivation (or a bind failure at activation time) ends
// the listening state.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use maple_grove_protocol::{Envelope, MAX_DATAGRAM_SIZE, Payload, PeerId, PlayerSnapshot, codec};

use crate::registry::PlayerRegistry;
use crate::transport::{Endpoint, TransportError};

/// Default UDP port for hosted games.
pub const DEFAULT_PORT: u16 = 31337;

/// Host role lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostState {
    /// Not activated, or fully shut down.
    Idle,
    /// Receive loop running.
    Listening,
    /// Deactivation requested; the loop exits after its current receive
    /// call returns.
    Stopping,
}

const STATE_IDLE: u8 = 0;
const STATE_LISTENING: u8 = 1;
const STATE_STOPPING: u8 = 2;

fn state_from(raw: u8) -> HostState {
    match raw {
        STATE_LISTENING => HostState::Listening,
        STATE_STOPPING => HostState::Stopping,
        _ => HostState::Idle,
    }
}

/// Configuration for activating a host.
#[derive(Clone, Debug)]
pub struct HostConfig {
    pub bind_ip: IpAddr,
    pub port: u16,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

/// Handle returned by `activate_host` to observe and stop the running host.
pub struct HostHandle {
    keep_running: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    registry: Arc<Mutex<PlayerRegistry>>,
    thread: Option<JoinHandle<()>>,
}

impl HostHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> HostState {
        state_from(self.state.load(Ordering::SeqCst))
    }

    /// Read-only snapshot of the authoritative registry.
    pub fn registry_view(&self) -> PlayerRegistry {
        self.registry
            .lock()
            .map(|registry| registry.clone())
            .unwrap_or_default()
    }

    /// Signal the host to stop and wait for the loop to exit. Latency is
    /// bounded by the transport receive timeout.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.state.store(STATE_STOPPING, Ordering::SeqCst);
        self.keep_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        self.state.store(STATE_IDLE, Ordering::SeqCst);
    }
}

impl Drop for HostHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Bind the host endpoint and start the receive loop on a background
/// thread. Returns the handle and the actual bound address (port 0 lets
/// the OS pick a free one). Bind failure is the one fatal error; everything
/// after activation is drop-and-continue.
pub fn activate_host(config: HostConfig) -> Result<(HostHandle, SocketAddr), TransportError> {
    let endpoint = Endpoint::bind(SocketAddr::new(config.bind_ip, config.port))?;
    let addr = endpoint.local_addr().map_err(TransportError::Configure)?;

    let keep_running = Arc::new(AtomicBool::new(true));
    let state = Arc::new(AtomicU8::new(STATE_LISTENING));
    let registry = Arc::new(Mutex::new(PlayerRegistry::new()));

    let thread = thread::spawn({
        let keep_running = keep_running.clone();
        let registry = registry.clone();
        move || run_host(endpoint, registry, &keep_running)
    });

    log::info!("host listening on {addr}");

    Ok((
        HostHandle {
            keep_running,
            state,
            registry,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Receive loop. Runs until the handle clears the flag; each pass blocks at
/// most one transport timeout.
fn run_host(endpoint: Endpoint, registry: Arc<Mutex<PlayerRegistry>>, keep_running: &AtomicBool) {
    let mut session = HostSession {
        endpoint,
        registry,
        peers: BTreeMap::new(),
    };
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];

    while keep_running.load(Ordering::SeqCst) {
        let Some((len, from)) = session.endpoint.receive(&mut buf) else {
            continue; // timeout — re-check the shutdown flag
        };
        session.handle_datagram(&buf[..len], from);
    }
}

/// Host-side session state: the address→identity table plus the
/// authoritative registry. Driven entirely from the receive thread.
struct HostSession {
    endpoint: Endpoint,
    registry: Arc<Mutex<PlayerRegistry>>,
    peers: BTreeMap<SocketAddr, PeerId>,
}

impl HostSession {
    /// Decode and dispatch one datagram. Malformed datagrams are dropped
    /// here; nothing a peer sends can stop the loop.
    fn handle_datagram(&mut self, bytes: &[u8], from: SocketAddr) {
        let envelope = match codec::decode(bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::debug!("dropping datagram from {from}: {e}");
                return;
            }
        };

        let kind = envelope.payload.type_name();
        match envelope.payload {
            Payload::Connect { snapshot } => self.handle_connect(from, snapshot),
            Payload::PlayerUpdate { fields, .. } => self.handle_update(from, &fields, bytes),
            Payload::Chat { .. } | Payload::BattleRequest { .. } | Payload::BattleAction { .. } => {
                self.relay_from(from, bytes, kind);
            }
            Payload::Disconnect => self.handle_disconnect(from),
            Payload::WorldState { .. } | Payload::DownloadPlay | Payload::PatchSync => {
                // Not valid client→host traffic (the last two are reserved).
                log::debug!("ignoring {kind} from {from}");
            }
        }
    }

    /// CONNECT: derive the identity, register the initial snapshot, and
    /// reply with the full registry so the new peer can bootstrap.
    fn handle_connect(&mut self, from: SocketAddr, snapshot: PlayerSnapshot) {
        let id = PeerId::from_addr(&from);
        self.peers.insert(from, id);

        let players = {
            let Ok(mut registry) = self.registry.lock() else {
                return;
            };
            registry.insert(id, snapshot);
            registry.to_map()
        };
        log::info!("peer {id} connected from {from}");

        let reply = Envelope::now(Payload::WorldState { you: id, players });
        match codec::encode(&reply) {
            Ok(bytes) => self.endpoint.send(&bytes, from),
            // An oversized world state is rejected whole. The peer keeps its
            // registration and still sees others through relayed updates.
            Err(e) => log::warn!("world state reply to {id} dropped: {e}"),
        }
    }

    /// PLAYER_UPDATE: merge into the registry, then forward the original
    /// bytes unchanged to every other registered peer.
    fn handle_update(&mut self, from: SocketAddr, fields: &PlayerSnapshot, bytes: &[u8]) {
        let Some(id) = self.peers.get(&from).copied() else {
            // Peer must CONNECT first.
            log::debug!("update from unregistered {from} dropped");
            return;
        };
        if let Ok(mut registry) = self.registry.lock() {
            registry.merge(id, fields);
        }
        self.fan_out(bytes, from);
    }

    /// Forward opaque game traffic (chat, battle) from a registered peer.
    fn relay_from(&mut self, from: SocketAddr, bytes: &[u8], kind: &str) {
        if self.peers.contains_key(&from) {
            self.fan_out(bytes, from);
        } else {
            log::debug!("{kind} from unregistered {from} dropped");
        }
    }

    /// DISCONNECT: remove identity and snapshot. Unknown sender: no-op.
    fn handle_disconnect(&mut self, from: SocketAddr) {
        if let Some(id) = self.peers.remove(&from) {
            if let Ok(mut registry) = self.registry.lock() {
                registry.remove(id);
            }
            log::info!("peer {id} disconnected");
        }
    }

    /// O(n) fan-out: send to every registered peer except the origin. No
    /// acknowledgement, no retry.
    fn fan_out(&self, bytes: &[u8], origin: SocketAddr) {
        for addr in self.peers.keys() {
            if *addr != origin {
                self.endpoint.send(bytes, *addr);
            }
        }
    }
}
