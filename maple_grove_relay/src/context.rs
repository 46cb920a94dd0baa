// The context object the game loop talks to.
//
// `NetContext` owns whichever role is active, the inbound queue behind it,
// and the consumer-side world view. There is no process-wide state: multiple
// contexts coexist happily (the integration tests run several per process)
// and teardown is deterministic.
//
// The game loop's contract, once per tick:
//   1. `drain_messages()` — reconciles inbound state into the view and
//      hands back the envelopes (chat lines, battle traffic) for game-side
//      handling. Never blocks.
//   2. `send_update(snapshot)` — when local state changed this tick.
//   3. `registry()` — read-only view for rendering remote players.

use std::net::SocketAddr;

use maple_grove_protocol::{Envelope, PeerId, PlayerSnapshot};

use crate::client::NetClient;
use crate::host::{HostConfig, HostHandle, activate_host};
use crate::registry::{PlayerRegistry, WorldView};
use crate::transport::TransportError;

enum Role {
    Offline,
    Hosting(HostHandle),
    Client(NetClient),
}

/// Owns the active network role, its queue, and the consumer-side view.
pub struct NetContext {
    role: Role,
    view: WorldView,
}

impl NetContext {
    /// A context with no active role.
    pub fn new() -> Self {
        Self {
            role: Role::Offline,
            view: WorldView::new(),
        }
    }

    /// Activate the host role; returns the bound address. Fails only on
    /// bind/configure errors. Any previously active role is shut down first.
    pub fn activate_host(&mut self, config: HostConfig) -> Result<SocketAddr, TransportError> {
        self.deactivate();
        let (handle, addr) = activate_host(config)?;
        self.role = Role::Hosting(handle);
        Ok(addr)
    }

    /// Activate the client role: announce to a host and start receiving.
    pub fn activate_client(
        &mut self,
        host_addr: SocketAddr,
        initial: PlayerSnapshot,
    ) -> Result<(), TransportError> {
        self.deactivate();
        let client = NetClient::activate(host_addr, initial)?;
        self.role = Role::Client(client);
        Ok(())
    }

    /// True while this context is the authoritative host.
    pub fn is_host(&self) -> bool {
        matches!(self.role, Role::Hosting(_))
    }

    /// The local player's host-assigned identity (client role, known once
    /// the WORLD_STATE bootstrap has been drained).
    pub fn own_id(&self) -> Option<PeerId> {
        self.view.own_id()
    }

    /// Send a partial snapshot of the local player (client role only — the
    /// host's own player is not in the registry and sends nothing).
    pub fn send_update(&self, fields: PlayerSnapshot) {
        if let Role::Client(client) = &self.role {
            client.send_update(self.view.own_id(), fields);
        }
    }

    /// Send a chat line (client role only).
    pub fn send_chat(&self, text: &str) {
        if let Role::Client(client) = &self.role {
            client.send_chat(self.view.own_id(), text);
        }
    }

    /// Challenge another peer (client role only).
    pub fn send_battle_request(&self, target: PeerId) {
        if let Role::Client(client) = &self.role {
            client.send_battle_request(self.view.own_id(), target);
        }
    }

    /// Send one combat input (client role only).
    pub fn send_battle_action(&self, action: &str, value: f64) {
        if let Role::Client(client) = &self.role {
            client.send_battle_action(self.view.own_id(), action, value);
        }
    }

    /// Drain inbound envelopes, reconcile state messages into the view, and
    /// return everything for game-side handling. Never blocks.
    pub fn drain_messages(&mut self) -> Vec<Envelope> {
        let Role::Client(client) = &self.role else {
            return Vec::new();
        };
        let messages = client.drain();
        for envelope in &messages {
            self.view.apply(envelope);
        }
        messages
    }

    /// Read-only view of the current registry: authoritative when hosting,
    /// the eventually-consistent cache otherwise.
    pub fn registry(&self) -> PlayerRegistry {
        match &self.role {
            Role::Hosting(handle) => handle.registry_view(),
            _ => self.view.registry().clone(),
        }
    }

    /// Shut down whichever role is active and clear the view.
    pub fn deactivate(&mut self) {
        match std::mem::replace(&mut self.role, Role::Offline) {
            Role::Hosting(handle) => handle.stop(),
            Role::Client(client) => client.deactivate(),
            Role::Offline => {}
        }
        self.view = WorldView::new();
    }
}

impl Default for NetContext {
    fn default() -> Self {
        Self::new()
    }
}
