// Player registry and consumer-side reconciliation.
//
// `PlayerRegistry` maps peer identity → last-known snapshot. The host's
// instance is authoritative and mutated only from its network thread; each
// client keeps an eventually-consistent cache, updated by whatever arrives.
// Last arrival wins — there is no timestamp reconciliation.
//
// `WorldView` is the consumer side: a registry cache plus the local
// player's identity, fed one drained envelope at a time each tick. The one
// invariant it enforces: the local player's own entry is never overwritten
// by an inbound message — local state is authoritative for the local player.

use std::collections::BTreeMap;

use maple_grove_protocol::{Envelope, Payload, PeerId, PlayerSnapshot};

/// Mapping from peer identity to last-known player snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerRegistry {
    players: BTreeMap<PeerId, PlayerSnapshot>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer with its initial snapshot, replacing any prior entry
    /// (a reconnect from the same address starts fresh).
    pub fn insert(&mut self, id: PeerId, snapshot: PlayerSnapshot) {
        self.players.insert(id, snapshot);
    }

    /// Merge a partial update into a registered peer's snapshot.
    /// Returns false if the peer is unknown; nothing is stored in that case.
    pub fn merge(&mut self, id: PeerId, fields: &PlayerSnapshot) -> bool {
        match self.players.get_mut(&id) {
            Some(stored) => {
                stored.merge(fields);
                true
            }
            None => false,
        }
    }

    /// Merge into an existing entry, or insert the fields as a new one.
    pub fn upsert(&mut self, id: PeerId, fields: &PlayerSnapshot) {
        self.players.entry(id).or_default().merge(fields);
    }

    /// Remove a peer. Removing an absent peer is a no-op, not an error.
    pub fn remove(&mut self, id: PeerId) {
        self.players.remove(&id);
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn get(&self, id: PeerId) -> Option<&PlayerSnapshot> {
        self.players.get(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeerId, &PlayerSnapshot)> {
        self.players.iter().map(|(id, snapshot)| (*id, snapshot))
    }

    /// Copy of all entries, for WORLD_STATE payloads.
    pub fn to_map(&self) -> BTreeMap<PeerId, PlayerSnapshot> {
        self.players.clone()
    }
}

/// Consumer-side view: a registry cache plus the local player's identity.
#[derive(Clone, Debug, Default)]
pub struct WorldView {
    registry: PlayerRegistry,
    own_id: Option<PeerId>,
}

impl WorldView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity the host assigned to the local player, known once the
    /// WORLD_STATE bootstrap has arrived.
    pub fn own_id(&self) -> Option<PeerId> {
        self.own_id
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// Apply one inbound envelope to the view. Envelopes that carry no
    /// registry state (chat, battle, reserved types) leave it untouched.
    pub fn apply(&mut self, envelope: &Envelope) {
        match &envelope.payload {
            Payload::WorldState { you, players } => {
                self.own_id = Some(*you);
                for (id, snapshot) in players {
                    if id == you {
                        // Own entry: seed it if missing, never overwrite.
                        if !self.registry.contains(*id) {
                            self.registry.insert(*id, snapshot.clone());
                        }
                    } else {
                        self.registry.upsert(*id, snapshot);
                    }
                }
            }
            Payload::PlayerUpdate {
                id: Some(id),
                fields,
            } => {
                if Some(*id) != self.own_id {
                    self.registry.upsert(*id, fields);
                }
            }
            // An update that doesn't name its sender cannot be attributed
            // to an entry — dropped.
            Payload::PlayerUpdate { id: None, .. } => {}
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use maple_grove_protocol::Envelope;

    use super::*;

    fn update(id: Option<PeerId>, fields: PlayerSnapshot) -> Envelope {
        Envelope::now(Payload::PlayerUpdate { id, fields })
    }

    #[test]
    fn merge_partial_update() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PeerId(1), PlayerSnapshot::new().with("x", 1.0).with("y", 2.0));

        assert!(registry.merge(PeerId(1), &PlayerSnapshot::new().with("x", 5.0)));

        let expected = PlayerSnapshot::new().with("x", 5.0).with("y", 2.0);
        assert_eq!(registry.get(PeerId(1)), Some(&expected));
    }

    #[test]
    fn merge_unknown_peer_stores_nothing() {
        let mut registry = PlayerRegistry::new();
        assert!(!registry.merge(PeerId(1), &PlayerSnapshot::new().with("x", 5.0)));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PeerId(1), PlayerSnapshot::new());
        registry.remove(PeerId(99));
        assert_eq!(registry.len(), 1);
        registry.remove(PeerId(1));
        registry.remove(PeerId(1));
        assert!(registry.is_empty());
    }

    #[test]
    fn insert_replaces_on_reconnect() {
        let mut registry = PlayerRegistry::new();
        registry.insert(PeerId(1), PlayerSnapshot::new().with("coins", 500));
        registry.insert(PeerId(1), PlayerSnapshot::new().with("name", "Fern"));

        let stored = registry.get(PeerId(1)).unwrap();
        assert_eq!(stored.name(), Some("Fern"));
        assert_eq!(stored.coins(), None);
    }

    #[test]
    fn view_bootstrap_records_identity_and_peers() {
        let mut view = WorldView::new();
        let mut players = BTreeMap::new();
        players.insert(PeerId(1), PlayerSnapshot::new().with("name", "Fern"));
        players.insert(PeerId(2), PlayerSnapshot::new().with("name", "Hazel"));

        view.apply(&Envelope::now(Payload::WorldState {
            you: PeerId(1),
            players,
        }));

        assert_eq!(view.own_id(), Some(PeerId(1)));
        assert_eq!(view.registry().len(), 2);
        assert_eq!(
            view.registry().get(PeerId(2)).and_then(|s| s.name()),
            Some("Hazel")
        );
    }

    #[test]
    fn view_upserts_remote_updates() {
        let mut view = WorldView::new();
        view.apply(&update(
            Some(PeerId(5)),
            PlayerSnapshot::new().with("x", 10.0),
        ));
        view.apply(&update(
            Some(PeerId(5)),
            PlayerSnapshot::new().with("y", 20.0),
        ));

        let stored = view.registry().get(PeerId(5)).unwrap();
        assert_eq!(stored.position(), Some((10.0, 20.0)));
    }

    #[test]
    fn view_never_overwrites_own_entry() {
        let mut view = WorldView::new();
        let mut players = BTreeMap::new();
        players.insert(PeerId(1), PlayerSnapshot::new().with("coins", 100));
        view.apply(&Envelope::now(Payload::WorldState {
            you: PeerId(1),
            players: players.clone(),
        }));

        // A forged update naming our own identity is ignored.
        view.apply(&update(
            Some(PeerId(1)),
            PlayerSnapshot::new().with("coins", 0),
        ));
        assert_eq!(view.registry().get(PeerId(1)).and_then(|s| s.coins()), Some(100));

        // So is our own entry in a later world state.
        players.insert(PeerId(1), PlayerSnapshot::new().with("coins", 1));
        view.apply(&Envelope::now(Payload::WorldState {
            you: PeerId(1),
            players,
        }));
        assert_eq!(view.registry().get(PeerId(1)).and_then(|s| s.coins()), Some(100));
    }

    #[test]
    fn view_ignores_updates_without_identity() {
        let mut view = WorldView::new();
        view.apply(&update(None, PlayerSnapshot::new().with("x", 1.0)));
        assert!(view.registry().is_empty());
    }

    #[test]
    fn view_ignores_non_state_messages() {
        let mut view = WorldView::new();
        view.apply(&Envelope::now(Payload::Chat {
            from: Some(PeerId(1)),
            text: "hi".into(),
        }));
        view.apply(&Envelope::now(Payload::DownloadPlay));
        assert!(view.registry().is_empty());
        assert_eq!(view.own_id(), None);
    }
}
