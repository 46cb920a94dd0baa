// Player snapshots — the unit of state exchanged between peers.
//
// A snapshot is a flat mapping of named fields (`name`, `level`, `x`, `y`,
// `coins`, ...) rather than a fixed struct: the game sends whatever subset
// changed this tick, and a receiver merges field-by-field over what it
// already holds. Incoming fields overwrite, omitted fields are retained,
// the last arrival wins — there is no timestamp reconciliation.
//
// `BTreeMap` keeps iteration (and serialized output) in a stable order.
// `#[serde(transparent)]` makes the wire form a plain JSON object, the same
// shape the rest of the game reads and writes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Partial or full record of one player's observable state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerSnapshot {
    fields: BTreeMap<String, Value>,
}

impl PlayerSnapshot {
    /// Empty snapshot — a valid initial state for a just-connected peer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert, for snapshot literals.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a single field, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_owned(), value.into());
    }

    /// Raw field access, for fields without a typed accessor.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Merge `incoming` over this snapshot: incoming fields overwrite,
    /// fields absent from `incoming` are retained.
    pub fn merge(&mut self, incoming: &PlayerSnapshot) {
        for (name, value) in &incoming.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    // Typed accessors for the fields every part of the game understands.
    // Anything else (species, items, stats, ...) stays reachable via `get`.

    /// Display name.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Character level.
    pub fn level(&self) -> Option<i64> {
        self.fields.get("level").and_then(Value::as_i64)
    }

    /// Coin purse.
    pub fn coins(&self) -> Option<i64> {
        self.fields.get("coins").and_then(Value::as_i64)
    }

    /// Overworld position, if both coordinates are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        let x = self.fields.get("x").and_then(Value::as_f64)?;
        let y = self.fields.get("y").and_then(Value::as_f64)?;
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_incoming_and_retains_omitted() {
        let mut stored = PlayerSnapshot::new().with("x", 1.0).with("y", 2.0);
        stored.merge(&PlayerSnapshot::new().with("x", 5.0));
        assert_eq!(stored, PlayerSnapshot::new().with("x", 5.0).with("y", 2.0));
    }

    #[test]
    fn merge_adds_new_fields() {
        let mut stored = PlayerSnapshot::new().with("name", "Fern");
        stored.merge(&PlayerSnapshot::new().with("coins", 100));
        assert_eq!(stored.name(), Some("Fern"));
        assert_eq!(stored.coins(), Some(100));
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn merge_of_empty_is_identity() {
        let mut stored = PlayerSnapshot::new().with("level", 3);
        stored.merge(&PlayerSnapshot::new());
        assert_eq!(stored, PlayerSnapshot::new().with("level", 3));
    }

    #[test]
    fn typed_accessors() {
        let snapshot = PlayerSnapshot::new()
            .with("name", "Hazel")
            .with("level", 7)
            .with("coins", 42)
            .with("x", 128.0)
            .with("y", 96.0);
        assert_eq!(snapshot.name(), Some("Hazel"));
        assert_eq!(snapshot.level(), Some(7));
        assert_eq!(snapshot.coins(), Some(42));
        assert_eq!(snapshot.position(), Some((128.0, 96.0)));
    }

    #[test]
    fn position_requires_both_coordinates() {
        let snapshot = PlayerSnapshot::new().with("x", 10.0);
        assert_eq!(snapshot.position(), None);
    }

    #[test]
    fn wire_form_is_a_flat_json_object() {
        let snapshot = PlayerSnapshot::new().with("name", "Rowan").with("x", 10.0);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"name":"Rowan","x":10.0}"#);
        let back: PlayerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn open_field_set_roundtrips() {
        // Fields the protocol has no accessor for still travel intact.
        let snapshot = PlayerSnapshot::new()
            .with("species", "Sprite")
            .with("items", serde_json::json!(["Mushroom", "Maple Syrup"]));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: PlayerSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
