// Wire envelope and message payloads.
//
// Every datagram carries exactly one `Envelope`: a `"type"` tag, a
// float-seconds `"timestamp"`, and a `"payload"` whose shape depends on the
// tag. The tag set is fixed; two tags (DOWNLOAD_PLAY, PATCH_SYNC) are
// reserved — they decode fine and the host drops them.
//
// Identity travels inside payloads: the host relays bytes unchanged, so a
// receiving client never sees the source address of the peer a message is
// about. PLAYER_UPDATE, CHAT_MESSAGE and the battle messages therefore embed
// the sender's `PeerId`. The `id`/`from` fields are `None` until the sender
// has learned its token from the WORLD_STATE bootstrap; receivers ignore
// entries without one.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::snapshot::PlayerSnapshot;
use crate::types::PeerId;

/// The typed outer wrapper around any message payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Send time, float seconds since the Unix epoch.
    pub timestamp: f64,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Envelope {
    /// Wrap a payload with the current wall-clock timestamp.
    pub fn now(payload: Payload) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Self { timestamp, payload }
    }
}

/// Message payloads, tagged on the wire by type name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Payload {
    /// Peer asks to join, carrying its initial snapshot (may be empty).
    #[serde(rename = "CONNECT")]
    Connect { snapshot: PlayerSnapshot },
    /// Peer is leaving.
    #[serde(rename = "DISCONNECT")]
    Disconnect,
    /// Partial snapshot for one peer, merged field-by-field on arrival.
    #[serde(rename = "PLAYER_UPDATE")]
    PlayerUpdate {
        id: Option<PeerId>,
        fields: PlayerSnapshot,
    },
    /// Free-form chat line, relayed to all other peers.
    #[serde(rename = "CHAT_MESSAGE")]
    Chat {
        from: Option<PeerId>,
        text: String,
    },
    /// Challenge another peer. The host relays it like any other game
    /// traffic; the target filters on the consumer side.
    #[serde(rename = "BATTLE_REQUEST")]
    BattleRequest {
        from: Option<PeerId>,
        target: PeerId,
    },
    /// One combat input. `value` carries the action-command timing.
    #[serde(rename = "BATTLE_ACTION")]
    BattleAction {
        from: Option<PeerId>,
        action: String,
        value: f64,
    },
    /// Bootstrap reply from the host: the full registry plus the identity
    /// the host assigned to the receiving peer.
    #[serde(rename = "WORLD_STATE")]
    WorldState {
        you: PeerId,
        players: BTreeMap<PeerId, PlayerSnapshot>,
    },
    /// Reserved — declared by the protocol, no behavior yet.
    #[serde(rename = "DOWNLOAD_PLAY")]
    DownloadPlay,
    /// Reserved — declared by the protocol, no behavior yet.
    #[serde(rename = "PATCH_SYNC")]
    PatchSync,
}

impl Payload {
    /// Wire name of this payload's type tag, for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "CONNECT",
            Self::Disconnect => "DISCONNECT",
            Self::PlayerUpdate { .. } => "PLAYER_UPDATE",
            Self::Chat { .. } => "CHAT_MESSAGE",
            Self::BattleRequest { .. } => "BATTLE_REQUEST",
            Self::BattleAction { .. } => "BATTLE_ACTION",
            Self::WorldState { .. } => "WORLD_STATE",
            Self::DownloadPlay => "DOWNLOAD_PLAY",
            Self::PatchSync => "PATCH_SYNC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_stamps_a_recent_timestamp() {
        let envelope = Envelope::now(Payload::Disconnect);
        assert!(envelope.timestamp > 0.0);
    }

    #[test]
    fn type_names_match_wire_tags() {
        let envelope = Envelope {
            timestamp: 0.0,
            payload: Payload::Connect {
                snapshot: PlayerSnapshot::new(),
            },
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""type":"CONNECT""#));
        assert_eq!(envelope.payload.type_name(), "CONNECT");
    }

    #[test]
    fn unit_payloads_serialize_without_payload_key() {
        let envelope = Envelope {
            timestamp: 1.0,
            payload: Payload::Disconnect,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"timestamp":1.0,"type":"DISCONNECT"}"#);
    }
}
