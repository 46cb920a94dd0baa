// Core identity type for the state-sync protocol.
//
// `PeerId` is the host's stable identifier for one remote participant,
// derived deterministically from the peer's raw transport address (IP octets
// and port — never a formatted address string, so the derivation does not
// depend on display formatting). The token is opaque to clients: it only has
// to be stable for the session and unique within the small peer set.
//
// On the wire a `PeerId` is a fixed-width 16-hex-digit string. JSON object
// keys must be strings, and WORLD_STATE carries a registry keyed by peer —
// the text form keeps that payload both valid JSON and human-readable.

use std::fmt;
use std::hash::Hasher;
use std::net::{IpAddr, SocketAddr};

use rustc_hash::FxHasher;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable opaque token identifying one remote peer for a session.
///
/// Created by the host on first CONNECT, removed on DISCONNECT. Clients
/// treat it as opaque; only [`PeerId::from_addr`] gives it structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl PeerId {
    /// Derive a peer identity from a raw transport address.
    ///
    /// Deterministic: the same address tuple always yields the same token,
    /// so a peer that reconnects from the same source address keeps its
    /// identity.
    pub fn from_addr(addr: &SocketAddr) -> Self {
        let mut hasher = FxHasher::default();
        match addr.ip() {
            IpAddr::V4(ip) => hasher.write(&ip.octets()),
            IpAddr::V6(ip) => hasher.write(&ip.octets()),
        }
        hasher.write_u16(addr.port());
        Self(hasher.finish())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(&s, 16)
            .map(PeerId)
            .map_err(|_| D::Error::custom(format!("invalid peer id: {s:?}")))
    }
}
