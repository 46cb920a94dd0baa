// maple_grove_protocol — wire protocol for multiplayer state sync.
//
// This crate defines the identity, snapshot, message, and codec types used
// by the relay host (`maple_grove_relay::host`) and game clients to
// communicate over UDP. It is shared between both sides and has no
// dependency on the game or on any I/O.
//
// Module overview:
// - `types.rs`:    `PeerId` — fixed-width peer token derived from a raw
//                  transport address.
// - `snapshot.rs`: `PlayerSnapshot` — flat field map with field-by-field
//                  merge semantics.
// - `message.rs`:  `Envelope` and `Payload` — the typed wire vocabulary.
// - `codec.rs`:    JSON datagram codec with the 1 KB size bound and
//                  recoverable error types.
//
// Design decisions:
// - **JSON serialization.** A human-inspectable text format, deliberately
//   chosen over a compact binary one: peer sets are small, datagrams are
//   ~1 KB, and being able to read a capture matters more than bandwidth.
// - **No framing.** UDP datagrams are already delimited; the codec only
//   enforces the size bound.
// - **Identity in payloads.** The host relays bytes unchanged, so receivers
//   never see source addresses; any message a client must attribute carries
//   the sender's `PeerId` inside.

pub mod codec;
pub mod message;
pub mod snapshot;
pub mod types;

pub use codec::{DecodeError, EncodeError, MAX_DATAGRAM_SIZE, decode, encode};
pub use message::{Envelope, Payload};
pub use snapshot::PlayerSnapshot;
pub use types::PeerId;
