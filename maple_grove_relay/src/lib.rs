// maple_grove_relay — relay host and peer client for Maple Grove multiplayer.
//
// One process activates the host role and becomes the authoritative relay:
// it registers peers, merges their snapshot updates, and fans each update
// out to every other peer. Other processes activate the client role, send
// their local player's snapshot once per tick, and drain relayed state into
// an eventually-consistent world view. Transport is plain UDP — loss is
// tolerated, nothing is retried, and every layer above assumes snapshots
// can be stale or missing.
//
// Module overview:
// - `transport.rs`: `Endpoint` — UDP bind / best-effort send /
//                   time-bounded receive.
// - `registry.rs`:  `PlayerRegistry` (identity → snapshot) and `WorldView`
//                   (consumer-side reconciliation).
// - `host.rs`:      host role — receive loop, authoritative registry,
//                   WORLD_STATE bootstrap, fan-out.
// - `client.rs`:    client role — CONNECT, reader thread, best-effort
//                   sends.
// - `queue.rs`:     the mpsc hand-off between network threads and the
//                   consumer.
// - `context.rs`:   `NetContext`, the facade the game loop owns.
//
// Dependencies: `maple_grove_protocol` (shared message types and codec).
// No dependency on the game.
//
// The host can run standalone (`main.rs`, the `host` binary) or embedded in
// a game process via `NetContext::activate_host`.

pub mod client;
pub mod context;
pub mod host;
pub mod queue;
pub mod registry;
pub mod transport;

pub use client::NetClient;
pub use context::NetContext;
pub use host::{DEFAULT_PORT, HostConfig, HostHandle, HostState, activate_host};
pub use registry::{PlayerRegistry, WorldView};
pub use transport::TransportError;
