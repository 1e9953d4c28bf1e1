//! Adapters (infrastructure implementations) of the domain ports.

pub mod in_memory_snapshots;
pub mod msgpack_snapshots;

pub use in_memory_snapshots::InMemorySnapshots;
pub use msgpack_snapshots::MsgPackSnapshots;
