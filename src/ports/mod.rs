//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the learning core and its
//! surroundings. Following hexagonal architecture, these traits are owned
//! by the domain and implemented by adapters and game collaborators.

pub mod observer;
pub mod rules;
pub mod snapshot;

pub use observer::MatchObserver;
pub use rules::{ActionOutcome, CapturedPiece, RulesOracle};
pub use snapshot::SnapshotRepository;
