//! boardmind - tabular decision-and-learning core for turn-based board games
//!
//! This crate provides:
//! - Canonicalization of board positions into content-addressed state keys
//! - A memoizing state repository with optimistic value initialization
//! - Per-turn learning agents with a strict assign/choose/perform/evaluate
//!   protocol and cross-agent reward coupling on captures
//! - A match session and self-play pipeline over a pluggable rules oracle
//! - A bundled skirmish game exercising the whole stack end-to-end

pub mod adapters;
pub mod agent;
pub mod canonical;
pub mod cli;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod ports;
pub mod session;
pub mod skirmish;
pub mod state;
pub mod store;
pub mod types;

pub use agent::{ChosenAction, ExecutedTransition, StateAgent, TurnPhase};
pub use canonical::{BoardSnapshot, CanonicalPosition, PieceSnapshot};
pub use error::{Error, Result};
pub use session::{MatchConfig, MatchOutcome, MatchReport, MatchSession, SeatController};
pub use state::{State, StateAction};
pub use store::{Acquired, Evaluated, SharedStateStore, StateStore};
pub use types::{ActionDescriptor, Seat, Square, StateKey, ValueConfig};
