//! Self-play pipeline
//!
//! The pipeline stacks many games on one shared value table: the runner
//! rebuilds the board between games while the controllers keep their
//! counters and everything they have learned. Observers are composed in to
//! collect progress, metrics, or per-turn records without coupling the run
//! loop to any output format.

pub mod observers;
pub mod runner;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use runner::{AgentCounters, Opponent, RunConfig, SelfPlayResult, SelfPlayRunner};
