//! CLI commands

pub mod inspect;
pub mod train;
