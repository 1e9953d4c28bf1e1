//! CLI infrastructure for the boardmind toolkit
//!
//! This module provides the command-line interface for training value
//! tables through self-play and inspecting saved snapshots.

pub mod commands;
pub mod output;
