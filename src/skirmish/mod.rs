//! Skirmish: a compact grid game bundled as the reference rules
//! collaborator.
//!
//! The learning core is game-agnostic; this module exists so the crate can
//! be exercised end-to-end. Three piece kinds on a small square grid give
//! the agents real captures, real exposure refusals and a real monarch to
//! lose, without the full weight of a chess rules engine.

pub mod board;

pub use board::{Board, Piece, PieceKind};
