//! Rules port - abstraction over the board/rules collaborator.
//!
//! The learning core never inspects a board directly. Everything it needs
//! flows through this trait: an observation of the position with reachable
//! transitions, the rule-level consequence of applying a chosen transition,
//! and a terminality check.

use crate::{
    Result,
    canonical::BoardSnapshot,
    types::{ActionDescriptor, Seat, Square},
};

/// A piece removed from the board by an applied action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturedPiece {
    /// Kind tag of the captured piece, as used in state strings.
    pub kind: char,
    /// Reward value of the capture; also the magnitude of the devaluation
    /// applied to the victim's controller.
    pub value: f64,
    /// Square the piece was taken from.
    pub square: Square,
    /// Whether losing this piece ends the game for its owner.
    pub decisive: bool,
}

/// Rule-level consequence of applying one action.
///
/// Exposure is a designed outcome, not an error: the move is refused, the
/// board stays untouched and `applied` is `false`. Errors are reserved for
/// actions that are malformed at the board level (empty origin, foreign
/// piece, unreachable destination).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionOutcome {
    /// Whether the board was changed.
    pub applied: bool,
    /// The piece taken, when the action was a capture.
    pub captured: Option<CapturedPiece>,
    /// The action would leave the mover's own monarch attackable; the
    /// board was left untouched.
    pub exposes_own_king: bool,
}

impl ActionOutcome {
    /// An applied non-capturing move.
    pub fn applied() -> Self {
        Self {
            applied: true,
            captured: None,
            exposes_own_king: false,
        }
    }

    /// An applied capture.
    pub fn captured(piece: CapturedPiece) -> Self {
        Self {
            applied: true,
            captured: Some(piece),
            exposes_own_king: false,
        }
    }

    /// A refused, exposure-flagged action.
    pub fn exposed() -> Self {
        Self {
            applied: false,
            captured: None,
            exposes_own_king: true,
        }
    }
}

/// Port for the game supplying positions and applying transitions.
///
/// Implementations own the board representation and the movement rules;
/// the core only requires that `snapshot` and `apply` agree on which
/// transitions exist.
pub trait RulesOracle {
    /// Observe the full position from `seat`'s point of view, with
    /// reachable destinations filled in for `seat`'s pieces.
    fn snapshot(&self, seat: Seat) -> BoardSnapshot;

    /// Execute a transition for `seat` and report its rule-level
    /// consequence.
    ///
    /// # Errors
    ///
    /// Fails fast on actions that are malformed at the board level:
    /// out-of-range squares, an empty origin, a foreign piece at the
    /// origin, or an unreachable destination. Exposure is not an error.
    fn apply(&mut self, seat: Seat, action: &ActionDescriptor) -> Result<ActionOutcome>;

    /// Whether `seat` has no transitions left to play.
    fn is_terminal(&self, seat: Seat) -> bool;
}
