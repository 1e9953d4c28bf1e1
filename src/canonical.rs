//! Canonicalization of board positions into state keys and action descriptors.
//!
//! The canonicalizer is the only component that turns raw board content into
//! the string identity the repository memoizes on. Keys are built from every
//! piece on the board; action descriptors are built from the deciding seat's
//! pieces only.

use serde::{Deserialize, Serialize};

use crate::types::{ActionDescriptor, Seat, Square, StateKey};

/// One piece as observed on the board, together with the squares it can
/// reach. `moves` holds non-capturing destinations, `captures` destinations
/// occupied by an enemy piece. Reachability is the collaborator's business;
/// the canonicalizer performs no legality filtering of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub kind: char,
    pub owner: Seat,
    pub square: Square,
    pub moves: Vec<Square>,
    pub captures: Vec<Square>,
}

impl PieceSnapshot {
    /// A piece with no precomputed destinations. Destination lists only
    /// matter for the deciding seat's pieces.
    pub fn new(kind: char, owner: Seat, square: Square) -> Self {
        Self {
            kind,
            owner,
            square,
            moves: Vec::new(),
            captures: Vec::new(),
        }
    }

    pub fn with_moves(mut self, moves: Vec<Square>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_captures(mut self, captures: Vec<Square>) -> Self {
        self.captures = captures;
        self
    }

    /// Per-piece fragment of the canonical key: `<kind><owner>:<col>-<row>;`.
    pub fn state_string(&self) -> String {
        format!(
            "{}{}:{};",
            self.kind,
            self.owner.index(),
            self.square
        )
    }
}

/// A full observation of the board from one seat's point of view.
///
/// All pieces contribute to the canonical key; only pieces owned by `seat`
/// contribute action descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub seat: Seat,
    pub pieces: Vec<PieceSnapshot>,
}

impl BoardSnapshot {
    pub fn new(seat: Seat, pieces: Vec<PieceSnapshot>) -> Self {
        Self { seat, pieces }
    }

    /// Build the canonical form of this position.
    ///
    /// The key concatenates every piece's [`PieceSnapshot::state_string`] in
    /// sorted order, so two snapshots of the same content produce the same
    /// key no matter how their piece lists happen to be ordered. Actions are
    /// emitted in piece order, each piece listing its plain moves before its
    /// captures, which fixes the first-seen order the selection tie-break
    /// depends on.
    pub fn canonicalize(&self) -> CanonicalPosition {
        let mut fragments: Vec<String> = self.pieces.iter().map(|p| p.state_string()).collect();
        fragments.sort();

        let mut key = String::with_capacity(fragments.iter().map(String::len).sum());
        for fragment in &fragments {
            key.push_str(fragment);
        }

        let mut actions = Vec::new();
        for piece in &self.pieces {
            if piece.owner != self.seat {
                continue;
            }

            for target in piece.moves.iter().chain(piece.captures.iter()) {
                actions.push(ActionDescriptor::new(piece.square, *target));
            }
        }

        CanonicalPosition {
            key: StateKey::new(key),
            actions,
        }
    }
}

/// The canonical form of a board position: the memoization key plus the
/// transitions available to the deciding seat, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPosition {
    pub key: StateKey,
    pub actions: Vec<ActionDescriptor>,
}

impl CanonicalPosition {
    /// A position with no available transitions ends play for the side to
    /// move.
    pub fn is_terminal(&self) -> bool {
        self.actions.is_empty()
    }
}
