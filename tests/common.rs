//! Common test utilities for the boardmind test suite.
//!
//! Provides a scripted rules oracle and a collecting observer so tests can
//! control exactly what a session sees and inspect every event it emits.

use std::{
    cell::RefCell,
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use boardmind::{
    Result,
    canonical::{BoardSnapshot, PieceSnapshot},
    ports::{ActionOutcome, MatchObserver, RulesOracle},
    session::{MatchOutcome, TurnRecord},
    types::{ActionDescriptor, Seat, Square},
};

/// A rules oracle that replays queued snapshots and apply outcomes.
///
/// Snapshots are served in queue order. Each carries the seat the session
/// is expected to request it for, which pins down the perspective
/// convention: the mover at turn start, the next mover for successors.
/// Apply outcomes are popped one per call and every applied action is
/// logged for later assertions.
pub struct ScriptedOracle {
    snapshots: RefCell<VecDeque<BoardSnapshot>>,
    outcomes: VecDeque<Result<ActionOutcome>>,
    applied: Vec<(Seat, ActionDescriptor)>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self {
            snapshots: RefCell::new(VecDeque::new()),
            outcomes: VecDeque::new(),
            applied: Vec::new(),
        }
    }

    pub fn expect_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.snapshots.borrow_mut().push_back(snapshot);
    }

    pub fn expect_apply(&mut self, outcome: Result<ActionOutcome>) {
        self.outcomes.push_back(outcome);
    }

    /// Actions the session applied, in order.
    pub fn applied(&self) -> &[(Seat, ActionDescriptor)] {
        &self.applied
    }

    /// Snapshots that were queued but never requested.
    pub fn remaining_snapshots(&self) -> usize {
        self.snapshots.borrow().len()
    }
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesOracle for ScriptedOracle {
    fn snapshot(&self, seat: Seat) -> BoardSnapshot {
        let snapshot = self
            .snapshots
            .borrow_mut()
            .pop_front()
            .expect("a scripted snapshot is queued");
        assert_eq!(
            snapshot.seat, seat,
            "session requested a snapshot for an unscripted seat"
        );
        snapshot
    }

    fn apply(&mut self, seat: Seat, action: &ActionDescriptor) -> Result<ActionOutcome> {
        self.applied.push((seat, action.clone()));
        self.outcomes
            .pop_front()
            .expect("a scripted apply outcome is queued")
    }

    fn is_terminal(&self, _seat: Seat) -> bool {
        self.snapshots.borrow().is_empty()
    }
}

/// A stationary piece contributing only to the canonical key.
pub fn fixed(kind: char, owner: Seat, col: usize, row: usize) -> PieceSnapshot {
    PieceSnapshot::new(kind, owner, Square::new(col, row))
}

/// A piece with precomputed quiet moves and captures.
pub fn mobile(
    kind: char,
    owner: Seat,
    col: usize,
    row: usize,
    moves: &[(usize, usize)],
    captures: &[(usize, usize)],
) -> PieceSnapshot {
    PieceSnapshot::new(kind, owner, Square::new(col, row))
        .with_moves(moves.iter().map(|&(c, r)| Square::new(c, r)).collect())
        .with_captures(captures.iter().map(|&(c, r)| Square::new(c, r)).collect())
}

/// Observer that copies every event into shared vectors so tests can
/// inspect turn records after the session is done with the boxes.
#[derive(Clone, Default)]
pub struct CollectingObserver {
    pub turns: Arc<Mutex<Vec<TurnRecord>>>,
    pub outcomes: Arc<Mutex<Vec<MatchOutcome>>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchObserver for CollectingObserver {
    fn on_turn(&mut self, _game_num: usize, record: &TurnRecord) -> Result<()> {
        self.turns.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn on_game_end(&mut self, _game_num: usize, outcome: &MatchOutcome) -> Result<()> {
        self.outcomes.lock().unwrap().push(*outcome);
        Ok(())
    }
}
