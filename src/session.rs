//! Turn controller driving one full game between two seats.
//!
//! The session owns the per-turn choreography the core is specified
//! against: canonicalize, assign, choose, apply through the rules oracle,
//! interpret the rule-level outcome into rewards and penalties, then
//! perform and evaluate. Reward coupling and exposure settlement live here;
//! the agents never talk to the oracle directly.

use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    agent::StateAgent,
    error::Error,
    ports::{MatchObserver, RulesOracle},
    types::{ActionDescriptor, Seat, StateKey},
};

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// The side to move had no actions; it loses.
    NoMoves { loser: Seat },
    /// The side to move chose an action refused for exposing its own
    /// monarch; it is penalized and loses on the spot.
    ExposedKing { loser: Seat },
    /// A monarch was taken.
    MonarchCaptured { winner: Seat },
    /// The mover's registered actions for this position could not be
    /// applied to the board, so it cannot act through its own table. This
    /// happens when a transposition hands the mover a state first
    /// registered for the other side.
    Forfeit { loser: Seat },
    /// The configured turn limit was reached with no decision.
    TurnLimit,
}

impl MatchOutcome {
    /// The winning seat, if the game produced one.
    pub fn winner(&self) -> Option<Seat> {
        match self {
            MatchOutcome::NoMoves { loser }
            | MatchOutcome::ExposedKing { loser }
            | MatchOutcome::Forfeit { loser } => Some(loser.opponent()),
            MatchOutcome::MonarchCaptured { winner } => Some(*winner),
            MatchOutcome::TurnLimit => None,
        }
    }
}

/// The decision-side details of a turn taken by a learning agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    /// Canonical key of the decided state.
    pub state: StateKey,
    /// Visit count of that state at assignment time.
    pub visits: u64,
    /// Stored value of the chosen action at selection time.
    pub value: f64,
    /// Deep evaluation of the chosen action at selection time.
    pub deep_value: Option<f64>,
    /// Whether value and deep evaluation disagreed.
    pub drift: bool,
    /// Value of the edge after this turn's update.
    pub updated_value: f64,
    /// Mover's learned-state counter after the turn.
    pub learned_states: u64,
    /// Mover's evaluated-action counter after the turn.
    pub evaluated_actions: u64,
}

/// One completed turn as seen by observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 0-based ply number.
    pub turn: usize,
    pub seat: Seat,
    pub action: ActionDescriptor,
    /// Reward observed by the mover (capture value, exposure penalty, or
    /// zero).
    pub reward: f64,
    /// Kind tag of the piece captured this turn, if any.
    pub captured: Option<char>,
    /// Whether the opponent's retained last action was devalued in
    /// response to a capture. Stays `false` when there was nothing to
    /// devalue yet.
    pub opponent_devalued: bool,
    /// Present for turns decided by a learning agent, absent for the
    /// random baseline.
    pub decision: Option<DecisionRecord>,
}

/// One captured piece, attributed to the capturing seat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub turn: usize,
    pub by: Seat,
    pub kind: char,
    pub value: f64,
}

/// Everything a finished game reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub outcome: MatchOutcome,
    /// Number of completed plies.
    pub turns: usize,
    pub captures: Vec<CaptureRecord>,
}

impl MatchReport {
    /// Pieces captured by `seat` over the game.
    pub fn captured_by(&self, seat: Seat) -> impl Iterator<Item = &CaptureRecord> {
        self.captures.iter().filter(move |c| c.by == seat)
    }
}

/// Session tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Hard bound on plies per game; reaching it ends the game undecided.
    pub max_turns: usize,
}

impl MatchConfig {
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { max_turns: 200 }
    }
}

/// Who decides a seat's moves.
///
/// The random baseline picks uniformly among the board's current legal
/// transitions and never touches the value table; captures it suffers
/// still devalue nothing, but captures it inflicts devalue the learning
/// opponent as usual.
pub enum SeatController {
    Learning(StateAgent),
    Random(StdRng),
}

impl SeatController {
    pub fn learning(agent: StateAgent) -> Self {
        SeatController::Learning(agent)
    }

    pub fn random(seed: u64) -> Self {
        SeatController::Random(StdRng::seed_from_u64(seed))
    }

    /// The learning agent behind this controller, if any.
    pub fn agent(&self) -> Option<&StateAgent> {
        match self {
            SeatController::Learning(agent) => Some(agent),
            SeatController::Random(_) => None,
        }
    }

    fn agent_mut(&mut self) -> Option<&mut StateAgent> {
        match self {
            SeatController::Learning(agent) => Some(agent),
            SeatController::Random(_) => None,
        }
    }
}

enum TurnStep {
    Continue(TurnRecord),
    Ended(MatchOutcome, Option<TurnRecord>),
}

/// Drives games over one rules oracle.
pub struct MatchSession<'o, O: RulesOracle> {
    oracle: &'o mut O,
    config: MatchConfig,
}

impl<'o, O: RulesOracle> MatchSession<'o, O> {
    pub fn new(oracle: &'o mut O, config: MatchConfig) -> Self {
        Self { oracle, config }
    }

    /// Play one full game. Equivalent to [`MatchSession::play_observed`]
    /// with no observers.
    pub fn play(
        &mut self,
        p1: &mut SeatController,
        p2: &mut SeatController,
    ) -> Result<MatchReport> {
        self.play_observed(p1, p2, 0, &mut [])
    }

    /// Play one full game, reporting every turn and the outcome to the
    /// observers. P1 moves first; controllers keep their counters and the
    /// shared table across games, only per-game protocol state is reset.
    pub fn play_observed(
        &mut self,
        p1: &mut SeatController,
        p2: &mut SeatController,
        game_num: usize,
        observers: &mut [Box<dyn MatchObserver>],
    ) -> Result<MatchReport> {
        if let Some(agent) = p1.agent_mut() {
            agent.begin_game();
        }
        if let Some(agent) = p2.agent_mut() {
            agent.begin_game();
        }
        for observer in observers.iter_mut() {
            observer.on_game_start(game_num)?;
        }

        let mut captures = Vec::new();
        let mut turn = 0;

        let outcome = loop {
            if turn >= self.config.max_turns {
                break MatchOutcome::TurnLimit;
            }

            let seat = if turn.is_multiple_of(2) {
                Seat::P1
            } else {
                Seat::P2
            };
            let (mover, other) = match seat {
                Seat::P1 => (&mut *p1, &mut *p2),
                Seat::P2 => (&mut *p2, &mut *p1),
            };

            let step = self.take_turn(seat, turn, mover, other, &mut captures)?;
            match step {
                TurnStep::Continue(record) => {
                    turn += 1;
                    for observer in observers.iter_mut() {
                        observer.on_turn(game_num, &record)?;
                    }
                }
                TurnStep::Ended(outcome, record) => {
                    if let Some(record) = record {
                        turn += 1;
                        for observer in observers.iter_mut() {
                            observer.on_turn(game_num, &record)?;
                        }
                    }
                    break outcome;
                }
            }
        };

        for observer in observers.iter_mut() {
            observer.on_game_end(game_num, &outcome)?;
        }

        Ok(MatchReport {
            outcome,
            turns: turn,
            captures,
        })
    }

    fn take_turn(
        &mut self,
        seat: Seat,
        turn: usize,
        mover: &mut SeatController,
        other: &mut SeatController,
        captures: &mut Vec<CaptureRecord>,
    ) -> Result<TurnStep> {
        match mover {
            SeatController::Learning(agent) => {
                self.learning_turn(seat, turn, agent, other, captures)
            }
            SeatController::Random(rng) => {
                Self::random_turn(self.oracle, seat, turn, rng, other, captures)
            }
        }
    }

    fn learning_turn(
        &mut self,
        seat: Seat,
        turn: usize,
        agent: &mut StateAgent,
        other: &mut SeatController,
        captures: &mut Vec<CaptureRecord>,
    ) -> Result<TurnStep> {
        let position = self.oracle.snapshot(seat).canonicalize();
        let acquired = agent.set_state(&position)?;

        let chosen = match agent.choose_action() {
            Ok(chosen) => chosen,
            Err(Error::NoLegalActions { .. }) => {
                return Ok(TurnStep::Ended(MatchOutcome::NoMoves { loser: seat }, None));
            }
            Err(e) => return Err(e),
        };

        let outcome = match self.oracle.apply(seat, &chosen.descriptor) {
            Ok(outcome) => outcome,
            Err(
                Error::WrongOwner { .. }
                | Error::EmptySquare { .. }
                | Error::UnreachableSquare { .. },
            ) => {
                return Ok(TurnStep::Ended(MatchOutcome::Forfeit { loser: seat }, None));
            }
            Err(e) => return Err(e),
        };

        if outcome.exposes_own_king {
            let penalty = agent.value_config().illegal_penalty;
            let evaluated = agent.punish_chosen_action(penalty)?;
            let record = TurnRecord {
                turn,
                seat,
                action: chosen.descriptor.clone(),
                reward: penalty,
                captured: None,
                opponent_devalued: false,
                decision: Some(DecisionRecord {
                    state: position.key.clone(),
                    visits: acquired.visits,
                    value: chosen.value,
                    deep_value: chosen.deep_value,
                    drift: chosen.drifted(),
                    updated_value: evaluated.value,
                    learned_states: agent.learned_states(),
                    evaluated_actions: agent.evaluated_actions(),
                }),
            };
            return Ok(TurnStep::Ended(
                MatchOutcome::ExposedKing { loser: seat },
                Some(record),
            ));
        }

        let mut reward = 0.0;
        let mut opponent_devalued = false;
        if let Some(captured) = outcome.captured {
            reward = captured.value;
            captures.push(CaptureRecord {
                turn,
                by: seat,
                kind: captured.kind,
                value: captured.value,
            });
            opponent_devalued = Self::devalue_victim(other, captured.value)?;
        }

        // Successor states are registered from the next mover's point of
        // view, so the opponent's turn starts on the list this call created.
        let successor = self.oracle.snapshot(seat.opponent()).canonicalize();
        agent.perform_state_action(&chosen, &successor)?;
        let evaluated = agent.evaluate_last_action(reward)?;

        let record = TurnRecord {
            turn,
            seat,
            action: chosen.descriptor.clone(),
            reward,
            captured: outcome.captured.map(|c| c.kind),
            opponent_devalued,
            decision: Some(DecisionRecord {
                state: position.key.clone(),
                visits: acquired.visits,
                value: chosen.value,
                deep_value: chosen.deep_value,
                drift: chosen.drifted(),
                updated_value: evaluated.value,
                learned_states: agent.learned_states(),
                evaluated_actions: agent.evaluated_actions(),
            }),
        };

        if let Some(captured) = outcome.captured
            && captured.decisive
        {
            return Ok(TurnStep::Ended(
                MatchOutcome::MonarchCaptured { winner: seat },
                Some(record),
            ));
        }

        Ok(TurnStep::Continue(record))
    }

    fn random_turn(
        oracle: &mut O,
        seat: Seat,
        turn: usize,
        rng: &mut StdRng,
        other: &mut SeatController,
        captures: &mut Vec<CaptureRecord>,
    ) -> Result<TurnStep> {
        let position = oracle.snapshot(seat).canonicalize();
        let Some(action) = position.actions.choose(rng).cloned() else {
            return Ok(TurnStep::Ended(MatchOutcome::NoMoves { loser: seat }, None));
        };

        let outcome = oracle.apply(seat, &action)?;

        if outcome.exposes_own_king {
            let record = TurnRecord {
                turn,
                seat,
                action,
                reward: 0.0,
                captured: None,
                opponent_devalued: false,
                decision: None,
            };
            return Ok(TurnStep::Ended(
                MatchOutcome::ExposedKing { loser: seat },
                Some(record),
            ));
        }

        let mut reward = 0.0;
        let mut opponent_devalued = false;
        if let Some(captured) = outcome.captured {
            reward = captured.value;
            captures.push(CaptureRecord {
                turn,
                by: seat,
                kind: captured.kind,
                value: captured.value,
            });
            opponent_devalued = Self::devalue_victim(other, captured.value)?;
        }

        let record = TurnRecord {
            turn,
            seat,
            action,
            reward,
            captured: outcome.captured.map(|c| c.kind),
            opponent_devalued,
            decision: None,
        };

        if let Some(captured) = outcome.captured
            && captured.decisive
        {
            return Ok(TurnStep::Ended(
                MatchOutcome::MonarchCaptured { winner: seat },
                Some(record),
            ));
        }

        Ok(TurnStep::Continue(record))
    }

    /// Apply the capture coupling: the victim's controller has its retained
    /// last action devalued by the captured piece's value. Skipped without
    /// error when the controller has not executed a transition yet (first
    /// capture of a game) or is not learning.
    fn devalue_victim(other: &mut SeatController, value: f64) -> Result<bool> {
        let Some(agent) = other.agent_mut() else {
            return Ok(false);
        };
        if agent.last_transition().is_none() {
            return Ok(false);
        }

        agent.devalue_last_action(-value)?;
        Ok(true)
    }
}
