//! The per-seat decision and learning agent.
//!
//! A `StateAgent` owns no states; it drives the shared repository through a
//! strict per-turn protocol and keeps per-agent counters. Two agents built
//! over one [`SharedStateStore`] learn into the same table while their
//! counters stay private.

use std::fmt;

use crate::{
    Result,
    canonical::CanonicalPosition,
    error::Error,
    store::{Acquired, Evaluated, SharedStateStore},
    types::{ActionDescriptor, Seat, StateKey, ValueConfig},
};

/// Where in the per-turn protocol an agent currently stands.
///
/// The legal cycle is `Idle → StateAssigned → ActionChosen →
/// ActionPerformed → Idle`, with evaluation closing the cycle. Devaluation
/// of the retained last transition does not participate in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    StateAssigned,
    ActionChosen,
    ActionPerformed,
}

impl TurnPhase {
    pub fn name(self) -> &'static str {
        match self {
            TurnPhase::Idle => "Idle",
            TurnPhase::StateAssigned => "StateAssigned",
            TurnPhase::ActionChosen => "ActionChosen",
            TurnPhase::ActionPerformed => "ActionPerformed",
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The edge selected by [`StateAgent::choose_action`], with its value at
/// selection time and the freshly recomputed deep evaluation for drift
/// reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenAction {
    pub index: usize,
    pub descriptor: ActionDescriptor,
    pub value: f64,
    pub deep_value: Option<f64>,
}

impl ChosenAction {
    /// Whether the stored value and the recomputed deep evaluation
    /// disagree for this edge.
    pub fn drifted(&self) -> bool {
        self.deep_value.is_some_and(|deep| deep != self.value)
    }
}

/// The most recently executed transition, retained after evaluation so a
/// later capture by the opponent can still devalue it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedTransition {
    pub from: StateKey,
    pub index: usize,
    pub descriptor: ActionDescriptor,
    pub to: StateKey,
}

/// Decision and learning agent for one seat.
pub struct StateAgent {
    store: SharedStateStore,
    seat: Seat,
    phase: TurnPhase,
    current: Option<StateKey>,
    pending: Option<usize>,
    last: Option<ExecutedTransition>,
    learned_states: u64,
    evaluated_actions: u64,
}

impl StateAgent {
    pub fn new(store: SharedStateStore, seat: Seat) -> Self {
        Self {
            store,
            seat,
            phase: TurnPhase::Idle,
            current: None,
            pending: None,
            last: None,
            learned_states: 0,
            evaluated_actions: 0,
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Value constants of the shared store this agent learns into.
    pub fn value_config(&self) -> ValueConfig {
        *self.store.borrow().config()
    }

    /// Key of the state currently assigned to this agent, if any.
    pub fn current_state(&self) -> Option<&StateKey> {
        self.current.as_ref()
    }

    /// The retained most recently executed transition, if any.
    pub fn last_transition(&self) -> Option<&ExecutedTransition> {
        self.last.as_ref()
    }

    /// Distinct states this agent was first to register.
    pub fn learned_states(&self) -> u64 {
        self.learned_states
    }

    /// Value updates this agent has applied (evaluations, devaluations and
    /// penalties all count).
    pub fn evaluated_actions(&self) -> u64 {
        self.evaluated_actions
    }

    /// Clear per-game protocol state for a fresh game. Counters and the
    /// shared table persist.
    pub fn begin_game(&mut self) {
        self.phase = TurnPhase::Idle;
        self.current = None;
        self.pending = None;
        self.last = None;
    }

    /// Assign the position to decide over, registering it in the shared
    /// store. Allowed while `Idle` or when re-assigning before a choice.
    pub fn set_state(&mut self, position: &CanonicalPosition) -> Result<Acquired> {
        if !matches!(self.phase, TurnPhase::Idle | TurnPhase::StateAssigned) {
            return Err(self.violation("set_state"));
        }

        let acquired = self.store.borrow_mut().get_or_create(position);
        if acquired.created {
            self.learned_states += 1;
        }

        self.current = Some(position.key.clone());
        self.pending = None;
        self.phase = TurnPhase::StateAssigned;
        Ok(acquired)
    }

    /// Select the highest-valued action of the current state.
    ///
    /// Strictly-greater comparison keeps the first-seen action on ties, so
    /// a fresh state (all actions at the optimistic sentinel) yields its
    /// first registered action. An empty action list denotes a terminal
    /// position and is surfaced as [`Error::NoLegalActions`] with the phase
    /// left unchanged.
    pub fn choose_action(&mut self) -> Result<ChosenAction> {
        if self.phase != TurnPhase::StateAssigned {
            return Err(self.violation("choose_action"));
        }
        let Some(key) = self.current.clone() else {
            return Err(self.violation("choose_action"));
        };

        let (index, descriptor, value) = {
            let store = self.store.borrow();
            let state = store
                .state(key.as_str())
                .ok_or_else(|| Error::UnknownState {
                    state: key.to_string(),
                })?;

            if state.is_terminal() {
                return Err(Error::NoLegalActions {
                    state: key.to_string(),
                });
            }

            let mut best_index = 0;
            let mut best_value = state.actions()[0].value();
            for (i, action) in state.actions().iter().enumerate().skip(1) {
                if action.value() > best_value {
                    best_index = i;
                    best_value = action.value();
                }
            }

            let action = &state.actions()[best_index];
            (best_index, action.descriptor().clone(), action.value())
        };

        let deep_value = self.store.borrow_mut().deep_evaluation(&key, index)?;

        self.pending = Some(index);
        self.phase = TurnPhase::ActionChosen;
        Ok(ChosenAction {
            index,
            descriptor,
            value,
            deep_value,
        })
    }

    /// Mark the chosen action as executed and advance to the resulting
    /// position, registering it in the shared store. Performs no value
    /// update; the executed transition replaces the retained last one.
    pub fn perform_state_action(
        &mut self,
        chosen: &ChosenAction,
        successor: &CanonicalPosition,
    ) -> Result<Acquired> {
        if self.phase != TurnPhase::ActionChosen {
            return Err(self.violation("perform_state_action"));
        }
        if self.pending != Some(chosen.index) {
            return Err(self.violation("perform_state_action with unchosen action"));
        }
        let Some(from) = self.current.clone() else {
            return Err(self.violation("perform_state_action"));
        };

        let acquired = self.store.borrow_mut().get_or_create(successor);
        if acquired.created {
            self.learned_states += 1;
        }
        self.store
            .borrow_mut()
            .record_transition(&from, chosen.index, &successor.key)?;

        self.last = Some(ExecutedTransition {
            from,
            index: chosen.index,
            descriptor: chosen.descriptor.clone(),
            to: successor.key.clone(),
        });
        self.current = Some(successor.key.clone());
        self.pending = None;
        self.phase = TurnPhase::ActionPerformed;
        Ok(acquired)
    }

    /// Apply the TD update to the transition executed this turn using the
    /// observed reward, then return to `Idle`. Out-of-order calls fail with
    /// [`Error::ProtocolViolation`] and mutate nothing.
    pub fn evaluate_last_action(&mut self, reward: f64) -> Result<Evaluated> {
        if self.phase != TurnPhase::ActionPerformed {
            return Err(self.violation("evaluate_last_action"));
        }
        let Some(last) = self.last.clone() else {
            return Err(self.violation("evaluate_last_action"));
        };

        let evaluated = self
            .store
            .borrow_mut()
            .evaluate(&last.from, last.index, reward, &last.to)?;
        self.evaluated_actions += 1;
        self.phase = TurnPhase::Idle;
        Ok(evaluated)
    }

    /// Re-evaluate the retained last transition with a new reward,
    /// typically the negative value of a piece the opponent just captured.
    /// Callable between turns; requires that a transition was executed.
    pub fn devalue_last_action(&mut self, reward: f64) -> Result<Evaluated> {
        let Some(last) = self.last.clone() else {
            return Err(self.violation("devalue_last_action"));
        };

        let evaluated = self
            .store
            .borrow_mut()
            .evaluate(&last.from, last.index, reward, &last.to)?;
        self.evaluated_actions += 1;
        Ok(evaluated)
    }

    /// Record a rule rejection of the chosen action: its value becomes
    /// exactly `penalty` and the turn ends without the action ever being
    /// performed. The game is over for this agent; the caller settles the
    /// outcome in the opponent's favor.
    pub fn punish_chosen_action(&mut self, penalty: f64) -> Result<Evaluated> {
        if self.phase != TurnPhase::ActionChosen {
            return Err(self.violation("punish_chosen_action"));
        }
        let (Some(key), Some(index)) = (self.current.clone(), self.pending) else {
            return Err(self.violation("punish_chosen_action"));
        };

        let evaluated = self.store.borrow_mut().penalize(&key, index, penalty)?;
        self.evaluated_actions += 1;
        self.pending = None;
        self.phase = TurnPhase::Idle;
        Ok(evaluated)
    }

    fn violation(&self, operation: &'static str) -> Error {
        Error::ProtocolViolation {
            operation,
            phase: self.phase.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::StateStore, types::ValueConfig};

    fn position(key: &str, descriptors: &[&str]) -> CanonicalPosition {
        CanonicalPosition {
            key: StateKey::new(key),
            actions: descriptors
                .iter()
                .map(|d| d.parse::<ActionDescriptor>().expect("test descriptor"))
                .collect(),
        }
    }

    fn agent() -> StateAgent {
        StateAgent::new(SharedStateStore::default(), Seat::P1)
    }

    #[test]
    fn fresh_state_ties_break_to_the_first_action() {
        let mut agent = agent();
        agent
            .set_state(&position("k", &["0-0to0-1", "1-0to1-1", "2-0to2-1"]))
            .expect("set_state");

        let chosen = agent.choose_action().expect("choose");
        assert_eq!(chosen.index, 0);
        assert_eq!(chosen.descriptor.to_string(), "0-0to0-1");
        assert_eq!(chosen.deep_value, None, "fresh edge has no deep figure");
    }

    #[test]
    fn selection_prefers_the_highest_value() {
        let mut agent = agent();
        agent
            .set_state(&position("k", &["0-0to0-1", "1-0to1-1"]))
            .expect("set_state");
        let chosen = agent.choose_action().expect("choose");
        agent
            .perform_state_action(&chosen, &position("end", &[]))
            .expect("perform");
        agent.evaluate_last_action(-5.0).expect("evaluate");

        // First edge now sits at -5; the untried second edge still carries
        // the optimistic sentinel and must win the next selection.
        agent.set_state(&position("k", &[])).expect("set_state");
        let next = agent.choose_action().expect("choose");
        assert_eq!(next.index, 1);
    }

    #[test]
    fn terminal_state_surfaces_no_legal_actions() {
        let mut agent = agent();
        agent.set_state(&position("end", &[])).expect("set_state");

        let err = agent.choose_action().expect_err("must fail");
        assert!(matches!(err, Error::NoLegalActions { .. }));
        assert_eq!(agent.phase(), TurnPhase::StateAssigned);

        // Surfacing is repeatable; nothing was consumed.
        assert!(matches!(
            agent.choose_action(),
            Err(Error::NoLegalActions { .. })
        ));
    }

    #[test]
    fn a_full_turn_updates_counters_and_the_chosen_edge() {
        let store = SharedStateStore::default();
        let mut agent = StateAgent::new(store.clone(), Seat::P1);

        agent
            .set_state(&position("start", &["0-0to0-1"]))
            .expect("set_state");
        let chosen = agent.choose_action().expect("choose");
        agent
            .perform_state_action(&chosen, &position("after", &["5-5to5-4"]))
            .expect("perform");
        let evaluated = agent.evaluate_last_action(9.0).expect("evaluate");

        assert_eq!(agent.learned_states(), 2);
        assert_eq!(agent.evaluated_actions(), 1);
        assert_eq!(agent.phase(), TurnPhase::Idle);

        // reward + optimistic best of the successor
        let init = store.borrow().config().initial_value;
        assert_eq!(evaluated.value, 9.0 + init);
        assert_eq!(
            store.borrow().state("start").expect("registered").actions()[0].value(),
            9.0 + init
        );
    }

    #[test]
    fn evaluate_out_of_order_fails_and_mutates_nothing() {
        let store = SharedStateStore::default();
        let mut agent = StateAgent::new(store.clone(), Seat::P1);

        agent
            .set_state(&position("start", &["0-0to0-1"]))
            .expect("set_state");
        let _ = agent.choose_action().expect("choose");

        let err = agent.evaluate_last_action(1.0).expect_err("must fail");
        assert!(matches!(
            err,
            Error::ProtocolViolation {
                operation: "evaluate_last_action",
                ..
            }
        ));

        assert_eq!(agent.evaluated_actions(), 0);
        let init = store.borrow().config().initial_value;
        assert_eq!(
            store.borrow().state("start").expect("registered").actions()[0].value(),
            init,
            "no value update may leak from a rejected call"
        );
        assert_eq!(agent.phase(), TurnPhase::ActionChosen);
    }

    #[test]
    fn perform_rejects_an_action_that_was_not_chosen() {
        let mut agent = agent();
        agent
            .set_state(&position("start", &["0-0to0-1", "1-0to1-1"]))
            .expect("set_state");
        let chosen = agent.choose_action().expect("choose");

        let forged = ChosenAction {
            index: chosen.index + 1,
            ..chosen
        };
        let err = agent
            .perform_state_action(&forged, &position("after", &[]))
            .expect_err("must fail");
        assert!(matches!(err, Error::ProtocolViolation { .. }));
        assert_eq!(agent.phase(), TurnPhase::ActionChosen);
    }

    #[test]
    fn punish_assigns_exactly_the_penalty_and_ends_the_turn() {
        let store = SharedStateStore::default();
        let mut agent = StateAgent::new(store.clone(), Seat::P1);

        agent
            .set_state(&position("start", &["0-0to0-1", "1-0to1-1"]))
            .expect("set_state");
        let chosen = agent.choose_action().expect("choose");
        let evaluated = agent.punish_chosen_action(-10_000.0).expect("punish");

        assert_eq!(evaluated.value, -10_000.0);
        assert_eq!(agent.phase(), TurnPhase::Idle);
        assert_eq!(agent.evaluated_actions(), 1);
        assert_eq!(
            store.borrow().state("start").expect("registered").actions()[chosen.index].value(),
            -10_000.0
        );

        // The turn is over; the rejected action can no longer be performed.
        let err = agent
            .perform_state_action(&chosen, &position("after", &[]))
            .expect_err("must fail");
        assert!(matches!(err, Error::ProtocolViolation { .. }));
    }

    #[test]
    fn devalue_requires_an_executed_transition() {
        let mut agent = agent();
        assert!(matches!(
            agent.devalue_last_action(-9.0),
            Err(Error::ProtocolViolation {
                operation: "devalue_last_action",
                ..
            })
        ));
    }

    #[test]
    fn devalue_re_evaluates_the_retained_transition_from_idle() {
        let store = SharedStateStore::default();
        let mut agent = StateAgent::new(store.clone(), Seat::P1);

        agent
            .set_state(&position("start", &["0-0to0-1"]))
            .expect("set_state");
        let chosen = agent.choose_action().expect("choose");
        agent
            .perform_state_action(&chosen, &position("end", &[]))
            .expect("perform");
        agent.evaluate_last_action(0.0).expect("evaluate");
        assert_eq!(agent.phase(), TurnPhase::Idle);

        let devalued = agent.devalue_last_action(-9.0).expect("devalue");
        assert_eq!(devalued.value, -9.0, "terminal successor bootstraps zero");
        assert_eq!(agent.evaluated_actions(), 2);
        assert_eq!(agent.phase(), TurnPhase::Idle);
    }

    #[test]
    fn reassigning_a_state_before_choosing_is_allowed() {
        let mut agent = agent();
        agent
            .set_state(&position("a", &["0-0to0-1"]))
            .expect("set_state");
        agent
            .set_state(&position("b", &["1-0to1-1"]))
            .expect("re-assign");

        assert_eq!(agent.current_state().map(StateKey::as_str), Some("b"));
    }

    #[test]
    fn begin_game_clears_protocol_state_but_keeps_counters() {
        let mut agent = agent();
        agent
            .set_state(&position("start", &["0-0to0-1"]))
            .expect("set_state");
        let chosen = agent.choose_action().expect("choose");
        agent
            .perform_state_action(&chosen, &position("end", &[]))
            .expect("perform");
        agent.evaluate_last_action(1.0).expect("evaluate");

        agent.begin_game();
        assert_eq!(agent.phase(), TurnPhase::Idle);
        assert_eq!(agent.current_state(), None);
        assert_eq!(agent.last_transition(), None);
        assert_eq!(agent.learned_states(), 2);
        assert_eq!(agent.evaluated_actions(), 1);
    }

    #[test]
    fn learned_state_credit_goes_to_the_first_registrant() {
        let store = SharedStateStore::default();
        let mut first = StateAgent::new(store.clone(), Seat::P1);
        let mut second = StateAgent::new(store.clone(), Seat::P2);

        let pos = position("shared", &["0-0to0-1"]);
        first.set_state(&pos).expect("set_state");
        second.set_state(&pos).expect("set_state");

        assert_eq!(first.learned_states(), 1);
        assert_eq!(second.learned_states(), 0);
        assert_eq!(store.borrow().len(), 1);
        assert_eq!(
            store.borrow().state("shared").expect("registered").visits(),
            2
        );
    }

    #[test]
    fn configured_penalty_flows_through_the_shared_store() {
        let config = ValueConfig::default().with_illegal_penalty(-77.0);
        let store = SharedStateStore::new(StateStore::with_config(config));
        let mut agent = StateAgent::new(store.clone(), Seat::P1);

        agent
            .set_state(&position("start", &["0-0to0-1"]))
            .expect("set_state");
        let _ = agent.choose_action().expect("choose");
        let penalty = store.borrow().config().illegal_penalty;
        let evaluated = agent.punish_chosen_action(penalty).expect("punish");

        assert_eq!(evaluated.value, -77.0);
    }
}
