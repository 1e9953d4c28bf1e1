//! Memoizing state repository and the value updates applied through it.
//!
//! The store is the single home of value mutation: registration, the
//! temporal-difference update, the exposure penalty, and the diagnostic
//! deep evaluation all live here so that agents never touch action values
//! directly.

use std::{
    cell::{Ref, RefCell, RefMut},
    collections::HashMap,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    canonical::CanonicalPosition,
    error::Error,
    state::{State, StateAction},
    types::{StateKey, ValueConfig},
};

/// Report of a single `get_or_create` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    /// Whether this call registered the state for the first time.
    pub created: bool,
    /// Visit count after this call (the first visit counts).
    pub visits: u64,
}

/// Result of a value update on one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluated {
    /// The stored value after the update.
    pub value: f64,
    /// The diagnostic deep evaluation at update time.
    pub deep_value: f64,
}

/// Process-lifetime memoization table mapping canonical keys to states.
///
/// Exactly one [`State`] exists per key: repeated registrations return the
/// original record, bump its visit counter and never reset learned values.
/// Nothing is ever evicted.
///
/// The update rule is the replacement-form TD target
///
/// `value ← value + α (reward + best(successor) − value)`
///
/// with `α = learning_rate` (default `1.0`, full replacement) and
/// `best(successor) = 0.0` for terminal successors. The same rule serves
/// reward evaluation and opponent devaluation; the exposure penalty assigns
/// the configured value outright since a rejected move reaches no successor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateStore {
    states: HashMap<StateKey, State>,
    config: ValueConfig,
}

impl StateStore {
    /// Create an empty store with default value constants.
    pub fn new() -> Self {
        Self::with_config(ValueConfig::default())
    }

    /// Create an empty store with the given value constants.
    pub fn with_config(config: ValueConfig) -> Self {
        Self {
            states: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &ValueConfig {
        &self.config
    }

    /// Fetch the state registered for `position.key`, creating it on first
    /// sight. Creation materializes one action per descriptor, each at the
    /// optimistic initial value; on a hit the position's action list is
    /// ignored and the registered list stands. Every call counts as a visit.
    pub fn get_or_create(&mut self, position: &CanonicalPosition) -> Acquired {
        let created = !self.states.contains_key(position.key.as_str());
        let state = self.states.entry(position.key.clone()).or_insert_with(|| {
            State::new(
                position.key.clone(),
                &position.actions,
                self.config.initial_value,
            )
        });
        state.record_visit();

        Acquired {
            created,
            visits: state.visits(),
        }
    }

    /// Look up a state without touching its visit counter.
    pub fn state(&self, key: &str) -> Option<&State> {
        self.states.get(key)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate all registered states in unspecified order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// Bootstrap term for a successor state: its best action value, or
    /// `0.0` when it is terminal.
    pub fn best_value(&self, key: &str) -> Result<f64> {
        let state = self.states.get(key).ok_or_else(|| Error::UnknownState {
            state: key.to_string(),
        })?;

        Ok(state.best_value())
    }

    /// Record which state an executed edge led to. No value changes.
    pub fn record_transition(
        &mut self,
        from: &StateKey,
        index: usize,
        successor: &StateKey,
    ) -> Result<()> {
        let action = self.action_mut(from, index)?;
        action.set_successor(successor.clone());
        Ok(())
    }

    /// Apply the TD update to the edge `(from, index)` for an observed
    /// `reward`, bootstrapping from the successor's best current value.
    /// Also refreshes the edge's deep evaluation.
    pub fn evaluate(
        &mut self,
        from: &StateKey,
        index: usize,
        reward: f64,
        successor: &StateKey,
    ) -> Result<Evaluated> {
        let best_next = self.best_value(successor.as_str())?;
        let learning_rate = self.config.learning_rate;

        let action = self.action_mut(from, index)?;
        let current = action.value();
        let target = reward + best_next;
        let updated = current + learning_rate * (target - current);

        action.set_value(updated);
        action.set_last_reward(reward);
        action.set_successor(successor.clone());
        action.set_deep_value(Some(target));

        Ok(Evaluated {
            value: updated,
            deep_value: target,
        })
    }

    /// Overwrite an edge's value with a rule-rejection penalty. The edge
    /// reached no successor, so no bootstrap term applies and the stored
    /// value becomes exactly `penalty`.
    pub fn penalize(&mut self, state: &StateKey, index: usize, penalty: f64) -> Result<Evaluated> {
        let action = self.action_mut(state, index)?;
        action.set_value(penalty);
        action.set_last_reward(penalty);
        action.set_deep_value(Some(penalty));

        Ok(Evaluated {
            value: penalty,
            deep_value: penalty,
        })
    }

    /// Recompute an edge's deep evaluation against the current table:
    /// `last observed reward + best(recorded successor)`. Returns `None`
    /// for edges that were never evaluated. The refreshed figure is stored
    /// on the edge for export and drift reporting.
    pub fn deep_evaluation(&mut self, state: &StateKey, index: usize) -> Result<Option<f64>> {
        let (last_reward, successor) = {
            let action = self.action_ref(state, index)?;
            (action.last_reward(), action.successor().cloned())
        };

        let Some(reward) = last_reward else {
            return Ok(None);
        };

        let bootstrap = match &successor {
            Some(key) => self.best_value(key.as_str())?,
            None => 0.0,
        };
        let deep = reward + bootstrap;

        if let Some(action) = self
            .states
            .get_mut(state.as_str())
            .and_then(|s| s.action_mut(index))
        {
            action.set_deep_value(Some(deep));
        }

        Ok(Some(deep))
    }

    fn action_ref(&self, state: &StateKey, index: usize) -> Result<&StateAction> {
        let record = self
            .states
            .get(state.as_str())
            .ok_or_else(|| Error::UnknownState {
                state: state.to_string(),
            })?;
        let len = record.actions().len();

        record
            .action(index)
            .ok_or_else(|| Error::ActionIndexOutOfRange {
                state: state.to_string(),
                index,
                len,
            })
    }

    fn action_mut(&mut self, state: &StateKey, index: usize) -> Result<&mut StateAction> {
        let record = self
            .states
            .get_mut(state.as_str())
            .ok_or_else(|| Error::UnknownState {
                state: state.to_string(),
            })?;
        let len = record.actions().len();

        record
            .action_mut(index)
            .ok_or_else(|| Error::ActionIndexOutOfRange {
                state: state.to_string(),
                index,
                len,
            })
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to one store used by both seats' agents.
///
/// Turn-by-turn play is single threaded, so interior mutability through
/// `Rc<RefCell<_>>` is sufficient; borrow scopes inside agent operations are
/// short and never overlap.
#[derive(Debug, Clone)]
pub struct SharedStateStore {
    inner: Rc<RefCell<StateStore>>,
}

impl SharedStateStore {
    pub fn new(store: StateStore) -> Self {
        Self {
            inner: Rc::new(RefCell::new(store)),
        }
    }

    pub fn borrow(&self) -> Ref<'_, StateStore> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, StateStore> {
        self.inner.borrow_mut()
    }

    /// Take the store back out of the handle, cloning if other handles are
    /// still alive.
    pub fn into_inner(self) -> StateStore {
        match Rc::try_unwrap(self.inner) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().clone(),
        }
    }
}

impl Default for SharedStateStore {
    fn default() -> Self {
        Self::new(StateStore::new())
    }
}
