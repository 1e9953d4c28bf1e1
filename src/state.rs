//! State and action records held by the repository.

use serde::{Deserialize, Serialize};

use crate::types::{ActionDescriptor, StateKey};

/// One legal transition out of a state, together with everything learned
/// about it so far.
///
/// The scalar `value` is the policy's estimate of the edge's quality. It
/// starts at the optimistic sentinel and is only ever moved by the store's
/// update operations. `deep_value` is a diagnostic recomputed from the last
/// observed reward and the current best value of the recorded successor;
/// when it drifts away from `value` the stored estimate is stale. It never
/// drives selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAction {
    descriptor: ActionDescriptor,
    value: f64,
    deep_value: Option<f64>,
    successor: Option<StateKey>,
    last_reward: Option<f64>,
}

impl StateAction {
    pub(crate) fn new(descriptor: ActionDescriptor, value: f64) -> Self {
        Self {
            descriptor,
            value,
            deep_value: None,
            successor: None,
            last_reward: None,
        }
    }

    pub fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn deep_value(&self) -> Option<f64> {
        self.deep_value
    }

    /// Key of the state this edge was last observed to lead to.
    pub fn successor(&self) -> Option<&StateKey> {
        self.successor.as_ref()
    }

    /// Reward observed the last time this edge was evaluated.
    pub fn last_reward(&self) -> Option<f64> {
        self.last_reward
    }

    pub(crate) fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub(crate) fn set_deep_value(&mut self, deep_value: Option<f64>) {
        self.deep_value = deep_value;
    }

    pub(crate) fn set_successor(&mut self, successor: StateKey) {
        self.successor = Some(successor);
    }

    pub(crate) fn set_last_reward(&mut self, reward: f64) {
        self.last_reward = Some(reward);
    }
}

/// A node in the repository: a canonical key, the transitions first
/// registered for it, and a visit counter.
///
/// The action list is fixed at registration and keeps its first-seen order;
/// an empty list marks a terminal position. All mutation goes through the
/// owning [`StateStore`](crate::store::StateStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    key: StateKey,
    actions: Vec<StateAction>,
    visits: u64,
}

impl State {
    pub(crate) fn new(key: StateKey, descriptors: &[ActionDescriptor], initial_value: f64) -> Self {
        let actions = descriptors
            .iter()
            .map(|d| StateAction::new(d.clone(), initial_value))
            .collect();

        Self {
            key,
            actions,
            visits: 0,
        }
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn actions(&self) -> &[StateAction] {
        &self.actions
    }

    pub fn action(&self, index: usize) -> Option<&StateAction> {
        self.actions.get(index)
    }

    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Terminal means the side to move had no transitions when this state
    /// was registered.
    pub fn is_terminal(&self) -> bool {
        self.actions.is_empty()
    }

    /// Best learned value among this state's actions, or `0.0` for a
    /// terminal state. This is the bootstrap term of the update rule; a
    /// negative best is reported as-is, only the empty case maps to zero.
    pub fn best_value(&self) -> f64 {
        if self.actions.is_empty() {
            return 0.0;
        }

        self.actions
            .iter()
            .map(StateAction::value)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub(crate) fn record_visit(&mut self) {
        self.visits += 1;
    }

    pub(crate) fn action_mut(&mut self, index: usize) -> Option<&mut StateAction> {
        self.actions.get_mut(index)
    }
}
