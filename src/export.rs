//! CSV export of learned value tables

use std::path::Path;

use serde::Serialize;

use crate::{Result, state::State, store::StateStore};

/// One CSV row per learned action edge.
#[derive(Debug, Clone, Serialize)]
pub struct ValueTableRow {
    pub state: String,
    pub action: String,
    pub value: f64,
    pub deep_value: Option<f64>,
    pub last_reward: Option<f64>,
    pub successor: Option<String>,
    pub visits: u64,
}

/// Write every edge of the value table to a CSV file, states sorted by key
/// and actions kept in registration order.
///
/// Returns the number of rows written (the header is not counted).
pub fn write_value_table<P: AsRef<Path>>(store: &StateStore, path: P) -> Result<usize> {
    let mut states: Vec<&State> = store.states().collect();
    states.sort_by(|a, b| a.key().cmp(b.key()));

    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;
    for state in states {
        for action in state.actions() {
            writer.serialize(ValueTableRow {
                state: state.key().to_string(),
                action: action.descriptor().to_string(),
                value: action.value(),
                deep_value: action.deep_value(),
                last_reward: action.last_reward(),
                successor: action.successor().map(|key| key.to_string()),
                visits: state.visits(),
            })?;
            rows += 1;
        }
    }
    writer.flush()?;

    Ok(rows)
}
