//! Newtype wrappers and core value types for the decision/learning domain.

use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the two seats at the board.
///
/// A seat identifies a player for ownership and reward purposes; it carries
/// no game-specific meaning beyond "first" and "second".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    P1,
    P2,
}

impl Seat {
    /// Get the opposing seat.
    pub fn opponent(self) -> Seat {
        match self {
            Seat::P1 => Seat::P2,
            Seat::P2 => Seat::P1,
        }
    }

    /// Stable index (0 or 1), used when encoding ownership into state strings.
    pub fn index(self) -> usize {
        match self {
            Seat::P1 => 0,
            Seat::P2 => 1,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::P1 => f.write_str("P1"),
            Seat::P2 => f.write_str("P2"),
        }
    }
}

/// A cell on the playing grid, addressed column-first.
///
/// Squares render as `<col>-<row>`, the coordinate form used inside action
/// descriptors. Bounds checking happens where a concrete board size is
/// known; the type itself is open to any grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub col: usize,
    pub row: usize,
}

impl Square {
    pub fn new(col: usize, row: usize) -> Self {
        Square { col, row }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.col, self.row)
    }
}

/// A transition descriptor in the fixed wire form
/// `<fromCol>-<fromRow>to<toCol>-<toRow>` (e.g. `0-1to0-2`).
///
/// Descriptors are the only identity an action has: two descriptors are the
/// same action within a state exactly when their strings are equal.
///
/// # Examples
///
/// ```
/// use boardmind::types::{ActionDescriptor, Square};
///
/// let action = ActionDescriptor::new(Square::new(0, 1), Square::new(0, 2));
/// assert_eq!(action.to_string(), "0-1to0-2");
/// assert_eq!("0-1to0-2".parse::<ActionDescriptor>().unwrap(), action);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub from: Square,
    pub to: Square,
}

impl ActionDescriptor {
    pub fn new(from: Square, to: Square) -> Self {
        ActionDescriptor { from, to }
    }

    fn parse_square(part: &str, input: &str) -> Result<Square, crate::Error> {
        let (col, row) = part
            .split_once('-')
            .ok_or_else(|| crate::Error::InvalidDescriptor {
                input: input.to_string(),
                reason: format!("expected '<col>-<row>', got '{part}'"),
            })?;
        let col: usize = col.parse().map_err(|_| crate::Error::InvalidDescriptor {
            input: input.to_string(),
            reason: format!("invalid column '{col}'"),
        })?;
        let row: usize = row.parse().map_err(|_| crate::Error::InvalidDescriptor {
            input: input.to_string(),
            reason: format!("invalid row '{row}'"),
        })?;
        Ok(Square::new(col, row))
    }
}

impl fmt::Display for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}to{}", self.from, self.to)
    }
}

impl FromStr for ActionDescriptor {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once("to")
            .ok_or_else(|| crate::Error::InvalidDescriptor {
                input: s.to_string(),
                reason: "missing 'to' separator".to_string(),
            })?;
        Ok(ActionDescriptor {
            from: Self::parse_square(from, s)?,
            to: Self::parse_square(to, s)?,
        })
    }
}

/// A canonical board-state key.
///
/// Keys are opaque, deterministic strings built by the canonicalizer; equal
/// content always yields equal keys regardless of piece enumeration order.
/// Identity (equality/hash) is defined on the full string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey(String);

impl StateKey {
    /// Create a new state key.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the key into its inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for StateKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Sentinel constants for value initialization and rule-violation penalties.
pub mod sentinel {
    /// Value assigned to a never-evaluated action. Large enough that any
    /// untried action outranks every evaluated one until evidence arrives.
    pub const OPTIMISTIC_INIT: f64 = 100_000.0;

    /// Value assigned to an action rejected for exposing the mover's own
    /// monarch. Must dominate any feasible legitimate reward so the edge is
    /// never preferred again.
    pub const EXPOSURE_PENALTY: f64 = -10_000.0;
}

/// Tunable constants of the value table and update rule.
///
/// * `initial_value`: optimistic sentinel given to fresh actions; drives
///   exploration of unseen edges first.
/// * `illegal_penalty`: fixed value written to an edge rejected by the
///   exposure rule; must dominate any reachable reward.
/// * `learning_rate`: step size of the TD update. `1.0` replaces the stored
///   value with the target outright; smaller rates blend toward it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueConfig {
    pub initial_value: f64,
    pub illegal_penalty: f64,
    pub learning_rate: f64,
}

impl ValueConfig {
    /// Create a config with the given initial value and the default penalty
    /// and learning rate.
    pub fn new(initial_value: f64) -> Self {
        Self {
            initial_value,
            ..Self::default()
        }
    }

    /// Set the penalty written to exposure-rejected actions.
    pub fn with_illegal_penalty(mut self, penalty: f64) -> Self {
        self.illegal_penalty = penalty;
        self
    }

    /// Set the TD update step size.
    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = rate;
        self
    }
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            initial_value: sentinel::OPTIMISTIC_INIT,
            illegal_penalty: sentinel::EXPOSURE_PENALTY,
            learning_rate: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_renders_wire_format() {
        let action = ActionDescriptor::new(Square::new(3, 0), Square::new(3, 4));
        assert_eq!(action.to_string(), "3-0to3-4");
    }

    #[test]
    fn descriptor_parses_multi_digit_coordinates() {
        let action: ActionDescriptor = "10-2to10-12".parse().unwrap();
        assert_eq!(action.from, Square::new(10, 2));
        assert_eq!(action.to, Square::new(10, 12));
    }

    #[test]
    fn descriptor_round_trips_through_display() {
        let original = ActionDescriptor::new(Square::new(0, 5), Square::new(4, 5));
        let parsed: ActionDescriptor = original.to_string().parse().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn descriptor_rejects_missing_separator() {
        let err = "1-2_3-4".parse::<ActionDescriptor>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn descriptor_rejects_negative_coordinates() {
        assert!("-1-2to3-4".parse::<ActionDescriptor>().is_err());
        assert!("1-2to3--4".parse::<ActionDescriptor>().is_err());
    }

    #[test]
    fn descriptor_rejects_non_numeric_parts() {
        let err = "a-2to3-4".parse::<ActionDescriptor>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn state_key_equality_is_content_based() {
        let a = StateKey::new("M0:1-1;S1:2-2;");
        let b = StateKey::from("M0:1-1;S1:2-2;".to_string());
        assert_eq!(a, b);
        assert_eq!(a, StateKey::from("M0:1-1;S1:2-2;"));
    }

    #[test]
    fn value_config_builder_overrides_defaults() {
        let config = ValueConfig::new(500.0)
            .with_illegal_penalty(-50.0)
            .with_learning_rate(0.5);
        assert_eq!(config.initial_value, 500.0);
        assert_eq!(config.illegal_penalty, -50.0);
        assert_eq!(config.learning_rate, 0.5);
    }

    #[test]
    fn value_config_defaults_match_sentinels() {
        let config = ValueConfig::default();
        assert_eq!(config.initial_value, sentinel::OPTIMISTIC_INIT);
        assert_eq!(config.illegal_penalty, sentinel::EXPOSURE_PENALTY);
        assert_eq!(config.learning_rate, 1.0);
    }

    #[test]
    fn seat_opponent_round_trips() {
        assert_eq!(Seat::P1.opponent(), Seat::P2);
        assert_eq!(Seat::P2.opponent().opponent(), Seat::P2);
        assert_eq!(Seat::P1.index(), 0);
        assert_eq!(Seat::P2.index(), 1);
    }
}
