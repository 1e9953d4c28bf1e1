//! Observer port - abstraction for match observation and data collection
//!
//! This port defines the interface for observing self-play events, allowing
//! composable data collection without coupling the session and pipeline
//! logic to specific output formats or metrics.

use crate::{
    Result,
    session::{MatchOutcome, TurnRecord},
};

/// Observer trait for monitoring self-play runs.
///
/// Observers can be composed to collect different kinds of data during a
/// run: progress bars for user feedback, JSONL export for analysis, or
/// aggregate metrics for evaluation.
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_run_start(total_games)` - Once at the beginning
/// 2. For each game:
///    - `on_game_start(game_num)`
///    - `on_turn(game_num, record)` - After every completed turn
///    - `on_game_end(game_num, outcome)`
/// 3. `on_run_end()` - Once at the end
///
/// # Examples
///
/// ```
/// use boardmind::ports::MatchObserver;
/// use boardmind::session::MatchOutcome;
///
/// struct GameCounter {
///     games: usize,
/// }
///
/// impl MatchObserver for GameCounter {
///     fn on_game_end(
///         &mut self,
///         _game_num: usize,
///         _outcome: &MatchOutcome,
///     ) -> boardmind::Result<()> {
///         self.games += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait MatchObserver: Send {
    /// Called once before the first game of a run.
    fn on_run_start(&mut self, _total_games: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a game starts. `game_num` is 0-based.
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every completed turn with the full turn record,
    /// including the chosen action's value, its deep evaluation and the
    /// drift flag.
    fn on_turn(&mut self, _game_num: usize, _record: &TurnRecord) -> Result<()> {
        Ok(())
    }

    /// Called when a game reaches its outcome.
    fn on_game_end(&mut self, _game_num: usize, _outcome: &MatchOutcome) -> Result<()> {
        Ok(())
    }

    /// Called once after the last game. Use this to finalize outputs,
    /// flush files, or display summaries.
    fn on_run_end(&mut self) -> Result<()> {
        Ok(())
    }
}
