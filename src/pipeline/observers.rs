//! Composable observers for self-play runs
//!
//! Observers collect data during a run without coupling the runner to any
//! output format: a progress bar for the terminal, aggregate metrics, or a
//! JSONL stream of per-turn records for offline analysis.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    ports::MatchObserver,
    session::{MatchOutcome, TurnRecord},
    types::Seat,
};

/// Progress bar observer showing games played and the running score.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    p1_wins: usize,
    p2_wins: usize,
    undecided: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            p1_wins: 0,
            p2_wins: 0,
            undecided: 0,
        }
    }

    fn score(&self) -> String {
        format!(
            "{} P2:{} -:{}",
            self.p1_wins, self.p2_wins, self.undecided
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchObserver for ProgressObserver {
    fn on_run_start(&mut self, total_games: usize) -> Result<()> {
        let pb = ProgressBar::new(total_games as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games (P1:{msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: &MatchOutcome) -> Result<()> {
        match outcome.winner() {
            Some(Seat::P1) => self.p1_wins += 1,
            Some(Seat::P2) => self.p2_wins += 1,
            None => self.undecided += 1,
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(game_num as u64 + 1);
            pb.set_message(self.score());
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.score());
        }
        Ok(())
    }
}

/// Aggregate metrics over a run.
pub struct MetricsObserver {
    p1_wins: usize,
    p2_wins: usize,
    undecided: usize,
    total_games: usize,
    turn_counts: Vec<usize>,
    drift_turns: usize,
    captures: usize,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            p1_wins: 0,
            p2_wins: 0,
            undecided: 0,
            total_games: 0,
            turn_counts: Vec::new(),
            drift_turns: 0,
            captures: 0,
        }
    }

    pub fn p1_win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.p1_wins as f64 / self.total_games as f64
        }
    }

    pub fn p2_win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.p2_wins as f64 / self.total_games as f64
        }
    }

    /// Average number of plies per game.
    pub fn avg_game_length(&self) -> f64 {
        if self.turn_counts.is_empty() {
            0.0
        } else {
            self.turn_counts.iter().sum::<usize>() as f64 / self.turn_counts.len() as f64
        }
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_games: self.total_games,
            p1_wins: self.p1_wins,
            p2_wins: self.p2_wins,
            undecided: self.undecided,
            p1_win_rate: self.p1_win_rate(),
            p2_win_rate: self.p2_win_rate(),
            avg_game_length: self.avg_game_length(),
            drift_turns: self.drift_turns,
            captures: self.captures,
        }
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of run metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_games: usize,
    pub p1_wins: usize,
    pub p2_wins: usize,
    pub undecided: usize,
    pub p1_win_rate: f64,
    pub p2_win_rate: f64,
    pub avg_game_length: f64,
    /// Turns whose chosen action's deep evaluation disagreed with its
    /// stored value at selection time.
    pub drift_turns: usize,
    pub captures: usize,
}

impl MatchObserver for MetricsObserver {
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        self.turn_counts.push(0);
        Ok(())
    }

    fn on_turn(&mut self, _game_num: usize, record: &TurnRecord) -> Result<()> {
        if let Some(last) = self.turn_counts.last_mut() {
            *last += 1;
        }
        if record.captured.is_some() {
            self.captures += 1;
        }
        if record.decision.as_ref().is_some_and(|d| d.drift) {
            self.drift_turns += 1;
        }
        Ok(())
    }

    fn on_game_end(&mut self, _game_num: usize, outcome: &MatchOutcome) -> Result<()> {
        self.total_games += 1;
        match outcome.winner() {
            Some(Seat::P1) => self.p1_wins += 1,
            Some(Seat::P2) => self.p2_wins += 1,
            None => self.undecided += 1,
        }
        Ok(())
    }
}

/// One exported line per completed turn.
#[derive(Debug, Serialize)]
struct TurnLine<'a> {
    game_num: usize,
    #[serde(flatten)]
    record: &'a TurnRecord,
}

/// One exported line per finished game.
#[derive(Debug, Serialize)]
struct OutcomeLine<'a> {
    game_num: usize,
    outcome: &'a MatchOutcome,
    turns: usize,
}

/// JSONL observer streaming turn records to a file.
///
/// Every completed turn becomes one JSON line carrying the chosen
/// descriptor, the reward, and for learning movers the decision details
/// (stored value, deep evaluation, drift flag, both counters). Each game
/// closes with an outcome line.
pub struct JsonlObserver {
    writer: BufWriter<File>,
    turns_this_game: usize,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| Error::Io {
            operation: format!("create observations file {:?}", path.as_ref()),
            source: e,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            turns_this_game: 0,
        })
    }
}

impl MatchObserver for JsonlObserver {
    fn on_game_start(&mut self, _game_num: usize) -> Result<()> {
        self.turns_this_game = 0;
        Ok(())
    }

    fn on_turn(&mut self, game_num: usize, record: &TurnRecord) -> Result<()> {
        self.turns_this_game += 1;
        serde_json::to_writer(&mut self.writer, &TurnLine { game_num, record })?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_game_end(&mut self, game_num: usize, outcome: &MatchOutcome) -> Result<()> {
        let line = OutcomeLine {
            game_num,
            outcome,
            turns: self.turns_this_game,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        session::DecisionRecord,
        types::{ActionDescriptor, StateKey},
    };

    fn turn_record(drift: bool, captured: Option<char>) -> TurnRecord {
        TurnRecord {
            turn: 0,
            seat: Seat::P1,
            action: "0-1to0-2".parse::<ActionDescriptor>().unwrap(),
            reward: 0.0,
            captured,
            opponent_devalued: false,
            decision: Some(DecisionRecord {
                state: StateKey::new("M0:0-0;"),
                visits: 1,
                value: 100_000.0,
                deep_value: if drift { Some(99.0) } else { None },
                drift,
                updated_value: 100_000.0,
                learned_states: 1,
                evaluated_actions: 0,
            }),
        }
    }

    #[test]
    fn metrics_observer_aggregates_outcomes_and_lengths() {
        let mut observer = MetricsObserver::new();

        observer.on_game_start(0).unwrap();
        observer.on_turn(0, &turn_record(false, None)).unwrap();
        observer.on_turn(0, &turn_record(true, Some('S'))).unwrap();
        observer
            .on_game_end(0, &MatchOutcome::MonarchCaptured { winner: Seat::P1 })
            .unwrap();

        observer.on_game_start(1).unwrap();
        observer.on_turn(1, &turn_record(false, None)).unwrap();
        observer.on_game_end(1, &MatchOutcome::TurnLimit).unwrap();

        let summary = observer.summary();
        assert_eq!(summary.total_games, 2);
        assert_eq!(summary.p1_wins, 1);
        assert_eq!(summary.p2_wins, 0);
        assert_eq!(summary.undecided, 1);
        assert_eq!(summary.avg_game_length, 1.5);
        assert_eq!(summary.drift_turns, 1);
        assert_eq!(summary.captures, 1);
        assert!((summary.p1_win_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn jsonl_observer_writes_one_line_per_event() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("observations.jsonl");

        let mut observer = JsonlObserver::new(&path).unwrap();
        observer.on_game_start(0).unwrap();
        observer.on_turn(0, &turn_record(true, Some('R'))).unwrap();
        observer
            .on_game_end(0, &MatchOutcome::NoMoves { loser: Seat::P2 })
            .unwrap();
        drop(observer);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let turn: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(turn["game_num"], 0);
        assert_eq!(turn["captured"], "R");
        assert_eq!(turn["decision"]["drift"], true);

        let outcome: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(outcome["turns"], 1);
        assert!(outcome["outcome"].get("NoMoves").is_some());
    }
}
