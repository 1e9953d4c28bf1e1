//! Self-play runner for training value tables over many games

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    agent::StateAgent,
    error::Error,
    ports::MatchObserver,
    session::{MatchConfig, MatchOutcome, MatchReport, MatchSession, SeatController},
    skirmish::Board,
    store::SharedStateStore,
    types::Seat,
};

/// Who sits across the table for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    /// A second learning agent sharing the same value table.
    Learned,
    /// A seeded uniform-random baseline that never touches the table.
    Random,
}

impl Opponent {
    pub fn label(&self) -> &'static str {
        match self {
            Opponent::Learned => "learned",
            Opponent::Random => "random",
        }
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Opponent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learned" | "self" => Ok(Opponent::Learned),
            "random" => Ok(Opponent::Random),
            _ => Err(Error::ParseOpponent {
                input: s.to_string(),
                expected: "learned, random".to_string(),
            }),
        }
    }
}

/// Configuration for a self-play run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of games to play.
    pub games: usize,
    /// Seed for the random baseline. Ignored against a learned opponent.
    pub seed: u64,
    /// Board edge length for the bundled skirmish game.
    pub board_size: usize,
    /// Per-game session settings.
    pub match_config: MatchConfig,
    /// Who plays the second seat.
    pub opponent: Opponent,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            games: 500,
            seed: 0,
            board_size: Board::DEFAULT_SIZE,
            match_config: MatchConfig::default(),
            opponent: Opponent::Learned,
        }
    }
}

/// Final protocol counters of one learning agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCounters {
    pub learned_states: u64,
    pub evaluated_actions: u64,
}

impl AgentCounters {
    fn of(agent: &StateAgent) -> Self {
        Self {
            learned_states: agent.learned_states(),
            evaluated_actions: agent.evaluated_actions(),
        }
    }
}

/// Aggregate result of a self-play run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfPlayResult {
    /// Games actually played.
    pub games: usize,
    pub p1_wins: usize,
    pub p2_wins: usize,
    /// Games ending at the turn limit with no winner.
    pub undecided: usize,
    /// Endings by kind.
    pub no_moves_endings: usize,
    pub exposure_endings: usize,
    pub monarch_endings: usize,
    pub forfeit_endings: usize,
    pub total_turns: usize,
    pub total_captures: usize,
    /// Final counters of the first seat's agent.
    pub p1_counters: Option<AgentCounters>,
    /// Final counters of the second seat's agent; absent for the random
    /// baseline.
    pub p2_counters: Option<AgentCounters>,
}

impl SelfPlayResult {
    fn record(&mut self, report: &MatchReport) {
        self.games += 1;
        self.total_turns += report.turns;
        self.total_captures += report.captures.len();

        match report.outcome.winner() {
            Some(Seat::P1) => self.p1_wins += 1,
            Some(Seat::P2) => self.p2_wins += 1,
            None => self.undecided += 1,
        }
        match report.outcome {
            MatchOutcome::NoMoves { .. } => self.no_moves_endings += 1,
            MatchOutcome::ExposedKing { .. } => self.exposure_endings += 1,
            MatchOutcome::MonarchCaptured { .. } => self.monarch_endings += 1,
            MatchOutcome::Forfeit { .. } => self.forfeit_endings += 1,
            MatchOutcome::TurnLimit => {}
        }
    }

    pub fn p1_win_rate(&self) -> f64 {
        self.rate(self.p1_wins)
    }

    pub fn p2_win_rate(&self) -> f64 {
        self.rate(self.p2_wins)
    }

    pub fn avg_turns(&self) -> f64 {
        self.rate(self.total_turns)
    }

    fn rate(&self, count: usize) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            count as f64 / self.games as f64
        }
    }

    /// Save the result to a JSON file.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Plays games back to back on one shared store.
///
/// Every game starts from a fresh board; the controllers persist, so the
/// table keeps accumulating states and the agents keep their counters. The
/// observers receive the full event sequence documented on
/// [`MatchObserver`].
pub struct SelfPlayRunner {
    store: SharedStateStore,
    config: RunConfig,
    observers: Vec<Box<dyn MatchObserver>>,
}

impl SelfPlayRunner {
    pub fn new(store: SharedStateStore, config: RunConfig) -> Self {
        Self {
            store,
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the run.
    pub fn with_observer(mut self, observer: Box<dyn MatchObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Play the configured number of games and aggregate the outcomes.
    pub fn run(&mut self) -> Result<SelfPlayResult> {
        let mut p1 = SeatController::learning(StateAgent::new(self.store.clone(), Seat::P1));
        let mut p2 = match self.config.opponent {
            Opponent::Learned => {
                SeatController::learning(StateAgent::new(self.store.clone(), Seat::P2))
            }
            Opponent::Random => SeatController::random(self.config.seed),
        };

        for observer in &mut self.observers {
            observer.on_run_start(self.config.games)?;
        }

        let mut result = SelfPlayResult::default();
        for game_num in 0..self.config.games {
            let mut board = Board::starting(self.config.board_size)?;
            let mut session = MatchSession::new(&mut board, self.config.match_config);
            let report = session.play_observed(&mut p1, &mut p2, game_num, &mut self.observers)?;
            result.record(&report);
        }

        for observer in &mut self.observers {
            observer.on_run_end()?;
        }

        result.p1_counters = p1.agent().map(AgentCounters::of);
        result.p2_counters = p2.agent().map(AgentCounters::of);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_opponent_labels() {
        assert_eq!("learned".parse::<Opponent>().unwrap(), Opponent::Learned);
        assert_eq!("self".parse::<Opponent>().unwrap(), Opponent::Learned);
        assert_eq!(" Random ".parse::<Opponent>().unwrap(), Opponent::Random);
        assert!(matches!(
            "minimax".parse::<Opponent>(),
            Err(Error::ParseOpponent { .. })
        ));
    }

    #[test]
    fn self_play_run_accounts_for_every_game() {
        let store = SharedStateStore::default();
        let config = RunConfig {
            games: 8,
            match_config: MatchConfig::default().with_max_turns(20),
            ..RunConfig::default()
        };

        let result = SelfPlayRunner::new(store.clone(), config)
            .run()
            .expect("run must complete");

        assert_eq!(result.games, 8);
        assert_eq!(
            result.p1_wins + result.p2_wins + result.undecided,
            result.games
        );
        assert_eq!(
            result.no_moves_endings
                + result.exposure_endings
                + result.monarch_endings
                + result.forfeit_endings
                + result.undecided,
            result.games
        );
        assert!(result.total_turns > 0);

        // Two learning controllers: everything in the store was credited to
        // one of them.
        let p1 = result.p1_counters.expect("p1 learns");
        let p2 = result.p2_counters.expect("p2 learns");
        assert_eq!(store.borrow().len() as u64, p1.learned_states + p2.learned_states);
    }

    #[test]
    fn random_baseline_run_keeps_the_second_seat_out_of_the_table() {
        let store = SharedStateStore::default();
        let config = RunConfig {
            games: 4,
            seed: 11,
            opponent: Opponent::Random,
            match_config: MatchConfig::default().with_max_turns(16),
            ..RunConfig::default()
        };

        let result = SelfPlayRunner::new(store.clone(), config)
            .run()
            .expect("run must complete");

        assert_eq!(result.games, 4);
        assert!(result.p2_counters.is_none());
        let p1 = result.p1_counters.expect("p1 learns");
        assert_eq!(store.borrow().len() as u64, p1.learned_states);
    }

    #[test]
    fn rejects_boards_below_the_minimum_size() {
        let store = SharedStateStore::default();
        let config = RunConfig {
            games: 1,
            board_size: 2,
            ..RunConfig::default()
        };

        assert!(matches!(
            SelfPlayRunner::new(store, config).run(),
            Err(Error::BoardTooSmall { .. })
        ));
    }
}
