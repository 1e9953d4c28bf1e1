//! Train command - self-play training on the bundled skirmish game

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    adapters::MsgPackSnapshots,
    cli::output::{format_number, print_kv, print_section},
    pipeline::{JsonlObserver, Opponent, ProgressObserver, RunConfig, SelfPlayRunner},
    ports::SnapshotRepository,
    session::MatchConfig,
    skirmish::Board,
    store::{SharedStateStore, StateStore},
    types::{ValueConfig, sentinel},
};

#[derive(Parser, Debug)]
#[command(about = "Run self-play training", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of games to play
    #[arg(long, short = 'g', default_value_t = 500)]
    pub games: usize,

    /// Seed for the random baseline opponent
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Board edge length for the skirmish game
    #[arg(long, default_value_t = Board::DEFAULT_SIZE)]
    pub board_size: usize,

    /// Hard per-game turn limit
    #[arg(long, default_value_t = 200)]
    pub max_turns: usize,

    /// Opponent for the second seat (learned or random)
    #[arg(long, short = 'o', default_value = "learned")]
    pub opponent: String,

    /// Initial optimistic value for unexplored actions
    #[arg(long, default_value_t = sentinel::OPTIMISTIC_INIT)]
    pub initial_value: f64,

    /// Value assigned to actions rejected for exposing the monarch
    #[arg(long, default_value_t = sentinel::EXPOSURE_PENALTY)]
    pub illegal_penalty: f64,

    /// Step size of the value update (1.0 replaces the old estimate)
    #[arg(long, default_value_t = 1.0)]
    pub learning_rate: f64,

    /// Save the learned value table to this MessagePack file
    #[arg(long, short = 's')]
    pub snapshot: Option<PathBuf>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Stream per-turn JSONL observations to this file
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = true)]
    pub progress: bool,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let opponent: Opponent = args.opponent.parse()?;
    let value_config = ValueConfig::new(args.initial_value)
        .with_illegal_penalty(args.illegal_penalty)
        .with_learning_rate(args.learning_rate);
    let store = SharedStateStore::new(StateStore::with_config(value_config));

    let run_config = RunConfig {
        games: args.games,
        seed: args.seed,
        board_size: args.board_size,
        match_config: MatchConfig::default().with_max_turns(args.max_turns),
        opponent,
    };

    let mut runner = SelfPlayRunner::new(store.clone(), run_config);
    if args.progress {
        runner = runner.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        runner = runner.with_observer(Box::new(JsonlObserver::new(path)?));
    }

    let result = runner.run()?;

    print_section("Self-Play Results");
    print_kv("Games", &format_number(result.games));
    print_kv("Opponent", opponent.label());
    print_kv(
        "Score",
        &format!(
            "P1 {} / P2 {} / undecided {}",
            result.p1_wins, result.p2_wins, result.undecided
        ),
    );
    print_kv(
        "Endings",
        &format!(
            "monarch {} / exposure {} / no-moves {} / forfeit {}",
            result.monarch_endings,
            result.exposure_endings,
            result.no_moves_endings,
            result.forfeit_endings
        ),
    );
    print_kv("Avg turns", &format!("{:.1}", result.avg_turns()));
    print_kv("Captures", &format_number(result.total_captures));
    print_kv("States in table", &format_number(store.borrow().len()));
    if let Some(counters) = result.p1_counters {
        print_kv(
            "P1 counters",
            &format!(
                "learned {} / evaluated {}",
                counters.learned_states, counters.evaluated_actions
            ),
        );
    }
    if let Some(counters) = result.p2_counters {
        print_kv(
            "P2 counters",
            &format!(
                "learned {} / evaluated {}",
                counters.learned_states, counters.evaluated_actions
            ),
        );
    }

    if let Some(path) = &args.snapshot {
        MsgPackSnapshots.save(&store.borrow(), path)?;
        println!("\n✓ Value table saved to: {}", path.display());
    }
    if let Some(path) = &args.summary {
        result.save(path)?;
        println!("✓ Summary written to: {}", path.display());
    }

    Ok(())
}
