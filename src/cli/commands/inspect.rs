//! Inspect command - statistics and exports for saved value tables

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::{
    adapters::MsgPackSnapshots,
    cli::output::{format_number, print_kv, print_section, print_subsection},
    export,
    ports::SnapshotRepository,
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a saved value table")]
pub struct InspectArgs {
    /// Path to a MessagePack snapshot produced by `train --snapshot`
    pub snapshot: PathBuf,

    /// Number of top-valued edges to display
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export the full table to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let store = MsgPackSnapshots.load(&args.snapshot)?;

    let mut edges = 0usize;
    let mut evaluated = 0usize;
    let mut terminal = 0usize;
    let mut total_visits = 0u64;
    for state in store.states() {
        total_visits += state.visits();
        if state.is_terminal() {
            terminal += 1;
        }
        for action in state.actions() {
            edges += 1;
            if action.last_reward().is_some() {
                evaluated += 1;
            }
        }
    }

    print_section("Value Table");
    print_kv("Snapshot", &args.snapshot.display().to_string());
    print_kv("States", &format_number(store.len()));
    print_kv("Terminal states", &format_number(terminal));
    print_kv("Edges", &format_number(edges));
    print_kv("Evaluated edges", &format_number(evaluated));
    print_kv("Total visits", &format_number(total_visits as usize));
    print_kv(
        "Initial value",
        &format!("{}", store.config().initial_value),
    );

    let mut rows: Vec<(f64, String, String, u64)> = store
        .states()
        .flat_map(|state| {
            state.actions().iter().map(|action| {
                (
                    action.value(),
                    action.descriptor().to_string(),
                    state.key().to_string(),
                    state.visits(),
                )
            })
        })
        .collect();
    rows.sort_by(|a, b| b.0.total_cmp(&a.0));

    print_subsection(&format!("Top {} edges by value", args.top));
    for (value, action, state, visits) in rows.iter().take(args.top) {
        println!("  {value:>12.1}  {action:<14} {state}  ({visits} visits)");
    }

    if let Some(path) = &args.csv {
        let exported = export::write_value_table(&store, path)?;
        println!(
            "\n✓ {} rows exported to: {}",
            format_number(exported),
            path.display()
        );
    }

    Ok(())
}
