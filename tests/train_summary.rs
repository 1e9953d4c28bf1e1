//! End-to-end checks of the train and inspect commands.

use boardmind::{
    adapters::MsgPackSnapshots,
    cli::commands::{inspect, train},
    ports::SnapshotRepository,
};
use clap::Parser;
use tempfile::tempdir;

#[test]
fn train_writes_snapshot_summary_and_observations() {
    let tmp = tempdir().unwrap();
    let snapshot = tmp.path().join("table.msgpack");
    let summary = tmp.path().join("summary.json");
    let observations = tmp.path().join("observations.jsonl");

    let args = train::TrainArgs::parse_from([
        "boardmind",
        "--games",
        "6",
        "--max-turns",
        "40",
        "--opponent",
        "random",
        "--seed",
        "11",
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
        "--observations",
        observations.to_str().unwrap(),
    ]);
    train::execute(args).expect("training should succeed");

    let contents = std::fs::read_to_string(&summary).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["games"], 6);
    let settled = parsed["p1_wins"].as_u64().unwrap()
        + parsed["p2_wins"].as_u64().unwrap()
        + parsed["undecided"].as_u64().unwrap();
    assert_eq!(settled, 6);
    assert!(
        parsed["p2_counters"].is_null(),
        "random opponent keeps no counters"
    );

    let store = MsgPackSnapshots.load(&snapshot).expect("snapshot loads");
    assert!(!store.is_empty());

    let stream = std::fs::read_to_string(&observations).unwrap();
    let lines: Vec<&str> = stream.lines().collect();
    assert!(lines.len() >= 6, "at least one line per game");
    for line in lines {
        let _: serde_json::Value = serde_json::from_str(line).expect("valid JSON line");
    }
}

#[test]
fn inspect_reads_a_trained_snapshot_and_exports_csv() {
    let tmp = tempdir().unwrap();
    let snapshot = tmp.path().join("table.msgpack");

    let args = train::TrainArgs::parse_from([
        "boardmind",
        "--games",
        "4",
        "--max-turns",
        "30",
        "--snapshot",
        snapshot.to_str().unwrap(),
    ]);
    train::execute(args).expect("training should succeed");

    let csv_path = tmp.path().join("table.csv");
    let args = inspect::InspectArgs::parse_from([
        "boardmind",
        snapshot.to_str().unwrap(),
        "--top",
        "5",
        "--csv",
        csv_path.to_str().unwrap(),
    ]);
    inspect::execute(args).expect("inspection should succeed");

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("state,action,value,deep_value,last_reward,successor,visits")
    );
    assert!(lines.count() > 0, "export carries the table's edges");
}

#[test]
fn value_flags_accept_negative_numbers() {
    let args = train::TrainArgs::parse_from([
        "boardmind",
        "--initial-value",
        "500",
        "--illegal-penalty",
        "-250",
        "--learning-rate",
        "0.5",
    ]);

    assert_eq!(args.initial_value, 500.0);
    assert_eq!(args.illegal_penalty, -250.0);
    assert_eq!(args.learning_rate, 0.5);
}
