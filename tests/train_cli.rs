use clap::Parser;
use gridlearn::cli::commands::train::{TrainArgs, execute};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn batch_run_writes_summary_with_json_extension() {
    let tmp = tempdir().unwrap();
    let summary_stem = tmp.path().join("run_overview");
    let observations = tmp.path().join("episodes.jsonl");

    let args = parse_args([
        "gridlearn-train",
        "--mode",
        "batch",
        "--batches",
        "2",
        "--episodes-per-batch",
        "30",
        "--seed",
        "1",
        "--show-policy",
        "sarsa",
        "--summary",
        summary_stem.to_str().unwrap(),
        "--observations",
        observations.to_str().unwrap(),
    ]);

    execute(args).expect("batch training should succeed");

    let expected_path = summary_stem.with_extension("json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["total_episodes"], 60);
    assert_eq!(parsed["training"]["mode"], "batch");
    assert_eq!(parsed["training"]["state"], "completed");
    assert_eq!(parsed["training"]["strategies"].as_array().unwrap().len(), 3);
    assert_eq!(parsed["rollout"]["strategy"], "sarsa");
    assert_eq!(parsed["rollout"]["path"][0], 0);

    let records = std::fs::read_to_string(&observations).unwrap();
    assert_eq!(records.lines().count(), 60);
}

#[test]
fn summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}/", summary_dir.display());

    let args = parse_args([
        "gridlearn-train",
        "--grid-size",
        "3",
        "--hazards",
        "none",
        "--mode",
        "batch",
        "--episodes-per-batch",
        "10",
        "--seed",
        "4",
        "--summary",
        &summary_arg,
    ]);

    execute(args).expect("training with summary directory should succeed");

    let expected_path = summary_dir.join("training_summary.json");
    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["training"]["total_episodes"], 10);
    assert_eq!(parsed["training"]["grid"]["side"], 3);
    assert_eq!(parsed["training"]["grid"]["hazards"], serde_json::json!([]));
}

#[test]
fn config_file_is_loaded_and_overridden() {
    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("session.json");
    std::fs::write(
        &config_path,
        r#"{
            "grid": { "side": 5, "hazards": [6, 12] },
            "hyperparameters": {
                "learning_rate": 0.2,
                "discount_factor": 0.9,
                "min_exploration_rate": 0.05,
                "exploration_decay": 0.01,
                "episodes_per_batch": 15
            },
            "mode": "batch"
        }"#,
    )
    .unwrap();
    let summary = tmp.path().join("out.json");

    let args = parse_args([
        "gridlearn-train",
        "--config",
        config_path.to_str().unwrap(),
        "--learning-rate",
        "0.3",
        "--seed",
        "2",
        "--summary",
        summary.to_str().unwrap(),
    ]);
    execute(args).expect("training from config should succeed");

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).unwrap()).unwrap();
    assert_eq!(parsed["training"]["total_episodes"], 15);
    assert_eq!(parsed["training"]["grid"]["hazards"], serde_json::json!([6, 12]));
    assert_eq!(parsed["training"]["hyperparameters"]["learning_rate"], 0.3);
    assert_eq!(parsed["training"]["hyperparameters"]["discount_factor"], 0.9);
}

#[test]
fn invalid_hazard_is_rejected() {
    let args = parse_args(["gridlearn-train", "--hazards", "0,5"]);
    assert!(execute(args).is_err());
}
