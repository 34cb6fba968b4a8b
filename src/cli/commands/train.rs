//! Train command - Run Q-learning, SARSA and the naive baseline on one grid

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Serialize;
use serde_json::to_writer_pretty;

use crate::{
    app::{App, HyperParameters, SessionConfig},
    cli::output::{format_number, policy_rows, print_kv, print_section, print_subsection},
    gridworld::{DEFAULT_HAZARDS, GridConfig},
    pipeline::{
        JsonlObserver, ProgressObserver, Rollout, SchedulerState, SessionSummary, StartOutcome,
        TrainingMode, TrainingSession,
    },
    types::StrategyKind,
};

#[derive(Parser, Debug)]
#[command(about = "Train all strategies on a grid world")]
pub struct TrainArgs {
    /// JSON session configuration; flags below override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Grid side length (at least 2)
    #[arg(long, short = 'n')]
    pub grid_size: Option<usize>,

    /// Hazard cells as comma-separated indices, or `none`
    #[arg(long)]
    pub hazards: Option<String>,

    /// Training mode (one-shot or batch)
    #[arg(long, short = 'm')]
    pub mode: Option<TrainingMode>,

    /// Number of batches to run in batch mode
    #[arg(long, short = 'b', default_value_t = 1)]
    pub batches: usize,

    /// Episodes added per batch
    #[arg(long)]
    pub episodes_per_batch: Option<usize>,

    /// Learning rate α (0.0-1.0]
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ (0.0-1.0]
    #[arg(long)]
    pub discount_factor: Option<f64>,

    /// Minimum exploration rate
    #[arg(long)]
    pub min_exploration: Option<f64>,

    /// Exploration rate subtracted after every episode
    #[arg(long)]
    pub exploration_decay: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL episode records
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Strategy whose greedy policy is printed after training (q, sarsa, naive)
    #[arg(long, default_value = "q")]
    pub show_policy: StrategyKind,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    training: SessionSummary,
    elapsed_ms: u128,
    rollout: RolloutSummary,
}

#[derive(Debug, Serialize)]
struct RolloutSummary {
    strategy: StrategyKind,
    steps: usize,
    reached_goal: bool,
    path: Vec<usize>,
}

impl RolloutSummary {
    fn new(strategy: StrategyKind, rollout: &Rollout) -> Self {
        Self {
            strategy,
            steps: rollout.path.len(),
            reached_goal: rollout.reached_goal,
            path: rollout
                .path
                .iter()
                .map(|&(state, _)| state)
                .chain(std::iter::once(rollout.final_state))
                .collect(),
        }
    }
}

/// Parse a hazard list (e.g., "5,7,11,12", "none" or "default")
pub(crate) fn parse_hazards(value: &str) -> Result<Vec<usize>> {
    let trimmed = value.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" | "none" => return Ok(Vec::new()),
        "default" => return Ok(DEFAULT_HAZARDS.to_vec()),
        _ => {}
    }
    trimmed
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| anyhow!("Invalid hazard index '{}' in '{value}'", part.trim()))
        })
        .collect()
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn load_config(path: &Path) -> Result<SessionConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file {}", path.display()))?;
    serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Merge the optional config file with command-line overrides.
pub(crate) fn build_config(args: &TrainArgs) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };

    if let Some(side) = args.grid_size
        && side != config.grid.side()
    {
        // A new size starts from an empty layout and that size's tuned defaults.
        config.grid = GridConfig::empty(side)?;
        config.hyperparameters = HyperParameters::for_grid_size(side)
            .with_episodes_per_batch(config.hyperparameters.episodes_per_batch);
    }
    if let Some(hazards) = &args.hazards {
        config.grid = config.grid.with_hazards(parse_hazards(hazards)?)?;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let mut hp = config.hyperparameters;
    if let Some(v) = args.learning_rate {
        hp = hp.with_learning_rate(v);
    }
    if let Some(v) = args.discount_factor {
        hp = hp.with_discount_factor(v);
    }
    if let Some(v) = args.min_exploration {
        hp = hp.with_min_exploration_rate(v);
    }
    if let Some(v) = args.exploration_decay {
        hp = hp.with_exploration_decay(v);
    }
    if let Some(v) = args.episodes_per_batch {
        hp = hp.with_episodes_per_batch(v);
    }
    config.hyperparameters = hp;
    config.validate()?;
    Ok(config)
}

/// Drive ticks until the scheduler stops running.
fn run_to_completion(session: &mut TrainingSession) -> Result<()> {
    while session.tick()? == SchedulerState::Running {}
    Ok(())
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = build_config(&args)?;
    let app = App::new();
    let mut session = app.create_session(config)?;

    if args.progress {
        session.add_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create observations file {}", path.display()))?;
        session.add_observer(Box::new(observer));
    }

    let rounds = match session.scheduler().mode() {
        TrainingMode::OneShot => 1,
        TrainingMode::Batch => args.batches.max(1),
    };
    for _ in 0..rounds {
        match session.start()? {
            StartOutcome::AlreadyComplete => {
                println!("Training already complete. Reset the session to train again.");
                break;
            }
            StartOutcome::Started { .. } | StartOutcome::Resumed { .. } => {
                run_to_completion(&mut session)?;
            }
            StartOutcome::AlreadyRunning => run_to_completion(&mut session)?,
        }
    }

    let summary = session.summary();
    print_summary(&summary, &session);

    let rollout = session.greedy_rollout(args.show_policy)?;
    print_policy(&mut session, args.show_policy, &rollout);

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create summary file {}", path.display()))?;
        let payload = TrainingSummaryFile {
            training: summary,
            elapsed_ms: session.elapsed().as_millis(),
            rollout: RolloutSummary::new(args.show_policy, &rollout),
        };
        to_writer_pretty(file, &payload).context("Failed to write summary")?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &SessionSummary, session: &TrainingSession) {
    print_section("Training Summary");
    print_kv("Grid", &format!("{0}x{0}", summary.grid.side()));
    print_kv("Hazards", &format!("{:?}", summary.grid.hazards()));
    print_kv("Episodes", &format_number(summary.total_episodes));
    print_kv("Exploration rate", &format!("{:.4}", summary.exploration_rate));
    print_kv("Training time", &format!("{:.1}s", session.elapsed().as_secs_f64()));

    print_subsection("Rolling window (last 200 episodes)");
    for stats in &summary.strategies {
        let converged = stats
            .converged_at
            .map(|ep| format!("Ep {ep}"))
            .unwrap_or_else(|| "--".to_string());
        print_kv(
            stats.kind.display_name(),
            &format!(
                "avg reward {:>8.1} | avg steps {:>6.1} | win {:>5.1}% | converged {}",
                stats.average_reward,
                stats.average_steps,
                stats.win_rate * 100.0,
                converged
            ),
        );
    }
}

fn print_policy(session: &mut TrainingSession, kind: StrategyKind, rollout: &Rollout) {
    print_subsection(&format!("Greedy policy ({kind})"));
    let policy = session.policy(kind);
    for row in policy_rows(session.grid(), &policy) {
        println!("  {row}");
    }

    let outcome = if rollout.reached_goal {
        "reached goal"
    } else {
        "did not reach goal"
    };
    println!(
        "\n  Rollout: {} steps, {outcome} (ended on cell {})",
        rollout.path.len(),
        rollout.final_state
    );
}
