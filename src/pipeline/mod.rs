//! Training pipeline: episodes, statistics, scheduling and the session aggregate
//!
//! This module provides:
//! - Episode execution for all three strategies
//! - Rolling reward/step windows and convergence detection
//! - A pausable, resumable scheduler driven by host ticks
//! - Observers for progress, metrics and JSONL export

pub mod convergence;
pub mod episode;
pub mod history;
pub mod observers;
pub mod scheduler;
pub mod session;

pub use convergence::{ConvergenceTracker, convergence_threshold, perfect_run_score};
pub use episode::{EpisodeOutcome, EpisodeReport, EpisodeRunner, Rollout, max_steps_for};
pub use history::{HISTORY_CAPACITY, RollingHistory};
pub use observers::{
    EpisodeRecord, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
    StrategyMetrics,
};
pub use scheduler::{
    DEFAULT_TIME_SLICE, SchedulerState, StartOutcome, TrainingMode, TrainingScheduler,
    effective_batch_size, max_episodes_for,
};
pub use session::{SessionSummary, StrategySnapshot, TrainingSession};

pub use crate::ports::{Learner, Observer};
