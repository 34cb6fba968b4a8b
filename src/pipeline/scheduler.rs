//! Scheduling state machine for incremental, resumable training
//!
//! The scheduler only tracks *when* to run episodes; the session runs them.
//! A host drives training by calling `TrainingSession::tick` repeatedly; each
//! tick runs episodes for at most one time slice and then returns.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result};

/// Wall-clock budget of one scheduling tick.
pub const DEFAULT_TIME_SLICE: Duration = Duration::from_millis(20);

/// Minimum episodes per batch on large grids.
pub const LARGE_GRID_MIN_BATCH: usize = 500;

/// Episode target for one-shot training on a grid of the given side.
pub fn max_episodes_for(side: usize) -> usize {
    if side > 8 { 20_000 } else { 10_000 }
}

/// Batch size actually used on a grid of the given side.
///
/// Grids of side 10 and above need larger batches to show progress.
pub fn effective_batch_size(side: usize, requested: usize) -> usize {
    if side >= 10 {
        requested.max(LARGE_GRID_MIN_BATCH)
    } else {
        requested
    }
}

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl SchedulerState {
    const fn label(self) -> &'static str {
        match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Paused => "paused",
            SchedulerState::Completed => "completed",
        }
    }
}

/// How the episode target is chosen when training starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingMode {
    /// Train up to a fixed maximum, then stay completed
    #[default]
    OneShot,
    /// Each start extends the target by one batch
    Batch,
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrainingMode::OneShot => "one-shot",
            TrainingMode::Batch => "batch",
        };
        f.write_str(label)
    }
}

impl FromStr for TrainingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one-shot" | "oneshot" | "one_shot" | "full" => Ok(TrainingMode::OneShot),
            "batch" | "incremental" => Ok(TrainingMode::Batch),
            _ => Err(Error::ParseTrainingMode {
                input: s.to_string(),
                expected: "one-shot, batch".to_string(),
            }),
        }
    }
}

/// Result of a start command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Now running toward `target`
    Started { target: usize },
    /// Paused run continued toward its existing target
    Resumed { target: usize },
    /// Already running; nothing changed
    AlreadyRunning,
    /// One-shot maximum already reached; reset to train again
    AlreadyComplete,
}

/// Idle → Running → (Paused ⇄ Running) → Completed state machine
#[derive(Debug, Clone)]
pub struct TrainingScheduler {
    state: SchedulerState,
    mode: TrainingMode,
    target: usize,
    max_episodes: usize,
    episodes_per_batch: usize,
    time_slice: Duration,
}

impl TrainingScheduler {
    pub fn new(mode: TrainingMode, max_episodes: usize, episodes_per_batch: usize) -> Self {
        Self {
            state: SchedulerState::Idle,
            mode,
            target: 0,
            max_episodes,
            episodes_per_batch,
            time_slice: DEFAULT_TIME_SLICE,
        }
    }

    pub fn with_time_slice(mut self, time_slice: Duration) -> Self {
        self.time_slice = time_slice;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn mode(&self) -> TrainingMode {
        self.mode
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }

    pub fn episodes_per_batch(&self) -> usize {
        self.episodes_per_batch
    }

    pub fn time_slice(&self) -> Duration {
        self.time_slice
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Change limits; only allowed while not running.
    pub fn configure(
        &mut self,
        mode: TrainingMode,
        max_episodes: usize,
        episodes_per_batch: usize,
    ) -> Result<()> {
        if self.is_running() {
            return Err(Error::TrainingActive {
                operation: "reconfigure the scheduler",
            });
        }
        self.mode = mode;
        self.max_episodes = max_episodes;
        self.episodes_per_batch = episodes_per_batch;
        Ok(())
    }

    /// Enter Running. `total` is the current episode count.
    pub fn start(&mut self, total: usize) -> StartOutcome {
        match self.state {
            SchedulerState::Running => StartOutcome::AlreadyRunning,
            SchedulerState::Paused => {
                self.state = SchedulerState::Running;
                StartOutcome::Resumed {
                    target: self.target,
                }
            }
            SchedulerState::Idle | SchedulerState::Completed => {
                let target = match self.mode {
                    TrainingMode::OneShot => {
                        if total >= self.max_episodes {
                            info!(total, max = self.max_episodes, "training already complete");
                            return StartOutcome::AlreadyComplete;
                        }
                        self.max_episodes
                    }
                    TrainingMode::Batch => total + self.episodes_per_batch,
                };
                self.target = target;
                self.state = SchedulerState::Running;
                StartOutcome::Started { target }
            }
        }
    }

    /// Running → Paused.
    pub fn pause(&mut self) -> Result<()> {
        self.transition("pause", SchedulerState::Running, SchedulerState::Paused)
    }

    /// Paused → Running, keeping the existing target.
    pub fn resume(&mut self) -> Result<()> {
        self.transition("resume", SchedulerState::Paused, SchedulerState::Running)
    }

    fn transition(
        &mut self,
        command: &'static str,
        from: SchedulerState,
        to: SchedulerState,
    ) -> Result<()> {
        if self.state != from {
            return Err(Error::InvalidTransition {
                command,
                state: self.state.label(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Whether another episode should run in the current tick.
    pub fn wants_more(&self, total: usize) -> bool {
        self.is_running() && total < self.target
    }

    /// Close a tick; moves to Completed once `total` reaches the target.
    pub fn finish_tick(&mut self, total: usize) -> SchedulerState {
        if self.is_running() && total >= self.target {
            self.state = SchedulerState::Completed;
        }
        self.state
    }

    /// Back to Idle with no target.
    pub fn reset(&mut self) {
        self.state = SchedulerState::Idle;
        self.target = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_lifecycle() {
        let mut scheduler = TrainingScheduler::new(TrainingMode::OneShot, 100, 10);
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.start(0), StartOutcome::Started { target: 100 });
        assert_eq!(scheduler.start(5), StartOutcome::AlreadyRunning);

        scheduler.pause().unwrap();
        assert!(!scheduler.wants_more(5));
        assert!(scheduler.pause().is_err());
        scheduler.resume().unwrap();
        assert!(scheduler.wants_more(5));

        assert_eq!(scheduler.finish_tick(50), SchedulerState::Running);
        assert_eq!(scheduler.finish_tick(100), SchedulerState::Completed);
        assert_eq!(scheduler.start(100), StartOutcome::AlreadyComplete);
        assert_eq!(scheduler.state(), SchedulerState::Completed);
    }

    #[test]
    fn batch_mode_extends_target_each_start() {
        let mut scheduler = TrainingScheduler::new(TrainingMode::Batch, 100, 25);
        assert_eq!(scheduler.start(0), StartOutcome::Started { target: 25 });
        assert_eq!(scheduler.finish_tick(25), SchedulerState::Completed);
        assert_eq!(scheduler.start(25), StartOutcome::Started { target: 50 });
        scheduler.pause().unwrap();
        assert_eq!(scheduler.start(30), StartOutcome::Resumed { target: 50 });
    }

    #[test]
    fn resume_requires_pause() {
        let mut scheduler = TrainingScheduler::new(TrainingMode::OneShot, 10, 1);
        assert!(matches!(
            scheduler.resume(),
            Err(Error::InvalidTransition {
                command: "resume",
                state: "idle"
            })
        ));
    }

    #[test]
    fn limits_by_grid_size() {
        assert_eq!(max_episodes_for(4), 10_000);
        assert_eq!(max_episodes_for(8), 10_000);
        assert_eq!(max_episodes_for(9), 20_000);
        assert_eq!(effective_batch_size(4, 200), 200);
        assert_eq!(effective_batch_size(10, 200), 500);
        assert_eq!(effective_batch_size(10, 800), 800);
    }

    #[test]
    fn configure_rejected_while_running() {
        let mut scheduler = TrainingScheduler::new(TrainingMode::OneShot, 10, 1);
        scheduler.start(0);
        assert!(scheduler.configure(TrainingMode::Batch, 10, 5).is_err());
        scheduler.pause().unwrap();
        scheduler.configure(TrainingMode::Batch, 10, 5).unwrap();
        assert_eq!(scheduler.mode(), TrainingMode::Batch);
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("batch".parse::<TrainingMode>().unwrap(), TrainingMode::Batch);
        assert_eq!("One-Shot".parse::<TrainingMode>().unwrap(), TrainingMode::OneShot);
        assert!("forever".parse::<TrainingMode>().is_err());
    }
}
