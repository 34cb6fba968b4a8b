//! Training session: the aggregate that owns every piece of mutable state
//!
//! A [`TrainingSession`] holds the environment, the three learners, their
//! statistics, the exploration schedule and the scheduler. Hosts drive it by
//! issuing commands (`start`, `pause`, `reset`, ...) and calling [`tick`]
//! periodically; everything they display is read back through the query
//! methods as plain data.
//!
//! [`tick`]: TrainingSession::tick

use std::time::{Duration, Instant};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    convergence::ConvergenceTracker,
    episode::{EpisodeReport, EpisodeRunner, Rollout},
    history::RollingHistory,
    scheduler::{
        SchedulerState, StartOutcome, TrainingMode, TrainingScheduler, effective_batch_size,
        max_episodes_for,
    },
};
use crate::{
    Error, Result,
    app::{HyperParameters, SessionConfig},
    gridworld::{DEFAULT_HAZARDS, GridConfig, GridEnvironment},
    ports::{Learner, Observer},
    q_learning::{NaiveLearner, QLearner, SarsaLearner, ValueTable, greedy_action},
    types::{Action, StrategyKind},
};

/// Exploration rate at the start of every session.
pub const INITIAL_EXPLORATION_RATE: f64 = 1.0;

/// Per-strategy counters and rolling window
#[derive(Debug, Clone, Default)]
struct StrategyStats {
    wins: usize,
    history: RollingHistory,
    convergence: ConvergenceTracker,
}

impl StrategyStats {
    fn reset(&mut self) {
        self.wins = 0;
        self.history.clear();
        self.convergence.reset();
    }
}

/// Reporting view of one strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    pub kind: StrategyKind,
    /// Average return over the rolling window
    pub average_reward: f64,
    /// Average episode length over the rolling window
    pub average_steps: f64,
    /// Fraction of winning episodes in the rolling window
    pub win_rate: f64,
    /// Wins since the last reset
    pub wins: usize,
    /// Episode at which convergence was first detected
    pub converged_at: Option<usize>,
}

/// Serializable overview of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_episodes: usize,
    pub exploration_rate: f64,
    pub state: SchedulerState,
    pub mode: TrainingMode,
    pub grid: GridConfig,
    pub hyperparameters: HyperParameters,
    pub strategies: Vec<StrategySnapshot>,
}

/// The three learners trained side by side
struct Learners {
    q_learning: QLearner,
    sarsa: SarsaLearner,
    naive: NaiveLearner,
}

impl Learners {
    fn new(num_states: usize, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_learning: QLearner::new(num_states, learning_rate, discount_factor),
            sarsa: SarsaLearner::new(num_states, learning_rate, discount_factor),
            naive: NaiveLearner::new(num_states),
        }
    }

    fn get(&self, kind: StrategyKind) -> &dyn Learner {
        match kind {
            StrategyKind::QLearning => &self.q_learning,
            StrategyKind::Sarsa => &self.sarsa,
            StrategyKind::Naive => &self.naive,
        }
    }

    fn reset(&mut self, num_states: usize) {
        self.q_learning.reset(num_states);
        self.sarsa.reset(num_states);
        self.naive.reset(num_states);
    }

    fn set_learning_params(&mut self, learning_rate: f64, discount_factor: f64) {
        self.q_learning
            .set_learning_params(learning_rate, discount_factor);
        self.sarsa.set_learning_params(learning_rate, discount_factor);
        self.naive.set_learning_params(learning_rate, discount_factor);
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// All mutable training state for one grid layout
pub struct TrainingSession {
    env: GridEnvironment,
    runner: EpisodeRunner,
    hyperparameters: HyperParameters,
    learners: Learners,
    stats: [StrategyStats; 3],
    exploration_rate: f64,
    total_episodes: usize,
    scheduler: TrainingScheduler,
    observers: Vec<Box<dyn Observer>>,
    seed: Option<u64>,
    /// Drives exploration and tie-breaking during training
    rng: StdRng,
    /// Tie-breaking for policy queries, kept apart so inspection never
    /// perturbs the training sequence
    inspect_rng: StdRng,
    started_at: Option<Instant>,
}

impl TrainingSession {
    /// Create a session from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperParameter`] if any parameter is out of range.
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let SessionConfig {
            grid,
            hyperparameters: hp,
            mode,
            seed,
            time_slice,
        } = config;

        let side = grid.side();
        let num_states = grid.num_states();
        let env = GridEnvironment::new(grid);
        let scheduler = TrainingScheduler::new(
            mode,
            max_episodes_for(side),
            effective_batch_size(side, hp.episodes_per_batch),
        )
        .with_time_slice(time_slice);

        Ok(Self {
            runner: EpisodeRunner::for_environment(&env),
            env,
            hyperparameters: hp,
            learners: Learners::new(num_states, hp.learning_rate, hp.discount_factor),
            stats: Default::default(),
            exploration_rate: INITIAL_EXPLORATION_RATE,
            total_episodes: 0,
            scheduler,
            observers: Vec::new(),
            seed,
            rng: build_rng(seed),
            inspect_rng: build_rng(seed.map(|s| s.wrapping_add(1))),
            started_at: None,
        })
    }

    /// Add an observer to the session
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    // ----- commands -------------------------------------------------------

    /// Start (or resume) training.
    ///
    /// In one-shot mode, starting after the maximum was reached reports
    /// [`StartOutcome::AlreadyComplete`] and changes nothing.
    pub fn start(&mut self) -> Result<StartOutcome> {
        let outcome = self.scheduler.start(self.total_episodes);
        match outcome {
            StartOutcome::Started { target } => {
                info!(
                    target,
                    total = self.total_episodes,
                    mode = %self.scheduler.mode(),
                    "training started"
                );
                self.started_at = Some(Instant::now());
                for observer in &mut self.observers {
                    observer.on_training_start(target)?;
                }
            }
            StartOutcome::Resumed { target } => {
                info!(target, total = self.total_episodes, "training resumed");
                self.started_at = Some(Instant::now());
            }
            StartOutcome::AlreadyRunning | StartOutcome::AlreadyComplete => {}
        }
        Ok(outcome)
    }

    /// Stop at the next tick boundary, keeping all learned state.
    pub fn pause(&mut self) -> Result<()> {
        self.scheduler.pause()?;
        info!(total = self.total_episodes, "training paused");
        Ok(())
    }

    /// Continue a paused run toward its existing target.
    pub fn resume(&mut self) -> Result<()> {
        self.scheduler.resume()?;
        self.started_at = Some(Instant::now());
        info!(
            total = self.total_episodes,
            target = self.scheduler.target(),
            "training resumed"
        );
        Ok(())
    }

    /// Run episodes for at most one time slice.
    ///
    /// Returns the scheduler state after the slice. Does nothing unless the
    /// scheduler is Running, so a host can keep calling it unconditionally.
    pub fn tick(&mut self) -> Result<SchedulerState> {
        if !self.scheduler.is_running() {
            return Ok(self.scheduler.state());
        }

        let slice_start = Instant::now();
        let mut ran = 0usize;
        while self.scheduler.wants_more(self.total_episodes) {
            self.run_episode()?;
            ran += 1;
            if slice_start.elapsed() > self.scheduler.time_slice() {
                break;
            }
        }

        for observer in &mut self.observers {
            observer.on_tick_end(self.total_episodes, self.exploration_rate)?;
        }
        debug!(
            ran,
            total = self.total_episodes,
            epsilon = self.exploration_rate,
            "tick finished"
        );

        let state = self.scheduler.finish_tick(self.total_episodes);
        if state == SchedulerState::Completed {
            info!(total = self.total_episodes, "training target reached");
            for observer in &mut self.observers {
                observer.on_training_end(self.total_episodes)?;
            }
        }
        Ok(state)
    }

    /// Run one episode for every strategy and update all statistics.
    ///
    /// The exploration rate decays once per call.
    pub fn run_episode(&mut self) -> Result<EpisodeReport> {
        let report = self.runner.run_all(
            &mut self.learners.q_learning,
            &mut self.learners.sarsa,
            &mut self.learners.naive,
            &self.env,
            self.exploration_rate,
            &mut self.rng,
        );
        self.total_episodes += 1;
        self.exploration_rate = (self.exploration_rate - self.hyperparameters.exploration_decay)
            .max(self.hyperparameters.min_exploration_rate);

        let episode = self.total_episodes;
        let side = self.env.config().side();
        let mut newly_converged = Vec::new();
        for kind in StrategyKind::ALL {
            let outcome = report.get(kind);
            let stats = &mut self.stats[kind.index()];
            if outcome.won {
                stats.wins += 1;
            }
            stats.history.push(outcome);
            if kind.learns() && stats.convergence.check(&stats.history, episode, side).is_some() {
                newly_converged.push(kind);
            }
        }

        for observer in &mut self.observers {
            observer.on_episode_end(episode, &report)?;
        }
        for kind in newly_converged {
            info!(strategy = %kind, episode, "strategy converged");
            for observer in &mut self.observers {
                observer.on_converged(kind, episode)?;
            }
        }
        Ok(report)
    }

    /// Clear tables, statistics and counters; restore full exploration.
    pub fn reset(&mut self) {
        let num_states = self.env.num_states();
        self.scheduler.reset();
        self.learners.reset(num_states);
        for stats in &mut self.stats {
            stats.reset();
        }
        self.exploration_rate = INITIAL_EXPLORATION_RATE;
        self.total_episodes = 0;
        self.started_at = None;
        self.rng = build_rng(self.seed);
        self.inspect_rng = build_rng(self.seed.map(|s| s.wrapping_add(1)));
        info!(side = self.env.config().side(), "session reset");
    }

    /// Switch to an empty grid of a new size with that size's tuned defaults.
    ///
    /// Implies [`reset`](Self::reset). The batch size setting is kept.
    pub fn resize_grid(&mut self, side: usize) -> Result<()> {
        self.ensure_not_running("resize the grid")?;
        let grid = GridConfig::empty(side)?;
        let hyperparameters = HyperParameters::for_grid_size(side)
            .with_episodes_per_batch(self.hyperparameters.episodes_per_batch);

        self.scheduler.configure(
            self.scheduler.mode(),
            max_episodes_for(side),
            effective_batch_size(side, hyperparameters.episodes_per_batch),
        )?;
        self.apply_learning_params(hyperparameters);
        self.env = GridEnvironment::new(grid);
        self.runner = EpisodeRunner::for_environment(&self.env);
        self.reset();
        info!(side, "grid resized");
        Ok(())
    }

    /// Replace the hazard set. Learned values are kept.
    pub fn set_hazards<I>(&mut self, hazards: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        self.ensure_not_running("change hazards")?;
        let grid = self.env.config().with_hazards(hazards)?;
        debug!(hazards = ?grid.hazards(), "hazards updated");
        self.env = GridEnvironment::new(grid);
        Ok(())
    }

    /// Add or remove a single hazard cell.
    pub fn toggle_hazard(&mut self, index: usize) -> Result<()> {
        self.ensure_not_running("change hazards")?;
        let grid = self.env.config().toggled(index)?;
        self.env = GridEnvironment::new(grid);
        Ok(())
    }

    pub fn clear_hazards(&mut self) -> Result<()> {
        self.set_hazards([])
    }

    /// Restore the classic hazard layout, keeping only cells that exist on
    /// the current grid.
    pub fn restore_default_hazards(&mut self) -> Result<()> {
        let config = self.env.config();
        let (start, goal) = (config.start(), config.goal());
        let hazards = DEFAULT_HAZARDS
            .into_iter()
            .filter(|&index| index != start && index < goal)
            .collect::<Vec<_>>();
        self.set_hazards(hazards)
    }

    /// Change learning and exploration parameters for subsequent episodes.
    pub fn set_hyperparameters(&mut self, hyperparameters: HyperParameters) -> Result<()> {
        self.ensure_not_running("change hyperparameters")?;
        hyperparameters.validate()?;
        // ε never increases within a session; a higher floor needs a reset.
        if hyperparameters.min_exploration_rate > self.exploration_rate {
            return Err(Error::InvalidHyperParameter {
                name: "min_exploration_rate",
                value: hyperparameters.min_exploration_rate,
                reason: "exceeds the current exploration rate",
            });
        }
        let side = self.env.config().side();
        self.scheduler.configure(
            self.scheduler.mode(),
            max_episodes_for(side),
            effective_batch_size(side, hyperparameters.episodes_per_batch),
        )?;
        self.apply_learning_params(hyperparameters);
        Ok(())
    }

    pub fn set_mode(&mut self, mode: TrainingMode) -> Result<()> {
        self.scheduler.configure(
            mode,
            self.scheduler.max_episodes(),
            self.scheduler.episodes_per_batch(),
        )
    }

    fn apply_learning_params(&mut self, hyperparameters: HyperParameters) {
        let HyperParameters {
            learning_rate,
            discount_factor,
            ..
        } = hyperparameters;
        self.learners
            .set_learning_params(learning_rate, discount_factor);
        self.hyperparameters = hyperparameters;
    }

    fn ensure_not_running(&self, operation: &'static str) -> Result<()> {
        if self.scheduler.is_running() {
            warn!(operation, "rejected while training is running");
            return Err(Error::TrainingActive { operation });
        }
        Ok(())
    }

    // ----- queries --------------------------------------------------------

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }

    pub fn state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &TrainingScheduler {
        &self.scheduler
    }

    pub fn grid(&self) -> &GridConfig {
        self.env.config()
    }

    pub fn environment(&self) -> &GridEnvironment {
        &self.env
    }

    pub fn hyperparameters(&self) -> &HyperParameters {
        &self.hyperparameters
    }

    /// Step cap applied to every episode on the current grid.
    pub fn max_steps(&self) -> usize {
        self.runner.max_steps()
    }

    /// Time since training was last started or resumed.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    pub fn learner(&self, kind: StrategyKind) -> &dyn Learner {
        self.learners.get(kind)
    }

    pub fn table(&self, kind: StrategyKind) -> &ValueTable {
        self.learner(kind).table()
    }

    pub fn history(&self, kind: StrategyKind) -> &RollingHistory {
        &self.stats[kind.index()].history
    }

    pub fn converged_at(&self, kind: StrategyKind) -> Option<usize> {
        self.stats[kind.index()].convergence.converged_at()
    }

    pub fn stats(&self, kind: StrategyKind) -> StrategySnapshot {
        let stats = &self.stats[kind.index()];
        StrategySnapshot {
            kind,
            average_reward: stats.history.average_reward(),
            average_steps: stats.history.average_steps(),
            win_rate: stats.history.win_rate(),
            wins: stats.wins,
            converged_at: stats.convergence.converged_at(),
        }
    }

    /// Greedy action for `state`, or `None` on goal and hazard cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateOutOfBounds`] for an index outside the grid.
    pub fn greedy_action(&mut self, kind: StrategyKind, state: usize) -> Result<Option<Action>> {
        let num_states = self.env.num_states();
        if state >= num_states {
            return Err(Error::StateOutOfBounds { state, num_states });
        }
        if self.env.is_terminal(state) {
            return Ok(None);
        }
        let table = self.learners.get(kind).table();
        Ok(Some(greedy_action(state, table, &mut self.inspect_rng)))
    }

    /// Greedy action for every cell, indexed by state.
    pub fn policy(&mut self, kind: StrategyKind) -> Vec<Option<Action>> {
        (0..self.env.num_states())
            .map(|state| self.greedy_action(kind, state).unwrap_or(None))
            .collect()
    }

    /// Walk the greedy policy of `kind` from the start cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrainingActive`] while the scheduler is running.
    pub fn greedy_rollout(&mut self, kind: StrategyKind) -> Result<Rollout> {
        self.ensure_not_running("run a policy rollout")?;
        Ok(self.runner.greedy_rollout(
            self.learners.get(kind),
            &self.env,
            &mut self.inspect_rng,
        ))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total_episodes: self.total_episodes,
            exploration_rate: self.exploration_rate,
            state: self.scheduler.state(),
            mode: self.scheduler.mode(),
            grid: self.env.config().clone(),
            hyperparameters: self.hyperparameters,
            strategies: StrategyKind::ALL
                .into_iter()
                .map(|kind| self.stats(kind))
                .collect(),
        }
    }
}
