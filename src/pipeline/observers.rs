//! Observer implementations for training sessions
//!
//! Observers allow composable data collection during training without coupling
//! the session to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::episode::{EpisodeOutcome, EpisodeReport};
use crate::{Result, ports::Observer, types::StrategyKind};

/// One line of JSONL output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// 1-based episode number
    pub episode: usize,
    pub q_learning: EpisodeOutcome,
    pub sarsa: EpisodeOutcome,
    pub naive: EpisodeOutcome,
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    q_wins: usize,
    sarsa_wins: usize,
    naive_wins: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            q_wins: 0,
            sarsa_wins: 0,
            naive_wins: 0,
        }
    }

    fn message(&self) -> String {
        format!(
            "Q:{} SARSA:{} Naive:{}",
            self.q_wins, self.sarsa_wins, self.naive_wins
        )
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, target: usize) -> Result<()> {
        let pb = ProgressBar::new(target as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (wins {msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, report: &EpisodeReport) -> Result<()> {
        self.q_wins += usize::from(report.q_learning.won);
        self.sarsa_wins += usize::from(report.sarsa.won);
        self.naive_wins += usize::from(report.naive.won);
        Ok(())
    }

    fn on_tick_end(&mut self, total_episodes: usize, _exploration_rate: f64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(total_episodes as u64);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_converged(&mut self, kind: StrategyKind, episode: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.println(format!("{kind} converged at episode {episode}"));
        }
        Ok(())
    }

    fn on_training_end(&mut self, total_episodes: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(total_episodes as u64);
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks cumulative training metrics
///
/// Unlike the session's rolling windows, these counts cover every episode
/// seen since the observer was attached.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    episodes: usize,
    wins: [usize; 3],
    timeouts: [usize; 3],
    total_reward: [f64; 3],
    total_steps: [usize; 3],
    converged: Vec<(StrategyKind, usize)>,
    ticks: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Get cumulative win rate for a strategy
    pub fn win_rate(&self, kind: StrategyKind) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.wins[kind.index()] as f64 / self.episodes as f64
        }
    }

    pub fn average_reward(&self, kind: StrategyKind) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_reward[kind.index()] / self.episodes as f64
        }
    }

    pub fn average_steps(&self, kind: StrategyKind) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_steps[kind.index()] as f64 / self.episodes as f64
        }
    }

    pub fn timeouts(&self, kind: StrategyKind) -> usize {
        self.timeouts[kind.index()]
    }

    /// Convergence events in the order they were reported
    pub fn converged(&self) -> &[(StrategyKind, usize)] {
        &self.converged
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes,
            strategies: StrategyKind::ALL
                .into_iter()
                .map(|kind| StrategyMetrics {
                    kind,
                    win_rate: self.win_rate(kind),
                    average_reward: self.average_reward(kind),
                    average_steps: self.average_steps(kind),
                    timeouts: self.timeouts(kind),
                })
                .collect(),
        }
    }
}

/// Cumulative metrics for one strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyMetrics {
    pub kind: StrategyKind,
    pub win_rate: f64,
    pub average_reward: f64,
    pub average_steps: f64,
    pub timeouts: usize,
}

/// Summary of training metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub strategies: Vec<StrategyMetrics>,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, _episode: usize, report: &EpisodeReport) -> Result<()> {
        self.episodes += 1;
        for kind in StrategyKind::ALL {
            let outcome = report.get(kind);
            let i = kind.index();
            self.wins[i] += usize::from(outcome.won);
            self.timeouts[i] += usize::from(outcome.timed_out);
            self.total_reward[i] += outcome.total_reward;
            self.total_steps[i] += outcome.steps;
        }
        Ok(())
    }

    fn on_converged(&mut self, kind: StrategyKind, episode: usize) -> Result<()> {
        self.converged.push((kind, episode));
        Ok(())
    }

    fn on_tick_end(&mut self, _total_episodes: usize, _exploration_rate: f64) -> Result<()> {
        self.ticks += 1;
        Ok(())
    }
}

/// JSONL observer - Exports one episode record per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, episode: usize, report: &EpisodeReport) -> Result<()> {
        let record = EpisodeRecord {
            episode,
            q_learning: report.q_learning,
            sarsa: report.sarsa,
            naive: report.naive,
        };

        // Write as JSONL (one JSON object per line)
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_tick_end(&mut self, _total_episodes: usize, _exploration_rate: f64) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn on_training_end(&mut self, _total_episodes: usize) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
