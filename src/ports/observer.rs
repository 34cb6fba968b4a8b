//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection (progress bars, metrics, JSONL
//! export) without coupling the training session to any output format.

use crate::{Result, pipeline::EpisodeReport, types::StrategyKind};

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_training_start(target)` - Each time the scheduler enters Running
///    with a new target
/// 2. For each episode:
///    - `on_episode_end(episode, report)`
///    - `on_converged(kind, episode)` - At most once per learning strategy
/// 3. `on_tick_end(total, epsilon)` - After every scheduling tick that ran
/// 4. `on_training_end(total)` - When the target is reached
///
/// Pausing does not call `on_training_end`; resuming does not call
/// `on_training_start` again.
///
/// # Examples
///
/// ```no_run
/// use gridlearn::{pipeline::EpisodeReport, ports::Observer};
///
/// struct WinCounter {
///     q_wins: usize,
/// }
///
/// impl Observer for WinCounter {
///     fn on_episode_end(&mut self, _episode: usize, report: &EpisodeReport) -> gridlearn::Result<()> {
///         if report.q_learning.won {
///             self.q_wins += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when the scheduler starts toward a new episode target.
    ///
    /// # Parameters
    ///
    /// * `target` - Total episode count at which this run completes
    fn on_training_start(&mut self, _target: usize) -> Result<()> {
        Ok(())
    }

    /// Called after all three strategies finish an episode.
    ///
    /// # Parameters
    ///
    /// * `episode` - 1-based total episode count after this episode
    /// * `report` - Per-strategy outcomes
    fn on_episode_end(&mut self, _episode: usize, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    /// Called the first time a learning strategy meets the convergence criteria.
    fn on_converged(&mut self, _kind: StrategyKind, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called at the end of each scheduling tick that ran episodes.
    fn on_tick_end(&mut self, _total_episodes: usize, _exploration_rate: f64) -> Result<()> {
        Ok(())
    }

    /// Called when the scheduler reaches its target.
    fn on_training_end(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }
}
