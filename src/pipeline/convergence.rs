//! One-shot convergence detection over the rolling window

use serde::{Deserialize, Serialize};

use super::history::RollingHistory;
use crate::gridworld::GOAL_REWARD;

/// Win rate that must be exceeded before a strategy counts as converged.
pub const WIN_RATE_THRESHOLD: f64 = 0.9;

/// Fraction of the perfect-run score the average reward must exceed.
pub const REWARD_FRACTION: f64 = 0.8;

/// Best achievable return, counting `2 × side` as the minimum step count.
pub fn perfect_run_score(side: usize) -> f64 {
    GOAL_REWARD - (2 * side) as f64
}

/// Average reward a strategy must exceed to count as converged.
pub fn convergence_threshold(side: usize) -> f64 {
    perfect_run_score(side) * REWARD_FRACTION
}

/// Records the first episode at which a strategy's window looks near-optimal.
///
/// Once set the marker never changes, even if later windows regress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceTracker {
    converged_at: Option<usize>,
}

impl ConvergenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converged_at(&self) -> Option<usize> {
        self.converged_at
    }

    /// Evaluate `history` at `episode`.
    ///
    /// Returns `Some(episode)` only on the call that sets the marker.
    pub fn check(&mut self, history: &RollingHistory, episode: usize, side: usize) -> Option<usize> {
        if self.converged_at.is_some() {
            return None;
        }
        if history.win_rate() > WIN_RATE_THRESHOLD
            && history.average_reward() > convergence_threshold(side)
        {
            self.converged_at = Some(episode);
            return self.converged_at;
        }
        None
    }

    pub fn reset(&mut self) {
        self.converged_at = None;
    }
}
