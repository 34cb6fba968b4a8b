//! Bounded rolling window of recent episode outcomes

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::episode::EpisodeOutcome;

/// Number of recent episodes kept per strategy.
pub const HISTORY_CAPACITY: usize = 200;

/// FIFO window of reward and step counts for one strategy.
///
/// Only used for reporting and convergence checks; it never feeds back into
/// learning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingHistory {
    capacity: usize,
    rewards: VecDeque<f64>,
    steps: VecDeque<usize>,
}

impl RollingHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            rewards: VecDeque::with_capacity(capacity + 1),
            steps: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append an outcome, evicting the oldest entry once over capacity.
    pub fn push(&mut self, outcome: &EpisodeOutcome) {
        self.rewards.push_back(outcome.total_reward);
        self.steps.push_back(outcome.steps);
        if self.rewards.len() > self.capacity {
            self.rewards.pop_front();
            self.steps.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rewards, oldest first
    pub fn rewards(&self) -> impl Iterator<Item = f64> + '_ {
        self.rewards.iter().copied()
    }

    /// Step counts, oldest first
    pub fn steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.steps.iter().copied()
    }

    pub fn average_reward(&self) -> f64 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.rewards.iter().sum::<f64>() / self.rewards.len() as f64
        }
    }

    pub fn average_steps(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.steps.iter().sum::<usize>() as f64 / self.steps.len() as f64
        }
    }

    /// Fraction of entries with positive reward
    pub fn win_rate(&self) -> f64 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.rewards.iter().filter(|&&r| r > 0.0).count() as f64 / self.rewards.len() as f64
        }
    }

    pub fn clear(&mut self) {
        self.rewards.clear();
        self.steps.clear();
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(total_reward: f64, steps: usize) -> EpisodeOutcome {
        EpisodeOutcome {
            total_reward,
            steps,
            won: total_reward > 0.0,
            timed_out: false,
        }
    }

    #[test]
    fn empty_history_reports_zero() {
        let history = RollingHistory::new();
        assert_eq!(history.average_reward(), 0.0);
        assert_eq!(history.average_steps(), 0.0);
        assert_eq!(history.win_rate(), 0.0);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut history = RollingHistory::new();
        for i in 0..HISTORY_CAPACITY + 50 {
            history.push(&outcome(i as f64, i));
            assert!(history.len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.rewards().next(), Some(50.0));
        assert_eq!(history.steps().last(), Some(HISTORY_CAPACITY + 49));
    }

    #[test]
    fn statistics_over_window() {
        let mut history = RollingHistory::with_capacity(4);
        history.push(&outcome(-100.0, 3));
        history.push(&outcome(994.0, 6));
        history.push(&outcome(992.0, 8));
        history.push(&outcome(-5.0, 7));
        assert_eq!(history.win_rate(), 0.5);
        assert!((history.average_reward() - 470.25).abs() < 1e-9);
        assert_eq!(history.average_steps(), 6.0);

        history.push(&outcome(990.0, 10));
        assert_eq!(history.win_rate(), 0.75);
    }
}
