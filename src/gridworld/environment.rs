//! Deterministic transition and reward function over the grid

use serde::{Deserialize, Serialize};

use super::config::GridConfig;
use crate::types::Action;

/// Reward for stepping onto the goal cell.
pub const GOAL_REWARD: f64 = 1000.0;
/// Reward for stepping onto a hazard cell.
pub const HAZARD_REWARD: f64 = -100.0;
/// Cost of any other move, including bumping into a wall.
pub const STEP_REWARD: f64 = -1.0;

/// Result of applying an action in a state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub next_state: usize,
    pub reward: f64,
    pub terminal: bool,
}

/// Transition model for a fixed grid layout.
///
/// Holds no mutable state: the same `(state, action)` pair always yields the
/// same [`Transition`] for a given configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEnvironment {
    config: GridConfig,
}

impl GridEnvironment {
    pub fn new(config: GridConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn num_states(&self) -> usize {
        self.config.num_states()
    }

    /// Decode a state index into `(row, col)`.
    pub fn row_col(&self, state: usize) -> (usize, usize) {
        let side = self.config.side();
        (state / side, state % side)
    }

    /// Whether entering `state` ends an episode.
    pub fn is_terminal(&self, state: usize) -> bool {
        state == self.config.goal() || self.config.is_hazard(state)
    }

    /// Apply `action` in `state` as a clamped unit move.
    ///
    /// Moves into a wall leave the agent in place and still cost a step.
    pub fn transition(&self, state: usize, action: Action) -> Transition {
        let last = self.config.side() - 1;
        let (mut row, mut col) = self.row_col(state);

        match action {
            Action::Up => row = row.saturating_sub(1),
            Action::Down => row = (row + 1).min(last),
            Action::Left => col = col.saturating_sub(1),
            Action::Right => col = (col + 1).min(last),
        }

        let next_state = row * self.config.side() + col;
        let (reward, terminal) = if next_state == self.config.goal() {
            (GOAL_REWARD, true)
        } else if self.config.is_hazard(next_state) {
            (HAZARD_REWARD, true)
        } else {
            (STEP_REWARD, false)
        };

        Transition {
            next_state,
            reward,
            terminal,
        }
    }
}
