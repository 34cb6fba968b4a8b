//! Small domain types shared across the crate: grid actions and strategy identifiers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Number of actions available in every state.
pub const NUM_ACTIONS: usize = 4;

/// A unit move on the grid.
///
/// The discriminant is the column index of the action in a value table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// All actions in table order.
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Convert a table column index into an action.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidAction`] if `index >= 4`.
    pub fn from_index(index: usize) -> Result<Self, crate::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(crate::Error::InvalidAction { index })
    }

    /// Column index of this action in a value table row.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Policy-arrow glyph for this action.
    pub const fn arrow(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Down => '↓',
            Action::Left => '←',
            Action::Right => '→',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        };
        f.write_str(label)
    }
}

/// Identifies one of the three strategies trained side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Off-policy TD control
    QLearning,
    /// On-policy TD control
    Sarsa,
    /// Greedy-only baseline that never updates its table
    Naive,
}

impl StrategyKind {
    /// All strategies, in the order they run within an episode.
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::QLearning,
        StrategyKind::Sarsa,
        StrategyKind::Naive,
    ];

    /// Position of this strategy in [`StrategyKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            StrategyKind::QLearning => 0,
            StrategyKind::Sarsa => 1,
            StrategyKind::Naive => 2,
        }
    }

    /// Whether this strategy updates its table (and is eligible for convergence).
    pub const fn learns(self) -> bool {
        !matches!(self, StrategyKind::Naive)
    }

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            StrategyKind::QLearning => "Q-Learning",
            StrategyKind::Sarsa => "SARSA",
            StrategyKind::Naive => "Naive",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StrategyKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" | "q-learning" | "qlearning" | "q_learning" => Ok(StrategyKind::QLearning),
            "sarsa" => Ok(StrategyKind::Sarsa),
            "naive" | "greedy" => Ok(StrategyKind::Naive),
            _ => Err(crate::Error::ParseStrategy {
                input: s.to_string(),
                expected: "q, sarsa, naive".to_string(),
            }),
        }
    }
}
