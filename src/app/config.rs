//! Configuration types for training sessions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    gridworld::GridConfig,
    pipeline::{DEFAULT_TIME_SLICE, TrainingMode},
};

/// Default number of episodes added per batch-mode start.
pub const DEFAULT_EPISODES_PER_BATCH: usize = 200;

/// Learning and exploration parameters shared by all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperParameters {
    /// α, in (0, 1]
    pub learning_rate: f64,
    /// γ, in (0, 1]
    pub discount_factor: f64,
    /// Floor for the exploration rate, in [0, 1]
    pub min_exploration_rate: f64,
    /// Amount subtracted from the exploration rate after every episode
    pub exploration_decay: f64,
    /// Episodes added per start in batch mode
    pub episodes_per_batch: usize,
}

impl HyperParameters {
    /// Auto-tuned defaults for a grid of the given side.
    ///
    /// Larger grids learn faster with a higher learning rate, a longer
    /// horizon and slower exploration decay.
    pub fn for_grid_size(side: usize) -> Self {
        let (learning_rate, discount_factor, exploration_decay, min_exploration_rate) =
            if side >= 10 {
                (0.15, 0.995, 0.0001, 0.05)
            } else if side >= 7 {
                (0.1, 0.98, 0.0005, 0.02)
            } else {
                (0.1, 0.95, 0.001, 0.01)
            };
        Self {
            learning_rate,
            discount_factor,
            min_exploration_rate,
            exploration_decay,
            episodes_per_batch: DEFAULT_EPISODES_PER_BATCH,
        }
    }

    /// Check every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHyperParameter`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        check_unit_open("learning_rate", self.learning_rate)?;
        check_unit_open("discount_factor", self.discount_factor)?;
        check_unit_closed("min_exploration_rate", self.min_exploration_rate)?;
        check_unit_closed("exploration_decay", self.exploration_decay)?;
        if self.episodes_per_batch == 0 {
            return Err(Error::InvalidHyperParameter {
                name: "episodes_per_batch",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_min_exploration_rate(mut self, min_exploration_rate: f64) -> Self {
        self.min_exploration_rate = min_exploration_rate;
        self
    }

    pub fn with_exploration_decay(mut self, exploration_decay: f64) -> Self {
        self.exploration_decay = exploration_decay;
        self
    }

    pub fn with_episodes_per_batch(mut self, episodes_per_batch: usize) -> Self {
        self.episodes_per_batch = episodes_per_batch;
        self
    }
}

impl Default for HyperParameters {
    fn default() -> Self {
        Self::for_grid_size(crate::gridworld::config::DEFAULT_SIDE)
    }
}

fn check_unit_open(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidHyperParameter {
            name,
            value,
            reason: "must be in (0, 1]",
        })
    }
}

fn check_unit_closed(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidHyperParameter {
            name,
            value,
            reason: "must be in [0, 1]",
        })
    }
}

/// Configuration for creating a training session.
///
/// # Examples
///
/// ```
/// use gridlearn::app::SessionConfig;
/// use gridlearn::gridworld::GridConfig;
/// use gridlearn::pipeline::TrainingMode;
///
/// let config = SessionConfig::new(GridConfig::default())
///     .with_mode(TrainingMode::Batch)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Grid layout
    pub grid: GridConfig,
    /// Learning and exploration parameters
    pub hyperparameters: HyperParameters,
    /// One-shot or batch training
    #[serde(default)]
    pub mode: TrainingMode,
    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
    /// Wall-clock budget per tick
    #[serde(default = "default_time_slice", with = "duration_millis")]
    pub time_slice: Duration,
}

fn default_time_slice() -> Duration {
    DEFAULT_TIME_SLICE
}

impl SessionConfig {
    /// Create a configuration for `grid` with the tier defaults for its size.
    pub fn new(grid: GridConfig) -> Self {
        let hyperparameters = HyperParameters::for_grid_size(grid.side());
        Self {
            grid,
            hyperparameters,
            mode: TrainingMode::default(),
            seed: None,
            time_slice: DEFAULT_TIME_SLICE,
        }
    }

    pub fn with_hyperparameters(mut self, hyperparameters: HyperParameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    pub fn with_mode(mut self, mode: TrainingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_slice(mut self, time_slice: Duration) -> Self {
        self.time_slice = time_slice;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.hyperparameters.validate()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
