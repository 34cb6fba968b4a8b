//! Grid-world tabular reinforcement learning
//!
//! This crate provides:
//! - A deterministic grid environment with a start cell, a goal and hazards
//! - Q-learning, SARSA and a greedy-only baseline trained side by side
//! - A pausable, resumable training session driven by host ticks
//! - Rolling statistics and one-shot convergence detection
//! - A command-line front end for headless training runs

pub mod app;
pub mod cli;
pub mod error;
pub mod gridworld;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use app::{App, HyperParameters, SessionConfig};
pub use error::{Error, Result};
pub use gridworld::{GridConfig, GridEnvironment, Transition};
pub use pipeline::{SchedulerState, StartOutcome, TrainingMode, TrainingSession};
pub use types::{Action, StrategyKind};
