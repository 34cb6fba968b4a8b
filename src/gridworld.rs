//! Grid world: layout configuration and the deterministic transition model

pub mod config;
pub mod environment;

pub use config::{DEFAULT_HAZARDS, GridConfig};
pub use environment::{GOAL_REWARD, GridEnvironment, HAZARD_REWARD, STEP_REWARD, Transition};
