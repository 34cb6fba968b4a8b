//! CLI infrastructure for headless grid-world training
//!
//! This module provides the command-line interface for training the three
//! strategies and inspecting the tuned defaults for a grid size.

pub mod commands;
pub mod output;
