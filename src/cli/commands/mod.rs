//! Subcommand implementations

pub mod defaults;
pub mod train;
