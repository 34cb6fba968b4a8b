//! Defaults command - Print the tuned hyperparameters for a grid size

use anyhow::{Result, ensure};
use clap::Parser;

use crate::{app::HyperParameters, pipeline::max_episodes_for};

#[derive(Parser, Debug)]
#[command(about = "Show the default hyperparameters for a grid size")]
pub struct DefaultsArgs {
    /// Grid side length
    #[arg(long, short = 'n', default_value_t = 4)]
    pub grid_size: usize,
}

pub fn execute(args: DefaultsArgs) -> Result<()> {
    ensure!(
        args.grid_size >= 2,
        "Grid size must be at least 2 (got {})",
        args.grid_size
    );
    let defaults = HyperParameters::for_grid_size(args.grid_size);
    let payload = serde_json::json!({
        "grid_size": args.grid_size,
        "max_episodes": max_episodes_for(args.grid_size),
        "hyperparameters": defaults,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
