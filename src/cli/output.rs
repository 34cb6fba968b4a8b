//! Output formatting for CLI

use crate::{gridworld::GridConfig, types::Action};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Render a greedy policy as one string per grid row.
///
/// The goal shows as `G`, hazards as `H`, cells without a preferred action
/// as `?` and everything else as the action's arrow.
pub fn policy_rows(grid: &GridConfig, policy: &[Option<Action>]) -> Vec<String> {
    policy
        .chunks(grid.side())
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(|(col, action)| cell_glyph(grid, row * grid.side() + col, *action).to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn cell_glyph(grid: &GridConfig, state: usize, action: Option<Action>) -> char {
    if state == grid.goal() {
        'G'
    } else if grid.is_hazard(state) {
        'H'
    } else {
        action.map_or('?', Action::arrow)
    }
}
