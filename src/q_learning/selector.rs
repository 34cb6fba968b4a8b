//! ε-greedy action selection with random tie-breaking

use rand::{Rng, seq::IndexedRandom};

use super::q_table::ValueTable;
use crate::types::Action;

/// Pick an action for `state` from `table` using an ε-greedy policy.
///
/// With probability `epsilon` a uniformly random action is returned.
/// Otherwise one of the highest-valued actions is chosen uniformly, so an
/// all-zero row behaves like a random walk rather than always moving up.
pub fn select_action<R: Rng>(
    state: usize,
    epsilon: f64,
    table: &ValueTable,
    rng: &mut R,
) -> Action {
    if rng.random::<f64>() < epsilon {
        Action::ALL[rng.random_range(0..Action::ALL.len())]
    } else {
        greedy_action(state, table, rng)
    }
}

/// Greedy choice among all actions tied for the maximum value.
pub fn greedy_action<R: Rng>(state: usize, table: &ValueTable, rng: &mut R) -> Action {
    let best = table.greedy_actions(state);
    // A NaN row yields no argmax; fall back to a uniform choice.
    best.choose(rng)
        .copied()
        .unwrap_or_else(|| Action::ALL[rng.random_range(0..Action::ALL.len())])
}
