//! Dense value table for temporal difference learning

use serde::{Deserialize, Serialize};

use crate::types::{Action, NUM_ACTIONS};

/// Value table mapping each state to one value per action
///
/// Rows are indexed by state, columns by [`Action::index`]. The table is
/// created zeroed and never grows or shrinks afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    /// Q-values: values[state][action]
    values: Vec<[f64; NUM_ACTIONS]>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl ValueTable {
    /// Create a zeroed table covering `num_states` states
    pub fn new(num_states: usize, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            values: vec![[0.0; NUM_ACTIONS]; num_states],
            learning_rate,
            discount_factor,
        }
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: usize, action: Action) -> f64 {
        self.values[state][action.index()]
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: usize, action: Action, value: f64) {
        self.values[state][action.index()] = value;
    }

    /// All action values for a state, in [`Action::ALL`] order
    pub fn row(&self, state: usize) -> &[f64; NUM_ACTIONS] {
        &self.values[state]
    }

    /// All rows, indexed by state
    pub fn rows(&self) -> &[[f64; NUM_ACTIONS]] {
        &self.values
    }

    pub fn num_states(&self) -> usize {
        self.values.len()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Get maximum Q-value in a state
    pub fn max_value(&self, state: usize) -> f64 {
        self.values[state]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Every action whose value equals the state's maximum
    pub fn greedy_actions(&self, state: usize) -> Vec<Action> {
        let max = self.max_value(state);
        Action::ALL
            .into_iter()
            .filter(|&action| self.get(state, action) == max)
            .collect()
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    pub fn q_learning_update(&mut self, state: usize, action: Action, reward: f64, next_state: usize) {
        let max_next_q = self.max_value(next_state);
        self.apply_td(state, action, reward + self.discount_factor * max_next_q);
    }

    /// SARSA update: on-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') - Q(s,a)]
    pub fn sarsa_update(
        &mut self,
        state: usize,
        action: Action,
        reward: f64,
        next_state: usize,
        next_action: Action,
    ) {
        let next_q = self.get(next_state, next_action);
        self.apply_td(state, action, reward + self.discount_factor * next_q);
    }

    fn apply_td(&mut self, state: usize, action: Action, td_target: f64) {
        let current_q = self.get(state, action);
        let td_error = td_target - current_q;
        self.set(state, action, current_q + self.learning_rate * td_error);
    }

    /// Update α and γ without touching learned values
    pub fn set_learning_params(&mut self, learning_rate: f64, discount_factor: f64) {
        self.learning_rate = learning_rate;
        self.discount_factor = discount_factor;
    }

    /// Zero every value
    pub fn reset(&mut self) {
        self.values.fill([0.0; NUM_ACTIONS]);
    }

    /// True when no value has moved away from zero
    pub fn is_zero(&self) -> bool {
        self.values.iter().flatten().all(|&v| v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_initialization() {
        let table = ValueTable::new(16, 0.1, 0.95);
        assert_eq!(table.num_states(), 16);
        assert!(table.is_zero());
        assert_eq!(table.greedy_actions(3), Action::ALL.to_vec());
    }

    #[test]
    fn test_max_and_greedy() {
        let mut table = ValueTable::new(4, 0.1, 0.95);
        table.set(2, Action::Up, 0.5);
        table.set(2, Action::Left, 1.5);
        table.set(2, Action::Right, 1.5);

        assert_eq!(table.max_value(2), 1.5);
        assert_eq!(table.greedy_actions(2), vec![Action::Left, Action::Right]);
    }

    #[test]
    fn test_q_learning_update() {
        let mut table = ValueTable::new(4, 0.5, 0.99);
        table.set(1, Action::Down, 1.0);
        table.set(1, Action::Right, 2.0);

        table.q_learning_update(0, Action::Right, 0.0, 1);

        // Q(0,right) = 0.0 + 0.5 * (0.0 + 0.99 * 2.0 - 0.0) = 0.99
        assert!((table.get(0, Action::Right) - 0.99).abs() < 1e-9);
    }

    #[test]
    fn test_sarsa_update_uses_chosen_action() {
        let mut table = ValueTable::new(4, 0.5, 0.99);
        table.set(1, Action::Down, 1.5);
        table.set(1, Action::Right, 3.0);

        table.sarsa_update(0, Action::Right, -1.0, 1, Action::Down);

        // Q(0,right) = 0.0 + 0.5 * (-1.0 + 0.99 * 1.5 - 0.0) = 0.2425
        assert!((table.get(0, Action::Right) - 0.2425).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_shape() {
        let mut table = ValueTable::new(9, 0.1, 0.95);
        table.set(4, Action::Up, 7.0);
        table.reset();
        assert_eq!(table.num_states(), 9);
        assert!(table.is_zero());
    }
}
