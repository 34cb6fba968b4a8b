//! Q-learning, SARSA and naive greedy learners
//!
//! Each learner owns exactly one [`ValueTable`]; nothing else writes to it.

use rand::rngs::StdRng;

use super::{
    q_table::ValueTable,
    selector::{greedy_action, select_action},
};
use crate::{
    gridworld::Transition,
    ports::Learner,
    types::{Action, StrategyKind},
};

/// Q-learning learner (off-policy TD control)
///
/// Learns the optimal Q* function by always updating toward the maximum
/// next-state value, regardless of the action actually taken next.
#[derive(Debug, Clone)]
pub struct QLearner {
    table: ValueTable,
}

impl QLearner {
    pub fn new(num_states: usize, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            table: ValueTable::new(num_states, learning_rate, discount_factor),
        }
    }
}

impl Learner for QLearner {
    fn kind(&self) -> StrategyKind {
        StrategyKind::QLearning
    }

    fn table(&self) -> &ValueTable {
        &self.table
    }

    fn select_action(&mut self, state: usize, epsilon: f64, rng: &mut StdRng) -> Action {
        select_action(state, epsilon, &self.table, rng)
    }

    fn observe(
        &mut self,
        state: usize,
        action: Action,
        transition: &Transition,
        _epsilon: f64,
        _rng: &mut StdRng,
    ) {
        self.table
            .q_learning_update(state, action, transition.reward, transition.next_state);
    }

    fn set_learning_params(&mut self, learning_rate: f64, discount_factor: f64) {
        self.table.set_learning_params(learning_rate, discount_factor);
    }

    fn reset(&mut self, num_states: usize) {
        self.table = ValueTable::new(
            num_states,
            self.table.learning_rate(),
            self.table.discount_factor(),
        );
    }
}

/// SARSA learner (on-policy TD control)
///
/// Learns Q^π for the ε-greedy policy it follows. The next action is chosen
/// before the update and then carried into the next step, so each step
/// selects exactly one action.
#[derive(Debug, Clone)]
pub struct SarsaLearner {
    table: ValueTable,
    pending_action: Option<Action>,
}

impl SarsaLearner {
    pub fn new(num_states: usize, learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            table: ValueTable::new(num_states, learning_rate, discount_factor),
            pending_action: None,
        }
    }
}

impl Learner for SarsaLearner {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sarsa
    }

    fn table(&self) -> &ValueTable {
        &self.table
    }

    fn select_action(&mut self, state: usize, epsilon: f64, rng: &mut StdRng) -> Action {
        match self.pending_action.take() {
            Some(action) => action,
            None => select_action(state, epsilon, &self.table, rng),
        }
    }

    fn observe(
        &mut self,
        state: usize,
        action: Action,
        transition: &Transition,
        epsilon: f64,
        rng: &mut StdRng,
    ) {
        let next_action = select_action(transition.next_state, epsilon, &self.table, rng);
        self.table.sarsa_update(
            state,
            action,
            transition.reward,
            transition.next_state,
            next_action,
        );
        self.pending_action = Some(next_action);
    }

    fn end_episode(&mut self) {
        self.pending_action = None;
    }

    fn set_learning_params(&mut self, learning_rate: f64, discount_factor: f64) {
        self.table.set_learning_params(learning_rate, discount_factor);
    }

    fn reset(&mut self, num_states: usize) {
        self.pending_action = None;
        self.table = ValueTable::new(
            num_states,
            self.table.learning_rate(),
            self.table.discount_factor(),
        );
    }
}

/// Greedy-only baseline
///
/// Always acts greedily on a table that is never updated, so every choice is
/// a random tie-break. Measures how a non-learning agent fares on the layout.
#[derive(Debug, Clone)]
pub struct NaiveLearner {
    table: ValueTable,
}

impl NaiveLearner {
    pub fn new(num_states: usize) -> Self {
        Self {
            table: ValueTable::new(num_states, 0.0, 0.0),
        }
    }
}

impl Learner for NaiveLearner {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Naive
    }

    fn table(&self) -> &ValueTable {
        &self.table
    }

    fn select_action(&mut self, state: usize, _epsilon: f64, rng: &mut StdRng) -> Action {
        greedy_action(state, &self.table, rng)
    }

    fn set_learning_params(&mut self, _learning_rate: f64, _discount_factor: f64) {}

    fn reset(&mut self, num_states: usize) {
        self.table = ValueTable::new(num_states, 0.0, 0.0);
    }
}
