//! Learner port - abstraction over the tabular strategies
//!
//! This port defines the interface the episode runner drives, allowing the
//! same loop to run:
//! - Off-policy TD control (Q-learning)
//! - On-policy TD control (SARSA)
//! - A non-learning greedy baseline

use rand::rngs::StdRng;

use crate::{
    gridworld::Transition,
    q_learning::ValueTable,
    types::{Action, StrategyKind},
};

/// Learner trait - Unified interface for every tabular strategy
///
/// # Design Philosophy
///
/// This trait represents a **port** in hexagonal architecture. The episode
/// runner owns the loop (select, step, observe, accumulate) and each strategy
/// plugs its own selection and update rule into it.
///
/// # Step Sequence
///
/// For every step of an episode the runner calls:
/// 1. `select_action(state, epsilon, rng)`
/// 2. `GridEnvironment::transition(state, action)`
/// 3. `observe(state, action, transition, epsilon, rng)`
///
/// and calls `end_episode()` once the episode stops, whether it reached a
/// terminal cell or hit the step cap.
///
/// # Examples
///
/// ```no_run
/// use gridlearn::{ports::Learner, q_learning::QLearner};
///
/// fn describe(learner: &dyn Learner) -> String {
///     format!("{} over {} states", learner.name(), learner.table().num_states())
/// }
///
/// let learner = QLearner::new(16, 0.1, 0.95);
/// println!("{}", describe(&learner));
/// ```
pub trait Learner: Send {
    /// Which strategy this learner implements.
    fn kind(&self) -> StrategyKind;

    /// Get the learner's name.
    fn name(&self) -> &str {
        self.kind().display_name()
    }

    /// The learner's value table.
    fn table(&self) -> &ValueTable;

    /// Choose the action to take in `state`.
    fn select_action(&mut self, state: usize, epsilon: f64, rng: &mut StdRng) -> Action;

    /// Learn from one observed transition.
    ///
    /// # Default Implementation
    ///
    /// Does nothing, suitable for non-learning baselines.
    fn observe(
        &mut self,
        _state: usize,
        _action: Action,
        _transition: &Transition,
        _epsilon: f64,
        _rng: &mut StdRng,
    ) {
    }

    /// Drop any per-episode state.
    fn end_episode(&mut self) {}

    /// Replace α and γ without touching learned values.
    fn set_learning_params(&mut self, learning_rate: f64, discount_factor: f64);

    /// Discard everything learned and size the table for `num_states` states.
    fn reset(&mut self, num_states: usize);
}
