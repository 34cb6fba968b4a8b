//! Episode execution for one or all strategies

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    gridworld::GridEnvironment,
    ports::Learner,
    q_learning::greedy_action,
    types::{Action, StrategyKind},
};

/// Step cap for a grid of the given side length.
///
/// Keeps an untrained table from wandering forever.
pub fn max_steps_for(side: usize) -> usize {
    side * side * 2 + 100
}

/// Result of one strategy's episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// Sum of rewards collected
    pub total_reward: f64,
    /// Steps taken
    pub steps: usize,
    /// Return was positive, i.e. the goal was reached
    pub won: bool,
    /// Stopped at the step cap without reaching a terminal cell
    pub timed_out: bool,
}

/// Outcomes of one training step across all three strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub q_learning: EpisodeOutcome,
    pub sarsa: EpisodeOutcome,
    pub naive: EpisodeOutcome,
}

impl EpisodeReport {
    pub fn get(&self, kind: StrategyKind) -> &EpisodeOutcome {
        match kind {
            StrategyKind::QLearning => &self.q_learning,
            StrategyKind::Sarsa => &self.sarsa,
            StrategyKind::Naive => &self.naive,
        }
    }
}

/// Greedy walk of a learned policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
    /// `(state, action)` for every step taken
    pub path: Vec<(usize, Action)>,
    /// Cell the walk ended on
    pub final_state: usize,
    /// Whether the walk ended on the goal
    pub reached_goal: bool,
}

/// Drives complete episodes from the start cell
#[derive(Debug, Clone, Copy)]
pub struct EpisodeRunner {
    max_steps: usize,
}

impl EpisodeRunner {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }

    /// Runner with the default step cap for `env`'s grid.
    pub fn for_environment(env: &GridEnvironment) -> Self {
        Self::new(max_steps_for(env.config().side()))
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Run one episode for `learner`, updating its table in place.
    pub fn run(
        &self,
        learner: &mut dyn Learner,
        env: &GridEnvironment,
        epsilon: f64,
        rng: &mut StdRng,
    ) -> EpisodeOutcome {
        let mut state = env.config().start();
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut done = false;

        while !done && steps < self.max_steps {
            let action = learner.select_action(state, epsilon, rng);
            let transition = env.transition(state, action);
            learner.observe(state, action, &transition, epsilon, rng);
            total_reward += transition.reward;
            state = transition.next_state;
            done = transition.terminal;
            steps += 1;
        }
        learner.end_episode();

        let timed_out = !done;
        if timed_out {
            debug!(
                strategy = learner.name(),
                steps, total_reward, "episode hit step cap"
            );
        }

        EpisodeOutcome {
            total_reward,
            steps,
            won: total_reward > 0.0,
            timed_out,
        }
    }

    /// Run Q-learning, SARSA and naive episodes in that order under the same ε.
    pub fn run_all(
        &self,
        q_learning: &mut dyn Learner,
        sarsa: &mut dyn Learner,
        naive: &mut dyn Learner,
        env: &GridEnvironment,
        epsilon: f64,
        rng: &mut StdRng,
    ) -> EpisodeReport {
        EpisodeReport {
            q_learning: self.run(q_learning, env, epsilon, rng),
            sarsa: self.run(sarsa, env, epsilon, rng),
            naive: self.run(naive, env, epsilon, rng),
        }
    }

    /// Follow the greedy policy of `learner` from the start cell.
    ///
    /// Never updates the table. Ties are broken randomly, as in training.
    pub fn greedy_rollout(
        &self,
        learner: &dyn Learner,
        env: &GridEnvironment,
        rng: &mut StdRng,
    ) -> Rollout {
        let mut state = env.config().start();
        let mut path = Vec::new();

        while !env.is_terminal(state) && path.len() < self.max_steps {
            let action = greedy_action(state, learner.table(), rng);
            path.push((state, action));
            state = env.transition(state, action).next_state;
        }

        Rollout {
            path,
            final_state: state,
            reached_goal: state == env.config().goal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{
        gridworld::GridConfig,
        q_learning::{NaiveLearner, QLearner, SarsaLearner},
    };

    #[test]
    fn step_cap_formula() {
        assert_eq!(max_steps_for(4), 132);
        assert_eq!(max_steps_for(10), 300);
    }

    #[test]
    fn episodes_stop_at_terminal_or_cap() {
        let env = GridEnvironment::new(GridConfig::default());
        let runner = EpisodeRunner::for_environment(&env);
        let mut learner = QLearner::new(16, 0.1, 0.95);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..50 {
            let outcome = runner.run(&mut learner, &env, 1.0, &mut rng);
            assert!(outcome.steps >= 1 && outcome.steps <= runner.max_steps());
            assert_eq!(outcome.won, outcome.total_reward > 0.0);
            if outcome.timed_out {
                assert_eq!(outcome.steps, runner.max_steps());
                assert_eq!(outcome.total_reward, -(runner.max_steps() as f64));
            }
        }
    }

    #[test]
    fn tiny_cap_times_out_without_terminal_adjustment() {
        let env = GridEnvironment::new(GridConfig::empty(5).unwrap());
        let runner = EpisodeRunner::new(2);
        let mut learner = NaiveLearner::new(25);
        let mut rng = StdRng::seed_from_u64(9);
        let outcome = runner.run(&mut learner, &env, 0.0, &mut rng);
        assert!(outcome.timed_out);
        assert_eq!(outcome.steps, 2);
        assert_eq!(outcome.total_reward, -2.0);
        assert!(!outcome.won);
    }

    #[test]
    fn run_all_leaves_naive_table_untouched() {
        let env = GridEnvironment::new(GridConfig::default());
        let runner = EpisodeRunner::for_environment(&env);
        let mut q = QLearner::new(16, 0.1, 0.95);
        let mut sarsa = SarsaLearner::new(16, 0.1, 0.95);
        let mut naive = NaiveLearner::new(16);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..20 {
            runner.run_all(&mut q, &mut sarsa, &mut naive, &env, 0.8, &mut rng);
        }
        assert!(!q.table().is_zero());
        assert!(!sarsa.table().is_zero());
        assert!(naive.table().is_zero());
    }

    #[test]
    fn rollout_follows_learned_values() {
        let env = GridEnvironment::new(GridConfig::empty(3).unwrap());
        let runner = EpisodeRunner::for_environment(&env);
        let mut learner = QLearner::new(9, 0.5, 0.9);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..300 {
            runner.run(&mut learner, &env, 0.3, &mut rng);
        }
        let rollout = runner.greedy_rollout(&learner, &env, &mut rng);
        assert!(rollout.reached_goal);
        assert_eq!(rollout.final_state, 8);
        // Shortest path on an empty 3x3 grid is four moves
        assert!((4..=6).contains(&rollout.path.len()));
    }
}
