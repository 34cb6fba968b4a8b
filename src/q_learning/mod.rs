//! Q-learning and SARSA temporal difference learning
//!
//! This module implements the tabular learners trained side by side on the
//! grid world, plus the ε-greedy selector they share.
//!
//! ## Algorithms
//!
//! - **Q-learning**: Off-policy TD control that learns optimal Q* values
//! - **SARSA**: On-policy TD control that learns Q^π for the followed policy
//! - **Naive**: Greedy-only baseline that never updates its table
//!
//! ## Key Differences
//!
//! | Aspect | Q-learning | SARSA |
//! |--------|------------|-------|
//! | Policy | Off-policy (learns Q*) | On-policy (learns Q^π) |
//! | Update | Uses max_a Q(s',a') | Uses actual Q(s',a') |
//! | Exploration | Can be reckless near hazards | More conservative |
//! | Convergence | To optimal policy | To followed policy |
//!
//! ## Usage Example
//!
//! ```no_run
//! use gridlearn::q_learning::{QLearner, SarsaLearner};
//!
//! // 4x4 grid: 16 states
//! let q_agent = QLearner::new(
//!     16,   // num_states
//!     0.1,  // learning_rate
//!     0.95, // discount_factor
//! );
//! let sarsa_agent = SarsaLearner::new(16, 0.1, 0.95);
//! ```

pub mod agent;
pub mod q_table;
pub mod selector;

// Public re-exports
pub use agent::{NaiveLearner, QLearner, SarsaLearner};
pub use q_table::ValueTable;
pub use selector::{greedy_action, select_action};
