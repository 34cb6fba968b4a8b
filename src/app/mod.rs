//! Application layer: session configuration and the session factory.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           Application Layer (app)           │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  App (session factory, defaults)     │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ creates                    │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  TrainingSession (pipeline)          │   │
//! │  │  - scheduler, histories, ε schedule  │   │
//! │  └──────────────┬───────────────────────┘   │
//! │                 │ drives                     │
//! │                 ▼                            │
//! │  ┌──────────────────────────────────────┐   │
//! │  │  Domain Ports (ports)                │   │
//! │  │  - Learner: QLearner, SarsaLearner,  │   │
//! │  │    NaiveLearner                      │   │
//! │  │  - Observer: progress, metrics, JSONL│   │
//! │  └──────────────────────────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use gridlearn::app::{App, SessionConfig};
//! use gridlearn::pipeline::SchedulerState;
//!
//! let app = App::for_testing().with_default_seed(42).build();
//! let mut session = app.create_session(SessionConfig::default())?;
//! session.start()?;
//! let state = session.tick()?;
//! assert!(matches!(state, SchedulerState::Running | SchedulerState::Completed));
//! # Ok::<(), gridlearn::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::{DEFAULT_EPISODES_PER_BATCH, HyperParameters, SessionConfig};
pub use container::{App, AppBuilder};
