//! Ports (trait boundaries) for external dependencies.
//!
//! This module defines the interfaces between the training core and its
//! collaborators. The traits are owned by the domain and implemented by the
//! learners and observers.

pub mod learner;
pub mod observer;

pub use learner::Learner;
pub use observer::Observer;
