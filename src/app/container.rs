//! Factory for training sessions.
//!
//! The app owns process-wide defaults (currently the fallback seed) and wires
//! them into every session it creates.

use super::config::SessionConfig;
use crate::{Result, pipeline::TrainingSession};

/// Application entry point for creating sessions.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use gridlearn::app::{App, SessionConfig};
///
/// let app = App::new();
/// let session = app.create_session(SessionConfig::default().with_seed(42))?;
/// assert_eq!(session.total_episodes(), 0);
/// # Ok::<(), gridlearn::Error>(())
/// ```
///
/// ## Testing with a fixed seed
///
/// ```
/// use gridlearn::app::{App, SessionConfig};
///
/// let app = App::for_testing().with_default_seed(42).build();
/// let session = app.create_session(SessionConfig::default())?;
/// # Ok::<(), gridlearn::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct App {
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults (no default seed).
    pub fn new() -> Self {
        Self { default_seed: None }
    }

    /// Create a builder for constructing an app with custom defaults.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn default_seed(&self) -> Option<u64> {
        self.default_seed
    }

    /// Create a training session, applying the default seed when the
    /// configuration has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn create_session(&self, mut config: SessionConfig) -> Result<TrainingSession> {
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        TrainingSession::new(config)
    }
}

/// Builder for [`App`]
#[derive(Debug, Default)]
pub struct AppBuilder {
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the seed used by sessions whose configuration has none.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    pub fn build(self) -> App {
        App {
            default_seed: self.default_seed,
        }
    }
}
