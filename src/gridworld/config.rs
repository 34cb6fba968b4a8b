//! Grid layout: side length, fixed endpoints and hazard cells

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Hazard layout used by the default 4×4 grid.
pub const DEFAULT_HAZARDS: [usize; 4] = [5, 7, 11, 12];

/// Default grid side length.
pub const DEFAULT_SIDE: usize = 4;

/// Validated grid layout.
///
/// The start cell is always index 0 and the goal is always the last cell.
/// Hazards never overlap either endpoint; construction fails otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridConfig", into = "RawGridConfig")]
pub struct GridConfig {
    side: usize,
    hazards: BTreeSet<usize>,
}

#[derive(Serialize, Deserialize)]
struct RawGridConfig {
    side: usize,
    #[serde(default)]
    hazards: Vec<usize>,
}

impl TryFrom<RawGridConfig> for GridConfig {
    type Error = Error;

    fn try_from(raw: RawGridConfig) -> Result<Self> {
        GridConfig::new(raw.side, raw.hazards)
    }
}

impl From<GridConfig> for RawGridConfig {
    fn from(config: GridConfig) -> Self {
        Self {
            side: config.side,
            hazards: config.hazards.into_iter().collect(),
        }
    }
}

impl GridConfig {
    /// Create a grid configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidGridSize`] if `side < 2`
    /// - [`Error::HazardOutOfBounds`] if a hazard index is not a cell
    /// - [`Error::HazardOnEndpoint`] if a hazard is the start or goal cell
    pub fn new<I>(side: usize, hazards: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        if side < 2 {
            return Err(Error::InvalidGridSize { side });
        }
        let hazards = hazards.into_iter().collect::<BTreeSet<_>>();
        Self::validate_hazards(side, &hazards)?;
        Ok(Self { side, hazards })
    }

    /// Grid of the given size with no hazards.
    pub fn empty(side: usize) -> Result<Self> {
        Self::new(side, [])
    }

    fn validate_hazards(side: usize, hazards: &BTreeSet<usize>) -> Result<()> {
        let num_states = side * side;
        for &index in hazards {
            if index >= num_states {
                return Err(Error::HazardOutOfBounds { index, num_states });
            }
            if index == 0 {
                return Err(Error::HazardOnEndpoint {
                    index,
                    endpoint: "start",
                });
            }
            if index == num_states - 1 {
                return Err(Error::HazardOnEndpoint {
                    index,
                    endpoint: "goal",
                });
            }
        }
        Ok(())
    }

    /// Same grid size with a different hazard set.
    pub fn with_hazards<I>(&self, hazards: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        Self::new(self.side, hazards)
    }

    /// Same grid size with `index` added to or removed from the hazard set.
    pub fn toggled(&self, index: usize) -> Result<Self> {
        let mut hazards = self.hazards.clone();
        if !hazards.remove(&index) {
            hazards.insert(index);
        }
        Self::new(self.side, hazards)
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn num_states(&self) -> usize {
        self.side * self.side
    }

    pub fn start(&self) -> usize {
        0
    }

    pub fn goal(&self) -> usize {
        self.num_states() - 1
    }

    pub fn hazards(&self) -> &BTreeSet<usize> {
        &self.hazards
    }

    pub fn is_hazard(&self, state: usize) -> bool {
        self.hazards.contains(&state)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            side: DEFAULT_SIDE,
            hazards: DEFAULT_HAZARDS.into_iter().collect(),
        }
    }
}
