//! Grid parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    /// Number of columns in the grid
    pub width: usize,

    /// Number of rows in the grid
    pub height: usize,

    /// Side length of a cell in continuous space units
    pub cell_size: f64,

    /// Which generator to use when no valid grid file exists
    pub generator: GeneratorKind,

    /// Number of times the random generator may retry before giving up
    pub max_generation_attempts: usize,

    /// Seed for the random generator, if `None` a seed is taken from the OS
    pub seed: Option<u64>,

    /// Path of the persisted grid, relative to the software root
    pub grid_file: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// Randomised spanning tree over the whole grid
    Random,

    /// Deterministic corridor with two turns
    SimpleRoute,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for GridParams {
    fn default() -> Self {
        Self {
            width: 15,
            height: 10,
            cell_size: 40.0,
            generator: GeneratorKind::Random,
            max_generation_attempts: 10,
            seed: None,
            grid_file: "data/grid.json".into(),
        }
    }
}
