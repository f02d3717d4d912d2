//! # Navigation Executable Parameters
//!
//! This module provides parameters for the navigation executable, loaded from `nav_exec.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{alert::AlertParams, grid::GridParams, pose::PoseParams, route::RouteParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavExecParams {
    /// Target period of one cycle of the main loop, in seconds
    pub cycle_period_s: f64,

    pub grid: GridParams,

    pub route: RouteParams,

    pub pose: PoseParams,

    pub alert: AlertParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.1,
            grid: GridParams::default(),
            route: RouteParams::default(),
            pose: PoseParams::default(),
            alert: AlertParams::default(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
