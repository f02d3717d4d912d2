//! # Route
//!
//! Shortest route planning over a [`Grid`](crate::grid::Grid) and extraction of the turns the
//! traveler has to make along it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod planner;
mod turns;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::haptic::TurnDirection;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::grid::GridCoord;

pub use planner::{PlanReport, RoutePlanner};
pub use turns::extract_turns;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteParams {
    /// Minimum change of heading, in degrees, for a bend in the path to count as a turn
    pub turn_angle_threshold_deg: f64,
}

/// A bend in the path the traveler should be alerted about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnPoint {
    /// Index of the turn cell in the path
    pub path_index: usize,

    pub coord: GridCoord,

    /// Centre of the turn cell in continuous space
    pub position: Point2<f64>,

    pub direction: TurnDirection,

    /// Magnitude of the heading change in degrees
    pub angle_deg: f64,
}

/// Output of the planner.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Cells from start to end inclusive
    pub path: Vec<GridCoord>,

    /// Turns along the path, in path order
    pub turn_points: Vec<TurnPoint>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("There is no route between {0:?} and {1:?}")]
    NoRoute(GridCoord, GridCoord),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            turn_angle_threshold_deg: 10.0,
        }
    }
}
