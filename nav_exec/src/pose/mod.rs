//! # Pose Stream
//!
//! Sources of position and heading samples for the traveler. A source is polled once per cycle
//! and may or may not have a new sample. Gaps are normal, see [`Agent`](crate::agent::Agent) for
//! how they are bridged.
//!
//! Two sources are provided:
//!
//! - [`SimPoseSource`] - walks along the planned path adding Gaussian noise.
//! - [`LivePoseSource`] - receives pose datagrams from an external producer.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod live;
mod params;
mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::NetError;
use nalgebra::Point2;
use serde::Serialize;

pub use live::LivePoseSource;
pub use params::{LivePoseParams, PoseParams, PoseSourceKind, SimPoseParams};
pub use sim::SimPoseSource;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single pose sample in continuous space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseSample {
    pub position: Point2<f64>,

    /// Heading in radians, `atan2(dy, dx)` in the continuous frame
    pub heading_rad: f64,

    /// Time the sample arrived, in session seconds
    pub time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A stream of pose samples.
pub trait PoseSource {
    /// Poll the source for a new sample, given the current time in seconds.
    ///
    /// Returns `None` if no new sample is due or available.
    fn next_pose(&mut self, now_s: f64) -> Option<PoseSample>;

    /// Returns true once the source will never produce another sample.
    fn is_exhausted(&self) -> bool {
        false
    }
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoseSourceError {
    #[error("Cannot simulate poses along an empty path")]
    EmptyPath,

    #[error("Invalid pose source parameter: {0}")]
    InvalidParams(String),

    #[error("Could not open the pose socket: {0}")]
    NetError(NetError),
}
