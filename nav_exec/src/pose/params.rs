//! Pose source parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseParams {
    /// Which pose source to use
    pub source: PoseSourceKind,

    pub sim: SimPoseParams,

    pub live: LivePoseParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimPoseParams {
    /// Minimum time between two samples in seconds
    pub sample_interval_s: f64,

    /// Standard deviation of the noise added to x and y
    pub position_noise_sd: f64,

    /// Standard deviation of the noise added to the heading, in radians
    pub heading_noise_sd: f64,

    /// Distance between the resampled points along the path. If `None` only the cell centres
    /// are used.
    pub interpolation_step: Option<f64>,

    /// Maximum number of samples to emit
    pub max_samples: usize,

    /// Seed for the noise, if `None` a seed is taken from the OS
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivePoseParams {
    /// Maximum time to wait for a datagram each cycle, in milliseconds
    pub recv_timeout_ms: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseSourceKind {
    Sim,
    Live,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PoseParams {
    fn default() -> Self {
        Self {
            source: PoseSourceKind::Sim,
            sim: SimPoseParams::default(),
            live: LivePoseParams::default(),
        }
    }
}

impl Default for SimPoseParams {
    fn default() -> Self {
        Self {
            sample_interval_s: 0.5,
            position_noise_sd: 0.8,
            heading_noise_sd: 0.01,
            interpolation_step: Some(10.0),
            max_samples: 10_000,
            seed: None,
        }
    }
}

impl Default for LivePoseParams {
    fn default() -> Self {
        Self { recv_timeout_ms: 10 }
    }
}

impl std::str::FromStr for PoseSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sim" => Ok(PoseSourceKind::Sim),
            "live" => Ok(PoseSourceKind::Live),
            _ => Err(format!("Expected \"sim\" or \"live\", found \"{}\"", s)),
        }
    }
}
