//! # Agent
//!
//! Tracks the traveler's last known pose. Pose sources may skip cycles, so the agent keeps the
//! last good sample until a new one arrives, along with a bounded trail of recent positions.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use nalgebra::Point2;

use crate::pose::PoseSample;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default number of positions kept in the trail.
pub const DEFAULT_TRAIL_LEN: usize = 100;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Agent {
    pose: Option<PoseSample>,

    trail: VecDeque<Point2<f64>>,

    max_trail_len: usize,

    /// Number of consecutive updates without a new sample
    num_consec_missed: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Agent {
    pub fn new(max_trail_len: usize) -> Self {
        Self {
            pose: None,
            trail: VecDeque::with_capacity(max_trail_len),
            max_trail_len,
            num_consec_missed: 0,
        }
    }

    /// Update the agent with this cycle's sample, if there was one.
    ///
    /// Returns true if the pose changed.
    pub fn update(&mut self, sample: Option<PoseSample>) -> bool {
        match sample {
            Some(s) => {
                self.pose = Some(s);
                self.num_consec_missed = 0;

                if self.max_trail_len > 0 {
                    if self.trail.len() == self.max_trail_len {
                        self.trail.pop_front();
                    }
                    self.trail.push_back(s.position);
                }

                true
            }
            None => {
                self.num_consec_missed += 1;
                false
            }
        }
    }

    /// The last good pose, or `None` if no sample has been received yet.
    pub fn pose(&self) -> Option<&PoseSample> {
        self.pose.as_ref()
    }

    /// Recent positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.trail.iter()
    }

    pub fn num_consec_missed(&self) -> u64 {
        self.num_consec_missed
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_LEN)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
