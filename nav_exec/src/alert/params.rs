//! Turn alert parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::haptic::{HapticCmd, TurnDirection};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest gap between consecutive pose samples, as a fraction of `alert_distance`, for which
/// every turn is guaranteed a sample inside the trigger radius before the turn point.
pub const MAX_SAMPLE_SPACING_RATIO: f64 = 0.5;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertParams {
    /// Maximum distance from the turn point at which an alert may be triggered
    pub alert_distance: f64,

    /// Maximum difference between the traveler's heading and the bearing to the turn point, in
    /// degrees
    pub direction_alignment_deg: f64,

    /// How long an alert stays active after triggering, in seconds
    pub display_duration_s: f64,

    /// Which command protocol the haptic device uses
    pub profile: AlertProfile,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertProfile {
    /// Send the direction of the turn
    Binary,

    /// Send a severity level from the magnitude of the turn
    Graded,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AlertProfile {
    /// Build the command for a turn, or `None` if the turn is too shallow to send.
    pub fn command(&self, direction: TurnDirection, angle_deg: f64) -> Option<HapticCmd> {
        match self {
            AlertProfile::Binary => Some(HapticCmd::Turn(direction)),
            AlertProfile::Graded => match graded_level(angle_deg) {
                0 => None,
                l => Some(HapticCmd::Level(l)),
            },
        }
    }
}

impl AlertParams {
    /// Check that poses arriving up to `spacing` apart will be seen inside the trigger radius on
    /// the approach to a turn.
    ///
    /// A stream coarser than this can step straight from outside `alert_distance` onto the turn
    /// point, where the bearing is meaningless, and since turns are consumed in order every
    /// later turn is then missed too.
    pub fn supports_sample_spacing(&self, spacing: f64) -> bool {
        spacing <= self.alert_distance * MAX_SAMPLE_SPACING_RATIO
    }
}

impl Default for AlertParams {
    fn default() -> Self {
        Self {
            alert_distance: 60.0,
            direction_alignment_deg: 30.0,
            display_duration_s: 2.0,
            profile: AlertProfile::Binary,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Severity level of a turn of the given magnitude.
///
/// | Angle (deg)  | Level |
/// |--------------|-------|
/// | below 10     | 0     |
/// | 10 to 60     | 1     |
/// | 60 to 120    | 2     |
/// | 120 to 180   | 3     |
///
/// Upper bounds are inclusive.
pub fn graded_level(angle_deg: f64) -> u8 {
    let a = angle_deg.abs();

    if a < 10.0 {
        0
    } else if a <= 60.0 {
        1
    } else if a <= 120.0 {
        2
    } else {
        3
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
