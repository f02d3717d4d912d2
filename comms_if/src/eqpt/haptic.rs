//! # Haptic Equipment Commands
//!
//! Commands sent to the haptic (vibration) device. Two protocols are supported:
//!
//! - [`HapticCmd::Turn`] - a plain left/right cue.
//! - [`HapticCmd::Level`] - the legacy severity protocol, where the device is sent a level from 1
//!   to 3 describing how sharp the upcoming turn is.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The direction of a turn, from the traveller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    Right,
}

/// A command for the haptic device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HapticCmd {
    /// Cue a turn in the given direction
    Turn(TurnDirection),

    /// Cue a turn of the given severity level (1 to 3)
    Level(u8),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl std::fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnDirection::Left => write!(f, "Left"),
            TurnDirection::Right => write!(f, "Right"),
        }
    }
}
