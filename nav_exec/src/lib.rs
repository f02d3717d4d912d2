//! # Navigation library.
//!
//! This library allows other crates in the workspace (and the integration tests) to access items
//! defined inside the navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Agent - last known pose of the traveler and its recent trail
pub mod agent;

/// Turn alert engine - decides when to cue the traveler about the next turn
pub mod alert;

/// Data store - per cycle state of the executable
pub mod data_store;

/// Grid model - the routable grid, its generators and persistence
pub mod grid;

/// Haptic client - delivers commands to the vibration device
pub mod haptic_client;

/// Executable parameters
pub mod params;

/// Pose stream - simulated and live sources of pose samples
pub mod pose;

/// Route planning - A* over the grid and turn extraction
pub mod route;
