//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with equipment outside the
//! navigation exec: the upstream pose producer and the downstream haptic device.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod haptic;
pub mod pose;
