//! # Pose Equipment Messages
//!
//! The upstream pose producer (step detection and heading fusion running on a phone, or any other
//! source) publishes one [`PoseMsg`] per datagram, encoded as JSON:
//!
//! ```json
//! {"x": 3.2, "y": 0.1, "heading": 87.5}
//! ```
//!
//! - `x` is the (fractional) column index of the grid, `y` the (fractional) row index.
//! - `heading` is in degrees, with 0 along increasing column and +90 along increasing row.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose update from the external producer, in the external grid frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseMsg {
    /// Column position in cells
    pub x: f64,

    /// Row position in cells
    pub y: f64,

    /// Heading in degrees
    pub heading: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PoseMsgError {
    #[error("The payload was not valid UTF-8")]
    NonUtf8Payload,

    #[error("Could not deserialize the pose message: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The pose message contains a non-finite {0} field")]
    NonFiniteField(&'static str),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseMsg {
    /// Parse a message from a raw datagram payload.
    ///
    /// Missing fields, unparseable JSON and non-finite values are all rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PoseMsgError> {
        let s = std::str::from_utf8(bytes).map_err(|_| PoseMsgError::NonUtf8Payload)?;

        let msg: PoseMsg = serde_json::from_str(s.trim()).map_err(PoseMsgError::DeserializeError)?;

        for (name, val) in [("x", msg.x), ("y", msg.y), ("heading", msg.heading)].iter() {
            if !val.is_finite() {
                return Err(PoseMsgError::NonFiniteField(*name));
            }
        }

        Ok(msg)
    }

    /// Heading converted to radians.
    pub fn heading_rad(&self) -> f64 {
        self.heading.to_radians()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_bytes() {
        let msg = PoseMsg::from_bytes(br#"{"x": 1.5, "y": 2.0, "heading": 90.0}"#).unwrap();
        assert_eq!(msg, PoseMsg { x: 1.5, y: 2.0, heading: 90.0 });
        assert!((msg.heading_rad() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        // Extra fields from the producer are ignored
        assert!(PoseMsg::from_bytes(br#"{"x": 1, "y": 2, "heading": 0, "steps": 4}"#).is_ok());
    }

    #[test]
    fn test_from_bytes_rejects_bad_payloads() {
        assert!(matches!(
            PoseMsg::from_bytes(br#"{"x": 1.5, "y": 2.0}"#),
            Err(PoseMsgError::DeserializeError(_))
        ));
        assert!(matches!(
            PoseMsg::from_bytes(b"not json"),
            Err(PoseMsgError::DeserializeError(_))
        ));
        assert!(matches!(
            PoseMsg::from_bytes(&[0xff, 0xfe, 0x00]),
            Err(PoseMsgError::NonUtf8Payload)
        ));
        assert!(matches!(
            PoseMsg::from_bytes(br#"{"x": 1.0, "y": "north", "heading": 0.0}"#),
            Err(PoseMsgError::DeserializeError(_))
        ));
    }
}
