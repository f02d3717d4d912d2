//! # Haptic Client
//!
//! Delivers [`HapticCmd`]s to the vibration device. The device bridge listens for one JSON
//! encoded command per datagram. Delivery is best effort, there is no acknowledgement.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::haptic::HapticCmd,
    net::{DatagramSocket, NetError, SocketOptions},
};
use log::info;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can act on a haptic command.
pub trait Actuator {
    fn notify(&mut self, cmd: &HapticCmd) -> Result<(), HapticClientError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sends commands to the haptic device bridge.
pub struct HapticClient {
    socket: DatagramSocket,
}

/// Logs commands instead of sending them, used when no device is configured.
#[derive(Debug, Default)]
pub struct LogActuator {
    pub num_notified: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum HapticClientError {
    #[error("Could not open the haptic socket: {0}")]
    NetError(NetError),

    #[error("Could not serialise the haptic command: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not send the haptic command: {0}")]
    SendError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HapticClient {
    /// Create a new client sending to the given endpoint.
    pub fn new(endpoint: &str) -> Result<Self, HapticClientError> {
        let socket = DatagramSocket::new(SocketOptions::default(), endpoint)
            .map_err(HapticClientError::NetError)?;

        Ok(Self { socket })
    }
}

impl Actuator for HapticClient {
    fn notify(&mut self, cmd: &HapticCmd) -> Result<(), HapticClientError> {
        let payload = serde_json::to_vec(cmd).map_err(HapticClientError::SerializationError)?;

        self.socket
            .send(&payload)
            .map_err(HapticClientError::SendError)?;

        Ok(())
    }
}

impl Actuator for LogActuator {
    fn notify(&mut self, cmd: &HapticCmd) -> Result<(), HapticClientError> {
        self.num_notified += 1;
        info!("Haptic command: {:?}", cmd);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
