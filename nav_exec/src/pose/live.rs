//! Live pose source
//!
//! Receives [`PoseMsg`] datagrams from the external pose producer. Every poll performs a single
//! receive bounded by `recv_timeout_ms`, so a silent producer never stalls the main loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::net::SocketAddr;

use comms_if::{
    eqpt::pose::PoseMsg,
    net::{DatagramSocket, NetParams, SocketOptions},
};
use log::warn;

use crate::grid::grid_to_continuous;

use super::{LivePoseParams, PoseSample, PoseSource, PoseSourceError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct LivePoseSource {
    socket: DatagramSocket,

    cell_size: f64,

    /// Number of datagrams discarded because they couldn't be parsed
    num_rejected: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LivePoseSource {
    /// Bind the pose socket on the endpoint given in the network parameters.
    pub fn new(
        net_params: &NetParams,
        params: &LivePoseParams,
        cell_size: f64,
    ) -> Result<Self, PoseSourceError> {
        if params.recv_timeout_ms == 0 {
            return Err(PoseSourceError::InvalidParams(
                "recv_timeout_ms must be greater than zero".into(),
            ));
        }

        let socket = DatagramSocket::new(
            SocketOptions {
                bind: true,
                recv_timeout: params.recv_timeout_ms,
                ..Default::default()
            },
            &net_params.pose_endpoint,
        )
        .map_err(PoseSourceError::NetError)?;

        Ok(Self {
            socket,
            cell_size,
            num_rejected: 0,
        })
    }

    /// Address the source is listening on.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    pub fn num_rejected(&self) -> u64 {
        self.num_rejected
    }
}

impl PoseSource for LivePoseSource {
    fn next_pose(&mut self, now_s: f64) -> Option<PoseSample> {
        let msg = match self.socket.recv_bytes() {
            Ok(Some(bytes)) => PoseMsg::from_bytes(bytes),
            Ok(None) => return None,
            Err(e) => {
                warn!("Error receiving pose datagram: {}", e);
                return None;
            }
        };

        match msg {
            Ok(m) => Some(PoseSample {
                position: grid_to_continuous(m.x, m.y, self.cell_size),
                heading_rad: m.heading_rad(),
                time_s: now_s,
            }),
            Err(e) => {
                self.num_rejected += 1;
                warn!("Discarding pose datagram: {}", e);
                None
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Point2;
    use std::{
        net::UdpSocket,
        time::{Duration, Instant},
    };

    fn source() -> (LivePoseSource, UdpSocket) {
        let net_params = NetParams {
            pose_endpoint: "127.0.0.1:0".into(),
            haptic_endpoint: None,
        };
        let source = LivePoseSource::new(
            &net_params,
            &LivePoseParams {
                recv_timeout_ms: 200,
            },
            40.0,
        )
        .unwrap();

        let tx = UdpSocket::bind("127.0.0.1:0").unwrap();
        tx.connect(source.local_addr().unwrap()).unwrap();

        (source, tx)
    }

    #[test]
    fn test_timeout() {
        let (mut source, _tx) = source();

        let start = Instant::now();
        assert!(source.next_pose(0.0).is_none());
        assert!(Instant::now() - start < Duration::from_secs(2));
        assert!(!source.is_exhausted());
    }

    #[test]
    fn test_valid_payload() {
        let (mut source, tx) = source();

        tx.send(br#"{"x": 2.0, "y": 1.5, "heading": 90.0}"#).unwrap();

        let pose = source.next_pose(3.0).unwrap();
        assert_eq!(pose.position, Point2::new(100.0, 80.0));
        assert!((pose.heading_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(pose.time_s, 3.0);
    }

    #[test]
    fn test_malformed_payloads() {
        let (mut source, tx) = source();

        let payloads: [&[u8]; 4] = [
            b"not json",
            br#"{"x": 1.0, "y": 2.0}"#,
            br#"{"x": 1.0, "y": 2.0, "heading": 1e400}"#,
            &[0xff, 0xfe, 0x00],
        ];

        for p in payloads.iter() {
            tx.send(p).unwrap();
            assert!(source.next_pose(0.0).is_none());
        }

        assert_eq!(source.num_rejected(), 4);

        // Still works after the rejected datagrams
        tx.send(br#"{"x": 0.0, "y": 0.0, "heading": 0.0}"#).unwrap();
        assert!(source.next_pose(0.0).is_some());
    }

    #[test]
    fn test_invalid_timeout() {
        let net_params = NetParams {
            pose_endpoint: "127.0.0.1:0".into(),
            haptic_endpoint: None,
        };

        assert!(matches!(
            LivePoseSource::new(&net_params, &LivePoseParams { recv_timeout_ms: 0 }, 40.0),
            Err(PoseSourceError::InvalidParams(_))
        ));
    }
}
