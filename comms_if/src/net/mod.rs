//! # Network Module
//!
//! This module provides networking abstractions over UDP datagrams, which is how the pose producer
//! and the haptic device talk to the navigation exec. Delivery is best effort: there are no
//! acknowledgements and no ordering guarantees beyond arrival order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    time::Duration,
};

use log::debug;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| NetError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum size of a datagram accepted by [`DatagramSocket::recv_bytes`].
pub const MAX_DATAGRAM_SIZE: usize = 2048;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters, loaded from `net.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Local address the live pose stream binds to, e.g. `"127.0.0.1:65432"`.
    pub pose_endpoint: String,

    /// Address of the haptic device bridge. If `None` haptic commands are only logged.
    pub haptic_endpoint: Option<String>,
}

/// A UDP socket configured for non-stalling use from the cyclic loop.
pub struct DatagramSocket {
    socket: UdpSocket,

    buffer: Vec<u8>,
}

/// Represents options which can be set on a [`DatagramSocket`].
pub struct SocketOptions {
    /// Indicates if the socket should bind itself to the endpoint. Receivers should have this
    /// value set as `true`, senders should have it set as `false`, in which case the socket is
    /// bound to an ephemeral local port and connected to the endpoint.
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// Maximum time in milliseconds before a recv operation returns with no data. Must be
    /// greater than zero.
    pub recv_timeout: u64,

    /// Maximum time in milliseconds before a send operation gives up. Must be greater than zero.
    pub send_timeout: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Could not resolve the endpoint {0}")]
    InvalidEndpoint(String),

    #[error("Could not bind the socket: {0}")]
    BindError(io::Error),

    #[error("Could not connect the socket: {0}")]
    ConnectError(io::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DatagramSocket {
    /// Create a new datagram socket.
    ///
    /// ## Arguments
    /// - `socket_options`: a [`SocketOptions`] struct specifying how to configure the socket
    /// - `endpoint`: an address string, such as `"127.0.0.1:65432"`
    pub fn new(socket_options: SocketOptions, endpoint: &str) -> Result<Self, NetError> {
        let addr = resolve(endpoint)?;

        let socket = if socket_options.bind {
            UdpSocket::bind(addr).map_err(NetError::BindError)?
        } else {
            let local: SocketAddr = match addr {
                SocketAddr::V4(_) => ([0u8; 4], 0).into(),
                SocketAddr::V6(_) => ([0u16; 8], 0).into(),
            };
            let socket = UdpSocket::bind(local).map_err(NetError::BindError)?;
            socket.connect(addr).map_err(NetError::ConnectError)?;
            socket
        };

        debug!(
            "Datagram socket on {:?} {} {}",
            socket.local_addr().ok(),
            if socket_options.bind { "bound to" } else { "connected to" },
            addr
        );

        Self::from_socket(socket, socket_options)
    }

    /// Wrap an already bound socket, applying the given options (`bind` is ignored).
    pub fn from_socket(socket: UdpSocket, socket_options: SocketOptions) -> Result<Self, NetError> {
        socket_options.set(&socket)?;

        Ok(Self {
            socket,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    /// Receive a single datagram, waiting at most the configured receive timeout.
    ///
    /// Returns `Ok(None)` if nothing arrived within the timeout.
    pub fn recv_bytes(&mut self) -> io::Result<Option<&[u8]>> {
        match self.socket.recv_from(&mut self.buffer) {
            Ok((len, _)) => Ok(Some(&self.buffer[..len])),
            Err(e) if is_timeout(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The local address this socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl std::ops::Deref for DatagramSocket {
    type Target = UdpSocket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &UdpSocket) -> Result<(), NetError> {
        // A zero duration is rejected by the OS, so clamp to the smallest bounded wait
        set_sockopts!(
            socket,
            (
                set_read_timeout,
                Some(Duration::from_millis(self.recv_timeout.max(1)))
            ),
            (
                set_write_timeout,
                Some(Duration::from_millis(self.send_timeout.max(1)))
            )
        );

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            bind: false,
            recv_timeout: 10,
            send_timeout: 10,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Returns true if the error is what the OS reports when a bounded wait expires.
pub fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn resolve(endpoint: &str) -> Result<SocketAddr, NetError> {
    endpoint
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| NetError::InvalidEndpoint(endpoint.into()))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_recv_timeout() {
        let mut rx = DatagramSocket::new(
            SocketOptions {
                bind: true,
                recv_timeout: 5,
                ..Default::default()
            },
            "127.0.0.1:0",
        )
        .unwrap();

        // Nothing sent, so the bounded wait expires with no data
        assert!(rx.recv_bytes().unwrap().is_none());

        let addr = rx.local_addr().unwrap();
        let tx = DatagramSocket::new(SocketOptions::default(), &addr.to_string()).unwrap();
        tx.send(b"hello").unwrap();

        rx.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        assert_eq!(rx.recv_bytes().unwrap(), Some(&b"hello"[..]));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            DatagramSocket::new(SocketOptions::default(), "not an address"),
            Err(NetError::InvalidEndpoint(_))
        ));
    }
}
