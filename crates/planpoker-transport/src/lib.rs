//! Socket layer of the planpoker server.
//!
//! A connection handler owns exactly one [`Connection`] and drives it from
//! a single `select!` loop: one branch waits on [`Connection::recv`] for
//! the client's next event, the other pushes room broadcasts out through
//! [`Connection::send`]. Everything above this crate deals in encoded
//! frames only.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] on `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Process-unique number of an accepted connection, shown as `conn-N` in
/// logs. Not the participant id, which is random and goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A listener handing out client connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Next client, upgraded and ready to exchange frames.
    ///
    /// An error concerns that one peer only; the server logs it and keeps
    /// accepting.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Bound address. With port 0 this is where the real port shows up.
    fn local_addr(&self) -> Result<SocketAddr, Self::Error>;
}

/// One client link.
///
/// `recv` sits parked for as long as the client is quiet, while room
/// events for the same client keep arriving. Implementations must let
/// `send` complete while a `recv` on the same connection is pending, and
/// `recv` must be safe to drop mid-wait so it can race an idle deadline.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one encoded event. UTF-8 payloads go out as text frames.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Next client frame. `Ok(None)` once the client has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Starts the closing handshake; used when a client goes idle.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_log_format() {
        let id = ConnectionId::new(7);
        assert_eq!(format!("{id} joined"), "conn-7 joined");
        assert_eq!(id.into_inner(), 7);
    }

    #[test]
    fn test_connection_ids_order_by_accept_sequence() {
        let mut ids = vec![ConnectionId::new(3), ConnectionId::new(1), ConnectionId::new(2)];
        ids.sort();
        let raw: Vec<u64> = ids.into_iter().map(ConnectionId::into_inner).collect();
        assert_eq!(raw, [1, 2, 3]);
    }
}
