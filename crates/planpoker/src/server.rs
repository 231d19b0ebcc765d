//! `PlanPokerServer` builder and server loop.
//!
//! This is the entry point for running a planpoker server. It ties
//! together all the layers: transport → protocol → room coordinator.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use planpoker_protocol::{Codec, JsonCodec};
use planpoker_room::{spawn_coordinator, CoordinatorHandle, RoomConfig, DEFAULT_CHANNEL_SIZE};
use planpoker_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::PlanPokerError;

/// How long a connection may stay silent before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) coordinator: CoordinatorHandle,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a planpoker server.
///
/// # Example
///
/// ```rust,no_run
/// use planpoker::prelude::*;
///
/// # async fn run() -> Result<(), PlanPokerError> {
/// let server = PlanPokerServer::builder()
///     .bind("0.0.0.0:3001")
///     .room_config(RoomConfig::default())
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PlanPokerServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
    channel_size: usize,
}

impl PlanPokerServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-room limits.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets how long a connection may go without sending anything.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the capacity of the coordinator's command queue.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size;
        self
    }

    /// Binds the listener and starts the room coordinator.
    pub async fn build(self) -> Result<PlanPokerServer, PlanPokerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let coordinator = spawn_coordinator(self.room_config, self.channel_size);

        let state = Arc::new(ServerState {
            coordinator,
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(PlanPokerServer { transport, state })
    }
}

impl Default for PlanPokerServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound planpoker server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PlanPokerServer<C: Codec = JsonCodec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PlanPokerServer {
    /// Creates a new builder.
    pub fn builder() -> PlanPokerServerBuilder {
        PlanPokerServerBuilder::new()
    }
}

impl<C: Codec> PlanPokerServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, PlanPokerError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the room coordinator, for inspecting rooms.
    pub fn coordinator(&self) -> CoordinatorHandle {
        self.state.coordinator.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Spawns a handler task for each accepted connection. A failed
    /// accept (e.g. a bad WebSocket upgrade) only affects that peer.
    /// Runs until the future is dropped.
    pub async fn run(mut self) -> Result<(), PlanPokerError> {
        tracing::info!(addr = %self.local_addr()?, "planpoker server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
