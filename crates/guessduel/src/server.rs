//! `GuessDuelServer` builder and accept loop.
//!
//! This is the entry point for running a server. It ties the layers
//! together: transport → protocol → session → room.

use std::sync::Arc;
use std::time::Duration;

use guessduel_protocol::{Codec, JsonCodec};
use guessduel_room::RoomConfig;
use guessduel_session::Registry;
use guessduel_transport::{Connection, TcpTransport, Transport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{GuessDuelError, ServerConfig};

/// Address used when the builder is not given one.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:55555";

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so every task holds the same registry. The registry
/// sits behind one `Mutex`; no handler holds it across an `.await`.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Mutex<Registry>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use guessduel::GuessDuelServerBuilder;
///
/// # async fn start() -> Result<(), guessduel::GuessDuelError> {
/// let server = GuessDuelServerBuilder::new()
///     .bind("0.0.0.0:55555")
///     .handshake_timeout(Duration::from_secs(30))
///     .reveal_secret_on_start(false)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GuessDuelServerBuilder {
    bind_addr: String,
    config: ServerConfig,
}

impl GuessDuelServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the bounds secrets are drawn from.
    pub fn room_config(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    /// Whether both players are told the secret when the game starts.
    pub fn reveal_secret_on_start(mut self, reveal: bool) -> Self {
        self.config.reveal_secret_on_start = reveal;
        self
    }

    /// Sets how long a connection may take to send its nickname.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Sets how many consecutive undecodable frames end a connection.
    pub fn max_decode_failures(mut self, limit: u32) -> Self {
        self.config.max_decode_failures = limit;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` over `TcpTransport`.
    pub async fn build(self) -> Result<GuessDuelServer<JsonCodec>, GuessDuelError> {
        let transport = TcpTransport::bind(&self.bind_addr).await?;
        tracing::debug!(config = ?self.config, "server configured");

        let state = Arc::new(ServerState {
            registry: Mutex::new(Registry::new(self.config.room)),
            codec: JsonCodec,
            config: self.config,
        });

        Ok(GuessDuelServer { transport, state })
    }
}

impl Default for GuessDuelServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound guessduel server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GuessDuelServer<C: Codec> {
    transport: TcpTransport,
    state: Arc<ServerState<C>>,
}

impl GuessDuelServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GuessDuelServerBuilder {
        GuessDuelServerBuilder::new()
    }
}

impl<C: Codec> GuessDuelServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Spawns one handler task per accepted connection. A failed accept
    /// is logged and the loop keeps going; it runs until the task is
    /// dropped or the process exits.
    pub async fn run(mut self) -> Result<(), GuessDuelError> {
        tracing::info!(addr = ?self.local_addr().ok(), "guessduel server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let conn_id = conn.id();
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::warn!(%conn_id, error = %e, "session ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
