//! `GambitServer` builder and server loop.
//!
//! This is the entry point for running a Gambit server. It ties together
//! the layers: transport → protocol → relay (lobby + game).

use std::net::SocketAddr;
use std::sync::Arc;

use gambit_protocol::{Codec, JsonCodec};
use gambit_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::relay::{RelayHandle, spawn_relay};
use crate::{GambitError, ServerConfig};

/// Builder for configuring and starting a Gambit server.
///
/// # Example
///
/// ```rust,no_run
/// use gambit::prelude::*;
///
/// # async fn run() -> Result<(), GambitError> {
/// let server = GambitServer::builder()
///     .bind("0.0.0.0:3002")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GambitServerBuilder {
    config: ServerConfig,
}

impl GambitServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and starts the relay.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<GambitServer<JsonCodec>, GambitError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let relay = spawn_relay(self.config.command_buffer);

        Ok(GambitServer {
            transport,
            relay,
            codec: Arc::new(JsonCodec),
        })
    }
}

impl Default for GambitServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Gambit server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GambitServer<C: Codec> {
    transport: WebSocketTransport,
    relay: RelayHandle,
    codec: Arc<C>,
}

impl GambitServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> GambitServerBuilder {
        GambitServerBuilder::new()
    }
}

impl<C: Codec> GambitServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, GambitError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the relay, for stats or shutdown.
    pub fn relay(&self) -> RelayHandle {
        self.relay.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), GambitError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Gambit server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let relay = self.relay.clone();
                    let codec = Arc::clone(&self.codec);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, relay, codec).await {
                            tracing::debug!(error = %e, "connection ended with error");
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
