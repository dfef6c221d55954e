//! Per-connection handler: frame decoding and event forwarding.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the relay
//!   2. Spawn a writer task: outbound channel → encode → socket
//!   3. Loop: socket → decode → relay (undecodable frames get an error)
//!   4. On close or error, report the disconnect to the relay

use std::sync::Arc;

use gambit_protocol::{ClientEvent, Codec, ErrorCode, ServerEvent};
use gambit_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::GambitError;
use crate::relay::RelayHandle;

/// Drop guard that reports the disconnect when the handler exits.
///
/// Runs even if the handler returns early with an error. `Drop` is
/// synchronous, so the relay call is spawned as a fire-and-forget task.
struct DisconnectGuard {
    connection_id: ConnectionId,
    relay: RelayHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let connection_id = self.connection_id;
        let relay = self.relay.clone();
        tokio::spawn(async move {
            if relay.disconnect(connection_id).await.is_err() {
                tracing::debug!(%connection_id, "relay gone before disconnect");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    relay: RelayHandle,
    codec: Arc<C>,
) -> Result<(), GambitError> {
    let conn = Arc::new(conn);
    let connection_id = conn.id();
    tracing::debug!(%connection_id, "handling new connection");

    let (outbox, mut events) = mpsc::unbounded_channel::<ServerEvent>();
    relay.connect(connection_id, outbox.clone()).await?;
    let guard = DisconnectGuard {
        connection_id,
        relay: relay.clone(),
    };

    // --- Writer: relay → socket ---
    let writer = {
        let conn = Arc::clone(&conn);
        let codec = Arc::clone(&codec);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let bytes = match codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%connection_id, error = %e, "failed to encode event");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%connection_id, error = %e, "send failed");
                    break;
                }
            }
        })
    };

    // --- Reader: socket → relay ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%connection_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "failed to decode event");
                let _ = outbox.send(ServerEvent::error(ErrorCode::InvalidMessage));
                continue;
            }
        };

        tracing::trace!(%connection_id, event = event.name(), "event received");
        relay.event(connection_id, event).await?;
    }

    // The relay drops its copy of the outbox on disconnect; the writer
    // exits once both copies are gone and it has flushed what is queued.
    drop(outbox);
    drop(guard);
    if writer.await.is_err() {
        tracing::warn!(%connection_id, "writer task panicked");
    }
    let _ = conn.close().await;

    Ok(())
}
