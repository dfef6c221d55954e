//! Relay actor: the single Tokio task that owns all matchmaking and game
//! state.
//!
//! Connection handlers never touch the [`Dispatcher`] directly. They send
//! commands through a bounded mpsc channel and the actor applies them one
//! at a time, then pushes the resulting events into each target
//! connection's outbound channel. No locks guard the core maps.

use std::collections::HashMap;

use gambit_protocol::{ClientEvent, ConnectionId, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::GambitError;
use crate::dispatcher::{ConnectionState, Dispatcher, Inbound, Outbound};

/// Channel sender for delivering server events to one connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to the relay actor through its channel.
pub(crate) enum RelayCommand {
    /// A connection was accepted; route its events to `outbox`.
    Connect {
        connection_id: ConnectionId,
        outbox: OutboundSender,
    },

    /// A decoded client event.
    Event {
        connection_id: ConnectionId,
        event: ClientEvent,
    },

    /// The transport closed. Cleans up and forgets the outbox.
    Disconnect { connection_id: ConnectionId },

    /// Request a connection's derived state.
    State {
        connection_id: ConnectionId,
        reply: oneshot::Sender<ConnectionState>,
    },

    /// Request current counters.
    Stats { reply: oneshot::Sender<RelayStats> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of relay counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayStats {
    /// Open connections with a registered outbox.
    pub connections: usize,
    /// Authenticated players.
    pub players: usize,
    /// Players waiting in any matchmaking pool.
    pub waiting: usize,
    /// Games in progress.
    pub active_games: usize,
}

/// Handle to the running relay actor.
///
/// Cheap to clone: it is just an `mpsc::Sender` wrapper. Every connection
/// handler holds one.
#[derive(Clone)]
pub struct RelayHandle {
    sender: mpsc::Sender<RelayCommand>,
}

impl RelayHandle {
    /// Registers a connection's outbound channel.
    pub async fn connect(
        &self,
        connection_id: ConnectionId,
        outbox: OutboundSender,
    ) -> Result<(), GambitError> {
        self.send(RelayCommand::Connect {
            connection_id,
            outbox,
        })
        .await
    }

    /// Forwards a client event (fire-and-forget). Replies arrive on the
    /// connection's outbox.
    pub async fn event(
        &self,
        connection_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), GambitError> {
        self.send(RelayCommand::Event {
            connection_id,
            event,
        })
        .await
    }

    /// Reports that a connection's transport has closed.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<(), GambitError> {
        self.send(RelayCommand::Disconnect { connection_id }).await
    }

    /// Asks for a connection's derived state.
    pub async fn state_of(
        &self,
        connection_id: ConnectionId,
    ) -> Result<ConnectionState, GambitError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RelayCommand::State {
            connection_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| GambitError::RelayUnavailable)
    }

    /// Asks for the current counters.
    pub async fn stats(&self) -> Result<RelayStats, GambitError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RelayCommand::Stats { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| GambitError::RelayUnavailable)
    }

    /// Tells the relay to stop. Pending commands queued behind this one
    /// are dropped.
    pub async fn shutdown(&self) -> Result<(), GambitError> {
        self.send(RelayCommand::Shutdown).await
    }

    async fn send(&self, cmd: RelayCommand) -> Result<(), GambitError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| GambitError::RelayUnavailable)
    }
}

/// The actor state. Runs inside a Tokio task.
struct RelayActor {
    dispatcher: Dispatcher,
    outboxes: HashMap<ConnectionId, OutboundSender>,
    receiver: mpsc::Receiver<RelayCommand>,
}

impl RelayActor {
    async fn run(mut self) {
        tracing::info!("relay started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RelayCommand::Connect {
                    connection_id,
                    outbox,
                } => {
                    tracing::debug!(%connection_id, "connection registered");
                    self.outboxes.insert(connection_id, outbox);
                }
                RelayCommand::Event {
                    connection_id,
                    event,
                } => {
                    let out = self.dispatcher.handle(connection_id, Inbound::Event(event));
                    self.deliver(out);
                }
                RelayCommand::Disconnect { connection_id } => {
                    let out = self.dispatcher.handle(connection_id, Inbound::Disconnect);
                    self.deliver(out);
                    self.outboxes.remove(&connection_id);
                }
                RelayCommand::State {
                    connection_id,
                    reply,
                } => {
                    let _ = reply.send(self.dispatcher.state_of(connection_id));
                }
                RelayCommand::Stats { reply } => {
                    let _ = reply.send(self.stats());
                }
                RelayCommand::Shutdown => {
                    tracing::info!("relay shutting down");
                    break;
                }
            }
        }

        tracing::info!("relay stopped");
    }

    /// Pushes each event into its target's outbox. Silently drops events
    /// for connections that are gone.
    fn deliver(&self, out: Vec<Outbound>) {
        for Outbound { to, event } in out {
            match self.outboxes.get(&to) {
                Some(outbox) => {
                    if outbox.send(event).is_err() {
                        tracing::debug!(connection_id = %to, "outbox closed, dropping event");
                    }
                }
                None => {
                    tracing::debug!(
                        connection_id = %to,
                        event = event.name(),
                        "no outbox for connection, dropping event"
                    );
                }
            }
        }
    }

    fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.outboxes.len(),
            players: self.dispatcher.registry().len(),
            waiting: self.dispatcher.queue().len(),
            active_games: self.dispatcher.coordinator().store().len(),
        }
    }
}

/// Spawns the relay actor and returns a handle to it.
///
/// `buffer` bounds the command channel: when it is full, senders wait.
pub fn spawn_relay(buffer: usize) -> RelayHandle {
    let (sender, receiver) = mpsc::channel(buffer.max(1));
    let actor = RelayActor {
        dispatcher: Dispatcher::new(),
        outboxes: HashMap::new(),
        receiver,
    };
    tokio::spawn(actor.run());
    RelayHandle { sender }
}
