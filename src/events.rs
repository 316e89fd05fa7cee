//! Event sink boundary toward the transport layer.
//!
//! The core never talks to sockets directly. Successful actions produce room
//! snapshots that are fanned out to every connection in the room; rejected
//! actions produce an error aimed at the originating connection only. Both
//! paths are fire-and-forget: delivery never blocks the caller and a slow or
//! dead consumer never stalls a room.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::game::instance::RoomSnapshot;

/// Identity of one transport connection.
pub type ConnectionId = Uuid;

/// Where the registry pushes state changes and errors.
pub trait EventSink: Send + Sync {
    /// A room's state changed; deliver the snapshot to every recipient.
    fn state_updated(&self, recipients: &[ConnectionId], snapshot: &RoomSnapshot);

    /// An action failed; deliver the message to the originating connection.
    fn error_occurred(&self, connection_id: ConnectionId, message: &str);
}

/// One event addressed to a single connection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum OutboundEvent {
    StateUpdated(RoomSnapshot),
    ErrorOccurred(String),
}

/// An [`EventSink`] that fans events out over per-connection tokio channels.
/// The transport registers a sender per connection and drains the receiver
/// into its socket. Full channels drop the event, closed channels drop the
/// registration.
#[derive(Default)]
pub struct ChannelSink {
    senders: Mutex<HashMap<ConnectionId, mpsc::Sender<OutboundEvent>>>,
}

impl ChannelSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, connection_id: ConnectionId, sender: mpsc::Sender<OutboundEvent>) {
        self.senders_guard().insert(connection_id, sender);
    }

    pub fn unregister(&self, connection_id: ConnectionId) {
        self.senders_guard().remove(&connection_id);
    }

    /// The sender map only holds channel handles, so a poisoned lock is
    /// still usable; recover the guard instead of panicking.
    fn senders_guard(&self) -> MutexGuard<'_, HashMap<ConnectionId, mpsc::Sender<OutboundEvent>>> {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, connection_id: ConnectionId, event: OutboundEvent) {
        let mut senders = self.senders_guard();
        let closed = match senders.get(&connection_id) {
            Some(sender) => match sender.try_send(event) {
                Ok(()) => false,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("connection {connection_id} channel full, dropping event");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("connection {connection_id} gone, removing");
                    true
                }
            },
            None => false,
        };
        if closed {
            senders.remove(&connection_id);
        }
    }
}

impl EventSink for ChannelSink {
    fn state_updated(&self, recipients: &[ConnectionId], snapshot: &RoomSnapshot) {
        for &connection_id in recipients {
            self.deliver(
                connection_id,
                OutboundEvent::StateUpdated(snapshot.clone()),
            );
        }
    }

    fn error_occurred(&self, connection_id: ConnectionId, message: &str) {
        self.deliver(connection_id, OutboundEvent::ErrorOccurred(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::instance::Phase;

    fn snapshot() -> RoomSnapshot {
        RoomSnapshot {
            id: "g1".to_string(),
            players: Vec::new(),
            current_player: None,
            phase: Phase::Waiting,
            pot: 0,
            max_players: 4,
            winner: None,
            deck: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_state_updates_reach_only_recipients() {
        let sink = ChannelSink::new();
        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let (conn_a, conn_b) = (Uuid::new_v4(), Uuid::new_v4());
        sink.register(conn_a, tx_a);
        sink.register(conn_b, tx_b);

        sink.state_updated(&[conn_a], &snapshot());

        let event = rx_a.recv().await.unwrap();
        assert!(matches!(event, OutboundEvent::StateUpdated(_)));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_errors_target_one_connection() {
        let sink = ChannelSink::new();
        let (tx, mut rx) = mpsc::channel(8);
        let conn = Uuid::new_v4();
        sink.register(conn, tx);

        sink.error_occurred(conn, "not your turn");
        assert_eq!(
            rx.recv().await.unwrap(),
            OutboundEvent::ErrorOccurred("not your turn".to_string())
        );
    }

    #[tokio::test]
    async fn test_closed_receiver_is_pruned() {
        let sink = ChannelSink::new();
        let (tx, rx) = mpsc::channel(8);
        let conn = Uuid::new_v4();
        sink.register(conn, tx);
        drop(rx);

        sink.error_occurred(conn, "gone");
        let senders = sink.senders.lock().unwrap();
        assert!(!senders.contains_key(&conn));
    }

    #[tokio::test]
    async fn test_unregistered_connection_is_ignored() {
        let sink = ChannelSink::new();
        sink.error_occurred(Uuid::new_v4(), "nobody home");
        sink.state_updated(&[Uuid::new_v4()], &snapshot());
    }

    #[tokio::test]
    async fn test_poisoned_lock_does_not_take_the_sink_down() {
        let sink = std::sync::Arc::new(ChannelSink::new());
        let (tx, mut rx) = mpsc::channel(8);
        let conn = Uuid::new_v4();
        sink.register(conn, tx);

        // A thread that panics while holding the lock poisons it.
        let poisoner = std::sync::Arc::clone(&sink);
        std::thread::spawn(move || {
            let _guard = poisoner.senders.lock().unwrap();
            panic!("poisoning the sink lock");
        })
        .join()
        .unwrap_err();

        sink.error_occurred(conn, "still delivering");
        assert_eq!(
            rx.recv().await.unwrap(),
            OutboundEvent::ErrorOccurred("still delivering".to_string())
        );
    }
}
