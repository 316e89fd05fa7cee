//! Multi-room registry: connection routing and room lifecycle.
//!
//! The registry owns the connection-to-seat mapping and a handle per live
//! room. It is created once by the server's composition root and shared by
//! reference with all request-handling code; there is no ambient global
//! state. Rooms are spawned lazily on first join and dropped as soon as
//! their player set empties.

use log::{debug, info, warn};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{RwLock, oneshot};
use uuid::Uuid;

use super::actor::{RoomActor, RoomHandle};
use super::messages::{RoomMessage, RoomResult, RoomUpdate};
use crate::events::{ConnectionId, EventSink};
use crate::game::config::GameConfig;
use crate::game::entities::{Credits, PlayerId};
use crate::game::instance::{GameError, RoomSnapshot};

/// Name a client picks for its play session.
pub type RoomId = String;

/// Errors surfaced to a single connection by the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("you are not in a game")]
    NotInGame,
    #[error("you are already in a game")]
    AlreadyInGame,
    #[error("room is closed")]
    RoomClosed,
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Where a connection sits: which room, as which player.
#[derive(Clone, Debug)]
struct Seat {
    room_id: RoomId,
    player_id: PlayerId,
}

/// Routes inbound actions to the right room actor and pushes outcomes to
/// the event sink: snapshots to everyone in the room, errors to the
/// originating connection only.
pub struct GameRegistry {
    /// Rules applied to every room this registry spawns
    config: GameConfig,

    /// Transport boundary for outbound notifications
    sink: Arc<dyn EventSink>,

    /// Live room handles
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,

    /// Connection to seat mapping
    connections: RwLock<HashMap<ConnectionId, Seat>>,
}

impl GameRegistry {
    /// Create a new registry. The configuration is assumed to be validated
    /// by the composition root (`GameConfig::validate`).
    #[must_use]
    pub fn new(config: GameConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            sink,
            rooms: RwLock::new(HashMap::new()),
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Seat a connection in the named room, creating the room on first
    /// reference. On success the room state is broadcast to every member;
    /// on failure only the caller hears about it.
    pub async fn join_game(
        &self,
        connection_id: ConnectionId,
        room_id: &str,
        player_name: &str,
    ) -> Result<(), RegistryError> {
        let player_id = Uuid::new_v4();

        // Reserve the seat under one write lock so two racing joins from the
        // same connection cannot both pass the check and seat two players.
        {
            let mut connections = self.connections.write().await;
            if connections.contains_key(&connection_id) {
                drop(connections);
                return Err(self.report(connection_id, RegistryError::AlreadyInGame));
            }
            connections.insert(
                connection_id,
                Seat {
                    room_id: room_id.to_string(),
                    player_id,
                },
            );
        }

        let (handle, created) = self.room_or_spawn(room_id).await;
        let (tx, rx) = oneshot::channel();
        let message = RoomMessage::Join {
            player_id,
            name: player_name.to_string(),
            response: tx,
        };

        match self.request(&handle, message, rx).await {
            Ok(update) => {
                info!("connection {connection_id} joined room {room_id} as {player_name}");
                self.broadcast(room_id, &update).await;
                Ok(())
            }
            Err(err) => {
                self.connections.write().await.remove(&connection_id);
                if created {
                    self.drop_room(room_id).await;
                }
                Err(self.report(connection_id, err))
            }
        }
    }

    /// Explicit leave. Unknown connections get a targeted error.
    pub async fn leave_game(&self, connection_id: ConnectionId) -> Result<(), RegistryError> {
        match self.remove_connection(connection_id).await {
            Some(seat) => self.finish_leave(connection_id, seat).await,
            None => Err(self.report(connection_id, RegistryError::NotInGame)),
        }
    }

    /// Transport-level disconnect. Idempotent: a connection that already
    /// left (or was never seated) is a quiet no-op.
    pub async fn handle_disconnect(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), RegistryError> {
        match self.remove_connection(connection_id).await {
            Some(seat) => self.finish_leave(connection_id, seat).await,
            None => {
                debug!("disconnect from unseated connection {connection_id}");
                Ok(())
            }
        }
    }

    pub async fn place_bet(
        &self,
        connection_id: ConnectionId,
        amount: Credits,
    ) -> Result<(), RegistryError> {
        let (seat, handle) = self.seat_of(connection_id).await?;
        let (tx, rx) = oneshot::channel();
        let message = RoomMessage::PlaceBet {
            player_id: seat.player_id,
            amount,
            response: tx,
        };
        self.dispatch(connection_id, &seat, &handle, message, rx)
            .await
    }

    pub async fn draw_card(&self, connection_id: ConnectionId) -> Result<(), RegistryError> {
        let (seat, handle) = self.seat_of(connection_id).await?;
        let (tx, rx) = oneshot::channel();
        let message = RoomMessage::DrawCard {
            player_id: seat.player_id,
            response: tx,
        };
        self.dispatch(connection_id, &seat, &handle, message, rx)
            .await
    }

    pub async fn stand(&self, connection_id: ConnectionId) -> Result<(), RegistryError> {
        let (seat, handle) = self.seat_of(connection_id).await?;
        let (tx, rx) = oneshot::channel();
        let message = RoomMessage::Stand {
            player_id: seat.player_id,
            response: tx,
        };
        self.dispatch(connection_id, &seat, &handle, message, rx)
            .await
    }

    /// Read a room's public state without mutating it.
    pub async fn room_snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        let handle = self.rooms.read().await.get(room_id).cloned()?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Snapshot { response: tx })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Number of seated connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    async fn room_or_spawn(&self, room_id: &str) -> (RoomHandle, bool) {
        let mut rooms = self.rooms.write().await;
        if let Some(handle) = rooms.get(room_id) {
            (handle.clone(), false)
        } else {
            let (actor, handle) = RoomActor::new(room_id, self.config.clone());
            tokio::spawn(actor.run());
            rooms.insert(room_id.to_string(), handle.clone());
            info!("created room {room_id}");
            (handle, true)
        }
    }

    async fn drop_room(&self, room_id: &str) {
        // Dropping the last handle closes the actor's inbox and ends its task.
        if self.rooms.write().await.remove(room_id).is_some() {
            info!("destroyed room {room_id}");
        }
    }

    async fn remove_connection(&self, connection_id: ConnectionId) -> Option<Seat> {
        self.connections.write().await.remove(&connection_id)
    }

    async fn finish_leave(
        &self,
        connection_id: ConnectionId,
        seat: Seat,
    ) -> Result<(), RegistryError> {
        let handle = self.rooms.read().await.get(&seat.room_id).cloned();
        let Some(handle) = handle else {
            // Room already torn down; nothing left to notify.
            return Ok(());
        };

        let (tx, rx) = oneshot::channel();
        let message = RoomMessage::Leave {
            player_id: seat.player_id,
            response: tx,
        };
        match self.request(&handle, message, rx).await {
            Ok(update) => {
                if update.latest().players.is_empty() {
                    self.drop_room(&seat.room_id).await;
                } else {
                    self.broadcast(&seat.room_id, &update).await;
                }
                Ok(())
            }
            Err(err) => {
                // The seat mapping is already gone, so the room stays
                // consistent even if this reply was lost.
                warn!("leave from connection {connection_id} failed: {err}");
                Err(err)
            }
        }
    }

    async fn seat_of(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(Seat, RoomHandle), RegistryError> {
        let seat = self.connections.read().await.get(&connection_id).cloned();
        let Some(seat) = seat else {
            return Err(self.report(connection_id, RegistryError::NotInGame));
        };
        match self.rooms.read().await.get(&seat.room_id).cloned() {
            Some(handle) => Ok((seat, handle)),
            None => Err(self.report(connection_id, RegistryError::RoomClosed)),
        }
    }

    async fn dispatch(
        &self,
        connection_id: ConnectionId,
        seat: &Seat,
        handle: &RoomHandle,
        message: RoomMessage,
        rx: oneshot::Receiver<RoomResult>,
    ) -> Result<(), RegistryError> {
        match self.request(handle, message, rx).await {
            Ok(update) => {
                self.broadcast(&seat.room_id, &update).await;
                Ok(())
            }
            Err(err) => Err(self.report(connection_id, err)),
        }
    }

    async fn request(
        &self,
        handle: &RoomHandle,
        message: RoomMessage,
        rx: oneshot::Receiver<RoomResult>,
    ) -> Result<RoomUpdate, RegistryError> {
        handle
            .send(message)
            .await
            .map_err(|_| RegistryError::RoomClosed)?;
        match rx.await {
            Ok(Ok(update)) => Ok(update),
            Ok(Err(err)) => Err(RegistryError::Game(err)),
            Err(_) => Err(RegistryError::RoomClosed),
        }
    }

    /// Fan the update out to every connection seated in the room. Delivery
    /// is fire-and-forget and happens outside any room's serialized section.
    async fn broadcast(&self, room_id: &str, update: &RoomUpdate) {
        let recipients: Vec<ConnectionId> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .filter(|(_, seat)| seat.room_id == room_id)
                .map(|(connection_id, _)| *connection_id)
                .collect()
        };

        self.sink.state_updated(&recipients, &update.snapshot);
        if let Some(next) = &update.next_round {
            self.sink.state_updated(&recipients, next);
        }
    }

    /// Emit a targeted error event and hand the error back to the caller.
    fn report(&self, connection_id: ConnectionId, err: RegistryError) -> RegistryError {
        self.sink.error_occurred(connection_id, &err.to_string());
        err
    }
}
