//! # Sabacc
//!
//! A server-authoritative engine for the turn-based multiplayer card game
//! sabacc: players join a named room, place bets, draw cards or stand, and a
//! winner is computed by closeness to a target score of 23.
//!
//! ## Architecture
//!
//! - [`game`]: the single-room state machine. A [`GameInstance`] owns one
//!   room's players, pot, phase, turn pointer, and 76-card deck, and moves
//!   through four phases: waiting, betting, playing, finished.
//! - [`room`]: the concurrency layer. Each room runs as a tokio actor task
//!   that serializes all actions on its instance; the [`GameRegistry`] maps
//!   transport connections to seats, spawns rooms lazily, and destroys them
//!   once empty.
//! - [`events`]: the outbound boundary. Successful actions broadcast a
//!   [`RoomSnapshot`] to every connection in the room; rejected actions send
//!   an error to the originating connection only. The deck is never included
//!   in a snapshot.
//!
//! ## Example
//!
//! ```
//! use sabacc::{GameConfig, GameInstance};
//! use uuid::Uuid;
//!
//! let mut game = GameInstance::new("g1", GameConfig::default());
//! let alice = Uuid::new_v4();
//! game.add_player(alice, "Alice").unwrap();
//! ```

/// Outbound notification boundary toward the transport.
pub mod events;
pub use events::{ChannelSink, ConnectionId, EventSink, OutboundEvent};

/// Core game logic, entities, and the room state machine.
pub mod game;
pub use game::{
    Card, CardValue, Credits, Deck, GameConfig, GameError, GameInstance, Phase, Player, PlayerId,
    PlayerSnapshot, RoomSnapshot, Suit, constants,
};

/// Room actors and the multi-room registry.
pub mod room;
pub use room::{GameRegistry, RegistryError, RoomActor, RoomHandle, RoomId, RoomMessage, RoomUpdate};
