//! Room module providing multi-room support with an async actor model.
//!
//! This module implements:
//! - `RoomActor`: async actor owning a single room's game instance
//! - `GameRegistry`: connection routing and room lifecycle
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each room runs in a separate tokio task with an mpsc message inbox, so
//! all actions on one room are serialized while separate rooms stay fully
//! concurrent. The registry spawns rooms lazily on first join, resolves each
//! connection to its seat, and tears rooms down once they empty.
//!
//! ## Example
//!
//! ```ignore
//! use sabacc::{ChannelSink, GameConfig, GameRegistry};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sink = Arc::new(ChannelSink::new());
//!     let registry = GameRegistry::new(GameConfig::default(), sink);
//!
//!     let connection_id = Uuid::new_v4();
//!     registry.join_game(connection_id, "g1", "Alice").await.ok();
//! }
//! ```

pub mod actor;
pub mod messages;
pub mod registry;

pub use actor::{RoomActor, RoomHandle};
pub use messages::{RoomClosed, RoomMessage, RoomResult, RoomUpdate};
pub use registry::{GameRegistry, RegistryError, RoomId};
