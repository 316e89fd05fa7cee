//! Sabacc game engine core.
//!
//! This module provides the single-room game implementation:
//! - Cards, the 76-card deck, and players
//! - The room state machine (waiting, betting, playing, finished)
//! - Winner selection against the target score
//! - Public snapshots that never leak the undealt deck

pub mod config;
pub mod constants;
pub mod entities;
pub mod instance;

pub use config::GameConfig;
pub use entities::{Card, CardValue, Credits, Deck, Player, PlayerId, Suit};
pub use instance::{GameError, GameInstance, Phase, PlayerSnapshot, RoomSnapshot};
