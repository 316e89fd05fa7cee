//! Room rule configuration.

use serde::{Deserialize, Serialize};

use super::constants::{
    DECK_SIZE, INITIAL_HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS, STARTING_CREDITS, TARGET_SCORE,
};
use super::entities::Credits;

/// Rules for a single room. Every room spawned by a registry shares the
/// registry's configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameConfig {
    /// Fixed room capacity.
    pub max_players: usize,

    /// Player count at which a round starts. Joining is only possible
    /// before this threshold is reached.
    pub min_players: usize,

    /// Credits granted to every joining player.
    pub starting_credits: Credits,

    /// Cards dealt to each player when a round begins.
    pub initial_hand_size: usize,

    /// The score hands are measured against when picking a winner.
    pub target_score: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            min_players: MIN_PLAYERS,
            starting_credits: STARTING_CREDITS,
            initial_hand_size: INITIAL_HAND_SIZE,
            target_score: TARGET_SCORE,
        }
    }
}

impl GameConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_players < MIN_PLAYERS {
            return Err(format!("Min players must be at least {MIN_PLAYERS}"));
        }

        if self.max_players < self.min_players {
            return Err("Max players must be at least min players".to_string());
        }

        if self.starting_credits == 0 {
            return Err("Starting credits must be positive".to_string());
        }

        if self.initial_hand_size * self.max_players > DECK_SIZE {
            return Err("Initial deal would exceed the deck".to_string());
        }

        Ok(())
    }
}
