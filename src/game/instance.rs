//! Single-room sabacc state machine.
//!
//! A [`GameInstance`] owns one room's players, pot, phase, turn pointer, and
//! deck. Every mutating operation validates first and only then mutates, so a
//! rejected action never leaves the room partially updated. The instance is
//! purely synchronous; serialization of concurrent access is the room actor's
//! job.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::config::GameConfig;
use super::constants::MIN_PLAYERS;
use super::entities::{Card, Credits, Deck, Player, PlayerId};

/// Errors that can occur during room operations
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("room is full")]
    CapacityReached,
    #[error("game already in progress")]
    GameAlreadyStarted,
    #[error("player already joined")]
    PlayerAlreadyJoined,
    #[error("player is not in this room")]
    UnknownPlayer,
    #[error("bets are not being accepted right now")]
    BettingClosed,
    #[error("invalid bet amount")]
    InvalidBet,
    #[error("bet exceeds available credits ({credits})")]
    InsufficientCredits { credits: Credits },
    #[error("the round is not in the playing phase")]
    NotPlaying,
    #[error("not your turn")]
    OutOfTurn,
    #[error("the deck is exhausted")]
    DeckExhausted,
    #[error("round still in progress")]
    RoundNotOver,
    #[error("need 2+ players")]
    NotEnoughPlayers,
}

/// Coarse state of a room's round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Betting,
    Playing,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Betting => "betting",
            Self::Playing => "playing",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// Public view of one player, safe to send to every client in the room.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub credits: Credits,
    pub hand: Vec<Card>,
    pub bet: Credits,
    pub is_dealer: bool,
    pub is_connected: bool,
}

/// Public view of a room. The deck is always reported as empty so clients
/// never learn the order of undealt cards.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub id: String,
    pub players: Vec<PlayerSnapshot>,
    pub current_player: Option<PlayerId>,
    pub phase: Phase,
    pub pot: Credits,
    pub max_players: usize,
    pub winner: Option<PlayerId>,
    pub deck: Vec<Card>,
}

/// One independent play session: players, deck, pot, and phase.
#[derive(Debug)]
pub struct GameInstance {
    room_id: String,
    config: GameConfig,
    /// Join order, which also defines turn rotation.
    players: Vec<Player>,
    phase: Phase,
    pot: Credits,
    current_player: Option<PlayerId>,
    winner: Option<PlayerId>,
    deck: Deck,
}

impl GameInstance {
    #[must_use]
    pub fn new(room_id: impl Into<String>, config: GameConfig) -> Self {
        Self {
            room_id: room_id.into(),
            config,
            players: Vec::new(),
            phase: Phase::Waiting,
            pot: 0,
            current_player: None,
            winner: None,
            deck: Deck::new(),
        }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn pot(&self) -> Credits {
        self.pot
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    /// Seat a new player. The first joiner becomes the dealer. Once the
    /// configured starting threshold is reached the betting round begins,
    /// so joining is only possible while the room is waiting.
    pub fn add_player(&mut self, id: PlayerId, name: &str) -> Result<(), GameError> {
        if self.players.len() >= self.config.max_players {
            return Err(GameError::CapacityReached);
        }
        if self.phase != Phase::Waiting {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(GameError::PlayerAlreadyJoined);
        }

        let mut player = Player::new(id, name, self.config.starting_credits);
        player.is_dealer = self.players.is_empty();
        self.players.push(player);
        info!("room {}: {name} joined", self.room_id);

        if self.players.len() >= self.config.min_players {
            self.begin_betting();
        }
        Ok(())
    }

    /// Remove a player in any phase. Bets already in the pot are forfeited,
    /// not refunded, and a departing dealer hands the flag to the earliest
    /// remaining joiner. Dropping below the two-player floor resets the room
    /// to waiting; otherwise the turn and any pending phase transition are
    /// repaired around the gap.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<(), GameError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::UnknownPlayer)?;
        let removed = self.players.remove(index);
        info!("room {}: {} left", self.room_id, removed.name);

        // The dealer flag moves before any reset so the room never has zero
        // dealers while occupied.
        if removed.is_dealer
            && let Some(first) = self.players.first_mut()
        {
            first.is_dealer = true;
        }

        if self.players.len() < MIN_PLAYERS {
            self.reset_to_waiting();
            return Ok(());
        }

        if self.current_player == Some(id) {
            let next = self.players[index % self.players.len()].id;
            self.current_player = Some(next);
        }

        // The departure may have been the last thing the phase was waiting on.
        match self.phase {
            Phase::Betting if self.players.iter().all(|p| p.bet > 0) => self.begin_playing(),
            Phase::Playing if self.players.iter().all(|p| p.has_stood) => self.finish_round(),
            _ => {}
        }
        Ok(())
    }

    /// Move `amount` credits from the player into the pot. Once every player
    /// has a non-zero bet the round moves to the playing phase.
    pub fn place_bet(&mut self, id: PlayerId, amount: Credits) -> Result<(), GameError> {
        if self.phase != Phase::Betting {
            return Err(GameError::BettingClosed);
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::UnknownPlayer)?;
        if amount == 0 {
            return Err(GameError::InvalidBet);
        }
        if amount > player.credits {
            return Err(GameError::InsufficientCredits {
                credits: player.credits,
            });
        }

        player.credits -= amount;
        player.bet += amount;
        self.pot += amount;
        debug!("room {}: {} bet {amount}", self.room_id, player.name);

        if self.players.iter().all(|p| p.bet > 0) {
            self.begin_playing();
        }
        Ok(())
    }

    /// Draw a card into the acting player's hand and pass the turn. Only the
    /// current player may act. An exhausted deck fails the draw and leaves
    /// the turn with the player, who can still stand.
    pub fn draw_card(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.check_turn(id)?;
        let card = self.deck.draw().ok_or(GameError::DeckExhausted)?;
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::UnknownPlayer)?;
        player.hand.push(card);
        player.has_stood = false;
        self.advance_turn(id);
        Ok(())
    }

    /// Keep the current hand and pass the turn. Once every player is
    /// standing the round finishes and the pot is paid to the winner.
    pub fn stand(&mut self, id: PlayerId) -> Result<(), GameError> {
        self.check_turn(id)?;
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GameError::UnknownPlayer)?;
        player.has_stood = true;

        if self.players.iter().all(|p| p.has_stood) {
            self.finish_round();
        } else {
            self.advance_turn(id);
        }
        Ok(())
    }

    /// Begin a fresh round after one has finished, reusing the instance:
    /// new shuffled deck, cleared hands and bets, and a fresh deal.
    pub fn start_round(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Finished {
            return Err(GameError::RoundNotOver);
        }
        if self.players.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers);
        }

        self.deck = Deck::new();
        self.winner = None;
        for player in &mut self.players {
            player.hand.clear();
            player.bet = 0;
            player.has_stood = false;
        }
        self.begin_betting();
        Ok(())
    }

    /// The player whose hand value is closest to the target score. Ties go
    /// to the earliest joiner; the result is always deterministic.
    #[must_use]
    pub fn winner(&self) -> Option<&Player> {
        let target = self.config.target_score;
        // min_by_key keeps the first minimum, which is join order here.
        self.players
            .iter()
            .min_by_key(|p| (target - p.hand_value()).abs())
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Public state for broadcast. Hidden information (the undealt deck)
    /// is reported as an empty sequence.
    #[must_use]
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.room_id.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    name: p.name.clone(),
                    credits: p.credits,
                    hand: p.hand.clone(),
                    bet: p.bet,
                    is_dealer: p.is_dealer,
                    is_connected: p.is_connected,
                })
                .collect(),
            current_player: self.current_player,
            phase: self.phase,
            pot: self.pot,
            max_players: self.config.max_players,
            winner: self.winner,
            deck: Vec::new(),
        }
    }

    fn check_turn(&self, id: PlayerId) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if !self.players.iter().any(|p| p.id == id) {
            return Err(GameError::UnknownPlayer);
        }
        if self.current_player != Some(id) {
            return Err(GameError::OutOfTurn);
        }
        Ok(())
    }

    fn advance_turn(&mut self, after: PlayerId) {
        if let Some(position) = self.players.iter().position(|p| p.id == after) {
            let next = (position + 1) % self.players.len();
            self.current_player = Some(self.players[next].id);
        }
    }

    fn begin_betting(&mut self) {
        self.phase = Phase::Betting;
        for i in 0..self.players.len() {
            for _ in 0..self.config.initial_hand_size {
                if let Some(card) = self.deck.draw() {
                    self.players[i].hand.push(card);
                }
            }
        }
        self.current_player = self.players.first().map(|p| p.id);
        info!(
            "room {}: betting round started with {} players",
            self.room_id,
            self.players.len()
        );
    }

    fn begin_playing(&mut self) {
        self.phase = Phase::Playing;
        self.current_player = self.players.first().map(|p| p.id);
        debug!("room {}: all bets placed, playing", self.room_id);
    }

    fn finish_round(&mut self) {
        self.winner = self.winner().map(|p| p.id);
        if let Some(winner_id) = self.winner
            && let Some(player) = self.players.iter_mut().find(|p| p.id == winner_id)
        {
            player.credits += self.pot;
            info!(
                "room {}: {} wins {} credits",
                self.room_id, player.name, self.pot
            );
        }
        self.pot = 0;
        for player in &mut self.players {
            player.bet = 0;
        }
        self.current_player = None;
        self.phase = Phase::Finished;
    }

    fn reset_to_waiting(&mut self) {
        self.phase = Phase::Waiting;
        self.pot = 0;
        self.current_player = None;
        self.winner = None;
        self.deck = Deck::new();
        for player in &mut self.players {
            player.hand.clear();
            player.bet = 0;
            player.has_stood = false;
        }
        debug!("room {}: back to waiting", self.room_id);
    }
}
