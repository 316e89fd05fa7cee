//! Core sabacc entities: cards, the deck, and players.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::constants::{DECK_SIZE, FACE_VALUES, MAX_NUMBERED_VALUE};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Sabers,
    Flasks,
    Coins,
    Staves,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Sabers, Suit::Flasks, Suit::Coins, Suit::Staves];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Sabers => "sabers",
            Self::Flasks => "flasks",
            Self::Coins => "coins",
            Self::Staves => "staves",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Negative values are face cards.
pub type CardValue = i8;

/// A single sabacc card. Immutable once created.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    pub suit: Suit,
    pub value: CardValue,
}

impl Card {
    #[must_use]
    pub const fn new(suit: Suit, value: CardValue) -> Self {
        Self { suit, value }
    }

    #[must_use]
    pub const fn is_face(&self) -> bool {
        self.value < 0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.suit)
    }
}

/// The 76-card sabacc pool for one room. Owned exclusively by its game
/// instance and never shared across rooms.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    deck_idx: usize,
}

impl Deck {
    /// Build the full deck in a deterministic base order, then shuffle it.
    #[must_use]
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL {
            for value in 1..=MAX_NUMBERED_VALUE {
                cards.push(Card::new(suit, value));
            }
            for value in FACE_VALUES {
                cards.push(Card::new(suit, value));
            }
        }
        let mut deck = Self { cards, deck_idx: 0 };
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.deck_idx = 0;
    }

    /// Remove and return the top card, or `None` once the deck is exhausted.
    /// A card is never returned twice from the same deck.
    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.deck_idx).copied()?;
        self.deck_idx += 1;
        Some(card)
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len() - self.deck_idx
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique player identity within a room.
pub type PlayerId = Uuid;

/// Type alias for whole credits. All bets and stacks are whole credits.
pub type Credits = u32;

/// A seated player. Created on join, removed on leave or disconnect.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub credits: Credits,
    /// Cards in draw order.
    pub hand: Vec<Card>,
    /// Amount contributed to the pot this round.
    pub bet: Credits,
    pub is_dealer: bool,
    pub is_connected: bool,
    /// Whether the player's most recent turn action was a stand. Cleared
    /// when they draw. A round ends once every player has stood.
    pub has_stood: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: &str, credits: Credits) -> Self {
        Self {
            id,
            name: name.to_string(),
            credits,
            hand: Vec::new(),
            bet: 0,
            is_dealer: false,
            is_connected: true,
            has_stood: false,
        }
    }

    /// Signed sum of the player's card values.
    #[must_use]
    pub fn hand_value(&self) -> i32 {
        self.hand.iter().map(|card| i32::from(card.value)).sum()
    }
}
