//! Game-wide constants.

/// Total number of cards in a fresh sabacc deck.
pub const DECK_SIZE: usize = 76;

/// Highest numbered card value. Each suit carries the values
/// `1..=MAX_NUMBERED_VALUE`.
pub const MAX_NUMBERED_VALUE: i8 = 11;

/// Face card values, one of each per suit. Face cards are always negative.
pub const FACE_VALUES: [i8; 8] = [-2, -8, -11, -13, -14, -15, -16, -17];

/// Default room capacity.
pub const MAX_PLAYERS: usize = 4;

/// Hard floor on the player count: a round cannot continue below this,
/// regardless of how many players are required to start one.
pub const MIN_PLAYERS: usize = 2;

/// Credits every player starts with when they join a room.
pub const STARTING_CREDITS: u32 = 1000;

/// Number of cards dealt to each player at the start of a round.
pub const INITIAL_HAND_SIZE: usize = 2;

/// The score a winning hand wants to land on.
pub const TARGET_SCORE: i32 = 23;
