//! Room actor message types.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::game::entities::{Credits, PlayerId};
use crate::game::instance::{GameError, RoomSnapshot};

/// The room's inbox is gone: every handle was dropped or the task ended.
#[derive(Debug, Error)]
#[error("room is closed")]
pub struct RoomClosed;

/// Messages that can be sent to a `RoomActor`
#[derive(Debug)]
pub enum RoomMessage {
    /// Seat a player in the room
    Join {
        player_id: PlayerId,
        name: String,
        response: oneshot::Sender<RoomResult>,
    },

    /// Remove a player (leave or disconnect)
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<RoomResult>,
    },

    /// Move credits into the pot
    PlaceBet {
        player_id: PlayerId,
        amount: Credits,
        response: oneshot::Sender<RoomResult>,
    },

    /// Draw a card on the player's turn
    DrawCard {
        player_id: PlayerId,
        response: oneshot::Sender<RoomResult>,
    },

    /// Keep the current hand on the player's turn
    Stand {
        player_id: PlayerId,
        response: oneshot::Sender<RoomResult>,
    },

    /// Read the current public state without mutating anything
    Snapshot {
        response: oneshot::Sender<RoomSnapshot>,
    },
}

/// Reply to a mutating room message.
pub type RoomResult = Result<RoomUpdate, GameError>;

/// State produced by one successful action.
///
/// `snapshot` reflects the room right after the mutation. When the action
/// finished a round, the next round starts immediately and its opening state
/// rides along as `next_round`; each snapshot is broadcast exactly once, in
/// order.
#[derive(Clone, Debug)]
pub struct RoomUpdate {
    pub snapshot: RoomSnapshot,
    pub next_round: Option<RoomSnapshot>,
}

impl RoomUpdate {
    /// The most recent state in this update.
    #[must_use]
    pub fn latest(&self) -> &RoomSnapshot {
        self.next_round.as_ref().unwrap_or(&self.snapshot)
    }
}
