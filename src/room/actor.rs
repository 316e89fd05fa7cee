//! Room actor with async message handling.
//!
//! Each room runs on its own tokio task and owns its [`GameInstance`]
//! outright. Every action on the room flows through the actor's inbox, which
//! serializes them; separate rooms never contend with each other.

use tokio::sync::mpsc;

use super::messages::{RoomClosed, RoomMessage, RoomResult, RoomUpdate};
use crate::game::config::GameConfig;
use crate::game::instance::{GameError, GameInstance};

/// Handle for sending messages to a room actor.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: String,
}

impl RoomHandle {
    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Send a message to the room.
    pub async fn send(&self, message: RoomMessage) -> Result<(), RoomClosed> {
        self.sender.send(message).await.map_err(|_| RoomClosed)
    }
}

/// Actor managing a single room.
pub struct RoomActor {
    /// Room game state
    game: GameInstance,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,
}

impl RoomActor {
    /// Create a new room actor and a handle for sending messages to it.
    #[must_use]
    pub fn new(room_id: &str, config: GameConfig) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(64);
        let actor = Self {
            game: GameInstance::new(room_id, config),
            inbox,
        };
        let handle = RoomHandle {
            sender,
            room_id: room_id.to_string(),
        };
        (actor, handle)
    }

    /// Run the actor event loop until every handle is dropped.
    pub async fn run(mut self) {
        log::info!("room {} starting", self.game.room_id());

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
        }

        log::info!("room {} closed", self.game.room_id());
    }

    fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join {
                player_id,
                name,
                response,
            } => {
                let result = self.apply(|game| game.add_player(player_id, &name));
                let _ = response.send(result);
            }

            RoomMessage::Leave {
                player_id,
                response,
            } => {
                let result = self.apply(|game| game.remove_player(player_id));
                let _ = response.send(result);
            }

            RoomMessage::PlaceBet {
                player_id,
                amount,
                response,
            } => {
                let result = self.apply(|game| game.place_bet(player_id, amount));
                let _ = response.send(result);
            }

            RoomMessage::DrawCard {
                player_id,
                response,
            } => {
                let result = self.apply(|game| game.draw_card(player_id));
                let _ = response.send(result);
            }

            RoomMessage::Stand {
                player_id,
                response,
            } => {
                let result = self.apply(|game| game.stand(player_id));
                let _ = response.send(result);
            }

            RoomMessage::Snapshot { response } => {
                let _ = response.send(self.game.snapshot());
            }
        }
    }

    /// Apply one mutation and capture the state it produced. If the action
    /// finished the round, the next round is dealt immediately and its
    /// opening state rides along in the same update.
    fn apply(
        &mut self,
        op: impl FnOnce(&mut GameInstance) -> Result<(), GameError>,
    ) -> RoomResult {
        op(&mut self.game)?;
        let snapshot = self.game.snapshot();

        let next_round = if self.game.is_game_over() {
            match self.game.start_round() {
                Ok(()) => Some(self.game.snapshot()),
                // Too few players left to redeal; the room idles in the
                // finished phase until someone leaves.
                Err(GameError::NotEnoughPlayers) => None,
                Err(err) => {
                    log::error!("room {}: redeal failed: {err}", self.game.room_id());
                    None
                }
            }
        } else {
            None
        };

        Ok(RoomUpdate {
            snapshot,
            next_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::instance::Phase;
    use crate::room::messages::RoomResult;
    use tokio::sync::oneshot;
    use uuid::Uuid;

    async fn join(handle: &RoomHandle, name: &str) -> (Uuid, RoomResult) {
        let player_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::Join {
                player_id,
                name: name.to_string(),
                response: tx,
            })
            .await
            .unwrap();
        (player_id, rx.await.unwrap())
    }

    #[tokio::test]
    async fn test_actor_serializes_actions_and_replies() {
        let (actor, handle) = RoomActor::new("g1", GameConfig::default());
        tokio::spawn(actor.run());

        let (_, update) = join(&handle, "Alice").await;
        assert_eq!(update.unwrap().latest().phase, Phase::Waiting);

        let (bob, update) = join(&handle, "Bob").await;
        let update = update.unwrap();
        assert_eq!(update.latest().phase, Phase::Betting);
        assert!(update.next_round.is_none());

        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::PlaceBet {
                player_id: bob,
                amount: 50,
                response: tx,
            })
            .await
            .unwrap();
        let update = rx.await.unwrap().unwrap();
        assert_eq!(update.latest().pot, 50);
    }

    #[tokio::test]
    async fn test_finished_round_update_carries_the_redeal() {
        let (actor, handle) = RoomActor::new("g1", GameConfig::default());
        tokio::spawn(actor.run());

        let (alice, _) = join(&handle, "Alice").await;
        let (bob, _) = join(&handle, "Bob").await;

        for (player_id, amount) in [(alice, 100), (bob, 50)] {
            let (tx, rx) = oneshot::channel();
            handle
                .send(RoomMessage::PlaceBet {
                    player_id,
                    amount,
                    response: tx,
                })
                .await
                .unwrap();
            rx.await.unwrap().unwrap();
        }

        for player_id in [alice, bob] {
            let (tx, rx) = oneshot::channel();
            handle
                .send(RoomMessage::Stand {
                    player_id,
                    response: tx,
                })
                .await
                .unwrap();
            let update = rx.await.unwrap().unwrap();
            if player_id == bob {
                // Bob's stand ended the round; the redeal rides along.
                assert_eq!(update.snapshot.phase, Phase::Finished);
                assert!(update.snapshot.winner.is_some());
                let next = update.next_round.unwrap();
                assert_eq!(next.phase, Phase::Betting);
                assert_eq!(next.pot, 0);
            } else {
                assert!(update.next_round.is_none());
            }
        }
    }

    #[tokio::test]
    async fn test_rejected_action_returns_game_error() {
        let (actor, handle) = RoomActor::new("g1", GameConfig::default());
        tokio::spawn(actor.run());

        let (alice, _) = join(&handle, "Alice").await;
        let (tx, rx) = oneshot::channel();
        handle
            .send(RoomMessage::PlaceBet {
                player_id: alice,
                amount: 10,
                response: tx,
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap().unwrap_err(), GameError::BettingClosed);
    }

    #[tokio::test]
    async fn test_dropping_every_handle_closes_the_actor() {
        let (actor, handle) = RoomActor::new("g1", GameConfig::default());
        let task = tokio::spawn(actor.run());
        drop(handle);
        task.await.unwrap();
    }
}
