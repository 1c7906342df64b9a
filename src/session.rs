//! One player's game session

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::event_logger::EventLogger;
use crate::game::input::{route, Command, InputOutcome};
use crate::game::{GameState, TickEvent};
use crate::protocol::ServerMessage;
use crate::score_recorder::ScoreRecorder;

/// Game state of one screen session plus what it needs to report results
pub struct GameSession {
    id: String,
    /// Empty for anonymous players
    user_id: String,
    state: GameState,
    rng: StdRng,
    recorder: ScoreRecorder,
    event_logger: Arc<EventLogger>,
}

impl GameSession {
    pub fn new(id: impl Into<String>, user_id: Option<&str>, recorder: ScoreRecorder, event_logger: Arc<EventLogger>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.unwrap_or_default().to_string(),
            state: GameState::initial(),
            rng: StdRng::from_entropy(),
            recorder,
            event_logger,
        }
    }

    /// Use a fixed random source (food placement)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Replace the game state; used to resume or to stage a layout
    pub fn with_state(mut self, state: GameState) -> Self {
        self.state = state;
        self
    }

    /// Swap in another game state, dropping the current game
    pub fn load_state(&mut self, state: GameState) {
        self.state = state;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Apply a player command
    pub fn command(&mut self, command: Command) -> InputOutcome {
        let outcome = route(&mut self.state, command);
        match (command, outcome) {
            (Command::Turn(direction), InputOutcome::Turned) => {
                self.event_logger.log_direction(&self.id, direction);
            }
            (_, InputOutcome::Restarted) => {
                debug!("Session {} restarted", self.id);
                self.event_logger.log_restart(&self.id);
            }
            _ => {}
        }
        outcome
    }

    /// Advance the game by one tick
    pub fn tick(&mut self) -> Option<TickEvent> {
        let event = self.state.tick(&mut self.rng);
        match event {
            Some(TickEvent::FoodEaten { cell, score }) => {
                debug!("Session {} ate food at {:?}", self.id, cell);
                self.event_logger.log_food_eaten(&self.id, cell, score);
            }
            Some(TickEvent::GameOver { score }) => {
                debug!("Session {} game over with {} points", self.id, score);
                self.event_logger.log_game_over(&self.id, score);
            }
            None => {}
        }
        event
    }

    /// The write that persists `points` as this player's final score.
    /// `None` when there is nothing to record: no points or no signed-in user.
    pub fn score_write(&self, points: u32) -> Option<ScoreWrite> {
        if points == 0 || self.user_id.is_empty() {
            return None;
        }
        Some(ScoreWrite {
            recorder: self.recorder.clone(),
            event_logger: self.event_logger.clone(),
            user_id: self.user_id.clone(),
            points,
        })
    }
}

/// A pending final-score write, detached from the session lock
pub struct ScoreWrite {
    recorder: ScoreRecorder,
    event_logger: Arc<EventLogger>,
    user_id: String,
    points: u32,
}

impl ScoreWrite {
    /// Persist the score. Failures are best effort: logged and reported to the
    /// client as a non-blocking notice.
    pub async fn persist(self, outbox: UnboundedSender<ServerMessage>) {
        match self.recorder.record_score(&self.user_id, self.points).await {
            Ok(Some(key)) => {
                self.event_logger
                    .log_score_recorded(&self.user_id, &key, self.points);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Could not save score {} for {}: {}", self.points, self.user_id, e);
                let _ = outbox.send(ServerMessage::notice("Score", "Your score could not be saved."));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Direction, Food, Snake};
    use crate::store::InMemoryStore;
    use tokio::sync::mpsc;

    fn session(store: Arc<InMemoryStore>, user: Option<&str>) -> GameSession {
        GameSession::new(
            "s1",
            user,
            ScoreRecorder::new(store),
            Arc::new(EventLogger::disabled()),
        )
        .with_rng(StdRng::seed_from_u64(5))
    }

    fn doomed_state(score: u32) -> GameState {
        let snake = Snake::from_segments([Cell::new(1, 1), Cell::new(1, 2)]).unwrap();
        let mut state = GameState::with_layout(snake, Food::default(), Direction::Down);
        state.score = score;
        state
    }

    #[test]
    fn test_commands_route_to_state() {
        let mut session = session(Arc::new(InMemoryStore::new()), Some("u1"));
        assert_eq!(session.command(Command::Turn(Direction::Right)), InputOutcome::Turned);
        assert_eq!(session.state().direction, Direction::Right);

        session.tick();
        assert_eq!(session.state().snake.head(), Cell::new(8, 7));
    }

    #[test]
    fn test_game_over_raised_once() {
        let mut session = session(Arc::new(InMemoryStore::new()), Some("u1")).with_state(doomed_state(2));
        assert_eq!(session.tick(), Some(TickEvent::GameOver { score: 2 }));
        assert_eq!(session.tick(), None);
        assert_eq!(session.tick(), None);
    }

    #[tokio::test]
    async fn test_score_write_persists() {
        let store = Arc::new(InMemoryStore::new());
        let session = session(store.clone(), Some("u1"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        session.score_write(3).unwrap().persist(tx).await;

        assert!(store.snapshot("scores/u1").is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_score_write_failure_notifies() {
        let store = Arc::new(InMemoryStore::new());
        store.set_online(false);
        let session = session(store.clone(), Some("u1"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        session.score_write(3).unwrap().persist(tx).await;

        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Notice { blocking: false, .. })));
    }

    #[test]
    fn test_anonymous_score_is_not_written() {
        let session = session(Arc::new(InMemoryStore::new()), None);
        assert!(session.score_write(9).is_none());
    }

    #[test]
    fn test_zero_score_is_not_written() {
        let session = session(Arc::new(InMemoryStore::new()), Some("u1"));
        assert!(session.score_write(0).is_none());
        assert!(session.score_write(1).is_some());
    }
}
