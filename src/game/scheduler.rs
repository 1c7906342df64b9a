//! Tick scheduler - runs a session's game loop at a fixed cadence

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error};

use super::engine::TickEvent;
use crate::error::SessionError;
use crate::protocol::ServerMessage;
use crate::session::GameSession;

/// Session shared between the tick loop and the input side
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Owns the single tick loop of a session
pub struct TickScheduler {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// Start ticking `session`, replacing a loop that is already running
    pub async fn start(&mut self, session: SharedSession, outbox: UnboundedSender<ServerMessage>) {
        self.stop().await;
        let period = self.period;
        self.task = Some(tokio::spawn(run_tick_loop(session, outbox, period)));
        debug!("Tick loop started (every {}ms)", period.as_millis());
    }

    /// Stop ticking and wait until the loop is gone
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Tick loop stopped");
        }
    }

    /// Whether a tick loop is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn run_tick_loop(session: SharedSession, outbox: UnboundedSender<ServerMessage>, period: Duration) {
    let mut tick_interval = interval(period);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the snake moves one period after mount.
    tick_interval.tick().await;

    loop {
        tick_interval.tick().await;

        if outbox.is_closed() {
            debug!("Screen gone, ending tick loop");
            break;
        }

        if let Err(e) = game_tick(&session, &outbox).await {
            error!("Game tick error: {}", e);
            let _ = outbox.send(ServerMessage::alert("Error", "The game stopped unexpectedly."));
            break;
        }
    }
}

/// Process one game tick
async fn game_tick(session: &SharedSession, outbox: &UnboundedSender<ServerMessage>) -> Result<(), SessionError> {
    let mut guard = session.lock().await;
    let was_over = guard.state().is_over;

    let event = panic::catch_unwind(AssertUnwindSafe(|| guard.tick())).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        SessionError::TickPanicked(reason)
    })?;

    if was_over {
        return Ok(());
    }

    let _ = outbox.send(ServerMessage::State {
        state: guard.state().clone(),
    });

    match event {
        Some(TickEvent::FoodEaten { cell, score }) => {
            let _ = outbox.send(ServerMessage::FoodEaten { cell, score });
        }
        Some(TickEvent::GameOver { score }) => {
            let _ = outbox.send(ServerMessage::GameOver { score });
            let write = guard.score_write(score);
            drop(guard);
            if let Some(write) = write {
                tokio::spawn(write.persist(outbox.clone()));
            }
        }
        None => {}
    }

    Ok(())
}
