//! Game event logging for replay and analysis

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::{error, info};

use crate::config::{ENABLE_EVENT_LOGGING, EVENT_LOG_FILE};
use crate::game::{Cell, Direction};

/// Types of game events that can be logged
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// Screen session mounted
    SessionStart {
        session_id: String,
        user_id: Option<String>,
    },
    /// Screen session torn down
    SessionEnd {
        session_id: String,
    },
    /// Player steered
    DirectionChange {
        session_id: String,
        direction: Direction,
    },
    /// Snake ate the food
    FoodEaten {
        session_id: String,
        cell: Cell,
        score: u32,
    },
    /// Snake ran into itself
    GameOver {
        session_id: String,
        score: u32,
    },
    /// Game reset by the player
    Restart {
        session_id: String,
    },
    /// Final score written to the store
    ScoreRecorded {
        user_id: String,
        key: String,
        points: u32,
    },
}

/// Logged event with timestamp
#[derive(Debug, Serialize)]
struct LogEntry {
    /// Unix timestamp in milliseconds
    timestamp_ms: u128,
    /// The event data
    #[serde(flatten)]
    event: GameEvent,
}

/// Game event logger writing JSON lines
pub struct EventLogger {
    /// File writer (None if logging disabled)
    writer: Option<Mutex<BufWriter<File>>>,
}

impl EventLogger {
    /// Create a new event logger appending to `EVENT_LOG_FILE`
    pub fn new() -> Self {
        if !ENABLE_EVENT_LOGGING {
            info!("Event logging is disabled");
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(EVENT_LOG_FILE)
        {
            Ok(file) => {
                info!("Event logging enabled, writing to {}", EVENT_LOG_FILE);
                Self {
                    writer: Some(Mutex::new(BufWriter::new(file))),
                }
            }
            Err(e) => {
                error!("Failed to open event log file: {}", e);
                Self::disabled()
            }
        }
    }

    /// A logger that drops every event
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    /// Whether events are written anywhere
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Log a game event
    pub fn log(&self, event: GameEvent) {
        let Some(ref writer) = self.writer else {
            return;
        };

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let entry = LogEntry { timestamp_ms, event };

        if let Ok(mut w) = writer.lock() {
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = writeln!(w, "{}", json);
                let _ = w.flush();
            }
        }
    }

    pub fn log_session_start(&self, session_id: &str, user_id: Option<&str>) {
        self.log(GameEvent::SessionStart {
            session_id: session_id.to_string(),
            user_id: user_id.map(str::to_string),
        });
    }

    pub fn log_session_end(&self, session_id: &str) {
        self.log(GameEvent::SessionEnd {
            session_id: session_id.to_string(),
        });
    }

    pub fn log_direction(&self, session_id: &str, direction: Direction) {
        self.log(GameEvent::DirectionChange {
            session_id: session_id.to_string(),
            direction,
        });
    }

    pub fn log_food_eaten(&self, session_id: &str, cell: Cell, score: u32) {
        self.log(GameEvent::FoodEaten {
            session_id: session_id.to_string(),
            cell,
            score,
        });
    }

    pub fn log_game_over(&self, session_id: &str, score: u32) {
        self.log(GameEvent::GameOver {
            session_id: session_id.to_string(),
            score,
        });
    }

    pub fn log_restart(&self, session_id: &str) {
        self.log(GameEvent::Restart {
            session_id: session_id.to_string(),
        });
    }

    pub fn log_score_recorded(&self, user_id: &str, key: &str, points: u32) {
        self.log(GameEvent::ScoreRecorded {
            user_id: user_id.to_string(),
            key: key.to_string(),
            points,
        });
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::FoodEaten {
            session_id: "s1".to_string(),
            cell: Cell::new(5, 5),
            score: 3,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"food_eaten""#));
        assert!(json.contains(r#""cell":{"x":5,"y":5}"#));
    }

    #[test]
    fn test_entry_flattens_event() {
        let entry = LogEntry {
            timestamp_ms: 10,
            event: GameEvent::Restart {
                session_id: "s1".to_string(),
            },
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"timestamp_ms":10,"event":"restart","session_id":"s1"}"#);
    }

    #[test]
    fn test_disabled_logger_ignores_events() {
        let logger = EventLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log_restart("s1");
    }
}
