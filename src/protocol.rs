//! Protocol messages for WebSocket communication

use serde::{Deserialize, Serialize};

use crate::game::{Cell, Direction, GameState};
use crate::records::{CommentRecord, ScoreRecord};
use crate::store::UserProfile;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Direction change command
    Direction { direction: Direction },
    /// Start a new game
    Restart,
    /// Comments view opened
    OpenComments,
    /// Comments view closed
    CloseComments,
    /// Profile view opened
    OpenProfile,
    /// Profile view closed
    CloseProfile,
    /// Display name edited in the profile view
    ProfileName { name: String },
    /// New avatar image picked in the profile view
    ProfileAvatar { bytes: Vec<u8> },
    /// Save the profile edits
    SaveProfile,
    /// Post to the comment feed
    PostComment { text: String },
    /// Sign out and leave
    SignOut,
    /// Ping to keep connection alive
    Ping,
}

impl ClientMessage {
    /// Parse a client message from a string.
    ///
    /// Bare words (`up`, `west`, `restart`, `ping`) are accepted next to
    /// JSON objects tagged with `type`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();

        // Check for direction commands
        if let Some(direction) = Direction::from_str(s) {
            return Some(ClientMessage::Direction { direction });
        }

        match s {
            "restart" => Some(ClientMessage::Restart),
            "ping" => Some(ClientMessage::Ping),
            _ => serde_json::from_str(s).ok(),
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when the screen session is mounted
    Welcome {
        session: String,
        user: Option<UserProfile>,
        grid_size: i32,
        tick_ms: u64,
    },
    /// Game state after a tick or a command
    State { state: GameState },
    /// The snake ate the food
    FoodEaten { cell: Cell, score: u32 },
    /// The game ended
    GameOver { score: u32 },
    /// Comment feed contents
    Comments { data: Vec<CommentRecord> },
    /// Recent score history, most recent first
    Scores { data: Vec<ScoreRecord> },
    /// Profile saved
    Profile { user: UserProfile },
    /// User facing notification; blocking ones need an acknowledgement
    Notice {
        title: String,
        message: String,
        blocking: bool,
    },
    /// Signed out, the session is closing
    SignedOut,
}

impl ServerMessage {
    /// Serialize message to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Non-blocking notification
    pub fn notice(title: &str, message: impl Into<String>) -> Self {
        ServerMessage::Notice {
            title: title.to_string(),
            message: message.into(),
            blocking: false,
        }
    }

    /// Notification the client must acknowledge
    pub fn alert(title: &str, message: impl Into<String>) -> Self {
        ServerMessage::Notice {
            title: title.to_string(),
            message: message.into(),
            blocking: true,
        }
    }
}
