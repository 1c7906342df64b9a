//! Game configuration constants

/// Board size in cells (the board is GRID_SIZE x GRID_SIZE)
pub const GRID_SIZE: i32 = 15;

/// Game tick delay in milliseconds
pub const TICK_DELAY_MS: u64 = 180;

/// Head position of a freshly started snake
pub const INITIAL_SNAKE: (i32, i32) = (7, 7);

/// Position of the first food of every game
pub const INITIAL_FOOD: (i32, i32) = (5, 5);

/// Random draws attempted before food placement falls back to scanning free cells
pub const FOOD_PLACEMENT_ATTEMPTS: usize = 32;

/// WebSocket server port
pub const SERVER_PORT: u16 = 8080;

// =============================================================================
// Remote store
// =============================================================================

/// Store path holding the global comment feed
pub const COMMENTS_PATH: &str = "comments";

/// Store path prefix for per-user score logs (`scores/{uid}`)
pub const SCORES_PATH: &str = "scores";

/// Blob store path prefix for avatars (`avatar/{uid}`)
pub const AVATAR_PATH: &str = "avatar";

/// Number of most recent scores shown in the profile history
pub const RECENT_SCORES_LIMIT: usize = 5;

/// Maximum comment length in characters
pub const MAX_COMMENT_LEN: usize = 280;

// =============================================================================
// Event Logging
// =============================================================================

/// Enable game event logging
pub const ENABLE_EVENT_LOGGING: bool = true;

/// Log file path
pub const EVENT_LOG_FILE: &str = "game_events.log";
