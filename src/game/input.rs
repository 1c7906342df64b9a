//! Input router - maps player commands onto the game state

use super::direction::Direction;
use super::engine::GameState;

/// A player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Steer the snake on the next tick
    Turn(Direction),
    /// Start a fresh game
    Restart,
}

/// What the router did with a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Pending direction updated
    Turned,
    /// Game reset to its initial state
    Restarted,
    /// Dropped because the game is over
    Ignored,
}

/// Apply a command to the game.
///
/// Turns are not checked against the current heading: a 180 degree turn is
/// accepted and, for a snake of two or more segments, ends the game on the
/// next tick through the regular collision check.
pub fn route(state: &mut GameState, command: Command) -> InputOutcome {
    match command {
        Command::Restart => {
            state.restart();
            InputOutcome::Restarted
        }
        Command::Turn(_) if state.is_over => InputOutcome::Ignored,
        Command::Turn(direction) => {
            state.direction = direction;
            InputOutcome::Turned
        }
    }
}
