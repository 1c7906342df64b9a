//! Simulation engine - advances a single game by one tick

use rand::Rng;
use serde::Serialize;

use super::cell::{advance_head, Cell};
use super::collision::collides;
use super::direction::Direction;
use super::food::Food;
use super::snake::Snake;
use crate::config::INITIAL_SNAKE;

/// Events raised by a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TickEvent {
    /// The head reached the food; `score` is the score after eating
    FoodEaten { cell: Cell, score: u32 },
    /// The game became terminal with this final score
    GameOver { score: u32 },
}

/// Complete state of one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub snake: Snake,
    pub food: Food,
    /// Direction applied on the next tick
    pub direction: Direction,
    pub score: u32,
    pub is_over: bool,
}

impl GameState {
    /// The state every game starts from
    pub fn initial() -> Self {
        Self {
            snake: Snake::new(INITIAL_SNAKE.into()),
            food: Food::default(),
            direction: Direction::Up,
            score: 0,
            is_over: false,
        }
    }

    /// A running game with an arbitrary layout and zero score
    pub fn with_layout(snake: Snake, food: Food, direction: Direction) -> Self {
        Self {
            snake,
            food,
            direction,
            score: 0,
            is_over: false,
        }
    }

    /// Advance the game by one tick.
    ///
    /// Ticking a finished game is a no-op, so `GameOver` is raised at most
    /// once per game. Eating the food on the last free cell fills the board:
    /// that tick reports only `GameOver`, whose score already counts the food.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TickEvent> {
        if self.is_over {
            return None;
        }

        let new_head = advance_head(self.snake.head(), self.direction);

        if collides(&new_head, self.snake.body()) {
            self.is_over = true;
            return Some(TickEvent::GameOver { score: self.score });
        }

        let ate = self.food.is_at(&new_head);
        self.snake.advance(new_head, ate);

        if !ate {
            return None;
        }

        self.score += 1;
        match Food::place(rng, &self.snake) {
            Some(food) => {
                self.food = food;
                Some(TickEvent::FoodEaten {
                    cell: new_head,
                    score: self.score,
                })
            }
            None => {
                // Board is full: nowhere left to move.
                self.is_over = true;
                Some(TickEvent::GameOver { score: self.score })
            }
        }
    }

    /// Reset to the initial state
    pub fn restart(&mut self) {
        *self = Self::initial();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}
