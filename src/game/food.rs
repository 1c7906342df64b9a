//! Food placement

use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Serialize;

use super::cell::Cell;
use super::snake::Snake;
use crate::config::{FOOD_PLACEMENT_ATTEMPTS, INITIAL_FOOD};

/// The food item on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Food {
    /// Position of the food
    pub cell: Cell,
}

impl Food {
    /// Create food at a specific cell
    pub fn at(cell: Cell) -> Self {
        Self { cell }
    }

    /// Place food on a random cell not occupied by `snake`.
    ///
    /// A few uniform draws are tried first; after that a free cell is picked
    /// uniformly from a board scan. Returns `None` when the snake fills the board.
    pub fn place<R: Rng + ?Sized>(rng: &mut R, snake: &Snake) -> Option<Self> {
        for _ in 0..FOOD_PLACEMENT_ATTEMPTS {
            let cell = Cell::random(rng);
            if !snake.occupies(&cell) {
                return Some(Self::at(cell));
            }
        }

        Cell::all()
            .filter(|cell| !snake.occupies(cell))
            .choose(rng)
            .map(Self::at)
    }

    /// Check if a cell matches the food position
    pub fn is_at(&self, cell: &Cell) -> bool {
        self.cell == *cell
    }
}

impl Default for Food {
    fn default() -> Self {
        Self::at(INITIAL_FOOD.into())
    }
}
