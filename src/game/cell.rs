//! Cell struct for grid positions

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use crate::config::GRID_SIZE;

/// A position on the game grid, `0 <= x, y < GRID_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Create a new cell
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Get the cell adjacent to this one in the given direction.
    /// Both axes wrap around the board edges.
    pub fn adjacent(&self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(
            (self.x + dx).rem_euclid(GRID_SIZE),
            (self.y + dy).rem_euclid(GRID_SIZE),
        )
    }

    /// Pick a uniformly random cell on the board
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Cell::new(rng.gen_range(0..GRID_SIZE), rng.gen_range(0..GRID_SIZE))
    }

    /// Iterate every cell of the board, row by row
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..GRID_SIZE).flat_map(|y| (0..GRID_SIZE).map(move |x| Cell::new(x, y)))
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

/// Move `head` one step in `direction` on the toroidal board
pub fn advance_head(head: Cell, direction: Direction) -> Cell {
    head.adjacent(direction)
}
