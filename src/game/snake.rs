//! Snake body

use std::collections::VecDeque;

use serde::Serialize;

use super::cell::Cell;
use super::collision::collides;

/// The snake: head is front, tail is back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// Create a one-segment snake
    pub fn new(head: Cell) -> Self {
        let mut body = VecDeque::new();
        body.push_front(head);
        Self { body }
    }

    /// Build a snake from its segments, head first.
    /// Returns `None` for an empty body.
    pub fn from_segments<I: IntoIterator<Item = Cell>>(segments: I) -> Option<Self> {
        let body: VecDeque<Cell> = segments.into_iter().collect();
        if body.is_empty() {
            None
        } else {
            Some(Self { body })
        }
    }

    /// A snake without segments. Breaks the non-empty invariant, so ticking
    /// it panics.
    #[cfg(test)]
    pub(crate) fn headless() -> Self {
        Self { body: VecDeque::new() }
    }

    /// Get the snake's head cell
    pub fn head(&self) -> Cell {
        // The body is never empty: constructors reject it and `advance` pushes before popping.
        self.body[0]
    }

    /// All body segments, head first
    pub fn body(&self) -> &VecDeque<Cell> {
        &self.body
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body has no segments
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Check whether a cell is occupied by the body
    pub fn occupies(&self, cell: &Cell) -> bool {
        collides(cell, &self.body)
    }

    /// Move onto `new_head`. The tail is kept when `grow` is set.
    pub fn advance(&mut self, new_head: Cell, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }
}
