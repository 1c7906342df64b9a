//! Game module

pub mod cell;
pub mod collision;
pub mod direction;
pub mod engine;
pub mod food;
pub mod input;
pub mod scheduler;
pub mod snake;

pub use cell::{advance_head, Cell};
pub use collision::collides;
pub use direction::Direction;
pub use engine::{GameState, TickEvent};
pub use food::Food;
pub use snake::Snake;
