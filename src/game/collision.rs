//! Collision detection logic

use super::cell::Cell;

/// True iff `cell` is occupied by any segment of `body`
pub fn collides<'a, I>(cell: &Cell, body: I) -> bool
where
    I: IntoIterator<Item = &'a Cell>,
{
    body.into_iter().any(|segment| segment == cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_collision_on_free_cell() {
        let body = [Cell::new(1, 1), Cell::new(1, 2)];
        assert!(!collides(&Cell::new(2, 2), &body));
    }

    #[test]
    fn test_collision_with_any_segment() {
        let body = [Cell::new(1, 1), Cell::new(1, 2), Cell::new(2, 2)];
        assert!(collides(&Cell::new(1, 1), &body));
        assert!(collides(&Cell::new(2, 2), &body));
    }

    #[test]
    fn test_empty_body_never_collides() {
        let body: [Cell; 0] = [];
        assert!(!collides(&Cell::new(0, 0), &body));
    }
}
