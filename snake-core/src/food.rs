use std::collections::HashSet;

use crate::snake::Position;
use crate::util::PseudoRandom;

/// Grid cells not occupied by any snake segment, in x-major order. The
/// ordering is part of the determinism contract: the same occupancy must
/// enumerate cells identically on every run.
pub fn empty_cells(occupied: &[Position], grid_size: i32) -> Vec<Position> {
    let taken: HashSet<Position> = occupied.iter().copied().collect();
    let mut cells = Vec::new();
    for x in 0..grid_size {
        for y in 0..grid_size {
            let cell = Position::new(x, y);
            if !taken.contains(&cell) {
                cells.push(cell);
            }
        }
    }
    cells
}

/// Picks a random unoccupied cell. Returns [`Position::NO_SPACE`] when the
/// snake covers the whole board, which the engine treats as a forced loss.
pub fn spawn_food(occupied: &[Position], grid_size: i32, rng: &mut PseudoRandom) -> Position {
    let cells = empty_cells(occupied, grid_size);
    if cells.is_empty() {
        return Position::NO_SPACE;
    }
    let index = (rng.next() * cells.len() as f64) as usize;
    cells[index]
}
