use serde::{Deserialize, Serialize};

/// A grid cell. Valid cells satisfy `0 <= x, y < grid_size`; the food
/// spawner answers [`Position::NO_SPACE`] when the board is saturated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Sentinel for "no empty cell left"; deliberately outside every board.
    pub const NO_SPACE: Position = Position { x: -1, y: -1 };

    pub fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    pub fn in_bounds(&self, grid_size: i32) -> bool {
        self.x >= 0 && self.x < grid_size && self.y >= 0 && self.y < grid_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Each direction has exactly one opposite; turning into it is illegal.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// The snake body, head first. `next_direction` is the turn applied on the
/// next step; after stepping, both fields hold the applied direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub segments: Vec<Position>,
    pub direction: Direction,
    pub next_direction: Direction,
}

impl Snake {
    /// Builds the starting snake: vertical in the center column with the
    /// head at row `grid_size / 4`, body extending upward, moving down.
    pub fn new(grid_size: i32, initial_length: usize) -> Snake {
        debug_assert!(initial_length >= 1 && (initial_length as i32) < grid_size);
        let center_x = grid_size / 2;
        let start_y = grid_size / 4;
        let segments = (0..initial_length as i32)
            .map(|i| Position::new(center_x, start_y - i))
            .collect();
        Snake {
            segments,
            direction: Direction::Down,
            next_direction: Direction::Down,
        }
    }

    pub fn head(&self) -> Position {
        self.segments[0]
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.segments.contains(&pos)
    }

    /// Advances one cell in `next_direction`: new head in front, tail
    /// dropped, length unchanged.
    pub fn step(&self) -> Snake {
        let applied = self.next_direction;
        let (dx, dy) = applied.delta();
        let head = self.head();
        let mut segments = Vec::with_capacity(self.segments.len());
        segments.push(Position::new(head.x + dx, head.y + dy));
        segments.extend_from_slice(&self.segments[..self.segments.len() - 1]);
        Snake {
            segments,
            direction: applied,
            next_direction: applied,
        }
    }

    /// Appends one tail segment, extended one cell away from the
    /// second-to-last segment. Head and mid-body are untouched; a
    /// single-segment snake duplicates its tail.
    pub fn grown(&self) -> Snake {
        let tail = self.segments[self.segments.len() - 1];
        let new_tail = match self.segments.len().checked_sub(2).map(|i| self.segments[i]) {
            Some(prev) => Position::new(tail.x * 2 - prev.x, tail.y * 2 - prev.y),
            None => tail,
        };
        let mut segments = self.segments.clone();
        segments.push(new_tail);
        Snake {
            segments,
            ..self.clone()
        }
    }

    /// True when the head overlaps any body segment. Checked after `step`.
    pub fn hits_self(&self) -> bool {
        let head = self.head();
        self.segments[1..].contains(&head)
    }
}
