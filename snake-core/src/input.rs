use crate::snake::Direction;

/// Maps a raw key code to a direction: arrow keys plus WASD, accepting both
/// DOM-style codes and bare letters in either case.
pub fn direction_for_key(code: &str) -> Option<Direction> {
    match code {
        "ArrowUp" | "KeyW" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "KeyS" | "s" | "S" => Some(Direction::Down),
        "ArrowLeft" | "KeyA" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "KeyD" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Two-slot buffer between asynchronous key presses and the tick.
///
/// Reversals are rejected at insertion time against the effective direction:
/// the first slot when it is filled, otherwise the snake's current heading.
/// A press while both slots are filled is dropped silently, so input lag is
/// bounded to two pending turns.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pending: Option<Direction>,
    buffered: Option<Direction>,
    listening: bool,
}

impl InputBuffer {
    pub fn new() -> Self {
        InputBuffer::default()
    }

    pub fn start(&mut self) {
        self.listening = true;
    }

    pub fn stop(&mut self) {
        self.listening = false;
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.buffered = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queues a direction change. `current` is the snake's heading this
    /// tick; it only matters while the first slot is empty.
    pub fn submit(&mut self, direction: Direction, current: Direction) {
        if !self.listening {
            return;
        }
        match (self.pending, self.buffered) {
            (None, _) => {
                if direction != current.opposite() {
                    self.pending = Some(direction);
                }
            }
            (Some(first), None) => {
                if direction != first.opposite() {
                    self.buffered = Some(direction);
                }
            }
            // Both slots taken: extra input is dropped.
            _ => {}
        }
    }

    /// Takes the next queued turn and promotes the second slot. Called
    /// exactly once per tick by the engine.
    pub fn consume(&mut self) -> Option<Direction> {
        let next = self.pending.take();
        self.pending = self.buffered.take();
        next
    }
}
