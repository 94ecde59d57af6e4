/// Board width and height in cells.
pub const GRID_SIZE: i32 = 20;

/// Starting snake length in segments.
pub const INITIAL_SNAKE_LENGTH: usize = 3;

/// Score awarded per food item.
pub const POINTS_PER_FOOD: u32 = 10;

/// Tick interval at score zero, in milliseconds.
pub const BASE_SPEED_MS: u64 = 100;

/// Fastest allowed tick interval in milliseconds.
pub const MIN_SPEED_MS: u64 = 50;

/// Score accumulated between speed-ups.
pub const SPEED_STEP_SCORE: u32 = 50;

/// Interval reduction per speed step, in milliseconds.
pub const SPEED_STEP_MS: u64 = 5;

/// Upper bound accepted by the score submission validator.
pub const MAX_SCORE: u32 = 10_000;

/// Longest accepted nickname in a score submission.
pub const MAX_NICK_LEN: usize = 100;

/// Delay between the death cue and the game-over callback, in milliseconds.
pub const GAME_OVER_NOTIFY_DELAY_MS: u64 = 200;

/// Tick interval for a given score: a monotone non-increasing step curve
/// floored at [`MIN_SPEED_MS`].
pub fn speed_for_score(score: u32) -> u64 {
    let steps = (score / SPEED_STEP_SCORE) as u64;
    BASE_SPEED_MS
        .saturating_sub(steps * SPEED_STEP_MS)
        .max(MIN_SPEED_MS)
}
