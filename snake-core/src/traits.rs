use anyhow::Result;

use crate::engine::GameStatus;
use crate::snake::{Position, Snake};

/// Discrete sound cues emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    Eat,
    Die,
    Move,
}

/// Drawing surface consulted once per tick. Implementations must tolerate
/// being called indefinitely and keep failures on their side of the seam.
pub trait RenderSink {
    /// One-time surface binding, performed during engine initialization.
    fn bind(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, snake: &Snake, food: Position, grid_size: i32);

    /// Visual cue on death.
    fn screen_shake(&mut self) {}
}

/// Fire-and-forget sound output; must never block the tick.
pub trait AudioSink {
    fn play(&mut self, event: AudioEvent);
    fn set_muted(&mut self, muted: bool);
}

/// Engine-to-host notifications. Every method defaults to a no-op so hosts
/// override only what they present.
pub trait GameCallbacks {
    fn on_score_change(&mut self, _score: u32) {}
    fn on_length_change(&mut self, _length: usize) {}
    fn on_game_over(&mut self, _final_score: u32, _final_length: usize) {}
    fn on_state_change(&mut self, _status: GameStatus) {}
}

/// Render sink for headless runs: frames are discarded.
#[derive(Debug, Default)]
pub struct NullRender;

impl RenderSink for NullRender {
    fn render(&mut self, _snake: &Snake, _food: Position, _grid_size: i32) {}
}

/// Audio sink for headless runs.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _event: AudioEvent) {}
    fn set_muted(&mut self, _muted: bool) {}
}

/// Callback set that ignores every notification.
#[derive(Debug, Default)]
pub struct NullCallbacks;

impl GameCallbacks for NullCallbacks {}
