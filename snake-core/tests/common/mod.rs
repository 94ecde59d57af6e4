#![allow(dead_code)]

use snake_core::{
    AudioEvent, AudioSink, GameCallbacks, GameStatus, Position, RenderSink, ReplayData,
    ReplayStore, Snake,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Everything the engine reported through the callback seam.
#[derive(Default)]
pub struct SessionLog {
    pub scores: Vec<u32>,
    pub lengths: Vec<usize>,
    pub statuses: Vec<GameStatus>,
    pub game_over: Option<(u32, usize)>,
}

pub struct RecordingCallbacks(pub Rc<RefCell<SessionLog>>);

impl GameCallbacks for RecordingCallbacks {
    fn on_score_change(&mut self, score: u32) {
        self.0.borrow_mut().scores.push(score);
    }

    fn on_length_change(&mut self, length: usize) {
        self.0.borrow_mut().lengths.push(length);
    }

    fn on_game_over(&mut self, final_score: u32, final_length: usize) {
        self.0.borrow_mut().game_over = Some((final_score, final_length));
    }

    fn on_state_change(&mut self, status: GameStatus) {
        self.0.borrow_mut().statuses.push(status);
    }
}

/// In-memory replay store shared with the test body.
#[derive(Default)]
pub struct SharedStore(pub Rc<RefCell<Option<ReplayData>>>);

impl ReplayStore for SharedStore {
    fn save(&mut self, data: &ReplayData) -> bool {
        *self.0.borrow_mut() = Some(data.clone());
        true
    }

    fn load(&self) -> Option<ReplayData> {
        self.0.borrow().clone()
    }

    fn exists(&self) -> bool {
        self.0.borrow().is_some()
    }

    fn clear(&mut self) {
        *self.0.borrow_mut() = None;
    }
}

/// Captures every rendered frame, for trajectory comparison.
pub struct FrameRecorder(pub Rc<RefCell<Vec<(Vec<Position>, Position)>>>);

impl RenderSink for FrameRecorder {
    fn render(&mut self, snake: &Snake, food: Position, _grid_size: i32) {
        self.0.borrow_mut().push((snake.segments.clone(), food));
    }
}

/// Records every audio event in order.
pub struct CountingAudio(pub Rc<RefCell<Vec<AudioEvent>>>);

impl AudioSink for CountingAudio {
    fn play(&mut self, event: AudioEvent) {
        self.0.borrow_mut().push(event);
    }

    fn set_muted(&mut self, _muted: bool) {}
}
