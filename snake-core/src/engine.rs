use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    GAME_OVER_NOTIFY_DELAY_MS, GRID_SIZE, INITIAL_SNAKE_LENGTH, POINTS_PER_FOOD, speed_for_score,
};
use crate::food::spawn_food;
use crate::input::{InputBuffer, direction_for_key};
use crate::replay::{ReplayCursor, ReplayData, ReplayMove, ReplayStore};
use crate::scheduler::TickScheduler;
use crate::snake::{Position, Snake};
use crate::traits::{AudioEvent, AudioSink, GameCallbacks, RenderSink};
use crate::util::PseudoRandom;

/// Session phase. `Replay` sessions run the same tick pipeline as `Playing`
/// but source their turns from a recorded move log instead of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Idle,
    Playing,
    Paused,
    Gameover,
    Replay,
}

/// The single live food item. Never overlaps the snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    pub position: Position,
}

/// The one value the engine mutates. All writes go through the named
/// transitions (`tick`, `reset`, `start_replay`, `stop`), never ad hoc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub status: GameStatus,
    pub snake: Snake,
    pub food: Food,
    pub score: u32,
    pub speed_ms: u64,
    pub seed: u32,
}

/// Board geometry and seeding. Defaults give the standard arcade board;
/// tests shrink the grid to reach edge cases quickly.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub grid_size: i32,
    pub initial_length: usize,
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grid_size: GRID_SIZE,
            initial_length: INITIAL_SNAKE_LENGTH,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Idle,
    InFlight,
    Ready,
}

/// Where the tick pipeline gets its turns from.
enum TurnSource {
    Live,
    Replay(ReplayCursor),
}

struct PendingGameOver {
    notify_at_ms: u64,
    final_score: u32,
    final_length: usize,
}

/// Fixed-tick simulation driver. Owns the game state and the input buffer
/// for the duration of a session; rendering, audio, persistence, and host
/// notifications are injected collaborators behind their seams.
pub struct GameEngine {
    config: EngineConfig,
    state: GameState,
    rng: PseudoRandom,
    input: InputBuffer,
    scheduler: TickScheduler,
    source: TurnSource,
    recorded_moves: Vec<ReplayMove>,
    tick_count: u32,
    init_state: InitState,
    pending_game_over: Option<PendingGameOver>,
    last_seen_ms: u64,
    render: Box<dyn RenderSink>,
    audio: Box<dyn AudioSink>,
    store: Box<dyn ReplayStore>,
    callbacks: Box<dyn GameCallbacks>,
}

impl GameEngine {
    pub fn new(
        config: EngineConfig,
        render: Box<dyn RenderSink>,
        audio: Box<dyn AudioSink>,
        store: Box<dyn ReplayStore>,
        callbacks: Box<dyn GameCallbacks>,
    ) -> Self {
        let state = Self::fresh_state(&config, config.seed);
        GameEngine {
            rng: PseudoRandom::seeded(config.seed),
            input: InputBuffer::new(),
            scheduler: TickScheduler::new(state.speed_ms),
            source: TurnSource::Live,
            recorded_moves: Vec::new(),
            tick_count: 0,
            init_state: InitState::Idle,
            pending_game_over: None,
            last_seen_ms: 0,
            render,
            audio,
            store,
            callbacks,
            config,
            state,
        }
    }

    fn fresh_state(config: &EngineConfig, seed: u32) -> GameState {
        GameState {
            status: GameStatus::Idle,
            snake: Snake::new(config.grid_size, config.initial_length),
            // Placeholder until init or reset spawns the first food.
            food: Food {
                position: Position::new(0, 0),
            },
            score: 0,
            speed_ms: speed_for_score(0),
            seed,
        }
    }

    /// Binds the render surface and places the first food. Idempotent and
    /// re-entry guarded: a second attempt while one is in flight, or after
    /// completion, performs nothing and returns `Ok(false)`.
    pub fn init(&mut self) -> Result<bool> {
        if self.init_state != InitState::Idle {
            return Ok(false);
        }
        self.init_state = InitState::InFlight;
        if let Err(err) = self.render.bind() {
            self.init_state = InitState::Idle;
            return Err(err);
        }
        self.state.food.position = spawn_food(
            &self.state.snake.segments,
            self.config.grid_size,
            &mut self.rng,
        );
        self.init_state = InitState::Ready;
        Ok(true)
    }

    /// Begins a live session. No-op unless initialized and currently idle
    /// or at game over.
    pub fn start(&mut self, now_ms: u64) {
        if self.init_state != InitState::Ready {
            warn!("start requested before init completed");
            return;
        }
        if !matches!(self.state.status, GameStatus::Idle | GameStatus::Gameover) {
            return;
        }
        debug!("starting live session, seed {}", self.state.seed);
        self.state.status = GameStatus::Playing;
        self.callbacks.on_state_change(GameStatus::Playing);
        self.input.start();
        self.scheduler.set_interval(self.state.speed_ms);
        self.scheduler.start(now_ms);
    }

    /// Halts the loop and input listening synchronously; no further tick
    /// can fire. The session returns to idle.
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.input.stop();
        self.state.status = GameStatus::Idle;
        self.callbacks.on_state_change(GameStatus::Idle);
    }

    /// Discards the session and rebuilds a fresh board under `seed`.
    pub fn reset(&mut self, seed: u32) {
        self.scheduler.stop();
        self.input.reset();
        self.recorded_moves.clear();
        self.tick_count = 0;
        self.pending_game_over = None;
        self.source = TurnSource::Live;
        self.rng = PseudoRandom::seeded(seed);
        self.state = Self::fresh_state(&self.config, seed);
        if self.init_state == InitState::Ready {
            self.state.food.position = spawn_food(
                &self.state.snake.segments,
                self.config.grid_size,
                &mut self.rng,
            );
        }
        self.callbacks.on_score_change(0);
        self.callbacks.on_length_change(self.config.initial_length);
    }

    /// Freezes the loop without discarding the session.
    pub fn pause(&mut self) {
        if matches!(self.state.status, GameStatus::Playing | GameStatus::Replay) {
            self.scheduler.stop();
            self.state.status = GameStatus::Paused;
            self.callbacks.on_state_change(GameStatus::Paused);
        }
    }

    pub fn resume(&mut self, now_ms: u64) {
        if self.state.status != GameStatus::Paused {
            return;
        }
        self.state.status = match self.source {
            TurnSource::Live => GameStatus::Playing,
            TurnSource::Replay(_) => GameStatus::Replay,
        };
        self.callbacks.on_state_change(self.state.status);
        self.scheduler.start(now_ms);
    }

    /// Feeds a raw key code (arrow keys, WASD) into the input buffer.
    /// Presses outside a live session, including during replays, are
    /// ignored.
    pub fn press_key(&mut self, code: &str) {
        if self.state.status != GameStatus::Playing {
            return;
        }
        if let Some(direction) = direction_for_key(code) {
            self.input.submit(direction, self.state.snake.direction);
        }
    }

    /// Advances the simulation to `now_ms`, firing every due tick in order,
    /// then delivers a pending game-over notification once its delay has
    /// elapsed. Hosts call this from any polling cadence.
    pub fn run_until(&mut self, now_ms: u64) {
        self.last_seen_ms = now_ms;
        while self.scheduler.fire_due(now_ms) {
            self.tick();
        }
        if self
            .pending_game_over
            .as_ref()
            .is_some_and(|pending| now_ms >= pending.notify_at_ms)
        {
            if let Some(pending) = self.pending_game_over.take() {
                self.callbacks
                    .on_game_over(pending.final_score, pending.final_length);
                self.callbacks.on_state_change(GameStatus::Gameover);
            }
        }
    }

    /// One simulation step. All play-time mutation of the game state
    /// happens here.
    fn tick(&mut self) {
        if !matches!(self.state.status, GameStatus::Playing | GameStatus::Replay) {
            return;
        }
        self.tick_count += 1;

        let requested = match &mut self.source {
            TurnSource::Live => self.input.consume(),
            TurnSource::Replay(cursor) => cursor.next_direction(self.tick_count),
        };

        if let Some(direction) = requested {
            if direction != self.state.snake.direction.opposite() {
                self.state.snake.next_direction = direction;
                if direction != self.state.snake.direction {
                    self.audio.play(AudioEvent::Move);
                    if matches!(self.source, TurnSource::Live) {
                        self.recorded_moves.push(ReplayMove {
                            tick: self.tick_count,
                            direction,
                        });
                    }
                }
            }
        }

        self.state.snake = self.state.snake.step();
        let head = self.state.snake.head();

        if !head.in_bounds(self.config.grid_size) || self.state.snake.hits_self() {
            self.handle_game_over();
            return;
        }

        if head == self.state.food.position {
            self.handle_food_eaten();
            if self.state.status == GameStatus::Gameover {
                // Eating saturated the board; the session already ended.
                return;
            }
        }

        self.render.render(
            &self.state.snake,
            self.state.food.position,
            self.config.grid_size,
        );
    }

    fn handle_food_eaten(&mut self) {
        self.state.snake = self.state.snake.grown();
        self.state.score += POINTS_PER_FOOD;
        self.callbacks.on_score_change(self.state.score);
        self.callbacks
            .on_length_change(self.state.snake.segments.len());

        self.state.speed_ms = speed_for_score(self.state.score);
        self.scheduler.set_interval(self.state.speed_ms);

        let position = spawn_food(
            &self.state.snake.segments,
            self.config.grid_size,
            &mut self.rng,
        );
        self.state.food.position = position;
        if position == Position::NO_SPACE {
            // No legal food placement left: an immediate loss.
            self.handle_game_over();
            return;
        }

        self.audio.play(AudioEvent::Eat);
    }

    fn handle_game_over(&mut self) {
        self.state.status = GameStatus::Gameover;
        self.scheduler.stop();
        self.input.stop();

        self.audio.play(AudioEvent::Die);
        self.render.screen_shake();

        if matches!(self.source, TurnSource::Live) {
            self.persist_replay();
        }

        // The host hears about it after the die cue has had its moment.
        self.pending_game_over = Some(PendingGameOver {
            notify_at_ms: self.last_seen_ms + GAME_OVER_NOTIFY_DELAY_MS,
            final_score: self.state.score,
            final_length: self.state.snake.segments.len(),
        });
    }

    fn persist_replay(&mut self) {
        let data = ReplayData {
            seed: self.state.seed,
            moves: self.recorded_moves.clone(),
            final_score: self.state.score,
            final_length: self.state.snake.segments.len(),
            timestamp: self.last_seen_ms,
        };
        if !self.store.save(&data) {
            warn!("replay save failed; the live result stands");
        }
    }

    /// Starts playback of a recorded session as a fresh parallel
    /// simulation: same seed, same starting board, turns sourced from the
    /// move log. Structurally invalid data is rejected.
    pub fn start_replay(&mut self, data: ReplayData, now_ms: u64) -> bool {
        if self.init_state != InitState::Ready {
            warn!("replay requested before init completed");
            return false;
        }
        if !data.is_valid() {
            warn!("discarding invalid replay data");
            return false;
        }
        debug!("starting replay, seed {}", data.seed);

        self.scheduler.stop();
        self.input.stop();
        self.input.reset();
        self.recorded_moves.clear();
        self.tick_count = 0;
        self.pending_game_over = None;

        self.rng = PseudoRandom::seeded(data.seed);
        self.state = Self::fresh_state(&self.config, data.seed);
        self.state.food.position = spawn_food(
            &self.state.snake.segments,
            self.config.grid_size,
            &mut self.rng,
        );
        self.source = TurnSource::Replay(ReplayCursor::new(data.moves));

        self.callbacks.on_score_change(0);
        self.callbacks.on_length_change(self.config.initial_length);

        self.state.status = GameStatus::Replay;
        self.callbacks.on_state_change(GameStatus::Replay);
        self.scheduler.set_interval(self.state.speed_ms);
        self.scheduler.start(now_ms);
        true
    }

    /// Ends playback and returns to a fresh idle live session.
    pub fn stop_replay(&mut self) {
        let seed = self.state.seed;
        self.source = TurnSource::Live;
        self.stop();
        self.reset(seed);
    }

    /// The stored replay, if a valid one exists. Corrupt data reads as
    /// absent.
    pub fn load_replay(&self) -> Option<ReplayData> {
        self.store.load().filter(ReplayData::is_valid)
    }

    pub fn has_replay(&self) -> bool {
        self.store.exists()
    }

    pub fn clear_replay(&mut self) {
        self.store.clear();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn is_replay(&self) -> bool {
        matches!(self.source, TurnSource::Replay(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASE_SPEED_MS;
    use crate::replay::NullReplayStore;
    use crate::snake::Direction;
    use crate::traits::{NullAudio, NullRender};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        scores: Vec<u32>,
        lengths: Vec<usize>,
        statuses: Vec<GameStatus>,
        game_over: Option<(u32, usize)>,
    }

    struct RecordingCallbacks(Rc<RefCell<Recorded>>);

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

    fn engine_with(
        config: EngineConfig,
        recorded: Rc<RefCell<Recorded>>,
    ) -> GameEngine {
        GameEngine::new(
            config,
            Box::new(NullRender),
            Box::new(NullAudio),
            Box::new(NullReplayStore),
            Box::new(RecordingCallbacks(recorded)),
        )
    }

    #[test]
    fn board_saturation_forces_a_loss() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut engine = engine_with(
            EngineConfig {
                grid_size: 3,
                initial_length: 1,
                seed: 5,
            },
            recorded.clone(),
        );
        engine.init().unwrap();
        engine.start(0);

        // Hand-built board: the snake fills every cell except (0,0), with
        // a straight tail so growth lands back on the vacated cell.
        engine.state.snake.segments = vec![
            Position::new(1, 0),
            Position::new(1, 1),
            Position::new(0, 1),
            Position::new(0, 2),
            Position::new(1, 2),
            Position::new(2, 2),
            Position::new(2, 1),
            Position::new(2, 0),
        ];
        engine.state.snake.direction = Direction::Down;
        engine.state.snake.next_direction = Direction::Left;
        engine.state.food.position = Position::new(0, 0);

        engine.run_until(BASE_SPEED_MS);

        assert_eq!(engine.status(), GameStatus::Gameover);
        assert_eq!(engine.state().score, POINTS_PER_FOOD);
        assert_eq!(engine.state().food.position, Position::NO_SPACE);
        assert!(!engine.scheduler.is_running());
        assert_eq!(recorded.borrow().scores, vec![POINTS_PER_FOOD]);
        assert_eq!(recorded.borrow().lengths, vec![9]);
        assert!(recorded.borrow().game_over.is_none());

        engine.run_until(BASE_SPEED_MS + GAME_OVER_NOTIFY_DELAY_MS);
        assert_eq!(recorded.borrow().game_over, Some((POINTS_PER_FOOD, 9)));
    }

    #[test]
    fn pause_freezes_ticking_and_resume_continues() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut engine = engine_with(EngineConfig::default(), recorded.clone());
        engine.init().unwrap();
        engine.start(0);

        engine.run_until(BASE_SPEED_MS * 3);
        assert_eq!(engine.tick_count(), 3);

        engine.pause();
        assert_eq!(engine.status(), GameStatus::Paused);
        engine.run_until(BASE_SPEED_MS * 10);
        assert_eq!(engine.tick_count(), 3);

        engine.resume(BASE_SPEED_MS * 10);
        engine.run_until(BASE_SPEED_MS * 11);
        assert_eq!(engine.status(), GameStatus::Playing);
        assert_eq!(engine.tick_count(), 4);
        assert_eq!(
            recorded.borrow().statuses,
            vec![GameStatus::Playing, GameStatus::Paused, GameStatus::Playing]
        );
    }

    #[test]
    fn replay_presses_never_reach_the_buffer() {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let mut engine = engine_with(EngineConfig::default(), recorded);
        engine.init().unwrap();
        let data = ReplayData {
            seed: 1,
            moves: Vec::new(),
            final_score: 0,
            final_length: 3,
            timestamp: 0,
        };
        assert!(engine.start_replay(data, 0));
        engine.press_key("ArrowLeft");
        assert!(!engine.input.has_pending());
    }
}
