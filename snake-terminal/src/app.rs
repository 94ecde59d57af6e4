use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction as LayoutDirection, Layout};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use snake_core::{EngineConfig, GameCallbacks, GameEngine, GameStatus};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use crate::audio::TerminalAudio;
use crate::render::{FrameSnapshot, SharedFrame, TerminalRender, draw_board};
use crate::store::FileReplayStore;

/// Session stats as reported through the engine callback seam.
#[derive(Debug, Default)]
pub struct SessionEvents {
    pub score: u32,
    pub length: usize,
    pub game_over: Option<(u32, usize)>,
}

pub type SharedEvents = Rc<RefCell<SessionEvents>>;

pub struct EventSink(pub SharedEvents);

impl GameCallbacks for EventSink {
    fn on_score_change(&mut self, score: u32) {
        self.0.borrow_mut().score = score;
    }

    fn on_length_change(&mut self, length: usize) {
        self.0.borrow_mut().length = length;
    }

    fn on_game_over(&mut self, final_score: u32, final_length: usize) {
        self.0.borrow_mut().game_over = Some((final_score, final_length));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Game,
    GameOver,
    Replay,
}

#[derive(Debug)]
pub enum AppCommand {
    Quit,
}

pub struct App {
    engine: GameEngine,
    screen: Screen,
    frame: SharedFrame,
    events: SharedEvents,
    last_result: Option<(u32, usize)>,
    finished_replay: bool,
    muted: bool,
}

impl App {
    pub fn new(data_dir: PathBuf, seed: u32) -> Result<Self> {
        let frame: SharedFrame = Rc::new(RefCell::new(FrameSnapshot::default()));
        let events: SharedEvents = Rc::new(RefCell::new(SessionEvents::default()));
        let mut engine = GameEngine::new(
            EngineConfig {
                seed,
                ..EngineConfig::default()
            },
            Box::new(TerminalRender::new(frame.clone())),
            Box::new(TerminalAudio::new()),
            Box::new(FileReplayStore::new(data_dir)),
            Box::new(EventSink(events.clone())),
        );
        engine.init().context("failed to initialize game engine")?;
        Ok(App {
            engine,
            screen: Screen::Start,
            frame,
            events,
            last_result: None,
            finished_replay: false,
            muted: false,
        })
    }

    /// Drives the simulation and follows it onto the game-over screen when
    /// a session ends.
    pub fn update(&mut self, now_ms: u64) {
        self.engine.run_until(now_ms);
        let finished = self.events.borrow_mut().game_over.take();
        if let Some(result) = finished {
            self.last_result = Some(result);
            self.finished_replay = self.engine.is_replay();
            self.screen = Screen::GameOver;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now_ms: u64) -> Option<AppCommand> {
        match self.screen {
            Screen::Start => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Some(AppCommand::Quit),
                KeyCode::Enter => self.start_new_game(now_ms),
                KeyCode::Char('r') => self.start_replay(now_ms),
                KeyCode::Char('c') => self.engine.clear_replay(),
                KeyCode::Char('m') => {
                    self.muted = !self.muted;
                    self.engine.set_muted(self.muted);
                }
                _ => {}
            },
            Screen::Game => match key.code {
                KeyCode::Esc => {
                    self.engine.stop();
                    self.screen = Screen::Start;
                }
                KeyCode::Char('p') => {
                    if self.engine.status() == GameStatus::Paused {
                        self.engine.resume(now_ms);
                    } else {
                        self.engine.pause();
                    }
                }
                code => {
                    if let Some(name) = key_code_name(code) {
                        self.engine.press_key(name);
                    }
                }
            },
            Screen::Replay => {
                if key.code == KeyCode::Esc {
                    self.engine.stop_replay();
                    self.screen = Screen::Start;
                }
            }
            Screen::GameOver => match key.code {
                KeyCode::Enter => self.start_new_game(now_ms),
                KeyCode::Char('r') => self.start_replay(now_ms),
                KeyCode::Esc | KeyCode::Char('q') => self.screen = Screen::Start,
                _ => {}
            },
        }
        None
    }

    fn start_new_game(&mut self, now_ms: u64) {
        self.engine.reset(seed_from(now_ms));
        self.engine.start(now_ms);
        self.screen = Screen::Game;
    }

    fn start_replay(&mut self, now_ms: u64) {
        if let Some(data) = self.engine.load_replay() {
            if self.engine.start_replay(data, now_ms) {
                self.screen = Screen::Replay;
            }
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        match self.screen {
            Screen::Start => self.render_start(frame),
            Screen::Game | Screen::Replay => self.render_board(frame),
            Screen::GameOver => self.render_game_over(frame),
        }
    }

    fn render_start(&self, frame: &mut Frame) {
        let mut lines = vec![
            Line::from("S N A K E"),
            Line::from(""),
            Line::from("enter  play"),
        ];
        if self.engine.has_replay() {
            lines.push(Line::from("r      watch last replay"));
            lines.push(Line::from("c      clear last replay"));
        }
        lines.push(Line::from(format!(
            "m      sound: {}",
            if self.muted { "off" } else { "on" }
        )));
        lines.push(Line::from("q      quit"));
        let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, frame.area());
    }

    fn render_board(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(frame.area());

        let events = self.events.borrow();
        let mut status = format!(
            "score {:>5}   length {:>3}   tick {}ms",
            events.score,
            events.length,
            self.engine.state().speed_ms
        );
        match self.engine.status() {
            GameStatus::Paused => status.push_str("   [paused]"),
            GameStatus::Replay => status.push_str("   [replay]"),
            _ => {}
        }
        frame.render_widget(Paragraph::new(status), chunks[0]);

        let mut snapshot = self.frame.borrow_mut();
        draw_board(frame, chunks[1], &mut snapshot);
    }

    fn render_game_over(&self, frame: &mut Frame) {
        let (score, length) = self.last_result.unwrap_or((0, 0));
        let title = if self.finished_replay {
            "REPLAY FINISHED"
        } else {
            "GAME OVER"
        };
        let mut lines = vec![
            Line::from(title),
            Line::from(""),
            Line::from(format!("final score  {score}")),
            Line::from(format!("final length {length}")),
            Line::from(""),
            Line::from("enter  play again"),
        ];
        if self.engine.has_replay() {
            lines.push(Line::from("r      watch replay"));
        }
        lines.push(Line::from("esc    menu"));
        let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, frame.area());
    }
}

fn seed_from(now_ms: u64) -> u32 {
    (now_ms & 0x7fff_ffff) as u32
}

fn key_code_name(code: KeyCode) -> Option<&'static str> {
    match code {
        KeyCode::Up => Some("ArrowUp"),
        KeyCode::Down => Some("ArrowDown"),
        KeyCode::Left => Some("ArrowLeft"),
        KeyCode::Right => Some("ArrowRight"),
        KeyCode::Char('w') => Some("w"),
        KeyCode::Char('W') => Some("W"),
        KeyCode::Char('a') => Some("a"),
        KeyCode::Char('A') => Some("A"),
        KeyCode::Char('s') => Some("s"),
        KeyCode::Char('S') => Some("S"),
        KeyCode::Char('d') => Some("d"),
        KeyCode::Char('D') => Some("D"),
        _ => None,
    }
}
