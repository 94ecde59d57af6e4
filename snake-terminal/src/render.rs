use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use snake_core::{GRID_SIZE, Position, RenderSink, Snake};
use std::cell::RefCell;
use std::rc::Rc;

const SHAKE_FRAMES: u8 = 6;

/// Last frame pushed by the engine, shared between the tick pipeline and
/// the draw loop.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub segments: Vec<Position>,
    pub food: Position,
    pub grid_size: i32,
    pub shake_frames: u8,
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        FrameSnapshot {
            segments: Vec::new(),
            food: Position::NO_SPACE,
            grid_size: GRID_SIZE,
            shake_frames: 0,
        }
    }
}

pub type SharedFrame = Rc<RefCell<FrameSnapshot>>;

/// `RenderSink` adapter: the engine pushes board state here once per tick
/// and the ratatui draw reads it at its own cadence.
pub struct TerminalRender {
    frame: SharedFrame,
}

impl TerminalRender {
    pub fn new(frame: SharedFrame) -> Self {
        TerminalRender { frame }
    }
}

impl RenderSink for TerminalRender {
    fn render(&mut self, snake: &Snake, food: Position, grid_size: i32) {
        let mut frame = self.frame.borrow_mut();
        frame.segments = snake.segments.clone();
        frame.food = food;
        frame.grid_size = grid_size;
    }

    fn screen_shake(&mut self) {
        self.frame.borrow_mut().shake_frames = SHAKE_FRAMES;
    }
}

/// Draws the board, two terminal columns per cell. The death shake nudges
/// the whole board sideways for a few draws.
pub fn draw_board(frame: &mut Frame, area: Rect, snapshot: &mut FrameSnapshot) {
    let mut board = area;
    if snapshot.shake_frames > 0 {
        snapshot.shake_frames -= 1;
        if snapshot.shake_frames % 2 == 1 && board.x + 1 < board.right() {
            board.x += 1;
        }
    }

    let grid = snapshot.grid_size;
    let head = snapshot.segments.first().copied();
    let mut lines = Vec::with_capacity(grid as usize);
    for y in 0..grid {
        let mut spans = Vec::with_capacity(grid as usize);
        for x in 0..grid {
            let cell = Position::new(x, y);
            let span = if head == Some(cell) {
                Span::styled("██", Style::default().fg(Color::Green))
            } else if snapshot.segments.contains(&cell) {
                Span::styled("▓▓", Style::default().fg(Color::Green))
            } else if snapshot.food == cell {
                Span::styled("◆ ", Style::default().fg(Color::Yellow))
            } else {
                Span::raw("  ")
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, board);
}
