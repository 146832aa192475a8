//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Coord, Phase, Token};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Who is playing, for the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiStatus {
    #[default]
    Off,
    /// Adapter listening; `pending` while a remote move waits for its turn
    Remote { pending: bool },
    /// Built-in greedy player
    Auto,
}

/// Front-end state the snapshot does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusView {
    pub ai: AiStatus,
    /// Wire code of the last refused move (`no_match`, ...)
    pub last_error: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);
const CURSOR_BG: Rgb = Rgb::new(90, 90, 110);
const PICKED_BG: Rgb = Rgb::new(150, 120, 40);

/// One color per token kind; kinds past the table wrap around.
const KIND_COLORS: [Rgb; 8] = [
    Rgb::new(220, 80, 80),
    Rgb::new(80, 200, 100),
    Rgb::new(80, 130, 230),
    Rgb::new(240, 220, 80),
    Rgb::new(200, 110, 220),
    Rgb::new(255, 160, 40),
    Rgb::new(80, 220, 220),
    Rgb::new(235, 235, 235),
];

pub fn kind_color(kind: u8) -> Rgb {
    let base = KIND_COLORS[kind as usize % KIND_COLORS.len()];
    if kind as usize >= KIND_COLORS.len() {
        base.lighten(110)
    } else {
        base
    }
}

/// Glyph for a token: `●` for ordinary gems, `◆` for specials.
pub fn token_glyph(token: Token) -> char {
    match token {
        Token::Empty => '·',
        Token::Gem { special: false, .. } => '●',
        Token::Gem { special: true, .. } => '◆',
    }
}

/// Callout for chain reactions (second resolve step onward).
pub fn chain_callout(chain: u32) -> Option<&'static str> {
    match chain {
        0 | 1 => None,
        c if c % 2 == 0 => Some("Good!"),
        _ => Some("Nice!"),
    }
}

/// A lightweight terminal renderer for the board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Where the board frame landed in the viewport.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Render into an existing framebuffer.
    ///
    /// Allocation-free; callers reuse one framebuffer across frames.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        status: &StatusView,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let frame = self.frame(snap, viewport);
        let (board_w, board_h) = (frame.w - 2, frame.h - 2);

        fb.fill_rect(frame.x + 1, frame.y + 1, board_w, board_h, ' ', CellStyle::new(BOARD_BG, BOARD_BG));
        fb.draw_box(
            frame.x,
            frame.y,
            frame.w,
            frame.h,
            CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0)),
        );

        // Highlights go under the tokens.
        if let Some(c) = snap.cursor {
            self.fill_cell(fb, frame, c.row as i32, c.col as i32, ' ', CellStyle::new(CURSOR_BG, CURSOR_BG));
        }
        if let Some(c) = snap.selection {
            self.fill_cell(fb, frame, c.row as i32, c.col as i32, ' ', CellStyle::new(PICKED_BG, PICKED_BG));
        }

        // Empty cells first so falling tokens are drawn over them.
        for gems in [false, true] {
            for r in 0..snap.rows {
                for c in 0..snap.columns {
                    let c = Coord::new(r, c);
                    if snap.token(c).is_empty() != gems {
                        self.draw_token(fb, frame, snap, c);
                    }
                }
            }
        }

        self.draw_side_panel(fb, snap, status, viewport, frame);

        if snap.paused {
            self.draw_overlay_text(fb, frame, "PAUSED");
        } else if snap.round_over {
            self.draw_overlay_text(fb, frame, "TIME UP");
        } else if let Some(text) = chain_callout(snap.chain) {
            let style = CellStyle::new(Rgb::new(255, 60, 60), Rgb::new(0, 0, 0)).bold();
            let x = frame.x + frame.w.saturating_sub(text.len() as u16) / 2;
            fb.put_str(x, frame.y.saturating_sub(1), text, style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, status: &StatusView, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, status, viewport, &mut fb);
        fb
    }

    /// Terminal position of board cell `c`, if it is on the board.
    pub fn cell_origin(&self, snap: &GameSnapshot, viewport: Viewport, c: Coord) -> Option<(u16, u16)> {
        self.cell_xy(self.frame(snap, viewport), snap, c.row as i32, c.col as i32)
    }

    fn frame(&self, snap: &GameSnapshot, viewport: Viewport) -> Frame {
        let board_w = snap.columns as u16 * self.cell_w;
        let board_h = snap.rows as u16 * self.cell_h;
        Frame {
            x: viewport.width.saturating_sub(board_w + 2) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(board_h + 2) / 2,
                AnchorY::Top => 0,
            },
            w: board_w + 2,
            h: board_h + 2,
        }
    }

    fn draw_token(&self, fb: &mut FrameBuffer, frame: Frame, snap: &GameSnapshot, c: Coord) {
        let token = snap.token(c);
        let (dx, dy) = snap.offset(c);
        let row = c.row as i32 + round_div(dy, snap.cell_size as i32);
        let col = c.col as i32 + round_div(dx, snap.cell_size as i32);

        let bg = self.cell_bg(fb, frame, row, col);
        let style = match token {
            Token::Empty => CellStyle::new(Rgb::new(90, 90, 100), bg).dim(),
            Token::Gem { kind, special } => {
                let style = CellStyle::new(kind_color(kind), bg);
                if special {
                    style.bold()
                } else {
                    style
                }
            }
        };

        if let Some((x, y)) = self.cell_xy(frame, snap, row, col) {
            fb.put_char(x, y, token_glyph(token), style);
        }
    }

    /// Glyph position (left column) of a cell, clipped to the board.
    fn cell_xy(&self, frame: Frame, snap: &GameSnapshot, row: i32, col: i32) -> Option<(u16, u16)> {
        if row < 0 || col < 0 || row >= snap.rows as i32 || col >= snap.columns as i32 {
            return None;
        }
        Some((
            frame.x + 1 + col as u16 * self.cell_w,
            frame.y + 1 + row as u16 * self.cell_h,
        ))
    }

    /// Background already painted at a cell (keeps highlights under moving tokens).
    fn cell_bg(&self, fb: &FrameBuffer, frame: Frame, row: i32, col: i32) -> Rgb {
        if row < 0 || col < 0 {
            return BOARD_BG;
        }
        let x = frame.x + 1 + col as u16 * self.cell_w;
        let y = frame.y + 1 + row as u16 * self.cell_h;
        fb.get(x, y).map(|c| c.style.bg).unwrap_or(BOARD_BG)
    }

    fn fill_cell(&self, fb: &mut FrameBuffer, frame: Frame, row: i32, col: i32, ch: char, style: CellStyle) {
        if row < 0 || col < 0 {
            return;
        }
        let (row, col) = (row as u16, col as u16);
        let board_rows = (frame.h - 2) / self.cell_h;
        let board_cols = (frame.w - 2) / self.cell_w;
        if row >= board_rows || col >= board_cols {
            return;
        }
        let px = frame.x + 1 + col * self.cell_w;
        let py = frame.y + 1 + row * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        status: &StatusView,
        viewport: Viewport,
        frame: Frame,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let accent = CellStyle::new(Rgb::new(120, 220, 120), Rgb::new(0, 0, 0));

        let mut y = frame.y;
        fb.put_str(panel_x, y, "SCORE", label);
        y += 1;
        let x = fb.put_u32(panel_x, y, snap.score, value);
        if snap.pending_score_delta > 0 {
            let x = fb.put_str(x + 1, y, "+", accent);
            fb.put_u32(x, y, snap.pending_score_delta, accent);
        }
        y += 2;

        fb.put_str(panel_x, y, "TIME", label);
        y += 1;
        if snap.timed {
            fb.put_clock(panel_x, y, snap.remaining_ms, value);
        } else {
            fb.put_str(panel_x, y, "--:--", value);
        }
        y += 2;

        fb.put_str(panel_x, y, "MOVES", label);
        y += 1;
        fb.put_u32(panel_x, y, snap.moves, value);
        y += 2;

        fb.put_str(panel_x, y, "CHAIN", label);
        y += 1;
        let x = fb.put_u32(panel_x, y, snap.chain, value);
        let dim = value.dim();
        let x = fb.put_str(x + 1, y, "best ", dim);
        fb.put_u32(x, y, snap.best_chain, dim);
        y += 2;

        fb.put_str(panel_x, y, "PHASE", label);
        y += 1;
        fb.put_str(panel_x, y, phase_label(snap.phase), value);
        y += 2;

        fb.put_str(panel_x, y, "AI", label);
        y += 1;
        match status.ai {
            AiStatus::Off => fb.put_str(panel_x, y, "OFF", value),
            AiStatus::Auto => fb.put_str(panel_x, y, "AUTO", accent),
            AiStatus::Remote { pending: false } => fb.put_str(panel_x, y, "ON", value),
            AiStatus::Remote { pending: true } => fb.put_str(panel_x, y, "ON *", accent),
        };

        if let Some(code) = status.last_error {
            y += 2;
            let warn = CellStyle::new(Rgb::new(230, 120, 80), Rgb::new(0, 0, 0));
            fb.put_str(panel_x, y, code, warn);
        }
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, frame: Frame, text: &str) {
        let mid_y = frame.y.saturating_add(frame.h / 2);
        let text_w = text.chars().count() as u16;
        let x = frame.x.saturating_add(frame.w.saturating_sub(text_w) / 2);
        let style = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        fb.put_str(x, mid_y, text, style);
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "IDLE",
        Phase::Swapping => "SWAP",
        Phase::Resolving => "MATCH",
        Phase::Collapsing => "FALL",
    }
}

/// Integer division rounded half away from zero.
fn round_div(n: i32, d: i32) -> i32 {
    if d <= 0 {
        return 0;
    }
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}
