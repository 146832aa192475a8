//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: no widget toolkit, just a
//! framebuffer of styled cells that is diffed and flushed to the terminal.
//!
//! - [`GameView`] turns a [`core::GameSnapshot`] into a framebuffer (pure)
//! - [`TerminalRenderer`] owns the terminal and writes changed cells
//! - Board cells are 2 columns by 1 row to keep gems roughly square

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_jewels_core as core;
pub use tui_jewels_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{
    chain_callout, kind_color, token_glyph, AiStatus, AnchorY, GameView, StatusView, Viewport,
};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
