//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] and turns
//! cursor/selection actions into swap proposals through [`Selector`], the
//! human [`MoveSource`](crate::types::MoveSource).

pub mod map;
pub mod selector;

pub use tui_jewels_types as types;

pub use map::{handle_key_event, map_keys, should_quit, MAX_ACTIONS_PER_FRAME};
pub use selector::Selector;
