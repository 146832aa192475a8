//! TUI Jewels (workspace facade crate).
//!
//! Re-exports the member crates as `tui_jewels::{core,adapter,term,input,engine,types}`
//! so the binary, integration tests and benches share one import path.

pub use tui_jewels_adapter as adapter;
pub use tui_jewels_core as core;
pub use tui_jewels_engine as engine;
pub use tui_jewels_input as input;
pub use tui_jewels_term as term;
pub use tui_jewels_types as types;
