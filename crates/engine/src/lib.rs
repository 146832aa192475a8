//! Automated move sources.
//!
//! Both policies work from a board reference handed to [`GreedyPolicy::plan`]
//! / [`RandomPolicy::plan`] while the game is idle, then hand the chosen pair
//! to the controller through [`MoveSource`](tui_jewels_types::MoveSource).

pub mod policy;

pub use tui_jewels_core as core;
pub use tui_jewels_types as types;

pub use policy::{simulate, GreedyPolicy, RandomPolicy, Simulation};
