//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the board rules, the cascade state machine and the
//! timed session around them. It has **zero dependencies** on UI, networking,
//! or I/O, making it:
//!
//! - **Deterministic**: Same seed and same moves produce identical games (for AI training)
//! - **Testable**: Unit tests for every board rule and phase transition
//! - **Portable**: Can run in any environment (terminal, headless trainer)
//! - **Fast**: Allocation-free hot paths for run scanning and snapshots
//!
//! # Module Structure
//!
//! - [`board`]: the gem grid; seeding, legality, run clearing, gravity and refill
//! - [`runs`]: maximal run detection, one linear pass per row and column
//! - [`cascade`]: tick-driven Idle / Swapping / Resolving / Collapsing controller
//! - [`motion`]: presentation-only interpolation counters
//! - [`game_state`]: the controller plus a round clock, score and pause/restart
//! - [`rng`]: seeded LCG behind every random decision
//! - [`scoring`]: point values per run type
//!
//! # Game Rules
//!
//! - A move swaps two orthogonally adjacent gems and is only legal if it lines
//!   up three or more of a kind.
//! - Every run is cleared. A run of exactly four leaves a special gem behind
//!   in its first cell; clearing a run that contains a special scores a bonus.
//! - Gems fall into the gaps, new gems drop in from the top, and the board
//!   is re-checked until nothing matches.
//! - A board with no legal move is reseeded.
//!
//! # Example
//!
//! ```
//! use tui_jewels_core::{GameConfig, GameState};
//!
//! let mut game = GameState::new(GameConfig::default().with_seed(12345)).unwrap();
//!
//! // Pick any legal move and play it to completion
//! let moves = game.board().clone().legal_moves();
//! let (a, b) = moves[0];
//! let report = game.play(a, b).unwrap();
//!
//! assert!(report.score_delta >= 100);
//! assert!(game.board().is_quiescent());
//! ```
//!
//! # Timing
//!
//! The front end calls [`GameState::tick`](game_state::GameState::tick)
//! every 16ms. A swap lasts `cell_size / swap_step` ticks and each gravity
//! step `cell_size / fall_step` ticks; these only pace the animation.

pub mod board;
pub mod cascade;
pub mod config;
#[doc(hidden)]
pub mod fixtures;
pub mod game_state;
pub mod motion;
pub mod rng;
pub mod round;
pub mod runs;
pub mod scoring;
pub mod snapshot;

pub use tui_jewels_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use cascade::{CascadeController, CascadeReport, TickEvent};
pub use config::{EnvFallback, GameConfig};
pub use game_state::GameState;
pub use motion::Motion;
pub use rng::SimpleRng;
pub use round::RoundClock;
pub use runs::{Run, MIN_RUN};
pub use scoring::ScoreTable;
pub use snapshot::GameSnapshot;
