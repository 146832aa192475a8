//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no game logic, making them usable in any
//! context (board simulation, terminal rendering, AI protocol).
//!
//! # Board Dimensions
//!
//! The classic playfield is an 8x8 grid of gems, row 0 at the top:
//!
//! - **Rows**: 8 (indexed 0-7, top to bottom)
//! - **Columns**: 8 (indexed 0-7, left to right)
//! - **Token kinds**: 6 ordinary gem kinds (`0..6`)
//!
//! Dimensions are defaults only; the actual values travel in the core
//! crate's `GameConfig`.
//!
//! # Timing and Motion Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `ROUND_MS` | 60000 | Length of one timed round |
//! | `CELL_SIZE` | 64 | Presentation units per cell |
//! | `SWAP_STEP` | 3 | Presentation units travelled per swap tick |
//! | `FALL_STEP` | 3 | Presentation units travelled per gravity tick |
//! | `INTRO_STEP` | 8 | Presentation units per tick while the opening board drops in |
//!
//! Motion constants only decide how many ticks an animation lasts. They
//! never change the logical outcome of a move.
//!
//! # Scoring
//!
//! | Constant | Points |
//! |----------|--------|
//! | `THREE_RUN_POINTS` | 100 |
//! | `FOUR_RUN_POINTS` | 200 |
//! | `FIVE_RUN_POINTS` | 250 |
//! | `BONUS_POINTS` | 500 |
//!
//! # Examples
//!
//! ```
//! use tui_jewels_types::{Coord, Token, GameAction};
//!
//! let a = Coord::new(3, 4);
//! assert!(a.is_adjacent(Coord::new(3, 5)));
//! assert!(!a.is_adjacent(Coord::new(4, 5)));
//!
//! let gem = Token::gem(2);
//! assert!(gem.matches(Token::special(2)));
//! assert!(!gem.matches(Token::Empty));
//!
//! assert_eq!(GameAction::from_str("select"), Some(GameAction::Select));
//! ```

pub mod error;
pub mod moves;

pub use error::{BoardFault, ConfigError, MoveError};
pub use moves::{MoveSource, QueuedMoves};

/// Default number of rows (8)
pub const DEFAULT_ROWS: u8 = 8;

/// Default number of columns (8)
pub const DEFAULT_COLUMNS: u8 = 8;

/// Default number of ordinary gem kinds (6)
pub const DEFAULT_TOKEN_KINDS: u8 = 6;

/// Seed repair excludes up to four neighbour kinds, so five kinds always
/// leave at least one candidate.
pub const MIN_TOKEN_KINDS: u8 = 5;

/// Upper bound on gem kinds (sizes stack buffers used during seeding)
pub const MAX_TOKEN_KINDS: u8 = 16;

/// Smallest board edge that can hold a run
pub const MIN_BOARD_DIM: u8 = 3;

/// Largest supported board edge
pub const MAX_BOARD_DIM: u8 = 32;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Length of a timed round (60 seconds)
pub const ROUND_MS: u32 = 60_000;

/// Cell edge in presentation units
pub const CELL_SIZE: u32 = 64;

/// Presentation units covered per tick while two gems swap
pub const SWAP_STEP: u32 = 3;

/// Presentation units covered per tick while gems fall
pub const FALL_STEP: u32 = 3;

/// Presentation units covered per tick while a new board drops in
pub const INTRO_STEP: u32 = 8;

/// Points for each cleared run of three
pub const THREE_RUN_POINTS: u32 = 100;

/// Points for each cleared run of four
pub const FOUR_RUN_POINTS: u32 = 200;

/// Points for each cleared run of five or more
pub const FIVE_RUN_POINTS: u32 = 250;

/// Points for each run that consumed a special gem
pub const BONUS_POINTS: u32 = 500;


/// One cell's content.
///
/// The special flag only exists on gems, so an empty cell can never be
/// special.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Token {
    #[default]
    Empty,
    Gem { kind: u8, special: bool },
}

impl Token {
    /// An ordinary gem of the given kind
    pub const fn gem(kind: u8) -> Self {
        Token::Gem {
            kind,
            special: false,
        }
    }

    /// A special gem of the given kind
    pub const fn special(kind: u8) -> Self {
        Token::Gem {
            kind,
            special: true,
        }
    }

    pub fn kind(&self) -> Option<u8> {
        match *self {
            Token::Empty => None,
            Token::Gem { kind, .. } => Some(kind),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Token::Empty)
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Token::Gem { special: true, .. })
    }

    /// Two tokens match when both are gems of the same kind.
    ///
    /// The special flag does not take part in matching.
    pub fn matches(&self, other: Token) -> bool {
        match (self.kind(), other.kind()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Compact code used by snapshots and the wire protocol
    /// (`0` = empty, `kind + 1` otherwise).
    pub fn code(&self) -> u8 {
        match *self {
            Token::Empty => 0,
            Token::Gem { kind, .. } => kind + 1,
        }
    }

    pub fn from_code(code: u8, special: bool) -> Self {
        match code {
            0 => Token::Empty,
            c => Token::Gem {
                kind: c - 1,
                special,
            },
        }
    }
}

/// Grid coordinate; row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// True iff the two coordinates differ by exactly one step along exactly
    /// one axis (diagonals are not adjacent).
    pub fn is_adjacent(&self, other: Coord) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr + dc == 1
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Scan direction of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Cascade controller phase
///
/// - **Idle**: board is quiescent, waiting for a move
/// - **Swapping**: the committed pair is animating into place
/// - **Resolving**: runs are being detected and cleared
/// - **Collapsing**: gravity pulls gems into gaps and refills from the top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Swapping,
    Resolving,
    Collapsing,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Swapping => "swapping",
            Phase::Resolving => "resolving",
            Phase::Collapsing => "collapsing",
        }
    }
}

/// Counts produced by one resolve step (or summed over a cascade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatchCounts {
    pub three_runs: u32,
    pub four_runs: u32,
    /// Runs of five or more
    pub five_runs: u32,
    /// Runs that contained at least one special gem
    pub bonus_count: u32,
}

impl MatchCounts {
    pub fn total_runs(&self) -> u32 {
        self.three_runs + self.four_runs + self.five_runs
    }

    pub fn add(&mut self, other: MatchCounts) {
        self.three_runs += other.three_runs;
        self.four_runs += other.four_runs;
        self.five_runs += other.five_runs;
        self.bonus_count += other.bonus_count;
    }
}

/// Result of a resolve step.
///
/// `NoMatches` is the termination signal of the cascade loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    NoMatches,
    Cleared(MatchCounts),
}

impl ResolveOutcome {
    pub fn counts(&self) -> Option<MatchCounts> {
        match self {
            ResolveOutcome::NoMatches => None,
            ResolveOutcome::Cleared(c) => Some(*c),
        }
    }
}

/// Actions a human player (or the terminal front end) can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Pick the gem under the cursor (second pick proposes the swap)
    Select,
    /// Drop the current pick
    Cancel,
    /// Toggle pause state
    Pause,
    /// Start a fresh round
    Restart,
}

impl GameAction {
    /// Parse action from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tui_jewels_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("cursorLeft"), Some(GameAction::CursorLeft));
    /// assert_eq!(GameAction::from_str("PAUSE"), Some(GameAction::Pause));
    /// assert_eq!(GameAction::from_str("hint"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cursorup" => Some(GameAction::CursorUp),
            "cursordown" => Some(GameAction::CursorDown),
            "cursorleft" => Some(GameAction::CursorLeft),
            "cursorright" => Some(GameAction::CursorRight),
            "select" => Some(GameAction::Select),
            "cancel" => Some(GameAction::Cancel),
            "pause" => Some(GameAction::Pause),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::CursorUp => "cursorUp",
            GameAction::CursorDown => "cursorDown",
            GameAction::CursorLeft => "cursorLeft",
            GameAction::CursorRight => "cursorRight",
            GameAction::Select => "select",
            GameAction::Cancel => "cancel",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}
