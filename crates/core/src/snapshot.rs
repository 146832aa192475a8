use crate::cascade::CascadeReport;
use crate::types::{Coord, Phase, Token};

/// Read-only view of a session, written once per frame.
///
/// Grids are row-major with `rows * columns` entries. `cursor` and
/// `selection` belong to the front end; [`GameState::snapshot_into`]
/// leaves them alone.
///
/// [`GameState::snapshot_into`]: crate::GameState::snapshot_into
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub rows: u8,
    pub columns: u8,
    pub cell_size: u32,
    /// Token codes: 0 = empty, kind + 1 otherwise
    pub codes: Vec<u8>,
    pub special: Vec<bool>,
    /// Per-cell animation offset (dx, dy) in presentation units
    pub offsets: Vec<(i32, i32)>,
    pub phase: Phase,
    pub pending_score_delta: u32,
    pub score: u32,
    pub chain: u32,
    pub best_chain: u32,
    pub moves: u32,
    pub timed: bool,
    pub remaining_ms: u32,
    pub paused: bool,
    pub round_over: bool,
    pub episode_id: u32,
    pub last_cascade: Option<CascadeReport>,
    pub cursor: Option<Coord>,
    pub selection: Option<Coord>,
}

impl GameSnapshot {
    #[inline]
    pub fn index(&self, c: Coord) -> Option<usize> {
        if c.row >= self.rows || c.col >= self.columns {
            return None;
        }
        Some(c.row as usize * self.columns as usize + c.col as usize)
    }

    pub fn token(&self, c: Coord) -> Token {
        match self.index(c) {
            Some(i) => Token::from_code(self.codes[i], self.special[i]),
            None => Token::Empty,
        }
    }

    pub fn offset(&self, c: Coord) -> (i32, i32) {
        self.index(c).map(|i| self.offsets[i]).unwrap_or((0, 0))
    }

    /// Accepting input: not paused and time left
    pub fn playable(&self) -> bool {
        !self.paused && !self.round_over
    }
}
