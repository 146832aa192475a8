//! Board module - manages the gem grid
//!
//! The board is a `rows x columns` grid (8x8 by default) of [`Token`]s,
//! stored as a flat row-major `Vec` that is allocated once and mutated in
//! place for the rest of the game.
//! Coordinates: (row, col) where row 0 is the top row and col 0 the left column.
//!
//! Everything here is deterministic given the board's RNG state: seeding,
//! seed repair and refill all draw from the same [`SimpleRng`].

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::rng::SimpleRng;
use crate::runs::{self, Run};
use crate::types::{
    BoardFault, ConfigError, Coord, MatchCounts, MoveError, ResolveOutcome, Token,
    MAX_TOKEN_KINDS,
};

/// The gem grid
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: u8,
    columns: u8,
    token_kinds: u8,
    /// Flat array of cells, row-major order (row * columns + col)
    cells: Vec<Token>,
    rng: SimpleRng,
}

impl Board {
    /// Create a freshly seeded board.
    ///
    /// The result contains no run of three or more.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Self::blank(config);
        board.seed();
        Ok(board)
    }

    pub fn with_seed(config: &GameConfig, seed: u32) -> Result<Self, ConfigError> {
        Self::new(&config.with_seed(seed))
    }

    /// Build a board from explicit gem kinds, bypassing seeding.
    ///
    /// `kinds[row][col]`; the rows must match the configured size and every
    /// kind must be below `config.token_kinds`. The RNG (used for later
    /// refills) still comes from `config.seed`.
    pub fn from_kinds<R: AsRef<[u8]>>(
        config: &GameConfig,
        kinds: &[R],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let shape_ok = kinds.len() == config.rows as usize
            && kinds.iter().all(|r| r.as_ref().len() == config.columns as usize);
        if !shape_ok {
            return Err(ConfigError::InvalidDimensions {
                rows: kinds.len().min(u8::MAX as usize) as u8,
                columns: kinds
                    .first()
                    .map(|r| r.as_ref().len().min(u8::MAX as usize) as u8)
                    .unwrap_or(0),
            });
        }

        let mut board = Self::blank(config);
        for (r, row) in kinds.iter().enumerate() {
            for (c, &k) in row.as_ref().iter().enumerate() {
                if k >= config.token_kinds {
                    return Err(ConfigError::KindOutOfRange {
                        at: Coord::new(r as u8, c as u8),
                        kind: k,
                        token_kinds: config.token_kinds,
                    });
                }
                board.cells[r * config.columns as usize + c] = Token::gem(k);
            }
        }
        Ok(board)
    }

    fn blank(config: &GameConfig) -> Self {
        Self {
            rows: config.rows,
            columns: config.columns,
            token_kinds: config.token_kinds,
            cells: vec![Token::Empty; config.cell_count()],
            rng: SimpleRng::new(config.seed),
        }
    }

    /// Calculate flat index from a coordinate
    #[inline(always)]
    fn index(&self, c: Coord) -> Option<usize> {
        if c.row >= self.rows || c.col >= self.columns {
            return None;
        }
        Some(c.row as usize * self.columns as usize + c.col as usize)
    }

    #[inline(always)]
    fn at(&self, row: u8, col: u8) -> Token {
        self.cells[row as usize * self.columns as usize + col as usize]
    }

    #[inline(always)]
    fn put(&mut self, row: u8, col: u8, t: Token) {
        let w = self.columns as usize;
        self.cells[row as usize * w + col as usize] = t;
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn token_kinds(&self) -> u8 {
        self.token_kinds
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        self.index(c).is_some()
    }

    /// Get the token at `c`; `None` if out of bounds
    pub fn get(&self, c: Coord) -> Option<Token> {
        self.index(c).map(|i| self.cells[i])
    }

    /// Set the token at `c`. Returns false if out of bounds.
    pub fn set(&mut self, c: Coord, token: Token) -> bool {
        match self.index(c) {
            Some(i) => {
                self.cells[i] = token;
                true
            }
            None => false,
        }
    }

    /// Row-major view of the grid
    pub fn cells(&self) -> &[Token] {
        &self.cells
    }

    /// RNG state, enough to continue this board's random stream elsewhere
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    // ---------------------------------------------------------------------
    // Seeding
    // ---------------------------------------------------------------------

    /// Fill every cell with a random gem, then break up any accidental runs.
    ///
    /// Repair runs horizontally then vertically. Each offending streak has
    /// its first cell replaced by a kind that differs from all four
    /// orthogonal neighbours. Such a cell can no longer be part of any run,
    /// and because repairs never create runs, one pass is enough.
    pub fn seed(&mut self) {
        for i in 0..self.cells.len() {
            self.cells[i] = Token::gem(self.rng.next_kind(self.token_kinds));
        }

        for r in 0..self.rows {
            for c in 0..self.columns.saturating_sub(2) {
                let t = self.at(r, c);
                if t.matches(self.at(r, c + 1)) && t.matches(self.at(r, c + 2)) {
                    self.repair_cell(r, c);
                }
            }
        }

        for r in 0..self.rows.saturating_sub(2) {
            for c in 0..self.columns {
                let t = self.at(r, c);
                if t.matches(self.at(r + 1, c)) && t.matches(self.at(r + 2, c)) {
                    self.repair_cell(r, c);
                }
            }
        }

        debug_assert!(!self.has_run(), "seeded board contains a run");
    }

    /// Discard the current grid and seed a new one from the running RNG (deadlock recovery).
    pub fn reshuffle(&mut self) {
        self.seed();
    }

    fn repair_cell(&mut self, r: u8, c: u8) {
        let mut excluded: ArrayVec<u8, 4> = ArrayVec::new();
        let neighbours = [
            (r.checked_sub(1), Some(c)),
            (Some(r + 1).filter(|&x| x < self.rows), Some(c)),
            (Some(r), c.checked_sub(1)),
            (Some(r), Some(c + 1).filter(|&x| x < self.columns)),
        ];
        for (nr, nc) in neighbours {
            if let (Some(nr), Some(nc)) = (nr, nc) {
                if let Some(k) = self.at(nr, nc).kind() {
                    if !excluded.contains(&k) {
                        excluded.push(k);
                    }
                }
            }
        }

        let mut candidates: ArrayVec<u8, { MAX_TOKEN_KINDS as usize }> = ArrayVec::new();
        for k in 0..self.token_kinds {
            if !excluded.contains(&k) {
                candidates.push(k);
            }
        }

        // Only reachable with fewer than five kinds.
        let kind = match self.rng.choose(&candidates) {
            Some(k) => k,
            None => self.rng.next_kind(self.token_kinds),
        };
        self.put(r, c, Token::gem(kind));
    }

    // ---------------------------------------------------------------------
    // Moves
    // ---------------------------------------------------------------------

    /// True iff both cells are on the board and orthogonally adjacent
    pub fn is_adjacent(&self, a: Coord, b: Coord) -> bool {
        self.in_bounds(a) && self.in_bounds(b) && a.is_adjacent(b)
    }

    /// Exchange two cells' tokens (kind and special flag together).
    ///
    /// No legality or adjacency check. Returns false (and does nothing) if
    /// either coordinate is off the board.
    pub fn swap(&mut self, a: Coord, b: Coord) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// True iff `a` and `b` are adjacent and swapping them creates a run.
    ///
    /// Swaps speculatively and always swaps back, so the grid is unchanged
    /// whatever the answer.
    pub fn is_legal_swap(&mut self, a: Coord, b: Coord) -> bool {
        if !self.is_adjacent(a, b) {
            return false;
        }
        self.swap(a, b);
        let legal = self.has_run();
        self.swap(a, b);
        legal
    }

    /// Like [`Board::is_legal_swap`], but says why a move is refused.
    pub fn check_swap(&mut self, a: Coord, b: Coord) -> Result<(), MoveError> {
        if !self.is_adjacent(a, b) {
            return Err(MoveError::InvalidMove { a, b });
        }
        if !self.is_legal_swap(a, b) {
            return Err(MoveError::NoMatch { a, b });
        }
        Ok(())
    }

    /// Every legal swap, each pair listed once (right and down neighbours).
    pub fn legal_moves_into(&mut self, out: &mut Vec<(Coord, Coord)>) {
        out.clear();
        for r in 0..self.rows {
            for c in 0..self.columns {
                let a = Coord::new(r, c);
                for b in [Coord::new(r, c + 1), Coord::new(r + 1, c)] {
                    if self.is_legal_swap(a, b) {
                        out.push((a, b));
                    }
                }
            }
        }
    }

    pub fn legal_moves(&mut self) -> Vec<(Coord, Coord)> {
        let mut out = Vec::new();
        self.legal_moves_into(&mut out);
        out
    }

    pub fn has_legal_move(&mut self) -> bool {
        for r in 0..self.rows {
            for c in 0..self.columns {
                let a = Coord::new(r, c);
                if self.is_legal_swap(a, Coord::new(r, c + 1))
                    || self.is_legal_swap(a, Coord::new(r + 1, c))
                {
                    return true;
                }
            }
        }
        false
    }

    // ---------------------------------------------------------------------
    // Runs
    // ---------------------------------------------------------------------

    /// All maximal runs, horizontal runs first (row by row), then vertical
    /// runs (column by column).
    pub fn find_runs(&self) -> Vec<Run> {
        let mut out = Vec::new();
        self.find_runs_into(&mut out);
        out
    }

    /// Allocation-free variant of [`Board::find_runs`]
    pub fn find_runs_into(&self, out: &mut Vec<Run>) {
        out.clear();
        runs::scan(&self.cells, self.rows, self.columns, |run| {
            out.push(run);
            true
        });
    }

    /// True if at least one run exists (stops at the first one)
    pub fn has_run(&self) -> bool {
        !runs::scan(&self.cells, self.rows, self.columns, |_| false)
    }

    /// Clear every run on the board.
    ///
    /// All runs are detected before anything changes. A run containing a
    /// special gem counts a bonus. Every run cell is emptied, then each run of
    /// exactly four gets its first cell back as a special gem of the run's
    /// kind (so promotion wins over a crossing run). Runs of five or more
    /// clear without promotion.
    pub fn resolve_matches(&mut self) -> ResolveOutcome {
        let mut found = Vec::new();
        self.resolve_matches_with(&mut found)
    }

    /// [`Board::resolve_matches`] using `found` as scratch space for the runs.
    pub fn resolve_matches_with(&mut self, found: &mut Vec<Run>) -> ResolveOutcome {
        self.find_runs_into(found);
        if found.is_empty() {
            return ResolveOutcome::NoMatches;
        }

        let mut counts = MatchCounts::default();
        for run in found.iter() {
            if run.cells().any(|c| self.at(c.row, c.col).is_special()) {
                counts.bonus_count += 1;
            }
            match run.len {
                3 => counts.three_runs += 1,
                4 => counts.four_runs += 1,
                _ => counts.five_runs += 1,
            }
        }

        for run in found.iter() {
            for c in run.cells() {
                self.put(c.row, c.col, Token::Empty);
            }
        }

        for run in found.iter().filter(|r| r.len == 4) {
            let first = run.first();
            self.put(first.row, first.col, Token::special(run.kind));
        }

        ResolveOutcome::Cleared(counts)
    }

    // ---------------------------------------------------------------------
    // Gravity
    // ---------------------------------------------------------------------

    /// Bottom cell of every contiguous empty gap, ordered by column and then
    /// top to bottom within a column.
    pub fn compute_drop_slots(&self) -> Vec<Coord> {
        let mut out = Vec::new();
        self.compute_drop_slots_into(&mut out);
        out
    }

    /// Allocation-free variant of [`Board::compute_drop_slots`]
    pub fn compute_drop_slots_into(&self, out: &mut Vec<Coord>) {
        out.clear();
        for c in 0..self.columns {
            for r in 0..self.rows {
                let gap_bottom = self.at(r, c).is_empty()
                    && (r + 1 == self.rows || !self.at(r + 1, c).is_empty());
                if gap_bottom {
                    out.push(Coord::new(r, c));
                }
            }
        }
    }

    /// Apply one gravity step.
    ///
    /// For each slot, every cell from the slot up to row 1 takes the token of
    /// the cell above it and row 0 receives a fresh random gem. Slots within a
    /// column are applied top gap first so a lower shift never overwrites a
    /// gem an upper shift just moved. A gap of depth `d` needs `d` calls.
    pub fn collapse(&mut self, drop_slots: &[Coord]) {
        let in_order = drop_slots
            .windows(2)
            .all(|w| (w[0].col, w[0].row) < (w[1].col, w[1].row));
        if in_order {
            // Already as compute_drop_slots returns them.
            for &slot in drop_slots {
                self.shift_down(slot);
            }
            return;
        }

        let mut ordered = drop_slots.to_vec();
        ordered.sort_by_key(|c| (c.col, c.row));
        ordered.dedup();
        for slot in ordered {
            self.shift_down(slot);
        }
    }

    fn shift_down(&mut self, slot: Coord) {
        if !self.in_bounds(slot) {
            return;
        }
        let col = slot.col;
        for r in (1..=slot.row).rev() {
            let above = self.at(r - 1, col);
            self.put(r, col, above);
        }
        let fresh = Token::gem(self.rng.next_kind(self.token_kinds));
        self.put(0, col, fresh);
    }

    /// Repeat drop-slot computation and collapse until no cell is empty.
    ///
    /// Returns the number of gravity steps applied.
    pub fn collapse_fully(&mut self) -> u32 {
        let mut slots = Vec::new();
        let mut steps = 0;
        loop {
            self.compute_drop_slots_into(&mut slots);
            if slots.is_empty() {
                return steps;
            }
            self.collapse(&slots);
            steps += 1;
        }
    }

    // ---------------------------------------------------------------------
    // Invariants
    // ---------------------------------------------------------------------

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_empty()).count()
    }

    /// No empty cells and no runs
    pub fn is_quiescent(&self) -> bool {
        self.empty_count() == 0 && !self.has_run()
    }

    /// Report the first broken quiescence invariant, if any.
    pub fn check_quiescent(&self) -> Result<(), BoardFault> {
        if let Some(i) = self.cells.iter().position(|t| t.is_empty()) {
            let w = self.columns as usize;
            return Err(BoardFault::EmptyCell(Coord::new(
                (i / w) as u8,
                (i % w) as u8,
            )));
        }
        if let Some(run) = self.find_runs().first() {
            return Err(BoardFault::LeftoverRun {
                start: run.start,
                len: run.len,
            });
        }
        Ok(())
    }

    /// Write token codes and special flags row-major into the given buffers.
    pub fn write_code_grid(&self, codes: &mut Vec<u8>, special: &mut Vec<bool>) {
        codes.clear();
        special.clear();
        codes.extend(self.cells.iter().map(|t| t.code()));
        special.extend(self.cells.iter().map(|t| t.is_special()));
    }
}
