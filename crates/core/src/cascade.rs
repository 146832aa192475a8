//! Cascade controller - the tick-driven state machine around the board
//!
//! ```text
//!            legal move                 motion done
//!   Idle ───────────────▶ Swapping ─────────────────▶ Resolving
//!    ▲                                                 │    ▲
//!    │ no matches                              cleared │    │ no slots left
//!    └─────────────────────────────────────────────────┘    │
//!                                                      ▼    │
//!                                                   Collapsing
//!                                              (one gravity step per
//!                                               finished fall motion)
//! ```
//!
//! Each call to [`CascadeController::tick`] performs exactly one state's
//! action. The logical swap happens when the move is accepted; the swap and
//! fall motions only decide how many ticks pass before the next logical step.
//! Refill is part of [`Board::collapse`], so there is no separate refill
//! phase.

use crate::board::Board;
use crate::config::GameConfig;
use crate::motion::Motion;
use crate::runs::Run;
use crate::types::{ConfigError, Coord, MatchCounts, MoveError, MoveSource, Phase, ResolveOutcome};

/// Upper bound on back-to-back reseeds when a fresh board has no legal move.
const MAX_RESHUFFLES: u32 = 32;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Idle and the move source had nothing to offer
    Waiting,
    /// Idle; the proposed move was refused and the board is unchanged
    Rejected(MoveError),
    /// A legal move was committed (the board is already swapped)
    SwapStarted { a: Coord, b: Coord },
    /// Swap animation in progress (or just finished)
    Swapping,
    /// One resolve step cleared runs. `chain` is 1 for the move's own clear.
    Cleared { counts: MatchCounts, chain: u32 },
    /// Resolve found nothing; the cascade is over and the board is quiescent
    Settled,
    /// Fall animation in progress
    Falling,
    /// One gravity step applied to this many drop slots
    Collapsed { slots: u32 },
    /// Idle board had no legal move and was reseeded
    Reshuffled,
}

/// Summary of one fully resolved cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    pub counts: MatchCounts,
    /// Number of resolve steps that cleared something
    pub chain: u32,
    pub score_delta: u32,
    pub gravity_steps: u32,
    /// The settled board had no legal move and was reseeded
    pub reshuffled: bool,
}

#[derive(Debug, Clone)]
pub struct CascadeController {
    config: GameConfig,
    board: Board,
    phase: Phase,
    motion: Motion,
    swap_pair: Option<(Coord, Coord)>,
    /// Drop slots of the gravity step currently animating
    slots: Vec<Coord>,
    /// Scratch for the runs of the current resolve step
    runs: Vec<Run>,
    chain: u32,
    gravity_steps: u32,
    counts: MatchCounts,
    pending_score_delta: u32,
    last_cascade: Option<CascadeReport>,
    /// Set whenever Idle is (re)entered; cleared once a legal move is known to exist.
    check_deadlock: bool,
}

impl CascadeController {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let board = Board::new(&config)?;
        Ok(Self::with_board(config, board))
    }

    /// Drive an existing board (e.g. one built with [`Board::from_kinds`]).
    pub fn with_board(config: GameConfig, board: Board) -> Self {
        Self {
            config,
            board,
            phase: Phase::Idle,
            motion: Motion::default(),
            swap_pair: None,
            slots: Vec::with_capacity(config.columns as usize * 2),
            runs: Vec::new(),
            chain: 0,
            gravity_steps: 0,
            counts: MatchCounts::default(),
            pending_score_delta: 0,
            last_cascade: None,
            check_deadlock: true,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for direct injection. Only meaningful while idle.
    pub fn board_mut(&mut self) -> &mut Board {
        self.check_deadlock = true;
        &mut self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Resolve step index within the running cascade (0 when idle)
    pub fn chain(&self) -> u32 {
        self.chain
    }

    /// Points earned so far by the running cascade
    pub fn pending_score_delta(&self) -> u32 {
        self.pending_score_delta
    }

    /// Runs cleared so far by the running cascade
    pub fn cascade_counts(&self) -> MatchCounts {
        self.counts
    }

    pub fn last_cascade(&self) -> Option<&CascadeReport> {
        self.last_cascade.as_ref()
    }

    pub fn take_last_cascade(&mut self) -> Option<CascadeReport> {
        self.last_cascade.take()
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn swap_pair(&self) -> Option<(Coord, Coord)> {
        self.swap_pair
    }

    /// Drop slots of the gravity step being animated
    pub fn drop_slots(&self) -> &[Coord] {
        &self.slots
    }

    /// Commit a move. Only accepted while idle, for an adjacent pair whose
    /// swap creates a run. A refused move leaves everything unchanged.
    pub fn try_move(&mut self, a: Coord, b: Coord) -> Result<(), MoveError> {
        if self.phase != Phase::Idle {
            return Err(MoveError::NotIdle { phase: self.phase });
        }
        self.board.check_swap(a, b)?;

        self.board.swap(a, b);
        self.swap_pair = Some((a, b));
        self.motion = Motion::new(self.config.cell_size, self.config.swap_step);
        self.phase = Phase::Swapping;
        self.chain = 0;
        self.gravity_steps = 0;
        self.counts = MatchCounts::default();
        self.pending_score_delta = 0;
        Ok(())
    }

    /// Run exactly one state's action.
    pub fn tick(&mut self, source: &mut dyn MoveSource) -> TickEvent {
        match self.phase {
            Phase::Idle => self.tick_idle(source),
            Phase::Swapping => {
                if self.motion.advance() {
                    self.swap_pair = None;
                    self.phase = Phase::Resolving;
                }
                TickEvent::Swapping
            }
            Phase::Resolving => self.tick_resolving(),
            Phase::Collapsing => self.tick_collapsing(),
        }
    }

    fn tick_idle(&mut self, source: &mut dyn MoveSource) -> TickEvent {
        if self.check_deadlock && self.ensure_playable() {
            return TickEvent::Reshuffled;
        }

        let Some((a, b)) = source.propose_move() else {
            return TickEvent::Waiting;
        };

        let result = self.try_move(a, b);
        source.feedback(result);
        match result {
            Ok(()) => TickEvent::SwapStarted { a, b },
            Err(e) => TickEvent::Rejected(e),
        }
    }

    fn tick_resolving(&mut self) -> TickEvent {
        match self.board.resolve_matches_with(&mut self.runs) {
            ResolveOutcome::NoMatches => {
                self.finish_cascade();
                TickEvent::Settled
            }
            ResolveOutcome::Cleared(counts) => {
                self.chain += 1;
                self.counts.add(counts);
                self.pending_score_delta = self
                    .pending_score_delta
                    .saturating_add(self.config.scores.points(&counts));

                self.board.compute_drop_slots_into(&mut self.slots);
                if !self.slots.is_empty() {
                    self.motion = Motion::new(self.config.cell_size, self.config.fall_step);
                    self.phase = Phase::Collapsing;
                }
                TickEvent::Cleared {
                    counts,
                    chain: self.chain,
                }
            }
        }
    }

    fn tick_collapsing(&mut self) -> TickEvent {
        if !self.motion.advance() {
            return TickEvent::Falling;
        }

        self.board.collapse(&self.slots);
        self.gravity_steps += 1;
        let applied = self.slots.len() as u32;

        self.board.compute_drop_slots_into(&mut self.slots);
        if self.slots.is_empty() {
            debug_assert_eq!(self.board.empty_count(), 0);
            self.phase = Phase::Resolving;
        } else {
            self.motion = Motion::new(self.config.cell_size, self.config.fall_step);
        }
        TickEvent::Collapsed { slots: applied }
    }

    fn finish_cascade(&mut self) {
        debug_assert!(
            self.board.check_quiescent().is_ok(),
            "cascade ended on a non-quiescent board"
        );

        if self.chain > 0 {
            self.last_cascade = Some(CascadeReport {
                counts: self.counts,
                chain: self.chain,
                score_delta: self.pending_score_delta,
                gravity_steps: self.gravity_steps,
                reshuffled: false,
            });
        }
        self.phase = Phase::Idle;
        self.motion = Motion::default();
        self.slots.clear();
        self.chain = 0;
        self.gravity_steps = 0;
        self.counts = MatchCounts::default();
        self.pending_score_delta = 0;
        self.check_deadlock = true;
    }

    /// Reseed while the idle board has no legal move. Returns true if the
    /// board was reseeded.
    fn ensure_playable(&mut self) -> bool {
        let mut reseeded = false;
        for _ in 0..MAX_RESHUFFLES {
            if self.board.has_legal_move() {
                self.check_deadlock = false;
                return reseeded;
            }
            self.board.reshuffle();
            reseeded = true;
        }
        // Still stuck; try again next idle tick.
        reseeded
    }

    /// Tick until the controller is idle again and return the finished
    /// cascade. From idle this only runs the deadlock check.
    pub fn settle(&mut self) -> CascadeReport {
        let mut report = CascadeReport::default();
        let mut nothing = ();
        while self.phase != Phase::Idle {
            if self.tick(&mut nothing) == TickEvent::Settled {
                if let Some(r) = self.last_cascade {
                    report = r;
                }
            }
        }
        if self.check_deadlock && self.ensure_playable() {
            report.reshuffled = true;
            if let Some(r) = self.last_cascade.as_mut() {
                r.reshuffled = true;
            }
        }
        report
    }

    /// Commit a move and run its cascade to completion.
    pub fn play(&mut self, a: Coord, b: Coord) -> Result<CascadeReport, MoveError> {
        self.try_move(a, b)?;
        Ok(self.settle())
    }

    /// Offset, in presentation units, at which the token in `c` should be
    /// drawn this frame. Positive `dy` is downward.
    pub fn cell_offset(&self, c: Coord) -> (i32, i32) {
        match self.phase {
            Phase::Swapping => {
                let Some((a, b)) = self.swap_pair else {
                    return (0, 0);
                };
                // The board is already swapped: each token is still on its
                // way from the other cell.
                let from = if c == a {
                    b
                } else if c == b {
                    a
                } else {
                    return (0, 0);
                };
                let remaining = self.motion.remaining() as i32;
                (
                    (from.col as i32 - c.col as i32) * remaining,
                    (from.row as i32 - c.row as i32) * remaining,
                )
            }
            Phase::Collapsing => {
                let gaps_below = self
                    .slots
                    .iter()
                    .filter(|s| s.col == c.col && s.row > c.row)
                    .count() as i32;
                (0, gaps_below * self.motion.progress() as i32)
            }
            _ => (0, 0),
        }
    }

    /// Start over on a fresh board seeded from `seed`.
    pub fn reset(&mut self, seed: u32) -> Result<(), ConfigError> {
        let config = self.config.with_seed(seed);
        *self = Self::new(config)?;
        Ok(())
    }
}
