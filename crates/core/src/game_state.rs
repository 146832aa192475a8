//! Game session: the cascade controller plus a timed round and a score.

use crate::board::Board;
use crate::cascade::{CascadeController, CascadeReport, TickEvent};
use crate::config::GameConfig;
use crate::motion::Motion;
use crate::round::RoundClock;
use crate::snapshot::GameSnapshot;
use crate::types::{ConfigError, Coord, GameAction, MoveError, MoveSource, Phase};

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    controller: CascadeController,
    clock: RoundClock,
    /// Opening drop-in of a fresh board. Presentation only.
    intro: Motion,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    score: u32,
    /// Accepted moves this round
    moves: u32,
    best_chain: u32,
    paused: bool,
}

impl GameState {
    /// Create a new round. Fails only on an invalid configuration.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        let controller = CascadeController::new(config)?;
        Ok(Self::from_controller(config, controller))
    }

    /// Start a round on a hand-built board.
    pub fn with_board(config: GameConfig, board: Board) -> Self {
        Self::from_controller(config, CascadeController::with_board(config, board))
    }

    fn from_controller(config: GameConfig, controller: CascadeController) -> Self {
        Self {
            config,
            controller,
            clock: RoundClock::new(config.round_ms),
            intro: match config.intro_step {
                0 => Motion::default(),
                step => Motion::new(config.rows as u32 * config.cell_size, step),
            },
            episode_id: 0,
            score: 0,
            moves: 0,
            best_chain: 0,
            paused: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn controller(&self) -> &CascadeController {
        &self.controller
    }

    pub fn board(&self) -> &Board {
        self.controller.board()
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn clock(&self) -> &RoundClock {
        &self.clock
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn best_chain(&self) -> u32 {
        self.best_chain
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn round_over(&self) -> bool {
        self.clock.is_over()
    }

    /// True while a fresh board is still dropping into place
    pub fn intro_running(&self) -> bool {
        !self.intro.is_done()
    }

    /// True when a new move would be accepted
    pub fn accepting_moves(&self) -> bool {
        !self.paused && !self.intro_running() && !self.clock.is_over() && self.controller.is_idle()
    }

    /// Advance the round clock and the controller by one tick.
    ///
    /// Paused: nothing moves. Intro: only the drop-in advances; the clock
    /// starts once the board has landed. Time up: a cascade already running
    /// still settles, but the move source is no longer asked.
    pub fn tick(&mut self, elapsed_ms: u32, source: &mut dyn MoveSource) -> TickEvent {
        if self.paused {
            return TickEvent::Waiting;
        }
        if self.intro_running() {
            self.intro.advance();
            return TickEvent::Waiting;
        }

        self.clock.tick(elapsed_ms);
        if self.clock.is_over() && self.controller.is_idle() {
            return TickEvent::Waiting;
        }

        let event = self.controller.tick(source);
        self.record(event);
        event
    }

    fn record(&mut self, event: TickEvent) {
        match event {
            TickEvent::SwapStarted { .. } => {
                self.moves = self.moves.wrapping_add(1);
            }
            TickEvent::Cleared { counts, chain } => {
                self.score = self
                    .score
                    .saturating_add(self.config.scores.points(&counts));
                self.best_chain = self.best_chain.max(chain);
            }
            _ => {}
        }
    }

    /// Play one move to completion without animation ticks (headless agents).
    ///
    /// Skips whatever is left of the intro.
    pub fn play(&mut self, a: Coord, b: Coord) -> Result<CascadeReport, MoveError> {
        if self.paused || self.clock.is_over() {
            return Err(MoveError::NotIdle {
                phase: self.controller.phase(),
            });
        }
        let report = self.controller.play(a, b)?;
        self.intro = Motion::default();
        self.moves = self.moves.wrapping_add(1);
        self.score = self.score.saturating_add(report.score_delta);
        self.best_chain = self.best_chain.max(report.chain);
        Ok(report)
    }

    /// Apply a session-level action.
    ///
    /// Cursor and selection actions belong to the front end's selector and
    /// are ignored here (returns false).
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Pause => {
                self.paused = !self.paused;
                true
            }
            GameAction::Restart => {
                let next_episode = self.episode_id.wrapping_add(1);
                // The config was validated when this state was built.
                match Self::new(self.config) {
                    Ok(fresh) => {
                        *self = fresh;
                        self.episode_id = next_episode;
                        true
                    }
                    Err(_) => false,
                }
            }
            GameAction::CursorUp
            | GameAction::CursorDown
            | GameAction::CursorLeft
            | GameAction::CursorRight
            | GameAction::Select
            | GameAction::Cancel => false,
        }
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        let board = self.controller.board();
        out.rows = board.rows();
        out.columns = board.columns();
        out.cell_size = self.config.cell_size;
        board.write_code_grid(&mut out.codes, &mut out.special);

        // The whole board sits `remaining` units above its cells during the intro.
        let lift = self.intro.remaining() as i32;
        out.offsets.clear();
        for r in 0..board.rows() {
            for c in 0..board.columns() {
                let (dx, dy) = self.controller.cell_offset(Coord::new(r, c));
                out.offsets.push((dx, dy - lift));
            }
        }

        out.phase = self.controller.phase();
        out.pending_score_delta = self.controller.pending_score_delta();
        out.score = self.score;
        out.chain = self.controller.chain();
        out.best_chain = self.best_chain;
        out.moves = self.moves;
        out.timed = self.clock.is_timed();
        out.remaining_ms = self.clock.remaining_ms();
        out.paused = self.paused;
        out.round_over = self.clock.is_over();
        out.episode_id = self.episode_id;
        out.last_cascade = self.controller.last_cascade().copied();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
