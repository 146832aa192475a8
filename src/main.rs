//! Terminal match-3 runner (default binary).
//!
//! Crossterm for input, the framebuffer renderer for output, and an
//! optional TCP adapter so an external agent can play.
//!
//! Environment: `JEWELS_ROWS`, `JEWELS_COLUMNS`, `JEWELS_KINDS`,
//! `JEWELS_SEED`, `JEWELS_ROUND_MS` for the board; `JEWELS_AUTO=1` lets the
//! built-in greedy player take the moves; `JEWELS_AI_*` for the adapter.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use tui_jewels::adapter::{Adapter, AdapterBridge};
use tui_jewels::core::{GameConfig, GameSnapshot, GameState, TickEvent};
use tui_jewels::engine::GreedyPolicy;
use tui_jewels::input::{map_keys, should_quit, Selector, MAX_ACTIONS_PER_FRAME};
use tui_jewels::term::{AiStatus, FrameBuffer, GameView, StatusView, TerminalRenderer, Viewport};
use tui_jewels::types::{BoardFault, GameAction, INTRO_STEP, TICK_MS};

/// What to report once the terminal is restored.
#[derive(Debug, Default)]
struct RunSummary {
    score: u32,
    best_chain: u32,
    moves: u32,
    faults: Vec<BoardFault>,
}

fn auto_play_enabled() -> bool {
    std::env::var("JEWELS_AUTO")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn main() -> Result<()> {
    let (config, fallbacks) = GameConfig::from_env_reporting();
    let config = config.with_intro(INTRO_STEP);
    for fallback in &fallbacks {
        eprintln!("[Config] {}", fallback);
    }
    if let Err(e) = config.validate() {
        eprintln!("[Config] {}", e);
        return Err(e.into());
    }
    let game = GameState::new(config)?;

    let adapter = match Adapter::start_from_env(&config) {
        Ok(adapter) => adapter,
        Err(e) => {
            eprintln!("[Adapter] not started: {:#}", e);
            None
        }
    };
    let auto = auto_play_enabled();

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, game, adapter, auto);

    // Always try to restore terminal state.
    let _ = term.exit();

    let summary = result?;
    for fault in &summary.faults {
        eprintln!("[Board] {}", fault);
    }
    println!(
        "[Game] score {} in {} moves, best chain {}",
        summary.score, summary.moves, summary.best_chain
    );
    Ok(())
}

fn run(
    term: &mut TerminalRenderer,
    mut game: GameState,
    mut adapter: Option<Adapter>,
    auto: bool,
) -> Result<RunSummary> {
    let config = *game.config();
    let view = GameView::default();
    let mut selector = Selector::new(config.rows, config.columns);
    let mut greedy = GreedyPolicy::new(config.scores);
    let mut bridge = AdapterBridge::new();

    let mut summary = RunSummary::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut keys: Vec<KeyEvent> = Vec::with_capacity(MAX_ACTIONS_PER_FRAME);
    let mut outbound = Vec::new();

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        game.snapshot_into(&mut snap);
        snap.cursor = (!auto).then(|| selector.cursor());
        snap.selection = selector.picked();
        let status = StatusView {
            ai: match (&adapter, auto) {
                (Some(_), _) => AiStatus::Remote {
                    pending: bridge.has_pending(),
                },
                (None, true) => AiStatus::Auto,
                (None, false) => AiStatus::Off,
            },
            last_error: selector.last_error().map(|e| e.code()),
        };
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snap, &status, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick; drain whatever else is queued.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            loop {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if should_quit(key) {
                            summary.score = game.score();
                            summary.best_chain = game.best_chain();
                            summary.moves = game.moves();
                            return Ok(summary);
                        }
                        keys.push(key);
                    }
                    Event::Resize(..) => term.invalidate(),
                    _ => {}
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
        for action in map_keys(keys.drain(..)) {
            if selector.apply(action) {
                continue;
            }
            if bridge.local_action(&mut game, action, &mut outbound) && action == GameAction::Restart {
                selector.reset();
            }
        }

        // Remote commands.
        if let Some(adapter) = adapter.as_mut() {
            while let Some(cmd) = adapter.try_recv() {
                bridge.handle(&mut game, cmd, &mut outbound);
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            let event = if bridge.has_pending() {
                game.tick(TICK_MS, bridge.source())
            } else if auto {
                if game.accepting_moves() && greedy.planned().is_none() {
                    greedy.plan(game.board());
                }
                game.tick(TICK_MS, &mut greedy)
            } else {
                game.tick(TICK_MS, &mut selector)
            };
            bridge.after_tick(&game, event, &mut outbound);

            if event == TickEvent::Settled {
                if let Err(fault) = game.board().check_quiescent() {
                    summary.faults.push(fault);
                }
            }
        }

        match adapter.as_ref() {
            Some(adapter) => outbound.drain(..).for_each(|msg| adapter.send(msg)),
            None => outbound.clear(),
        }
    }
}
