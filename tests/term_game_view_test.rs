use tui_jewels::core::{GameConfig, GameSnapshot, GameState};
use tui_jewels::term::{kind_color, AiStatus, GameView, StatusView, Viewport};
use tui_jewels::types::{Coord, Phase, Token};

fn snapshot() -> GameSnapshot {
    GameState::new(GameConfig::default().with_seed(1))
        .unwrap()
        .snapshot()
}

fn all_text(fb: &tui_jewels::term::FrameBuffer) -> String {
    (0..fb.height()).map(|y| fb.row_text(y) + "\n").collect()
}

fn set(snap: &mut GameSnapshot, c: Coord, token: Token) {
    let i = snap.index(c).unwrap();
    snap.codes[i] = token.code();
    snap.special[i] = token.is_special();
}

#[test]
fn term_view_renders_border_corners() {
    let snap = snapshot();
    let view = GameView::default();

    // With cell_w=2 and cell_h=1:
    // board = 8*2 by 8*1 => 16x8, plus border => 18x10
    let fb = view.render(&snap, &StatusView::default(), Viewport::new(18, 10));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(17, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 9).unwrap().ch, '└');
    assert_eq!(fb.get(17, 9).unwrap().ch, '┘');
}

#[test]
fn term_view_draws_gems_in_their_kind_color() {
    let mut snap = snapshot();
    set(&mut snap, Coord::new(7, 0), Token::gem(2));
    set(&mut snap, Coord::new(0, 7), Token::special(4));

    let view = GameView::default();
    let fb = view.render(&snap, &StatusView::default(), Viewport::new(18, 10));

    // Inside border: (1,1) origin. Each cell is 2 chars wide.
    let gem = fb.get(1, 1 + 7).unwrap();
    assert_eq!(gem.ch, '●');
    assert_eq!(gem.style.fg, kind_color(2));

    let special = fb.get(1 + 7 * 2, 1).unwrap();
    assert_eq!(special.ch, '◆');
    assert_eq!(special.style.fg, kind_color(4));
    assert!(special.style.bold);

    assert_eq!(view.cell_origin(&snap, Viewport::new(18, 10), Coord::new(7, 0)), Some((1, 8)));
    assert_eq!(view.cell_origin(&snap, Viewport::new(18, 10), Coord::new(8, 0)), None);
}

#[test]
fn term_view_draws_empty_cells_as_dots() {
    let mut snap = snapshot();
    set(&mut snap, Coord::new(3, 3), Token::Empty);

    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(18, 10));
    assert_eq!(fb.get(1 + 3 * 2, 1 + 3).unwrap().ch, '·');
}

#[test]
fn term_view_shifts_falling_gem_by_offset() {
    let mut snap = snapshot();
    let above = Coord::new(2, 5);
    let gap = Coord::new(3, 5);
    set(&mut snap, above, Token::gem(1));
    set(&mut snap, gap, Token::Empty);
    snap.phase = Phase::Collapsing;
    // Most of the way down: drawn one row lower.
    let i = snap.index(above).unwrap();
    snap.offsets[i] = (0, snap.cell_size as i32 * 3 / 4);

    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(18, 10));
    let x = 1 + 5 * 2;
    let drawn = fb.get(x, 1 + 3).unwrap();
    assert_eq!(drawn.ch, '●');
    assert_eq!(drawn.style.fg, kind_color(1));
}

#[test]
fn term_view_draws_side_panel_when_wide_enough() {
    let mut snap = snapshot();
    snap.score = 1234;
    snap.pending_score_delta = 200;
    snap.moves = 7;
    snap.best_chain = 3;

    let status = StatusView {
        ai: AiStatus::Remote { pending: false },
        last_error: Some("no_match"),
    };
    let fb = GameView::default().render(&snap, &status, Viewport::new(60, 30));
    let text = all_text(&fb);

    assert!(text.contains("SCORE"));
    assert!(text.contains("1234 +200"), "panel:\n{text}");
    assert!(text.contains("MOVES"));
    assert!(text.contains("CHAIN"));
    assert!(text.contains("IDLE"));
    assert!(text.contains("TIME"));
    assert!(text.contains("1:00"));
    assert!(text.contains("no_match"));
}

#[test]
fn term_view_hides_side_panel_when_narrow() {
    let fb = GameView::default().render(&snapshot(), &StatusView::default(), Viewport::new(20, 10));
    assert!(!all_text(&fb).contains("SCORE"));
}

#[test]
fn term_view_overlays_pause_and_time_up() {
    let mut snap = snapshot();
    snap.paused = true;
    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(40, 12));
    assert!(all_text(&fb).contains("PAUSED"));

    snap.paused = false;
    snap.round_over = true;
    snap.remaining_ms = 0;
    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(40, 12));
    let text = all_text(&fb);
    assert!(text.contains("TIME UP"));
    assert!(!text.contains("PAUSED"));
}

#[test]
fn term_view_calls_out_chain_reactions() {
    let mut snap = snapshot();
    snap.chain = 2;
    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(40, 14));
    assert!(all_text(&fb).contains("Good!"));

    snap.chain = 1;
    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(40, 14));
    let text = all_text(&fb);
    assert!(!text.contains("Good!") && !text.contains("Nice!"));
}
