use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tui_jewels::core::{GameConfig, GameState, TickEvent};
use tui_jewels::term::{
    encode_diff_into, encode_full_into, FrameBuffer, GameView, StatusView, Viewport,
};
use tui_jewels::types::{QueuedMoves, TICK_MS};

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            let _ = layout;
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            let _ = (layout, new_size);
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

#[test]
fn term_game_view_render_is_allocation_free_after_warmup() {
    let view = GameView::default();
    let viewport = Viewport::new(80, 24);
    let status = StatusView::default();
    let mut fb = FrameBuffer::new(viewport.width, viewport.height);
    let mut prev = FrameBuffer::new(viewport.width, viewport.height);
    let mut out: Vec<u8> = Vec::with_capacity(64 * 1024);

    let config = GameConfig::default().with_seed(1);
    let mut gs = GameState::new(config).unwrap();
    let mut snap = gs.snapshot();

    // Warm-up (resize/initial clears).
    view.render_into(&snap, &status, viewport, &mut fb);
    encode_full_into(&fb, &mut out).unwrap();
    out.clear();
    let mut moves = QueuedMoves::new();
    let (a, b) = gs.board().clone().legal_moves()[0];
    moves.push(a, b);

    // Tick and render every frame of a whole cascade. Terminal encoding goes
    // through crossterm's command queue, which allocates, so it stays outside
    // the counted region.
    let mut allocs = 0;
    let mut frames = 0;
    loop {
        let mut event = TickEvent::Waiting;
        std::mem::swap(&mut prev, &mut fb);
        allocs += with_alloc_counting(|| {
            event = gs.tick(TICK_MS, &mut moves);
            gs.snapshot_into(&mut snap);
            view.render_into(&snap, &status, viewport, &mut fb);
        });
        out.clear();
        encode_diff_into(&prev, &fb, &mut out).unwrap();
        frames += 1;
        if event == TickEvent::Settled {
            break;
        }
        assert!(frames < 10_000, "cascade never settled");
    }

    assert!(gs.moves() == 1);
    assert!(frames > 1);
    assert!(allocs == 0);
}
