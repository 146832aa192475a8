use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tui_jewels::core::{GameConfig, GameSnapshot, GameState, TickEvent};
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
fn core_cascade_ticks_do_not_allocate() {
    // Setup (outside counting) so one-time allocations don't trip the gate.
    let config = GameConfig {
        round_ms: 0,
        ..GameConfig::default().with_seed(17)
    };
    let mut gs = GameState::new(config).unwrap();
    let mut moves = QueuedMoves::new();
    let mut snap = GameSnapshot::default();

    // Warm-up: grows the queue, the snapshot buffers and the controller's
    // scratch vectors to their working size.
    for _ in 0..3 {
        let _ = gs.tick(TICK_MS, &mut ());
        let (a, b) = gs.board().clone().legal_moves()[0];
        moves.push(a, b);
        while gs.tick(TICK_MS, &mut moves) != TickEvent::Settled {
            gs.snapshot_into(&mut snap);
        }
    }

    let mut allocs = 0;
    for _ in 0..20 {
        // An idle tick first so a deadlocked board gets reshuffled. Planning
        // clones the board; only the cascade itself is gated.
        let _ = gs.tick(TICK_MS, &mut ());
        let (a, b) = gs.board().clone().legal_moves()[0];
        moves.push(a, b);

        allocs += with_alloc_counting(|| loop {
            let event = gs.tick(TICK_MS, &mut moves);
            gs.snapshot_into(&mut snap);
            if event == TickEvent::Settled {
                break;
            }
        });
    }

    assert_eq!(gs.moves(), 23);
    assert!(allocs == 0, "{} allocations on the tick path", allocs);
}
