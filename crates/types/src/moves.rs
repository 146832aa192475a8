//! Move sources: anything that can pick two cells to swap.

use std::collections::VecDeque;

use crate::{Coord, MoveError};

/// Supplies one candidate swap per request.
///
/// Implemented by the terminal cursor, the TCP adapter queue and the
/// automated policies. The controller only asks while it is idle.
pub trait MoveSource {
    /// Next pair to try, or `None` when the source has nothing to offer yet.
    fn propose_move(&mut self) -> Option<(Coord, Coord)>;

    /// Outcome of the most recent proposal.
    fn feedback(&mut self, _result: Result<(), MoveError>) {}
}

/// A source that never proposes anything
impl MoveSource for () {
    fn propose_move(&mut self) -> Option<(Coord, Coord)> {
        None
    }
}

/// FIFO of pre-decided moves (adapter commands, scripted tests).
#[derive(Debug, Clone, Default)]
pub struct QueuedMoves {
    queue: VecDeque<(Coord, Coord)>,
    last: Option<Result<(), MoveError>>,
}

impl QueuedMoves {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, a: Coord, b: Coord) {
        self.queue.push_back((a, b));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Take the feedback recorded for the last proposal
    pub fn take_feedback(&mut self) -> Option<Result<(), MoveError>> {
        self.last.take()
    }
}

impl MoveSource for QueuedMoves {
    fn propose_move(&mut self) -> Option<(Coord, Coord)> {
        self.queue.pop_front()
    }

    fn feedback(&mut self, result: Result<(), MoveError>) {
        self.last = Some(result);
    }
}

impl<S: MoveSource + ?Sized> MoveSource for &mut S {
    fn propose_move(&mut self) -> Option<(Coord, Coord)> {
        (**self).propose_move()
    }

    fn feedback(&mut self, result: Result<(), MoveError>) {
        (**self).feedback(result)
    }
}
