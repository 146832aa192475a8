//! Round timer.
//!
//! A round is a fixed amount of play time. A limit of zero means the round
//! never ends (headless training runs).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundClock {
    limit_ms: u32,
    elapsed_ms: u32,
}

impl RoundClock {
    pub fn new(limit_ms: u32) -> Self {
        Self {
            limit_ms,
            elapsed_ms: 0,
        }
    }

    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.is_timed() {
            self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms).min(self.limit_ms);
        }
    }

    pub fn is_timed(&self) -> bool {
        self.limit_ms > 0
    }

    pub fn limit_ms(&self) -> u32 {
        self.limit_ms
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Milliseconds left; 0 for an untimed round
    pub fn remaining_ms(&self) -> u32 {
        self.limit_ms - self.elapsed_ms
    }

    pub fn is_over(&self) -> bool {
        self.is_timed() && self.elapsed_ms >= self.limit_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
    }
}
