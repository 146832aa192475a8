//! Presentation-only interpolation.
//!
//! A [`Motion`] counts presentation units travelled during one animated
//! phase (a swap, or one gravity step). The cascade controller owns one and
//! only asks it whether the animation has finished; the logical board is
//! never read or written from here.

/// Progress of one animation toward a fixed distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Motion {
    progress: u32,
    distance: u32,
    step: u32,
}

impl Motion {
    /// A motion covering `distance` units at `step` units per tick.
    ///
    /// A zero step is bumped to 1 so every motion finishes.
    pub fn new(distance: u32, step: u32) -> Self {
        Self {
            progress: 0,
            distance,
            step: step.max(1),
        }
    }

    /// Advance one tick. Returns true once the distance has been covered.
    pub fn advance(&mut self) -> bool {
        self.progress = self.progress.saturating_add(self.step).min(self.distance);
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.progress >= self.distance
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }

    pub fn remaining(&self) -> u32 {
        self.distance - self.progress
    }

    /// Number of ticks a fresh motion with these parameters lasts
    pub fn ticks(&self) -> u32 {
        self.distance.div_ceil(self.step).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finishes_after_ceil_ticks() {
        let mut m = Motion::new(64, 3);
        assert_eq!(m.ticks(), 22);
        let mut n = 0;
        while !m.advance() {
            n += 1;
        }
        assert_eq!(n + 1, 22);
        assert_eq!(m.progress(), 64);
        assert_eq!(m.remaining(), 0);
    }

    #[test]
    fn progress_never_overshoots() {
        let mut m = Motion::new(10, 4);
        m.advance();
        m.advance();
        assert!(m.advance());
        assert_eq!(m.progress(), 10);
        assert!(m.advance());
        assert_eq!(m.progress(), 10);
    }

    #[test]
    fn zero_step_still_terminates() {
        let mut m = Motion::new(2, 0);
        assert!(!m.advance());
        assert!(m.advance());
    }

    #[test]
    fn default_is_done() {
        assert!(Motion::default().is_done());
    }
}
