//! Scoring module - point values for cleared runs
//!
//! The board core only counts what it cleared ([`MatchCounts`]); turning
//! those counts into points is done here so a session (or an external
//! trainer) can swap in its own table.

use crate::types::{
    MatchCounts, BONUS_POINTS, FIVE_RUN_POINTS, FOUR_RUN_POINTS, THREE_RUN_POINTS,
};

/// Points per run type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTable {
    pub three: u32,
    pub four: u32,
    /// Applies to every run of five or more
    pub five: u32,
    /// Added once per run that consumed a special gem
    pub bonus: u32,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            three: THREE_RUN_POINTS,
            four: FOUR_RUN_POINTS,
            five: FIVE_RUN_POINTS,
            bonus: BONUS_POINTS,
        }
    }
}

impl ScoreTable {
    pub fn points(&self, counts: &MatchCounts) -> u32 {
        let runs = self
            .three
            .saturating_mul(counts.three_runs)
            .saturating_add(self.four.saturating_mul(counts.four_runs))
            .saturating_add(self.five.saturating_mul(counts.five_runs));
        runs.saturating_add(self.bonus.saturating_mul(counts.bonus_count))
    }
}
