//! Error types shared by the board core and its collaborators.

use crate::{Coord, Phase};

/// Why a proposed move was refused.
///
/// All variants are expected, recoverable outcomes: the board is left
/// untouched and the controller stays where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("cells {a} and {b} are not adjacent cells on the board")]
    InvalidMove { a: Coord, b: Coord },

    #[error("swapping {a} and {b} does not produce a run")]
    NoMatch { a: Coord, b: Coord },

    #[error("moves are only accepted while idle (currently {})", .phase.as_str())]
    NotIdle { phase: Phase },
}

impl MoveError {
    /// Stable wire code
    pub fn code(&self) -> &'static str {
        match self {
            MoveError::InvalidMove { .. } => "invalid_move",
            MoveError::NoMatch { .. } => "no_match",
            MoveError::NotIdle { .. } => "not_idle",
        }
    }
}

/// Invalid game configuration, detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board must be between 3x3 and 32x32 (got {rows}x{columns})")]
    InvalidDimensions { rows: u8, columns: u8 },

    #[error("token_kinds must be at least 5 so seeding can always repair a run (got {0})")]
    TooFewTokenKinds(u8),

    #[error("token_kinds must be at most 16 (got {0})")]
    TooManyTokenKinds(u8),

    #[error("{0} must be greater than zero")]
    ZeroStep(&'static str),

    #[error("gem kind {kind} at {at} is out of range for {token_kinds} kinds")]
    KindOutOfRange { at: Coord, kind: u8, token_kinds: u8 },
}

/// A broken board invariant. Always a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardFault {
    #[error("empty cell at {0} survived a full collapse")]
    EmptyCell(Coord),

    #[error("run of {len} starting at {start} survived resolution")]
    LeftoverRun { start: Coord, len: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_error_display_and_code() {
        let err = MoveError::NoMatch {
            a: Coord::new(0, 0),
            b: Coord::new(0, 1),
        };
        assert_eq!(
            err.to_string(),
            "swapping (0, 0) and (0, 1) does not produce a run"
        );
        assert_eq!(err.code(), "no_match");

        let err = MoveError::NotIdle {
            phase: Phase::Collapsing,
        };
        assert_eq!(
            err.to_string(),
            "moves are only accepted while idle (currently collapsing)"
        );
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::TooFewTokenKinds(3).to_string(),
            "token_kinds must be at least 5 so seeding can always repair a run (got 3)"
        );
        assert_eq!(
            ConfigError::ZeroStep("swap_step").to_string(),
            "swap_step must be greater than zero"
        );
        assert_eq!(
            ConfigError::KindOutOfRange {
                at: Coord::new(2, 3),
                kind: 7,
                token_kinds: 6,
            }
            .to_string(),
            "gem kind 7 at (2, 3) is out of range for 6 kinds"
        );
    }
}
