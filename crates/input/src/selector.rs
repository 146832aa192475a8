//! Cursor-and-pick move source for human players.
//!
//! The first `Select` picks the gem under the cursor, the second proposes
//! swapping it with the gem under the cursor at that point. Selecting the
//! picked cell again drops the pick.

use crate::types::{Coord, GameAction, MoveError, MoveSource};

#[derive(Debug, Clone)]
pub struct Selector {
    rows: u8,
    columns: u8,
    cursor: Coord,
    picked: Option<Coord>,
    pending: Option<(Coord, Coord)>,
    last_error: Option<MoveError>,
}

impl Selector {
    pub fn new(rows: u8, columns: u8) -> Self {
        Self {
            rows,
            columns,
            cursor: Coord::new(rows / 2, columns / 2),
            picked: None,
            pending: None,
            last_error: None,
        }
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    pub fn picked(&self) -> Option<Coord> {
        self.picked
    }

    /// Most recent refusal from the controller, cleared by the next accepted move
    pub fn last_error(&self) -> Option<MoveError> {
        self.last_error
    }

    /// Handle a cursor or selection action. Returns false for actions that
    /// are not the selector's (pause, restart).
    pub fn apply(&mut self, action: GameAction) -> bool {
        let Coord { row, col } = self.cursor;
        match action {
            GameAction::CursorUp => self.cursor.row = row.saturating_sub(1),
            GameAction::CursorDown => self.cursor.row = (row + 1).min(self.rows - 1),
            GameAction::CursorLeft => self.cursor.col = col.saturating_sub(1),
            GameAction::CursorRight => self.cursor.col = (col + 1).min(self.columns - 1),
            GameAction::Select => match self.picked {
                None => self.picked = Some(self.cursor),
                Some(p) if p == self.cursor => self.picked = None,
                Some(p) => {
                    self.pending = Some((p, self.cursor));
                    self.picked = None;
                }
            },
            GameAction::Cancel => {
                self.picked = None;
                self.pending = None;
            }
            GameAction::Pause | GameAction::Restart => return false,
        }
        true
    }

    /// Forget picks and pending moves (round restart).
    pub fn reset(&mut self) {
        self.picked = None;
        self.pending = None;
        self.last_error = None;
    }
}

impl MoveSource for Selector {
    fn propose_move(&mut self) -> Option<(Coord, Coord)> {
        self.pending.take()
    }

    fn feedback(&mut self, result: Result<(), MoveError>) {
        self.last_error = result.err();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_is_clamped_to_board() {
        let mut s = Selector::new(8, 8);
        assert_eq!(s.cursor(), Coord::new(4, 4));
        for _ in 0..10 {
            s.apply(GameAction::CursorUp);
            s.apply(GameAction::CursorLeft);
        }
        assert_eq!(s.cursor(), Coord::new(0, 0));
        for _ in 0..10 {
            s.apply(GameAction::CursorDown);
            s.apply(GameAction::CursorRight);
        }
        assert_eq!(s.cursor(), Coord::new(7, 7));
    }

    #[test]
    fn two_picks_make_a_move() {
        let mut s = Selector::new(8, 8);
        assert_eq!(s.propose_move(), None);
        s.apply(GameAction::Select);
        assert_eq!(s.picked(), Some(Coord::new(4, 4)));
        s.apply(GameAction::CursorRight);
        s.apply(GameAction::Select);
        assert_eq!(s.picked(), None);
        assert_eq!(
            s.propose_move(),
            Some((Coord::new(4, 4), Coord::new(4, 5)))
        );
        assert_eq!(s.propose_move(), None);
    }

    #[test]
    fn same_cell_twice_cancels() {
        let mut s = Selector::new(8, 8);
        s.apply(GameAction::Select);
        s.apply(GameAction::Select);
        assert_eq!(s.picked(), None);
        assert_eq!(s.propose_move(), None);
    }

    #[test]
    fn cancel_drops_pick() {
        let mut s = Selector::new(8, 8);
        s.apply(GameAction::Select);
        assert!(s.apply(GameAction::Cancel));
        assert_eq!(s.picked(), None);
    }

    #[test]
    fn session_actions_are_not_consumed() {
        let mut s = Selector::new(8, 8);
        assert!(!s.apply(GameAction::Pause));
        assert!(!s.apply(GameAction::Restart));
    }

    #[test]
    fn feedback_is_remembered() {
        let mut s = Selector::new(8, 8);
        let err = MoveError::NoMatch {
            a: Coord::new(0, 0),
            b: Coord::new(0, 1),
        };
        s.feedback(Err(err));
        assert_eq!(s.last_error(), Some(err));
        s.feedback(Ok(()));
        assert_eq!(s.last_error(), None);
    }
}
