//! Hand-built boards shared by the test suites.

/// 8x8 kinds with no runs and no legal move: period-4 rows, offset per row
/// pair. Kinds 4 and 5 never appear, so tests can inject them freely.
///
/// Use with [`Board::from_kinds`](crate::Board::from_kinds) directly; a
/// [`GameState`](crate::GameState) on this board reshuffles on its first
/// idle tick.
pub fn quiet_rows() -> Vec<[u8; 8]> {
    (0..8)
        .map(|r| {
            let mut row = [0u8; 8];
            for (c, v) in row.iter_mut().enumerate() {
                *v = ((c + 2 * (r % 2) + (r / 2) % 2) % 4) as u8;
            }
            row
        })
        .collect()
}

/// [`quiet_rows`] with `5 5 _ 5` in row 7: swapping (7,2) and (7,3) is the
/// only legal move.
pub fn one_move_rows() -> Vec<[u8; 8]> {
    let mut rows = quiet_rows();
    rows[7][0] = 5;
    rows[7][1] = 5;
    rows[7][3] = 5;
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, GameConfig};
    use crate::types::Coord;

    #[test]
    fn quiet_rows_is_dead() {
        let mut board = Board::from_kinds(&GameConfig::default(), &quiet_rows()).unwrap();
        assert!(board.find_runs().is_empty());
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn one_move_rows_has_exactly_one_move() {
        let mut board = Board::from_kinds(&GameConfig::default(), &one_move_rows()).unwrap();
        assert!(board.find_runs().is_empty());
        assert_eq!(
            board.legal_moves(),
            vec![(Coord::new(7, 2), Coord::new(7, 3))]
        );
    }
}
