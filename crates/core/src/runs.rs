//! Run detection.
//!
//! One linear pass per row and one per column. Each pass walks a line,
//! extends the current streak while kinds match and emits the streak once it
//! ends, so every reported run is maximal and no cell is claimed twice within
//! the same axis. A cell may still appear in one horizontal and one vertical
//! run.

use crate::types::{Axis, Coord, Token};

/// Shortest streak that counts as a run
pub const MIN_RUN: u8 = 3;

/// A maximal streak of three or more same-kind gems along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Run {
    pub axis: Axis,
    /// Left-most (horizontal) or top-most (vertical) cell
    pub start: Coord,
    pub len: u8,
    pub kind: u8,
}

impl Run {
    /// The run's first cell, the one a four-run promotes.
    pub fn first(&self) -> Coord {
        self.start
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len).map(move |i| self.cell(i))
    }

    pub fn cell(&self, i: u8) -> Coord {
        match self.axis {
            Axis::Horizontal => Coord::new(self.start.row, self.start.col + i),
            Axis::Vertical => Coord::new(self.start.row + i, self.start.col),
        }
    }

    pub fn last(&self) -> Coord {
        self.cell(self.len - 1)
    }

    pub fn contains(&self, c: Coord) -> bool {
        match self.axis {
            Axis::Horizontal => {
                c.row == self.start.row
                    && c.col >= self.start.col
                    && c.col < self.start.col + self.len
            }
            Axis::Vertical => {
                c.col == self.start.col
                    && c.row >= self.start.row
                    && c.row < self.start.row + self.len
            }
        }
    }
}

/// Walk every run on a row-major grid, horizontal runs first.
///
/// `f` returns `false` to stop the scan early; the function then returns
/// `false` as well.
pub(crate) fn scan(
    cells: &[Token],
    rows: u8,
    columns: u8,
    mut f: impl FnMut(Run) -> bool,
) -> bool {
    let w = columns as usize;
    let at = |r: u8, c: u8| cells[r as usize * w + c as usize];

    for r in 0..rows {
        if !scan_line(columns, |i| at(r, i), |start, len, kind| {
            f(Run {
                axis: Axis::Horizontal,
                start: Coord::new(r, start),
                len,
                kind,
            })
        }) {
            return false;
        }
    }

    for c in 0..columns {
        if !scan_line(rows, |i| at(i, c), |start, len, kind| {
            f(Run {
                axis: Axis::Vertical,
                start: Coord::new(start, c),
                len,
                kind,
            })
        }) {
            return false;
        }
    }

    true
}

fn scan_line(
    len: u8,
    get: impl Fn(u8) -> Token,
    mut emit: impl FnMut(u8, u8, u8) -> bool,
) -> bool {
    let mut i = 0u8;
    while i < len {
        let Some(kind) = get(i).kind() else {
            i += 1;
            continue;
        };

        let mut end = i + 1;
        while end < len && get(end).kind() == Some(kind) {
            end += 1;
        }

        let streak = end - i;
        if streak >= MIN_RUN && !emit(i, streak, kind) {
            return false;
        }
        i = end;
    }
    true
}
