use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the board.
///
/// Row 0 is the bottom row and rows increase upward; column 0 is the leftmost
/// column. Components are signed so that a tentative move may step outside
/// the grid before it is rejected.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns this position shifted by `rows` and `cols`.
    #[must_use]
    pub const fn offset(self, rows: i32, cols: i32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }

    /// Rotates this position a quarter turn around `pivot`.
    ///
    /// In pivot-local coordinates `(r, c)` becomes `(-c, r)`.
    #[must_use]
    pub const fn rotated_around(self, pivot: Self) -> Self {
        Self {
            row: pivot.row - (self.col - pivot.col),
            col: pivot.col + (self.row - pivot.row),
        }
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.row, rhs.col)
    }
}
