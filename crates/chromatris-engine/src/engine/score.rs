/// Points for full-row clears.
///
/// Index corresponds to the number of rows removed by one landing:
/// - 0 rows: 0 points
/// - 1 row: 100 points
/// - 2 rows: 300 points
/// - 3 rows: 500 points
/// - 4 rows: 800 points
const ROW_CLEAR_POINTS: [usize; 5] = [0, 100, 300, 500, 800];

/// Points per block removed by a color match.
const MATCHED_BLOCK_POINTS: usize = 20;

/// Points for one player-issued step down.
const SOFT_DROP_POINTS: usize = 1;

/// Points per row a hard drop falls.
const HARD_DROP_POINTS_PER_ROW: usize = 2;

/// Running score of one game.
///
/// Besides the point total it keeps the counters a results screen wants:
/// rows removed, blocks removed by color matches, and how often each
/// multi-row clear happened.
///
/// # Example
///
/// ```
/// use chromatris_engine::Score;
///
/// let mut score = Score::new();
/// score.piece_finished_falling(10);
/// score.rows_cleared(2);
/// score.matching_blocks_cleared(3);
///
/// assert_eq!(score.points(), 20 + 300 + 60);
/// assert_eq!(score.total_rows(), 2);
/// assert_eq!(score.row_clear_counter()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    points: usize,
    total_rows: usize,
    total_matched_blocks: usize,
    row_clear_counter: [usize; 5],
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: 0,
            total_rows: 0,
            total_matched_blocks: 0,
            row_clear_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn points(&self) -> usize {
        self.points
    }

    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    #[must_use]
    pub const fn total_matched_blocks(&self) -> usize {
        self.total_matched_blocks
    }

    /// How many landings removed 0, 1, 2, 3 and 4 (or more) rows.
    #[must_use]
    pub const fn row_clear_counter(&self) -> &[usize; 5] {
        &self.row_clear_counter
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The player stepped the piece down one row.
    pub fn piece_moved_down(&mut self) {
        self.points += SOFT_DROP_POINTS;
    }

    /// The player hard-dropped the piece `rows` rows.
    pub fn piece_finished_falling(&mut self, rows: usize) {
        self.points += HARD_DROP_POINTS_PER_ROW * rows;
    }

    /// A landing removed `count` full rows. Called once per landing, also
    /// with 0.
    pub fn rows_cleared(&mut self, count: usize) {
        let index = count.min(ROW_CLEAR_POINTS.len() - 1);
        self.points += ROW_CLEAR_POINTS[index];
        self.row_clear_counter[index] += 1;
        self.total_rows += count;
    }

    /// One color-match pass removed `count` blocks.
    pub fn matching_blocks_cleared(&mut self, count: usize) {
        self.points += MATCHED_BLOCK_POINTS * count;
        self.total_matched_blocks += count;
    }
}
