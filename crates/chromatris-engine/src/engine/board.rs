use std::{
    collections::HashSet,
    hash::{DefaultHasher, Hash as _, Hasher as _},
    iter,
    ops::Range,
};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{Block, Piece, PieceKind, PiecePositions, Position, Rgb, Theme};

use super::piece_provider::PieceProvider;

/// Column offsets tried, in order, when a rotation collides.
const WALL_KICK_OFFSETS: [i32; 4] = [-1, -2, 1, 2];

/// Length of the windows scanned for color runs.
const MATCH_WINDOW: usize = 4;

/// Grid dimensions of a [`Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub width: u16,
    pub height: u16,
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BoardSize {
    /// 10 columns by 20 rows.
    pub const STANDARD: Self = Self::new(10, 20);

    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Handle on the blocks of the piece currently falling.
///
/// The piece's blocks live in the board's block list; `slots` is their index
/// range there, and slot 0 is the rotation pivot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FallingPiece {
    kind: PieceKind,
    rotatable: bool,
    color: Rgb,
    slots: Range<usize>,
}

/// The playing field: every placed block plus the piece in flight.
///
/// The block list holds both the settled stack and, while one is active, the
/// falling piece's blocks. Outside of a move or rotate attempt no two blocks
/// share a position and every block lies inside the grid.
///
/// Movement operations are all-or-nothing: they apply the change, check
/// [`has_collisions`](Self::has_collisions), and roll back on failure.
///
/// Any clearing pass settles the falling piece into the stack.
///
/// # Example
///
/// ```
/// use chromatris_engine::{Board, BoardSize, PieceKind, SequencePieceProvider, Theme};
///
/// let provider = SequencePieceProvider::new(vec![PieceKind::O]);
/// let mut board = Board::new(BoardSize::STANDARD, Box::new(provider), Theme::CLASSIC);
///
/// board.add_piece();
/// assert!(!board.has_collisions());
///
/// let dropped = board.fall_piece();
/// assert_eq!(dropped, 18);
/// ```
#[derive(Debug)]
pub struct Board {
    size: BoardSize,
    blocks: Vec<Block>,
    falling: Option<FallingPiece>,
    provider: Box<dyn PieceProvider>,
    theme: Theme,
    rng: Pcg32,
}

impl Board {
    /// Creates an empty board with a randomly seeded tie-break generator.
    ///
    /// # Panics
    ///
    /// Panics if either dimension of `size` is zero.
    #[must_use]
    pub fn new(size: BoardSize, provider: Box<dyn PieceProvider>, theme: Theme) -> Self {
        Self::with_rng(size, provider, theme, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Like [`Self::new`], but with the generator that picks which block of
    /// a four-long color run survives.
    ///
    /// # Panics
    ///
    /// Panics if either dimension of `size` is zero.
    #[must_use]
    pub fn with_rng(
        size: BoardSize,
        provider: Box<dyn PieceProvider>,
        theme: Theme,
        rng: Pcg32,
    ) -> Self {
        assert!(
            size.width > 0 && size.height > 0,
            "board must have at least one cell"
        );
        Self {
            size,
            blocks: Vec::with_capacity(usize::from(size.width) * usize::from(size.height)),
            falling: None,
            provider,
            theme,
            rng,
        }
    }

    #[must_use]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        i32::from(self.size.width)
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        i32::from(self.size.height)
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replaces the palette. Blocks already on the board keep their color.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// All blocks on the board, falling piece included.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Blocks of the falling piece, by slot. Empty when no piece is falling.
    #[must_use]
    pub fn piece_blocks(&self) -> &[Block] {
        self.falling
            .as_ref()
            .map_or(&[], |piece| &self.blocks[piece.slots.clone()])
    }

    #[must_use]
    pub fn piece_kind(&self) -> Option<PieceKind> {
        self.falling.as_ref().map(|piece| piece.kind)
    }

    #[must_use]
    pub fn piece_color(&self) -> Option<Rgb> {
        self.falling.as_ref().map(|piece| piece.color)
    }

    #[must_use]
    pub fn has_piece(&self) -> bool {
        self.falling.is_some()
    }

    /// Snapshot of the falling piece's positions, by slot.
    #[must_use]
    pub fn piece_positions(&self) -> PiecePositions {
        self.piece_blocks().iter().map(Block::position).collect()
    }

    /// The piece the provider will hand out next.
    #[must_use]
    pub fn next_piece(&self) -> Piece {
        self.provider.next_piece()
    }

    #[must_use]
    pub fn block_at(&self, position: Position) -> Option<&Block> {
        self.blocks.iter().find(|b| b.position() == position)
    }

    /// Hash of the board contents, for cheap change detection by renderers.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.size.width.hash(&mut hasher);
        self.size.height.hash(&mut hasher);
        self.blocks.hash(&mut hasher);
        hasher.finish()
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        in_bounds(self.size, position)
    }

    /// Returns `true` if any block lies outside the grid or two blocks share
    /// a position.
    #[must_use]
    pub fn has_collisions(&self) -> bool {
        let mut occupied = HashSet::with_capacity(self.blocks.len());
        self.blocks
            .iter()
            .any(|b| !self.contains(b.position()) || !occupied.insert(b.position()))
    }

    /// Places a settled block, e.g. to set up a puzzle.
    pub fn add_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Spawns the provider's next piece, top-aligned and horizontally
    /// centered.
    ///
    /// The spawn is not checked: a collision here means the stack has reached
    /// the top, and the caller decides what that means via
    /// [`has_collisions`](Self::has_collisions).
    pub fn add_piece(&mut self) {
        let mut piece = self.provider.get_piece();
        piece.set_color(self.theme.color_of(piece.kind()));

        let rows = self.height() - 1 - piece.top();
        let cols = (self.width() - piece.width()) / 2;
        let falling = FallingPiece {
            kind: piece.kind(),
            rotatable: piece.is_rotatable(),
            color: piece.color(),
            slots: self.blocks.len()..self.blocks.len() + piece.blocks().len(),
        };
        self.blocks
            .extend(piece.into_blocks().into_iter().map(|mut block| {
                block.set_position(block.position().offset(rows, cols));
                block
            }));
        self.falling = Some(falling);
    }

    pub fn move_piece_left(&mut self) -> bool {
        self.translate_piece(0, -1)
    }

    pub fn move_piece_right(&mut self) -> bool {
        self.translate_piece(0, 1)
    }

    pub fn move_piece_down(&mut self) -> bool {
        self.translate_piece(-1, 0)
    }

    fn translate_piece(&mut self, rows: i32, cols: i32) -> bool {
        if self.falling.is_none() {
            return false;
        }
        let before = self.piece_positions();
        let moved: PiecePositions = before.iter().map(|p| p.offset(rows, cols)).collect();
        self.try_place_piece(&moved, &before)
    }

    /// Rotates the falling piece a quarter turn around its first block.
    ///
    /// A colliding rotation is retried shifted by each of the wall-kick
    /// column offsets `[-1, -2, +1, +2]` in turn. Returns `false`, with the
    /// piece untouched, if the piece cannot rotate or no offset fits.
    pub fn rotate_piece(&mut self) -> bool {
        if !self.falling.as_ref().is_some_and(|piece| piece.rotatable) {
            return false;
        }
        let before = self.piece_positions();
        let pivot = before[0];
        let rotated: PiecePositions = before.iter().map(|p| p.rotated_around(pivot)).collect();

        for cols in iter::once(0).chain(WALL_KICK_OFFSETS) {
            let kicked: PiecePositions = rotated.iter().map(|p| p.offset(0, cols)).collect();
            if self.try_place_piece(&kicked, &before) {
                return true;
            }
        }
        false
    }

    /// Moves the falling piece to `positions`, or restores `before` if that
    /// collides.
    fn try_place_piece(&mut self, positions: &[Position], before: &[Position]) -> bool {
        self.set_piece_positions(positions);
        if self.has_collisions() {
            self.set_piece_positions(before);
            return false;
        }
        true
    }

    fn set_piece_positions(&mut self, positions: &[Position]) {
        let Some(piece) = &self.falling else {
            return;
        };
        debug_assert_eq!(piece.slots.len(), positions.len());
        for (block, position) in iter::zip(&mut self.blocks[piece.slots.clone()], positions) {
            block.set_position(*position);
        }
    }

    /// Drops the falling piece as far as it goes and returns the number of
    /// rows it fell.
    pub fn fall_piece(&mut self) -> usize {
        let mut rows = 0;
        while self.move_piece_down() {
            rows += 1;
        }
        rows
    }

    /// Where the falling piece would come to rest if dropped now.
    ///
    /// Leaves the board untouched. Empty when no piece is falling.
    #[must_use]
    pub fn piece_shadow(&self) -> PiecePositions {
        let positions = self.piece_positions();
        if positions.is_empty() || self.has_collisions() {
            return positions;
        }
        let slots = self.falling.as_ref().map(|piece| piece.slots.clone());
        let stack: HashSet<Position> = self
            .blocks
            .iter()
            .enumerate()
            .filter(|(i, _)| !slots.as_ref().is_some_and(|s| s.contains(i)))
            .map(|(_, b)| b.position())
            .collect();
        let fits = |drop: i32| {
            positions.iter().all(|p| {
                let p = p.offset(-drop, 0);
                self.contains(p) && !stack.contains(&p)
            })
        };

        let mut drop = 0;
        while fits(drop + 1) {
            drop += 1;
        }
        positions.iter().map(|p| p.offset(-drop, 0)).collect()
    }

    fn settle_piece(&mut self) {
        self.falling = None;
    }

    /// Removes every completely filled row, shifting the rows above down.
    ///
    /// Rows are examined from the top down, and each removal collapses the
    /// stack before the next row is examined. Returns the number of rows
    /// removed.
    pub fn remove_full_rows(&mut self) -> usize {
        self.settle_piece();
        let width = usize::from(self.size.width);
        let mut removed = 0;
        for row in (0..self.height()).rev() {
            let count = self.blocks.iter().filter(|b| b.position().row == row).count();
            if count != width {
                continue;
            }
            self.blocks.retain(|b| b.position().row != row);
            for block in &mut self.blocks {
                if block.position().row > row {
                    block.set_position(block.position().offset(-1, 0));
                }
            }
            removed += 1;
        }
        if removed > 0 {
            tracing::trace!(removed, "full rows removed");
        }
        removed
    }

    /// Removes runs of three or four same-kind blocks, then lets every column
    /// fall into its gaps.
    ///
    /// Every horizontal window of four cells is scanned row by row, then
    /// every vertical window column by column. Four equal kinds in a window
    /// mark three for removal and keep one picked at random; three equal
    /// kinds at either end of a window mark all three. A block kept by any
    /// window survives even if another window marks it.
    ///
    /// Gravity runs on every pass, so overhangs collapse even when nothing
    /// matched. The count covers removed blocks only. A pass's gravity can
    /// line up new runs, so callers repeat until this returns 0.
    pub fn remove_matching_color_blocks(&mut self) -> usize {
        self.settle_piece();
        let width = usize::from(self.size.width);
        let height = usize::from(self.size.height);
        let grid = self.kind_grid();
        let mut marks = MatchMarks::new(grid.len());

        for row in 0..height {
            let cells: Vec<usize> = (0..width).map(|col| row * width + col).collect();
            for window in cells.windows(MATCH_WINDOW) {
                marks.mark_window(&grid, window, &mut self.rng);
            }
        }
        for col in 0..width {
            let cells: Vec<usize> = (0..height).map(|row| row * width + col).collect();
            for window in cells.windows(MATCH_WINDOW) {
                marks.mark_window(&grid, window, &mut self.rng);
            }
        }

        let before = self.blocks.len();
        let bounds = self.size;
        self.blocks.retain(|b| {
            !(in_bounds(bounds, b.position()) && marks.is_removed(cell_index(b.position(), width)))
        });
        let removed = before - self.blocks.len();
        self.apply_gravity();
        if removed > 0 {
            tracing::trace!(removed, "matching blocks removed");
        }
        removed
    }

    /// Removes every block, and the falling piece with them.
    pub fn remove_all_blocks(&mut self) {
        self.settle_piece();
        self.blocks.clear();
    }

    fn kind_grid(&self) -> Vec<Option<PieceKind>> {
        let width = usize::from(self.size.width);
        let mut grid = vec![None; width * usize::from(self.size.height)];
        for block in self.blocks.iter().filter(|b| self.contains(b.position())) {
            grid[cell_index(block.position(), width)] = Some(block.kind());
        }
        grid
    }

    /// Compacts every column so that no block has an empty cell below it.
    fn apply_gravity(&mut self) {
        let bounds = self.size;
        let mut columns = vec![Vec::new(); usize::from(bounds.width)];
        for block in self.blocks.iter().filter(|b| in_bounds(bounds, b.position())) {
            columns[column_index(block.position())].push(block.position().row);
        }
        for rows in &mut columns {
            rows.sort_unstable();
        }
        for block in &mut self.blocks {
            let position = block.position();
            if !in_bounds(bounds, position) {
                continue;
            }
            let rows = &columns[column_index(position)];
            let (Ok(rank) | Err(rank)) = rows.binary_search(&position.row);
            let row = i32::try_from(rank).unwrap_or(i32::MAX);
            block.set_position(Position::new(row, position.col));
        }
    }
}

fn in_bounds(size: BoardSize, position: Position) -> bool {
    (0..i32::from(size.height)).contains(&position.row)
        && (0..i32::from(size.width)).contains(&position.col)
}

#[expect(clippy::cast_sign_loss)]
fn column_index(position: Position) -> usize {
    position.col as usize
}

#[expect(clippy::cast_sign_loss)]
fn cell_index(position: Position, width: usize) -> usize {
    position.row as usize * width + position.col as usize
}

/// Per-cell removal and keep flags collected over one matching pass.
#[derive(Debug)]
struct MatchMarks {
    remove: Vec<bool>,
    keep: Vec<bool>,
}

impl MatchMarks {
    fn new(cells: usize) -> Self {
        Self {
            remove: vec![false; cells],
            keep: vec![false; cells],
        }
    }

    fn is_removed(&self, cell: usize) -> bool {
        self.remove[cell] && !self.keep[cell]
    }

    fn mark_window(&mut self, grid: &[Option<PieceKind>], window: &[usize], rng: &mut Pcg32) {
        let kinds: [Option<PieceKind>; MATCH_WINDOW] = [
            grid[window[0]],
            grid[window[1]],
            grid[window[2]],
            grid[window[3]],
        ];
        let same = |range: Range<usize>| {
            let first = kinds[range.start];
            first.is_some() && kinds[range].iter().all(|k| *k == first)
        };

        if same(0..MATCH_WINDOW) {
            let keep = rng.random_range(0..MATCH_WINDOW);
            for (i, &cell) in window.iter().enumerate() {
                if i == keep {
                    self.keep[cell] = true;
                } else {
                    self.remove[cell] = true;
                }
            }
        } else if same(0..3) {
            self.mark_removed(&window[0..3]);
        } else if same(1..4) {
            self.mark_removed(&window[1..4]);
        }
    }

    fn mark_removed(&mut self, cells: &[usize]) {
        for &cell in cells {
            self.remove[cell] = true;
        }
    }
}
