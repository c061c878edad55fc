use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{
    block::{Block, Rgb},
    position::Position,
};

/// Maximum number of blocks in a piece.
pub const PIECE_SIZE: usize = 4;

/// Positions of a piece's blocks, indexed by the block's slot in the piece.
///
/// Slot 0 is the rotation pivot.
pub type PiecePositions = ArrayVec<Position, PIECE_SIZE>;

/// A rigid group of blocks that falls and moves as a unit.
///
/// A `Piece` is a spawn template: its blocks carry piece-local positions
/// until [`Board::add_piece`](crate::Board::add_piece) moves them onto
/// the grid. From then on the board owns the blocks and tracks the falling
/// piece by slot.
///
/// # Example
///
/// ```
/// use chromatris_engine::{Piece, PieceKind};
///
/// let piece = Piece::from_kind(PieceKind::I);
/// assert_eq!(piece.width(), 3);
/// assert_eq!(piece.top(), 0);
/// assert!(piece.is_rotatable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    rotatable: bool,
    color: Rgb,
    blocks: ArrayVec<Block, PIECE_SIZE>,
}

impl Piece {
    /// Builds a piece with one block per position, all tagged with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if `positions` is empty or yields more than [`PIECE_SIZE`]
    /// positions.
    #[must_use]
    pub fn new<I>(kind: PieceKind, positions: I, rotatable: bool) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let mut blocks = ArrayVec::new();
        for position in positions {
            assert!(
                !blocks.is_full(),
                "a piece holds at most {PIECE_SIZE} blocks"
            );
            blocks.push(Block::new(position, kind));
        }
        assert!(!blocks.is_empty(), "a piece needs at least one block");
        Self {
            kind,
            rotatable,
            color: Rgb::default(),
            blocks,
        }
    }

    /// Builds the standard shape for `kind` in spawn orientation.
    #[must_use]
    pub fn from_kind(kind: PieceKind) -> Self {
        Self::new(kind, kind.shape(), kind.is_rotatable())
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn is_rotatable(&self) -> bool {
        self.rotatable
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub(crate) fn into_blocks(self) -> ArrayVec<Block, PIECE_SIZE> {
        self.blocks
    }

    /// Horizontal extent: rightmost column minus leftmost column.
    #[must_use]
    pub fn width(&self) -> i32 {
        let cols = self.blocks.iter().map(|b| b.position().col);
        let (min, max) = cols.fold((i32::MAX, i32::MIN), |(lo, hi), c| (lo.min(c), hi.max(c)));
        (max - min).abs()
    }

    /// Highest row occupied by the piece.
    #[must_use]
    pub fn top(&self) -> i32 {
        self.blocks
            .iter()
            .map(|b| b.position().row)
            .max()
            .unwrap_or_default()
    }

    /// Snapshot of every block's position, by slot.
    #[must_use]
    pub fn positions(&self) -> PiecePositions {
        self.blocks.iter().map(Block::position).collect()
    }

    /// Stamps `color` on the piece and on each of its blocks.
    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
        for block in &mut self.blocks {
            block.set_color(color);
        }
    }
}

/// The seven tetromino shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Position of the kind in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether pieces of this kind may rotate. The O-piece is symmetric and
    /// does not.
    #[must_use]
    pub const fn is_rotatable(self) -> bool {
        !matches!(self, PieceKind::O)
    }

    /// Spawn-orientation block positions, pivot first.
    #[must_use]
    pub fn shape(self) -> [Position; PIECE_SIZE] {
        let p = Position::new;
        // (row, col), row 0 at the bottom of the piece
        match self {
            PieceKind::I => [p(0, 1), p(0, 0), p(0, 2), p(0, 3)],
            PieceKind::O => [p(0, 0), p(0, 1), p(1, 0), p(1, 1)],
            PieceKind::S => [p(0, 1), p(0, 0), p(1, 1), p(1, 2)],
            PieceKind::Z => [p(0, 1), p(0, 2), p(1, 0), p(1, 1)],
            PieceKind::J => [p(0, 1), p(0, 0), p(0, 2), p(1, 0)],
            PieceKind::L => [p(0, 1), p(0, 0), p(0, 2), p(1, 2)],
            PieceKind::T => [p(0, 1), p(0, 0), p(0, 2), p(1, 1)],
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use chromatris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use chromatris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_of_standard_shapes() {
        for kind in PieceKind::ALL {
            let piece = Piece::from_kind(kind);
            let expected_width = match kind {
                PieceKind::I => 3,
                PieceKind::O => 1,
                _ => 2,
            };
            let expected_top = if kind == PieceKind::I { 0 } else { 1 };
            assert_eq!(piece.width(), expected_width, "{kind:?}");
            assert_eq!(piece.top(), expected_top, "{kind:?}");
            assert_eq!(piece.blocks().len(), PIECE_SIZE);
        }
    }

    #[test]
    fn test_only_o_piece_is_locked_against_rotation() {
        for kind in PieceKind::ALL {
            assert_eq!(
                Piece::from_kind(kind).is_rotatable(),
                kind != PieceKind::O,
                "{kind:?}"
            );
        }
    }

    #[test]
    fn test_set_color_reaches_every_block() {
        let mut piece = Piece::from_kind(PieceKind::T);
        let color = Rgb::new(10, 20, 30);
        piece.set_color(color);

        assert_eq!(piece.color(), color);
        assert!(piece.blocks().iter().all(|b| b.color() == color));
    }

    #[test]
    fn test_positions_follow_slot_order() {
        let shape = [Position::new(3, 3), Position::new(3, 2), Position::new(4, 3)];
        let piece = Piece::new(PieceKind::J, shape, true);

        assert_eq!(piece.positions().as_slice(), &shape);
        assert!(piece.blocks().iter().all(|b| b.kind() == PieceKind::J));
    }

    #[test]
    fn test_width_ignores_column_order() {
        let piece = Piece::new(
            PieceKind::I,
            [Position::new(0, 4), Position::new(0, -1)],
            true,
        );
        assert_eq!(piece.width(), 5);
    }

    #[test]
    #[should_panic(expected = "at least one block")]
    fn test_empty_shape_is_rejected() {
        let _ = Piece::new(PieceKind::T, [], true);
    }

    #[test]
    fn test_piece_kind_char_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
        }
        assert_eq!(PieceKind::from_char('x'), None);
    }
}
