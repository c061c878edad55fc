use serde::{Deserialize, Serialize};

use super::{piece::PieceKind, position::Position};

/// Display color of a block, in 8-bit RGB.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A single occupied cell.
///
/// The [`PieceKind`] tag is what color matching compares; the [`Rgb`] color
/// is presentation only and comes from the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    position: Position,
    kind: PieceKind,
    color: Rgb,
}

impl Block {
    #[must_use]
    pub const fn new(position: Position, kind: PieceKind) -> Self {
        Self {
            position,
            kind,
            color: Rgb::new(0, 0, 0),
        }
    }

    #[must_use]
    pub const fn with_color(self, color: Rgb) -> Self {
        Self { color, ..self }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    pub(crate) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    pub const fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }
}
