use chromatris_engine::{Piece, Rgb};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::BlockDisplay;

/// Preview of a single piece in spawn orientation.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<(Piece, Rgb)>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: Piece, color: Rgb) -> Self {
        Self {
            piece: Some((piece, color)),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        let Some((piece, color)) = &self.piece else {
            return;
        };

        let positions = piece.positions();
        let min_row = positions.iter().map(|p| p.row).min().unwrap_or_default();
        let min_col = positions.iter().map(|p| p.col).min().unwrap_or_default();
        let cols = u16::try_from(piece.width() + 1).unwrap_or_default();
        let rows = u16::try_from(piece.top() - min_row + 1).unwrap_or_default();

        let piece_area = area.centered(
            Constraint::Length(cols * BlockDisplay::width()),
            Constraint::Length(rows * BlockDisplay::height()),
        );
        let horizontal = Layout::horizontal((0..cols).map(|_| Constraint::Length(BlockDisplay::width())))
            .flex(Flex::Center);
        let vertical = Layout::vertical((0..rows).map(|_| Constraint::Length(BlockDisplay::height())));

        let filled = BlockDisplay::filled(*color);
        let grid_rows = piece_area.layout_vec(&vertical).into_iter().rev();
        for (row, grid_row) in (min_row..).zip(grid_rows) {
            for (col, grid_cell) in (min_col..).zip(grid_row.layout_vec(&horizontal)) {
                if positions.iter().any(|p| p.row == row && p.col == col) {
                    filled.render(grid_cell, buf);
                } else {
                    BlockDisplay::EMPTY.render(grid_cell, buf);
                }
            }
        }
    }
}
