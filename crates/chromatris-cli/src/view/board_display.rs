use chromatris_engine::{Board, Position};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::BlockDisplay;

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    show_shadow: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            show_shadow: false,
            block: None,
        }
    }

    pub fn shadow(self, show_shadow: bool) -> Self {
        Self {
            show_shadow,
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
        self.board.size().width * BlockDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        self.board.size().height * BlockDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Cell contents in row-major order, bottom row first.
    fn cells(&self) -> Vec<BlockDisplay> {
        let width = usize::from(self.board.size().width);
        let height = usize::from(self.board.size().height);
        let index = |position: Position| {
            let row = usize::try_from(position.row).ok()?;
            let col = usize::try_from(position.col).ok()?;
            (row < height && col < width).then_some(row * width + col)
        };

        let mut cells = vec![BlockDisplay::EMPTY_DOT; width * height];
        if self.show_shadow {
            for position in self.board.piece_shadow() {
                if let Some(i) = index(position) {
                    cells[i] = BlockDisplay::SHADOW;
                }
            }
        }
        for block in self.board.blocks() {
            if let Some(i) = index(block.position()) {
                cells[i] = BlockDisplay::filled(block.color());
            }
        }
        cells
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let size = self.board.size();
        let width = usize::from(size.width);
        let cells = self.cells();

        let col_constraints = (0..size.width).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..size.height).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        // Screen rows run top-down, board rows bottom-up.
        let grid_rows = area.layout_vec(&vertical).into_iter().rev();
        for (row, grid_row) in grid_rows.enumerate() {
            for (col, grid_cell) in grid_row.layout_vec(&horizontal).into_iter().enumerate() {
                cells[row * width + col].render(grid_cell, buf);
            }
        }
    }
}
