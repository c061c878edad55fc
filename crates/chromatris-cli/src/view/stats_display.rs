use std::iter;

use chromatris_engine::Game;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::style;

pub struct StatsDisplay<'a> {
    game: &'a Game,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(game: &'a Game) -> Self {
        Self { game, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        u16::try_from(ROWS.len()).unwrap_or(u16::MAX)
            + super::block_vertical_margin(self.block.as_ref())
    }
}

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(fn(&Game) -> String),
    LabelValue(&'static str, fn(&Game) -> String),
}

const ROWS: &[Row] = &[
    Row::FullLabel("SCORE:"),
    Row::FullValue(|game| game.score().points().to_string()),
    Row::FullLabel("TIME:"),
    Row::FullValue(|game| {
        let dur = game.elapsed();
        format!(
            "{:0}:{:0>2}.{:0>2}",
            dur.as_secs() / 60,
            dur.as_secs() % 60,
            dur.subsec_millis() / 10
        )
    }),
    Row::Empty,
    Row::LabelValue("LEVEL:", |game| game.level().level().to_string()),
    Row::LabelValue("ROWS:", |game| game.score().total_rows().to_string()),
    Row::LabelValue("MATCHED:", |game| {
        game.score().total_matched_blocks().to_string()
    }),
    Row::LabelValue("PIECES:", |game| game.completed_pieces().to_string()),
    Row::Empty,
    Row::LabelValue("SINGLES:", |game| {
        game.score().row_clear_counter()[1].to_string()
    }),
    Row::LabelValue("DOUBLES:", |game| {
        game.score().row_clear_counter()[2].to_string()
    }),
    Row::LabelValue("TRIPLES:", |game| {
        game.score().row_clear_counter()[3].to_string()
    }),
    Row::LabelValue("QUADS:", |game| {
        game.score().row_clear_counter()[4].to_string()
    }),
];

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;
        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas.iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(self.game), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(self.game), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}
