use chromatris_engine::{Game, GameState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use super::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Board, next piece and stats side by side, with a banner when the game is
/// paused or over.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    game: &'a Game,
    show_shadow: bool,
}

impl<'a> GameDisplay<'a> {
    pub fn new(game: &'a Game, show_shadow: bool) -> Self {
        Self { game, show_shadow }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = match self.game.state() {
            GameState::Idle | GameState::Playing => color::WHITE,
            GameState::Paused => color::YELLOW,
            GameState::Finished => color::RED,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(Padding::symmetric(1, 0))
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let board = self.game.board();
        let game_board = BoardDisplay::new(board).shadow(self.show_shadow).block(
            Block::bordered()
                .border_style(border_style)
                .style(style::DEFAULT),
        );
        let next = board.next_piece();
        let next_color = board.theme().color_of(next.kind());
        let next_panel = PieceDisplay::new()
            .piece(next, next_color)
            .block(panel("NEXT"));
        let stats = StatsDisplay::new(self.game).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let board_width = game_board.width();
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        let popup = match self.game.state() {
            GameState::Idle | GameState::Playing => None,
            GameState::Paused => Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW))),
            GameState::Finished => {
                Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        };
        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
