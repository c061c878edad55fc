use std::time::Duration;

use chromatris_engine::{Game, GameConfig, GameEvent, GameState};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::{
    input::{KeySender, KeyboardInput},
    tui::{App, RenderMode, Runtime},
    view::GameDisplay,
};

use super::GameArg;

const FPS: f64 = 60.0;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    pub(super) game: GameArg,
    /// Hide the preview of where the piece will land
    #[arg(long)]
    no_shadow: bool,
}

pub(crate) fn run(arg: &PlayArg, config: &GameConfig) -> anyhow::Result<()> {
    let (input, keys) = KeyboardInput::channel();
    let game = Game::new(config, Box::new(input))?;
    let mut app = PlayApp {
        game,
        keys,
        show_shadow: !arg.no_shadow,
        is_exiting: false,
    };

    Runtime::new().run(&mut app)?;

    tracing::info!(
        score = app.game.score().points(),
        pieces = app.game.completed_pieces(),
        "session ended"
    );
    Ok(())
}

#[derive(Debug)]
struct PlayApp {
    game: Game,
    keys: KeySender,
    show_shadow: bool,
    is_exiting: bool,
}

impl App for PlayApp {
    fn init(&mut self, runtime: &mut Runtime) {
        runtime.set_tick_rate(Some(FPS));
        runtime.set_render_mode(RenderMode::interval_from_rate(FPS));
        self.game.start();
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _runtime: &mut Runtime, event: Event) {
        let Some(key) = event.as_key_event() else {
            return;
        };
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.is_exiting = true,
            KeyCode::Char('p') => self.game.toggle_pause(),
            KeyCode::Char('r') if self.game.state().is_finished() => self.game.start(),
            _ if self.game.state().is_playing() => self.keys.send(key),
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let help_text = match self.game.state() {
            GameState::Idle | GameState::Playing => {
                "Controls: ← → (Move) | ↓ (Soft Drop) | ↑ Space (Hard Drop) | Z X (Rotate) | P (Pause) | Q (Quit)"
            }
            GameState::Paused => "Controls: P (Resume) | Q (Quit)",
            GameState::Finished => "Controls: R (Restart) | Q (Quit)",
        };
        let help_text = Text::from(help_text)
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let board_rows = self.game.board().size().height;
        let [main_area, help_area] = Layout::vertical([
            Constraint::Length(board_rows.saturating_add(2)),
            Constraint::Length(1),
        ])
        .areas::<2>(frame.area());
        frame.render_widget(GameDisplay::new(&self.game, self.show_shadow), main_area);
        frame.render_widget(help_text, help_area);
    }

    fn update(&mut self, _runtime: &mut Runtime, delta: Duration) {
        self.game.update(delta);
        for event in self.game.drain_events() {
            match event {
                GameEvent::GameFinished => tracing::info!("game over, press r to restart"),
                event => tracing::trace!(?event, "game event"),
            }
        }
    }
}
