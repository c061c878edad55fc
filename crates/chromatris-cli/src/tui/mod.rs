//! Minimal terminal runtime: a tick clock, a render trigger and crossterm
//! events, dispatched to an [`App`].

use std::{io, time::Duration};

use crossterm::event::Event;
use ratatui::Frame;

pub use self::event_loop::RenderMode;
use self::{event::TuiEvent, event_loop::EventLoop};

mod event;
mod event_loop;

/// A terminal application driven by [`Runtime::run`].
pub trait App {
    /// Called once before the loop starts. Use this to set the tick rate.
    fn init(&mut self, runtime: &mut Runtime);

    fn should_exit(&self) -> bool;

    /// Handles key presses, resizes and other terminal events.
    fn handle_event(&mut self, runtime: &mut Runtime, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by the wall-clock time since the last tick.
    fn update(&mut self, runtime: &mut Runtime, delta: Duration);
}

#[derive(Debug, Default)]
pub struct Runtime {
    events: EventLoop,
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tick rate in ticks per second. `None` stops ticking.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.events
            .set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Takes over the terminal and runs `app` until it asks to exit.
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            while !app.should_exit() {
                match self.events.next()? {
                    TuiEvent::Tick(delta) => app.update(&mut self, delta),
                    TuiEvent::Render => {
                        terminal.draw(|f| app.draw(f))?;
                    }
                    TuiEvent::Crossterm(event) => app.handle_event(&mut self, event),
                }
            }
            Ok(())
        })
    }
}
