use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::event;

use super::event::TuiEvent;

/// When the screen is redrawn.
#[derive(Debug, Clone, Copy, Default)]
pub enum RenderMode {
    /// Redraw at a fixed interval.
    Interval(Duration),
    /// Redraw after every tick or terminal event.
    #[default]
    OnDirty,
}

impl RenderMode {
    /// Creates `Interval` mode from a frame rate.
    #[must_use]
    pub fn interval_from_rate(rate: f64) -> Self {
        Self::Interval(Duration::from_secs_f64(1.0 / rate))
    }
}

/// Decides which event comes next and waits for it.
#[derive(Debug)]
pub(super) struct EventLoop {
    tick_interval: Option<Duration>,
    render_mode: RenderMode,
    last_tick: Option<Instant>,
    last_render: Instant,
    dirty: bool,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self {
            tick_interval: None,
            render_mode: RenderMode::default(),
            last_tick: None,
            last_render: Instant::now(),
            // first frame
            dirty: true,
        }
    }
}

impl EventLoop {
    pub(super) fn set_tick_interval(&mut self, interval: Option<Duration>) {
        self.tick_interval = interval;
    }

    pub(super) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// Blocks until a tick or render is due or a terminal event arrives.
    ///
    /// The first tick reports a zero delta; later ticks report the time
    /// since the previous one.
    pub(super) fn next(&mut self) -> io::Result<TuiEvent> {
        loop {
            let now = Instant::now();
            if let Some(interval) = self.tick_interval {
                match self.last_tick {
                    None => {
                        self.last_tick = Some(now);
                        self.dirty = true;
                        return Ok(TuiEvent::Tick(Duration::ZERO));
                    }
                    Some(last) if now.duration_since(last) >= interval => {
                        self.last_tick = Some(now);
                        self.dirty = true;
                        return Ok(TuiEvent::Tick(now.duration_since(last)));
                    }
                    Some(_) => {}
                }
            }

            let do_render = match self.render_mode {
                RenderMode::Interval(interval) => now.duration_since(self.last_render) >= interval,
                RenderMode::OnDirty => self.dirty,
            };
            if do_render {
                self.last_render = now;
                self.dirty = false;
                return Ok(TuiEvent::Render);
            }

            if let Some(timeout) = self.timeout(now)
                && !event::poll(timeout)?
            {
                continue;
            }

            self.dirty = true;
            return Ok(event::read()?.into());
        }
    }

    fn timeout(&self, now: Instant) -> Option<Duration> {
        let next_tick_at = self
            .tick_interval
            .zip(self.last_tick)
            .map(|(interval, last)| last + interval);
        let next_render_at = match self.render_mode {
            RenderMode::Interval(interval) => Some(self.last_render + interval),
            RenderMode::OnDirty => self.dirty.then_some(now),
        };
        let next_at = [next_tick_at, next_render_at].into_iter().flatten().min()?;
        Some(next_at.saturating_duration_since(now))
    }
}
