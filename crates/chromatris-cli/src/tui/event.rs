use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    /// Time to advance the application, with the time since the last tick.
    #[from(skip)]
    Tick(Duration),
    Render,
    /// Key presses, mouse input and resizes.
    Crossterm(CrosstermEvent),
}
