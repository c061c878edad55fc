use std::{collections::VecDeque, fmt};

use serde::{Deserialize, Serialize};

/// The commands a player can issue against the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    /// Hard drop: fall as far as possible and land at once.
    Fall,
}

/// A live source of player actions, polled once per tick by
/// [`Game`](crate::Game).
///
/// Keyboards, touch buttons and gesture detectors all sit behind this trait.
/// How an implementation turns raw device input into actions is its own
/// business.
pub trait InputSource: fmt::Debug {
    /// Advances the source by one tick. Called before
    /// [`player_action`](Self::player_action).
    fn update(&mut self) {}

    /// Returns the pending action, if any, and clears it.
    fn player_action(&mut self) -> Option<PlayerAction>;

    /// Drops any pending action. Called whenever a piece lands.
    fn cancel(&mut self) {}

    /// Clears internal detection state. Called whenever a piece spawns.
    fn reset(&mut self) {}
}

/// An input source that never produces an action.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn player_action(&mut self) -> Option<PlayerAction> {
        None
    }
}

/// Replays a fixed script, one entry per tick.
///
/// Each [`update`](InputSource::update) moves to the next entry; `None`
/// entries are ticks without input. Once the script runs out the source stays
/// silent.
///
/// # Example
///
/// ```
/// use chromatris_engine::{InputSource as _, PlayerAction, ScriptedInput};
///
/// let mut input = ScriptedInput::new([Some(PlayerAction::Rotate), None]);
///
/// input.update();
/// assert_eq!(input.player_action(), Some(PlayerAction::Rotate));
/// assert_eq!(input.player_action(), None);
///
/// input.update();
/// assert_eq!(input.player_action(), None);
/// assert!(input.is_finished());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    script: VecDeque<Option<PlayerAction>>,
    pending: Option<PlayerAction>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Option<PlayerAction>>,
    {
        Self {
            script: script.into_iter().collect(),
            pending: None,
        }
    }

    /// Appends one tick to the end of the script.
    pub fn push(&mut self, action: Option<PlayerAction>) {
        self.script.push_back(action);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.script.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn update(&mut self) {
        self.pending = self.script.pop_front().flatten();
    }

    fn player_action(&mut self) -> Option<PlayerAction> {
        self.pending.take()
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}
