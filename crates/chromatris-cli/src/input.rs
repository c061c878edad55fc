use std::{
    collections::VecDeque,
    sync::mpsc::{self, Receiver, Sender},
};

use chromatris_engine::{InputSource, PlayerAction};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// Maps a key to the action it triggers in play.
pub fn action_for_key(code: KeyCode) -> Option<PlayerAction> {
    let action = match code {
        KeyCode::Left | KeyCode::Char('h') => PlayerAction::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => PlayerAction::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => PlayerAction::MoveDown,
        KeyCode::Char('z' | 'x' | 'k') => PlayerAction::Rotate,
        KeyCode::Up | KeyCode::Char(' ') => PlayerAction::Fall,
        _ => return None,
    };
    Some(action)
}

/// Keyboard-backed [`InputSource`].
///
/// The terminal event handler sends key events through the paired
/// [`KeySender`]; each game tick collects them into a queue and hands out one
/// action per tick.
#[derive(Debug)]
pub struct KeyboardInput {
    keys: Receiver<KeyEvent>,
    pending: VecDeque<PlayerAction>,
}

#[derive(Debug, Clone)]
pub struct KeySender(Sender<KeyEvent>);

impl KeySender {
    /// Forwards `key` to the game. Keys sent after the game is gone are
    /// dropped.
    pub fn send(&self, key: KeyEvent) {
        if let Err(err) = self.0.send(key) {
            tracing::trace!(key = ?err.0, "key dropped, input receiver is gone");
        }
    }
}

impl KeyboardInput {
    pub fn channel() -> (Self, KeySender) {
        let (tx, rx) = mpsc::channel();
        let input = Self {
            keys: rx,
            pending: VecDeque::new(),
        };
        (input, KeySender(tx))
    }
}

impl InputSource for KeyboardInput {
    fn update(&mut self) {
        let actions = self
            .keys
            .try_iter()
            .filter(|key| key.kind != KeyEventKind::Release)
            .filter_map(|key| action_for_key(key.code));
        self.pending.extend(actions);
    }

    fn player_action(&mut self) -> Option<PlayerAction> {
        self.pending.pop_front()
    }

    fn cancel(&mut self) {
        self.pending.clear();
    }

    fn reset(&mut self) {
        // Keys pressed while the previous piece landed belong to it.
        self.keys.try_iter().for_each(drop);
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_map() {
        assert_eq!(action_for_key(KeyCode::Left), Some(PlayerAction::MoveLeft));
        assert_eq!(action_for_key(KeyCode::Up), Some(PlayerAction::Fall));
        assert_eq!(action_for_key(KeyCode::Char('x')), Some(PlayerAction::Rotate));
        assert_eq!(action_for_key(KeyCode::Char('q')), None);
    }

    #[test]
    fn test_one_action_per_tick_in_key_order() {
        let (mut input, keys) = KeyboardInput::channel();
        keys.send(press(KeyCode::Left));
        keys.send(press(KeyCode::Char('p')));
        keys.send(press(KeyCode::Down));

        input.update();
        assert_eq!(input.player_action(), Some(PlayerAction::MoveLeft));
        input.update();
        assert_eq!(input.player_action(), Some(PlayerAction::MoveDown));
        input.update();
        assert_eq!(input.player_action(), None);
    }

    #[test]
    fn test_send_after_input_is_dropped_is_ignored() {
        let (input, keys) = KeyboardInput::channel();
        drop(input);
        keys.send(press(KeyCode::Left));
    }

    #[test]
    fn test_cancel_and_reset_drop_queued_keys() {
        let (mut input, keys) = KeyboardInput::channel();
        keys.send(press(KeyCode::Left));
        input.update();
        input.cancel();
        assert_eq!(input.player_action(), None);

        keys.send(press(KeyCode::Right));
        input.reset();
        input.update();
        assert_eq!(input.player_action(), None);
    }
}
