use std::time::Duration;

use super::{
    board::Board,
    config::{ConfigError, GameConfig},
    input::{InputSource, PlayerAction},
    level::{Level, LevelConfig},
    score::Score,
};

/// Lifecycle of a [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameState {
    /// Built but not started.
    Idle,
    Playing,
    Paused,
    /// A spawned piece collided with the stack.
    Finished,
}

/// Something that happened during [`Game::update`], for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The falling piece moved one cell, by the player or by gravity.
    PieceMoved,
    PieceRotated,
    /// The piece landed. `rows` full rows and `matched` color-matched blocks
    /// were removed before the next piece spawned.
    PieceLanded { rows: usize, matched: usize },
    GameFinished,
}

/// One game: a board, its input, and the clock that drives descent.
///
/// Every [`update`](Self::update) applies at most one change to the falling
/// piece. A player action from the input source wins, then an action queued
/// with [`set_next_action`](Self::set_next_action), and otherwise the elapsed
/// time counts toward the next automatic step down.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use chromatris_engine::{Game, GameConfig, GameEvent, NoInput};
///
/// let mut game = Game::new(&GameConfig::default(), Box::new(NoInput))?;
/// game.start();
///
/// // One full fall delay without input steps the piece down once.
/// game.update(Duration::from_secs(1));
/// assert_eq!(game.drain_events().collect::<Vec<_>>(), [GameEvent::PieceMoved]);
/// # Ok::<(), chromatris_engine::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Game {
    board: Board,
    input: Box<dyn InputSource>,
    score: Score,
    level: Level,
    state: GameState,
    next_action: Option<PlayerAction>,
    fall_timer: Duration,
    elapsed: Duration,
    completed_pieces: usize,
    events: Vec<GameEvent>,
}

impl Game {
    /// Builds a game from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not [validate](GameConfig::validate).
    pub fn new(config: &GameConfig, input: Box<dyn InputSource>) -> Result<Self, ConfigError> {
        Ok(Self::with_board(config.build_board()?, config.level, input))
    }

    /// Builds a game around a prepared board, e.g. one with a scripted piece
    /// sequence.
    #[must_use]
    pub fn with_board(board: Board, level: LevelConfig, input: Box<dyn InputSource>) -> Self {
        Self {
            board,
            input,
            score: Score::new(),
            level: Level::new(level),
            state: GameState::Idle,
            next_action: None,
            fall_timer: Duration::ZERO,
            elapsed: Duration::ZERO,
            completed_pieces: 0,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable access to the board, e.g. to lay out a puzzle once
    /// [`start`](Self::start) has cleared it.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[must_use]
    pub fn score(&self) -> &Score {
        &self.score
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Simulated time spent playing, pauses excluded.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Removes and returns the events raised since the last call.
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Starts a new game on a cleared board.
    ///
    /// Also restarts a finished or running game. If the first piece already
    /// collides the game finishes immediately.
    pub fn start(&mut self) {
        self.score.reset();
        self.level.reset();
        self.board.remove_all_blocks();
        self.next_action = None;
        self.fall_timer = Duration::ZERO;
        self.elapsed = Duration::ZERO;
        self.completed_pieces = 0;
        self.events.clear();
        self.state = GameState::Playing;
        tracing::debug!(
            width = self.board.width(),
            height = self.board.height(),
            level = self.level.level(),
            "game started"
        );
        self.spawn_piece();
    }

    pub fn pause(&mut self) {
        if self.state.is_playing() {
            self.state = GameState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state.is_paused() {
            self.state = GameState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => self.pause(),
            GameState::Paused => self.resume(),
            GameState::Idle | GameState::Finished => {}
        }
    }

    /// Queues `action` for the next update, replacing any unconsumed one.
    pub fn set_next_action(&mut self, action: PlayerAction) {
        self.next_action = Some(action);
    }

    /// Advances the game by `delta`. Does nothing unless playing.
    pub fn update(&mut self, delta: Duration) {
        if !self.state.is_playing() {
            return;
        }
        self.elapsed += delta;

        self.input.update();
        if let Some(action) = self
            .input
            .player_action()
            .or_else(|| self.next_action.take())
        {
            self.apply_action(action);
            return;
        }

        self.fall_timer += delta;
        if self.fall_timer >= self.level.fall_delay() {
            self.fall_timer = Duration::ZERO;
            if self.board.move_piece_down() {
                self.events.push(GameEvent::PieceMoved);
            } else {
                self.land_piece();
            }
        }
    }

    fn apply_action(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::MoveLeft => {
                if self.board.move_piece_left() {
                    self.events.push(GameEvent::PieceMoved);
                }
            }
            PlayerAction::MoveRight => {
                if self.board.move_piece_right() {
                    self.events.push(GameEvent::PieceMoved);
                }
            }
            PlayerAction::MoveDown => {
                self.fall_timer = Duration::ZERO;
                if self.board.move_piece_down() {
                    self.score.piece_moved_down();
                    self.events.push(GameEvent::PieceMoved);
                } else {
                    self.land_piece();
                }
            }
            PlayerAction::Rotate => {
                if self.board.rotate_piece() {
                    self.events.push(GameEvent::PieceRotated);
                }
            }
            PlayerAction::Fall => {
                let rows = self.board.fall_piece();
                self.score.piece_finished_falling(rows);
                self.fall_timer = Duration::ZERO;
                self.land_piece();
            }
        }
    }

    /// Clears what the landing completed, then spawns the next piece.
    fn land_piece(&mut self) {
        self.input.cancel();

        let rows = self.board.remove_full_rows();
        self.score.rows_cleared(rows);
        self.level.rows_cleared(rows);

        let mut matched = 0;
        loop {
            let count = self.board.remove_matching_color_blocks();
            if count == 0 {
                break;
            }
            self.score.matching_blocks_cleared(count);
            self.level.rows_cleared(count);
            matched += count;
        }

        self.completed_pieces += 1;
        self.events.push(GameEvent::PieceLanded { rows, matched });
        tracing::debug!(
            rows,
            matched,
            score = self.score.points(),
            level = self.level.level(),
            "piece landed"
        );
        self.spawn_piece();
    }

    fn spawn_piece(&mut self) {
        self.board.add_piece();
        self.input.reset();
        if self.board.has_collisions() {
            self.state = GameState::Finished;
            self.events.push(GameEvent::GameFinished);
            tracing::info!(
                score = self.score.points(),
                level = self.level.level(),
                pieces = self.completed_pieces,
                elapsed = ?self.elapsed,
                "game over"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque, rc::Rc};

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{Block, BoardSize, NoInput, PieceKind, Position, SequencePieceProvider, Theme};

    #[derive(Debug, Default)]
    struct Calls {
        updates: usize,
        cancels: usize,
        resets: usize,
    }

    #[derive(Debug)]
    struct RecordingInput {
        actions: VecDeque<PlayerAction>,
        calls: Rc<RefCell<Calls>>,
    }

    impl InputSource for RecordingInput {
        fn update(&mut self) {
            self.calls.borrow_mut().updates += 1;
        }

        fn player_action(&mut self) -> Option<PlayerAction> {
            self.actions.pop_front()
        }

        fn cancel(&mut self) {
            self.calls.borrow_mut().cancels += 1;
        }

        fn reset(&mut self) {
            self.calls.borrow_mut().resets += 1;
        }
    }

    fn recording(actions: &[PlayerAction]) -> (Box<RecordingInput>, Rc<RefCell<Calls>>) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let input = RecordingInput {
            actions: actions.iter().copied().collect(),
            calls: Rc::clone(&calls),
        };
        (Box::new(input), calls)
    }

    fn game(width: u16, height: u16, kinds: &[PieceKind], input: Box<dyn InputSource>) -> Game {
        let board = Board::with_rng(
            BoardSize::new(width, height),
            Box::new(SequencePieceProvider::new(kinds.to_vec())),
            Theme::CLASSIC,
            Pcg32::seed_from_u64(1),
        );
        Game::with_board(board, LevelConfig::default(), input)
    }

    fn events(game: &mut Game) -> Vec<GameEvent> {
        game.drain_events().collect()
    }

    fn piece_cols(game: &Game) -> Vec<i32> {
        let mut cols: Vec<_> = game.board().piece_positions().iter().map(|p| p.col).collect();
        cols.sort_unstable();
        cols.dedup();
        cols
    }

    #[test]
    fn test_update_does_nothing_unless_playing() {
        let mut game = game(10, 20, &[PieceKind::O], Box::new(NoInput));
        game.update(Duration::from_secs(5));
        assert!(game.state().is_idle());
        assert!(!game.board().has_piece());

        game.start();
        game.pause();
        game.update(Duration::from_secs(5));
        assert!(game.state().is_paused());
        assert_eq!(game.elapsed(), Duration::ZERO);
        assert!(events(&mut game).is_empty());

        game.resume();
        game.update(Duration::from_secs(1));
        assert_eq!(events(&mut game), [GameEvent::PieceMoved]);
        assert_eq!(game.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_delays_accumulate() {
        let mut game = game(10, 20, &[PieceKind::O], Box::new(NoInput));
        game.start();
        game.update(Duration::from_millis(400));
        game.update(Duration::from_millis(400));
        assert!(events(&mut game).is_empty());
        game.update(Duration::from_millis(400));
        assert_eq!(events(&mut game), [GameEvent::PieceMoved]);
        // The accumulator restarts from zero rather than carrying the excess.
        game.update(Duration::from_millis(900));
        assert!(events(&mut game).is_empty());
    }

    #[test]
    fn test_queued_action_is_overwritten() {
        let mut game = game(10, 20, &[PieceKind::O], Box::new(NoInput));
        game.start();
        assert_eq!(piece_cols(&game), [4, 5]);

        game.set_next_action(PlayerAction::MoveLeft);
        game.set_next_action(PlayerAction::MoveRight);
        game.update(Duration::ZERO);
        assert_eq!(piece_cols(&game), [5, 6]);

        game.update(Duration::ZERO);
        assert_eq!(piece_cols(&game), [5, 6]);
    }

    #[test]
    fn test_input_source_beats_queued_action() {
        let (input, calls) = recording(&[PlayerAction::MoveLeft]);
        let mut game = game(10, 20, &[PieceKind::T], input);
        game.start();
        game.set_next_action(PlayerAction::Rotate);

        game.update(Duration::ZERO);
        assert_eq!(events(&mut game), [GameEvent::PieceMoved]);
        game.update(Duration::ZERO);
        assert_eq!(events(&mut game), [GameEvent::PieceRotated]);
        assert_eq!(calls.borrow().updates, 2);
    }

    #[test]
    fn test_action_takes_the_whole_tick() {
        let mut game = game(10, 20, &[PieceKind::O], Box::new(NoInput));
        game.start();
        game.set_next_action(PlayerAction::MoveLeft);
        game.update(Duration::from_secs(5));
        assert_eq!(events(&mut game), [GameEvent::PieceMoved]);
        assert_eq!(game.board().piece_positions()[0], Position::new(18, 3));
    }

    #[test]
    fn test_move_down_scores_and_restarts_fall_delay() {
        let mut game = game(10, 20, &[PieceKind::O], Box::new(NoInput));
        game.start();
        game.update(Duration::from_millis(900));
        game.set_next_action(PlayerAction::MoveDown);
        game.update(Duration::ZERO);
        assert_eq!(game.score().points(), 1);
        assert_eq!(events(&mut game), [GameEvent::PieceMoved]);

        game.update(Duration::from_millis(900));
        assert!(events(&mut game).is_empty());
    }

    #[test]
    fn test_blocked_move_down_lands_piece() {
        let (input, calls) = recording(&[PlayerAction::MoveDown; 3]);
        let mut game = game(4, 4, &[PieceKind::O], input);
        game.start();
        assert_eq!(calls.borrow().resets, 1);

        for _ in 0..3 {
            game.update(Duration::ZERO);
        }
        assert_eq!(
            events(&mut game),
            [
                GameEvent::PieceMoved,
                GameEvent::PieceMoved,
                GameEvent::PieceLanded {
                    rows: 0,
                    matched: 0
                },
            ]
        );
        assert_eq!(game.score().points(), 2);
        assert_eq!(game.completed_pieces(), 1);
        assert_eq!(calls.borrow().cancels, 1);
        assert_eq!(calls.borrow().resets, 2);
        assert_eq!(game.board().blocks().len(), 8);
    }

    #[test]
    fn test_hard_drop_clears_full_row() {
        let mut game = game(4, 8, &[PieceKind::I], Box::new(NoInput));
        game.start();
        game.set_next_action(PlayerAction::Fall);
        game.update(Duration::ZERO);

        assert_eq!(
            events(&mut game),
            [GameEvent::PieceLanded {
                rows: 1,
                matched: 0
            }]
        );
        assert_eq!(game.score().points(), 2 * 7 + 100);
        assert_eq!(game.level().rows(), 1);
        // Only the freshly spawned piece is left.
        assert_eq!(game.board().blocks().len(), 4);
        assert!(game.board().has_piece());
    }

    #[test]
    fn test_landing_runs_color_matches() {
        let mut game = game(6, 8, &[PieceKind::I], Box::new(NoInput));
        game.start();
        game.set_next_action(PlayerAction::Fall);
        game.update(Duration::ZERO);

        assert_eq!(
            events(&mut game),
            [GameEvent::PieceLanded {
                rows: 0,
                matched: 3
            }]
        );
        assert_eq!(game.score().points(), 2 * 7 + 3 * 20);
        assert_eq!(game.score().total_matched_blocks(), 3);
        assert_eq!(game.level().rows(), 3);
        assert_eq!(game.board().blocks().len(), 1 + 4);
    }

    #[test]
    fn test_landing_over_a_gap_leaves_no_hole() {
        let mut game = game(4, 8, &[PieceKind::S], Box::new(NoInput));
        game.start();
        game.board_mut()
            .add_block(Block::new(Position::new(0, 2), PieceKind::O));
        // S spawns with its lower pair on columns 1-2 and rests on the O,
        // overhanging column 1 and column 3.
        game.set_next_action(PlayerAction::Fall);
        game.update(Duration::ZERO);

        assert_eq!(
            events(&mut game),
            [GameEvent::PieceLanded {
                rows: 0,
                matched: 0
            }]
        );
        let mut settled: Vec<_> = game
            .board()
            .blocks()
            .iter()
            .map(Block::position)
            .filter(|p| p.row < 4)
            .collect();
        settled.sort();
        assert_eq!(
            settled,
            [
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(0, 3),
                Position::new(1, 2),
            ]
        );
        assert!(game.state().is_playing());
    }

    #[test]
    fn test_colliding_spawn_finishes_game() {
        let mut game = game(4, 2, &[PieceKind::O], Box::new(NoInput));
        game.start();
        assert!(game.state().is_playing());

        game.set_next_action(PlayerAction::Fall);
        game.update(Duration::ZERO);
        assert_eq!(
            events(&mut game),
            [
                GameEvent::PieceLanded {
                    rows: 0,
                    matched: 0
                },
                GameEvent::GameFinished,
            ]
        );
        assert!(game.state().is_finished());

        game.set_next_action(PlayerAction::MoveLeft);
        game.update(Duration::from_secs(10));
        assert!(events(&mut game).is_empty());
        game.toggle_pause();
        assert!(game.state().is_finished());
    }

    #[test]
    fn test_start_on_undersized_board_finishes_at_once() {
        let mut game = game(3, 4, &[PieceKind::I], Box::new(NoInput));
        game.start();
        assert!(game.state().is_finished());
        assert_eq!(events(&mut game), [GameEvent::GameFinished]);
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut game = game(4, 8, &[PieceKind::I], Box::new(NoInput));
        game.start();
        game.set_next_action(PlayerAction::Fall);
        game.update(Duration::from_millis(10));
        assert!(game.score().points() > 0);

        game.start();
        assert_eq!(game.score().points(), 0);
        assert_eq!(game.level().rows(), 0);
        assert_eq!(game.elapsed(), Duration::ZERO);
        assert_eq!(game.completed_pieces(), 0);
        assert_eq!(game.board().blocks().len(), 4);
        assert!(events(&mut game).is_empty());
    }

    #[test]
    fn test_toggle_pause() {
        let mut game = game(10, 20, &[PieceKind::O], Box::new(NoInput));
        game.toggle_pause();
        assert!(game.state().is_idle());
        game.start();
        game.toggle_pause();
        assert!(game.state().is_paused());
        game.toggle_pause();
        assert!(game.state().is_playing());
    }
}
