//! Board simulation and the turn loop built on it.
//!
//! - [`Board`] - The grid of placed blocks plus the falling piece
//! - [`Game`] - Per-tick loop merging player input with timed descent
//! - [`Score`] / [`Level`] - Accumulators fed by landings and clears
//! - [`BagPieceProvider`] - 7-bag piece generation system
//! - [`GameSeed`] - Seed for deterministic games
//! - [`InputSource`] - Where player actions come from
//! - [`GameConfig`] - Serializable settings a game is built from
//!
//! # Game Flow
//!
//! 1. Build a [`Game`] from a [`GameConfig`] and an [`InputSource`]
//! 2. [`Game::start`] clears the board and spawns the first piece
//! 3. Each frame, [`Game::update`] applies one player action or one step of
//!    automatic descent
//! 4. When the piece cannot descend it lands: full rows are removed once,
//!    then color runs are removed until none remain, and the next piece
//!    spawns
//! 5. A spawn that collides ends the game

pub use self::{
    board::*, config::*, game::*, input::*, level::*, piece_provider::*, score::*,
};

mod board;
mod config;
mod game;
mod input;
mod level;
mod piece_provider;
mod score;
