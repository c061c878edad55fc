//! Board simulation and turn loop for Chromatris, a falling-block puzzle with
//! an extra "match by color" clearing rule.
//!
//! - [`core`] holds the value types: [`Position`], [`Block`], [`Piece`] and
//!   the color [`Theme`].
//! - [`engine`] holds the [`Board`] simulation and drives it over time:
//!   [`Game`], scoring, leveling, piece generation and the [`InputSource`]
//!   seam.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use chromatris_engine::{Game, GameConfig, GameSeed, NoInput, PlayerAction};
//!
//! let config = GameConfig {
//!     seed: Some(GameSeed::from_bytes([7; 16])),
//!     ..GameConfig::default()
//! };
//! let mut game = Game::new(&config, Box::new(NoInput)).unwrap();
//! game.start();
//!
//! game.set_next_action(PlayerAction::Fall);
//! game.update(Duration::from_millis(16));
//!
//! assert!(game.score().points() > 0);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
