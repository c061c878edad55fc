use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{Theme, ThemeName};

use super::{
    board::{Board, BoardSize},
    level::LevelConfig,
    piece_provider::{BagPieceProvider, GameSeed},
};

/// Smallest board width or height a game accepts.
pub const MIN_BOARD_SIDE: u16 = 4;

/// Settings a [`Game`](crate::Game) is built from.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
///
/// # Example
///
/// ```
/// use chromatris_engine::{BoardSize, GameConfig, ThemeName};
///
/// let config: GameConfig =
///     serde_json::from_str(r#"{"board": {"width": 8, "height": 16}, "theme": "pastel"}"#)?;
/// assert_eq!(config.board, BoardSize::new(8, 16));
/// assert_eq!(config.theme, ThemeName::Pastel);
/// assert!(config.seed.is_none());
/// config.validate()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub board: BoardSize,
    /// Seed for the piece sequence and the board's tie-breaks. Random when
    /// unset.
    pub seed: Option<GameSeed>,
    pub level: LevelConfig,
    pub theme: ThemeName,
}

/// Error returned by [`GameConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board must be at least 4x4 cells, got {width}x{height}")]
    BoardTooSmall { width: u16, height: u16 },
    #[display("rows per level must be positive")]
    ZeroRowsPerLevel,
    #[display("minimum fall delay must be positive")]
    ZeroFallDelay,
    #[display("minimum fall delay ({min_ms} ms) exceeds initial fall delay ({initial_ms} ms)")]
    InvertedFallDelay { min_ms: u64, initial_ms: u64 },
}

impl GameConfig {
    /// Checks that a game can be built from this config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardSize { width, height } = self.board;
        if width < MIN_BOARD_SIDE || height < MIN_BOARD_SIDE {
            return Err(ConfigError::BoardTooSmall { width, height });
        }
        if self.level.rows_per_level == 0 {
            return Err(ConfigError::ZeroRowsPerLevel);
        }
        if self.level.min_fall_delay_ms == 0 {
            return Err(ConfigError::ZeroFallDelay);
        }
        if self.level.min_fall_delay_ms > self.level.initial_fall_delay_ms {
            return Err(ConfigError::InvertedFallDelay {
                min_ms: self.level.min_fall_delay_ms,
                initial_ms: self.level.initial_fall_delay_ms,
            });
        }
        Ok(())
    }

    /// Builds an empty board fed by a 7-bag provider.
    ///
    /// With a seed set, the provider and the board's tie-break generator are
    /// both derived from it, so the same seed always yields the same game.
    ///
    /// # Errors
    ///
    /// Returns the [`validate`](Self::validate) error, if any.
    pub fn build_board(&self) -> Result<Board, ConfigError> {
        self.validate()?;
        let mut master = match self.seed {
            Some(seed) => seed.rng(),
            None => Pcg32::from_rng(&mut rand::rng()),
        };
        let provider = BagPieceProvider::with_rng(Pcg32::from_rng(&mut master));
        Ok(Board::with_rng(
            self.board,
            Box::new(provider),
            Theme::from(self.theme),
            Pcg32::from_rng(&mut master),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_boards_below_four_by_four() {
        for (width, height) in [(3, 20), (10, 3), (0, 0)] {
            let config = GameConfig {
                board: BoardSize::new(width, height),
                ..GameConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::BoardTooSmall { width, height })
            );
        }
        let smallest = GameConfig {
            board: BoardSize::new(4, 4),
            ..GameConfig::default()
        };
        assert!(smallest.validate().is_ok());
    }

    #[test]
    fn test_rejects_broken_level_curve() {
        let mut config = GameConfig::default();
        config.level.rows_per_level = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRowsPerLevel));

        let mut config = GameConfig::default();
        config.level.min_fall_delay_ms = 2000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("2000 ms"), "{err}");
    }

    #[test]
    fn test_rejects_zero_fall_delay() {
        let mut config = GameConfig::default();
        config.level.initial_fall_delay_ms = 0;
        config.level.min_fall_delay_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroFallDelay));

        config.level.min_fall_delay_ms = 1;
        config.level.initial_fall_delay_ms = 1;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(serde_json::from_str::<GameConfig>(r#"{"speed": 3}"#).is_err());
    }

    #[test]
    fn test_seeded_boards_share_piece_sequence() {
        let config = GameConfig {
            seed: Some(GameSeed::from_bytes([42; 16])),
            ..GameConfig::default()
        };
        let mut a = config.build_board().unwrap();
        let mut b = config.build_board().unwrap();
        for _ in 0..20 {
            a.add_piece();
            b.add_piece();
            assert_eq!(a.piece_kind(), b.piece_kind());
            a.remove_all_blocks();
            b.remove_all_blocks();
        }
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = GameConfig {
            board: BoardSize::new(6, 12),
            seed: Some(GameSeed::from_bytes([3; 16])),
            theme: ThemeName::HighContrast,
            ..GameConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"high-contrast\""));
        assert_eq!(serde_json::from_str::<GameConfig>(&json).unwrap(), config);
    }
}
