use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Difficulty curve: how fast levels come and how fast pieces fall.
///
/// The fall delay shrinks by `fall_delay_step_ms` per level from
/// `initial_fall_delay_ms` until it reaches `min_fall_delay_ms`. The defaults
/// go from one second at level 0 down to 100 ms at level 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    pub start_level: usize,
    pub rows_per_level: usize,
    pub initial_fall_delay_ms: u64,
    pub min_fall_delay_ms: u64,
    pub fall_delay_step_ms: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            start_level: 0,
            rows_per_level: 10,
            initial_fall_delay_ms: 1000,
            min_fall_delay_ms: 100,
            fall_delay_step_ms: 100,
        }
    }
}

/// Current level of a game, advanced by clears.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use chromatris_engine::{Level, LevelConfig};
///
/// let mut level = Level::new(LevelConfig::default());
/// assert_eq!(level.fall_delay(), Duration::from_secs(1));
///
/// level.rows_cleared(25);
/// assert_eq!(level.level(), 2);
/// assert_eq!(level.fall_delay(), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    config: LevelConfig,
    rows: usize,
}

impl Level {
    #[must_use]
    pub fn new(config: LevelConfig) -> Self {
        Self { config, rows: 0 }
    }

    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.config.start_level + self.rows / self.config.rows_per_level.max(1)
    }

    /// Rows (and matched blocks) counted toward leveling so far.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Time a piece waits before each automatic step down.
    #[must_use]
    pub fn fall_delay(&self) -> Duration {
        let LevelConfig {
            initial_fall_delay_ms,
            min_fall_delay_ms,
            fall_delay_step_ms,
            ..
        } = self.config;
        let level = u64::try_from(self.level()).unwrap_or(u64::MAX);
        let millis = initial_fall_delay_ms
            .saturating_sub(level.saturating_mul(fall_delay_step_ms))
            .max(min_fall_delay_ms);
        Duration::from_millis(millis)
    }

    /// Counts `count` cleared rows toward the next level.
    pub fn rows_cleared(&mut self, count: usize) {
        self.rows += count;
    }

    pub fn reset(&mut self) {
        self.rows = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_curve() {
        let mut level = Level::new(LevelConfig::default());
        let mut delays = Vec::new();
        for _ in 0..12 {
            delays.push(level.fall_delay().as_millis());
            level.rows_cleared(10);
        }
        assert_eq!(
            delays,
            [1000, 900, 800, 700, 600, 500, 400, 300, 200, 100, 100, 100]
        );
    }

    #[test]
    fn test_level_counts_from_start_level() {
        let mut level = Level::new(LevelConfig {
            start_level: 3,
            rows_per_level: 4,
            ..LevelConfig::default()
        });
        assert_eq!(level.level(), 3);
        level.rows_cleared(3);
        assert_eq!(level.level(), 3);
        level.rows_cleared(1);
        assert_eq!(level.level(), 4);
        assert_eq!(level.fall_delay(), Duration::from_millis(600));

        level.reset();
        assert_eq!(level.level(), 3);
    }

    #[test]
    fn test_config_fills_missing_fields_from_defaults() {
        let config: LevelConfig = serde_json::from_str(r#"{"rows_per_level": 5}"#).unwrap();
        assert_eq!(
            config,
            LevelConfig {
                rows_per_level: 5,
                ..LevelConfig::default()
            }
        );
    }
}
