use std::{io, time::Duration};

use anyhow::{Context as _, ensure};
use chromatris_engine::{Game, GameConfig, GameSeed, InputSource, PlayerAction};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use serde::Serialize;

use super::GameArg;

/// Safety stop for games that never land a piece.
const MAX_TICKS: u64 = 10_000_000;

const ACTIONS: [PlayerAction; 5] = [
    PlayerAction::MoveLeft,
    PlayerAction::MoveRight,
    PlayerAction::MoveDown,
    PlayerAction::Rotate,
    PlayerAction::Fall,
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    #[clap(flatten)]
    pub(super) game: GameArg,
    /// Number of games to run
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// End a game after this many pieces have landed
    #[arg(long, default_value_t = 500)]
    max_pieces: usize,
    /// Simulated time per tick, in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Chance per tick that the random player acts
    #[arg(long, default_value_t = 0.2)]
    action_rate: f64,
}

/// Presses a random key on a fraction of ticks.
#[derive(Debug)]
struct RandomInput {
    rng: StdRng,
    action_rate: f64,
}

impl InputSource for RandomInput {
    fn player_action(&mut self) -> Option<PlayerAction> {
        if !self.rng.random_bool(self.action_rate) {
            return None;
        }
        Some(ACTIONS[self.rng.random_range(0..ACTIONS.len())])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct GameReport {
    seed: GameSeed,
    finished: bool,
    pieces: usize,
    points: usize,
    rows: usize,
    matched_blocks: usize,
    level: usize,
    elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    games: Vec<GameReport>,
    mean_points: f64,
}

pub(crate) fn run(arg: &SimulateArg, config: &GameConfig) -> anyhow::Result<()> {
    ensure!(
        (0.0..=1.0).contains(&arg.action_rate),
        "action rate must be between 0 and 1, got {}",
        arg.action_rate
    );
    ensure!(arg.tick_ms > 0, "tick length must be positive");

    let mut seeds = match config.seed {
        Some(seed) => StdRng::from_rng(&mut seed.rng()),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let mut games = Vec::with_capacity(arg.games);
    for i in 0..arg.games {
        let seed = match config.seed {
            Some(seed) if i == 0 => seed,
            _ => seeds.random(),
        };
        games.push(run_game(config, seed, arg)?);
    }

    #[expect(clippy::cast_precision_loss)]
    let mean_points = if games.is_empty() {
        0.0
    } else {
        games.iter().map(|g| g.points).sum::<usize>() as f64 / games.len() as f64
    };
    let report = SimulationReport { games, mean_points };

    serde_json::to_writer_pretty(io::stdout().lock(), &report)
        .context("Failed to write simulation report")?;
    println!();
    Ok(())
}

fn run_game(config: &GameConfig, seed: GameSeed, arg: &SimulateArg) -> anyhow::Result<GameReport> {
    let config = GameConfig {
        seed: Some(seed),
        ..config.clone()
    };
    let input = RandomInput {
        rng: StdRng::from_rng(&mut seed.rng()),
        action_rate: arg.action_rate,
    };
    let mut game = Game::new(&config, Box::new(input))?;
    let tick = Duration::from_millis(arg.tick_ms);

    game.start();
    let mut ticks = 0;
    while game.state().is_playing() && game.completed_pieces() < arg.max_pieces && ticks < MAX_TICKS
    {
        game.update(tick);
        ticks += 1;
    }

    let report = GameReport {
        seed,
        finished: game.state().is_finished(),
        pieces: game.completed_pieces(),
        points: game.score().points(),
        rows: game.score().total_rows(),
        matched_blocks: game.score().total_matched_blocks(),
        level: game.level().level(),
        elapsed_ms: u64::try_from(game.elapsed().as_millis()).unwrap_or(u64::MAX),
    };
    tracing::info!(
        %seed,
        points = report.points,
        pieces = report.pieces,
        finished = report.finished,
        "game simulated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use chromatris_engine::BoardSize;

    use super::*;

    fn arg(max_pieces: usize) -> SimulateArg {
        SimulateArg {
            game: GameArg::default(),
            games: 1,
            max_pieces,
            tick_ms: 50,
            action_rate: 0.3,
        }
    }

    #[test]
    fn test_same_seed_replays_same_game() {
        let config = GameConfig::default();
        let seed = GameSeed::from_bytes([9; 16]);
        let first = run_game(&config, seed, &arg(40)).unwrap();
        let second = run_game(&config, seed, &arg(40)).unwrap();
        assert_eq!(first, second);
        assert!(first.finished || first.pieces == 40);
    }

    #[test]
    fn test_small_board_fills_up() {
        let config = GameConfig {
            board: BoardSize::new(4, 4),
            ..GameConfig::default()
        };
        let report = run_game(&config, GameSeed::from_bytes([1; 16]), &arg(10_000)).unwrap();
        assert!(report.finished);
        assert!(report.pieces < 10_000);
    }
}
