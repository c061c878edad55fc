use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::Context as _;
use chromatris_engine::{BoardSize, GameConfig, GameSeed, ThemeName};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::prelude::*;

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase verbosity (-v = INFO, -vv = DEBUG, -vvv = TRACE)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Game config file (JSON); flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run headless games with random input and print a JSON report
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Flags shared by every mode that builds a game.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GameArg {
    /// Seed as 32 hex digits
    #[arg(long)]
    seed: Option<GameSeed>,
    /// Board width in cells
    #[arg(long)]
    width: Option<u16>,
    /// Board height in cells
    #[arg(long)]
    height: Option<u16>,
    /// Level to start at
    #[arg(long)]
    level: Option<usize>,
    /// Color palette
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ThemeArg {
    Classic,
    Pastel,
    HighContrast,
}

impl From<ThemeArg> for ThemeName {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Classic => Self::Classic,
            ThemeArg::Pastel => Self::Pastel,
            ThemeArg::HighContrast => Self::HighContrast,
        }
    }
}

impl GameArg {
    /// Overlays the flags that were given onto `config`.
    fn apply(&self, config: &mut GameConfig) {
        let BoardSize { width, height } = config.board;
        config.board = BoardSize::new(self.width.unwrap_or(width), self.height.unwrap_or(height));
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(level) = self.level {
            config.level.start_level = level;
        }
        if let Some(theme) = self.theme {
            config.theme = theme.into();
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let mode = args.mode.unwrap_or(Mode::Play(PlayArg::default()));

    // The terminal belongs to the UI while playing.
    let log_to_stderr = !matches!(mode, Mode::Play(_));
    init_logging(args.verbose, args.log_file.as_deref(), log_to_stderr)?;

    let mut config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => GameConfig::default(),
    };
    match &mode {
        Mode::Play(arg) => arg.game.apply(&mut config),
        Mode::Simulate(arg) => arg.game.apply(&mut config),
    }
    config.validate().context("invalid game config")?;

    match mode {
        Mode::Play(arg) => play::run(&arg, &config)?,
        Mode::Simulate(arg) => simulate::run(&arg, &config)?,
    }
    Ok(())
}

fn init_logging(verbose: u8, log_file: Option<&Path>, log_to_stderr: bool) -> anyhow::Result<()> {
    let level = match verbose.saturating_add(2) {
        0 | 1 => Level::ERROR,
        2 => Level::WARN,
        3 => Level::INFO,
        4 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    let stderr_layer = (log_file.is_none() && log_to_stderr).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
    tracing::debug!(%level, "logging initialized");
    Ok(())
}

fn read_config_file(path: &Path) -> anyhow::Result<GameConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to open config file: {}", path.display()))?;
    let config = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
