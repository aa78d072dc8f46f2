//! WARGAME CLI - Command-line interface
//!
//! Commands:
//! - play: Run a game between the configured controllers
//! - suggest: Search once from the opening position and explain the pick

mod play_cmd;
mod render;
mod suggest_cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wargame_core::{Algorithm, GameOptions, Heuristic};

#[derive(Parser)]
#[command(name = "wargame")]
#[command(about = "Attacker versus Defender on a square grid, with a time-budgeted search AI")]
struct Cli {
    /// Game options JSON file (flags override its values)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play(play_cmd::PlayArgs),
    /// Suggest an opening move and show search diagnostics
    Suggest(suggest_cmd::SuggestArgs),
}

/// Search and rule overrides shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct OptionArgs {
    /// Board dimension
    #[arg(long)]
    pub dim: Option<usize>,

    /// Maximum search depth (root counts as 1)
    #[arg(long)]
    pub depth: Option<u32>,

    /// Seconds per computer move
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f64>,

    /// Turn limit; the Defender wins when it is reached
    #[arg(long)]
    pub turns: Option<u32>,

    /// minimax or alpha_beta
    #[arg(long)]
    pub algorithm: Option<Algorithm>,

    /// Leaf heuristic for the selected algorithm (e0, e1, e2)
    #[arg(long)]
    pub heuristic: Option<Heuristic>,
}

impl OptionArgs {
    pub fn apply(&self, options: &mut GameOptions) {
        if let Some(dim) = self.dim {
            options.dim = dim;
        }
        if let Some(depth) = self.depth {
            options.max_depth = depth;
        }
        if let Some(time) = self.time {
            options.max_time = time;
        }
        if let Some(turns) = self.turns {
            options.max_turns = turns;
        }
        if let Some(algorithm) = self.algorithm {
            options.algorithm = algorithm;
        }
        if let Some(heuristic) = self.heuristic {
            match options.algorithm {
                Algorithm::Minimax => options.minimax_heuristic = heuristic,
                Algorithm::AlphaBeta => options.alpha_beta_heuristic = heuristic,
            }
        }
    }
}

/// Options from the config file (or defaults), then flags, then validation
pub fn resolve_options(
    config: Option<&PathBuf>,
    overrides: &OptionArgs,
    seed: Option<u64>,
) -> Result<GameOptions> {
    let mut options = match config {
        Some(path) => GameOptions::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GameOptions::default(),
    };
    overrides.apply(&mut options);
    if seed.is_some() {
        options.seed = seed;
    }
    options.validate().context("Invalid game options")?;
    Ok(options)
}

fn main() -> Result<()> {
    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => {
            let options = resolve_options(cli.config.as_ref(), &args.options, cli.seed)?;
            play_cmd::run(args, options)
        }
        Commands::Suggest(args) => {
            let options = resolve_options(cli.config.as_ref(), &args.options, cli.seed)?;
            suggest_cmd::run(args, options)
        }
    }
}
