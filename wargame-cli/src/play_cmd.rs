//! Play command - run one game between two controllers
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_controllers(), report_outcome()
//! - Level 3: outside_controller(), write_record()
//! - Level 4: formatting (render.rs)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use wargame_core::{GameOptions, GameState, GameType, MovePayload, Player, ScriptedSource};
use wargame_search::{Controller, GameOutcome, GameRunner, RunnerConfig};

use crate::render;
use crate::OptionArgs;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    /// manual, attacker, defender or auto (which sides come from outside)
    #[arg(long)]
    pub game_type: Option<GameType>,

    /// Move script (JSON payload array) for an outside Attacker
    #[arg(long, value_name = "FILE")]
    pub attacker_moves: Option<PathBuf>,

    /// Move script (JSON payload array) for an outside Defender
    #[arg(long, value_name = "FILE")]
    pub defender_moves: Option<PathBuf>,

    /// Outside sides without a script play random legal moves
    #[arg(long)]
    pub random_opponent: bool,

    /// Write every played move as a replayable JSON script
    #[arg(long, value_name = "FILE")]
    pub record: Option<PathBuf>,

    /// Let a computer side keep playing after a move over the time limit
    #[arg(long)]
    pub allow_overrun: bool,

    /// Milliseconds between polls of a move script
    #[arg(long, default_value = "100")]
    pub poll_ms: u64,

    /// Do not print the board after each move
    #[arg(long)]
    pub quiet: bool,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build a controller per side from the game type
/// 2. Play the game, printing each position
/// 3. Report (and optionally record) the outcome
pub fn run(args: PlayArgs, mut options: GameOptions) -> Result<()> {
    if let Some(game_type) = args.game_type {
        options.game_type = game_type;
    }
    let (attacker, defender) = build_controllers(&args, &options)?;

    tracing::info!(
        game_type = ?options.game_type,
        algorithm = ?options.algorithm,
        depth = options.max_depth,
        max_time = options.max_time,
        "Starting game"
    );

    let mut runner = GameRunner::new(options.clone(), attacker, defender).with_config(
        RunnerConfig {
            poll_interval: std::time::Duration::from_millis(args.poll_ms),
            forfeit_on_overrun: !args.allow_overrun,
            ..RunnerConfig::default()
        },
    );
    if !args.quiet && !args.json {
        println!("{}", render::board(&GameState::new(options.rules())));
        runner = runner.on_turn(|record, state| {
            println!("{}", render::turn_line(record));
            println!("{}", render::board(state));
        });
    }

    let outcome = runner.play_game()?;

    if let Some(path) = &args.record {
        write_record(path, &outcome)?;
    }
    report_outcome(&outcome, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Computer sides search; outside sides replay a script or play randomly
fn build_controllers(args: &PlayArgs, options: &GameOptions) -> Result<(Controller, Controller)> {
    let (attacker_outside, defender_outside) = match options.game_type {
        GameType::Manual => (true, true),
        GameType::Attacker => (true, false),
        GameType::Defender => (false, true),
        GameType::Auto => (false, false),
    };

    let attacker = if attacker_outside {
        outside_controller(Player::Attacker, args.attacker_moves.as_deref(), args, options)?
    } else {
        Controller::computer(options)
    };
    let defender = if defender_outside {
        outside_controller(Player::Defender, args.defender_moves.as_deref(), args, options)?
    } else {
        Controller::computer(options)
    };
    Ok((attacker, defender))
}

/// Print the result
fn report_outcome(outcome: &GameOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", render::outcome_json(outcome)?);
    } else {
        println!("{}", render::outcome_text(outcome));
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn outside_controller(
    player: Player,
    script: Option<&Path>,
    args: &PlayArgs,
    options: &GameOptions,
) -> Result<Controller> {
    match script {
        Some(path) => {
            let source = ScriptedSource::load(path)?;
            tracing::info!(%player, moves = source.remaining(), "Loaded move script");
            Ok(Controller::remote(source))
        }
        None if args.random_opponent => {
            let seed = options.seed.unwrap_or_else(rand::random::<u64>);
            // Distinct streams when both sides are random
            let offset = match player {
                Player::Attacker => 0,
                Player::Defender => 1,
            };
            Ok(Controller::random(seed.wrapping_add(offset)))
        }
        None => bail!(
            "{} is played from outside: pass --{}-moves FILE or --random-opponent",
            player,
            player.name().to_ascii_lowercase()
        ),
    }
}

/// Save all moves as payloads that `--attacker-moves`/`--defender-moves`
/// can replay
fn write_record(path: &Path, outcome: &GameOutcome) -> Result<()> {
    let payloads: Vec<MovePayload> = outcome
        .history
        .iter()
        .map(|record| MovePayload::new(record.mv, record.turn))
        .collect();
    let json = serde_json::to_string_pretty(&payloads)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write game record: {}", path.display()))?;
    tracing::info!(path = %path.display(), moves = payloads.len(), "Game recorded");
    Ok(())
}
