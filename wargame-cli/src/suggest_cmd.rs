//! Suggest command - one search from the opening position

use anyhow::Result;
use clap::Args;

use wargame_core::{GameOptions, GameState, Move};
use wargame_search::SearchContext;

use crate::render;
use crate::OptionArgs;

#[derive(Args)]
pub struct SuggestArgs {
    #[command(flatten)]
    pub options: OptionArgs,

    /// Search for the Defender's reply to an opening move instead, e.g. "C4 B4"
    #[arg(long, value_name = "MOVE")]
    pub after: Option<String>,

    /// Output diagnostics as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SuggestArgs, options: GameOptions) -> Result<()> {
    let mut state = GameState::new(options.rules());
    if let Some(opening) = &args.after {
        let mv: Move = opening.parse()?;
        state = state.apply_move(mv)?;
    }

    let mut ctx = SearchContext::new(options);
    let decision = ctx.choose_move(&state)?;

    if args.json {
        println!("{}", render::diagnostics_json(&decision)?);
    } else {
        println!("{}", render::board(&state));
        println!();
        if let Some(opening) = &args.after {
            println!("Replying to {opening}");
        }
        println!("{}", render::diagnostics_text(&decision));
    }
    Ok(())
}
