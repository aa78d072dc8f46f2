//! WARGAME Search - Time-budgeted game-tree search
//!
//! This crate provides the computer player:
//! - Persistent arena search tree, compacted as moves are committed
//! - Deadline-bounded breadth-first construction
//! - Minimax and alpha-beta (with a single-promotion ordering pass)
//! - Adaptive time budget
//! - A game runner driving computer, random and remote controllers

pub mod budget;
pub mod builder;
pub mod context;
pub mod runner;
pub mod search;
pub mod tree;

use thiserror::Error;
use wargame_core::Player;

pub use budget::TimeBudget;
pub use builder::{build_tree, candidate_moves, BuildReport, BuildStatus, DepthCount};
pub use context::{Decision, Diagnostics, SearchContext};
pub use runner::{
    Controller, Forfeit, ForfeitReason, GameOutcome, GameRunner, RunnerConfig, RunnerError,
    TurnRecord,
};
pub use search::{alpha_beta, minimax, order_children, EvalStats, SearchOutcome};
pub use tree::{NodeId, SearchTree, TreeNode};

/// Why no move could be chosen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The side to move has nothing legal to play and loses
    #[error("{0} has no legal move")]
    NoLegalMove(Player),
    #[error("game is over, {0} won")]
    GameOver(Player),
}
