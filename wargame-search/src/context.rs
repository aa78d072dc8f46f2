//! Per-player search state carried from turn to turn

use std::time::{Duration, Instant};

use wargame_core::{
    Algorithm, Evaluator, GameOptions, GameState, HealthEval, Heuristic, Move, Player,
};

use crate::budget::TimeBudget;
use crate::builder::{build_tree, BuildReport, BuildStatus};
use crate::search::{alpha_beta, minimax, order_children, EvalStats};
use crate::tree::SearchTree;
use crate::SearchError;

/// Everything observed while choosing one move
#[derive(Clone, Debug)]
pub struct Diagnostics {
    pub player: Player,
    pub algorithm: Algorithm,
    pub heuristic: Heuristic,
    pub build: BuildReport,
    /// Nodes in the tree that was searched
    pub tree_size: usize,
    pub branching_factor: f64,
    /// The previous tree was reused rather than rebuilt
    pub reused_tree: bool,
    /// Leaf evaluations this turn
    pub evaluations: EvalStats,
    /// Leaf evaluations since the context was created
    pub cumulative: EvalStats,
    pub time_ratio: f64,
    pub build_time: Duration,
    pub algorithm_time: Duration,
    pub elapsed: Duration,
    /// Cumulative evaluations per second of search time
    pub eval_rate: f64,
}

/// The selected move and its backed-up score
#[derive(Clone, Debug)]
pub struct Decision {
    pub mv: Move,
    pub score: f64,
    pub diagnostics: Diagnostics,
}

/// Owns the persistent tree, the time budget and the evaluators of one
/// computer player. Nothing is shared between contexts.
pub struct SearchContext {
    options: GameOptions,
    tree: Option<SearchTree>,
    budget: TimeBudget,
    leaf_eval: Box<dyn Evaluator>,
    quick_eval: HealthEval,
    cumulative: EvalStats,
    search_time: Duration,
}

impl SearchContext {
    /// Leaf heuristic taken from the options' algorithm choice
    pub fn new(options: GameOptions) -> Self {
        let leaf_eval = options.leaf_heuristic().evaluator(options.seed);
        Self::with_evaluator(options, leaf_eval)
    }

    pub fn with_evaluator(options: GameOptions, leaf_eval: Box<dyn Evaluator>) -> Self {
        Self {
            options,
            tree: None,
            budget: TimeBudget::new(),
            leaf_eval,
            quick_eval: HealthEval,
            cumulative: EvalStats::default(),
            search_time: Duration::ZERO,
        }
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn tree(&self) -> Option<&SearchTree> {
        self.tree.as_ref()
    }

    pub fn time_ratio(&self) -> f64 {
        self.budget.ratio()
    }

    /// Leaf evaluations since creation
    pub fn cumulative(&self) -> &EvalStats {
        &self.cumulative
    }

    /// Drop the tree and statistics, e.g. before a new game
    pub fn reset(&mut self) {
        self.tree = None;
        self.budget = TimeBudget::new();
        self.cumulative = EvalStats::default();
        self.search_time = Duration::ZERO;
    }

    /// Build the tree under the time budget, search it with the configured
    /// algorithm and commit the chosen child as the new root.
    pub fn choose_move(&mut self, state: &GameState) -> Result<Decision, SearchError> {
        if let Some(winner) = state.winner() {
            return Err(SearchError::GameOver(winner));
        }
        let player = state.next_player();
        let start = Instant::now();
        let time_ratio = self.budget.update(&self.options, state.turns_played());

        let reused_tree = match &mut self.tree {
            Some(tree) => tree.sync(state),
            None => false,
        };
        let tree = self
            .tree
            .get_or_insert_with(|| SearchTree::new(state.clone()));

        let deadline = self.budget.deadline(start, self.options.max_time);
        let build = build_tree(tree, self.options.max_depth, deadline, &mut self.quick_eval);
        let build_time = start.elapsed();
        if build.status == BuildStatus::DeadlineReached {
            tracing::debug!(
                depth = tree.max_depth(),
                nodes = tree.len(),
                "Construction stopped at deadline"
            );
        }

        let root = tree.root();
        if tree.get(root).is_leaf() {
            return Err(SearchError::NoLegalMove(player));
        }

        let algorithm_start = Instant::now();
        let mut evaluations = EvalStats::default();
        let outcome = match self.options.algorithm {
            Algorithm::Minimax => minimax(tree, root, self.leaf_eval.as_mut(), &mut evaluations),
            Algorithm::AlphaBeta => {
                order_children(tree, root);
                alpha_beta(tree, root, self.leaf_eval.as_mut(), &mut evaluations)
            }
        };
        let algorithm_time = algorithm_start.elapsed();

        let chosen = outcome
            .best
            .or_else(|| tree.get(root).children.first().copied())
            .ok_or(SearchError::NoLegalMove(player))?;
        let mv = tree
            .get(chosen)
            .incoming_move
            .ok_or(SearchError::NoLegalMove(player))?;

        let tree_size = tree.len();
        let branching_factor = tree.branching_factor();
        tree.advance_to(chosen);

        let elapsed = start.elapsed();
        self.budget.record(algorithm_time, elapsed);
        self.cumulative.merge(&evaluations);
        self.search_time += elapsed;
        let eval_rate = match self.search_time.as_secs_f64() {
            secs if secs > 0.0 => self.cumulative.total as f64 / secs,
            _ => 0.0,
        };

        tracing::debug!(depths = ?build.sorted_depths(), "Tree built");
        tracing::info!(
            %player,
            %mv,
            score = outcome.score,
            evals = evaluations.total,
            tree_size,
            branching_factor,
            ratio = time_ratio,
            elapsed_ms = elapsed.as_millis() as u64,
            "Move chosen"
        );
        if elapsed.as_secs_f64() > self.options.max_time {
            tracing::warn!(
                %player,
                elapsed_s = elapsed.as_secs_f64(),
                max_time = self.options.max_time,
                "Search exceeded time limit"
            );
        }

        Ok(Decision {
            mv,
            score: outcome.score,
            diagnostics: Diagnostics {
                player,
                algorithm: self.options.algorithm,
                heuristic: self.leaf_eval.heuristic(),
                build,
                tree_size,
                branching_factor,
                reused_tree,
                evaluations,
                cumulative: self.cumulative.clone(),
                time_ratio,
                build_time,
                algorithm_time,
                elapsed,
                eval_rate,
            },
        })
    }
}
