//! Minimax and alpha-beta over an already built tree
//!
//! Neither algorithm expands the tree. Scores are from the Attacker's point
//! of view; maximizing nodes take the largest child score, minimizing nodes
//! the smallest.
//!
//! ## Architecture
//! - Level 2: minimax, alpha_beta
//! - Level 3: ordering pass
//! - Level 4: evaluation counters

use rustc_hash::FxHashMap;
use wargame_core::Evaluator;

use crate::tree::{NodeId, SearchTree};

// ============================================================================
// RESULTS
// ============================================================================

/// Value of a subtree and the child that achieves it (None at a leaf)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchOutcome {
    pub score: f64,
    pub best: Option<NodeId>,
}

/// Leaf evaluations performed, in total and per depth
#[derive(Clone, Debug, Default)]
pub struct EvalStats {
    pub total: u64,
    pub per_depth: FxHashMap<u32, u64>,
}

impl EvalStats {
    pub fn record(&mut self, depth: u32) {
        self.total += 1;
        *self.per_depth.entry(depth).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &EvalStats) {
        self.total += other.total;
        for (&depth, &count) in &other.per_depth {
            *self.per_depth.entry(depth).or_insert(0) += count;
        }
    }

    /// Per-depth counts sorted by depth
    pub fn sorted(&self) -> Vec<(u32, u64)> {
        let mut depths: Vec<_> = self.per_depth.iter().map(|(&d, &c)| (d, c)).collect();
        depths.sort_by_key(|&(d, _)| d);
        depths
    }
}

/// Evaluate a leaf and count it
fn evaluate_leaf(
    tree: &SearchTree,
    node: NodeId,
    eval: &mut dyn Evaluator,
    stats: &mut EvalStats,
) -> f64 {
    let leaf = tree.get(node);
    stats.record(leaf.depth);
    eval.evaluate(&leaf.state)
}

// ============================================================================
// MINIMAX (Level 2)
// ============================================================================

/// Plain minimax. Ties keep the first child reaching the extreme.
pub fn minimax(
    tree: &mut SearchTree,
    node: NodeId,
    eval: &mut dyn Evaluator,
    stats: &mut EvalStats,
) -> SearchOutcome {
    let children = tree.get(node).children.clone();
    if children.is_empty() {
        let score = evaluate_leaf(tree, node, eval, stats);
        tree.get_mut(node).minimax_score = Some(score);
        return SearchOutcome { score, best: None };
    }

    let maximizing = tree.get(node).maximizing;
    let mut best: Option<(f64, NodeId)> = None;
    for child in children {
        let score = minimax(tree, child, eval, stats).score;
        let improves = match best {
            None => true,
            Some((current, _)) if maximizing => score > current,
            Some((current, _)) => score < current,
        };
        if improves {
            best = Some((score, child));
        }
    }

    let (score, best) = match best {
        Some((score, child)) => (score, Some(child)),
        None => (0.0, None),
    };
    tree.get_mut(node).minimax_score = Some(score);
    SearchOutcome { score, best }
}

// ============================================================================
// ALPHA-BETA (Level 2)
// ============================================================================

/// Alpha-beta with a full window from `node`
pub fn alpha_beta(
    tree: &mut SearchTree,
    node: NodeId,
    eval: &mut dyn Evaluator,
    stats: &mut EvalStats,
) -> SearchOutcome {
    alpha_beta_window(tree, node, f64::NEG_INFINITY, f64::INFINITY, eval, stats)
}

/// Fail-hard alpha-beta: a maximizing node returns alpha, a minimizing node
/// returns beta. Remaining children are skipped once `beta <= alpha`.
pub fn alpha_beta_window(
    tree: &mut SearchTree,
    node: NodeId,
    mut alpha: f64,
    mut beta: f64,
    eval: &mut dyn Evaluator,
    stats: &mut EvalStats,
) -> SearchOutcome {
    let children = tree.get(node).children.clone();
    if children.is_empty() {
        let score = evaluate_leaf(tree, node, eval, stats);
        tree.get_mut(node).alpha_beta_score = Some(score);
        return SearchOutcome { score, best: None };
    }

    let maximizing = tree.get(node).maximizing;
    let mut best = None;
    for child in children {
        let value = alpha_beta_window(tree, child, alpha, beta, eval, stats).score;
        if maximizing {
            if value > alpha {
                alpha = value;
                best = Some(child);
            }
        } else if value < beta {
            beta = value;
            best = Some(child);
        }
        if beta <= alpha {
            break;
        }
    }

    let score = if maximizing { alpha } else { beta };
    tree.get_mut(node).alpha_beta_score = Some(score);
    SearchOutcome { score, best }
}

// ============================================================================
// ORDERING PASS (Level 3)
// ============================================================================

/// Move the child with the most promising quick score to the front of each
/// child list, top-down. Only one child moves per node; the rest keep
/// their order.
pub fn order_children(tree: &mut SearchTree, node: NodeId) {
    let maximizing = tree.get(node).maximizing;
    let children = &tree.get(node).children;
    if children.is_empty() {
        return;
    }

    let mut pick = 0;
    for (i, &id) in children.iter().enumerate().skip(1) {
        let score = tree.get(id).quick_score;
        let current = tree.get(children[pick]).quick_score;
        if (maximizing && score > current) || (!maximizing && score < current) {
            pick = i;
        }
    }

    let list = &mut tree.get_mut(node).children;
    let promoted = list.remove(pick);
    list.insert(0, promoted);

    let children = tree.get(node).children.clone();
    for child in children {
        order_children(tree, child);
    }
}
