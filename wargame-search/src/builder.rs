//! Deadline-bounded breadth-first tree construction
//!
//! Frontier nodes are expanded level by level from the root. The deadline is
//! consulted before each node; once it passes, expansion stops and whatever
//! has been built is searched as-is.

use std::collections::VecDeque;
use std::time::Instant;

use rustc_hash::FxHashMap;
use wargame_core::{Evaluator, GameState, Move};

use crate::tree::{NodeId, SearchTree};

/// Engaged units below this health may consider self-destructing
pub const DESPERATE_HEALTH: u8 = 3;

/// How tree construction ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every node above the depth limit was expanded
    Complete,
    /// The deadline cut expansion short
    DeadlineReached,
}

/// Nodes present at one depth
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthCount {
    pub nodes: usize,
    /// The whole depth was generated before the deadline
    pub complete: bool,
}

/// Outcome of one construction pass
#[derive(Clone, Debug)]
pub struct BuildReport {
    pub status: BuildStatus,
    pub depth_counts: FxHashMap<u32, DepthCount>,
    /// Nodes created during this pass
    pub created: usize,
    /// Nodes expanded during this pass
    pub expanded: usize,
}

impl BuildReport {
    /// Per-depth counts sorted by depth
    pub fn sorted_depths(&self) -> Vec<(u32, DepthCount)> {
        let mut depths: Vec<_> = self.depth_counts.iter().map(|(&d, &c)| (d, c)).collect();
        depths.sort_by_key(|&(d, _)| d);
        depths
    }
}

// ============================================================================
// CANDIDATE MOVES
// ============================================================================

/// Moves considered when expanding a node: every non-rejected orthogonal
/// move, plus self-destruct for engaged heavy units that are badly hurt or
/// touching more than one enemy.
pub fn candidate_moves(state: &GameState) -> Vec<Move> {
    let mut moves = Vec::new();
    for (src, unit) in state.player_units(state.next_player()) {
        for dst in src.adjacent() {
            let mv = Move::new(src, dst);
            if state.classify(mv).is_legal() {
                moves.push(mv);
            }
        }
        // Pinned by an adjacent enemy, even when every neighbour is occupied
        let engaged = unit.unit_type.is_heavy() && state.is_engaged(src);
        if engaged && (unit.health < DESPERATE_HEALTH || state.adjacent_enemies(src) > 1) {
            moves.push(Move::self_destruct(src));
        }
    }
    moves
}

// ============================================================================
// BUILDER
// ============================================================================

/// Expand the tree below its root until every node shallower than
/// `max_depth` has children or `deadline` passes. The root is expanded
/// regardless of the deadline; if the candidate rules give it nothing the
/// full legal move list is used, so a childless root means no legal move.
///
/// `scorer` provides the quick score stored on each new node.
pub fn build_tree(
    tree: &mut SearchTree,
    max_depth: u32,
    deadline: Instant,
    scorer: &mut dyn Evaluator,
) -> BuildReport {
    let mut report = BuildReport {
        status: BuildStatus::Complete,
        depth_counts: FxHashMap::default(),
        created: 0,
        expanded: 0,
    };
    report.depth_counts.insert(
        1,
        DepthCount {
            nodes: 1,
            complete: true,
        },
    );

    let mut queue = VecDeque::from([tree.root()]);
    let mut level = 1;

    while let Some(id) = queue.pop_front() {
        let depth = tree.get(id).depth;
        if depth > level {
            // Every node of the previous level has been visited
            report.depth_counts.entry(depth).or_default().complete = true;
            level = depth;
        }

        if id != tree.root() && Instant::now() >= deadline {
            report.status = BuildStatus::DeadlineReached;
            break;
        }

        if tree.get(id).is_leaf() && !tree.get(id).state.is_finished() {
            let created = expand(tree, id, scorer);
            report.created += created;
            if created > 0 {
                report.expanded += 1;
            }
        }

        let children = &tree.get(id).children;
        report.depth_counts.entry(depth + 1).or_default().nodes += children.len();
        if depth + 1 < max_depth {
            queue.extend(children.iter().copied());
        }
    }

    if report.status == BuildStatus::Complete {
        for count in report.depth_counts.values_mut() {
            count.complete = true;
        }
    }
    report.depth_counts.retain(|_, c| c.nodes > 0);
    report
}

/// Attach every candidate successor of `id`, returning how many were added
fn expand(tree: &mut SearchTree, id: NodeId, scorer: &mut dyn Evaluator) -> usize {
    let state = tree.get(id).state.clone();
    let mut moves = candidate_moves(&state);
    if moves.is_empty() && id == tree.root() {
        moves = state.legal_moves();
    }

    let mut created = 0;
    for mv in moves {
        // Candidates come from classify, so this only skips inconsistencies
        let Ok(next) = state.apply_move(mv) else {
            continue;
        };
        let quick_score = scorer.evaluate(&next);
        tree.add_child(id, next, mv, quick_score);
        created += 1;
    }
    created
}
