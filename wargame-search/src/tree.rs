//! Persistent search tree
//!
//! Uses arena allocation: nodes live in a `Vec` and refer to each other by
//! index. The tree survives between turns; committing a move compacts the
//! arena down to the chosen subtree.
//!
//! ## Architecture
//! - Level 2: Tree operations (add_child, advance_to, sync)
//! - Level 3: Node accessors
//! - Level 4: Statistics (branching factor)

use rustc_hash::FxHashMap;
use wargame_core::{GameState, Move, Player};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A node in the search tree
#[derive(Clone, Debug)]
pub struct TreeNode {
    pub id: NodeId,
    /// Game state at this node
    pub state: GameState,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led to this node (None for root)
    pub incoming_move: Option<Move>,
    /// Root is depth 1
    pub depth: u32,
    pub maximizing: bool,
    pub children: Vec<NodeId>,
    /// Cheap heuristic used by the ordering pass
    pub quick_score: f64,
    pub minimax_score: Option<f64>,
    pub alpha_beta_score: Option<f64>,
}

impl TreeNode {
    fn new(
        id: NodeId,
        state: GameState,
        parent: Option<NodeId>,
        incoming_move: Option<Move>,
        depth: u32,
        maximizing: bool,
    ) -> Self {
        Self {
            id,
            state,
            parent,
            incoming_move,
            depth,
            maximizing,
            children: Vec::new(),
            quick_score: 0.0,
            minimax_score: None,
            alpha_beta_score: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

// ============================================================================
// SEARCH TREE (Level 2 - Tree Operations)
// ============================================================================

/// Search tree with arena allocation. The root is always `NodeId::ROOT`.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
}

impl SearchTree {
    /// Create a tree holding only `root_state`. The root maximizes when the
    /// Attacker is to move.
    pub fn new(root_state: GameState) -> Self {
        let maximizing = root_state.next_player() == Player::Attacker;
        let root = TreeNode::new(NodeId::ROOT, root_state, None, None, 1, maximizing);
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Attach a successor one level below `parent`
    pub fn add_child(
        &mut self,
        parent: NodeId,
        state: GameState,
        mv: Move,
        quick_score: f64,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let (depth, maximizing) = {
            let p = self.get(parent);
            (p.depth + 1, !p.maximizing)
        };
        let mut child = TreeNode::new(id, state, Some(parent), Some(mv), depth, maximizing);
        child.quick_score = quick_score;
        self.nodes.push(child);
        self.get_mut(parent).children.push(id);
        id
    }

    /// Root child whose state equals `state`
    pub fn child_with_state(&self, parent: NodeId, state: &GameState) -> Option<NodeId> {
        self.get(parent)
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).state == *state)
    }

    /// Make `state` the root. Reuses the matching subtree when `state` is
    /// the root itself or one of its children, otherwise starts over.
    /// Returns true when existing nodes were kept.
    pub fn sync(&mut self, state: &GameState) -> bool {
        if self.get(self.root()).state == *state {
            return true;
        }
        match self.child_with_state(self.root(), state) {
            Some(child) => {
                self.advance_to(child);
                true
            }
            None => {
                *self = SearchTree::new(state.clone());
                false
            }
        }
    }

    /// Promote `new_root` to root, discarding every node outside its
    /// subtree. Ids are reassigned in breadth-first order and depths are
    /// re-based so the new root sits at depth 1. Maximizing flags are kept.
    pub fn advance_to(&mut self, new_root: NodeId) {
        if new_root == self.root() {
            return;
        }

        // Breadth-first order of the surviving subtree
        let mut order = vec![new_root];
        let mut i = 0;
        while i < order.len() {
            order.extend(self.get(order[i]).children.iter().copied());
            i += 1;
        }

        let remap: FxHashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, NodeId(new)))
            .collect();
        let shift = self.get(new_root).depth - 1;

        let mut old_nodes: Vec<Option<TreeNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            let Some(mut node) = old_nodes[old.0].take() else {
                continue;
            };
            node.id = remap[&old];
            node.depth -= shift;
            node.parent = if old == new_root {
                None
            } else {
                node.parent.and_then(|p| remap.get(&p).copied())
            };
            for child in node.children.iter_mut() {
                *child = remap[&*child];
            }
            nodes.push(node);
        }
        self.nodes = nodes;
    }

    // ========================================================================
    // Level 4: Statistics
    // ========================================================================

    /// Nodes that have at least one child
    pub fn expanded_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.is_leaf()).count()
    }

    /// Average number of children per expanded node
    pub fn branching_factor(&self) -> f64 {
        let parents = self.expanded_count();
        if parents == 0 {
            0.0
        } else {
            (self.nodes.len() - 1) as f64 / parents as f64
        }
    }

    /// Deepest depth present in the tree
    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(1)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wargame_core::Rules;

    fn simple_tree() -> SearchTree {
        let state = GameState::new(Rules::default());
        let mut tree = SearchTree::new(state.clone());
        for mv in state.legal_moves().into_iter().take(3) {
            let next = state.apply_move(mv).unwrap();
            tree.add_child(NodeId::ROOT, next, mv, 0.0);
        }
        tree
    }

    fn expand_all(tree: &mut SearchTree, id: NodeId) {
        let state = tree.get(id).state.clone();
        for mv in state.legal_moves() {
            let next = state.apply_move(mv).unwrap();
            tree.add_child(id, next, mv, 0.0);
        }
    }

    #[test]
    fn test_tree_creation() {
        let tree = SearchTree::new(GameState::new(Rules::default()));
        let root = tree.get(tree.root());

        assert_eq!(tree.len(), 1);
        assert_eq!(root.depth, 1);
        assert!(root.maximizing);
        assert!(root.parent.is_none());
        assert!(root.incoming_move.is_none());
        assert_eq!(tree.branching_factor(), 0.0);
    }

    #[test]
    fn test_defender_root_minimizes() {
        let state = GameState::new(Rules::default()).with_next_player(Player::Defender);
        let tree = SearchTree::new(state);
        assert!(!tree.get(tree.root()).maximizing);
    }

    #[test]
    fn test_child_invariants() {
        let tree = simple_tree();
        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 3);
        for &id in &root.children {
            let child = tree.get(id);
            assert_eq!(child.id, id);
            assert_eq!(child.depth, root.depth + 1);
            assert_eq!(child.maximizing, !root.maximizing);
            assert_eq!(child.parent, Some(tree.root()));
            assert!(child.incoming_move.is_some());
        }
        assert_eq!(tree.branching_factor(), 3.0);
    }

    #[test]
    fn test_advance_compacts_and_rebases() {
        let mut tree = simple_tree();
        let chosen = tree.get(tree.root()).children[1];
        expand_all(&mut tree, chosen);
        let other = tree.get(tree.root()).children[0];
        expand_all(&mut tree, other);

        let chosen_state = tree.get(chosen).state.clone();
        let grandchildren = tree.get(chosen).children.len();
        assert!(grandchildren > 0);

        tree.advance_to(chosen);

        assert_eq!(tree.len(), 1 + grandchildren);
        let root = tree.get(tree.root());
        assert_eq!(root.state, chosen_state);
        assert_eq!(root.depth, 1);
        assert!(root.parent.is_none());
        // Defender to move in the chosen state, flag carried over
        assert!(!root.maximizing);
        for node in tree.nodes().skip(1) {
            assert_eq!(node.depth, 2);
            assert_eq!(node.parent, Some(NodeId::ROOT));
            assert!(node.maximizing);
        }
        for (i, node) in tree.nodes().enumerate() {
            assert_eq!(node.id, NodeId(i));
        }
    }

    #[test]
    fn test_sync_reuses_matching_child() {
        let mut tree = simple_tree();
        let target = tree.get(tree.root()).children[2];
        let state = tree.get(target).state.clone();

        assert!(tree.sync(&state));
        assert_eq!(tree.get(tree.root()).state, state);

        // Already the root
        assert!(tree.sync(&state));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_sync_restarts_on_unknown_state() {
        let mut tree = simple_tree();
        let unrelated = GameState::new(Rules::default()).with_turns_played(7);

        assert!(!tree.sync(&unrelated));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(tree.root()).state, unrelated);
    }
}
