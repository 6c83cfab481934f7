//! Tree vertices and the handles used to address them inside a [`super::Tree`].

use smallvec::SmallVec;

/// Per-player score vector used by maxn.
pub type Scores = SmallVec<[f64; 4]>;

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Location of a node within the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Node has no parent. Exactly one per tree.
    Root,
    /// Node has a parent and may have children.
    Inner,
    /// Terminal game state. Never expanded.
    Leaf,
}

/// Rule used to turn the values of a node's children into the node's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAim {
    None,
    /// Player to move picks the maximum child value.
    Max,
    /// Player to move picks the minimum child value.
    Min,
    /// Reserved for chance nodes with equally likely children.
    Mean,
    /// Reserved for chance nodes with weighted children.
    Prob,
}

impl Default for NodeAim {
    fn default() -> Self {
        NodeAim::None
    }
}

impl NodeAim {
    /// `1.0` for [`NodeAim::Max`], `-1.0` for [`NodeAim::Min`], `0.0` otherwise.
    pub fn sign(self) -> f64 {
        match self {
            NodeAim::Max => 1.0,
            NodeAim::Min => -1.0,
            _ => 0.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            NodeAim::Max => NodeAim::Min,
            NodeAim::Min => NodeAim::Max,
            other => other,
        }
    }
}

/// A vertex of the game tree.
///
/// The public fields are the ones a [`super::Game`] implementation fills in when it creates a
/// node. Everything else is search bookkeeping owned by the tree and exposed read-only.
#[derive(Debug)]
pub struct Node<S, M, D> {
    pub kind: NodeKind,
    /// Snapshot of the game at this node. Never mutated by the search.
    pub state: S,
    /// Move that produced this node from its parent. A placeholder on the root.
    pub game_move: M,
    /// Extra evaluation context handed from parent to child by the game.
    pub data: D,
    pub aim: NodeAim,
    /// Static value of `state`, if the game assigned one when creating the node.
    pub value: Option<f64>,
    /// Player to move at this node (maxn).
    pub active_player: usize,
    /// Static per-player scores of `state` (maxn).
    pub scores: Scores,

    pub(crate) moves: Option<Vec<M>>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) move_index: usize,
    pub(crate) move_slot: usize,
    pub(crate) retained_slot: Option<usize>,
    pub(crate) inherited_value: f64,
    pub(crate) inherited_depth: Option<usize>,
    pub(crate) inherited_scores: Scores,
    pub(crate) path_length: usize,
    pub(crate) best_child: Option<NodeId>,
    pub(crate) pruned: bool,
    pub(crate) descendant_count: usize,
}

impl<S, M, D> Node<S, M, D> {
    pub fn new(kind: NodeKind, state: S, game_move: M, data: D) -> Self {
        Self {
            kind,
            state,
            game_move,
            data,
            aim: NodeAim::None,
            value: None,
            active_player: 0,
            scores: Scores::new(),
            moves: None,
            parent: None,
            children: Vec::new(),
            move_index: 0,
            move_slot: 0,
            retained_slot: None,
            inherited_value: f64::NAN,
            inherited_depth: None,
            inherited_scores: Scores::new(),
            path_length: 1,
            best_child: None,
            pruned: false,
            descendant_count: 0,
        }
    }

    /// Creates a root node with the aim of the player to move.
    pub fn root(state: S, game_move: M, data: D, aim: NodeAim) -> Self {
        Self::new(NodeKind::Root, state, game_move, data).with_aim(aim)
    }

    pub fn with_aim(mut self, aim: NodeAim) -> Self {
        self.aim = aim;
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Pre-populates the legal moves so the tree never asks the game for them.
    pub fn with_moves(mut self, moves: Vec<M>) -> Self {
        self.moves = Some(moves);
        self
    }

    pub fn with_active_player(mut self, player: usize) -> Self {
        self.active_player = player;
        self
    }

    pub fn with_scores(mut self, scores: Scores) -> Self {
        self.scores = scores;
        self
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    /// Cached legal moves, empty until generated.
    pub fn moves(&self) -> &[M] {
        self.moves.as_deref().unwrap_or(&[])
    }

    pub fn has_moves(&self) -> bool {
        self.moves.is_some()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn best_child(&self) -> Option<NodeId> {
        self.best_child
    }

    /// Value this node passes to its parent, meaningful only when
    /// [`Node::inherited_depth`] matches the search that produced it.
    pub fn inherited_value(&self) -> f64 {
        self.inherited_value
    }

    pub fn inherited_depth(&self) -> Option<usize> {
        self.inherited_depth
    }

    pub fn inherited_scores(&self) -> &[f64] {
        &self.inherited_scores
    }

    /// Moves from this node to the leaf or horizon at the end of its best line.
    pub fn path_length(&self) -> usize {
        self.path_length
    }

    /// `true` if an alpha-beta cutoff stopped the search of this node's children.
    pub fn is_pruned(&self) -> bool {
        self.pruned
    }

    pub fn descendant_count(&self) -> usize {
        self.descendant_count
    }

    /// Number of cached moves that have been turned into children.
    pub fn move_index(&self) -> usize {
        self.move_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_unevaluated() {
        let node = Node::new(NodeKind::Inner, 3u8, 1u8, ());
        assert!(node.inherited_value().is_nan());
        assert_eq!(node.inherited_depth(), None);
        assert_eq!(node.path_length(), 1);
        assert!(!node.has_moves());
        assert!(node.moves().is_empty());
        assert_eq!(node.aim, NodeAim::None);
    }

    #[test]
    fn test_builders() {
        let node = Node::root(0u8, 0u8, (), NodeAim::Min)
            .with_value(2.5)
            .with_moves(vec![1, 2])
            .with_active_player(1);
        assert_eq!(node.kind, NodeKind::Root);
        assert_eq!(node.aim, NodeAim::Min);
        assert_eq!(node.value, Some(2.5));
        assert_eq!(node.moves(), &[1, 2]);
        assert_eq!(node.active_player, 1);
    }

    #[test]
    fn test_aim_sign_and_opposite() {
        assert_eq!(NodeAim::Max.sign(), 1.0);
        assert_eq!(NodeAim::Min.sign(), -1.0);
        assert_eq!(NodeAim::None.sign(), 0.0);
        assert_eq!(NodeAim::Max.opposite(), NodeAim::Min);
        assert_eq!(NodeAim::Mean.opposite(), NodeAim::Mean);
    }
}
