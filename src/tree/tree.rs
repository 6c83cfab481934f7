use std::convert::TryFrom;

use log::{debug, trace};

use super::node::{NodeId, NodeKind};
use super::sorting::{self, Ranked, SortMethod, SortOrder};
use super::traits::{Game, GameNode};
use crate::error::SearchError;

/// Arena-backed game tree.
///
/// Nodes are addressed by [`NodeId`]. Slots freed by [`Tree::remove_non_best_nodes`] are reused
/// for later children, so an id is only meaningful while its node is alive.
pub struct Tree<G: Game> {
    pub(crate) game: G,
    nodes: Vec<Option<GameNode<G>>>,
    free: Vec<NodeId>,
    root: NodeId,
    active_root: NodeId,
    node_count: usize,
    leaf_count: usize,
}

impl<G: Game> Tree<G> {
    pub fn new(game: G, mut root: GameNode<G>) -> Self {
        root.kind = NodeKind::Root;
        root.parent = None;
        Self {
            game,
            nodes: vec![Some(root)],
            free: Vec::new(),
            root: NodeId(0),
            active_root: NodeId(0),
            node_count: 0,
            leaf_count: 0,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node that searches start from.
    pub fn active_root(&self) -> NodeId {
        self.active_root
    }

    /// Moves the search origin to `id`, which must be a live node of this tree.
    pub fn set_active_root(&mut self, id: NodeId) {
        debug_assert!(self.get(id).is_some());
        self.active_root = id;
    }

    /// Number of nodes created below the root and still alive.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of live nodes classified as leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of live nodes, the root included.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.node_count + 1
    }

    /// Number of arena slots ever allocated, live or free.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&GameNode<G>> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// # Panics
    ///
    /// If `id` refers to a removed node.
    pub fn node(&self, id: NodeId) -> &GameNode<G> {
        match self.nodes[id.index()] {
            Some(ref node) => node,
            None => panic!("{:?} refers to a removed node", id),
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut GameNode<G> {
        match self.nodes[id.index()] {
            Some(ref mut node) => node,
            None => panic!("{:?} refers to a removed node", id),
        }
    }

    fn allocate(&mut self, node: GameNode<G>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = Some(node);
                id
            }
            None => {
                let index = self.nodes.len();
                let id = match u32::try_from(index) {
                    Ok(index) => NodeId(index),
                    Err(_) => panic!("node arena is full at {} slots", index),
                };
                self.nodes.push(Some(node));
                id
            }
        }
    }

    /// Links a freshly created node under `parent` and updates every counter above it.
    fn attach(&mut self, parent: NodeId, slot: usize, mut node: GameNode<G>) -> NodeId {
        node.parent = Some(parent);
        node.move_slot = slot;
        if node.kind == NodeKind::Root {
            node.kind = NodeKind::Inner;
        }
        let is_leaf = node.is_leaf();
        let id = self.allocate(node);

        self.node_mut(parent).children.push(id);
        self.node_count += 1;
        if is_leaf {
            self.leaf_count += 1;
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            let node = self.node_mut(current);
            node.descendant_count += 1;
            ancestor = node.parent;
        }
        id
    }

    /// Asks the game for the moves of `id` unless they are already cached.
    pub(crate) fn ensure_moves(&mut self, id: NodeId) {
        if self.node(id).moves.is_none() {
            let moves = self.game.get_moves(self.node(id));
            self.node_mut(id).moves = Some(moves);
        }
    }

    /// Creates the child for the next unexpanded move of `id`, or returns `None` when every move
    /// already has a child.
    pub(crate) fn create_next_child(&mut self, id: NodeId) -> Option<NodeId> {
        let (slot, child) = {
            let parent = self.node(id);
            let moves = parent.moves.as_deref()?;
            let mut slot = parent.move_index;
            if parent.retained_slot == Some(slot) {
                slot += 1;
            }
            let game_move = moves.get(slot)?;
            (slot, self.game.create_child(parent, game_move))
        };
        self.node_mut(id).move_index = slot + 1;
        Some(self.attach(id, slot, child))
    }

    /// Creates a child for every remaining move of `id`.
    ///
    /// Returns `false` when there was nothing left to create.
    pub fn create_children(&mut self, id: NodeId) -> bool {
        if self.node(id).is_leaf() {
            return false;
        }
        self.ensure_moves(id);
        let mut created = false;
        while self.create_next_child(id).is_some() {
            created = true;
        }
        created
    }

    /// Expands every non-leaf node below the active root until the whole game is in memory.
    pub fn create_full_tree(&mut self) {
        let mut stack = vec![self.active_root];
        while let Some(id) = stack.pop() {
            self.create_children(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        debug!(
            "full tree: {} nodes, {} leaves",
            self.node_count, self.leaf_count
        );
    }

    /// Cursor over the children of `id` that creates missing children on demand.
    pub fn child_generator(&self, id: NodeId) -> ChildCursor {
        ChildCursor {
            parent: id,
            position: 0,
            lazy: true,
        }
    }

    /// Cursor over the children of `id` that already exist.
    pub fn child_iter(&self, id: NodeId) -> ChildCursor {
        ChildCursor {
            parent: id,
            position: 0,
            lazy: false,
        }
    }

    /// Reorders the children of `id` by their last results and returns the new first child.
    pub fn sort_children(
        &mut self,
        id: NodeId,
        method: SortMethod,
        order: SortOrder,
        prune_by_path_length: bool,
    ) -> Option<NodeId> {
        let mut ranked: Vec<Ranked> = self
            .node(id)
            .children
            .iter()
            .map(|&child| {
                let node = self.node(child);
                Ranked {
                    id: child,
                    depth: node.inherited_depth,
                    value: node.inherited_value,
                    path_length: node.path_length,
                }
            })
            .collect();
        sorting::sort(&mut ranked, method, order, prune_by_path_length);
        let node = self.node_mut(id);
        for (slot, entry) in node.children.iter_mut().zip(&ranked) {
            *slot = entry.id;
        }
        node.children.first().copied()
    }

    /// Keeps only the best child of every node below `id`.
    ///
    /// `depth` is the distance of `id` from the search root; the node at depth 0 keeps all of
    /// its children so the next search still ranks every move. A trimmed node forgets how far
    /// its moves were expanded, so a later search recreates the discarded children.
    pub fn remove_non_best_nodes(&mut self, id: NodeId, depth: usize) {
        if depth > 0 {
            self.trim_to_best(id);
        }
        let children = self.node(id).children.clone();
        for &child in &children {
            self.remove_non_best_nodes(child, depth + 1);
        }
        let descendants = children
            .iter()
            .map(|&child| self.node(child).descendant_count + 1)
            .sum();
        self.node_mut(id).descendant_count = descendants;
    }

    fn trim_to_best(&mut self, id: NodeId) {
        let node = self.node(id);
        let best = match node.best_child {
            Some(best) if node.children.len() > 1 && node.children.contains(&best) => best,
            _ => return,
        };
        let discarded: Vec<NodeId> = node
            .children
            .iter()
            .copied()
            .filter(|&child| child != best)
            .collect();
        let best_slot = self.node(best).move_slot;

        let node = self.node_mut(id);
        node.children.clear();
        node.children.push(best);
        node.move_index = 0;
        node.retained_slot = Some(best_slot);

        for child in discarded {
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        let mut freed = 0;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.index()].take() {
                if node.is_leaf() {
                    self.leaf_count -= 1;
                }
                stack.extend(node.children);
                self.free.push(current);
                freed += 1;
            }
        }
        self.node_count -= freed;
        trace!("freed {} nodes below {:?}", freed, id);
    }

    /// Checks that every descendant count below `id` matches the nodes actually linked there.
    ///
    /// Returns the size of the subtree, `id` included.
    pub fn validate_descendants(&self, id: NodeId) -> Result<usize, SearchError> {
        let node = self.node(id);
        let mut found = 0;
        for &child in &node.children {
            found += self.validate_descendants(child)?;
        }
        if found != node.descendant_count {
            return Err(SearchError::DescendantMismatch {
                expected: node.descendant_count,
                found,
            });
        }
        Ok(found + 1)
    }

    /// Nodes along the best line from the active root, the active root first.
    pub fn optimal_route(&self) -> Vec<NodeId> {
        let mut route = vec![self.active_root];
        let mut current = self.node(self.active_root).best_child;
        while let Some(id) = current {
            route.push(id);
            current = self.node(id).best_child;
        }
        route
    }

    /// Moves along the best line from the active root.
    pub fn optimal_moves(&self) -> Vec<G::Move> {
        self.optimal_route()
            .into_iter()
            .skip(1)
            .map(|id| self.node(id).game_move.clone())
            .collect()
    }
}

/// Position within the children of one node.
///
/// The cursor does not borrow the tree, so the search can recurse into a child between two
/// calls to [`ChildCursor::next`]. A lazy cursor yields the existing children first and then
/// creates the remaining ones one at a time.
#[derive(Debug, Clone, Copy)]
pub struct ChildCursor {
    parent: NodeId,
    position: usize,
    lazy: bool,
}

impl ChildCursor {
    pub fn next<G: Game>(&mut self, tree: &mut Tree<G>) -> Option<NodeId> {
        let id = match tree.node(self.parent).children.get(self.position).copied() {
            Some(id) => id,
            None if self.lazy => tree.create_next_child(self.parent)?,
            None => return None,
        };
        self.position += 1;
        Some(id)
    }
}
