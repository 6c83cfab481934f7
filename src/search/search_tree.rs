use std::time::Instant;

use log::{debug, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::opts::{RemovalMethod, SearchOpts};
use super::result::{SearchExit, SearchResult};
use crate::error::SearchError;
use crate::tree::{ChildCursor, Game, GameNode, NodeId, SortOrder, Tree};

/// Called with the tree and the result after every completed deepening pass.
pub type DepthCallback<G> = Box<dyn FnMut(&Tree<G>, &SearchResult<<G as Game>::Move>)>;

/// A tree together with the options and per-call state shared by every search algorithm.
pub struct SearchTree<G: Game> {
    pub(crate) tree: Tree<G>,
    pub opts: SearchOpts,
    pub(crate) active_depth: usize,
    pub(crate) outcomes: usize,
    full_depth: bool,
    deadline: Option<Instant>,
    expired: Option<SearchExit>,
    rng: StdRng,
    depth_callback: Option<DepthCallback<G>>,
}

impl<G: Game> SearchTree<G> {
    pub fn new(game: G, root: GameNode<G>, opts: SearchOpts) -> Self {
        Self {
            tree: Tree::new(game, root),
            opts,
            active_depth: 0,
            outcomes: 0,
            full_depth: true,
            deadline: None,
            expired: None,
            rng: StdRng::seed_from_u64(0),
            depth_callback: None,
        }
    }

    pub fn tree(&self) -> &Tree<G> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree<G> {
        &mut self.tree
    }

    /// Moves along the best line found by the last completed pass.
    pub fn optimal_moves(&self) -> Vec<G::Move> {
        self.tree.optimal_moves()
    }

    /// Depth of the pass currently running, or of the last one that ran.
    pub fn active_depth(&self) -> usize {
        self.active_depth
    }

    pub fn set_depth_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&Tree<G>, &SearchResult<G::Move>) + 'static,
    {
        self.depth_callback = Some(Box::new(callback));
    }

    pub fn clear_depth_callback(&mut self) {
        self.depth_callback = None;
    }

    /// Resets the per-call state at the start of [`super::Search::evaluate`].
    pub(crate) fn start(&mut self) {
        for warning in self.opts.warnings() {
            warn!("{}", warning);
        }
        self.deadline = self.opts.timeout_duration().map(|timeout| Instant::now() + timeout);
        self.expired = None;
        self.rng = match self.opts.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
    }

    pub(crate) fn begin_pass(&mut self, depth: usize) {
        self.active_depth = depth;
        self.outcomes = 0;
        self.full_depth = true;
    }

    /// Returns the abort reason once the deadline has passed or the node limit is reached.
    ///
    /// The first expiry sticks for the rest of the call.
    pub(crate) fn check_expiry(&mut self) -> Option<SearchExit> {
        if self.expired.is_none() {
            if self.deadline.map_or(false, |deadline| Instant::now() >= deadline) {
                self.expired = Some(SearchExit::Time);
            } else if self.opts.node_limit > 0 && self.tree.node_count() >= self.opts.node_limit {
                self.expired = Some(SearchExit::NodeLimit);
            }
            if let Some(exit) = self.expired {
                debug!(
                    "search expired ({:?}) at depth {} with {} nodes",
                    exit,
                    self.active_depth,
                    self.tree.node_count()
                );
            }
        }
        self.expired
    }

    /// Prepares the children of `id` for searching and returns a cursor over them.
    ///
    /// Eager searches create every child up front; presorting only applies when the children
    /// already existed. Generator searches make sure the moves are cached and create children
    /// as the cursor advances.
    pub(crate) fn get_children(&mut self, id: NodeId, order: SortOrder) -> ChildCursor {
        let SearchOpts {
            gen_based,
            presort,
            sort_method,
            prune_by_path_length,
            ..
        } = self.opts;
        if gen_based {
            if !self.tree.node(id).has_moves() {
                self.tree.ensure_moves(id);
            } else if presort {
                self.tree
                    .sort_children(id, sort_method, order, prune_by_path_length);
            }
            self.tree.child_generator(id)
        } else {
            if !self.tree.create_children(id) && presort {
                self.tree
                    .sort_children(id, sort_method, order, prune_by_path_length);
            }
            self.tree.child_iter(id)
        }
    }

    /// Stamps a leaf or horizon node whose value has just been assigned.
    pub(crate) fn record_outcome(&mut self, id: NodeId, leaf: bool) -> SearchExit {
        let node = self.tree.node_mut(id);
        node.inherited_depth = Some(self.active_depth);
        node.path_length = if leaf { 0 } else { 1 };
        self.outcomes += 1;
        if !leaf {
            self.full_depth = false;
        }
        self.pass_exit()
    }

    /// Exit of the running pass if it completes now.
    pub(crate) fn pass_exit(&self) -> SearchExit {
        if self.full_depth {
            SearchExit::FullDepth
        } else {
            SearchExit::Depth
        }
    }

    /// Whether a line of `value` and `path` beats the current best, both seen by the chooser.
    pub(crate) fn improves(&self, value: f64, path: usize, best_value: f64, best_path: usize) -> bool {
        if value > best_value {
            return true;
        }
        if value < best_value || !self.opts.prune_by_path_length {
            return false;
        }
        (value > 0.0 && path < best_path) || (value < 0.0 && path > best_path)
    }

    /// Whether the rest of a node's children can be skipped.
    ///
    /// `alpha_end` and `beta_end` are the plies, counted from the active root, at which the
    /// lines that set each bound end. On equal bounds the opponent could still prefer this
    /// node's line for its length, so the cut needs the line to be no better for them.
    pub(crate) fn cuts_off(&self, alpha: f64, alpha_end: usize, beta: f64, beta_end: usize) -> bool {
        if alpha > beta {
            return true;
        }
        if alpha < beta || self.opts.random_best {
            return false;
        }
        if !self.opts.prune_by_path_length {
            return true;
        }
        if alpha > 0.0 {
            alpha_end <= beta_end
        } else if alpha < 0.0 {
            alpha_end >= beta_end
        } else {
            true
        }
    }

    /// Child of `id` evaluated at the active depth with the best value for the chooser.
    pub(crate) fn select_best_child(&self, id: NodeId, order: SortOrder) -> Option<NodeId> {
        let mut best: Option<(NodeId, f64, usize)> = None;
        for &child in self.tree.node(id).children() {
            let node = self.tree.node(child);
            if node.inherited_depth != Some(self.active_depth) {
                continue;
            }
            let value = chooser_value(node.inherited_value, order);
            let better = match best {
                None => true,
                Some((_, best_value, best_path)) => {
                    self.improves(value, node.path_length, best_value, best_path)
                }
            };
            if better {
                best = Some((child, value, node.path_length));
            }
        }
        best.map(|(child, _, _)| child)
    }

    /// Settles the best child of `id` once its children have been searched.
    ///
    /// `found` is the child the search loop kept. Postsorting replaces it with the first child
    /// after sorting.
    pub(crate) fn resolve_best_child(
        &mut self,
        id: NodeId,
        order: SortOrder,
        found: Option<NodeId>,
    ) -> Result<NodeId, SearchError> {
        let best = if self.opts.postsort {
            let SearchOpts {
                sort_method,
                prune_by_path_length,
                ..
            } = self.opts;
            let active_depth = self.active_depth;
            let first = self
                .tree
                .sort_children(id, sort_method, order, prune_by_path_length);
            first.filter(|&child| self.tree.node(child).inherited_depth == Some(active_depth))
        } else {
            found
        };
        best.or_else(|| self.select_best_child(id, order))
            .ok_or(SearchError::MissingBestChild)
    }

    /// Move choice at the active root, honouring the random selection options.
    pub(crate) fn pick_root_child(&mut self, order: SortOrder) -> Option<NodeId> {
        let root = self.tree.active_root();
        let best = self.tree.node(root).best_child;
        let weight = self.opts.random_weight;
        if !self.opts.random_best && weight <= 0.0 {
            return best;
        }
        let best_value = chooser_value(self.tree.node(best?).inherited_value, order);
        let candidates: Vec<(NodeId, f64)> = self
            .tree
            .node(root)
            .children()
            .iter()
            .map(|&child| (child, self.tree.node(child)))
            .filter(|(_, node)| node.inherited_depth == Some(self.active_depth) && !node.pruned)
            .map(|(child, node)| (child, chooser_value(node.inherited_value, order)))
            .collect();

        let chosen = if weight > 0.0 {
            let weights: Vec<f64> = candidates
                .iter()
                .map(|&(_, value)| weight.powf(value - best_value))
                .collect();
            match WeightedIndex::new(&weights) {
                Ok(distribution) => Some(candidates[distribution.sample(&mut self.rng)].0),
                Err(err) => {
                    debug!("weighted selection unavailable ({}), keeping best move", err);
                    None
                }
            }
        } else {
            let tied: Vec<NodeId> = candidates
                .iter()
                .filter(|&&(_, value)| value == best_value)
                .map(|&(child, _)| child)
                .collect();
            tied.choose(&mut self.rng).copied()
        };
        chosen.or(best)
    }

    pub(crate) fn build_result(
        &self,
        exit: SearchExit,
        chosen: Option<NodeId>,
        value: f64,
        path_length: usize,
    ) -> SearchResult<G::Move> {
        SearchResult {
            exit,
            best_move: chosen.map(|id| self.tree.node(id).game_move.clone()),
            value,
            depth: self.active_depth,
            outcomes: self.outcomes,
            nodes: self.tree.node_count(),
            path_length,
        }
    }

    pub(crate) fn notify_depth(&mut self, result: &SearchResult<G::Move>) {
        if let Some(callback) = self.depth_callback.as_mut() {
            callback(&self.tree, result);
        }
    }

    /// Trims the tree to its best lines if the removal policy asks for it after a pass.
    pub(crate) fn apply_removal(&mut self, depth: usize) {
        let remove = match self.opts.removal_method {
            RemovalMethod::None => false,
            RemovalMethod::Always => true,
            RemovalMethod::Depth => depth >= self.opts.removal_value,
            RemovalMethod::Count => self.tree.node_count() > self.opts.removal_value,
        };
        if remove {
            let removed = self.remove_nodes();
            debug!(
                "removed {} nodes after depth {}, {} remain",
                removed,
                depth,
                self.tree.node_count()
            );
        }
    }

    /// Trims every node below the active root's children to its best line.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_nodes(&mut self) -> usize {
        let before = self.tree.node_count();
        let root = self.tree.active_root();
        self.tree.remove_non_best_nodes(root, 0);
        before - self.tree.node_count()
    }
}

#[inline]
fn chooser_value(value: f64, order: SortOrder) -> f64 {
    match order {
        SortOrder::Descending => value,
        SortOrder::Ascending => -value,
    }
}
