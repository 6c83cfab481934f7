use std::f64::{INFINITY, NEG_INFINITY};

use log::trace;

use crate::error::SearchError;
use crate::search::{PruningType, Search, SearchExit, SearchOpts, SearchResult, SearchTree};
use crate::tree::{Game, GameNode, NodeAim, NodeId, NodeKind, SortMethod, SortOrder};

/// Two-player zero-sum search that negates values between plies.
///
/// Values on the tree are stored from the point of view of each node's parent, so every node
/// simply picks its highest child. The aim of the active root tells which side it searches
/// for: [`NodeAim::Min`] searches for the minimizing player, anything else for the maximizer.
pub struct Negamax<G: Game> {
    search: SearchTree<G>,
    optimal: bool,
}

impl<G: Game> Negamax<G> {
    pub fn new(game: G, root: GameNode<G>, opts: SearchOpts) -> Self {
        Self {
            search: SearchTree::new(game, root, opts),
            optimal: false,
        }
    }

    /// Switches to the fixed configuration: alpha-beta, children generated one at a time and
    /// presorted with [`SortMethod::BubbleEfficient`], no path-length tiebreaks.
    ///
    /// Pruning, expansion and sorting options are ignored while this is on.
    pub fn set_optimal(&mut self, optimal: bool) {
        self.optimal = optimal;
    }

    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    fn colour_of(aim: NodeAim) -> f64 {
        if aim == NodeAim::Min {
            -1.0
        } else {
            1.0
        }
    }

    /// Plies between the active root and a node `depth` plies above the horizon.
    fn ply(&self, depth: usize) -> usize {
        self.search.active_depth - depth
    }

    fn assign_outcome(&mut self, id: NodeId, colour: f64, leaf: bool) -> Result<SearchExit, SearchError> {
        let tree = &mut self.search.tree;
        let value = tree.game.evaluate(tree.node(id))?;
        let node = tree.node_mut(id);
        node.inherited_value = -colour * value;
        node.pruned = false;
        Ok(self.search.record_outcome(id, leaf))
    }

    fn assign_best(&mut self, id: NodeId, best: NodeId, pruned: bool) {
        let depth = self.search.active_depth;
        let (value, path_length) = {
            let node = self.search.tree.node(best);
            (node.inherited_value, node.path_length)
        };
        let node = self.search.tree.node_mut(id);
        node.inherited_value = -value;
        node.inherited_depth = Some(depth);
        node.path_length = path_length + 1;
        node.best_child = Some(best);
        node.pruned = pruned;
    }

    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &mut self,
        id: NodeId,
        depth: usize,
        colour: f64,
        mut alpha: f64,
        mut alpha_end: usize,
        beta: f64,
        beta_end: usize,
    ) -> Result<SearchExit, SearchError> {
        if self.search.tree.node(id).kind == NodeKind::Leaf {
            return self.assign_outcome(id, colour, true);
        }
        if depth == 0 {
            return self.assign_outcome(id, colour, false);
        }
        if let Some(exit) = self.search.check_expiry() {
            return Ok(exit);
        }

        let alpha_beta = self.search.opts.pruning == PruningType::AlphaBeta;
        let child_ply = self.ply(depth) + 1;
        let mut best: Option<(NodeId, f64, usize)> = None;
        let mut cut = false;
        let mut cursor = self.search.get_children(id, SortOrder::Descending);
        while let Some(child) = cursor.next(&mut self.search.tree) {
            let exit = if alpha_beta {
                self.negamax(child, depth - 1, -colour, -beta, beta_end, -alpha, alpha_end)?
            } else {
                self.negamax(
                    child,
                    depth - 1,
                    -colour,
                    NEG_INFINITY,
                    usize::MAX,
                    INFINITY,
                    usize::MAX,
                )?
            };
            if exit.is_aborted() {
                return Ok(exit);
            }

            let (value, path) = {
                let node = self.search.tree.node(child);
                cut |= node.pruned;
                (node.inherited_value, node.path_length)
            };
            let improved = match best {
                None => true,
                Some((_, best_value, best_path)) => {
                    self.search.improves(value, path, best_value, best_path)
                }
            };
            if improved {
                best = Some((child, value, path));
            }
            if !alpha_beta {
                continue;
            }

            let end = child_ply + path;
            if self.search.improves(value, end, alpha, alpha_end) {
                alpha = value;
                alpha_end = end;
            }
            if self.search.cuts_off(alpha, alpha_end, beta, beta_end) {
                trace!("cutoff at depth {}: alpha {} beta {}", depth, alpha, beta);
                cut = true;
                break;
            }
        }

        match best {
            Some((found, _, _)) => {
                let best = self
                    .search
                    .resolve_best_child(id, SortOrder::Descending, Some(found))?;
                self.assign_best(id, best, cut);
                Ok(self.search.pass_exit())
            }
            // No moves: the position is terminal even though the game did not mark it.
            None => self.assign_outcome(id, colour, true),
        }
    }

    fn negamax_optimal(
        &mut self,
        id: NodeId,
        depth: usize,
        colour: f64,
        mut alpha: f64,
        beta: f64,
    ) -> Result<SearchExit, SearchError> {
        if self.search.tree.node(id).kind == NodeKind::Leaf {
            return self.assign_outcome(id, colour, true);
        }
        if depth == 0 {
            return self.assign_outcome(id, colour, false);
        }
        if let Some(exit) = self.search.check_expiry() {
            return Ok(exit);
        }

        let tree = &mut self.search.tree;
        if tree.node(id).has_moves() {
            tree.sort_children(id, SortMethod::BubbleEfficient, SortOrder::Descending, false);
        } else {
            tree.ensure_moves(id);
        }
        let mut cursor = tree.child_generator(id);
        let mut best: Option<(NodeId, f64)> = None;
        let mut cut = false;
        while let Some(child) = cursor.next(&mut self.search.tree) {
            let exit = self.negamax_optimal(child, depth - 1, -colour, -beta, -alpha)?;
            if exit.is_aborted() {
                return Ok(exit);
            }
            let (value, child_pruned) = {
                let node = self.search.tree.node(child);
                (node.inherited_value, node.pruned)
            };
            cut |= child_pruned;
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((child, value));
                if value > alpha {
                    alpha = value;
                }
                if alpha >= beta {
                    cut = true;
                    break;
                }
            }
        }

        match best {
            Some((best, _)) => {
                self.assign_best(id, best, cut);
                Ok(self.search.pass_exit())
            }
            None => self.assign_outcome(id, colour, true),
        }
    }
}

impl<G: Game> Search<G> for Negamax<G> {
    fn search_tree(&self) -> &SearchTree<G> {
        &self.search
    }

    fn search_tree_mut(&mut self) -> &mut SearchTree<G> {
        &mut self.search
    }

    #[cfg_attr(feature = "instrumentation", tracing::instrument(skip(self)))]
    fn eval_depth(&mut self, depth: usize) -> Result<SearchResult<G::Move>, SearchError> {
        if depth == 0 {
            return Err(SearchError::DepthTooLow);
        }
        self.search.begin_pass(depth);
        let root = self.search.tree.active_root();
        let colour = Self::colour_of(self.search.tree.node(root).aim);

        let exit = if self.optimal {
            self.negamax_optimal(root, depth, colour, NEG_INFINITY, INFINITY)?
        } else {
            self.negamax(
                root,
                depth,
                colour,
                NEG_INFINITY,
                usize::MAX,
                INFINITY,
                usize::MAX,
            )?
        };

        let chosen = if exit.is_aborted() {
            None
        } else {
            self.search.pick_root_child(SortOrder::Descending)
        };
        let root_node = self.search.tree.node(root);
        let result = match chosen {
            Some(child) if Some(child) != root_node.best_child => {
                let node = self.search.tree.node(child);
                self.search.build_result(
                    exit,
                    Some(child),
                    colour * node.inherited_value,
                    node.path_length + 1,
                )
            }
            _ => self.search.build_result(
                exit,
                root_node.best_child,
                -colour * root_node.inherited_value,
                root_node.path_length,
            ),
        };
        Ok(result)
    }
}
