use std::f64::{INFINITY, NEG_INFINITY};

use log::{trace, warn};

use crate::error::SearchError;
use crate::search::{PruningType, Search, SearchExit, SearchOpts, SearchResult, SearchTree};
use crate::tree::{Game, GameNode, NodeAim, NodeId, NodeKind, SortOrder};

/// Two-player search where the game sets the aim of every node.
///
/// Values are kept from the maximizing player's point of view throughout. Because the side to
/// move comes from [`crate::tree::Node::aim`] rather than from alternation, a player may move
/// several times in a row.
///
/// Path-length tiebreaks and random root selection are not supported and are ignored.
pub struct Minimax<G: Game> {
    search: SearchTree<G>,
}

impl<G: Game> Minimax<G> {
    pub fn new(game: G, root: GameNode<G>, opts: SearchOpts) -> Self {
        Self {
            search: SearchTree::new(game, root, opts),
        }
    }

    fn assign_outcome(&mut self, id: NodeId, leaf: bool) -> Result<SearchExit, SearchError> {
        let tree = &mut self.search.tree;
        let value = tree.game.evaluate(tree.node(id))?;
        let node = tree.node_mut(id);
        node.inherited_value = value;
        node.pruned = false;
        Ok(self.search.record_outcome(id, leaf))
    }

    fn minimax(
        &mut self,
        id: NodeId,
        depth: usize,
        mut alpha: f64,
        mut beta: f64,
    ) -> Result<SearchExit, SearchError> {
        let aim = {
            let node = self.search.tree.node(id);
            if node.kind == NodeKind::Leaf {
                return self.assign_outcome(id, true);
            }
            node.aim
        };
        if depth == 0 {
            return self.assign_outcome(id, false);
        }
        if let Some(exit) = self.search.check_expiry() {
            return Ok(exit);
        }
        let order = match aim {
            NodeAim::Max => SortOrder::Descending,
            NodeAim::Min => SortOrder::Ascending,
            _ => return Err(SearchError::AimNotSet),
        };

        let alpha_beta = self.search.opts.pruning == PruningType::AlphaBeta;
        let mut best: Option<(NodeId, f64)> = None;
        let mut cut = false;
        let mut cursor = self.search.get_children(id, order);
        while let Some(child) = cursor.next(&mut self.search.tree) {
            let exit = if alpha_beta {
                self.minimax(child, depth - 1, alpha, beta)?
            } else {
                self.minimax(child, depth - 1, NEG_INFINITY, INFINITY)?
            };
            if exit.is_aborted() {
                return Ok(exit);
            }

            let (value, child_pruned) = {
                let node = self.search.tree.node(child);
                (node.inherited_value, node.pruned)
            };
            cut |= child_pruned;
            let improved = match (best, order) {
                (None, _) => true,
                (Some((_, best_value)), SortOrder::Descending) => value > best_value,
                (Some((_, best_value)), SortOrder::Ascending) => value < best_value,
            };
            if improved {
                best = Some((child, value));
            }
            if !alpha_beta {
                continue;
            }
            match order {
                SortOrder::Descending => alpha = alpha.max(value),
                SortOrder::Ascending => beta = beta.min(value),
            }
            if alpha >= beta {
                trace!("cutoff at depth {}: alpha {} beta {}", depth, alpha, beta);
                cut = true;
                break;
            }
        }

        let found = match best {
            Some((found, _)) => found,
            None => return self.assign_outcome(id, true),
        };
        let best = self.search.resolve_best_child(id, order, Some(found))?;
        let active_depth = self.search.active_depth;
        let (value, path_length) = {
            let node = self.search.tree.node(best);
            (node.inherited_value, node.path_length)
        };
        let node = self.search.tree.node_mut(id);
        node.inherited_value = value;
        node.inherited_depth = Some(active_depth);
        node.path_length = path_length + 1;
        node.best_child = Some(best);
        node.pruned = cut;
        Ok(self.search.pass_exit())
    }
}

impl<G: Game> Search<G> for Minimax<G> {
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
        let opts = &self.search.opts;
        if opts.prune_by_path_length || opts.random_best || opts.random_weight > 0.0 {
            warn!("minimax ignores path-length tiebreaks and random move selection");
        }
        self.search.begin_pass(depth);
        let root = self.search.tree.active_root();
        let exit = self.minimax(root, depth, NEG_INFINITY, INFINITY)?;
        let root_node = self.search.tree.node(root);
        Ok(self.search.build_result(
            exit,
            root_node.best_child,
            root_node.inherited_value,
            root_node.path_length,
        ))
    }
}
