use log::warn;

use crate::error::SearchError;
use crate::search::{PruningType, Search, SearchExit, SearchOpts, SearchResult, SearchTree};
use crate::tree::{Game, GameNode, NodeId, NodeKind, Scores, SortOrder};

/// A game with more than two players, scored with one value per player.
pub trait MaxnGame: Game {
    /// Scores `node` for every player, indexed by player number.
    fn scores(&self, node: &GameNode<Self>) -> Scores;
}

/// Search where the player to move at each node picks the child that maximizes their own score.
///
/// Alpha-beta pruning does not apply and is ignored.
pub struct Maxn<G: MaxnGame> {
    search: SearchTree<G>,
}

impl<G: MaxnGame> Maxn<G> {
    pub fn new(game: G, root: GameNode<G>, opts: SearchOpts) -> Self {
        Self {
            search: SearchTree::new(game, root, opts),
        }
    }

    /// Score vector of the best line from the active root after the last pass.
    pub fn root_scores(&self) -> &[f64] {
        let tree = &self.search.tree;
        tree.node(tree.active_root()).inherited_scores()
    }

    fn assign_outcome(&mut self, id: NodeId, leaf: bool) -> Result<SearchExit, SearchError> {
        let tree = &mut self.search.tree;
        if tree.node(id).scores.is_empty() {
            let scores = tree.game.scores(tree.node(id));
            tree.node_mut(id).scores = scores;
        }
        let node = tree.node(id);
        let player = match node.parent() {
            Some(parent) => tree.node(parent).active_player,
            None => node.active_player,
        };
        let value = *node
            .scores
            .get(player)
            .ok_or(SearchError::MissingScores { player })?;
        let node = tree.node_mut(id);
        node.inherited_scores = node.scores.clone();
        node.inherited_value = value;
        Ok(self.search.record_outcome(id, leaf))
    }

    fn maxn(&mut self, id: NodeId, depth: usize) -> Result<SearchExit, SearchError> {
        let player = {
            let node = self.search.tree.node(id);
            if node.kind == NodeKind::Leaf {
                return self.assign_outcome(id, true);
            }
            node.active_player
        };
        if depth == 0 {
            return self.assign_outcome(id, false);
        }
        if let Some(exit) = self.search.check_expiry() {
            return Ok(exit);
        }

        let mut best: Option<(NodeId, f64)> = None;
        let mut cursor = self.search.get_children(id, SortOrder::Descending);
        while let Some(child) = cursor.next(&mut self.search.tree) {
            let exit = self.maxn(child, depth - 1)?;
            if exit.is_aborted() {
                return Ok(exit);
            }
            let node = self.search.tree.node_mut(child);
            let value = *node
                .inherited_scores
                .get(player)
                .ok_or(SearchError::MissingScores { player })?;
            node.inherited_value = value;
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((child, value));
            }
        }

        let found = match best {
            Some((found, _)) => found,
            None => return self.assign_outcome(id, true),
        };
        let best = self
            .search
            .resolve_best_child(id, SortOrder::Descending, Some(found))?;
        let active_depth = self.search.active_depth;
        let (value, scores, path_length) = {
            let node = self.search.tree.node(best);
            (
                node.inherited_value,
                node.inherited_scores.clone(),
                node.path_length,
            )
        };
        let node = self.search.tree.node_mut(id);
        node.inherited_value = value;
        node.inherited_scores = scores;
        node.inherited_depth = Some(active_depth);
        node.path_length = path_length + 1;
        node.best_child = Some(best);
        Ok(self.search.pass_exit())
    }
}

impl<G: MaxnGame> Search<G> for Maxn<G> {
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
        if self.search.opts.pruning != PruningType::None {
            warn!("maxn does not prune, searching every child");
        }
        self.search.begin_pass(depth);
        let root = self.search.tree.active_root();
        let exit = self.maxn(root, depth)?;
        let root_node = self.search.tree.node(root);
        Ok(self.search.build_result(
            exit,
            root_node.best_child,
            root_node.inherited_value,
            root_node.path_length,
        ))
    }
}
