use log::{debug, info};

use super::opts::{SearchMethod, SearchOpts};
use super::result::{SearchExit, SearchResult};
use super::search_tree::SearchTree;
use crate::error::SearchError;
use crate::tree::{Game, Tree};

/// A search algorithm over a [`SearchTree`].
///
/// Implementors provide one depth-limited pass; [`Search::evaluate`] schedules passes according
/// to [`SearchOpts::method`].
pub trait Search<G: Game> {
    fn search_tree(&self) -> &SearchTree<G>;

    fn search_tree_mut(&mut self) -> &mut SearchTree<G>;

    /// Runs a single pass to `depth` plies from the active root.
    fn eval_depth(&mut self, depth: usize) -> Result<SearchResult<G::Move>, SearchError>;

    // `SearchTree` boxes a callback over `G`, so borrows through it need `G` to outlive them.
    fn tree<'a>(&'a self) -> &'a Tree<G>
    where
        G: 'a,
    {
        self.search_tree().tree()
    }

    fn opts<'a>(&'a self) -> &'a SearchOpts
    where
        G: 'a,
    {
        &self.search_tree().opts
    }

    fn opts_mut<'a>(&'a mut self) -> &'a mut SearchOpts
    where
        G: 'a,
    {
        &mut self.search_tree_mut().opts
    }

    /// Moves along the current chain of best children from the active root.
    ///
    /// After a completed pass this is the line its result reports. After an aborted deepening
    /// pass the root keeps the previous pass's choice, but inner nodes the aborted pass already
    /// finished may point at its deeper best children, so the tail of the line can mix passes.
    fn optimal_moves(&self) -> Vec<G::Move> {
        self.search_tree().optimal_moves()
    }

    #[cfg_attr(feature = "instrumentation", tracing::instrument(skip_all))]
    fn evaluate(&mut self) -> Result<SearchResult<G::Move>, SearchError> {
        self.search_tree_mut().start();
        let (method, depth) = {
            let opts = self.opts();
            (opts.method, opts.depth)
        };
        let result = match method {
            SearchMethod::Depth => {
                if depth == 0 {
                    return Err(SearchError::DepthTooLow);
                }
                let result = self.eval_depth(depth)?;
                if !result.is_aborted() {
                    self.search_tree_mut().notify_depth(&result);
                }
                result
            }
            SearchMethod::Deepening | SearchMethod::Time => self.eval_deepening()?,
        };
        info!(
            "search finished: {:?} at depth {}, value {}, {} nodes",
            result.exit, result.depth, result.value, result.nodes
        );
        Ok(result)
    }

    /// Repeats passes of increasing depth until the game is exhausted, the depth limit is
    /// reached or a pass is aborted.
    ///
    /// An aborted pass is discarded in favour of the last completed one, keeping the abort
    /// reason and the current node count.
    fn eval_deepening(&mut self) -> Result<SearchResult<G::Move>, SearchError> {
        let (mut depth, limit) = {
            let opts = self.opts();
            (opts.initial_depth.max(1), opts.depth)
        };
        let mut completed: Option<SearchResult<G::Move>> = None;
        loop {
            let result = self.eval_depth(depth)?;
            if result.is_aborted() {
                debug!("pass at depth {} aborted: {:?}", depth, result.exit);
                return Ok(match completed {
                    Some(previous) => SearchResult {
                        exit: result.exit,
                        outcomes: result.outcomes,
                        nodes: result.nodes,
                        ..previous
                    },
                    None => result,
                });
            }
            debug!(
                "depth {} complete: value {}, {} outcomes, {} nodes",
                depth, result.value, result.outcomes, result.nodes
            );
            let search = self.search_tree_mut();
            search.notify_depth(&result);
            search.apply_removal(depth);
            if result.exit == SearchExit::FullDepth || (limit > 0 && depth >= limit) {
                return Ok(result);
            }
            completed = Some(result);
            depth += 1;
        }
    }
}
