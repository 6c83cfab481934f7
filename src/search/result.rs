/// Why a search pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchExit {
    /// The depth limit was reached on at least one line.
    Depth,
    /// Every line ended in a leaf before the depth limit.
    FullDepth,
    /// The timeout expired.
    Time,
    /// The tree reached the node limit.
    NodeLimit,
}

impl SearchExit {
    /// `true` when the pass was cut short and its partial results must not be used.
    pub fn is_aborted(self) -> bool {
        matches!(self, SearchExit::Time | SearchExit::NodeLimit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<M> {
    pub exit: SearchExit,
    /// Chosen move at the active root. `None` when the root has no children or no pass finished.
    pub best_move: Option<M>,
    /// Value of the chosen move, from the maximizing player's point of view for negamax and
    /// minimax, or the root player's score for maxn. NaN when no pass finished.
    pub value: f64,
    /// Depth of the pass the move and value come from.
    pub depth: usize,
    /// Leaves and horizon nodes evaluated by the last pass.
    pub outcomes: usize,
    /// Nodes in the tree, the root excluded.
    pub nodes: usize,
    /// Plies from the active root to the end of the best line.
    pub path_length: usize,
}

impl<M> SearchResult<M> {
    pub fn is_aborted(&self) -> bool {
        self.exit.is_aborted()
    }
}
