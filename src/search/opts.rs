use std::time::Duration;

use crate::error::SearchError;
use crate::tree::SortMethod;

/// How [`super::Search::evaluate`] schedules depth-limited passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    /// One pass to `depth`.
    Depth,
    /// Passes of increasing depth up to `depth`, or until the game is exhausted when `depth` is 0.
    Deepening,
    /// Like `Deepening`, bounded by `timeout`.
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruningType {
    None,
    AlphaBeta,
}

/// When the tree is trimmed to its best lines between deepening passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalMethod {
    None,
    /// After every pass.
    Always,
    /// After passes at or beyond `removal_value` plies.
    Depth,
    /// After passes that leave more than `removal_value` nodes in the tree.
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOpts {
    pub method: SearchMethod,
    pub pruning: PruningType,
    /// Maximum depth in plies. 0 means unbounded for the deepening methods.
    pub depth: usize,
    /// Wall-clock budget in milliseconds. 0 disables the clock.
    pub timeout: u64,
    /// First depth tried by the deepening methods.
    pub initial_depth: usize,
    /// Create children one at a time while searching instead of all at once.
    pub gen_based: bool,
    /// Order existing children by their previous results before searching them.
    pub presort: bool,
    /// Pick each node's best child by sorting its children after the search.
    pub postsort: bool,
    pub sort_method: SortMethod,
    /// Prefer shorter winning lines and longer losing lines between equal values.
    pub prune_by_path_length: bool,
    /// Choose uniformly among the root's equally best moves.
    pub random_best: bool,
    /// Choose among the root's moves with weight `random_weight^(value - best)`. 0 disables.
    pub random_weight: f64,
    /// Seed for the random choices. Drawn from entropy when unset.
    pub random_seed: Option<u64>,
    /// Stop searching once the tree holds this many nodes. 0 disables.
    pub node_limit: usize,
    pub removal_method: RemovalMethod,
    pub removal_value: usize,
}

impl Default for SearchOpts {
    fn default() -> Self {
        Self {
            method: SearchMethod::Depth,
            pruning: PruningType::None,
            depth: 0,
            timeout: 0,
            initial_depth: 1,
            gen_based: false,
            presort: false,
            postsort: false,
            sort_method: SortMethod::Default,
            prune_by_path_length: false,
            random_best: false,
            random_weight: 0.0,
            random_seed: None,
            node_limit: 0,
            removal_method: RemovalMethod::None,
            removal_value: 0,
        }
    }
}

impl SearchOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_pruning(mut self, pruning: PruningType) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }

    pub fn with_initial_depth(mut self, depth: usize) -> Self {
        self.initial_depth = depth;
        self
    }

    pub fn with_gen_based(mut self, gen_based: bool) -> Self {
        self.gen_based = gen_based;
        self
    }

    pub fn with_presort(mut self, presort: bool) -> Self {
        self.presort = presort;
        self
    }

    pub fn with_postsort(mut self, postsort: bool) -> Self {
        self.postsort = postsort;
        self
    }

    pub fn with_sort_method(mut self, sort_method: SortMethod) -> Self {
        self.sort_method = sort_method;
        self
    }

    pub fn with_prune_by_path_length(mut self, prune: bool) -> Self {
        self.prune_by_path_length = prune;
        self
    }

    pub fn with_random_best(mut self, random_best: bool) -> Self {
        self.random_best = random_best;
        self
    }

    pub fn with_random_weight(mut self, weight: f64) -> Self {
        self.random_weight = weight;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = limit;
        self
    }

    pub fn with_removal(mut self, method: RemovalMethod, value: usize) -> Self {
        self.removal_method = method;
        self.removal_value = value;
        self
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        if self.timeout > 0 {
            Some(Duration::from_millis(self.timeout))
        } else {
            None
        }
    }

    /// Rejects combinations that cannot produce a meaningful search.
    ///
    /// Searches do not call this; degenerate but usable combinations only log a warning.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.method == SearchMethod::Depth && self.depth == 0 {
            return Err(SearchError::DepthTooLow);
        }
        if self.initial_depth == 0 {
            return Err(SearchError::InvalidOptions(
                "initial depth must be at least 1".to_string(),
            ));
        }
        if self.method != SearchMethod::Depth && self.depth > 0 && self.initial_depth > self.depth
        {
            return Err(SearchError::InvalidOptions(format!(
                "initial depth {} exceeds depth {}",
                self.initial_depth, self.depth
            )));
        }
        if !self.random_weight.is_finite() || self.random_weight < 0.0 {
            return Err(SearchError::InvalidOptions(format!(
                "random weight {} must be a finite non-negative number",
                self.random_weight
            )));
        }
        let random = self.random_best || self.random_weight > 0.0;
        if self.random_weight > 0.0 && self.pruning == PruningType::AlphaBeta {
            return Err(SearchError::InvalidOptions(
                "weighted random selection needs exact values, disable alpha-beta".to_string(),
            ));
        }
        if random && self.prune_by_path_length {
            return Err(SearchError::InvalidOptions(
                "random selection ignores path-length tiebreaks".to_string(),
            ));
        }
        Ok(())
    }

    /// Descriptions of option combinations that run but probably do not do what was meant.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.method == SearchMethod::Time && self.timeout == 0 {
            warnings.push("time search without a timeout runs until the game is exhausted");
        }
        if self.method != SearchMethod::Time && self.timeout > 0 {
            warnings.push("timeout set on a search method that is not time based");
        }
        if self.presort && self.method == SearchMethod::Depth {
            warnings.push("presort has no previous results to sort by in a single depth search");
        }
        if self.random_best && self.pruning == PruningType::AlphaBeta {
            warnings.push("random best selection disables alpha-beta cutoffs on equal bounds");
        }
        if self.random_weight > 0.0 && self.pruning == PruningType::AlphaBeta {
            warnings.push("weighted random selection only sees values bounded by alpha-beta cutoffs");
        }
        if (self.random_best || self.random_weight > 0.0) && self.prune_by_path_length {
            warnings.push("random selection ignores path-length tiebreaks");
        }
        if self.removal_method != RemovalMethod::None && self.method == SearchMethod::Depth {
            warnings.push("node removal only runs between deepening passes");
        }
        warnings
    }
}
