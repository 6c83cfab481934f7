//! Common types re-exported for convenience.

pub use crate::error::SearchError;
pub use crate::maxn::{Maxn, MaxnGame};
pub use crate::minimax::Minimax;
pub use crate::negamax::Negamax;
pub use crate::search::{
    PruningType, RemovalMethod, Search, SearchExit, SearchMethod, SearchOpts, SearchResult,
};
pub use crate::tree::{Game, GameNode, Node, NodeAim, NodeId, NodeKind, SortMethod, Tree};
