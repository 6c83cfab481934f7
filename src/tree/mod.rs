mod node;
pub mod sorting;
mod traits;
#[allow(clippy::module_inception)]
mod tree;

pub use node::{Node, NodeAim, NodeId, NodeKind, Scores};
pub use sorting::{SortMethod, SortOrder};
pub use traits::{Game, GameNode};
pub use tree::{ChildCursor, Tree};
