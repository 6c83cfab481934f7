//! Options, results and the pass scheduling shared by every search algorithm.

mod driver;
mod opts;
mod result;
mod search_tree;

pub use driver::Search;
pub use opts::{PruningType, RemovalMethod, SearchMethod, SearchOpts};
pub use result::{SearchExit, SearchResult};
pub use search_tree::{DepthCallback, SearchTree};

#[cfg(test)]
mod tests;
