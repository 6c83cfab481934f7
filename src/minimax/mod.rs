mod search;

pub use search::Minimax;
