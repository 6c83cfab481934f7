mod search;

pub use search::Negamax;
