mod search;

pub use search::{Maxn, MaxnGame};
