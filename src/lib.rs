//! Generic adversarial game tree search.
//!
//! A game describes itself through the [`tree::Game`] trait. The searches in [`negamax`],
//! [`minimax`] and [`maxn`] grow a [`tree::Tree`] of its positions and pick a move according to
//! [`search::SearchOpts`].

pub mod error;
pub mod games;
pub mod maxn;
pub mod minimax;
pub mod negamax;
pub mod prelude;
pub mod search;
pub mod tree;

#[cfg(feature = "instrumentation")]
pub mod instrumentation;
