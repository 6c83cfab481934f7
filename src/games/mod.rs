//! Small games used to exercise and benchmark the searches.

pub mod mancala;
pub mod tictactoe;
