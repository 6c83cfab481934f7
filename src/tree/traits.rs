//! The callbacks a game supplies to the tree.

use super::node::Node;
use crate::error::SearchError;

/// Node type of a [`Game`].
pub type GameNode<G> = Node<<G as Game>::State, <G as Game>::Move, <G as Game>::Data>;

/// A game model: how to list moves, how to make children and how to value a state.
///
/// Implementations must be pure with respect to the tree. `get_moves` and `create_child` only
/// read the node they are given; the parent's state is cloned, never modified.
pub trait Game: Sized {
    type State;
    type Move: Clone;
    type Data;

    /// Returns every legal move from `node`. An empty list marks a terminal position.
    fn get_moves(&self, node: &GameNode<Self>) -> Vec<Self::Move>;

    /// Clones the parent's state, applies `game_move` and returns the resulting node,
    /// classified as [`super::NodeKind::Leaf`] when the game is over.
    fn create_child(&self, parent: &GameNode<Self>, game_move: &Self::Move) -> GameNode<Self>;

    /// Scores `node` from the perspective of the [`super::NodeAim::Max`] player.
    ///
    /// The default returns the value the game assigned in `create_child`.
    fn evaluate(&self, node: &GameNode<Self>) -> Result<f64, SearchError> {
        node.value.ok_or(SearchError::ValueNotAssigned)
    }
}
