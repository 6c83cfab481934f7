use thiserror::Error;

/// Contract violations raised while building or searching a tree.
///
/// Running out of time or nodes is not an error; see [`crate::search::SearchExit`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("depth must be at least 1")]
    DepthTooLow,
    #[error("node has no assigned value and the game does not evaluate it")]
    ValueNotAssigned,
    #[error("node has children but none could be selected as best")]
    MissingBestChild,
    #[error("minimax node reached without a max or min aim")]
    AimNotSet,
    #[error("score vector has no entry for player {player}")]
    MissingScores { player: usize },
    #[error("node descendant mismatch: expected {expected}, found {found}")]
    DescendantMismatch { expected: usize, found: usize },
    #[error("invalid search options: {0}")]
    InvalidOptions(String),
}
