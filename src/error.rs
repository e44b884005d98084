use thiserror::Error;

use crate::solution::NodeId;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid hand notation: {0}")]
    InvalidHandNotation(String),

    #[error("Hand must be exactly 2 distinct cards")]
    InvalidHandSize,

    // -- data unavailable --
    #[error("Unknown solution: {0}")]
    SolutionNotFound(String),

    #[error("Node {node} of solution {solution} is unavailable")]
    NodeUnavailable { solution: String, node: NodeId },

    #[error("No strategy for {hand} at node {node}")]
    HandNotFound { hand: String, node: NodeId },

    #[error("No strategy for hand {0}")]
    NoStrategy(String),

    // -- structural --
    #[error("Hand {hand} has {played} frequencies and {evs} EVs for {actions} actions")]
    LengthMismatch {
        hand: String,
        played: usize,
        evs: usize,
        actions: usize,
    },

    #[error("Action {action} of node {node} points to missing node {child}")]
    DanglingChild {
        node: NodeId,
        action: usize,
        child: NodeId,
    },

    // -- preconditions --
    #[error("Solution {0} has no loadable path")]
    NotLoadable(String),

    #[error("No solution matches the current filters")]
    EmptyPool,

    #[error("No seat can make the required {0} action")]
    NoQualifyingSeat(String),

    #[error("Unknown spot type: {0}")]
    UnknownSpotType(String),

    #[error("Could not reach seat {hero}'s decision in {solution}")]
    WalkFailed { solution: String, hero: usize },

    #[error("No hand qualifies at node {node}")]
    EmptyRange { node: NodeId },

    // -- exhaustion --
    #[error("Could not generate a spot after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    // -- scoring / session --
    #[error("No action matches '{0}'")]
    UnknownAction(String),

    #[error("No spot is waiting for an answer")]
    NoActiveSpot,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TrainerError {
    /// Structural errors come from static tree content; retrying the same
    /// node cannot succeed.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TrainerError::LengthMismatch { .. } | TrainerError::DanglingChild { .. }
        )
    }
}

pub type TrainerResult<T> = Result<T, TrainerError>;
