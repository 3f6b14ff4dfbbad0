use std::error::Error;
use std::fmt;

use crate::game_state::game_state::GameState;

pub type MoveGenResult<T> = Result<T, MoveGenerationError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveGenerationError {
    InvalidState(String),
}

impl fmt::Display for MoveGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveGenerationError::InvalidState(msg) => write!(f, "invalid game state: {msg}"),
        }
    }
}

impl Error for MoveGenerationError {}

/// A legal move together with the position it leads to.
///
/// The search recurses into `game_after_move` and never mutates the parent
/// state, so unwinding a line is dropping the child.
#[derive(Debug, Clone)]
pub struct GeneratedMove {
    pub move_description: u64,
    pub game_after_move: GameState,
}
