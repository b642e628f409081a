//! Error types for the rules engine
//!
//! Every failure here is local and recoverable: the caller gets a typed
//! error and the game is left exactly as it was.

use thiserror::Error;

use crate::board::Move;
use crate::types::{Color, Position};

/// Reasons a move is refused by [`Game::make_move`](crate::game::Game::make_move)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The start square is empty
    #[error("no piece at {at}")]
    NoPieceAtStart { at: Position },

    /// The piece belongs to the side not on move
    #[error("not {found}'s turn, {expected} to move")]
    WrongTurn { expected: Color, found: Color },

    /// The destination holds a piece of the mover's own color
    #[error("cannot capture own piece at {at}")]
    SelfCapture { at: Position },

    /// The piece cannot reach the destination
    #[error("{mv} is not a move this piece can make")]
    NotPseudoLegal { mv: Move },

    /// The move would leave the mover's king attacked
    #[error("{mv} leaves the king in check")]
    LeavesKingInCheck { mv: Move },
}

/// Errors from reading squares, moves and board placements as text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid square: {0:?}")]
    Square(String),

    #[error("invalid move: {0:?}")]
    Move(String),

    #[error("invalid promotion piece: {0:?}")]
    Promotion(char),

    #[error("invalid placement: {0}")]
    Placement(String),

    #[error("invalid color: {0:?}")]
    Color(String),
}

/// Result type alias for move execution
pub type MoveResult<T> = Result<T, MoveError>;
