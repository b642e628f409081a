//! DuelChess - chess rules engine
//!
//! The rules layer of a two-player remote chess service:
//! - Board and piece data model
//! - Pseudo-legal move generation for all six piece kinds
//! - Legality filtering against self-check on a probe copy of the board
//! - Check, checkmate and stalemate queries
//! - Perft and random playouts for validating the generator
//! - A line-mode console for driving a game by hand
//!
//! Castling, en passant and draw-by-rule are not part of this engine.

pub mod types;
pub mod error;
pub mod board;
pub mod move_generator;
pub mod game;
pub mod perft;
pub mod playout;
pub mod console;

pub use board::{Board, Move};
pub use error::{MoveError, ParseError};
pub use game::{Game, GameStatus};
pub use types::{Color, Piece, PieceKind, Position};
