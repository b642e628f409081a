//! DuelChess - Game State Module
//!
//! The game is the only mutable root of the engine: a board plus the side
//! to move. Every candidate move is tried on a throwaway copy of the board
//! and kept only if the mover's own king is safe afterwards; the live board
//! is touched solely by a successful [`Game::make_move`].
//!
//! Checkmate and stalemate are queries, not stored states. The engine keeps
//! accepting moves after either; ending the match is the caller's job.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::board::{Board, Move};
use crate::error::{MoveError, MoveResult, ParseError};
use crate::move_generator::attacks_king;
use crate::types::*;

/// Outcome of polling a side after a move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    /// True when the side has no legal move left
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        };
        write!(f, "{}", s)
    }
}

/// A match in progress
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Game {
    turn: Color,
    board: Board,
}

impl Game {
    /// Standard opening layout, White to move
    pub fn new() -> Self {
        Game {
            turn: Color::White,
            board: Board::new(),
        }
    }

    /// Resume from an arbitrary board with the given side to move
    pub fn with_board(board: Board, turn: Color) -> Self {
        Game { turn, board }
    }

    /// Build a game from a FEN-style string: piece placement, optionally
    /// followed by the side to move ("w" or "b", default White). Any further
    /// fields are ignored.
    pub fn from_fen(fen: &str) -> Result<Self, ParseError> {
        let mut parts = fen.split_whitespace();
        let placement = parts
            .next()
            .ok_or_else(|| ParseError::Placement("empty placement".to_string()))?;
        let board = Board::from_placement(placement)?;
        let turn = match parts.next() {
            Some(side) => side.parse()?,
            None => Color::White,
        };
        Ok(Game::with_board(board, turn))
    }

    /// Placement and side to move, in the form accepted by [`Game::from_fen`]
    pub fn to_fen(&self) -> String {
        let side = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!("{} {}", self.board.to_placement(), side)
    }

    /// Which side is to move
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Hand the move to a side explicitly (restoring a saved game, or a
    /// forfeited turn decided by the caller)
    pub fn set_turn(&mut self, color: Color) {
        self.turn = color;
    }

    /// Read-only view of the live board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the board wholesale
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    /// Legal moves for the piece on `pos`, or `None` if the square is empty.
    /// The piece's color need not match the side to move.
    pub fn valid_moves(&self, pos: Position) -> Option<Vec<Move>> {
        let piece = self.board.get(pos)?;
        let moves: Vec<Move> = piece
            .pseudo_legal_moves(&self.board, pos)
            .into_iter()
            .filter(|mv| !self.leaves_king_in_check(mv, piece.color))
            .collect();
        trace!(square = %pos, count = moves.len(), "valid moves");
        Some(moves)
    }

    /// Destination squares of [`Game::valid_moves`], deduplicated (the four
    /// promotion choices share one destination)
    pub fn targets(&self, pos: Position) -> Vec<Position> {
        let mut ends: Vec<Position> = self
            .valid_moves(pos)
            .unwrap_or_default()
            .into_iter()
            .map(|mv| mv.end)
            .collect();
        ends.sort();
        ends.dedup();
        ends
    }

    /// Every legal move available to `color`
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        self.board
            .pieces_of(color)
            .flat_map(|(pos, _)| self.valid_moves(pos).unwrap_or_default())
            .collect()
    }

    fn has_legal_move(&self, color: Color) -> bool {
        self.board.pieces_of(color).any(|(pos, piece)| {
            piece
                .pseudo_legal_moves(&self.board, pos)
                .iter()
                .any(|mv| !self.leaves_king_in_check(mv, color))
        })
    }

    /// True if a move from `start` to `end` must name a promotion kind:
    /// a pawn reaching its farthest rank
    pub fn needs_promotion(&self, start: Position, end: Position) -> bool {
        match self.board.get(start) {
            Some(piece) => {
                piece.kind == PieceKind::Pawn && end.rank() == piece.color.promotion_rank()
            }
            None => false,
        }
    }

    /// Try `mv` on a probe copy of the board and report whether `color`'s
    /// king is attacked afterwards. The live board is never touched.
    fn leaves_king_in_check(&self, mv: &Move, color: Color) -> bool {
        let mut probe = self.board.copy();
        probe.apply(mv);
        let exposed = attacks_king(&probe, color.opposite());
        if exposed {
            trace!(%mv, "rejected: exposes king");
        }
        exposed
    }

    /// Validate and play a move for the side to move. On any error the game
    /// is left exactly as it was.
    pub fn make_move(&mut self, mv: Move) -> MoveResult<()> {
        let result = self.check_move(&mv);
        if let Err(ref err) = result {
            debug!(%mv, %err, "move rejected");
            return result;
        }

        let captured = self.board.apply(&mv);
        debug!(
            %mv,
            side = %self.turn,
            captured = ?captured.map(|p| p.kind),
            "move played"
        );
        self.turn = self.turn.opposite();
        Ok(())
    }

    fn check_move(&self, mv: &Move) -> MoveResult<()> {
        let piece = self
            .board
            .get(mv.start)
            .ok_or(MoveError::NoPieceAtStart { at: mv.start })?;

        if piece.color != self.turn {
            return Err(MoveError::WrongTurn {
                expected: self.turn,
                found: piece.color,
            });
        }

        if let Some(target) = self.board.get(mv.end) {
            if target.color == piece.color {
                return Err(MoveError::SelfCapture { at: mv.end });
            }
        }

        if !piece.pseudo_legal_moves(&self.board, mv.start).contains(mv) {
            return Err(MoveError::NotPseudoLegal { mv: *mv });
        }

        if self.leaves_king_in_check(mv, piece.color) {
            return Err(MoveError::LeavesKingInCheck { mv: *mv });
        }

        Ok(())
    }

    /// True iff some enemy piece's pseudo-legal move ends on `color`'s king
    pub fn is_in_check(&self, color: Color) -> bool {
        attacks_king(&self.board, color.opposite())
    }

    /// In check with no move that removes the check
    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// Not in check but without any legal move
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// Summarise `color`'s situation in one query
    pub fn status_of(&self, color: Color) -> GameStatus {
        let in_check = self.is_in_check(color);
        let can_move = self.has_legal_move(color);
        match (in_check, can_move) {
            (true, false) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check,
            (false, true) => GameStatus::Ongoing,
        }
    }

    /// Status of the side to move
    pub fn status(&self) -> GameStatus {
        self.status_of(self.turn)
    }

    /// Read a move in coordinate notation, e.g. "e2e4". A pawn move onto
    /// the last rank without a promotion letter becomes a queen promotion.
    pub fn parse_move(&self, text: &str) -> Result<Move, ParseError> {
        let mut mv: Move = text.parse()?;
        if mv.promotion.is_none() && self.needs_promotion(mv.start, mv.end) {
            mv.promotion = Some(PieceKind::Queen);
        }
        Ok(mv)
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.board)?;
        write!(f, "{} to move", self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    #[test]
    fn new_game_white_to_move() {
        let game = Game::new();
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn twenty_opening_moves() {
        let game = Game::new();
        assert_eq!(game.legal_moves(Color::White).len(), 20);
        assert_eq!(game.legal_moves(Color::Black).len(), 20);
    }

    #[test]
    fn valid_moves_on_empty_square_is_none() {
        assert_eq!(Game::new().valid_moves(sq("e4")), None);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // White king e1, white bishop e2 pinned by black rook e8
        let game = Game::from_fen("4r3/8/8/8/8/8/4B3/4K3 w").unwrap();
        assert_eq!(game.valid_moves(sq("e2")), Some(vec![]));
        assert_eq!(
            game.clone().make_move(mv("e2d3")),
            Err(MoveError::LeavesKingInCheck { mv: mv("e2d3") })
        );
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let game = Game::from_fen("8/8/8/8/8/8/3r4/K7 w").unwrap();
        let mut ends = game.targets(sq("a1"));
        ends.sort();
        assert_eq!(ends, vec![sq("b1")]);
    }

    #[test]
    fn error_order_and_board_untouched() {
        let mut game = Game::new();
        let before = game.clone();

        assert_eq!(
            game.make_move(mv("e4e5")),
            Err(MoveError::NoPieceAtStart { at: sq("e4") })
        );
        assert_eq!(
            game.make_move(mv("e7e5")),
            Err(MoveError::WrongTurn {
                expected: Color::White,
                found: Color::Black
            })
        );
        assert_eq!(
            game.make_move(mv("a1a2")),
            Err(MoveError::SelfCapture { at: sq("a2") })
        );
        assert_eq!(
            game.make_move(mv("e2e5")),
            Err(MoveError::NotPseudoLegal { mv: mv("e2e5") })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        let mut game = Game::from_fen("k7/4P3/8/8/8/8/8/K7 w").unwrap();
        game.make_move(mv("e7e8r")).unwrap();
        assert_eq!(
            game.board().get(sq("e8")),
            Some(Piece::new(Color::White, PieceKind::Rook))
        );
        assert!(game.board().is_empty(sq("e7")));
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn promotion_move_requires_a_kind() {
        let mut game = Game::from_fen("k7/4P3/8/8/8/8/8/K7 w").unwrap();
        assert_eq!(
            game.make_move(mv("e7e8")),
            Err(MoveError::NotPseudoLegal { mv: mv("e7e8") })
        );
        assert!(game.needs_promotion(sq("e7"), sq("e8")));
        assert!(!game.needs_promotion(sq("a1"), sq("a2")));
        assert_eq!(
            game.parse_move("e7e8").unwrap().promotion,
            Some(PieceKind::Queen)
        );
    }

    #[test]
    fn status_reports_checkmate() {
        // Back-rank mate: black rook a1 against white king g1 behind its pawns
        let game = Game::from_fen("6k1/8/8/8/8/8/5PPP/r5K1 w").unwrap();
        assert!(game.is_in_check(Color::White));
        assert!(game.is_in_checkmate(Color::White));
        assert!(!game.is_in_stalemate(Color::White));
        assert_eq!(game.status(), GameStatus::Checkmate);
        assert!(game.status().is_terminal());
    }

    #[test]
    fn fen_round_trip_keeps_side() {
        let game = Game::from_fen("8/8/8/8/8/8/8/K6k b").unwrap();
        assert_eq!(game.turn(), Color::Black);
        assert_eq!(game.to_fen(), "8/8/8/8/8/8/8/K6k b");
        assert!(Game::from_fen("8/8/8/8/8/8/8/K6k x").is_err());
    }
}
