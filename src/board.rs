//! DuelChess - Board Representation Module
//!
//! This module provides the board container and the move value type.
//! The board is a plain 8x8 array of optional pieces: it places, removes
//! and looks pieces up, but knows nothing about which moves are legal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::types::*;

/// Piece placement of the standard opening position
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Officers on the back rank, files a..h
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Represents a chess move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: Position,
    pub end: Position,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Create a new move
    pub fn new(start: Position, end: Position) -> Self {
        Move {
            start,
            end,
            promotion: None,
        }
    }

    /// Create a promotion move
    pub fn with_promotion(start: Position, end: Position, promotion: PieceKind) -> Self {
        Move {
            start,
            end,
            promotion: Some(promotion),
        }
    }
}

/// Coordinate notation: "e2e4", "e7e8q"
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
            return Err(ParseError::Move(s.to_string()));
        }

        let start: Position = s[0..2].parse()?;
        let end: Position = s[2..4].parse()?;

        match s[4..].chars().next() {
            None => Ok(Move::new(start, end)),
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind) if kind.is_promotion_choice() => {
                    Ok(Move::with_promotion(start, end, kind))
                }
                _ => Err(ParseError::Promotion(c)),
            },
        }
    }
}

/// Chess board representation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Cells indexed by `[rank - 1][file - 1]`
    squares: [[Option<Piece>; 8]; 8],
}

impl Board {
    /// Create a board with the starting position
    pub fn new() -> Self {
        let mut board = Board::empty();
        board.reset_to_start();
        board
    }

    /// Create a board with no pieces on it
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    #[inline]
    fn cell(&self, pos: Position) -> &Option<Piece> {
        &self.squares[(pos.rank() - 1) as usize][(pos.file() - 1) as usize]
    }

    #[inline]
    fn cell_mut(&mut self, pos: Position) -> &mut Option<Piece> {
        &mut self.squares[(pos.rank() - 1) as usize][(pos.file() - 1) as usize]
    }

    /// Put a piece on a square, replacing whatever was there
    pub fn place(&mut self, pos: Position, piece: Piece) {
        *self.cell_mut(pos) = Some(piece);
    }

    /// Empty a square, returning the piece that stood on it
    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.cell_mut(pos).take()
    }

    /// The piece on a square, if any
    #[inline]
    pub fn get(&self, pos: Position) -> Option<Piece> {
        *self.cell(pos)
    }

    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.cell(pos).is_none()
    }

    /// Clear the board and set up the standard opening layout
    pub fn reset_to_start(&mut self) {
        self.squares = [[None; 8]; 8];

        for color in [Color::White, Color::Black] {
            let back = color.back_rank();
            let pawns = color.pawn_start_rank();
            for (i, &kind) in BACK_RANK.iter().enumerate() {
                let file = (i + 1) as u8;
                self.place(Position::new(file, back), Piece::new(color, kind));
                self.place(
                    Position::new(file, pawns),
                    Piece::new(color, PieceKind::Pawn),
                );
            }
        }
    }

    /// Create an independent copy of the board
    pub fn copy(&self) -> Self {
        *self
    }

    /// Every occupied square with its piece, rank 1 first
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| self.get(pos).map(|piece| (pos, piece)))
    }

    /// Occupied squares belonging to one side
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// First square (rank 1 first) holding a piece equal to `piece`.
    /// Pieces are values, so this matches by color and kind.
    pub fn position_of(&self, piece: Piece) -> Option<Position> {
        self.pieces()
            .find(|&(_, p)| p == piece)
            .map(|(pos, _)| pos)
    }

    /// Find the king's square for the specified color
    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.position_of(Piece::new(color, PieceKind::King))
    }

    /// Execute a move on the board without any rule checks: empty the start
    /// square and place the (possibly promoted) piece on the end square.
    /// Returns the captured piece, if any.
    pub fn apply(&mut self, mv: &Move) -> Option<Piece> {
        let piece = match self.remove(mv.start) {
            Some(piece) => piece,
            None => return None,
        };
        let landed = match mv.promotion {
            Some(kind) => piece.promoted(kind),
            None => piece,
        };
        let captured = self.remove(mv.end);
        self.place(mv.end, landed);
        captured
    }

    /// Create a board from a FEN piece-placement field
    /// (e.g. "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").
    /// Anything after the first whitespace is ignored.
    pub fn from_placement(placement: &str) -> Result<Self, ParseError> {
        let field = placement
            .split_whitespace()
            .next()
            .ok_or_else(|| ParseError::Placement("empty placement".to_string()))?;

        let rows: Vec<&str> = field.split('/').collect();
        if rows.len() != 8 {
            return Err(ParseError::Placement(format!(
                "expected 8 ranks, found {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();

        // Ranks are listed from 8 down to 1
        for (i, row) in rows.iter().enumerate() {
            let rank = 8 - i as u8;
            let mut file = 1u8;

            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(ParseError::Placement(format!(
                            "bad empty-run {:?} on rank {}",
                            c, rank
                        )));
                    }
                    file += skip as u8;
                } else if let Some(piece) = Piece::from_fen(c) {
                    if file > 8 {
                        return Err(ParseError::Placement(format!("rank {} overflows", rank)));
                    }
                    board.place(Position::new(file, rank), piece);
                    file += 1;
                } else {
                    return Err(ParseError::Placement(format!(
                        "unknown piece {:?} on rank {}",
                        c, rank
                    )));
                }

                if file > 9 {
                    return Err(ParseError::Placement(format!("rank {} overflows", rank)));
                }
            }

            if file != 9 {
                return Err(ParseError::Placement(format!(
                    "rank {} has {} files",
                    rank,
                    file - 1
                )));
            }
        }

        Ok(board)
    }

    /// Generate the FEN piece-placement field for this board
    pub fn to_placement(&self) -> String {
        let mut fen = String::new();

        for rank in (1..=8u8).rev() {
            let mut empty_count = 0;
            for file in 1..=8u8 {
                match self.get(Position::new(file, rank)) {
                    None => empty_count += 1,
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.to_fen());
                    }
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 1 {
                fen.push('/');
            }
        }

        fen
    }

    /// Draw the board as seen by `perspective`: White sees rank 8 at the
    /// top with files a..h, Black sees rank 1 at the top with files h..a.
    pub fn render(&self, perspective: Color) -> String {
        let (ranks, files): (Vec<u8>, Vec<u8>) = match perspective {
            Color::White => ((1..=8).rev().collect(), (1..=8).collect()),
            Color::Black => ((1..=8).collect(), (1..=8).rev().collect()),
        };

        let border = "  +---+---+---+---+---+---+---+---+".to_string();
        let mut lines = vec![border.clone()];

        for &rank in &ranks {
            let mut row = format!("{} |", rank);
            for &file in &files {
                match self.get(Position::new(file, rank)) {
                    Some(piece) => row.push_str(&format!(" {} |", piece.to_fen())),
                    None => row.push_str("   |"),
                }
            }
            lines.push(row);
            lines.push(border.clone());
        }

        let labels: Vec<String> = files
            .iter()
            .map(|&f| (FILE_NAMES[(f - 1) as usize] as char).to_string())
            .collect();
        lines.push(format!("    {}", labels.join("   ")));

        lines.join("\n")
    }

    /// Display the board from White's side
    pub fn display(&self) -> String {
        self.render(Color::White)
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn starting_layout() {
        let board = Board::new();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(
            board.get(sq("e1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            board.get(sq("d8")),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        assert_eq!(
            board.get(sq("h7")),
            Some(Piece::new(Color::Black, PieceKind::Pawn))
        );
        assert!(board.is_empty(sq("e4")));
        assert_eq!(board.to_placement(), STARTING_PLACEMENT);
    }

    #[test]
    fn reset_clears_previous_contents() {
        let mut board = Board::empty();
        board.place(sq("e4"), Piece::new(Color::Black, PieceKind::Queen));
        board.reset_to_start();
        assert!(board.is_empty(sq("e4")));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn place_remove_get() {
        let mut board = Board::empty();
        let rook = Piece::new(Color::White, PieceKind::Rook);
        board.place(sq("a1"), rook);
        assert_eq!(board.get(sq("a1")), Some(rook));
        assert_eq!(board.remove(sq("a1")), Some(rook));
        assert_eq!(board.get(sq("a1")), None);
        assert_eq!(board.remove(sq("a1")), None);
    }

    #[test]
    fn copy_is_independent() {
        let original = Board::new();
        let mut copy = original.copy();
        copy.remove(sq("e2"));
        assert!(copy.is_empty(sq("e2")));
        assert!(!original.is_empty(sq("e2")));
    }

    #[test]
    fn position_of_and_find_king() {
        let board = Board::new();
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        assert_eq!(
            board.position_of(Piece::new(Color::White, PieceKind::Rook)),
            Some(sq("a1"))
        );
        assert_eq!(Board::empty().find_king(Color::White), None);
    }

    #[test]
    fn apply_promotes_and_captures() {
        let mut board = Board::from_placement("3r4/4P3/8/8/8/8/8/8").unwrap();
        let captured = board.apply(&Move::with_promotion(sq("e7"), sq("d8"), PieceKind::Knight));
        assert_eq!(captured, Some(Piece::new(Color::Black, PieceKind::Rook)));
        assert_eq!(
            board.get(sq("d8")),
            Some(Piece::new(Color::White, PieceKind::Knight))
        );
        assert!(board.is_empty(sq("e7")));
    }

    #[test]
    fn placement_rejects_malformed_input() {
        assert!(Board::from_placement("8/8/8").is_err());
        assert!(Board::from_placement("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("ppppppppp/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("x7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_placement("").is_err());
    }

    #[test]
    fn move_notation() {
        let mv: Move = "e7e8q".parse().unwrap();
        assert_eq!(mv, Move::with_promotion(sq("e7"), sq("e8"), PieceKind::Queen));
        assert_eq!(mv.to_string(), "e7e8q");
        assert_eq!("e2e4".parse::<Move>().unwrap().to_string(), "e2e4");
        assert_eq!("e7e8k".parse::<Move>(), Err(ParseError::Promotion('k')));
        assert!("e2".parse::<Move>().is_err());
        assert!("e2e9".parse::<Move>().is_err());
    }

    #[test]
    fn render_flips_for_black() {
        let board = Board::new();
        let white = board.render(Color::White);
        let black = board.render(Color::Black);
        assert!(white.lines().nth(1).unwrap().starts_with("8 | r |"));
        assert!(black.lines().nth(1).unwrap().starts_with("1 | R |"));
        assert!(white.ends_with("a   b   c   d   e   f   g   h"));
        assert!(black.ends_with("h   g   f   e   d   c   b   a"));
    }
}
