//! DuelChess - Type definitions
//!
//! This module provides the value types shared by every other module:
//! colors, piece kinds, pieces and board coordinates, together with the
//! notation helpers used to read and print them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// File and rank names for coordinate notation
pub const FILE_NAMES: &[u8; 8] = b"abcdefgh";
pub const RANK_NAMES: &[u8; 8] = b"12345678";

/// Side of the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side
    #[inline]
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank delta of a one-step pawn advance
    #[inline]
    pub fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Rank from which pawns may advance two squares
    #[inline]
    pub fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Farthest rank, where pawns promote
    #[inline]
    pub fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }

    /// Rank holding this side's king and officers at the start
    #[inline]
    pub fn back_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            _ => Err(ParseError::Color(s.to_string())),
        }
    }
}

/// The six kinds of chess piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

impl PieceKind {
    /// Kinds a pawn may promote to, in the order moves are generated
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Lowercase letter used in move notation and FEN
    pub fn letter(self) -> char {
        match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Rook => 'r',
            PieceKind::Pawn => 'p',
        }
    }

    /// Inverse of [`PieceKind::letter`], case-insensitive
    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'k' => Some(PieceKind::King),
            'q' => Some(PieceKind::Queen),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            'r' => Some(PieceKind::Rook),
            'p' => Some(PieceKind::Pawn),
            _ => None,
        }
    }

    /// True for the kinds a pawn may become
    pub fn is_promotion_choice(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }
}

/// A piece is a color and a kind. It carries no position of its own;
/// the board it sits on supplies that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Piece { color, kind }
    }

    /// A new piece of the same color with a different kind
    pub fn promoted(self, kind: PieceKind) -> Piece {
        Piece::new(self.color, kind)
    }

    /// FEN character: uppercase for White, lowercase for Black
    pub fn to_fen(self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// FEN character to piece
    pub fn from_fen(c: char) -> Option<Piece> {
        let kind = PieceKind::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(color, kind))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// A square on the 8x8 board. Both coordinates are 1-based:
/// `file` is the column (1 = a), `rank` is the row (1 = White's back rank).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    file: u8,
    rank: u8,
}

/// Unchecked wire form of a [`Position`]; snapshots go through the bounds check
#[derive(Deserialize)]
struct RawPosition {
    file: i16,
    rank: i16,
}

impl TryFrom<RawPosition> for Position {
    type Error = ParseError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        let off_board = || ParseError::Square(format!("({}, {})", raw.file, raw.rank));
        let file = i8::try_from(raw.file).map_err(|_| off_board())?;
        let rank = i8::try_from(raw.rank).map_err(|_| off_board())?;
        Position::try_new(file, rank).ok_or_else(off_board)
    }
}

impl Position {
    /// Create a position from coordinates known to be in 1..=8.
    ///
    /// Panics on out-of-range input; use [`Position::try_new`] for anything
    /// that did not come from the board itself.
    pub fn new(file: u8, rank: u8) -> Self {
        assert!(
            Self::in_bounds(file as i8, rank as i8),
            "position ({}, {}) is off the board",
            file,
            rank
        );
        Position { file, rank }
    }

    /// Checked constructor for derived or untrusted coordinates
    #[inline]
    pub fn try_new(file: i8, rank: i8) -> Option<Self> {
        if Self::in_bounds(file, rank) {
            Some(Position {
                file: file as u8,
                rank: rank as u8,
            })
        } else {
            None
        }
    }

    /// The one bounds predicate: both axes in 1..=8
    #[inline]
    pub fn in_bounds(file: i8, rank: i8) -> bool {
        (1..=8).contains(&file) && (1..=8).contains(&rank)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.file
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// The square `df` files and `dr` ranks away, if it is on the board
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Position> {
        Self::try_new(self.file as i8 + df, self.rank as i8 + dr)
    }

    /// All 64 squares, rank 1 first, files a..h within a rank
    pub fn all() -> impl Iterator<Item = Position> {
        (1..=8u8).flat_map(|rank| (1..=8u8).map(move |file| Position { file, rank }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            FILE_NAMES[(self.file - 1) as usize] as char,
            RANK_NAMES[(self.rank - 1) as usize] as char
        )
    }
}

/// Algebraic square name (e.g. "e4") to position
impl FromStr for Position {
    type Err = ParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::Square(name.to_string()));
        }

        let file = match bytes[0].to_ascii_lowercase() {
            c @ b'a'..=b'h' => (c - b'a' + 1) as i8,
            _ => return Err(ParseError::Square(name.to_string())),
        };
        let rank = match bytes[1] {
            c @ b'1'..=b'8' => (c - b'1' + 1) as i8,
            _ => return Err(ParseError::Square(name.to_string())),
        };

        Position::try_new(file, rank).ok_or_else(|| ParseError::Square(name.to_string()))
    }
}
