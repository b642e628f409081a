//! DuelChess - Move Generator Module
//!
//! Pseudo-legal move generation: every move a piece's geometry allows,
//! honouring blockers and captures, but without asking whether the mover's
//! own king is left attacked. Legality filtering lives in [`crate::game`].

use crate::board::{Board, Move};
use crate::types::*;

/// Direction offsets (file, rank) for sliding pieces
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, 1), (1, 1), (1, -1), (-1, -1)];
const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (1, 1),
    (1, -1),
    (-1, -1),
];
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (-1, 2),
    (2, 1),
    (-2, 1),
    (2, -1),
    (-2, -1),
    (1, -2),
    (-1, -2),
];

impl Piece {
    /// Generate all pseudo-legal moves for this piece standing on `from`
    pub fn pseudo_legal_moves(&self, board: &Board, from: Position) -> Vec<Move> {
        let mut moves = Vec::with_capacity(28);

        match self.kind {
            PieceKind::King => {
                generate_step_moves(board, from, self.color, &KING_OFFSETS, &mut moves)
            }
            PieceKind::Knight => {
                generate_step_moves(board, from, self.color, &KNIGHT_OFFSETS, &mut moves)
            }
            PieceKind::Rook => {
                generate_sliding_moves(board, from, self.color, &ROOK_DIRECTIONS, &mut moves)
            }
            PieceKind::Bishop => {
                generate_sliding_moves(board, from, self.color, &BISHOP_DIRECTIONS, &mut moves)
            }
            PieceKind::Queen => {
                generate_sliding_moves(board, from, self.color, &ROOK_DIRECTIONS, &mut moves);
                generate_sliding_moves(board, from, self.color, &BISHOP_DIRECTIONS, &mut moves);
            }
            PieceKind::Pawn => generate_pawn_moves(board, from, self.color, &mut moves),
        }

        moves
    }
}

/// Pseudo-legal moves of whatever stands on `from`; empty for an empty square
pub fn pseudo_legal_moves_at(board: &Board, from: Position) -> Vec<Move> {
    match board.get(from) {
        Some(piece) => piece.pseudo_legal_moves(board, from),
        None => Vec::new(),
    }
}

/// True if a square may be entered by a piece of `color`: empty or enemy-held
#[inline]
fn can_land(board: &Board, to: Position, color: Color) -> bool {
    match board.get(to) {
        None => true,
        Some(target) => target.color != color,
    }
}

/// King and knight: single jumps to each in-bounds offset not held by a friend
fn generate_step_moves(
    board: &Board,
    from: Position,
    color: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        if let Some(to) = from.offset(df, dr) {
            if can_land(board, to, color) {
                moves.push(Move::new(from, to));
            }
        }
    }
}

/// Ray-walk for bishop, rook and queen. A friendly piece ends the ray
/// before its square; an enemy piece ends the ray on its square.
fn generate_sliding_moves(
    board: &Board,
    from: Position,
    color: Color,
    directions: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            match board.get(next) {
                None => moves.push(Move::new(from, next)),
                Some(target) if target.color != color => {
                    moves.push(Move::new(from, next));
                    break;
                }
                Some(_) => break,
            }
            current = next;
        }
    }
}

/// Pawn pushes and diagonal captures. Moves onto the farthest rank are
/// expanded into one move per promotion choice.
fn generate_pawn_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    let forward = color.forward();

    // Single push
    if let Some(one) = from.offset(0, forward) {
        if board.is_empty(one) {
            push_pawn_move(from, one, color, moves);

            // Double push from starting rank
            if from.rank() == color.pawn_start_rank() {
                if let Some(two) = one.offset(0, forward) {
                    if board.is_empty(two) {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    // Captures: only onto enemy-held squares
    for df in [-1, 1] {
        if let Some(to) = from.offset(df, forward) {
            if let Some(target) = board.get(to) {
                if target.color != color {
                    push_pawn_move(from, to, color, moves);
                }
            }
        }
    }
}

fn push_pawn_move(from: Position, to: Position, color: Color, moves: &mut Vec<Move>) {
    if to.rank() == color.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, kind));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

/// True if any piece of `by` has a pseudo-legal move ending on the other
/// side's king. Uses movement geometry only, so it never recurses into
/// legality filtering.
pub fn attacks_king(board: &Board, by: Color) -> bool {
    let victim = by.opposite();
    board.pieces_of(by).any(|(from, piece)| {
        piece
            .pseudo_legal_moves(board, from)
            .iter()
            .any(|mv| board.get(mv.end) == Some(Piece::new(victim, PieceKind::King)))
    })
}
