use duel_chess::board::Board;
use duel_chess::game::Game;
use duel_chess::move_generator::pseudo_legal_moves_at;
use duel_chess::types::{Color, Piece, PieceKind, Position};
use duel_chess::Move;

fn sq(name: &str) -> Position {
    name.parse().unwrap()
}

fn board_with(pieces: &[(&str, Color, PieceKind)]) -> Board {
    let mut board = Board::empty();
    for &(name, color, kind) in pieces {
        board.place(sq(name), Piece::new(color, kind));
    }
    board
}

#[test]
fn opening_pawn_in_front_of_king() {
    let game = Game::new();
    let moves = game.valid_moves(Position::new(5, 2)).unwrap();
    let mut ends: Vec<Position> = moves.iter().map(|mv| mv.end).collect();
    ends.sort();
    assert_eq!(ends, vec![Position::new(5, 3), Position::new(5, 4)]);
    assert!(moves.iter().all(|mv| mv.start.file() == mv.end.file()));
}

#[test]
fn opening_nobody_in_check() {
    let game = Game::new();
    assert!(!game.is_in_check(Color::White));
    assert!(!game.is_in_check(Color::Black));
}

#[test]
fn rook_on_open_file_checks_king_with_escape() {
    let board = board_with(&[
        ("a1", Color::White, PieceKind::King),
        ("a8", Color::Black, PieceKind::Rook),
    ]);
    let game = Game::with_board(board, Color::White);
    assert!(game.is_in_check(Color::White));
    assert!(!game.is_in_checkmate(Color::White));
    assert!(!game.is_in_stalemate(Color::White));
    assert_eq!(game.targets(sq("a1")), vec![sq("b1"), sq("b2")]);
}

#[test]
fn cornered_king_is_stalemated() {
    let board = board_with(&[
        ("a8", Color::Black, PieceKind::King),
        ("b6", Color::White, PieceKind::King),
        ("c7", Color::White, PieceKind::Queen),
    ]);
    let game = Game::with_board(board, Color::Black);
    assert!(!game.is_in_check(Color::Black));
    assert!(game.is_in_stalemate(Color::Black));
    assert!(!game.is_in_checkmate(Color::Black));
    assert!(game.legal_moves(Color::Black).is_empty());
}

#[test]
fn ray_walk_never_passes_first_blocker() {
    let board =
        Board::from_placement("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R").unwrap();
    for (pos, piece) in board.pieces() {
        if !matches!(
            piece.kind,
            PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen
        ) {
            continue;
        }
        for mv in pseudo_legal_moves_at(&board, pos) {
            let df = (mv.end.file() as i8 - pos.file() as i8).signum();
            let dr = (mv.end.rank() as i8 - pos.rank() as i8).signum();
            let mut step = pos.offset(df, dr).unwrap();
            while step != mv.end {
                assert!(board.is_empty(step), "{} jumped over {}", mv, step);
                step = step.offset(df, dr).unwrap();
            }
        }
    }
}

#[test]
fn white_and_black_promotions_are_complete() {
    let game = Game::from_fen("k7/6P1/8/8/8/8/1p6/7K w").unwrap();

    for (from, to) in [("g7", "g8"), ("b2", "b1")] {
        let moves = game.valid_moves(sq(from)).unwrap();
        let mut kinds: Vec<PieceKind> = moves
            .iter()
            .filter(|mv| mv.end == sq(to))
            .map(|mv| mv.promotion.unwrap())
            .collect();
        kinds.sort_by_key(|k| k.letter());
        assert_eq!(
            kinds,
            vec![
                PieceKind::Bishop,
                PieceKind::Knight,
                PieceKind::Queen,
                PieceKind::Rook
            ]
        );
    }
}

#[test]
fn queries_do_not_mutate() {
    let game = Game::from_fen("4r3/8/8/8/8/8/4B3/4K3 w").unwrap();
    let before = game.clone();

    let first = game.valid_moves(sq("e1"));
    let second = game.valid_moves(sq("e1"));
    assert_eq!(first, second);

    for color in [Color::White, Color::Black] {
        assert_eq!(game.is_in_check(color), game.is_in_check(color));
        assert_eq!(game.is_in_checkmate(color), game.is_in_checkmate(color));
        assert_eq!(game.is_in_stalemate(color), game.is_in_stalemate(color));
    }
    assert_eq!(game, before);
}

#[test]
fn no_valid_move_leaves_own_king_attacked() {
    let positions = [
        "4r3/8/8/8/8/8/4B3/4K3 w",
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w",
        "r3k3/8/8/3q4/8/2N5/8/R3K3 w",
        "r3k3/8/8/3q4/8/2N5/8/R3K3 b",
    ];

    for fen in positions {
        let game = Game::from_fen(fen).unwrap();
        let side = game.turn();
        for mv in game.legal_moves(side) {
            let mut probe = game.board().copy();
            probe.apply(&mv);
            let after = Game::with_board(probe, side);
            assert!(!after.is_in_check(side), "{} in {} exposes the king", mv, fen);
        }
    }
}

#[test]
fn capture_move_is_emitted_once() {
    let board = board_with(&[
        ("d1", Color::White, PieceKind::Queen),
        ("d5", Color::Black, PieceKind::Pawn),
    ]);
    let moves = pseudo_legal_moves_at(&board, sq("d1"));
    let to_d5: Vec<&Move> = moves.iter().filter(|mv| mv.end == sq("d5")).collect();
    assert_eq!(to_d5.len(), 1);
    assert!(!moves.iter().any(|mv| mv.end == sq("d6")));
}
