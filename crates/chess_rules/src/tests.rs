//! Scenario tests for the rules engine
//!
//! Whole-game behaviour driven through [`Game`] intents and notation replay,
//! as opposed to the per-module unit tests.
//!
//! # Test Organization
//!
//! - `test_invariant_*` - Properties checked after every ply of real games
//! - `test_check_*` - Check, pins and multi-attacker filtering
//! - `test_castle_*` - Castling legality and execution
//! - `test_en_passant_*` - En passant, including one-ply expiry
//! - `test_promotion_*` - Promotion queries and the promoted piece
//! - `test_game_*` - Terminal states and notation round-trips

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::analysis::analyze;
use crate::board::Board;
use crate::coord::Coord;
use crate::piece::{PieceKind, Player};
use crate::promotion::{FixedPromotion, PromotionRequest, Unanswered};
use crate::replay::{play_notation, replay};
use crate::turn::{Game, GameResult, TurnPhase};

fn sq(s: &str) -> Coord {
    s.parse().unwrap()
}

fn squares(list: &[&str]) -> BTreeSet<Coord> {
    list.iter().map(|s| sq(s)).collect()
}

fn position(pieces: &[(PieceKind, Player, &str)], active: Player) -> Game {
    let mut board = Board::empty();
    for &(kind, player, at) in pieces {
        board.place(kind, player, sq(at)).unwrap();
    }
    Game::from_board(board, active, FixedPromotion(PieceKind::Queen)).unwrap()
}

fn play(game: &mut Game, from: &str, to: &str) {
    assert!(game.select(sq(from)).unwrap(), "cannot select {}", from);
    assert!(game.press(sq(to)).unwrap(), "{} -> {} rejected", from, to);
}

fn notations(game: &Game) -> Vec<String> {
    game.move_history()
        .iter()
        .map(|m| m.notation().to_string())
        .collect()
}

/// Properties every reachable position must satisfy
fn assert_invariants(game: &Game) {
    let board = game.board();
    let active = game.active_player();

    for piece in board.pieces_of(active) {
        for dest in piece.destinations() {
            if let Some(other) = board.piece_at(dest) {
                assert_ne!(
                    other.player, piece.player,
                    "{:?} on {} may land on its own piece at {}",
                    piece.kind, piece.coord, dest
                );
            }
            if piece.pinned {
                let direction = (dest - piece.coord).direction().unwrap();
                assert!(
                    piece.pinned_directions.contains(&direction),
                    "pinned {:?} on {} leaves its axis to {}",
                    piece.kind,
                    piece.coord,
                    dest
                );
            }
        }
    }

    let mut again = board.clone();
    analyze(&mut again, active).unwrap();
    assert_eq!(again.flags(), board.flags(), "flags change on re-analysis");
    for piece in board.pieces() {
        let twin = again.piece(piece.id).unwrap();
        assert_eq!(twin.destinations(), piece.destinations());
        assert_eq!(twin.defended_squares, piece.defended_squares);
        assert_eq!(twin.pinned_directions, piece.pinned_directions);
    }
}

/// Replay `moves` one at a time, checking invariants after every ply
fn replay_checked(moves: &[&str]) -> Game {
    let mut game = Game::new(Unanswered).unwrap();
    assert_invariants(&game);
    for text in moves {
        play_notation(&mut game, text).unwrap();
        assert_invariants(&game);
    }
    game
}

const LOYD_STALEMATE: [&str; 19] = [
    "e3", "a5", "Qh5", "Ra6", "Qxa5", "h5", "h4", "Rah6", "Qxc7", "f6", "Qxd7+", "Kf7", "Qxb7",
    "Qd3", "Qxb8", "Qh7", "Qxc8", "Kg6", "Qe6",
];

const FOOLS_MATE: [&str; 4] = ["f3", "e5", "g4", "Qh4#"];

const CASTLING_GAME: [&str; 14] = [
    "e4", "d5", "e5", "f5", "exf6", "Nxf6", "Nf3", "e6", "Bd3", "Bd6", "O-O", "O-O", "Re1", "Nc6",
];

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_invariant_hold_through_real_games() {
    //! Own-piece exclusion, pin-axis containment and analyzer idempotence
    //! are checked after every ply of several complete games.
    replay_checked(&LOYD_STALEMATE);
    replay_checked(&FOOLS_MATE);
    replay_checked(&CASTLING_GAME);
}

// ============================================================================
// Check & Pins
// ============================================================================

#[test]
fn test_check_queen_h5_restricts_black_king() {
    //! 1. e4 e5 2. Qh5: the queen's diagonal runs through f7 to e8
    let game = replay_checked(&["e4", "e5", "Qh5"]);
    let board = game.board();

    assert!(!game.is_in_check());
    let king = board.piece_at(sq("e8")).unwrap();
    assert_eq!(king.legal_moves, squares(&["e7"]));
    assert!(king.captures.is_empty());
    assert!(board.square(sq("f7")).unwrap().is_defended_by(Player::White));

    let f7 = board.piece_at(sq("f7")).unwrap();
    assert!(f7.pinned, "f7 stands between queen and king");
    assert!(f7.legal_moves.is_empty(), "pinned pawn cannot push");
}

#[test]
fn test_check_pinned_piece_stays_on_axis() {
    let game = position(
        &[
            (PieceKind::King, Player::White, "a1"),
            (PieceKind::Queen, Player::White, "c3"),
            (PieceKind::Bishop, Player::Black, "f6"),
            (PieceKind::Rook, Player::Black, "c8"),
            (PieceKind::King, Player::Black, "h8"),
        ],
        Player::White,
    );
    let board = game.board();

    let queen = board.piece_at(sq("c3")).unwrap();
    assert!(queen.pinned);
    assert_eq!(
        queen.destinations(),
        squares(&["b2", "d4", "e5", "f6"]),
        "queen keeps only the a1-h8 diagonal"
    );
    assert!(queen.captures.contains(&sq("f6")));
    assert!(!queen.legal_moves.contains(&sq("c4")));
    assert_invariants(&game);
}

#[test]
fn test_check_two_attackers_leave_only_the_king() {
    //! Knight jump from e5 to g7 uncovers the e1 rook: double check
    let mut game = position(
        &[
            (PieceKind::King, Player::White, "a1"),
            (PieceKind::Rook, Player::White, "e1"),
            (PieceKind::Knight, Player::White, "e5"),
            (PieceKind::King, Player::Black, "e8"),
            (PieceKind::Queen, Player::Black, "d7"),
            (PieceKind::Pawn, Player::Black, "a7"),
        ],
        Player::White,
    );
    play(&mut game, "e5", "g7");

    assert_eq!(game.move_history()[0].notation(), "Ng7+");
    let board = game.board();
    assert!(game.is_in_check());
    assert_eq!(board.king_attackers().len(), 2);

    for piece in board.pieces_of(Player::Black) {
        if piece.kind == PieceKind::King {
            assert!(piece.mobility() > 0);
        } else {
            assert!(piece.legal_moves.is_empty(), "{:?} may move", piece.kind);
            assert!(piece.captures.is_empty(), "{:?} may capture", piece.kind);
        }
    }
    assert!(game.select(sq("d7")).unwrap());
    assert!(game.selected_destinations().unwrap().is_empty());
}

#[test]
fn test_check_block_or_capture_only() {
    let game = replay_checked(&["e4", "f5", "Qh5+"]);
    let board = game.board();

    assert!(game.is_in_check());
    let g_pawn = board.piece_at(sq("g7")).unwrap();
    assert_eq!(g_pawn.legal_moves, squares(&["g6"]), "only the block");

    let knight = board.piece_at(sq("g8")).unwrap();
    assert!(knight.legal_moves.is_empty(), "Nf6 does not block h5-e8");
    assert!(board.square(sq("e8")).unwrap().king_checked());
}

// ============================================================================
// Castling
// ============================================================================

#[test]
fn test_castle_short() {
    let mut game = position(
        &[
            (PieceKind::King, Player::White, "e1"),
            (PieceKind::Rook, Player::White, "h1"),
            (PieceKind::King, Player::Black, "e8"),
        ],
        Player::White,
    );
    play(&mut game, "e1", "g1");

    let board = game.board();
    assert_eq!(board.piece_at(sq("g1")).unwrap().kind, PieceKind::King);
    assert_eq!(board.piece_at(sq("f1")).unwrap().kind, PieceKind::Rook);
    assert!(board.is_empty_at(sq("h1")));
    assert!(board.is_empty_at(sq("e1")));
    assert!(board.flags().did_castle_short);
    assert_eq!(game.move_history()[0].notation(), "O-O");
    assert!(!game.is_in_check());
}

#[test]
fn test_castle_long_notation() {
    let mut game = position(
        &[
            (PieceKind::King, Player::White, "e1"),
            (PieceKind::Rook, Player::White, "a1"),
            (PieceKind::King, Player::Black, "h8"),
        ],
        Player::White,
    );
    play(&mut game, "e1", "c1");

    let board = game.board();
    assert_eq!(board.piece_at(sq("c1")).unwrap().kind, PieceKind::King);
    assert_eq!(board.piece_at(sq("d1")).unwrap().kind, PieceKind::Rook);
    assert!(board.flags().did_castle_long);
    assert_eq!(game.move_history()[0].notation(), "O-O-O");
}

#[test]
fn test_castle_blocked_by_attacked_path_or_check() {
    let through_attack = position(
        &[
            (PieceKind::King, Player::White, "e1"),
            (PieceKind::Rook, Player::White, "h1"),
            (PieceKind::Rook, Player::Black, "f8"),
            (PieceKind::King, Player::Black, "a8"),
        ],
        Player::White,
    );
    let king = through_attack.board().piece_at(sq("e1")).unwrap();
    assert!(!king.legal_moves.contains(&sq("g1")), "f1 is attacked");

    let in_check = position(
        &[
            (PieceKind::King, Player::White, "e1"),
            (PieceKind::Rook, Player::White, "h1"),
            (PieceKind::Rook, Player::Black, "e8"),
            (PieceKind::King, Player::Black, "a8"),
        ],
        Player::White,
    );
    let king = in_check.board().piece_at(sq("e1")).unwrap();
    assert!(!king.legal_moves.contains(&sq("g1")), "no castling out of check");
}

#[test]
fn test_castle_lost_after_king_moves() {
    let game = replay_checked(&["e4", "e5", "Ke2", "Ke7", "Ke1", "Ke8", "Nf3", "Nf6", "Bc4", "Bc5"]);
    let king = game.board().piece_at(sq("e1")).unwrap();
    assert!(king.has_moved);
    assert!(!king.legal_moves.contains(&sq("g1")));
    assert!(king.legal_moves.contains(&sq("f1")));
}

// ============================================================================
// En Passant
// ============================================================================

fn en_passant_position() -> Game {
    position(
        &[
            (PieceKind::King, Player::White, "e1"),
            (PieceKind::Pawn, Player::White, "e5"),
            (PieceKind::King, Player::Black, "e8"),
            (PieceKind::Pawn, Player::Black, "d7"),
        ],
        Player::Black,
    )
}

#[test]
fn test_en_passant_capture() {
    let mut game = en_passant_position();
    play(&mut game, "d7", "d5");

    let pawn = game.board().piece_at(sq("e5")).unwrap();
    assert!(pawn.captures.contains(&sq("d6")));
    assert_eq!(pawn.en_passant.unwrap().victim_at, sq("d5"));

    assert!(game.select(sq("e5")).unwrap());
    assert!(game.attempt_en_passant(sq("d6")).unwrap());

    let board = game.board();
    assert_eq!(board.piece_at(sq("d6")).unwrap().kind, PieceKind::Pawn);
    assert!(board.is_empty_at(sq("d5")), "victim removed from its own square");
    assert!(board.is_empty_at(sq("e5")));
    assert!(board.flags().is_capture);
    assert_eq!(board.captured_by(Player::White), &[PieceKind::Pawn]);

    let record = &game.move_history()[1];
    assert!(record.en_passant);
    assert_eq!(record.notation(), "exd6");
}

#[test]
fn test_en_passant_expires_after_one_ply() {
    let mut game = en_passant_position();
    play(&mut game, "d7", "d5");
    play(&mut game, "e1", "e2");
    play(&mut game, "e8", "f8");

    let pawn = game.board().piece_at(sq("e5")).unwrap();
    assert!(pawn.en_passant.is_none());
    assert!(!pawn.captures.contains(&sq("d6")));

    assert!(game.select(sq("e5")).unwrap());
    assert!(!game.attempt_en_passant(sq("d6")).unwrap());
}

#[test]
fn test_en_passant_refused_when_rank_opens() {
    let mut game = position(
        &[
            (PieceKind::King, Player::White, "a5"),
            (PieceKind::Pawn, Player::White, "e5"),
            (PieceKind::Rook, Player::Black, "h5"),
            (PieceKind::King, Player::Black, "h8"),
            (PieceKind::Pawn, Player::Black, "d7"),
        ],
        Player::Black,
    );
    play(&mut game, "d7", "d5");

    let pawn = game.board().piece_at(sq("e5")).unwrap();
    assert!(pawn.en_passant.is_none());
    assert!(!pawn.captures.contains(&sq("d6")));
}

// ============================================================================
// Promotion
// ============================================================================

#[test]
fn test_promotion_by_capture_on_a8() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&requests);

    let mut board = Board::empty();
    board.place(PieceKind::King, Player::White, sq("e1")).unwrap();
    board.place(PieceKind::Pawn, Player::White, sq("b7")).unwrap();
    board.place(PieceKind::Rook, Player::Black, sq("a8")).unwrap();
    board.place(PieceKind::King, Player::Black, sq("h7")).unwrap();
    let mut game = Game::from_board(board, Player::White, move |request: &PromotionRequest| {
        log.borrow_mut().push(*request);
        Some(PieceKind::Queen)
    })
    .unwrap();

    play(&mut game, "b7", "a8");

    let requests = requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].from, sq("b7"));
    assert_eq!(requests[0].to, sq("a8"));
    assert!(requests[0].capture);

    let board = game.board();
    let queen = board.piece_at(sq("a8")).unwrap();
    assert_eq!((queen.kind, queen.player), (PieceKind::Queen, Player::White));
    assert!(queen.defended_squares.contains(&sq("h8")), "queen sweeps the back rank");
    assert!(queen.defended_squares.contains(&sq("a1")), "and the a-file");

    let king = board.piece_at(sq("h7")).unwrap();
    assert!(!king.legal_moves.contains(&sq("h8")));
    assert!(!king.legal_moves.contains(&sq("g8")));
    assert!(king.legal_moves.contains(&sq("g7")));

    let record = &game.move_history()[0];
    assert_eq!(record.promotion, Some(PieceKind::Queen));
    assert_eq!(record.captured, Some(PieceKind::Rook));
    assert_eq!(record.notation(), "bxa8Q");
}

#[test]
fn test_promotion_with_check_suffix_order() {
    let mut game = position(
        &[
            (PieceKind::King, Player::White, "a1"),
            (PieceKind::Pawn, Player::White, "e7"),
            (PieceKind::King, Player::Black, "h8"),
        ],
        Player::White,
    );
    play(&mut game, "e7", "e8");

    assert!(game.is_in_check());
    assert_eq!(game.move_history()[0].notation(), "e8+Q");
}

// ============================================================================
// Game Results & Notation Round-Trips
// ============================================================================

#[test]
fn test_game_fools_mate() {
    let game = replay(&FOOLS_MATE).unwrap();

    assert_eq!(game.game_result(), GameResult::Checkmate { winner: Player::Black });
    assert_eq!(game.phase(), TurnPhase::GameOver);
    assert_eq!(game.active_player(), Player::White, "the mated side stays to move");
    assert_eq!(notations(&game), FOOLS_MATE);
}

#[test]
fn test_game_loyd_stalemate() {
    let game = replay(&LOYD_STALEMATE).unwrap();

    assert_eq!(game.game_result(), GameResult::Stalemate);
    assert!(!game.is_in_check());
    assert_eq!(game.phase(), TurnPhase::GameOver);
    assert_eq!(notations(&game), LOYD_STALEMATE);
}

#[test]
fn test_game_round_trip_reproduces_board() {
    //! Notation recorded while playing by intents replays to the same board
    let mut game = Game::new(Unanswered).unwrap();
    for (from, to) in [
        ("e2", "e4"),
        ("d7", "d5"),
        ("e4", "e5"),
        ("f7", "f5"),
        ("e5", "f6"),
        ("g8", "f6"),
        ("g1", "f3"),
        ("e7", "e6"),
        ("f1", "d3"),
        ("f8", "d6"),
        ("e1", "g1"),
        ("e8", "g8"),
        ("f1", "e1"),
        ("b8", "c6"),
    ] {
        play(&mut game, from, to);
    }
    let recorded = notations(&game);
    assert_eq!(recorded, CASTLING_GAME);

    let replayed = replay(&recorded).unwrap();
    assert_eq!(replayed.snapshot(), game.snapshot());
    assert_eq!(replayed.game_result(), game.game_result());
    assert_eq!(notations(&replayed), recorded);
}

#[test]
fn test_game_disambiguated_round_trip() {
    let game = replay_checked(&["Nf3", "Nf6", "Nc3", "Nc6", "Nd4", "Nd5", "Ndb5", "Ndb4"]);
    let recorded = notations(&game);
    assert_eq!(recorded[6], "Ndb5");
    assert_eq!(recorded[7], "Ndb4");

    let replayed = replay(&recorded).unwrap();
    assert_eq!(replayed.snapshot(), game.snapshot());
}
