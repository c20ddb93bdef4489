//! Move and attack generation
//!
//! Every piece walks each direction of its movement template outward, up to
//! its range, and stops at the first occupied square. Three sets come out of
//! one walk:
//!
//! - **legal moves**: the empty squares before the blocker
//! - **captures**: the blocker itself, if it belongs to the opponent
//! - **defended squares**: every square walked over, blocker included, no
//!   matter who owns it
//!
//! Pawns are the exception to the shared template: they push forward (two
//! squares from their start rank) and capture diagonally forward, so only
//! the diagonals count as defended.
//!
//! A pinned piece only walks the directions along its pin axis for moves and
//! captures. Defended squares ignore pins: a pinned piece still guards the
//! squares around it as far as the enemy king is concerned.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::coord::Coord;
use crate::error::RulesResult;
use crate::piece::{pawn_capture_directions, pawn_push_direction, Piece, PieceKind};

/// Squares reached by one piece this turn
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reach {
    pub legal_moves: BTreeSet<Coord>,
    pub captures: BTreeSet<Coord>,
    pub defended_squares: BTreeSet<Coord>,
}

/// On-board squares along `direction`, nearest first, at most `range` steps
pub fn ray(from: Coord, direction: Coord, range: i8) -> impl Iterator<Item = Coord> {
    (1..=range)
        .map(move |step| from + direction * step)
        .take_while(|coord| coord.on_board())
}

/// Compute the reach of a single piece on the current occupancy
pub fn piece_reach(board: &Board, piece: &Piece) -> Reach {
    match piece.kind {
        PieceKind::Pawn => pawn_reach(board, piece),
        _ => template_reach(board, piece),
    }
}

fn template_reach(board: &Board, piece: &Piece) -> Reach {
    let mut reach = Reach::default();

    for &direction in piece.kind.directions() {
        let movable = piece.may_move_along(direction);
        for coord in ray(piece.coord, direction, piece.kind.range()) {
            reach.defended_squares.insert(coord);
            match board.piece_at(coord) {
                None => {
                    if movable {
                        reach.legal_moves.insert(coord);
                    }
                }
                Some(other) => {
                    if movable && other.player != piece.player {
                        reach.captures.insert(coord);
                    }
                    break;
                }
            }
        }
    }

    reach
}

fn pawn_reach(board: &Board, piece: &Piece) -> Reach {
    let mut reach = Reach::default();

    let push = pawn_push_direction(piece.player);
    if piece.may_move_along(push) {
        let range = if !piece.has_moved && piece.coord.rank == piece.player.pawn_rank() {
            2
        } else {
            1
        };
        for coord in ray(piece.coord, push, range) {
            if !board.is_empty_at(coord) {
                break;
            }
            reach.legal_moves.insert(coord);
        }
    }

    for direction in pawn_capture_directions(piece.player) {
        let coord = piece.coord + direction;
        if !coord.on_board() {
            continue;
        }
        reach.defended_squares.insert(coord);
        if !piece.may_move_along(direction) {
            continue;
        }
        if let Some(other) = board.piece_at(coord) {
            if other.player != piece.player {
                reach.captures.insert(coord);
            }
        }
    }

    reach
}

/// Regenerate the reach of every piece on the board
///
/// Pins must already be recorded; per-turn sets are overwritten, not merged.
pub(crate) fn generate_all(board: &mut Board) -> RulesResult<()> {
    let reaches: Vec<_> = board
        .pieces()
        .map(|piece| (piece.id, piece_reach(board, piece)))
        .collect();

    for (id, reach) in reaches {
        let piece = board.piece_mut(id)?;
        piece.legal_moves = reach.legal_moves;
        piece.captures = reach.captures;
        piece.defended_squares = reach.defended_squares;
    }
    Ok(())
}
