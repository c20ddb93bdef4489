//! Check and pin analysis
//!
//! [`analyze`] rebuilds every derived field of the board for one side to
//! move. It is the only writer of per-turn state and it resets all of it
//! first, so running it twice on the same position gives the same result.
//!
//! # Pipeline
//!
//! 1. Reset all per-turn square and piece fields and the analyzer flags.
//! 2. Pin detection. Pins depend on occupancy only, so they are recorded
//!    before generation and restrict the pinned pieces' moves and captures.
//! 3. Move/attack generation for every piece ([`crate::move_gen`]).
//! 4. Defended-square aggregation into each square's `defended_by`.
//! 5. En passant options for the side to move.
//! 6. Check detection: attackers of the side-to-move king.
//! 7. King safety: no self-check squares, no squares behind the king on a
//!    checking slider's ray.
//! 8. Check-restricted legality for every other piece of the side to move.
//! 9. Castling for the side to move.
//! 10. Checkmate / stalemate when the side to move has nothing left.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::board::Board;
use crate::coord::Coord;
use crate::error::{RulesError, RulesResult};
use crate::move_gen::{generate_all, ray};
use crate::piece::{PieceId, PieceKind, Player, SLIDE_RANGE};
use crate::special::{add_castling, add_en_passant};

/// Rebuild all per-turn state for `side_to_move`
pub fn analyze(board: &mut Board, side_to_move: Player) -> RulesResult<()> {
    reset_transient(board);
    detect_pins(board)?;
    generate_all(board)?;
    aggregate_defended(board)?;
    add_en_passant(board, side_to_move)?;
    detect_check(board, side_to_move)?;
    restrict_king(board, side_to_move)?;
    restrict_to_check(board, side_to_move)?;
    add_castling(board, side_to_move)?;
    detect_terminal(board, side_to_move)?;
    Ok(())
}

fn reset_transient(board: &mut Board) {
    for square in board.squares_mut() {
        square.reset_transient();
    }
    for piece in board.pieces_mut() {
        piece.reset_transient();
    }
    board.flags.reset_analysis();
    board.king_attackers.clear();
}

/// Pins found by ray-casting from `slider` in every direction
///
/// Along each ray the first piece met must be an enemy of the slider; if the
/// next piece beyond it is that enemy's king, the first piece is pinned along
/// the ray's axis.
fn pins_from(board: &Board, slider: PieceId) -> RulesResult<Vec<(PieceId, Coord)>> {
    let slider = board.piece(slider)?;
    let mut pins = Vec::new();

    for &direction in slider.kind.directions() {
        let mut blocker = None;
        for coord in ray(slider.coord, direction, SLIDE_RANGE) {
            let Some(piece) = board.piece_at(coord) else {
                continue;
            };
            match blocker {
                None if piece.player == slider.player || piece.kind == PieceKind::King => break,
                None => blocker = Some(piece.id),
                Some(pinned) => {
                    if piece.player != slider.player && piece.kind == PieceKind::King {
                        pins.push((pinned, direction));
                    }
                    break;
                }
            }
        }
    }

    Ok(pins)
}

fn detect_pins(board: &mut Board) -> RulesResult<()> {
    let sliders: Vec<_> = board
        .pieces()
        .filter(|p| p.kind.is_slider())
        .map(|p| p.id)
        .collect();

    let mut pins = Vec::new();
    for slider in sliders {
        pins.extend(pins_from(board, slider)?);
    }

    for (id, direction) in pins {
        let piece = board.piece_mut(id)?;
        piece.pinned = true;
        piece.pinned_directions.insert(direction);
        piece.pinned_directions.insert(-direction);
        debug!("[ANALYZER] {:?} on {} is pinned", piece.kind, piece.coord);
    }
    Ok(())
}

fn aggregate_defended(board: &mut Board) -> RulesResult<()> {
    let defended: Vec<(Coord, Player)> = board
        .pieces()
        .flat_map(|p| p.defended_squares.iter().map(move |&c| (c, p.player)))
        .collect();

    for (coord, player) in defended {
        board.square_mut(coord)?.defended_by.insert(player);
    }
    Ok(())
}

fn detect_check(board: &mut Board, side_to_move: Player) -> RulesResult<()> {
    let king = board.king(side_to_move)?;
    let king_at = king.coord;
    if !board.square(king_at)?.is_defended_by(side_to_move.opponent()) {
        return Ok(());
    }

    let attackers: Vec<PieceId> = board
        .pieces_of(side_to_move.opponent())
        .filter(|p| p.defended_squares.contains(&king_at))
        .map(|p| p.id)
        .collect();
    if attackers.is_empty() {
        return Err(RulesError::CheckWithoutAttackers {
            player: side_to_move,
        });
    }

    debug!(
        "[ANALYZER] {} king on {} is in check from {} piece(s)",
        side_to_move,
        king_at,
        attackers.len()
    );
    board.flags.in_check = true;
    board.square_mut(king_at)?.king_checked = true;
    board.king_attackers = attackers;
    Ok(())
}

/// Remove self-check squares from the king's moves and captures
///
/// A square is unsafe when the opponent defends it, or when it lies one step
/// behind the king on the ray of a checking slider: the king itself blocks
/// that ray today, so the square does not show up as defended.
fn restrict_king(board: &mut Board, side_to_move: Player) -> RulesResult<()> {
    let king = board.king(side_to_move)?;
    let (king_id, king_at) = (king.id, king.coord);

    let mut unsafe_squares: BTreeSet<Coord> = king
        .legal_moves
        .iter()
        .chain(king.captures.iter())
        .copied()
        .filter(|&c| {
            board
                .square(c)
                .map(|s| s.is_defended_by(side_to_move.opponent()))
                .unwrap_or(true)
        })
        .collect();

    for &attacker in &board.king_attackers {
        let attacker = board.piece(attacker)?;
        if !attacker.kind.is_slider() {
            continue;
        }
        if let Some(direction) = (king_at - attacker.coord).direction() {
            let behind = king_at + direction;
            if behind.on_board() {
                unsafe_squares.insert(behind);
            }
        }
    }

    let king = board.piece_mut(king_id)?;
    king.legal_moves.retain(|c| !unsafe_squares.contains(c));
    king.captures.retain(|c| !unsafe_squares.contains(c));
    Ok(())
}

/// Limit every non-king piece of the side to move while in check
///
/// One attacker: quiet moves must land strictly between king and attacker
/// (impossible against knights and pawns), captures must take the attacker.
/// Two or more attackers: only the king may move.
fn restrict_to_check(board: &mut Board, side_to_move: Player) -> RulesResult<()> {
    if !board.flags.in_check {
        return Ok(());
    }

    let king_at = board.king(side_to_move)?.coord;
    let defenders: Vec<PieceId> = board
        .pieces_of(side_to_move)
        .filter(|p| p.kind != PieceKind::King)
        .map(|p| p.id)
        .collect();

    if board.king_attackers.len() > 1 {
        for id in defenders {
            let piece = board.piece_mut(id)?;
            piece.legal_moves.clear();
            piece.captures.clear();
            piece.en_passant = None;
        }
        return Ok(());
    }

    let attacker_id = board.king_attackers[0];
    let attacker = board.piece(attacker_id)?;
    let attacker_at = attacker.coord;
    let blocks: BTreeSet<Coord> = if attacker.kind.is_slider() {
        king_at.between(attacker_at).into_iter().collect()
    } else {
        BTreeSet::new()
    };

    for id in defenders {
        let piece = board.piece_mut(id)?;
        piece.legal_moves.retain(|c| blocks.contains(c));

        let en_passant = piece
            .en_passant
            .filter(|ep| ep.victim == attacker_id || blocks.contains(&ep.target));
        piece.captures.retain(|&c| {
            c == attacker_at || en_passant.is_some_and(|ep| ep.target == c)
        });
        piece.en_passant = en_passant;
    }
    Ok(())
}

fn detect_terminal(board: &mut Board, side_to_move: Player) -> RulesResult<()> {
    let mobility: usize = board.pieces_of(side_to_move).map(|p| p.mobility()).sum();
    if mobility > 0 {
        return Ok(());
    }

    if board.flags.in_check {
        board.flags.checkmate = true;
        info!("[ANALYZER] Checkmate: {} wins", side_to_move.opponent());
    } else {
        board.flags.stalemate = true;
        info!("[ANALYZER] Stalemate: {} has no legal move", side_to_move);
    }
    Ok(())
}
