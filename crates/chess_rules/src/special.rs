//! Castling, en passant and promotion
//!
//! Detection runs inside the analyzer pipeline for the side to move and
//! feeds the ordinary move sets: a legal castle shows up as the king's
//! two-square move in `legal_moves`, a legal en passant as the landing square
//! in the pawn's `captures`. Execution helpers apply the paired or indirect
//! board changes once the controller commits such a move.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::Board;
use crate::coord::Coord;
use crate::error::{RulesError, RulesResult};
use crate::piece::{pawn_capture_directions, EnPassant, PieceId, PieceKind, Player};

/// King file at the start of the game
pub const KING_FILE: i8 = 4;

/// Castling side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    /// King-side, rook three files from the king
    Short,
    /// Queen-side, rook four files from the king
    Long,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::Short, CastleSide::Long];

    /// Classify by king–rook file distance
    pub fn from_rook_distance(distance: i8) -> Option<CastleSide> {
        match distance.abs() {
            3 => Some(CastleSide::Short),
            4 => Some(CastleSide::Long),
            _ => None,
        }
    }

    pub fn rook_file(self) -> i8 {
        match self {
            CastleSide::Short => 7,
            CastleSide::Long => 0,
        }
    }

    pub fn king_to_file(self) -> i8 {
        match self {
            CastleSide::Short => 6,
            CastleSide::Long => 2,
        }
    }

    pub fn rook_to_file(self) -> i8 {
        match self {
            CastleSide::Short => 5,
            CastleSide::Long => 3,
        }
    }

    pub fn notation(self) -> &'static str {
        match self {
            CastleSide::Short => "O-O",
            CastleSide::Long => "O-O-O",
        }
    }

    /// Which castle a king move from `from` to `to` is, if any
    pub fn for_king_move(from: Coord, to: Coord) -> Option<CastleSide> {
        if from.rank != to.rank || from.file != KING_FILE {
            return None;
        }
        CastleSide::BOTH
            .into_iter()
            .find(|side| side.king_to_file() == to.file)
    }
}

/// Rook taking part in a castle on `side`, if castling there is currently legal
///
/// Checks every condition: unmoved king on its start square, unmoved rook,
/// empty squares between them, king not in check, and no square the king
/// crosses or lands on defended by the opponent.
pub fn castling_rook(board: &Board, player: Player, side: CastleSide) -> RulesResult<Option<PieceId>> {
    let king = board.king(player)?;
    let home = Coord::new(player.back_rank(), KING_FILE);
    if king.has_moved || king.coord != home {
        return Ok(None);
    }
    if board.square(home)?.is_defended_by(player.opponent()) {
        return Ok(None);
    }

    let rook_at = Coord::new(player.back_rank(), side.rook_file());
    let Some(rook) = board.piece_at(rook_at) else {
        return Ok(None);
    };
    if rook.kind != PieceKind::Rook || rook.player != player || rook.has_moved {
        return Ok(None);
    }
    if CastleSide::from_rook_distance(rook_at.file - home.file) != Some(side) {
        return Ok(None);
    }

    for coord in home.between(rook_at) {
        if !board.is_empty_at(coord) {
            return Ok(None);
        }
    }

    let king_to = Coord::new(player.back_rank(), side.king_to_file());
    let mut path = home.between(king_to);
    path.push(king_to);
    for coord in path {
        if board.square(coord)?.is_defended_by(player.opponent()) {
            return Ok(None);
        }
    }

    Ok(Some(rook.id))
}

/// Add legal castles to the king's moves of the side to move
pub(crate) fn add_castling(board: &mut Board, player: Player) -> RulesResult<()> {
    if board.flags.in_check {
        return Ok(());
    }
    let king_id = board.king(player)?.id;
    for side in CastleSide::BOTH {
        if castling_rook(board, player, side)?.is_some() {
            let king_to = Coord::new(player.back_rank(), side.king_to_file());
            debug!("[SPECIAL] {} may castle {}", player, side.notation());
            board.piece_mut(king_id)?.legal_moves.insert(king_to);
        }
    }
    Ok(())
}

/// Move king and rook for a castle
pub(crate) fn apply_castle(board: &mut Board, player: Player, side: CastleSide) -> RulesResult<()> {
    let king_id = board.king(player)?.id;
    let rook_at = Coord::new(player.back_rank(), side.rook_file());
    let rook_id = board
        .square(rook_at)?
        .occupant()
        .ok_or(RulesError::EmptySquare { coord: rook_at })?;

    board.relocate(king_id, Coord::new(player.back_rank(), side.king_to_file()))?;
    board.relocate(rook_id, Coord::new(player.back_rank(), side.rook_to_file()))?;
    Ok(())
}

/// Record en passant options for the pawns of the side to move
///
/// Only a pawn that double-stepped on the immediately preceding ply can be
/// taken, so the option expires by itself one ply later.
pub(crate) fn add_en_passant(board: &mut Board, player: Player) -> RulesResult<()> {
    let Some(last_ply) = board.ply.checked_sub(1) else {
        return Ok(());
    };

    let mut options = Vec::new();
    for pawn in board.pieces_of(player) {
        if pawn.kind != PieceKind::Pawn || pawn.coord.rank != player.en_passant_rank() {
            continue;
        }
        for direction in pawn_capture_directions(player) {
            if !pawn.may_move_along(direction) {
                continue;
            }
            let victim_at = pawn.coord + Coord::new(0, direction.file);
            let Some(victim) = board.piece_at(victim_at) else {
                continue;
            };
            if victim.kind != PieceKind::Pawn
                || victim.player == player
                || !victim.double_moved_on(last_ply)
            {
                continue;
            }
            let target = pawn.coord + direction;
            if !board.is_empty_at(target) || exposes_king_on_rank(board, pawn.id, victim.id)? {
                continue;
            }
            options.push((
                pawn.id,
                EnPassant {
                    target,
                    victim: victim.id,
                    victim_at,
                },
            ));
        }
    }

    for (id, option) in options {
        let pawn = board.piece_mut(id)?;
        pawn.captures.insert(option.target);
        pawn.en_passant = Some(option);
    }
    Ok(())
}

/// Whether removing both pawns of an en passant opens the king's rank
///
/// Ordinary pin detection misses this: two pieces stand between the king and
/// the slider, and both leave the rank at once.
fn exposes_king_on_rank(board: &Board, pawn: PieceId, victim: PieceId) -> RulesResult<bool> {
    let pawn = board.piece(pawn)?;
    let king = board.king(pawn.player)?;
    if king.coord.rank != pawn.coord.rank {
        return Ok(false);
    }

    let step = Coord::new(0, (pawn.coord.file - king.coord.file).signum());
    let mut cursor = king.coord + step;
    while cursor.on_board() {
        if let Some(other) = board.piece_at(cursor) {
            if other.id != pawn.id && other.id != victim {
                return Ok(other.player != pawn.player
                    && matches!(other.kind, PieceKind::Rook | PieceKind::Queen));
            }
        }
        cursor = cursor + step;
    }
    Ok(false)
}

/// Replace a pawn standing on its promotion square with a new piece
pub(crate) fn apply_promotion(board: &mut Board, pawn: PieceId, kind: PieceKind) -> RulesResult<PieceId> {
    if !kind.is_promotion_target() {
        return Err(RulesError::InvalidPromotion { kind });
    }
    let removed = board.remove(pawn)?;
    let id = board.place(kind, removed.player, removed.coord)?;
    board.mark_moved(id)?;
    Ok(id)
}
