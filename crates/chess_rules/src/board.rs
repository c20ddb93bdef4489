//! Board state
//!
//! The [`Board`] owns the 64 [`Square`]s and every live [`Piece`]. Captured
//! and promoted-away pieces are destroyed, not archived; only their kinds are
//! remembered for material display.
//!
//! Besides occupancy the board carries the per-ply outcome of the analyzer
//! ([`TurnFlags`]), the side to move, the controller phase and the
//! append-only move history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::{RulesError, RulesResult};
use crate::notation::GameMove;
use crate::piece::{Piece, PieceId, PieceKind, Player};
use crate::square::Square;
use crate::turn::TurnPhase;

/// Back-rank layout from the a-file to the h-file
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

/// Per-ply flags derived by the analyzer and by the move just played
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFlags {
    /// The side to move is in check
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    /// The last committed move captured a piece (en passant included)
    pub is_capture: bool,
    pub did_castle_short: bool,
    pub did_castle_long: bool,
}

impl TurnFlags {
    /// Reset the analyzer's share of the flags, keeping the last move's kind
    pub(crate) fn reset_analysis(&mut self) {
        self.in_check = false;
        self.checkmate = false;
        self.stalemate = false;
    }

    /// Reset the last move's kind before a new move is applied
    pub(crate) fn reset_move(&mut self) {
        self.is_capture = false;
        self.did_castle_short = false;
        self.did_castle_long = false;
    }
}

/// Owner of all squares and pieces of one game
#[derive(Debug, Clone)]
pub struct Board {
    squares: Vec<Square>,
    pieces: BTreeMap<PieceId, Piece>,
    next_id: u32,

    pub(crate) active_player: Player,
    pub(crate) phase: TurnPhase,
    pub(crate) flags: TurnFlags,
    /// Half-moves committed so far
    pub(crate) ply: u32,
    /// Pieces giving check to the side to move (per-turn)
    pub(crate) king_attackers: Vec<PieceId>,
    pub(crate) history: Vec<GameMove>,
    captured: BTreeMap<Player, Vec<PieceKind>>,
}

impl Board {
    /// A board with no pieces, White to move
    pub fn empty() -> Self {
        Board {
            squares: Coord::all().map(Square::new).collect(),
            pieces: BTreeMap::new(),
            next_id: 0,
            active_player: Player::White,
            phase: TurnPhase::Select,
            flags: TurnFlags::default(),
            ply: 0,
            king_attackers: Vec::new(),
            history: Vec::new(),
            captured: BTreeMap::new(),
        }
    }

    /// The standard starting position
    pub fn standard() -> RulesResult<Self> {
        let mut board = Board::empty();
        for player in [Player::White, Player::Black] {
            for file in 0..8 {
                board.place(PieceKind::Pawn, player, Coord::new(player.pawn_rank(), file))?;
            }
            for (file, kind) in BACK_RANK.iter().enumerate() {
                board.place(*kind, player, Coord::new(player.back_rank(), file as i8))?;
            }
        }
        Ok(board)
    }

    /// Put a new, unmoved piece on an empty square
    pub fn place(&mut self, kind: PieceKind, player: Player, coord: Coord) -> RulesResult<PieceId> {
        if !coord.on_board() {
            return Err(RulesError::OffBoard { coord });
        }
        if self.square(coord)?.occupant.is_some() {
            return Err(RulesError::OccupiedSquare { coord });
        }

        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(id, Piece::new(id, kind, player, coord));
        self.square_mut(coord)?.occupant = Some(id);
        Ok(id)
    }

    /// Flag a piece as having moved (drops castling rights, pawn double step)
    pub fn mark_moved(&mut self, id: PieceId) -> RulesResult<()> {
        self.piece_mut(id)?.has_moved = true;
        Ok(())
    }

    pub fn square(&self, coord: Coord) -> RulesResult<&Square> {
        if !coord.on_board() {
            return Err(RulesError::OffBoard { coord });
        }
        self.squares
            .get(coord.index())
            .ok_or(RulesError::MissingSquare { coord })
    }

    pub(crate) fn square_mut(&mut self, coord: Coord) -> RulesResult<&mut Square> {
        if !coord.on_board() {
            return Err(RulesError::OffBoard { coord });
        }
        self.squares
            .get_mut(coord.index())
            .ok_or(RulesError::MissingSquare { coord })
    }

    pub(crate) fn squares_mut(&mut self) -> impl Iterator<Item = &mut Square> {
        self.squares.iter_mut()
    }

    pub fn piece(&self, id: PieceId) -> RulesResult<&Piece> {
        self.pieces.get(&id).ok_or(RulesError::MissingPiece { id })
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> RulesResult<&mut Piece> {
        self.pieces.get_mut(&id).ok_or(RulesError::MissingPiece { id })
    }

    /// The piece standing on `coord`, if any
    ///
    /// Off-board coordinates simply hold nothing.
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        let id = self.square(coord).ok()?.occupant?;
        self.pieces.get(&id)
    }

    pub fn is_empty_at(&self, coord: Coord) -> bool {
        self.piece_at(coord).is_none()
    }

    /// All live pieces in identity order
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub(crate) fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> {
        self.pieces.values_mut()
    }

    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = &Piece> {
        self.pieces.values().filter(move |p| p.player == player)
    }

    pub(crate) fn piece_ids(&self) -> Vec<PieceId> {
        self.pieces.keys().copied().collect()
    }

    pub fn king(&self, player: Player) -> RulesResult<&Piece> {
        self.pieces
            .values()
            .find(|p| p.player == player && p.kind == PieceKind::King)
            .ok_or(RulesError::MissingKing { player })
    }

    pub fn active_player(&self) -> Player {
        self.active_player
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn flags(&self) -> TurnFlags {
        self.flags
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn history(&self) -> &[GameMove] {
        &self.history
    }

    /// Pieces giving check to the side to move
    pub fn king_attackers(&self) -> &[PieceId] {
        &self.king_attackers
    }

    /// Kinds of the opponent's pieces `player` has captured, in capture order
    pub fn captured_by(&self, player: Player) -> &[PieceKind] {
        self.captured.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move a piece to an empty square, keeping square caches in sync
    pub(crate) fn relocate(&mut self, id: PieceId, to: Coord) -> RulesResult<()> {
        if self.square(to)?.occupant.is_some() {
            return Err(RulesError::OccupiedSquare { coord: to });
        }
        let from = self.piece(id)?.coord;
        self.square_mut(from)?.occupant = None;
        self.square_mut(to)?.occupant = Some(id);

        let piece = self.piece_mut(id)?;
        piece.coord = to;
        piece.has_moved = true;
        Ok(())
    }

    /// Destroy a piece
    pub(crate) fn remove(&mut self, id: PieceId) -> RulesResult<Piece> {
        let piece = self.pieces.remove(&id).ok_or(RulesError::MissingPiece { id })?;
        let square = self.square_mut(piece.coord)?;
        if square.occupant == Some(id) {
            square.occupant = None;
        }
        Ok(piece)
    }

    /// Destroy a captured piece and credit its kind to the capturer
    pub(crate) fn capture(&mut self, victim: PieceId) -> RulesResult<PieceKind> {
        let piece = self.remove(victim)?;
        self.captured
            .entry(piece.player.opponent())
            .or_default()
            .push(piece.kind);
        Ok(piece.kind)
    }
}
