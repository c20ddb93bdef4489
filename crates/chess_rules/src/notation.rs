//! Move records and algebraic notation
//!
//! A [`GameMove`] is created once, when the controller commits a move, and is
//! never changed afterwards. Its text is composed from two pieces of board
//! state taken at different moments: the disambiguator is computed *before*
//! the move touches the board (it depends on the siblings' destinations in
//! the position the move was played from), the check suffix *after* the
//! opponent has been analyzed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::coord::Coord;
use crate::error::RulesResult;
use crate::piece::{PieceId, PieceKind, Player};
use crate::special::CastleSide;

/// A committed half-move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMove {
    pub player: Player,
    /// Kind of the moving piece before any promotion
    pub piece: PieceKind,
    pub piece_id: PieceId,
    pub from: Coord,
    pub to: Coord,
    pub promotion: Option<PieceKind>,
    pub captured: Option<PieceKind>,
    pub castle: Option<CastleSide>,
    pub en_passant: bool,
    pub check: bool,
    pub checkmate: bool,
    notation: String,
}

impl GameMove {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        player: Player,
        piece: PieceKind,
        piece_id: PieceId,
        from: Coord,
        to: Coord,
        disambiguator: String,
        promotion: Option<PieceKind>,
        captured: Option<PieceKind>,
        castle: Option<CastleSide>,
        en_passant: bool,
        check: bool,
        checkmate: bool,
    ) -> Self {
        let notation = compose(
            piece,
            &disambiguator,
            captured.is_some(),
            to,
            check,
            checkmate,
            promotion,
            castle,
        );
        GameMove {
            player,
            piece,
            piece_id,
            from,
            to,
            promotion,
            captured,
            castle,
            en_passant,
            check,
            checkmate,
            notation,
        }
    }

    /// Algebraic text, e.g. `Nbd7`, `exd6`, `Qh5+`, `e8Q`, `O-O`
    pub fn notation(&self) -> &str {
        &self.notation
    }
}

impl fmt::Display for GameMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation)
    }
}

/// Compose notation in a fixed order
///
/// Piece letter, disambiguator, capture marker, destination, check or mate
/// marker, promotion letter. A castle replaces the whole string.
#[allow(clippy::too_many_arguments)]
pub fn compose(
    piece: PieceKind,
    disambiguator: &str,
    capture: bool,
    to: Coord,
    check: bool,
    checkmate: bool,
    promotion: Option<PieceKind>,
    castle: Option<CastleSide>,
) -> String {
    if let Some(side) = castle {
        return side.notation().to_string();
    }

    let mut text = String::new();
    if let Some(letter) = piece.letter() {
        text.push(letter);
    }
    text.push_str(disambiguator);
    if capture {
        text.push('x');
    }
    text.push_str(&to.to_string());
    if checkmate {
        text.push('#');
    } else if check {
        text.push('+');
    }
    if let Some(letter) = promotion.and_then(PieceKind::letter) {
        text.push(letter);
    }
    text
}

/// Origin hint needed to tell `mover` apart from same-kind siblings
///
/// Must run on the position before the move is applied. Siblings are the
/// mover's own pieces of the same kind that could also reach `to`. A sibling
/// on the mover's file forces the rank; one on its rank forces the file; any
/// other sibling is resolved by file. Pawn captures always show their file.
pub fn disambiguator(board: &Board, mover: PieceId, to: Coord) -> RulesResult<String> {
    let piece = board.piece(mover)?;
    let from = piece.coord;

    if piece.kind == PieceKind::Pawn {
        let capture = to.file != from.file;
        return Ok(if capture {
            from.file_char().to_string()
        } else {
            String::new()
        });
    }

    let siblings: Vec<Coord> = board
        .pieces_of(piece.player)
        .filter(|p| p.id != mover && p.kind == piece.kind)
        .filter(|p| p.legal_moves.contains(&to) || p.captures.contains(&to))
        .map(|p| p.coord)
        .collect();
    if siblings.is_empty() {
        return Ok(String::new());
    }

    let same_file = siblings.iter().any(|c| c.file == from.file);
    let same_rank = siblings.iter().any(|c| c.rank == from.rank);

    let mut hint = String::new();
    if same_rank || !same_file {
        hint.push(from.file_char());
    }
    if same_file {
        hint.push(from.rank_char());
    }
    Ok(hint)
}
