//! Read-only views for presentation layers

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, TurnFlags};
use crate::coord::{Coord, BOARD_SIZE};
use crate::piece::{Piece, PieceKind, Player};
use crate::turn::TurnPhase;

/// Legal destinations of one piece, split for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destinations {
    /// Empty squares, castling destinations included
    pub moves: BTreeSet<Coord>,
    /// Enemy-occupied squares plus an en passant landing square
    pub captures: BTreeSet<Coord>,
}

impl Destinations {
    pub fn of(piece: &Piece) -> Self {
        Destinations {
            moves: piece.legal_moves.clone(),
            captures: piece.captures.clone(),
        }
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.moves.contains(&coord) || self.captures.contains(&coord)
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.captures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len() + self.captures.len()
    }
}

/// A piece as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub kind: PieceKind,
    pub player: Player,
    pub coord: Coord,
}

impl PlacedPiece {
    /// Letter glyph: upper case for White, lower case for Black
    pub fn ascii(&self) -> char {
        let letter = self.kind.letter().unwrap_or('P');
        match self.player {
            Player::White => letter,
            Player::Black => letter.to_ascii_lowercase(),
        }
    }

    pub fn unicode(&self) -> char {
        match (self.player, self.kind) {
            (Player::White, PieceKind::King) => '♔',
            (Player::White, PieceKind::Queen) => '♕',
            (Player::White, PieceKind::Rook) => '♖',
            (Player::White, PieceKind::Bishop) => '♗',
            (Player::White, PieceKind::Knight) => '♘',
            (Player::White, PieceKind::Pawn) => '♙',
            (Player::Black, PieceKind::King) => '♚',
            (Player::Black, PieceKind::Queen) => '♛',
            (Player::Black, PieceKind::Rook) => '♜',
            (Player::Black, PieceKind::Bishop) => '♝',
            (Player::Black, PieceKind::Knight) => '♞',
            (Player::Black, PieceKind::Pawn) => '♟',
        }
    }
}

/// Occupancy and flags of the board at one moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Live pieces in rank-major order
    pub pieces: Vec<PlacedPiece>,
    pub active_player: Player,
    pub phase: TurnPhase,
    pub flags: TurnFlags,
    pub ply: u32,
}

impl BoardSnapshot {
    pub fn of(board: &Board) -> Self {
        let mut pieces: Vec<PlacedPiece> = board
            .pieces()
            .map(|p| PlacedPiece {
                kind: p.kind,
                player: p.player,
                coord: p.coord,
            })
            .collect();
        pieces.sort_by_key(|p| p.coord);

        BoardSnapshot {
            pieces,
            active_player: board.active_player(),
            phase: board.phase(),
            flags: board.flags(),
            ply: board.ply(),
        }
    }

    pub fn at(&self, coord: Coord) -> Option<&PlacedPiece> {
        self.pieces.iter().find(|p| p.coord == coord)
    }

    /// Text diagram, White at the bottom
    ///
    /// With `hints`, empty destinations show as `*` and capturable pieces
    /// are bracketed.
    pub fn render(&self, unicode: bool, hints: Option<&Destinations>) -> String {
        let mut out = String::new();
        for rank in (0..BOARD_SIZE).rev() {
            out.push_str(&format!("{} ", rank + 1));
            for file in 0..BOARD_SIZE {
                let coord = Coord::new(rank, file);
                let glyph = match self.at(coord) {
                    Some(piece) if unicode => piece.unicode(),
                    Some(piece) => piece.ascii(),
                    None if hints.is_some_and(|h| h.moves.contains(&coord)) => '*',
                    None => '.',
                };
                if hints.is_some_and(|h| h.captures.contains(&coord)) {
                    out.push('[');
                    out.push(glyph);
                    out.push(']');
                } else {
                    out.push(' ');
                    out.push(glyph);
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("  ");
        for file in 0..BOARD_SIZE {
            out.push(' ');
            out.push(Coord::new(0, file).file_char());
            out.push(' ');
        }
        out.push('\n');
        out
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false, None))
    }
}
