//! Piece model
//!
//! Pieces are a closed set of kinds sharing one movement-template table
//! ([`PieceKind::directions`] and [`PieceKind::range`]). Per-kind special
//! cases live where they are used: pawn pushes and captures in
//! [`crate::move_gen`], castling and en passant in [`crate::special`].
//!
//! Besides its identity and location, every [`Piece`] carries derived sets
//! that are rebuilt wholesale on every half-move by the analyzer. Nothing in
//! those sets is allowed to survive from one ply into the next.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;

/// The two sides of the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Rank step of a forward pawn move
    pub fn forward(self) -> i8 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    /// Rank holding this player's king and rooks at the start
    pub fn back_rank(self) -> i8 {
        match self {
            Player::White => 0,
            Player::Black => 7,
        }
    }

    /// Rank this player's pawns start on (and may double-step from)
    pub fn pawn_rank(self) -> i8 {
        match self {
            Player::White => 1,
            Player::Black => 6,
        }
    }

    /// Rank on which this player's pawns promote
    pub fn promotion_rank(self) -> i8 {
        self.opponent().back_rank()
    }

    /// Rank a pawn must stand on to capture en passant
    pub fn en_passant_rank(self) -> i8 {
        match self {
            Player::White => 4,
            Player::Black => 3,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "White"),
            Player::Black => write!(f, "Black"),
        }
    }
}

/// Piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

const ORTHOGONAL: [Coord; 4] = [
    Coord::new(1, 0),
    Coord::new(0, 1),
    Coord::new(-1, 0),
    Coord::new(0, -1),
];

const DIAGONAL: [Coord; 4] = [
    Coord::new(1, 1),
    Coord::new(-1, 1),
    Coord::new(-1, -1),
    Coord::new(1, -1),
];

const ALL_LINES: [Coord; 8] = [
    Coord::new(1, 0),
    Coord::new(1, 1),
    Coord::new(0, 1),
    Coord::new(-1, 1),
    Coord::new(-1, 0),
    Coord::new(-1, -1),
    Coord::new(0, -1),
    Coord::new(1, -1),
];

const KNIGHT_JUMPS: [Coord; 8] = [
    Coord::new(2, 1),
    Coord::new(1, 2),
    Coord::new(-1, 2),
    Coord::new(-2, 1),
    Coord::new(-2, -1),
    Coord::new(-1, -2),
    Coord::new(1, -2),
    Coord::new(2, -1),
];

/// Maximum slide range of sliding pieces
pub const SLIDE_RANGE: i8 = 8;

impl PieceKind {
    /// Kinds a pawn may promote to
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Ray directions of the movement template
    ///
    /// Pawns are not described by this table: their push and capture
    /// directions depend on color, see [`pawn_push_direction`] and
    /// [`pawn_capture_directions`].
    pub fn directions(self) -> &'static [Coord] {
        match self {
            PieceKind::Pawn => &[],
            PieceKind::Knight => &KNIGHT_JUMPS,
            PieceKind::Bishop => &DIAGONAL,
            PieceKind::Rook => &ORTHOGONAL,
            PieceKind::Queen | PieceKind::King => &ALL_LINES,
        }
    }

    /// Maximum number of steps along one direction
    pub fn range(self) -> i8 {
        match self {
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => SLIDE_RANGE,
            PieceKind::Pawn | PieceKind::Knight | PieceKind::King => 1,
        }
    }

    /// Whether this kind slides (and can therefore pin, x-ray or be blocked)
    pub fn is_slider(self) -> bool {
        self.range() == SLIDE_RANGE
    }

    /// Notation letter; pawns have none
    pub fn letter(self) -> Option<char> {
        match self {
            PieceKind::Pawn => None,
            PieceKind::Knight => Some('N'),
            PieceKind::Bishop => Some('B'),
            PieceKind::Rook => Some('R'),
            PieceKind::Queen => Some('Q'),
            PieceKind::King => Some('K'),
        }
    }

    /// Inverse of [`PieceKind::letter`]
    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c {
            'N' => Some(PieceKind::Knight),
            'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook),
            'Q' => Some(PieceKind::Queen),
            'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Whether a pawn may promote to this kind
    pub fn is_promotion_target(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }
}

/// Forward step of a pawn of the given color
pub fn pawn_push_direction(player: Player) -> Coord {
    Coord::new(player.forward(), 0)
}

/// Diagonal-forward capture steps of a pawn of the given color
pub fn pawn_capture_directions(player: Player) -> [Coord; 2] {
    let forward = player.forward();
    [Coord::new(forward, -1), Coord::new(forward, 1)]
}

/// Stable identity of a piece for the whole game
///
/// Identities are never reused; a promoted piece gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// A pending en passant capture available to a pawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnPassant {
    /// Empty square the capturing pawn lands on
    pub target: Coord,
    /// The pawn that double-stepped and will be removed
    pub victim: PieceId,
    /// Where the victim currently stands
    pub victim_at: Coord,
}

/// A live piece on the board
#[derive(Debug, Clone)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub player: Player,
    pub coord: Coord,

    /// Kings and rooks lose castling rights once set; pawns lose the double step
    pub has_moved: bool,
    /// Ply on which this pawn double-stepped, if it ever did
    pub double_moved_at: Option<u32>,

    // Derived each half-move.
    pub legal_moves: BTreeSet<Coord>,
    pub captures: BTreeSet<Coord>,
    pub defended_squares: BTreeSet<Coord>,
    pub en_passant: Option<EnPassant>,
    pub pinned: bool,
    pub pinned_directions: BTreeSet<Coord>,
}

impl Piece {
    pub fn new(id: PieceId, kind: PieceKind, player: Player, coord: Coord) -> Self {
        Piece {
            id,
            kind,
            player,
            coord,
            has_moved: false,
            double_moved_at: None,
            legal_moves: BTreeSet::new(),
            captures: BTreeSet::new(),
            defended_squares: BTreeSet::new(),
            en_passant: None,
            pinned: false,
            pinned_directions: BTreeSet::new(),
        }
    }

    /// Clear every per-turn field
    pub fn reset_transient(&mut self) {
        self.legal_moves.clear();
        self.captures.clear();
        self.defended_squares.clear();
        self.en_passant = None;
        self.pinned = false;
        self.pinned_directions.clear();
    }

    /// Whether `direction` is usable this turn given the pin state
    pub fn may_move_along(&self, direction: Coord) -> bool {
        !self.pinned || self.pinned_directions.contains(&direction)
    }

    /// Whether this pawn's double step happened on the given ply
    pub fn double_moved_on(&self, ply: u32) -> bool {
        self.double_moved_at == Some(ply)
    }

    /// Legal destinations this turn, quiet moves and captures together
    pub fn destinations(&self) -> BTreeSet<Coord> {
        self.legal_moves.union(&self.captures).copied().collect()
    }

    /// Number of distinct legal actions available this turn
    pub fn mobility(&self) -> usize {
        self.legal_moves.len() + self.captures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates() {
        assert_eq!(PieceKind::Knight.directions().len(), 8);
        assert_eq!(PieceKind::Bishop.directions().len(), 4);
        assert_eq!(PieceKind::Rook.directions().len(), 4);
        assert_eq!(PieceKind::Queen.directions().len(), 8);
        assert_eq!(PieceKind::King.directions().len(), 8);

        assert!(PieceKind::Queen.is_slider());
        assert!(!PieceKind::King.is_slider());
        assert!(!PieceKind::Knight.is_slider());
    }

    #[test]
    fn test_pawn_directions_depend_on_color() {
        assert_eq!(pawn_push_direction(Player::White), Coord::new(1, 0));
        assert_eq!(pawn_push_direction(Player::Black), Coord::new(-1, 0));
        assert_eq!(
            pawn_capture_directions(Player::Black),
            [Coord::new(-1, -1), Coord::new(-1, 1)]
        );
    }

    #[test]
    fn test_player_ranks() {
        assert_eq!(Player::White.promotion_rank(), 7);
        assert_eq!(Player::Black.promotion_rank(), 0);
        assert_eq!(Player::White.opponent(), Player::Black);
    }

    #[test]
    fn test_letters_round_trip() {
        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
            PieceKind::King,
        ] {
            let letter = kind.letter().unwrap();
            assert_eq!(PieceKind::from_letter(letter), Some(kind));
        }
        assert_eq!(PieceKind::Pawn.letter(), None);
    }

    #[test]
    fn test_pin_restricts_directions() {
        let mut piece = Piece::new(PieceId(0), PieceKind::Rook, Player::White, Coord::new(0, 0));
        assert!(piece.may_move_along(Coord::new(0, 1)));

        piece.pinned = true;
        piece.pinned_directions.insert(Coord::new(1, 0));
        piece.pinned_directions.insert(Coord::new(-1, 0));
        assert!(piece.may_move_along(Coord::new(1, 0)));
        assert!(!piece.may_move_along(Coord::new(0, 1)));

        piece.reset_transient();
        assert!(!piece.pinned);
        assert!(piece.may_move_along(Coord::new(0, 1)));
    }
}
