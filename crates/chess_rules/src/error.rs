//! Error types for the rules engine
//!
//! Illegal intents (selecting an empty square, targeting a square that is not
//! a legal destination) are not errors: intents report them as `Ok(false)`.
//! The variants below are the two remaining classes, invariant violations
//! inside the engine and a promotion choice that was never supplied.

use thiserror::Error;

use crate::coord::Coord;
use crate::piece::{PieceId, PieceKind, Player};

/// Errors that can occur in the rules engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// No square stored at an on-board coordinate
    #[error("No square found at on-board coordinate {coord}")]
    MissingSquare { coord: Coord },

    /// A square or selection refers to a piece the board no longer owns
    #[error("Piece {id:?} is not on the board")]
    MissingPiece { id: PieceId },

    /// Analysis needs a king that is not on the board
    #[error("{player} has no king on the board")]
    MissingKing { player: Player },

    /// A king is in check but no attacking piece was identified
    #[error("{player} is in check with no recorded attackers")]
    CheckWithoutAttackers { player: Player },

    /// A square expected to hold a piece is empty
    #[error("Expected a piece on {coord}")]
    EmptySquare { coord: Coord },

    /// Board setup tried to place a piece on an occupied square
    #[error("Square {coord} is already occupied")]
    OccupiedSquare { coord: Coord },

    /// Board setup tried to place a piece outside the board
    #[error("Coordinate {coord} is off the board")]
    OffBoard { coord: Coord },

    /// The promotion callback declined to choose a piece
    #[error("Promotion at {at} was not answered")]
    PromotionUnanswered { at: Coord },

    /// The promotion callback chose a kind a pawn cannot become
    #[error("A pawn cannot promote to {kind:?}")]
    InvalidPromotion { kind: PieceKind },
}

/// Result type alias for rules engine operations
pub type RulesResult<T> = Result<T, RulesError>;
