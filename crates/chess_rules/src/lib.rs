//! Chess rules engine
//!
//! A single in-process rules authority for one live two-player game. It knows
//! which moves are legal, tracks check, checkmate and stalemate, enforces
//! castling, en passant and promotion, and records disambiguated notation.
//! Rendering, input devices and menus are left to the host.
//!
//! # Module Organization
//!
//! - `coord` - Board coordinates and direction algebra
//! - `piece` - Piece kinds, movement templates, per-piece derived state
//! - `square` / `board` - Board ownership of squares and pieces
//! - `move_gen` - Legal moves, captures and defended squares per piece
//! - `analysis` - Pins, check, x-ray filtering, checkmate and stalemate
//! - `special` - Castling, en passant and promotion
//! - `turn` - The [`Game`] controller and its phase state machine
//! - `notation` - Committed [`GameMove`] records and their text
//! - `replay` - Playing notation text back through the controller
//! - `snapshot` - Read-only board views for presentation layers
//!
//! # Per-ply pipeline
//!
//! Every committed move is followed by one full [`analysis::analyze`] pass
//! for the side to move. All derived state is reset and rebuilt by that
//! pass; nothing derived survives from the previous ply.
//!
//! # Example
//!
//! ```
//! use chess_rules::{Coord, FixedPromotion, Game, PieceKind};
//!
//! let mut game = Game::new(FixedPromotion(PieceKind::Queen)).unwrap();
//! let e2: Coord = "e2".parse().unwrap();
//! let e4: Coord = "e4".parse().unwrap();
//! assert!(game.select(e2).unwrap());
//! assert!(game.move_to(e4).unwrap());
//! assert_eq!(game.move_history()[0].notation(), "e4");
//! ```

pub mod analysis;
pub mod board;
pub mod coord;
pub mod error;
pub mod move_gen;
pub mod notation;
pub mod piece;
pub mod promotion;
pub mod replay;
pub mod snapshot;
pub mod special;
pub mod square;
pub mod turn;

#[cfg(test)]
mod tests;

pub use board::{Board, TurnFlags};
pub use coord::{Coord, ParseCoordError};
pub use error::{RulesError, RulesResult};
pub use notation::GameMove;
pub use piece::{Piece, PieceId, PieceKind, Player};
pub use promotion::{FixedPromotion, PromotionChooser, PromotionRequest, Unanswered};
pub use replay::{play_notation, replay, MoveText, NotationError};
pub use snapshot::{BoardSnapshot, Destinations, PlacedPiece};
pub use special::CastleSide;
pub use square::Square;
pub use turn::{Game, GameResult, TurnPhase};
