//! Promotion choice callback
//!
//! When a pawn move lands on the promotion rank the engine stops and asks a
//! [`PromotionChooser`] which piece to create. The query is synchronous: the
//! move is not applied until the chooser answers, and a chooser that returns
//! `None` aborts the move instead of falling back to a default piece.
//!
//! Interactive hosts prompt the user inside `choose`; test harnesses supply a
//! fixed answer with [`FixedPromotion`] or a closure.

use crate::coord::Coord;
use crate::piece::{PieceKind, Player};

/// Details of a pending promotion, handed to the chooser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionRequest {
    pub player: Player,
    pub from: Coord,
    pub to: Coord,
    /// Whether the promoting move is also a capture
    pub capture: bool,
}

/// Source of promotion choices
pub trait PromotionChooser {
    /// Pick the piece the pawn becomes, or `None` to decline the move
    fn choose(&mut self, request: &PromotionRequest) -> Option<PieceKind>;
}

impl<F> PromotionChooser for F
where
    F: FnMut(&PromotionRequest) -> Option<PieceKind>,
{
    fn choose(&mut self, request: &PromotionRequest) -> Option<PieceKind> {
        self(request)
    }
}

/// Always promotes to the same kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPromotion(pub PieceKind);

impl PromotionChooser for FixedPromotion {
    fn choose(&mut self, _request: &PromotionRequest) -> Option<PieceKind> {
        Some(self.0)
    }
}

/// Declines every promotion
///
/// Useful for hosts that replay moves and supply promotions out of band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unanswered;

impl PromotionChooser for Unanswered {
    fn choose(&mut self, _request: &PromotionRequest) -> Option<PieceKind> {
        None
    }
}
