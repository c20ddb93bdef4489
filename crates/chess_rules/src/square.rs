//! Board squares
//!
//! A square never owns its occupant. It caches the occupant's [`PieceId`] so
//! "what stands here" is an O(1) lookup, while the [`crate::Board`] owns the
//! pieces themselves.

use std::collections::BTreeSet;

use crate::coord::Coord;
use crate::piece::{PieceId, Player};

/// One of the 64 board cells
#[derive(Debug, Clone)]
pub struct Square {
    coord: Coord,
    pub(crate) occupant: Option<PieceId>,

    /// Players with at least one piece attacking this square (per-turn)
    pub(crate) defended_by: BTreeSet<Player>,
    /// Set only while a king stands here in check (per-turn)
    pub(crate) king_checked: bool,
}

impl Square {
    pub(crate) fn new(coord: Coord) -> Self {
        Square {
            coord,
            occupant: None,
            defended_by: BTreeSet::new(),
            king_checked: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn occupant(&self) -> Option<PieceId> {
        self.occupant
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn is_defended_by(&self, player: Player) -> bool {
        self.defended_by.contains(&player)
    }

    pub fn king_checked(&self) -> bool {
        self.king_checked
    }

    pub(crate) fn reset_transient(&mut self) {
        self.defended_by.clear();
        self.king_checked = false;
    }
}
