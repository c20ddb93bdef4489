//! Board coordinates and topology
//!
//! A [`Coord`] is a plain `(rank, file)` integer pair. The same type is used
//! for on-board squares and for displacement vectors (ray directions, knight
//! jumps), so arithmetic never has to convert between two representations.
//!
//! Only coordinates with both components in `0..8` name a square; anything
//! else is a displacement or an off-board probe produced while walking a ray.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of ranks and files on the board
pub const BOARD_SIZE: i8 = 8;

/// Immutable `(rank, file)` pair
///
/// Rank 0 is White's back rank ("1"), file 0 is the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub rank: i8,
    pub file: i8,
}

impl Coord {
    /// Create a coordinate or displacement
    pub const fn new(rank: i8, file: i8) -> Self {
        Coord { rank, file }
    }

    /// Whether this coordinate names one of the 64 squares
    pub fn on_board(self) -> bool {
        (0..BOARD_SIZE).contains(&self.rank) && (0..BOARD_SIZE).contains(&self.file)
    }

    /// Reduce a displacement to a unit step
    ///
    /// Each nonzero component is divided by its absolute value, so `(3, -3)`
    /// becomes `(1, -1)` and `(0, 5)` becomes `(0, 1)`. Knight offsets reduce
    /// to a diagonal, which is why callers only use this on rook/bishop lines.
    ///
    /// Returns `None` for the zero vector, which has no direction.
    pub fn direction(self) -> Option<Coord> {
        if self.rank == 0 && self.file == 0 {
            return None;
        }
        Some(Coord::new(self.rank.signum(), self.file.signum()))
    }

    /// Whether `other` lies on the same rank, file or diagonal as `self`
    pub fn is_aligned_with(self, other: Coord) -> bool {
        let delta = other - self;
        delta != Coord::ORIGIN
            && (delta.rank == 0 || delta.file == 0 || delta.rank.abs() == delta.file.abs())
    }

    /// Squares strictly between two aligned coordinates
    ///
    /// Empty when the coordinates are adjacent or not aligned.
    pub fn between(self, other: Coord) -> Vec<Coord> {
        if !self.is_aligned_with(other) {
            return Vec::new();
        }
        let Some(step) = (other - self).direction() else {
            return Vec::new();
        };
        let mut squares = Vec::new();
        let mut cursor = self + step;
        while cursor != other {
            squares.push(cursor);
            cursor = cursor + step;
        }
        squares
    }

    /// Rank label, `'1'..='8'`
    pub fn rank_char(self) -> char {
        (b'1' + self.rank as u8) as char
    }

    /// File label, `'a'..='h'`
    pub fn file_char(self) -> char {
        (b'a' + self.file as u8) as char
    }

    /// Board index `rank * 8 + file`, only meaningful on-board
    pub(crate) fn index(self) -> usize {
        (self.rank as usize) * BOARD_SIZE as usize + self.file as usize
    }

    /// Iterate over all 64 squares, rank-major
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Coord::new(rank, file)))
    }

    pub const ORIGIN: Coord = Coord::new(0, 0);
}

/// Parse a file label (`'a'..='h'`)
pub fn file_from_char(c: char) -> Option<i8> {
    match c {
        'a'..='h' => Some((c as u8 - b'a') as i8),
        _ => None,
    }
}

/// Parse a rank label (`'1'..='8'`)
pub fn rank_from_char(c: char) -> Option<i8> {
    match c {
        '1'..='8' => Some((c as u8 - b'1') as i8),
        _ => None,
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.rank + rhs.rank, self.file + rhs.file)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.rank - rhs.rank, self.file - rhs.file)
    }
}

impl Neg for Coord {
    type Output = Coord;

    fn neg(self) -> Coord {
        Coord::new(-self.rank, -self.file)
    }
}

/// Scalar multiplication of both components
impl Mul<i8> for Coord {
    type Output = Coord;

    fn mul(self, rhs: i8) -> Coord {
        Coord::new(self.rank * rhs, self.file * rhs)
    }
}

/// Component-wise multiplication
impl Mul for Coord {
    type Output = Coord;

    fn mul(self, rhs: Coord) -> Coord {
        Coord::new(self.rank * rhs.rank, self.file * rhs.file)
    }
}

// Rank-major; only used to make scans deterministic.
impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.file.cmp(&other.file))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.on_board() {
            write!(f, "{}{}", self.file_char(), self.rank_char())
        } else {
            write!(f, "({}, {})", self.rank, self.file)
        }
    }
}

/// Error returned when algebraic square text cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid square: {0:?}")]
pub struct ParseCoordError(pub String);

impl FromStr for Coord {
    type Err = ParseCoordError;

    /// Parse algebraic text such as `"e4"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCoordError(s.to_string()));
        };
        match (file_from_char(file), rank_from_char(rank)) {
            (Some(file), Some(rank)) => Ok(Coord::new(rank, file)),
            _ => Err(ParseCoordError(s.to_string())),
        }
    }
}
