//! Tile coordinates.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::{mkhash, StableHash};

/// A tile in the fabric grid.
///
/// Ordered lexicographically on `(x, y)`. Most fabric identifiers embed a
/// `Location` as their leading field, so this order also drives theirs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Location {
    /// Column.
    pub x: i16,
    /// Row.
    pub y: i16,
}

impl Location {
    /// Build a location from its coordinates.
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Vector sum, or `None` when either coordinate overflows.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(rhs.x)?,
            y: self.y.checked_add(rhs.y)?,
        })
    }

    /// Vector sum as a `Result`, for callers that report the failure.
    pub fn try_add(self, rhs: Self) -> Result<Self, CoreError> {
        self.checked_add(rhs).ok_or(CoreError::LocationOverflow {
            lhs_x: self.x,
            lhs_y: self.y,
            rhs_x: rhs.x,
            rhs_y: rhs.y,
        })
    }
}

/// # Panics
///
/// When a coordinate overflows `i16`, in every build profile. Use
/// [`Location::checked_add`] or [`Location::try_add`] for untrusted input.
#[allow(clippy::panic)]
impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("location overflow: {self} + {rhs}"))
    }
}

impl StableHash for Location {
    fn stable_hash(&self) -> u32 {
        mkhash(self.x.stable_hash(), self.y.stable_hash())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location(x={}, y={})", self.x, self.y)
    }
}
