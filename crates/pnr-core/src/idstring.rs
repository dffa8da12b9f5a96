//! Interned string handles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::StableHash;

/// Handle to a string interned by the architecture database.
///
/// Index 0 is the empty string.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct IdString {
    /// Index into the string table.
    pub index: i32,
}

impl IdString {
    /// Handle for table index `index`.
    #[must_use]
    pub const fn new(index: i32) -> Self {
        Self { index }
    }

    /// True for the empty string.
    #[must_use]
    pub const fn empty(self) -> bool {
        self.index == 0
    }

    /// Membership test against a list of handles.
    #[must_use]
    pub fn is_in(self, list: &[IdString]) -> bool {
        list.contains(&self)
    }
}

impl StableHash for IdString {
    fn stable_hash(&self) -> u32 {
        self.index.stable_hash()
    }
}

impl fmt::Display for IdString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdString(index={})", self.index)
    }
}
