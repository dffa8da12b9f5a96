//! Per-net architecture annotations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Architecture-specific net metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchNetInfo {
    /// Net is routed on the global clock network.
    pub is_global: bool,
}

impl fmt::Display for ArchNetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArchNetInfo(is_global={})", self.is_global)
    }
}
