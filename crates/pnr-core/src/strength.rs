//! Placement and routing strength.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hash::StableHash;

/// Priority tag on a placement or routing assignment.
///
/// The router compares strengths to decide whether a later request may rip
/// up an existing assignment, so the declaration order below is a contract:
/// `NONE < WEAK < STRONG < PLACER < FIXED < LOCKED < USER`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PlaceStrength {
    /// Unbound.
    #[default]
    None = 0,
    /// Tentative assignment.
    Weak = 1,
    /// Preferred assignment.
    Strong = 2,
    /// Set by the placer.
    Placer = 3,
    /// Fixed by a constraint.
    Fixed = 4,
    /// Locked by the flow.
    Locked = 5,
    /// Set by the user.
    User = 6,
}

impl PlaceStrength {
    /// Every strength, weakest first.
    pub const ALL: [PlaceStrength; 7] = [
        PlaceStrength::None,
        PlaceStrength::Weak,
        PlaceStrength::Strong,
        PlaceStrength::Placer,
        PlaceStrength::Fixed,
        PlaceStrength::Locked,
        PlaceStrength::User,
    ];

    /// Numeric rank; higher wins.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Upper-case name as seen by scripts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PlaceStrength::None => "NONE",
            PlaceStrength::Weak => "WEAK",
            PlaceStrength::Strong => "STRONG",
            PlaceStrength::Placer => "PLACER",
            PlaceStrength::Fixed => "FIXED",
            PlaceStrength::Locked => "LOCKED",
            PlaceStrength::User => "USER",
        }
    }

    /// Whether an assignment made with `self` may replace one made with `held`.
    #[must_use]
    pub fn overrides(self, held: PlaceStrength) -> bool {
        self >= held
    }
}

impl StableHash for PlaceStrength {
    fn stable_hash(&self) -> u32 {
        u32::from(self.rank())
    }
}

impl fmt::Display for PlaceStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlaceStrength {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strength| strength.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownName {
                kind: "PlaceStrength",
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_order_is_exact() {
        let names: Vec<_> = PlaceStrength::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["NONE", "WEAK", "STRONG", "PLACER", "FIXED", "LOCKED", "USER"]
        );
        for pair in PlaceStrength::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} must be below {}", pair[0], pair[1]);
            assert_eq!(pair[0].rank() + 1, pair[1].rank());
        }
    }

    #[test]
    fn overrides_follows_order() {
        assert!(PlaceStrength::Strong.overrides(PlaceStrength::Weak));
        assert!(PlaceStrength::Strong.overrides(PlaceStrength::Strong));
        assert!(!PlaceStrength::Placer.overrides(PlaceStrength::Fixed));
        assert!(PlaceStrength::User.overrides(PlaceStrength::Locked));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("locked".parse::<PlaceStrength>(), Ok(PlaceStrength::Locked));
        assert_eq!("USER".parse::<PlaceStrength>(), Ok(PlaceStrength::User));
        assert!("strongest".parse::<PlaceStrength>().is_err());
    }

    #[test]
    fn serde_uses_script_names() {
        let json = serde_json::to_string(&PlaceStrength::Placer).unwrap();
        assert_eq!(json, "\"PLACER\"");
    }
}
