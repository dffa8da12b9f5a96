//! Fabric identifiers.
//!
//! [`BelId`], [`WireId`] and [`PipId`] share a layout (`location` + `index`)
//! but are distinct types: the router keys wires and pips in separate maps and
//! mixing them up must not compile.
//!
//! The null value of each tile-indexed identifier has `index == -1`, which no
//! fabric database hands out, so a default-constructed id never collides with
//! the first element of tile (0, 0).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::{mkhash, StableHash};
use crate::idstring::IdString;
use crate::location::Location;
use crate::strength::PlaceStrength;

macro_rules! tile_indexed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name {
            /// Tile holding the resource.
            pub location: Location,
            /// Resource index within the tile.
            pub index: i16,
        }

        impl $name {
            /// Index carried by the null identifier.
            pub const NULL_INDEX: i16 = -1;

            /// Identifier for resource `index` in the tile at `location`.
            #[must_use]
            pub const fn new(location: Location, index: i16) -> Self {
                Self { location, index }
            }

            /// True for the default-constructed identifier.
            #[must_use]
            pub const fn is_null(&self) -> bool {
                self.index == Self::NULL_INDEX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    location: Location::default(),
                    index: Self::NULL_INDEX,
                }
            }
        }

        impl StableHash for $name {
            fn stable_hash(&self) -> u32 {
                mkhash(self.location.stable_hash(), self.index.stable_hash())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "(location={}, index={})"),
                    self.location, self.index
                )
            }
        }
    };
}

tile_indexed_id! {
    /// A placeable site (basic element) within a tile.
    BelId
}

tile_indexed_id! {
    /// A routing wire.
    WireId
}

tile_indexed_id! {
    /// A programmable interconnect point joining two wires.
    PipId
}

/// A pip that has been used to route a signal, tagged with the strength of
/// that assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipMapping {
    /// Pip identifier.
    pub pip: PipId,
    /// Binding strength.
    pub strength: PlaceStrength,
}

impl PipMapping {
    /// Pair `pip` with `strength`.
    #[must_use]
    pub const fn new(pip: PipId, strength: PlaceStrength) -> Self {
        Self { pip, strength }
    }

    /// Copy of this mapping with a different strength.
    #[must_use]
    pub const fn with_strength(self, strength: PlaceStrength) -> Self {
        Self {
            pip: self.pip,
            strength,
        }
    }
}

impl StableHash for PipMapping {
    fn stable_hash(&self) -> u32 {
        mkhash(self.pip.stable_hash(), self.strength.stable_hash())
    }
}

impl fmt::Display for PipMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PipMapping(pip={}, strength={})", self.pip, self.strength)
    }
}

/// A named pin on a bel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BelPin {
    /// Owning bel.
    pub bel: BelId,
    /// Pin name.
    pub pin: IdString,
}

impl BelPin {
    /// Pin `pin` of `bel`.
    #[must_use]
    pub const fn new(bel: BelId, pin: IdString) -> Self {
        Self { bel, pin }
    }
}

impl StableHash for BelPin {
    fn stable_hash(&self) -> u32 {
        mkhash(self.bel.stable_hash(), self.pin.stable_hash())
    }
}

impl fmt::Display for BelPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BelPin(bel={}, pin={})", self.bel, self.pin)
    }
}

/// Kind of a resource group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum GroupType {
    /// No group.
    #[default]
    None = 0,
    /// Switchbox of one tile.
    Switchbox = 1,
}

impl GroupType {
    /// Every value in declaration order.
    pub const ALL: [GroupType; 2] = [GroupType::None, GroupType::Switchbox];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            GroupType::None => "NONE",
            GroupType::Switchbox => "SWITCHBOX",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A logical grouping of resources, used for visualization and selection.
///
/// Groups live in sets, not sorted sequences, so there is no ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId {
    /// Group kind.
    #[serde(rename = "type")]
    pub group_type: GroupType,
    /// Tile of the group.
    pub location: Location,
}

impl GroupId {
    /// Group of kind `group_type` at `location`.
    #[must_use]
    pub const fn new(group_type: GroupType, location: Location) -> Self {
        Self {
            group_type,
            location,
        }
    }

    /// True for the default-constructed identifier.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.group_type, GroupType::None)
    }
}

impl StableHash for GroupId {
    fn stable_hash(&self) -> u32 {
        mkhash(self.group_type as u32, self.location.stable_hash())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GroupId(type={}, location={})",
            self.group_type, self.location
        )
    }
}

/// Kind of entity a decal decorates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum DecalType {
    /// No decal.
    #[default]
    None = 0,
    /// Bel graphic.
    Bel = 1,
    /// Wire graphic.
    Wire = 2,
    /// Pip graphic.
    Pip = 3,
    /// Group graphic.
    Group = 4,
}

impl DecalType {
    /// Every value in declaration order.
    pub const ALL: [DecalType; 5] = [
        DecalType::None,
        DecalType::Bel,
        DecalType::Wire,
        DecalType::Pip,
        DecalType::Group,
    ];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DecalType::None => "NONE",
            DecalType::Bel => "BEL",
            DecalType::Wire => "WIRE",
            DecalType::Pip => "PIP",
            DecalType::Group => "GROUP",
        }
    }
}

impl fmt::Display for DecalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a renderable decal.
///
/// `z` disambiguates stacked decals in one tile; `active` selects the
/// highlighted rendering and takes part in equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecalId {
    /// Graphic kind.
    #[serde(rename = "type")]
    pub decal_type: DecalType,
    /// Tile of the decal.
    pub location: Location,
    /// Stacking index within the tile.
    pub z: u32,
    /// Drawn in the active style.
    pub active: bool,
}

impl DecalId {
    /// Decal with every field given.
    #[must_use]
    pub const fn new(decal_type: DecalType, location: Location, z: u32, active: bool) -> Self {
        Self {
            decal_type,
            location,
            z,
            active,
        }
    }

    /// True for the default-constructed identifier.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.decal_type, DecalType::None)
    }
}

impl StableHash for DecalId {
    fn stable_hash(&self) -> u32 {
        mkhash(
            self.location.stable_hash(),
            mkhash(
                self.decal_type as u32,
                mkhash(self.z, self.active.stable_hash()),
            ),
        )
    }
}

impl fmt::Display for DecalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecalId(type={}, location={}, z={}, active={})",
            self.decal_type, self.location, self.z, self.active
        )
    }
}

/// A decal placed at a sub-tile offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DecalXY {
    /// Decal to draw.
    pub decal: DecalId,
    /// X offset.
    pub x: f32,
    /// Y offset.
    pub y: f32,
}

impl DecalXY {
    /// Place `decal` at `(x, y)`.
    #[must_use]
    pub const fn new(decal: DecalId, x: f32, y: f32) -> Self {
        Self { decal, x, y }
    }
}

impl fmt::Display for DecalXY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecalXY(decal={}, x={}, y={})", self.decal, self.x, self.y)
    }
}
