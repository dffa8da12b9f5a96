//! # pnr-core
//!
//! Value types shared between the place-and-route engine and the scripting
//! bridge. Nothing in here owns or references shared state: every identifier
//! is a small `Copy` key, so concurrent readers never race.
//!
//! ## Crate Structure
//!
//! - **`location`**: [`Location`], the signed tile coordinate every fabric key starts with.
//! - **`ids`**: the fabric identifiers ([`BelId`], [`WireId`], [`PipId`], [`GroupId`],
//!   [`DecalId`]) plus [`PipMapping`], [`BelPin`] and [`DecalXY`].
//! - **`strength`**: [`PlaceStrength`], the rip-up precedence order the router depends on.
//! - **`geometry`**: [`Loc`], [`BoundingBox`] and [`GraphicElement`] for inspection tooling.
//! - **`timing`**: delay pairs/quads, clock constraints and timing enums.
//! - **`hash`**: [`StableHash`], hashing that does not change between runs.
//!
//! ## Contracts
//!
//! All identifier types satisfy:
//!
//! 1. `Default` yields a null identifier distinguishable from any valid one.
//! 2. `a == b` implies `hash(a) == hash(b)`, for both the std `Hash` derive and
//!    [`StableHash`].
//! 3. Where `Ord` is implemented it is lexicographic over the declared fields,
//!    which keeps iteration order deterministic across runs.

pub mod error;
pub mod geometry;
pub mod hash;
pub mod ids;
pub mod idstring;
pub mod location;
pub mod net;
pub mod strength;
pub mod timing;

pub use error::CoreError;
pub use geometry::{BoundingBox, GraphicElement, GraphicStyle, GraphicType, Loc};
pub use hash::{mkhash, StableHash};
pub use ids::{BelId, BelPin, DecalId, DecalType, DecalXY, GroupId, GroupType, PipId, PipMapping, WireId};
pub use idstring::IdString;
pub use location::Location;
pub use net::ArchNetInfo;
pub use strength::PlaceStrength;
pub use timing::{
    ClockConstraint, ClockEdge, ClockFmax, Delay, DelayPair, DelayQuad, PortType, TimingPortClass,
};
