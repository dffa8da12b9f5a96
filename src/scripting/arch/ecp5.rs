//! ECP5 identifier types.
//!
//! Identifiers are keys, so scripts get read-only accessors on them: a new
//! key is built with its constructor rather than by mutating an old one.
//! `DecalXY` offsets and `ArchNetInfo` are the writable exceptions.

use pnr_core::{
    ArchNetInfo, BelId, BelPin, DecalId, DecalType, DecalXY, GroupId, GroupType, IdString,
    Location, PipId, PipMapping, PlaceStrength, WireId,
};

use super::ArchFamily;
use crate::error::RegistryError;
use crate::scripting::core_types::{float_property, narrowed};
use crate::scripting::registry::TypeRegistry;
use crate::scripting::{runtime_error, ScriptResult};

/// Lattice ECP5.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ecp5;

impl ArchFamily for Ecp5 {
    fn name(&self) -> &'static str {
        "ecp5"
    }

    fn description(&self) -> &'static str {
        "Lattice ECP5 (tile-indexed bels, wires and pips)"
    }

    fn register(&self, registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
        let ns = self.name();
        register_location(registry, ns)?;
        register_tile_indexed::<BelId>(registry, ns)?;
        register_bel_pin(registry, ns)?;
        register_tile_indexed::<WireId>(registry, ns)?;
        register_tile_indexed::<PipId>(registry, ns)?;
        register_pip_mapping(registry, ns)?;
        register_group_id(registry, ns)?;
        register_decal_id(registry, ns)?;
        register_decal_xy(registry, ns)?;
        register_net_info(registry, ns)?;
        Ok(())
    }
}

// =============================================================================
// Location
// =============================================================================

fn register_location(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<Location>(ns, "Location")?;
    class
        .eq()
        .ord()
        .hash()
        .repr()
        .default_ctor()
        .add(|a, b| a.try_add(b).map_err(runtime_error));
    class
        .module()
        .set_native_fn("Location", |x: i64, y: i64| -> ScriptResult<Location> {
            Ok(Location::new(
                narrowed("Location.x", x)?,
                narrowed("Location.y", y)?,
            ))
        });

    let engine = class.engine();
    engine.register_get("x", |l: &mut Location| i64::from(l.x));
    engine.register_get("y", |l: &mut Location| i64::from(l.y));
    Ok(())
}

// =============================================================================
// Bel / Wire / Pip
// =============================================================================

/// The `(location, index)` identifiers.
trait TileIndexed:
    Copy + Default + Send + Sync + 'static + Ord + std::fmt::Display + pnr_core::StableHash
{
    const NAME: &'static str;
    const INDEX_FIELD: &'static str;

    fn build(location: Location, index: i16) -> Self;
    fn location(&self) -> Location;
    fn index(&self) -> i16;
    fn is_null(&self) -> bool;
}

macro_rules! tile_indexed {
    ($($ty:ident),*) => {
        $(
            impl TileIndexed for $ty {
                const NAME: &'static str = stringify!($ty);
                const INDEX_FIELD: &'static str = concat!(stringify!($ty), ".index");

                fn build(location: Location, index: i16) -> Self {
                    $ty::new(location, index)
                }

                fn location(&self) -> Location {
                    self.location
                }

                fn index(&self) -> i16 {
                    self.index
                }

                fn is_null(&self) -> bool {
                    $ty::is_null(self)
                }
            }
        )*
    };
}

tile_indexed!(BelId, WireId, PipId);

fn register_tile_indexed<T: TileIndexed>(
    registry: &mut TypeRegistry<'_>,
    ns: &str,
) -> Result<(), RegistryError> {
    let mut class = registry.class::<T>(ns, T::NAME)?;
    class.eq().ord().hash().repr().default_ctor();
    class.module().set_native_fn(
        T::NAME,
        |location: Location, index: i64| -> ScriptResult<T> {
            Ok(T::build(location, narrowed(T::INDEX_FIELD, index)?))
        },
    );

    let engine = class.engine();
    engine.register_get("location", |id: &mut T| id.location());
    engine.register_get("index", |id: &mut T| i64::from(id.index()));
    engine.register_fn("is_null", |id: &mut T| id.is_null());
    Ok(())
}

fn register_bel_pin(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<BelPin>(ns, "BelPin")?;
    class.eq().hash().repr().default_ctor();
    class
        .module()
        .set_native_fn("BelPin", |bel: BelId, pin: IdString| -> ScriptResult<BelPin> {
            Ok(BelPin::new(bel, pin))
        });

    let engine = class.engine();
    engine.register_get("bel", |p: &mut BelPin| p.bel);
    engine.register_get("pin", |p: &mut BelPin| p.pin);
    Ok(())
}

fn register_pip_mapping(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<PipMapping>(ns, "PipMapping")?;
    class.eq().hash().repr().default_ctor();
    class.module().set_native_fn(
        "PipMapping",
        |pip: PipId, strength: PlaceStrength| -> ScriptResult<PipMapping> {
            Ok(PipMapping::new(pip, strength))
        },
    );

    let engine = class.engine();
    engine.register_get("pip", |m: &mut PipMapping| m.pip);
    engine.register_get("strength", |m: &mut PipMapping| m.strength);
    engine.register_fn(
        "with_strength",
        |m: &mut PipMapping, strength: PlaceStrength| m.with_strength(strength),
    );
    Ok(())
}

// =============================================================================
// Groups and decals
// =============================================================================

fn register_group_id(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<GroupId>(ns, "GroupId")?;
    class.eq().hash().repr().default_ctor();
    class.module().set_native_fn(
        "GroupId",
        |group_type: GroupType, location: Location| -> ScriptResult<GroupId> {
            Ok(GroupId::new(group_type, location))
        },
    );

    let engine = class.engine();
    for name in ["type", "group_type"] {
        engine.register_get(name, |g: &mut GroupId| g.group_type);
    }
    engine.register_get("location", |g: &mut GroupId| g.location);
    engine.register_fn("is_null", |g: &mut GroupId| g.is_null());

    registry.nested_enum::<GroupType>(ns, "GroupId", "Type")?;
    Ok(())
}

fn register_decal_id(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<DecalId>(ns, "DecalId")?;
    class.eq().hash().repr().default_ctor();
    class.module().set_native_fn(
        "DecalId",
        |decal_type: DecalType, location: Location, z: i64, active: bool| -> ScriptResult<DecalId> {
            Ok(DecalId::new(
                decal_type,
                location,
                narrowed("DecalId.z", z)?,
                active,
            ))
        },
    );

    let engine = class.engine();
    for name in ["type", "decal_type"] {
        engine.register_get(name, |d: &mut DecalId| d.decal_type);
    }
    engine.register_get("location", |d: &mut DecalId| d.location);
    engine.register_get("z", |d: &mut DecalId| i64::from(d.z));
    engine.register_get("active", |d: &mut DecalId| d.active);
    engine.register_fn("is_null", |d: &mut DecalId| d.is_null());

    registry.nested_enum::<DecalType>(ns, "DecalId", "Type")?;
    Ok(())
}

fn register_decal_xy(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<DecalXY>(ns, "DecalXY")?;
    class.eq().repr().default_ctor();
    class.module().set_native_fn(
        "DecalXY",
        |decal: DecalId, x: f64, y: f64| -> ScriptResult<DecalXY> {
            Ok(DecalXY::new(decal, x as f32, y as f32))
        },
    );

    let engine = class.engine();
    engine.register_get("decal", |d: &mut DecalXY| d.decal);
    float_property!(engine, DecalXY, x);
    float_property!(engine, DecalXY, y);
    Ok(())
}

fn register_net_info(registry: &mut TypeRegistry<'_>, ns: &str) -> Result<(), RegistryError> {
    let mut class = registry.class::<ArchNetInfo>(ns, "ArchNetInfo")?;
    class.eq().repr().default_ctor();
    class
        .module()
        .set_native_fn("ArchNetInfo", |is_global: bool| -> ScriptResult<ArchNetInfo> {
            Ok(ArchNetInfo { is_global })
        });

    let engine = class.engine();
    engine.register_get("is_global", |n: &mut ArchNetInfo| n.is_global);
    engine.register_set("is_global", |n: &mut ArchNetInfo, value: bool| {
        n.is_global = value;
    });
    Ok(())
}
