//! Bindings for the architecture-independent `types` namespace.
//!
//! Geometry and timing values are plain data in scripts: every field is
//! readable and writable, and numeric writes are range-checked against the
//! Rust field type. Integers arrive as `i64` and floats as `f64`.
//!
//! | Script name                | Rust type            |
//! |----------------------------|----------------------|
//! | `Loc`                      | [`Loc`]              |
//! | `BoundingBox`              | [`BoundingBox`]      |
//! | `DelayPair`, `DelayQuad`   | [`DelayPair`], [`DelayQuad`] |
//! | `ClockConstraint`          | [`ClockConstraint`]  |
//! | `ClockFmax`                | [`ClockFmax`]        |
//! | `GraphicElement` (+`Type`, `Style`) | [`GraphicElement`] |
//! | `PlaceStrength`, `PortType`, `TimingPortClass`, `ClockEdge` | enums |
//! | `IdString`                 | [`IdString`]         |

use pnr_core::error::narrow;
use pnr_core::{
    BoundingBox, ClockConstraint, ClockEdge, ClockFmax, DecalType, DelayPair, DelayQuad,
    GraphicElement, GraphicStyle, GraphicType, GroupType, IdString, Loc, PlaceStrength, PortType,
    TimingPortClass,
};
use rhai::{Array, ImmutableString};

use crate::error::RegistryError;
use crate::scripting::registry::{ScriptEnum, TypeRegistry, CORE_NAMESPACE};
use crate::scripting::{runtime_error, ScriptResult};

macro_rules! script_enum {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScriptEnum for $ty {
                fn variants() -> &'static [Self] {
                    &<$ty>::ALL
                }

                fn name(self) -> &'static str {
                    <$ty>::name(self)
                }

                fn value(self) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

script_enum!(
    PlaceStrength,
    PortType,
    TimingPortClass,
    ClockEdge,
    GraphicType,
    GraphicStyle,
    GroupType,
    DecalType,
);

/// Range-checked integer conversion for script arguments.
pub(crate) fn narrowed<T: TryFrom<i64>>(field: &'static str, value: i64) -> ScriptResult<T> {
    narrow(field, value).map_err(runtime_error)
}

/// Read/write integer property.
macro_rules! int_property {
    ($engine:expr, $ty:ty, $field:ident) => {
        $engine.register_get(stringify!($field), |v: &mut $ty| i64::from(v.$field));
        $engine.register_set(
            stringify!($field),
            |v: &mut $ty, value: i64| -> ScriptResult<()> {
                v.$field = narrowed(concat!(stringify!($ty), ".", stringify!($field)), value)?;
                Ok(())
            },
        );
    };
}

/// Read/write float property.
macro_rules! float_property {
    ($engine:expr, $ty:ty, $field:ident) => {
        $engine.register_get(stringify!($field), |v: &mut $ty| f64::from(v.$field));
        $engine.register_set(stringify!($field), |v: &mut $ty, value: f64| {
            v.$field = value as f32;
        });
    };
}

/// Read/write property of a registered value type.
macro_rules! value_property {
    ($engine:expr, $ty:ty, $field:ident : $field_ty:ty) => {
        $engine.register_get(stringify!($field), |v: &mut $ty| v.$field);
        $engine.register_set(stringify!($field), |v: &mut $ty, value: $field_ty| {
            v.$field = value;
        });
    };
}

pub(crate) use float_property;

/// Register every core type.
pub fn register(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    register_loc(registry)?;
    register_bounding_box(registry)?;
    register_delay_pair(registry)?;
    register_delay_quad(registry)?;
    register_clock_types(registry)?;
    register_graphic_element(registry)?;
    register_id_string(registry)?;

    registry
        .enumeration::<PlaceStrength>(CORE_NAMESPACE, "PlaceStrength")?
        .ordered();
    registry.enumeration::<PortType>(CORE_NAMESPACE, "PortType")?;
    registry.enumeration::<TimingPortClass>(CORE_NAMESPACE, "TimingPortClass")?;
    registry.enumeration::<ClockEdge>(CORE_NAMESPACE, "ClockEdge")?;

    Ok(())
}

fn register_loc(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<Loc>(CORE_NAMESPACE, "Loc")?;
    class.eq().hash().repr().default_ctor();
    class
        .module()
        .set_native_fn("Loc", |x: i64, y: i64, z: i64| -> ScriptResult<Loc> {
            Ok(Loc::new(
                narrowed("Loc.x", x)?,
                narrowed("Loc.y", y)?,
                narrowed("Loc.z", z)?,
            ))
        });

    let engine = class.engine();
    int_property!(engine, Loc, x);
    int_property!(engine, Loc, y);
    int_property!(engine, Loc, z);
    Ok(())
}

fn register_bounding_box(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<BoundingBox>(CORE_NAMESPACE, "BoundingBox")?;
    class.eq().repr().default_ctor();
    class.module().set_native_fn(
        "BoundingBox",
        |x0: i64, y0: i64, x1: i64, y1: i64| -> ScriptResult<BoundingBox> {
            Ok(BoundingBox::new(
                narrowed("BoundingBox.x0", x0)?,
                narrowed("BoundingBox.y0", y0)?,
                narrowed("BoundingBox.x1", x1)?,
                narrowed("BoundingBox.y1", y1)?,
            ))
        },
    );

    let engine = class.engine();
    int_property!(engine, BoundingBox, x0);
    int_property!(engine, BoundingBox, y0);
    int_property!(engine, BoundingBox, x1);
    int_property!(engine, BoundingBox, y1);
    engine.register_fn("distance", |bb: &mut BoundingBox, loc: Loc| {
        i64::from(bb.distance(loc))
    });
    engine.register_fn("contains", |bb: &mut BoundingBox, x: i64, y: i64| {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => bb.contains(x, y),
            _ => false,
        }
    });
    Ok(())
}

fn register_delay_pair(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<DelayPair>(CORE_NAMESPACE, "DelayPair")?;
    class
        .eq()
        .repr()
        .default_ctor()
        .add(|a, b| a.checked_add(b).ok_or_else(|| runtime_error("delay overflow")))
        .sub(|a, b| a.checked_sub(b).ok_or_else(|| runtime_error("delay overflow")));

    let module = class.module();
    module.set_native_fn("DelayPair", |delay: i64| -> ScriptResult<DelayPair> {
        Ok(DelayPair::fixed(narrowed("DelayPair.delay", delay)?))
    });
    module.set_native_fn(
        "DelayPair",
        |min_delay: i64, max_delay: i64| -> ScriptResult<DelayPair> {
            Ok(DelayPair::new(
                narrowed("DelayPair.min_delay", min_delay)?,
                narrowed("DelayPair.max_delay", max_delay)?,
            ))
        },
    );

    let engine = class.engine();
    int_property!(engine, DelayPair, min_delay);
    int_property!(engine, DelayPair, max_delay);
    Ok(())
}

fn register_delay_quad(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<DelayQuad>(CORE_NAMESPACE, "DelayQuad")?;
    class
        .eq()
        .repr()
        .default_ctor()
        .add(|a, b| a.checked_add(b).ok_or_else(|| runtime_error("delay overflow")))
        .sub(|a, b| a.checked_sub(b).ok_or_else(|| runtime_error("delay overflow")));

    let module = class.module();
    module.set_native_fn("DelayQuad", |delay: i64| -> ScriptResult<DelayQuad> {
        Ok(DelayQuad::fixed(narrowed("DelayQuad.delay", delay)?))
    });
    module.set_native_fn(
        "DelayQuad",
        |min_delay: i64, max_delay: i64| -> ScriptResult<DelayQuad> {
            Ok(DelayQuad::from_range(
                narrowed("DelayQuad.min_delay", min_delay)?,
                narrowed("DelayQuad.max_delay", max_delay)?,
            ))
        },
    );
    module.set_native_fn(
        "DelayQuad",
        |rise: DelayPair, fall: DelayPair| -> ScriptResult<DelayQuad> {
            Ok(DelayQuad::from_pairs(rise, fall))
        },
    );
    module.set_native_fn(
        "DelayQuad",
        |min_rise: i64, max_rise: i64, min_fall: i64, max_fall: i64| -> ScriptResult<DelayQuad> {
            Ok(DelayQuad::new(
                narrowed("DelayQuad.min_rise", min_rise)?,
                narrowed("DelayQuad.max_rise", max_rise)?,
                narrowed("DelayQuad.min_fall", min_fall)?,
                narrowed("DelayQuad.max_fall", max_fall)?,
            ))
        },
    );

    let engine = class.engine();
    value_property!(engine, DelayQuad, rise: DelayPair);
    value_property!(engine, DelayQuad, fall: DelayPair);
    engine.register_fn("min_rise_delay", |q: &mut DelayQuad| i64::from(q.min_rise_delay()));
    engine.register_fn("max_rise_delay", |q: &mut DelayQuad| i64::from(q.max_rise_delay()));
    engine.register_fn("min_fall_delay", |q: &mut DelayQuad| i64::from(q.min_fall_delay()));
    engine.register_fn("max_fall_delay", |q: &mut DelayQuad| i64::from(q.max_fall_delay()));
    engine.register_fn("min_delay", |q: &mut DelayQuad| i64::from(q.min_delay()));
    engine.register_fn("max_delay", |q: &mut DelayQuad| i64::from(q.max_delay()));
    engine.register_fn("delay_pair", |q: &mut DelayQuad| q.delay_pair());
    Ok(())
}

fn register_clock_types(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<ClockConstraint>(CORE_NAMESPACE, "ClockConstraint")?;
    class.eq().repr().default_ctor();
    let engine = class.engine();
    value_property!(engine, ClockConstraint, high: DelayPair);
    value_property!(engine, ClockConstraint, low: DelayPair);
    value_property!(engine, ClockConstraint, period: DelayPair);

    let mut class = registry.class::<ClockFmax>(CORE_NAMESPACE, "ClockFmax")?;
    class.repr().default_ctor();
    let engine = class.engine();
    float_property!(engine, ClockFmax, achieved);
    float_property!(engine, ClockFmax, constraint);
    engine.register_fn("is_met", |f: &mut ClockFmax| f.is_met());
    Ok(())
}

fn register_graphic_element(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<GraphicElement>(CORE_NAMESPACE, "GraphicElement")?;
    class.eq().repr().default_ctor();
    class.module().set_native_fn(
        "GraphicElement",
        |element_type: GraphicType,
         style: GraphicStyle,
         x1: f64,
         y1: f64,
         x2: f64,
         y2: f64,
         z: f64|
         -> ScriptResult<GraphicElement> {
            Ok(GraphicElement::new(
                element_type,
                style,
                x1 as f32,
                y1 as f32,
                x2 as f32,
                y2 as f32,
                z as f32,
            ))
        },
    );

    let engine = class.engine();
    for name in ["type", "element_type"] {
        engine.register_get(name, |e: &mut GraphicElement| e.element_type);
        engine.register_set(name, |e: &mut GraphicElement, value: GraphicType| {
            e.element_type = value;
        });
    }
    value_property!(engine, GraphicElement, style: GraphicStyle);
    float_property!(engine, GraphicElement, x1);
    float_property!(engine, GraphicElement, y1);
    float_property!(engine, GraphicElement, x2);
    float_property!(engine, GraphicElement, y2);
    float_property!(engine, GraphicElement, z);
    engine.register_get("text", |e: &mut GraphicElement| e.text.clone());
    engine.register_set("text", |e: &mut GraphicElement, text: ImmutableString| {
        e.text = text.to_string();
    });

    registry.nested_enum::<GraphicType>(CORE_NAMESPACE, "GraphicElement", "Type")?;
    registry.nested_enum::<GraphicStyle>(CORE_NAMESPACE, "GraphicElement", "Style")?;
    Ok(())
}

fn register_id_string(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.class::<IdString>(CORE_NAMESPACE, "IdString")?;
    class.eq().ord().hash().repr().default_ctor();
    class
        .module()
        .set_native_fn("IdString", |index: i64| -> ScriptResult<IdString> {
            Ok(IdString::new(narrowed("IdString.index", index)?))
        });

    let engine = class.engine();
    int_property!(engine, IdString, index);
    engine.register_fn("empty", |s: &mut IdString| s.empty());
    engine.register_fn("is_in", |s: &mut IdString, list: Array| {
        let handles: Vec<IdString> = list
            .into_iter()
            .filter_map(|item| item.try_cast::<IdString>())
            .collect();
        s.is_in(&handles)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhai::Engine;

    fn engine() -> Engine {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "ecp5", vec![]);
        register(&mut registry).unwrap();
        registry.finish();
        engine
    }

    #[test]
    fn loc_fields_are_writable() {
        let engine = engine();
        let loc: Loc = engine
            .eval("let l = types::Loc(1, 2, 3); l.z = 7; l")
            .unwrap();
        assert_eq!(loc, Loc::new(1, 2, 7));
    }

    #[test]
    fn out_of_range_write_is_a_script_error() {
        let engine = engine();
        let err = engine
            .eval::<Loc>("let l = types::Loc(); l.x = 99999999999; l")
            .unwrap_err();
        assert!(err.to_string().contains("out of range for Loc.x"));
    }

    #[test]
    fn bounding_box_queries() {
        let engine = engine();
        let dist: i64 = engine
            .eval("types::BoundingBox(2, 2, 5, 6).distance(types::Loc(0, 0, 0))")
            .unwrap();
        assert_eq!(dist, 4);
        let inside: bool = engine
            .eval("types::BoundingBox(0, 0, 3, 3).contains(3, 3)")
            .unwrap();
        assert!(inside);
    }

    #[test]
    fn delay_quad_overloads() {
        let engine = engine();
        let quad: DelayQuad = engine
            .eval("types::DelayQuad(types::DelayPair(1, 2), types::DelayPair(3, 4))")
            .unwrap();
        assert_eq!(quad, DelayQuad::new(1, 2, 3, 4));

        let max: i64 = engine
            .eval("(types::DelayQuad(5) + types::DelayQuad(1, 9)).max_delay()")
            .unwrap();
        assert_eq!(max, 14);
    }

    #[test]
    fn delay_overflow_is_reported() {
        let engine = engine();
        let err = engine
            .eval::<DelayPair>("types::DelayPair(2147483647) + types::DelayPair(1)")
            .unwrap_err();
        assert!(err.to_string().contains("delay overflow"));
    }

    #[test]
    fn strength_order_and_names() {
        let engine = engine();
        let ordered: bool = engine
            .eval("types::PlaceStrength::WEAK < types::PlaceStrength::LOCKED")
            .unwrap();
        assert!(ordered);
        let rank: i64 = engine.eval("types::PlaceStrength::USER.value").unwrap();
        assert_eq!(rank, 6);
        let name: String = engine
            .eval("types::PlaceStrength::FIXED.to_string()")
            .unwrap();
        assert_eq!(name, "FIXED");
    }

    #[test]
    fn id_string_membership() {
        let engine = engine();
        let found: bool = engine
            .eval("types::IdString(4).is_in([types::IdString(1), types::IdString(4)])")
            .unwrap();
        assert!(found);
        let empty: bool = engine.eval("types::IdString().empty()").unwrap();
        assert!(empty);
    }

    #[test]
    fn graphic_element_nested_enums() {
        let engine = engine();
        let el: GraphicElement = engine
            .eval(
                r#"
                let e = types::GraphicElement(
                    types::GraphicElement::Type::BOX,
                    types::GraphicElementStyle::ACTIVE,
                    0.0, 0.0, 1.5, 2.0, 0.0);
                e.text = "slice";
                e
                "#,
            )
            .unwrap();
        assert_eq!(el.element_type, GraphicType::Box);
        assert_eq!(el.style, GraphicStyle::Active);
        assert_eq!(el.x2, 1.5);
        assert_eq!(el.text, "slice");
    }
}
