//! Script surface of [`DesignContext`], published as `types::Context`.
//!
//! Scripts never construct a context; the host injects one (usually as
//! `ctx`). Every method goes through the [`ObjectView`], so calls made after
//! the host dropped the context fail with a script fault. Lookups that find
//! nothing return `()`.
//!
//! ```rhai
//! let bel = ecp5::BelId(ecp5::Location(3, 4), 0);
//! ctx.bind_bel(bel, "lut0", types::PlaceStrength::PLACER);
//! print(ctx.bel_cell(bel));
//! ```

use pnr_core::{ArchNetInfo, BelId, PipId, PlaceStrength, WireId};
use rhai::{Dynamic, ImmutableString};

use crate::context::DesignContext;
use crate::error::RegistryError;
use crate::scripting::object::ObjectView;
use crate::scripting::registry::{TypeRegistry, CORE_NAMESPACE};
use crate::scripting::{runtime_error, ScriptResult};

type Ctx = ObjectView<DesignContext>;

/// Strength used by the two-argument `bind_*` overloads.
pub const DEFAULT_STRENGTH: PlaceStrength = PlaceStrength::Strong;

fn optional<T: Clone + Send + Sync + 'static>(value: Option<T>) -> Dynamic {
    value.map_or(Dynamic::UNIT, Dynamic::from)
}

/// Register `types::Context`.
pub fn register(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
    let mut class = registry.object::<DesignContext>(CORE_NAMESPACE, "Context")?;
    let engine = class.engine();

    engine.register_fn("to_string", |view: &mut Ctx| -> ScriptResult<String> {
        view.with(|ctx| format!("Context(name={}, arch={})", ctx.name(), ctx.arch()))
    });
    engine.register_fn("to_debug", |view: &mut Ctx| -> ScriptResult<String> {
        view.with(|ctx| format!("Context(name={:?}, arch={:?})", ctx.name(), ctx.arch()))
    });
    engine.register_fn("is_alive", |view: &mut Ctx| view.is_alive());

    engine.register_get("name", |view: &mut Ctx| -> ScriptResult<String> {
        view.with(|ctx| ctx.name().to_string())
    });
    engine.register_set(
        "name",
        |view: &mut Ctx, name: ImmutableString| -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.set_name(name.as_str()))
        },
    );
    engine.register_get("arch", |view: &mut Ctx| -> ScriptResult<String> {
        view.with(|ctx| ctx.arch().to_string())
    });

    // Bels
    engine.register_fn(
        "bind_bel",
        |view: &mut Ctx,
         bel: BelId,
         cell: ImmutableString,
         strength: PlaceStrength|
         -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.bind_bel(bel, cell.as_str(), strength))?
                .map_err(runtime_error)
        },
    );
    engine.register_fn(
        "bind_bel",
        |view: &mut Ctx, bel: BelId, cell: ImmutableString| -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.bind_bel(bel, cell.as_str(), DEFAULT_STRENGTH))?
                .map_err(runtime_error)
        },
    );
    engine.register_fn("unbind_bel", |view: &mut Ctx, bel: BelId| -> ScriptResult<bool> {
        view.with_mut(|ctx| ctx.unbind_bel(bel).is_some())
    });
    engine.register_fn("bel_cell", |view: &mut Ctx, bel: BelId| -> ScriptResult<Dynamic> {
        view.with(|ctx| optional(ctx.bel_cell(bel).map(str::to_string)))
    });
    engine.register_fn(
        "bel_strength",
        |view: &mut Ctx, bel: BelId| -> ScriptResult<Dynamic> {
            view.with(|ctx| optional(ctx.bel_strength(bel)))
        },
    );
    engine.register_fn(
        "is_bel_available",
        |view: &mut Ctx, bel: BelId| -> ScriptResult<bool> {
            view.with(|ctx| ctx.is_bel_available(bel))
        },
    );

    // Wires
    engine.register_fn(
        "bind_wire",
        |view: &mut Ctx,
         wire: WireId,
         net: ImmutableString,
         strength: PlaceStrength|
         -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.bind_wire(wire, net.as_str(), strength))?
                .map_err(runtime_error)
        },
    );
    engine.register_fn(
        "bind_wire",
        |view: &mut Ctx, wire: WireId, net: ImmutableString| -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.bind_wire(wire, net.as_str(), DEFAULT_STRENGTH))?
                .map_err(runtime_error)
        },
    );
    engine.register_fn("unbind_wire", |view: &mut Ctx, wire: WireId| -> ScriptResult<bool> {
        view.with_mut(|ctx| ctx.unbind_wire(wire).is_some())
    });
    engine.register_fn("wire_net", |view: &mut Ctx, wire: WireId| -> ScriptResult<Dynamic> {
        view.with(|ctx| optional(ctx.wire_net(wire).map(str::to_string)))
    });
    engine.register_fn(
        "is_wire_available",
        |view: &mut Ctx, wire: WireId| -> ScriptResult<bool> {
            view.with(|ctx| ctx.is_wire_available(wire))
        },
    );

    // Pips
    engine.register_fn(
        "bind_pip",
        |view: &mut Ctx,
         pip: PipId,
         net: ImmutableString,
         strength: PlaceStrength|
         -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.bind_pip(pip, net.as_str(), strength))?
                .map(|_| ())
                .map_err(runtime_error)
        },
    );
    engine.register_fn(
        "bind_pip",
        |view: &mut Ctx, pip: PipId, net: ImmutableString| -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.bind_pip(pip, net.as_str(), DEFAULT_STRENGTH))?
                .map(|_| ())
                .map_err(runtime_error)
        },
    );
    engine.register_fn("unbind_pip", |view: &mut Ctx, pip: PipId| -> ScriptResult<bool> {
        view.with_mut(|ctx| ctx.unbind_pip(pip).is_some())
    });
    engine.register_fn("pip_net", |view: &mut Ctx, pip: PipId| -> ScriptResult<Dynamic> {
        view.with(|ctx| optional(ctx.pip_net(pip).map(str::to_string)))
    });
    engine.register_fn(
        "pip_mapping",
        |view: &mut Ctx, pip: PipId| -> ScriptResult<Dynamic> {
            view.with(|ctx| optional(ctx.pip_mapping(pip)))
        },
    );
    engine.register_fn(
        "pip_strength",
        |view: &mut Ctx, pip: PipId| -> ScriptResult<Dynamic> {
            view.with(|ctx| optional(ctx.pip_strength(pip)))
        },
    );

    // Nets and settings
    engine.register_fn(
        "set_net_global",
        |view: &mut Ctx, net: ImmutableString, is_global: bool| -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.set_net_global(net.as_str(), is_global))
        },
    );
    engine.register_fn(
        "net_info",
        |view: &mut Ctx, net: ImmutableString| -> ScriptResult<ArchNetInfo> {
            view.with(|ctx| ctx.net_info(net.as_str()))
        },
    );
    engine.register_fn(
        "set_setting",
        |view: &mut Ctx, key: ImmutableString, value: Dynamic| -> ScriptResult<()> {
            view.with_mut(|ctx| ctx.set_setting(key.as_str(), value.to_string()))
        },
    );
    engine.register_fn(
        "setting",
        |view: &mut Ctx, key: ImmutableString| -> ScriptResult<Dynamic> {
            view.with(|ctx| optional(ctx.setting(key.as_str()).map(str::to_string)))
        },
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripting::arch::{ArchFamily, Ecp5};
    use crate::scripting::core_types;
    use crate::scripting::HostObject;
    use pnr_core::Location;
    use rhai::{Engine, Scope};

    fn engine() -> Engine {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "ecp5", vec![]);
        core_types::register(&mut registry).unwrap();
        Ecp5.register(&mut registry).unwrap();
        register(&mut registry).unwrap();
        let catalog = registry.finish();
        assert!(catalog.is_injectable::<DesignContext>());
        engine
    }

    #[test]
    fn script_bindings_reach_the_host_object() {
        let engine = engine();
        let ctx = HostObject::new(DesignContext::new("top", "ecp5"));
        let mut scope = Scope::new();
        scope.push("ctx", ctx.view());

        engine
            .run_with_scope(
                &mut scope,
                r#"
                let bel = ecp5::BelId(ecp5::Location(3, 4), 0);
                ctx.bind_bel(bel, "lut0", types::PlaceStrength::PLACER);
                ctx.set_net_global("clk", true);
                ctx.set_setting("seed", 7);
                ctx.name = "renamed";
                "#,
            )
            .unwrap();

        let guard = ctx.read();
        assert_eq!(guard.name(), "renamed");
        assert_eq!(
            guard.bel_cell(BelId::new(Location::new(3, 4), 0)),
            Some("lut0")
        );
        assert!(guard.net_info("clk").is_global);
        assert_eq!(guard.setting("seed"), Some("7"));
    }

    #[test]
    fn refused_binding_is_a_script_error() {
        let engine = engine();
        let ctx = HostObject::new(DesignContext::new("top", "ecp5"));
        let mut scope = Scope::new();
        scope.push("ctx", ctx.view());

        let err = engine
            .run_with_scope(
                &mut scope,
                r#"
                let pip = ecp5::PipId(ecp5::Location(1, 1), 9);
                ctx.bind_pip(pip, "clk", types::PlaceStrength::LOCKED);
                ctx.bind_pip(pip, "data", types::PlaceStrength::WEAK);
                "#,
            )
            .unwrap_err();
        assert!(err.to_string().contains("cannot rip it up"));
        assert_eq!(
            ctx.read().pip_net(PipId::new(Location::new(1, 1), 9)),
            Some("clk")
        );
    }

    #[test]
    fn missing_lookups_return_unit() {
        let engine = engine();
        let ctx = HostObject::new(DesignContext::new("top", "ecp5"));
        let mut scope = Scope::new();
        scope.push("ctx", ctx.view());

        let unit: bool = engine
            .eval_with_scope(
                &mut scope,
                "ctx.pip_mapping(ecp5::PipId()) == () && ctx.setting(\"nope\") == ()",
            )
            .unwrap();
        assert!(unit);
    }

    #[test]
    fn dropped_context_faults_instead_of_crashing() {
        let engine = engine();
        let ctx = HostObject::new(DesignContext::new("top", "ecp5"));
        let mut scope = Scope::new();
        scope.push("ctx", ctx.view());
        drop(ctx);

        let err = engine
            .eval_with_scope::<String>(&mut scope, "ctx.name")
            .unwrap_err();
        assert!(err.to_string().contains("no longer alive"));
        let alive: bool = engine.eval_with_scope(&mut scope, "ctx.is_alive()").unwrap();
        assert!(!alive);
    }
}
