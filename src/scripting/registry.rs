//! Type Registry
//!
//! Publishes host value types to the script engine under named namespaces.
//! Two namespaces always exist: the core namespace [`CORE_NAMESPACE`] and the
//! namespace of the active fabric family (e.g. `ecp5`). After
//! [`TypeRegistry::finish`] scripts see:
//!
//! ```text
//! types::Loc(1, 2, 3)                 constructor
//! types::PlaceStrength::STRONG        enum value
//! ecp5::GroupId::Type::SWITCHBOX      nested enum value
//! ecp5::GroupIdType::SWITCHBOX        flat alias of the same value
//! ecp5::ALL                           exported names of the namespace
//! pnr::VERSION, pnr::ARCH, pnr::ARGV  root module
//! ```
//!
//! Every Rust type may be registered once and every exported name may appear
//! once per namespace, so a registration mistake surfaces as a
//! [`RegistryError`] rather than a silently shadowed binding.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut registry = TypeRegistry::new(&mut engine, "ecp5", vec!["pnr-script".into()]);
//! registry
//!     .class::<Location>("ecp5", "Location")?
//!     .eq()
//!     .ord()
//!     .hash()
//!     .repr();
//! let catalog = registry.finish();
//! ```

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use pnr_core::StableHash;
use rhai::{Array, Dynamic, Engine, Module};

use crate::error::RegistryError;
use crate::scripting::object::ObjectView;
use crate::scripting::ScriptResult;

/// Namespace holding the architecture-independent types.
pub const CORE_NAMESPACE: &str = "types";

/// Root module name.
pub const ROOT_MODULE: &str = "pnr";

const ROOT_DOC: &str = "pnr-script embedded scripting bridge";

/// A host enum exposed to scripts as a set of named constants.
pub trait ScriptEnum: Copy + PartialEq + Send + Sync + 'static {
    /// Every variant, in declaration order.
    fn variants() -> &'static [Self];

    /// Script-visible constant name, e.g. `SWITCHBOX`.
    fn name(self) -> &'static str;

    /// Numeric value of the variant.
    fn value(self) -> i64;
}

#[derive(Default)]
struct Namespace {
    module: Module,
    exports: Vec<String>,
    classes: HashSet<String>,
    owners: BTreeMap<String, Module>,
}

impl Namespace {
    fn exports(&self, name: &str) -> bool {
        self.exports.iter().any(|n| n == name)
    }
}

/// Collects type registrations for one engine.
pub struct TypeRegistry<'e> {
    engine: &'e mut Engine,
    arch: String,
    argv: Vec<String>,
    namespaces: BTreeMap<String, Namespace>,
    types: HashMap<TypeId, String>,
    objects: HashSet<TypeId>,
}

impl<'e> TypeRegistry<'e> {
    /// Start a registry with the core namespace and the `arch` namespace.
    pub fn new(engine: &'e mut Engine, arch: &str, argv: Vec<String>) -> Self {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(CORE_NAMESPACE.to_string(), Namespace::default());
        namespaces.insert(arch.to_string(), Namespace::default());

        Self {
            engine,
            arch: arch.to_string(),
            argv,
            namespaces,
            types: HashMap::new(),
            objects: HashSet::new(),
        }
    }

    /// Fabric family this registry builds.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Direct engine access for registrations that are not tied to a type.
    pub fn engine(&mut self) -> &mut Engine {
        self.engine
    }

    fn check_free(&self, ns: &str, name: &str, id: TypeId, type_name: &'static str) -> Result<(), RegistryError> {
        let namespace = self
            .namespaces
            .get(ns)
            .ok_or_else(|| RegistryError::UnknownNamespace(ns.to_string()))?;

        if let Some(existing) = self.types.get(&id) {
            return Err(RegistryError::DuplicateType {
                type_name,
                existing: existing.clone(),
            });
        }

        if namespace.exports(name) {
            return Err(RegistryError::DuplicateName {
                namespace: ns.to_string(),
                name: name.to_string(),
            });
        }

        Ok(())
    }

    /// Register a value type with a constructor namespace entry `ns::name`.
    pub fn class<T: Clone + Send + Sync + 'static>(
        &mut self,
        ns: &str,
        name: &str,
    ) -> Result<ClassBuilder<'_, T>, RegistryError> {
        self.check_free(ns, name, TypeId::of::<T>(), std::any::type_name::<T>())?;
        self.types.insert(TypeId::of::<T>(), format!("{ns}::{name}"));

        let namespace = self
            .namespaces
            .get_mut(ns)
            .ok_or_else(|| RegistryError::UnknownNamespace(ns.to_string()))?;
        namespace.exports.push(name.to_string());
        namespace.classes.insert(name.to_string());

        self.engine.register_type_with_name::<T>(name);
        tracing::trace!(namespace = ns, name, "registered class");

        Ok(ClassBuilder {
            engine: &mut *self.engine,
            module: &mut namespace.module,
            name: name.to_string(),
            _marker: PhantomData,
        })
    }

    /// Register an enum as `ns::name::VARIANT` constants.
    pub fn enumeration<E: ScriptEnum>(
        &mut self,
        ns: &str,
        name: &str,
    ) -> Result<EnumBuilder<'_, E>, RegistryError> {
        self.check_free(ns, name, TypeId::of::<E>(), std::any::type_name::<E>())?;
        self.types.insert(TypeId::of::<E>(), format!("{ns}::{name}"));

        let namespace = self
            .namespaces
            .get_mut(ns)
            .ok_or_else(|| RegistryError::UnknownNamespace(ns.to_string()))?;
        namespace.exports.push(name.to_string());
        namespace.module.set_sub_module(name, values_module::<E>());

        register_enum_ops::<E>(self.engine, name);
        tracing::trace!(namespace = ns, name, "registered enum");

        Ok(EnumBuilder {
            engine: &mut *self.engine,
            _marker: PhantomData,
        })
    }

    /// Register an enum scoped to a class: `ns::owner::name::VARIANT`, with
    /// the flat alias `ns::{owner}{name}::VARIANT`.
    ///
    /// The owner must already be registered in `ns`.
    pub fn nested_enum<E: ScriptEnum>(
        &mut self,
        ns: &str,
        owner: &str,
        name: &str,
    ) -> Result<EnumBuilder<'_, E>, RegistryError> {
        let alias = format!("{owner}{name}");
        self.check_free(ns, &alias, TypeId::of::<E>(), std::any::type_name::<E>())?;

        let namespace = self
            .namespaces
            .get_mut(ns)
            .ok_or_else(|| RegistryError::UnknownNamespace(ns.to_string()))?;
        if !namespace.classes.contains(owner) {
            return Err(RegistryError::UnknownOwner {
                namespace: ns.to_string(),
                owner: owner.to_string(),
                name: name.to_string(),
            });
        }

        let type_name = format!("{owner}::{name}");
        self.types.insert(TypeId::of::<E>(), format!("{ns}::{type_name}"));

        let values = values_module::<E>();
        namespace
            .owners
            .entry(owner.to_string())
            .or_default()
            .set_sub_module(name, values.clone());
        namespace.module.set_sub_module(alias.clone(), values);
        namespace.exports.push(alias);

        register_enum_ops::<E>(self.engine, &type_name);
        tracing::trace!(namespace = ns, owner, name, "registered nested enum");

        Ok(EnumBuilder {
            engine: &mut *self.engine,
            _marker: PhantomData,
        })
    }

    /// Register a host object type that scripts access by reference.
    ///
    /// Only types registered here can be injected as globals. Methods are
    /// registered on the returned builder against [`ObjectView<T>`].
    pub fn object<T: Send + Sync + 'static>(
        &mut self,
        ns: &str,
        name: &str,
    ) -> Result<ClassBuilder<'_, ObjectView<T>>, RegistryError> {
        self.check_free(
            ns,
            name,
            TypeId::of::<ObjectView<T>>(),
            std::any::type_name::<T>(),
        )?;
        self.objects.insert(TypeId::of::<T>());
        self.class::<ObjectView<T>>(ns, name)
    }

    /// Publish all namespaces to the engine and return the catalog.
    pub fn finish(self) -> Catalog {
        let TypeRegistry {
            engine,
            arch,
            argv,
            namespaces,
            types,
            objects,
        } = self;

        let mut root = Module::new();
        root.set_var("VERSION", env!("CARGO_PKG_VERSION").to_string());
        root.set_var("ARCH", arch.clone());
        root.set_var("DOC", ROOT_DOC.to_string());
        root.set_var(
            "ARGV",
            argv.into_iter().map(Dynamic::from).collect::<Array>(),
        );

        let mut listing = BTreeMap::new();
        for (name, namespace) in namespaces {
            let Namespace {
                mut module,
                exports,
                owners,
                ..
            } = namespace;

            for (owner, nested) in owners {
                module.set_sub_module(owner, nested);
            }
            module.set_var(
                "ALL",
                exports.iter().cloned().map(Dynamic::from).collect::<Array>(),
            );

            let shared = Arc::new(module);
            engine.register_static_module(name.as_str(), shared.clone());
            root.set_sub_module(name.clone(), shared);
            tracing::debug!(namespace = %name, exports = exports.len(), "published namespace");
            listing.insert(name, exports);
        }
        engine.register_static_module(ROOT_MODULE, Arc::new(root));

        Catalog {
            arch,
            namespaces: listing,
            types,
            objects,
        }
    }
}

fn values_module<E: ScriptEnum>() -> Module {
    let mut module = Module::new();
    for variant in E::variants() {
        module.set_var(variant.name(), *variant);
    }
    module
}

fn register_enum_ops<E: ScriptEnum>(engine: &mut Engine, type_name: &str) {
    engine.register_type_with_name::<E>(type_name);
    engine.register_fn("==", |a: E, b: E| a == b);
    engine.register_fn("!=", |a: E, b: E| a != b);
    engine.register_fn("to_string", |e: &mut E| e.name().to_string());
    let qualified = type_name.to_string();
    engine.register_fn("to_debug", move |e: &mut E| format!("{}.{}", qualified, e.name()));
    engine.register_fn("hash", |e: E| e.value());
    engine.register_get("value", |e: &mut E| e.value());
    engine.register_get("name", |e: &mut E| e.name().to_string());
}

/// Builder for operators and accessors of one registered class.
pub struct ClassBuilder<'r, T> {
    engine: &'r mut Engine,
    module: &'r mut Module,
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<'r, T: Clone + Send + Sync + 'static> ClassBuilder<'r, T> {
    /// Script-visible name, also the constructor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine, for getters, setters and methods.
    pub fn engine(&mut self) -> &mut Engine {
        self.engine
    }

    /// Namespace module, for constructors (`set_native_fn(name, ..)`).
    pub fn module(&mut self) -> &mut Module {
        self.module
    }

    /// `==` and `!=`.
    pub fn eq(&mut self) -> &mut Self
    where
        T: PartialEq,
    {
        self.engine.register_fn("==", |a: T, b: T| a == b);
        self.engine.register_fn("!=", |a: T, b: T| a != b);
        self
    }

    /// `<`, `<=`, `>`, `>=`.
    pub fn ord(&mut self) -> &mut Self
    where
        T: Ord,
    {
        self.engine.register_fn("<", |a: T, b: T| a < b);
        self.engine.register_fn("<=", |a: T, b: T| a <= b);
        self.engine.register_fn(">", |a: T, b: T| a > b);
        self.engine.register_fn(">=", |a: T, b: T| a >= b);
        self
    }

    /// `hash(x)`, stable across runs.
    pub fn hash(&mut self) -> &mut Self
    where
        T: StableHash,
    {
        self.engine
            .register_fn("hash", |x: T| i64::from(x.stable_hash()));
        self
    }

    /// `to_string` and `to_debug` via `Display`.
    pub fn repr(&mut self) -> &mut Self
    where
        T: Display,
    {
        self.engine.register_fn("to_string", |x: &mut T| x.to_string());
        self.engine.register_fn("to_debug", |x: &mut T| x.to_string());
        self
    }

    /// Binary `+`.
    pub fn add(&mut self, op: fn(T, T) -> ScriptResult<T>) -> &mut Self {
        self.engine.register_fn("+", move |a: T, b: T| op(a, b));
        self
    }

    /// Binary `-`.
    pub fn sub(&mut self, op: fn(T, T) -> ScriptResult<T>) -> &mut Self {
        self.engine.register_fn("-", move |a: T, b: T| op(a, b));
        self
    }

    /// Zero-argument constructor returning `T::default()`.
    pub fn default_ctor(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.module
            .set_native_fn(self.name.as_str(), || -> ScriptResult<T> { Ok(T::default()) });
        self
    }
}

/// Builder returned for enum registrations.
pub struct EnumBuilder<'r, E> {
    engine: &'r mut Engine,
    _marker: PhantomData<fn() -> E>,
}

impl<'r, E: ScriptEnum> EnumBuilder<'r, E> {
    /// Compare variants by their numeric value.
    pub fn ordered(&mut self) -> &mut Self {
        self.engine.register_fn("<", |a: E, b: E| a.value() < b.value());
        self.engine.register_fn("<=", |a: E, b: E| a.value() <= b.value());
        self.engine.register_fn(">", |a: E, b: E| a.value() > b.value());
        self.engine.register_fn(">=", |a: E, b: E| a.value() >= b.value());
        self
    }
}

/// What a finished registry published.
#[derive(Debug, Clone)]
pub struct Catalog {
    arch: String,
    namespaces: BTreeMap<String, Vec<String>>,
    types: HashMap<TypeId, String>,
    objects: HashSet<TypeId>,
}

impl Catalog {
    /// Active fabric family.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Namespaces in name order, each with its exports in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.namespaces
            .iter()
            .map(|(name, exports)| (name.as_str(), exports.as_slice()))
    }

    /// Exports of `namespace` in registration order.
    pub fn exports(&self, namespace: &str) -> Option<&[String]> {
        self.namespaces.get(namespace).map(Vec::as_slice)
    }

    /// Qualified script name of a registered Rust type.
    pub fn script_name<T: 'static>(&self) -> Option<&str> {
        self.types.get(&TypeId::of::<T>()).map(String::as_str)
    }

    /// True when `T` has a script binding.
    pub fn contains<T: 'static>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    /// True when `T` was registered with [`TypeRegistry::object`].
    pub fn is_injectable<T: 'static>(&self) -> bool {
        self.objects.contains(&TypeId::of::<T>())
    }

    /// Number of registered types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnr_core::{GroupType, Location};

    fn location_class(registry: &mut TypeRegistry<'_>) -> Result<(), RegistryError> {
        let mut class = registry.class::<Location>("fab", "Location")?;
        class.eq().ord().hash().repr().default_ctor();
        class
            .module()
            .set_native_fn("Location", |x: i64, y: i64| -> ScriptResult<Location> {
                Ok(Location::new(x as i16, y as i16))
            });
        class
            .engine()
            .register_get("x", |l: &mut Location| i64::from(l.x));
        Ok(())
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "fab", vec![]);
        location_class(&mut registry).unwrap();

        let err = registry
            .class::<Location>("types", "Location")
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::DuplicateType { .. }));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "fab", vec![]);
        location_class(&mut registry).unwrap();

        let err = registry.class::<i16>("fab", "Location").err().unwrap();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                namespace: "fab".into(),
                name: "Location".into()
            }
        );
    }

    #[test]
    fn nested_enum_requires_owner() {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "fab", vec![]);

        let err = registry
            .nested_enum::<GroupType>("fab", "GroupId", "Type")
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::UnknownOwner { .. }));
    }

    #[test]
    fn unknown_namespace_is_rejected() {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "fab", vec![]);
        let err = registry.class::<Location>("ice40", "Location").err().unwrap();
        assert_eq!(err, RegistryError::UnknownNamespace("ice40".into()));
    }

    #[test]
    fn finished_namespaces_are_visible_to_scripts() {
        let mut engine = Engine::new();
        let mut registry = TypeRegistry::new(&mut engine, "fab", vec!["prog".into()]);
        location_class(&mut registry).unwrap();
        registry
            .class::<pnr_core::GroupId>("fab", "GroupId")
            .unwrap()
            .eq();
        registry
            .nested_enum::<GroupType>("fab", "GroupId", "Type")
            .unwrap();
        let catalog = registry.finish();

        assert_eq!(
            catalog.exports("fab").unwrap(),
            &["Location".to_string(), "GroupId".into(), "GroupIdType".into()]
        );
        assert!(catalog.contains::<Location>());
        assert!(!catalog.is_injectable::<Location>());

        let x: i64 = engine.eval("fab::Location(3, 4).x").unwrap();
        assert_eq!(x, 3);
        let ordered: bool = engine
            .eval("fab::Location(1, 9) < fab::Location(2, 0)")
            .unwrap();
        assert!(ordered);
        let same: bool = engine
            .eval("fab::GroupId::Type::SWITCHBOX == fab::GroupIdType::SWITCHBOX")
            .unwrap();
        assert!(same);
        let arch: String = engine.eval("pnr::ARCH").unwrap();
        assert_eq!(arch, "fab");
        let argv0: String = engine.eval("pnr::ARGV[0]").unwrap();
        assert_eq!(argv0, "prog");
        let all: i64 = engine.eval("fab::ALL.len()").unwrap();
        assert_eq!(all, 3);
    }
}
