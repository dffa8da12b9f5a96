//! Interpreter lifecycle, execution gateway and object injection.
//!
//! An [`Interpreter`] owns one Rhai engine plus the shared [`Scope`] every
//! execution runs in. At most one interpreter per process can be
//! [`LifecycleState::Ready`] at a time; the slot is released by
//! [`Interpreter::teardown`] (or by dropping a ready interpreter).
//!
//! # Entry points
//!
//! Each operation comes in two flavours:
//!
//! - `try_*` returns host misuse as a [`BridgeError`] so callers (and tests)
//!   can recover.
//! - The plain name treats host misuse as fatal and terminates the process
//!   through [`fatal::abort`]. Script faults are always returned as values.
//!
//! # State across executions
//!
//! Top-level `let`/`const` bindings land in the shared scope and `fn`
//! definitions are kept in a function library, so both survive from one
//! execution to the next:
//!
//! ```rust,ignore
//! interp.execute_source("fn double(x) { x * 2 } let base = 21;")?;
//! let v = interp.execute_source("double(base)")?; // 42
//! ```
//!
//! Top-level `import "path" as name;` statements of an execution that
//! completes are re-published as static modules, so `name::` keeps
//! resolving in later executions. Imports with a computed path only last for
//! the execution that made them.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use rhai::{Dynamic, Engine, Expr, Scope, Stmt, AST};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult, RegistryError};
use crate::scripting::arch::{self, ArchFamily};
use crate::scripting::fault::{dump_fault, ScriptFault};
use crate::scripting::object::HostObject;
use crate::scripting::registry::{Catalog, TypeRegistry, ROOT_MODULE};
use crate::scripting::{context_bindings, core_types, fatal};

/// Claimed by the interpreter that is currently ready.
static RUNTIME_SLOT: AtomicBool = AtomicBool::new(false);

/// Words that cannot name an injected global.
const RESERVED: &[&str] = &[
    "true", "false", "let", "const", "if", "else", "switch", "do", "while", "until", "loop",
    "for", "in", "break", "continue", "return", "throw", "try", "catch", "fn", "private",
    "import", "export", "as", "this", "global", "Fn", "call", "curry", "is_def_var",
    "is_def_fn", "type_of", "print", "debug", "eval", "is_shared", "var", "static", "shared",
    "goto", "exit", "match", "case", "public", "protected", "new", "use", "with", "module",
    "package", "super", "thread", "spawn", "go", "await", "async", "sync", "yield", "default",
    "void", "null", "nil",
];

/// Where an [`Interpreter`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, not yet initialized.
    Uninitialized,
    /// Engine built, types registered, accepting executions.
    Ready,
    /// Torn down. Terminal for this object.
    Closed,
}

struct Runtime {
    engine: Engine,
    scope: Scope<'static>,
    /// Script functions defined by earlier executions.
    functions: AST,
    catalog: Catalog,
    executable: String,
}

/// The embedded script runtime.
pub struct Interpreter {
    config: BridgeConfig,
    state: LifecycleState,
    runtime: Option<Runtime>,
}

impl Interpreter {
    /// Create an uninitialized interpreter. Nothing is claimed until
    /// [`Interpreter::initialize`].
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Uninitialized,
            runtime: None,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Build the engine, register every type and claim the process slot.
    ///
    /// `executable_hint` names the host program; when absent the configured
    /// `program_name` is used. Scripts always see `pnr::ARGV == [program_name]`.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::AlreadyInitialized`] if this or another interpreter
    ///   in the process is ready
    /// - [`BridgeError::Closed`] if this interpreter was torn down
    /// - [`BridgeError::UnknownArch`] if the configured family does not exist
    /// - [`BridgeError::Registry`] if type registration conflicts
    pub fn try_initialize(&mut self, executable_hint: Option<&str>) -> BridgeResult<()> {
        match self.state {
            LifecycleState::Ready => return Err(BridgeError::AlreadyInitialized),
            LifecycleState::Closed => return Err(BridgeError::Closed),
            LifecycleState::Uninitialized => {}
        }

        let family = arch::lookup(&self.config.arch)
            .ok_or_else(|| BridgeError::UnknownArch(self.config.arch.clone()))?;

        if RUNTIME_SLOT
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BridgeError::AlreadyInitialized);
        }

        let mut engine = self.build_engine();
        let argv = vec![self.config.program_name.clone()];
        let catalog = match register_types(&mut engine, family, argv) {
            Ok(catalog) => catalog,
            Err(err) => {
                RUNTIME_SLOT.store(false, Ordering::Release);
                return Err(err.into());
            }
        };

        let executable = executable_hint
            .unwrap_or(&self.config.program_name)
            .to_string();
        tracing::info!(
            arch = catalog.arch(),
            types = catalog.type_count(),
            executable = %executable,
            "script runtime initialized"
        );

        self.runtime = Some(Runtime {
            engine,
            scope: Scope::new(),
            functions: AST::empty(),
            catalog,
            executable,
        });
        self.state = LifecycleState::Ready;
        Ok(())
    }

    /// [`Interpreter::try_initialize`], terminating the process on failure.
    pub fn initialize(&mut self, executable_hint: Option<&str>) {
        if let Err(err) = self.try_initialize(executable_hint) {
            fatal::abort(format!("failed to initialize script runtime: {err}"));
        }
    }

    /// Drop the shared namespace and engine and release the process slot.
    ///
    /// Views held by scripts are dropped with the namespace; host objects
    /// stay with their owners. Calling this on an interpreter that is not
    /// ready only logs a warning.
    pub fn teardown(&mut self) {
        if self.state != LifecycleState::Ready {
            tracing::warn!(state = ?self.state, "teardown of a script runtime that is not ready");
            return;
        }

        if let Some(mut runtime) = self.runtime.take() {
            runtime.scope.clear();
            drop(runtime);
        }
        RUNTIME_SLOT.store(false, Ordering::Release);
        self.state = LifecycleState::Closed;
        tracing::info!("script runtime torn down");
    }

    fn build_engine(&self) -> Engine {
        let mut engine = Engine::new();

        let limit = self.config.max_operations;
        if limit > 0 {
            engine.on_progress(move |count| {
                if count > limit {
                    Some(format!("operation limit exceeded: maximum {limit} operations").into())
                } else {
                    None
                }
            });
        }
        if self.config.max_call_levels > 0 {
            engine.set_max_call_levels(self.config.max_call_levels);
        }

        engine.on_print(|text| println!("{text}"));
        engine.on_debug(|text, source, pos| {
            tracing::debug!(
                target: "pnr_script::script",
                source = source.unwrap_or("<input>"),
                position = %pos,
                "{text}"
            );
        });
        engine
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// True between initialize and teardown.
    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    /// Program name recorded at initialization.
    pub fn executable(&self) -> Option<&str> {
        self.runtime.as_ref().map(|rt| rt.executable.as_str())
    }

    /// Types and namespaces published at initialization.
    pub fn catalog(&self) -> Option<&Catalog> {
        self.runtime.as_ref().map(|rt| &rt.catalog)
    }

    /// Configuration the interpreter was built with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn runtime_mut(&mut self) -> BridgeResult<&mut Runtime> {
        match self.state {
            LifecycleState::Closed => Err(BridgeError::Closed),
            _ => self.runtime.as_mut().ok_or(BridgeError::NotReady),
        }
    }

    fn runtime_or_abort(&mut self) -> &mut Runtime {
        match self.runtime_mut() {
            Ok(runtime) => runtime,
            Err(err) => fatal::abort(err),
        }
    }

    // =========================================================================
    // Execution gateway
    // =========================================================================

    /// Run `text` in the shared namespace.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotReady`] or [`BridgeError::Closed`] for lifecycle
    /// misuse, [`BridgeError::Script`] when the script faults.
    pub fn try_execute_source(&mut self, text: &str) -> BridgeResult<Dynamic> {
        let runtime = self.runtime_mut()?;
        Ok(runtime.run(text, None)?)
    }

    /// Run `text` in the shared namespace. Lifecycle misuse is fatal.
    pub fn execute_source(&mut self, text: &str) -> Result<Dynamic, ScriptFault> {
        self.runtime_or_abort().run(text, None)
    }

    /// Run the file at `path` in the shared namespace.
    ///
    /// # Errors
    ///
    /// [`BridgeError::NotFound`] if the file does not exist,
    /// [`BridgeError::Io`] if it cannot be read, plus the errors of
    /// [`Interpreter::try_execute_source`].
    pub fn try_execute_file(&mut self, path: impl AsRef<Path>) -> BridgeResult<Dynamic> {
        let path = path.as_ref();
        let runtime = self.runtime_mut()?;
        let text = read_script(path)?;
        let source = path.display().to_string();
        tracing::debug!(path = %source, "executing script file");
        Ok(runtime.run(&text, Some(&source))?)
    }

    /// Run the file at `path`. A missing or unreadable file is fatal.
    pub fn execute_file(&mut self, path: impl AsRef<Path>) -> Result<Dynamic, ScriptFault> {
        let path = path.as_ref();
        let runtime = self.runtime_or_abort();
        let text = match read_script(path) {
            Ok(text) => text,
            Err(err) => fatal::abort(err),
        };
        let source = path.display().to_string();
        tracing::debug!(path = %source, "executing script file");
        runtime.run(&text, Some(&source))
    }

    /// Compile `text` against the shared namespace without running it.
    pub fn validate_source(&mut self, text: &str) -> BridgeResult<()> {
        let runtime = self.runtime_mut()?;
        runtime
            .engine
            .compile_with_scope(&runtime.scope, text)
            .map(|_| ())
            .map_err(|err| ScriptFault::from_parse(err, None).into())
    }

    /// Read a variable of the shared namespace.
    pub fn get_global(&mut self, name: &str) -> BridgeResult<Dynamic> {
        let runtime = self.runtime_mut()?;
        runtime
            .scope
            .get_value::<Dynamic>(name)
            .ok_or_else(|| BridgeError::UndefinedGlobal(name.to_string()))
    }

    /// Bind a plain value in the shared namespace, replacing any variable of
    /// the same name.
    pub fn set_global(&mut self, name: &str, value: impl Into<Dynamic>) -> BridgeResult<()> {
        let runtime = self.runtime_mut()?;
        runtime.bind(name, value.into())
    }

    /// Render a value the way scripts see it through `to_debug`.
    pub fn describe(&mut self, value: &Dynamic) -> String {
        let Ok(runtime) = self.runtime_mut() else {
            return value.to_string();
        };
        let mut scope = Scope::new();
        scope.push_dynamic("value", value.clone());
        runtime
            .engine
            .eval_expression_with_scope::<String>(&mut scope, "value.to_debug()")
            .unwrap_or_else(|_| value.to_string())
    }

    // =========================================================================
    // Object injection
    // =========================================================================

    /// Bind a view of `object` as the global `name`.
    ///
    /// The interpreter never owns `object`: once the host drops it, script
    /// access through `name` faults instead of touching freed state.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::UnregisteredType`] if `T` was not registered as an
    ///   object type
    /// - [`BridgeError::InvalidName`] if `name` is not a script identifier
    /// - [`BridgeError::ConstantName`] if `name` is a script constant
    pub fn try_inject_global<T: Send + Sync + 'static>(
        &mut self,
        name: &str,
        object: &HostObject<T>,
    ) -> BridgeResult<()> {
        let runtime = self.runtime_mut()?;
        if !runtime.catalog.is_injectable::<T>() {
            return Err(BridgeError::UnregisteredType {
                type_name: std::any::type_name::<T>(),
            });
        }
        runtime.bind(name, Dynamic::from(object.view()))?;
        tracing::debug!(name, "injected global object");
        Ok(())
    }

    /// [`Interpreter::try_inject_global`], terminating the process on failure.
    pub fn inject_global<T: Send + Sync + 'static>(&mut self, name: &str, object: &HostObject<T>) {
        if let Err(err) = self.try_inject_global(name, object) {
            if let BridgeError::Script(fault) = &err {
                dump_fault(fault);
            }
            fatal::abort(format!(
                "Unable to inject global object '{name}' into script runtime: {err}"
            ));
        }
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        if self.state == LifecycleState::Ready {
            tracing::warn!("script runtime dropped without teardown");
            self.teardown();
        }
    }
}

impl Runtime {
    fn run(&mut self, text: &str, source: Option<&str>) -> Result<Dynamic, ScriptFault> {
        let ast = self
            .engine
            .compile_with_scope(&self.scope, text)
            .map_err(|err| ScriptFault::from_parse(err, source))?;

        let mut program = self.functions.merge(&ast);
        if let Some(source) = source {
            program.set_source(source);
        }
        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut self.scope, &program)
            .map_err(|err| ScriptFault::from_eval(err, source));

        self.functions = self.functions.merge(&ast.clone_functions_only());
        if result.is_ok() {
            self.keep_imports(&ast, source);
        }
        result
    }

    /// Publish the modules bound by top-level `import ... as name`.
    fn keep_imports(&mut self, ast: &AST, source: Option<&str>) {
        for stmt in ast.statements() {
            let Stmt::Import(import, pos) = stmt else {
                continue;
            };
            let (path, alias) = &**import;
            let alias = alias.name.as_str();
            if alias.is_empty() {
                continue;
            }
            let Expr::StringConstant(path, _) = path else {
                tracing::debug!(alias, "import path is computed, module not kept");
                continue;
            };
            if alias == ROOT_MODULE || self.catalog.exports(alias).is_some() {
                tracing::warn!(alias, "import shadows a built-in namespace, module not kept");
                continue;
            }

            let resolved = self
                .engine
                .module_resolver()
                .resolve(&self.engine, source, path.as_str(), *pos);
            match resolved {
                Ok(module) => {
                    self.engine.register_static_module(alias, module);
                    tracing::debug!(alias, path = %path, "kept imported module");
                }
                Err(err) => tracing::warn!(alias, path = %path, %err, "imported module not kept"),
            }
        }
    }

    fn bind(&mut self, name: &str, value: Dynamic) -> BridgeResult<()> {
        if !is_identifier(name) {
            return Err(BridgeError::InvalidName(name.to_string()));
        }
        if self.scope.is_constant(name) == Some(true) {
            return Err(BridgeError::ConstantName(name.to_string()));
        }
        self.scope.set_value(name, value);
        Ok(())
    }
}

fn register_types(
    engine: &mut Engine,
    family: &dyn ArchFamily,
    argv: Vec<String>,
) -> Result<Catalog, RegistryError> {
    let mut registry = TypeRegistry::new(engine, family.name(), argv);
    core_types::register(&mut registry)?;
    family.register(&mut registry)?;
    context_bindings::register(&mut registry)?;
    Ok(registry.finish())
}

fn read_script(path: &Path) -> BridgeResult<String> {
    if !path.is_file() {
        return Err(BridgeError::NotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| BridgeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// True when `name` can be written as a plain script variable.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && !RESERVED.contains(&name)
}
