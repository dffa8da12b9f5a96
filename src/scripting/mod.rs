//! Embedded scripting runtime for place-and-route automation.
//!
//! The bridge hosts a single Rhai interpreter per process and exposes the
//! fabric identifier types to it.
//!
//! # Architecture
//!
//! ```text
//! Interpreter (lifecycle + execution gateway + injection)
//!     ├── TypeRegistry ── core_types   (`types` namespace)
//!     │                └─ arch::Ecp5   (`ecp5` namespace)
//!     ├── Scope<'static>                shared namespace for every execution
//!     └── ObjectView<T>                 weak handles to HostObject<T>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pnr_script::config::BridgeConfig;
//! use pnr_script::context::DesignContext;
//! use pnr_script::scripting::{HostObject, Interpreter};
//!
//! let mut interp = Interpreter::new(BridgeConfig::default());
//! interp.initialize(None);
//!
//! let ctx = HostObject::new(DesignContext::new("top", "ecp5"));
//! interp.inject_global("ctx", &ctx);
//!
//! match interp.execute_source(r#"ctx.name = "renamed"; 1 + 1"#) {
//!     Ok(value) => println!("result: {value}"),
//!     Err(fault) => pnr_script::scripting::dump_fault(&fault),
//! }
//! assert_eq!(ctx.read().name(), "renamed");
//!
//! interp.teardown();
//! ```

pub mod arch;
pub mod context_bindings;
pub mod core_types;
pub mod fatal;
pub mod fault;
pub mod interpreter;
pub mod object;
pub mod registry;

use std::fmt::Display;

use rhai::EvalAltResult;

pub use arch::{ArchFamily, Ecp5};
pub use fault::{dump_fault, FaultCategory, FaultPosition, ScriptFault};
pub use interpreter::{Interpreter, LifecycleState};
pub use object::{HostObject, ObjectView};
pub use registry::{Catalog, ClassBuilder, EnumBuilder, ScriptEnum, TypeRegistry, CORE_NAMESPACE};

/// Result type of host functions called from scripts.
pub type ScriptResult<T> = Result<T, Box<EvalAltResult>>;

/// Turn a host error into a script runtime fault carrying its message.
pub fn runtime_error(err: impl Display) -> Box<EvalAltResult> {
    err.to_string().into()
}
