//! # pnr-script
//!
//! Embedded Rhai scripting for a place-and-route engine. The host starts one
//! interpreter per process, injects its design context as `ctx`, and runs
//! automation scripts that see the fabric identifier types from
//! [`pnr_core`].
//!
//! ## Crate Structure
//!
//! - **`scripting`**: the [`Interpreter`](scripting::Interpreter) (lifecycle,
//!   execution gateway, object injection), the type registry and the
//!   bindings for the `types` and per-family namespaces.
//! - **`context`**: [`DesignContext`](context::DesignContext), the in-memory
//!   bel/wire/pip binding state scripts manipulate.
//! - **`repl`**: the interactive console.
//! - **`config`**: figment-backed [`BridgeConfig`](config::BridgeConfig).
//! - **`logging`**: tracing subscriber setup.
//! - **`error`**: [`BridgeError`](error::BridgeError) and friends.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod repl;
pub mod scripting;

pub use config::BridgeConfig;
pub use context::DesignContext;
pub use error::{BridgeError, BridgeResult};
pub use scripting::{HostObject, Interpreter, ScriptFault};
