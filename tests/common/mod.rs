//! Helpers shared by the integration tests.
//!
//! Every test that initializes an interpreter claims the process-wide slot,
//! so those tests are `#[serial]`.

#![allow(dead_code)]

use pnr_core::{BelId, Location, PipId, WireId};
use pnr_script::config::BridgeConfig;
use pnr_script::context::DesignContext;
use pnr_script::scripting::{HostObject, Interpreter};

pub fn config() -> BridgeConfig {
    BridgeConfig {
        program_name: "pnr-test".to_string(),
        ..BridgeConfig::default()
    }
}

/// A ready interpreter on the default configuration.
pub fn ready() -> Interpreter {
    ready_with(config())
}

pub fn ready_with(config: BridgeConfig) -> Interpreter {
    let mut interp = Interpreter::new(config);
    interp.try_initialize(None).expect("initialize");
    interp
}

/// A ready interpreter with a fresh design injected as `ctx`.
pub fn ready_with_ctx() -> (Interpreter, HostObject<DesignContext>) {
    let mut interp = ready();
    let ctx = HostObject::new(DesignContext::new("top", "ecp5"));
    interp.try_inject_global("ctx", &ctx).expect("inject ctx");
    (interp, ctx)
}

pub fn bel(x: i16, y: i16, index: i16) -> BelId {
    BelId::new(Location::new(x, y), index)
}

pub fn wire(x: i16, y: i16, index: i16) -> WireId {
    WireId::new(Location::new(x, y), index)
}

pub fn pip(x: i16, y: i16, index: i16) -> PipId {
    PipId::new(Location::new(x, y), index)
}
