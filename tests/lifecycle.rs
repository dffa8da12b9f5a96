//! Interpreter lifecycle: initialization, the process slot and teardown.

mod common;

use pnr_script::config::BridgeConfig;
use pnr_script::error::BridgeError;
use pnr_script::scripting::{Interpreter, LifecycleState};
use serial_test::serial;
use tracing_test::traced_test;

#[test]
#[serial]
fn initialize_then_teardown() {
    let mut interp = Interpreter::new(common::config());
    assert_eq!(interp.state(), LifecycleState::Uninitialized);
    assert!(interp.catalog().is_none());

    interp.try_initialize(Some("/usr/bin/pnr-flow")).unwrap();
    assert!(interp.is_ready());
    assert_eq!(interp.executable(), Some("/usr/bin/pnr-flow"));
    assert_eq!(interp.catalog().map(|c| c.arch()), Some("ecp5"));

    interp.teardown();
    assert_eq!(interp.state(), LifecycleState::Closed);
    assert!(interp.executable().is_none());
}

#[test]
#[serial]
fn executable_defaults_to_program_name() {
    let mut interp = common::ready();
    assert_eq!(interp.executable(), Some("pnr-test"));

    let argv: rhai::Array = interp
        .try_execute_source("pnr::ARGV")
        .unwrap()
        .cast();
    assert_eq!(argv.len(), 1);
    assert_eq!(argv[0].clone().into_string().unwrap(), "pnr-test");
    interp.teardown();
}

#[test]
#[serial]
fn second_initialize_is_rejected() {
    let mut interp = common::ready();
    let err = interp.try_initialize(None).unwrap_err();
    assert!(matches!(err, BridgeError::AlreadyInitialized));
    assert!(interp.is_ready());
    interp.teardown();
}

#[test]
#[serial]
fn only_one_interpreter_per_process() {
    let mut first = common::ready();
    let mut second = Interpreter::new(common::config());
    let err = second.try_initialize(None).unwrap_err();
    assert!(matches!(err, BridgeError::AlreadyInitialized));
    assert_eq!(second.state(), LifecycleState::Uninitialized);

    first.teardown();
    second.try_initialize(None).unwrap();
    second.teardown();
}

#[test]
#[serial]
fn closed_interpreter_cannot_be_reused() {
    let mut interp = common::ready();
    interp.teardown();

    assert!(matches!(interp.try_initialize(None), Err(BridgeError::Closed)));
    assert!(matches!(
        interp.try_execute_source("1"),
        Err(BridgeError::Closed)
    ));
}

#[test]
#[serial]
fn execution_before_initialize_is_rejected() {
    let mut interp = Interpreter::new(common::config());
    assert!(matches!(
        interp.try_execute_source("1"),
        Err(BridgeError::NotReady)
    ));
}

#[test]
#[serial]
fn repeated_cycles_register_types_afresh() {
    for _ in 0..3 {
        let mut interp = common::ready();
        let x: i64 = interp
            .try_execute_source("ecp5::Location(5, 6).x")
            .unwrap()
            .cast();
        assert_eq!(x, 5);
        interp.teardown();
    }
}

#[test]
#[serial]
fn unknown_family_is_rejected_without_claiming_the_slot() {
    let mut interp = Interpreter::new(BridgeConfig {
        arch: "ice40".to_string(),
        ..common::config()
    });
    let err = interp.try_initialize(None).unwrap_err();
    assert!(matches!(err, BridgeError::UnknownArch(ref a) if a == "ice40"));

    let mut other = common::ready();
    other.teardown();
}

#[test]
#[serial]
#[traced_test]
fn teardown_when_not_ready_only_warns() {
    let mut interp = Interpreter::new(common::config());
    interp.teardown();
    assert_eq!(interp.state(), LifecycleState::Uninitialized);
    assert!(logs_contain("teardown of a script runtime that is not ready"));
}

#[test]
#[serial]
#[traced_test]
fn dropping_a_ready_interpreter_releases_the_slot() {
    {
        let _interp = common::ready();
    }
    assert!(logs_contain("script runtime dropped without teardown"));

    let mut next = common::ready();
    next.teardown();
}

#[test]
#[serial]
fn root_module_reports_version_and_arch() {
    let mut interp = common::ready();
    let version: String = interp
        .try_execute_source("pnr::VERSION")
        .unwrap()
        .into_string()
        .unwrap();
    assert_eq!(version, env!("CARGO_PKG_VERSION"));

    let arch: String = interp
        .try_execute_source("pnr::ARCH")
        .unwrap()
        .into_string()
        .unwrap();
    assert_eq!(arch, "ecp5");
    interp.teardown();
}
