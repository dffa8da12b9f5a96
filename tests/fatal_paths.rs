//! Fatal entry points terminate the process.
//!
//! Each test re-runs this test binary filtered to itself with
//! `PNR_SCRIPT_FATAL_CHILD` set. The child performs the fatal call; the
//! parent checks the exit status and the diagnostic on stderr.

mod common;

use std::process::{Command, Output};

use pnr_script::scripting::fatal::FATAL_EXIT_CODE;
use pnr_script::scripting::{HostObject, Interpreter};

const CHILD_ENV: &str = "PNR_SCRIPT_FATAL_CHILD";

fn in_child() -> bool {
    std::env::var_os(CHILD_ENV).is_some()
}

fn run_child(test_name: &str) -> Output {
    let exe = std::env::current_exe().unwrap();
    Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .unwrap()
}

fn assert_fatal(output: &Output, needle: &str) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(FATAL_EXIT_CODE), "stderr: {stderr}");
    assert!(stderr.contains(needle), "stderr: {stderr}");
}

#[test]
fn double_initialize_is_fatal() {
    if in_child() {
        let mut interp = Interpreter::new(common::config());
        interp.initialize(None);
        interp.initialize(None);
        unreachable!("second initialize returned");
    }
    let output = run_child("double_initialize_is_fatal");
    assert_fatal(&output, "already initialized");
}

#[test]
fn missing_script_file_is_fatal() {
    if in_child() {
        let mut interp = Interpreter::new(common::config());
        interp.initialize(None);
        let _ = interp.execute_file("/nonexistent/path.rhai");
        unreachable!("execute_file returned");
    }
    let output = run_child("missing_script_file_is_fatal");
    assert_fatal(&output, "file not found: /nonexistent/path.rhai");
}

#[test]
fn injecting_an_unregistered_type_is_fatal() {
    if in_child() {
        let mut interp = Interpreter::new(common::config());
        interp.initialize(None);
        let value = HostObject::new(vec![1_u8, 2, 3]);
        interp.inject_global("bytes", &value);
        unreachable!("inject_global returned");
    }
    let output = run_child("injecting_an_unregistered_type_is_fatal");
    assert_fatal(
        &output,
        "Unable to inject global object 'bytes' into script runtime",
    );
}

#[test]
fn execution_before_initialize_is_fatal() {
    if in_child() {
        let mut interp = Interpreter::new(common::config());
        let _ = interp.execute_source("1");
        unreachable!("execute_source returned");
    }
    let output = run_child("execution_before_initialize_is_fatal");
    assert_fatal(&output, "not initialized");
}

#[test]
fn script_faults_are_not_fatal() {
    if in_child() {
        let mut interp = Interpreter::new(common::config());
        interp.initialize(None);
        let fault = interp.execute_source("throw 1").unwrap_err();
        eprintln!("child survived: {}", fault.category_name());
        interp.teardown();
        return;
    }
    let output = run_child("script_faults_are_not_fatal");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("child survived: RuntimeError"), "stderr: {stderr}");
}
