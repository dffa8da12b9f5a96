//! Execution gateway: shared namespace, faults as values, files and limits.

mod common;

use std::io::Write;

use pnr_script::config::BridgeConfig;
use pnr_script::error::BridgeError;
use pnr_script::scripting::FaultCategory;
use serial_test::serial;
use tracing_test::traced_test;

fn script_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".rhai")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn bindings_and_functions_persist_across_executions() {
    let mut interp = common::ready();
    interp
        .execute_source("fn double(x) { x * 2 } let base = 21; const LIMIT = 100;")
        .unwrap();

    let value = interp.execute_source("double(base)").unwrap();
    assert_eq!(value.as_int().unwrap(), 42);

    let limit = interp.execute_source("LIMIT").unwrap();
    assert_eq!(limit.as_int().unwrap(), 100);
    interp.teardown();
}

#[test]
#[serial]
fn fault_is_returned_and_interpreter_stays_usable() {
    let mut interp = common::ready();

    let fault = interp
        .execute_source(r#"throw "router gave up on net clk""#)
        .unwrap_err();
    assert!(!fault.category_name().is_empty());
    assert_eq!(fault.category, FaultCategory::Runtime);
    assert!(fault.message.contains("router gave up on net clk"));

    let value = interp.execute_source("1+1").unwrap();
    assert_eq!(value.as_int().unwrap(), 2);
    interp.teardown();
}

#[test]
#[serial]
fn parse_error_is_a_fault() {
    let mut interp = common::ready();
    let fault = interp.execute_source("let = ;").unwrap_err();
    assert_eq!(fault.category, FaultCategory::Parse);
    assert!(fault.render().starts_with("ParseError: "));
    interp.teardown();
}

#[test]
#[serial]
fn try_variant_wraps_faults() {
    let mut interp = common::ready();
    let err = interp.try_execute_source("undefined_net").unwrap_err();
    match err {
        BridgeError::Script(fault) => assert_eq!(fault.category, FaultCategory::Name),
        other => panic!("unexpected error: {other}"),
    }
    interp.teardown();
}

#[test]
#[serial]
fn fault_trace_names_file_and_functions() {
    let file = script_file(
        "fn check(x) {\n    if x > 2 { throw \"too many\"; }\n}\ncheck(3);\n",
    );
    let mut interp = common::ready();
    let fault = interp.execute_file(file.path()).unwrap_err();

    let source = file.path().display().to_string();
    assert_eq!(fault.source_name.as_deref(), Some(source.as_str()));
    assert!(fault.trace.iter().any(|f| f.contains("'check'")));
    let rendered = fault.render();
    assert!(rendered.contains(&source));
    assert!(rendered.contains("line 2"));
    interp.teardown();
}

#[test]
#[serial]
fn files_share_the_namespace() {
    let first = script_file("let cells = 3;\nfn area(n) { n * 4 }\n");
    let second = script_file("area(cells)\n");

    let mut interp = common::ready();
    interp.execute_file(first.path()).unwrap();
    let value = interp.execute_file(second.path()).unwrap();
    assert_eq!(value.as_int().unwrap(), 12);
    interp.teardown();
}

#[test]
#[serial]
fn missing_file_is_recoverable_through_try_variant() {
    let mut interp = common::ready();
    let err = interp
        .try_execute_file("/nonexistent/path.rhai")
        .unwrap_err();
    assert!(matches!(err, BridgeError::NotFound { .. }));
    assert_eq!(err.to_string(), "file not found: /nonexistent/path.rhai");
    assert!(interp.is_ready());
    interp.teardown();
}

#[test]
#[serial]
fn validate_compiles_without_running() {
    let mut interp = common::ready();
    interp.validate_source("let side_effect = 1;").unwrap();
    assert!(matches!(
        interp.get_global("side_effect"),
        Err(BridgeError::UndefinedGlobal(_))
    ));

    let err = interp.validate_source("let x = ;").unwrap_err();
    assert!(matches!(err, BridgeError::Script(ref f) if f.category == FaultCategory::Parse));
    interp.teardown();
}

#[test]
#[serial]
fn host_globals_round_trip() {
    let mut interp = common::ready();
    interp.set_global("seed", 17_i64).unwrap();
    let value = interp.execute_source("seed * 2").unwrap();
    assert_eq!(value.as_int().unwrap(), 34);

    interp.execute_source("let result = `seed=${seed}`;").unwrap();
    let result = interp.get_global("result").unwrap();
    assert_eq!(result.into_string().unwrap(), "seed=17");

    assert!(matches!(
        interp.set_global("not valid", 1_i64),
        Err(BridgeError::InvalidName(_))
    ));
    interp.teardown();
}

#[test]
#[serial]
fn constants_cannot_be_overwritten_by_the_host() {
    let mut interp = common::ready();
    interp.execute_source("const SEED = 1;").unwrap();
    assert!(matches!(
        interp.set_global("SEED", 2_i64),
        Err(BridgeError::ConstantName(_))
    ));
    interp.teardown();
}

#[test]
#[serial]
fn operation_limit_terminates_runaway_scripts() {
    let mut interp = common::ready_with(BridgeConfig {
        max_operations: 1_000,
        ..common::config()
    });
    let fault = interp.execute_source("loop { }").unwrap_err();
    assert_eq!(fault.category, FaultCategory::Terminated);
    assert!(fault.message.contains("maximum 1000 operations"));

    let value = interp
        .execute_source("let x = 0; for i in 0..10 { x += 1; } x")
        .unwrap();
    assert_eq!(value.as_int().unwrap(), 10);
    interp.teardown();
}

#[test]
#[serial]
fn call_depth_limit_is_a_limit_fault() {
    let mut interp = common::ready_with(BridgeConfig {
        max_call_levels: 8,
        ..common::config()
    });
    let fault = interp
        .execute_source("fn down(n) { down(n + 1) } down(0)")
        .unwrap_err();
    assert_eq!(fault.category, FaultCategory::Limit);
    interp.teardown();
}

#[test]
#[serial]
#[traced_test]
fn script_debug_goes_to_the_log() {
    let mut interp = common::ready();
    interp
        .execute_source(r#"debug("placing column 4");"#)
        .unwrap();
    assert!(logs_contain("placing column 4"));
    interp.teardown();
}

#[test]
#[serial]
fn describe_uses_script_representation() {
    let mut interp = common::ready();
    let value = interp
        .execute_source("ecp5::BelId(ecp5::Location(3, 4), 2)")
        .unwrap();
    let text = interp.describe(&value);
    assert!(text.contains("BelId"), "{text}");
    assert!(text.contains('3') && text.contains('4'), "{text}");
    interp.teardown();
}

#[test]
#[serial]
fn imported_modules_persist_across_executions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("util.rhai"), "fn triple(x) { x * 3 }\n").unwrap();
    let path = dir.path().join("util").display().to_string();

    let mut interp = common::ready();
    let first = interp
        .execute_source(&format!(r#"import "{path}" as util; util::triple(2)"#))
        .unwrap();
    assert_eq!(first.as_int().unwrap(), 6);

    let second = interp.execute_source("util::triple(3)").unwrap();
    assert_eq!(second.as_int().unwrap(), 9);
    interp.teardown();
}

#[test]
#[serial]
fn imports_cannot_replace_builtin_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("fake.rhai"), "fn Location(x, y) { 0 }\n").unwrap();
    let path = dir.path().join("fake").display().to_string();

    let mut interp = common::ready();
    interp
        .execute_source(&format!(r#"import "{path}" as ecp5;"#))
        .unwrap();
    let x = interp.execute_source("ecp5::Location(5, 6).x").unwrap();
    assert_eq!(x.as_int().unwrap(), 5);
    interp.teardown();
}
