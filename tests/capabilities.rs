mod common;

use common::{logs_of, run, ScriptedNetwork, TestHost};
use fnl::host::DrawOp;
use pretty_assertions::assert_eq;

#[test]
fn test_surface_size() {
    assert_eq!(
        logs_of("log fnl:width\nlog fnl:height\nlog fnl.height"),
        vec!["320", "240", "240"]
    );
}

#[test]
fn test_elapsed_time_uses_the_clock() {
    // The fake clock never advances.
    assert_eq!(logs_of("log fnl:performance"), vec!["0"]);
}

#[test]
fn test_random_scales_the_draw() {
    let mut host = TestHost::new();
    host.random = 0.25;
    let outcome = host.run("var r = random 1 10\nlog ref:r\nlog round ref:r");
    assert_eq!(outcome.logs, vec!["3.5", "4"]);
}

#[test]
fn test_round_matches_math_round() {
    assert_eq!(
        logs_of("log round 2.5\nlog round -2.5\nlog round 2.4"),
        vec!["3", "-2", "2"]
    );
}

#[test]
fn test_capability_missing_argument() {
    let outcome = run("log round");
    assert_eq!(outcome.errors, vec!["Missing argument for 'round'. Line: 1"]);
    assert_eq!(outcome.exit_code, 1);
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

#[test]
fn test_rend_fills_a_rectangle() {
    let outcome = run(r##"rend "sqr", "#ff0000", 10, 20, fnl:width / 2, 5"##);
    assert!(outcome.errors.is_empty());
    assert_eq!(
        outcome.ops,
        vec![
            DrawOp::FillColor("#ff0000".into()),
            DrawOp::FillRect { x: 10.0, y: 20.0, w: 160.0, h: 5.0 },
        ]
    );
}

#[test]
fn test_rend_coordinates_are_expressions() {
    let outcome = run("var x = 4\nrend \"sqr\", 'blue', ref:x * 2, 0, 1, 1");
    assert_eq!(
        outcome.ops,
        vec![
            DrawOp::FillColor("blue".into()),
            DrawOp::FillRect { x: 8.0, y: 0.0, w: 1.0, h: 1.0 },
        ]
    );
}

#[test]
fn test_rend_ignores_other_shapes() {
    let outcome = run(r#"rend "circle", "red", 1, 1, 1, 1"#);
    assert!(outcome.ops.is_empty());
    assert!(outcome.errors.is_empty());
}

#[test]
fn test_rend_needs_six_parts() {
    let outcome = run(r#"rend "sqr", "red", 1"#);
    assert_eq!(outcome.errors, vec!["6 inputs expected. Line: 1"]);
    assert!(outcome.ops.is_empty());
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[test]
fn test_store_survives_between_runs() {
    let mut host = TestHost::new();
    let first = host.run(r#"fnl:idbSet "best" 42"#);
    assert!(first.errors.is_empty());

    let second = host.run(r#"log fnl:idbGet "best"; log fnl:idbGet "other""#);
    assert_eq!(second.logs, vec!["42", "null"]);
}

#[test]
fn test_store_keeps_a_snapshot() {
    let src = "\
var a = [1,2]
fnl:idbSet \"a\" ref:a
var t = ref:a push 3
var b = fnl:idbGet \"a\"
log ref:b";
    assert_eq!(logs_of(src), vec!["[1,2]"]);
}

#[test]
fn test_store_set_needs_two_inputs() {
    let outcome = run(r#"fnl:idbSet "k""#);
    assert_eq!(outcome.errors, vec!["2 inputs expected. Line: 1"]);
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

#[test]
fn test_fetch_returns_a_response_record() {
    let mut host = TestHost::new();
    host.network = ScriptedNetwork::default().with("https://example.test/hi", 200, "hello");
    let outcome = host.run(r#"var r = fnl:fetch "https://example.test/hi"; log ref:r"#);
    assert_eq!(
        outcome.logs,
        vec![r#"{"status":200,"ok":true,"headers":{"content-type":"text/plain"},"body":"hello"}"#]
    );
}

#[test]
fn test_fetch_error_status_is_not_a_failure() {
    let mut host = TestHost::new();
    host.network = ScriptedNetwork::default().with("https://example.test/gone", 404, "");
    let outcome = host.run(r#"var r = fnl:fetch "https://example.test/gone"; log "ok""#);
    assert_eq!(outcome.logs, vec!["ok"]);
    assert_eq!(outcome.exit_code, 0);
}

#[test]
fn test_fetch_failure_halts() {
    let outcome = run(r#"var r = fnl:fetch "https://nowhere.test"; log "after""#);
    assert!(outcome.logs.is_empty());
    assert_eq!(outcome.errors, vec!["Failed to fetch 'https://nowhere.test'. Line: 1"]);
    assert_eq!(outcome.exit_code, 1);
}
