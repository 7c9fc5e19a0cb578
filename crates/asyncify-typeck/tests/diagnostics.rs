//! Rendered diagnostics for parse errors and the two rewrite errors.

use asyncify_typeck::catalog::Catalog;
use asyncify_typeck::diagnostics::{render_diagnostic, render_json, DiagnosticOptions};
use asyncify_typeck::error::CompileError;
use asyncify_typeck::AsyncWriter;

// ── Helpers ────────────────────────────────────────────────────────────

fn compile_error(src: &str) -> CompileError {
    AsyncWriter::from_catalog(&Catalog::bundled().unwrap())
        .compile(src)
        .expect_err("expected a compile error")
}

fn render_first_error(src: &str) -> String {
    render_diagnostic(&compile_error(src), src, "test.js", &DiagnosticOptions::colorless())
}

// ── Rendering ──────────────────────────────────────────────────────────

#[test]
fn parse_error_report() {
    let output = render_first_error("let x = (1 + ;");
    assert!(output.contains("[P0001]"), "{output}");
    assert!(output.contains("expected expression"), "{output}");
    assert!(output.contains("test.js"), "{output}");
}

#[test]
fn unclosed_block_points_at_opening_brace() {
    let output = render_first_error("if (a) {\n  db.coll.find()\n");
    assert!(output.contains("expected `}`"), "{output}");
    assert!(output.contains("block opened here"), "{output}");
}

#[test]
fn dynamic_database_access_report_has_hint() {
    let output = render_first_error("const name = 'users';\ndb[name].find()");
    assert!(output.contains("[A0001]"), "{output}");
    assert!(output.contains("Cannot access shell API attributes dynamically."), "{output}");
    assert!(output.contains("dynamic access on `Database`"), "{output}");
    assert!(
        output.contains("If you are accessing a collection try Database.get('collection')."),
        "{output}"
    );
}

#[test]
fn dynamic_collection_access_report_has_no_hint() {
    let output = render_first_error("db.coll[op]()");
    assert!(output.contains("[A0001]"), "{output}");
    assert!(output.contains("dynamic access on `Collection`"), "{output}");
    assert!(!output.contains("Database.get"), "{output}");
}

#[test]
fn conditional_return_report_labels_every_return() {
    let src = "function pick(a) {\n  if (a) return db.coll;\n  return null;\n}";
    let output = render_first_error(src);
    assert!(output.contains("[A0002]"), "{output}");
    assert!(output.contains("conditionally returns shell API values"), "{output}");
    assert_eq!(output.matches("returns here").count(), 2, "{output}");
}

#[test]
fn colored_output_contains_escape_codes() {
    let src = "db[x]";
    let err = compile_error(src);
    let options = DiagnosticOptions {
        color: true,
        json: false,
    };
    let output = render_diagnostic(&err, src, "test.js", &options);
    assert!(output.contains('\u{1b}'), "{output}");
}

// ── JSON ───────────────────────────────────────────────────────────────

#[test]
fn json_for_dynamic_access() {
    let values = render_json(&compile_error("db[x]"), "in.js");
    insta::assert_snapshot!(
        serde_json::to_string(&values[0]).unwrap(),
        @r#"{"code":"A0001","fix":"If you are accessing a collection try Database.get('collection').","file":"in.js","message":"Cannot access shell API attributes dynamically.","severity":"error","spans":[{"end":5,"label":"dynamic access on `Database`","start":0}]}"#
    );
}

#[test]
fn json_for_parse_error_includes_related_span() {
    let values = render_json(&compile_error("{ a"), "in.js");
    let v = &values[0];
    assert_eq!(v["code"], "P0001");
    assert_eq!(v["message"], "expected `}`");
    let spans = v["spans"].as_array().unwrap();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[1]["label"], "block opened here");
    assert_eq!(spans[1]["start"], 0);
}
