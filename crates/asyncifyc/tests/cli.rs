//! End-to-end tests for the asyncifyc binary.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Locate the asyncifyc binary built by cargo.
fn asyncifyc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_asyncifyc"))
}

fn run(args: &[&str]) -> Output {
    Command::new(asyncifyc_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run asyncifyc")
}

fn write_script(dir: &Path, name: &str, source: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path.to_str().unwrap().to_string()
}

fn first_json(stderr: &str) -> serde_json::Value {
    let mut stream = serde_json::Deserializer::from_str(stderr).into_iter::<serde_json::Value>();
    stream
        .next()
        .expect("no JSON object in stderr")
        .expect("first JSON object is not valid")
}

// ── compile ──────────────────────────────────────────────────────────

#[test]
fn compile_file_prints_rewritten_code() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_script(dir.path(), "a.js", "db.coll.find().toArray()\n");

    let output = run(&["compile", &file]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "await (await db.coll.find()).toArray()\n"
    );
}

#[test]
fn compile_reads_stdin() {
    let mut child = Command::new(asyncifyc_bin())
        .args(["compile", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn asyncifyc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"let c = db.coll\nc.drop()")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "let c = db.coll\nawait c.drop()\n"
    );
}

#[test]
fn compile_json_diagnostic_for_dynamic_access() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_script(dir.path(), "dyn.js", "db[name].find()\n");

    let output = run(&["compile", "--json", &file]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains('\u{1b}'), "unexpected ANSI codes: {stderr}");
    let json = first_json(&stderr);
    assert_eq!(json["code"], "A0001");
    assert_eq!(json["severity"], "error");
    assert_eq!(json["message"], "Cannot access shell API attributes dynamically.");
    assert_eq!(json["fix"], "If you are accessing a collection try Database.get('collection').");
    assert_eq!(json["spans"][0]["start"], 0);
    assert_eq!(json["spans"][0]["end"], 8);
    assert!(json["file"].as_str().unwrap().ends_with("dyn.js"));
}

#[test]
fn compile_parse_error_without_color() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_script(dir.path(), "bad.js", "db.coll.find(\n");

    let output = run(&["compile", "--no-color", &file]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[P0001]"), "{stderr}");
    assert!(!stderr.contains('\u{1b}'), "{stderr}");
}

#[test]
fn compile_with_custom_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_script(
        dir.path(),
        "catalog.json",
        r#"{ "scope": { "fetch": { "type": "function", "returnsPromise": true } } }"#,
    );
    let file = write_script(dir.path(), "a.js", "fetch(1); db.coll.find()");

    let output = run(&["compile", "--catalog", &catalog, &file]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "await fetch(1); db.coll.find()\n"
    );
}

#[test]
fn invalid_catalog_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_script(dir.path(), "catalog.json", r#"{ "scope": { "db": "Database" } }"#);
    let file = write_script(dir.path(), "a.js", "db");

    let output = run(&["compile", "--json", "--catalog", &catalog, &file]);
    assert_eq!(output.status.code(), Some(1));
    let json = first_json(&String::from_utf8_lossy(&output.stderr));
    assert_eq!(json["code"], "C0001");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("refers to unknown type `Database`"));
}

#[test]
fn missing_input_file() {
    let output = run(&["compile", "/nonexistent/script.js"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: Failed to read"));
}

// ── check ────────────────────────────────────────────────────────────

#[test]
fn check_lists_call_sites() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_script(dir.path(), "a.js", "print(1)\ndb.coll.insertOne({})\n");

    let output = run(&["check", &file]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "1:1 print() -> unknown\n2:1 db.coll.insertOne() -> InsertOneResult [await]\n"
    );
}

#[test]
fn check_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_script(dir.path(), "a.js", "db.coll.find()");

    let output = run(&["check", "--json", &file]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(line["callee"], "db.coll.find");
    assert_eq!(line["type"], "Cursor");
    assert_eq!(line["suspended"], true);
    assert_eq!(line["line"], 1);
}

#[test]
fn check_reports_conditional_return() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_script(
        dir.path(),
        "a.js",
        "function f(a) { if (a) return db.coll; return 0; }",
    );

    let output = run(&["check", "--json", &file]);
    assert_eq!(output.status.code(), Some(1));
    let json = first_json(&String::from_utf8_lossy(&output.stderr));
    assert_eq!(json["code"], "A0002");
    assert_eq!(json["spans"].as_array().unwrap().len(), 3);
}

// ── repl ─────────────────────────────────────────────────────────────

#[test]
fn repl_subcommand_is_available() {
    let output = run(&["repl", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--catalog"));
}
