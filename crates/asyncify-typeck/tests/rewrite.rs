//! Await insertion, end to end: source in, rewritten source out.

use asyncify_typeck::catalog::Catalog;
use asyncify_typeck::AsyncWriter;
use insta::assert_snapshot;

// ── Helpers ────────────────────────────────────────────────────────────

fn writer() -> AsyncWriter {
    AsyncWriter::from_catalog(&Catalog::bundled().expect("bundled catalog"))
}

/// Compile against a fresh session and return the rewritten code.
fn compile_source(src: &str) -> String {
    writer()
        .compile_to_text(src)
        .unwrap_or_else(|err| panic!("compile failed for {src:?}: {err}"))
}

fn assert_compiles_to(src: &str, expected: &str) {
    assert_eq!(compile_source(src), expected, "source: {src:?}");
}

// ── Suspension ─────────────────────────────────────────────────────────

#[test]
fn promise_returning_call_is_awaited() {
    assert_snapshot!(compile_source("db.coll.find()"), @"await db.coll.find()");
}

#[test]
fn chained_calls_get_parenthesized() {
    assert_snapshot!(
        compile_source("db.coll.find().toArray()"),
        @"await (await db.coll.find()).toArray()"
    );
}

#[test]
fn synchronous_links_in_a_chain_stay_bare() {
    assert_snapshot!(
        compile_source("db.coll.find().limit(5).toArray()"),
        @"await (await db.coll.find()).limit(5).toArray()"
    );
}

#[test]
fn synchronous_call_is_left_alone() {
    assert_compiles_to("db.coll.getName()", "db.coll.getName()");
    assert_compiles_to("print('hi')", "print('hi')");
}

#[test]
fn get_collection_then_insert() {
    assert_snapshot!(
        compile_source("db.getCollection('users').insertOne({ a: 1 })"),
        @"await db.getCollection('users').insertOne({ a: 1 })"
    );
}

#[test]
fn sibling_database_members_are_collections() {
    assert_compiles_to(
        "db.getSiblingDB('admin').users.find()",
        "await db.getSiblingDB('admin').users.find()",
    );
}

#[test]
fn call_in_argument_position() {
    assert_compiles_to(
        "printjson(db.coll.findOne({}))",
        "printjson(await db.coll.findOne({}))",
    );
}

#[test]
fn assignment_rhs_is_awaited() {
    assert_snapshot!(
        compile_source("let x = 5; x = db.coll.find();"),
        @"let x = 5; x = await db.coll.find();"
    );
    assert_compiles_to("a = b = db.coll.count()", "a = b = await db.coll.count()");
}

#[test]
fn for_of_iterable_is_awaited() {
    assert_compiles_to(
        "for (const doc of db.coll.find()) { print(doc) }",
        "for (const doc of await db.coll.find()) { print(doc) }",
    );
}

#[test]
fn literal_computed_key_is_static() {
    assert_compiles_to("db['coll'].find()", "await db['coll'].find()");
}

#[test]
fn escaped_string_key_names_the_member() {
    assert_compiles_to("db.coll['fi\\u006ed']()", "await db.coll['fi\\u006ed']()");
    assert_compiles_to("db['co\\x6cl'].find()", "await db['co\\x6cl'].find()");
}

#[test]
fn database_get_yields_a_collection() {
    assert_compiles_to("db.get(name).find()", "await db.get(name).find()");
}

#[test]
fn calls_inside_template_interpolations_are_awaited() {
    assert_snapshot!(
        compile_source("print(`n = ${db.coll.find().toArray()}`)"),
        @"print(`n = ${await (await db.coll.find()).toArray()}`)"
    );
    assert_compiles_to(
        "`${`${db.coll.count()}`}`",
        "`${`${await db.coll.count()}`}`",
    );
}

#[test]
fn trivia_is_preserved_around_rewrites() {
    let src = "// list\nconst c = db.coll   /* x */;\n\nc.drop()  // bye";
    assert_snapshot!(
        compile_source(src),
        @r"
    // list
    const c = db.coll   /* x */;

    await c.drop()  // bye
    "
    );
}

#[test]
fn untouched_script_prints_identically() {
    let src = "var a = [1, 2, 3].map(x => x * 2);\nif (a.length) { print(a) } else { print('none') }\n";
    assert_compiles_to(src, src);
}

// ── Existing awaits ────────────────────────────────────────────────────

#[test]
fn explicit_await_is_not_doubled() {
    assert_compiles_to("await db.coll.find()", "await db.coll.find()");
    assert_compiles_to("await (db.coll.find())", "await (db.coll.find())");
}

#[test]
fn compiling_twice_changes_nothing() {
    for src in [
        "db.coll.find().toArray()",
        "let x = db.coll.insertOne({}); x.insertedId",
        "function f() { return db.coll.find(); }\nf()",
    ] {
        let once = compile_source(src);
        let twice = compile_source(&once);
        assert_eq!(once, twice, "source: {src:?}");
    }
}

#[test]
fn typing_is_idempotent() {
    let mut w = writer();
    let first = w.compile("db.coll.find().toArray()").unwrap();
    let second = writer().compile(&first.code).unwrap();
    assert_eq!(first.code, second.code);
    assert_eq!(first.types, second.types);
}

// ── Functions ──────────────────────────────────────────────────────────

#[test]
fn return_type_flows_to_call_sites() {
    assert_snapshot!(
        compile_source("function f() { return db.coll; }\nf().find()"),
        @r"
    function f() { return db.coll; }
    await f().find()
    "
    );
}

#[test]
fn user_functions_are_never_promise_returning() {
    assert_snapshot!(
        compile_source("function g() { return db.coll.find(); }\ng()"),
        @r"
    function g() { return await db.coll.find(); }
    g()
    "
    );
}

#[test]
fn arrow_expression_body_is_the_return_type() {
    assert_compiles_to(
        "const h = () => db.coll;\nh().drop()",
        "const h = () => db.coll;\nawait h().drop()",
    );
}

#[test]
fn parameters_shadow_globals() {
    let src = "function f(db) { return db.coll.find(); }";
    assert_compiles_to(src, src);
}

#[test]
fn object_methods_are_rewritten() {
    assert_compiles_to(
        "const api = { list() { return db.coll.find(); } };",
        "const api = { list() { return await db.coll.find(); } };",
    );
}

// ── Sessions ───────────────────────────────────────────────────────────

#[test]
fn declarations_persist_across_inputs() {
    let mut w = writer();
    assert_eq!(w.compile_to_text("let c = db.coll").unwrap(), "let c = db.coll");
    assert_eq!(w.compile_to_text("c.find()").unwrap(), "await c.find()");
}

#[test]
fn failed_input_keeps_earlier_bindings() {
    let mut w = writer();
    assert!(w.compile("let c = db.coll; db[c]").is_err());
    assert_eq!(w.compile_to_text("c.drop()").unwrap(), "await c.drop()");
}
