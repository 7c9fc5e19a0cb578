//! Shell API type inference and await insertion.
//!
//! Scripts written against the database shell look synchronous
//! (`db.coll.find().toArray()`), but many shell API calls return promises.
//! This crate infers shell API types statically and wraps every call whose
//! callee returns a promise in `await`.
//!
//! # Architecture
//!
//! - [`ty`]: the type model (function, object and unknown types)
//! - [`env`]: type registry and scope-stack symbol table
//! - [`catalog`]: loading the registry and root scope from JSON
//! - [`infer`]: the typing walk, which also finds the calls to suspend
//! - [`rewrite`]: rebuilding the tree with `await` inserted
//! - [`error`], [`diagnostics`]: errors and their rendering
//!
//! [`compile`] ties these together; [`AsyncWriter`] keeps one symbol table
//! across many inputs, the way a REPL session does.

pub mod catalog;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod infer;
pub mod rewrite;
pub mod ty;

use asyncify_parser::ast::stmt::{SourceFile, Stmt};
use asyncify_parser::ast::AstNode;
use asyncify_parser::SyntaxNode;
use rowan::TextRange;
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::env::SymbolTable;
use crate::error::CompileError;
use crate::infer::TypeMap;
use crate::ty::Ty;

/// Output of a successful [`compile`].
#[derive(Debug, Clone)]
pub struct Compiled {
    /// The rewritten tree; prints as `code`.
    pub tree: SyntaxNode,
    pub code: String,
    /// Node types keyed by kind and range in `tree`.
    pub types: TypeMap,
    /// Type of the last top-level expression statement, or `Unknown`.
    pub result_type: Ty,
    /// Ranges in `tree` of the calls that were wrapped in `await`.
    pub suspended: Vec<TextRange>,
}

impl Compiled {
    pub fn type_of(&self, node: &SyntaxNode) -> Ty {
        self.types
            .get(&(node.kind(), node.text_range()))
            .cloned()
            .unwrap_or(Ty::Unknown)
    }
}

/// Parse `source`, infer its types against `symbols` and insert `await`
/// where needed.
///
/// The first compile against a table pushes a program scope that stays on
/// the stack, so top-level declarations are visible to later compiles. If
/// the pass fails, every scope it opened is discarded; bindings it already
/// made in the program scope are kept.
#[instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn compile(source: &str, symbols: &mut SymbolTable) -> Result<Compiled, CompileError> {
    let parse = asyncify_parser::parse(source);
    if !parse.ok() {
        return Err(CompileError::Parse(parse.errors().to_vec()));
    }
    let root = parse.syntax();

    if symbols.depth() == 1 {
        symbols.push_scope();
    }
    let program_depth = symbols.depth();

    let inference = match infer::infer(&root, symbols) {
        Ok(inference) => inference,
        Err(err) => {
            symbols.restore_depth(program_depth);
            debug!(error = %err, "pass failed");
            return Err(err.into());
        }
    };

    let result_type = last_expression_type(&root, &inference);
    let rewritten = rewrite::rewrite(&root, &inference.types, &inference.suspended);
    let code = rewritten.tree.to_string();
    debug!(
        suspended = rewritten.awaited.len(),
        typed = rewritten.types.len(),
        result = %result_type,
        "compiled"
    );

    Ok(Compiled {
        tree: rewritten.tree,
        code,
        types: rewritten.types,
        result_type,
        suspended: rewritten.awaited,
    })
}

fn last_expression_type(root: &SyntaxNode, inference: &infer::Inference) -> Ty {
    let Some(file) = SourceFile::cast(root.clone()) else {
        return Ty::Unknown;
    };
    match file.stmts().last() {
        Some(Stmt::Expr(stmt)) => stmt
            .expr()
            .map(|e| inference.type_of(e.syntax()))
            .unwrap_or(Ty::Unknown),
        _ => Ty::Unknown,
    }
}

/// A rewriter bound to one symbol table.
///
/// Compiles are serialized through `&mut self`; declarations from one
/// input stay visible to the next.
#[derive(Debug, Clone)]
pub struct AsyncWriter {
    symbols: SymbolTable,
}

impl AsyncWriter {
    pub fn new(symbols: SymbolTable) -> Self {
        AsyncWriter { symbols }
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        AsyncWriter::new(catalog.symbol_table())
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub fn compile(&mut self, source: &str) -> Result<Compiled, CompileError> {
        compile(source, &mut self.symbols)
    }

    /// [`compile`](Self::compile), keeping only the code.
    pub fn compile_to_text(&mut self, source: &str) -> Result<String, CompileError> {
        self.compile(source).map(|compiled| compiled.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer() -> AsyncWriter {
        AsyncWriter::from_catalog(&Catalog::bundled().unwrap())
    }

    #[test]
    fn program_scope_is_pushed_once() {
        let mut w = writer();
        w.compile("let a = 1").unwrap();
        assert_eq!(w.symbols().depth(), 2);
        w.compile("let b = 2").unwrap();
        assert_eq!(w.symbols().depth(), 2);
        assert!(w.symbols().is_bound("a"));
    }

    #[test]
    fn parse_error_leaves_table_untouched() {
        let mut w = writer();
        let err = w.compile("let = ").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
        assert_eq!(w.symbols().depth(), 1);
    }

    #[test]
    fn failed_pass_discards_inner_scopes() {
        let mut w = writer();
        let err = w.compile("let c = db.coll; function f() { { c[k] } }").unwrap_err();
        assert!(matches!(err, CompileError::Rewrite(_)));
        assert_eq!(w.symbols().depth(), 2);
        assert_eq!(w.symbols().lookup_type("c").name(), "Collection");
    }

    #[test]
    fn result_type_is_last_expression() {
        let mut w = writer();
        assert_eq!(w.compile("db.coll").unwrap().result_type.name(), "Collection");
        assert!(w.compile("db.coll; let x = 1").unwrap().result_type.is_unknown());
    }
}
