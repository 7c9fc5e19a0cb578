//! Call-site listing for `asyncifyc check`.

use asyncify_common::span::LineIndex;
use asyncify_parser::ast::expr::CallExpr;
use asyncify_parser::ast::AstNode;
use asyncify_parser::SyntaxKind;
use asyncify_typeck::catalog::Catalog;
use asyncify_typeck::error::CompileError;
use asyncify_typeck::infer;
use serde_json::{json, Value};

/// One call expression with its resolved type.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// 1-based position of the call in the unrewritten input.
    pub line: u32,
    pub column: u32,
    pub callee: String,
    pub ty: String,
    pub suspended: bool,
}

impl CallSite {
    pub fn to_json(&self) -> Value {
        json!({
            "line": self.line,
            "column": self.column,
            "callee": self.callee,
            "type": self.ty,
            "suspended": self.suspended,
        })
    }
}

impl std::fmt::Display for CallSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} {}() -> {}", self.line, self.column, self.callee, self.ty)?;
        if self.suspended {
            write!(f, " [await]")?;
        }
        Ok(())
    }
}

/// Type `source` against a fresh table from `catalog` and list every call
/// in source order, with positions in `source` itself.
pub fn call_sites(source: &str, catalog: &Catalog) -> Result<Vec<CallSite>, CompileError> {
    let parse = asyncify_parser::parse(source);
    if !parse.ok() {
        return Err(CompileError::Parse(parse.errors().to_vec()));
    }
    let root = parse.syntax();
    let mut symbols = catalog.symbol_table();
    symbols.push_scope();
    let inference = infer::infer(&root, &mut symbols)?;

    let lines = LineIndex::new(source);
    let sites = root
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::CALL_EXPR)
        .filter_map(CallExpr::cast)
        .map(|call| {
            let range = call.syntax().text_range();
            let (line, column) = lines.line_col(range.start().into());
            let callee = call
                .callee()
                .map(|c| c.syntax().text().to_string())
                .unwrap_or_default();
            CallSite {
                line,
                column,
                callee: callee.split_whitespace().collect::<Vec<_>>().join(" "),
                ty: inference.type_of(call.syntax()).to_string(),
                suspended: inference.suspended.contains(&range),
            }
        })
        .collect();
    Ok(sites)
}
