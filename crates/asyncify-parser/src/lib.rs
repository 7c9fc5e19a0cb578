//! Parser for the shell scripting dialect: an event-based recursive descent
//! parser producing a lossless rowan CST, plus typed AST wrappers.
//!
//! The CST keeps every token, whitespace and comments included, so
//! `parse(src).syntax().to_string() == src` for any input.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

use std::fmt::Write;

pub use cst::{ShellLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

/// Result of parsing a script.
///
/// With the first-error-only strategy, `errors` holds at most one error.
#[derive(Debug, Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &rowan::GreenNode {
        &self.green
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Lex and parse a script into a SOURCE_FILE tree.
pub fn parse(source: &str) -> Parse {
    let tokens = asyncify_lexer::Lexer::tokenize(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::statements::parse_source_file(&mut p);
    let (green, errors) = p.build_tree();
    Parse { green, errors }
}

/// Indented dump of a tree, one node or token per line:
///
/// ```text
/// SOURCE_FILE@0..2
///   EXPR_STMT@0..1
///     NAME_REF@0..1
///       IDENT@0..1 "x"
///   NEWLINE@1..2 "\n"
///   EOF@2..2 ""
/// ```
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for event in node.preorder_with_tokens() {
        let element = match event {
            rowan::WalkEvent::Enter(element) => element,
            rowan::WalkEvent::Leave(element) => {
                if element.as_node().is_some() {
                    depth -= 1;
                }
                continue;
            }
        };
        if !out.is_empty() {
            out.push('\n');
        }
        let range = element.text_range();
        let _ = write!(
            out,
            "{:indent$}{:?}@{}..{}",
            "",
            element.kind(),
            u32::from(range.start()),
            u32::from(range.end()),
            indent = depth * 2
        );
        match element {
            rowan::NodeOrToken::Node(_) => depth += 1,
            rowan::NodeOrToken::Token(token) => {
                let _ = write!(out, " {:?}", token.text());
            }
        }
    }
    out
}
