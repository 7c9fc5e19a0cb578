//! Suspension rewrite: rebuild the tree with every suspended call wrapped in
//! `await`.
//!
//! The tree is rebuilt bottom-up through a `GreenNodeBuilder` while tracking
//! the output offset, so the type map can be re-keyed to the new ranges in
//! the same walk. A wrapped call is emitted once and never revisited.

use asyncify_parser::{SyntaxKind, SyntaxNode};
use rowan::{GreenNodeBuilder, NodeOrToken, TextRange, TextSize};
use rustc_hash::FxHashSet;

use crate::infer::TypeMap;
use crate::ty::Ty;

/// The rewritten tree and its re-keyed types.
#[derive(Debug)]
pub struct Rewritten {
    pub tree: SyntaxNode,
    pub types: TypeMap,
    /// Ranges of the wrapped calls in the new tree.
    pub awaited: Vec<TextRange>,
}

/// Wrap every call whose range is in `suspended` in an `AWAIT_EXPR`, adding
/// a `PAREN_EXPR` where the call's position requires one.
pub fn rewrite(root: &SyntaxNode, types: &TypeMap, suspended: &[TextRange]) -> Rewritten {
    let mut rw = Rewriter {
        builder: GreenNodeBuilder::new(),
        offset: TextSize::from(0),
        old_types: types,
        suspended: suspended.iter().copied().collect(),
        types: TypeMap::default(),
        awaited: Vec::new(),
    };
    rw.node(root);
    let green = rw.builder.finish();
    Rewritten {
        tree: SyntaxNode::new_root(green),
        types: rw.types,
        awaited: rw.awaited,
    }
}

struct Rewriter<'a> {
    builder: GreenNodeBuilder<'static>,
    offset: TextSize,
    old_types: &'a TypeMap,
    suspended: FxHashSet<TextRange>,
    types: TypeMap,
    awaited: Vec<TextRange>,
}

impl Rewriter<'_> {
    fn node(&mut self, node: &SyntaxNode) {
        let is_suspended =
            node.kind() == SyntaxKind::CALL_EXPR && self.suspended.contains(&node.text_range());
        if !is_suspended {
            self.copy(node);
            return;
        }

        let ty = self.old_types.get(&(node.kind(), node.text_range())).cloned();
        let parens = needs_parens(node);
        let outer_start = self.offset;
        if parens {
            self.builder.start_node(raw(SyntaxKind::PAREN_EXPR));
            self.token(SyntaxKind::L_PAREN, "(");
        }
        let await_start = self.offset;
        self.builder.start_node(raw(SyntaxKind::AWAIT_EXPR));
        self.token(SyntaxKind::AWAIT_KW, "await");
        self.token(SyntaxKind::WHITESPACE, " ");
        let call_start = self.offset;
        self.copy(node);
        self.awaited.push(TextRange::new(call_start, self.offset));
        self.builder.finish_node();
        self.record(SyntaxKind::AWAIT_EXPR, await_start, ty.clone());
        if parens {
            self.token(SyntaxKind::R_PAREN, ")");
            self.builder.finish_node();
            self.record(SyntaxKind::PAREN_EXPR, outer_start, ty);
        }
    }

    /// Emit `node` unchanged apart from rewrites below it.
    fn copy(&mut self, node: &SyntaxNode) {
        let start = self.offset;
        self.builder.start_node(raw(node.kind()));
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(child) => self.node(&child),
                NodeOrToken::Token(token) => self.token(token.kind(), token.text()),
            }
        }
        self.builder.finish_node();
        let ty = self.old_types.get(&(node.kind(), node.text_range())).cloned();
        self.record(node.kind(), start, ty);
    }

    fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.builder.token(raw(kind), text);
        self.offset += TextSize::of(text);
    }

    fn record(&mut self, kind: SyntaxKind, start: TextSize, ty: Option<Ty>) {
        if let Some(ty) = ty {
            self.types.insert((kind, TextRange::new(start, self.offset)), ty);
        }
    }
}

fn raw(kind: SyntaxKind) -> rowan::SyntaxKind {
    rowan::SyntaxKind(kind as u16)
}

/// `await` binds looser than member access, calls, `new` and the left side
/// of `**`, so a call in those positions needs parentheses once wrapped.
fn needs_parens(call: &SyntaxNode) -> bool {
    let Some(parent) = call.parent() else {
        return false;
    };
    let is_first_child = parent.first_child().as_ref() == Some(call);
    match parent.kind() {
        SyntaxKind::MEMBER_EXPR | SyntaxKind::INDEX_EXPR | SyntaxKind::CALL_EXPR | SyntaxKind::NEW_EXPR => {
            is_first_child
        }
        SyntaxKind::BINARY_EXPR => {
            is_first_child
                && parent
                    .children_with_tokens()
                    .filter_map(|it| it.into_token())
                    .any(|t| t.kind() == SyntaxKind::STAR_STAR)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_ranges(root: &SyntaxNode, text: &str) -> Vec<TextRange> {
        root.descendants()
            .filter(|n| n.kind() == SyntaxKind::CALL_EXPR && n.text() == text)
            .map(|n| n.text_range())
            .collect()
    }

    #[test]
    fn wraps_statement_level_call() {
        let root = asyncify_parser::parse("f(1);").syntax();
        let suspended = call_ranges(&root, "f(1)");
        let out = rewrite(&root, &TypeMap::default(), &suspended);
        assert_eq!(out.tree.to_string(), "await f(1);");
        assert_eq!(out.awaited, vec![TextRange::new(6.into(), 10.into())]);
    }

    #[test]
    fn parenthesizes_call_used_as_object() {
        let root = asyncify_parser::parse("f().g").syntax();
        let suspended = call_ranges(&root, "f()");
        let out = rewrite(&root, &TypeMap::default(), &suspended);
        assert_eq!(out.tree.to_string(), "(await f()).g");
    }

    #[test]
    fn parenthesizes_left_operand_of_exponent_only() {
        let root = asyncify_parser::parse("f() ** g()").syntax();
        let mut suspended = call_ranges(&root, "f()");
        suspended.extend(call_ranges(&root, "g()"));
        let out = rewrite(&root, &TypeMap::default(), &suspended);
        assert_eq!(out.tree.to_string(), "(await f()) ** await g()");
    }

    #[test]
    fn call_argument_is_not_parenthesized() {
        let root = asyncify_parser::parse("h(f())").syntax();
        let suspended = call_ranges(&root, "f()");
        let out = rewrite(&root, &TypeMap::default(), &suspended);
        assert_eq!(out.tree.to_string(), "h(await f())");
    }

    #[test]
    fn types_are_rekeyed_to_new_ranges() {
        let root = asyncify_parser::parse("x; f()").syntax();
        let call = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::CALL_EXPR)
            .unwrap();
        let cursor = Ty::object("Cursor", None, true);
        let mut types = TypeMap::default();
        types.insert((SyntaxKind::CALL_EXPR, call.text_range()), cursor.clone());

        let out = rewrite(&root, &types, &[call.text_range()]);
        assert_eq!(out.tree.to_string(), "x; await f()");
        let call_range = TextRange::new(9.into(), 12.into());
        let await_range = TextRange::new(3.into(), 12.into());
        assert_eq!(out.types.get(&(SyntaxKind::CALL_EXPR, call_range)), Some(&cursor));
        assert_eq!(out.types.get(&(SyntaxKind::AWAIT_EXPR, await_range)), Some(&cursor));
    }

    #[test]
    fn untouched_tree_prints_identically() {
        let src = "let a = 1; // note\nif (a) { b() }\n";
        let root = asyncify_parser::parse(src).syntax();
        let out = rewrite(&root, &TypeMap::default(), &[]);
        assert_eq!(out.tree.to_string(), src);
        assert!(out.awaited.is_empty());
    }
}
