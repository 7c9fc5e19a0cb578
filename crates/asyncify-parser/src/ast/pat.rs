//! Typed AST nodes for binding patterns.

use crate::ast::expr::Expr;
use crate::ast::{ast_node, child_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// Any binding pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pat {
    Name(Name),
    Object(ObjectPat),
    Array(ArrayPat),
    Assign(AssignPat),
    Rest(RestPat),
}

impl Pat {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::NAME => Some(Pat::Name(Name { syntax: node })),
            SyntaxKind::OBJECT_PAT => Some(Pat::Object(ObjectPat { syntax: node })),
            SyntaxKind::ARRAY_PAT => Some(Pat::Array(ArrayPat { syntax: node })),
            SyntaxKind::ASSIGN_PAT => Some(Pat::Assign(AssignPat { syntax: node })),
            SyntaxKind::REST_PAT => Some(Pat::Rest(RestPat { syntax: node })),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Pat::Name(n) => &n.syntax,
            Pat::Object(n) => &n.syntax,
            Pat::Array(n) => &n.syntax,
            Pat::Assign(n) => &n.syntax,
            Pat::Rest(n) => &n.syntax,
        }
    }

    /// Every name this pattern introduces, in source order.
    pub fn bound_names(&self) -> Vec<Name> {
        let mut names = Vec::new();
        collect_names(self.syntax(), &mut names);
        names
    }
}

/// Names under a pattern. Default values and computed keys are expressions,
/// so only NAME nodes reachable through pattern nodes count.
fn collect_names(node: &SyntaxNode, out: &mut Vec<Name>) {
    if let Some(name) = Name::cast(node.clone()) {
        out.push(name);
        return;
    }
    for child in node.children() {
        if child.kind().is_pattern() || child.kind() == SyntaxKind::PAT_PROP {
            collect_names(&child, out);
        }
    }
}

ast_node!(Name, NAME);

impl Name {
    pub fn ident(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

ast_node!(ObjectPat, OBJECT_PAT);
ast_node!(ArrayPat, ARRAY_PAT);

impl ArrayPat {
    pub fn elements(&self) -> impl Iterator<Item = Pat> + '_ {
        self.syntax.children().filter_map(Pat::cast)
    }
}

ast_node!(AssignPat, ASSIGN_PAT);

impl AssignPat {
    pub fn target(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }

    pub fn default_value(&self) -> Option<Expr> {
        self.syntax.children().skip(1).find_map(Expr::cast)
    }
}

ast_node!(RestPat, REST_PAT);

impl RestPat {
    pub fn target(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }
}

ast_node!(ParamList, PARAM_LIST);

impl ParamList {
    pub fn params(&self) -> impl Iterator<Item = Pat> + '_ {
        self.syntax.children().filter_map(Pat::cast)
    }
}

ast_node!(PatProp, PAT_PROP);

impl PatProp {
    /// The bound pattern; for shorthand `{ a }` this is the NAME itself.
    pub fn value(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }
}

impl ObjectPat {
    pub fn props(&self) -> impl Iterator<Item = PatProp> + '_ {
        self.syntax.children().filter_map(PatProp::cast)
    }
}
