//! Typed AST nodes for statements, declarations and function-like nodes.

use crate::ast::expr::{ArrowBody, ArrowFn, Expr, FnExpr, ObjectMethod};
use crate::ast::pat::{Name, ParamList, Pat};
use crate::ast::{ast_node, child_node, child_nodes, first_significant_token, AstNode};
use crate::cst::SyntaxNode;
use crate::syntax_kind::SyntaxKind;

// ── Source File ──────────────────────────────────────────────────────────

ast_node!(SourceFile, SOURCE_FILE);

impl SourceFile {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}

// ── Stmt enum ────────────────────────────────────────────────────────────

/// Any statement node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Stmt {
    VarDecl(VarDecl),
    FnDecl(FnDecl),
    Return(ReturnStmt),
    Block(Block),
    Expr(ExprStmt),
    /// Control flow, `throw`, `break`/`continue` and empty statements, which
    /// need no typed accessors of their own.
    Other(SyntaxNode),
}

impl Stmt {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let stmt = match node.kind() {
            SyntaxKind::VAR_DECL => Stmt::VarDecl(VarDecl { syntax: node }),
            SyntaxKind::FN_DECL => Stmt::FnDecl(FnDecl { syntax: node }),
            SyntaxKind::RETURN_STMT => Stmt::Return(ReturnStmt { syntax: node }),
            SyntaxKind::BLOCK_STMT => Stmt::Block(Block { syntax: node }),
            SyntaxKind::EXPR_STMT => Stmt::Expr(ExprStmt { syntax: node }),
            SyntaxKind::IF_STMT
            | SyntaxKind::WHILE_STMT
            | SyntaxKind::DO_WHILE_STMT
            | SyntaxKind::FOR_STMT
            | SyntaxKind::FOR_IN_STMT
            | SyntaxKind::SWITCH_STMT
            | SyntaxKind::TRY_STMT
            | SyntaxKind::THROW_STMT
            | SyntaxKind::BREAK_STMT
            | SyntaxKind::CONTINUE_STMT
            | SyntaxKind::EMPTY_STMT => Stmt::Other(node),
            _ => return None,
        };
        Some(stmt)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Stmt::VarDecl(n) => &n.syntax,
            Stmt::FnDecl(n) => &n.syntax,
            Stmt::Return(n) => &n.syntax,
            Stmt::Block(n) => &n.syntax,
            Stmt::Expr(n) => &n.syntax,
            Stmt::Other(n) => n,
        }
    }
}

// ── Declarations ─────────────────────────────────────────────────────────

ast_node!(VarDecl, VAR_DECL);

impl VarDecl {
    /// `var`, `let` or `const`.
    pub fn keyword(&self) -> Option<SyntaxKind> {
        first_significant_token(&self.syntax).map(|t| t.kind())
    }

    pub fn declarators(&self) -> impl Iterator<Item = VarDeclarator> + '_ {
        child_nodes(&self.syntax)
    }
}

ast_node!(VarDeclarator, VAR_DECLARATOR);

impl VarDeclarator {
    pub fn pattern(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }

    /// The initializer after `=`, if any.
    pub fn init(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(FnDecl, FN_DECL);

impl FnDecl {
    pub fn name(&self) -> Option<Name> {
        child_node(&self.syntax)
    }

    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }

    pub fn is_async(&self) -> bool {
        first_significant_token(&self.syntax).is_some_and(|t| t.text() == "async")
    }
}

// ── Statements ───────────────────────────────────────────────────────────

ast_node!(ReturnStmt, RETURN_STMT);

impl ReturnStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(Block, BLOCK_STMT);

impl Block {
    pub fn stmts(&self) -> impl Iterator<Item = Stmt> + '_ {
        self.syntax.children().filter_map(Stmt::cast)
    }
}

ast_node!(ExprStmt, EXPR_STMT);

impl ExprStmt {
    pub fn expr(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(CatchClause, CATCH_CLAUSE);

impl CatchClause {
    pub fn binding(&self) -> Option<Pat> {
        self.syntax.children().find_map(Pat::cast)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

// ── Function-like nodes ──────────────────────────────────────────────────

/// Anything that opens a function body: declarations, function and arrow
/// expressions, and object literal methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Function {
    Decl(FnDecl),
    Expr(FnExpr),
    Arrow(ArrowFn),
    Method(ObjectMethod),
}

/// A function body: a block, or an arrow function's expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FnBody {
    Block(Block),
    Expr(Expr),
}

impl Function {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FN_DECL => Some(Function::Decl(FnDecl { syntax: node })),
            SyntaxKind::FN_EXPR => FnExpr::cast(node).map(Function::Expr),
            SyntaxKind::ARROW_FN => ArrowFn::cast(node).map(Function::Arrow),
            SyntaxKind::OBJECT_METHOD => ObjectMethod::cast(node).map(Function::Method),
            _ => None,
        }
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Function::Decl(n) => &n.syntax,
            Function::Expr(n) => n.syntax(),
            Function::Arrow(n) => n.syntax(),
            Function::Method(n) => n.syntax(),
        }
    }

    /// The function's own name; arrow functions and methods have none.
    pub fn name(&self) -> Option<Name> {
        match self {
            Function::Decl(n) => n.name(),
            Function::Expr(n) => n.name(),
            Function::Arrow(_) | Function::Method(_) => None,
        }
    }

    pub fn param_list(&self) -> Option<ParamList> {
        match self {
            Function::Decl(n) => n.param_list(),
            Function::Expr(n) => n.param_list(),
            Function::Arrow(n) => n.param_list(),
            Function::Method(n) => n.param_list(),
        }
    }

    pub fn body(&self) -> Option<FnBody> {
        match self {
            Function::Decl(n) => n.body().map(FnBody::Block),
            Function::Expr(n) => n.body().map(FnBody::Block),
            Function::Method(n) => n.body().map(FnBody::Block),
            Function::Arrow(n) => n.body().map(|body| match body {
                ArrowBody::Block(b) => FnBody::Block(b),
                ArrowBody::Expr(e) => FnBody::Expr(e),
            }),
        }
    }
}
