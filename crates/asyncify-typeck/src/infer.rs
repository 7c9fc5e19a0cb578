//! Type inference over a parsed script.
//!
//! One recursive walk. Scoping constructs and functions do their bookkeeping
//! on the way down; every node gets its type on the way up, after its
//! children. Calls whose callee resolves to a promise-returning function are
//! collected in `suspended` for the rewrite; the walk never mutates the tree.
//!
//! Function return types are collected on a stack of accumulators separate
//! from the lexical scope stack, one accumulator per enclosing function.

use asyncify_parser::ast::expr::{AssignExpr, CallExpr, Expr, IndexExpr, MemberExpr, NameRef};
use asyncify_parser::ast::pat::{ParamList, Pat};
use asyncify_parser::ast::stmt::{CatchClause, FnBody, Function, ReturnStmt, VarDeclarator};
use asyncify_parser::ast::AstNode;
use asyncify_parser::{SyntaxKind, SyntaxNode};
use rowan::TextRange;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::env::SymbolTable;
use crate::error::{RewriteError, DATABASE_ACCESS_HINT};
use crate::ty::{Ty, TyRef, COLLECTION_TYPE, DATABASE_TYPE};

/// Types keyed by node kind and range. The kind disambiguates nodes that
/// share a range, such as an expression statement and its expression.
pub type TypeMap = FxHashMap<(SyntaxKind, TextRange), Ty>;

/// Output of [`infer`].
#[derive(Debug, Default)]
pub struct Inference {
    pub types: TypeMap,
    /// Ranges of call expressions to wrap in `await`, in post-order.
    pub suspended: Vec<TextRange>,
}

impl Inference {
    pub fn type_of(&self, node: &SyntaxNode) -> Ty {
        lookup(&self.types, node)
    }
}

fn lookup(types: &TypeMap, node: &SyntaxNode) -> Ty {
    types
        .get(&(node.kind(), node.text_range()))
        .cloned()
        .unwrap_or(Ty::Unknown)
}

/// What a node pushed on entry, undone on exit.
enum Entered {
    Nothing,
    Scope,
    Function,
}

struct Pass<'a> {
    symbols: &'a mut SymbolTable,
    out: Inference,
    returns: Vec<Vec<(Ty, TextRange)>>,
}

/// Type every node under `root` (normally a SOURCE_FILE).
///
/// The caller owns the scope `root` declares into. On error, scopes the walk
/// pushed are left on the stack; callers restore the depth they started at.
pub fn infer(root: &SyntaxNode, symbols: &mut SymbolTable) -> Result<Inference, RewriteError> {
    let mut pass = Pass {
        symbols,
        out: Inference::default(),
        returns: Vec::new(),
    };
    pass.visit(root)?;
    Ok(pass.out)
}

impl Pass<'_> {
    fn visit(&mut self, node: &SyntaxNode) -> Result<Ty, RewriteError> {
        let entered = self.enter(node);
        for child in node.children() {
            self.visit(&child)?;
        }
        let ty = match entered {
            Entered::Function => self.exit_function(node)?,
            Entered::Scope => {
                self.symbols.pop_scope();
                Ty::Unknown
            }
            Entered::Nothing => self.exit(node)?,
        };
        self.out
            .types
            .insert((node.kind(), node.text_range()), ty.clone());
        Ok(ty)
    }

    fn type_of(&self, node: &SyntaxNode) -> Ty {
        lookup(&self.out.types, node)
    }

    fn enter(&mut self, node: &SyntaxNode) -> Entered {
        match node.kind() {
            SyntaxKind::FN_DECL | SyntaxKind::FN_EXPR | SyntaxKind::ARROW_FN | SyntaxKind::OBJECT_METHOD => {
                self.returns.push(Vec::new());
                self.symbols.push_scope();
                if let Some(params) = Function::cast(node.clone()).and_then(|f| f.param_list()) {
                    self.declare_params(&params);
                }
                Entered::Function
            }
            SyntaxKind::CATCH_CLAUSE => {
                self.symbols.push_scope();
                let binding = CatchClause::cast(node.clone()).and_then(|c| c.binding());
                if let Some(pat) = binding {
                    self.declare_unknown(&pat);
                }
                Entered::Scope
            }
            SyntaxKind::BLOCK_STMT
            | SyntaxKind::FOR_STMT
            | SyntaxKind::FOR_IN_STMT
            | SyntaxKind::WHILE_STMT
            | SyntaxKind::DO_WHILE_STMT
            | SyntaxKind::SWITCH_STMT => {
                self.symbols.push_scope();
                Entered::Scope
            }
            _ => Entered::Nothing,
        }
    }

    fn declare_params(&mut self, params: &ParamList) {
        for param in params.params() {
            self.declare_unknown(&param);
        }
    }

    fn declare_unknown(&mut self, pat: &Pat) {
        for name in pat.bound_names() {
            if let Some(text) = name.text() {
                self.symbols.declare(text, Ty::Unknown);
            }
        }
    }

    fn exit(&mut self, node: &SyntaxNode) -> Result<Ty, RewriteError> {
        let range = node.text_range();
        let ty = match node.kind() {
            SyntaxKind::NAME_REF => {
                let name = NameRef::cast(node.clone()).and_then(|n| n.text());
                let ty = name
                    .as_deref()
                    .map(|name| self.symbols.lookup_type(name))
                    .unwrap_or(Ty::Unknown);
                trace!(?range, name = name.as_deref().unwrap_or(""), ty = %ty, "resolve identifier");
                ty
            }
            SyntaxKind::MEMBER_EXPR => self.exit_member(node),
            SyntaxKind::INDEX_EXPR => self.exit_index(node)?,
            SyntaxKind::CALL_EXPR => self.exit_call(node),
            SyntaxKind::VAR_DECLARATOR => {
                self.exit_declarator(node);
                Ty::Unknown
            }
            SyntaxKind::ASSIGN_EXPR => self.exit_assign(node),
            SyntaxKind::RETURN_STMT => {
                let ty = ReturnStmt::cast(node.clone())
                    .and_then(|r| r.expr())
                    .map(|e| self.type_of(e.syntax()))
                    .unwrap_or(Ty::Unknown);
                if let Some(acc) = self.returns.last_mut() {
                    acc.push((ty.clone(), range));
                }
                trace!(?range, ty = %ty, "return");
                ty
            }
            SyntaxKind::PAREN_EXPR | SyntaxKind::AWAIT_EXPR => node
                .children()
                .find_map(Expr::cast)
                .map(|inner| self.type_of(inner.syntax()))
                .unwrap_or(Ty::Unknown),
            _ => Ty::Unknown,
        };
        Ok(ty)
    }

    fn exit_member(&mut self, node: &SyntaxNode) -> Ty {
        let Some(member) = MemberExpr::cast(node.clone()) else {
            return Ty::Unknown;
        };
        let object = member
            .object()
            .map(|o| self.type_of(o.syntax()))
            .unwrap_or(Ty::Unknown);
        let Some(property) = member.property() else {
            return Ty::Unknown;
        };
        let ty = self.static_member(&object, property.text());
        trace!(range = ?node.text_range(), object = %object, property = property.text(), ty = %ty, "resolve member");
        ty
    }

    /// A statically named member. Unlisted members of the database handle
    /// are collections.
    fn static_member(&self, object: &Ty, property: &str) -> Ty {
        let Some(attributes) = object.attributes() else {
            return Ty::Unknown;
        };
        match attributes.get(property) {
            Some(ty) => ty.clone(),
            None if object.name() == DATABASE_TYPE => self.symbols.registry().resolve(COLLECTION_TYPE),
            None => Ty::Unknown,
        }
    }

    fn exit_index(&mut self, node: &SyntaxNode) -> Result<Ty, RewriteError> {
        let Some(index) = IndexExpr::cast(node.clone()) else {
            return Ok(Ty::Unknown);
        };
        let object = index
            .object()
            .map(|o| self.type_of(o.syntax()))
            .unwrap_or(Ty::Unknown);
        let literal_key = match index.index() {
            Some(Expr::Literal(lit)) => lit.property_name(),
            _ => None,
        };
        if let Some(key) = literal_key {
            let ty = self.static_member(&object, &key);
            trace!(range = ?node.text_range(), object = %object, property = %key, ty = %ty, "resolve literal index");
            return Ok(ty);
        }
        if object.has_async_child() {
            let hint = (object.name() == DATABASE_TYPE).then(|| DATABASE_ACCESS_HINT.to_string());
            return Err(RewriteError::UnresolvedAsyncDynamicAccess {
                object_type: object.name().to_string(),
                hint,
                span: node.text_range(),
            });
        }
        Ok(Ty::Unknown)
    }

    fn exit_call(&mut self, node: &SyntaxNode) -> Ty {
        let callee = CallExpr::cast(node.clone())
            .and_then(|c| c.callee())
            .map(|c| self.type_of(c.syntax()))
            .unwrap_or(Ty::Unknown);
        let Some(func) = callee.as_function() else {
            return Ty::Unknown;
        };
        let ty = self.symbols.registry().resolve_ref(&func.return_type);
        let range = node.text_range();
        if func.returns_promise {
            if is_awaited(node) {
                trace!(?range, ty = %ty, "call already awaited");
            } else {
                self.out.suspended.push(range);
            }
        }
        trace!(?range, ty = %ty, suspends = func.returns_promise, "resolve call");
        ty
    }

    fn exit_declarator(&mut self, node: &SyntaxNode) {
        let Some(decl) = VarDeclarator::cast(node.clone()) else {
            return;
        };
        let init = decl
            .init()
            .map(|e| self.type_of(e.syntax()))
            .unwrap_or(Ty::Unknown);
        match decl.pattern() {
            Some(Pat::Name(name)) => {
                if let Some(text) = name.text() {
                    trace!(range = ?node.text_range(), name = %text, ty = %init, "bind declarator");
                    self.symbols.update(&text, init);
                }
            }
            Some(pat) => {
                for name in pat.bound_names() {
                    if let Some(text) = name.text() {
                        self.symbols.update(&text, Ty::Unknown);
                    }
                }
            }
            None => {}
        }
    }

    fn exit_assign(&mut self, node: &SyntaxNode) -> Ty {
        let Some(assign) = AssignExpr::cast(node.clone()) else {
            return Ty::Unknown;
        };
        let ty = assign
            .rhs()
            .map(|e| self.type_of(e.syntax()))
            .unwrap_or(Ty::Unknown);
        if let Some(Expr::NameRef(target)) = assign.lhs() {
            if let Some(name) = target.text() {
                trace!(range = ?node.text_range(), name = %name, ty = %ty, "assign");
                self.symbols.update(&name, ty.clone());
            }
        }
        ty
    }

    fn exit_function(&mut self, node: &SyntaxNode) -> Result<Ty, RewriteError> {
        self.symbols.pop_scope();
        let returns = self.returns.pop().unwrap_or_default();
        let Some(function) = Function::cast(node.clone()) else {
            return Ok(Ty::Unknown);
        };

        let return_type = match returns.as_slice() {
            [] => match function.body() {
                Some(FnBody::Expr(body)) => self.type_of(body.syntax()),
                _ => Ty::Unknown,
            },
            [(only, _)] => only.clone(),
            many => {
                if many.iter().any(|(ty, _)| ty.has_async_child()) {
                    return Err(RewriteError::AmbiguousConditionalReturnType {
                        span: node.text_range(),
                        returns: many.iter().map(|(_, range)| *range).collect(),
                    });
                }
                Ty::Unknown
            }
        };

        let ty = Ty::function(TyRef::Type(return_type), false);
        let name = function.name().and_then(|n| n.text());
        trace!(range = ?node.text_range(), name = name.as_deref().unwrap_or(""), ty = %ty, "function");
        if let Some(name) = name {
            self.symbols.declare(name, ty.clone());
        }
        Ok(ty)
    }
}

/// Whether `call` is already the operand of an `await`, looking through
/// parentheses.
fn is_awaited(call: &SyntaxNode) -> bool {
    let mut parent = call.parent();
    while let Some(node) = parent {
        match node.kind() {
            SyntaxKind::PAREN_EXPR => parent = node.parent(),
            SyntaxKind::AWAIT_EXPR => return true,
            _ => return false,
        }
    }
    false
}
