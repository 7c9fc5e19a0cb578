//! Typed AST nodes for expressions.

use crate::ast::pat::{Name, ParamList};
use crate::ast::stmt::Block;
use crate::ast::{ast_node, child_node, child_token, first_significant_token, AstNode};
use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

// ── Expr enum ────────────────────────────────────────────────────────────

/// Any expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(Literal),
    Template(TemplateExpr),
    NameRef(NameRef),
    This(ThisExpr),
    Array(ArrayExpr),
    Object(ObjectExpr),
    Paren(ParenExpr),
    Fn(FnExpr),
    Arrow(ArrowFn),
    Member(MemberExpr),
    Index(IndexExpr),
    Call(CallExpr),
    New(NewExpr),
    Unary(UnaryExpr),
    Update(UpdateExpr),
    Binary(BinaryExpr),
    Cond(CondExpr),
    Assign(AssignExpr),
    Await(AwaitExpr),
}

impl Expr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let expr = match node.kind() {
            SyntaxKind::LITERAL => Expr::Literal(Literal { syntax: node }),
            SyntaxKind::TEMPLATE_EXPR => Expr::Template(TemplateExpr { syntax: node }),
            SyntaxKind::NAME_REF => Expr::NameRef(NameRef { syntax: node }),
            SyntaxKind::THIS_EXPR => Expr::This(ThisExpr { syntax: node }),
            SyntaxKind::ARRAY_EXPR => Expr::Array(ArrayExpr { syntax: node }),
            SyntaxKind::OBJECT_EXPR => Expr::Object(ObjectExpr { syntax: node }),
            SyntaxKind::PAREN_EXPR => Expr::Paren(ParenExpr { syntax: node }),
            SyntaxKind::FN_EXPR => Expr::Fn(FnExpr { syntax: node }),
            SyntaxKind::ARROW_FN => Expr::Arrow(ArrowFn { syntax: node }),
            SyntaxKind::MEMBER_EXPR => Expr::Member(MemberExpr { syntax: node }),
            SyntaxKind::INDEX_EXPR => Expr::Index(IndexExpr { syntax: node }),
            SyntaxKind::CALL_EXPR => Expr::Call(CallExpr { syntax: node }),
            SyntaxKind::NEW_EXPR => Expr::New(NewExpr { syntax: node }),
            SyntaxKind::UNARY_EXPR => Expr::Unary(UnaryExpr { syntax: node }),
            SyntaxKind::UPDATE_EXPR => Expr::Update(UpdateExpr { syntax: node }),
            SyntaxKind::BINARY_EXPR => Expr::Binary(BinaryExpr { syntax: node }),
            SyntaxKind::COND_EXPR => Expr::Cond(CondExpr { syntax: node }),
            SyntaxKind::ASSIGN_EXPR => Expr::Assign(AssignExpr { syntax: node }),
            SyntaxKind::AWAIT_EXPR => Expr::Await(AwaitExpr { syntax: node }),
            _ => return None,
        };
        Some(expr)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Expr::Literal(n) => &n.syntax,
            Expr::Template(n) => &n.syntax,
            Expr::NameRef(n) => &n.syntax,
            Expr::This(n) => &n.syntax,
            Expr::Array(n) => &n.syntax,
            Expr::Object(n) => &n.syntax,
            Expr::Paren(n) => &n.syntax,
            Expr::Fn(n) => &n.syntax,
            Expr::Arrow(n) => &n.syntax,
            Expr::Member(n) => &n.syntax,
            Expr::Index(n) => &n.syntax,
            Expr::Call(n) => &n.syntax,
            Expr::New(n) => &n.syntax,
            Expr::Unary(n) => &n.syntax,
            Expr::Update(n) => &n.syntax,
            Expr::Binary(n) => &n.syntax,
            Expr::Cond(n) => &n.syntax,
            Expr::Assign(n) => &n.syntax,
            Expr::Await(n) => &n.syntax,
        }
    }
}

/// The `n`th expression child of `node`.
fn nth_expr(node: &SyntaxNode, n: usize) -> Option<Expr> {
    node.children().filter_map(Expr::cast).nth(n)
}

// ── Atoms ────────────────────────────────────────────────────────────────

ast_node!(Literal, LITERAL);

impl Literal {
    /// The literal token (NUMBER, STRING, REGEX, TRUE_KW, ...).
    pub fn token(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }

    /// The property name this literal denotes when used as a computed key:
    /// the string's value with escapes decoded, or the number's text.
    /// Regexes and keywords are not property names, and neither is a string
    /// whose escapes cannot be decoded.
    pub fn property_name(&self) -> Option<String> {
        let token = self.token()?;
        let text = token.text();
        match token.kind() {
            SyntaxKind::NUMBER => Some(text.to_string()),
            SyntaxKind::STRING if text.len() >= 2 => unescape(&text[1..text.len() - 1]),
            _ => None,
        }
    }
}

/// Decode the escape sequences of a quoted string body.
///
/// Returns `None` for legacy octal escapes, malformed `\x`/`\u` escapes
/// and unpaired surrogates.
pub fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            '0'..='9' => return None,
            'x' => {
                let code = hex_digits(&mut chars, 2)?;
                out.push(char::from_u32(code)?);
            }
            'u' => {
                let code = unicode_escape(&mut chars)?;
                if (0xD800..0xDC00).contains(&code) {
                    // A high surrogate must be followed by `\u` and a low one.
                    if chars.next()? != '\\' || chars.next()? != 'u' {
                        return None;
                    }
                    let low = unicode_escape(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return None;
                    }
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined)?);
                } else {
                    out.push(char::from_u32(code)?);
                }
            }
            // Line continuations produce nothing.
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }
    Some(out)
}

/// `XXXX` or `{X...}` after `\u`.
fn unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    if chars.peek() != Some(&'{') {
        return hex_digits(chars, 4);
    }
    chars.next();
    let mut code: u32 = 0;
    let mut digits = 0;
    loop {
        let c = chars.next()?;
        if c == '}' {
            break;
        }
        code = code.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
        digits += 1;
    }
    (digits > 0 && code <= 0x10FFFF).then_some(code)
}

fn hex_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut code = 0;
    for _ in 0..count {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}

ast_node!(TemplateExpr, TEMPLATE_EXPR);

impl TemplateExpr {
    /// The expressions inside `${ }`, in source order.
    pub fn interpolations(&self) -> impl Iterator<Item = Expr> + '_ {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::INTERPOLATION)
            .filter_map(|n| nth_expr(&n, 0))
    }
}

ast_node!(NameRef, NAME_REF);

impl NameRef {
    pub fn ident(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::IDENT)
    }

    pub fn text(&self) -> Option<String> {
        self.ident().map(|t| t.text().to_string())
    }
}

ast_node!(ThisExpr, THIS_EXPR);

ast_node!(ArrayExpr, ARRAY_EXPR);

impl ArrayExpr {
    pub fn elements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::SPREAD_ELEMENT || Expr::cast(n.clone()).is_some())
    }
}

ast_node!(ObjectExpr, OBJECT_EXPR);

impl ObjectExpr {
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.syntax.children().filter_map(Property::cast)
    }
}

ast_node!(Property, PROPERTY);

impl Property {
    pub fn computed_key(&self) -> Option<ComputedKey> {
        child_node(&self.syntax)
    }

    /// The key token for non-computed keys.
    pub fn key(&self) -> Option<SyntaxToken> {
        if self.computed_key().is_some() {
            return None;
        }
        first_significant_token(&self.syntax)
    }

    /// The value expression; `None` for shorthand `{ a }`.
    pub fn value(&self) -> Option<Expr> {
        self.syntax.children().find_map(Expr::cast)
    }
}

ast_node!(ComputedKey, COMPUTED_KEY);

impl ComputedKey {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(ObjectMethod, OBJECT_METHOD);

impl ObjectMethod {
    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        child_node(&self.syntax)
    }
}

ast_node!(SpreadElement, SPREAD_ELEMENT);

impl SpreadElement {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(ParenExpr, PAREN_EXPR);

impl ParenExpr {
    pub fn expr(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

// ── Functions ────────────────────────────────────────────────────────────

ast_node!(FnExpr, FN_EXPR);

impl FnExpr {
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

ast_node!(ArrowFn, ARROW_FN);

/// An arrow function body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrowBody {
    Block(Block),
    Expr(Expr),
}

impl ArrowFn {
    pub fn param_list(&self) -> Option<ParamList> {
        child_node(&self.syntax)
    }

    pub fn body(&self) -> Option<ArrowBody> {
        self.syntax.children().find_map(|child| {
            Block::cast(child.clone())
                .map(ArrowBody::Block)
                .or_else(|| Expr::cast(child).map(ArrowBody::Expr))
        })
    }
}

// ── Access and calls ─────────────────────────────────────────────────────

ast_node!(MemberExpr, MEMBER_EXPR);

impl MemberExpr {
    pub fn object(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    /// The property name token after the `.`.
    pub fn property(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .skip_while(|t| t.kind() != SyntaxKind::DOT)
            .skip(1)
            .find(|t| !t.kind().is_trivia())
    }
}

ast_node!(IndexExpr, INDEX_EXPR);

impl IndexExpr {
    pub fn object(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn index(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }
}

ast_node!(CallExpr, CALL_EXPR);

impl CallExpr {
    pub fn callee(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }
}

ast_node!(NewExpr, NEW_EXPR);

impl NewExpr {
    pub fn callee(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn arg_list(&self) -> Option<ArgList> {
        child_node(&self.syntax)
    }
}

ast_node!(ArgList, ARG_LIST);

impl ArgList {
    /// Arguments, including SPREAD_ELEMENT nodes.
    pub fn args(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax
            .children()
            .filter(|n| n.kind() == SyntaxKind::SPREAD_ELEMENT || Expr::cast(n.clone()).is_some())
    }
}

// ── Operators ────────────────────────────────────────────────────────────

ast_node!(UnaryExpr, UNARY_EXPR);

impl UnaryExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }

    pub fn operand(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(UpdateExpr, UPDATE_EXPR);

impl UpdateExpr {
    pub fn op(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| matches!(t.kind(), SyntaxKind::PLUS_PLUS | SyntaxKind::MINUS_MINUS))
    }

    pub fn operand(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}

ast_node!(BinaryExpr, BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }
}

ast_node!(CondExpr, COND_EXPR);

impl CondExpr {
    pub fn condition(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn then_branch(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn else_branch(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 2)
    }
}

ast_node!(AssignExpr, ASSIGN_EXPR);

impl AssignExpr {
    /// The assignment target as written. Destructuring targets appear as
    /// ARRAY_EXPR / OBJECT_EXPR.
    pub fn lhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }

    pub fn rhs(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 1)
    }

    pub fn op(&self) -> Option<SyntaxToken> {
        first_significant_token(&self.syntax)
    }
}

ast_node!(AwaitExpr, AWAIT_EXPR);

impl AwaitExpr {
    pub fn operand(&self) -> Option<Expr> {
        nth_expr(&self.syntax, 0)
    }
}
