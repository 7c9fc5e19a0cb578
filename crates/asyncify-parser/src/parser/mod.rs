//! Event-based parser.
//!
//! Parse functions call `open()` to start a node, `advance()` to consume a
//! token and `close()` to give the node its kind. `open_before()` wraps an
//! already closed node using a forward-parent link, which is how postfix and
//! infix forms (`a.b`, `f(x)`, `a = b`) adopt their left operand.
//! `build_tree()` replays the events into a rowan green tree.
//!
//! # Trivia
//!
//! Lookahead never sees whitespace, newlines or comments, and `Advance`
//! events only count significant tokens. `build_tree()` re-inserts the trivia:
//! trivia pending when a node opens is attached to the enclosing node, so
//! every node's text range starts at its first significant token. Trivia
//! pending when a token is consumed goes to the node that is open then.
//!
//! # Line breaks
//!
//! Newlines are insignificant except where the dialect's automatic semicolon
//! insertion cares: statement ends, `return`/`break`/`continue` operands and
//! postfix `++`/`--`. `at_line_break()` answers that question.

pub(crate) mod expressions;
pub(crate) mod patterns;
pub(crate) mod statements;

use asyncify_common::span::Span;
use asyncify_common::token::{Token, TokenKind};

use crate::error::ParseError;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    /// Start a node. `kind` is TOMBSTONE until `close()` patches it;
    /// `forward_parent` is set by `open_before()`.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    /// Consume one significant token (and the trivia before it).
    Advance,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    tokens: Vec<Token>,
    /// Index into `tokens`, trivia included.
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
    /// First-error-only: once set, further errors are dropped and loops bail.
    has_error: bool,
    /// `in` is not a binary operator while parsing a `for (...)` initializer.
    no_in: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
            has_error: false,
            no_in: false,
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Kind of the `n`th significant token ahead; `EOF` past the end.
    pub(crate) fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n)
            .map(|i| SyntaxKind::from(self.tokens[i].kind))
            .unwrap_or(SyntaxKind::EOF)
    }

    fn nth_index(&self, n: usize) -> Option<usize> {
        let mut remaining = n;
        let mut pos = self.pos;
        while pos < self.tokens.len() {
            if !self.tokens[pos].kind.is_trivia() {
                if remaining == 0 {
                    return Some(pos);
                }
                remaining -= 1;
            }
            pos += 1;
        }
        None
    }

    pub(crate) fn current_text(&self) -> &'src str {
        match self.nth_index(0) {
            Some(i) => self.tokens[i].span.text(self.source),
            None => "",
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.nth_index(0) {
            Some(i) => self.tokens[i].span,
            None => Span::empty_at(self.source.len() as u32),
        }
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Whether the current token is an identifier with the given text, for
    /// contextual words such as `of` and `async`.
    pub(crate) fn at_contextual(&self, word: &str) -> bool {
        self.at(SyntaxKind::IDENT) && self.current_text() == word
    }

    /// Whether a line terminator separates the previous significant token
    /// from the current one.
    pub(crate) fn at_line_break(&self) -> bool {
        self.tokens[self.pos..]
            .iter()
            .take_while(|t| t.kind.is_trivia())
            .any(|t| match t.kind {
                TokenKind::Newline => true,
                TokenKind::Comment => t.span.text(self.source).contains('\n'),
                _ => false,
            })
    }

    /// With the current token at `(`, whether the matching `)` is followed
    /// by `=>` (an arrow function's parameter list).
    pub(crate) fn paren_starts_arrow(&self) -> bool {
        let mut depth = 0u32;
        let mut n = 0;
        loop {
            match self.nth(n) {
                SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::L_BRACE => depth += 1,
                SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET | SyntaxKind::R_BRACE => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.nth(n + 1) == SyntaxKind::FAT_ARROW;
                    }
                }
                SyntaxKind::EOF => return false,
                _ => {}
            }
            n += 1;
        }
    }

    // ── Node management ────────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Open a node that will become the parent of `completed`.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = self.open();
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open {
            kind: slot_kind, ..
        } = &mut self.events[m.index]
        {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    // ── Token consumption ──────────────────────────────────────────────

    pub(crate) fn advance(&mut self) {
        while self.pos < self.tokens.len() && self.tokens[self.pos].kind.is_trivia() {
            self.pos += 1;
        }
        if self.pos < self.tokens.len() {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    /// Consume the current token inside an ERROR_NODE.
    pub(crate) fn advance_with_error(&mut self, message: &str) {
        let m = self.open();
        self.error(message);
        self.advance();
        self.close(m, SyntaxKind::ERROR_NODE);
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(&format!("expected {}", describe(kind)));
            false
        }
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Automatic semicolon insertion: a statement ends at `;`, before `}`,
    /// at end of input, or at a line break.
    pub(crate) fn consume_semicolon(&mut self) {
        if self.eat(SyntaxKind::SEMICOLON)
            || self.at(SyntaxKind::R_BRACE)
            || self.at(SyntaxKind::EOF)
            || self.at_line_break()
        {
            return;
        }
        self.error("expected `;` or a line break after statement");
    }

    // ── Errors ─────────────────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors.push(ParseError::new(message, span));
        self.has_error = true;
    }

    pub(crate) fn error_with_related(&mut self, message: &str, related_span: Span, related_msg: &str) {
        if self.has_error {
            return;
        }
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(message, span, related_msg, related_span));
        self.has_error = true;
    }

    pub(crate) fn has_error(&self) -> bool {
        self.has_error
    }

    /// Run `f` with `in` treated as an operator or not, restoring the flag.
    pub(crate) fn with_no_in<T>(&mut self, no_in: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.no_in, no_in);
        let result = f(self);
        self.no_in = saved;
        result
    }

    pub(crate) fn no_in(&self) -> bool {
        self.no_in
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Replay events into a green tree, following forward-parent chains so
    /// wrapper nodes open before the node they adopt.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos: usize = 0;
        let mut depth: usize = 0;
        let mut forward_parents: Vec<SyntaxKind> = Vec::new();

        for i in 0..self.events.len() {
            match self.events[i] {
                Event::Open {
                    kind,
                    forward_parent,
                } => {
                    if kind == SyntaxKind::TOMBSTONE && forward_parent.is_none() {
                        continue;
                    }

                    forward_parents.clear();
                    forward_parents.push(kind);
                    let mut next = forward_parent;
                    while let Some(idx) = next {
                        let Event::Open {
                            kind,
                            forward_parent,
                        } = std::mem::replace(
                            &mut self.events[idx],
                            Event::Open {
                                kind: SyntaxKind::TOMBSTONE,
                                forward_parent: None,
                            },
                        )
                        else {
                            break;
                        };
                        forward_parents.push(kind);
                        next = forward_parent;
                    }

                    if depth > 0 {
                        token_pos = self.emit_trivia(&mut builder, token_pos);
                    }
                    for &kind in forward_parents.iter().rev() {
                        if kind != SyntaxKind::TOMBSTONE {
                            builder.start_node(rowan::SyntaxKind(kind as u16));
                            depth += 1;
                        }
                    }
                }
                Event::Close => {
                    builder.finish_node();
                    depth -= 1;
                }
                Event::Advance => {
                    token_pos = self.emit_trivia(&mut builder, token_pos);
                    if let Some(token) = self.tokens.get(token_pos) {
                        let kind = SyntaxKind::from(token.kind);
                        builder.token(rowan::SyntaxKind(kind as u16), token.span.text(self.source));
                        token_pos += 1;
                    }
                }
            }
        }

        (builder.finish(), self.errors)
    }

    fn emit_trivia(&self, builder: &mut rowan::GreenNodeBuilder<'static>, mut token_pos: usize) -> usize {
        while let Some(token) = self.tokens.get(token_pos) {
            if !token.kind.is_trivia() {
                break;
            }
            let kind = SyntaxKind::from(token.kind);
            builder.token(rowan::SyntaxKind(kind as u16), token.span.text(self.source));
            token_pos += 1;
        }
        token_pos
    }
}

/// Human-readable name of a token kind for "expected ..." messages.
pub(crate) fn describe(kind: SyntaxKind) -> String {
    let text = match kind {
        SyntaxKind::L_PAREN => "`(`",
        SyntaxKind::R_PAREN => "`)`",
        SyntaxKind::L_BRACKET => "`[`",
        SyntaxKind::R_BRACKET => "`]`",
        SyntaxKind::L_BRACE => "`{`",
        SyntaxKind::R_BRACE => "`}`",
        SyntaxKind::SEMICOLON => "`;`",
        SyntaxKind::COLON => "`:`",
        SyntaxKind::COMMA => "`,`",
        SyntaxKind::EQ => "`=`",
        SyntaxKind::FAT_ARROW => "`=>`",
        SyntaxKind::INTERPOLATION_END => "`}`",
        SyntaxKind::WHILE_KW => "`while`",
        SyntaxKind::FUNCTION_KW => "`function`",
        SyntaxKind::IDENT => "identifier",
        SyntaxKind::EOF => "end of input",
        other => return format!("{other:?}"),
    };
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use asyncify_lexer::Lexer;

    fn parser(source: &str) -> Parser<'_> {
        Parser::new(Lexer::tokenize(source), source)
    }

    #[test]
    fn lookahead_skips_trivia() {
        let p = parser("a /* c */ . // d\n b");
        assert_eq!(p.current(), SyntaxKind::IDENT);
        assert_eq!(p.nth(1), SyntaxKind::DOT);
        assert_eq!(p.nth(2), SyntaxKind::IDENT);
        assert_eq!(p.nth(3), SyntaxKind::EOF);
    }

    #[test]
    fn line_break_detection() {
        let mut p = parser("a\n  b c /*\n*/ d");
        p.advance(); // a
        assert!(p.at_line_break());
        p.advance(); // b
        assert!(!p.at_line_break());
        p.advance(); // c
        assert!(p.at_line_break());
    }

    #[test]
    fn arrow_lookahead() {
        assert!(parser("(a, { b }) => a").paren_starts_arrow());
        assert!(!parser("(a, b)").paren_starts_arrow());
        assert!(!parser("(a)(b) => c").paren_starts_arrow());
    }

    #[test]
    fn trivia_attaches_outside_nodes() {
        let source = "  x ";
        let mut p = parser(source);
        let root = p.open();
        let name = p.open();
        p.advance(); // x
        p.close(name, SyntaxKind::NAME_REF);
        p.advance(); // EOF
        p.close(root, SyntaxKind::SOURCE_FILE);

        let (green, errors) = p.build_tree();
        assert!(errors.is_empty());
        let root = crate::cst::SyntaxNode::new_root(green);
        assert_eq!(root.text().to_string(), source);
        let name = root.first_child().unwrap();
        assert_eq!(name.kind(), SyntaxKind::NAME_REF);
        assert_eq!(name.text().to_string(), "x");
        assert_eq!(u32::from(name.text_range().start()), 2);
    }

    #[test]
    fn open_before_wraps_completed_node() {
        let source = "f (1)";
        let mut p = parser(source);
        let root = p.open();
        let name = p.open();
        p.advance(); // f
        let name = p.close(name, SyntaxKind::NAME_REF);
        let call = p.open_before(name);
        let args = p.open();
        p.advance(); // (
        p.advance(); // 1
        p.advance(); // )
        p.close(args, SyntaxKind::ARG_LIST);
        p.close(call, SyntaxKind::CALL_EXPR);
        p.advance(); // EOF
        p.close(root, SyntaxKind::SOURCE_FILE);

        let (green, _) = p.build_tree();
        let root = crate::cst::SyntaxNode::new_root(green);
        let call = root.first_child().unwrap();
        assert_eq!(call.kind(), SyntaxKind::CALL_EXPR);
        assert_eq!(call.text().to_string(), "f (1)");
        assert_eq!(call.first_child().unwrap().kind(), SyntaxKind::NAME_REF);
    }

    #[test]
    fn only_first_error_is_kept() {
        let mut p = parser("x");
        assert!(!p.expect(SyntaxKind::L_PAREN));
        assert!(!p.expect(SyntaxKind::R_PAREN));
        assert_eq!(p.errors.len(), 1);
        assert_eq!(p.errors[0].message, "expected `(`");
    }

    #[test]
    fn semicolon_insertion_rules() {
        let mut p = parser("a\nb c");
        p.advance(); // a
        p.consume_semicolon();
        assert!(!p.has_error());
        p.advance(); // b
        p.consume_semicolon();
        assert!(p.has_error());
    }
}
