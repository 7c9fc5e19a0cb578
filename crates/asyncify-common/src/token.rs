use crate::span::Span;

/// A token produced by the lexer. Every byte of the input belongs to exactly
/// one token, trivia included.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }
}

/// The token vocabulary of the shell scripting dialect.
///
/// Contextual words (`of`, `async`, `get`, ...) are lexed as [`TokenKind::Ident`]
/// and recognized by the parser from their text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ── Keywords ───────────────────────────────────────────────────────
    Await,
    Break,
    Case,
    Catch,
    Const,
    Continue,
    Default,
    Delete,
    Do,
    Else,
    False,
    Finally,
    For,
    Function,
    If,
    In,
    Instanceof,
    Let,
    New,
    Null,
    Return,
    Switch,
    This,
    Throw,
    True,
    Try,
    Typeof,
    Var,
    Void,
    While,

    // ── Operators ──────────────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Eq,
    EqEq,
    EqEqEq,
    NotEq,
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    UShr,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    Question,
    QuestionQuestion,
    /// `=>`
    FatArrow,
    /// `...`
    DotDotDot,
    PlusEq,
    MinusEq,
    StarEq,
    StarStarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    UShrEq,
    AmpAmpEq,
    PipePipeEq,
    QuestionQuestionEq,

    // ── Delimiters ─────────────────────────────────────────────────────
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // ── Punctuation ────────────────────────────────────────────────────
    Comma,
    Dot,
    Colon,
    Semicolon,

    // ── Literals ───────────────────────────────────────────────────────
    Number,
    /// Single- or double-quoted string, quotes included.
    String,
    /// Opening backtick of a template literal.
    TemplateStart,
    /// Raw text between the backticks, escapes included.
    TemplateContent,
    /// `${` inside a template.
    InterpolationStart,
    /// The `}` closing an interpolation.
    InterpolationEnd,
    /// Closing backtick of a template literal.
    TemplateEnd,
    /// A regular expression literal with its flags.
    Regex,

    Ident,

    // ── Trivia ─────────────────────────────────────────────────────────
    Whitespace,
    Newline,
    /// Line (`//`) or block (`/* */`) comment.
    Comment,

    // ── Special ────────────────────────────────────────────────────────
    Eof,
    Error,
}

impl TokenKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    /// Whether a `/` after this token is a division operator rather than the
    /// start of a regular expression literal.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::TemplateEnd
                | TokenKind::Regex
                | TokenKind::This
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }
}

/// Map a reserved word to its keyword token, or `None` for identifiers.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    let kind = match s {
        "await" => TokenKind::Await,
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "const" => TokenKind::Const,
        "continue" => TokenKind::Continue,
        "default" => TokenKind::Default,
        "delete" => TokenKind::Delete,
        "do" => TokenKind::Do,
        "else" => TokenKind::Else,
        "false" => TokenKind::False,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "function" => TokenKind::Function,
        "if" => TokenKind::If,
        "in" => TokenKind::In,
        "instanceof" => TokenKind::Instanceof,
        "let" => TokenKind::Let,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "return" => TokenKind::Return,
        "switch" => TokenKind::Switch,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "typeof" => TokenKind::Typeof,
        "var" => TokenKind::Var,
        "void" => TokenKind::Void,
        "while" => TokenKind::While,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_round_trip_through_table() {
        for (text, kind) in [
            ("await", TokenKind::Await),
            ("function", TokenKind::Function),
            ("instanceof", TokenKind::Instanceof),
            ("typeof", TokenKind::Typeof),
            ("while", TokenKind::While),
        ] {
            assert_eq!(keyword_from_str(text), Some(kind), "keyword `{text}`");
        }
    }

    #[test]
    fn contextual_words_are_identifiers() {
        for word in ["of", "async", "get", "db", "undefined", "class"] {
            assert_eq!(keyword_from_str(word), None, "`{word}` should not be reserved");
        }
    }

    #[test]
    fn trivia_kinds() {
        assert!(TokenKind::Whitespace.is_trivia());
        assert!(TokenKind::Newline.is_trivia());
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Semicolon.is_trivia());
    }

    #[test]
    fn operand_enders_decide_slash_meaning() {
        assert!(TokenKind::Ident.ends_operand());
        assert!(TokenKind::RParen.ends_operand());
        assert!(TokenKind::TemplateEnd.ends_operand());
        assert!(!TokenKind::InterpolationStart.ends_operand());
        assert!(!TokenKind::Return.ends_operand());
        assert!(!TokenKind::LParen.ends_operand());
        assert!(!TokenKind::Eq.ends_operand());
    }
}
