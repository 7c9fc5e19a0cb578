//! SyntaxKind enum for the asyncify CST.
//!
//! Token kinds mirror [`TokenKind`] in SCREAMING_SNAKE_CASE; node kinds are
//! produced by the parser. The rewriter also creates `AWAIT_EXPR` and
//! `PAREN_EXPR` nodes when it wraps a suspended call.

use asyncify_common::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for an `Open` event not yet closed.
    TOMBSTONE = 0,
    /// Wrapper for tokens that could not be parsed.
    ERROR_NODE = 1,

    // ── Keywords ───────────────────────────────────────────────────────
    AWAIT_KW,
    BREAK_KW,
    CASE_KW,
    CATCH_KW,
    CONST_KW,
    CONTINUE_KW,
    DEFAULT_KW,
    DELETE_KW,
    DO_KW,
    ELSE_KW,
    FALSE_KW,
    FINALLY_KW,
    FOR_KW,
    FUNCTION_KW,
    IF_KW,
    IN_KW,
    INSTANCEOF_KW,
    LET_KW,
    NEW_KW,
    NULL_KW,
    RETURN_KW,
    SWITCH_KW,
    THIS_KW,
    THROW_KW,
    TRUE_KW,
    TRY_KW,
    TYPEOF_KW,
    VAR_KW,
    VOID_KW,
    WHILE_KW,

    // ── Operators ──────────────────────────────────────────────────────
    PLUS,
    MINUS,
    STAR,
    STAR_STAR,
    SLASH,
    PERCENT,
    PLUS_PLUS,
    MINUS_MINUS,
    EQ,
    EQ_EQ,
    EQ_EQ_EQ,
    NOT_EQ,
    NOT_EQ_EQ,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    SHL,
    SHR,
    USHR,
    AMP,
    AMP_AMP,
    PIPE,
    PIPE_PIPE,
    CARET,
    TILDE,
    BANG,
    QUESTION,
    QUESTION_QUESTION,
    FAT_ARROW,
    DOT_DOT_DOT,
    PLUS_EQ,
    MINUS_EQ,
    STAR_EQ,
    STAR_STAR_EQ,
    SLASH_EQ,
    PERCENT_EQ,
    AMP_EQ,
    PIPE_EQ,
    CARET_EQ,
    SHL_EQ,
    SHR_EQ,
    USHR_EQ,
    AMP_AMP_EQ,
    PIPE_PIPE_EQ,
    QUESTION_QUESTION_EQ,

    // ── Delimiters and punctuation ─────────────────────────────────────
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    L_BRACE,
    R_BRACE,
    COMMA,
    DOT,
    COLON,
    SEMICOLON,

    // ── Literals and identifiers ───────────────────────────────────────
    NUMBER,
    STRING,
    TEMPLATE_START,
    TEMPLATE_CONTENT,
    INTERPOLATION_START,
    INTERPOLATION_END,
    TEMPLATE_END,
    REGEX,
    IDENT,

    // ── Trivia ─────────────────────────────────────────────────────────
    WHITESPACE,
    NEWLINE,
    COMMENT,

    // ── Special ────────────────────────────────────────────────────────
    EOF,
    ERROR,

    // ── Statements ─────────────────────────────────────────────────────
    SOURCE_FILE,
    /// `let`/`const`/`var` with one or more declarators.
    VAR_DECL,
    VAR_DECLARATOR,
    FN_DECL,
    RETURN_STMT,
    IF_STMT,
    WHILE_STMT,
    DO_WHILE_STMT,
    /// `for (init; test; update) body`
    FOR_STMT,
    /// `for (x in obj)` and `for (x of iter)`
    FOR_IN_STMT,
    SWITCH_STMT,
    SWITCH_CASE,
    TRY_STMT,
    CATCH_CLAUSE,
    FINALLY_CLAUSE,
    THROW_STMT,
    BREAK_STMT,
    CONTINUE_STMT,
    BLOCK_STMT,
    EMPTY_STMT,
    EXPR_STMT,

    // ── Expressions ────────────────────────────────────────────────────
    LITERAL,
    NAME_REF,
    THIS_EXPR,
    ARRAY_EXPR,
    OBJECT_EXPR,
    /// `key: value` or shorthand `key` inside an object literal.
    PROPERTY,
    /// `key(params) { body }` inside an object literal.
    OBJECT_METHOD,
    /// `[expr]` used as a property key.
    COMPUTED_KEY,
    SPREAD_ELEMENT,
    PAREN_EXPR,
    FN_EXPR,
    ARROW_FN,
    /// `object.name`
    MEMBER_EXPR,
    /// `object[expr]`
    INDEX_EXPR,
    CALL_EXPR,
    NEW_EXPR,
    ARG_LIST,
    UNARY_EXPR,
    /// Prefix or postfix `++`/`--`.
    UPDATE_EXPR,
    BINARY_EXPR,
    /// `test ? then : else`
    COND_EXPR,
    ASSIGN_EXPR,
    AWAIT_EXPR,
    /// A backtick template with its interpolations.
    TEMPLATE_EXPR,
    /// `${ expr }` inside a template.
    INTERPOLATION,

    // ── Functions and patterns ─────────────────────────────────────────
    PARAM_LIST,
    /// A binding identifier.
    NAME,
    OBJECT_PAT,
    /// `key: pattern`, shorthand `name`, or `name = default` in an object pattern.
    PAT_PROP,
    ARRAY_PAT,
    /// `pattern = default`
    ASSIGN_PAT,
    /// `...pattern`
    REST_PAT,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::COMMENT
        )
    }

    /// Reserved words. After a `.` or as an object key they act as plain
    /// property names (`cursor.delete`, `{ default: 1 }`).
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AWAIT_KW as u16) && (self as u16) <= (SyntaxKind::WHILE_KW as u16)
    }

    /// Assignment and compound assignment operators.
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            SyntaxKind::EQ
                | SyntaxKind::PLUS_EQ
                | SyntaxKind::MINUS_EQ
                | SyntaxKind::STAR_EQ
                | SyntaxKind::STAR_STAR_EQ
                | SyntaxKind::SLASH_EQ
                | SyntaxKind::PERCENT_EQ
                | SyntaxKind::AMP_EQ
                | SyntaxKind::PIPE_EQ
                | SyntaxKind::CARET_EQ
                | SyntaxKind::SHL_EQ
                | SyntaxKind::SHR_EQ
                | SyntaxKind::USHR_EQ
                | SyntaxKind::AMP_AMP_EQ
                | SyntaxKind::PIPE_PIPE_EQ
                | SyntaxKind::QUESTION_QUESTION_EQ
        )
    }

    /// Binding pattern node kinds.
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            SyntaxKind::NAME
                | SyntaxKind::OBJECT_PAT
                | SyntaxKind::ARRAY_PAT
                | SyntaxKind::ASSIGN_PAT
                | SyntaxKind::REST_PAT
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Await => SyntaxKind::AWAIT_KW,
            TokenKind::Break => SyntaxKind::BREAK_KW,
            TokenKind::Case => SyntaxKind::CASE_KW,
            TokenKind::Catch => SyntaxKind::CATCH_KW,
            TokenKind::Const => SyntaxKind::CONST_KW,
            TokenKind::Continue => SyntaxKind::CONTINUE_KW,
            TokenKind::Default => SyntaxKind::DEFAULT_KW,
            TokenKind::Delete => SyntaxKind::DELETE_KW,
            TokenKind::Do => SyntaxKind::DO_KW,
            TokenKind::Else => SyntaxKind::ELSE_KW,
            TokenKind::False => SyntaxKind::FALSE_KW,
            TokenKind::Finally => SyntaxKind::FINALLY_KW,
            TokenKind::For => SyntaxKind::FOR_KW,
            TokenKind::Function => SyntaxKind::FUNCTION_KW,
            TokenKind::If => SyntaxKind::IF_KW,
            TokenKind::In => SyntaxKind::IN_KW,
            TokenKind::Instanceof => SyntaxKind::INSTANCEOF_KW,
            TokenKind::Let => SyntaxKind::LET_KW,
            TokenKind::New => SyntaxKind::NEW_KW,
            TokenKind::Null => SyntaxKind::NULL_KW,
            TokenKind::Return => SyntaxKind::RETURN_KW,
            TokenKind::Switch => SyntaxKind::SWITCH_KW,
            TokenKind::This => SyntaxKind::THIS_KW,
            TokenKind::Throw => SyntaxKind::THROW_KW,
            TokenKind::True => SyntaxKind::TRUE_KW,
            TokenKind::Try => SyntaxKind::TRY_KW,
            TokenKind::Typeof => SyntaxKind::TYPEOF_KW,
            TokenKind::Var => SyntaxKind::VAR_KW,
            TokenKind::Void => SyntaxKind::VOID_KW,
            TokenKind::While => SyntaxKind::WHILE_KW,

            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::StarStar => SyntaxKind::STAR_STAR,
            TokenKind::Slash => SyntaxKind::SLASH,
            TokenKind::Percent => SyntaxKind::PERCENT,
            TokenKind::PlusPlus => SyntaxKind::PLUS_PLUS,
            TokenKind::MinusMinus => SyntaxKind::MINUS_MINUS,
            TokenKind::Eq => SyntaxKind::EQ,
            TokenKind::EqEq => SyntaxKind::EQ_EQ,
            TokenKind::EqEqEq => SyntaxKind::EQ_EQ_EQ,
            TokenKind::NotEq => SyntaxKind::NOT_EQ,
            TokenKind::NotEqEq => SyntaxKind::NOT_EQ_EQ,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::LtEq => SyntaxKind::LT_EQ,
            TokenKind::GtEq => SyntaxKind::GT_EQ,
            TokenKind::Shl => SyntaxKind::SHL,
            TokenKind::Shr => SyntaxKind::SHR,
            TokenKind::UShr => SyntaxKind::USHR,
            TokenKind::Amp => SyntaxKind::AMP,
            TokenKind::AmpAmp => SyntaxKind::AMP_AMP,
            TokenKind::Pipe => SyntaxKind::PIPE,
            TokenKind::PipePipe => SyntaxKind::PIPE_PIPE,
            TokenKind::Caret => SyntaxKind::CARET,
            TokenKind::Tilde => SyntaxKind::TILDE,
            TokenKind::Bang => SyntaxKind::BANG,
            TokenKind::Question => SyntaxKind::QUESTION,
            TokenKind::QuestionQuestion => SyntaxKind::QUESTION_QUESTION,
            TokenKind::FatArrow => SyntaxKind::FAT_ARROW,
            TokenKind::DotDotDot => SyntaxKind::DOT_DOT_DOT,
            TokenKind::PlusEq => SyntaxKind::PLUS_EQ,
            TokenKind::MinusEq => SyntaxKind::MINUS_EQ,
            TokenKind::StarEq => SyntaxKind::STAR_EQ,
            TokenKind::StarStarEq => SyntaxKind::STAR_STAR_EQ,
            TokenKind::SlashEq => SyntaxKind::SLASH_EQ,
            TokenKind::PercentEq => SyntaxKind::PERCENT_EQ,
            TokenKind::AmpEq => SyntaxKind::AMP_EQ,
            TokenKind::PipeEq => SyntaxKind::PIPE_EQ,
            TokenKind::CaretEq => SyntaxKind::CARET_EQ,
            TokenKind::ShlEq => SyntaxKind::SHL_EQ,
            TokenKind::ShrEq => SyntaxKind::SHR_EQ,
            TokenKind::UShrEq => SyntaxKind::USHR_EQ,
            TokenKind::AmpAmpEq => SyntaxKind::AMP_AMP_EQ,
            TokenKind::PipePipeEq => SyntaxKind::PIPE_PIPE_EQ,
            TokenKind::QuestionQuestionEq => SyntaxKind::QUESTION_QUESTION_EQ,

            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::LBracket => SyntaxKind::L_BRACKET,
            TokenKind::RBracket => SyntaxKind::R_BRACKET,
            TokenKind::LBrace => SyntaxKind::L_BRACE,
            TokenKind::RBrace => SyntaxKind::R_BRACE,
            TokenKind::Comma => SyntaxKind::COMMA,
            TokenKind::Dot => SyntaxKind::DOT,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::Semicolon => SyntaxKind::SEMICOLON,

            TokenKind::Number => SyntaxKind::NUMBER,
            TokenKind::String => SyntaxKind::STRING,
            TokenKind::TemplateStart => SyntaxKind::TEMPLATE_START,
            TokenKind::TemplateContent => SyntaxKind::TEMPLATE_CONTENT,
            TokenKind::InterpolationStart => SyntaxKind::INTERPOLATION_START,
            TokenKind::InterpolationEnd => SyntaxKind::INTERPOLATION_END,
            TokenKind::TemplateEnd => SyntaxKind::TEMPLATE_END,
            TokenKind::Regex => SyntaxKind::REGEX,
            TokenKind::Ident => SyntaxKind::IDENT,

            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::Comment => SyntaxKind::COMMENT,

            TokenKind::Eof => SyntaxKind::EOF,
            TokenKind::Error => SyntaxKind::ERROR,
        }
    }
}
