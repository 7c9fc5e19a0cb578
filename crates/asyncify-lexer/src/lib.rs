// asyncify lexer -- lossless tokenizer for the shell scripting dialect.

mod cursor;

use asyncify_common::token::{keyword_from_str, Token, TokenKind};
use cursor::Cursor;

/// Where the lexer is relative to template literals. Templates nest through
/// their interpolations, so this is kept as a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Between the backticks of a template, outside any `${ }`.
    Template,
    /// Inside `${ }`, with the number of `{` opened and not yet closed there.
    Interpolation(u32),
}

/// Converts script source into tokens.
///
/// Unlike a compiler lexer, nothing is discarded: whitespace, newlines and
/// comments come out as trivia tokens so the parser can build a tree whose
/// text is exactly the input. The rewriter depends on that to print the
/// transformed script with the user's formatting intact.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
    /// Last non-trivia token, used to tell a regex literal from a division.
    prev: Option<TokenKind>,
    modes: Vec<Mode>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
            prev: None,
            modes: Vec::new(),
        }
    }

    /// Tokenize the whole source. The last token is always `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn next_token(&mut self) -> Token {
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            '\n' => self.single_char_token(TokenKind::Newline, start),
            c if c.is_whitespace() || c == '\u{feff}' => {
                self.cursor
                    .eat_while(|c| c != '\n' && (c.is_whitespace() || c == '\u{feff}'));
                Token::new(TokenKind::Whitespace, start, self.cursor.pos())
            }

            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '[' => self.single_char_token(TokenKind::LBracket, start),
            ']' => self.single_char_token(TokenKind::RBracket, start),
            '{' => {
                if let Some(Mode::Interpolation(depth)) = self.modes.last_mut() {
                    *depth += 1;
                }
                self.single_char_token(TokenKind::LBrace, start)
            }
            '}' => match self.modes.last().copied() {
                Some(Mode::Interpolation(0)) => {
                    self.modes.pop();
                    self.single_char_token(TokenKind::InterpolationEnd, start)
                }
                Some(Mode::Interpolation(_)) => {
                    if let Some(Mode::Interpolation(depth)) = self.modes.last_mut() {
                        *depth -= 1;
                    }
                    self.single_char_token(TokenKind::RBrace, start)
                }
                _ => self.single_char_token(TokenKind::RBrace, start),
            },
            ',' => self.single_char_token(TokenKind::Comma, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            ':' => self.single_char_token(TokenKind::Colon, start),
            '~' => self.single_char_token(TokenKind::Tilde, start),

            '/' => match self.cursor.nth(1) {
                Some('/') => self.lex_line_comment(start),
                Some('*') => self.lex_block_comment(start),
                _ if self.prev.is_some_and(TokenKind::ends_operand) => self.lex_operator(start),
                _ => self.lex_regex(start),
            },

            '.' if self.cursor.nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start)
            }
            '0'..='9' => self.lex_number(start),

            '"' | '\'' => self.lex_string(start, c),
            '`' => {
                self.modes.push(Mode::Template);
                self.single_char_token(TokenKind::TemplateStart, start)
            }

            c if is_ident_start(c) => self.lex_ident(start),

            '+' | '-' | '*' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '^' | '?' | '.' => {
                self.lex_operator(start)
            }

            _ => {
                self.cursor.advance();
                Token::new(TokenKind::Error, start, self.cursor.pos())
            }
        }
    }

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    // ── Operators ────────────────────────────────────────────────────────

    /// Longest-match operator lexing.
    fn lex_operator(&mut self, start: u32) -> Token {
        let Some(c) = self.cursor.advance() else {
            return Token::new(TokenKind::Eof, start, start);
        };
        let cur = &mut self.cursor;
        let kind = match c {
            '+' if cur.eat('+') => TokenKind::PlusPlus,
            '+' if cur.eat('=') => TokenKind::PlusEq,
            '+' => TokenKind::Plus,
            '-' if cur.eat('-') => TokenKind::MinusMinus,
            '-' if cur.eat('=') => TokenKind::MinusEq,
            '-' => TokenKind::Minus,
            '*' if cur.eat('*') => {
                if cur.eat('=') {
                    TokenKind::StarStarEq
                } else {
                    TokenKind::StarStar
                }
            }
            '*' if cur.eat('=') => TokenKind::StarEq,
            '*' => TokenKind::Star,
            '/' if cur.eat('=') => TokenKind::SlashEq,
            '/' => TokenKind::Slash,
            '%' if cur.eat('=') => TokenKind::PercentEq,
            '%' => TokenKind::Percent,
            '=' if cur.eat('>') => TokenKind::FatArrow,
            '=' if cur.eat('=') => {
                if cur.eat('=') {
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            }
            '=' => TokenKind::Eq,
            '!' if cur.eat('=') => {
                if cur.eat('=') {
                    TokenKind::NotEqEq
                } else {
                    TokenKind::NotEq
                }
            }
            '!' => TokenKind::Bang,
            '<' if cur.eat('<') => {
                if cur.eat('=') {
                    TokenKind::ShlEq
                } else {
                    TokenKind::Shl
                }
            }
            '<' if cur.eat('=') => TokenKind::LtEq,
            '<' => TokenKind::Lt,
            '>' if cur.eat('>') => {
                if cur.eat('>') {
                    if cur.eat('=') {
                        TokenKind::UShrEq
                    } else {
                        TokenKind::UShr
                    }
                } else if cur.eat('=') {
                    TokenKind::ShrEq
                } else {
                    TokenKind::Shr
                }
            }
            '>' if cur.eat('=') => TokenKind::GtEq,
            '>' => TokenKind::Gt,
            '&' if cur.eat('&') => {
                if cur.eat('=') {
                    TokenKind::AmpAmpEq
                } else {
                    TokenKind::AmpAmp
                }
            }
            '&' if cur.eat('=') => TokenKind::AmpEq,
            '&' => TokenKind::Amp,
            '|' if cur.eat('|') => {
                if cur.eat('=') {
                    TokenKind::PipePipeEq
                } else {
                    TokenKind::PipePipe
                }
            }
            '|' if cur.eat('=') => TokenKind::PipeEq,
            '|' => TokenKind::Pipe,
            '^' if cur.eat('=') => TokenKind::CaretEq,
            '^' => TokenKind::Caret,
            '?' if cur.eat('?') => {
                if cur.eat('=') {
                    TokenKind::QuestionQuestionEq
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            '?' => TokenKind::Question,
            '.' if cur.nth(0) == Some('.') && cur.nth(1) == Some('.') => {
                cur.advance();
                cur.advance();
                TokenKind::DotDotDot
            }
            '.' => TokenKind::Dot,
            _ => TokenKind::Error,
        };
        Token::new(kind, start, self.cursor.pos())
    }

    // ── Comments ─────────────────────────────────────────────────────────

    fn lex_line_comment(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c != '\n');
        Token::new(TokenKind::Comment, start, self.cursor.pos())
    }

    /// `/* ... */`. An unterminated block comment runs to EOF as an `Error`.
    fn lex_block_comment(&mut self, start: u32) -> Token {
        self.cursor.advance(); // /
        self.cursor.advance(); // *
        loop {
            match self.cursor.advance() {
                None => return Token::new(TokenKind::Error, start, self.cursor.pos()),
                Some('*') if self.cursor.eat('/') => {
                    return Token::new(TokenKind::Comment, start, self.cursor.pos());
                }
                Some(_) => {}
            }
        }
    }

    // ── Literals ─────────────────────────────────────────────────────────

    /// Decimal, `0x`/`0o`/`0b`, fractions, exponents, `_` separators and a
    /// trailing BigInt `n`.
    fn lex_number(&mut self, start: u32) -> Token {
        let radix_prefix = self.cursor.peek() == Some('0')
            && matches!(
                self.cursor.nth(1),
                Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')
            );

        if radix_prefix {
            self.cursor.advance();
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.cursor.eat('.') {
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            let has_exponent = matches!(self.cursor.peek(), Some('e' | 'E'))
                && match self.cursor.nth(1) {
                    Some('+' | '-') => self.cursor.nth(2).is_some_and(|c| c.is_ascii_digit()),
                    Some(c) => c.is_ascii_digit(),
                    None => false,
                };
            if has_exponent {
                self.cursor.advance();
                if !self.cursor.eat('+') {
                    self.cursor.eat('-');
                }
                self.cursor.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
        }
        self.cursor.eat('n');

        Token::new(TokenKind::Number, start, self.cursor.pos())
    }

    /// Quoted string. A raw newline or EOF before the closing quote yields
    /// an `Error` token covering what was scanned.
    fn lex_string(&mut self, start: u32, quote: char) -> Token {
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return Token::new(TokenKind::Error, start, self.cursor.pos());
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(c) => {
                    self.cursor.advance();
                    if c == quote {
                        return Token::new(TokenKind::String, start, self.cursor.pos());
                    }
                }
            }
        }
    }

    /// The next piece of a template: its closing backtick, a `${`, or a run
    /// of raw text up to either. Escapes stay in the text.
    fn lex_template_part(&mut self) -> Token {
        let start = self.cursor.pos();
        match self.cursor.peek() {
            None => {
                self.modes.clear();
                return Token::new(TokenKind::Eof, start, start);
            }
            Some('`') => {
                self.modes.pop();
                return self.single_char_token(TokenKind::TemplateEnd, start);
            }
            Some('$') if self.cursor.nth(1) == Some('{') => {
                self.cursor.advance();
                self.cursor.advance();
                self.modes.push(Mode::Interpolation(0));
                return Token::new(TokenKind::InterpolationStart, start, self.cursor.pos());
            }
            Some(_) => {}
        }
        loop {
            match self.cursor.peek() {
                None | Some('`') => break,
                Some('$') if self.cursor.nth(1) == Some('{') => break,
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        Token::new(TokenKind::TemplateContent, start, self.cursor.pos())
    }

    /// `/pattern/flags`. Slashes inside a `[...]` class do not terminate.
    fn lex_regex(&mut self, start: u32) -> Token {
        self.cursor.advance();
        let mut in_class = false;
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return Token::new(TokenKind::Error, start, self.cursor.pos());
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('[') => {
                    in_class = true;
                    self.cursor.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.cursor.advance();
                }
                Some('/') if !in_class => {
                    self.cursor.advance();
                    break;
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        self.cursor.eat_while(is_ident_continue);
        Token::new(TokenKind::Regex, start, self.cursor.pos())
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());
        let kind = keyword_from_str(text).unwrap_or(TokenKind::Ident);
        Token::new(kind, start, self.cursor.pos())
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }

        let token = match self.modes.last().copied() {
            Some(Mode::Template) => self.lex_template_part(),
            _ => self.next_token(),
        };
        match token.kind {
            TokenKind::Eof => self.emitted_eof = true,
            kind if !kind.is_trivia() => self.prev = Some(kind),
            _ => {}
        }
        Some(token)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn lex_member_call_chain() {
        assert_eq!(
            significant("db.coll.find()"),
            vec![
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokens_cover_source_exactly() {
        let source = "let x = 5; // five\n/* block */ x = db.coll.find({ a: 1 })\n";
        let tokens = Lexer::tokenize(source);
        let mut rebuilt = String::new();
        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.span.start, expected_start, "gap before {:?}", token);
            expected_start = token.span.end;
            rebuilt.push_str(&source[token.span.start as usize..token.span.end as usize]);
        }
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn trivia_tokens_are_emitted() {
        let kinds: Vec<_> = Lexer::tokenize("a // c\n  b").into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Whitespace,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Whitespace,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn slash_after_operand_is_division() {
        assert_eq!(
            significant("a / b"),
            vec![TokenKind::Ident, TokenKind::Slash, TokenKind::Ident, TokenKind::Eof]
        );
        assert_eq!(
            significant("(a) /= 2"),
            vec![
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::SlashEq,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn slash_after_operator_is_regex() {
        let tokens = Lexer::tokenize("find({ name: /^a[/]b/i })");
        let regex = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Regex)
            .expect("regex token");
        assert_eq!(regex.span.start, 13);
        assert_eq!(regex.span.end, 22);
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(
            significant(r#"'it\'s' "a\"b""#),
            vec![TokenKind::String, TokenKind::String, TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_error() {
        assert_eq!(
            significant("'abc\nx"),
            vec![TokenKind::Error, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn template_interpolations_are_lexed_as_code() {
        assert_eq!(
            significant("`n=${ {a: 1}.a }!` + 1"),
            vec![
                TokenKind::TemplateStart,
                TokenKind::TemplateContent,
                TokenKind::InterpolationStart,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Number,
                TokenKind::RBrace,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::InterpolationEnd,
                TokenKind::TemplateContent,
                TokenKind::TemplateEnd,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn nested_template_and_escapes() {
        let rendered = Lexer::tokenize(r"`a\`${`b${c}`}`")
            .iter()
            .map(|t| format!("{:?}@{}..{}", t.kind, t.span.start, t.span.end))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(rendered, @r"
        TemplateStart@0..1
        TemplateContent@1..4
        InterpolationStart@4..6
        TemplateStart@6..7
        TemplateContent@7..8
        InterpolationStart@8..10
        Ident@10..11
        InterpolationEnd@11..12
        TemplateEnd@12..13
        InterpolationEnd@13..14
        TemplateEnd@14..15
        Eof@15..15
        ");
    }

    #[test]
    fn unterminated_template_ends_at_eof() {
        assert_eq!(
            significant("`abc"),
            vec![TokenKind::TemplateStart, TokenKind::TemplateContent, TokenKind::Eof]
        );
    }

    #[test]
    fn slash_after_template_is_division() {
        assert_eq!(
            significant("`a` / 2"),
            vec![
                TokenKind::TemplateStart,
                TokenKind::TemplateContent,
                TokenKind::TemplateEnd,
                TokenKind::Slash,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        for src in ["0", "42", "3.14", ".5", "1e10", "2E-3", "0xff", "0b1010", "1_000", "10n"] {
            assert_eq!(significant(src), vec![TokenKind::Number, TokenKind::Eof], "{src}");
        }
    }

    #[test]
    fn longest_match_operators() {
        assert_eq!(
            significant("a === b !== c >>>= d ?? e ... f => g **= h"),
            vec![
                TokenKind::Ident,
                TokenKind::EqEqEq,
                TokenKind::Ident,
                TokenKind::NotEqEq,
                TokenKind::Ident,
                TokenKind::UShrEq,
                TokenKind::Ident,
                TokenKind::QuestionQuestion,
                TokenKind::Ident,
                TokenKind::DotDotDot,
                TokenKind::Ident,
                TokenKind::FatArrow,
                TokenKind::Ident,
                TokenKind::StarStarEq,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_dollar_identifiers() {
        assert_eq!(
            significant("const $x = typeof _y"),
            vec![
                TokenKind::Const,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Typeof,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_is_error() {
        let kinds = significant("x /* never closed");
        assert_eq!(kinds, vec![TokenKind::Ident, TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn unknown_character_is_error() {
        assert_eq!(
            significant("a # b"),
            vec![TokenKind::Ident, TokenKind::Error, TokenKind::Ident, TokenKind::Eof]
        );
    }

    #[test]
    fn debug_token_stream() {
        let rendered = Lexer::tokenize("x += 1")
            .iter()
            .map(|t| format!("{:?}@{}..{}", t.kind, t.span.start, t.span.end))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(rendered, @r"
        Ident@0..1
        Whitespace@1..2
        PlusEq@2..4
        Whitespace@4..5
        Number@5..6
        Eof@6..6
        ");
    }
}
