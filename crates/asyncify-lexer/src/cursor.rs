/// Character cursor over the script source with byte-offset tracking.
pub struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    /// The character `n` positions ahead; `nth(0)` is the current one.
    pub fn nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    pub fn peek(&self) -> Option<char> {
        self.nth(0)
    }

    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    /// Consume the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_none()
    }

    pub fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.advance();
        }
    }

    pub fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}
