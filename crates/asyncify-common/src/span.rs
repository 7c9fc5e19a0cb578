use std::ops::Range;

/// Half-open byte range into a script's source text.
///
/// Lexer and parser positions are byte offsets; line and column numbers are
/// only computed when a diagnostic or a `check` listing needs them, through
/// [`LineIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    /// A zero-width span at `offset`, used for "expected ..." errors at EOF.
    pub fn empty_at(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slice `source` by this span.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start as usize..self.end as usize]
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start as usize..span.end as usize
    }
}

/// Line start table for converting byte offsets to 1-based (line, column).
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self { line_starts }
    }

    /// 1-based line and byte column of `offset`.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line_idx] + 1;
        (line_idx as u32 + 1, col)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_spans_both_ends() {
        let a = Span::new(4, 9);
        let b = Span::new(2, 6);
        assert_eq!(a.cover(b), Span::new(2, 9));
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn empty_at_is_empty() {
        let span = Span::empty_at(7);
        assert!(span.is_empty());
        assert_eq!(Range::<usize>::from(span), 7..7);
    }

    #[test]
    fn text_slices_source() {
        let src = "db.coll.find()";
        assert_eq!(Span::new(3, 7).text(src), "coll");
    }

    #[test]
    fn line_col_across_lines() {
        let idx = LineIndex::new("let x = 1\ndb.coll\n  .find()");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(10), (2, 1));
        assert_eq!(idx.line_col(13), (2, 4));
        assert_eq!(idx.line_col(20), (3, 3));
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn newline_belongs_to_its_line() {
        let idx = LineIndex::new("a\nb");
        assert_eq!(idx.line_col(1), (1, 2));
        assert_eq!(idx.line_col(2), (2, 1));
    }
}
