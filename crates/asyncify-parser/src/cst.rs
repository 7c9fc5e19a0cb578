//! Rowan tree types specialized to the shell scripting dialect.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShellLanguage {}

impl rowan::Language for ShellLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::REST_PAT as u16, "invalid raw syntax kind {}", raw.0);
        // Safety: SyntaxKind is #[repr(u16)] with contiguous discriminants
        // from TOMBSTONE to REST_PAT, and the range was checked above.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<ShellLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<ShellLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<ShellLanguage>;
