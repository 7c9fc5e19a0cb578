//! Shared types for the asyncify front end: byte spans, line lookup, and the
//! token vocabulary produced by `asyncify-lexer`.

pub mod span;
pub mod token;
