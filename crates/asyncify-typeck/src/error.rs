//! Errors raised by catalog loading and by `compile`.

use std::fmt;

use asyncify_parser::ParseError;
use rowan::TextRange;

/// Hint attached to dynamic access on the database handle.
pub const DATABASE_ACCESS_HINT: &str = "If you are accessing a collection try Database.get('collection').";

/// A hard failure of the inference and rewrite pass. Either one aborts the
/// whole compilation.
#[derive(Clone, Debug, PartialEq)]
pub enum RewriteError {
    /// Computed member access (`obj[expr]`) on a type whose members may
    /// suspend: whether the result must be awaited cannot be decided.
    UnresolvedAsyncDynamicAccess {
        object_type: String,
        hint: Option<String>,
        span: TextRange,
    },
    /// A function with several `return` statements, at least one of which
    /// returns a shell API value that may have async members.
    AmbiguousConditionalReturnType {
        span: TextRange,
        returns: Vec<TextRange>,
    },
}

impl RewriteError {
    /// The message without the hint.
    pub fn message(&self) -> &'static str {
        match self {
            RewriteError::UnresolvedAsyncDynamicAccess { .. } => {
                "Cannot access shell API attributes dynamically."
            }
            RewriteError::AmbiguousConditionalReturnType { .. } => {
                "Cannot infer the return type of a function that conditionally returns shell API values."
            }
        }
    }

    pub fn span(&self) -> TextRange {
        match self {
            RewriteError::UnresolvedAsyncDynamicAccess { span, .. }
            | RewriteError::AmbiguousConditionalReturnType { span, .. } => *span,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            RewriteError::UnresolvedAsyncDynamicAccess { hint, .. } => hint.as_deref(),
            RewriteError::AmbiguousConditionalReturnType { .. } => None,
        }
    }
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;
        if let Some(hint) = self.hint() {
            write!(f, " {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RewriteError {}

/// Why `compile` produced no output.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileError {
    /// The script does not parse; the pass never ran.
    Parse(Vec<ParseError>),
    Rewrite(RewriteError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(errors) => match errors.first() {
                Some(first) => write!(f, "syntax error: {first}"),
                None => write!(f, "syntax error"),
            },
            CompileError::Rewrite(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(errors) => errors.first().map(|e| e as &(dyn std::error::Error + 'static)),
            CompileError::Rewrite(err) => Some(err),
        }
    }
}

impl From<RewriteError> for CompileError {
    fn from(err: RewriteError) -> Self {
        CompileError::Rewrite(err)
    }
}

/// A malformed API catalog.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A scope entry names a type the registry does not define.
    UnknownTypeName { binding: String, type_name: String },
    /// A function's `returnType` names a type the registry does not define.
    /// `owner` is the dotted path to the function, e.g. `Database.getCollection`.
    UnknownReturnType { owner: String, type_name: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "cannot read catalog: {err}"),
            CatalogError::Json(err) => write!(f, "invalid catalog JSON: {err}"),
            CatalogError::UnknownTypeName { binding, type_name } => write!(
                f,
                "catalog scope entry `{binding}` refers to unknown type `{type_name}`"
            ),
            CatalogError::UnknownReturnType { owner, type_name } => write!(
                f,
                "return type of `{owner}` refers to unknown type `{type_name}`"
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            CatalogError::UnknownTypeName { .. } | CatalogError::UnknownReturnType { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Json(err)
    }
}
