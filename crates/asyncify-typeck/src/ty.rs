//! Shell API type model.
//!
//! Types are immutable once built and shared through `Arc`, so one catalog
//! can back many symbol tables (one per REPL session or thread).

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Nominal type of the database handle. Unknown static members of a
/// `Database` resolve to [`COLLECTION_TYPE`].
pub const DATABASE_TYPE: &str = "Database";
/// Registry name of the generic collection type.
pub const COLLECTION_TYPE: &str = "Collection";
/// Registry name of the unknown type.
pub const UNKNOWN_TYPE: &str = "unknown";

/// An inferred shell API type.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    Function(Arc<FunctionTy>),
    Object(Arc<ObjectTy>),
    /// The default type: no attributes, never async.
    Unknown,
}

/// A callable. The return type may be a registry name resolved on use.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionTy {
    pub return_type: TyRef,
    pub returns_promise: bool,
}

/// A nominal object type.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTy {
    pub name: String,
    /// `None` means the attribute set is unknown; every member is `Unknown`.
    pub attributes: Option<FxHashMap<String, Ty>>,
    /// Some member may suspend, so computed access cannot be analyzed.
    pub has_async_child: bool,
}

/// A type, or the name of a type in the registry.
#[derive(Clone, Debug, PartialEq)]
pub enum TyRef {
    Name(String),
    Type(Ty),
}

impl From<Ty> for TyRef {
    fn from(ty: Ty) -> Self {
        TyRef::Type(ty)
    }
}

impl From<&str> for TyRef {
    fn from(name: &str) -> Self {
        TyRef::Name(name.to_string())
    }
}

impl Ty {
    pub fn function(return_type: impl Into<TyRef>, returns_promise: bool) -> Ty {
        Ty::Function(Arc::new(FunctionTy {
            return_type: return_type.into(),
            returns_promise,
        }))
    }

    pub fn object(
        name: impl Into<String>,
        attributes: Option<FxHashMap<String, Ty>>,
        has_async_child: bool,
    ) -> Ty {
        Ty::Object(Arc::new(ObjectTy {
            name: name.into(),
            attributes,
            has_async_child,
        }))
    }

    pub fn unknown() -> Ty {
        Ty::Unknown
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Ty::Function(_))
    }

    pub fn has_async_child(&self) -> bool {
        match self {
            Ty::Object(obj) => obj.has_async_child,
            _ => false,
        }
    }

    pub fn returns_promise(&self) -> bool {
        match self {
            Ty::Function(f) => f.returns_promise,
            _ => false,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionTy> {
        match self {
            Ty::Function(f) => Some(f),
            _ => None,
        }
    }

    /// The type tag: the object's nominal name, `function` or `unknown`.
    pub fn name(&self) -> &str {
        match self {
            Ty::Function(_) => "function",
            Ty::Object(obj) => &obj.name,
            Ty::Unknown => UNKNOWN_TYPE,
        }
    }

    pub fn attributes(&self) -> Option<&FxHashMap<String, Ty>> {
        match self {
            Ty::Object(obj) => obj.attributes.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Function(func) => {
                let ret = match &func.return_type {
                    TyRef::Name(name) => name.as_str(),
                    TyRef::Type(ty) => ty.name(),
                };
                if func.returns_promise {
                    write!(f, "function -> Promise<{ret}>")
                } else {
                    write!(f, "function -> {ret}")
                }
            }
            Ty::Object(obj) => write!(f, "{}", obj.name),
            Ty::Unknown => write!(f, "{UNKNOWN_TYPE}"),
        }
    }
}
