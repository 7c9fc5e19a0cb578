//! Shell API catalog: the type registry plus the root scope, loaded from JSON.
//!
//! ```json
//! {
//!   "types": { "Database": { "type": "Database", "hasAsyncChild": true, "attributes": { ... } } },
//!   "scope": { "db": "Database" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

use crate::env::{Binding, SymbolTable, TypeRegistry};
use crate::error::CatalogError;
use crate::ty::{Ty, TyRef, UNKNOWN_TYPE};

/// The catalog shipped with the workspace (`catalog/shell-api.json`).
pub const BUNDLED_CATALOG: &str = include_str!("../../../catalog/shell-api.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    types: BTreeMap<String, TypeSpec>,
    #[serde(default)]
    scope: BTreeMap<String, ScopeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeSpec {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    has_async_child: bool,
    #[serde(default)]
    attributes: Option<BTreeMap<String, TypeSpec>>,
    #[serde(default)]
    returns_promise: bool,
    #[serde(default)]
    return_type: Option<ScopeEntry>,
}

/// A registry name or an inline type.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScopeEntry {
    Name(String),
    Inline(Box<TypeSpec>),
}

impl TypeSpec {
    /// Check every `returnType` name at or below this spec against the
    /// registry's names. `path` names this spec in errors.
    fn check_return_types(&self, path: &str, known: &dyn Fn(&str) -> bool) -> Result<(), CatalogError> {
        match &self.return_type {
            Some(ScopeEntry::Name(type_name)) if !known(type_name) => {
                return Err(CatalogError::UnknownReturnType {
                    owner: path.to_string(),
                    type_name: type_name.clone(),
                });
            }
            Some(ScopeEntry::Inline(spec)) => spec.check_return_types(path, known)?,
            _ => {}
        }
        for (name, attr) in self.attributes.iter().flatten() {
            attr.check_return_types(&format!("{path}.{name}"), known)?;
        }
        Ok(())
    }

    fn into_ty(self) -> Ty {
        match self.tag.as_str() {
            "function" => {
                let return_type = match self.return_type {
                    Some(ScopeEntry::Name(name)) => TyRef::Name(name),
                    Some(ScopeEntry::Inline(spec)) => TyRef::Type(spec.into_ty()),
                    None => TyRef::Type(Ty::Unknown),
                };
                Ty::function(return_type, self.returns_promise)
            }
            UNKNOWN_TYPE => Ty::Unknown,
            _ => {
                let attributes = self.attributes.map(|attrs| {
                    attrs
                        .into_iter()
                        .map(|(name, spec)| (name, spec.into_ty()))
                        .collect::<FxHashMap<_, _>>()
                });
                Ty::object(self.tag, attributes, self.has_async_child)
            }
        }
    }
}

/// A loaded catalog. Cheap to clone; the registry is shared.
#[derive(Clone, Debug)]
pub struct Catalog {
    registry: Arc<TypeRegistry>,
    scope: FxHashMap<String, Binding>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let known = |name: &str| name == UNKNOWN_TYPE || file.types.contains_key(name);
        for (name, spec) in &file.types {
            spec.check_return_types(name, &known)?;
        }
        for (name, entry) in &file.scope {
            if let ScopeEntry::Inline(spec) = entry {
                spec.check_return_types(name, &known)?;
            }
        }

        let mut registry = TypeRegistry::new();
        for (name, spec) in file.types {
            registry.insert(name, spec.into_ty());
        }

        let mut scope = FxHashMap::default();
        for (binding, entry) in file.scope {
            let value = match entry {
                ScopeEntry::Name(type_name) => {
                    if !registry.contains(&type_name) {
                        return Err(CatalogError::UnknownTypeName { binding, type_name });
                    }
                    Binding::Name(type_name)
                }
                ScopeEntry::Inline(spec) => Binding::Type(spec.into_ty()),
            };
            scope.insert(binding, value);
        }

        debug!(types = registry.len(), globals = scope.len(), "loaded catalog");
        Ok(Catalog {
            registry: Arc::new(registry),
            scope,
        })
    }

    pub fn from_path(path: &Path) -> Result<Catalog, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Catalog::from_json(&json)
    }

    /// The catalog bundled into the binary.
    pub fn bundled() -> Result<Catalog, CatalogError> {
        Catalog::from_json(BUNDLED_CATALOG)
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Global names, sorted.
    pub fn global_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scope.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A fresh symbol table whose root frame is the catalog scope.
    pub fn symbol_table(&self) -> SymbolTable {
        SymbolTable::with_globals(Arc::clone(&self.registry), self.scope.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        let table = catalog.symbol_table();
        let db = table.lookup_type("db");
        assert_eq!(db.name(), "Database");
        assert!(db.has_async_child());

        let coll = catalog.registry().resolve("Collection");
        let find = &coll.attributes().unwrap()["find"];
        assert!(find.returns_promise());
        assert_eq!(find.to_string(), "function -> Promise<Cursor>");
    }

    #[test]
    fn registry_gets_unknown_even_when_omitted() {
        let catalog = Catalog::from_json(r#"{ "types": {}, "scope": {} }"#).unwrap();
        assert!(catalog.registry().contains("unknown"));
        assert_eq!(catalog.registry().len(), 1);
    }

    #[test]
    fn inline_scope_entries_and_return_types() {
        let json = r#"{
            "types": { "Cursor": { "type": "Cursor", "hasAsyncChild": true } },
            "scope": {
                "print": { "type": "function" },
                "open": { "type": "function", "returnsPromise": true,
                          "returnType": { "type": "Cursor" } }
            }
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let table = catalog.symbol_table();
        assert_eq!(table.lookup_type("print").to_string(), "function -> unknown");
        assert_eq!(table.lookup_type("open").to_string(), "function -> Promise<Cursor>");
        assert_eq!(catalog.global_names(), vec!["open", "print"]);
    }

    #[test]
    fn object_without_attributes_keeps_none() {
        let json = r#"{ "types": { "Thing": { "type": "Thing" } } }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let thing = catalog.registry().resolve("Thing");
        assert!(thing.attributes().is_none());
        assert!(!thing.has_async_child());
    }

    #[test]
    fn unknown_scope_type_is_rejected() {
        let json = r#"{ "types": {}, "scope": { "db": "Database" } }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "catalog scope entry `db` refers to unknown type `Database`"
        );
    }

    #[test]
    fn unknown_return_type_is_rejected() {
        let json = r#"{
            "types": {
                "Collection": { "type": "Collection", "attributes": {
                    "find": { "type": "function", "returnsPromise": true, "returnType": "Cursr" }
                } }
            }
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert_eq!(
            err.to_string(),
            "return type of `Collection.find` refers to unknown type `Cursr`"
        );
    }

    #[test]
    fn return_types_are_checked_in_inline_scope_entries() {
        let json = r#"{
            "scope": { "open": { "type": "function", "returnType": { "type": "function", "returnType": "Nope" } } }
        }"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownReturnType { ref owner, ref type_name } if owner == "open" && type_name == "Nope"
        ));

        let ok = r#"{ "scope": { "print": { "type": "function", "returnType": "unknown" } } }"#;
        assert!(Catalog::from_json(ok).is_ok());
    }

    #[test]
    fn database_get_returns_collection() {
        let catalog = Catalog::bundled().unwrap();
        let db = catalog.registry().resolve("Database");
        let get = &db.attributes().unwrap()["get"];
        assert!(!get.returns_promise());
        assert_eq!(get.to_string(), "function -> Collection");
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Catalog::from_json("{ \"types\": [").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Catalog::from_path(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }
}
