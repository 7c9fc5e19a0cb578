//! Type registry and symbol table with a scope stack.
//!
//! The registry maps type names ("Collection", "unknown", ...) to types and
//! is shared read-only. The symbol table owns a stack of scopes; index 0 is
//! the global frame holding the catalog scope and is never popped. Lookups
//! search from the innermost scope outward.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ty::{Ty, TyRef, UNKNOWN_TYPE};

/// What a name is bound to: a type, or a registry name resolved on lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    Type(Ty),
    Name(String),
}

impl From<Ty> for Binding {
    fn from(ty: Ty) -> Self {
        Binding::Type(ty)
    }
}

/// Global name -> type table.
#[derive(Clone, Debug)]
pub struct TypeRegistry {
    types: FxHashMap<String, Ty>,
}

impl TypeRegistry {
    /// A registry containing only `unknown`.
    pub fn new() -> Self {
        let mut types = FxHashMap::default();
        types.insert(UNKNOWN_TYPE.to_string(), Ty::Unknown);
        TypeRegistry { types }
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Ty) {
        self.types.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Ty> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// The named type, or `Unknown` if the registry has no such name.
    pub fn resolve(&self, name: &str) -> Ty {
        self.types.get(name).cloned().unwrap_or(Ty::Unknown)
    }

    pub fn resolve_ref(&self, ty: &TyRef) -> Ty {
        match ty {
            TyRef::Name(name) => self.resolve(name),
            TyRef::Type(ty) => ty.clone(),
        }
    }

    pub fn resolve_binding(&self, binding: &Binding) -> Ty {
        match binding {
            Binding::Name(name) => self.resolve(name),
            Binding::Type(ty) => ty.clone(),
        }
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope stack plus the shared registry.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    registry: Arc<TypeRegistry>,
    /// Index 0 is the global (catalog) scope.
    scopes: Vec<FxHashMap<String, Binding>>,
}

impl SymbolTable {
    /// A table with one empty global scope.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_globals(registry, FxHashMap::default())
    }

    pub fn with_globals(registry: Arc<TypeRegistry>, globals: FxHashMap<String, Binding>) -> Self {
        SymbolTable {
            registry,
            scopes: vec![globals],
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
        trace!(depth = self.scopes.len(), "push scope");
    }

    /// # Panics
    ///
    /// Panics if called when only the global scope remains.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
        trace!(depth = self.scopes.len(), "pop scope");
    }

    /// Bind `name` in the innermost scope.
    pub fn declare(&mut self, name: impl Into<String>, binding: impl Into<Binding>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), binding.into());
        }
    }

    /// Rebind the nearest existing binding of `name`, or declare it in the
    /// innermost scope if there is none.
    pub fn update(&mut self, name: &str, binding: impl Into<Binding>) {
        let binding = binding.into();
        let innermost = self.scopes.len() - 1;
        for (depth, scope) in self.scopes.iter_mut().enumerate().rev() {
            if let Some(slot) = scope.get_mut(name) {
                if depth != innermost {
                    trace!(name, depth, "rebind outer binding");
                }
                *slot = binding;
                return;
            }
        }
        self.declare(name, binding);
    }

    /// The nearest binding of `name`; `Unknown` on a miss.
    pub fn lookup(&self, name: &str) -> Binding {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .unwrap_or(Binding::Type(Ty::Unknown))
    }

    /// [`lookup`](Self::lookup) with registry names resolved.
    pub fn lookup_type(&self, name: &str) -> Ty {
        self.registry.resolve_binding(&self.lookup(name))
    }

    /// Whether `name` is bound in any scope.
    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains_key(name))
    }

    /// Number of scopes on the stack.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Discard every scope above `depth`.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero or deeper than the current stack.
    pub fn restore_depth(&mut self, depth: usize) {
        assert!(
            depth >= 1 && depth <= self.scopes.len(),
            "cannot restore scope stack to depth {depth} (current depth {})",
            self.scopes.len()
        );
        self.scopes.truncate(depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        registry.insert("Collection", Ty::object("Collection", None, true));
        Arc::new(registry)
    }

    #[test]
    fn registry_always_has_unknown() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.get(UNKNOWN_TYPE), Some(&Ty::Unknown));
        assert_eq!(registry.resolve("Missing"), Ty::Unknown);
    }

    #[test]
    fn lookup_resolves_names_against_registry() {
        let mut globals = FxHashMap::default();
        globals.insert("coll".to_string(), Binding::Name("Collection".to_string()));
        let table = SymbolTable::with_globals(registry(), globals);

        assert_eq!(table.lookup("coll"), Binding::Name("Collection".to_string()));
        assert_eq!(table.lookup_type("coll").name(), "Collection");
        assert_eq!(table.lookup("nope"), Binding::Type(Ty::Unknown));
    }

    #[test]
    fn inner_declaration_is_gone_after_pop() {
        let mut table = SymbolTable::new(registry());
        table.push_scope();
        table.declare("x", Ty::function("Collection", false));
        assert!(table.lookup_type("x").is_function());
        table.pop_scope();
        assert!(table.lookup_type("x").is_unknown());
        assert!(!table.is_bound("x"));
    }

    #[test]
    fn update_rebinds_outer_binding() {
        let mut table = SymbolTable::new(registry());
        table.push_scope();
        table.declare("x", Ty::Unknown);
        table.push_scope();
        table.update("x", Binding::Name("Collection".to_string()));
        table.pop_scope();
        assert_eq!(table.lookup_type("x").name(), "Collection");
    }

    #[test]
    fn update_without_binding_declares_innermost() {
        let mut table = SymbolTable::new(registry());
        table.push_scope();
        table.push_scope();
        table.update("y", Ty::Unknown);
        assert!(table.is_bound("y"));
        table.pop_scope();
        assert!(!table.is_bound("y"));
    }

    #[test]
    fn shadowing_prefers_innermost() {
        let mut table = SymbolTable::new(registry());
        table.declare("v", Binding::Name("Collection".to_string()));
        table.push_scope();
        table.declare("v", Ty::Unknown);
        assert!(table.lookup_type("v").is_unknown());
        table.pop_scope();
        assert_eq!(table.lookup_type("v").name(), "Collection");
    }

    #[test]
    #[should_panic(expected = "cannot pop the global scope")]
    fn popping_global_scope_panics() {
        let mut table = SymbolTable::new(registry());
        table.pop_scope();
    }

    #[test]
    fn restore_depth_discards_inner_scopes() {
        let mut table = SymbolTable::new(registry());
        table.push_scope();
        table.declare("kept", Ty::Unknown);
        let depth = table.depth();
        table.push_scope();
        table.push_scope();
        table.declare("dropped", Ty::Unknown);
        table.restore_depth(depth);
        assert_eq!(table.depth(), 2);
        assert!(table.is_bound("kept"));
        assert!(!table.is_bound("dropped"));
    }

    #[test]
    #[should_panic(expected = "cannot restore scope stack")]
    fn restore_deeper_panics() {
        let mut table = SymbolTable::new(registry());
        table.restore_depth(3);
    }
}
