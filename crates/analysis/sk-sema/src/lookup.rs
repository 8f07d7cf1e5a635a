//! Name lookup
//!
//! Five lookup modes with distinct rules about parent traversal, package
//! imports, and which symbol kinds satisfy the search. Import symbols are
//! always unwrapped: lookup returns the imported target, never the wrapper.
//! For the location-sensitive modes, a candidate declared lexically after
//! the lookup location in its scope is treated as absent.

use crate::compilation::Compilation;
use crate::symbol::{SymbolId, SymbolTag};
use sk_intern::Name;
use sk_span::SourceLocation;

/// Specifies possible kinds of lookups that can be done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    /// A direct lookup within the scope, with no parent traversal and no
    /// import consideration. The lookup location is only used for error
    /// reporting.
    Direct,

    /// A lookup of a simple name starting in the local scope. The lookup
    /// location qualifies which symbols are visible. Package imports are
    /// considered, and the search continues into parent scopes.
    Local,

    /// The first part of a scoped name: a Local lookup, falling back to the
    /// compilation's package table.
    Scoped,

    /// A lookup of a name used as a callable; only subroutines satisfy it,
    /// anything else is skipped as if absent.
    Callable,

    /// A lookup of a module/interface/program definition, rooted at the
    /// compilation root rather than the starting scope.
    Definition,
}

impl Compilation {
    /// Look up `name` from `scope`. Returns `None` when nothing matches;
    /// the caller decides whether that is worth a diagnostic.
    pub fn lookup(
        &mut self,
        scope: SymbolId,
        name: Name,
        lookup_location: SourceLocation,
        kind: LookupKind,
    ) -> Option<SymbolId> {
        match kind {
            LookupKind::Direct => self.lookup_direct(scope, name),
            LookupKind::Local => self.lookup_local(scope, name, lookup_location, false),
            LookupKind::Scoped => self
                .lookup_local(scope, name, lookup_location, false)
                .or_else(|| self.lookup_package(name)),
            LookupKind::Callable => self.lookup_local(scope, name, lookup_location, true),
            LookupKind::Definition => self.lookup_definition(name),
        }
    }

    /// Lookup for call sites that have already established the symbol is
    /// present and of the given kind. Traps on absence or kind mismatch,
    /// which indicates a caller contract violation rather than a user error.
    pub fn lookup_expect(
        &mut self,
        scope: SymbolId,
        name: Name,
        lookup_location: SourceLocation,
        kind: LookupKind,
        tag: SymbolTag,
    ) -> SymbolId {
        let text = self.tree.interner.resolve(name);
        let Some(symbol) = self.lookup(scope, name, lookup_location, kind) else {
            panic!("lookup_expect: `{text}` not found");
        };
        let found = self.tag(symbol);
        assert!(
            found == tag,
            "lookup_expect: `{text}` is a {found:?}, expected {tag:?}"
        );
        symbol
    }

    /// A package by name, forcing the root tables if necessary.
    pub fn lookup_package(&mut self, name: Name) -> Option<SymbolId> {
        self.ensure_root_tables();
        self.package_map.get(&name).copied()
    }

    fn lookup_definition(&mut self, name: Name) -> Option<SymbolId> {
        self.ensure_root_tables();
        self.definition_map.get(&name).copied()
    }

    fn lookup_direct(&mut self, scope: SymbolId, name: Name) -> Option<SymbolId> {
        self.ensure_members(scope);
        let candidate = self.scope_members(scope).member_map.get(&name).copied()?;
        match self.tag(candidate) {
            // Implicit imports are synthetic lookup memos; a direct lookup
            // never surfaces them.
            SymbolTag::ImplicitImport => None,
            SymbolTag::ExplicitImport => self.explicit_imported_symbol(candidate),
            _ => Some(candidate),
        }
    }

    fn lookup_local(
        &mut self,
        scope: SymbolId,
        name: Name,
        lookup_location: SourceLocation,
        callable_only: bool,
    ) -> Option<SymbolId> {
        let mut current = scope;
        loop {
            self.ensure_members(current);

            let candidate = self.scope_members(current).member_map.get(&name).copied();
            if let Some(candidate) = candidate {
                // Declarations later in the scope than the lookup location
                // are not visible to it.
                if !self.symbols[candidate].location.is_after(lookup_location) {
                    let target = match self.tag(candidate) {
                        SymbolTag::ImplicitImport => {
                            Some(self.implicit_import_target(candidate))
                        }
                        SymbolTag::ExplicitImport => self.explicit_imported_symbol(candidate),
                        _ => Some(candidate),
                    };
                    if let Some(target) = target {
                        if !callable_only || self.tag(target) == SymbolTag::Subroutine {
                            return Some(target);
                        }
                    }
                }
            }

            // Fall back to wildcard imports, in declaration order.
            let wildcards = self.scope_members(current).wildcard_imports.clone();
            for wildcard in wildcards {
                let Some(implicit) = self.wildcard_resolve(wildcard, name, lookup_location)
                else {
                    continue;
                };
                let target = self.implicit_import_target(implicit);
                if callable_only && self.tag(target) != SymbolTag::Subroutine {
                    continue;
                }
                // Memoise so the next lookup of this name hits the map
                // without consulting the wildcard again. A real member that
                // was merely invisible at this location keeps its map slot.
                let members = self.scope_members_mut(current);
                if !members.member_map.contains_key(&name) {
                    members.member_map.insert(name, implicit);
                    members.member_list.push(implicit);
                }
                return Some(target);
            }

            let parent = self.parent(current);
            if parent == current {
                return None;
            }
            current = parent;
        }
    }
}
