//! Package import resolution
//!
//! Explicit imports resolve their package and imported member lazily, each
//! missing piece diagnosed once. Wildcard imports resolve individual names
//! on demand, manufacturing an implicit-import symbol attributed to the
//! scope that owns the wildcard; the lookup engine memoises those in the
//! owning scope's name map.

use crate::compilation::Compilation;
use crate::lookup::LookupKind;
use crate::symbol::{ImplicitImportData, SymbolId, SymbolKind};
use sk_diag::DiagCode;
use sk_intern::Name;
use sk_span::SourceLocation;

impl Compilation {
    /// The package an explicit import refers to, or `None` (diagnosed once)
    /// if the package does not exist.
    pub fn explicit_import_package(&mut self, import: SymbolId) -> Option<SymbolId> {
        self.resolve_explicit(import);
        match &self.symbols[import].kind {
            SymbolKind::ExplicitImport(data) => data.package,
            _ => panic!("symbol is not an explicit import"),
        }
    }

    /// The symbol an explicit import brings into scope, or `None`
    /// (diagnosed once) if the package or the member is missing.
    pub fn explicit_imported_symbol(&mut self, import: SymbolId) -> Option<SymbolId> {
        self.resolve_explicit(import);
        match &self.symbols[import].kind {
            SymbolKind::ExplicitImport(data) => data.imported,
            _ => panic!("symbol is not an explicit import"),
        }
    }

    fn resolve_explicit(&mut self, import: SymbolId) {
        let (package_name, import_name, location) = match &self.symbols[import].kind {
            SymbolKind::ExplicitImport(data) => {
                if data.resolved {
                    return;
                }
                (
                    data.package_name,
                    data.import_name,
                    self.symbols[import].location,
                )
            }
            _ => panic!("symbol is not an explicit import"),
        };

        let package = self.lookup_package(package_name);
        if package.is_none() {
            let detail = self.tree.interner.resolve(package_name);
            self.report_with(DiagCode::MissingPackage, location, detail);
        }

        let imported = package.and_then(|package| {
            let found = self.lookup(package, import_name, location, LookupKind::Direct);
            if found.is_none() {
                let detail = self.tree.interner.resolve(import_name);
                self.report_with(DiagCode::MissingImportedMember, location, detail);
            }
            found
        });

        match &mut self.symbols[import].kind {
            SymbolKind::ExplicitImport(data) => {
                data.resolved = true;
                data.package = package;
                data.imported = imported;
            }
            _ => unreachable!(),
        }
    }

    /// The package a wildcard import refers to, or `None` (diagnosed once).
    pub fn wildcard_package(&mut self, wildcard: SymbolId) -> Option<SymbolId> {
        let (package_name, location) = match &self.symbols[wildcard].kind {
            SymbolKind::WildcardImport(data) => {
                if data.resolved {
                    return data.package;
                }
                (data.package_name, self.symbols[wildcard].location)
            }
            _ => panic!("symbol is not a wildcard import"),
        };

        let package = self.lookup_package(package_name);
        if package.is_none() {
            let detail = self.tree.interner.resolve(package_name);
            self.report_with(DiagCode::MissingPackage, location, detail);
        }

        match &mut self.symbols[wildcard].kind {
            SymbolKind::WildcardImport(data) => {
                data.resolved = true;
                data.package = package;
            }
            _ => unreachable!(),
        }
        package
    }

    /// Resolve one name through a wildcard import. On success an
    /// implicit-import symbol wrapping the target is created, owned by the
    /// scope the wildcard lives in.
    pub(crate) fn wildcard_resolve(
        &mut self,
        wildcard: SymbolId,
        name: Name,
        lookup_location: SourceLocation,
    ) -> Option<SymbolId> {
        let package = self.wildcard_package(wildcard)?;
        let target = self.lookup(package, name, lookup_location, LookupKind::Direct)?;

        let parent = self.parent(wildcard);
        let location = self.symbols[wildcard].location;
        Some(self.alloc_symbol(
            name,
            location,
            parent,
            SymbolKind::ImplicitImport(ImplicitImportData {
                wildcard,
                imported: target,
            }),
        ))
    }

    /// The target of an implicit import.
    pub fn implicit_import_target(&self, implicit: SymbolId) -> SymbolId {
        match &self.symbols[implicit].kind {
            SymbolKind::ImplicitImport(data) => data.imported,
            _ => panic!("symbol is not an implicit import"),
        }
    }

    /// The wildcard that produced an implicit import.
    pub fn implicit_import_wildcard(&self, implicit: SymbolId) -> SymbolId {
        match &self.symbols[implicit].kind {
            SymbolKind::ImplicitImport(data) => data.wildcard,
            _ => panic!("symbol is not an implicit import"),
        }
    }

    /// The package an implicit import came through.
    pub fn implicit_import_package(&mut self, implicit: SymbolId) -> Option<SymbolId> {
        let wildcard = self.implicit_import_wildcard(implicit);
        self.wildcard_package(wildcard)
    }
}
