//! The scope engine
//!
//! A scope's members are built lazily: the first access runs the kind's fill
//! routine into a scratch [`MemberBuilder`], then materialises the name map,
//! the ordered member list, and the wildcard-import sideband. Marking a
//! scope dirty discards the caches; the next access rebuilds them. Filling a
//! scope that is already filling is a structural elaboration cycle and is
//! diagnosed as fatal for that scope.

use crate::compilation::Compilation;
use crate::lazy::Lazy;
use crate::symbol::{
    DefinitionData, GenerateBlockData, GenerateConstructData, MemberState, PackageData,
    ParameterData, ProceduralBlockData, SubroutineData, SymbolId, SymbolKind, SymbolTag, UnitData,
    VariableData,
};
use rustc_hash::FxHashMap;
use sk_const_eval::ConstValue;
use sk_diag::DiagCode;
use sk_intern::Name;
use sk_span::SourceLocation;
use sk_syntax::{CompilationUnitSyntax, ItemId, ItemSyntax, ParameterKeyword};

/// Scratch structure used while building a scope's member caches
#[derive(Default)]
pub(crate) struct MemberBuilder {
    pub(crate) map: FxHashMap<Name, SymbolId>,
    pub(crate) list: Vec<SymbolId>,
    pub(crate) wildcards: Vec<SymbolId>,
}

impl MemberBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl Compilation {
    /// Cheap when the scope is initialised; otherwise builds the members.
    pub fn ensure_members(&mut self, scope: SymbolId) {
        match self.scope_members(scope).state {
            MemberState::Initialized => {}
            MemberState::Initializing => {
                // Re-entrant fill: a structural cycle in elaboration.
                let location = self.symbols[scope].location;
                self.report(DiagCode::CyclicDependency, location);
            }
            MemberState::Uninitialized => self.do_init(scope),
        }
    }

    fn do_init(&mut self, scope: SymbolId) {
        self.scope_members_mut(scope).state = MemberState::Initializing;

        let mut builder = MemberBuilder::new();
        self.fill_members(scope, &mut builder);

        let members = self.scope_members_mut(scope);
        members.member_map = builder.map;
        members.member_list = builder.list;
        members.wildcard_imports = builder.wildcards;
        members.state = MemberState::Initialized;
    }

    /// All members in declaration order; triggers initialisation.
    pub fn members(&mut self, scope: SymbolId) -> &[SymbolId] {
        self.ensure_members(scope);
        &self.scope_members(scope).member_list
    }

    /// Member at an index, which callers have already established exists.
    pub fn member(&mut self, scope: SymbolId, index: usize) -> SymbolId {
        self.members(scope)[index]
    }

    /// Discard the member caches; the next access rebuilds them. Cached
    /// implicit imports memoised into the map are discarded along with it.
    pub fn mark_dirty(&mut self, scope: SymbolId) {
        let members = self.scope_members_mut(scope);
        members.state = MemberState::Uninitialized;
        members.member_map = FxHashMap::default();
        members.member_list = Vec::new();
        members.wildcard_imports = Vec::new();
    }

    /// Override the members of a scope with an explicit list. The override
    /// is discarded if the scope is marked dirty and rebuilt, except for
    /// dynamic scopes, whose fill replays the explicit list.
    pub fn set_members(&mut self, scope: SymbolId, list: Vec<SymbolId>) {
        let empty = self.tree.interner.empty_name();
        let mut map = FxHashMap::default();
        let mut wildcards = Vec::new();
        for &sym in &list {
            let name = self.symbols[sym].name;
            if self.symbols[sym].kind.tag() == SymbolTag::WildcardImport {
                wildcards.push(sym);
            } else if name != empty {
                map.entry(name).or_insert(sym);
            }
        }

        if let SymbolKind::DynamicScope(data) = &mut self.symbols[scope].kind {
            data.explicit = list.clone();
        }

        let members = self.scope_members_mut(scope);
        members.member_map = map;
        members.member_list = list;
        members.wildcard_imports = wildcards;
        members.state = MemberState::Initialized;
    }

    /// Override a scope to a single member.
    pub fn set_member(&mut self, scope: SymbolId, member: SymbolId) {
        self.set_members(scope, vec![member]);
    }

    /// Add a symbol to a dynamic scope.
    pub fn dynamic_scope_add(&mut self, scope: SymbolId, symbol: SymbolId) {
        self.ensure_members(scope);
        match &mut self.symbols[scope].kind {
            SymbolKind::DynamicScope(data) => data.explicit.push(symbol),
            _ => panic!("dynamic_scope_add on a non-dynamic scope"),
        }

        let empty = self.tree.interner.empty_name();
        let name = self.symbols[symbol].name;
        let is_wildcard = self.symbols[symbol].kind.tag() == SymbolTag::WildcardImport;
        let members = self.scope_members_mut(scope);
        members.member_list.push(symbol);
        if is_wildcard {
            members.wildcard_imports.push(symbol);
        } else if name != empty {
            members.member_map.entry(name).or_insert(symbol);
        }
    }

    /// Create symbols for a syntax item and add them to a dynamic scope,
    /// returning the created symbols.
    pub fn dynamic_scope_add_item(&mut self, scope: SymbolId, item: ItemId) -> Vec<SymbolId> {
        let mut builder = MemberBuilder::new();
        self.builder_add_item(&mut builder, scope, item);
        let created = builder.list;
        for &sym in &created {
            self.dynamic_scope_add(scope, sym);
        }
        created
    }

    // ---- read-only cache views ------------------------------------------

    /// Direct view of the name map, without triggering initialisation.
    /// Mostly useful for asserting on memoisation behaviour.
    pub fn member_map_entry(&self, scope: SymbolId, name: Name) -> Option<SymbolId> {
        self.scope_members(scope).member_map.get(&name).copied()
    }

    /// The wildcard-import sideband of a scope.
    pub fn wildcard_imports_of(&self, scope: SymbolId) -> &[SymbolId] {
        &self.scope_members(scope).wildcard_imports
    }

    pub(crate) fn scope_members(&self, scope: SymbolId) -> &crate::symbol::ScopeMembers {
        self.symbols[scope]
            .kind
            .members()
            .unwrap_or_else(|| panic!("symbol {:?} is not a scope", self.tag(scope)))
    }

    pub(crate) fn scope_members_mut(&mut self, scope: SymbolId) -> &mut crate::symbol::ScopeMembers {
        let tag = self.tag(scope);
        self.symbols[scope]
            .kind
            .members_mut()
            .unwrap_or_else(|| panic!("symbol {tag:?} is not a scope"))
    }

    // ---- fill dispatch ---------------------------------------------------

    fn fill_members(&mut self, scope: SymbolId, builder: &mut MemberBuilder) {
        match self.tag(scope) {
            SymbolTag::Root => self.fill_root(scope, builder),
            SymbolTag::CompilationUnit => {
                let items = match &self.symbols[scope].kind {
                    SymbolKind::CompilationUnit(data) => data.items.clone(),
                    _ => unreachable!(),
                };
                for item in items {
                    self.builder_add_item(builder, scope, item);
                }
            }
            SymbolTag::Package => {
                let items = match &self.symbols[scope].kind {
                    SymbolKind::Package(data) => data.items.clone(),
                    _ => unreachable!(),
                };
                for item in items {
                    self.builder_add_item(builder, scope, item);
                }
            }
            SymbolTag::DynamicScope => {
                let explicit = match &self.symbols[scope].kind {
                    SymbolKind::DynamicScope(data) => data.explicit.clone(),
                    _ => unreachable!(),
                };
                for sym in explicit {
                    self.builder_add_symbol(builder, sym);
                }
            }
            SymbolTag::ModuleInstance | SymbolTag::InterfaceInstance => {
                self.instance_fill(scope, builder);
            }
            SymbolTag::IfGenerate => self.if_generate_fill(scope, builder),
            SymbolTag::LoopGenerate => self.loop_generate_fill(scope, builder),
            SymbolTag::GenerateBlock => self.generate_block_fill(scope, builder),
            SymbolTag::Subroutine => self.subroutine_fill(scope, builder),
            // Procedural and sequential blocks hold lazily bound statement
            // bodies rather than syntax-derived members.
            _ => {}
        }
    }

    fn fill_root(&mut self, root: SymbolId, builder: &mut MemberBuilder) {
        for builtin in self.builtins.all() {
            self.builder_add_symbol(builder, builtin);
        }

        let empty = self.tree.interner.empty_name();
        let units: Vec<Vec<ItemId>> = self
            .tree
            .units()
            .iter()
            .map(|unit: &CompilationUnitSyntax| unit.items.clone())
            .collect();
        for items in units {
            let unit = self.alloc_symbol(
                empty,
                SourceLocation::NONE,
                root,
                SymbolKind::CompilationUnit(UnitData {
                    members: Default::default(),
                    items,
                }),
            );
            self.builder_add_symbol(builder, unit);
        }
    }

    // ---- builder ---------------------------------------------------------

    /// Enrol one already-created symbol. Wildcard imports go to the sideband
    /// list and never to the name map; anonymous symbols are list-only. A
    /// name collision is diagnosed, the first declaration keeps the map
    /// entry, and both stay in the list so diagnostics can reference both.
    pub(crate) fn builder_add_symbol(&mut self, builder: &mut MemberBuilder, symbol: SymbolId) {
        builder.list.push(symbol);

        if self.symbols[symbol].kind.tag() == SymbolTag::WildcardImport {
            builder.wildcards.push(symbol);
            return;
        }

        let name = self.symbols[symbol].name;
        if name == self.tree.interner.empty_name() {
            return;
        }
        if builder.map.contains_key(&name) {
            let location = self.symbols[symbol].location;
            let detail = self.name_text(symbol);
            self.report_with(DiagCode::DuplicateDefinition, location, detail);
        } else {
            builder.map.insert(name, symbol);
        }
    }

    /// Create the symbol(s) for a syntax item and enrol them.
    pub(crate) fn builder_add_item(
        &mut self,
        builder: &mut MemberBuilder,
        parent: SymbolId,
        item: ItemId,
    ) {
        let syntax = self.tree.item(item).clone();
        match syntax {
            ItemSyntax::Module(decl) => {
                let kind = match decl.kind {
                    sk_syntax::DefinitionKind::Module => SymbolKind::Module(DefinitionData {
                        kind: decl.kind,
                        syntax: item,
                        params: None,
                    }),
                    sk_syntax::DefinitionKind::Interface => {
                        SymbolKind::Interface(DefinitionData {
                            kind: decl.kind,
                            syntax: item,
                            params: None,
                        })
                    }
                    sk_syntax::DefinitionKind::Program => SymbolKind::Program(DefinitionData {
                        kind: decl.kind,
                        syntax: item,
                        params: None,
                    }),
                };
                let sym = self.alloc_symbol(decl.name, decl.location, parent, kind);
                self.builder_add_symbol(builder, sym);
                if self.tag(parent) == SymbolTag::CompilationUnit {
                    self.register_definition(decl.name, sym);
                }
            }
            ItemSyntax::Package(decl) => {
                let sym = self.alloc_symbol(
                    decl.name,
                    decl.location,
                    parent,
                    SymbolKind::Package(PackageData {
                        members: Default::default(),
                        items: decl.items,
                    }),
                );
                self.builder_add_symbol(builder, sym);
                if self.tag(parent) == SymbolTag::CompilationUnit {
                    self.register_package(decl.name, sym);
                }
            }
            ItemSyntax::Import(items) => {
                for import in items {
                    let sym = match import.item {
                        Some(import_name) => self.alloc_symbol(
                            import_name,
                            import.location,
                            parent,
                            SymbolKind::ExplicitImport(crate::symbol::ExplicitImportData {
                                package_name: import.package,
                                import_name,
                                resolved: false,
                                package: None,
                                imported: None,
                            }),
                        ),
                        None => {
                            let empty = self.tree.interner.empty_name();
                            self.alloc_symbol(
                                empty,
                                import.location,
                                parent,
                                SymbolKind::WildcardImport(crate::symbol::WildcardImportData {
                                    package_name: import.package,
                                    resolved: false,
                                    package: None,
                                }),
                            )
                        }
                    };
                    self.builder_add_symbol(builder, sym);
                }
            }
            ItemSyntax::Parameter(decl) => {
                let local = matches!(decl.keyword, Some(ParameterKeyword::LocalParam));
                for declarator in decl.declarators {
                    let value = match declarator.initializer {
                        Some(expr) => Lazy::from_syntax(expr),
                        None => Lazy::resolved(ConstValue::Bad),
                    };
                    let sym = self.alloc_symbol(
                        declarator.name,
                        declarator.location,
                        parent,
                        SymbolKind::Parameter(ParameterData {
                            ty: Lazy::from_syntax(decl.ty),
                            value,
                            default: declarator.initializer.map(Lazy::from_syntax),
                            is_local: local,
                            is_port: false,
                            eval_scope: parent,
                        }),
                    );
                    self.builder_add_symbol(builder, sym);
                }
            }
            ItemSyntax::Data(decl) => {
                for declarator in decl.declarators {
                    let sym = self.alloc_symbol(
                        declarator.name,
                        declarator.location,
                        parent,
                        SymbolKind::Variable(VariableData {
                            lifetime: decl.lifetime,
                            is_const: decl.is_const,
                            ty: Lazy::from_syntax(decl.ty),
                            initializer: declarator.initializer.map(Lazy::from_syntax),
                        }),
                    );
                    self.builder_add_symbol(builder, sym);
                }
            }
            ItemSyntax::Function(decl) => {
                let sym = self.alloc_symbol(
                    decl.name,
                    decl.location,
                    parent,
                    SymbolKind::Subroutine(SubroutineData {
                        members: Default::default(),
                        syntax: item,
                        is_task: decl.is_task,
                        default_lifetime: decl.lifetime,
                        return_ty: Lazy::from_syntax(decl.return_ty),
                        body: Lazy::from_syntax(decl.body),
                    }),
                );
                self.builder_add_symbol(builder, sym);
            }
            ItemSyntax::Genvar { name, location } => {
                let sym = self.alloc_symbol(name, location, parent, SymbolKind::Genvar);
                self.builder_add_symbol(builder, sym);
            }
            ItemSyntax::Instantiation(instantiation) => {
                self.instances_from_syntax(builder, parent, &instantiation);
            }
            ItemSyntax::IfGenerate(decl) => {
                let empty = self.tree.interner.empty_name();
                let sym = self.alloc_symbol(
                    empty,
                    decl.location,
                    parent,
                    SymbolKind::IfGenerate(GenerateConstructData {
                        members: Default::default(),
                        syntax: item,
                    }),
                );
                self.builder_add_symbol(builder, sym);
            }
            ItemSyntax::LoopGenerate(decl) => {
                let empty = self.tree.interner.empty_name();
                let sym = self.alloc_symbol(
                    empty,
                    decl.location,
                    parent,
                    SymbolKind::LoopGenerate(GenerateConstructData {
                        members: Default::default(),
                        syntax: item,
                    }),
                );
                self.builder_add_symbol(builder, sym);
            }
            ItemSyntax::GenerateBlock(decl) => {
                let name = decl
                    .label
                    .unwrap_or_else(|| self.tree.interner.empty_name());
                let sym = self.alloc_symbol(
                    name,
                    decl.location,
                    parent,
                    SymbolKind::GenerateBlock(GenerateBlockData {
                        members: Default::default(),
                        body: item,
                        implicit_param: None,
                    }),
                );
                self.builder_add_symbol(builder, sym);
            }
            ItemSyntax::ProceduralBlock(decl) => {
                let empty = self.tree.interner.empty_name();
                let sym = self.alloc_symbol(
                    empty,
                    decl.location,
                    parent,
                    SymbolKind::ProceduralBlock(ProceduralBlockData {
                        members: Default::default(),
                        kind: decl.kind,
                        body: Lazy::from_syntax(decl.body),
                    }),
                );
                self.builder_add_symbol(builder, sym);
            }
            ItemSyntax::Typedef(decl) => {
                let sym = self.alloc_symbol(
                    decl.name,
                    decl.location,
                    parent,
                    SymbolKind::TypeAlias(crate::symbol::TypeAliasData {
                        target: Lazy::from_syntax(decl.target),
                    }),
                );
                self.builder_add_symbol(builder, sym);
            }
        }
    }

    fn subroutine_fill(&mut self, scope: SymbolId, builder: &mut MemberBuilder) {
        let syntax = self.subroutine_data(scope).syntax;
        let decl = match self.tree.item(syntax) {
            ItemSyntax::Function(decl) => decl.clone(),
            _ => panic!("subroutine symbol does not reference a function declaration"),
        };
        for arg in decl.args {
            let sym = self.alloc_symbol(
                arg.name,
                arg.location,
                scope,
                SymbolKind::FormalArgument(crate::symbol::FormalArgumentData {
                    direction: arg.direction,
                    ty: Lazy::from_syntax(arg.ty),
                }),
            );
            self.builder_add_symbol(builder, sym);
        }
    }
}
