//! The compilation: arena, factory, and symbol base operations
//!
//! A [`Compilation`] owns every symbol, bound node, and constant produced
//! while elaborating one design, along with the interner, the diagnostics
//! sink, and the syntax tree being elaborated. All references between
//! symbols are arena ids, valid until the compilation is dropped. The
//! compilation is single-owner: every cache transition goes through
//! `&mut self`, which is the whole locking story.

use crate::bind::{BoundExprId, Expression, Statement, StatementId};
use crate::symbol::{
    DynamicScopeData, InstanceData, IntegralTypeData, ParameterData, ScopeMembers, Symbol,
    SymbolId, SymbolKind, SymbolTag,
};
use crate::lazy::Lazy;
use la_arena::Arena;
use rustc_hash::FxHashMap;
use sk_const_eval::ConstValue;
use sk_diag::{DiagCode, Diagnostics};
use sk_intern::Name;
use sk_span::SourceLocation;
use sk_syntax::SyntaxTree;

/// Tunable limits for elaboration
#[derive(Debug, Clone, Copy)]
pub struct CompilationOptions {
    /// Upper bound on generate-loop iterations before the loop is abandoned
    /// with a diagnostic
    pub max_generate_iterations: u32,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_generate_iterations: 1 << 20,
        }
    }
}

/// The pre-created built-in type symbols
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    pub bit: SymbolId,
    pub logic: SymbolId,
    pub byte: SymbolId,
    pub short_int: SymbolId,
    pub int: SymbolId,
    pub long_int: SymbolId,
    pub integer: SymbolId,
    pub real: SymbolId,
    pub short_real: SymbolId,
    pub string: SymbolId,
    pub chandle: SymbolId,
    pub void_ty: SymbolId,
    pub event: SymbolId,
    /// The error sentinel; doubles as the bad type
    pub error_type: SymbolId,
}

impl Builtins {
    pub(crate) fn all(&self) -> [SymbolId; 13] {
        [
            self.bit,
            self.logic,
            self.byte,
            self.short_int,
            self.int,
            self.long_int,
            self.integer,
            self.real,
            self.short_real,
            self.string,
            self.chandle,
            self.void_ty,
            self.event,
        ]
    }
}

/// Owns all semantic state for one elaborated design
pub struct Compilation {
    pub(crate) tree: SyntaxTree,
    pub(crate) symbols: Arena<Symbol>,
    pub(crate) exprs: Arena<Expression>,
    pub(crate) stmts: Arena<Statement>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) options: CompilationOptions,
    pub(crate) builtins: Builtins,
    root: SymbolId,
    /// Module/interface/program definitions by name, for Definition lookup
    pub(crate) definition_map: FxHashMap<Name, SymbolId>,
    /// Packages by name, for Scoped lookup and import resolution
    pub(crate) package_map: FxHashMap<Name, SymbolId>,
    pub(crate) bad_expr: BoundExprId,
    pub(crate) bad_stmt: StatementId,
}

impl Compilation {
    /// Create a compilation over the given syntax tree. The root scope is
    /// populated lazily with one compilation-unit child per unit in the
    /// tree, plus the built-in types.
    pub fn new(tree: SyntaxTree, options: CompilationOptions) -> Self {
        let mut symbols = Arena::new();
        let empty = tree.interner.empty_name();

        // The root is its own parent; `parent` of None renders as a
        // self-reference through the accessor.
        let root = symbols.alloc(Symbol {
            name: empty,
            location: SourceLocation::NONE,
            parent: None,
            kind: SymbolKind::Root(ScopeMembers::default()),
        });

        let mut exprs = Arena::new();
        let bad_expr = exprs.alloc(Expression::Bad {
            location: SourceLocation::NONE,
        });
        let mut stmts = Arena::new();
        let bad_stmt = stmts.alloc(Statement::Bad);

        let mut compilation = Self {
            tree,
            symbols,
            exprs,
            stmts,
            diagnostics: Diagnostics::new(),
            options,
            builtins: Builtins {
                // Placeholder; replaced right below once the arena exists.
                bit: root,
                logic: root,
                byte: root,
                short_int: root,
                int: root,
                long_int: root,
                integer: root,
                real: root,
                short_real: root,
                string: root,
                chandle: root,
                void_ty: root,
                event: root,
                error_type: root,
            },
            root,
            definition_map: FxHashMap::default(),
            package_map: FxHashMap::default(),
            bad_expr,
            bad_stmt,
        };
        compilation.builtins = compilation.create_builtins();
        compilation
    }

    fn create_builtins(&mut self) -> Builtins {
        let root = self.root;
        let integral = |comp: &mut Self, name: &str, width: u32, signed: bool, four_state: bool| {
            let name = comp.intern(name);
            comp.alloc_symbol(
                name,
                SourceLocation::NONE,
                root,
                SymbolKind::IntegralType(IntegralTypeData {
                    width,
                    signed,
                    four_state,
                }),
            )
        };

        let bit = integral(self, "bit", 1, false, false);
        let logic = integral(self, "logic", 1, false, true);
        let byte = integral(self, "byte", 8, true, false);
        let short_int = integral(self, "shortint", 16, true, false);
        let int = integral(self, "int", 32, true, false);
        let long_int = integral(self, "longint", 64, true, false);
        let integer = integral(self, "integer", 32, true, true);

        let simple = |comp: &mut Self, name: &str, kind: SymbolKind| {
            let name = comp.intern(name);
            comp.alloc_symbol(name, SourceLocation::NONE, root, kind)
        };
        let real = simple(self, "real", SymbolKind::RealType);
        let short_real = simple(self, "shortreal", SymbolKind::RealType);
        let string = simple(self, "string", SymbolKind::StringType);
        let chandle = simple(self, "chandle", SymbolKind::CHandleType);
        let void_ty = simple(self, "void", SymbolKind::VoidType);
        let event = simple(self, "event", SymbolKind::EventType);
        let error_type = simple(self, "<error>", SymbolKind::Unknown);

        Builtins {
            bit,
            logic,
            byte,
            short_int,
            int,
            long_int,
            integer,
            real,
            short_real,
            string,
            chandle,
            void_ty,
            event,
            error_type,
        }
    }

    // ---- base accessors -------------------------------------------------

    pub fn root(&self) -> SymbolId {
        self.root
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn intern(&self, text: &str) -> Name {
        self.tree.interner.intern(text)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn tag(&self, id: SymbolId) -> SymbolTag {
        self.symbols[id].kind.tag()
    }

    pub fn name_of(&self, id: SymbolId) -> Name {
        self.symbols[id].name
    }

    /// The symbol's name as text, for assertions and messages
    pub fn name_text(&self, id: SymbolId) -> String {
        self.tree.interner.resolve(self.symbols[id].name)
    }

    /// Containing scope; the root returns itself
    pub fn parent(&self, id: SymbolId) -> SymbolId {
        self.symbols[id].parent.unwrap_or(id)
    }

    /// First ancestor of the given kind, starting at the symbol itself.
    /// Asking for [`SymbolTag::Root`] always succeeds.
    pub fn find_ancestor(&self, id: SymbolId, tag: SymbolTag) -> Option<SymbolId> {
        if tag == SymbolTag::Root {
            return Some(self.root);
        }
        let mut current = id;
        loop {
            if self.tag(current) == tag {
                return Some(current);
            }
            let parent = self.parent(current);
            if parent == current {
                return None;
            }
            current = parent;
        }
    }

    /// Report a diagnostic against this compilation
    pub(crate) fn report(&mut self, code: DiagCode, location: SourceLocation) {
        self.diagnostics.report(code, location);
    }

    pub(crate) fn report_with(
        &mut self,
        code: DiagCode,
        location: SourceLocation,
        detail: String,
    ) {
        self.diagnostics.report_with(code, location, detail);
    }

    // ---- factory --------------------------------------------------------

    pub(crate) fn alloc_symbol(
        &mut self,
        name: Name,
        location: SourceLocation,
        parent: SymbolId,
        kind: SymbolKind,
    ) -> SymbolId {
        self.symbols.alloc(Symbol {
            name,
            location,
            parent: Some(parent),
            kind,
        })
    }

    /// Create a dynamically populated scope, for tools and tests
    pub fn add_dynamic_scope(&mut self, parent: SymbolId) -> SymbolId {
        let name = self.tree.interner.empty_name();
        self.alloc_symbol(
            name,
            SourceLocation::NONE,
            parent,
            SymbolKind::DynamicScope(DynamicScopeData::default()),
        )
    }

    /// Create an instance of a definition with no parameter overrides, named
    /// after the definition. This is how top-level instances and test
    /// fixtures are made; the caller decides where (if anywhere) to enrol
    /// the instance as a member.
    pub fn add_instance(&mut self, definition: SymbolId, parent: SymbolId) -> SymbolId {
        let def = &self.symbols[definition];
        let name = def.name;
        let location = def.location;
        let kind = match def.kind.tag() {
            SymbolTag::Interface => SymbolKind::InterfaceInstance(InstanceData {
                members: ScopeMembers::default(),
                definition,
                assignments: FxHashMap::default(),
            }),
            _ => SymbolKind::ModuleInstance(InstanceData {
                members: ScopeMembers::default(),
                definition,
                assignments: FxHashMap::default(),
            }),
        };
        self.alloc_symbol(name, location, parent, kind)
    }

    /// Create an enumeration type over an integral base type
    pub fn add_enum_type(
        &mut self,
        name: Name,
        location: SourceLocation,
        parent: SymbolId,
        base: SymbolId,
    ) -> SymbolId {
        self.alloc_symbol(
            name,
            location,
            parent,
            SymbolKind::EnumType(crate::symbol::EnumTypeData { base }),
        )
    }

    /// Create one value of an enumeration type
    pub fn add_enum_value(
        &mut self,
        name: Name,
        location: SourceLocation,
        parent: SymbolId,
        ty: SymbolId,
        value: ConstValue,
    ) -> SymbolId {
        self.alloc_symbol(
            name,
            location,
            parent,
            SymbolKind::EnumValue(crate::symbol::EnumValueData { ty, value }),
        )
    }

    /// Create a parameter with an already-known type and value
    pub fn add_parameter(
        &mut self,
        name: Name,
        location: SourceLocation,
        parent: SymbolId,
        ty: SymbolId,
        value: ConstValue,
    ) -> SymbolId {
        self.alloc_symbol(
            name,
            location,
            parent,
            SymbolKind::Parameter(ParameterData {
                ty: Lazy::resolved(ty),
                value: Lazy::resolved(value),
                default: None,
                is_local: true,
                is_port: false,
                eval_scope: parent,
            }),
        )
    }

    // ---- typed payload access (traps on mismatch) -----------------------

    fn kind_trap(&self, id: SymbolId, expected: &str) -> ! {
        panic!(
            "symbol `{}` is a {:?}, not a {expected}",
            self.name_text(id),
            self.tag(id)
        );
    }

    pub fn parameter_data(&self, id: SymbolId) -> &ParameterData {
        match &self.symbols[id].kind {
            SymbolKind::Parameter(data) => data,
            _ => self.kind_trap(id, "parameter"),
        }
    }

    pub(crate) fn parameter_data_mut(&mut self, id: SymbolId) -> &mut ParameterData {
        match &mut self.symbols[id].kind {
            SymbolKind::Parameter(data) => data,
            _ => panic!("symbol is not a parameter"),
        }
    }

    pub fn definition_data(&self, id: SymbolId) -> &crate::symbol::DefinitionData {
        match &self.symbols[id].kind {
            SymbolKind::Module(data) | SymbolKind::Interface(data) | SymbolKind::Program(data) => {
                data
            }
            _ => self.kind_trap(id, "definition"),
        }
    }

    pub(crate) fn definition_data_mut(&mut self, id: SymbolId) -> &mut crate::symbol::DefinitionData {
        match &mut self.symbols[id].kind {
            SymbolKind::Module(data) | SymbolKind::Interface(data) | SymbolKind::Program(data) => {
                data
            }
            _ => panic!("symbol is not a definition"),
        }
    }

    pub fn instance_data(&self, id: SymbolId) -> &InstanceData {
        match &self.symbols[id].kind {
            SymbolKind::ModuleInstance(data) | SymbolKind::InterfaceInstance(data) => data,
            _ => self.kind_trap(id, "instance"),
        }
    }

    pub fn variable_data(&self, id: SymbolId) -> &crate::symbol::VariableData {
        match &self.symbols[id].kind {
            SymbolKind::Variable(data) => data,
            _ => self.kind_trap(id, "variable"),
        }
    }

    pub fn subroutine_data(&self, id: SymbolId) -> &crate::symbol::SubroutineData {
        match &self.symbols[id].kind {
            SymbolKind::Subroutine(data) => data,
            _ => self.kind_trap(id, "subroutine"),
        }
    }

    /// Width/signedness of an integral type symbol
    pub fn integral_data(&self, id: SymbolId) -> &IntegralTypeData {
        match &self.symbols[id].kind {
            SymbolKind::IntegralType(data) => data,
            _ => self.kind_trap(id, "integral type"),
        }
    }

    // ---- root tables ----------------------------------------------------

    /// Force the root and every compilation unit to materialise, so the
    /// definition and package tables are complete.
    pub(crate) fn ensure_root_tables(&mut self) {
        self.ensure_members(self.root);
        let units: Vec<SymbolId> = self
            .symbols[self.root]
            .kind
            .members()
            .map(|members| {
                members
                    .member_list
                    .iter()
                    .copied()
                    .filter(|&child| self.symbols[child].kind.tag() == SymbolTag::CompilationUnit)
                    .collect()
            })
            .unwrap_or_default();
        for unit in units {
            self.ensure_members(unit);
        }
    }

    pub(crate) fn register_definition(&mut self, name: Name, definition: SymbolId) {
        if let Some(&existing) = self.definition_map.get(&name) {
            // A rebuild re-registers the same declaration with a fresh
            // symbol; only distinct source declarations collide.
            if self.symbols[existing].location != self.symbols[definition].location {
                let location = self.symbols[definition].location;
                let detail = self.name_text(definition);
                self.report_with(DiagCode::DuplicateDefinition, location, detail);
            }
        }
        self.definition_map.insert(name, definition);
    }

    pub(crate) fn register_package(&mut self, name: Name, package: SymbolId) {
        if let Some(&existing) = self.package_map.get(&name) {
            if self.symbols[existing].location != self.symbols[package].location {
                let location = self.symbols[package].location;
                let detail = self.name_text(package);
                self.report_with(DiagCode::DuplicateDefinition, location, detail);
            }
        }
        self.package_map.insert(name, package);
    }
}
