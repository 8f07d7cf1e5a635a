//! The symbol model
//!
//! Every logical code construct — modules, packages, parameters, variables,
//! imports, generate blocks — is a [`Symbol`]: a common header (kind tag,
//! interned name, source location, parent scope) plus a payload-carrying
//! tagged variant. Symbols live in the compilation's arena and reference
//! each other by [`SymbolId`], which is how the cyclic reference graph is
//! represented without ownership cycles. Dispatch for scope operations is by
//! kind tag rather than virtual calls.

use crate::definition::ParameterInfo;
use crate::lazy::{LazyConstant, LazyInitializer, LazyStatement, LazyStatementList, LazyType};
use la_arena::Idx;
use rustc_hash::FxHashMap;
use sk_const_eval::ConstValue;
use sk_intern::Name;
use sk_span::SourceLocation;
use sk_syntax::{
    DefinitionKind, ExprId, FormalArgumentDirection, ItemId, ProceduralBlockKind, VariableLifetime,
};

/// Stable reference to a symbol, valid for the compilation's lifetime
pub type SymbolId = Idx<Symbol>;

/// A symbol: the common header plus the kind payload
#[derive(Debug)]
pub struct Symbol {
    /// Interned name; the empty name for anonymous symbols
    pub name: Name,
    /// Declared location, or [`SourceLocation::NONE`] for synthetic symbols
    pub location: SourceLocation,
    /// Containing scope. `None` only for the design root, which is its own
    /// parent; [`crate::Compilation::parent`] folds that back into a
    /// self-reference.
    pub(crate) parent: Option<SymbolId>,
    /// Kind payload
    pub kind: SymbolKind,
}

/// The field-less kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTag {
    Unknown,
    Root,
    DynamicScope,
    CompilationUnit,
    IntegralType,
    RealType,
    StringType,
    CHandleType,
    VoidType,
    EventType,
    EnumType,
    TypeAlias,
    Parameter,
    EnumValue,
    Module,
    Interface,
    Modport,
    ModuleInstance,
    InterfaceInstance,
    Package,
    ExplicitImport,
    ImplicitImport,
    WildcardImport,
    Program,
    Attribute,
    Genvar,
    IfGenerate,
    LoopGenerate,
    GenerateBlock,
    ProceduralBlock,
    SequentialBlock,
    Variable,
    Instance,
    FormalArgument,
    Subroutine,
}

/// Kind payloads. The set is closed; scope-capable kinds embed their member
/// caches in the payload.
#[derive(Debug)]
pub enum SymbolKind {
    /// Error sentinel symbol (also serves as the error type)
    Unknown,
    Root(ScopeMembers),
    DynamicScope(DynamicScopeData),
    CompilationUnit(UnitData),
    IntegralType(IntegralTypeData),
    RealType,
    StringType,
    CHandleType,
    VoidType,
    EventType,
    EnumType(EnumTypeData),
    TypeAlias(TypeAliasData),
    Parameter(ParameterData),
    EnumValue(EnumValueData),
    Module(DefinitionData),
    Interface(DefinitionData),
    Modport,
    ModuleInstance(InstanceData),
    InterfaceInstance(InstanceData),
    Package(PackageData),
    ExplicitImport(ExplicitImportData),
    ImplicitImport(ImplicitImportData),
    WildcardImport(WildcardImportData),
    Program(DefinitionData),
    Attribute,
    Genvar,
    IfGenerate(GenerateConstructData),
    LoopGenerate(GenerateConstructData),
    GenerateBlock(GenerateBlockData),
    ProceduralBlock(ProceduralBlockData),
    SequentialBlock(SequentialBlockData),
    Variable(VariableData),
    Instance,
    FormalArgument(FormalArgumentData),
    Subroutine(SubroutineData),
}

impl SymbolKind {
    pub fn tag(&self) -> SymbolTag {
        match self {
            Self::Unknown => SymbolTag::Unknown,
            Self::Root(_) => SymbolTag::Root,
            Self::DynamicScope(_) => SymbolTag::DynamicScope,
            Self::CompilationUnit(_) => SymbolTag::CompilationUnit,
            Self::IntegralType(_) => SymbolTag::IntegralType,
            Self::RealType => SymbolTag::RealType,
            Self::StringType => SymbolTag::StringType,
            Self::CHandleType => SymbolTag::CHandleType,
            Self::VoidType => SymbolTag::VoidType,
            Self::EventType => SymbolTag::EventType,
            Self::EnumType(_) => SymbolTag::EnumType,
            Self::TypeAlias(_) => SymbolTag::TypeAlias,
            Self::Parameter(_) => SymbolTag::Parameter,
            Self::EnumValue(_) => SymbolTag::EnumValue,
            Self::Module(_) => SymbolTag::Module,
            Self::Interface(_) => SymbolTag::Interface,
            Self::Modport => SymbolTag::Modport,
            Self::ModuleInstance(_) => SymbolTag::ModuleInstance,
            Self::InterfaceInstance(_) => SymbolTag::InterfaceInstance,
            Self::Package(_) => SymbolTag::Package,
            Self::ExplicitImport(_) => SymbolTag::ExplicitImport,
            Self::ImplicitImport(_) => SymbolTag::ImplicitImport,
            Self::WildcardImport(_) => SymbolTag::WildcardImport,
            Self::Program(_) => SymbolTag::Program,
            Self::Attribute => SymbolTag::Attribute,
            Self::Genvar => SymbolTag::Genvar,
            Self::IfGenerate(_) => SymbolTag::IfGenerate,
            Self::LoopGenerate(_) => SymbolTag::LoopGenerate,
            Self::GenerateBlock(_) => SymbolTag::GenerateBlock,
            Self::ProceduralBlock(_) => SymbolTag::ProceduralBlock,
            Self::SequentialBlock(_) => SymbolTag::SequentialBlock,
            Self::Variable(_) => SymbolTag::Variable,
            Self::Instance => SymbolTag::Instance,
            Self::FormalArgument(_) => SymbolTag::FormalArgument,
            Self::Subroutine(_) => SymbolTag::Subroutine,
        }
    }

    /// The member caches, for scope-capable kinds
    pub fn members(&self) -> Option<&ScopeMembers> {
        match self {
            Self::Root(members) => Some(members),
            Self::DynamicScope(data) => Some(&data.members),
            Self::CompilationUnit(data) => Some(&data.members),
            Self::Package(data) => Some(&data.members),
            Self::ModuleInstance(data) | Self::InterfaceInstance(data) => Some(&data.members),
            Self::IfGenerate(data) | Self::LoopGenerate(data) => Some(&data.members),
            Self::GenerateBlock(data) => Some(&data.members),
            Self::ProceduralBlock(data) => Some(&data.members),
            Self::SequentialBlock(data) => Some(&data.members),
            Self::Subroutine(data) => Some(&data.members),
            _ => None,
        }
    }

    pub fn members_mut(&mut self) -> Option<&mut ScopeMembers> {
        match self {
            Self::Root(members) => Some(members),
            Self::DynamicScope(data) => Some(&mut data.members),
            Self::CompilationUnit(data) => Some(&mut data.members),
            Self::Package(data) => Some(&mut data.members),
            Self::ModuleInstance(data) | Self::InterfaceInstance(data) => Some(&mut data.members),
            Self::IfGenerate(data) | Self::LoopGenerate(data) => Some(&mut data.members),
            Self::GenerateBlock(data) => Some(&mut data.members),
            Self::ProceduralBlock(data) => Some(&mut data.members),
            Self::SequentialBlock(data) => Some(&mut data.members),
            Self::Subroutine(data) => Some(&mut data.members),
            _ => None,
        }
    }

    pub fn is_scope(&self) -> bool {
        self.members().is_some()
    }

    /// Whether this symbol can stand where a data type is expected
    pub fn is_type(&self) -> bool {
        matches!(
            self.tag(),
            SymbolTag::IntegralType
                | SymbolTag::RealType
                | SymbolTag::StringType
                | SymbolTag::CHandleType
                | SymbolTag::VoidType
                | SymbolTag::EventType
                | SymbolTag::EnumType
                | SymbolTag::TypeAlias
                | SymbolTag::Unknown
        )
    }
}

/// Member-cache state machine per scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberState {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
}

/// The three lazily built member structures of a scope
#[derive(Debug, Clone, Default)]
pub struct ScopeMembers {
    pub state: MemberState,
    /// Name to symbol; first declaration wins on collision
    pub member_map: FxHashMap<Name, SymbolId>,
    /// All members in declaration order
    pub member_list: Vec<SymbolId>,
    /// Sideband list of wildcard imports, consulted when the map misses
    pub wildcard_imports: Vec<SymbolId>,
}

/// A compilation unit's scope plus its top-level items
#[derive(Debug)]
pub struct UnitData {
    pub members: ScopeMembers,
    pub items: Vec<ItemId>,
}

/// A package scope plus its declared items
#[derive(Debug)]
pub struct PackageData {
    pub members: ScopeMembers,
    pub items: Vec<ItemId>,
}

/// A scope whose members are supplied programmatically, for tools and tests
#[derive(Debug, Default)]
pub struct DynamicScopeData {
    pub members: ScopeMembers,
    /// The explicitly added members; rebuilds replay this list
    pub explicit: Vec<SymbolId>,
}

/// A built-in integral type
#[derive(Debug, Clone, Copy)]
pub struct IntegralTypeData {
    pub width: u32,
    pub signed: bool,
    pub four_state: bool,
}

/// An enumeration type
#[derive(Debug)]
pub struct EnumTypeData {
    /// Base integral type
    pub base: SymbolId,
}

/// One value of an enumeration type
#[derive(Debug)]
pub struct EnumValueData {
    pub ty: SymbolId,
    pub value: ConstValue,
}

/// A typedef; the target type resolves lazily against the alias's scope
#[derive(Debug)]
pub struct TypeAliasData {
    pub target: LazyType,
}

/// A module/interface/program definition: raw declaration syntax plus the
/// cached parameter info extracted from it
#[derive(Debug)]
pub struct DefinitionData {
    pub kind: DefinitionKind,
    pub syntax: ItemId,
    pub(crate) params: Option<Vec<ParameterInfo>>,
}

/// An elaborated instance of a definition. Members are the definition's body
/// with parameters rebound to this instance's assignments.
#[derive(Debug)]
pub struct InstanceData {
    pub members: ScopeMembers,
    pub definition: SymbolId,
    /// Parameter name to assigning expression syntax
    pub assignments: FxHashMap<Name, ExprId>,
}

/// A parameter. Type and value are lazy cells evaluated against the scope
/// the parameter was elaborated into, so references inside them see this
/// instance's overrides rather than the definition's defaults.
#[derive(Debug)]
pub struct ParameterData {
    pub(crate) ty: LazyType,
    pub(crate) value: LazyConstant,
    pub(crate) default: Option<LazyConstant>,
    pub is_local: bool,
    pub is_port: bool,
    /// Scope the lazy cells evaluate against
    pub eval_scope: SymbolId,
}

/// A variable declaration
#[derive(Debug)]
pub struct VariableData {
    pub lifetime: VariableLifetime,
    pub is_const: bool,
    pub(crate) ty: LazyType,
    pub(crate) initializer: Option<LazyInitializer>,
}

/// A formal argument of a subroutine
#[derive(Debug)]
pub struct FormalArgumentData {
    pub direction: FormalArgumentDirection,
    pub(crate) ty: LazyType,
}

/// A task or function
#[derive(Debug)]
pub struct SubroutineData {
    pub members: ScopeMembers,
    pub syntax: ItemId,
    pub is_task: bool,
    pub default_lifetime: VariableLifetime,
    pub(crate) return_ty: LazyType,
    pub(crate) body: LazyStatementList,
}

/// An `initial`/`always`/`final` block with a lazily bound body
#[derive(Debug)]
pub struct ProceduralBlockData {
    pub members: ScopeMembers,
    pub kind: ProceduralBlockKind,
    pub(crate) body: LazyStatement,
}

/// A sequential `begin ... end` block with a lazily bound body
#[derive(Debug)]
pub struct SequentialBlockData {
    pub members: ScopeMembers,
    pub(crate) body: LazyStatement,
}

/// An explicit import (`import p::name`). Lookup never returns this symbol;
/// it unwraps to the imported target.
#[derive(Debug)]
pub struct ExplicitImportData {
    pub package_name: Name,
    pub import_name: Name,
    pub(crate) resolved: bool,
    pub(crate) package: Option<SymbolId>,
    pub(crate) imported: Option<SymbolId>,
}

/// A wildcard import (`import p::*`). Lives only in the owning scope's
/// sideband list; names resolve through it on demand.
#[derive(Debug)]
pub struct WildcardImportData {
    pub package_name: Name,
    pub(crate) resolved: bool,
    pub(crate) package: Option<SymbolId>,
}

/// The on-demand realisation of one name through a wildcard import, cached
/// in the importing scope
#[derive(Debug)]
pub struct ImplicitImportData {
    pub wildcard: SymbolId,
    pub imported: SymbolId,
}

/// An if-generate or loop-generate construct awaiting elaboration
#[derive(Debug)]
pub struct GenerateConstructData {
    pub members: ScopeMembers,
    pub syntax: ItemId,
}

/// A block produced by a generate construct. Expands a single body node and
/// injects the optional implicit loop-index parameter.
#[derive(Debug)]
pub struct GenerateBlockData {
    pub members: ScopeMembers,
    pub body: ItemId,
    pub implicit_param: Option<SymbolId>,
}
