//! Syntax tree model for the shrike semantic core
//!
//! The parser is an external collaborator; this crate pins down the contract
//! of its output. Nodes live in arenas inside a [`SyntaxTree`] and are
//! addressed by copyable ids, so semantic symbols can hold references to
//! unresolved syntax without lifetimes or ownership cycles. The builder
//! methods construct trees programmatically, which is also how the semantic
//! core's tests drive elaboration without a parser.

use la_arena::{Arena, Idx};
use sk_intern::{Interner, Name};
use sk_span::SourceLocation;

pub type ExprId = Idx<ExprSyntax>;
pub type DataTypeId = Idx<DataTypeSyntax>;
pub type StmtId = Idx<StatementSyntax>;
pub type ItemId = Idx<ItemSyntax>;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    /// Simple assignment; in constant contexts this only appears as the
    /// step of a generate loop (`i = i + 1`).
    Assign,
}

/// Unary operators, including the genvar iteration forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    LogicalNot,
    BitNot,
    PreIncrement,
    PostIncrement,
    PreDecrement,
    PostDecrement,
}

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprSyntax {
    IntLiteral {
        value: i64,
        location: SourceLocation,
    },
    RealLiteral {
        value: f64,
        location: SourceLocation,
    },
    StringLiteral {
        value: String,
        location: SourceLocation,
    },
    Identifier {
        name: Name,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
        location: SourceLocation,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        location: SourceLocation,
    },
    Conditional {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
        location: SourceLocation,
    },
}

impl ExprSyntax {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::IntLiteral { location, .. }
            | Self::RealLiteral { location, .. }
            | Self::StringLiteral { location, .. }
            | Self::Identifier { location, .. }
            | Self::Unary { location, .. }
            | Self::Binary { location, .. }
            | Self::Conditional { location, .. } => *location,
        }
    }
}

/// Built-in data type keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    Bit,
    Logic,
    Byte,
    ShortInt,
    Int,
    LongInt,
    Integer,
    Real,
    ShortReal,
    String,
    CHandle,
    Void,
    Event,
}

/// A data type reference
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeSyntax {
    /// One of the built-in type keywords
    Keyword {
        keyword: TypeKeyword,
        location: SourceLocation,
    },
    /// A named (user-defined) type
    Named {
        name: Name,
        location: SourceLocation,
    },
    /// No explicit type; the declaration infers one from its value
    Implicit { location: SourceLocation },
}

impl DataTypeSyntax {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::Keyword { location, .. }
            | Self::Named { location, .. }
            | Self::Implicit { location } => *location,
        }
    }
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum StatementSyntax {
    Empty {
        location: SourceLocation,
    },
    Expression {
        expr: ExprId,
        location: SourceLocation,
    },
    Block {
        label: Option<Name>,
        statements: Vec<StmtId>,
        location: SourceLocation,
    },
    If {
        condition: ExprId,
        then_stmt: StmtId,
        else_stmt: Option<StmtId>,
        location: SourceLocation,
    },
    ForLoop {
        /// A loop variable declared in the initializer, which gets an
        /// implicit enclosing block during binding
        init_decl: Option<ForInitDecl>,
        init_exprs: Vec<ExprId>,
        condition: Option<ExprId>,
        steps: Vec<ExprId>,
        body: StmtId,
        location: SourceLocation,
    },
    Return {
        expr: Option<ExprId>,
        location: SourceLocation,
    },
}

impl StatementSyntax {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::Empty { location }
            | Self::Expression { location, .. }
            | Self::Block { location, .. }
            | Self::If { location, .. }
            | Self::ForLoop { location, .. }
            | Self::Return { location, .. } => *location,
        }
    }
}

/// A loop variable declaration in a for-loop initializer
#[derive(Debug, Clone, PartialEq)]
pub struct ForInitDecl {
    pub ty: DataTypeId,
    pub name: Name,
    pub location: SourceLocation,
    pub initializer: ExprId,
}

/// Module, interface, and program declarations share one shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Module,
    Interface,
    Program,
}

/// `parameter` vs `localparam`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKeyword {
    Parameter,
    LocalParam,
}

/// Variable lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableLifetime {
    #[default]
    Automatic,
    Static,
}

/// Direction of a subroutine formal argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormalArgumentDirection {
    #[default]
    In,
    Out,
    InOut,
    Ref,
}

/// Kind of procedural block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceduralBlockKind {
    Initial,
    Final,
    Always,
    AlwaysComb,
    AlwaysLatch,
    AlwaysFf,
}

/// A name declared by a declaration, with its optional initializer
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaratorSyntax {
    pub name: Name,
    pub location: SourceLocation,
    pub initializer: Option<ExprId>,
}

/// A module/interface/program declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDeclSyntax {
    pub kind: DefinitionKind,
    pub name: Name,
    pub location: SourceLocation,
    /// Parameter port list; entries are `ItemSyntax::Parameter` items
    pub param_ports: Vec<ItemId>,
    /// Body items
    pub items: Vec<ItemId>,
}

/// A package declaration
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDeclSyntax {
    pub name: Name,
    pub location: SourceLocation,
    pub items: Vec<ItemId>,
}

/// One item of a package import declaration; `item` is `None` for a
/// wildcard (`import p::*`)
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItemSyntax {
    pub package: Name,
    pub item: Option<Name>,
    pub location: SourceLocation,
}

/// A parameter declaration. A declaration without a keyword is only legal
/// inside a parameter port list, where it inherits the locality of the
/// preceding declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclSyntax {
    pub keyword: Option<ParameterKeyword>,
    pub ty: DataTypeId,
    pub declarators: Vec<DeclaratorSyntax>,
    pub location: SourceLocation,
}

/// A data (variable) declaration
#[derive(Debug, Clone, PartialEq)]
pub struct DataDeclSyntax {
    pub ty: DataTypeId,
    pub lifetime: VariableLifetime,
    pub is_const: bool,
    pub declarators: Vec<DeclaratorSyntax>,
    pub location: SourceLocation,
}

/// A formal argument of a task or function
#[derive(Debug, Clone, PartialEq)]
pub struct FormalArgSyntax {
    pub name: Name,
    pub location: SourceLocation,
    pub direction: FormalArgumentDirection,
    pub ty: DataTypeId,
}

/// A task or function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclSyntax {
    pub name: Name,
    pub location: SourceLocation,
    pub is_task: bool,
    pub lifetime: VariableLifetime,
    pub return_ty: DataTypeId,
    pub args: Vec<FormalArgSyntax>,
    pub body: Vec<StmtId>,
}

/// One parameter assignment at an instantiation; `name` is `None` for
/// ordered (positional) assignments
#[derive(Debug, Clone, PartialEq)]
pub struct ParamAssignmentSyntax {
    pub name: Option<Name>,
    pub value: ExprId,
    pub location: SourceLocation,
}

/// One instance in an instantiation's comma list
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalInstanceSyntax {
    pub name: Name,
    pub location: SourceLocation,
    /// Element count for array instantiations (`m u[3]();`)
    pub array_size: Option<ExprId>,
}

/// A hierarchy instantiation (`m #(.P(7)) u1(), u2();`)
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyInstantiationSyntax {
    pub module: Name,
    pub location: SourceLocation,
    pub param_assignments: Vec<ParamAssignmentSyntax>,
    pub instances: Vec<HierarchicalInstanceSyntax>,
}

/// An if-generate construct; bodies are single items (typically generate
/// blocks)
#[derive(Debug, Clone, PartialEq)]
pub struct IfGenerateSyntax {
    pub condition: ExprId,
    pub location: SourceLocation,
    pub then_body: ItemId,
    pub else_body: Option<ItemId>,
}

/// A loop-generate construct
#[derive(Debug, Clone, PartialEq)]
pub struct LoopGenerateSyntax {
    /// Whether the loop declares its genvar inline (`for (genvar i = ...)`)
    pub declares_genvar: bool,
    pub genvar: Name,
    pub location: SourceLocation,
    pub init: ExprId,
    pub condition: ExprId,
    pub step: ExprId,
    pub body: ItemId,
}

/// A `begin ... end` generate block, possibly labelled
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateBlockSyntax {
    pub label: Option<Name>,
    pub location: SourceLocation,
    pub items: Vec<ItemId>,
}

/// An `initial`/`always`/`final` block
#[derive(Debug, Clone, PartialEq)]
pub struct ProceduralBlockSyntax {
    pub kind: ProceduralBlockKind,
    pub location: SourceLocation,
    pub body: StmtId,
}

/// A typedef
#[derive(Debug, Clone, PartialEq)]
pub struct TypedefSyntax {
    pub name: Name,
    pub location: SourceLocation,
    pub target: DataTypeId,
}

/// A design element or member item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSyntax {
    Module(ModuleDeclSyntax),
    Package(PackageDeclSyntax),
    Import(Vec<ImportItemSyntax>),
    Parameter(ParameterDeclSyntax),
    Data(DataDeclSyntax),
    Function(FunctionDeclSyntax),
    Genvar {
        name: Name,
        location: SourceLocation,
    },
    Instantiation(HierarchyInstantiationSyntax),
    IfGenerate(IfGenerateSyntax),
    LoopGenerate(LoopGenerateSyntax),
    GenerateBlock(GenerateBlockSyntax),
    ProceduralBlock(ProceduralBlockSyntax),
    Typedef(TypedefSyntax),
}

/// One compilation unit's worth of top-level items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilationUnitSyntax {
    pub items: Vec<ItemId>,
}

/// The whole parsed input: node arenas plus the compilation units
pub struct SyntaxTree {
    pub interner: Interner,
    exprs: Arena<ExprSyntax>,
    types: Arena<DataTypeSyntax>,
    stmts: Arena<StatementSyntax>,
    items: Arena<ItemSyntax>,
    units: Vec<CompilationUnitSyntax>,
}

impl SyntaxTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            exprs: Arena::new(),
            types: Arena::new(),
            stmts: Arena::new(),
            items: Arena::new(),
            units: Vec::new(),
        }
    }

    pub fn intern(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn add_expr(&mut self, expr: ExprSyntax) -> ExprId {
        self.exprs.alloc(expr)
    }

    pub fn add_type(&mut self, ty: DataTypeSyntax) -> DataTypeId {
        self.types.alloc(ty)
    }

    pub fn add_stmt(&mut self, stmt: StatementSyntax) -> StmtId {
        self.stmts.alloc(stmt)
    }

    pub fn add_item(&mut self, item: ItemSyntax) -> ItemId {
        self.items.alloc(item)
    }

    pub fn add_unit(&mut self, unit: CompilationUnitSyntax) {
        self.units.push(unit);
    }

    pub fn expr(&self, id: ExprId) -> &ExprSyntax {
        &self.exprs[id]
    }

    pub fn data_type(&self, id: DataTypeId) -> &DataTypeSyntax {
        &self.types[id]
    }

    pub fn stmt(&self, id: StmtId) -> &StatementSyntax {
        &self.stmts[id]
    }

    pub fn item(&self, id: ItemId) -> &ItemSyntax {
        &self.items[id]
    }

    pub fn units(&self) -> &[CompilationUnitSyntax] {
        &self.units
    }

    /// Whether the expression mentions `name` anywhere. Used to decide
    /// statically whether a generate loop's condition depends on its
    /// iteration variable.
    pub fn expr_mentions(&self, expr: ExprId, name: Name) -> bool {
        match &self.exprs[expr] {
            ExprSyntax::IntLiteral { .. }
            | ExprSyntax::RealLiteral { .. }
            | ExprSyntax::StringLiteral { .. } => false,
            ExprSyntax::Identifier { name: ident, .. } => *ident == name,
            ExprSyntax::Unary { operand, .. } => self.expr_mentions(*operand, name),
            ExprSyntax::Binary { lhs, rhs, .. } => {
                self.expr_mentions(*lhs, name) || self.expr_mentions(*rhs, name)
            }
            ExprSyntax::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                self.expr_mentions(*condition, name)
                    || self.expr_mentions(*then_expr, name)
                    || self.expr_mentions(*else_expr, name)
            }
        }
    }

    // Convenience constructors, used heavily by tests in place of a parser.

    pub fn int_literal(&mut self, value: i64, location: SourceLocation) -> ExprId {
        self.add_expr(ExprSyntax::IntLiteral { value, location })
    }

    pub fn ident(&mut self, name: &str, location: SourceLocation) -> ExprId {
        let name = self.intern(name);
        self.add_expr(ExprSyntax::Identifier { name, location })
    }

    pub fn binary(
        &mut self,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        location: SourceLocation,
    ) -> ExprId {
        self.add_expr(ExprSyntax::Binary {
            op,
            lhs,
            rhs,
            location,
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId, location: SourceLocation) -> ExprId {
        self.add_expr(ExprSyntax::Unary {
            op,
            operand,
            location,
        })
    }

    pub fn keyword_type(&mut self, keyword: TypeKeyword, location: SourceLocation) -> DataTypeId {
        self.add_type(DataTypeSyntax::Keyword { keyword, location })
    }

    pub fn named_type(&mut self, name: &str, location: SourceLocation) -> DataTypeId {
        let name = self.intern(name);
        self.add_type(DataTypeSyntax::Named { name, location })
    }

    pub fn implicit_type(&mut self, location: SourceLocation) -> DataTypeId {
        self.add_type(DataTypeSyntax::Implicit { location })
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}
