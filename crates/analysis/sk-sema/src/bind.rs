//! Expression, statement, and type binding
//!
//! This is the semantic checker the elaboration engine consumes: given a
//! scope and a syntax node, produce a bound semantic node, a resolved type
//! symbol, or a constant value. Every entry point recovers locally — on
//! failure it reports through the sink and returns a well-formed bad
//! sentinel rather than aborting.

use crate::compilation::Compilation;
use crate::lazy::{Lazy, LazyProbe};
use crate::lookup::LookupKind;
use crate::symbol::{ScopeMembers, SequentialBlockData, SymbolId, SymbolKind, SymbolTag, VariableData};
use la_arena::Idx;
use sk_const_eval::{eval_binary, eval_unary, ConstError, ConstValue};
use sk_diag::DiagCode;
use sk_span::SourceLocation;
use sk_syntax::{
    BinaryOp, DataTypeId, DataTypeSyntax, ExprId, ExprSyntax, StatementSyntax, StmtId, TypeKeyword,
    UnaryOp,
};

/// Stable reference to a bound expression
pub type BoundExprId = Idx<Expression>;
/// Stable reference to a bound statement
pub type StatementId = Idx<Statement>;

/// A bound (checked) expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
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
    /// A name resolved to a symbol
    NamedValue {
        symbol: SymbolId,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: BoundExprId,
        location: SourceLocation,
    },
    Binary {
        op: BinaryOp,
        lhs: BoundExprId,
        rhs: BoundExprId,
        location: SourceLocation,
    },
    Conditional {
        condition: BoundExprId,
        then_expr: BoundExprId,
        else_expr: BoundExprId,
        location: SourceLocation,
    },
    /// The bad sentinel
    Bad { location: SourceLocation },
}

impl Expression {
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::IntLiteral { location, .. }
            | Self::RealLiteral { location, .. }
            | Self::StringLiteral { location, .. }
            | Self::NamedValue { location, .. }
            | Self::Unary { location, .. }
            | Self::Binary { location, .. }
            | Self::Conditional { location, .. }
            | Self::Bad { location } => *location,
        }
    }
}

/// A bound statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Empty,
    List(Vec<StatementId>),
    Expression(BoundExprId),
    Conditional {
        condition: BoundExprId,
        then_stmt: StatementId,
        else_stmt: Option<StatementId>,
    },
    ForLoop {
        init: Vec<BoundExprId>,
        condition: Option<BoundExprId>,
        steps: Vec<BoundExprId>,
        body: StatementId,
        /// The implicit block wrapping a loop variable declared in the
        /// initializer
        implicit_block: Option<SymbolId>,
    },
    Return {
        expr: Option<BoundExprId>,
    },
    /// The bad sentinel
    Bad,
}

impl Compilation {
    pub fn bound_expr(&self, id: BoundExprId) -> &Expression {
        &self.exprs[id]
    }

    pub fn bound_stmt(&self, id: StatementId) -> &Statement {
        &self.stmts[id]
    }

    // ---- expressions -----------------------------------------------------

    /// Bind an expression against a scope.
    pub fn bind_expression(&mut self, scope: SymbolId, expr: ExprId) -> BoundExprId {
        self.bind_expression_with(scope, expr, None)
    }

    /// Bind with an optional genvar substitution: an identifier matching
    /// the genvar name binds to its current iteration value instead of
    /// going through lookup.
    pub(crate) fn bind_expression_with(
        &mut self,
        scope: SymbolId,
        expr: ExprId,
        genvar: Option<(sk_intern::Name, i64)>,
    ) -> BoundExprId {
        let syntax = self.tree.expr(expr).clone();
        let bound = match syntax {
            ExprSyntax::IntLiteral { value, location } => Expression::IntLiteral { value, location },
            ExprSyntax::RealLiteral { value, location } => {
                Expression::RealLiteral { value, location }
            }
            ExprSyntax::StringLiteral { value, location } => {
                Expression::StringLiteral { value, location }
            }
            ExprSyntax::Identifier { name, location } => {
                if let Some((genvar_name, value)) = genvar {
                    if name == genvar_name {
                        let node = Expression::IntLiteral { value, location };
                        return self.exprs.alloc(node);
                    }
                }
                match self.lookup(scope, name, location, LookupKind::Local) {
                    Some(symbol) => Expression::NamedValue { symbol, location },
                    None => {
                        let detail = self.tree.interner.resolve(name);
                        self.report_with(DiagCode::UndeclaredIdentifier, location, detail);
                        Expression::Bad { location }
                    }
                }
            }
            ExprSyntax::Unary {
                op,
                operand,
                location,
            } => {
                let operand = self.bind_expression_with(scope, operand, genvar);
                Expression::Unary {
                    op,
                    operand,
                    location,
                }
            }
            ExprSyntax::Binary {
                op,
                lhs,
                rhs,
                location,
            } => {
                let lhs = self.bind_expression_with(scope, lhs, genvar);
                let rhs = self.bind_expression_with(scope, rhs, genvar);
                Expression::Binary {
                    op,
                    lhs,
                    rhs,
                    location,
                }
            }
            ExprSyntax::Conditional {
                condition,
                then_expr,
                else_expr,
                location,
            } => {
                let condition = self.bind_expression_with(scope, condition, genvar);
                let then_expr = self.bind_expression_with(scope, then_expr, genvar);
                let else_expr = self.bind_expression_with(scope, else_expr, genvar);
                Expression::Conditional {
                    condition,
                    then_expr,
                    else_expr,
                    location,
                }
            }
        };
        self.exprs.alloc(bound)
    }

    /// Reduce a bound expression to a constant value, reporting anything
    /// that is not constant.
    pub fn evaluate_bound(&mut self, expr: BoundExprId) -> ConstValue {
        let node = self.exprs[expr].clone();
        match node {
            Expression::IntLiteral { value, .. } => ConstValue::Int(value),
            Expression::RealLiteral { value, .. } => ConstValue::Real(value),
            Expression::StringLiteral { value, .. } => ConstValue::Str(value),
            Expression::NamedValue { symbol, location } => match self.tag(symbol) {
                SymbolTag::Parameter => self.parameter_value(symbol),
                SymbolTag::EnumValue => match &self.symbols[symbol].kind {
                    SymbolKind::EnumValue(data) => data.value.clone(),
                    _ => unreachable!(),
                },
                _ => {
                    self.report(DiagCode::NotConstant, location);
                    ConstValue::Bad
                }
            },
            Expression::Unary {
                op,
                operand,
                location,
            } => {
                if matches!(
                    op,
                    UnaryOp::PreIncrement
                        | UnaryOp::PostIncrement
                        | UnaryOp::PreDecrement
                        | UnaryOp::PostDecrement
                ) {
                    self.report(DiagCode::NotConstant, location);
                    return ConstValue::Bad;
                }
                let operand = self.evaluate_bound(operand);
                match eval_unary(op, operand, location) {
                    Ok(value) => value,
                    Err(error) => self.report_const_error(&error),
                }
            }
            Expression::Binary {
                op,
                lhs,
                rhs,
                location,
            } => {
                if op == BinaryOp::Assign {
                    self.report(DiagCode::NotConstant, location);
                    return ConstValue::Bad;
                }
                let lhs = self.evaluate_bound(lhs);
                let rhs = self.evaluate_bound(rhs);
                match eval_binary(op, lhs, rhs, location) {
                    Ok(value) => value,
                    Err(error) => self.report_const_error(&error),
                }
            }
            Expression::Conditional {
                condition,
                then_expr,
                else_expr,
                ..
            } => {
                let condition_value = self.evaluate_bound(condition);
                match condition_value.truthy() {
                    Some(true) => self.evaluate_bound(then_expr),
                    Some(false) => self.evaluate_bound(else_expr),
                    None => {
                        if !condition_value.is_bad() {
                            let location = self.exprs[condition].location();
                            self.report(DiagCode::TypeMismatch, location);
                        }
                        ConstValue::Bad
                    }
                }
            }
            Expression::Bad { .. } => ConstValue::Bad,
        }
    }

    fn report_const_error(&mut self, error: &ConstError) -> ConstValue {
        let location = error.location();
        match error {
            ConstError::DivisionByZero { .. } => self.report(DiagCode::DivisionByZero, location),
            ConstError::Overflow { .. } => self.report(DiagCode::ArithmeticOverflow, location),
            ConstError::InvalidOperands { .. } | ConstError::InvalidConversion { .. } => {
                self.report_with(DiagCode::TypeMismatch, location, error.to_string());
            }
        }
        ConstValue::Bad
    }

    /// Bind and evaluate an expression as a constant in a scope.
    pub fn evaluate_constant(&mut self, scope: SymbolId, expr: ExprId) -> ConstValue {
        let bound = self.bind_expression(scope, expr);
        self.evaluate_bound(bound)
    }

    pub(crate) fn evaluate_constant_with(
        &mut self,
        scope: SymbolId,
        expr: ExprId,
        genvar: Option<(sk_intern::Name, i64)>,
    ) -> ConstValue {
        let bound = self.bind_expression_with(scope, expr, genvar);
        self.evaluate_bound(bound)
    }

    /// Bind, evaluate, and convert to a target type. On conversion failure
    /// the result is the bad sentinel; no exception escapes.
    pub fn evaluate_constant_and_convert(
        &mut self,
        scope: SymbolId,
        expr: ExprId,
        target: SymbolId,
        error_location: SourceLocation,
    ) -> ConstValue {
        let value = self.evaluate_constant(scope, expr);
        self.convert_constant(value, target, error_location)
    }

    /// Convert a constant to a target type symbol, diagnosing and returning
    /// the bad sentinel on failure.
    pub fn convert_constant(
        &mut self,
        value: ConstValue,
        target: SymbolId,
        location: SourceLocation,
    ) -> ConstValue {
        enum Plan {
            Integral(u32, bool),
            Real,
            Str,
            Enum(SymbolId),
            Alias,
            Error,
            Mismatch,
        }
        let plan = match &self.symbols[target].kind {
            SymbolKind::IntegralType(data) => Plan::Integral(data.width, data.signed),
            SymbolKind::RealType => Plan::Real,
            SymbolKind::StringType => Plan::Str,
            SymbolKind::EnumType(data) => Plan::Enum(data.base),
            SymbolKind::TypeAlias(_) => Plan::Alias,
            // The error type absorbs values silently; the cause was
            // already diagnosed.
            SymbolKind::Unknown => Plan::Error,
            _ => Plan::Mismatch,
        };
        let result = match plan {
            Plan::Integral(width, signed) => value.convert_to_integral(width, signed, location),
            Plan::Real => value.convert_to_real(location),
            Plan::Str => value.convert_to_string(location),
            Plan::Enum(base) => {
                let base_data = self.integral_data(base);
                let (width, signed) = (base_data.width, base_data.signed);
                value.convert_to_integral(width, signed, location)
            }
            Plan::Alias => {
                let canonical = self.canonical_type(target);
                if canonical == target {
                    return ConstValue::Bad;
                }
                return self.convert_constant(value, canonical, location);
            }
            Plan::Error => return ConstValue::Bad,
            Plan::Mismatch => {
                self.report(DiagCode::TypeMismatch, location);
                return ConstValue::Bad;
            }
        };
        match result {
            Ok(value) => value,
            Err(error) => self.report_const_error(&error),
        }
    }

    // ---- types -----------------------------------------------------------

    /// Bind a data type reference to a type symbol. Named types go through
    /// lookup; aliases unwrap to their canonical type. Failures resolve to
    /// the error type.
    pub fn bind_type(&mut self, scope: SymbolId, ty: DataTypeId) -> SymbolId {
        let syntax = self.tree.data_type(ty).clone();
        match syntax {
            DataTypeSyntax::Keyword { keyword, .. } => self.builtin_type(keyword),
            DataTypeSyntax::Implicit { .. } => self.builtins.error_type,
            DataTypeSyntax::Named { name, location } => {
                match self.lookup(scope, name, location, LookupKind::Local) {
                    Some(symbol) if self.symbols[symbol].kind.is_type() => {
                        self.canonical_type(symbol)
                    }
                    Some(symbol) => {
                        let detail = format!(
                            "`{}` is a {:?}, not a type",
                            self.name_text(symbol),
                            self.tag(symbol)
                        );
                        self.report_with(DiagCode::KindMismatch, location, detail);
                        self.builtins.error_type
                    }
                    None => {
                        let detail = self.tree.interner.resolve(name);
                        self.report_with(DiagCode::UndeclaredIdentifier, location, detail);
                        self.builtins.error_type
                    }
                }
            }
        }
    }

    fn builtin_type(&self, keyword: TypeKeyword) -> SymbolId {
        match keyword {
            TypeKeyword::Bit => self.builtins.bit,
            TypeKeyword::Logic => self.builtins.logic,
            TypeKeyword::Byte => self.builtins.byte,
            TypeKeyword::ShortInt => self.builtins.short_int,
            TypeKeyword::Int => self.builtins.int,
            TypeKeyword::LongInt => self.builtins.long_int,
            TypeKeyword::Integer => self.builtins.integer,
            TypeKeyword::Real => self.builtins.real,
            TypeKeyword::ShortReal => self.builtins.short_real,
            TypeKeyword::String => self.builtins.string,
            TypeKeyword::CHandle => self.builtins.chandle,
            TypeKeyword::Void => self.builtins.void_ty,
            TypeKeyword::Event => self.builtins.event,
        }
    }

    /// Resolve a type-alias chain to its canonical type; a cycle among
    /// aliases is diagnosed once and resolves to the error type.
    pub fn canonical_type(&mut self, ty: SymbolId) -> SymbolId {
        if self.tag(ty) != SymbolTag::TypeAlias {
            return ty;
        }
        let probe = match &mut self.symbols[ty].kind {
            SymbolKind::TypeAlias(data) => data.target.probe(),
            _ => unreachable!(),
        };
        match probe {
            LazyProbe::Done(target) => target,
            LazyProbe::Cycle => {
                let location = self.symbols[ty].location;
                self.report(DiagCode::CyclicDependency, location);
                let error = self.builtins.error_type;
                self.finish_alias(ty, error);
                error
            }
            LazyProbe::Evaluate(target_syntax) => {
                let scope = self.parent(ty);
                let target = self.bind_type(scope, target_syntax);
                self.finish_alias(ty, target);
                target
            }
        }
    }

    fn finish_alias(&mut self, alias: SymbolId, target: SymbolId) {
        match &mut self.symbols[alias].kind {
            SymbolKind::TypeAlias(data) => data.target.finish(target),
            _ => unreachable!(),
        }
    }

    /// The type a bare value would have
    pub(crate) fn type_of_value(&self, value: &ConstValue) -> SymbolId {
        match value {
            ConstValue::Int(_) => self.builtins.int,
            ConstValue::Real(_) => self.builtins.real,
            ConstValue::Str(_) => self.builtins.string,
            ConstValue::Bad => self.builtins.error_type,
        }
    }

    // ---- statements ------------------------------------------------------

    /// Bind a statement against a scope.
    pub fn bind_statement(&mut self, scope: SymbolId, stmt: StmtId) -> StatementId {
        let syntax = self.tree.stmt(stmt).clone();
        let bound = match syntax {
            StatementSyntax::Empty { .. } => Statement::Empty,
            StatementSyntax::Expression { expr, .. } => {
                let expr = self.bind_expression(scope, expr);
                Statement::Expression(expr)
            }
            StatementSyntax::Block { statements, .. } => {
                let statements = statements
                    .iter()
                    .map(|&stmt| self.bind_statement(scope, stmt))
                    .collect();
                Statement::List(statements)
            }
            StatementSyntax::If {
                condition,
                then_stmt,
                else_stmt,
                ..
            } => {
                let condition = self.bind_expression(scope, condition);
                let then_stmt = self.bind_statement(scope, then_stmt);
                let else_stmt = else_stmt.map(|stmt| self.bind_statement(scope, stmt));
                Statement::Conditional {
                    condition,
                    then_stmt,
                    else_stmt,
                }
            }
            StatementSyntax::ForLoop {
                init_decl,
                init_exprs,
                condition,
                steps,
                body,
                location,
            } => {
                if let Some(decl) = init_decl {
                    // The declared loop variable lives in an implicit block
                    // wrapped around the loop.
                    return self.bind_for_with_decl(
                        scope, decl, init_exprs, condition, steps, body, location,
                    );
                }
                let init = init_exprs
                    .iter()
                    .map(|&expr| self.bind_expression(scope, expr))
                    .collect();
                let condition = condition.map(|expr| self.bind_expression(scope, expr));
                let steps = steps
                    .iter()
                    .map(|&expr| self.bind_expression(scope, expr))
                    .collect();
                let body = self.bind_statement(scope, body);
                Statement::ForLoop {
                    init,
                    condition,
                    steps,
                    body,
                    implicit_block: None,
                }
            }
            StatementSyntax::Return { expr, .. } => {
                let expr = expr.map(|expr| self.bind_expression(scope, expr));
                Statement::Return { expr }
            }
        };
        self.stmts.alloc(bound)
    }

    #[allow(clippy::too_many_arguments)]
    fn bind_for_with_decl(
        &mut self,
        scope: SymbolId,
        decl: sk_syntax::ForInitDecl,
        init_exprs: Vec<ExprId>,
        condition: Option<ExprId>,
        steps: Vec<ExprId>,
        body: StmtId,
        location: SourceLocation,
    ) -> StatementId {
        let block = self.alloc_symbol(
            self.tree.interner.empty_name(),
            location,
            scope,
            SymbolKind::SequentialBlock(SequentialBlockData {
                members: ScopeMembers::default(),
                body: Lazy::Resolving,
            }),
        );
        let variable = self.alloc_symbol(
            decl.name,
            decl.location,
            block,
            SymbolKind::Variable(VariableData {
                lifetime: sk_syntax::VariableLifetime::Automatic,
                is_const: false,
                ty: Lazy::from_syntax(decl.ty),
                initializer: Some(Lazy::from_syntax(decl.initializer)),
            }),
        );
        self.set_member(block, variable);

        let init = init_exprs
            .iter()
            .map(|&expr| self.bind_expression(block, expr))
            .collect();
        let condition = condition.map(|expr| self.bind_expression(block, expr));
        let steps = steps
            .iter()
            .map(|&expr| self.bind_expression(block, expr))
            .collect();
        let body = self.bind_statement(block, body);

        let bound = self.stmts.alloc(Statement::ForLoop {
            init,
            condition,
            steps,
            body,
            implicit_block: Some(block),
        });
        match &mut self.symbols[block].kind {
            SymbolKind::SequentialBlock(data) => data.body = Lazy::resolved(bound),
            _ => unreachable!(),
        }
        bound
    }

    /// Bind a list of statements into one list statement.
    pub fn bind_statement_list(&mut self, scope: SymbolId, stmts: &[StmtId]) -> StatementId {
        let bound = stmts
            .iter()
            .map(|&stmt| self.bind_statement(scope, stmt))
            .collect();
        self.stmts.alloc(Statement::List(bound))
    }

    // ---- lazy accessors on symbols ---------------------------------------

    /// A variable's resolved type, bound against its parent scope.
    pub fn variable_type(&mut self, variable: SymbolId) -> SymbolId {
        let probe = match &mut self.symbols[variable].kind {
            SymbolKind::Variable(data) => data.ty.probe(),
            _ => panic!("symbol is not a variable"),
        };
        self.finish_type_probe(variable, probe, |comp, id, ty| {
            match &mut comp.symbols[id].kind {
                SymbolKind::Variable(data) => data.ty.finish(ty),
                _ => unreachable!(),
            }
        })
    }

    /// A formal argument's resolved type.
    pub fn formal_argument_type(&mut self, argument: SymbolId) -> SymbolId {
        let probe = match &mut self.symbols[argument].kind {
            SymbolKind::FormalArgument(data) => data.ty.probe(),
            _ => panic!("symbol is not a formal argument"),
        };
        self.finish_type_probe(argument, probe, |comp, id, ty| {
            match &mut comp.symbols[id].kind {
                SymbolKind::FormalArgument(data) => data.ty.finish(ty),
                _ => unreachable!(),
            }
        })
    }

    /// A subroutine's resolved return type, bound against its own scope.
    pub fn subroutine_return_type(&mut self, subroutine: SymbolId) -> SymbolId {
        let probe = match &mut self.symbols[subroutine].kind {
            SymbolKind::Subroutine(data) => data.return_ty.probe(),
            _ => panic!("symbol is not a subroutine"),
        };
        match probe {
            LazyProbe::Done(ty) => ty,
            LazyProbe::Cycle => {
                let location = self.symbols[subroutine].location;
                self.report(DiagCode::CyclicDependency, location);
                let error = self.builtins.error_type;
                self.finish_subroutine_type(subroutine, error);
                error
            }
            LazyProbe::Evaluate(type_syntax) => {
                let ty = self.bind_type(subroutine, type_syntax);
                self.finish_subroutine_type(subroutine, ty);
                ty
            }
        }
    }

    fn finish_subroutine_type(&mut self, subroutine: SymbolId, ty: SymbolId) {
        match &mut self.symbols[subroutine].kind {
            SymbolKind::Subroutine(data) => data.return_ty.finish(ty),
            _ => unreachable!(),
        }
    }

    fn finish_type_probe(
        &mut self,
        symbol: SymbolId,
        probe: LazyProbe<SymbolId, DataTypeId>,
        finish: fn(&mut Self, SymbolId, SymbolId),
    ) -> SymbolId {
        match probe {
            LazyProbe::Done(ty) => ty,
            LazyProbe::Cycle => {
                let location = self.symbols[symbol].location;
                self.report(DiagCode::CyclicDependency, location);
                let error = self.builtins.error_type;
                finish(self, symbol, error);
                error
            }
            LazyProbe::Evaluate(type_syntax) => {
                let scope = self.parent(symbol);
                let ty = self.bind_type(scope, type_syntax);
                finish(self, symbol, ty);
                ty
            }
        }
    }

    /// A variable's bound initializer, if it has one.
    pub fn variable_initializer(&mut self, variable: SymbolId) -> Option<BoundExprId> {
        let probe = match &mut self.symbols[variable].kind {
            SymbolKind::Variable(data) => data.initializer.as_mut()?.probe(),
            _ => panic!("symbol is not a variable"),
        };
        let bound = match probe {
            LazyProbe::Done(bound) => bound,
            LazyProbe::Cycle => {
                let location = self.symbols[variable].location;
                self.report(DiagCode::CyclicDependency, location);
                self.bad_expr
            }
            LazyProbe::Evaluate(expr) => {
                let scope = self.parent(variable);
                self.bind_expression(scope, expr)
            }
        };
        if let SymbolKind::Variable(data) = &mut self.symbols[variable].kind {
            if let Some(cell) = data.initializer.as_mut() {
                cell.finish(bound);
            }
        }
        Some(bound)
    }

    /// A subroutine's bound body statement list.
    pub fn subroutine_body(&mut self, subroutine: SymbolId) -> StatementId {
        let probe = match &mut self.symbols[subroutine].kind {
            SymbolKind::Subroutine(data) => data.body.probe(),
            _ => panic!("symbol is not a subroutine"),
        };
        let bound = match probe {
            LazyProbe::Done(bound) => bound,
            LazyProbe::Cycle => {
                let location = self.symbols[subroutine].location;
                self.report(DiagCode::CyclicDependency, location);
                self.bad_stmt
            }
            LazyProbe::Evaluate(stmts) => self.bind_statement_list(subroutine, &stmts),
        };
        if let SymbolKind::Subroutine(data) = &mut self.symbols[subroutine].kind {
            data.body.finish(bound);
        }
        bound
    }

    /// A procedural block's bound body.
    pub fn procedural_block_body(&mut self, block: SymbolId) -> StatementId {
        let probe = match &mut self.symbols[block].kind {
            SymbolKind::ProceduralBlock(data) => data.body.probe(),
            _ => panic!("symbol is not a procedural block"),
        };
        let bound = match probe {
            LazyProbe::Done(bound) => bound,
            LazyProbe::Cycle => {
                let location = self.symbols[block].location;
                self.report(DiagCode::CyclicDependency, location);
                self.bad_stmt
            }
            LazyProbe::Evaluate(stmt) => self.bind_statement(block, stmt),
        };
        if let SymbolKind::ProceduralBlock(data) = &mut self.symbols[block].kind {
            data.body.finish(bound);
        }
        bound
    }

    /// A sequential block's bound body.
    pub fn sequential_block_body(&mut self, block: SymbolId) -> StatementId {
        let probe = match &mut self.symbols[block].kind {
            SymbolKind::SequentialBlock(data) => data.body.probe(),
            _ => panic!("symbol is not a sequential block"),
        };
        let bound = match probe {
            LazyProbe::Done(bound) => bound,
            LazyProbe::Cycle => {
                let location = self.symbols[block].location;
                self.report(DiagCode::CyclicDependency, location);
                self.bad_stmt
            }
            LazyProbe::Evaluate(stmt) => self.bind_statement(block, stmt),
        };
        if let SymbolKind::SequentialBlock(data) = &mut self.symbols[block].kind {
            data.body.finish(bound);
        }
        bound
    }
}
