//! Generate construct elaboration
//!
//! If-generate evaluates its condition in the parent scope and installs one
//! generate block for the chosen branch. Loop-generate evaluates
//! init/condition/step as constants and materialises one generate block per
//! iteration, each carrying an implicit parameter with that iteration's
//! loop-index value.

use crate::compilation::Compilation;
use crate::scope::MemberBuilder;
use crate::symbol::{GenerateBlockData, ScopeMembers, SymbolId, SymbolKind};
use sk_const_eval::ConstValue;
use sk_diag::DiagCode;
use sk_intern::Name;
use sk_span::SourceLocation;
use sk_syntax::{BinaryOp, ExprId, ExprSyntax, ItemId, ItemSyntax, UnaryOp};

impl Compilation {
    pub(crate) fn if_generate_fill(&mut self, scope: SymbolId, builder: &mut MemberBuilder) {
        let syntax = match &self.symbols[scope].kind {
            SymbolKind::IfGenerate(data) => data.syntax,
            _ => unreachable!(),
        };
        let decl = match self.tree.item(syntax) {
            ItemSyntax::IfGenerate(decl) => decl.clone(),
            _ => panic!("if-generate symbol does not reference if-generate syntax"),
        };

        let parent = self.parent(scope);
        let condition = self.evaluate_constant(parent, decl.condition);
        let Some(truthy) = condition.truthy() else {
            // Bad conditions were already diagnosed during evaluation.
            if !condition.is_bad() {
                let location = self.tree.expr(decl.condition).location();
                self.report(DiagCode::TypeMismatch, location);
            }
            return;
        };

        let chosen = if truthy {
            Some(decl.then_body)
        } else {
            decl.else_body
        };
        if let Some(body) = chosen {
            let block = self.make_generate_block(scope, body, None, None);
            self.builder_add_symbol(builder, block);
        }
    }

    pub(crate) fn loop_generate_fill(&mut self, scope: SymbolId, builder: &mut MemberBuilder) {
        let syntax = match &self.symbols[scope].kind {
            SymbolKind::LoopGenerate(data) => data.syntax,
            _ => unreachable!(),
        };
        let decl = match self.tree.item(syntax) {
            ItemSyntax::LoopGenerate(decl) => decl.clone(),
            _ => panic!("loop-generate symbol does not reference loop-generate syntax"),
        };

        // A condition that never mentions the iteration variable can never
        // change between iterations.
        if !self.tree.expr_mentions(decl.condition, decl.genvar) {
            self.report(DiagCode::GenerateLoopNonTerminating, decl.location);
            return;
        }

        let parent = self.parent(scope);
        let init = self.evaluate_constant(parent, decl.init);
        let Some(mut value) = init.as_int() else {
            if !init.is_bad() {
                let location = self.tree.expr(decl.init).location();
                self.report(DiagCode::NotConstant, location);
            }
            return;
        };

        let label = self.block_label(decl.body);
        let mut iterations = 0u32;
        loop {
            let condition =
                self.evaluate_constant_with(parent, decl.condition, Some((decl.genvar, value)));
            match condition.truthy() {
                Some(true) => {}
                _ => break,
            }
            if iterations >= self.options.max_generate_iterations {
                self.report(DiagCode::GenerateLoopTooManyIterations, decl.location);
                break;
            }
            iterations += 1;

            let name = match label {
                Some(label) => {
                    let base = self.tree.interner.resolve(label);
                    Some(self.intern(&format!("{base}[{value}]")))
                }
                None => None,
            };
            let block = self.make_generate_block(scope, decl.body, None, name);

            // The implicit parameter carries this iteration's index value.
            let int_ty = self.builtins.int;
            let implicit = self.add_parameter(
                decl.genvar,
                decl.location,
                block,
                int_ty,
                ConstValue::Int(value),
            );
            match &mut self.symbols[block].kind {
                SymbolKind::GenerateBlock(data) => data.implicit_param = Some(implicit),
                _ => unreachable!(),
            }
            self.builder_add_symbol(builder, block);

            let Some(next) = self.step_value(parent, &decl, value) else {
                break;
            };
            value = next;
        }
    }

    /// Apply the loop's step to the current iteration value. The genvar
    /// iteration forms are interpreted directly; anything else evaluates as
    /// a constant with the genvar bound.
    fn step_value(
        &mut self,
        parent: SymbolId,
        decl: &sk_syntax::LoopGenerateSyntax,
        value: i64,
    ) -> Option<i64> {
        match self.tree.expr(decl.step).clone() {
            ExprSyntax::Unary {
                op: UnaryOp::PreIncrement | UnaryOp::PostIncrement,
                operand,
                ..
            } if self.is_genvar_ref(operand, decl.genvar) => value.checked_add(1),
            ExprSyntax::Unary {
                op: UnaryOp::PreDecrement | UnaryOp::PostDecrement,
                operand,
                ..
            } if self.is_genvar_ref(operand, decl.genvar) => value.checked_sub(1),
            ExprSyntax::Binary {
                op: BinaryOp::Assign,
                lhs,
                rhs,
                ..
            } if self.is_genvar_ref(lhs, decl.genvar) => self
                .evaluate_constant_with(parent, rhs, Some((decl.genvar, value)))
                .as_int(),
            _ => self
                .evaluate_constant_with(parent, decl.step, Some((decl.genvar, value)))
                .as_int(),
        }
    }

    fn is_genvar_ref(&self, expr: ExprId, genvar: Name) -> bool {
        matches!(self.tree.expr(expr), ExprSyntax::Identifier { name, .. } if *name == genvar)
    }

    pub(crate) fn generate_block_fill(&mut self, scope: SymbolId, builder: &mut MemberBuilder) {
        let (body, implicit) = match &self.symbols[scope].kind {
            SymbolKind::GenerateBlock(data) => (data.body, data.implicit_param),
            _ => unreachable!(),
        };

        if let Some(param) = implicit {
            self.builder_add_symbol(builder, param);
        }

        match self.tree.item(body).clone() {
            ItemSyntax::GenerateBlock(block) => {
                for item in block.items {
                    self.builder_add_item(builder, scope, item);
                }
            }
            _ => self.builder_add_item(builder, scope, body),
        }
    }

    /// Create a generate block symbol around a body item. The name comes
    /// from the body's label unless the caller overrides it (loop blocks
    /// carry their iteration index in the name).
    fn make_generate_block(
        &mut self,
        parent: SymbolId,
        body: ItemId,
        implicit_param: Option<SymbolId>,
        name_override: Option<Name>,
    ) -> SymbolId {
        let (label, location) = match self.tree.item(body) {
            ItemSyntax::GenerateBlock(block) => (block.label, block.location),
            other => (None, self.item_location(other)),
        };
        let name = name_override
            .or(label)
            .unwrap_or_else(|| self.tree.interner.empty_name());
        self.alloc_symbol(
            name,
            location,
            parent,
            SymbolKind::GenerateBlock(GenerateBlockData {
                members: ScopeMembers::default(),
                body,
                implicit_param,
            }),
        )
    }

    fn block_label(&self, body: ItemId) -> Option<Name> {
        match self.tree.item(body) {
            ItemSyntax::GenerateBlock(block) => block.label,
            _ => None,
        }
    }

    fn item_location(&self, item: &ItemSyntax) -> SourceLocation {
        match item {
            ItemSyntax::Module(decl) => decl.location,
            ItemSyntax::Package(decl) => decl.location,
            ItemSyntax::Import(items) => items
                .first()
                .map_or(SourceLocation::NONE, |import| import.location),
            ItemSyntax::Parameter(decl) => decl.location,
            ItemSyntax::Data(decl) => decl.location,
            ItemSyntax::Function(decl) => decl.location,
            ItemSyntax::Genvar { location, .. } => *location,
            ItemSyntax::Instantiation(decl) => decl.location,
            ItemSyntax::IfGenerate(decl) => decl.location,
            ItemSyntax::LoopGenerate(decl) => decl.location,
            ItemSyntax::GenerateBlock(decl) => decl.location,
            ItemSyntax::ProceduralBlock(decl) => decl.location,
            ItemSyntax::Typedef(decl) => decl.location,
        }
    }
}
