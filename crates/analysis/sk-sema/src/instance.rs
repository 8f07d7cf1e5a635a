//! Instance elaboration
//!
//! Instantiating a definition produces a new scope whose members are the
//! definition's body with parameters rebound: each declared parameter
//! becomes a fresh parameter symbol whose type and value evaluate against
//! the instance scope, seeded from the instantiation's assignment map.
//! References to parameters inside the body therefore see the overridden
//! values.

use crate::compilation::Compilation;
use crate::lazy::{Lazy, LazyProbe};
use crate::lookup::LookupKind;
use crate::scope::MemberBuilder;
use crate::symbol::{InstanceData, ParameterData, ScopeMembers, SymbolId, SymbolKind, SymbolTag};
use rustc_hash::FxHashMap;
use sk_const_eval::ConstValue;
use sk_diag::DiagCode;
use sk_intern::Name;
use sk_syntax::{ExprId, HierarchyInstantiationSyntax, ItemSyntax};

impl Compilation {
    /// Create the instance symbols for one hierarchy instantiation. Each
    /// entry in the comma list yields one instance; an entry with an array
    /// dimension yields one instance per element, named `name[i]`.
    pub(crate) fn instances_from_syntax(
        &mut self,
        builder: &mut MemberBuilder,
        parent: SymbolId,
        syntax: &HierarchyInstantiationSyntax,
    ) {
        let Some(definition) =
            self.lookup(parent, syntax.module, syntax.location, LookupKind::Definition)
        else {
            let detail = self.tree.interner.resolve(syntax.module);
            self.report_with(DiagCode::UndeclaredIdentifier, syntax.location, detail);
            return;
        };

        let assignments = self.build_assignment_map(definition, syntax);

        for entry in &syntax.instances {
            if let Some(size_expr) = entry.array_size {
                let size = self.evaluate_constant(parent, size_expr);
                let Some(count) = size.as_int() else {
                    if !size.is_bad() {
                        let location = self.tree.expr(size_expr).location();
                        self.report(DiagCode::NotConstant, location);
                    }
                    continue;
                };
                let base = self.tree.interner.resolve(entry.name);
                for index in 0..count.max(0) {
                    let name = self.intern(&format!("{base}[{index}]"));
                    let instance = self.make_instance(
                        definition,
                        name,
                        entry.location,
                        parent,
                        assignments.clone(),
                    );
                    self.builder_add_symbol(builder, instance);
                }
            } else {
                let instance = self.make_instance(
                    definition,
                    entry.name,
                    entry.location,
                    parent,
                    assignments.clone(),
                );
                self.builder_add_symbol(builder, instance);
            }
        }
    }

    fn make_instance(
        &mut self,
        definition: SymbolId,
        name: Name,
        location: sk_span::SourceLocation,
        parent: SymbolId,
        assignments: FxHashMap<Name, ExprId>,
    ) -> SymbolId {
        let data = InstanceData {
            members: ScopeMembers::default(),
            definition,
            assignments,
        };
        let kind = match self.tag(definition) {
            SymbolTag::Interface => SymbolKind::InterfaceInstance(data),
            _ => SymbolKind::ModuleInstance(data),
        };
        self.alloc_symbol(name, location, parent, kind)
    }

    /// Build the parameter-name to expression map for an instantiation.
    /// Ordered assignments fill the overridable port parameters in order;
    /// named assignments match by name. Assigning a local parameter or a
    /// name the definition does not declare is diagnosed here.
    fn build_assignment_map(
        &mut self,
        definition: SymbolId,
        syntax: &HierarchyInstantiationSyntax,
    ) -> FxHashMap<Name, ExprId> {
        let infos = self.definition_parameters(definition);
        let mut map = FxHashMap::default();
        let mut ordered_index = 0usize;

        for assignment in &syntax.param_assignments {
            match assignment.name {
                Some(name) => match infos.iter().find(|info| info.name == name) {
                    Some(info) if info.local => {
                        let detail = self.tree.interner.resolve(name);
                        self.report_with(
                            DiagCode::ParamOverrideOfLocal,
                            assignment.location,
                            detail,
                        );
                    }
                    Some(_) => {
                        map.insert(name, assignment.value);
                    }
                    None => {
                        let detail = self.tree.interner.resolve(name);
                        self.report_with(
                            DiagCode::UndeclaredIdentifier,
                            assignment.location,
                            detail,
                        );
                    }
                },
                None => {
                    while ordered_index < infos.len()
                        && (infos[ordered_index].local || infos[ordered_index].body_param)
                    {
                        ordered_index += 1;
                    }
                    if ordered_index < infos.len() {
                        map.insert(infos[ordered_index].name, assignment.value);
                        ordered_index += 1;
                    } else {
                        self.report_with(
                            DiagCode::UndeclaredIdentifier,
                            assignment.location,
                            "too many ordered parameter assignments".to_string(),
                        );
                    }
                }
            }
        }
        map
    }

    /// Fill an instance scope: rebound parameters first, then the rest of
    /// the definition's body.
    pub(crate) fn instance_fill(&mut self, scope: SymbolId, builder: &mut MemberBuilder) {
        let definition = self.instance_data(scope).definition;
        let assignments = self.instance_data(scope).assignments.clone();
        let infos = self.definition_parameters(definition);

        for info in &infos {
            // Locals are never assignable; the assignment map was already
            // vetted when it was built.
            let assigned = if info.local {
                None
            } else {
                assignments.get(&info.name).copied()
            };
            let value_source = assigned.or(info.initializer);
            if value_source.is_none() && !info.local {
                let detail = self.tree.interner.resolve(info.name);
                self.report_with(DiagCode::MissingRequiredParameter, info.location, detail);
            }

            let value = match value_source {
                Some(expr) => Lazy::from_syntax(expr),
                None => Lazy::resolved(ConstValue::Bad),
            };
            let param = self.alloc_symbol(
                info.name,
                info.location,
                scope,
                SymbolKind::Parameter(ParameterData {
                    ty: Lazy::from_syntax(info.ty),
                    value,
                    default: info.initializer.map(Lazy::from_syntax),
                    is_local: info.local,
                    is_port: !info.body_param,
                    eval_scope: scope,
                }),
            );
            self.builder_add_symbol(builder, param);
        }

        // Clone the rest of the body into this scope. Parameter items were
        // consumed by the rebinding above.
        let syntax = self.definition_data(definition).syntax;
        let decl = match self.tree.item(syntax) {
            ItemSyntax::Module(decl) => decl.clone(),
            _ => panic!("definition symbol does not reference a declaration"),
        };
        for item in decl.items {
            if matches!(self.tree.item(item), ItemSyntax::Parameter(_)) {
                continue;
            }
            self.builder_add_item(builder, scope, item);
        }
    }

    // ---- parameter accessors --------------------------------------------

    /// The parameter's value, evaluated on first access against the scope
    /// the parameter was elaborated into. A dependency cycle is diagnosed
    /// once and pins the value to the bad sentinel.
    pub fn parameter_value(&mut self, parameter: SymbolId) -> ConstValue {
        let probe = self.parameter_data_mut(parameter).value.probe();
        match probe {
            LazyProbe::Done(value) => value,
            LazyProbe::Cycle => {
                let location = self.symbols[parameter].location;
                self.report(DiagCode::CyclicDependency, location);
                self.parameter_data_mut(parameter)
                    .value
                    .finish(ConstValue::Bad);
                let ty = self.builtins.error_type;
                self.parameter_data_mut(parameter).ty.finish(ty);
                ConstValue::Bad
            }
            LazyProbe::Evaluate(expr) => {
                let scope = self.parameter_data(parameter).eval_scope;
                let bound = self.bind_expression(scope, expr);
                let raw = self.evaluate_bound(bound);
                let ty = self.parameter_type_for_value(parameter, &raw);
                let location = self.tree.expr(expr).location();
                let converted = self.convert_constant(raw, ty, location);
                self.parameter_data_mut(parameter)
                    .value
                    .finish(converted.clone());
                converted
            }
        }
    }

    /// The parameter's resolved type. An implicitly typed parameter takes
    /// the type of its value, so this may force value evaluation.
    pub fn parameter_type(&mut self, parameter: SymbolId) -> SymbolId {
        if let Some(&ty) = self.parameter_data(parameter).ty.peek() {
            return ty;
        }
        let value = self.parameter_value(parameter);
        if let Some(&ty) = self.parameter_data(parameter).ty.peek() {
            return ty;
        }
        let ty = self.type_of_value(&value);
        self.parameter_data_mut(parameter).ty.finish(ty);
        ty
    }

    /// Resolve the declared type while the value is in hand; used from
    /// value evaluation so implicit types can fall back to the value's own
    /// type.
    fn parameter_type_for_value(&mut self, parameter: SymbolId, value: &ConstValue) -> SymbolId {
        let probe = self.parameter_data_mut(parameter).ty.probe();
        match probe {
            LazyProbe::Done(ty) => ty,
            LazyProbe::Cycle => {
                let location = self.symbols[parameter].location;
                self.report(DiagCode::CyclicDependency, location);
                let ty = self.builtins.error_type;
                self.parameter_data_mut(parameter).ty.finish(ty);
                ty
            }
            LazyProbe::Evaluate(type_syntax) => {
                let scope = self.parameter_data(parameter).eval_scope;
                let ty = if matches!(
                    self.tree.data_type(type_syntax),
                    sk_syntax::DataTypeSyntax::Implicit { .. }
                ) {
                    self.type_of_value(value)
                } else {
                    self.bind_type(scope, type_syntax)
                };
                self.parameter_data_mut(parameter).ty.finish(ty);
                ty
            }
        }
    }

    /// Whether the parameter was declared with a default initializer.
    pub fn parameter_has_default(&self, parameter: SymbolId) -> bool {
        self.parameter_data(parameter).default.is_some()
    }

    /// The parameter's default value, independent of any override.
    pub fn parameter_default_value(&mut self, parameter: SymbolId) -> Option<ConstValue> {
        let probe = match &mut self.parameter_data_mut(parameter).default {
            Some(cell) => cell.probe(),
            None => return None,
        };
        let value = match probe {
            LazyProbe::Done(value) => value,
            LazyProbe::Cycle => {
                let location = self.symbols[parameter].location;
                self.report(DiagCode::CyclicDependency, location);
                ConstValue::Bad
            }
            LazyProbe::Evaluate(expr) => {
                let scope = self.parameter_data(parameter).eval_scope;
                let raw = self.evaluate_constant(scope, expr);
                // Convert through the declared type when it is explicit;
                // an implicit type adds nothing here.
                match self.parameter_data(parameter).ty.peek().copied() {
                    Some(ty) => {
                        let location = self.tree.expr(expr).location();
                        self.convert_constant(raw, ty, location)
                    }
                    None => raw,
                }
            }
        };
        if let Some(cell) = &mut self.parameter_data_mut(parameter).default {
            cell.finish(value.clone());
        }
        Some(value)
    }
}
