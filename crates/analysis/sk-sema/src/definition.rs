//! Definitions and their declared parameters
//!
//! A definition symbol carries its raw declaration syntax; the parameter
//! info list is extracted once and cached. Within a parameter port list a
//! declaration without a keyword inherits the locality of the previous
//! declaration (the "last local" rule). Duplicate parameter names are
//! diagnosed once, against the first occurrence.

use crate::compilation::Compilation;
use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use sk_diag::DiagCode;
use sk_intern::Name;
use sk_span::SourceLocation;
use sk_syntax::{DataTypeId, ExprId, ItemSyntax, ParameterDeclSyntax, ParameterKeyword};

/// Info extracted from one parameter declarator of a definition
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: Name,
    pub location: SourceLocation,
    pub ty: DataTypeId,
    /// Default initializer, if the declarator has one
    pub initializer: Option<ExprId>,
    /// `localparam`, not overridable from the outside
    pub local: bool,
    /// Declared in the body rather than the parameter port list
    pub body_param: bool,
}

impl Compilation {
    /// The declared parameters of a definition, extracted on first use and
    /// cached on the definition symbol.
    pub fn definition_parameters(&mut self, definition: SymbolId) -> Vec<ParameterInfo> {
        if let Some(cached) = &self.definition_data(definition).params {
            return cached.clone();
        }

        let syntax = self.definition_data(definition).syntax;
        let decl = match self.tree.item(syntax) {
            ItemSyntax::Module(decl) => decl.clone(),
            _ => panic!("definition symbol does not reference a declaration"),
        };

        let mut infos = Vec::new();
        let mut seen: FxHashMap<Name, SourceLocation> = FxHashMap::default();

        let mut last_local = false;
        for item in &decl.param_ports {
            let ItemSyntax::Parameter(param) = self.tree.item(*item).clone() else {
                continue;
            };
            let local = match param.keyword {
                Some(ParameterKeyword::LocalParam) => true,
                Some(ParameterKeyword::Parameter) => false,
                None => last_local,
            };
            last_local = local;
            self.collect_param_decl(&param, local, false, &mut infos, &mut seen);
        }

        for item in &decl.items {
            let ItemSyntax::Parameter(param) = self.tree.item(*item).clone() else {
                continue;
            };
            let local = matches!(param.keyword, Some(ParameterKeyword::LocalParam));
            self.collect_param_decl(&param, local, true, &mut infos, &mut seen);
        }

        self.definition_data_mut(definition).params = Some(infos.clone());
        infos
    }

    fn collect_param_decl(
        &mut self,
        decl: &ParameterDeclSyntax,
        local: bool,
        body_param: bool,
        infos: &mut Vec<ParameterInfo>,
        seen: &mut FxHashMap<Name, SourceLocation>,
    ) {
        for declarator in &decl.declarators {
            if seen.contains_key(&declarator.name) {
                let detail = self.tree.interner.resolve(declarator.name);
                self.report_with(DiagCode::DuplicateDefinition, declarator.location, detail);
                continue;
            }
            seen.insert(declarator.name, declarator.location);
            infos.push(ParameterInfo {
                name: declarator.name,
                location: declarator.location,
                ty: decl.ty,
                initializer: declarator.initializer,
                local,
                body_param,
            });
        }
    }
}
