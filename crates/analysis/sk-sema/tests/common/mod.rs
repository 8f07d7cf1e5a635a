//! Shared fixtures for the elaboration tests
//!
//! Tests construct syntax trees programmatically, standing in for the
//! parser, then elaborate them through a fresh compilation.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use sk_sema::{Compilation, CompilationOptions, LookupKind, SymbolId};
use sk_span::{FileId, SourceLocation};
use sk_syntax::{
    CompilationUnitSyntax, DataTypeId, DeclaratorSyntax, DefinitionKind, ExprId,
    HierarchicalInstanceSyntax, HierarchyInstantiationSyntax, ItemId, ItemSyntax,
    ModuleDeclSyntax, PackageDeclSyntax, ParamAssignmentSyntax, ParameterDeclSyntax,
    ParameterKeyword, SyntaxTree, TypeKeyword,
};

pub fn loc(offset: u32) -> SourceLocation {
    SourceLocation::new(FileId(0), offset)
}

pub fn compile(tree: SyntaxTree) -> Compilation {
    Compilation::new(tree, CompilationOptions::default())
}

/// One parameter declaration with a single declarator.
pub fn param_decl(
    tree: &mut SyntaxTree,
    keyword: Option<ParameterKeyword>,
    ty: DataTypeId,
    name: &str,
    offset: u32,
    initializer: Option<ExprId>,
) -> ItemId {
    let name = tree.intern(name);
    tree.add_item(ItemSyntax::Parameter(ParameterDeclSyntax {
        keyword,
        ty,
        declarators: vec![DeclaratorSyntax {
            name,
            location: loc(offset),
            initializer,
        }],
        location: loc(offset),
    }))
}

/// `parameter int <name> = <default>` at the given offset.
pub fn int_param(
    tree: &mut SyntaxTree,
    name: &str,
    offset: u32,
    default: Option<i64>,
) -> ItemId {
    let ty = tree.keyword_type(TypeKeyword::Int, loc(offset));
    let initializer = default.map(|value| tree.int_literal(value, loc(offset + 4)));
    param_decl(
        tree,
        Some(ParameterKeyword::Parameter),
        ty,
        name,
        offset,
        initializer,
    )
}

pub fn module_decl(
    tree: &mut SyntaxTree,
    name: &str,
    offset: u32,
    param_ports: Vec<ItemId>,
    items: Vec<ItemId>,
) -> ItemId {
    let name = tree.intern(name);
    tree.add_item(ItemSyntax::Module(ModuleDeclSyntax {
        kind: DefinitionKind::Module,
        name,
        location: loc(offset),
        param_ports,
        items,
    }))
}

pub fn package_decl(tree: &mut SyntaxTree, name: &str, offset: u32, items: Vec<ItemId>) -> ItemId {
    let name = tree.intern(name);
    tree.add_item(ItemSyntax::Package(PackageDeclSyntax {
        name,
        location: loc(offset),
        items,
    }))
}

pub fn unit(tree: &mut SyntaxTree, items: Vec<ItemId>) {
    tree.add_unit(CompilationUnitSyntax { items });
}

/// An instantiation item `module #(assignments) name();`.
pub fn instantiation(
    tree: &mut SyntaxTree,
    module: &str,
    instance: &str,
    offset: u32,
    assignments: Vec<(Option<&str>, ExprId)>,
) -> ItemId {
    let module = tree.intern(module);
    let instance = tree.intern(instance);
    let param_assignments = assignments
        .into_iter()
        .map(|(name, value)| ParamAssignmentSyntax {
            name: name.map(|n| tree.intern(n)),
            value,
            location: loc(offset + 1),
        })
        .collect();
    tree.add_item(ItemSyntax::Instantiation(HierarchyInstantiationSyntax {
        module,
        location: loc(offset),
        param_assignments,
        instances: vec![HierarchicalInstanceSyntax {
            name: instance,
            location: loc(offset + 2),
            array_size: None,
        }],
    }))
}

/// Elaborate a named definition as a top-level instance. The instance lives
/// in a dynamic scope under the unit that declared the definition, so that
/// unit-level imports stay visible to the instance's members.
pub fn instantiate_top(compilation: &mut Compilation, module: &str) -> SymbolId {
    let name = compilation.intern(module);
    let root = compilation.root();
    let definition = compilation
        .lookup(root, name, SourceLocation::NONE, LookupKind::Definition)
        .unwrap_or_else(|| panic!("definition `{module}` not found"));
    let parent = compilation.parent(definition);
    let scratch = compilation.add_dynamic_scope(parent);
    let instance = compilation.add_instance(definition, scratch);
    compilation.dynamic_scope_add(scratch, instance);
    instance
}

/// The member with the given name, forcing elaboration of the scope.
pub fn member_named(compilation: &mut Compilation, scope: SymbolId, name: &str) -> SymbolId {
    let name = compilation.intern(name);
    let members: Vec<SymbolId> = compilation.members(scope).to_vec();
    members
        .into_iter()
        .find(|&member| compilation.name_of(member) == name)
        .unwrap_or_else(|| {
            panic!(
                "no member named `{}` in scope",
                compilation.tree().interner.resolve(name)
            )
        })
}

/// Names and tags of a scope's members, for multiset comparisons.
pub fn member_fingerprint(compilation: &mut Compilation, scope: SymbolId) -> Vec<(String, String)> {
    let members: Vec<SymbolId> = compilation.members(scope).to_vec();
    let mut fingerprint: Vec<_> = members
        .into_iter()
        .map(|member| {
            (
                compilation.name_text(member),
                format!("{:?}", compilation.tag(member)),
            )
        })
        .collect();
    fingerprint.sort();
    fingerprint
}
