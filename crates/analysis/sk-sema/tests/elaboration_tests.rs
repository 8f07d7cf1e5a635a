//! End-to-end elaboration tests: definitions, instances, and parameters

mod common;

use common::*;
use sk_const_eval::ConstValue;
use sk_diag::DiagCode;
use sk_sema::{LookupKind, SymbolTag};
use sk_syntax::{
    BinaryOp, DeclaratorSyntax, HierarchicalInstanceSyntax, HierarchyInstantiationSyntax,
    ItemSyntax, ParameterDeclSyntax, ParameterKeyword, SyntaxTree, TypeKeyword,
};

#[test]
fn default_parameter_value() {
    // module m #(parameter int P = 3); endmodule
    // module top; m u(); endmodule
    let mut tree = SyntaxTree::new();
    let p = int_param(&mut tree, "P", 10, Some(3));
    let m = module_decl(&mut tree, "m", 0, vec![p], vec![]);
    let inst = instantiation(&mut tree, "m", "u", 40, vec![]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let u = member_named(&mut compilation, top_instance, "u");
    assert_eq!(compilation.tag(u), SymbolTag::ModuleInstance);

    let p = member_named(&mut compilation, u, "P");
    assert_eq!(compilation.tag(p), SymbolTag::Parameter);
    assert_eq!(compilation.parameter_value(p), ConstValue::Int(3));

    let ty = compilation.parameter_type(p);
    let data = compilation.integral_data(ty);
    assert_eq!(data.width, 32);
    assert!(data.signed);

    assert!(compilation.diagnostics().is_empty(), "clean elaboration");
}

#[test]
fn parameter_override() {
    // m #(.P(7)) u();
    let mut tree = SyntaxTree::new();
    let p = int_param(&mut tree, "P", 10, Some(3));
    let m = module_decl(&mut tree, "m", 0, vec![p], vec![]);
    let seven = tree.int_literal(7, loc(45));
    let inst = instantiation(&mut tree, "m", "u", 40, vec![(Some("P"), seven)]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let u = member_named(&mut compilation, top_instance, "u");
    let p = member_named(&mut compilation, u, "P");

    assert_eq!(compilation.parameter_value(p), ConstValue::Int(7));
    assert_eq!(
        compilation.diagnostics().count_of(DiagCode::MissingRequiredParameter),
        0
    );
}

#[test]
fn ordered_parameter_assignment() {
    // m #(7) u();
    let mut tree = SyntaxTree::new();
    let p = int_param(&mut tree, "P", 10, Some(3));
    let m = module_decl(&mut tree, "m", 0, vec![p], vec![]);
    let seven = tree.int_literal(7, loc(45));
    let inst = instantiation(&mut tree, "m", "u", 40, vec![(None, seven)]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let u = member_named(&mut compilation, top_instance, "u");
    let p = member_named(&mut compilation, u, "P");
    assert_eq!(compilation.parameter_value(p), ConstValue::Int(7));
}

#[test]
fn parameter_referencing_overridden_parameter() {
    // module m #(parameter int P = 3, parameter int Q = P + 1);
    // m #(.P(7)) u();  => Q = 8
    let mut tree = SyntaxTree::new();
    let p = int_param(&mut tree, "P", 10, Some(3));
    let p_ref = tree.ident("P", loc(25));
    let one = tree.int_literal(1, loc(27));
    let q_default = tree.binary(BinaryOp::Add, p_ref, one, loc(26));
    let int_ty = tree.keyword_type(TypeKeyword::Int, loc(20));
    let q = param_decl(
        &mut tree,
        Some(ParameterKeyword::Parameter),
        int_ty,
        "Q",
        20,
        Some(q_default),
    );
    let m = module_decl(&mut tree, "m", 0, vec![p, q], vec![]);
    let seven = tree.int_literal(7, loc(45));
    let inst = instantiation(&mut tree, "m", "u", 40, vec![(Some("P"), seven)]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let u = member_named(&mut compilation, top_instance, "u");
    let q = member_named(&mut compilation, u, "Q");
    assert_eq!(
        compilation.parameter_value(q),
        ConstValue::Int(8),
        "body references must see the overridden value"
    );

    let p = member_named(&mut compilation, u, "P");
    assert!(compilation.parameter_has_default(p));
    assert_eq!(
        compilation.parameter_default_value(p),
        Some(ConstValue::Int(3)),
        "the default is reachable independently of the override"
    );
}

#[test]
fn missing_required_parameter_reported_once() {
    // module m #(parameter int P); m u();
    let mut tree = SyntaxTree::new();
    let p = int_param(&mut tree, "P", 10, None);
    let m = module_decl(&mut tree, "m", 0, vec![p], vec![]);
    let inst = instantiation(&mut tree, "m", "u", 40, vec![]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let u = member_named(&mut compilation, top_instance, "u");
    let p = member_named(&mut compilation, u, "P");

    assert_eq!(compilation.parameter_value(p), ConstValue::Bad);
    // Repeated queries do not re-report.
    assert_eq!(compilation.parameter_value(p), ConstValue::Bad);
    assert_eq!(
        compilation.diagnostics().count_of(DiagCode::MissingRequiredParameter),
        1
    );
}

#[test]
fn local_parameter_cannot_be_overridden() {
    // module m #(localparam int L = 1); m #(.L(5)) u();
    let mut tree = SyntaxTree::new();
    let int_ty = tree.keyword_type(TypeKeyword::Int, loc(10));
    let one = tree.int_literal(1, loc(14));
    let l = param_decl(
        &mut tree,
        Some(ParameterKeyword::LocalParam),
        int_ty,
        "L",
        10,
        Some(one),
    );
    let m = module_decl(&mut tree, "m", 0, vec![l], vec![]);
    let five = tree.int_literal(5, loc(45));
    let inst = instantiation(&mut tree, "m", "u", 40, vec![(Some("L"), five)]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let u = member_named(&mut compilation, top_instance, "u");
    let l = member_named(&mut compilation, u, "L");

    assert_eq!(compilation.parameter_value(l), ConstValue::Int(1));
    assert!(compilation.parameter_data(l).is_local);
    assert_eq!(
        compilation.diagnostics().count_of(DiagCode::ParamOverrideOfLocal),
        1
    );
}

#[test]
fn last_local_propagates_through_port_list() {
    // #(parameter int A = 1, localparam int B = 2, int C = 3)
    // C has no keyword and inherits localparam from B.
    let mut tree = SyntaxTree::new();
    let a = int_param(&mut tree, "A", 10, Some(1));
    let int_ty = tree.keyword_type(TypeKeyword::Int, loc(20));
    let two = tree.int_literal(2, loc(24));
    let b = param_decl(
        &mut tree,
        Some(ParameterKeyword::LocalParam),
        int_ty,
        "B",
        20,
        Some(two),
    );
    let int_ty2 = tree.keyword_type(TypeKeyword::Int, loc(30));
    let three = tree.int_literal(3, loc(34));
    let c = param_decl(&mut tree, None, int_ty2, "C", 30, Some(three));
    let m = module_decl(&mut tree, "m", 0, vec![a, b, c], vec![]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let name = compilation.intern("m");
    let root = compilation.root();
    let definition = compilation
        .lookup(root, name, loc(0), LookupKind::Definition)
        .expect("definition");
    let infos = compilation.definition_parameters(definition);

    let flags: Vec<(String, bool, bool)> = infos
        .iter()
        .map(|info| {
            (
                compilation.tree().interner.resolve(info.name),
                info.local,
                info.body_param,
            )
        })
        .collect();
    assert_eq!(
        flags,
        vec![
            ("A".to_string(), false, false),
            ("B".to_string(), true, false),
            ("C".to_string(), true, false),
        ]
    );
}

#[test]
fn duplicate_parameter_names_diagnosed_once() {
    let mut tree = SyntaxTree::new();
    let int_ty = tree.keyword_type(TypeKeyword::Int, loc(10));
    let one = tree.int_literal(1, loc(12));
    let two = tree.int_literal(2, loc(22));
    let name = tree.intern("P");
    let decl = tree.add_item(ItemSyntax::Parameter(ParameterDeclSyntax {
        keyword: Some(ParameterKeyword::Parameter),
        ty: int_ty,
        declarators: vec![
            DeclaratorSyntax {
                name,
                location: loc(11),
                initializer: Some(one),
            },
            DeclaratorSyntax {
                name,
                location: loc(21),
                initializer: Some(two),
            },
        ],
        location: loc(10),
    }));
    let m = module_decl(&mut tree, "m", 0, vec![decl], vec![]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let name = compilation.intern("m");
    let root = compilation.root();
    let definition = compilation
        .lookup(root, name, loc(0), LookupKind::Definition)
        .expect("definition");
    let infos = compilation.definition_parameters(definition);
    assert_eq!(infos.len(), 1, "the duplicate declarator is dropped");
    // The cache means a second query must not re-report.
    let _ = compilation.definition_parameters(definition);
    assert_eq!(
        compilation.diagnostics().count_of(DiagCode::DuplicateDefinition),
        1
    );
}

#[test]
fn array_instantiation_produces_one_symbol_per_element() {
    // m u[3]();
    let mut tree = SyntaxTree::new();
    let m = module_decl(&mut tree, "m", 0, vec![], vec![]);
    let module = tree.intern("m");
    let instance = tree.intern("u");
    let size = tree.int_literal(3, loc(44));
    let inst = tree.add_item(ItemSyntax::Instantiation(HierarchyInstantiationSyntax {
        module,
        location: loc(40),
        param_assignments: vec![],
        instances: vec![HierarchicalInstanceSyntax {
            name: instance,
            location: loc(42),
            array_size: Some(size),
        }],
    }));
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![m, top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    let names: Vec<String> = compilation
        .members(top_instance)
        .to_vec()
        .into_iter()
        .map(|member| compilation.name_text(member))
        .collect();
    assert_eq!(names, vec!["u[0]", "u[1]", "u[2]"]);
}

#[test]
fn unknown_module_instantiation_is_diagnosed() {
    let mut tree = SyntaxTree::new();
    let inst = instantiation(&mut tree, "nope", "u", 40, vec![]);
    let top = module_decl(&mut tree, "top", 30, vec![], vec![inst]);
    unit(&mut tree, vec![top]);

    let mut compilation = compile(tree);
    let top_instance = instantiate_top(&mut compilation, "top");
    assert!(compilation.members(top_instance).is_empty());
    assert_eq!(
        compilation.diagnostics().count_of(DiagCode::UndeclaredIdentifier),
        1
    );
}

#[test]
fn ancestor_search_walks_to_the_root() {
    let mut tree = SyntaxTree::new();
    let p = int_param(&mut tree, "P", 10, Some(3));
    let m = module_decl(&mut tree, "m", 0, vec![p], vec![]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let p = member_named(&mut compilation, instance, "P");

    assert_eq!(
        compilation.find_ancestor(p, SymbolTag::ModuleInstance),
        Some(instance)
    );
    assert_eq!(
        compilation.find_ancestor(p, SymbolTag::Root),
        Some(compilation.root())
    );
    assert_eq!(compilation.find_ancestor(p, SymbolTag::Package), None);
    // Self counts as an ancestor of its own kind.
    assert_eq!(
        compilation.find_ancestor(p, SymbolTag::Parameter),
        Some(p)
    );
    let root = compilation.root();
    assert_eq!(compilation.parent(root), root, "the root is its own parent");
}
