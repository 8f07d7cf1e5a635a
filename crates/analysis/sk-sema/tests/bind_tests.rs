//! Binding tests: types, variables, subroutines, and statement bodies

mod common;

use common::*;
use sk_const_eval::ConstValue;
use sk_diag::DiagCode;
use sk_sema::{LookupKind, Statement, SymbolTag};
use sk_syntax::{
    BinaryOp, DataDeclSyntax, DeclaratorSyntax, ForInitDecl, FormalArgSyntax,
    FormalArgumentDirection, FunctionDeclSyntax, ItemId, ItemSyntax, ProceduralBlockKind,
    ProceduralBlockSyntax, StatementSyntax, SyntaxTree, TypedefSyntax, TypeKeyword, UnaryOp,
    VariableLifetime,
};

fn int_var(tree: &mut SyntaxTree, name: &str, offset: u32, initializer: Option<i64>) -> ItemId {
    let ty = tree.keyword_type(TypeKeyword::Int, loc(offset));
    let name = tree.intern(name);
    let initializer = initializer.map(|value| tree.int_literal(value, loc(offset + 4)));
    tree.add_item(ItemSyntax::Data(DataDeclSyntax {
        ty,
        lifetime: VariableLifetime::Automatic,
        is_const: false,
        declarators: vec![DeclaratorSyntax {
            name,
            location: loc(offset + 1),
            initializer,
        }],
        location: loc(offset),
    }))
}

#[test]
fn variable_types_and_initializers_bind_lazily() {
    let mut tree = SyntaxTree::new();
    let v = int_var(&mut tree, "v", 10, Some(5));
    let m = module_decl(&mut tree, "m", 0, vec![], vec![v]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let v = member_named(&mut compilation, instance, "v");
    assert_eq!(compilation.tag(v), SymbolTag::Variable);

    let ty = compilation.variable_type(v);
    assert_eq!(ty, compilation.builtins().int);
    // Idempotent.
    assert_eq!(compilation.variable_type(v), ty);

    let initializer = compilation.variable_initializer(v).expect("initializer");
    assert_eq!(compilation.evaluate_bound(initializer), ConstValue::Int(5));
    assert_eq!(compilation.variable_initializer(v), Some(initializer));

    let data = compilation.variable_data(v);
    assert_eq!(data.lifetime, VariableLifetime::Automatic);
    assert!(!data.is_const);
}

#[test]
fn typedef_unwraps_to_the_canonical_type() {
    // typedef int word; module m; word w; endmodule
    let mut tree = SyntaxTree::new();
    let target = tree.keyword_type(TypeKeyword::Int, loc(6));
    let word = tree.intern("word");
    let typedef = tree.add_item(ItemSyntax::Typedef(TypedefSyntax {
        name: word,
        location: loc(5),
        target,
    }));
    let word_ty = tree.named_type("word", loc(30));
    let w = tree.intern("w");
    let var = tree.add_item(ItemSyntax::Data(DataDeclSyntax {
        ty: word_ty,
        lifetime: VariableLifetime::Automatic,
        is_const: false,
        declarators: vec![DeclaratorSyntax {
            name: w,
            location: loc(31),
            initializer: None,
        }],
        location: loc(30),
    }));
    let m = module_decl(&mut tree, "m", 20, vec![], vec![var]);
    unit(&mut tree, vec![typedef, m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let w = member_named(&mut compilation, instance, "w");
    let ty = compilation.variable_type(w);
    assert_eq!(
        ty,
        compilation.builtins().int,
        "the alias resolves to its canonical type"
    );
    assert!(compilation.diagnostics().is_empty());
}

#[test]
fn named_type_resolving_to_a_non_type_is_a_kind_mismatch() {
    // int x; module m; x w; endmodule -- `x` names a variable, not a type
    let mut tree = SyntaxTree::new();
    let x = int_var(&mut tree, "x", 5, None);
    let x_ty = tree.named_type("x", loc(30));
    let w = tree.intern("w");
    let var = tree.add_item(ItemSyntax::Data(DataDeclSyntax {
        ty: x_ty,
        lifetime: VariableLifetime::Automatic,
        is_const: false,
        declarators: vec![DeclaratorSyntax {
            name: w,
            location: loc(31),
            initializer: None,
        }],
        location: loc(30),
    }));
    let m = module_decl(&mut tree, "m", 20, vec![], vec![var]);
    unit(&mut tree, vec![x, m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let w = member_named(&mut compilation, instance, "w");
    let ty = compilation.variable_type(w);
    assert_eq!(ty, compilation.builtins().error_type);
    assert_eq!(compilation.diagnostics().count_of(DiagCode::KindMismatch), 1);
}

fn increment_function(tree: &mut SyntaxTree, offset: u32) -> ItemId {
    // function int f(input int x); return x + 1; endfunction
    let return_ty = tree.keyword_type(TypeKeyword::Int, loc(offset));
    let arg_ty = tree.keyword_type(TypeKeyword::Int, loc(offset + 2));
    let x = tree.intern("x");
    let x_ref = tree.ident("x", loc(offset + 10));
    let one = tree.int_literal(1, loc(offset + 12));
    let sum = tree.binary(BinaryOp::Add, x_ref, one, loc(offset + 11));
    let ret = tree.add_stmt(StatementSyntax::Return {
        expr: Some(sum),
        location: loc(offset + 9),
    });
    let f = tree.intern("f");
    tree.add_item(ItemSyntax::Function(FunctionDeclSyntax {
        name: f,
        location: loc(offset),
        is_task: false,
        lifetime: VariableLifetime::Automatic,
        return_ty,
        args: vec![FormalArgSyntax {
            name: x,
            location: loc(offset + 3),
            direction: FormalArgumentDirection::In,
            ty: arg_ty,
        }],
        body: vec![ret],
    }))
}

#[test]
fn subroutines_expose_arguments_return_type_and_body() {
    let mut tree = SyntaxTree::new();
    let f = increment_function(&mut tree, 10);
    let m = module_decl(&mut tree, "m", 0, vec![], vec![f]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let f = member_named(&mut compilation, instance, "f");
    assert_eq!(compilation.tag(f), SymbolTag::Subroutine);
    assert!(!compilation.subroutine_data(f).is_task);

    let args = compilation.members(f).to_vec();
    assert_eq!(args.len(), 1);
    let x = args[0];
    assert_eq!(compilation.tag(x), SymbolTag::FormalArgument);
    assert_eq!(compilation.formal_argument_type(x), compilation.builtins().int);

    assert_eq!(
        compilation.subroutine_return_type(f),
        compilation.builtins().int
    );

    let body = compilation.subroutine_body(f);
    match compilation.bound_stmt(body).clone() {
        Statement::List(stmts) => {
            assert_eq!(stmts.len(), 1);
            assert!(matches!(
                compilation.bound_stmt(stmts[0]),
                Statement::Return { expr: Some(_) }
            ));
        }
        other => panic!("expected a bound statement list, got {other:?}"),
    }
    // Idempotent.
    assert_eq!(compilation.subroutine_body(f), body);
    assert!(compilation.diagnostics().is_empty());
}

#[test]
fn callable_lookup_skips_non_callables() {
    // The module itself declares a variable `f`; its function `f` lives in
    // the enclosing package. A callable lookup must skip the variable and
    // find the subroutine in the parent scope.
    let mut tree = SyntaxTree::new();
    let f_fn = increment_function(&mut tree, 5);
    let pkg = package_decl(&mut tree, "p", 1, vec![f_fn]);
    let p_name = tree.intern("p");
    let import = tree.add_item(ItemSyntax::Import(vec![sk_syntax::ImportItemSyntax {
        package: p_name,
        item: None,
        location: loc(18),
    }]));
    let f_var = int_var(&mut tree, "f", 30, None);
    let m = module_decl(&mut tree, "m", 20, vec![], vec![f_var]);
    unit(&mut tree, vec![pkg]);
    unit(&mut tree, vec![import, m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let f_name = compilation.intern("f");

    let local = compilation
        .lookup(instance, f_name, loc(90), LookupKind::Local)
        .expect("local lookup sees the variable");
    assert_eq!(compilation.tag(local), SymbolTag::Variable);

    let callable = compilation
        .lookup(instance, f_name, loc(90), LookupKind::Callable)
        .expect("callable lookup skips the variable");
    assert_eq!(compilation.tag(callable), SymbolTag::Subroutine);
}

#[test]
fn procedural_block_bodies_bind_against_the_block() {
    // always begin ; end
    let mut tree = SyntaxTree::new();
    let inner = tree.add_stmt(StatementSyntax::Empty { location: loc(42) });
    let body = tree.add_stmt(StatementSyntax::Block {
        label: None,
        statements: vec![inner],
        location: loc(41),
    });
    let block = tree.add_item(ItemSyntax::ProceduralBlock(ProceduralBlockSyntax {
        kind: ProceduralBlockKind::Always,
        location: loc(40),
        body,
    }));
    let m = module_decl(&mut tree, "m", 0, vec![], vec![block]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let members = compilation.members(instance).to_vec();
    let block = members
        .into_iter()
        .find(|&sym| compilation.tag(sym) == SymbolTag::ProceduralBlock)
        .expect("procedural block symbol");

    let bound = compilation.procedural_block_body(block);
    assert!(matches!(compilation.bound_stmt(bound), Statement::List(_)));
    assert_eq!(compilation.procedural_block_body(block), bound);
}

#[test]
fn for_loop_declarations_get_an_implicit_block() {
    // function void g(); for (int i = 0; i < 3; i++) ; endfunction
    let mut tree = SyntaxTree::new();
    let void_ty = tree.keyword_type(TypeKeyword::Void, loc(10));
    let i_ty = tree.keyword_type(TypeKeyword::Int, loc(21));
    let i = tree.intern("i");
    let zero = tree.int_literal(0, loc(23));
    let i_cond = tree.ident("i", loc(24));
    let three = tree.int_literal(3, loc(26));
    let condition = tree.binary(BinaryOp::Lt, i_cond, three, loc(25));
    let i_step = tree.ident("i", loc(27));
    let step = tree.unary(UnaryOp::PostIncrement, i_step, loc(28));
    let body = tree.add_stmt(StatementSyntax::Empty { location: loc(29) });
    let for_loop = tree.add_stmt(StatementSyntax::ForLoop {
        init_decl: Some(ForInitDecl {
            ty: i_ty,
            name: i,
            location: loc(22),
            initializer: zero,
        }),
        init_exprs: vec![],
        condition: Some(condition),
        steps: vec![step],
        body,
        location: loc(20),
    });
    let g = tree.intern("g");
    let func = tree.add_item(ItemSyntax::Function(FunctionDeclSyntax {
        name: g,
        location: loc(10),
        is_task: false,
        lifetime: VariableLifetime::Automatic,
        return_ty: void_ty,
        args: vec![],
        body: vec![for_loop],
    }));
    let m = module_decl(&mut tree, "m", 0, vec![], vec![func]);
    unit(&mut tree, vec![m]);

    let mut compilation = compile(tree);
    let instance = instantiate_top(&mut compilation, "m");
    let g = member_named(&mut compilation, instance, "g");
    let body = compilation.subroutine_body(g);

    let Statement::List(stmts) = compilation.bound_stmt(body).clone() else {
        panic!("expected a list body");
    };
    let Statement::ForLoop {
        implicit_block: Some(block),
        condition: Some(_),
        ..
    } = compilation.bound_stmt(stmts[0]).clone()
    else {
        panic!("expected a for loop with an implicit block");
    };

    assert_eq!(compilation.tag(block), SymbolTag::SequentialBlock);
    let var = member_named(&mut compilation, block, "i");
    assert_eq!(compilation.tag(var), SymbolTag::Variable);
    assert_eq!(compilation.variable_type(var), compilation.builtins().int);
    // The block's lazily bound body is the loop itself.
    assert_eq!(compilation.sequential_block_body(block), stmts[0]);
    assert!(compilation.diagnostics().is_empty());
}

#[test]
fn constants_convert_through_declared_widths() {
    let mut tree = SyntaxTree::new();
    let wide = tree.int_literal(300, loc(50));
    let five = tree.int_literal(5, loc(60));
    unit(&mut tree, vec![]);

    let mut compilation = compile(tree);
    let root = compilation.root();
    let byte_ty = compilation.builtins().byte;
    let converted = compilation.evaluate_constant_and_convert(root, wide, byte_ty, loc(50));
    assert_eq!(converted, ConstValue::Int(44), "300 wraps into a signed byte");

    let string_ty = compilation.builtins().string;
    let bad = compilation.evaluate_constant_and_convert(root, five, string_ty, loc(60));
    assert_eq!(bad, ConstValue::Bad);
    assert_eq!(compilation.diagnostics().count_of(DiagCode::TypeMismatch), 1);
}

#[test]
fn lookup_expect_returns_established_symbols() {
    let mut tree = SyntaxTree::new();
    let k = int_param(&mut tree, "K", 5, Some(10));
    let pkg = package_decl(&mut tree, "p", 1, vec![k]);
    unit(&mut tree, vec![pkg]);

    let mut compilation = compile(tree);
    let p_name = compilation.intern("p");
    let package = compilation.lookup_package(p_name).expect("package");
    let k_name = compilation.intern("K");
    let k = compilation.lookup_expect(
        package,
        k_name,
        loc(50),
        LookupKind::Direct,
        SymbolTag::Parameter,
    );
    assert_eq!(compilation.parameter_value(k), ConstValue::Int(10));
}

#[test]
fn enum_values_evaluate_and_convert_through_their_base() {
    let mut tree = SyntaxTree::new();
    let green_ref = tree.ident("GREEN", loc(50));
    unit(&mut tree, vec![]);

    let mut compilation = compile(tree);
    let root = compilation.root();
    let scratch = compilation.add_dynamic_scope(root);

    let color = compilation.intern("color_t");
    let byte_ty = compilation.builtins().byte;
    let color_ty = compilation.add_enum_type(color, loc(5), scratch, byte_ty);
    let green = compilation.intern("GREEN");
    let green_sym =
        compilation.add_enum_value(green, loc(6), scratch, color_ty, ConstValue::Int(2));
    compilation.set_members(scratch, vec![color_ty, green_sym]);

    let value = compilation.evaluate_constant(scratch, green_ref);
    assert_eq!(value, ConstValue::Int(2));

    // Conversion to the enum type goes through its integral base.
    let converted = compilation.convert_constant(ConstValue::Int(300), color_ty, loc(60));
    assert_eq!(converted, ConstValue::Int(44));
    assert!(compilation.diagnostics().is_empty());
}

#[test]
fn undeclared_identifier_binds_to_the_bad_sentinel() {
    let mut tree = SyntaxTree::new();
    let nope = tree.ident("nope", loc(50));
    unit(&mut tree, vec![]);

    let mut compilation = compile(tree);
    let root = compilation.root();
    let value = compilation.evaluate_constant(root, nope);
    assert_eq!(value, ConstValue::Bad);
    assert_eq!(
        compilation.diagnostics().count_of(DiagCode::UndeclaredIdentifier),
        1
    );
}
