#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::test_helpers::{function_with, id_name, resolver, session, stmts, symbol_of};
use cxx_ir::{AstBuilder, BinaryOp, BuiltinType, ClassKey, DeclId, DeclKind, DeclSpecifiers, Initializer};
use pretty_assertions::assert_eq;

fn declarator(session: &AnalysisSession, unit: UnitId, decl: DeclId) -> NameRef {
    let name = session.unit(unit).arena().decl(decl).name;
    NameRef {
        unit,
        name: name.unwrap(),
    }
}

#[test]
fn enumerators_count_up_from_the_previous_value() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let five = b.int_lit(5);
    let color = b.enumeration("Color", false, vec![("Red", None), ("Green", Some(five)), ("Blue", None)]);
    let red = b.id("Red");
    let blue = b.id("Blue");
    let body = stmts(&mut b, &[red, blue]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("enum.cpp", vec![color, main]));

    let mut resolver = resolver(&session);
    let red = resolver.resolve_name(unit, id_name(&session, unit, red));
    let blue = resolver.resolve_name(unit, id_name(&session, unit, blue));
    assert_eq!(resolver.initial_value(&red), Some(Value::Int(0)));
    assert_eq!(resolver.initial_value(&blue), Some(Value::Int(6)));
}

#[test]
fn only_constant_variables_have_initial_values() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // constexpr int size = 2 * 3; int count = 1;
    let two = b.int_lit(2);
    let three = b.int_lit(3);
    let product = b.binary(BinaryOp::Mul, two, three);
    let int = b.int_ty();
    let size = b.var_init("size", int, product);
    b.set_specifiers(size, DeclSpecifiers::CONSTEXPR);
    let one = b.int_lit(1);
    let int = b.int_ty();
    let count = b.var_init("count", int, one);
    // const double ratio = size;
    let double = b.builtin(BuiltinType::Double);
    let ty = b.const_ty(double);
    let init = b.id("size");
    let ratio = b.var_init("ratio", ty, init);
    let unit = session.add_unit(b.finish("values.cpp", vec![size, count, ratio]));

    let mut resolver = resolver(&session);
    let value_of = |resolver: &mut Resolver<'_>, decl| {
        resolver.initial_value(&Binding::Declaration(symbol_of(&session, unit, decl)))
    };
    assert_eq!(value_of(&mut resolver, size), Some(Value::Int(6)));
    assert_eq!(value_of(&mut resolver, count), None);
    assert_eq!(value_of(&mut resolver, ratio), Some(Value::float(6.0)));
}

#[test]
fn variable_template_instances_use_their_pattern() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // template<class T> const T pi = T(3);
    let t = b.type_param("T");
    let three = b.int_lit(3);
    let ty = b.named_ty("T");
    let init = b.construct(ty, vec![three], false);
    let ty = b.named_ty("T");
    let ty = b.const_ty(ty);
    let primary_var = b.var_init("pi", ty, init);
    let primary = b.template(vec![t], primary_var);
    // template<> const float pi<float> = 4.5;
    let float = b.builtin(BuiltinType::Float);
    let name = b.template_id("pi", vec![cxx_ir::TemplateArg::Type(float)]);
    let value = b.float_lit(4.5);
    let float = b.builtin(BuiltinType::Float);
    let ty = b.const_ty(float);
    let spec_var = b.decl(
        Some(name),
        DeclKind::Variable {
            ty,
            init: Some(Initializer::Copy(value)),
        },
    );
    let spec = b.template(vec![], spec_var);

    let int = b.int_ty();
    let name = b.template_id("pi", vec![cxx_ir::TemplateArg::Type(int)]);
    let as_int = b.id_name(name);
    let float = b.builtin(BuiltinType::Float);
    let name = b.template_id("pi", vec![cxx_ir::TemplateArg::Type(float)]);
    let as_float = b.id_name(name);
    let body = stmts(&mut b, &[as_int, as_float]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("pi.cpp", vec![primary, spec, main]));

    let mut resolver = resolver(&session);
    let int_instance = resolver.resolve_name(unit, id_name(&session, unit, as_int));
    let float_instance = resolver.resolve_name(unit, id_name(&session, unit, as_float));
    assert_eq!(resolver.initial_value(&int_instance), Some(Value::Int(3)));
    assert_eq!(resolver.initial_value(&float_instance), Some(Value::float(4.5)));
    assert_eq!(
        session.instance(float_instance.as_instance().unwrap()).pattern,
        symbol_of(&session, unit, spec)
    );
    assert_eq!(resolver.type_of(unit, as_int), session.pool().const_of(Idx::INT));
}

#[test]
fn definitions_include_every_declarator() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let ret = b.void_ty();
    let declaration = b.func("work", ret, vec![], None);
    let body = b.block(vec![]);
    let ret = b.void_ty();
    let definition = b.func("work", ret, vec![], Some(body));
    let call = b.call_named("work", vec![]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("work.cpp", vec![declaration, definition, main]));

    let mut resolver = resolver(&session);
    let binding = resolver.resolve_name(unit, id_name(&session, unit, call));
    assert_eq!(binding, Binding::Declaration(symbol_of(&session, unit, definition)));
    assert_eq!(
        resolver.find_definitions(&binding),
        vec![
            declarator(&session, unit, declaration),
            declarator(&session, unit, definition)
        ]
    );
    assert_eq!(
        resolver.find_references(&binding).unwrap(),
        vec![NameRef {
            unit,
            name: id_name(&session, unit, call)
        }]
    );
}

#[test]
fn resolve_all_covers_every_node() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let x = b.var("x", int, None);
    let known = b.id("x");
    let unknown = b.id("y");
    let body = stmts(&mut b, &[known, unknown]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("all.cpp", vec![x, main]));

    let mut resolver = resolver(&session);
    let resolution = resolver.resolve_all(unit).unwrap();
    let arena_names = session.unit(unit).arena().name_count();
    assert_eq!(resolution.bindings.len(), arena_names);
    assert_eq!(
        resolution.types,
        vec![(known, Idx::INT), (unknown, Idx::problem(ProblemKind::UnresolvedName))]
    );
    let problems: Vec<(NameId, ProblemKind)> = resolution.problems().map(|(name, p)| (name, p.kind)).collect();
    assert_eq!(
        problems,
        vec![(id_name(&session, unit, unknown), ProblemKind::UnresolvedName)]
    );
}

#[test]
fn cancelled_requests_publish_nothing() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let t = b.type_param("T");
    let class = b.class("S", ClassKey::Struct, vec![], vec![]);
    let template = b.template(vec![t], class);
    let int = b.int_ty();
    let name = b.template_id("S", vec![cxx_ir::TemplateArg::Type(int)]);
    let ty = b.name_ty(name);
    let s = b.var("s", ty, None);
    let unit = session.add_unit(b.finish("cancel.cpp", vec![template, s]));

    let cancel = CancellationToken::new();
    let mut resolver = session.resolver(cancel.clone());
    cancel.cancel();
    assert_eq!(
        resolver.resolve_name(unit, name).problem_kind(),
        Some(ProblemKind::Cancelled)
    );
    assert_eq!(resolver.resolve_all(unit).unwrap_err().kind, ProblemKind::Cancelled);
    let template = Binding::Declaration(symbol_of(&session, unit, template));
    assert_eq!(
        resolver.find_references(&template).unwrap_err().kind,
        ProblemKind::Cancelled
    );
    assert_eq!(session.instance_count(), 0);

    // A fresh request is unaffected.
    let mut fresh = crate::test_helpers::resolver(&session);
    assert!(fresh.resolve_name(unit, name).as_instance().is_some());
}
