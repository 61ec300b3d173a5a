#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::test_helpers::{function_with, id_name, resolver, session, stmts, symbol_of};
use crate::NameRef;
use cxx_diagnostic::ProblemKind;
use cxx_ir::{AstBuilder, BuiltinType, ClassKey, DeclKind};
use pretty_assertions::assert_eq;

#[test]
fn block_locals_are_visible_after_their_declaration() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let global = b.var("x", int, None);

    let before = b.id("x");
    let before_stmt = b.expr_stmt(before);
    let double = b.builtin(BuiltinType::Double);
    let local = b.var("x", double, None);
    let local_stmt = b.decl_stmt(local);
    let after = b.id("x");
    let after_stmt = b.expr_stmt(after);
    let main = function_with(&mut b, "main", vec![before_stmt, local_stmt, after_stmt]);
    let unit = session.add_unit(b.finish("shadow.cpp", vec![global, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, before)),
        Binding::Declaration(symbol_of(&session, unit, global))
    );
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, after)),
        Binding::Declaration(symbol_of(&session, unit, local))
    );
    assert_eq!(resolver.type_of(unit, before), Idx::INT);
    assert_eq!(resolver.type_of(unit, after), Idx::DOUBLE);
}

#[test]
fn qualified_names_search_the_named_namespace() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let v = b.var("v", int, None);
    let ns = b.namespace("ns", vec![v]);
    let qualifier = b.name("ns");
    let name = b.qualified(qualifier, "v");
    let use_v = b.id_name(name);
    let other = b.name("ns");
    let missing_name = b.qualified(other, "w");
    let missing = b.id_name(missing_name);
    let body = stmts(&mut b, &[use_v, missing]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("ns.cpp", vec![ns, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, name),
        Binding::Declaration(symbol_of(&session, unit, v))
    );
    assert_eq!(
        resolver.resolve_name(unit, qualifier),
        Binding::Declaration(symbol_of(&session, unit, ns))
    );
    assert_eq!(
        resolver.resolve_name(unit, missing_name).problem_kind(),
        Some(ProblemKind::UnresolvedName)
    );
}

#[test]
fn members_are_found_in_base_classes() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let m = b.var("m", int, None);
    let base = b.class("B", ClassKey::Struct, vec![], vec![m]);
    let base_ty = b.named_ty("B");
    let derived = b.class("D", ClassKey::Struct, vec![base_ty], vec![]);
    let ty = b.named_ty("D");
    let d = b.var("d", ty, None);
    let object = b.id("d");
    let access = b.member(object, "m", false);
    let body = stmts(&mut b, &[access]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("bases.cpp", vec![base, derived, d, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, access)),
        Binding::Declaration(symbol_of(&session, unit, m))
    );
    assert_eq!(resolver.type_of(unit, access), Idx::INT);
}

#[test]
fn member_functions_see_class_members() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let use_m = b.id("m");
    let r = b.ret(Some(use_m));
    let body = b.block(vec![r]);
    let int = b.int_ty();
    let get = b.func("get", int, vec![], Some(body));
    let long = b.builtin(BuiltinType::Long);
    let m = b.var("m", long, None);
    let class = b.class("S", ClassKey::Struct, vec![], vec![get, m]);
    let unit = session.add_unit(b.finish("member.cpp", vec![class]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, use_m)),
        Binding::Declaration(symbol_of(&session, unit, m))
    );
    assert_eq!(resolver.type_of(unit, use_m), Idx::LONG);
}

#[test]
fn other_units_are_reached_through_the_index() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let shared = b.var("shared", int, None);
    let library = session.add_unit(b.finish("lib.cpp", vec![shared]));

    let mut b = AstBuilder::new(session.interner());
    let use_shared = b.id("shared");
    let body = stmts(&mut b, &[use_shared]);
    let main = function_with(&mut b, "main", body);
    let app = session.add_unit(b.finish("app.cpp", vec![main]));

    let mut resolver = resolver(&session);
    let shared_symbol = symbol_of(&session, library, shared);
    assert_eq!(
        resolver.resolve_name(app, id_name(&session, app, use_shared)),
        Binding::Declaration(shared_symbol)
    );
    assert_eq!(resolver.type_of(app, use_shared), Idx::INT);

    let references = resolver
        .find_references(&Binding::Declaration(shared_symbol))
        .unwrap();
    assert_eq!(
        references,
        vec![NameRef {
            unit: app,
            name: id_name(&session, app, use_shared),
        }]
    );
}

#[test]
fn unknown_names_are_problems() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let nowhere = b.id("nowhere");
    let body = stmts(&mut b, &[nowhere]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("missing.cpp", vec![main]));

    let mut resolver = resolver(&session);
    let binding = resolver.resolve_name(unit, id_name(&session, unit, nowhere));
    let problem = match binding {
        Binding::Problem(problem) => problem,
        other => panic!("expected a problem, got {other:?}"),
    };
    assert_eq!(problem.kind, ProblemKind::UnresolvedName);
    assert_eq!(problem.name, Some(session.interner().intern("nowhere")));
    assert_eq!(
        resolver.type_of(unit, nowhere).as_problem(),
        Some(ProblemKind::UnresolvedName)
    );
}

#[test]
fn using_directives_expose_namespace_members() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // namespace lib { int count; } using namespace lib;
    let int = b.int_ty();
    let count = b.var("count", int, None);
    let lib = b.namespace("lib", vec![count]);
    let directive = b.using_directive("lib");
    // void main() { level; using namespace lib; level; count; }
    let double = b.builtin(BuiltinType::Double);
    let level = b.var("level", double, None);
    let tools = b.namespace("tools", vec![level]);
    let before = b.id("level");
    let before_stmt = b.expr_stmt(before);
    let local = b.using_directive("tools");
    let local_stmt = b.decl_stmt(local);
    let after = b.id("level");
    let after_stmt = b.expr_stmt(after);
    let use_count = b.id("count");
    let count_stmt = b.expr_stmt(use_count);
    let main = function_with(&mut b, "main", vec![before_stmt, local_stmt, after_stmt, count_stmt]);
    let unit = session.add_unit(b.finish("directive.cpp", vec![lib, directive, tools, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, use_count)),
        Binding::Declaration(symbol_of(&session, unit, count))
    );
    assert_eq!(resolver.type_of(unit, use_count), Idx::INT);
    assert_eq!(
        resolver.type_of(unit, before).as_problem(),
        Some(ProblemKind::UnresolvedName)
    );
    assert_eq!(resolver.type_of(unit, after), Idx::DOUBLE);
    // The directive's own name refers to the namespace.
    let DeclKind::UsingDirective { namespace } = session.unit(unit).arena().decl(directive).kind else {
        panic!("not a using-directive");
    };
    assert_eq!(
        resolver.resolve_name(unit, namespace),
        Binding::Declaration(symbol_of(&session, unit, lib))
    );
}

#[test]
fn nominated_members_conflict_with_declared_ones() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // int x; namespace a { double x; } using namespace a;
    let int = b.int_ty();
    let global = b.var("x", int, None);
    let double = b.builtin(BuiltinType::Double);
    let inner = b.var("x", double, None);
    let a = b.namespace("a", vec![inner]);
    let directive = b.using_directive("a");
    let use_x = b.id("x");
    let body = stmts(&mut b, &[use_x]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("conflict.cpp", vec![global, a, directive, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.type_of(unit, use_x).as_problem(),
        Some(ProblemKind::Ambiguous)
    );
}

#[test]
fn cyclic_directives_terminate() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // namespace a { using namespace b; } namespace b { using namespace a; int y; }
    let to_b = b.using_directive("b");
    let a = b.namespace("a", vec![to_b]);
    let to_a = b.using_directive("a");
    let int = b.int_ty();
    let y = b.var("y", int, None);
    let ns_b = b.namespace("b", vec![to_a, y]);
    let qualifier = b.name("a");
    let found_name = b.qualified(qualifier, "y");
    let found = b.id_name(found_name);
    let qualifier = b.name("a");
    let missing_name = b.qualified(qualifier, "z");
    let missing = b.id_name(missing_name);
    let body = stmts(&mut b, &[found, missing]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("cycle.cpp", vec![a, ns_b, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, found_name),
        Binding::Declaration(symbol_of(&session, unit, y))
    );
    assert_eq!(
        resolver.resolve_name(unit, missing_name).problem_kind(),
        Some(ProblemKind::UnresolvedName)
    );
}

#[test]
fn using_declarations_bring_in_every_overload() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // namespace lib { void put(int); void put(double); } using lib::put;
    let ret = b.void_ty();
    let int = b.int_ty();
    let p = b.param(None, int);
    let put_int = b.func("put", ret, vec![p], None);
    let ret = b.void_ty();
    let double = b.builtin(BuiltinType::Double);
    let p = b.param(None, double);
    let put_double = b.func("put", ret, vec![p], None);
    let lib = b.namespace("lib", vec![put_int, put_double]);
    let qualifier = b.name("lib");
    let target = b.qualified(qualifier, "put");
    let using = b.using_decl(target);

    let half = b.float_lit(0.5);
    let call = b.call_named("put", vec![half]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("using.cpp", vec![lib, using, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, call), Idx::VOID);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, call)),
        Binding::Declaration(symbol_of(&session, unit, put_double))
    );
    let overloads = resolver.resolve_name(unit, target);
    assert!(matches!(overloads, Binding::OverloadSet(ref set) if set.len() == 2));
}

/// `namespace geo { struct Point {}; int area(Point); Point operator+(Point, Point); }`
fn geometry(b: &mut AstBuilder<'_>) -> (cxx_ir::DeclId, cxx_ir::DeclId) {
    let point = b.class("Point", ClassKey::Struct, vec![], vec![]);
    let int = b.int_ty();
    let ty = b.named_ty("Point");
    let p = b.param(None, ty);
    let area = b.func("area", int, vec![p], None);
    let ret = b.named_ty("Point");
    let lhs = b.named_ty("Point");
    let lhs = b.param(None, lhs);
    let rhs = b.named_ty("Point");
    let rhs = b.param(None, rhs);
    let plus = b.func("operator+", ret, vec![lhs, rhs], None);
    (b.namespace("geo", vec![point, area, plus]), area)
}

#[test]
fn unqualified_calls_search_associated_namespaces() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let (geo, area) = geometry(&mut b);
    // void main() { geo::Point p; area(p); p + p; }
    let qualifier = b.name("geo");
    let point = b.qualified(qualifier, "Point");
    let ty = b.name_ty(point);
    let p = b.var("p", ty, None);
    let p_stmt = b.decl_stmt(p);
    let use_p = b.id("p");
    let call = b.call_named("area", vec![use_p]);
    let call_stmt = b.expr_stmt(call);
    let left = b.id("p");
    let right = b.id("p");
    let sum = b.binary(cxx_ir::BinaryOp::Add, left, right);
    let sum_stmt = b.expr_stmt(sum);
    let main = function_with(&mut b, "main", vec![p_stmt, call_stmt, sum_stmt]);
    let unit = session.add_unit(b.finish("adl.cpp", vec![geo, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, call), Idx::INT);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, call)),
        Binding::Declaration(symbol_of(&session, unit, area))
    );
    assert_eq!(resolver.type_of(unit, sum), resolver.type_of(unit, left));
}

#[test]
fn block_scope_declarations_suppress_associated_lookup() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let (geo, _) = geometry(&mut b);
    // void main() { geo::Point p; void area(int); area(p); }
    let qualifier = b.name("geo");
    let point = b.qualified(qualifier, "Point");
    let ty = b.name_ty(point);
    let p = b.var("p", ty, None);
    let p_stmt = b.decl_stmt(p);
    let ret = b.void_ty();
    let int = b.int_ty();
    let param = b.param(None, int);
    let local = b.func("area", ret, vec![param], None);
    let local_stmt = b.decl_stmt(local);
    let use_p = b.id("p");
    let call = b.call_named("area", vec![use_p]);
    let call_stmt = b.expr_stmt(call);
    let main = function_with(&mut b, "main", vec![p_stmt, local_stmt, call_stmt]);
    let unit = session.add_unit(b.finish("local.cpp", vec![geo, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.type_of(unit, call).as_problem(),
        Some(ProblemKind::NoViableCandidate)
    );
}
