#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::test_helpers::{function_with, resolver, session, stmts};
use cxx_ir::{AstBuilder, BinaryOp, BuiltinType, CaptureDefault, DeclId};
use pretty_assertions::assert_eq;

/// `name(args)` inside `void main()`.
fn call_in_main(b: &mut AstBuilder<'_>, name: &str, args: Vec<ExprId>) -> (ExprId, DeclId) {
    let call = b.call_named(name, args);
    let body = stmts(b, &[call]);
    (call, function_with(b, "main", body))
}

#[test]
fn recursion_after_a_plain_return_is_deduced() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // auto sum(int i) { if (i == 1) return i; else return sum(i - 1) + i; }
    let ret = b.auto_ty();
    let int = b.int_ty();
    let i = b.param(Some("i"), int);
    let use_i = b.id("i");
    let one = b.int_lit(1);
    let cond = b.binary(BinaryOp::Eq, use_i, one);
    let use_i = b.id("i");
    let base = b.ret(Some(use_i));
    let use_i = b.id("i");
    let one = b.int_lit(1);
    let less = b.binary(BinaryOp::Sub, use_i, one);
    let recurse = b.call_named("sum", vec![less]);
    let use_i = b.id("i");
    let total = b.binary(BinaryOp::Add, recurse, use_i);
    let step = b.ret(Some(total));
    let branch = b.if_stmt(cond, base, Some(step));
    let body = b.block(vec![branch]);
    let sum = b.func("sum", ret, vec![i], Some(body));

    let three = b.int_lit(3);
    let (call, main) = call_in_main(&mut b, "sum", vec![three]);
    let unit = session.add_unit(b.finish("sum.cpp", vec![sum, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, call), Idx::INT);
    assert_eq!(resolver.type_of(unit, recurse), Idx::INT);
}

#[test]
fn recursion_without_a_plain_return_fails() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // auto f() { return f(); }
    let ret = b.auto_ty();
    let recurse = b.call_named("f", vec![]);
    let r = b.ret(Some(recurse));
    let body = b.block(vec![r]);
    let f = b.func("f", ret, vec![], Some(body));
    let (call, main) = call_in_main(&mut b, "f", vec![]);
    let unit = session.add_unit(b.finish("loop.cpp", vec![f, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.type_of(unit, call).as_problem(),
        Some(ProblemKind::DeductionFailure)
    );
}

#[test]
fn disagreeing_returns_are_a_mismatch() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // auto pick(int c) { if (c) return 1; return 2.0; }
    let ret = b.auto_ty();
    let int = b.int_ty();
    let c = b.param(Some("c"), int);
    let use_c = b.id("c");
    let one = b.int_lit(1);
    let first = b.ret(Some(one));
    let branch = b.if_stmt(use_c, first, None);
    let two = b.float_lit(2.0);
    let second = b.ret(Some(two));
    let body = b.block(vec![branch, second]);
    let pick = b.func("pick", ret, vec![c], Some(body));
    let zero = b.int_lit(0);
    let (call, main) = call_in_main(&mut b, "pick", vec![zero]);
    let unit = session.add_unit(b.finish("pick.cpp", vec![pick, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.type_of(unit, call).as_problem(),
        Some(ProblemKind::TypeMismatch)
    );
}

#[test]
fn body_without_returns_is_void() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let ret = b.auto_ty();
    let body = b.block(vec![]);
    let nothing = b.func("nothing", ret, vec![], Some(body));
    let (call, main) = call_in_main(&mut b, "nothing", vec![]);
    let unit = session.add_unit(b.finish("void.cpp", vec![nothing, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, call), Idx::VOID);
}

#[test]
fn trailing_return_type_is_not_deduced() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // auto half() -> double { return 1; }
    let ret = b.auto_ty();
    let one = b.int_lit(1);
    let r = b.ret(Some(one));
    let body = b.block(vec![r]);
    let half = b.func("half", ret, vec![], Some(body));
    let double = b.builtin(BuiltinType::Double);
    b.set_trailing_return(half, double);
    let (call, main) = call_in_main(&mut b, "half", vec![]);
    let unit = session.add_unit(b.finish("trailing.cpp", vec![half, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, call), Idx::DOUBLE);
}

#[test]
fn auto_variables_follow_template_deduction() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let ty = b.const_ty(int);
    let source = b.var("source", ty, None);

    // auto copy = source;
    let ty = b.auto_ty();
    let init = b.id("source");
    let copy = b.var_init("copy", ty, init);
    // const auto& alias = source;
    let ty = b.auto_ty();
    let ty = b.const_ty(ty);
    let ty = b.lref_ty(ty);
    let init = b.id("source");
    let alias = b.var_init("alias", ty, init);
    // auto* address = &copy;
    let ty = b.auto_ty();
    let ty = b.pointer_ty(ty);
    let use_copy = b.id("copy");
    let init = b.unary(cxx_ir::UnaryOp::AddrOf, use_copy);
    let address = b.var_init("address", ty, init);

    let use_copy = b.id("copy");
    let use_alias = b.id("alias");
    let use_address = b.id("address");
    let body = stmts(&mut b, &[use_copy, use_alias, use_address]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("auto.cpp", vec![source, copy, alias, address, main]));

    let mut resolver = resolver(&session);
    let pool = session.pool();
    assert_eq!(resolver.type_of(unit, use_copy), Idx::INT);
    assert_eq!(resolver.type_of(unit, use_alias), pool.const_of(Idx::INT));
    assert_eq!(resolver.type_of(unit, use_address), pool.pointer(Idx::INT));
}

#[test]
fn self_initialized_auto_variable_fails() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // auto x = x;
    let ty = b.auto_ty();
    let init = b.id("x");
    let x = b.var_init("x", ty, init);
    let unit = session.add_unit(b.finish("self.cpp", vec![x]));

    let mut resolver = resolver(&session);
    assert!(resolver.type_of(unit, init).is_problem());
}

#[test]
fn lambda_return_type_is_deduced_from_its_body() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // [](int x) { return x * 2.0; }(1)
    let int = b.int_ty();
    let x = b.param(Some("x"), int);
    let use_x = b.id("x");
    let two = b.float_lit(2.0);
    let product = b.binary(BinaryOp::Mul, use_x, two);
    let r = b.ret(Some(product));
    let body = b.block(vec![r]);
    let lambda = b.lambda(vec![], CaptureDefault::None, vec![x], None, body);
    let one = b.int_lit(1);
    let call = b.call(lambda, vec![one]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("lambda.cpp", vec![main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, call), Idx::DOUBLE);
    assert!(matches!(
        session.pool().get(resolver.type_of(unit, lambda)),
        TypeData::Closure(_)
    ));
}

#[test]
fn generic_lambda_deduces_per_call() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    // auto id = [](auto v) { return v; };
    let ty = b.auto_ty();
    let v = b.param(Some("v"), ty);
    let use_v = b.id("v");
    let r = b.ret(Some(use_v));
    let body = b.block(vec![r]);
    let lambda = b.lambda(vec![], CaptureDefault::None, vec![v], None, body);
    let ty = b.auto_ty();
    let id = b.var_init("id", ty, lambda);

    let c = b.char_lit('c');
    let by_char = b.call_named("id", vec![c]);
    let x = b.float_lit(0.5);
    let by_double = b.call_named("id", vec![x]);
    let text = b.string_lit("hello");
    let by_string = b.call_named("id", vec![text]);
    let body = stmts(&mut b, &[by_char, by_double, by_string]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("generic.cpp", vec![id, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, by_char), Idx::CHAR);
    assert_eq!(resolver.type_of(unit, by_double), Idx::DOUBLE);
    // The array argument decays.
    let pool = session.pool();
    assert_eq!(
        resolver.type_of(unit, by_string),
        pool.pointer(pool.const_of(Idx::CHAR))
    );
}

/// `auto f(int i) { if (i == 0) return 0; return g(i); }` and
/// `auto g(int i) { return f(i); }`, with `f(1)` and `g(1)` in `main`.
fn mutual_recursion(session: &crate::AnalysisSession) -> (crate::UnitId, ExprId, ExprId) {
    let mut b = AstBuilder::new(session.interner());
    let ret = b.auto_ty();
    let int = b.int_ty();
    let i = b.param(Some("i"), int);
    let use_i = b.id("i");
    let zero = b.int_lit(0);
    let cond = b.binary(BinaryOp::Eq, use_i, zero);
    let zero = b.int_lit(0);
    let base = b.ret(Some(zero));
    let branch = b.if_stmt(cond, base, None);
    let use_i = b.id("i");
    let to_g = b.call_named("g", vec![use_i]);
    let step = b.ret(Some(to_g));
    let body = b.block(vec![branch, step]);
    let f = b.func("f", ret, vec![i], Some(body));

    let ret = b.auto_ty();
    let int = b.int_ty();
    let i = b.param(Some("i"), int);
    let use_i = b.id("i");
    let to_f = b.call_named("f", vec![use_i]);
    let back = b.ret(Some(to_f));
    let body = b.block(vec![back]);
    let g = b.func("g", ret, vec![i], Some(body));

    let one = b.int_lit(1);
    let f_call = b.call_named("f", vec![one]);
    let one = b.int_lit(1);
    let g_call = b.call_named("g", vec![one]);
    let body = stmts(&mut b, &[f_call, g_call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("mutual.cpp", vec![f, g, main]));
    (unit, f_call, g_call)
}

#[test]
fn mutual_recursion_is_independent_of_query_order() {
    let session = session();
    let (unit, f_call, g_call) = mutual_recursion(&session);

    let mut f_first = resolver(&session);
    assert_eq!(f_first.type_of(unit, f_call), Idx::INT);
    assert_eq!(f_first.type_of(unit, g_call), Idx::INT);

    let mut g_first = resolver(&session);
    assert_eq!(g_first.type_of(unit, g_call), Idx::INT);
    assert_eq!(g_first.type_of(unit, f_call), Idx::INT);
}

#[test]
fn results_do_not_depend_on_resolution_order() {
    let session = session();
    let (unit, _, _) = mutual_recursion(&session);

    let mut forward = resolver(&session);
    let expected = forward.resolve_all(unit).unwrap();

    let mut backward = resolver(&session);
    let exprs: Vec<ExprId> = session.unit(unit).arena().expr_ids().collect();
    for &expr in exprs.iter().rev() {
        backward.type_of(unit, expr);
    }
    let names: Vec<cxx_ir::NameId> = session.unit(unit).arena().name_ids().collect();
    for &name in names.iter().rev() {
        backward.resolve_name(unit, name);
    }
    let actual = backward.resolve_all(unit).unwrap();
    assert_eq!(actual.types, expected.types);
    assert_eq!(actual.bindings, expected.bindings);
}

#[test]
fn init_captures_deduce_like_auto_variables() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let count = b.var("count", int, None);
    // [x = 1.5] { return x; }()
    let name = b.name("x");
    let half = b.float_lit(1.5);
    let capture = b.capture(cxx_ir::CaptureKind::Init {
        name,
        init: half,
        by_ref: false,
    });
    let use_x = b.id("x");
    let r = b.ret(Some(use_x));
    let body = b.block(vec![r]);
    let by_value = b.lambda(vec![capture], CaptureDefault::None, vec![], None, body);
    let by_value_call = b.call(by_value, vec![]);
    // [&r = count] { return r; }()
    let name = b.name("r");
    let init = b.id("count");
    let capture = b.capture(cxx_ir::CaptureKind::Init {
        name,
        init,
        by_ref: true,
    });
    let use_r = b.id("r");
    let r = b.ret(Some(use_r));
    let body = b.block(vec![r]);
    let by_ref = b.lambda(vec![capture], CaptureDefault::None, vec![], None, body);
    let by_ref_call = b.call(by_ref, vec![]);
    let body = stmts(&mut b, &[by_value_call, by_ref_call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("capture.cpp", vec![count, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, use_x), Idx::DOUBLE);
    assert_eq!(resolver.type_of(unit, by_value_call), Idx::DOUBLE);
    assert_eq!(resolver.type_of(unit, use_r), Idx::INT);
    assert_eq!(resolver.type_of(unit, by_ref_call), Idx::INT);
}
