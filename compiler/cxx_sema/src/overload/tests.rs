#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::test_helpers::{function_with, id_name, resolver, session, stmts, symbol_of};
use cxx_ir::{AstBuilder, BuiltinType, CaptureDefault, ClassKey, TemplateParam};
use pretty_assertions::assert_eq;

/// `void name(param)`, declared only.
fn declare(b: &mut AstBuilder<'_>, name: &str, param: BuiltinType) -> cxx_ir::DeclId {
    let ty = b.builtin(param);
    let p = b.param(None, ty);
    let ret = b.void_ty();
    b.func(name, ret, vec![p], None)
}

#[test]
fn promotion_beats_conversion() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let f_int = declare(&mut b, "f", BuiltinType::Int);
    let f_double = declare(&mut b, "f", BuiltinType::Double);
    let c = b.char_lit('a');
    let by_char = b.call_named("f", vec![c]);
    let x = b.float_lit_single(1.5);
    let by_float = b.call_named("f", vec![x]);
    let body = stmts(&mut b, &[by_char, by_float]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("promote.cpp", vec![f_int, f_double, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, by_char)),
        Binding::Declaration(symbol_of(&session, unit, f_int))
    );
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, by_float)),
        Binding::Declaration(symbol_of(&session, unit, f_double))
    );
    assert_eq!(resolver.type_of(unit, by_char), Idx::VOID);
}

#[test]
fn equal_conversions_are_ambiguous() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let f_int = declare(&mut b, "f", BuiltinType::Int);
    let f_long = declare(&mut b, "f", BuiltinType::Long);
    let x = b.float_lit(2.0);
    let call = b.call_named("f", vec![x]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("ambiguous.cpp", vec![f_int, f_long, main]));

    let mut resolver = resolver(&session);
    let binding = resolver.resolve_name(unit, id_name(&session, unit, call));
    assert_eq!(binding.problem_kind(), Some(ProblemKind::Ambiguous));
    assert_eq!(resolver.type_of(unit, call).as_problem(), Some(ProblemKind::Ambiguous));
}

#[test]
fn no_viable_candidate() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let ptr = b.pointer_ty(int);
    let p = b.param(None, ptr);
    let ret = b.void_ty();
    let f = b.func("f", ret, vec![p], None);
    let x = b.float_lit(2.0);
    let call = b.call_named("f", vec![x]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("none.cpp", vec![f, main]));

    let mut resolver = resolver(&session);
    let binding = resolver.resolve_name(unit, id_name(&session, unit, call));
    assert_eq!(binding.problem_kind(), Some(ProblemKind::NoViableCandidate));
}

#[test]
fn default_arguments_lower_the_arity() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let a = b.param(Some("a"), int);
    let int = b.int_ty();
    let two = b.int_lit(2);
    let c = b.param_with_default("c", int, two);
    let ret = b.void_ty();
    let d = b.func("d", ret, vec![a, c], None);
    let one = b.int_lit(1);
    let short = b.call_named("d", vec![one]);
    let empty = b.call_named("d", vec![]);
    let body = stmts(&mut b, &[short, empty]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("defaults.cpp", vec![d, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, short)),
        Binding::Declaration(symbol_of(&session, unit, d))
    );
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, empty)).problem_kind(),
        Some(ProblemKind::NoViableCandidate)
    );
}

/// `template<class T> void name(T)`, or `name(T*)` when `pointer`.
fn declare_template(b: &mut AstBuilder<'_>, name: &str, pointer: bool) -> cxx_ir::DeclId {
    let t: TemplateParam = b.type_param("T");
    let mut ty = b.named_ty("T");
    if pointer {
        ty = b.pointer_ty(ty);
    }
    let p = b.param(None, ty);
    let ret = b.void_ty();
    let f = b.func(name, ret, vec![p], None);
    b.template(vec![t], f)
}

#[test]
fn non_template_wins_a_tie() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let template = declare_template(&mut b, "g", false);
    let plain = declare(&mut b, "g", BuiltinType::Int);
    let one = b.int_lit(1);
    let by_int = b.call_named("g", vec![one]);
    let x = b.float_lit(1.0);
    let by_double = b.call_named("g", vec![x]);
    let body = stmts(&mut b, &[by_int, by_double]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("tie.cpp", vec![template, plain, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, by_int)),
        Binding::Declaration(symbol_of(&session, unit, plain))
    );
    // An exact template match beats a conversion.
    let binding = resolver.resolve_name(unit, id_name(&session, unit, by_double));
    let instance = session.instance(binding.as_instance().unwrap());
    assert_eq!(instance.template, symbol_of(&session, unit, template));
    assert_eq!(instance.args.to_vec(), vec![TemplateArg::Type(Idx::DOUBLE)]);
}

#[test]
fn more_specialized_template_wins() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let general = declare_template(&mut b, "f", false);
    let pointer = declare_template(&mut b, "f", true);
    let int = b.int_ty();
    let ptr = b.pointer_ty(int);
    let p = b.var("p", ptr, None);
    let arg = b.id("p");
    let call = b.call_named("f", vec![arg]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("ordering.cpp", vec![general, pointer, p, main]));

    let mut resolver = resolver(&session);
    let binding = resolver.resolve_name(unit, id_name(&session, unit, call));
    let instance = session.instance(binding.as_instance().unwrap());
    assert_eq!(instance.template, symbol_of(&session, unit, pointer));
    assert_eq!(instance.args.to_vec(), vec![TemplateArg::Type(Idx::INT)]);
    // Only the winner is instantiated.
    assert_eq!(session.instance_count(), 1);
}

#[test]
fn implicit_object_constness_selects_member() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let get = b.func("get", int, vec![], None);
    let double = b.builtin(BuiltinType::Double);
    let get_const = b.func("get", double, vec![], None);
    b.set_const_member(get_const);
    let class = b.class("S", ClassKey::Struct, vec![], vec![get, get_const]);
    let ty = b.named_ty("S");
    let s = b.var("s", ty, None);
    let ty = b.named_ty("S");
    let ty = b.const_ty(ty);
    let cs = b.var("cs", ty, None);

    let object = b.id("s");
    let callee = b.member(object, "get", false);
    let on_mutable = b.call(callee, vec![]);
    let object = b.id("cs");
    let callee = b.member(object, "get", false);
    let on_const = b.call(callee, vec![]);
    let body = stmts(&mut b, &[on_mutable, on_const]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("member.cpp", vec![class, s, cs, main]));

    let mut resolver = resolver(&session);
    assert_eq!(resolver.type_of(unit, on_mutable), Idx::INT);
    assert_eq!(resolver.type_of(unit, on_const), Idx::DOUBLE);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, on_const)),
        Binding::Declaration(symbol_of(&session, unit, get_const))
    );
}

#[test]
fn converting_constructor_bridges_an_argument() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let p = b.param(None, int);
    let ctor = b.constructor("A", vec![p], None);
    let class = b.class("A", ClassKey::Struct, vec![], vec![ctor]);
    let ty = b.named_ty("A");
    let p = b.param(None, ty);
    let ret = b.void_ty();
    let take = b.func("take", ret, vec![p], None);
    let one = b.int_lit(1);
    let call = b.call_named("take", vec![one]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("convert.cpp", vec![class, take, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, call)),
        Binding::Declaration(symbol_of(&session, unit, take))
    );
}

#[test]
fn explicit_constructor_does_not_convert() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let p = b.param(None, int);
    let ctor = b.constructor("A", vec![p], None);
    b.set_specifiers(ctor, DeclSpecifiers::EXPLICIT);
    let class = b.class("A", ClassKey::Struct, vec![], vec![ctor]);
    let ty = b.named_ty("A");
    let p = b.param(None, ty);
    let ret = b.void_ty();
    let take = b.func("take", ret, vec![p], None);
    let one = b.int_lit(1);
    let call = b.call_named("take", vec![one]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("explicit.cpp", vec![class, take, main]));

    let mut resolver = resolver(&session);
    let binding = resolver.resolve_name(unit, id_name(&session, unit, call));
    assert_eq!(binding.problem_kind(), Some(ProblemKind::NoViableCandidate));
}

#[test]
fn captureless_lambda_converts_to_function_pointer() {
    let session = session();
    let mut b = AstBuilder::new(session.interner());
    let int = b.int_ty();
    let int_param = b.int_ty();
    let fp = b.function_ptr_ty(int, vec![int_param]);
    let p = b.param(None, fp);
    let ret = b.void_ty();
    let call_with = b.func("call_with", ret, vec![p], None);

    let int = b.int_ty();
    let x = b.param(Some("x"), int);
    let use_x = b.id("x");
    let r = b.ret(Some(use_x));
    let lambda_body = b.block(vec![r]);
    let lambda = b.lambda(vec![], CaptureDefault::None, vec![x], None, lambda_body);
    let call = b.call_named("call_with", vec![lambda]);
    let body = stmts(&mut b, &[call]);
    let main = function_with(&mut b, "main", body);
    let unit = session.add_unit(b.finish("closure.cpp", vec![call_with, main]));

    let mut resolver = resolver(&session);
    assert_eq!(
        resolver.resolve_name(unit, id_name(&session, unit, call)),
        Binding::Declaration(symbol_of(&session, unit, call_with))
    );
}
