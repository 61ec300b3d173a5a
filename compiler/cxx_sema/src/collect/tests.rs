#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use cxx_ir::{AstBuilder, BuiltinType, ClassKey, StringInterner, TemplateArg};
use pretty_assertions::assert_eq;

fn collect(tu: TranslationUnit, _interner: &StringInterner) -> (Vec<Symbol>, Unit, Published) {
    let (symbols, (unit, published)) = collect_unit(UnitId::new(0), tu, 0);
    (symbols, unit, published)
}

fn named<'s>(symbols: &'s [Symbol], interner: &StringInterner, ident: &str) -> Vec<&'s Symbol> {
    let name = interner.intern(ident);
    symbols.iter().filter(|s| s.name == name).collect()
}

#[test]
fn function_redeclaration_merges() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let int = b.int_ty();
    let p = b.param(Some("x"), int);
    let ret = b.int_ty();
    let decl = b.func("f", ret, vec![p], None);

    let int = b.int_ty();
    let p = b.param(Some("y"), int);
    let x = b.id("y");
    let r = b.ret(Some(x));
    let body = b.block(vec![r]);
    let ret = b.int_ty();
    let def = b.func("f", ret, vec![p], Some(body));
    let tu = b.finish("f.cpp", vec![decl, def]);

    let (symbols, unit, _) = collect(tu, &interner);
    let functions = named(&symbols, &interner, "f");
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].decl, Some(def));
    assert_eq!(functions[0].sites.len(), 2);
    assert_eq!(unit.symbol_of(decl), unit.symbol_of(def));
}

#[test]
fn overloads_stay_distinct() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let int = b.int_ty();
    let p = b.param(None, int);
    let ret = b.void_ty();
    let f_int = b.func("f", ret, vec![p], None);
    let double = b.builtin(BuiltinType::Double);
    let p = b.param(None, double);
    let ret = b.void_ty();
    let f_double = b.func("f", ret, vec![p], None);
    let tu = b.finish("f.cpp", vec![f_int, f_double]);

    let (symbols, unit, published) = collect(tu, &interner);
    assert_eq!(named(&symbols, &interner, "f").len(), 2);
    let found = unit
        .scopes
        .get(ScopeTree::GLOBAL)
        .find(interner.intern("f"), None);
    assert_eq!(found.len(), 2);
    assert_eq!(published.len(), 2);
}

#[test]
fn namespaces_reopen_and_publish_qualified_names() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let int = b.int_ty();
    let a = b.var("a", int, None);
    let first = b.namespace("ns", vec![a]);
    let int = b.int_ty();
    let c = b.var("c", int, None);
    let second = b.namespace("ns", vec![c]);
    let tu = b.finish("ns.cpp", vec![first, second]);

    let (symbols, unit, published) = collect(tu, &interner);
    assert_eq!(named(&symbols, &interner, "ns").len(), 1);
    let ns = unit.symbol_of(first);
    assert_eq!(ns, unit.symbol_of(second));

    let names: Vec<String> = published
        .iter()
        .map(|(name, _)| name.display(&interner))
        .collect();
    assert_eq!(names, vec!["ns", "ns::a", "ns::c"]);
}

#[test]
fn unscoped_enumerators_leak_into_enclosing_scope() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let plain = b.enumeration("Color", false, vec![("Red", None), ("Green", None)]);
    let scoped = b.enumeration("Mode", true, vec![("Fast", None)]);
    let tu = b.finish("enum.cpp", vec![plain, scoped]);

    let (_, unit, _) = collect(tu, &interner);
    let global = unit.scopes.get(ScopeTree::GLOBAL);
    assert_eq!(global.find(interner.intern("Red"), None).len(), 1);
    assert_eq!(global.find(interner.intern("Green"), None).len(), 1);
    assert!(global.find(interner.intern("Fast"), None).is_empty());
}

#[test]
fn class_forward_declaration_merges_with_definition() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let forward = b.class("S", ClassKey::Struct, vec![], vec![]);
    b.set_forward_declaration(forward);
    let int = b.int_ty();
    let member = b.var("value", int, None);
    let def = b.class("S", ClassKey::Struct, vec![], vec![member]);
    let tu = b.finish("s.cpp", vec![forward, def]);

    let (symbols, unit, _) = collect(tu, &interner);
    let classes = named(&symbols, &interner, "S");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].decl, Some(def));
    let scope = classes[0].member_scope().unwrap();
    assert_eq!(unit.scopes.get(scope).find(interner.intern("value"), None).len(), 1);
}

#[test]
fn member_functions_know_their_class() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let ret = b.void_ty();
    let method = b.func("run", ret, vec![], None);
    let class = b.class("Task", ClassKey::Class, vec![], vec![method]);
    let tu = b.finish("task.cpp", vec![class]);

    let (symbols, unit, published) = collect(tu, &interner);
    let class_symbol = unit.symbol_of(class);
    let method_symbol = unit.symbol_of(method).unwrap();
    assert_eq!(symbols[method_symbol.index()].member_of(), class_symbol);
    // Members of a class are not published by name.
    assert_eq!(published.len(), 1);
}

#[test]
fn template_params_get_depth_and_index() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let t = b.type_param("T");
    let n = {
        let int = b.int_ty();
        b.non_type_param("N", int)
    };
    let t_ty = b.named_ty("T");
    let p = b.param(Some("x"), t_ty);
    let ret = b.named_ty("T");
    let f = b.func("get", ret, vec![p], None);
    let template = b.template(vec![t, n], f);
    let tu = b.finish("get.cpp", vec![template]);

    let (symbols, unit, _) = collect(tu, &interner);
    let template_symbol = unit.symbol_of(template).unwrap();
    assert_eq!(unit.symbol_of(f), Some(template_symbol));

    let info = symbols[template_symbol.index()].template_info().unwrap();
    assert_eq!(info.depth, 0);
    assert_eq!(info.params.len(), 2);
    assert_eq!(info.params[1].param.index, 1);

    let params: Vec<_> = symbols
        .iter()
        .filter_map(|s| match &s.kind {
            SymbolKind::TemplateParam(info) => Some((info.param.depth, info.param.index)),
            _ => None,
        })
        .collect();
    assert_eq!(params, vec![(0, 0), (0, 1)]);
}

#[test]
fn specializations_attach_to_the_primary() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let t = b.type_param("T");
    let three = b.int_lit(3);
    let ty = b.named_ty("T");
    let init = b.construct(ty, vec![three], false);
    let ty = b.named_ty("T");
    let primary_var = b.var_init("pi", ty, init);
    let primary = b.template(vec![t], primary_var);

    let float = b.builtin(BuiltinType::Float);
    let name = b.template_id("pi", vec![TemplateArg::Type(float)]);
    let four = b.float_lit(4.0);
    let float = b.builtin(BuiltinType::Float);
    let spec_var = b.decl(
        Some(name),
        DeclKind::Variable {
            ty: float,
            init: Some(Initializer::Copy(four)),
        },
    );
    let spec = b.template(vec![], spec_var);
    let tu = b.finish("pi.cpp", vec![primary, spec]);

    let (symbols, unit, published) = collect(tu, &interner);
    let primary_symbol = unit.symbol_of(primary).unwrap();
    let spec_symbol = unit.symbol_of(spec).unwrap();
    assert_ne!(primary_symbol, spec_symbol);

    let info = symbols[primary_symbol.index()].template_info().unwrap();
    assert_eq!(info.specializations, vec![spec_symbol]);
    let spec_info = symbols[spec_symbol.index()].template_info().unwrap();
    assert_eq!(spec_info.specialization.map(|s| s.primary), Some(primary_symbol));

    // Only the primary is visible by name.
    let found = unit
        .scopes
        .get(ScopeTree::GLOBAL)
        .find(interner.intern("pi"), None);
    assert_eq!(found.as_slice(), &[primary_symbol]);
    assert_eq!(published.len(), 1);
    assert_eq!(unit.init_of.get(&four), Some(&spec_symbol));
}

#[test]
fn names_anchor_to_their_root_expression() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let int = b.int_ty();
    let a = b.var("a", int, None);
    let one = b.int_lit(1);
    let use_a = b.id("a");
    let sum = b.binary(cxx_ir::BinaryOp::Add, use_a, one);
    let int = b.int_ty();
    let c = b.var_init("c", int, sum);
    let tu = b.finish("a.cpp", vec![a, c]);

    let (_, unit, _) = collect(tu, &interner);
    let name = id_name(&unit, use_a);
    assert_eq!(unit.name_site(name), NameSite::Expr(sum));
    assert_eq!(unit.init_of.get(&sum).copied(), unit.symbol_of(c));
}

fn id_name(unit: &Unit, expr: ExprId) -> NameId {
    match unit.arena().expr(expr).kind {
        cxx_ir::ExprKind::Id(name) => name,
        ref other => panic!("expected id expression, got {other:?}"),
    }
}

#[test]
fn block_scopes_record_returns_and_locals() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let seven = b.int_lit(7);
    let int = b.int_ty();
    let local = b.var_init("v", int, seven);
    let declare = b.decl_stmt(local);
    let v = b.id("v");
    let r = b.ret(Some(v));
    let body = b.block(vec![declare, r]);
    let ret = b.auto_ty();
    let f = b.func("f", ret, vec![], Some(body));
    let tu = b.finish("f.cpp", vec![f]);

    let (_, unit, published) = collect(tu, &interner);
    assert_eq!(unit.returns.get(&BodyOwner::Function(f)), Some(&vec![r]));
    // Locals are not published.
    assert_eq!(published.len(), 1);
    let name = id_name(&unit, v);
    let scope = unit.scope_of_name(name);
    assert_eq!(unit.scopes.get(scope).kind, ScopeKind::Block);
    assert_eq!(
        unit.scopes.lookup(scope, interner.intern("v"), Some(unit.arena().name(name).span.start)),
        unit.symbol_of(local).into_iter().collect::<smallvec::SmallVec<[SymbolId; 2]>>()
    );
}

#[test]
fn generic_lambda_invents_parameters() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);
    let auto = b.auto_ty();
    let cref = b.const_ty(auto);
    let cref = b.lref_ty(cref);
    let p = b.param(Some("x"), cref);
    let int = b.int_ty();
    let q = b.param(Some("n"), int);
    let x = b.id("x");
    let r = b.ret(Some(x));
    let body = b.block(vec![r]);
    let lambda = b.lambda(vec![], cxx_ir::CaptureDefault::None, vec![p, q], None, body);
    let ty = b.auto_ty();
    let var = b.var_init("id", ty, lambda);
    let tu = b.finish("lambda.cpp", vec![var]);

    let (_, unit, _) = collect(tu, &interner);
    let info = unit.lambdas.get(&lambda).unwrap();
    assert_eq!(info.invented.len(), 1);
    assert_eq!(info.depth, 0);
    assert_eq!(unit.invented.get(&auto), Some(&info.invented[0]));
    assert_eq!(unit.scopes.get(info.scope).template_depth, 1);
    assert_eq!(unit.returns.get(&BodyOwner::Lambda(lambda)), Some(&vec![r]));

    // Body statements are their own roots.
    let name = id_name(&unit, x);
    assert_eq!(unit.name_site(name), NameSite::Expr(x));
}
