use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_spans_follow_construction_order() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let one = b.int_lit(1);
    let two = b.int_lit(2);
    let sum = b.binary(BinaryOp::Add, one, two);

    let arena = b.arena();
    assert!(arena.expr(one).span.start < arena.expr(two).span.start);
    assert!(arena.expr(two).span.start < arena.expr(sum).span.start);
}

#[test]
fn test_template_decl_shares_inner_name() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let t = b.type_param("T");
    let ty = b.named_ty("T");
    let three = b.int_lit(3);
    let init = b.construct(ty, vec![three], false);
    let var_ty = b.named_ty("T");
    let var = b.var_init("pi", var_ty, init);
    let template = b.template(vec![t], var);
    let unit = b.finish("pi.cpp", vec![template]);

    let decl = unit.arena.decl(template);
    assert_eq!(decl.name, unit.arena.decl(var).name);
    match &decl.kind {
        DeclKind::Template { params, decl } => {
            assert_eq!(params.len(), 1);
            assert_eq!(*decl, var);
        }
        other => panic!("expected template, got {other:?}"),
    }
    assert_eq!(unit.top_level(), &[template]);
}

#[test]
fn test_single_argument_construct_is_cast() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let ty = b.int_ty();
    let arg = b.float_lit(2.5);
    let cast = b.construct(ty, vec![arg], false);

    assert!(matches!(
        b.arena().expr(cast).kind,
        ExprKind::Cast {
            kind: CastKind::CStyle,
            ..
        }
    ));
}

#[test]
fn test_qualified_name_chain() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let outer = b.name("ns");
    let inner = b.qualified(outer, "value");
    let node = b.arena().name(inner);

    assert_eq!(node.qualifier, Some(outer));
    assert_eq!(interner.lookup(node.ident), "value");
}
