use super::*;
use crate::{ExprKind, Literal, Span, StringInterner};

#[test]
fn test_alloc_and_get() {
    let mut arena = AstArena::new();
    let id = arena.alloc_expr(Expr {
        kind: ExprKind::Literal(Literal::Bool(true)),
        span: Span::new(0, 4),
    });
    assert_eq!(id, ExprId::new(0));
    assert_eq!(arena.expr_count(), 1);
    assert_eq!(arena.expr(id).span, Span::new(0, 4));
}

#[test]
fn test_lists_are_contiguous() {
    let mut arena = AstArena::new();
    let a = arena.alloc_expr_list([ExprId::new(3), ExprId::new(1)]);
    let b = arena.alloc_expr_list([ExprId::new(2)]);

    assert_eq!(arena.expr_list(a), &[ExprId::new(3), ExprId::new(1)]);
    assert_eq!(arena.expr_list(b), &[ExprId::new(2)]);
    assert_eq!(b.start, 2);
}

#[test]
fn test_batch_ids_index_nodes() {
    let interner = StringInterner::new();
    let mut arena = AstArena::new();
    let ty = arena.alloc_type_expr(crate::TypeExpr {
        kind: crate::TypeExprKind::Builtin(crate::BuiltinType::Int),
        span: Span::DUMMY,
    });
    let name = arena.alloc_name(NameNode {
        ident: interner.intern("x"),
        qualifier: None,
        global: false,
        template_args: None,
        span: Span::DUMMY,
    });
    let range = arena.alloc_params([Param {
        name: Some(name),
        ty,
        default: None,
        span: Span::DUMMY,
    }]);

    let ids: Vec<ParamId> = range.iter().collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(arena.param(ids[0]).name, Some(name));
    assert_eq!(arena.params(range).len(), 1);
}
