use super::*;
use crate::{AstBuilder, StringInterner};

/// Counts return statements, stopping at lambda boundaries.
struct Returns {
    count: usize,
}

impl<'ast> Visitor<'ast> for Returns {
    fn visit_stmt(&mut self, id: StmtId, stmt: &'ast Stmt, arena: &'ast AstArena) {
        if matches!(stmt.kind, StmtKind::Return(_)) {
            self.count += 1;
        }
        walk_stmt(self, id, stmt, arena);
    }

    fn visit_lambda(&mut self, _id: ExprId, _lambda: &'ast LambdaExpr, _arena: &'ast AstArena) {}
}

/// Records every visited name.
struct Names {
    seen: Vec<NameId>,
}

impl<'ast> Visitor<'ast> for Names {
    fn visit_name(&mut self, id: NameId, arena: &'ast AstArena) {
        self.seen.push(id);
        walk_name(self, id, arena);
    }
}

#[test]
fn test_walk_skips_overridden_lambda() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let a = b.id("a");
    let inner_ret = b.ret(Some(a));
    let inner_body = b.block(vec![inner_ret]);
    let auto = b.auto_ty();
    let param = b.param(Some("a"), auto);
    let lambda = b.lambda(
        Vec::new(),
        crate::CaptureDefault::None,
        vec![param],
        None,
        inner_body,
    );
    let auto = b.auto_ty();
    let local = b.var_init("l", auto, lambda);
    let local_stmt = b.decl_stmt(local);
    let zero = b.int_lit(0);
    let outer_ret = b.ret(Some(zero));
    let body = b.block(vec![local_stmt, outer_ret]);
    let int = b.int_ty();
    let f = b.func("f", int, Vec::new(), Some(body));
    let unit = b.finish("t.cpp", vec![f]);

    let mut returns = Returns { count: 0 };
    returns.visit_decl_id(f, &unit.arena);
    assert_eq!(returns.count, 1);
}

#[test]
fn test_template_name_visited_once() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let t = b.type_param("T");
    let ty = b.named_ty("T");
    let var = b.var("v", ty, None);
    let template = b.template(vec![t], var);
    let unit = b.finish("t.cpp", vec![template]);

    let mut names = Names { seen: Vec::new() };
    names.visit_decl_id(template, &unit.arena);
    let v = unit.arena.decl(var).name;
    assert_eq!(names.seen.iter().filter(|&&n| Some(n) == v).count(), 1);
    // v, T (parameter) and T (use)
    assert_eq!(names.seen.len(), 3);
}

#[test]
fn test_using_declarations_visit_their_names() {
    let interner = StringInterner::new();
    let mut b = AstBuilder::new(&interner);

    let directive = b.using_directive("std");
    let scope = b.name("std");
    let target = b.qualified(scope, "swap");
    let using = b.using_decl(target);
    let unit = b.finish("t.cpp", vec![directive, using]);

    let mut names = Names { seen: Vec::new() };
    names.visit_decl_id(directive, &unit.arena);
    assert_eq!(names.seen.len(), 1);

    let mut names = Names { seen: Vec::new() };
    names.visit_decl_id(using, &unit.arena);
    // swap, then its qualifier
    assert_eq!(names.seen, vec![target, scope]);
}
