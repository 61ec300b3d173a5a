//! AST visitor.
//!
//! Default `visit_*` methods call the matching `walk_*` function, which
//! visits children in source order. Override a `visit_*` method to act on a
//! node kind; call the `walk_*` function from it to keep descending.
//!
//! Lambda bodies are walked like any other child. Visitors that must stop
//! at function boundaries (e.g. collecting the `return` statements of one
//! body) override `visit_lambda` and skip the walk.

use crate::{
    AstArena, Capture, CaptureKind, Decl, DeclId, DeclKind, Expr, ExprId, ExprKind, Initializer,
    LambdaExpr, NameId, Param, Stmt, StmtId, StmtKind, TemplateArg, TypeExprId, TypeExprKind,
};

pub trait Visitor<'ast> {
    fn visit_decl(&mut self, id: DeclId, decl: &'ast Decl, arena: &'ast AstArena) {
        walk_decl(self, id, decl, arena);
    }

    fn visit_stmt(&mut self, id: StmtId, stmt: &'ast Stmt, arena: &'ast AstArena) {
        walk_stmt(self, id, stmt, arena);
    }

    fn visit_expr(&mut self, id: ExprId, expr: &'ast Expr, arena: &'ast AstArena) {
        walk_expr(self, id, expr, arena);
    }

    fn visit_lambda(&mut self, id: ExprId, lambda: &'ast LambdaExpr, arena: &'ast AstArena) {
        walk_lambda(self, id, lambda, arena);
    }

    fn visit_type_expr(&mut self, id: TypeExprId, arena: &'ast AstArena) {
        walk_type_expr(self, id, arena);
    }

    fn visit_name(&mut self, id: NameId, arena: &'ast AstArena) {
        walk_name(self, id, arena);
    }

    fn visit_param(&mut self, param: &'ast Param, arena: &'ast AstArena) {
        walk_param(self, param, arena);
    }

    fn visit_capture(&mut self, capture: &'ast Capture, arena: &'ast AstArena) {
        walk_capture(self, capture, arena);
    }

    // Id helpers

    fn visit_decl_id(&mut self, id: DeclId, arena: &'ast AstArena) {
        self.visit_decl(id, arena.decl(id), arena);
    }

    fn visit_stmt_id(&mut self, id: StmtId, arena: &'ast AstArena) {
        self.visit_stmt(id, arena.stmt(id), arena);
    }

    fn visit_expr_id(&mut self, id: ExprId, arena: &'ast AstArena) {
        self.visit_expr(id, arena.expr(id), arena);
    }
}

pub fn walk_decl<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    _id: DeclId,
    decl: &'ast Decl,
    arena: &'ast AstArena,
) {
    if let Some(name) = decl.name {
        visitor.visit_name(name, arena);
    }
    walk_decl_kind(visitor, &decl.kind, arena);
}

/// Walks the children of a declaration, excluding its name.
pub fn walk_decl_kind<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    kind: &'ast DeclKind,
    arena: &'ast AstArena,
) {
    match kind {
        DeclKind::Variable { ty, init } => {
            visitor.visit_type_expr(*ty, arena);
            match init {
                Some(Initializer::Copy(expr)) => visitor.visit_expr_id(*expr, arena),
                Some(
                    Initializer::Direct(exprs)
                    | Initializer::List(exprs)
                    | Initializer::CopyList(exprs),
                ) => {
                    for &expr in arena.expr_list(*exprs) {
                        visitor.visit_expr_id(expr, arena);
                    }
                }
                None => {}
            }
        }
        DeclKind::Function(function) => {
            visitor.visit_type_expr(function.ret, arena);
            for param in arena.params(function.params) {
                visitor.visit_param(param, arena);
            }
            if let Some(trailing) = function.trailing_return {
                visitor.visit_type_expr(trailing, arena);
            }
            if let Some(body) = function.body {
                visitor.visit_stmt_id(body, arena);
            }
        }
        DeclKind::Class { bases, members, .. } => {
            for &base in arena.type_list(*bases) {
                visitor.visit_type_expr(base, arena);
            }
            for &member in arena.decl_list(*members) {
                visitor.visit_decl_id(member, arena);
            }
        }
        DeclKind::Enum {
            underlying,
            enumerators,
            ..
        } => {
            if let Some(underlying) = underlying {
                visitor.visit_type_expr(*underlying, arena);
            }
            for &enumerator in arena.decl_list(*enumerators) {
                visitor.visit_decl_id(enumerator, arena);
            }
        }
        DeclKind::Enumerator { value } => {
            if let Some(value) = value {
                visitor.visit_expr_id(*value, arena);
            }
        }
        DeclKind::Namespace { members } => {
            for &member in arena.decl_list(*members) {
                visitor.visit_decl_id(member, arena);
            }
        }
        DeclKind::Typedef { ty } => visitor.visit_type_expr(*ty, arena),
        DeclKind::UsingDirective { namespace: name } | DeclKind::UsingDeclaration { target: name } => {
            visitor.visit_name(*name, arena);
        }
        DeclKind::Template { params, decl } => {
            for param in arena.template_params(*params) {
                if let Some(name) = param.name {
                    visitor.visit_name(name, arena);
                }
                match param.default {
                    Some(TemplateArg::Type(ty)) => visitor.visit_type_expr(ty, arena),
                    Some(TemplateArg::Expr(expr)) => visitor.visit_expr_id(expr, arena),
                    None => {}
                }
            }
            // The inner declaration shares its name node with the template.
            walk_decl_kind(visitor, &arena.decl(*decl).kind, arena);
        }
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    _id: StmtId,
    stmt: &'ast Stmt,
    arena: &'ast AstArena,
) {
    match &stmt.kind {
        StmtKind::Expr(expr) => visitor.visit_expr_id(*expr, arena),
        StmtKind::Decl(decl) => visitor.visit_decl_id(*decl, arena),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr_id(*value, arena);
            }
        }
        StmtKind::Compound(stmts) => {
            for &stmt in arena.stmt_list(*stmts) {
                visitor.visit_stmt_id(stmt, arena);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr_id(*cond, arena);
            visitor.visit_stmt_id(*then_branch, arena);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt_id(*else_branch, arena);
            }
        }
        StmtKind::While { cond, body } => {
            visitor.visit_expr_id(*cond, arena);
            visitor.visit_stmt_id(*body, arena);
        }
        StmtKind::For {
            init,
            cond,
            step,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt_id(*init, arena);
            }
            if let Some(cond) = cond {
                visitor.visit_expr_id(*cond, arena);
            }
            if let Some(step) = step {
                visitor.visit_expr_id(*step, arena);
            }
            visitor.visit_stmt_id(*body, arena);
        }
        StmtKind::Null => {}
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: ExprId,
    expr: &'ast Expr,
    arena: &'ast AstArena,
) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::This => {}
        ExprKind::Id(name) | ExprKind::SizeofPack(name) => visitor.visit_name(*name, arena),
        ExprKind::Call { callee, args } => {
            visitor.visit_expr_id(*callee, arena);
            for &arg in arena.expr_list(*args) {
                visitor.visit_expr_id(arg, arena);
            }
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr_id(*operand, arena),
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr_id(*left, arena);
            visitor.visit_expr_id(*right, arena);
        }
        ExprKind::Conditional {
            cond,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr_id(*cond, arena);
            visitor.visit_expr_id(*then_expr, arena);
            visitor.visit_expr_id(*else_expr, arena);
        }
        ExprKind::Member { base, member, .. } => {
            visitor.visit_expr_id(*base, arena);
            visitor.visit_name(*member, arena);
        }
        ExprKind::Index { base, index } => {
            visitor.visit_expr_id(*base, arena);
            visitor.visit_expr_id(*index, arena);
        }
        ExprKind::Cast { ty, operand, .. } => {
            visitor.visit_type_expr(*ty, arena);
            visitor.visit_expr_id(*operand, arena);
        }
        ExprKind::Construct { ty, args, .. } => {
            visitor.visit_type_expr(*ty, arena);
            for &arg in arena.expr_list(*args) {
                visitor.visit_expr_id(arg, arena);
            }
        }
        ExprKind::Lambda(lambda) => visitor.visit_lambda(id, lambda, arena),
        ExprKind::PackExpansion(pattern) => visitor.visit_expr_id(*pattern, arena),
        ExprKind::BracedList(elems) => {
            for &elem in arena.expr_list(*elems) {
                visitor.visit_expr_id(elem, arena);
            }
        }
    }
}

pub fn walk_lambda<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    _id: ExprId,
    lambda: &'ast LambdaExpr,
    arena: &'ast AstArena,
) {
    for capture in arena.captures(lambda.captures) {
        visitor.visit_capture(capture, arena);
    }
    for param in arena.params(lambda.params) {
        visitor.visit_param(param, arena);
    }
    if let Some(trailing) = lambda.trailing_return {
        visitor.visit_type_expr(trailing, arena);
    }
    visitor.visit_stmt_id(lambda.body, arena);
}

pub fn walk_type_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: TypeExprId,
    arena: &'ast AstArena,
) {
    match &arena.type_expr(id).kind {
        TypeExprKind::Builtin(_) | TypeExprKind::Auto | TypeExprKind::DecltypeAuto => {}
        TypeExprKind::Named(name) => visitor.visit_name(*name, arena),
        TypeExprKind::Decltype(expr) => visitor.visit_expr_id(*expr, arena),
        TypeExprKind::Qualified { inner, .. }
        | TypeExprKind::Pointer(inner)
        | TypeExprKind::LValueRef(inner)
        | TypeExprKind::RValueRef(inner)
        | TypeExprKind::PackExpansion(inner) => visitor.visit_type_expr(*inner, arena),
        TypeExprKind::Array { elem, size } => {
            visitor.visit_type_expr(*elem, arena);
            if let Some(size) = size {
                visitor.visit_expr_id(*size, arena);
            }
        }
        TypeExprKind::Function { ret, params, .. } => {
            visitor.visit_type_expr(*ret, arena);
            for &param in arena.type_list(*params) {
                visitor.visit_type_expr(param, arena);
            }
        }
    }
}

/// Visits qualifiers and template arguments of a name.
pub fn walk_name<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    id: NameId,
    arena: &'ast AstArena,
) {
    let node = arena.name(id);
    if let Some(qualifier) = node.qualifier {
        visitor.visit_name(qualifier, arena);
    }
    if let Some(args) = node.template_args {
        for arg in arena.template_args(args) {
            match *arg {
                TemplateArg::Type(ty) => visitor.visit_type_expr(ty, arena),
                TemplateArg::Expr(expr) => visitor.visit_expr_id(expr, arena),
            }
        }
    }
}

pub fn walk_param<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    param: &'ast Param,
    arena: &'ast AstArena,
) {
    if let Some(name) = param.name {
        visitor.visit_name(name, arena);
    }
    visitor.visit_type_expr(param.ty, arena);
    if let Some(default) = param.default {
        visitor.visit_expr_id(default, arena);
    }
}

pub fn walk_capture<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    capture: &'ast Capture,
    arena: &'ast AstArena,
) {
    match &capture.kind {
        CaptureKind::Copy(name) | CaptureKind::Ref(name) => visitor.visit_name(*name, arena),
        CaptureKind::This => {}
        CaptureKind::Init { name, init, .. } => {
            visitor.visit_name(*name, arena);
            visitor.visit_expr_id(*init, arena);
        }
    }
}

#[cfg(test)]
mod tests;
