//! Operator expressions.
//!
//! An operator with a class or enum operand first looks for operator
//! functions: members of the left operand's class and non-members visible
//! at the expression. Without a viable one, enum operands fall back to the
//! builtin operator.

use cxx_diagnostic::ProblemKind;
use cxx_ir::{BinaryOp, ExprId, UnaryOp};
use cxx_types::{ConversionSource, Idx, SymbolId, TypeData, TypePool, ValueCategory};

use super::{ExprInfo, Resolver, Want};
use crate::index::QualifiedName;
use crate::overload::{CallForm, CallSet};
use crate::session::Unit;
use crate::Ctx;

impl Resolver<'_> {
    pub(super) fn unary_expr(&mut self, unit: &Unit, expr: ExprId, op: UnaryOp, operand: ExprId, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let info = self.expr(unit, operand, ctx);
        if op == UnaryOp::AddrOf && info.overloads.is_some() && info.ty.is_problem() {
            // `&f` of an overload set waits for a target type.
            return info;
        }
        if pool.is_dependent(info.ty) {
            return ExprInfo::dependent();
        }
        if let Some(kind) = info.ty.as_problem() {
            return ExprInfo::problem(kind);
        }
        let class = pool.is_class_like(info.ty);
        if class || pool.is_enum(info.ty) {
            let mut operands = vec![info.clone()];
            if matches!(op, UnaryOp::PostInc | UnaryOp::PostDec) {
                // Postfix operator functions take a dummy `int`.
                operands.push(ExprInfo {
                    null_constant: true,
                    ..ExprInfo::prvalue(Idx::INT)
                });
            }
            match self.overloaded_operator(unit, expr, op.function_name(), &operands, ctx) {
                Some(Ok(result)) => return result,
                Some(Err(kind)) if class => return ExprInfo::problem(kind),
                None if class && op != UnaryOp::AddrOf => return ExprInfo::problem(ProblemKind::NoViableCandidate),
                _ => {}
            }
        }
        builtin_unary(pool, op, &info)
    }

    pub(super) fn binary_expr(
        &mut self,
        unit: &Unit,
        expr: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        ctx: Ctx,
    ) -> ExprInfo {
        let pool = self.pool();
        let lhs = self.expr(unit, left, ctx);
        let rhs = self.expr(unit, right, ctx);
        if pool.is_dependent(lhs.ty) || pool.is_dependent(rhs.ty) {
            return ExprInfo::dependent();
        }
        if op == BinaryOp::Assign && rhs.overloads.is_some() && rhs.ty.is_problem() {
            if let Some(set) = &rhs.overloads {
                self.bind_to_target(unit, set, lhs.ty, ctx);
            }
            return lhs_result(&lhs);
        }
        if let Some(kind) = lhs.ty.as_problem().or(rhs.ty.as_problem()) {
            return ExprInfo::problem(kind);
        }

        let class = pool.is_class_like(lhs.ty) || pool.is_class_like(rhs.ty);
        if class || pool.is_enum(lhs.ty) || pool.is_enum(rhs.ty) {
            let operands = [lhs.clone(), rhs.clone()];
            match self.overloaded_operator(unit, expr, op.function_name(), &operands, ctx) {
                Some(Ok(result)) => return result,
                Some(Err(kind)) if class => return ExprInfo::problem(kind),
                None if class && !matches!(op, BinaryOp::Assign | BinaryOp::Comma) => {
                    return ExprInfo::problem(ProblemKind::NoViableCandidate);
                }
                _ => {}
            }
        }
        match op {
            BinaryOp::Comma => rhs,
            BinaryOp::Assign => {
                let source = ConversionSource::new(rhs.ty, rhs.category).with_null_constant(rhs.null_constant);
                let target = pool.strip_cv(lhs.ty);
                if !lhs.category.is_lvalue() || !self.assignable(source, target) {
                    return ExprInfo::problem(ProblemKind::TypeMismatch);
                }
                lhs_result(&lhs)
            }
            _ => builtin_binary(pool, op, &lhs, &rhs),
        }
    }

    fn assignable(&mut self, source: ConversionSource, target: Idx) -> bool {
        self.conversion(source, target).is_viable() || self.user_conversion(source, target).is_viable()
    }

    pub(super) fn conditional_expr(
        &mut self,
        unit: &Unit,
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
        ctx: Ctx,
    ) -> ExprInfo {
        let pool = self.pool();
        let cond = self.expr(unit, cond, ctx);
        let then_info = self.expr(unit, then_expr, ctx);
        let else_info = self.expr(unit, else_expr, ctx);
        if [&cond, &then_info, &else_info].iter().any(|info| pool.is_dependent(info.ty)) {
            return ExprInfo::dependent();
        }
        if let Some(kind) = then_info.ty.as_problem().or(else_info.ty.as_problem()) {
            return ExprInfo::problem(kind);
        }
        let (a, b) = (then_info.ty, else_info.ty);
        if a == b {
            let category = if then_info.category.is_lvalue() && else_info.category.is_lvalue() {
                ValueCategory::LValue
            } else {
                ValueCategory::PRValue
            };
            return ExprInfo {
                category,
                ..ExprInfo::prvalue(a)
            };
        }
        if arithmetic_like(pool, a) && arithmetic_like(pool, b) {
            return ExprInfo::prvalue(arithmetic_result(pool, a, b));
        }
        if pool.is_pointer(a) && else_info.null_constant {
            return ExprInfo::prvalue(pool.strip_cv(a));
        }
        if pool.is_pointer(b) && then_info.null_constant {
            return ExprInfo::prvalue(pool.strip_cv(b));
        }
        if pool.strip_cv(a) == pool.strip_cv(b) {
            return ExprInfo::prvalue(pool.strip_cv(a));
        }
        ExprInfo::problem(ProblemKind::TypeMismatch)
    }

    /// Resolve an operator expression against its operator functions;
    /// `None` when no operator function is declared.
    pub(super) fn overloaded_operator(
        &mut self,
        unit: &Unit,
        expr: ExprId,
        name: &str,
        operands: &[ExprInfo],
        ctx: Ctx,
    ) -> Option<Result<ExprInfo, ProblemKind>> {
        let pool = self.pool();
        let ident = self.session.interner().intern(name);
        let mut candidates: Vec<SymbolId> = Vec::new();
        let mut set_ctx = ctx;
        if let Some(first) = operands.first().filter(|first| pool.is_class_like(first.ty)) {
            let found = self.member_lookup(first.ty, ident, Want::Any);
            if !found.symbols.is_empty() {
                set_ctx = found.ctx;
                candidates.extend(found.symbols.iter().copied());
            }
        }
        if operands.len() > 1 || name != "operator[]" {
            let position = Some(unit.arena().expr(expr).span.start);
            let mut visible = unit.scopes.lookup(unit.scope_of_expr(expr), ident, position).into_vec();
            if visible.is_empty() {
                visible = self
                    .session
                    .index()
                    .lookup_in_index(&QualifiedName::default().child(ident));
            }
            let operand_types: Vec<Idx> = operands.iter().map(|operand| operand.ty).collect();
            visible.extend(self.argument_dependent(ident, &operand_types));
            for symbol in visible {
                let candidate = self.session.symbol(symbol);
                if candidate.is_function_like() && candidate.member_of().is_none() && !candidates.contains(&symbol) {
                    candidates.push(symbol);
                }
            }
        }
        if candidates.is_empty() {
            return None;
        }
        let set = CallSet {
            candidates: &candidates,
            ctx: set_ctx,
            explicit: None,
            object: None,
            form: CallForm::Operator,
        };
        let resolved = self.resolve_call(unit, &set, operands, ctx);
        tracing::trace!(operator = name, ok = resolved.is_ok(), "operator function resolution");
        Some(resolved.map(|resolved| self.returned_by(resolved.ty)))
    }
}

fn lhs_result(lhs: &ExprInfo) -> ExprInfo {
    ExprInfo::lvalue(lhs.ty)
}

fn builtin_unary(pool: &TypePool, op: UnaryOp, info: &ExprInfo) -> ExprInfo {
    let ty = info.ty;
    let mismatch = ExprInfo::problem(ProblemKind::TypeMismatch);
    match op {
        UnaryOp::Neg | UnaryOp::Plus if arithmetic_like(pool, ty) => ExprInfo::prvalue(promote(pool, ty)),
        UnaryOp::Plus if pool.is_pointer(ty) => ExprInfo::prvalue(pool.strip_cv(ty)),
        UnaryOp::BitNot if integral_like(pool, ty) => ExprInfo::prvalue(promote(pool, ty)),
        UnaryOp::Not => ExprInfo::prvalue(Idx::BOOL),
        UnaryOp::Deref => match pool.get(pool.strip_cv(ty)) {
            TypeData::Pointer(pointee) => ExprInfo::lvalue(pointee),
            TypeData::Function(_) => ExprInfo::lvalue(ty),
            _ => mismatch,
        },
        UnaryOp::AddrOf if info.category.is_lvalue() => ExprInfo::prvalue(pool.pointer(ty)),
        UnaryOp::PreInc | UnaryOp::PreDec if incrementable(pool, info) => ExprInfo::lvalue(ty),
        UnaryOp::PostInc | UnaryOp::PostDec if incrementable(pool, info) => ExprInfo::prvalue(pool.strip_cv(ty)),
        _ => mismatch,
    }
}

fn incrementable(pool: &TypePool, info: &ExprInfo) -> bool {
    info.category.is_lvalue()
        && pool.cv_of(info.ty).is_empty()
        && (pool.is_arithmetic(info.ty) || pool.is_pointer(info.ty))
}

fn builtin_binary(pool: &TypePool, op: BinaryOp, lhs: &ExprInfo, rhs: &ExprInfo) -> ExprInfo {
    let (l, r) = (lhs.ty, rhs.ty);
    let mismatch = ExprInfo::problem(ProblemKind::TypeMismatch);
    match op {
        BinaryOp::And | BinaryOp::Or => ExprInfo::prvalue(Idx::BOOL),
        _ if op.is_comparison() => ExprInfo::prvalue(Idx::BOOL),
        BinaryOp::AddAssign | BinaryOp::SubAssign => {
            let fits = arithmetic_like(pool, r) && (pool.is_arithmetic(l) || pool.is_pointer(l));
            if lhs.category.is_lvalue() && fits {
                lhs_result(lhs)
            } else {
                mismatch
            }
        }
        BinaryOp::Shl | BinaryOp::Shr if integral_like(pool, l) && integral_like(pool, r) => {
            ExprInfo::prvalue(promote(pool, l))
        }
        BinaryOp::Add if pool.is_pointer(l) && integral_like(pool, r) => ExprInfo::prvalue(pool.strip_cv(l)),
        BinaryOp::Add if integral_like(pool, l) && pool.is_pointer(r) => ExprInfo::prvalue(pool.strip_cv(r)),
        BinaryOp::Sub if pool.is_pointer(l) && pool.is_pointer(r) => ExprInfo::prvalue(Idx::LONG),
        BinaryOp::Sub if pool.is_pointer(l) && integral_like(pool, r) => ExprInfo::prvalue(pool.strip_cv(l)),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
            if arithmetic_like(pool, l) && arithmetic_like(pool, r) =>
        {
            ExprInfo::prvalue(arithmetic_result(pool, l, r))
        }
        BinaryOp::Rem | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor
            if integral_like(pool, l) && integral_like(pool, r) =>
        {
            ExprInfo::prvalue(arithmetic_result(pool, l, r))
        }
        _ => mismatch,
    }
}

fn arithmetic_like(pool: &TypePool, ty: Idx) -> bool {
    pool.is_arithmetic(ty) || pool.is_enum(ty)
}

fn integral_like(pool: &TypePool, ty: Idx) -> bool {
    pool.is_integral(ty) || pool.is_enum(ty)
}

/// Integral promotion; enums promote to `int`.
pub(crate) fn promote(pool: &TypePool, ty: Idx) -> Idx {
    let ty = pool.strip_cv(ty);
    if pool.is_enum(ty) {
        return Idx::INT;
    }
    match ty {
        Idx::BOOL | Idx::CHAR | Idx::SCHAR | Idx::UCHAR | Idx::WCHAR | Idx::CHAR16 | Idx::SHORT | Idx::USHORT => {
            Idx::INT
        }
        Idx::CHAR32 => Idx::UINT,
        _ => ty,
    }
}

/// Usual arithmetic conversions.
pub(crate) fn arithmetic_result(pool: &TypePool, a: Idx, b: Idx) -> Idx {
    for floating in [Idx::LONG_DOUBLE, Idx::DOUBLE, Idx::FLOAT] {
        if pool.strip_cv(a) == floating || pool.strip_cv(b) == floating {
            return floating;
        }
    }
    let (a, b) = (promote(pool, a), promote(pool, b));
    let (rank_a, rank_b) = (integer_rank(a), integer_rank(b));
    match rank_a.cmp(&rank_b) {
        std::cmp::Ordering::Greater => a,
        std::cmp::Ordering::Less => b,
        std::cmp::Ordering::Equal if is_unsigned(b) => b,
        std::cmp::Ordering::Equal => a,
    }
}

fn integer_rank(ty: Idx) -> u8 {
    match ty {
        Idx::LONG | Idx::ULONG => 2,
        Idx::LONG_LONG | Idx::ULONG_LONG => 3,
        _ => 1,
    }
}

fn is_unsigned(ty: Idx) -> bool {
    matches!(ty, Idx::UINT | Idx::ULONG | Idx::ULONG_LONG)
}
