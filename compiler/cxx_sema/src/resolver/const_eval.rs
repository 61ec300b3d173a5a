//! Constant evaluation.
//!
//! Folds the integral and floating constant expressions template
//! arguments, array bounds and initial values are written with. Anything
//! the folder does not model yields `None`; anything resting on an unbound
//! template parameter yields a dependent value.

use cxx_ir::{BinaryOp, ExprId, ExprKind, Initializer, Literal, TemplateParamKind, UnaryOp};
use cxx_types::subst::unexpanded_packs;
use cxx_types::{Cv, SymbolId, TemplateArg, Value};

use super::{Resolver, Want};
use crate::session::Unit;
use crate::symbol::{SymbolKind, TemplateEntity};
use crate::Ctx;

impl Resolver<'_> {
    /// Value of a constant expression of `unit` in `ctx`.
    pub(crate) fn const_value(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> Option<Value> {
        self.nested(None, |this| this.const_value_uncached(unit, expr, ctx))
    }

    fn const_value_uncached(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> Option<Value> {
        let pool = self.pool();
        match unit.arena().expr(expr).kind.clone() {
            ExprKind::Literal(literal) => match literal {
                Literal::Int { value, .. } => i64::try_from(value).ok().map(Value::Int),
                Literal::Float { bits, .. } => Some(Value::Float(bits)),
                Literal::Char(c) => Some(Value::Int(i64::from(c))),
                Literal::Bool(b) => Some(Value::Bool(b)),
                Literal::String(_) | Literal::Nullptr => None,
            },
            ExprKind::Id(_) => {
                let info = self.expr(unit, expr, ctx);
                if pool.is_dependent(info.ty) {
                    if let Some((symbol, entity_ctx)) = info.entity {
                        // A non-type parameter stays a reference to itself.
                        if let Some(value) = self.symbol_value(symbol, entity_ctx) {
                            return Some(value);
                        }
                    }
                    return Some(Value::Dependent);
                }
                let (symbol, entity_ctx) = info.entity?;
                self.symbol_value(symbol, entity_ctx)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.const_value(unit, operand, ctx)?;
                if value.is_dependent() {
                    return Some(Value::Dependent);
                }
                fold_unary(op, value)
            }
            ExprKind::Binary { op, left, right } => {
                let lhs = self.const_value(unit, left, ctx)?;
                let rhs = self.const_value(unit, right, ctx)?;
                if lhs.is_dependent() || rhs.is_dependent() {
                    return Some(Value::Dependent);
                }
                fold_binary(op, lhs, rhs)
            }
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                let cond = self.const_value(unit, cond, ctx)?;
                if cond.is_dependent() {
                    return Some(Value::Dependent);
                }
                let taken = if cond.as_bool()? { then_expr } else { else_expr };
                self.const_value(unit, taken, ctx)
            }
            ExprKind::Cast { ty, operand, .. } => {
                let target = self.lower_type(unit, ty, ctx);
                let value = self.const_value(unit, operand, ctx)?;
                if pool.is_dependent(target) {
                    return Some(Value::Dependent);
                }
                if pool.is_enum(target) {
                    return Some(value);
                }
                pool.builtin_of(target).map(|builtin| value.convert_to(builtin))
            }
            ExprKind::Construct { ty, args, .. } => {
                let target = self.lower_type(unit, ty, ctx);
                if pool.is_dependent(target) {
                    return Some(Value::Dependent);
                }
                let builtin = pool.builtin_of(target)?;
                let args: Vec<ExprId> = unit.arena().expr_list(args).to_vec();
                match args.as_slice() {
                    // `T()` and `T{}` value-initialize.
                    [] => Some(Value::Int(0).convert_to(builtin)),
                    [only] => self.const_value(unit, *only, ctx).map(|value| value.convert_to(builtin)),
                    _ => None,
                }
            }
            ExprKind::SizeofPack(name) => {
                let found = self.lookup_name(unit, name, ctx, Want::Any);
                if found.dependent {
                    return Some(Value::Dependent);
                }
                let symbol_id = *found.symbols.first()?;
                Some(self.pack_length(symbol_id, found.ctx).map_or(Value::Dependent, Value::Int))
            }
            _ => None,
        }
    }

    /// Number of elements a template or function parameter pack is bound
    /// to in `ctx`.
    fn pack_length(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Option<i64> {
        let symbol = self.session.symbol(symbol_id);
        let param = match &symbol.kind {
            SymbolKind::TemplateParam(info) if info.param.pack => info.param,
            SymbolKind::Parameter { ty, .. } => {
                let unit = self.session.unit(symbol.unit);
                let ctx = self.entity_ctx(&symbol, ctx);
                let lowered = self.lower_type(&unit, *ty, None);
                let param = *unexpanded_packs(self.pool(), lowered).first()?;
                return match self.bound_arg(ctx, param) {
                    Some(TemplateArg::Pack(elems)) => i64::try_from(elems.len()).ok(),
                    _ => None,
                };
            }
            _ => return None,
        };
        match self.bound_arg(ctx, param) {
            Some(TemplateArg::Pack(elems)) => i64::try_from(elems.len()).ok(),
            _ => None,
        }
    }

    /// Value of an enumerator, a constant variable or a non-type template
    /// parameter.
    pub(crate) fn symbol_value(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Option<Value> {
        let symbol = self.session.symbol(symbol_id);
        let ctx = self.entity_ctx(&symbol, ctx);
        let unit = self.session.unit(symbol.unit);
        match &symbol.kind {
            SymbolKind::Enumerator { parent, value, index } => {
                if let Some(value) = value {
                    return self.const_value(&unit, *value, ctx);
                }
                let Some(previous) = index.checked_sub(1) else {
                    return Some(Value::Int(0));
                };
                let sibling = self.enumerator_at(*parent, previous)?;
                let value = self.nested(None, |this| this.symbol_value(sibling, ctx))?;
                if value.is_dependent() {
                    return Some(value);
                }
                value.as_i64()?.checked_add(1).map(Value::Int)
            }
            SymbolKind::Variable { init, .. } => self.variable_value(&unit, symbol_id, *init, ctx),
            SymbolKind::Template(info) => match &info.entity {
                TemplateEntity::Variable { init, .. } => self.variable_value(&unit, symbol_id, *init, ctx),
                _ => None,
            },
            SymbolKind::TemplateParam(info) if matches!(info.kind, TemplateParamKind::NonType(_)) => {
                match self.bound_arg(ctx, info.param) {
                    Some(TemplateArg::Value(value)) => Some(value),
                    _ => Some(Value::Param(info.param)),
                }
            }
            _ => None,
        }
    }

    fn enumerator_at(&self, parent: SymbolId, index: u32) -> Option<SymbolId> {
        let enumeration = self.session.symbol(parent);
        let SymbolKind::Enum { scope, .. } = enumeration.kind else {
            return None;
        };
        let unit = self.session.unit(enumeration.unit);
        unit.scopes.get(scope).symbols().iter().copied().find(|&member| {
            matches!(
                self.session.symbol(member).kind,
                SymbolKind::Enumerator { index: at, parent: owner, .. } if at == index && owner == parent
            )
        })
    }

    fn variable_value(&mut self, unit: &Unit, symbol_id: SymbolId, init: Option<Initializer>, ctx: Ctx) -> Option<Value> {
        let pool = self.pool();
        let symbol = self.session.symbol(symbol_id);
        let ty = self.symbol_type(symbol_id, ctx);
        let constant = symbol.specifiers.contains(cxx_ir::DeclSpecifiers::CONSTEXPR)
            || pool.cv_of(ty).contains(Cv::CONST);
        if !constant {
            return None;
        }
        let init = match init? {
            Initializer::Copy(expr) => expr,
            Initializer::Direct(exprs) | Initializer::List(exprs) | Initializer::CopyList(exprs) => {
                match unit.arena().expr_list(exprs) {
                    [only] => *only,
                    _ => return None,
                }
            }
        };
        let value = self.const_value(unit, init, ctx)?;
        match pool.builtin_of(ty) {
            Some(builtin) => Some(value.convert_to(builtin)),
            None => Some(value),
        }
    }
}

fn fold_unary(op: UnaryOp, value: Value) -> Option<Value> {
    match (op, value) {
        (UnaryOp::Plus, Value::Bool(b)) => Some(Value::Int(i64::from(b))),
        (UnaryOp::Plus, _) => Some(value),
        (UnaryOp::Neg, Value::Float(bits)) => Some(Value::float(-f64::from_bits(bits))),
        (UnaryOp::Neg, _) => value.as_i64()?.checked_neg().map(Value::Int),
        (UnaryOp::Not, _) => value.as_bool().map(|b| Value::Bool(!b)),
        (UnaryOp::BitNot, Value::Int(i)) => Some(Value::Int(!i)),
        (UnaryOp::BitNot, Value::Bool(b)) => Some(Value::Int(!i64::from(b))),
        _ => None,
    }
}

fn fold_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Option<Value> {
    match op {
        BinaryOp::And => return Some(Value::Bool(lhs.as_bool()? && rhs.as_bool()?)),
        BinaryOp::Or => return Some(Value::Bool(lhs.as_bool()? || rhs.as_bool()?)),
        BinaryOp::Comma => return Some(rhs),
        _ => {}
    }
    if matches!(lhs, Value::Float(_)) || matches!(rhs, Value::Float(_)) {
        return fold_floating(op, lhs.as_f64()?, rhs.as_f64()?);
    }
    let (a, b) = (lhs.as_i64()?, rhs.as_i64()?);
    let value = match op {
        BinaryOp::Add => Value::Int(a.checked_add(b)?),
        BinaryOp::Sub => Value::Int(a.checked_sub(b)?),
        BinaryOp::Mul => Value::Int(a.checked_mul(b)?),
        BinaryOp::Div => Value::Int(a.checked_div(b)?),
        BinaryOp::Rem => Value::Int(a.checked_rem(b)?),
        BinaryOp::Shl => Value::Int(a.checked_shl(u32::try_from(b).ok()?)?),
        BinaryOp::Shr => Value::Int(a.checked_shr(u32::try_from(b).ok()?)?),
        BinaryOp::BitAnd => Value::Int(a & b),
        BinaryOp::BitOr => Value::Int(a | b),
        BinaryOp::BitXor => Value::Int(a ^ b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        _ => return None,
    };
    Some(value)
}

#[expect(clippy::float_cmp, reason = "C++ equality on constant floating values")]
fn fold_floating(op: BinaryOp, a: f64, b: f64) -> Option<Value> {
    let value = match op {
        BinaryOp::Add => Value::float(a + b),
        BinaryOp::Sub => Value::float(a - b),
        BinaryOp::Mul => Value::float(a * b),
        BinaryOp::Div if b != 0.0 => Value::float(a / b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::Le => Value::Bool(a <= b),
        BinaryOp::Ge => Value::Bool(a >= b),
        BinaryOp::Eq => Value::Bool(a == b),
        BinaryOp::Ne => Value::Bool(a != b),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests;
