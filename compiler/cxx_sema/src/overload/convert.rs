//! Implicit conversion sequences of call arguments.
//!
//! A standard conversion is tried first. When none exists, one
//! user-defined conversion may bridge the gap: a non-explicit converting
//! constructor of the target class, a conversion function of the source
//! class, or the conversion of a captureless closure to a function
//! pointer. The standard conversions around the user-defined one never
//! involve another user-defined conversion.

use cxx_ir::{CaptureDefault, ExprKind, SpecialMember};
use cxx_types::{ConversionSource, Cost, Idx, SymbolId, TypeData, ValueCategory};

use crate::resolver::{ExprInfo, Resolver, Want};
use crate::symbol::SymbolKind;
use crate::template::Deduction;

/// Member name conversion functions are declared under.
pub(crate) const CONVERSION_FUNCTION: &str = "operator conversion";

impl Resolver<'_> {
    /// Cost of passing `arg` to a parameter of type `param`.
    pub(crate) fn arg_cost(&mut self, arg: &ExprInfo, param: Idx) -> Cost {
        if let Some(set) = &arg.overloads {
            if arg.ty.is_problem() {
                // An unresolved function name: the parameter type picks
                // the function.
                return match self.resolve_address(set, param) {
                    Some(_) => Cost::EXACT,
                    None => Cost::NO_MATCH,
                };
            }
        }
        let source = ConversionSource::new(arg.ty, arg.category).with_null_constant(arg.null_constant);
        let cost = self.conversion(source, param);
        if cost.is_viable() {
            return cost;
        }
        self.user_conversion(source, param)
    }

    /// Best user-defined conversion sequence from `source` to `target`.
    pub(crate) fn user_conversion(&mut self, source: ConversionSource, target: Idx) -> Cost {
        let pool = self.pool();
        if pool.has_problem(source.ty) || pool.has_problem(target) {
            return Cost::NO_MATCH;
        }
        let mut best: Option<Cost> = None;
        let target_class = pool.strip_ref_cv(target);
        if pool.is_class_like(target_class) {
            for cost in self.constructor_conversions(source, target_class, target) {
                keep_better(&mut best, cost);
            }
        }
        let source_class = pool.strip_ref_cv(source.ty);
        if pool.is_class_like(source_class) {
            for cost in self.conversion_functions(source_class, target) {
                keep_better(&mut best, cost);
            }
            if let Some(call) = self.closure_to_pointer(source_class, target) {
                keep_better(&mut best, Cost::user_defined(call, Cost::EXACT));
            }
        }
        best.unwrap_or(Cost::NO_MATCH)
    }

    /// Conversions through the non-explicit constructors of `class` callable
    /// with one argument.
    fn constructor_conversions(&mut self, source: ConversionSource, class: Idx, target: Idx) -> Vec<Cost> {
        let Some(scope) = self.member_scope_of(class) else {
            return Vec::new();
        };
        let unit = self.session.unit(scope.unit);
        let members = unit.scopes.get(scope.scope).symbols().to_vec();
        let mut out = Vec::new();
        for member in members {
            let symbol = self.session.symbol(member);
            // Constructor templates do not take part in implicit conversions.
            if symbol.is_template()
                || symbol.function_info().map(|info| info.special) != Some(SpecialMember::Constructor)
            {
                continue;
            }
            let signature = self.signature(member, scope.ctx);
            let Some(&first) = signature.params.first() else {
                continue;
            };
            if signature.explicit || signature.required > 1 {
                continue;
            }
            if !self.conversion(source, first).is_viable() {
                continue;
            }
            let second = self.conversion(ConversionSource::prvalue(class), target);
            if second.is_viable() {
                out.push(Cost::user_defined(member, second));
            }
        }
        out
    }

    /// Conversions through the conversion functions of `class` and its bases.
    fn conversion_functions(&mut self, class: Idx, target: Idx) -> Vec<Cost> {
        let pool = self.pool();
        let name = self.session.interner().intern(CONVERSION_FUNCTION);
        let found = self.member_lookup(class, name, Want::Any);
        let mut out = Vec::new();
        for &function in &found.symbols {
            let symbol = self.session.symbol(function);
            if symbol.is_template() || symbol.specifiers.contains(cxx_ir::DeclSpecifiers::EXPLICIT) {
                continue;
            }
            let ret = self.return_type(function, found.ctx);
            let category = if pool.is_lvalue_ref(ret) {
                ValueCategory::LValue
            } else if pool.is_rvalue_ref(ret) {
                ValueCategory::XValue
            } else {
                ValueCategory::PRValue
            };
            let second = self.conversion(ConversionSource::new(pool.strip_ref(ret), category), target);
            if second.is_viable() {
                out.push(Cost::user_defined(function, second));
            }
        }
        out
    }

    /// Call operator of a captureless closure converting to the function
    /// pointer `target`; a generic lambda's operator is deduced from it.
    pub(crate) fn closure_to_pointer(&mut self, closure_ty: Idx, target: Idx) -> Option<SymbolId> {
        let pool = self.pool();
        let TypeData::Closure(closure) = pool.get(pool.strip_cv(closure_ty)) else {
            return None;
        };
        let wanted = pool.pointee(pool.strip_ref_cv(target)).and_then(|pointee| pool.function_sig(pointee))?;
        let wanted_ty = pool.function(&wanted.params, wanted.ret, wanted.variadic);
        let symbol = self.session.symbol(closure);
        let SymbolKind::Closure { lambda, call } = symbol.kind else {
            return None;
        };
        let unit = self.session.unit(symbol.unit);
        let ExprKind::Lambda(expr) = &unit.arena().expr(lambda).kind else {
            return None;
        };
        if !unit.arena().captures(expr.captures).is_empty() || expr.default_capture != CaptureDefault::None {
            return None;
        }

        let call_symbol = self.session.symbol(call);
        let Some(info) = call_symbol.template_info() else {
            return (self.function_type(call, symbol.ctx) == wanted_ty).then_some(call);
        };
        let pattern = self.signature(call, symbol.ctx);
        let mut deduction = Deduction::new(pool, info.depth);
        if !deduction.deduce_list(&pattern.params, &wanted.params) {
            return None;
        }
        let args = self.complete_args(&call_symbol, deduction.bindings, symbol.ctx).ok()?;
        let instance = self.instantiate(call, args, symbol.ctx).ok()?;
        (self.function_type(call, Some(instance)) == wanted_ty).then_some(call)
    }
}

fn keep_better(best: &mut Option<Cost>, cost: Cost) {
    match best {
        Some(current) if cost.compare(current) != std::cmp::Ordering::Less => {}
        _ => *best = Some(cost),
    }
}
