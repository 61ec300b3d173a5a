//! Overload sets resolved against a target type.
//!
//! A function name used without a call (`g(f)`, `int (*p)(int) = f`) picks
//! the member of its set whose type matches the target exactly. Function
//! templates take part through deduction from the target type. A single
//! non-template match wins over templates, and among templates the most
//! specialized wins.

use cxx_types::{Idx, ParamBindings, SymbolId, TemplateArg};

use super::{CallForm, CallSet};
use crate::resolver::{ExprInfo, OverloadRef, Resolver};
use crate::session::Unit;
use crate::template::Deduction;
use crate::{Binding, Ctx};

impl Resolver<'_> {
    /// Member of `set` whose function type matches `target`, with its
    /// binding and function type.
    #[tracing::instrument(level = "debug", skip_all, fields(candidates = set.symbols.len()))]
    pub(crate) fn resolve_address(&mut self, set: &OverloadRef, target: Idx) -> Option<(Binding, Idx)> {
        let pool = self.pool();
        let wanted = pool.callable_sig(target)?;
        let wanted_ty = pool.function(&wanted.params, wanted.ret, wanted.variadic);

        let mut plain: Vec<SymbolId> = Vec::new();
        let mut templates: Vec<(SymbolId, Vec<TemplateArg>)> = Vec::new();
        for &symbol_id in set.symbols.iter() {
            let symbol = self.session.symbol(symbol_id);
            if !symbol.is_function_like() {
                continue;
            }
            let Some(info) = symbol.template_info() else {
                if set.explicit.is_none() && self.function_type(symbol_id, set.ctx) == wanted_ty {
                    plain.push(symbol_id);
                }
                continue;
            };
            let outer = self.param_ctx(&symbol, set.ctx);
            let bindings = match &set.explicit {
                Some(explicit) => match self.prefill(&symbol, explicit, outer) {
                    Some(bindings) => bindings,
                    None => continue,
                },
                None => ParamBindings::new(),
            };
            let pattern = self.signature(symbol_id, outer);
            if pattern.variadic != wanted.variadic {
                continue;
            }
            let mut deduction = Deduction::with_bindings(pool, info.depth, bindings);
            if !deduction.deduce_list(&pattern.params, &wanted.params) {
                continue;
            }
            let declared = self.declared_return(symbol_id, outer);
            if !pool.has_placeholder(declared) && !deduction.deduce(declared, wanted.ret) {
                continue;
            }
            match self.complete_args(&symbol, deduction.bindings, outer) {
                Ok(args) => templates.push((symbol_id, args)),
                Err(kind) => tracing::trace!(template = ?symbol_id, ?kind, "incomplete deduction"),
            }
        }

        match plain.as_slice() {
            [symbol] => return Some((Binding::Declaration(*symbol), wanted_ty)),
            [] => {}
            _ => {
                tracing::debug!(matches = plain.len(), "ambiguous address of overloaded function");
                return None;
            }
        }
        let (winner, args) = self.most_specialized(templates, wanted.params.len(), set.ctx)?;
        let instance = self.instantiate(winner, args, set.ctx).ok()?;
        let ty = self.function_type(winner, Some(instance));
        (ty == wanted_ty).then_some((Binding::Instance(instance), ty))
    }

    /// The unique template more specialized than every other candidate.
    fn most_specialized(
        &mut self,
        mut candidates: Vec<(SymbolId, Vec<TemplateArg>)>,
        arity: usize,
        ctx: Ctx,
    ) -> Option<(SymbolId, Vec<TemplateArg>)> {
        if candidates.is_empty() {
            return None;
        }
        let mut best = 0;
        for index in 1..candidates.len() {
            if self.more_specialized_function(candidates[index].0, candidates[best].0, arity, ctx) {
                best = index;
            }
        }
        let winner = candidates[best].0;
        for (index, &(other, _)) in candidates.iter().enumerate() {
            if index != best && !self.more_specialized_function(winner, other, arity, ctx) {
                tracing::debug!(?winner, ?other, "ambiguous address of function template");
                return None;
            }
        }
        Some(candidates.swap_remove(best))
    }

    /// Record what the overloaded-name arguments of a resolved call denote,
    /// now that their parameter types are known.
    pub(crate) fn bind_overloaded_args(
        &mut self,
        unit: &Unit,
        params: &[Idx],
        args: &[ExprInfo],
        set: &CallSet<'_>,
        ctx: Ctx,
    ) {
        if set.form != CallForm::Call {
            return;
        }
        for (arg, &param) in args.iter().zip(params) {
            let Some(overloads) = &arg.overloads else {
                continue;
            };
            if !arg.ty.is_problem() {
                continue;
            }
            let Some((binding, ty)) = self.resolve_address(overloads, param) else {
                continue;
            };
            self.record(unit.id, overloads.name, ctx, binding);
            if self.memoizing() {
                let resolved = ExprInfo {
                    ty,
                    overloads: None,
                    ..arg.clone()
                };
                self.exprs.insert((unit.id, overloads.expr, ctx), resolved);
            }
        }
    }
}
