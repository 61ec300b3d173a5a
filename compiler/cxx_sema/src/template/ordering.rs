//! Partial ordering of templates.
//!
//! `A` is at least as specialized as `B` when `B`'s pattern deduces from
//! `A`'s pattern with every parameter of `A` replaced by a unique
//! synthesized type or value. `A` is more specialized than `B` when that
//! holds one way only.

use cxx_types::subst::{subst_args, subst_list};
use cxx_types::{Idx, ParamBindings, SymbolId, TypeData};

use super::{synthesized, Deduction};
use crate::resolver::Resolver;
use crate::Ctx;

impl Resolver<'_> {
    /// Class template partial specialization `a` is more specialized than `b`.
    pub(crate) fn more_specialized_class(&mut self, a: SymbolId, b: SymbolId) -> bool {
        self.class_at_least(a, b) && !self.class_at_least(b, a)
    }

    fn class_at_least(&mut self, a: SymbolId, b: SymbolId) -> bool {
        let pool = self.pool();
        let mut synth = self.synthesize(a);
        let a_args = self.pattern_args(a);
        let a_args = subst_args(pool, &a_args, &mut synth);
        let b_args = self.pattern_args(b);
        let Some(depth) = self.session.symbol(b).template_info().map(|info| info.depth) else {
            return false;
        };
        Deduction::new(pool, depth).deduce_args(&b_args, &a_args)
    }

    /// Function template `a` is more specialized than `b` for a call with
    /// `arity` arguments.
    pub(crate) fn more_specialized_function(&mut self, a: SymbolId, b: SymbolId, arity: usize, ctx: Ctx) -> bool {
        self.function_at_least(a, b, arity, ctx) && !self.function_at_least(b, a, arity, ctx)
    }

    fn function_at_least(&mut self, a: SymbolId, b: SymbolId, arity: usize, ctx: Ctx) -> bool {
        let pool = self.pool();
        let mut synth = self.synthesize(a);
        let a_params = self.ordering_params(a, arity, ctx);
        let a_params = subst_list(pool, &a_params, &mut synth);
        let b_params = self.ordering_params(b, arity, ctx);
        let Some(depth) = self.session.symbol(b).template_info().map(|info| info.depth) else {
            return false;
        };
        let mut deduction = Deduction::new(pool, depth);
        deduction.deduce_list(&b_params, &a_params)
    }

    /// Parameter types taking part in ordering: those with an argument,
    /// without references and top-level cv-qualifiers.
    fn ordering_params(&mut self, function: SymbolId, arity: usize, ctx: Ctx) -> Vec<Idx> {
        let pool = self.pool();
        let signature = self.signature(function, ctx);
        let mut params = Vec::with_capacity(signature.params.len().min(arity + 1));
        for &param in signature.params.iter() {
            if let TypeData::PackExpansion(pattern) = pool.get(param) {
                params.push(pool.pack_expansion(pool.strip_ref_cv(pattern)));
                break;
            }
            if params.len() == arity {
                break;
            }
            params.push(pool.strip_ref_cv(param));
        }
        params
    }

    /// Bindings replacing every parameter of `template` by its synthesized
    /// stand-in.
    pub(crate) fn synthesize(&self, template: SymbolId) -> ParamBindings {
        let pool = self.pool();
        let mut bindings = ParamBindings::new();
        let symbol = self.session.symbol(template);
        if let Some(info) = symbol.template_info() {
            for param in info.params.iter() {
                bindings.insert(param.param, synthesized(pool, param));
            }
        }
        bindings
    }
}
