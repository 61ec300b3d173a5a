//! Structural template argument deduction.
//!
//! Matches a parameter pattern `P` against an argument `A`, binding the
//! template parameters of one parameter list (`depth`). Parameters of other
//! lists, including the synthesized ones of partial ordering, only match
//! themselves.
//!
//! # Design
//!
//! - Flag-gated fast path: a non-dependent pattern is compared by handle
//! - A parameter deduced twice must deduce the same argument
//! - A trailing pack expansion absorbs the remaining arguments, one
//!   deduction per element; an empty pack is valid
//! - Members of dependent types are non-deduced contexts

use std::sync::Arc;

use cxx_types::subst::unexpanded_packs;
use cxx_types::{Idx, ParamBindings, ParamRef, TemplateArg, TypeData, TypePool, Value, ValueCategory};
use smallvec::SmallVec;

/// An argument of a call as seen by deduction.
#[derive(Copy, Clone, Debug)]
pub(crate) struct CallArg {
    /// Type of the argument expression; `None` for an overload set, which
    /// is a non-deduced context.
    pub ty: Option<Idx>,
    pub category: ValueCategory,
}

/// Deduction of the parameters of one template parameter list.
pub(crate) struct Deduction<'p> {
    pool: &'p TypePool,
    depth: u16,
    pub bindings: ParamBindings,
}

impl<'p> Deduction<'p> {
    pub(crate) fn new(pool: &'p TypePool, depth: u16) -> Self {
        Self::with_bindings(pool, depth, ParamBindings::new())
    }

    /// Deduction starting from explicitly specified arguments.
    pub(crate) fn with_bindings(pool: &'p TypePool, depth: u16, bindings: ParamBindings) -> Self {
        Deduction {
            pool,
            depth,
            bindings,
        }
    }

    #[inline]
    fn deducible(&self, param: ParamRef) -> bool {
        param.depth == self.depth
    }

    fn bind(&mut self, param: ParamRef, arg: TemplateArg) -> bool {
        if let TemplateArg::Type(ty) = &arg {
            if self.pool.has_problem(*ty) {
                return false;
            }
            if !param.pack && matches!(self.pool.get(*ty), TypeData::PackExpansion(_)) {
                return false;
            }
        }
        match self.bindings.get(param) {
            Some(existing) => *existing == arg,
            None => {
                self.bindings.insert(param, arg);
                true
            }
        }
    }

    /// Deduce from `p` against `a`; false on a mismatch or an inconsistent
    /// binding.
    pub(crate) fn deduce(&mut self, p: Idx, a: Idx) -> bool {
        let pool = self.pool;
        if !pool.is_dependent(p) {
            return p == a;
        }
        match pool.get(p) {
            TypeData::TemplateParam(param) if self.deducible(param) => {
                self.bind(param, TemplateArg::Type(a))
            }
            TypeData::Pointer(pi) => match pool.get(a) {
                TypeData::Pointer(ai) => self.deduce(pi, ai),
                _ => false,
            },
            TypeData::LValueRef(pi) => match pool.get(a) {
                TypeData::LValueRef(ai) => self.deduce(pi, ai),
                _ => false,
            },
            TypeData::RValueRef(pi) => match pool.get(a) {
                TypeData::RValueRef(ai) => self.deduce(pi, ai),
                _ => false,
            },
            TypeData::Qualified { inner, cv } => {
                let (base, a_cv) = pool.split_cv(a);
                if !a_cv.is_at_least(cv) {
                    return false;
                }
                let rest = pool.qualified(base, a_cv - cv);
                self.deduce(inner, rest)
            }
            TypeData::Array { elem, len } => match pool.get(a) {
                TypeData::Array {
                    elem: a_elem,
                    len: a_len,
                } => len == a_len && self.deduce(elem, a_elem),
                _ => false,
            },
            TypeData::Function(sig) => match pool.get(a) {
                TypeData::Function(a_sig) => {
                    sig.variadic == a_sig.variadic
                        && self.deduce_list(&sig.params, &a_sig.params)
                        && self.deduce(sig.ret, a_sig.ret)
                }
                _ => false,
            },
            TypeData::Specialization { template, args } => match pool.get(a) {
                TypeData::Specialization {
                    template: a_template,
                    args: a_args,
                } => template == a_template && self.deduce_args(&args, &a_args),
                _ => false,
            },
            TypeData::ParamSpecialization { param, args } => match pool.get(a) {
                TypeData::Specialization {
                    template,
                    args: a_args,
                } => {
                    let bound = !self.deducible(param)
                        || self.bind(param, TemplateArg::Template(template));
                    bound && self.deduce_args(&args, &a_args)
                }
                _ => false,
            },
            // Non-deduced context.
            TypeData::DependentMember { .. } | TypeData::Dependent => true,
            _ => p == a,
        }
    }

    /// Deduce a parameter type list against an argument type list.
    pub(crate) fn deduce_list(&mut self, ps: &[Idx], args: &[Idx]) -> bool {
        for (i, &p) in ps.iter().enumerate() {
            if let TypeData::PackExpansion(pattern) = self.pool.get(p) {
                if i + 1 != ps.len() {
                    // A pack not at the end is not deduced.
                    return true;
                }
                let rest: Vec<TemplateArg> = args
                    .get(i..)
                    .unwrap_or_default()
                    .iter()
                    .map(|&a| TemplateArg::Type(a))
                    .collect();
                return self.deduce_pack(pattern, &rest);
            }
            match args.get(i) {
                Some(&a) if self.deduce(p, a) => {}
                _ => return false,
            }
        }
        ps.len() == args.len()
    }

    /// Deduce a template argument list pattern against concrete arguments.
    pub(crate) fn deduce_args(&mut self, ps: &[TemplateArg], args: &[TemplateArg]) -> bool {
        for (i, p) in ps.iter().enumerate() {
            let trailing = i + 1 == ps.len();
            let ok = match p {
                TemplateArg::Type(pt) => match self.pool.get(*pt) {
                    TypeData::PackExpansion(pattern) if trailing => {
                        return self.deduce_pack(pattern, args.get(i..).unwrap_or_default());
                    }
                    TypeData::TemplateParam(param) if self.deducible(param) => match args.get(i) {
                        Some(arg @ (TemplateArg::Type(_) | TemplateArg::Template(_))) => {
                            self.bind(param, arg.clone())
                        }
                        _ => false,
                    },
                    _ => match args.get(i) {
                        Some(TemplateArg::Type(at)) => self.deduce(*pt, *at),
                        _ => false,
                    },
                },
                TemplateArg::Value(Value::Param(param)) if param.pack && trailing && self.deducible(*param) => {
                    let rest: Arc<[TemplateArg]> = args.get(i..).unwrap_or_default().into();
                    return self.bind(*param, TemplateArg::Pack(rest));
                }
                TemplateArg::Value(Value::Param(param)) if self.deducible(*param) => match args.get(i) {
                    Some(TemplateArg::Value(value)) => self.bind(*param, TemplateArg::Value(*value)),
                    _ => false,
                },
                TemplateArg::Value(Value::Dependent) => args.get(i).is_some(),
                TemplateArg::Pack(elems) => match args.get(i) {
                    Some(TemplateArg::Pack(a_elems)) => self.deduce_args(elems, a_elems),
                    _ => false,
                },
                TemplateArg::Value(_) | TemplateArg::Template(_) => args.get(i) == Some(p),
            };
            if !ok {
                return false;
            }
        }
        ps.len() == args.len()
    }

    /// Deduce the packs of `pattern` from each of `args` in turn.
    fn deduce_pack(&mut self, pattern: Idx, args: &[TemplateArg]) -> bool {
        let mut elems = Vec::with_capacity(args.len());
        for arg in args {
            let TemplateArg::Type(a) = arg else {
                return false;
            };
            elems.push((pattern, *a));
        }
        self.deduce_pack_elems(pattern, &elems)
    }

    /// Bind every pack of `pattern` to the arguments each `(P, A)` element
    /// deduces for it. `P` is `pattern` after per-element adjustment.
    fn deduce_pack_elems(&mut self, pattern: Idx, elems: &[(Idx, Idx)]) -> bool {
        let packs: SmallVec<[ParamRef; 2]> = unexpanded_packs(self.pool, pattern)
            .into_iter()
            .filter(|&param| self.deducible(param))
            .collect();
        if packs.iter().any(|&param| self.bindings.contains(param)) {
            // Explicitly specified; checked by conversion after substitution.
            return true;
        }
        let mut deduced: Vec<Vec<TemplateArg>> = vec![Vec::with_capacity(elems.len()); packs.len()];
        for &(p, a) in elems {
            let mut element = Deduction::with_bindings(self.pool, self.depth, self.bindings.clone());
            if !element.deduce(p, a) {
                return false;
            }
            for (slot, &param) in deduced.iter_mut().zip(&packs) {
                match element.bindings.get(param) {
                    Some(bound) => slot.push(bound.clone()),
                    None => return false,
                }
            }
        }
        packs
            .iter()
            .zip(deduced)
            .all(|(&param, args)| self.bind(param, TemplateArg::Pack(args.into())))
    }

    /// Deduce from a function call: `P` against the type of each argument,
    /// with the adjustments of deduction from a call.
    pub(crate) fn deduce_call(&mut self, params: &[Idx], args: &[CallArg]) -> bool {
        for (i, &p) in params.iter().enumerate() {
            if let TypeData::PackExpansion(pattern) = self.pool.get(p) {
                if i + 1 != params.len() {
                    return true;
                }
                return self.deduce_call_pack(pattern, args.get(i..).unwrap_or_default());
            }
            let Some(arg) = args.get(i) else {
                // Missing arguments take defaults; nothing to deduce.
                return true;
            };
            if !self.deduce_call_arg(p, *arg) {
                return false;
            }
        }
        true
    }

    fn deduce_call_pack(&mut self, pattern: Idx, args: &[CallArg]) -> bool {
        let mut elems = Vec::with_capacity(args.len());
        for arg in args {
            let Some(ty) = arg.ty else {
                return false;
            };
            elems.push(self.call_adjust(pattern, ty, arg.category));
        }
        self.deduce_pack_elems(pattern, &elems)
    }

    fn deduce_call_arg(&mut self, p: Idx, arg: CallArg) -> bool {
        let Some(ty) = arg.ty else {
            return true;
        };
        if !self.pool.is_dependent(p) {
            return true;
        }
        let (p, a) = self.call_adjust(p, ty, arg.category);
        self.deduce(p, a)
    }

    /// `P`/`A` adjustments: references are stripped from `P`; a forwarding
    /// reference deduces an lvalue reference from an lvalue; a non-reference
    /// `P` deduces from the decayed, unqualified argument.
    fn call_adjust(&self, p: Idx, a: Idx, category: ValueCategory) -> (Idx, Idx) {
        let pool = self.pool;
        let a = pool.strip_ref(a);
        if pool.is_reference(p) {
            let inner = pool.strip_ref(p);
            let forwarding = pool.is_rvalue_ref(p)
                && matches!(pool.get(inner), TypeData::TemplateParam(param) if self.deducible(param));
            if forwarding && category.is_lvalue() {
                return (inner, pool.lvalue_ref(a));
            }
            // The referred type may be more qualified than the argument.
            let (p_base, p_cv) = pool.split_cv(inner);
            let (a_base, a_cv) = pool.split_cv(a);
            return (p_base, pool.qualified(a_base, a_cv - p_cv));
        }
        (pool.strip_cv(p), pool.decay(a))
    }
}

#[cfg(test)]
mod tests;
