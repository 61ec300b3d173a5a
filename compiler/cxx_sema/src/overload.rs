//! Overload resolution.
//!
//! Ranks the viable candidates of a call by the implicit conversion
//! sequence of each argument. A candidate is better than another when none
//! of its conversions is worse and at least one is better; ties prefer a
//! non-template, then the more specialized template. Function templates
//! take part through deduction from the call arguments, and only the
//! winner is instantiated.
//!
//! # Arguments
//!
//! The implicit object argument of a member call is ranked like any other
//! argument. For operator expressions the left operand is the object of
//! member candidates and the first argument of the others, so every
//! candidate is ranked on the same operand positions.

mod convert;
mod target;

use std::cmp::Ordering;

use cxx_diagnostic::ProblemKind;
use cxx_ir::{DeclKind, DeclSpecifiers, ExprKind, SpecialMember, TemplateParamKind};
use cxx_types::{Cost, Idx, ParamBindings, SymbolId, TemplateArg, ValueCategory};

use crate::resolver::{ExprInfo, Resolver};
use crate::session::Unit;
use crate::symbol::{Symbol, SymbolKind, TemplateEntity};
use crate::template::{CallArg, Deduction};
use crate::{Binding, Ctx};

/// Declared parameters and properties of a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Signature {
    /// Adjusted parameter types; packs expanded where bound.
    pub params: Vec<Idx>,
    /// Leading parameters without a default argument.
    pub required: usize,
    pub variadic: bool,
    /// Class of a member function or call operator.
    pub class: Option<SymbolId>,
    pub is_static: bool,
    pub is_const: bool,
    pub special: SpecialMember,
    pub explicit: bool,
}

impl Signature {
    fn empty() -> Self {
        Signature {
            params: Vec::new(),
            required: 0,
            variadic: false,
            class: None,
            is_static: false,
            is_const: false,
            special: SpecialMember::None,
            explicit: false,
        }
    }

    /// Takes an implicit object argument.
    pub fn is_member(&self) -> bool {
        self.class.is_some() && !self.is_static && self.special != SpecialMember::Constructor
    }
}

/// The object expression of a member call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ObjectArg {
    pub ty: Idx,
    pub category: ValueCategory,
}

/// How the arguments of a call map to candidate parameters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum CallForm {
    /// `f(args)` or `obj.f(args)`.
    Call,
    /// Operator expression: the first argument is the object of member
    /// candidates.
    Operator,
}

/// A function set to resolve a call against.
#[derive(Clone, Debug)]
pub(crate) struct CallSet<'a> {
    pub candidates: &'a [SymbolId],
    /// Context the candidates were found in.
    pub ctx: Ctx,
    pub explicit: Option<&'a [TemplateArg]>,
    pub object: Option<ObjectArg>,
    pub form: CallForm,
}

/// Winner of overload resolution.
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    pub symbol: SymbolId,
    pub binding: Binding,
    /// Function type of the selected function or instance.
    pub ty: Idx,
    /// Context the selected function is evaluated in.
    pub ctx: Ctx,
}

#[derive(Clone, Debug)]
struct Candidate {
    symbol: SymbolId,
    params: Vec<Idx>,
    /// Deduced template arguments of a function template.
    template_args: Option<Vec<TemplateArg>>,
    /// One cost per ranked operand position.
    costs: Vec<Cost>,
}

impl Resolver<'_> {
    /// Parameters and properties of a function, call operator or function
    /// template in `ctx`.
    pub(crate) fn signature(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Signature {
        let symbol = self.session.symbol(symbol_id);
        let ctx = self.entity_ctx(&symbol, ctx);
        let unit = self.session.unit(symbol.unit);
        let arena = unit.arena();
        let mut signature = Signature::empty();
        signature.is_static = symbol.is_static();
        signature.explicit = symbol.specifiers.contains(DeclSpecifiers::EXPLICIT);
        let written = match &symbol.kind {
            SymbolKind::Function(info)
            | SymbolKind::Template(crate::symbol::TemplateInfo {
                entity: TemplateEntity::Function(info),
                ..
            }) => {
                signature.class = info.class;
                signature.special = info.special;
                let decl = match symbol.template_info() {
                    Some(template) => template.inner,
                    None => symbol.decl,
                };
                let Some(DeclKind::Function(function)) = decl.map(|decl| &arena.decl(decl).kind) else {
                    return signature;
                };
                signature.variadic = function.variadic;
                signature.is_const = function.is_const;
                arena.params(function.params).to_vec()
            }
            SymbolKind::CallOperator { lambda, closure }
            | SymbolKind::Template(crate::symbol::TemplateInfo {
                entity: TemplateEntity::CallOperator { lambda, closure },
                ..
            }) => {
                signature.class = Some(*closure);
                let ExprKind::Lambda(lambda) = &arena.expr(*lambda).kind else {
                    return signature;
                };
                signature.is_const = !lambda.mutable;
                arena.params(lambda.params).to_vec()
            }
            _ => return signature,
        };

        let pool = self.pool();
        let mut defaults_started = false;
        for param in &written {
            let lowered = self.lower_type(&unit, param.ty, ctx);
            let expanded = match ctx {
                Some(_) => self.subst_list_with(&[lowered], ctx, None),
                None => vec![lowered],
            };
            for ty in expanded {
                let unexpanded = matches!(pool.get(ty), cxx_types::TypeData::PackExpansion(_));
                if param.default.is_some() || unexpanded {
                    defaults_started = true;
                }
                if !defaults_started {
                    signature.required += 1;
                }
                signature.params.push(pool.adjust_param(ty));
            }
        }
        signature
    }

    /// Select the best viable candidate of `set` for `args`.
    #[tracing::instrument(level = "debug", skip_all, fields(candidates = set.candidates.len(), args = args.len()))]
    pub(crate) fn resolve_call(
        &mut self,
        unit: &Unit,
        set: &CallSet<'_>,
        args: &[ExprInfo],
        ctx: Ctx,
    ) -> Result<Resolved, ProblemKind> {
        let mut viable: Vec<Candidate> = Vec::new();
        for &symbol in set.candidates {
            if self.is_cancelled() {
                return Err(ProblemKind::Cancelled);
            }
            if let Some(candidate) = self.candidate(symbol, set, args) {
                viable.push(candidate);
            }
        }
        if viable.is_empty() {
            tracing::debug!("no viable candidate");
            return Err(ProblemKind::NoViableCandidate);
        }

        let arity = args.len();
        let mut best = 0;
        for index in 1..viable.len() {
            if self.better(&viable[index], &viable[best], arity, set.ctx) {
                best = index;
            }
        }
        for index in 0..viable.len() {
            if index != best && !self.better(&viable[best], &viable[index], arity, set.ctx) {
                tracing::debug!(
                    first = ?viable[best].symbol,
                    second = ?viable[index].symbol,
                    "ambiguous call"
                );
                return Err(ProblemKind::Ambiguous);
            }
        }
        let winner = viable.swap_remove(best);
        self.bind_overloaded_args(unit, &winner.params, args, set, ctx);
        self.finish_candidate(winner, set.ctx)
    }

    /// Viability and costs of one candidate.
    fn candidate(&mut self, symbol_id: SymbolId, set: &CallSet<'_>, args: &[ExprInfo]) -> Option<Candidate> {
        let symbol = self.session.symbol(symbol_id);
        if !symbol.is_function_like() {
            return None;
        }
        let is_template = symbol.is_template();
        let (signature, template_args) = if is_template {
            self.deduce_candidate(symbol_id, &symbol, set, args)?
        } else {
            if set.explicit.is_some() {
                return None;
            }
            (self.signature(symbol_id, set.ctx), None)
        };

        let member = signature.is_member();
        let (object, operands): (Option<ObjectArg>, &[ExprInfo]) = match set.form {
            CallForm::Operator if member => {
                let (first, rest) = args.split_first()?;
                (Some(ObjectArg { ty: first.ty, category: first.category }), rest)
            }
            CallForm::Operator => (None, args),
            CallForm::Call => (set.object, args),
        };
        if operands.len() < signature.required
            || (operands.len() > signature.params.len() && !signature.variadic)
        {
            return None;
        }

        let mut costs = Vec::with_capacity(args.len() + 1);
        if let Some(object) = object {
            let cost = if member {
                self.object_cost(&signature, object, set.ctx)
            } else {
                Cost::EXACT
            };
            if !cost.is_viable() {
                return None;
            }
            costs.push(cost);
        }
        for (index, arg) in operands.iter().enumerate() {
            let cost = match signature.params.get(index) {
                Some(&param) => self.arg_cost(arg, param),
                None => Cost::ELLIPSIS,
            };
            if !cost.is_viable() {
                return None;
            }
            costs.push(cost);
        }
        Some(Candidate {
            symbol: symbol_id,
            params: signature.params,
            template_args,
            costs,
        })
    }

    /// Deduce a function template candidate's arguments from the call and
    /// substitute them into its signature.
    fn deduce_candidate(
        &mut self,
        symbol_id: SymbolId,
        symbol: &Symbol,
        set: &CallSet<'_>,
        args: &[ExprInfo],
    ) -> Option<(Signature, Option<Vec<TemplateArg>>)> {
        let info = symbol.template_info()?;
        let outer = self.param_ctx(symbol, set.ctx);
        let pattern = self.signature(symbol_id, outer);
        let bindings = match set.explicit {
            Some(explicit) => self.prefill(symbol, explicit, outer)?,
            None => ParamBindings::new(),
        };
        let operands = match set.form {
            CallForm::Operator if pattern.is_member() => args.get(1..)?,
            _ => args,
        };
        let call_args: Vec<CallArg> = operands.iter().map(ExprInfo::call_arg).collect();
        // Explicit arguments are substituted first; their parameters take
        // part in deduction only through conversion.
        let deduced_from = if bindings.is_empty() {
            pattern.params.clone()
        } else {
            let params = self.subst_list_with(&pattern.params, outer, Some(&bindings));
            if params.iter().any(|&param| self.pool().has_problem(param)) {
                return None;
            }
            params
        };
        let mut deduction = Deduction::with_bindings(self.pool(), info.depth, bindings);
        if !deduction.deduce_call(&deduced_from, &call_args) {
            tracing::trace!(template = ?symbol_id, "deduction failed");
            return None;
        }
        let template_args = self.complete_args(symbol, deduction.bindings, outer).ok()?;
        let mut bindings = ParamBindings::new();
        for (param, arg) in info.params.iter().zip(&template_args) {
            bindings.insert(param.param, arg.clone());
        }
        let params = self.subst_list_with(&pattern.params, outer, Some(&bindings));
        let pool = self.pool();
        if params.iter().any(|&param| pool.has_problem(param)) {
            return None;
        }
        let params = params.into_iter().map(|param| pool.adjust_param(param)).collect();
        Some((Signature { params, ..pattern }, Some(template_args)))
    }

    /// Bindings of explicitly specified template arguments.
    pub(crate) fn prefill(&mut self, symbol: &Symbol, explicit: &[TemplateArg], ctx: Ctx) -> Option<ParamBindings> {
        let info = symbol.template_info()?;
        let mut bindings = ParamBindings::new();
        let mut explicit = explicit.iter().cloned();
        for param in info.params.iter() {
            if param.param.pack {
                let rest: Vec<TemplateArg> = explicit.by_ref().collect();
                if !rest.is_empty() {
                    bindings.insert(param.param, TemplateArg::Pack(rest.into()));
                }
                break;
            }
            let Some(arg) = explicit.next() else {
                break;
            };
            let arg = self.coerce_arg(symbol, param, arg, ctx);
            let kind_matches = match (&param.kind, &arg) {
                (TemplateParamKind::NonType(_), TemplateArg::Value(_))
                | (TemplateParamKind::Type, TemplateArg::Type(_))
                | (TemplateParamKind::Template(_), TemplateArg::Template(_)) => true,
                _ => false,
            };
            if !kind_matches {
                return None;
            }
            bindings.insert(param.param, arg);
        }
        if explicit.next().is_some() {
            return None;
        }
        Some(bindings)
    }

    /// Implicit object argument: the object must be the member's class or
    /// derived from it, and a non-const member needs a non-const object.
    fn object_cost(&mut self, signature: &Signature, object: ObjectArg, ctx: Ctx) -> Cost {
        let Some(class) = signature.class else {
            return Cost::EXACT;
        };
        let pool = self.pool();
        let class_ty = self.class_type(class, ctx);
        let (object_base, object_cv) = pool.split_cv(pool.strip_ref(object.ty));
        if pool.is_dependent(object_base) || pool.is_dependent(class_ty) {
            return Cost::EXACT;
        }
        let Some(depth) = self.base_distance(object_base, class_ty) else {
            return Cost::NO_MATCH;
        };
        if !signature.is_const && !object_cv.is_empty() {
            return Cost::NO_MATCH;
        }
        let added = u8::from(signature.is_const && object_cv.is_empty());
        Cost::EXACT.with_qualification(added).with_inheritance(depth)
    }

    /// `a` is a better candidate than `b`.
    fn better(&mut self, a: &Candidate, b: &Candidate, arity: usize, ctx: Ctx) -> bool {
        let mut strictly = false;
        for (ca, cb) in a.costs.iter().zip(&b.costs) {
            match ca.compare(cb) {
                Ordering::Greater => return false,
                Ordering::Less => strictly = true,
                Ordering::Equal => {}
            }
        }
        if strictly {
            return true;
        }
        match (&a.template_args, &b.template_args) {
            (None, Some(_)) => self.session.config().prefer_non_templates,
            (Some(_), Some(_)) => self.more_specialized_function(a.symbol, b.symbol, arity, ctx),
            _ => false,
        }
    }

    /// Binding, type and context of the winner; instantiates a template.
    fn finish_candidate(&mut self, winner: Candidate, ctx: Ctx) -> Result<Resolved, ProblemKind> {
        let (binding, fn_ctx) = match winner.template_args {
            Some(args) => {
                let instance = self.instantiate(winner.symbol, args, ctx)?;
                (Binding::Instance(instance), Some(instance))
            }
            None => (Binding::Declaration(winner.symbol), ctx),
        };
        let ty = self.function_type(winner.symbol, fn_ctx);
        tracing::debug!(symbol = ?winner.symbol, "call resolved");
        Ok(Resolved {
            symbol: winner.symbol,
            binding,
            ty,
            ctx: fn_ctx,
        })
    }
}

impl ExprInfo {
    /// The argument as seen by template deduction.
    pub(crate) fn call_arg(&self) -> CallArg {
        let unresolved_set = self.overloads.is_some() && self.ty.is_problem();
        CallArg {
            ty: (!unresolved_set).then_some(self.ty),
            category: self.category,
        }
    }
}

#[cfg(test)]
mod tests;
