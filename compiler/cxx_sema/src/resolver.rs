//! Resolution façade.
//!
//! A [`Resolver`] answers queries about the units of one session: the
//! binding of a name node, the type of an expression, definitions and
//! references of a binding, instances of a template and constant initial
//! values.
//!
//! Everything is computed on demand. Bindings, expression results, lowered
//! types and symbol types are memoized per resolver and per instantiation
//! context; template instances are shared by every resolver of the session
//! through the single-flight instantiation cache.
//!
//! While a return type is being deduced, intermediate results may rest on
//! a tentative type. Nothing is memoized until the outermost deduction
//! finishes.

mod const_eval;
mod expr;
mod hierarchy;
mod lookup;
mod operators;
mod types;

use cxx_diagnostic::{Problem, ProblemKind};
use cxx_ir::{ExprId, NameId, Span, TypeExprId};
use cxx_types::{Idx, ParamBindings, ParamRef, SubstEnv, SymbolId, TemplateArg, TypePool, Value};
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) use expr::{ExprInfo, OverloadRef};
pub(crate) use lookup::{Found, Want};

use crate::cache::CacheKey;
use crate::deduce::ReturnState;
use crate::session::{AnalysisSession, NameSite, Unit};
use crate::symbol::Symbol;
use crate::{Binding, CancellationToken, Ctx, InstanceId, UnitId};

/// A name node of some unit.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NameRef {
    pub unit: UnitId,
    pub name: NameId,
}

/// Every binding and expression type of one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitResolution {
    pub unit: UnitId,
    /// One entry per name node, in arena order.
    pub bindings: Vec<(NameId, Binding)>,
    /// One entry per expression, in arena order.
    pub types: Vec<(ExprId, Idx)>,
}

impl UnitResolution {
    pub fn problems(&self) -> impl Iterator<Item = (NameId, &Problem)> + '_ {
        self.bindings.iter().filter_map(|(name, binding)| match binding {
            Binding::Problem(problem) => Some((*name, problem)),
            _ => None,
        })
    }
}

/// Query engine over one session.
///
/// Cheap to create; hold one per request or per worker thread.
pub struct Resolver<'s> {
    pub(crate) session: &'s AnalysisSession,
    cancel: CancellationToken,
    pub(crate) names: FxHashMap<(UnitId, NameId, Ctx), Binding>,
    pub(crate) exprs: FxHashMap<(UnitId, ExprId, Ctx), ExprInfo>,
    pub(crate) types: FxHashMap<(UnitId, TypeExprId, Ctx), Idx>,
    pub(crate) symbol_types: FxHashMap<(SymbolId, Ctx), Idx>,
    /// Symbols whose type is being computed; guards `auto x = x;`.
    pub(crate) evaluating: FxHashSet<(SymbolId, Ctx)>,
    pub(crate) returns: FxHashMap<(SymbolId, Ctx), ReturnState>,
    /// Instantiations on this thread's stack.
    pub(crate) active: FxHashSet<CacheKey>,
    /// Using-declarations and using-directives being followed.
    pub(crate) expanding: FxHashSet<(UnitId, NameId)>,
    /// Nesting of instantiations and default-argument normalizations.
    pub(crate) depth: u32,
    /// Nesting of expression evaluations and deductions.
    pub(crate) eval_depth: u32,
    /// Return deductions in progress.
    pub(crate) in_progress: u32,
    /// In-progress return deductions consulted since the innermost
    /// deduction started.
    pub(crate) hits: Vec<(SymbolId, Ctx)>,
}

impl<'s> Resolver<'s> {
    pub(crate) fn new(session: &'s AnalysisSession, cancel: CancellationToken) -> Self {
        Resolver {
            session,
            cancel,
            names: FxHashMap::default(),
            exprs: FxHashMap::default(),
            types: FxHashMap::default(),
            symbol_types: FxHashMap::default(),
            evaluating: FxHashSet::default(),
            returns: FxHashMap::default(),
            active: FxHashSet::default(),
            expanding: FxHashSet::default(),
            depth: 0,
            eval_depth: 0,
            in_progress: 0,
            hits: Vec::new(),
        }
    }

    #[inline]
    pub fn session(&self) -> &'s AnalysisSession {
        self.session
    }

    /// Binding of a name node.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolve_name(&mut self, unit: UnitId, name: NameId) -> Binding {
        let unit = self.session.unit(unit);
        let binding = self.name_binding(&unit, name, None);
        if self.cancel.is_cancelled() {
            return cancelled_binding();
        }
        binding
    }

    /// Type of an expression. Never a reference: the value category is
    /// tracked separately.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn type_of(&mut self, unit: UnitId, expr: ExprId) -> Idx {
        let unit = self.session.unit(unit);
        let ty = self.expr_type(&unit, expr, None);
        if self.cancel.is_cancelled() {
            return Idx::problem(ProblemKind::Cancelled);
        }
        ty
    }

    /// Declarator names of the entities behind `binding`, in every unit.
    pub fn find_definitions(&mut self, binding: &Binding) -> Vec<NameRef> {
        let mut out = Vec::new();
        for symbol in self.equivalents(binding) {
            let symbol = self.session.symbol(symbol);
            out.extend(symbol.sites.iter().map(|&name| NameRef {
                unit: symbol.unit,
                name,
            }));
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Non-declarator names of every unit that resolve to the entities
    /// behind `binding`. References to instances count as references to
    /// their template.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn find_references(&mut self, binding: &Binding) -> Result<Vec<NameRef>, Problem> {
        let targets = self.equivalents(binding);
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for unit_id in self.session.unit_ids() {
            let unit = self.session.unit(unit_id);
            for name in unit.arena().name_ids() {
                self.cancel.check()?;
                if matches!(
                    unit.name_site(name),
                    NameSite::Declarator(_) | NameSite::Unvisited
                ) {
                    continue;
                }
                let found = self.name_binding(&unit, name, None);
                if self.refers_to(&found, &targets) {
                    out.push(NameRef {
                        unit: unit_id,
                        name,
                    });
                }
            }
        }
        self.cancel.check()?;
        Ok(out)
    }

    /// Instances of the template behind `binding`, oldest first.
    pub fn instantiations_of(&self, binding: &Binding) -> Vec<InstanceId> {
        let template = match binding {
            Binding::Declaration(symbol) => *symbol,
            Binding::Instance(instance) => self.session.instance(*instance).template,
            _ => return Vec::new(),
        };
        self.session.instances().of_template(template)
    }

    /// Constant value a variable (or variable template instance) is
    /// initialized with, or the value of an enumerator.
    pub fn initial_value(&mut self, binding: &Binding) -> Option<Value> {
        let value = match binding {
            Binding::Declaration(symbol) => self.symbol_value(*symbol, None),
            Binding::Instance(instance) => {
                let pattern = self.session.instance(*instance).pattern;
                self.symbol_value(pattern, Some(*instance))
            }
            _ => None,
        };
        if self.cancel.is_cancelled() {
            return None;
        }
        value
    }

    /// Resolve every name and expression of a unit.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolve_all(&mut self, unit: UnitId) -> Result<UnitResolution, Problem> {
        let unit = self.session.unit(unit);
        let mut bindings = Vec::with_capacity(unit.arena().name_count());
        for name in unit.arena().name_ids() {
            self.cancel.check()?;
            bindings.push((name, self.name_binding(&unit, name, None)));
        }
        let mut types = Vec::with_capacity(unit.arena().expr_count());
        for expr in unit.arena().expr_ids() {
            self.cancel.check()?;
            types.push((expr, self.expr_type(&unit, expr, None)));
        }
        self.cancel.check()?;
        let problems = bindings.iter().filter(|(_, b)| b.is_problem()).count();
        tracing::debug!(unit = ?unit.id, names = bindings.len(), problems, "unit resolved");
        Ok(UnitResolution {
            unit: unit.id,
            bindings,
            types,
        })
    }
}

// Shared plumbing of the resolution modules.
impl<'s> Resolver<'s> {
    #[inline]
    pub(crate) fn pool(&self) -> &'s TypePool {
        self.session.pool()
    }

    #[inline]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Results may be cached: no deduction rests on a tentative type and
    /// the request is still live.
    #[inline]
    pub(crate) fn memoizing(&self) -> bool {
        self.in_progress == 0 && !self.cancel.is_cancelled()
    }

    pub(crate) fn record(&mut self, unit: UnitId, name: NameId, ctx: Ctx, binding: Binding) {
        if self.memoizing() {
            self.names.insert((unit, name, ctx), binding);
        }
    }

    pub(crate) fn name_binding(&mut self, unit: &Unit, name: NameId, ctx: Ctx) -> Binding {
        let key = (unit.id, name, ctx);
        if let Some(binding) = self.names.get(&key) {
            return binding.clone();
        }
        let binding = match unit.name_site(name) {
            NameSite::Declarator(symbol) => Binding::Declaration(symbol),
            NameSite::Expr(root) => {
                self.eval_root(unit, root, ctx);
                match self.names.get(&key) {
                    Some(binding) => binding.clone(),
                    None => self.lookup_binding(unit, name, ctx),
                }
            }
            NameSite::Type(root) => {
                self.lower_type(unit, root, ctx);
                match self.names.get(&key) {
                    Some(binding) => binding.clone(),
                    None => self.lookup_binding(unit, name, ctx),
                }
            }
            NameSite::Lookup => self.lookup_binding(unit, name, ctx),
            NameSite::Unvisited => Binding::Problem(self.problem_at(unit, name, ProblemKind::UnresolvedName)),
        };
        if self.is_cancelled() {
            return cancelled_binding();
        }
        self.record(unit.id, name, ctx, binding.clone());
        binding
    }

    /// Binding from plain lookup, without any call or target context.
    fn lookup_binding(&mut self, unit: &Unit, name: NameId, ctx: Ctx) -> Binding {
        let found = self.lookup_name(unit, name, ctx, Want::Any);
        self.binding_of(unit, name, &found)
    }

    pub(crate) fn problem_at(&self, unit: &Unit, name: NameId, kind: ProblemKind) -> Problem {
        let node = unit.arena().name(name);
        Problem::new(kind, node.span).with_name(node.ident)
    }

    /// Evaluate the root of the tree `expr` belongs to, then `expr`.
    pub(crate) fn expr_type(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> Idx {
        let root = unit.root_of_expr(expr);
        if root != expr {
            self.eval_root(unit, root, ctx);
        }
        self.expr(unit, expr, ctx).ty
    }

    /// The innermost instance of `ctx` whose parameter list is shallower
    /// than `depth`: the part of a context an entity declared under
    /// `depth` enclosing parameter lists can see.
    pub(crate) fn ctx_for(&self, ctx: Ctx, depth: u16) -> Ctx {
        let mut current = ctx;
        while let Some(id) = current {
            let instance = self.session.instance(id);
            if instance.depth < depth {
                return current;
            }
            current = instance.parent;
        }
        None
    }

    /// Context the entity of `symbol` is evaluated in. A template's own
    /// parameter list counts, so its instances apply to its pattern.
    /// Closures default to the instance they were synthesized in.
    pub(crate) fn entity_ctx(&self, symbol: &Symbol, ctx: Ctx) -> Ctx {
        let depth = match symbol.template_info() {
            Some(info) => info.depth + 1,
            None => symbol.template_depth,
        };
        self.ctx_for(ctx.or(symbol.ctx), depth)
    }

    /// Argument bound to `param` by the instances of `ctx`.
    pub(crate) fn bound_arg(&self, ctx: Ctx, param: ParamRef) -> Option<TemplateArg> {
        let mut current = ctx;
        while let Some(id) = current {
            let instance = self.session.instance(id);
            if instance.depth == param.depth {
                return instance.binds(param).cloned();
            }
            if instance.depth < param.depth {
                return None;
            }
            current = instance.parent;
        }
        None
    }

    pub(crate) fn subst_with(&mut self, ty: Idx, ctx: Ctx, extra: Option<&ParamBindings>) -> Idx {
        let pool = self.pool();
        if !pool.is_dependent(ty) || (ctx.is_none() && extra.is_none()) {
            return ty;
        }
        let mut env = CtxEnv {
            resolver: self,
            ctx,
            extra,
        };
        cxx_types::subst::subst(pool, ty, &mut env)
    }

    /// Substitute into a list, expanding bound pack expansions.
    pub(crate) fn subst_list_with(
        &mut self,
        tys: &[Idx],
        ctx: Ctx,
        extra: Option<&ParamBindings>,
    ) -> Vec<Idx> {
        let pool = self.pool();
        let mut env = CtxEnv {
            resolver: self,
            ctx,
            extra,
        };
        cxx_types::subst::subst_list(pool, tys, &mut env)
    }

    pub(crate) fn subst_args_with(
        &mut self,
        args: &[TemplateArg],
        ctx: Ctx,
        extra: Option<&ParamBindings>,
    ) -> Vec<TemplateArg> {
        let pool = self.pool();
        let mut env = CtxEnv {
            resolver: self,
            ctx,
            extra,
        };
        cxx_types::subst::subst_args(pool, args, &mut env)
    }

    pub(crate) fn subst_value_with(&self, value: Value, ctx: Ctx, extra: Option<&ParamBindings>) -> Value {
        let Value::Param(param) = value else {
            return value;
        };
        let bound = extra
            .and_then(|bindings| bindings.get(param).cloned())
            .or_else(|| self.bound_arg(ctx, param));
        match bound {
            Some(TemplateArg::Value(bound)) => bound,
            _ => value,
        }
    }

    /// Symbols the entities behind `binding` consist of, including the
    /// same-named declarations other units published.
    fn equivalents(&mut self, binding: &Binding) -> Vec<SymbolId> {
        let mut symbols: Vec<SymbolId> = match binding {
            Binding::Declaration(symbol) => vec![*symbol],
            Binding::OverloadSet(set) => set.to_vec(),
            Binding::Instance(instance) => vec![self.session.instance(*instance).template],
            Binding::Dependent | Binding::Problem(_) => return Vec::new(),
        };
        let mut extra = Vec::new();
        for &symbol in &symbols {
            extra.extend(self.published_equivalents(symbol));
        }
        symbols.extend(extra);
        symbols.sort_unstable();
        symbols.dedup();
        symbols
    }

    fn refers_to(&self, found: &Binding, targets: &[SymbolId]) -> bool {
        match found {
            Binding::Declaration(symbol) => targets.contains(symbol),
            Binding::OverloadSet(set) => set.iter().any(|symbol| targets.contains(symbol)),
            Binding::Instance(instance) => {
                targets.contains(&self.session.instance(*instance).template)
            }
            Binding::Dependent | Binding::Problem(_) => false,
        }
    }

    /// Run `f` one evaluation level deeper, failing with `RecursionLimit`
    /// past the configured bound.
    pub(crate) fn nested<R>(&mut self, on_limit: R, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.eval_depth >= self.session.config().max_deduction_depth {
            tracing::debug!(depth = self.eval_depth, "evaluation depth limit reached");
            return on_limit;
        }
        self.eval_depth += 1;
        let result = cxx_stack::ensure_sufficient_stack(|| f(self));
        self.eval_depth -= 1;
        result
    }
}

fn cancelled_binding() -> Binding {
    Binding::Problem(Problem::new(ProblemKind::Cancelled, Span::DUMMY))
}

/// Substitution environment of an instantiation context, optionally
/// overlaid with bindings under construction.
pub(crate) struct CtxEnv<'r, 's> {
    resolver: &'r mut Resolver<'s>,
    ctx: Ctx,
    extra: Option<&'r ParamBindings>,
}

impl SubstEnv for CtxEnv<'_, '_> {
    fn lookup_param(&self, param: ParamRef) -> Option<TemplateArg> {
        if let Some(arg) = self.extra.and_then(|bindings| bindings.get(param)) {
            return Some(arg.clone());
        }
        self.resolver.bound_arg(self.ctx, param)
    }

    fn member_type(&mut self, _pool: &TypePool, scope: Idx, name: cxx_ir::Name) -> Idx {
        self.resolver.member_type(scope, name)
    }

    fn specialize(&mut self, _pool: &TypePool, template: SymbolId, args: Vec<TemplateArg>) -> Idx {
        self.resolver.specialize(template, args, self.ctx)
    }
}

#[cfg(test)]
mod tests;
