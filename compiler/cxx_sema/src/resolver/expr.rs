//! Expression typing.
//!
//! Every expression evaluates to an [`ExprInfo`]: its type (never a
//! reference), value category, and for names the entity or the overload
//! set they denote. Calls resolve their callee's overload set and record
//! the winner on the callee's name node. A function name that is not
//! called stays an unresolved set until a target type picks a member.
//!
//! # Design
//!
//! Expressions are evaluated per tree: asking for any node evaluates the
//! root of its tree first, so that names inside it see the calls and
//! initializations around them.

use std::sync::Arc;

use cxx_diagnostic::ProblemKind;
use cxx_ir::{ExprId, ExprKind, ExprRange, IntSuffix, Literal, NameId, TemplateParamKind, TypeExprId};
use cxx_types::{Idx, SymbolId, TemplateArg, TypeData, TypePool, ValueCategory};

use super::{Found, Resolver, Want};
use crate::overload::{CallForm, CallSet, ObjectArg};
use crate::scope::ScopeKind;
use crate::session::Unit;
use crate::symbol::{SymbolKind, TemplateEntity};
use crate::{Binding, Ctx};

/// Result of evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ExprInfo {
    pub ty: Idx,
    pub category: ValueCategory,
    /// Integral literal zero or `nullptr`.
    pub null_constant: bool,
    /// A function name: its candidates, resolved later by a call or a
    /// target type.
    pub overloads: Option<OverloadRef>,
    /// Entity a name or member access denotes, with its context.
    pub entity: Option<(SymbolId, Ctx)>,
}

impl ExprInfo {
    pub(crate) fn prvalue(ty: Idx) -> Self {
        ExprInfo {
            ty,
            category: ValueCategory::PRValue,
            null_constant: false,
            overloads: None,
            entity: None,
        }
    }

    pub(crate) fn lvalue(ty: Idx) -> Self {
        ExprInfo {
            category: ValueCategory::LValue,
            ..Self::prvalue(ty)
        }
    }

    pub(crate) fn problem(kind: ProblemKind) -> Self {
        Self::prvalue(Idx::problem(kind))
    }

    pub(crate) fn dependent() -> Self {
        Self::prvalue(Idx::DEPENDENT)
    }

    /// Value of a call returning `ret`.
    pub(crate) fn returned(pool: &TypePool, ret: Idx) -> Self {
        let category = if pool.is_lvalue_ref(ret) {
            ValueCategory::LValue
        } else if pool.is_rvalue_ref(ret) {
            ValueCategory::XValue
        } else {
            ValueCategory::PRValue
        };
        ExprInfo {
            category,
            ..Self::prvalue(pool.strip_ref(ret))
        }
    }
}

/// A function name and the candidates it found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OverloadRef {
    pub symbols: Arc<[SymbolId]>,
    /// Context the candidates were found in.
    pub ctx: Ctx,
    /// Explicit template arguments of `f<args>`.
    pub explicit: Option<Arc<[TemplateArg]>>,
    /// Name node the resolution is recorded on.
    pub name: NameId,
    /// Expression naming the set.
    pub expr: ExprId,
    /// Object of a member access.
    pub object: Option<ObjectArg>,
}

impl Resolver<'_> {
    /// Evaluate an expression in `ctx`.
    pub(crate) fn expr(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> ExprInfo {
        let key = (unit.id, expr, ctx);
        if let Some(info) = self.exprs.get(&key) {
            return info.clone();
        }
        let on_limit = ExprInfo::problem(ProblemKind::RecursionLimit);
        let info = self.nested(on_limit, |this| this.expr_uncached(unit, expr, ctx));
        if self.memoizing() {
            self.exprs.insert(key, info.clone());
        }
        info
    }

    /// Evaluate a root expression, resolving a function name initializing
    /// a variable against the variable's type.
    pub(crate) fn eval_root(&mut self, unit: &Unit, root: ExprId, ctx: Ctx) {
        let info = self.expr(unit, root, ctx);
        let Some(&variable) = unit.init_of.get(&root) else {
            return;
        };
        let declared = self.symbol_type(variable, ctx);
        if let Some(set) = info.overloads.filter(|_| info.ty.is_problem()) {
            self.bind_to_target(unit, &set, declared, ctx);
        }
    }

    /// Resolve an unresolved function name against `target` and record
    /// the result on its name and expression.
    pub(crate) fn bind_to_target(&mut self, unit: &Unit, set: &OverloadRef, target: Idx, ctx: Ctx) -> Option<Idx> {
        let Some((binding, ty)) = self.resolve_address(set, target) else {
            let problem = self.problem_at(unit, set.name, ProblemKind::NoViableCandidate);
            self.record(unit.id, set.name, ctx, Binding::Problem(problem));
            return None;
        };
        self.record(unit.id, set.name, ctx, binding);
        if self.memoizing() {
            self.exprs.insert((unit.id, set.expr, ctx), ExprInfo::lvalue(ty));
        }
        Some(ty)
    }

    fn expr_uncached(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> ExprInfo {
        if self.is_cancelled() {
            return ExprInfo::problem(ProblemKind::Cancelled);
        }
        let pool = self.pool();
        match unit.arena().expr(expr).kind.clone() {
            ExprKind::Literal(literal) => self.literal(literal),
            ExprKind::Id(name) => self.id_expr(unit, expr, name, ctx),
            ExprKind::Call { callee, args } => self.call_expr(unit, callee, args, ctx),
            ExprKind::Unary { op, operand } => self.unary_expr(unit, expr, op, operand, ctx),
            ExprKind::Binary { op, left, right } => self.binary_expr(unit, expr, op, left, right, ctx),
            ExprKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => self.conditional_expr(unit, cond, then_expr, else_expr, ctx),
            ExprKind::Member { base, member, arrow } => self.member_expr(unit, expr, base, member, arrow, ctx),
            ExprKind::Index { base, index } => self.index_expr(unit, expr, base, index, ctx),
            ExprKind::Cast { ty, operand, .. } => self.cast_expr(unit, ty, operand, ctx),
            ExprKind::Construct { ty, args, .. } => self.construct_expr(unit, ty, args, ctx),
            ExprKind::Lambda(_) => match self.closure_of(unit, expr, ctx) {
                Some(closure) => ExprInfo::prvalue(pool.closure(closure)),
                None => ExprInfo::problem(ProblemKind::UnresolvedName),
            },
            ExprKind::SizeofPack(name) => {
                let found = self.lookup_name(unit, name, ctx, Want::Any);
                let binding = self.binding_of(unit, name, &found);
                self.record(unit.id, name, ctx, binding);
                ExprInfo::prvalue(Idx::ULONG)
            }
            ExprKind::PackExpansion(pattern) => {
                self.expr(unit, pattern, ctx);
                ExprInfo::dependent()
            }
            ExprKind::BracedList(elems) => {
                let elems: Vec<ExprId> = unit.arena().expr_list(elems).to_vec();
                for elem in elems {
                    self.expr(unit, elem, ctx);
                }
                ExprInfo::problem(ProblemKind::TypeMismatch)
            }
            ExprKind::This => match self.this_type(unit, expr, ctx) {
                Some(ty) => ExprInfo::prvalue(ty),
                None => ExprInfo::problem(ProblemKind::UnresolvedName),
            },
        }
    }

    fn literal(&self, literal: Literal) -> ExprInfo {
        let int_max = u64::from(i32::MAX.unsigned_abs());
        let long_max = i64::MAX.unsigned_abs();
        match literal {
            Literal::Int { value, suffix } => {
                let ty = match suffix {
                    IntSuffix::None if value <= int_max => Idx::INT,
                    IntSuffix::None | IntSuffix::L if value <= long_max => Idx::LONG,
                    IntSuffix::U if value <= u64::from(u32::MAX) => Idx::UINT,
                    IntSuffix::None | IntSuffix::L | IntSuffix::U | IntSuffix::UL => Idx::ULONG,
                    IntSuffix::LL if value <= long_max => Idx::LONG_LONG,
                    IntSuffix::LL | IntSuffix::ULL => Idx::ULONG_LONG,
                };
                ExprInfo {
                    null_constant: value == 0,
                    ..ExprInfo::prvalue(ty)
                }
            }
            Literal::Float { single, .. } => ExprInfo::prvalue(if single { Idx::FLOAT } else { Idx::DOUBLE }),
            Literal::Char(_) => ExprInfo::prvalue(Idx::CHAR),
            Literal::Bool(_) => ExprInfo::prvalue(Idx::BOOL),
            Literal::String(text) => {
                let pool = self.pool();
                let len = u64::try_from(self.session.interner().lookup(text).len()).unwrap_or(u64::MAX);
                ExprInfo::lvalue(pool.array(pool.const_of(Idx::CHAR), Some(len.saturating_add(1))))
            }
            Literal::Nullptr => ExprInfo {
                null_constant: true,
                ..ExprInfo::prvalue(Idx::NULLPTR)
            },
        }
    }

    fn id_expr(&mut self, unit: &Unit, expr: ExprId, name: NameId, ctx: Ctx) -> ExprInfo {
        let found = self.lookup_name(unit, name, ctx, Want::Any);
        if found.dependent {
            self.record(unit.id, name, ctx, Binding::Dependent);
            return ExprInfo::dependent();
        }
        let all_functions = !found.symbols.is_empty()
            && found
                .symbols
                .iter()
                .all(|&symbol| self.session.symbol(symbol).is_function_like());
        if all_functions {
            let object = self.implicit_object(unit, expr, &found, ctx);
            return self.function_name(unit, expr, name, &found, object, ctx);
        }
        match found.symbols.as_slice() {
            [] => {
                let problem = self.problem_at(unit, name, ProblemKind::UnresolvedName);
                self.record(unit.id, name, ctx, Binding::Problem(problem));
                ExprInfo::problem(ProblemKind::UnresolvedName)
            }
            &[symbol] => self.entity_expr(unit, name, symbol, found.ctx, ctx),
            _ => {
                let problem = self.problem_at(unit, name, ProblemKind::Ambiguous);
                self.record(unit.id, name, ctx, Binding::Problem(problem));
                ExprInfo::problem(ProblemKind::Ambiguous)
            }
        }
    }

    /// A name denoting a single non-function entity.
    fn entity_expr(&mut self, unit: &Unit, name: NameId, symbol_id: SymbolId, found_ctx: Ctx, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let symbol = self.session.symbol(symbol_id);
        let (mut entity, mut binding) = ((symbol_id, found_ctx), Binding::Declaration(symbol_id));
        if let (SymbolKind::Template(info), Some(args)) = (&symbol.kind, unit.arena().name(name).template_args) {
            if matches!(info.entity, TemplateEntity::Variable { .. }) {
                let written = self.template_args(unit, args, ctx);
                match self.variable_instance(symbol_id, written, ctx) {
                    Ok(Some((pattern, instance))) => {
                        entity = (pattern, Some(instance));
                        binding = Binding::Instance(instance);
                    }
                    Ok(None) => binding = Binding::Dependent,
                    Err(kind) => {
                        let problem = self.problem_at(unit, name, kind);
                        self.record(unit.id, name, ctx, Binding::Problem(problem));
                        return ExprInfo::problem(kind);
                    }
                }
            }
        }
        self.record(unit.id, name, ctx, binding);

        let info = match &symbol.kind {
            SymbolKind::Variable { .. }
            | SymbolKind::Parameter { .. }
            | SymbolKind::InitCapture { .. }
            | SymbolKind::Template(crate::symbol::TemplateInfo {
                entity: TemplateEntity::Variable { .. },
                ..
            }) => {
                let ty = self.symbol_type(entity.0, entity.1);
                ExprInfo::lvalue(pool.strip_ref(ty))
            }
            SymbolKind::Enumerator { parent, .. } => ExprInfo::prvalue(pool.enumeration(*parent)),
            SymbolKind::TemplateParam(param) if matches!(param.kind, TemplateParamKind::NonType(_)) => {
                let ty = self.symbol_type(symbol_id, found_ctx);
                ExprInfo::prvalue(pool.strip_cv(ty))
            }
            // A type or namespace used as a value.
            _ => return ExprInfo::problem(ProblemKind::TypeMismatch),
        };
        ExprInfo {
            entity: Some(entity),
            ..info
        }
    }

    /// Instance of a variable template for written arguments; `None` while
    /// the arguments are dependent.
    fn variable_instance(
        &mut self,
        template: SymbolId,
        written: Vec<TemplateArg>,
        ctx: Ctx,
    ) -> Result<Option<(SymbolId, crate::InstanceId)>, ProblemKind> {
        let args = self.normalize_args(template, written, ctx)?;
        let pool = self.pool();
        if !args.iter().all(|arg| is_concrete(pool, arg)) {
            return Ok(None);
        }
        let instance = self.instantiate(template, args, ctx)?;
        Ok(Some((self.session.instance(instance).pattern, instance)))
    }

    /// A name denoting functions: resolved at once when it can only mean
    /// one function, else an unresolved set.
    fn function_name(
        &mut self,
        unit: &Unit,
        expr: ExprId,
        name: NameId,
        found: &Found,
        object: Option<ObjectArg>,
        ctx: Ctx,
    ) -> ExprInfo {
        let explicit = unit
            .arena()
            .name(name)
            .template_args
            .map(|args| self.template_args(unit, args, ctx));
        let set = OverloadRef {
            symbols: Arc::from(found.symbols.as_slice()),
            ctx: found.ctx,
            explicit: explicit.clone().map(Arc::from),
            name,
            expr,
            object,
        };

        if let [only] = found.symbols.as_slice() {
            let symbol = self.session.symbol(*only);
            if !symbol.is_template() && explicit.is_none() {
                self.record(unit.id, name, ctx, Binding::Declaration(*only));
                let ty = self.function_type(*only, found.ctx);
                return ExprInfo {
                    overloads: Some(set),
                    entity: Some((*only, found.ctx)),
                    ..ExprInfo::lvalue(ty)
                };
            }
            if let Some(explicit) = &explicit {
                if let Some(instance) = self.explicit_instance(*only, explicit, found.ctx) {
                    self.record(unit.id, name, ctx, Binding::Instance(instance));
                    let ty = self.function_type(*only, Some(instance));
                    return ExprInfo {
                        overloads: Some(set),
                        entity: Some((*only, Some(instance))),
                        ..ExprInfo::lvalue(ty)
                    };
                }
            }
        }

        let binding = match found.symbols.as_slice() {
            [only] => Binding::Declaration(*only),
            symbols => Binding::OverloadSet(Arc::from(symbols)),
        };
        self.record(unit.id, name, ctx, binding);
        let kind = if found.symbols.len() > 1 {
            ProblemKind::Ambiguous
        } else {
            ProblemKind::DeductionFailure
        };
        ExprInfo {
            overloads: Some(set),
            ..ExprInfo::problem(kind)
        }
    }

    /// Instance of a function template whose arguments are all given
    /// explicitly or by default.
    fn explicit_instance(&mut self, template: SymbolId, explicit: &[TemplateArg], ctx: Ctx) -> Option<crate::InstanceId> {
        let symbol = self.session.symbol(template);
        let outer = self.param_ctx(&symbol, ctx);
        let bindings = self.prefill(&symbol, explicit, outer)?;
        let args = self.complete_args(&symbol, bindings, outer).ok()?;
        let pool = self.pool();
        if !args.iter().all(|arg| is_concrete(pool, arg)) {
            return None;
        }
        self.instantiate(template, args, ctx).ok()
    }

    fn call_expr(&mut self, unit: &Unit, callee: ExprId, args: ExprRange, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let callee_info = self.expr(unit, callee, ctx);
        let arg_ids: Vec<ExprId> = unit.arena().expr_list(args).to_vec();
        let args: Vec<ExprInfo> = arg_ids.iter().map(|&arg| self.expr(unit, arg, ctx)).collect();

        let dependent = pool.is_dependent(callee_info.ty)
            || args.iter().any(|arg| pool.is_dependent(arg.ty))
            || callee_info.overloads.as_ref().is_some_and(|set| {
                set.object.is_some_and(|object| pool.is_dependent(object.ty))
                    || set
                        .explicit
                        .as_ref()
                        .is_some_and(|explicit| !explicit.iter().all(|arg| is_concrete(pool, arg)))
            });
        if dependent {
            if let Some(set) = &callee_info.overloads {
                self.record(unit.id, set.name, ctx, Binding::Dependent);
            }
            return ExprInfo::dependent();
        }
        if let Some(kind) = args
            .iter()
            .filter(|arg| arg.overloads.is_none())
            .find_map(|arg| arg.ty.as_problem())
        {
            return ExprInfo::problem(kind);
        }

        let associated = self.argument_dependent_set(unit, callee, &callee_info, &args, ctx);
        if let Some(set) = associated.or(callee_info.overloads) {
            let call = CallSet {
                candidates: &set.symbols,
                ctx: set.ctx,
                explicit: set.explicit.as_deref(),
                object: set.object,
                form: CallForm::Call,
            };
            return match self.resolve_call(unit, &call, &args, ctx) {
                Ok(resolved) => {
                    self.record(unit.id, set.name, ctx, resolved.binding);
                    if self.memoizing() {
                        let callee_info = ExprInfo {
                            entity: Some((resolved.symbol, resolved.ctx)),
                            ..ExprInfo::lvalue(resolved.ty)
                        };
                        self.exprs.insert((unit.id, set.expr, ctx), callee_info);
                    }
                    self.returned_by(resolved.ty)
                }
                Err(kind) => {
                    let problem = self.problem_at(unit, set.name, kind);
                    self.record(unit.id, set.name, ctx, Binding::Problem(problem));
                    ExprInfo::problem(kind)
                }
            };
        }
        if let Some(kind) = callee_info.ty.as_problem() {
            return ExprInfo::problem(kind);
        }
        let object = ObjectArg {
            ty: callee_info.ty,
            category: callee_info.category,
        };
        self.call_object(object, &args, unit, ctx)
    }

    /// Candidates of an unqualified call extended by argument-dependent
    /// lookup; `None` when ordinary lookup found a member, a block-scope
    /// declaration or a non-function, or the associated namespaces add
    /// nothing.
    fn argument_dependent_set(
        &mut self,
        unit: &Unit,
        callee: ExprId,
        callee_info: &ExprInfo,
        args: &[ExprInfo],
        ctx: Ctx,
    ) -> Option<OverloadRef> {
        let ExprKind::Id(name) = unit.arena().expr(callee).kind else {
            return None;
        };
        let node = unit.arena().name(name);
        if node.qualifier.is_some() || node.global {
            return None;
        }
        let existing: &[SymbolId] = match &callee_info.overloads {
            Some(set) if set.object.is_none() => &set.symbols[..],
            None if callee_info.ty.as_problem() == Some(ProblemKind::UnresolvedName) => &[],
            _ => return None,
        };
        if !existing.iter().all(|&symbol| self.at_namespace_scope(symbol)) {
            return None;
        }
        let arg_types: Vec<Idx> = args
            .iter()
            .filter(|arg| arg.overloads.is_none())
            .map(|arg| arg.ty)
            .collect();
        let added: Vec<SymbolId> = self
            .argument_dependent(node.ident, &arg_types)
            .into_iter()
            .filter(|symbol| !existing.contains(symbol))
            .collect();
        if added.is_empty() {
            return None;
        }
        let explicit = match &callee_info.overloads {
            Some(set) => set.explicit.clone(),
            None => node
                .template_args
                .map(|written| Arc::from(self.template_args(unit, written, ctx))),
        };
        Some(OverloadRef {
            symbols: existing.iter().copied().chain(added).collect(),
            ctx: callee_info.overloads.as_ref().and_then(|set| set.ctx),
            explicit,
            name,
            expr: callee,
            object: None,
        })
    }

    fn at_namespace_scope(&self, symbol_id: SymbolId) -> bool {
        let symbol = self.session.symbol(symbol_id);
        let unit = self.session.unit(symbol.unit);
        matches!(
            unit.scopes.get(symbol.scope).kind,
            ScopeKind::Global | ScopeKind::Namespace
        )
    }

    /// Call through an object: a closure, a class with `operator()`, or a
    /// function pointer.
    fn call_object(&mut self, object: ObjectArg, args: &[ExprInfo], unit: &Unit, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let ty = pool.strip_cv(object.ty);
        if let TypeData::Closure(closure) = pool.get(ty) {
            let symbol = self.session.symbol(closure);
            let SymbolKind::Closure { call, .. } = symbol.kind else {
                return ExprInfo::problem(ProblemKind::TypeMismatch);
            };
            let candidates = [call];
            let set = CallSet {
                candidates: &candidates,
                ctx: symbol.ctx,
                explicit: None,
                object: Some(object),
                form: CallForm::Call,
            };
            return match self.resolve_call(unit, &set, args, ctx) {
                Ok(resolved) => self.returned_by(resolved.ty),
                Err(kind) => ExprInfo::problem(kind),
            };
        }
        if pool.is_class_like(ty) {
            let name = self.session.interner().intern("operator()");
            let found = self.member_lookup(ty, name, Want::Any);
            if found.symbols.is_empty() {
                return ExprInfo::problem(ProblemKind::NoViableCandidate);
            }
            let set = CallSet {
                candidates: &found.symbols,
                ctx: found.ctx,
                explicit: None,
                object: Some(object),
                form: CallForm::Call,
            };
            return match self.resolve_call(unit, &set, args, ctx) {
                Ok(resolved) => self.returned_by(resolved.ty),
                Err(kind) => ExprInfo::problem(kind),
            };
        }
        match pool.callable_sig(ty) {
            Some(signature) => ExprInfo::returned(pool, signature.ret),
            None => ExprInfo::problem(ProblemKind::TypeMismatch),
        }
    }

    pub(super) fn returned_by(&self, function: Idx) -> ExprInfo {
        let pool = self.pool();
        match pool.callable_sig(function) {
            Some(signature) if signature.ret.is_problem() => ExprInfo::prvalue(signature.ret),
            Some(signature) => ExprInfo::returned(pool, signature.ret),
            None => ExprInfo::problem(ProblemKind::TypeMismatch),
        }
    }

    fn member_expr(&mut self, unit: &Unit, expr: ExprId, base: ExprId, member: NameId, arrow: bool, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let base_info = self.expr(unit, base, ctx);
        let (object_ty, category) = if arrow {
            match pool.pointee(base_info.ty) {
                Some(pointee) => (pointee, ValueCategory::LValue),
                None if pool.is_dependent(base_info.ty) => (base_info.ty, ValueCategory::LValue),
                None => {
                    let kind = base_info.ty.as_problem().unwrap_or(ProblemKind::TypeMismatch);
                    let problem = self.problem_at(unit, member, kind);
                    self.record(unit.id, member, ctx, Binding::Problem(problem));
                    return ExprInfo::problem(kind);
                }
            }
        } else {
            (base_info.ty, base_info.category)
        };
        if pool.is_dependent(object_ty) {
            self.record(unit.id, member, ctx, Binding::Dependent);
            return ExprInfo::dependent();
        }
        if !pool.is_class_like(object_ty) {
            let kind = object_ty.as_problem().unwrap_or(ProblemKind::TypeMismatch);
            let problem = self.problem_at(unit, member, kind);
            self.record(unit.id, member, ctx, Binding::Problem(problem));
            return ExprInfo::problem(kind);
        }

        let ident = unit.arena().name(member).ident;
        let found = self.member_lookup(object_ty, ident, Want::Any);
        if found.dependent {
            self.record(unit.id, member, ctx, Binding::Dependent);
            return ExprInfo::dependent();
        }
        let object = ObjectArg { ty: object_ty, category };
        let all_functions = !found.symbols.is_empty()
            && found
                .symbols
                .iter()
                .all(|&symbol| self.session.symbol(symbol).is_function_like());
        if all_functions {
            return self.function_name(unit, expr, member, &found, Some(object), ctx);
        }
        let &[symbol] = found.symbols.as_slice() else {
            let kind = if found.symbols.is_empty() {
                ProblemKind::UnresolvedName
            } else {
                ProblemKind::Ambiguous
            };
            let problem = self.problem_at(unit, member, kind);
            self.record(unit.id, member, ctx, Binding::Problem(problem));
            return ExprInfo::problem(kind);
        };
        let info = self.entity_expr(unit, member, symbol, found.ctx, ctx);
        self.data_member(info, object, symbol)
    }

    /// Type and category of a data member accessed through `object`.
    fn data_member(&self, info: ExprInfo, object: ObjectArg, member: SymbolId) -> ExprInfo {
        let pool = self.pool();
        let symbol = self.session.symbol(member);
        if !matches!(symbol.kind, SymbolKind::Variable { .. }) || symbol.is_static() || info.ty.is_problem() {
            return info;
        }
        let ty = info.ty;
        let object_cv = pool.cv_of(object.ty);
        let mutable = symbol.specifiers.contains(cxx_ir::DeclSpecifiers::MUTABLE);
        let ty = if mutable { ty } else { pool.qualified(ty, object_cv) };
        let category = match object.category {
            ValueCategory::LValue => ValueCategory::LValue,
            _ => ValueCategory::XValue,
        };
        ExprInfo { ty, category, ..info }
    }

    fn index_expr(&mut self, unit: &Unit, expr: ExprId, base: ExprId, index: ExprId, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let base_info = self.expr(unit, base, ctx);
        let index_info = self.expr(unit, index, ctx);
        if pool.is_dependent(base_info.ty) || pool.is_dependent(index_info.ty) {
            return ExprInfo::dependent();
        }
        if pool.is_class_like(base_info.ty) {
            let operands = [base_info, index_info];
            return match self.overloaded_operator(unit, expr, "operator[]", &operands, ctx) {
                Some(Ok(info)) => info,
                Some(Err(kind)) => ExprInfo::problem(kind),
                None => ExprInfo::problem(ProblemKind::NoViableCandidate),
            };
        }
        let element = match pool.get(pool.strip_cv(base_info.ty)) {
            TypeData::Array { elem, .. } => Some(elem),
            TypeData::Pointer(pointee) => Some(pointee),
            _ => None,
        };
        match element {
            Some(elem) if pool.is_integral(index_info.ty) || pool.is_enum(index_info.ty) => ExprInfo::lvalue(elem),
            _ => ExprInfo::problem(ProblemKind::TypeMismatch),
        }
    }

    fn cast_expr(&mut self, unit: &Unit, ty: TypeExprId, operand: ExprId, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let target = self.lower_type(unit, ty, ctx);
        let operand_info = self.expr(unit, operand, ctx);
        if let Some(set) = operand_info.overloads.filter(|_| operand_info.ty.is_problem()) {
            if !pool.is_dependent(target) {
                self.bind_to_target(unit, &set, target, ctx);
            }
        }
        if let Some(kind) = target.as_problem() {
            return ExprInfo::problem(kind);
        }
        ExprInfo::returned(pool, target)
    }

    fn construct_expr(&mut self, unit: &Unit, ty: TypeExprId, args: ExprRange, ctx: Ctx) -> ExprInfo {
        let pool = self.pool();
        let ty = self.lower_type(unit, ty, ctx);
        let arg_ids: Vec<ExprId> = unit.arena().expr_list(args).to_vec();
        let args: Vec<ExprInfo> = arg_ids.iter().map(|&arg| self.expr(unit, arg, ctx)).collect();
        if let Some(kind) = ty.as_problem() {
            return ExprInfo::problem(kind);
        }
        if pool.is_dependent(ty) || args.iter().any(|arg| pool.is_dependent(arg.ty)) {
            return ExprInfo::prvalue(ty);
        }
        if !pool.is_class_like(ty) {
            return ExprInfo::prvalue(ty);
        }
        let Some(scope) = self.member_scope_of(ty) else {
            return ExprInfo::prvalue(ty);
        };
        let scope_unit = self.session.unit(scope.unit);
        let constructors: Vec<SymbolId> = scope_unit
            .scopes
            .get(scope.scope)
            .symbols()
            .iter()
            .copied()
            .filter(|&member| {
                self.session
                    .symbol(member)
                    .function_info()
                    .is_some_and(|info| info.special == cxx_ir::SpecialMember::Constructor)
            })
            .collect();
        if constructors.is_empty() {
            // Implicit default, copy and aggregate initialization.
            return ExprInfo::prvalue(ty);
        }
        let set = CallSet {
            candidates: &constructors,
            ctx: scope.ctx,
            explicit: None,
            object: None,
            form: CallForm::Call,
        };
        match self.resolve_call(unit, &set, &args, ctx) {
            Ok(_) => ExprInfo::prvalue(ty),
            Err(kind) => ExprInfo::problem(kind),
        }
    }

    /// Implicit `*this` of an unqualified call naming member functions.
    fn implicit_object(&mut self, unit: &Unit, expr: ExprId, found: &Found, ctx: Ctx) -> Option<ObjectArg> {
        let members = found.symbols.iter().any(|&symbol| {
            let symbol = self.session.symbol(symbol);
            symbol.member_of().is_some() && !symbol.is_static()
        });
        if !members {
            return None;
        }
        let this = self.this_type(unit, expr, ctx)?;
        Some(ObjectArg {
            ty: self.pool().pointee(this)?,
            category: ValueCategory::LValue,
        })
    }

    /// Type of `this` at `expr`: a pointer to the enclosing class, const
    /// inside a const member function.
    pub(crate) fn this_type(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> Option<Idx> {
        let pool = self.pool();
        let mut is_const = false;
        let mut seen_function = false;
        for id in unit.scopes.chain(unit.scope_of_expr(expr)) {
            let scope = unit.scopes.get(id);
            let class = match scope.kind {
                ScopeKind::Function if !seen_function => {
                    seen_function = true;
                    let function = scope.owner?;
                    let symbol = self.session.symbol(function);
                    is_const = self.is_const_member(function);
                    symbol.member_of()
                }
                ScopeKind::Class => scope.owner,
                _ => None,
            };
            if let Some(class) = class {
                let ty = self.class_type(class, ctx);
                let ty = if is_const { pool.const_of(ty) } else { ty };
                return Some(pool.pointer(ty));
            }
        }
        None
    }

    fn is_const_member(&self, function: SymbolId) -> bool {
        let symbol = self.session.symbol(function);
        let decl = match symbol.template_info() {
            Some(info) => info.inner,
            None => symbol.decl,
        };
        let Some(decl) = decl else {
            return false;
        };
        let unit = self.session.unit(symbol.unit);
        matches!(&unit.arena().decl(decl).kind, cxx_ir::DeclKind::Function(function) if function.is_const)
    }
}

/// The argument involves no template parameter.
pub(crate) fn is_concrete(pool: &TypePool, arg: &TemplateArg) -> bool {
    match arg {
        TemplateArg::Type(ty) => !pool.is_dependent(*ty),
        TemplateArg::Value(value) => !value.is_dependent(),
        TemplateArg::Template(_) => true,
        TemplateArg::Pack(elems) => elems.iter().all(|elem| is_concrete(pool, elem)),
    }
}
