//! Type lowering and declared types.
//!
//! Lowers type expressions to pool types in an instantiation context:
//! template parameters bound by the context are replaced while lowering,
//! the rest stay parameters. Type names record their bindings as they are
//! resolved.

use std::sync::Arc;

use cxx_diagnostic::ProblemKind;
use cxx_ir::{ExprId, Initializer, Name, NameId, TemplateParamKind, TypeExprId, TypeExprKind};
use cxx_types::{Cv, Idx, SymbolId, TemplateArg, Value, ValueCategory};

use super::{Found, Resolver, Want};
use crate::session::Unit;
use crate::symbol::{Symbol, SymbolKind, TemplateEntity};
use crate::{Binding, Ctx};

impl Resolver<'_> {
    /// Lower a type expression of `unit` in `ctx`.
    pub(crate) fn lower_type(&mut self, unit: &Unit, te: TypeExprId, ctx: Ctx) -> Idx {
        let key = (unit.id, te, ctx);
        if let Some(&ty) = self.types.get(&key) {
            return ty;
        }
        let on_limit = Idx::problem(ProblemKind::RecursionLimit);
        let ty = self.nested(on_limit, |this| this.lower_uncached(unit, te, ctx));
        if self.memoizing() {
            self.types.insert(key, ty);
        }
        ty
    }

    fn lower_uncached(&mut self, unit: &Unit, te: TypeExprId, ctx: Ctx) -> Idx {
        let pool = self.pool();
        match unit.arena().type_expr(te).kind.clone() {
            TypeExprKind::Builtin(builtin) => Idx::builtin(builtin),
            TypeExprKind::Named(name) => self.named_type(unit, name, ctx),
            TypeExprKind::Auto => match unit.invented.get(&te) {
                Some(&param) => match self.bound_arg(ctx, param) {
                    Some(TemplateArg::Type(bound)) => bound,
                    _ => pool.template_param(param),
                },
                None => Idx::AUTO,
            },
            TypeExprKind::DecltypeAuto => Idx::DECLTYPE_AUTO,
            TypeExprKind::Decltype(expr) => self.decltype(unit, expr, ctx),
            TypeExprKind::Qualified {
                inner,
                is_const,
                is_volatile,
            } => {
                let inner = self.lower_type(unit, inner, ctx);
                let mut cv = Cv::empty();
                cv.set(Cv::CONST, is_const);
                cv.set(Cv::VOLATILE, is_volatile);
                pool.qualified(inner, cv)
            }
            TypeExprKind::Pointer(inner) => {
                let inner = self.lower_type(unit, inner, ctx);
                pool.pointer(inner)
            }
            TypeExprKind::LValueRef(inner) => {
                let inner = self.lower_type(unit, inner, ctx);
                pool.lvalue_ref(inner)
            }
            TypeExprKind::RValueRef(inner) => {
                let inner = self.lower_type(unit, inner, ctx);
                pool.rvalue_ref(inner)
            }
            TypeExprKind::Array { elem, size } => {
                let elem = self.lower_type(unit, elem, ctx);
                let len = size
                    .and_then(|size| self.const_value(unit, size, ctx))
                    .and_then(Value::as_i64)
                    .and_then(|len| u64::try_from(len).ok());
                pool.array(elem, len)
            }
            TypeExprKind::Function {
                ret,
                params,
                variadic,
            } => {
                let params: Vec<TypeExprId> = unit.arena().type_list(params).to_vec();
                let params = self.lower_types(unit, &params, ctx);
                let ret = self.lower_type(unit, ret, ctx);
                pool.function(&params, ret, variadic)
            }
            TypeExprKind::PackExpansion(inner) => {
                let inner = self.lower_type(unit, inner, ctx);
                pool.pack_expansion(inner)
            }
        }
    }

    /// Lower a list, expanding pack expansions bound in `ctx`.
    pub(crate) fn lower_types(&mut self, unit: &Unit, tes: &[TypeExprId], ctx: Ctx) -> Vec<Idx> {
        let lowered: Vec<Idx> = tes.iter().map(|&te| self.lower_type(unit, te, ctx)).collect();
        if ctx.is_none() {
            return lowered;
        }
        self.subst_list_with(&lowered, ctx, None)
    }

    pub(crate) fn named_type(&mut self, unit: &Unit, name: NameId, ctx: Ctx) -> Idx {
        let found = self.lookup_name(unit, name, ctx, Want::Type);
        if found.symbols.is_empty() && !found.dependent {
            // A value named where a type is expected.
            let any = self.lookup_name(unit, name, ctx, Want::Any);
            if let Some(&symbol) = any.symbols.first() {
                self.record(unit.id, name, ctx, Binding::Declaration(symbol));
                return Idx::problem(ProblemKind::TypeMismatch);
            }
        }
        self.type_from_found(unit, name, &found, ctx)
    }

    /// Type denoted by the result of looking up `name`; records the binding.
    pub(crate) fn type_from_found(&mut self, unit: &Unit, name: NameId, found: &Found, ctx: Ctx) -> Idx {
        let pool = self.pool();
        let node = unit.arena().name(name);
        let (ident, qualifier, written_args) = (node.ident, node.qualifier, node.template_args);
        if found.dependent {
            self.record(unit.id, name, ctx, Binding::Dependent);
            let Some(qualifier) = qualifier else {
                return Idx::DEPENDENT;
            };
            let scope = self.qualifier_type(unit, qualifier, ctx);
            return pool.dependent_member(scope, ident);
        }
        let Some(&symbol_id) = found.symbols.first() else {
            let problem = self.problem_at(unit, name, ProblemKind::UnresolvedName);
            self.record(unit.id, name, ctx, Binding::Problem(problem));
            return Idx::problem(ProblemKind::UnresolvedName);
        };
        let symbol = self.session.symbol(symbol_id);
        let (ty, binding) = match (&symbol.kind, written_args) {
            (SymbolKind::Template(info), Some(args))
                if matches!(info.entity, TemplateEntity::Class { .. }) =>
            {
                let written = self.template_args(unit, args, ctx);
                self.specialization_type(symbol_id, written, ctx)
            }
            (SymbolKind::TemplateParam(info), Some(args))
                if matches!(info.kind, TemplateParamKind::Template(_)) =>
            {
                let written = self.template_args(unit, args, ctx);
                let ty = match self.bound_arg(found.ctx, info.param) {
                    Some(TemplateArg::Template(template)) => self.specialize(template, written, ctx),
                    _ => pool.param_specialization(info.param, written),
                };
                (ty, Binding::Declaration(symbol_id))
            }
            _ => {
                let ty = self.denoted_type(symbol_id, found.ctx);
                (ty, Binding::Declaration(symbol_id))
            }
        };
        let binding = match ty.as_problem() {
            Some(kind) if !matches!(binding, Binding::Problem(_)) => {
                Binding::Problem(self.problem_at(unit, name, kind))
            }
            _ => binding,
        };
        self.record(unit.id, name, ctx, binding);
        ty
    }

    /// Type of the qualifier of a dependent member type name.
    fn qualifier_type(&mut self, unit: &Unit, qualifier: NameId, ctx: Ctx) -> Idx {
        let found = self.lookup_name(unit, qualifier, ctx, Want::Scope);
        self.type_from_found(unit, qualifier, &found, ctx)
    }

    /// The type a type-declaring symbol stands for.
    pub(crate) fn denoted_type(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Idx {
        let pool = self.pool();
        let symbol = self.session.symbol(symbol_id);
        match &symbol.kind {
            SymbolKind::Class { .. } => pool.class(symbol_id),
            SymbolKind::Enum { .. } => pool.enumeration(symbol_id),
            SymbolKind::Closure { .. } => pool.closure(symbol_id),
            SymbolKind::Typedef { ty } => {
                let unit = self.session.unit(symbol.unit);
                let ctx = self.entity_ctx(&symbol, ctx);
                self.lower_type(&unit, *ty, ctx)
            }
            SymbolKind::TemplateParam(info) => match self.bound_arg(ctx, info.param) {
                Some(TemplateArg::Type(bound)) => bound,
                _ => pool.template_param(info.param),
            },
            SymbolKind::Template(info) if matches!(info.entity, TemplateEntity::Class { .. }) => {
                self.class_type(symbol_id, ctx)
            }
            _ => Idx::problem(ProblemKind::UnresolvedName),
        }
    }

    /// `S<args>` from written arguments, instantiated when concrete.
    pub(crate) fn specialization_type(
        &mut self,
        template: SymbolId,
        written: Vec<TemplateArg>,
        ctx: Ctx,
    ) -> (Idx, Binding) {
        let pool = self.pool();
        let args = match self.normalize_args(template, written, ctx) {
            Ok(args) => args,
            Err(kind) => return (Idx::problem(kind), problem_binding(kind)),
        };
        let ty = pool.specialization(template, args.clone());
        if let Some(kind) = ty.as_problem() {
            return (ty, problem_binding(kind));
        }
        if pool.is_dependent(ty) {
            return (ty, Binding::Dependent);
        }
        match self.instantiate(template, args, ctx) {
            Ok(instance) => (ty, Binding::Instance(instance)),
            Err(kind) => (Idx::problem(kind), problem_binding(kind)),
        }
    }

    /// Class template specialization formed during substitution.
    pub(crate) fn specialize(&mut self, template: SymbolId, written: Vec<TemplateArg>, ctx: Ctx) -> Idx {
        match self.normalize_args(template, written, ctx) {
            Ok(args) => self.pool().specialization(template, args),
            Err(kind) => Idx::problem(kind),
        }
    }

    /// Type of a class or class template as seen from inside it: the
    /// injected class name, specialized by `ctx` where it binds the
    /// template's parameters.
    pub(crate) fn class_type(&mut self, class: SymbolId, ctx: Ctx) -> Idx {
        let pool = self.pool();
        let symbol = self.session.symbol(class);
        let Some(info) = symbol.template_info() else {
            return match symbol.kind {
                SymbolKind::Class { .. } => pool.class(class),
                SymbolKind::Closure { .. } => pool.closure(class),
                _ => Idx::problem(ProblemKind::UnresolvedName),
            };
        };
        let (primary, args) = match info.specialization {
            Some(spec) => (spec.primary, self.pattern_args(class)),
            None => (class, own_args(pool, &symbol)),
        };
        let ty = pool.specialization(primary, args);
        let ctx = self.entity_ctx(&symbol, ctx);
        self.subst_with(ty, ctx, None)
    }

    /// Member type `name` of a concrete class type, for dependent member
    /// types under substitution.
    pub(crate) fn member_type(&mut self, scope: Idx, name: Name) -> Idx {
        let found = self.member_lookup(scope, name, Want::Type);
        match found.symbols.first() {
            Some(&symbol) => self.denoted_type(symbol, found.ctx),
            None => Idx::problem(ProblemKind::UnresolvedName),
        }
    }

    /// Declared (or deduced) type of the entity of a symbol.
    pub(crate) fn symbol_type(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Idx {
        let symbol = self.session.symbol(symbol_id);
        let ctx = self.entity_ctx(&symbol, ctx);
        let key = (symbol_id, ctx);
        if let Some(&ty) = self.symbol_types.get(&key) {
            return ty;
        }
        // Functions guard their own recursion through return deduction.
        let guarded = !symbol.is_function_like();
        if guarded && !self.evaluating.insert(key) {
            tracing::debug!(symbol = ?symbol_id, "type depends on itself");
            return Idx::problem(ProblemKind::DeductionFailure);
        }
        let on_limit = Idx::problem(ProblemKind::RecursionLimit);
        let ty = self.nested(on_limit, |this| this.symbol_type_uncached(&symbol, symbol_id, ctx));
        if guarded {
            self.evaluating.remove(&key);
        }
        if self.memoizing() {
            self.symbol_types.insert(key, ty);
        }
        ty
    }

    fn symbol_type_uncached(&mut self, symbol: &Symbol, symbol_id: SymbolId, ctx: Ctx) -> Idx {
        let pool = self.pool();
        let unit = self.session.unit(symbol.unit);
        match &symbol.kind {
            SymbolKind::Variable { ty, init } => self.variable_type(&unit, *ty, *init, ctx),
            SymbolKind::Parameter { ty, .. } => {
                let ty = self.lower_type(&unit, *ty, ctx);
                pool.adjust_param(ty)
            }
            SymbolKind::Function(_) | SymbolKind::CallOperator { .. } => {
                self.function_type(symbol_id, ctx)
            }
            SymbolKind::Enumerator { parent, .. } => pool.enumeration(*parent),
            SymbolKind::TemplateParam(info) => match info.kind {
                TemplateParamKind::NonType(ty) => self.lower_type(&unit, ty, ctx),
                _ => pool.template_param(info.param),
            },
            SymbolKind::InitCapture { init, by_ref, .. } => {
                self.init_capture_type(&unit, *init, *by_ref, ctx)
            }
            SymbolKind::Template(info) => match &info.entity {
                TemplateEntity::Variable { ty, init } => self.variable_type(&unit, *ty, *init, ctx),
                TemplateEntity::Function(_) | TemplateEntity::CallOperator { .. } => {
                    self.function_type(symbol_id, ctx)
                }
                TemplateEntity::Class { .. } => self.class_type(symbol_id, ctx),
            },
            SymbolKind::Class { .. } | SymbolKind::Enum { .. } | SymbolKind::Closure { .. } | SymbolKind::Typedef { .. } => {
                self.denoted_type(symbol_id, ctx)
            }
            SymbolKind::Namespace { .. } => Idx::problem(ProblemKind::UnresolvedName),
        }
    }

    fn variable_type(&mut self, unit: &Unit, ty: TypeExprId, init: Option<Initializer>, ctx: Ctx) -> Idx {
        let declared = self.lower_type(unit, ty, ctx);
        if !self.pool().has_placeholder(declared) {
            return declared;
        }
        self.deduce_auto(unit, declared, init, ctx)
    }

    /// Function type of a function, call operator or function template in
    /// `ctx`. Deduces a placeholder return type.
    pub(crate) fn function_type(&mut self, symbol: SymbolId, ctx: Ctx) -> Idx {
        let signature = self.signature(symbol, ctx);
        let ret = self.return_type(symbol, ctx);
        self.pool().function(&signature.params, ret, signature.variadic)
    }

    /// `decltype(expr)`: the declared type of a named entity, else the
    /// expression type adjusted by its value category.
    fn decltype(&mut self, unit: &Unit, expr: ExprId, ctx: Ctx) -> Idx {
        let info = self.expr(unit, expr, ctx);
        self.decltype_of(&info)
    }

    pub(crate) fn decltype_of(&mut self, info: &super::ExprInfo) -> Idx {
        let pool = self.pool();
        if info.ty.is_problem() || pool.is_dependent(info.ty) {
            return info.ty;
        }
        if let Some((symbol, ctx)) = info.entity {
            return self.symbol_type(symbol, ctx);
        }
        match info.category {
            ValueCategory::LValue => pool.lvalue_ref(info.ty),
            ValueCategory::XValue => pool.rvalue_ref(info.ty),
            ValueCategory::PRValue => info.ty,
        }
    }
}

fn problem_binding(kind: ProblemKind) -> Binding {
    Binding::Problem(cxx_diagnostic::Problem::new(kind, cxx_ir::Span::DUMMY))
}

/// A template's own parameters as an argument list.
pub(crate) fn own_args(pool: &cxx_types::TypePool, symbol: &Symbol) -> Vec<TemplateArg> {
    let Some(info) = symbol.template_info() else {
        return Vec::new();
    };
    info.params
        .iter()
        .map(|param| {
            let arg = match param.kind {
                TemplateParamKind::NonType(_) => TemplateArg::Value(Value::Param(param.param)),
                TemplateParamKind::Type | TemplateParamKind::Template(_) => {
                    TemplateArg::Type(pool.template_param(param.param))
                }
            };
            if !param.param.pack {
                return arg;
            }
            let elem = match arg {
                TemplateArg::Type(ty) => TemplateArg::Type(pool.pack_expansion(ty)),
                other => other,
            };
            TemplateArg::Pack(Arc::from([elem]))
        })
        .collect()
}
