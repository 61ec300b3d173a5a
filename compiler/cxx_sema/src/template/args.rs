//! Template argument resolution and normalization.

use std::sync::Arc;

use cxx_diagnostic::ProblemKind;
use cxx_ir::{NameId, TemplateArgRange, TemplateParamKind, TypeExprKind};
use cxx_types::{ParamBindings, SymbolId, TemplateArg, TypeData, Value};

use crate::resolver::{Resolver, Want};
use crate::session::Unit;
use crate::symbol::{Symbol, SymbolKind, TemplateEntity, TemplateParamInfo};
use crate::{Binding, Ctx};

impl Resolver<'_> {
    /// Resolve written template arguments of `unit` in `ctx`, expanding
    /// packs the context binds.
    pub(crate) fn template_args(&mut self, unit: &Unit, range: TemplateArgRange, ctx: Ctx) -> Vec<TemplateArg> {
        let written: Vec<cxx_ir::TemplateArg> = unit.arena().template_args(range).to_vec();
        let args: Vec<TemplateArg> = written
            .into_iter()
            .map(|arg| self.template_arg(unit, arg, ctx))
            .collect();
        if ctx.is_none() {
            return args;
        }
        self.subst_args_with(&args, ctx, None)
    }

    fn template_arg(&mut self, unit: &Unit, arg: cxx_ir::TemplateArg, ctx: Ctx) -> TemplateArg {
        match arg {
            cxx_ir::TemplateArg::Type(te) => {
                if let TypeExprKind::Named(name) = unit.arena().type_expr(te).kind {
                    if let Some(arg) = self.non_type_named(unit, name, ctx) {
                        return arg;
                    }
                }
                TemplateArg::Type(self.lower_type(unit, te, ctx))
            }
            cxx_ir::TemplateArg::Expr(expr) => {
                self.expr(unit, expr, ctx);
                TemplateArg::Value(self.const_value(unit, expr, ctx).unwrap_or(Value::Dependent))
            }
        }
    }

    /// A plain name in type position naming a value or a template: the
    /// parser cannot tell `f<N>` from `f<T>`.
    fn non_type_named(&mut self, unit: &Unit, name: NameId, ctx: Ctx) -> Option<TemplateArg> {
        if unit.arena().name(name).template_args.is_some() {
            return None;
        }
        let found = self.lookup_name(unit, name, ctx, Want::Any);
        let &symbol_id = found.symbols.first()?;
        let symbol = self.session.symbol(symbol_id);
        let arg = match &symbol.kind {
            SymbolKind::Variable { .. } | SymbolKind::Enumerator { .. } | SymbolKind::Parameter { .. } => {
                let value = self.symbol_value(symbol_id, found.ctx);
                TemplateArg::Value(value.unwrap_or(Value::Dependent))
            }
            SymbolKind::TemplateParam(info) => match info.kind {
                TemplateParamKind::NonType(_) => {
                    let value = self.symbol_value(symbol_id, found.ctx);
                    TemplateArg::Value(value.unwrap_or(Value::Param(info.param)))
                }
                TemplateParamKind::Template(_) => match self.bound_arg(found.ctx, info.param) {
                    Some(bound @ TemplateArg::Template(_)) => bound,
                    _ => TemplateArg::Type(self.pool().template_param(info.param)),
                },
                TemplateParamKind::Type => return None,
            },
            SymbolKind::Template(info)
                if matches!(info.entity, TemplateEntity::Class { .. }) && info.specialization.is_none() =>
            {
                TemplateArg::Template(symbol_id)
            }
            _ => return None,
        };
        self.record(unit.id, name, ctx, Binding::Declaration(symbol_id));
        Some(arg)
    }

    /// One argument per parameter of `template`: written arguments map
    /// positionally, a parameter pack takes the rest, and missing
    /// parameters take their defaults.
    pub(crate) fn normalize_args(
        &mut self,
        template: SymbolId,
        written: Vec<TemplateArg>,
        ctx: Ctx,
    ) -> Result<Vec<TemplateArg>, ProblemKind> {
        let symbol = self.session.symbol(template);
        let Some(info) = symbol.template_info() else {
            return Err(ProblemKind::TypeMismatch);
        };
        let pack_at = info.params.iter().position(|param| param.param.pack);
        if let Some(first) = written.iter().position(|arg| self.is_unexpanded(arg)) {
            // The length of an unexpanded pack is unknown; only a parameter
            // pack can take it.
            if !matches!(pack_at, Some(pack) if first >= pack) {
                return Ok(written);
            }
        }
        let mut bindings = ParamBindings::new();
        let mut written = written.into_iter();
        for param in info.params.iter() {
            if param.param.pack {
                let rest: Vec<TemplateArg> = written.by_ref().collect();
                bindings.insert(param.param, TemplateArg::Pack(rest.into()));
                break;
            }
            let Some(arg) = written.next() else {
                break;
            };
            let arg = self.coerce_arg(&symbol, param, arg, ctx);
            bindings.insert(param.param, arg);
        }
        if written.next().is_some() {
            tracing::debug!(template = ?template, "too many template arguments");
            return Err(ProblemKind::DeductionFailure);
        }
        self.complete_args(&symbol, bindings, ctx)
    }

    fn is_unexpanded(&self, arg: &TemplateArg) -> bool {
        match arg {
            TemplateArg::Type(ty) => matches!(self.pool().get(*ty), TypeData::PackExpansion(_)),
            TemplateArg::Value(Value::Param(param)) => param.pack,
            _ => false,
        }
    }

    /// Adjust an argument to the kind of its parameter.
    pub(crate) fn coerce_arg(
        &mut self,
        template: &Symbol,
        param: &TemplateParamInfo,
        arg: TemplateArg,
        ctx: Ctx,
    ) -> TemplateArg {
        match (&param.kind, arg) {
            // Injected class name used as a type.
            (TemplateParamKind::Type, TemplateArg::Template(class)) => {
                TemplateArg::Type(self.class_type(class, ctx))
            }
            (TemplateParamKind::NonType(ty), TemplateArg::Value(value)) => {
                let unit = self.session.unit(template.unit);
                let outer = self.param_ctx(template, ctx);
                let ty = self.lower_type(&unit, *ty, outer);
                match self.pool().builtin_of(ty) {
                    Some(builtin) => TemplateArg::Value(value.convert_to(builtin)),
                    None => TemplateArg::Value(value),
                }
            }
            (_, arg) => arg,
        }
    }

    /// Complete partial bindings of `template`'s parameters into an argument
    /// list: unbound packs are empty, unbound parameters take defaults.
    pub(crate) fn complete_args(
        &mut self,
        template: &Symbol,
        mut bindings: ParamBindings,
        ctx: Ctx,
    ) -> Result<Vec<TemplateArg>, ProblemKind> {
        let Some(info) = template.template_info() else {
            return Ok(Vec::new());
        };
        let mut args = Vec::with_capacity(info.params.len());
        for param in info.params.iter() {
            let arg = match bindings.get(param.param) {
                Some(arg) => arg.clone(),
                None if param.param.pack => TemplateArg::Pack(Arc::from([])),
                None => match param.default {
                    Some(default) => self.default_arg(template, default, &bindings, ctx)?,
                    None => return Err(ProblemKind::DeductionFailure),
                },
            };
            bindings.insert(param.param, arg.clone());
            args.push(arg);
        }
        Ok(args)
    }

    /// Default template argument, with the preceding parameters bound.
    fn default_arg(
        &mut self,
        template: &Symbol,
        default: cxx_ir::TemplateArg,
        bindings: &ParamBindings,
        ctx: Ctx,
    ) -> Result<TemplateArg, ProblemKind> {
        if self.depth >= self.session.config().max_instantiation_depth {
            tracing::debug!(depth = self.depth, "default argument recursion limit");
            return Err(ProblemKind::RecursionLimit);
        }
        let unit = self.session.unit(template.unit);
        let outer = self.param_ctx(template, ctx);
        self.depth += 1;
        let arg = cxx_stack::ensure_sufficient_stack(|| self.template_arg(&unit, default, outer));
        let arg = match arg {
            TemplateArg::Type(ty) => TemplateArg::Type(self.subst_with(ty, outer, Some(bindings))),
            TemplateArg::Value(value) => TemplateArg::Value(self.subst_value_with(value, outer, Some(bindings))),
            other => other,
        };
        self.depth -= 1;
        match arg {
            TemplateArg::Type(ty) if ty.is_problem() => Err(ty.as_problem().unwrap_or(ProblemKind::DeductionFailure)),
            arg => Ok(arg),
        }
    }

    /// Context of a template's parameter list: the enclosing instances,
    /// excluding any instance of the template itself.
    pub(crate) fn param_ctx(&self, template: &Symbol, ctx: Ctx) -> Ctx {
        let depth = template.template_info().map_or(template.template_depth, |info| info.depth);
        self.ctx_for(ctx, depth)
    }

    /// Arguments of the primary template a specialization's pattern
    /// matches: `S<T*>` gives `[T*]`, with defaults filled in.
    pub(crate) fn pattern_args(&mut self, spec: SymbolId) -> Vec<TemplateArg> {
        let symbol = self.session.symbol(spec);
        let Some(of) = symbol.template_info().and_then(|info| info.specialization) else {
            return Vec::new();
        };
        let unit = self.session.unit(symbol.unit);
        let written = self.template_args(&unit, of.args, None);
        match self.normalize_args(of.primary, written.clone(), None) {
            Ok(args) => args,
            Err(kind) => {
                tracing::debug!(?spec, ?kind, "specialization arguments do not match the primary");
                written
            }
        }
    }
}
