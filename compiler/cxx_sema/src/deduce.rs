//! Placeholder types and closures.
//!
//! `auto` in a variable, init-capture or return type is deduced like the
//! parameter of an invented function template called with the
//! initializer. A placeholder return type is deduced from the `return`
//! statements of the body: all of them must agree, and a body without one
//! returns `void`.
//!
//! # Recursion
//!
//! A function may call itself once a non-recursive `return` fixed its
//! type. Deduction runs in two passes: returns that failed after
//! consulting any in-progress deduction are set aside, the rest fix a
//! tentative type, and the set-aside returns are then checked against it.
//! A set-aside return still waiting on an enclosing deduction without a
//! type is left to that deduction, which sees this function's result.
//! While any deduction is in progress nothing is memoized, since results
//! may rest on a tentative type.
//!
//! # Closures
//!
//! A lambda expression evaluated in an instantiation context gets its own
//! closure type, synthesized on first use and shared through the session.
//! A generic lambda's call operator is a function template over the
//! parameters invented for its `auto` parameters.

use cxx_diagnostic::ProblemKind;
use cxx_ir::{
    Access, DeclKind, DeclSpecifiers, ExprId, ExprKind, Initializer, Name, StmtId, StmtKind, TemplateParamKind,
};
use cxx_types::{Idx, ParamRef, SymbolId, TypeData, TypePool};
use smallvec::SmallVec;

use crate::resolver::{ExprInfo, Resolver};
use crate::session::{BodyOwner, LambdaInfo, Unit};
use crate::symbol::{Symbol, SymbolKind, TemplateEntity, TemplateInfo, TemplateParamInfo};
use crate::template::{CallArg, Deduction};
use crate::{Ctx, UnitId};

/// Parameter standing for `auto` while it is deduced.
const PLACEHOLDER: ParamRef = ParamRef::new(ParamRef::SYNTHESIZED_DEPTH - 1, 0, false, Name::EMPTY);

/// Progress of the return type deduction of one function in one context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ReturnState {
    /// Being deduced; `tentative` is set once the non-recursive returns
    /// agreed.
    InProgress { tentative: Option<Idx> },
    Done(Idx),
}

impl Resolver<'_> {
    /// Return type as written: the trailing return type of `auto f() -> T`,
    /// else the declared one. A lambda without a trailing return type
    /// returns `auto`.
    pub(crate) fn declared_return(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Idx {
        let symbol = self.session.symbol(symbol_id);
        let ctx = self.entity_ctx(&symbol, ctx);
        let unit = self.session.unit(symbol.unit);
        let arena = unit.arena();
        match written_return(&symbol, &unit) {
            Some(WrittenReturn::Function { ret, trailing }) => {
                let declared = self.lower_type(&unit, ret, ctx);
                match trailing {
                    Some(trailing) if declared == Idx::AUTO => self.lower_type(&unit, trailing, ctx),
                    _ => declared,
                }
            }
            Some(WrittenReturn::Lambda(lambda)) => match &arena.expr(lambda).kind {
                ExprKind::Lambda(expr) => match expr.trailing_return {
                    Some(trailing) => self.lower_type(&unit, trailing, ctx),
                    None => Idx::AUTO,
                },
                _ => Idx::problem(ProblemKind::UnresolvedName),
            },
            None => Idx::problem(ProblemKind::UnresolvedName),
        }
    }

    /// Return type of a function, call operator or function template in
    /// `ctx`, deducing a placeholder from the body.
    pub(crate) fn return_type(&mut self, symbol_id: SymbolId, ctx: Ctx) -> Idx {
        let pool = self.pool();
        let declared = self.declared_return(symbol_id, ctx);
        if !pool.has_placeholder(declared) {
            return declared;
        }
        let symbol = self.session.symbol(symbol_id);
        let ctx = self.entity_ctx(&symbol, ctx);
        let key = (symbol_id, ctx);
        match self.returns.get(&key) {
            Some(ReturnState::Done(ty)) => return *ty,
            Some(ReturnState::InProgress { tentative }) => {
                let tentative = *tentative;
                self.hits.push(key);
                return tentative.unwrap_or(Idx::problem(ProblemKind::DeductionFailure));
            }
            None => {}
        }
        let unit = self.session.unit(symbol.unit);
        let statements = body_owner(&symbol).and_then(|owner| unit.returns.get(&owner)).cloned();
        let Some(statements) = statements else {
            tracing::debug!(function = ?symbol_id, "placeholder return type without a body");
            return Idx::problem(ProblemKind::DeductionFailure);
        };

        self.returns.insert(key, ReturnState::InProgress { tentative: None });
        self.in_progress += 1;
        let on_limit = Idx::problem(ProblemKind::RecursionLimit);
        let ty = self.nested(on_limit, |this| this.deduce_return(&unit, declared, &statements, key));
        self.in_progress -= 1;
        self.returns.remove(&key);
        if self.in_progress == 0 {
            self.hits.clear();
        }
        if self.memoizing() {
            self.returns.insert(key, ReturnState::Done(ty));
        }
        tracing::debug!(function = ?symbol_id, ty = %self.session.display_type(ty), "return type deduced");
        ty
    }

    fn deduce_return(
        &mut self,
        unit: &Unit,
        declared: Idx,
        statements: &[StmtId],
        key: (SymbolId, Ctx),
    ) -> Idx {
        let pool = self.pool();
        let ctx = key.1;
        if statements.is_empty() {
            return match declared {
                Idx::AUTO | Idx::DECLTYPE_AUTO => Idx::VOID,
                _ => Idx::problem(ProblemKind::DeductionFailure),
            };
        }
        let mut deduced: Option<Idx> = None;
        let mut deferred: SmallVec<[StmtId; 2]> = SmallVec::new();
        for &statement in statements {
            let mark = self.hits.len();
            let ty = self.returned_type(unit, declared, statement, ctx);
            if ty.is_problem() || pool.is_dependent(ty) {
                if self.consulted_in_progress(mark, |_| true) {
                    deferred.push(statement);
                    continue;
                }
                return ty;
            }
            match deduced {
                None => deduced = Some(ty),
                Some(previous) if previous == ty => {}
                Some(previous) => {
                    tracing::debug!(
                        first = %self.session.display_type(previous),
                        other = %self.session.display_type(ty),
                        "return statements disagree"
                    );
                    return Idx::problem(ProblemKind::TypeMismatch);
                }
            }
        }
        let Some(ty) = deduced else {
            tracing::debug!(function = ?key.0, "every return statement recurses");
            return Idx::problem(ProblemKind::DeductionFailure);
        };
        if deferred.is_empty() {
            return ty;
        }
        self.returns.insert(key, ReturnState::InProgress { tentative: Some(ty) });
        for statement in deferred {
            let mark = self.hits.len();
            let again = self.returned_type(unit, declared, statement, ctx);
            if again.is_problem() {
                // An enclosing deduction without a type yet checks this
                // return through its own result.
                let waiting = self.consulted_in_progress(mark, |state| {
                    matches!(state, ReturnState::InProgress { tentative: None })
                });
                if waiting {
                    continue;
                }
                return again;
            }
            if again != ty {
                return Idx::problem(ProblemKind::TypeMismatch);
            }
        }
        ty
    }

    /// Whether a return type deduction still in progress, in a state
    /// accepted by `filter`, was consulted since `mark`.
    fn consulted_in_progress(&self, mark: usize, filter: impl Fn(ReturnState) -> bool) -> bool {
        self.hits.get(mark..).unwrap_or_default().iter().any(|key| {
            self.returns
                .get(key)
                .is_some_and(|&state| matches!(state, ReturnState::InProgress { .. }) && filter(state))
        })
    }

    /// Type one `return` statement deduces.
    fn returned_type(&mut self, unit: &Unit, declared: Idx, statement: StmtId, ctx: Ctx) -> Idx {
        let StmtKind::Return(value) = unit.arena().stmt(statement).kind else {
            return Idx::problem(ProblemKind::DeductionFailure);
        };
        let info = match value {
            Some(expr) => self.expr(unit, expr, ctx),
            None => ExprInfo::prvalue(Idx::VOID),
        };
        if info.ty == Idx::VOID {
            return match declared {
                Idx::AUTO | Idx::DECLTYPE_AUTO => Idx::VOID,
                _ => Idx::problem(ProblemKind::DeductionFailure),
            };
        }
        self.deduce_placeholder(declared, &info)
    }

    /// Deduce the placeholder of `declared` from an initializer.
    pub(crate) fn deduce_placeholder(&mut self, declared: Idx, init: &ExprInfo) -> Idx {
        let pool = self.pool();
        if init.ty.is_problem() {
            return init.ty;
        }
        if declared == Idx::DECLTYPE_AUTO {
            return self.decltype_of(init);
        }
        let pattern = replace_auto(pool, declared, pool.template_param(PLACEHOLDER));
        let mut deduction = Deduction::new(pool, PLACEHOLDER.depth);
        let arg = CallArg {
            ty: Some(init.ty),
            category: init.category,
        };
        if !deduction.deduce_call(&[pattern], &[arg]) || !deduction.bindings.contains(PLACEHOLDER) {
            return Idx::problem(ProblemKind::DeductionFailure);
        }
        let mut bindings = deduction.bindings;
        cxx_types::subst::subst(pool, pattern, &mut bindings)
    }

    /// Type of an `auto` variable from its initializer.
    pub(crate) fn deduce_auto(&mut self, unit: &Unit, declared: Idx, init: Option<Initializer>, ctx: Ctx) -> Idx {
        let expr = match init {
            Some(Initializer::Copy(expr)) => expr,
            Some(Initializer::Direct(exprs) | Initializer::List(exprs)) => match unit.arena().expr_list(exprs) {
                [only] => *only,
                _ => return Idx::problem(ProblemKind::DeductionFailure),
            },
            // `auto x = {...}` would be a list of the element type.
            Some(Initializer::CopyList(_)) => return Idx::problem(ProblemKind::TypeMismatch),
            None => return Idx::problem(ProblemKind::DeductionFailure),
        };
        let info = self.expr(unit, expr, ctx);
        self.deduce_placeholder(declared, &info)
    }

    /// Type of an init-capture: `[x = e]` declares `auto x = e`,
    /// `[&x = e]` declares `auto& x = e`.
    pub(crate) fn init_capture_type(&mut self, unit: &Unit, init: ExprId, by_ref: bool, ctx: Ctx) -> Idx {
        let pool = self.pool();
        let declared = if by_ref { pool.lvalue_ref(Idx::AUTO) } else { Idx::AUTO };
        let info = self.expr(unit, init, ctx);
        self.deduce_placeholder(declared, &info)
    }

    /// Closure type symbol of a lambda expression evaluated in `ctx`.
    pub(crate) fn closure_of(&mut self, unit: &Unit, lambda: ExprId, ctx: Ctx) -> Option<SymbolId> {
        let info = unit.lambdas.get(&lambda)?;
        let home = self.ctx_for(ctx, info.depth);
        let key = (unit.id, lambda, home);
        if let Some(closure) = self.session.closures.get(&key) {
            return Some(*closure);
        }
        let closure = *self.session.closures.entry(key).or_insert_with(|| {
            self.session
                .symbols()
                .push_group(|first| closure_symbols(unit.id, lambda, info, home, first))
        });
        tracing::trace!(?lambda, ?closure, generic = !info.invented.is_empty(), "closure synthesized");
        Some(closure)
    }
}

enum WrittenReturn {
    Function {
        ret: cxx_ir::TypeExprId,
        trailing: Option<cxx_ir::TypeExprId>,
    },
    Lambda(ExprId),
}

fn written_return(symbol: &Symbol, unit: &Unit) -> Option<WrittenReturn> {
    let lambda = match &symbol.kind {
        SymbolKind::CallOperator { lambda, .. }
        | SymbolKind::Template(TemplateInfo {
            entity: TemplateEntity::CallOperator { lambda, .. },
            ..
        }) => Some(*lambda),
        _ => None,
    };
    if let Some(lambda) = lambda {
        return Some(WrittenReturn::Lambda(lambda));
    }
    let decl = match body_owner(symbol)? {
        BodyOwner::Function(decl) => decl,
        BodyOwner::Lambda(_) => return None,
    };
    match &unit.arena().decl(decl).kind {
        DeclKind::Function(function) => Some(WrittenReturn::Function {
            ret: function.ret,
            trailing: function.trailing_return,
        }),
        _ => None,
    }
}

/// Body whose `return` statements deduce the return type of `symbol`.
fn body_owner(symbol: &Symbol) -> Option<BodyOwner> {
    match &symbol.kind {
        SymbolKind::Function(_) => symbol.decl.map(BodyOwner::Function),
        SymbolKind::CallOperator { lambda, .. } => Some(BodyOwner::Lambda(*lambda)),
        SymbolKind::Template(info) => match info.entity {
            TemplateEntity::Function(_) => info.inner.map(BodyOwner::Function),
            TemplateEntity::CallOperator { lambda, .. } => Some(BodyOwner::Lambda(lambda)),
            _ => None,
        },
        _ => None,
    }
}

/// `declared` with its `auto` replaced by `with`.
fn replace_auto(pool: &TypePool, declared: Idx, with: Idx) -> Idx {
    if declared == Idx::AUTO {
        return with;
    }
    match pool.get(declared) {
        TypeData::Qualified { inner, cv } => pool.qualified(replace_auto(pool, inner, with), cv),
        TypeData::Pointer(inner) => pool.pointer(replace_auto(pool, inner, with)),
        TypeData::LValueRef(inner) => pool.lvalue_ref(replace_auto(pool, inner, with)),
        TypeData::RValueRef(inner) => pool.rvalue_ref(replace_auto(pool, inner, with)),
        _ => declared,
    }
}

/// The closure class and its call operator, numbered from `first`.
fn closure_symbols(unit: UnitId, lambda: ExprId, info: &LambdaInfo, home: Ctx, first: SymbolId) -> Vec<Symbol> {
    let call = SymbolId::new(first.raw() + 1);
    let synthesized = |kind, scope| Symbol {
        name: Name::EMPTY,
        kind,
        unit,
        scope,
        decl: None,
        sites: SmallVec::new(),
        specifiers: DeclSpecifiers::empty(),
        access: Access::Public,
        ctx: home,
        template_depth: info.depth,
    };
    let closure = synthesized(SymbolKind::Closure { lambda, call }, info.enclosing);
    let entity = if info.invented.is_empty() {
        SymbolKind::CallOperator {
            lambda,
            closure: first,
        }
    } else {
        let params = info
            .invented
            .iter()
            .map(|&param| TemplateParamInfo {
                param,
                kind: TemplateParamKind::Type,
                default: None,
            })
            .collect();
        SymbolKind::Template(TemplateInfo {
            entity: TemplateEntity::CallOperator {
                lambda,
                closure: first,
            },
            inner: None,
            params,
            depth: info.depth,
            param_scope: Some(info.scope),
            specialization: None,
            specializations: Vec::new(),
        })
    };
    let operator = synthesized(entity, info.scope);
    vec![closure, operator]
}

#[cfg(test)]
mod tests;
