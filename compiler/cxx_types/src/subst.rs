//! Template argument substitution.
//!
//! Rewrites template parameters in a type pattern with the arguments an
//! environment binds them to. Pack expansions inside parameter lists and
//! template argument lists are expanded to one element per bound pack
//! argument; an empty pack expands to nothing.

use cxx_diagnostic::ProblemKind;
use cxx_ir::Name;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{FunctionSig, Idx, ParamRef, SymbolId, TemplateArg, TypeData, TypeFlags, TypePool, Value};

/// Source of template argument bindings.
pub trait SubstEnv {
    /// Argument bound to `param`, or `None` to leave it in place.
    fn lookup_param(&self, param: ParamRef) -> Option<TemplateArg>;

    /// Member type `name` of the concrete class type `scope`.
    fn member_type(&mut self, pool: &TypePool, scope: Idx, name: Name) -> Idx {
        let _ = (pool, scope, name);
        Idx::problem(ProblemKind::UnresolvedName)
    }

    /// Specialization of class template `template` with written arguments.
    fn specialize(&mut self, pool: &TypePool, template: SymbolId, args: Vec<TemplateArg>) -> Idx {
        pool.specialization(template, args)
    }
}

/// Template parameter bindings keyed by parameter position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamBindings {
    map: FxHashMap<(u16, u16), TemplateArg>,
}

impl ParamBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: ParamRef) -> Option<&TemplateArg> {
        self.map.get(&(param.depth, param.index))
    }

    pub fn insert(&mut self, param: ParamRef, arg: TemplateArg) -> Option<TemplateArg> {
        self.map.insert((param.depth, param.index), arg)
    }

    pub fn contains(&self, param: ParamRef) -> bool {
        self.map.contains_key(&(param.depth, param.index))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl SubstEnv for ParamBindings {
    fn lookup_param(&self, param: ParamRef) -> Option<TemplateArg> {
        self.get(param).cloned()
    }
}

/// Substitute into a type.
pub fn subst(pool: &TypePool, ty: Idx, env: &mut dyn SubstEnv) -> Idx {
    Substituter::new(pool, env).ty(ty)
}

/// Substitute into a parameter list, expanding pack expansions.
pub fn subst_list(pool: &TypePool, tys: &[Idx], env: &mut dyn SubstEnv) -> Vec<Idx> {
    Substituter::new(pool, env).list(tys)
}

/// Substitute into a template argument list, expanding pack expansions.
pub fn subst_args(pool: &TypePool, args: &[TemplateArg], env: &mut dyn SubstEnv) -> Vec<TemplateArg> {
    Substituter::new(pool, env).args(args)
}

/// Substitute a non-type parameter reference by its bound value.
pub fn subst_value(value: Value, env: &dyn SubstEnv) -> Value {
    match value {
        Value::Param(param) => match env.lookup_param(param) {
            Some(TemplateArg::Value(bound)) => bound,
            _ => value,
        },
        _ => value,
    }
}

/// Template parameter packs mentioned in `ty` outside any pack expansion.
pub fn unexpanded_packs(pool: &TypePool, ty: Idx) -> SmallVec<[ParamRef; 2]> {
    let mut out = SmallVec::new();
    collect_packs(pool, ty, &mut out);
    out
}

fn collect_packs(pool: &TypePool, ty: Idx, out: &mut SmallVec<[ParamRef; 2]>) {
    if !pool.flags(ty).contains(TypeFlags::HAS_UNEXPANDED_PACK) {
        return;
    }
    match pool.get(ty) {
        TypeData::TemplateParam(param) => {
            if !out.contains(&param) {
                out.push(param);
            }
        }
        TypeData::Pointer(inner)
        | TypeData::LValueRef(inner)
        | TypeData::RValueRef(inner)
        | TypeData::Qualified { inner, .. }
        | TypeData::Array { elem: inner, .. }
        | TypeData::DependentMember { scope: inner, .. } => collect_packs(pool, inner, out),
        TypeData::Function(FunctionSig { params, ret, .. }) => {
            for &p in params.iter() {
                collect_packs(pool, p, out);
            }
            collect_packs(pool, ret, out);
        }
        TypeData::ParamSpecialization { args, .. } | TypeData::Specialization { args, .. } => {
            collect_arg_packs(pool, &args, out);
        }
        _ => {}
    }
}

fn collect_arg_packs(pool: &TypePool, args: &[TemplateArg], out: &mut SmallVec<[ParamRef; 2]>) {
    for arg in args {
        match arg {
            TemplateArg::Type(ty) => collect_packs(pool, *ty, out),
            TemplateArg::Value(Value::Param(param)) if param.pack && !out.contains(param) => {
                out.push(*param);
            }
            TemplateArg::Pack(elems) => collect_arg_packs(pool, elems, out),
            TemplateArg::Value(_) | TemplateArg::Template(_) => {}
        }
    }
}

enum Expansion {
    Unbound,
    /// Packs of different lengths in one expansion.
    Mismatch,
    Len(usize),
}

struct Substituter<'a> {
    pool: &'a TypePool,
    env: &'a mut dyn SubstEnv,
    /// Element index while expanding a pack expansion.
    pack_index: Option<usize>,
}

impl<'a> Substituter<'a> {
    fn new(pool: &'a TypePool, env: &'a mut dyn SubstEnv) -> Self {
        Substituter {
            pool,
            env,
            pack_index: None,
        }
    }

    fn ty(&mut self, ty: Idx) -> Idx {
        if !self.pool.is_dependent(ty) {
            return ty;
        }
        let pool = self.pool;
        match pool.get(ty) {
            TypeData::TemplateParam(param) => match self.env.lookup_param(param) {
                Some(TemplateArg::Type(bound)) => bound,
                Some(TemplateArg::Pack(elems)) => match self.pack_index {
                    Some(i) => elems
                        .get(i)
                        .and_then(TemplateArg::as_type)
                        .unwrap_or(Idx::problem(ProblemKind::DeductionFailure)),
                    None => ty,
                },
                Some(TemplateArg::Value(_) | TemplateArg::Template(_)) => {
                    Idx::problem(ProblemKind::DeductionFailure)
                }
                None => ty,
            },
            TypeData::Pointer(inner) => {
                let inner = self.ty(inner);
                pool.pointer(inner)
            }
            TypeData::LValueRef(inner) => {
                let inner = self.ty(inner);
                pool.lvalue_ref(inner)
            }
            TypeData::RValueRef(inner) => {
                let inner = self.ty(inner);
                pool.rvalue_ref(inner)
            }
            TypeData::Qualified { inner, cv } => {
                let inner = self.ty(inner);
                pool.qualified(inner, cv)
            }
            TypeData::Array { elem, len } => {
                let elem = self.ty(elem);
                pool.array(elem, len)
            }
            TypeData::Function(sig) => {
                let params = self.list(&sig.params);
                let ret = self.ty(sig.ret);
                pool.function(&params, ret, sig.variadic)
            }
            TypeData::ParamSpecialization { param, args } => {
                let args = self.args(&args);
                match self.env.lookup_param(param) {
                    Some(TemplateArg::Template(template)) => {
                        self.env.specialize(pool, template, args)
                    }
                    Some(_) => Idx::problem(ProblemKind::DeductionFailure),
                    None => pool.param_specialization(param, args),
                }
            }
            TypeData::Specialization { template, args } => {
                let new_args = self.args(&args);
                if *new_args == *args {
                    ty
                } else {
                    pool.specialization(template, new_args)
                }
            }
            TypeData::DependentMember { scope, name } => {
                let scope = self.ty(scope);
                if pool.is_dependent(scope) || scope.is_problem() {
                    pool.dependent_member(scope, name)
                } else {
                    self.env.member_type(pool, scope, name)
                }
            }
            TypeData::PackExpansion(pattern) => {
                let pattern = self.ty(pattern);
                pool.pack_expansion(pattern)
            }
            TypeData::Builtin(_)
            | TypeData::Class(_)
            | TypeData::Enum(_)
            | TypeData::Closure(_)
            | TypeData::Auto
            | TypeData::DecltypeAuto
            | TypeData::Dependent
            | TypeData::Problem(_) => ty,
        }
    }

    /// Number of elements a pack expansion over `packs` expands to.
    fn expansion_len(&self, packs: &[ParamRef]) -> Expansion {
        let mut len = None;
        for &param in packs {
            let Some(TemplateArg::Pack(elems)) = self.env.lookup_param(param) else {
                return Expansion::Unbound;
            };
            match len {
                None => len = Some(elems.len()),
                Some(n) if n != elems.len() => return Expansion::Mismatch,
                Some(_) => {}
            }
        }
        len.map_or(Expansion::Unbound, Expansion::Len)
    }

    /// Substitute `pattern` once per pack element. `None` leaves the
    /// expansion unexpanded.
    fn expand(&mut self, pattern: Idx) -> Option<Vec<Idx>> {
        let packs = unexpanded_packs(self.pool, pattern);
        match self.expansion_len(&packs) {
            Expansion::Unbound => None,
            Expansion::Mismatch => Some(vec![Idx::problem(ProblemKind::DeductionFailure)]),
            Expansion::Len(len) => {
                let saved = self.pack_index;
                let mut out = Vec::with_capacity(len);
                for i in 0..len {
                    self.pack_index = Some(i);
                    out.push(self.ty(pattern));
                }
                self.pack_index = saved;
                Some(out)
            }
        }
    }

    fn list(&mut self, tys: &[Idx]) -> Vec<Idx> {
        let mut out = Vec::with_capacity(tys.len());
        for &ty in tys {
            if let TypeData::PackExpansion(pattern) = self.pool.get(ty) {
                if let Some(expanded) = self.expand(pattern) {
                    out.extend(expanded);
                    continue;
                }
            }
            out.push(self.ty(ty));
        }
        out
    }

    fn args(&mut self, args: &[TemplateArg]) -> Vec<TemplateArg> {
        let mut out = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                TemplateArg::Type(ty) => {
                    if let TypeData::PackExpansion(pattern) = self.pool.get(*ty) {
                        if let Some(expanded) = self.expand(pattern) {
                            out.extend(expanded.into_iter().map(TemplateArg::Type));
                            continue;
                        }
                    }
                    if let TypeData::TemplateParam(param) = self.pool.get(*ty) {
                        // Template template argument.
                        if let Some(bound @ TemplateArg::Template(_)) = self.env.lookup_param(param) {
                            out.push(bound);
                            continue;
                        }
                    }
                    out.push(TemplateArg::Type(self.ty(*ty)));
                }
                TemplateArg::Value(Value::Param(param)) => match self.env.lookup_param(*param) {
                    Some(TemplateArg::Pack(elems)) => match self.pack_index {
                        Some(i) => out.extend(elems.get(i).cloned()),
                        // A bare non-type pack in an argument list is its expansion.
                        None => out.extend(elems.iter().cloned()),
                    },
                    Some(bound @ TemplateArg::Value(_)) => out.push(bound),
                    Some(_) | None => out.push(arg.clone()),
                },
                TemplateArg::Pack(elems) => {
                    let elems = self.args(elems);
                    out.push(TemplateArg::Pack(elems.into()));
                }
                TemplateArg::Value(_) | TemplateArg::Template(_) => out.push(arg.clone()),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests;
