//! Name lookup.
//!
//! Unqualified lookup walks the scope chain of the name and stops at the
//! nearest scope declaring it; class scopes also search their bases.
//! Qualified lookup searches the named scope only. Namespace-scope lookups
//! that find nothing in the unit fall back to the cross-unit index.
//!
//! A scope's result merges its own declarations, the targets of its
//! using-declarations and the members of the namespaces its
//! using-directives nominate, followed transitively. Qualified lookup
//! into a namespace consults nominated namespaces only when the namespace
//! itself declares nothing. Unqualified calls also search the namespaces
//! associated with their argument types.

use std::sync::Arc;

use cxx_ir::{Name, NameId};
use cxx_types::{Idx, SymbolId, TemplateArg, TypeData};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use super::Resolver;
use crate::index::QualifiedName;
use crate::scope::{ScopeKind, ScopeTree};
use crate::session::Unit;
use crate::symbol::{Symbol, SymbolKind};
use crate::{Binding, Ctx, ScopeId, UnitId};

/// Kind of entity a lookup accepts.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Want {
    Any,
    /// Type names: in declarator and type positions.
    Type,
    /// Names before `::`.
    Scope,
}

impl Want {
    fn accepts(self, symbol: &Symbol) -> bool {
        match self {
            Want::Any => true,
            Want::Type => symbol.is_type(),
            Want::Scope => {
                symbol.is_type() || matches!(symbol.kind, SymbolKind::Namespace { .. })
            }
        }
    }
}

/// Result of a lookup.
#[derive(Clone, Debug, Default)]
pub(crate) struct Found {
    pub symbols: SmallVec<[SymbolId; 2]>,
    /// Context the symbols are evaluated in.
    pub ctx: Ctx,
    /// The name is a member of a dependent type.
    pub dependent: bool,
}

impl Found {
    fn of(symbols: SmallVec<[SymbolId; 2]>, ctx: Ctx) -> Self {
        Found {
            symbols,
            ctx,
            dependent: false,
        }
    }

    fn dependent() -> Self {
        Found {
            dependent: true,
            ..Found::default()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty() && !self.dependent
    }
}

/// Scope searched by member and qualified lookup.
#[derive(Copy, Clone, Debug)]
pub(crate) struct MemberScope {
    pub unit: UnitId,
    pub scope: ScopeId,
    pub ctx: Ctx,
    /// Class type owning the scope.
    pub ty: Idx,
}

enum Qualifier {
    Scope(MemberScope),
    Dependent,
    Missing,
}

impl Resolver<'_> {
    /// Symbols a name node denotes before overload resolution.
    pub(crate) fn lookup_name(&mut self, unit: &Unit, name: NameId, ctx: Ctx, want: Want) -> Found {
        let node = unit.arena().name(name);
        let ident = node.ident;
        if let Some(qualifier) = node.qualifier {
            return match self.qualifier(unit, qualifier, ctx) {
                Qualifier::Scope(scope) => self.lookup_in_scope(scope, ident, want),
                Qualifier::Dependent => Found::dependent(),
                Qualifier::Missing => Found::default(),
            };
        }
        if node.global {
            let scope = MemberScope {
                unit: unit.id,
                scope: ScopeTree::GLOBAL,
                ctx: None,
                ty: Idx::VOID,
            };
            return self.lookup_in_scope(scope, ident, want);
        }
        self.unqualified(unit, name, ident, ctx, want)
    }

    fn unqualified(&mut self, unit: &Unit, name: NameId, ident: Name, ctx: Ctx, want: Want) -> Found {
        let start = unit.scope_of_name(name);
        let position = Some(unit.arena().name(name).span.start);
        let chain: SmallVec<[ScopeId; 8]> = unit.scopes.chain(start).collect();
        for &id in &chain {
            let scope = unit.scopes.get(id);
            let mut symbols = self.accepted(scope.find(ident, position), want);
            self.using_declared(unit, id, ident, position, want, ctx, &mut symbols);
            self.nominated(unit, id, ident, position, want, &mut symbols);
            if !symbols.is_empty() {
                return Found::of(symbols, ctx);
            }
            if scope.kind == ScopeKind::Class {
                if let Some(owner) = scope.owner {
                    let class = self.class_type(owner, ctx);
                    // Unqualified lookup does not look into dependent bases.
                    let found = self.lookup_in_bases(class, ident, want, 0, false);
                    if !found.is_empty() {
                        return found;
                    }
                }
            }
        }
        for &id in &chain {
            if !matches!(unit.scopes.get(id).kind, ScopeKind::Global | ScopeKind::Namespace) {
                continue;
            }
            if let Some(path) = self.scope_path(unit, id) {
                let symbols = self.from_index(&path.child(ident), want);
                if !symbols.is_empty() {
                    return Found::of(symbols, None);
                }
            }
        }
        Found::default()
    }

    /// Qualified lookup of `ident` in one scope and, for classes, its bases.
    fn lookup_in_scope(&mut self, target: MemberScope, ident: Name, want: Want) -> Found {
        let unit = self.session.unit(target.unit);
        let scope = unit.scopes.get(target.scope);
        let mut symbols = self.accepted(scope.find(ident, None), want);
        self.using_declared(&unit, target.scope, ident, None, want, target.ctx, &mut symbols);
        if !symbols.is_empty() {
            return Found::of(symbols, target.ctx);
        }
        match scope.kind {
            ScopeKind::Class => self.lookup_in_bases(target.ty, ident, want, 0, true),
            ScopeKind::Global | ScopeKind::Namespace => {
                if let Some(path) = self.scope_path(&unit, target.scope) {
                    symbols = self.from_index(&path.child(ident), want);
                }
                if symbols.is_empty() {
                    self.nominated(&unit, target.scope, ident, None, want, &mut symbols);
                }
                Found::of(symbols, None)
            }
            _ => Found::default(),
        }
    }

    /// Add the entities the using-declarations of `ident` in `scope`
    /// refer to.
    #[expect(clippy::too_many_arguments, reason = "lookup position of one scope")]
    fn using_declared(
        &mut self,
        unit: &Unit,
        scope: ScopeId,
        ident: Name,
        position: Option<u32>,
        want: Want,
        ctx: Ctx,
        out: &mut SmallVec<[SymbolId; 2]>,
    ) {
        for target in unit.scopes.get(scope).usings(ident, position) {
            if !self.expanding.insert((unit.id, target)) {
                continue;
            }
            let found = self.lookup_name(unit, target, ctx, want);
            self.expanding.remove(&(unit.id, target));
            merge(out, found.symbols);
        }
    }

    /// Add the members named `ident` of the namespaces the
    /// using-directives of `scope` nominate.
    fn nominated(
        &mut self,
        unit: &Unit,
        scope: ScopeId,
        ident: Name,
        position: Option<u32>,
        want: Want,
        out: &mut SmallVec<[SymbolId; 2]>,
    ) {
        for directive in unit.scopes.get(scope).directives(position) {
            // A directive already being followed closes a cycle.
            if !self.expanding.insert((unit.id, directive)) {
                continue;
            }
            if let Some(namespace) = self.nominated_namespace(unit, directive) {
                let found = self.lookup_in_scope(namespace, ident, want);
                merge(out, found.symbols);
            }
            self.expanding.remove(&(unit.id, directive));
        }
    }

    /// Scope of the namespace a using-directive names.
    fn nominated_namespace(&mut self, unit: &Unit, directive: NameId) -> Option<MemberScope> {
        let found = self.lookup_name(unit, directive, None, Want::Scope);
        found.symbols.iter().find_map(|&symbol_id| {
            let symbol = self.session.symbol(symbol_id);
            match symbol.kind {
                SymbolKind::Namespace { scope } => Some(MemberScope {
                    unit: symbol.unit,
                    scope,
                    ctx: None,
                    ty: Idx::VOID,
                }),
                _ => None,
            }
        })
    }

    /// Functions named `ident` declared in the namespaces associated with
    /// the argument types of an unqualified call.
    pub(crate) fn argument_dependent(&mut self, ident: Name, args: &[Idx]) -> SmallVec<[SymbolId; 2]> {
        let mut namespaces: Vec<MemberScope> = Vec::new();
        let mut seen = FxHashSet::default();
        for &ty in args {
            self.associate(ty, 0, &mut seen, &mut namespaces);
        }
        let mut out = SmallVec::new();
        for namespace in namespaces {
            let found = self.lookup_in_scope(namespace, ident, Want::Any);
            let functions = found
                .symbols
                .into_iter()
                .filter(|&symbol| self.session.symbol(symbol).is_function_like())
                .collect();
            merge(&mut out, functions);
        }
        tracing::trace!(candidates = out.len(), "argument-dependent lookup");
        out
    }

    /// Collect the namespaces associated with `ty`: those enclosing its
    /// classes, enums, templates and their bases and template arguments.
    fn associate(&mut self, ty: Idx, level: u16, seen: &mut FxHashSet<Idx>, out: &mut Vec<MemberScope>) {
        if level >= self.session.config().max_inheritance_depth || !seen.insert(ty) {
            return;
        }
        let pool = self.pool();
        match pool.get(ty) {
            TypeData::Pointer(inner)
            | TypeData::LValueRef(inner)
            | TypeData::RValueRef(inner)
            | TypeData::Qualified { inner, .. }
            | TypeData::Array { elem: inner, .. } => self.associate(inner, level, seen, out),
            TypeData::Function(sig) => {
                for &param in sig.params.iter() {
                    self.associate(param, level, seen, out);
                }
                self.associate(sig.ret, level, seen, out);
            }
            TypeData::Enum(symbol) => self.enclosing_namespace(symbol, out),
            TypeData::Class(symbol) => {
                self.enclosing_namespace(symbol, out);
                for base in self.bases_of(ty) {
                    self.associate(base, level + 1, seen, out);
                }
            }
            TypeData::Specialization { template, args } if !pool.is_dependent(ty) => {
                self.enclosing_namespace(template, out);
                for arg in args.iter() {
                    match arg {
                        TemplateArg::Type(arg) => self.associate(*arg, level, seen, out),
                        TemplateArg::Template(template) => self.enclosing_namespace(*template, out),
                        TemplateArg::Value(_) | TemplateArg::Pack(_) => {}
                    }
                }
                for base in self.bases_of(ty) {
                    self.associate(base, level + 1, seen, out);
                }
            }
            _ => {}
        }
    }

    fn enclosing_namespace(&self, symbol_id: SymbolId, out: &mut Vec<MemberScope>) {
        let symbol = self.session.symbol(symbol_id);
        let unit = self.session.unit(symbol.unit);
        let Some(scope) = unit
            .scopes
            .enclosing(symbol.scope, |scope| {
                matches!(scope.kind, ScopeKind::Global | ScopeKind::Namespace)
            })
        else {
            return;
        };
        if !out.iter().any(|known| known.unit == symbol.unit && known.scope == scope) {
            out.push(MemberScope {
                unit: symbol.unit,
                scope,
                ctx: None,
                ty: Idx::VOID,
            });
        }
    }

    /// Member `ident` of class type `ty`, searching bases depth-first.
    pub(crate) fn member_lookup(&mut self, ty: Idx, ident: Name, want: Want) -> Found {
        self.member_lookup_at(ty, ident, want, 0)
    }

    fn member_lookup_at(&mut self, ty: Idx, ident: Name, want: Want, level: u16) -> Found {
        if self.pool().is_dependent(ty) {
            return Found::dependent();
        }
        let Some(target) = self.member_scope_of(ty) else {
            return Found::default();
        };
        let unit = self.session.unit(target.unit);
        let symbols = self.accepted(unit.scopes.get(target.scope).find(ident, None), want);
        if !symbols.is_empty() {
            return Found::of(symbols, target.ctx);
        }
        self.lookup_in_bases(target.ty, ident, want, level, true)
    }

    fn lookup_in_bases(
        &mut self,
        ty: Idx,
        ident: Name,
        want: Want,
        level: u16,
        dependent_bases: bool,
    ) -> Found {
        if level >= self.session.config().max_inheritance_depth {
            tracing::debug!(level, "inheritance depth limit reached during member lookup");
            return Found::default();
        }
        for base in self.bases_of(ty) {
            if !dependent_bases && self.pool().is_dependent(base) {
                continue;
            }
            let found = self.member_lookup_at(base, ident, want, level + 1);
            if !found.is_empty() {
                return found;
            }
        }
        Found::default()
    }

    /// The scope holding the members of a class, class template instance
    /// or enum type.
    pub(crate) fn member_scope_of(&mut self, ty: Idx) -> Option<MemberScope> {
        let pool = self.pool();
        let ty = pool.strip_cv(ty);
        let (symbol, ctx) = match pool.get(ty) {
            TypeData::Class(symbol) | TypeData::Enum(symbol) => (symbol, None),
            TypeData::Specialization { template, .. } if pool.is_dependent(ty) => (template, None),
            TypeData::Specialization { template, args } => {
                let instance = self.instantiate(template, args.to_vec(), None).ok()?;
                (self.session.instance(instance).pattern, Some(instance))
            }
            _ => return None,
        };
        let symbol = self.session.symbol(symbol);
        let scope = symbol.member_scope().filter(|&scope| scope != symbol.scope)?;
        Some(MemberScope {
            unit: symbol.unit,
            scope,
            ctx,
            ty,
        })
    }

    fn qualifier(&mut self, unit: &Unit, qualifier: NameId, ctx: Ctx) -> Qualifier {
        let found = self.lookup_name(unit, qualifier, ctx, Want::Scope);
        if found.dependent {
            self.record(unit.id, qualifier, ctx, Binding::Dependent);
            return Qualifier::Dependent;
        }
        let Some(&first) = found.symbols.first() else {
            let problem = self.problem_at(unit, qualifier, cxx_diagnostic::ProblemKind::UnresolvedName);
            self.record(unit.id, qualifier, ctx, Binding::Problem(problem));
            return Qualifier::Missing;
        };
        let symbol = self.session.symbol(first);
        if let SymbolKind::Namespace { scope } = symbol.kind {
            self.record(unit.id, qualifier, ctx, Binding::Declaration(first));
            return Qualifier::Scope(MemberScope {
                unit: symbol.unit,
                scope,
                ctx: None,
                ty: Idx::VOID,
            });
        }
        let ty = self.type_from_found(unit, qualifier, &found, ctx);
        if self.pool().is_dependent(ty) {
            return Qualifier::Dependent;
        }
        match self.member_scope_of(ty) {
            Some(scope) => Qualifier::Scope(scope),
            None => Qualifier::Missing,
        }
    }

    fn accepted(&self, symbols: SmallVec<[SymbolId; 2]>, want: Want) -> SmallVec<[SymbolId; 2]> {
        if want == Want::Any {
            return symbols;
        }
        symbols
            .into_iter()
            .filter(|&symbol| want.accepts(&self.session.symbol(symbol)))
            .collect()
    }

    /// Declarations other units published under `name`. Only functions
    /// may contribute more than one entity.
    fn from_index(&self, name: &QualifiedName, want: Want) -> SmallVec<[SymbolId; 2]> {
        let symbols = self.accepted(self.session.index().lookup_in_index(name).into(), want);
        let all_functions = symbols
            .iter()
            .all(|&symbol| self.session.symbol(symbol).is_function_like());
        if all_functions {
            symbols
        } else {
            symbols.into_iter().take(1).collect()
        }
    }

    /// Namespace path of `scope`, or `None` inside a class, function or
    /// block.
    pub(crate) fn scope_path(&self, unit: &Unit, scope: ScopeId) -> Option<QualifiedName> {
        let mut segments = Vec::new();
        for id in unit.scopes.chain(scope) {
            let scope = unit.scopes.get(id);
            match scope.kind {
                ScopeKind::Global => break,
                ScopeKind::Namespace => {
                    segments.push(self.session.symbol(scope.owner?).name);
                }
                _ => return None,
            }
        }
        segments.reverse();
        Some(QualifiedName::new(segments))
    }

    /// Same entity declared by other units: namespace-scope declarations
    /// of the same kind, and for functions the same parameter types.
    pub(crate) fn published_equivalents(&mut self, symbol_id: SymbolId) -> Vec<SymbolId> {
        let symbol = self.session.symbol(symbol_id);
        let unit = self.session.unit(symbol.unit);
        let Some(path) = self.scope_path(&unit, symbol.scope) else {
            return Vec::new();
        };
        let candidates = self.session.index().lookup_in_index(&path.child(symbol.name));
        let mut out = Vec::new();
        for candidate in candidates {
            if candidate == symbol_id {
                continue;
            }
            let other = self.session.symbol(candidate);
            if other.unit == symbol.unit
                || std::mem::discriminant(&other.kind) != std::mem::discriminant(&symbol.kind)
            {
                continue;
            }
            if symbol.is_function_like()
                && self.signature(symbol_id, None).params != self.signature(candidate, None).params
            {
                continue;
            }
            out.push(candidate);
        }
        out
    }

    /// Binding of a name from its lookup result alone.
    pub(crate) fn binding_of(&self, unit: &Unit, name: NameId, found: &Found) -> Binding {
        if found.dependent {
            return Binding::Dependent;
        }
        match found.symbols.as_slice() {
            [] => Binding::Problem(self.problem_at(unit, name, cxx_diagnostic::ProblemKind::UnresolvedName)),
            [symbol] => Binding::Declaration(*symbol),
            symbols => {
                let all_functions = symbols
                    .iter()
                    .all(|&symbol| self.session.symbol(symbol).is_function_like());
                if all_functions {
                    Binding::OverloadSet(Arc::from(symbols))
                } else {
                    Binding::Problem(self.problem_at(unit, name, cxx_diagnostic::ProblemKind::Ambiguous))
                }
            }
        }
    }
}

/// Append the symbols of `found` not yet in `out`.
fn merge(out: &mut SmallVec<[SymbolId; 2]>, found: SmallVec<[SymbolId; 2]>) {
    for symbol in found {
        if !out.contains(&symbol) {
            out.push(symbol);
        }
    }
}

#[cfg(test)]
mod tests;
