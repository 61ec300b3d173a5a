//! Declaration pass.
//!
//! Walks a translation unit once, creating the scope tree and a symbol for
//! every declaration, and records for each name, expression and type node
//! the scope it appears in. Name nodes inside an expression or type tree
//! are anchored to the tree's root: resolving them evaluates the root.
//! Nothing is resolved here; the pass only sees syntax.

use std::sync::Arc;

use cxx_ir::visitor::{walk_expr, walk_name, walk_stmt, walk_type_expr, Visitor};
use cxx_ir::{
    AstArena, CaptureKind, ClassKey, Decl, DeclId, DeclKind, DeclRange, Expr, ExprId,
    FunctionDecl, Initializer, LambdaExpr, Name, NameId, Param, SpecialMember, Stmt, StmtId,
    StmtKind, TemplateArg, TemplateParamRange, TranslationUnit, TypeExprId,
    TypeExprKind, TypeExprRange,
};
use cxx_types::{ParamRef, SymbolId};
use rustc_hash::FxHashMap;

use crate::index::QualifiedName;
use crate::scope::{ScopeKind, ScopeTree};
use crate::session::{BodyOwner, LambdaInfo, NameSite, Unit};
use crate::symbol::{
    FunctionInfo, SpecializationOf, Symbol, SymbolKind, TemplateEntity, TemplateInfo,
    TemplateParamInfo,
};
use crate::{ScopeId, UnitId};

type Published = Vec<(QualifiedName, SymbolId)>;

/// Collect `tu` into a unit. Symbol ids start at `base`.
pub(crate) fn collect_unit(
    id: UnitId,
    tu: TranslationUnit,
    base: u32,
) -> (Vec<Symbol>, (Unit, Published)) {
    let collected = {
        let mut collector = Collector::new(id, &tu.arena, base);
        for &decl in tu.top_level() {
            collector.visit_decl_id(decl, &tu.arena);
        }
        collector.finish()
    };
    let Collected {
        symbols,
        scopes,
        name_sites,
        name_scope,
        expr_scope,
        expr_root,
        decl_symbols,
        returns,
        lambdas,
        invented,
        init_of,
        published,
    } = collected;
    let unit = Unit {
        id,
        tu,
        scopes,
        name_sites,
        name_scope,
        expr_scope,
        expr_root,
        decl_symbols,
        returns,
        lambdas,
        invented,
        init_of,
    };
    (symbols, (unit, published))
}

struct Collected {
    symbols: Vec<Symbol>,
    scopes: ScopeTree,
    name_sites: Vec<NameSite>,
    name_scope: Vec<ScopeId>,
    expr_scope: Vec<ScopeId>,
    expr_root: Vec<ExprId>,
    decl_symbols: FxHashMap<DeclId, SymbolId>,
    returns: FxHashMap<BodyOwner, Vec<StmtId>>,
    lambdas: FxHashMap<ExprId, LambdaInfo>,
    invented: FxHashMap<TypeExprId, ParamRef>,
    init_of: FxHashMap<ExprId, SymbolId>,
    published: Published,
}

struct Collector<'a> {
    unit: UnitId,
    arena: &'a AstArena,
    base: u32,
    symbols: Vec<Symbol>,
    scopes: ScopeTree,
    current: ScopeId,
    /// Root of the expression or type tree being walked.
    anchor: Option<NameSite>,
    /// Enclosing namespaces, for published names.
    path: Vec<Name>,
    bodies: Vec<BodyOwner>,
    name_sites: Vec<NameSite>,
    name_scope: Vec<ScopeId>,
    expr_scope: Vec<ScopeId>,
    expr_root: Vec<ExprId>,
    decl_symbols: FxHashMap<DeclId, SymbolId>,
    returns: FxHashMap<BodyOwner, Vec<StmtId>>,
    lambdas: FxHashMap<ExprId, LambdaInfo>,
    invented: FxHashMap<TypeExprId, ParamRef>,
    init_of: FxHashMap<ExprId, SymbolId>,
    published: Published,
}

impl<'a> Collector<'a> {
    fn new(unit: UnitId, arena: &'a AstArena, base: u32) -> Self {
        Collector {
            unit,
            arena,
            base,
            symbols: Vec::new(),
            scopes: ScopeTree::new(),
            current: ScopeTree::GLOBAL,
            anchor: None,
            path: Vec::new(),
            bodies: Vec::new(),
            name_sites: vec![NameSite::Unvisited; arena.name_count()],
            name_scope: vec![ScopeTree::GLOBAL; arena.name_count()],
            expr_scope: vec![ScopeTree::GLOBAL; arena.expr_count()],
            expr_root: arena.expr_ids().collect(),
            decl_symbols: FxHashMap::default(),
            returns: FxHashMap::default(),
            lambdas: FxHashMap::default(),
            invented: FxHashMap::default(),
            init_of: FxHashMap::default(),
            published: Vec::new(),
        }
    }

    fn finish(self) -> Collected {
        Collected {
            symbols: self.symbols,
            scopes: self.scopes,
            name_sites: self.name_sites,
            name_scope: self.name_scope,
            expr_scope: self.expr_scope,
            expr_root: self.expr_root,
            decl_symbols: self.decl_symbols,
            returns: self.returns,
            lambdas: self.lambdas,
            invented: self.invented,
            init_of: self.init_of,
            published: self.published,
        }
    }

    // Symbols

    fn next_id(&self) -> SymbolId {
        let offset = u32::try_from(self.symbols.len())
            .unwrap_or_else(|_| panic!("unit declares more than u32::MAX symbols"));
        SymbolId::new(self.base + offset)
    }

    fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = self.next_id();
        self.symbols.push(symbol);
        id
    }

    /// Symbol created by this unit.
    fn local_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        let offset = id.raw().checked_sub(self.base)?;
        self.symbols.get_mut(offset as usize)
    }

    fn local(&self, id: SymbolId) -> Option<&Symbol> {
        let offset = id.raw().checked_sub(self.base)?;
        self.symbols.get(offset as usize)
    }

    fn symbol(&self, name: Name, kind: SymbolKind, decl: Option<&Decl>, id: Option<DeclId>) -> Symbol {
        Symbol {
            name,
            kind,
            unit: self.unit,
            scope: self.current,
            decl: id,
            sites: smallvec::SmallVec::new(),
            specifiers: decl.map(|decl| decl.specifiers).unwrap_or_default(),
            access: decl.map(|decl| decl.access).unwrap_or_default(),
            ctx: None,
            template_depth: self.depth(),
        }
    }

    fn depth(&self) -> u16 {
        self.scopes.get(self.current).template_depth
    }

    fn ident(&self, name: NameId) -> Name {
        self.arena.ident(name)
    }

    fn position(&self, name: NameId) -> u32 {
        self.arena.name(name).span.start
    }

    /// Declare `symbol` under the identifier of `name` in `scope`.
    fn declare_in(&mut self, scope: ScopeId, name: NameId, symbol: SymbolId) {
        let ident = self.ident(name);
        if ident.is_empty() {
            return;
        }
        let position = self.position(name);
        self.scopes.declare(scope, ident, symbol, position);
        let kind = self.scopes.get(scope).kind;
        if matches!(kind, ScopeKind::Global | ScopeKind::Namespace) && scope == self.current {
            let qualified = QualifiedName::new(self.path.iter().copied()).child(ident);
            self.published.push((qualified, symbol));
        }
    }

    /// Mark `name` as a declarator of `symbol` and record the site.
    fn declarator(&mut self, name: NameId, symbol: SymbolId) {
        self.name_sites[name.index()] = NameSite::Declarator(symbol);
        self.name_scope[name.index()] = self.current;
        if let Some(local) = self.local_mut(symbol) {
            if !local.sites.contains(&name) {
                local.sites.push(name);
            }
        }
        // Qualifiers and specialization arguments resolve on their own.
        let arena = self.arena;
        let saved = self.anchor.take();
        walk_name(self, name, arena);
        self.anchor = saved;
    }

    fn with_scope(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self)) {
        let saved = std::mem::replace(&mut self.current, scope);
        f(self);
        self.current = saved;
    }

    /// Same-named declarations of the current scope satisfying `pred`.
    fn find_existing(
        &self,
        scope: ScopeId,
        ident: Name,
        pred: impl Fn(&Symbol) -> bool,
    ) -> Option<SymbolId> {
        self.scopes
            .get(scope)
            .find(ident, None)
            .into_iter()
            .find(|&id| self.local(id).is_some_and(&pred))
    }

    /// Scope named by the qualifier of a declarator (`A::B::f`), searched
    /// textually among this unit's declarations.
    fn qualifier_scope(&self, name: NameId) -> Option<ScopeId> {
        let qualifier = self.arena.name(name).qualifier?;
        let node = self.arena.name(qualifier);
        let candidates = match node.qualifier {
            Some(_) => {
                let scope = self.qualifier_scope(qualifier)?;
                self.scopes.get(scope).find(node.ident, None)
            }
            None if node.global => self.scopes.get(ScopeTree::GLOBAL).find(node.ident, None),
            None => self.scopes.lookup(self.current, node.ident, None),
        };
        candidates
            .into_iter()
            .find_map(|id| self.local(id).and_then(Symbol::member_scope))
    }

    // Declarations

    fn variable(&mut self, id: DeclId, decl: &'a Decl, ty: TypeExprId, init: Option<Initializer>) {
        let Some(name) = decl.name else {
            walk_variable(self, ty, init);
            return;
        };
        let ident = self.ident(name);
        let target = self.qualifier_scope(name).unwrap_or(self.current);
        let in_block = self.scopes.get(target).kind == ScopeKind::Block;
        let existing = if in_block {
            None
        } else {
            self.find_existing(target, ident, |s| matches!(s.kind, SymbolKind::Variable { .. }))
        };
        let symbol = match existing {
            Some(symbol) => {
                if init.is_some() {
                    if let Some(local) = self.local_mut(symbol) {
                        local.decl = Some(id);
                        local.kind = SymbolKind::Variable { ty, init };
                    }
                }
                symbol
            }
            None => {
                let mut symbol = self.symbol(ident, SymbolKind::Variable { ty, init }, Some(decl), Some(id));
                symbol.scope = target;
                let symbol = self.add(symbol);
                self.declare_in(target, name, symbol);
                symbol
            }
        };
        self.decl_symbols.insert(id, symbol);
        self.declarator(name, symbol);
        if let Some(Initializer::Copy(root)) = init {
            self.init_of.insert(root, symbol);
        }
        walk_variable(self, ty, init);
    }

    fn function(&mut self, id: DeclId, decl: &'a Decl, function: &'a FunctionDecl) {
        let Some(name) = decl.name else {
            return;
        };
        let ident = self.ident(name);
        let target = self.qualifier_scope(name).unwrap_or(self.current);
        let arena = self.arena;
        let existing = self.find_existing(target, ident, |s| {
            matches!(s.kind, SymbolKind::Function(_))
                && s.decl.is_some_and(|d| match &arena.decl(d).kind {
                    DeclKind::Function(other) => same_signature(arena, function, other),
                    _ => false,
                })
        });
        let symbol = match existing {
            Some(symbol) => {
                if function.body.is_some() {
                    if let Some(local) = self.local_mut(symbol) {
                        local.decl = Some(id);
                    }
                }
                symbol
            }
            None => {
                let class = self.scopes.get(target).owner.filter(|_| {
                    self.scopes.get(target).kind == ScopeKind::Class
                });
                let info = FunctionInfo {
                    scope: target,
                    class,
                    special: function.special,
                };
                let mut symbol = self.symbol(ident, SymbolKind::Function(info), Some(decl), Some(id));
                symbol.scope = target;
                let symbol = self.add(symbol);
                self.declare_in(target, name, symbol);
                symbol
            }
        };
        self.decl_symbols.insert(id, symbol);
        self.declarator(name, symbol);
        self.function_scope(symbol, id, function, target);
    }

    /// Parameters and body of a function, in a scope owned by `symbol`.
    fn function_scope(
        &mut self,
        symbol: SymbolId,
        id: DeclId,
        function: &'a FunctionDecl,
        parent: ScopeId,
    ) {
        let depth = self.scopes.get(parent).template_depth.max(self.depth());
        let scope = self.scopes.push(ScopeKind::Function, parent, Some(symbol), depth);
        let is_definition = function.body.is_some();
        if let Some(local) = self.local_mut(symbol) {
            let declared_in = local.scope;
            if let Some(info) = function_info_mut(&mut local.kind) {
                // The defining declaration's parameters win.
                if is_definition || info.scope == declared_in {
                    info.scope = scope;
                }
            }
        }
        let arena = self.arena;
        self.with_scope(scope, |this| {
            this.visit_type_expr(function.ret, arena);
            for param in arena.params(function.params) {
                this.visit_param(param, arena);
            }
            if let Some(trailing) = function.trailing_return {
                this.visit_type_expr(trailing, arena);
            }
            if let Some(body) = function.body {
                let owner = BodyOwner::Function(id);
                this.returns.entry(owner).or_default();
                this.bodies.push(owner);
                this.visit_stmt_id(body, arena);
                this.bodies.pop();
            }
        });
    }

    fn class(
        &mut self,
        id: DeclId,
        decl: &'a Decl,
        key: ClassKey,
        bases: TypeExprRange,
        members: DeclRange,
        complete: bool,
    ) {
        let name = decl.name;
        let ident = name.map_or(Name::EMPTY, |name| self.ident(name));
        let target = name
            .and_then(|name| self.qualifier_scope(name))
            .unwrap_or(self.current);
        let existing = if ident.is_empty() {
            None
        } else {
            self.find_existing(target, ident, |s| matches!(s.kind, SymbolKind::Class { .. }))
        };
        let (symbol, scope) = match existing {
            Some(symbol) => {
                let scope = self
                    .local(symbol)
                    .and_then(Symbol::member_scope)
                    .unwrap_or(ScopeTree::GLOBAL);
                if complete {
                    if let Some(local) = self.local_mut(symbol) {
                        local.decl = Some(id);
                    }
                }
                (symbol, scope)
            }
            None => {
                let predicted = self.next_id();
                let scope = self.scopes.push(ScopeKind::Class, target, Some(predicted), self.depth());
                let mut symbol = self.symbol(ident, SymbolKind::Class { scope, key }, Some(decl), Some(id));
                symbol.scope = target;
                let symbol = self.add(symbol);
                if let Some(name) = name {
                    self.declare_in(target, name, symbol);
                }
                (symbol, scope)
            }
        };
        self.decl_symbols.insert(id, symbol);
        if let Some(name) = name {
            self.declarator(name, symbol);
        }
        self.class_body(scope, bases, members);
    }

    fn class_body(&mut self, scope: ScopeId, bases: TypeExprRange, members: DeclRange) {
        let arena = self.arena;
        self.with_scope(scope, |this| {
            for &base in arena.type_list(bases) {
                this.visit_type_expr(base, arena);
            }
            for &member in arena.decl_list(members) {
                this.visit_decl_id(member, arena);
            }
        });
    }

    fn enumeration(&mut self, id: DeclId, decl: &'a Decl, scoped: bool, enumerators: DeclRange) {
        let arena = self.arena;
        let ident = decl.name.map_or(Name::EMPTY, |name| self.ident(name));
        let predicted = self.next_id();
        let scope = self.scopes.push(ScopeKind::Enum, self.current, Some(predicted), self.depth());
        let symbol = self.symbol(ident, SymbolKind::Enum { scope, scoped }, Some(decl), Some(id));
        let symbol = self.add(symbol);
        if let Some(name) = decl.name {
            self.declare_in(self.current, name, symbol);
            self.declarator(name, symbol);
        }
        self.decl_symbols.insert(id, symbol);

        for (index, &enumerator) in arena.decl_list(enumerators).iter().enumerate() {
            let enumerator_decl = arena.decl(enumerator);
            let DeclKind::Enumerator { value } = enumerator_decl.kind else {
                continue;
            };
            let Some(name) = enumerator_decl.name else {
                continue;
            };
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            let kind = SymbolKind::Enumerator {
                parent: symbol,
                value,
                index,
            };
            let enumerator_symbol = self.symbol(self.ident(name), kind, Some(enumerator_decl), Some(enumerator));
            let enumerator_symbol = self.add(enumerator_symbol);
            self.decl_symbols.insert(enumerator, enumerator_symbol);
            self.scopes
                .declare(scope, self.ident(name), enumerator_symbol, self.position(name));
            if !scoped {
                self.declare_in(self.current, name, enumerator_symbol);
            }
            self.declarator(name, enumerator_symbol);
            if let Some(value) = value {
                self.with_scope(scope, |this| this.visit_expr_id(value, arena));
            }
        }
    }

    fn namespace(&mut self, id: DeclId, decl: &'a Decl, members: DeclRange) {
        let arena = self.arena;
        let ident = decl.name.map_or(Name::EMPTY, |name| self.ident(name));
        if ident.is_empty() {
            for &member in arena.decl_list(members) {
                self.visit_decl_id(member, arena);
            }
            return;
        }
        let existing =
            self.find_existing(self.current, ident, |s| matches!(s.kind, SymbolKind::Namespace { .. }));
        let (symbol, scope) = match existing {
            Some(symbol) => {
                let scope = self
                    .local(symbol)
                    .and_then(Symbol::member_scope)
                    .unwrap_or(ScopeTree::GLOBAL);
                (symbol, scope)
            }
            None => {
                let predicted = self.next_id();
                let scope = self
                    .scopes
                    .push(ScopeKind::Namespace, self.current, Some(predicted), 0);
                let symbol = self.symbol(ident, SymbolKind::Namespace { scope }, Some(decl), Some(id));
                let symbol = self.add(symbol);
                if let Some(name) = decl.name {
                    self.declare_in(self.current, name, symbol);
                }
                (symbol, scope)
            }
        };
        self.decl_symbols.insert(id, symbol);
        if let Some(name) = decl.name {
            self.declarator(name, symbol);
        }
        self.path.push(ident);
        self.with_scope(scope, |this| {
            for &member in arena.decl_list(members) {
                this.visit_decl_id(member, arena);
            }
        });
        self.path.pop();
    }

    fn typedef(&mut self, id: DeclId, decl: &'a Decl, ty: TypeExprId) {
        let arena = self.arena;
        if let Some(name) = decl.name {
            let symbol = self.symbol(self.ident(name), SymbolKind::Typedef { ty }, Some(decl), Some(id));
            let symbol = self.add(symbol);
            self.declare_in(self.current, name, symbol);
            self.declarator(name, symbol);
            self.decl_symbols.insert(id, symbol);
        }
        self.visit_type_expr(ty, arena);
    }

    fn template(&mut self, id: DeclId, decl: &'a Decl, params: TemplateParamRange, inner_id: DeclId) {
        let arena = self.arena;
        let inner = arena.decl(inner_id);
        let Some(name) = decl.name else {
            return;
        };
        let ident = self.ident(name);
        let node = arena.name(name);
        let target = self.qualifier_scope(name).unwrap_or(self.current);

        let specialization = node.template_args.and_then(|args| {
            self.scopes
                .lookup(target, ident, None)
                .into_iter()
                .find(|&candidate| {
                    self.local(candidate)
                        .and_then(Symbol::template_info)
                        .is_some_and(|info| info.specialization.is_none())
                })
                .map(|primary| SpecializationOf { primary, args })
        });

        let depth = self.depth();
        let template_params: Arc<[TemplateParamInfo]> = arena
            .template_params(params)
            .iter()
            .enumerate()
            .map(|(index, param)| TemplateParamInfo {
                param: ParamRef::new(
                    depth,
                    u16::try_from(index).unwrap_or(u16::MAX),
                    param.pack,
                    param.name.map_or(Name::EMPTY, |name| self.ident(name)),
                ),
                kind: param.kind.clone(),
                default: param.default,
            })
            .collect();

        let class = self
            .scopes
            .get(target)
            .owner
            .filter(|_| self.scopes.get(target).kind == ScopeKind::Class);
        let entity = match &inner.kind {
            DeclKind::Function(function) => TemplateEntity::Function(FunctionInfo {
                scope: target,
                class,
                special: function.special,
            }),
            DeclKind::Class { key, .. } => TemplateEntity::Class {
                scope: target,
                key: *key,
            },
            DeclKind::Variable { ty, init } => TemplateEntity::Variable {
                ty: *ty,
                init: *init,
            },
            _ => {
                // Alias and other templates only get their parameters scoped.
                let scope = self.scopes.push(ScopeKind::TemplateParams, target, None, depth + 1);
                self.with_scope(scope, |this| this.visit_decl(inner_id, inner, arena));
                return;
            }
        };

        let existing = if specialization.is_some() {
            None
        } else {
            self.find_existing(target, ident, |s| {
                s.template_info().is_some_and(|info| {
                    info.specialization.is_none()
                        && info.params.len() == template_params.len()
                        && match (&info.entity, &inner.kind) {
                            (TemplateEntity::Class { .. }, DeclKind::Class { .. }) => true,
                            (TemplateEntity::Function(_), DeclKind::Function(function)) => {
                                info.inner.is_some_and(|d| match &arena.decl(d).kind {
                                    DeclKind::Function(other) => {
                                        same_signature(arena, function, other)
                                    }
                                    _ => false,
                                })
                            }
                            _ => false,
                        }
                })
            })
        };

        let symbol = match existing {
            Some(symbol) => symbol,
            None => {
                let info = TemplateInfo {
                    entity,
                    inner: Some(inner_id),
                    params: template_params,
                    depth,
                    param_scope: None,
                    specialization,
                    specializations: Vec::new(),
                };
                let mut template = self.symbol(ident, SymbolKind::Template(info), Some(decl), Some(id));
                template.scope = target;
                let symbol = self.add(template);
                match specialization {
                    Some(spec) => {
                        if let Some(primary) = self.local_mut(spec.primary) {
                            if let SymbolKind::Template(info) = &mut primary.kind {
                                info.specializations.push(symbol);
                            }
                        }
                    }
                    None => self.declare_in(target, name, symbol),
                }
                symbol
            }
        };
        let is_definition = match &inner.kind {
            DeclKind::Function(function) => function.body.is_some(),
            DeclKind::Class { complete, .. } => *complete,
            _ => true,
        };
        if is_definition {
            if let Some(local) = self.local_mut(symbol) {
                local.decl = Some(id);
                if let SymbolKind::Template(info) = &mut local.kind {
                    info.inner = Some(inner_id);
                }
            }
        }
        self.decl_symbols.insert(id, symbol);
        self.decl_symbols.insert(inner_id, symbol);

        let param_scope = self
            .scopes
            .push(ScopeKind::TemplateParams, target, Some(symbol), depth + 1);
        if let Some(local) = self.local_mut(symbol) {
            if let SymbolKind::Template(info) = &mut local.kind {
                if is_definition || info.param_scope.is_none() {
                    info.param_scope = Some(param_scope);
                }
            }
        }
        self.with_scope(param_scope, |this| {
            this.template_params(symbol, params);
            this.declarator(name, symbol);
            this.template_entity(symbol, inner_id, inner);
        });
    }

    fn template_params(&mut self, template: SymbolId, params: TemplateParamRange) {
        let arena = self.arena;
        let infos = self
            .local(template)
            .and_then(Symbol::template_info)
            .map(|info| Arc::clone(&info.params));
        for (index, param) in arena.template_params(params).iter().enumerate() {
            if let (Some(name), Some(infos)) = (param.name, &infos) {
                if let Some(info) = infos.get(index) {
                    let mut info = info.clone();
                    // A redeclaration may spell the parameters differently.
                    info.param.name = self.ident(name);
                    let symbol = self.symbol(self.ident(name), SymbolKind::TemplateParam(info), None, None);
                    let symbol = self.add(symbol);
                    self.declare_in(self.current, name, symbol);
                    self.declarator(name, symbol);
                }
            }
            if let cxx_ir::TemplateParamKind::NonType(ty) = param.kind {
                self.visit_type_expr(ty, arena);
            }
            match param.default {
                Some(TemplateArg::Type(ty)) => self.visit_type_expr(ty, arena),
                Some(TemplateArg::Expr(expr)) => self.visit_expr_id(expr, arena),
                None => {}
            }
        }
    }

    fn template_entity(&mut self, symbol: SymbolId, inner_id: DeclId, inner: &'a Decl) {
        let arena = self.arena;
        match &inner.kind {
            DeclKind::Function(function) => {
                let parent = self.current;
                self.function_scope(symbol, inner_id, function, parent);
            }
            DeclKind::Class {
                bases,
                members,
                complete,
                ..
            } => {
                // Class scope already created by an earlier declaration.
                let existing_scope = self.local(symbol).and_then(|s| {
                    s.member_scope().filter(|&scope| scope != s.scope)
                });
                let scope = match existing_scope {
                    Some(scope) if !*complete => scope,
                    _ => {
                        let scope =
                            self.scopes
                                .push(ScopeKind::Class, self.current, Some(symbol), self.depth());
                        if let Some(local) = self.local_mut(symbol) {
                            if let SymbolKind::Template(TemplateInfo {
                                entity: TemplateEntity::Class { scope: slot, .. },
                                ..
                            }) = &mut local.kind
                            {
                                *slot = scope;
                            }
                        }
                        scope
                    }
                };
                self.class_body(scope, *bases, *members);
            }
            DeclKind::Variable { ty, init } => {
                if let Some(Initializer::Copy(root)) = init {
                    self.init_of.insert(*root, symbol);
                }
                walk_variable(self, *ty, *init);
            }
            _ => self.visit_decl(inner_id, inner, arena),
        }
    }

    // Lambdas

    fn lambda(&mut self, id: ExprId, lambda: &'a LambdaExpr) {
        let arena = self.arena;
        for capture in arena.captures(lambda.captures) {
            match &capture.kind {
                CaptureKind::Copy(name) | CaptureKind::Ref(name) => {
                    self.name_sites[name.index()] = NameSite::Lookup;
                    self.name_scope[name.index()] = self.current;
                }
                CaptureKind::This => {}
                CaptureKind::Init { init, .. } => self.visit_expr_id(*init, arena),
            }
        }

        let depth = self.depth();
        let mut invented = Vec::new();
        for param in arena.params(lambda.params) {
            let (ty, pack) = match arena.type_expr(param.ty).kind {
                TypeExprKind::PackExpansion(inner) => (inner, true),
                _ => (param.ty, false),
            };
            if let Some(auto) = find_auto(arena, ty) {
                let index = u16::try_from(invented.len()).unwrap_or(u16::MAX);
                let invented_param = ParamRef::new(depth, index, pack, Name::EMPTY);
                self.invented.insert(auto, invented_param);
                invented.push(invented_param);
            }
        }
        let generic = !invented.is_empty();
        let scope_depth = if generic { depth + 1 } else { depth };
        let enclosing = self.current;
        let scope = self.scopes.push(ScopeKind::Lambda, enclosing, None, scope_depth);

        let saved_anchor = self.anchor.take();
        self.with_scope(scope, |this| {
            for capture in arena.captures(lambda.captures) {
                if let CaptureKind::Init { name, init, by_ref } = capture.kind {
                    let kind = SymbolKind::InitCapture {
                        lambda: id,
                        init,
                        by_ref,
                    };
                    let symbol = this.symbol(this.ident(name), kind, None, None);
                    let symbol = this.add(symbol);
                    this.declare_in(scope, name, symbol);
                    this.declarator(name, symbol);
                }
            }
            for param in arena.params(lambda.params) {
                this.visit_param(param, arena);
            }
            if let Some(trailing) = lambda.trailing_return {
                this.visit_type_expr(trailing, arena);
            }
            let owner = BodyOwner::Lambda(id);
            this.returns.entry(owner).or_default();
            this.bodies.push(owner);
            this.visit_stmt_id(lambda.body, arena);
            this.bodies.pop();
        });
        self.anchor = saved_anchor;

        self.lambdas.insert(
            id,
            LambdaInfo {
                scope,
                invented: invented.into(),
                depth,
                enclosing,
            },
        );
    }
}

impl<'a> Visitor<'a> for Collector<'a> {
    fn visit_decl(&mut self, id: DeclId, decl: &'a Decl, arena: &'a AstArena) {
        let saved_anchor = self.anchor.take();
        match &decl.kind {
            DeclKind::Variable { ty, init } => self.variable(id, decl, *ty, *init),
            DeclKind::Function(function) => self.function(id, decl, function),
            DeclKind::Class {
                key,
                bases,
                members,
                complete,
            } => self.class(id, decl, *key, *bases, *members, *complete),
            DeclKind::Enum {
                scoped,
                enumerators,
                underlying,
            } => {
                if let Some(underlying) = underlying {
                    self.visit_type_expr(*underlying, arena);
                }
                self.enumeration(id, decl, *scoped, *enumerators);
            }
            DeclKind::Enumerator { value } => {
                if let Some(value) = value {
                    self.visit_expr_id(*value, arena);
                }
            }
            DeclKind::Namespace { members } => self.namespace(id, decl, *members),
            DeclKind::Typedef { ty } => self.typedef(id, decl, *ty),
            DeclKind::Template { params, decl: inner } => self.template(id, decl, *params, *inner),
            DeclKind::UsingDirective { namespace } => {
                self.scopes.add_directive(self.current, *namespace, decl.span.start);
                self.visit_name(*namespace, arena);
            }
            DeclKind::UsingDeclaration { target } => {
                let ident = self.ident(*target);
                self.scopes.add_using(self.current, ident, *target, decl.span.start);
                self.visit_name(*target, arena);
            }
        }
        self.anchor = saved_anchor;
    }

    fn visit_stmt(&mut self, id: StmtId, stmt: &'a Stmt, arena: &'a AstArena) {
        match &stmt.kind {
            StmtKind::Compound(_) | StmtKind::For { .. } => {
                let scope = self
                    .scopes
                    .push(ScopeKind::Block, self.current, None, self.depth());
                self.with_scope(scope, |this| walk_stmt(this, id, stmt, arena));
            }
            StmtKind::Return(_) => {
                if let Some(&owner) = self.bodies.last() {
                    self.returns.entry(owner).or_default().push(id);
                }
                walk_stmt(self, id, stmt, arena);
            }
            _ => walk_stmt(self, id, stmt, arena),
        }
    }

    fn visit_expr(&mut self, id: ExprId, expr: &'a Expr, arena: &'a AstArena) {
        self.expr_scope[id.index()] = self.current;
        if let Some(NameSite::Expr(root)) = self.anchor {
            self.expr_root[id.index()] = root;
        }
        if self.anchor.is_some() {
            walk_expr(self, id, expr, arena);
        } else {
            self.anchor = Some(NameSite::Expr(id));
            walk_expr(self, id, expr, arena);
            self.anchor = None;
        }
    }

    fn visit_lambda(&mut self, id: ExprId, lambda: &'a LambdaExpr, _arena: &'a AstArena) {
        self.lambda(id, lambda);
    }

    fn visit_type_expr(&mut self, id: TypeExprId, arena: &'a AstArena) {
        if self.anchor.is_some() {
            walk_type_expr(self, id, arena);
        } else {
            self.anchor = Some(NameSite::Type(id));
            walk_type_expr(self, id, arena);
            self.anchor = None;
        }
    }

    fn visit_name(&mut self, id: NameId, arena: &'a AstArena) {
        if self.name_sites[id.index()] == NameSite::Unvisited {
            self.name_sites[id.index()] = self.anchor.unwrap_or(NameSite::Lookup);
            self.name_scope[id.index()] = self.current;
        }
        walk_name(self, id, arena);
    }

    fn visit_param(&mut self, param: &'a Param, arena: &'a AstArena) {
        let saved_anchor = self.anchor.take();
        if let Some(name) = param.name {
            let kind = SymbolKind::Parameter {
                ty: param.ty,
                default: param.default,
            };
            let symbol = self.symbol(self.ident(name), kind, None, None);
            let symbol = self.add(symbol);
            self.declare_in(self.current, name, symbol);
            self.declarator(name, symbol);
        }
        self.visit_type_expr(param.ty, arena);
        if let Some(default) = param.default {
            self.visit_expr_id(default, arena);
        }
        self.anchor = saved_anchor;
    }
}

fn walk_variable<'a>(collector: &mut Collector<'a>, ty: TypeExprId, init: Option<Initializer>) {
    let arena = collector.arena;
    collector.visit_type_expr(ty, arena);
    match init {
        Some(Initializer::Copy(expr)) => collector.visit_expr_id(expr, arena),
        Some(Initializer::Direct(exprs) | Initializer::List(exprs) | Initializer::CopyList(exprs)) => {
            for &expr in arena.expr_list(exprs) {
                collector.visit_expr_id(expr, arena);
            }
        }
        None => {}
    }
}

fn function_info_mut(kind: &mut SymbolKind) -> Option<&mut FunctionInfo> {
    match kind {
        SymbolKind::Function(info)
        | SymbolKind::Template(TemplateInfo {
            entity: TemplateEntity::Function(info),
            ..
        }) => Some(info),
        _ => None,
    }
}

/// The `auto` placeholder inside a parameter type (`auto`, `const auto&`).
fn find_auto(arena: &AstArena, ty: TypeExprId) -> Option<TypeExprId> {
    match &arena.type_expr(ty).kind {
        TypeExprKind::Auto => Some(ty),
        TypeExprKind::Qualified { inner, .. }
        | TypeExprKind::Pointer(inner)
        | TypeExprKind::LValueRef(inner)
        | TypeExprKind::RValueRef(inner) => find_auto(arena, *inner),
        _ => None,
    }
}

/// Parameter lists spelled the same way, compared syntactically.
fn same_signature(arena: &AstArena, a: &FunctionDecl, b: &FunctionDecl) -> bool {
    let (pa, pb) = (arena.params(a.params), arena.params(b.params));
    a.variadic == b.variadic
        && a.is_const == b.is_const
        && a.special == b.special
        && pa.len() == pb.len()
        && pa
            .iter()
            .zip(pb)
            .all(|(x, y)| same_type_expr(arena, x.ty, y.ty))
        && (a.special != SpecialMember::ConversionOperator || same_type_expr(arena, a.ret, b.ret))
}

fn same_type_expr(arena: &AstArena, a: TypeExprId, b: TypeExprId) -> bool {
    match (&arena.type_expr(a).kind, &arena.type_expr(b).kind) {
        (TypeExprKind::Builtin(x), TypeExprKind::Builtin(y)) => x == y,
        (TypeExprKind::Named(x), TypeExprKind::Named(y)) => same_name(arena, *x, *y),
        (TypeExprKind::Auto, TypeExprKind::Auto)
        | (TypeExprKind::DecltypeAuto, TypeExprKind::DecltypeAuto) => true,
        (
            TypeExprKind::Qualified {
                inner: x,
                is_const: cx,
                is_volatile: vx,
            },
            TypeExprKind::Qualified {
                inner: y,
                is_const: cy,
                is_volatile: vy,
            },
        ) => cx == cy && vx == vy && same_type_expr(arena, *x, *y),
        (TypeExprKind::Pointer(x), TypeExprKind::Pointer(y))
        | (TypeExprKind::LValueRef(x), TypeExprKind::LValueRef(y))
        | (TypeExprKind::RValueRef(x), TypeExprKind::RValueRef(y))
        | (TypeExprKind::PackExpansion(x), TypeExprKind::PackExpansion(y))
        | (TypeExprKind::Array { elem: x, .. }, TypeExprKind::Array { elem: y, .. }) => {
            same_type_expr(arena, *x, *y)
        }
        (
            TypeExprKind::Function {
                ret: rx,
                params: px,
                variadic: vx,
            },
            TypeExprKind::Function {
                ret: ry,
                params: py,
                variadic: vy,
            },
        ) => {
            let (px, py) = (arena.type_list(*px), arena.type_list(*py));
            vx == vy
                && same_type_expr(arena, *rx, *ry)
                && px.len() == py.len()
                && px.iter().zip(py).all(|(x, y)| same_type_expr(arena, *x, *y))
        }
        _ => false,
    }
}

fn same_name(arena: &AstArena, a: NameId, b: NameId) -> bool {
    let (x, y) = (arena.name(a), arena.name(b));
    let qualifiers = match (x.qualifier, y.qualifier) {
        (Some(qx), Some(qy)) => same_name(arena, qx, qy),
        (None, None) => true,
        _ => false,
    };
    let args = match (x.template_args, y.template_args) {
        (Some(ax), Some(ay)) => {
            let (ax, ay) = (arena.template_args(ax), arena.template_args(ay));
            ax.len() == ay.len()
                && ax.iter().zip(ay).all(|pair| match pair {
                    (TemplateArg::Type(tx), TemplateArg::Type(ty)) => same_type_expr(arena, *tx, *ty),
                    _ => false,
                })
        }
        (None, None) => true,
        _ => false,
    };
    x.ident == y.ident && x.global == y.global && qualifiers && args
}

#[cfg(test)]
mod tests;
