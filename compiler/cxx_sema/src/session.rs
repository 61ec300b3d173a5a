//! Analysis session: the explicit context every query runs against.
//!
//! A session owns the shared state of one analysis: interner, type pool,
//! symbol table, units, template instances, the instantiation cache and the
//! cross-unit index. Units are added once and never mutated; resolvers
//! borrow the session and may run on several threads at once.

use std::sync::Arc;

use cxx_ir::{
    AstArena, DeclId, ExprId, NameId, SharedInterner, StmtId, StringInterner, TranslationUnit,
    TypeExprId,
};
use cxx_types::{Idx, ParamRef, SymbolId, TypeNames, TypePool};
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::cache::InstantiationCache;
use crate::collect::collect_unit;
use crate::index::{InMemoryIndex, SymbolIndex};
use crate::instance::{Instance, InstanceTable};
use crate::scope::ScopeTree;
use crate::symbol::{Symbol, SymbolTable};
use crate::{CancellationToken, Ctx, InstanceId, Resolver, ScopeId, SessionConfig, UnitId};

/// How a name node is resolved.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum NameSite {
    /// Not reached by the declaration pass.
    Unvisited,
    /// Declarator of the symbol.
    Declarator(SymbolId),
    /// Inside the expression tree rooted at the id.
    Expr(ExprId),
    /// Inside the type expression rooted at the id.
    Type(TypeExprId),
    /// Stand-alone reference resolved by plain lookup (captures).
    Lookup,
}

/// Function or lambda body owning `return` statements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum BodyOwner {
    Function(DeclId),
    Lambda(ExprId),
}

#[derive(Clone, Debug)]
pub(crate) struct LambdaInfo {
    /// Scope of the parameters and init-captures.
    pub scope: ScopeId,
    /// Template parameters invented for `auto` parameters, in order.
    pub invented: Arc<[ParamRef]>,
    /// Depth of the invented parameter list.
    pub depth: u16,
    /// Scope the lambda expression appears in.
    pub enclosing: ScopeId,
}

/// A translation unit with its declaration-pass tables.
pub struct Unit {
    pub id: UnitId,
    pub tu: TranslationUnit,
    pub scopes: ScopeTree,
    pub(crate) name_sites: Vec<NameSite>,
    pub(crate) name_scope: Vec<ScopeId>,
    pub(crate) expr_scope: Vec<ScopeId>,
    /// Root of the expression tree each expression belongs to.
    pub(crate) expr_root: Vec<ExprId>,
    pub(crate) decl_symbols: FxHashMap<DeclId, SymbolId>,
    pub(crate) returns: FxHashMap<BodyOwner, Vec<StmtId>>,
    pub(crate) lambdas: FxHashMap<ExprId, LambdaInfo>,
    /// Parameter invented for an `auto` in a generic lambda parameter.
    pub(crate) invented: FxHashMap<TypeExprId, ParamRef>,
    /// Root expression of a variable initializer.
    pub(crate) init_of: FxHashMap<ExprId, SymbolId>,
}

impl Unit {
    #[inline]
    pub fn arena(&self) -> &AstArena {
        &self.tu.arena
    }

    /// Symbol declared by `decl`.
    pub fn symbol_of(&self, decl: DeclId) -> Option<SymbolId> {
        self.decl_symbols.get(&decl).copied()
    }

    #[inline]
    pub(crate) fn name_site(&self, name: NameId) -> NameSite {
        self.name_sites
            .get(name.index())
            .copied()
            .unwrap_or(NameSite::Unvisited)
    }

    #[inline]
    pub(crate) fn scope_of_name(&self, name: NameId) -> ScopeId {
        self.name_scope
            .get(name.index())
            .copied()
            .unwrap_or(ScopeTree::GLOBAL)
    }

    #[inline]
    pub(crate) fn scope_of_expr(&self, expr: ExprId) -> ScopeId {
        self.expr_scope
            .get(expr.index())
            .copied()
            .unwrap_or(ScopeTree::GLOBAL)
    }

    #[inline]
    pub(crate) fn root_of_expr(&self, expr: ExprId) -> ExprId {
        self.expr_root.get(expr.index()).copied().unwrap_or(expr)
    }
}

pub struct AnalysisSession {
    config: SessionConfig,
    interner: SharedInterner,
    pool: TypePool,
    symbols: SymbolTable,
    units: RwLock<Vec<Arc<Unit>>>,
    instances: InstanceTable,
    pub(crate) cache: InstantiationCache,
    index: Arc<dyn SymbolIndex>,
    /// Closure symbol per lambda expression and instantiation context.
    pub(crate) closures: DashMap<(UnitId, ExprId, Ctx), SymbolId, FxBuildHasher>,
}

impl AnalysisSession {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_interner(config, SharedInterner::new())
    }

    /// Session over an interner shared with the parser.
    pub fn with_interner(config: SessionConfig, interner: SharedInterner) -> Self {
        AnalysisSession {
            config,
            interner,
            pool: TypePool::new(),
            symbols: SymbolTable::new(),
            units: RwLock::new(Vec::new()),
            instances: InstanceTable::default(),
            cache: InstantiationCache::default(),
            index: Arc::new(InMemoryIndex::new()),
            closures: DashMap::default(),
        }
    }

    /// Replace the cross-unit index. Call before adding units.
    #[must_use]
    pub fn with_index(mut self, index: Arc<dyn SymbolIndex>) -> Self {
        self.index = index;
        self
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    #[inline]
    pub fn pool(&self) -> &TypePool {
        &self.pool
    }

    #[inline]
    pub fn index(&self) -> &dyn SymbolIndex {
        self.index.as_ref()
    }

    #[inline]
    pub(crate) fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[track_caller]
    pub fn symbol(&self, id: SymbolId) -> Arc<Symbol> {
        self.symbols.get(id)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    #[track_caller]
    pub fn unit(&self, id: UnitId) -> Arc<Unit> {
        Arc::clone(&self.units.read()[id.index()])
    }

    pub fn unit_ids(&self) -> Vec<UnitId> {
        (0..self.units.read().len()).map(UnitId::from_len).collect()
    }

    #[track_caller]
    pub fn instance(&self, id: InstanceId) -> Arc<Instance> {
        self.instances.get(id)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    /// Run the declaration pass over `tu` and publish its namespace-scope
    /// declarations to the index.
    #[tracing::instrument(level = "debug", skip_all, fields(file = self.interner.lookup(tu.file)))]
    pub fn add_unit(&self, tu: TranslationUnit) -> UnitId {
        let mut units = self.units.write();
        let id = UnitId::from_len(units.len());
        let (unit, published) = self
            .symbols
            .extend_with(|base| collect_unit(id, tu, base));
        for (name, symbol) in published {
            self.index.publish_declaration(name, symbol);
        }
        tracing::debug!(
            unit = ?id,
            scopes = unit.scopes.len(),
            symbols = self.symbols.len(),
            "unit collected"
        );
        units.push(Arc::new(unit));
        id
    }

    /// Resolver for one request, sharing this session's caches.
    pub fn resolver(&self, cancel: CancellationToken) -> Resolver<'_> {
        Resolver::new(self, cancel)
    }

    /// Render a type for presentation.
    pub fn display_type(&self, ty: Idx) -> String {
        self.pool.display(ty, self)
    }
}

impl TypeNames for AnalysisSession {
    fn ident(&self, name: cxx_ir::Name) -> String {
        self.interner.lookup(name).to_string()
    }

    fn symbol(&self, symbol: SymbolId) -> String {
        if symbol.index() >= self.symbols.len() {
            return format!("<symbol {}>", symbol.raw());
        }
        let symbol = self.symbols.get(symbol);
        let name = self.interner.lookup(symbol.name);
        if name.is_empty() {
            "<lambda>".to_string()
        } else {
            name.to_string()
        }
    }
}
