//! Lexical scopes of one translation unit.
//!
//! Scopes form a tree rooted at the global scope. Each maps names to the
//! symbols declared under them in insertion order. Lookup walks the parent
//! chain and stops at the nearest scope that declares the name: same-scope
//! overloads merge, outer declarations are hidden.
//!
//! Using-declarations and using-directives are kept by name node; the
//! resolver looks their targets up when a lookup reaches the scope.

use cxx_ir::{Name, NameId};
use cxx_types::SymbolId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::ScopeId;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Enum,
    /// Parameters of a `template<...>` header.
    TemplateParams,
    /// Function parameters.
    Function,
    /// Lambda parameters and init-captures.
    Lambda,
    Block,
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    symbol: SymbolId,
    /// Source offset of the declarator.
    position: u32,
}

/// A using-declaration or using-directive.
#[derive(Copy, Clone, Debug)]
struct Using {
    name: NameId,
    position: u32,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Namespace, class, enum, function or template owning the scope.
    pub owner: Option<SymbolId>,
    /// Template parameter lists enclosing the scope.
    pub template_depth: u16,
    entries: FxHashMap<Name, SmallVec<[Entry; 2]>>,
    order: Vec<SymbolId>,
    /// Using-declarations by the name they introduce.
    usings: FxHashMap<Name, SmallVec<[Using; 1]>>,
    directives: SmallVec<[Using; 1]>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, owner: Option<SymbolId>, depth: u16) -> Self {
        Scope {
            kind,
            parent,
            owner,
            template_depth: depth,
            entries: FxHashMap::default(),
            order: Vec::new(),
            usings: FxHashMap::default(),
            directives: SmallVec::new(),
        }
    }

    /// Source offset a lookup from `position` sees up to.
    fn limit(&self, position: Option<u32>) -> u32 {
        match (self.kind, position) {
            (ScopeKind::Block, Some(position)) => position,
            _ => u32::MAX,
        }
    }

    /// Declarations of `name` in this scope alone, in insertion order.
    ///
    /// Block scopes only see declarations before `position`; the other
    /// kinds see every declaration.
    pub fn find(&self, name: Name, position: Option<u32>) -> SmallVec<[SymbolId; 2]> {
        let Some(entries) = self.entries.get(&name) else {
            return SmallVec::new();
        };
        let limit = self.limit(position);
        entries
            .iter()
            .filter(|entry| entry.position <= limit)
            .map(|entry| entry.symbol)
            .collect()
    }

    /// Target names of the using-declarations introducing `name`.
    pub fn usings(&self, name: Name, position: Option<u32>) -> SmallVec<[NameId; 1]> {
        let limit = self.limit(position);
        self.usings
            .get(&name)
            .into_iter()
            .flatten()
            .filter(|using| using.position <= limit)
            .map(|using| using.name)
            .collect()
    }

    /// Namespace names nominated by the using-directives of the scope.
    pub fn directives(&self, position: Option<u32>) -> SmallVec<[NameId; 1]> {
        let limit = self.limit(position);
        self.directives
            .iter()
            .filter(|using| using.position <= limit)
            .map(|using| using.name)
            .collect()
    }

    /// Every symbol declared in the scope, in insertion order.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// All scopes of a unit. [`ScopeTree::GLOBAL`] is the root.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub const GLOBAL: ScopeId = ScopeId::new(0);

    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::new(ScopeKind::Global, None, None, 0)],
        }
    }

    pub fn push(
        &mut self,
        kind: ScopeKind,
        parent: ScopeId,
        owner: Option<SymbolId>,
        template_depth: u16,
    ) -> ScopeId {
        let id = ScopeId::from_len(self.scopes.len());
        self.scopes
            .push(Scope::new(kind, Some(parent), owner, template_depth));
        id
    }

    #[track_caller]
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[track_caller]
    pub(crate) fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Insert `symbol` under `name`. Re-declaring the same symbol under the
    /// same name is a no-op.
    pub fn declare(&mut self, scope: ScopeId, name: Name, symbol: SymbolId, position: u32) {
        let scope = self.get_mut(scope);
        let entries = scope.entries.entry(name).or_default();
        if entries.iter().any(|entry| entry.symbol == symbol) {
            return;
        }
        entries.push(Entry { symbol, position });
        scope.order.push(symbol);
    }

    /// `using target;` introducing `name` into `scope`.
    pub fn add_using(&mut self, scope: ScopeId, name: Name, target: NameId, position: u32) {
        self.get_mut(scope)
            .usings
            .entry(name)
            .or_default()
            .push(Using { name: target, position });
    }

    /// `using namespace nominated;` in `scope`.
    pub fn add_directive(&mut self, scope: ScopeId, nominated: NameId, position: u32) {
        self.get_mut(scope).directives.push(Using {
            name: nominated,
            position,
        });
    }

    /// `scope` and its ancestors, innermost first.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |&id| self.get(id).parent)
    }

    /// Nearest scope in the chain of `scope` satisfying `pred`.
    pub fn enclosing(&self, scope: ScopeId, pred: impl Fn(&Scope) -> bool) -> Option<ScopeId> {
        self.chain(scope).find(|&id| pred(self.get(id)))
    }

    /// Unqualified lookup along the parent chain.
    ///
    /// Returns the symbols of the nearest scope declaring `name`, empty if
    /// no scope does.
    pub fn lookup(&self, scope: ScopeId, name: Name, position: Option<u32>) -> SmallVec<[SymbolId; 2]> {
        for id in self.chain(scope) {
            let found = self.get(id).find(name, position);
            if !found.is_empty() {
                return found;
            }
        }
        SmallVec::new()
    }
}

#[cfg(test)]
mod tests;
