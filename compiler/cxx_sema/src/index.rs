//! Cross-unit symbol index.
//!
//! Namespace-scope declarations of every unit are published under their
//! qualified name. Lookups that find nothing in the unit itself fall back to
//! the index. The store behind the trait is opaque to the resolver.

use std::fmt;

use cxx_ir::{Name, StringInterner};
use cxx_types::SymbolId;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;

/// Namespace path plus final identifier, outermost first.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct QualifiedName(SmallVec<[Name; 4]>);

impl QualifiedName {
    pub fn new(path: impl IntoIterator<Item = Name>) -> Self {
        QualifiedName(path.into_iter().collect())
    }

    pub fn segments(&self) -> &[Name] {
        &self.0
    }

    #[must_use]
    pub fn child(&self, name: Name) -> Self {
        let mut path = self.0.clone();
        path.push(name);
        QualifiedName(path)
    }

    pub fn display(&self, interner: &StringInterner) -> String {
        self.0
            .iter()
            .map(|&name| interner.lookup(name))
            .collect::<Vec<_>>()
            .join("::")
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Key-to-declaration store shared by the units of a session.
pub trait SymbolIndex: Send + Sync {
    /// Declarations published under `name`, in publication order.
    fn lookup_in_index(&self, name: &QualifiedName) -> Vec<SymbolId>;

    fn publish_declaration(&self, name: QualifiedName, symbol: SymbolId);
}

/// Index held in memory for the lifetime of the session.
#[derive(Default)]
pub struct InMemoryIndex {
    entries: DashMap<QualifiedName, SmallVec<[SymbolId; 2]>, FxBuildHasher>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SymbolIndex for InMemoryIndex {
    fn lookup_in_index(&self, name: &QualifiedName) -> Vec<SymbolId> {
        self.entries
            .get(name)
            .map(|symbols| symbols.to_vec())
            .unwrap_or_default()
    }

    fn publish_declaration(&self, name: QualifiedName, symbol: SymbolId) {
        let mut symbols = self.entries.entry(name).or_default();
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
}

#[cfg(test)]
mod tests;
