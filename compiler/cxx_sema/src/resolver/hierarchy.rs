//! Class hierarchy queries.

use cxx_ir::DeclKind;
use cxx_types::{standard_conversion, ClassHierarchy, ConversionSource, Cost, Idx, SymbolId, TypeData};

use super::Resolver;
use crate::symbol::SymbolKind;
use crate::Ctx;

impl<'s> Resolver<'s> {
    /// Direct base classes of a class or class template specialization.
    pub(crate) fn bases_of(&mut self, ty: Idx) -> Vec<Idx> {
        let pool = self.pool();
        let ty = pool.strip_cv(ty);
        let (class, ctx): (SymbolId, Ctx) = match pool.get(ty) {
            TypeData::Class(symbol) => (symbol, None),
            TypeData::Specialization { template, .. } if pool.is_dependent(ty) => (template, None),
            TypeData::Specialization { template, args } => {
                match self.instantiate(template, args.to_vec(), None) {
                    Ok(instance) => (self.session.instance(instance).pattern, Some(instance)),
                    Err(kind) => {
                        tracing::debug!(?kind, "bases of an uninstantiable specialization");
                        return Vec::new();
                    }
                }
            }
            _ => return Vec::new(),
        };
        let symbol = self.session.symbol(class);
        let decl = match &symbol.kind {
            SymbolKind::Template(info) => info.inner,
            SymbolKind::Class { .. } => symbol.decl,
            _ => None,
        };
        let Some(decl) = decl else {
            return Vec::new();
        };
        let unit = self.session.unit(symbol.unit);
        let DeclKind::Class { bases, .. } = unit.arena().decl(decl).kind else {
            return Vec::new();
        };
        let bases = unit.arena().type_list(bases).to_vec();
        self.lower_types(&unit, &bases, ctx)
    }

    /// Derivation steps from `derived` to `base`, both class types.
    pub(crate) fn base_distance(&mut self, derived: Idx, base: Idx) -> Option<u16> {
        self.base_distance_at(derived, base, 0)
    }

    fn base_distance_at(&mut self, derived: Idx, base: Idx, level: u16) -> Option<u16> {
        let pool = self.pool();
        let (derived, base) = (pool.strip_cv(derived), pool.strip_cv(base));
        if derived == base {
            return Some(0);
        }
        if level >= self.session.config().max_inheritance_depth {
            return None;
        }
        self.bases_of(derived)
            .into_iter()
            .filter_map(|direct| self.base_distance_at(direct, base, level + 1))
            .min()
            .map(|depth| depth + 1)
    }

    /// Standard conversion of `source` to `target` with this session's
    /// class hierarchy.
    pub(crate) fn conversion(&mut self, source: ConversionSource, target: Idx) -> Cost {
        let pool = self.pool();
        standard_conversion(pool, source, target, &mut Hierarchy { resolver: self })
    }
}

/// [`ClassHierarchy`] backed by a resolver.
pub(crate) struct Hierarchy<'r, 's> {
    resolver: &'r mut Resolver<'s>,
}

impl ClassHierarchy for Hierarchy<'_, '_> {
    fn base_distance(&mut self, derived: Idx, base: Idx) -> Option<u16> {
        self.resolver.base_distance(derived, base)
    }

    fn is_scoped_enum(&self, symbol: SymbolId) -> bool {
        matches!(
            self.resolver.session.symbol(symbol).kind,
            SymbolKind::Enum { scoped: true, .. }
        )
    }
}
