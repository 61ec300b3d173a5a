//! Template instances.

use std::sync::Arc;

use cxx_types::{ParamBindings, ParamRef, SymbolId, TemplateArg};
use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;

use crate::{Ctx, InstanceId};

/// A template instantiated with concrete arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instance {
    /// Primary template.
    pub template: SymbolId,
    /// Pattern the instance is built from: the primary, a partial or an
    /// explicit specialization.
    pub pattern: SymbolId,
    /// Arguments of the primary's parameters, one entry per parameter.
    pub args: Arc<[TemplateArg]>,
    /// Bindings of the pattern's parameters.
    pub bindings: ParamBindings,
    /// Depth of the pattern's parameter list.
    pub depth: u16,
    /// Instance of the enclosing template, if any.
    pub parent: Ctx,
    /// Instantiations that led to this one, itself included.
    pub level: u32,
}

impl Instance {
    /// The argument bound to `param` in this instance or an enclosing one.
    pub(crate) fn binds(&self, param: ParamRef) -> Option<&TemplateArg> {
        if param.depth == self.depth {
            self.bindings.get(param)
        } else {
            None
        }
    }
}

/// Append-only instance storage.
#[derive(Default)]
pub(crate) struct InstanceTable {
    instances: RwLock<Vec<Arc<Instance>>>,
    by_template: DashMap<SymbolId, Vec<InstanceId>, FxBuildHasher>,
}

impl InstanceTable {
    pub(crate) fn push(&self, instance: Instance) -> InstanceId {
        let template = instance.template;
        let id = {
            let mut instances = self.instances.write();
            let id = InstanceId::from_len(instances.len());
            instances.push(Arc::new(instance));
            id
        };
        self.by_template.entry(template).or_default().push(id);
        id
    }

    #[track_caller]
    pub(crate) fn get(&self, id: InstanceId) -> Arc<Instance> {
        Arc::clone(&self.instances.read()[id.index()])
    }

    /// Instances of `template`, oldest first.
    pub(crate) fn of_template(&self, template: SymbolId) -> Vec<InstanceId> {
        let mut ids = self
            .by_template
            .get(&template)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.read().len()
    }
}
