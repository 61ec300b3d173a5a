//! Resolved meaning of a name.

use std::sync::Arc;

use cxx_diagnostic::{Problem, ProblemKind};
use cxx_types::SymbolId;

use crate::InstanceId;

/// What a name node resolves to.
///
/// Every name node of a unit owns exactly one binding after resolution;
/// failures are `Problem` values, never panics.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Declaration(SymbolId),
    /// Several same-named functions not narrowed by a call or target type.
    OverloadSet(Arc<[SymbolId]>),
    /// A template instance: `pi<int>`, or the function template selected
    /// by a call.
    Instance(InstanceId),
    /// Inside an uninstantiated template, depends on its parameters.
    Dependent,
    Problem(Problem),
}

impl Binding {
    #[inline]
    pub fn is_problem(&self) -> bool {
        matches!(self, Binding::Problem(_))
    }

    pub fn problem_kind(&self) -> Option<ProblemKind> {
        match self {
            Binding::Problem(problem) => Some(problem.kind),
            _ => None,
        }
    }

    pub fn as_declaration(&self) -> Option<SymbolId> {
        match self {
            Binding::Declaration(symbol) => Some(*symbol),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<InstanceId> {
        match self {
            Binding::Instance(instance) => Some(*instance),
            _ => None,
        }
    }

    /// `Err` for problem bindings.
    pub fn into_result(self) -> Result<Binding, Problem> {
        match self {
            Binding::Problem(problem) => Err(problem),
            other => Ok(other),
        }
    }
}
