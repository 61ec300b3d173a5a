//! Templates: argument resolution, deduction, partial ordering and
//! instantiation.
//!
//! # Instantiation
//!
//! An instance is keyed by its primary template, the enclosing instance
//! and its normalized arguments (one entry per parameter of the primary).
//! The pattern is the most specialized partial or explicit specialization
//! whose arguments deduce from the key's arguments, else the primary.
//! Instances are shared session-wide through the single-flight cache; a
//! request that would re-enter an instantiation already on its own stack,
//! or nest deeper than the configured bound, fails with `RecursionLimit`.
//!
//! Members are never instantiated eagerly. An instance only records the
//! bindings of its pattern's parameters; member types and values are
//! computed on demand in the instance's context.

mod args;
mod instantiate;
mod ordering;
pub(crate) mod unify;

use std::sync::Arc;

use cxx_ir::TemplateParamKind;
use cxx_types::{ParamRef, TemplateArg, TypePool, Value};

use crate::symbol::TemplateParamInfo;

pub(crate) use unify::{CallArg, Deduction};

/// Stand-in of a template parameter for partial ordering: a unique type,
/// value or pack no other parameter can be deduced equal to.
pub(crate) fn synthesized(pool: &TypePool, param: &TemplateParamInfo) -> TemplateArg {
    let synth = ParamRef::new(
        ParamRef::SYNTHESIZED_DEPTH,
        param.param.index,
        param.param.pack,
        param.param.name,
    );
    let arg = match param.kind {
        TemplateParamKind::NonType(_) => TemplateArg::Value(Value::Param(synth)),
        TemplateParamKind::Type | TemplateParamKind::Template(_) => {
            TemplateArg::Type(pool.template_param(synth))
        }
    };
    if !synth.pack {
        return arg;
    }
    let elem = match arg {
        TemplateArg::Type(ty) => TemplateArg::Type(pool.pack_expansion(ty)),
        other => other,
    };
    TemplateArg::Pack(Arc::from([elem]))
}
