//! Instantiation through the session cache.

use std::sync::Arc;

use cxx_diagnostic::ProblemKind;
use cxx_types::{ParamBindings, SymbolId, TemplateArg};

use super::Deduction;
use crate::cache::{CacheKey, Claim};
use crate::instance::Instance;
use crate::resolver::Resolver;
use crate::{Ctx, InstanceId};

impl Resolver<'_> {
    /// Instance of `template` for normalized `args`, seen from `ctx`.
    ///
    /// The pattern is selected before the cache slot is claimed: selection
    /// may instantiate other templates, and a thread holding a slot must
    /// never wait on another slot.
    #[tracing::instrument(level = "debug", skip(self, args))]
    pub(crate) fn instantiate(
        &mut self,
        template: SymbolId,
        args: Vec<TemplateArg>,
        ctx: Ctx,
    ) -> Result<InstanceId, ProblemKind> {
        let symbol = self.session.symbol(template);
        let Some(info) = symbol.template_info() else {
            return Err(ProblemKind::UnresolvedName);
        };
        let parent = self.ctx_for(ctx, info.depth);
        let key = CacheKey {
            template,
            parent,
            args: args.into(),
        };
        if let Some(id) = self.session.cache.get(&key) {
            tracing::trace!(?id, "instantiation cache hit");
            return Ok(id);
        }
        let level = ctx.map_or(0, |id| self.session.instance(id).level) + 1;
        let limit = self.session.config().max_instantiation_depth;
        if self.active.contains(&key) || self.depth >= limit || level > limit {
            tracing::debug!(depth = self.depth, level, "instantiation recursion limit");
            return Err(ProblemKind::RecursionLimit);
        }
        if self.is_cancelled() {
            return Err(ProblemKind::Cancelled);
        }

        self.active.insert(key.clone());
        self.depth += 1;
        let selected = cxx_stack::ensure_sufficient_stack(|| self.select_pattern(template, &key.args));
        self.depth -= 1;
        self.active.remove(&key);
        let (pattern, bindings) = selected?;
        if self.is_cancelled() {
            return Err(ProblemKind::Cancelled);
        }

        let args = Arc::clone(&key.args);
        match self.session.cache.claim(key) {
            Claim::Ready(id) => Ok(id),
            Claim::Owner(guard) => {
                let depth = self
                    .session
                    .symbol(pattern)
                    .template_info()
                    .map_or(info.depth, |pattern| pattern.depth);
                let id = self.session.instances().push(Instance {
                    template,
                    pattern,
                    args,
                    bindings,
                    depth,
                    parent,
                    level,
                });
                tracing::debug!(?id, ?pattern, "instantiated");
                Ok(guard.complete(id))
            }
        }
    }

    /// Pattern of an instance and the bindings of its parameters: the most
    /// specialized matching specialization, else the primary.
    fn select_pattern(
        &mut self,
        template: SymbolId,
        args: &[TemplateArg],
    ) -> Result<(SymbolId, ParamBindings), ProblemKind> {
        let symbol = self.session.symbol(template);
        let Some(info) = symbol.template_info() else {
            return Err(ProblemKind::UnresolvedName);
        };
        let mut matches: Vec<(SymbolId, ParamBindings)> = Vec::new();
        for &spec in &info.specializations {
            if let Some(bindings) = self.match_specialization(spec, args) {
                matches.push((spec, bindings));
            }
        }
        if matches.is_empty() {
            let mut bindings = ParamBindings::new();
            for (param, arg) in info.params.iter().zip(args) {
                bindings.insert(param.param, arg.clone());
            }
            return Ok((template, bindings));
        }

        let mut best = 0;
        for candidate in 1..matches.len() {
            if self.more_specialized_class(matches[candidate].0, matches[best].0) {
                best = candidate;
            }
        }
        let winner = matches[best].0;
        for (index, &(spec, _)) in matches.iter().enumerate() {
            if index != best && !self.more_specialized_class(winner, spec) {
                tracing::debug!(?winner, ?spec, "ambiguous partial specializations");
                return Err(ProblemKind::Ambiguous);
            }
        }
        Ok(matches.swap_remove(best))
    }

    /// Bindings of `spec`'s parameters if its pattern matches `args`.
    fn match_specialization(&mut self, spec: SymbolId, args: &[TemplateArg]) -> Option<ParamBindings> {
        let pattern = self.pattern_args(spec);
        let symbol = self.session.symbol(spec);
        let info = symbol.template_info()?;
        let mut deduction = Deduction::new(self.pool(), info.depth);
        if !deduction.deduce_args(&pattern, args) {
            return None;
        }
        let mut bindings = deduction.bindings;
        for param in info.params.iter() {
            if bindings.contains(param.param) {
                continue;
            }
            if !param.param.pack {
                // Not deducible from the arguments.
                return None;
            }
            bindings.insert(param.param, TemplateArg::Pack(Arc::from([])));
        }
        Some(bindings)
    }
}
