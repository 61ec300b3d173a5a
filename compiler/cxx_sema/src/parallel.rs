//! Parallel resolution of independent units.
//!
//! Each unit gets its own resolver on a rayon worker. Workers share the
//! session: template instances go through the single-flight cache, so two
//! units instantiating `S<int>` at once end up with the same instance.

use cxx_diagnostic::Problem;
use rayon::prelude::*;

use crate::{AnalysisSession, CancellationToken, UnitId, UnitResolution};

/// Resolve every name and expression of `units`, in parallel.
///
/// Results come back in the order of `units`. Cancelling `cancel` stops
/// the remaining work; units not finished by then report `Cancelled`.
#[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
pub fn resolve_units_parallel(
    session: &AnalysisSession,
    units: &[UnitId],
    cancel: &CancellationToken,
) -> Vec<Result<UnitResolution, Problem>> {
    units
        .par_iter()
        .map(|&unit| {
            cancel.check()?;
            session.resolver(cancel.clone()).resolve_all(unit)
        })
        .collect()
}

#[cfg(test)]
mod tests;
