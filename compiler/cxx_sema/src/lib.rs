//! Semantic core for C/C++: what every name means.
//!
//! Given the ASTs of several translation units, answers what each name
//! node binds to and what type each expression has, the way a compiler
//! front end would, but lazily and per query:
//!
//! - [`AnalysisSession`]: shared state of one analysis (pool, symbols,
//!   units, instances, instantiation cache, cross-unit index)
//! - [`Resolver`]: the query engine; one per request or worker thread
//! - [`Binding`]: what a name node resolves to, problems included
//! - [`resolve_units_parallel`]: whole-unit resolution on a rayon pool
//!
//! Adding a unit runs its declaration pass (scopes and symbols) and
//! publishes its namespace-scope declarations to the index. Everything
//! else (lookup, overload resolution, template instantiation, `auto` and
//! return type deduction) happens on demand.

mod binding;
mod cache;
mod cancel;
mod collect;
mod config;
mod deduce;
mod ids;
pub mod index;
mod instance;
mod overload;
mod parallel;
mod resolver;
pub mod scope;
mod session;
pub mod symbol;
mod template;

#[cfg(test)]
mod test_helpers;

pub use binding::Binding;
pub use cancel::CancellationToken;
pub use config::SessionConfig;
pub use ids::{Ctx, InstanceId, ScopeId, UnitId};
pub use index::{InMemoryIndex, QualifiedName, SymbolIndex};
pub use instance::Instance;
pub use parallel::resolve_units_parallel;
pub use resolver::{NameRef, Resolver, UnitResolution};
pub use session::{AnalysisSession, Unit};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber printing the resolution tree.
///
/// Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=cxx_sema=debug`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // Another subscriber may already be installed (test harnesses).
            let _ = tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .try_init();
        }
    });
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Ctx;
    cxx_ir::static_assert_size!(Ctx, 8);
}
