//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cxx_diagnostic::{Problem, ProblemKind};
use cxx_ir::Span;

/// Shared flag checked between node visits.
///
/// Clones observe the same flag. A cancelled request returns
/// `Problem(Cancelled)` and publishes nothing to the shared caches.
#[derive(Clone, Default, Debug)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancelled.
    pub fn check(&self) -> Result<(), Problem> {
        if self.is_cancelled() {
            Err(Problem::new(ProblemKind::Cancelled, Span::DUMMY))
        } else {
            Ok(())
        }
    }
}
