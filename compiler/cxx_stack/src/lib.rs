//! Stack growth for deep recursion.
//!
//! Expression typing, template instantiation, default template arguments
//! and return-type deduction recurse through each other, so a deeply
//! nested expression or a long instantiation chain can outgrow the thread's
//! stack. Each re-entry point wraps itself in [`ensure_sufficient_stack`].
//!
//! Native targets grow the stack on demand with `stacker`. On wasm the call
//! passes straight through.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
