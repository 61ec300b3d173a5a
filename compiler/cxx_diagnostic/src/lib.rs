//! Problem taxonomy and diagnostics for the semantic core.
//!
//! Expected failures never abort resolution. They are encoded as
//! [`Problem`] values that take the place of the binding or type that could
//! not be computed; tooling renders them through [`Diagnostic`].

mod diagnostic;
mod error_code;
mod problem;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use problem::{Problem, ProblemKind};
