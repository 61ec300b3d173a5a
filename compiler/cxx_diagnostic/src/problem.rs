//! Problem values.

use cxx_ir::{Span, StringInterner};

use crate::{Diagnostic, ErrorCode};

/// What went wrong while resolving a name, expression or type.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, thiserror::Error)]
pub enum ProblemKind {
    /// Lookup found no declaration.
    #[error("unresolved name")]
    UnresolvedName,
    /// Lookup or overload resolution found several equally good candidates.
    #[error("ambiguous reference")]
    Ambiguous,
    /// Candidates exist but none accepts the arguments.
    #[error("no viable candidate")]
    NoViableCandidate,
    /// Template arguments could not be deduced consistently.
    #[error("template argument deduction failed")]
    DeductionFailure,
    /// Disagreeing deduced types, or an initializer without a usable type.
    #[error("type mismatch")]
    TypeMismatch,
    /// The request was cancelled by its caller.
    #[error("cancelled")]
    Cancelled,
    /// Instantiation or deduction nested deeper than allowed.
    #[error("recursion limit reached")]
    RecursionLimit,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 7] = [
        ProblemKind::UnresolvedName,
        ProblemKind::Ambiguous,
        ProblemKind::NoViableCandidate,
        ProblemKind::DeductionFailure,
        ProblemKind::TypeMismatch,
        ProblemKind::Cancelled,
        ProblemKind::RecursionLimit,
    ];

    pub const fn code(self) -> ErrorCode {
        match self {
            ProblemKind::UnresolvedName => ErrorCode::E3001,
            ProblemKind::Ambiguous => ErrorCode::E3002,
            ProblemKind::NoViableCandidate => ErrorCode::E3003,
            ProblemKind::DeductionFailure => ErrorCode::E3004,
            ProblemKind::TypeMismatch => ErrorCode::E3005,
            ProblemKind::Cancelled => ErrorCode::E3006,
            ProblemKind::RecursionLimit => ErrorCode::E3007,
        }
    }

    /// Position in [`ProblemKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A problem at a source location, optionally naming the entity involved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Problem {
    pub kind: ProblemKind,
    pub span: Span,
    pub name: Option<cxx_ir::Name>,
}

impl Problem {
    pub fn new(kind: ProblemKind, span: Span) -> Self {
        Problem {
            kind,
            span,
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: cxx_ir::Name) -> Self {
        self.name = Some(name);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    /// Render for presentation.
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        let subject = self
            .name
            .map(|name| format!("`{}`", interner.lookup(name)))
            .unwrap_or_else(|| "expression".to_string());
        let message = match self.kind {
            ProblemKind::UnresolvedName => format!("cannot resolve {subject}"),
            ProblemKind::Ambiguous => format!("reference to {subject} is ambiguous"),
            ProblemKind::NoViableCandidate => format!("no matching overload for {subject}"),
            ProblemKind::DeductionFailure => {
                format!("cannot deduce template arguments for {subject}")
            }
            ProblemKind::TypeMismatch => format!("inconsistent types for {subject}"),
            ProblemKind::Cancelled => "resolution cancelled".to_string(),
            ProblemKind::RecursionLimit => {
                format!("recursion limit reached while resolving {subject}")
            }
        };
        Diagnostic::error(self.code())
            .with_message(message)
            .with_label(self.span, self.kind.to_string())
    }
}

#[cfg(test)]
mod tests;
