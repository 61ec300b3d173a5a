//! C/C++ IR - raw syntax consumed by the semantic core
//!
//! This crate contains the data structures shared between the external
//! parser collaborator and the semantic analysis engine:
//! - Spans for source locations
//! - Names for interned identifiers
//! - The raw AST (declarations, statements, expressions, type expressions)
//! - Arena allocation for every node kind
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers become `Name(u32)`
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId(u32)` indices
//! - **Unresolved**: name nodes carry text only; binding them is the
//!   semantic core's job
//!
//! Every node kind is `Clone + Eq + Hash + Debug` so that ids can be used as
//! memoization keys by the resolver.

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod builder;
mod ids;
mod interner;
mod name;
mod span;
pub mod visitor;

pub use arena::{AstArena, TranslationUnit};
pub use ast::{
    Access, BinaryOp, BuiltinType, Capture, CaptureDefault, CaptureKind, CastKind, ClassKey, Decl,
    DeclKind, DeclSpecifiers, Expr, ExprKind, FunctionDecl, Initializer, IntSuffix, LambdaExpr,
    Literal, NameNode, Param, SpecialMember, Stmt, StmtKind, TemplateArg, TemplateParam,
    TemplateParamKind, TypeExpr, TypeExprKind, UnaryOp,
};
pub use builder::AstBuilder;
pub use ids::{
    ArenaId, CaptureId, CaptureRange, DeclId, DeclRange, ExprId, ExprRange, IdRange, NameId, ParamId,
    ParamRange, StmtId, StmtRange, TemplateArgId, TemplateArgRange, TemplateParamId,
    TemplateParamRange, TypeExprId, TypeExprRange,
};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ExprId, Name, NameId, Span};
    static_assert_size!(Name, 4);
    static_assert_size!(NameId, 4);
    static_assert_size!(ExprId, 4);
    static_assert_size!(Span, 8);
}
