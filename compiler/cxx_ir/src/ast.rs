//! Raw C/C++ AST as handed over by the parser.
//!
//! Nodes are plain data. Children are ids into the owning [`AstArena`](crate::AstArena).
//! Name nodes carry the identifier text only; nothing in here is resolved.

mod decl;
mod expr;
mod names;
mod operators;
mod stmt;
mod types;

pub use decl::{
    Access, ClassKey, Decl, DeclKind, DeclSpecifiers, FunctionDecl, Initializer, Param,
    SpecialMember, TemplateParam, TemplateParamKind,
};
pub use expr::{
    Capture, CaptureDefault, CaptureKind, CastKind, Expr, ExprKind, IntSuffix, LambdaExpr, Literal,
};
pub use names::{NameNode, TemplateArg};
pub use operators::{BinaryOp, UnaryOp};
pub use stmt::{Stmt, StmtKind};
pub use types::{BuiltinType, TypeExpr, TypeExprKind};

#[cfg(test)]
mod tests;
