use crate::{ExprId, Name, NameId, Span, TemplateArgRange, TypeExprId};

/// A possibly qualified, possibly templated name as written.
///
/// `A::B<int>::c` is three nodes: `c` whose qualifier is `B<int>` whose
/// qualifier is `A`. A leading `::` sets `global` on the outermost node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NameNode {
    pub ident: Name,
    pub qualifier: Option<NameId>,
    pub global: bool,
    pub template_args: Option<TemplateArgRange>,
    pub span: Span,
}

/// A template argument as written.
///
/// The parser cannot tell `f<N>` (a value) from `f<T>` (a type) when the
/// argument is a plain name; such arguments arrive as `Type` with a named
/// type expression and are reclassified during resolution.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TemplateArg {
    Type(TypeExprId),
    Expr(ExprId),
}
