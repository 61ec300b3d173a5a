use crate::{
    BinaryOp, CaptureRange, ExprId, ExprRange, Name, NameId, ParamRange, Span, StmtId, TypeExprId,
    UnaryOp,
};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum IntSuffix {
    #[default]
    None,
    U,
    L,
    UL,
    LL,
    ULL,
}

/// Literal values. Floats are stored as bits so literals stay hashable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Literal {
    Int { value: u64, suffix: IntSuffix },
    Float { bits: u64, single: bool },
    Char(u32),
    String(Name),
    Bool(bool),
    Nullptr,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CastKind {
    /// `(T)e` and the single-argument functional form `T(e)`.
    CStyle,
    Static,
    Const,
    Reinterpret,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Literal(Literal),
    Id(NameId),
    Call {
        callee: ExprId,
        args: ExprRange,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Conditional {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Member {
        base: ExprId,
        member: NameId,
        arrow: bool,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    Cast {
        kind: CastKind,
        ty: TypeExprId,
        operand: ExprId,
    },
    /// `T(args...)` with other than one argument, or `T{args...}`.
    Construct {
        ty: TypeExprId,
        args: ExprRange,
        braced: bool,
    },
    Lambda(LambdaExpr),
    /// `sizeof...(Pack)`.
    SizeofPack(NameId),
    /// `e...` inside an argument list.
    PackExpansion(ExprId),
    BracedList(ExprRange),
    This,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CaptureDefault {
    #[default]
    None,
    Copy,
    Ref,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LambdaExpr {
    pub captures: CaptureRange,
    pub default_capture: CaptureDefault,
    pub params: ParamRange,
    pub trailing_return: Option<TypeExprId>,
    pub body: StmtId,
    pub mutable: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Capture {
    pub kind: CaptureKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum CaptureKind {
    Copy(NameId),
    Ref(NameId),
    This,
    /// `[x = e]`, `[x(e)]` or `[&x = e]`.
    Init {
        name: NameId,
        init: ExprId,
        by_ref: bool,
    },
}
