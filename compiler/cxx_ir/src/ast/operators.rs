//! Operator kinds.

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Deref,
    AddrOf,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    /// Name of the overloadable operator function, e.g. `operator-`.
    pub const fn function_name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "operator-",
            UnaryOp::Plus => "operator+",
            UnaryOp::Not => "operator!",
            UnaryOp::BitNot => "operator~",
            UnaryOp::Deref => "operator*",
            UnaryOp::AddrOf => "operator&",
            UnaryOp::PreInc | UnaryOp::PostInc => "operator++",
            UnaryOp::PreDec | UnaryOp::PostDec => "operator--",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Assign,
    AddAssign,
    SubAssign,
    Comma,
}

impl BinaryOp {
    pub const fn function_name(self) -> &'static str {
        match self {
            BinaryOp::Add => "operator+",
            BinaryOp::Sub => "operator-",
            BinaryOp::Mul => "operator*",
            BinaryOp::Div => "operator/",
            BinaryOp::Rem => "operator%",
            BinaryOp::Shl => "operator<<",
            BinaryOp::Shr => "operator>>",
            BinaryOp::Lt => "operator<",
            BinaryOp::Gt => "operator>",
            BinaryOp::Le => "operator<=",
            BinaryOp::Ge => "operator>=",
            BinaryOp::Eq => "operator==",
            BinaryOp::Ne => "operator!=",
            BinaryOp::BitAnd => "operator&",
            BinaryOp::BitOr => "operator|",
            BinaryOp::BitXor => "operator^",
            BinaryOp::And => "operator&&",
            BinaryOp::Or => "operator||",
            BinaryOp::Assign => "operator=",
            BinaryOp::AddAssign => "operator+=",
            BinaryOp::SubAssign => "operator-=",
            BinaryOp::Comma => "operator,",
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign | BinaryOp::AddAssign | BinaryOp::SubAssign
        )
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }
}
