//! Value categories of expressions.

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ValueCategory {
    /// Designates an object or function with identity.
    LValue,
    /// Expiring value (`std::move(x)`, call returning `T&&`).
    XValue,
    /// Pure value (literals, calls returning non-references).
    #[default]
    PRValue,
}

impl ValueCategory {
    #[inline]
    pub const fn is_lvalue(self) -> bool {
        matches!(self, Self::LValue)
    }

    /// xvalue or prvalue.
    #[inline]
    pub const fn is_rvalue(self) -> bool {
        !self.is_lvalue()
    }

    /// glvalue (lvalue or xvalue).
    #[inline]
    pub const fn is_glvalue(self) -> bool {
        !matches!(self, Self::PRValue)
    }
}
