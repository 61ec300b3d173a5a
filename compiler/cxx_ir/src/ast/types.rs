use crate::{ExprId, NameId, Span, TypeExprId, TypeExprRange};

/// Fundamental types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum BuiltinType {
    Void,
    Bool,
    Char,
    SChar,
    UChar,
    WChar,
    Char16,
    Char32,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Float,
    Double,
    LongDouble,
    NullPtr,
}

impl BuiltinType {
    /// All builtin types, in declaration order.
    pub const ALL: [BuiltinType; 20] = [
        BuiltinType::Void,
        BuiltinType::Bool,
        BuiltinType::Char,
        BuiltinType::SChar,
        BuiltinType::UChar,
        BuiltinType::WChar,
        BuiltinType::Char16,
        BuiltinType::Char32,
        BuiltinType::Short,
        BuiltinType::UShort,
        BuiltinType::Int,
        BuiltinType::UInt,
        BuiltinType::Long,
        BuiltinType::ULong,
        BuiltinType::LongLong,
        BuiltinType::ULongLong,
        BuiltinType::Float,
        BuiltinType::Double,
        BuiltinType::LongDouble,
        BuiltinType::NullPtr,
    ];

    pub const fn spelling(self) -> &'static str {
        match self {
            BuiltinType::Void => "void",
            BuiltinType::Bool => "bool",
            BuiltinType::Char => "char",
            BuiltinType::SChar => "signed char",
            BuiltinType::UChar => "unsigned char",
            BuiltinType::WChar => "wchar_t",
            BuiltinType::Char16 => "char16_t",
            BuiltinType::Char32 => "char32_t",
            BuiltinType::Short => "short",
            BuiltinType::UShort => "unsigned short",
            BuiltinType::Int => "int",
            BuiltinType::UInt => "unsigned int",
            BuiltinType::Long => "long",
            BuiltinType::ULong => "unsigned long",
            BuiltinType::LongLong => "long long",
            BuiltinType::ULongLong => "unsigned long long",
            BuiltinType::Float => "float",
            BuiltinType::Double => "double",
            BuiltinType::LongDouble => "long double",
            BuiltinType::NullPtr => "std::nullptr_t",
        }
    }

    pub const fn is_integral(self) -> bool {
        !matches!(
            self,
            BuiltinType::Void
                | BuiltinType::Float
                | BuiltinType::Double
                | BuiltinType::LongDouble
                | BuiltinType::NullPtr
        )
    }

    pub const fn is_floating(self) -> bool {
        matches!(
            self,
            BuiltinType::Float | BuiltinType::Double | BuiltinType::LongDouble
        )
    }

    pub const fn is_arithmetic(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            BuiltinType::Bool
                | BuiltinType::UChar
                | BuiltinType::UShort
                | BuiltinType::UInt
                | BuiltinType::ULong
                | BuiltinType::ULongLong
                | BuiltinType::Char16
                | BuiltinType::Char32
        )
    }

    /// Integer conversion rank, `None` for non-integral types.
    pub const fn integer_rank(self) -> Option<u8> {
        match self {
            BuiltinType::Bool => Some(0),
            BuiltinType::Char | BuiltinType::SChar | BuiltinType::UChar => Some(1),
            BuiltinType::Short | BuiltinType::UShort | BuiltinType::Char16 => Some(2),
            BuiltinType::Int | BuiltinType::UInt | BuiltinType::WChar | BuiltinType::Char32 => {
                Some(3)
            }
            BuiltinType::Long | BuiltinType::ULong => Some(4),
            BuiltinType::LongLong | BuiltinType::ULongLong => Some(5),
            _ => None,
        }
    }
}

/// A type as written.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeExprKind {
    Builtin(BuiltinType),
    /// A class, enum, typedef, template parameter or template-id.
    Named(NameId),
    /// `auto` placeholder.
    Auto,
    /// `decltype(auto)` placeholder.
    DecltypeAuto,
    /// `decltype(expr)`.
    Decltype(ExprId),
    Qualified {
        inner: TypeExprId,
        is_const: bool,
        is_volatile: bool,
    },
    Pointer(TypeExprId),
    LValueRef(TypeExprId),
    RValueRef(TypeExprId),
    Array {
        elem: TypeExprId,
        size: Option<ExprId>,
    },
    Function {
        ret: TypeExprId,
        params: TypeExprRange,
        variadic: bool,
    },
    /// `T...` in a parameter or argument list.
    PackExpansion(TypeExprId),
}
