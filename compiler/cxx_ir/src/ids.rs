//! Node ids and ranges for the flat AST.
//!
//! Every node kind lives in its own arena vector and is addressed by a
//! 32-bit index. Lists of children are stored as contiguous ranges, either
//! directly over a node vector (parameters, captures, template parameters
//! and arguments, which are always allocated together) or over a side list
//! of ids (expressions, statements, declarations, type expressions).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Common interface of arena ids, used by [`IdRange`] iteration.
pub trait ArenaId: Copy {
    fn from_raw(raw: u32) -> Self;
    fn raw(self) -> u32;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Invalid id (sentinel value).
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the arena.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl ArenaId for $name {
            #[inline]
            fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            #[inline]
            fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", stringify!($name), self.0)
                } else {
                    write!(f, "{}::INVALID", stringify!($name))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}

define_id!(
    /// Index of a [`NameNode`](crate::NameNode).
    NameId
);
define_id!(
    /// Index of an [`Expr`](crate::Expr).
    ExprId
);
define_id!(
    /// Index of a [`Stmt`](crate::Stmt).
    StmtId
);
define_id!(
    /// Index of a [`Decl`](crate::Decl).
    DeclId
);
define_id!(
    /// Index of a [`TypeExpr`](crate::TypeExpr).
    TypeExprId
);
define_id!(
    /// Index of a function or lambda [`Param`](crate::Param).
    ParamId
);
define_id!(
    /// Index of a [`TemplateParam`](crate::TemplateParam).
    TemplateParamId
);
define_id!(
    /// Index of a lambda [`Capture`](crate::Capture).
    CaptureId
);
define_id!(
    /// Index of a [`TemplateArg`](crate::TemplateArg) as written.
    TemplateArgId
);

/// Contiguous range of ids.
///
/// `start` is an offset into the backing vector (a node vector or an id
/// list, depending on the id kind), `len` the number of entries.
#[repr(C)]
pub struct IdRange<I> {
    pub start: u32,
    pub len: u32,
    _marker: PhantomData<fn() -> I>,
}

impl<I> IdRange<I> {
    /// Empty range.
    pub const EMPTY: Self = IdRange {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        IdRange {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Backing-vector indices covered by this range.
    #[inline]
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

impl<I: ArenaId> IdRange<I> {
    /// Iterate ids, valid for ranges laid directly over a node vector.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = I> + ExactSizeIterator + '_ {
        (self.start..self.start + self.len).map(I::from_raw)
    }
}

impl<I> Copy for IdRange<I> {}

impl<I> Clone for IdRange<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I> PartialEq for IdRange<I> {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.len == other.len
    }
}

impl<I> Eq for IdRange<I> {}

impl<I> Hash for IdRange<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.len.hash(state);
    }
}

impl<I> Default for IdRange<I> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<I> fmt::Debug for IdRange<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdRange({}..{})", self.start, self.start + self.len)
    }
}

/// Range into the expression id list.
pub type ExprRange = IdRange<ExprId>;
/// Range into the statement id list.
pub type StmtRange = IdRange<StmtId>;
/// Range into the declaration id list.
pub type DeclRange = IdRange<DeclId>;
/// Range into the type expression id list.
pub type TypeExprRange = IdRange<TypeExprId>;
/// Range over the parameter vector.
pub type ParamRange = IdRange<ParamId>;
/// Range over the template parameter vector.
pub type TemplateParamRange = IdRange<TemplateParamId>;
/// Range over the capture vector.
pub type CaptureRange = IdRange<CaptureId>;
/// Range over the template argument vector.
pub type TemplateArgRange = IdRange<TemplateArgId>;

#[cfg(test)]
mod tests;
