//! Type index handle.
//!
//! `Idx` is the canonical type representation: every type is interned in
//! the [`TypePool`](crate::TypePool) and compared by index.
//!
//! Layout: shard (4 bits) + local index (28 bits). Builtins, placeholders
//! and problem types are pre-interned in shard 0 at fixed indices, so their
//! handles are constants.

use std::fmt;

use cxx_diagnostic::ProblemKind;
use cxx_ir::BuiltinType;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Builtins (indices 0-19, in `BuiltinType` order) ===
    pub const VOID: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const CHAR: Self = Self(2);
    pub const SCHAR: Self = Self(3);
    pub const UCHAR: Self = Self(4);
    pub const WCHAR: Self = Self(5);
    pub const CHAR16: Self = Self(6);
    pub const CHAR32: Self = Self(7);
    pub const SHORT: Self = Self(8);
    pub const USHORT: Self = Self(9);
    pub const INT: Self = Self(10);
    pub const UINT: Self = Self(11);
    pub const LONG: Self = Self(12);
    pub const ULONG: Self = Self(13);
    pub const LONG_LONG: Self = Self(14);
    pub const ULONG_LONG: Self = Self(15);
    pub const FLOAT: Self = Self(16);
    pub const DOUBLE: Self = Self(17);
    pub const LONG_DOUBLE: Self = Self(18);
    pub const NULLPTR: Self = Self(19);

    // === Placeholders ===
    /// `auto` before deduction.
    pub const AUTO: Self = Self(20);
    /// `decltype(auto)` before deduction.
    pub const DECLTYPE_AUTO: Self = Self(21);

    // === Problem types (indices 22-28, in `ProblemKind` order) ===
    const FIRST_PROBLEM: u32 = 22;

    /// A type that depends on template parameters in a way that is only
    /// known after instantiation.
    pub const DEPENDENT: Self = Self(29);

    /// Number of pre-interned entries in shard 0.
    pub const PRE_INTERNED: u32 = 30;

    /// Maximum local index per shard.
    pub const MAX_LOCAL: u32 = 0x0FFF_FFFF;

    #[inline]
    pub const fn from_shard_local(shard: u32, local: u32) -> Self {
        debug_assert!(shard < 16);
        debug_assert!(local <= Self::MAX_LOCAL);
        Self((shard << 28) | local)
    }

    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> 28) as usize
    }

    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Handle of a builtin type.
    #[inline]
    pub const fn builtin(ty: BuiltinType) -> Self {
        Self(ty as u32)
    }

    /// Handle of the problem type for `kind`.
    #[inline]
    pub const fn problem(kind: ProblemKind) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "ProblemKind has seven variants"
        )]
        let offset = kind.index() as u32;
        Self(Self::FIRST_PROBLEM + offset)
    }

    /// The builtin type behind a builtin handle.
    #[inline]
    pub fn as_builtin(self) -> Option<BuiltinType> {
        BuiltinType::ALL.get(self.0 as usize).copied()
    }

    /// The problem kind behind a problem handle.
    #[inline]
    pub fn as_problem(self) -> Option<ProblemKind> {
        self.0
            .checked_sub(Self::FIRST_PROBLEM)
            .and_then(|i| ProblemKind::ALL.get(i as usize).copied())
    }

    #[inline]
    pub fn is_problem(self) -> bool {
        self.as_problem().is_some()
    }

    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }

    #[inline]
    pub const fn is_placeholder(self) -> bool {
        self.0 == Self::AUTO.0 || self.0 == Self::DECLTYPE_AUTO.0
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(builtin) = self.as_builtin() {
            return write!(f, "Idx::{}", builtin.spelling());
        }
        if let Some(kind) = self.as_problem() {
            return write!(f, "Idx::Problem({kind:?})");
        }
        match *self {
            Self::AUTO => write!(f, "Idx::AUTO"),
            Self::DECLTYPE_AUTO => write!(f, "Idx::DECLTYPE_AUTO"),
            Self::DEPENDENT => write!(f, "Idx::DEPENDENT"),
            _ => write!(f, "Idx({}:{})", self.shard(), self.local()),
        }
    }
}

const _: () = assert!(std::mem::size_of::<Idx>() == 4);

#[cfg(test)]
mod tests;
