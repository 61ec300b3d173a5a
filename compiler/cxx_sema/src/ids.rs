//! Session-level handles.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Handle of the `index`-th element of a table.
            #[inline]
            pub(crate) fn from_len(index: usize) -> Self {
                $name(u32::try_from(index).unwrap_or_else(|_| {
                    panic!("{} table exceeded u32::MAX entries", stringify!($name))
                }))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// A translation unit added to the session.
    UnitId
);
define_handle!(
    /// A scope of one translation unit.
    ScopeId
);
define_handle!(
    /// A template instance.
    InstanceId
);

/// Instantiation context: the innermost template instance whose bindings
/// apply, or `None` outside any instance.
pub type Ctx = Option<InstanceId>;
