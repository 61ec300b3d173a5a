//! Pre-computed type metadata flags.
//!
//! Computed once when a type is interned, so substitution and deduction
//! can skip types that contain nothing to rewrite.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeFlags: u32 {
        // === Presence flags ===
        /// Mentions a template parameter.
        const HAS_TEMPLATE_PARAM = 1 << 0;
        /// Contains `Dependent` or a dependent member type.
        const HAS_DEPENDENT = 1 << 1;
        /// Contains a problem type.
        const HAS_PROBLEM = 1 << 2;
        /// Contains `auto` or `decltype(auto)`.
        const HAS_PLACEHOLDER = 1 << 3;
        /// Contains a parameter pack not under a pack expansion.
        const HAS_UNEXPANDED_PACK = 1 << 4;
        /// Contains a pack expansion.
        const HAS_PACK_EXPANSION = 1 << 5;

        // === Category flags (top level only) ===
        const IS_BUILTIN = 1 << 8;
        const IS_POINTER = 1 << 9;
        const IS_REFERENCE = 1 << 10;
        const IS_QUALIFIED = 1 << 11;
        const IS_FUNCTION = 1 << 12;
        const IS_ARRAY = 1 << 13;
        /// Class, closure or class template specialization.
        const IS_CLASS = 1 << 14;
        const IS_ENUM = 1 << 15;
    }
}

impl TypeFlags {
    /// Presence flags propagate from children to parents.
    pub const PRESENCE: TypeFlags = TypeFlags::HAS_TEMPLATE_PARAM
        .union(TypeFlags::HAS_DEPENDENT)
        .union(TypeFlags::HAS_PROBLEM)
        .union(TypeFlags::HAS_PLACEHOLDER)
        .union(TypeFlags::HAS_UNEXPANDED_PACK)
        .union(TypeFlags::HAS_PACK_EXPANSION);

    /// Needs substitution to become concrete.
    #[inline]
    pub fn is_dependent(self) -> bool {
        self.intersects(TypeFlags::HAS_TEMPLATE_PARAM | TypeFlags::HAS_DEPENDENT)
    }

    #[inline]
    pub fn has_problem(self) -> bool {
        self.contains(TypeFlags::HAS_PROBLEM)
    }

    #[inline]
    pub fn presence(self) -> TypeFlags {
        self & Self::PRESENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_excludes_categories() {
        let flags = TypeFlags::HAS_PROBLEM | TypeFlags::IS_POINTER;
        assert_eq!(flags.presence(), TypeFlags::HAS_PROBLEM);
        assert!(flags.has_problem());
        assert!(!flags.is_dependent());
    }
}
