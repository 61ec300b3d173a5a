//! Ranking of implicit conversion sequences.

use std::cmp::Ordering;

use crate::SymbolId;

/// Rank of an implicit conversion sequence, best first.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum ConversionRank {
    Exact,
    Promotion,
    Conversion,
    UserDefined,
    Ellipsis,
    NoMatch,
}

/// What kind of reference a conversion binds, if any.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum RefBinding {
    #[default]
    None,
    LValue,
    RValue,
}

/// Cost of one implicit conversion sequence.
///
/// For user-defined sequences the qualification, inheritance and reference
/// fields describe the second standard conversion.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Cost {
    pub rank: ConversionRank,
    /// Number of cv-qualifiers added by a qualification adjustment.
    pub qualification: u8,
    /// Derivation steps of a derived-to-base conversion.
    pub inheritance_depth: u16,
    pub ref_binding: RefBinding,
    /// Constructor or conversion function of a user-defined sequence.
    pub user_conversion: Option<SymbolId>,
    /// Rank of the standard conversion after the user-defined one.
    pub second_rank: ConversionRank,
}

impl Cost {
    pub const EXACT: Cost = Cost::new(ConversionRank::Exact);
    pub const NO_MATCH: Cost = Cost::new(ConversionRank::NoMatch);
    pub const ELLIPSIS: Cost = Cost::new(ConversionRank::Ellipsis);

    pub const fn new(rank: ConversionRank) -> Self {
        Cost {
            rank,
            qualification: 0,
            inheritance_depth: 0,
            ref_binding: RefBinding::None,
            user_conversion: None,
            second_rank: ConversionRank::Exact,
        }
    }

    /// A user-defined conversion through `function` followed by `second`.
    pub fn user_defined(function: SymbolId, second: Cost) -> Self {
        Cost {
            rank: ConversionRank::UserDefined,
            qualification: second.qualification,
            inheritance_depth: second.inheritance_depth,
            ref_binding: second.ref_binding,
            user_conversion: Some(function),
            second_rank: second.rank,
        }
    }

    #[must_use]
    pub fn with_qualification(mut self, added: u8) -> Self {
        self.qualification = added;
        self
    }

    /// Record a derived-to-base step; a nonzero depth ranks as a conversion.
    #[must_use]
    pub fn with_inheritance(mut self, depth: u16) -> Self {
        self.inheritance_depth = depth;
        if depth > 0 && self.rank < ConversionRank::Conversion {
            self.rank = ConversionRank::Conversion;
        }
        self
    }

    #[must_use]
    pub fn with_ref_binding(mut self, binding: RefBinding) -> Self {
        self.ref_binding = binding;
        self
    }

    #[inline]
    pub fn is_viable(&self) -> bool {
        self.rank != ConversionRank::NoMatch
    }

    /// Compare two sequences for the same argument. `Less` means `self` is
    /// the better conversion, `Equal` that neither is better.
    pub fn compare(&self, other: &Cost) -> Ordering {
        let by_rank = self.rank.cmp(&other.rank);
        if by_rank != Ordering::Equal {
            return by_rank;
        }
        if self.rank == ConversionRank::UserDefined {
            // Sequences through different functions are indistinguishable.
            if self.user_conversion != other.user_conversion {
                return Ordering::Equal;
            }
            let by_second = self.second_rank.cmp(&other.second_rank);
            if by_second != Ordering::Equal {
                return by_second;
            }
        }
        let by_depth = self.inheritance_depth.cmp(&other.inheritance_depth);
        if by_depth != Ordering::Equal {
            return by_depth;
        }
        match (self.ref_binding, other.ref_binding) {
            (RefBinding::RValue, RefBinding::LValue) => return Ordering::Less,
            (RefBinding::LValue, RefBinding::RValue) => return Ordering::Greater,
            _ => {}
        }
        self.qualification.cmp(&other.qualification)
    }
}

impl Default for Cost {
    fn default() -> Self {
        Cost::EXACT
    }
}
