//! Standard conversion sequences.
//!
//! Computes the cost of converting an expression of some type and value
//! category to a target type without user-defined conversions. Those need
//! the symbol table and live in the semantic layer, which combines them
//! with the costs computed here through [`Cost::user_defined`].

mod cost;

use cxx_ir::BuiltinType;

use crate::{Cv, Idx, SymbolId, TypeData, TypePool, ValueCategory};

pub use cost::{ConversionRank, Cost, RefBinding};

/// The converted expression.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ConversionSource {
    pub ty: Idx,
    pub category: ValueCategory,
    /// Integral literal zero or `nullptr`.
    pub null_constant: bool,
}

impl ConversionSource {
    pub fn new(ty: Idx, category: ValueCategory) -> Self {
        ConversionSource {
            ty,
            category,
            null_constant: false,
        }
    }

    pub fn lvalue(ty: Idx) -> Self {
        Self::new(ty, ValueCategory::LValue)
    }

    pub fn prvalue(ty: Idx) -> Self {
        Self::new(ty, ValueCategory::PRValue)
    }

    #[must_use]
    pub fn with_null_constant(mut self, null_constant: bool) -> Self {
        self.null_constant = null_constant;
        self
    }
}

/// Class relationships needed to rank conversions.
pub trait ClassHierarchy {
    /// Derivation steps from class type `derived` to class type `base`;
    /// `Some(0)` when they are the same class.
    fn base_distance(&mut self, derived: Idx, base: Idx) -> Option<u16>;

    fn is_scoped_enum(&self, symbol: SymbolId) -> bool {
        let _ = symbol;
        false
    }
}

/// Hierarchy with no inheritance.
pub struct NoHierarchy;

impl ClassHierarchy for NoHierarchy {
    fn base_distance(&mut self, derived: Idx, base: Idx) -> Option<u16> {
        (derived == base).then_some(0)
    }
}

/// Cost of the standard conversion sequence from `source` to `target`.
pub fn standard_conversion(
    pool: &TypePool,
    source: ConversionSource,
    target: Idx,
    hierarchy: &mut dyn ClassHierarchy,
) -> Cost {
    if pool.has_problem(source.ty) || pool.has_problem(target) || source.ty.is_void() {
        return Cost::NO_MATCH;
    }
    if pool.is_dependent(source.ty) || pool.is_dependent(target) {
        // Checked again once instantiated.
        return Cost::EXACT;
    }
    if pool.is_reference(target) {
        return reference_binding(pool, source, target, hierarchy);
    }
    value_conversion(pool, source, pool.strip_cv(target), hierarchy)
}

fn added_qualifiers(from: Cv, to: Cv) -> u8 {
    #[expect(clippy::cast_possible_truncation, reason = "at most two qualifiers")]
    let added = (to - from).bits().count_ones() as u8;
    added
}

fn reference_binding(
    pool: &TypePool,
    source: ConversionSource,
    target: Idx,
    hierarchy: &mut dyn ClassHierarchy,
) -> Cost {
    let rvalue_ref = pool.is_rvalue_ref(target);
    let binding = if rvalue_ref {
        RefBinding::RValue
    } else {
        RefBinding::LValue
    };
    let (ref_base, ref_cv) = pool.split_cv(pool.strip_ref(target));
    let (src_base, src_cv) = pool.split_cv(pool.strip_ref(source.ty));

    let related = if src_base == ref_base {
        Some(0)
    } else if pool.is_class_like(src_base) && pool.is_class_like(ref_base) {
        hierarchy.base_distance(src_base, ref_base)
    } else {
        None
    };
    let is_function = pool.function_sig(src_base).is_some();
    let direct_ok = if rvalue_ref {
        source.category.is_rvalue() || is_function
    } else {
        source.category.is_lvalue() || ref_cv == Cv::CONST
    };

    if let Some(depth) = related {
        if !ref_cv.is_at_least(src_cv) || !direct_ok {
            return Cost::NO_MATCH;
        }
        return Cost::EXACT
            .with_qualification(added_qualifiers(src_cv, ref_cv))
            .with_inheritance(depth)
            .with_ref_binding(binding);
    }

    // Bind to a temporary: only `const T&` and `T&&` accept one.
    if !rvalue_ref && ref_cv != Cv::CONST {
        return Cost::NO_MATCH;
    }
    let temp = ConversionSource::prvalue(pool.strip_ref(source.ty))
        .with_null_constant(source.null_constant);
    value_conversion(pool, temp, ref_base, hierarchy).with_ref_binding(binding)
}

fn value_conversion(
    pool: &TypePool,
    source: ConversionSource,
    target: Idx,
    hierarchy: &mut dyn ClassHierarchy,
) -> Cost {
    let src = pool.decay(source.ty);
    if src == target {
        return Cost::EXACT;
    }

    if pool.is_class_like(target) || pool.is_class_like(src) {
        if pool.is_class_like(target) && pool.is_class_like(src) {
            if let Some(depth) = hierarchy.base_distance(src, target) {
                return Cost::EXACT.with_inheritance(depth);
            }
        }
        return Cost::NO_MATCH;
    }

    if target == Idx::BOOL {
        return if pool.is_arithmetic(src)
            || pool.is_pointer(src)
            || src == Idx::NULLPTR
            || unscoped_enum(pool, src, hierarchy)
        {
            Cost::new(ConversionRank::Conversion)
        } else {
            Cost::NO_MATCH
        };
    }

    if let Some(target_pointee) = pool.pointee(target) {
        if src == Idx::NULLPTR || (source.null_constant && pool.is_integral(src)) {
            return Cost::new(ConversionRank::Conversion);
        }
        return match pool.pointee(src) {
            Some(src_pointee) => pointer_conversion(pool, src_pointee, target_pointee, hierarchy),
            None => Cost::NO_MATCH,
        };
    }

    if let Some(target_builtin) = target.as_builtin() {
        if !target_builtin.is_arithmetic() {
            return Cost::NO_MATCH;
        }
        if let Some(src_builtin) = src.as_builtin() {
            return arithmetic_conversion(src_builtin, target_builtin);
        }
        if unscoped_enum(pool, src, hierarchy) {
            // Unscoped enums promote to int and convert to other arithmetic types.
            return if target == Idx::INT {
                Cost::new(ConversionRank::Promotion)
            } else {
                Cost::new(ConversionRank::Conversion)
            };
        }
    }
    Cost::NO_MATCH
}

fn unscoped_enum(pool: &TypePool, ty: Idx, hierarchy: &dyn ClassHierarchy) -> bool {
    match pool.get(ty) {
        TypeData::Enum(symbol) => !hierarchy.is_scoped_enum(symbol),
        _ => false,
    }
}

fn arithmetic_conversion(src: BuiltinType, target: BuiltinType) -> Cost {
    if !src.is_arithmetic() {
        return Cost::NO_MATCH;
    }
    let promotes = match (src.is_integral(), target) {
        (true, BuiltinType::Int) => src.integer_rank() < BuiltinType::Int.integer_rank(),
        (false, BuiltinType::Double) => src == BuiltinType::Float,
        _ => false,
    };
    if promotes {
        Cost::new(ConversionRank::Promotion)
    } else {
        Cost::new(ConversionRank::Conversion)
    }
}

fn pointer_conversion(
    pool: &TypePool,
    src_pointee: Idx,
    target_pointee: Idx,
    hierarchy: &mut dyn ClassHierarchy,
) -> Cost {
    let (src_base, src_cv) = pool.split_cv(src_pointee);
    let (target_base, target_cv) = pool.split_cv(target_pointee);
    if !target_cv.is_at_least(src_cv) {
        return Cost::NO_MATCH;
    }
    let qualification = added_qualifiers(src_cv, target_cv);
    if src_base == target_base {
        return Cost::EXACT.with_qualification(qualification);
    }
    if target_base.is_void() && pool.function_sig(src_base).is_none() {
        return Cost::new(ConversionRank::Conversion).with_qualification(qualification);
    }
    if pool.is_class_like(src_base) && pool.is_class_like(target_base) {
        if let Some(depth) = hierarchy.base_distance(src_base, target_base) {
            return Cost::EXACT
                .with_qualification(qualification)
                .with_inheritance(depth);
        }
    }
    Cost::NO_MATCH
}
